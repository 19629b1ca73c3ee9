pub mod error;
pub mod gateway;
pub mod login_flow;
pub mod session;

// Re-exports so that consumers of the `domain` crate work with the login-flow
// vocabulary directly instead of reaching into submodules.
pub use login_flow::{FlowOutcome, FlowStep, LoginFlow, LoginRequest};
pub use session::{AccessTokenRecord, SessionMutation, SessionSnapshot, UserRecord};
