use config::Config;

pub mod config;
pub mod logging;

// Service-level state containing only infrastructure concerns.
// Needs to implement Clone to be able to be passed into Router as State.
// Identity state never lives here: each session's resolved user belongs to
// the session layer, keyed by session id.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
}

impl AppState {
    pub fn new(app_config: Config) -> Self {
        Self { config: app_config }
    }
}
