use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use log::*;
use time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use domain::gateway::oauth::google::GoogleProvider;

pub(crate) mod controller;
pub mod error;
pub mod router;
pub(crate) mod session;

pub use error::{Error, Result};
pub use service::AppState;

/// Router state: infrastructure config plus the provider gateway.
///
/// The provider owns the shared reqwest client, which pools connections, so
/// it is built once at startup and borrowed by every login request rather
/// than reconstructed per request.
#[derive(Clone)]
pub struct WebState {
    pub app_state: AppState,
    pub provider: Arc<GoogleProvider>,
}

impl WebState {
    /// Fails when the OAuth client credentials are missing from config, so a
    /// misconfigured deployment refuses to start instead of failing on the
    /// first login request.
    pub fn new(app_state: AppState) -> Result<Self> {
        let provider = Arc::new(GoogleProvider::from_config(&app_state.config)?);
        Ok(Self {
            app_state,
            provider,
        })
    }
}

/// Binds the listener and serves the router with the session and CORS layers
/// attached. Session state lives in process memory and is referenced by a
/// signed cookie; cookie signing itself belongs to tower-sessions.
pub async fn init_server(
    app_state: AppState,
) -> core::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let host = app_state
        .config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let port = app_state.config.port;
    let listen_addr = format!("{host}:{port}");

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(app_state.config.is_production())
        .with_expiry(session_expiry(app_state.config.session_expiry_seconds)?);

    let allowed_origins: Vec<HeaderValue> = app_state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| {
            origin
                .parse::<HeaderValue>()
                .inspect_err(|_| warn!("Skipping unparsable CORS origin: {origin}"))
                .ok()
        })
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([Method::GET])
        .allow_credentials(true);

    let web_state = WebState::new(app_state)?;
    let app = router::define_routes(web_state)
        .layer(cors)
        .layer(session_layer);

    info!("Server starting... listening for connections on http://{listen_addr}");
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Converts the configured expiry to the session layer's signed seconds,
/// rejecting values that do not fit instead of silently wrapping.
fn session_expiry(seconds: u64) -> core::result::Result<Expiry, std::num::TryFromIntError> {
    Ok(Expiry::OnInactivity(Duration::seconds(i64::try_from(
        seconds,
    )?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use service::config::Config;

    fn configured_state() -> WebState {
        WebState::new(AppState::new(Config::from_args([
            "login_portal_rs",
            "--oauth-client-id",
            "client_123",
            "--oauth-client-secret",
            "secret_456",
        ])))
        .expect("credentials are set, state should build")
    }

    #[test]
    fn test_web_state_clones_share_one_provider_client() {
        let state = configured_state();
        let clone = state.clone();
        assert!(
            Arc::ptr_eq(&state.provider, &clone.provider),
            "cloned router states must borrow the same provider client"
        );
    }

    #[test]
    fn test_web_state_without_credentials_fails_at_startup() {
        let result = WebState::new(AppState::new(Config::from_args(["login_portal_rs"])));
        assert!(
            result.is_err(),
            "missing OAuth credentials should fail at startup, not per request"
        );
    }

    #[test]
    fn test_session_expiry_rejects_values_exceeding_i64() {
        assert!(session_expiry(86400).is_ok());
        assert!(session_expiry(u64::MAX).is_err());
    }
}
