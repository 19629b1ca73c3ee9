use crate::controller::{health_check_controller, home_controller, login_controller};
use crate::WebState;
use axum::{routing::get, Router};

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Login Portal API"
        ),
        paths(
            health_check_controller::health_check,
            home_controller::home,
            login_controller::login,
        ),
        tags(
            (name = "login_portal", description = "OAuth2 authorization-code login portal")
        )
    )]
struct ApiDoc;

pub fn define_routes(web_state: WebState) -> Router {
    Router::new()
        .merge(home_routes(web_state.clone()))
        .merge(login_routes(web_state))
        .merge(health_routes())
        .merge(RapiDoc::with_openapi("/api-docs/openapi2.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn home_routes(web_state: WebState) -> Router {
    Router::new()
        .route("/", get(home_controller::home))
        .with_state(web_state)
}

fn login_routes(web_state: WebState) -> Router {
    // The login path is configurable; the wildcard route makes the literal
    // `/new` suffix (logout) reach the same handler.
    let base = web_state.app_state.config.login_path().to_string();
    Router::new()
        .route(&base, get(login_controller::login))
        .route(&format!("{base}/{{*rest}}"), get(login_controller::login))
        .with_state(web_state)
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}
