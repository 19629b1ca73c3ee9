//! Controller for the OAuth2 login flow.
//!
//! A single GET endpoint drives the whole dance: each request is resolved to
//! one flow step from session state alone, and every step ends in a redirect,
//! so the browser loops through this handler until a user is cached in the
//! session. `<login path>/new` is the logout trigger.
//!
//! Note: these endpoints work via browser redirects which cannot set custom
//! headers.

use std::collections::HashMap;

use axum::extract::{OriginalUri, Query, State};
use axum::response::{IntoResponse, Redirect};
use log::*;
use tower_sessions::Session;

use domain::{LoginFlow, LoginRequest};

use crate::{session, Error, WebState};

/// GET /login (and /login/{*rest})
///
/// Resolves and performs the next step of the OAuth2 authorization-code
/// flow for this session: provider consent redirect, code-for-token
/// exchange, profile fetch, or redirect home when already signed in.
#[utoipa::path(
    get,
    path = "/login",
    params(
        ("code" = Option<String>, Query, description = "Authorization code sent back by the provider"),
    ),
    responses(
        (status = 307, description = "Redirect to the next step of the login flow"),
        (status = 502, description = "The provider rejected the code-for-token exchange"),
        (status = 500, description = "Server error (session state unavailable)"),
    )
)]
pub async fn login(
    State(state): State<WebState>,
    session: Session,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, Error> {
    let config = &state.app_state.config;
    // Absolute request URL with the query string stripped; this is also the
    // redirect URI the provider sends the user back to, so it must match a
    // registered redirect URI.
    let current_url = format!("{}{}", config.public_base_url(), uri.path());
    trace!("LoginController::login at {current_url}");

    let snapshot = session::snapshot(&session).await?;
    let required_domain = config.required_email_domain();
    let flow = LoginFlow::new(state.provider.as_ref(), "/", required_domain.as_deref());

    let outcome = flow
        .advance(&LoginRequest::new(current_url, query), &snapshot)
        .await?;

    session::apply(&session, &outcome.mutations).await?;
    debug!("Login flow redirecting to {}", outcome.redirect);

    Ok(Redirect::temporary(&outcome.redirect))
}
