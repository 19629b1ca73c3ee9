//! Controller for the authenticated home page.

use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect, Response};
use log::*;
use tower_sessions::Session;

use crate::{session, Error, WebState};

/// GET /
///
/// Greets the signed-in user with their provider profile. Requests without a
/// resolved user are redirected to the login path, which starts (or resumes)
/// the OAuth2 flow.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Greeting page for the signed-in user", body = String),
        (status = 307, description = "Not signed in; redirect to the login path"),
    )
)]
pub async fn home(State(state): State<WebState>, session: Session) -> Result<Response, Error> {
    let Some(user) = session::current_user(&session).await? else {
        trace!("HomeController::home without a user, redirecting to login");
        return Ok(Redirect::temporary(state.app_state.config.login_path()).into_response());
    };

    let name = escape_html(user.name.as_deref().unwrap_or("you"));
    let body = match user.picture.as_deref() {
        Some(picture) => format!(
            "Hello, {} <img src=\"{}\" />",
            name,
            escape_html(picture)
        ),
        None => format!("Hello, {}", name),
    };

    Ok(Html(body).into_response())
}

/// Escapes text for safe interpolation into HTML content and attributes.
/// Provider profile fields are attacker-influenced input.
fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
