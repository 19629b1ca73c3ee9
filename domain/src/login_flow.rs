//! Login-flow state resolution.
//!
//! The OAuth2 "authorization code" dance is driven entirely from per-session
//! state: nothing here persists between requests. Each inbound request on the
//! login path is resolved to exactly one step by `next_step`, and
//! `LoginFlow::advance` executes that step. The steps are generally performed
//! bottom-to-top over successive request cycles (consent redirect, code
//! exchange, profile fetch, logged in), but a session that already holds
//! state skips straight to the applicable step.
//!
//! The only observable effects of advancing the flow are the instructed
//! session mutations and the single redirect target returned; the resolver
//! itself performs no I/O beyond the two provider calls.

use std::collections::HashMap;

use log::*;

use crate::error::Error;
use crate::gateway::oauth::Provider;
use crate::session::{AccessTokenRecord, SessionMutation, SessionSnapshot};

/// An inbound request on the login path, reduced to what the resolver needs.
/// `current_url` is the absolute request URL with the query string stripped;
/// it doubles as the redirect URI registered with the provider.
#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub current_url: String,
    pub query: HashMap<String, String>,
}

impl LoginRequest {
    pub fn new(current_url: impl Into<String>, query: HashMap<String, String>) -> Self {
        Self {
            current_url: current_url.into(),
            query,
        }
    }
}

/// The single step to perform for one request, decided by `next_step`.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowStep {
    /// Explicit logout: clear both session slots and return to the login base.
    Reset,
    /// A user is already resolved for this session; go home.
    AlreadyLoggedIn,
    /// We have provider access but no profile yet; fetch it.
    FetchUser { access: AccessTokenRecord },
    /// The provider sent the user back with an authorization code.
    ExchangeCode { code: String },
    /// Nothing in hand; send the user to the provider's consent page.
    StartOver,
}

/// Decides the next step of the login flow for one request.
///
/// The order of the checks is significant and must not change:
/// - Reset beats an existing logged-in session, so explicit logout always wins.
/// - AlreadyLoggedIn beats re-fetching even when an access token is also
///   present, avoiding redundant network calls.
/// - FetchUser beats ExchangeCode: an existing access token is consumed
///   before a new code, since a stale `code` query parameter may linger on a
///   redirected URL.
pub fn next_step(request: &LoginRequest, session: &SessionSnapshot) -> FlowStep {
    if request.current_url.ends_with("/new") {
        FlowStep::Reset
    } else if session.current_user.is_some() {
        FlowStep::AlreadyLoggedIn
    } else if let Some(access) = &session.access_token {
        FlowStep::FetchUser {
            access: access.clone(),
        }
    } else if let Some(code) = request.query.get("code") {
        FlowStep::ExchangeCode { code: code.clone() }
    } else {
        FlowStep::StartOver
    }
}

/// The outcome of advancing the flow by one request: the session mutations
/// the hosting layer must apply, in order, and the single redirect to return.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowOutcome {
    pub mutations: Vec<SessionMutation>,
    pub redirect: String,
}

/// Executes one step of the login flow against a provider.
pub struct LoginFlow<'a, P: Provider> {
    provider: &'a P,
    home_url: &'a str,
    required_email_domain: Option<&'a str>,
}

impl<'a, P: Provider> LoginFlow<'a, P> {
    pub fn new(provider: &'a P, home_url: &'a str, required_email_domain: Option<&'a str>) -> Self {
        Self {
            provider,
            home_url,
            required_email_domain,
        }
    }

    /// Resolves and executes the next step for `request` against `session`.
    ///
    /// A provider `Auth` failure while fetching the profile is recovered
    /// locally: the stored token is cleared and the user agent is redirected
    /// back to the same URL, where the next cycle starts the flow over. A
    /// `TokenExchange` failure is terminal for the request and propagates.
    pub async fn advance(
        &self,
        request: &LoginRequest,
        session: &SessionSnapshot,
    ) -> Result<FlowOutcome, Error> {
        match next_step(request, session) {
            FlowStep::Reset => {
                debug!("Login flow: reset, clearing session");
                Ok(FlowOutcome {
                    mutations: vec![
                        SessionMutation::ClearAccessToken,
                        SessionMutation::ClearUser,
                    ],
                    redirect: parent_url(&request.current_url),
                })
            }
            FlowStep::AlreadyLoggedIn => {
                debug!("Login flow: already logged in");
                Ok(FlowOutcome {
                    mutations: vec![],
                    redirect: self.home_url.to_string(),
                })
            }
            FlowStep::FetchUser { access } => {
                debug!("Login flow: fetching user info");
                self.fetch_user(request, &access).await
            }
            FlowStep::ExchangeCode { code } => {
                debug!("Login flow: exchanging authorization code");
                let access = self
                    .provider
                    .exchange_code(&request.current_url, &code)
                    .await?;
                Ok(FlowOutcome {
                    mutations: vec![SessionMutation::SetAccessToken(access)],
                    redirect: request.current_url.clone(),
                })
            }
            FlowStep::StartOver => {
                debug!("Login flow: redirecting to provider for consent");
                Ok(FlowOutcome {
                    mutations: vec![],
                    redirect: self.provider.authorize_redirect_url(&request.current_url),
                })
            }
        }
    }

    async fn fetch_user(
        &self,
        request: &LoginRequest,
        access: &AccessTokenRecord,
    ) -> Result<FlowOutcome, Error> {
        let user = match self.provider.fetch_user_info(access).await {
            Ok(user) => user,
            Err(e) if e.is_auth() => {
                // Self-healing: one rejected token triggers one fresh
                // re-authentication cycle on the redirect, not a crash.
                warn!("Failed to get user info via OAuth, re-authenticating...");
                return Ok(FlowOutcome {
                    mutations: vec![SessionMutation::ClearAccessToken],
                    redirect: request.current_url.clone(),
                });
            }
            Err(e) => return Err(e),
        };

        if let Some(domain) = self.required_email_domain {
            if !email_in_domain(user.email.as_deref(), domain) {
                warn!(
                    "Provider account email {:?} is outside required domain {}, re-authenticating...",
                    user.email, domain
                );
                return Ok(FlowOutcome {
                    mutations: vec![SessionMutation::ClearAccessToken],
                    redirect: request.current_url.clone(),
                });
            }
        }

        Ok(FlowOutcome {
            mutations: vec![SessionMutation::SetUser(user)],
            redirect: request.current_url.clone(),
        })
    }
}

/// Strips the final path segment: `.../login/new` becomes `.../login`.
fn parent_url(url: &str) -> String {
    match url.rsplit_once('/') {
        Some((head, _)) => head.to_string(),
        None => url.to_string(),
    }
}

fn email_in_domain(email: Option<&str>, domain: &str) -> bool {
    email
        .and_then(|e| e.rsplit_once('@'))
        .is_some_and(|(_, d)| d.eq_ignore_ascii_case(domain))
}
