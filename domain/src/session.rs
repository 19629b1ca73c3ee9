//! Session-scoped data model for the login flow.
//!
//! The records here are opaque provider-defined mappings: the fields we care
//! about are named, everything else the provider returns is preserved in
//! `extra` so the hosting session layer round-trips it faithfully. Records
//! are never mutated in place, only replaced or cleared.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Access-token record as returned by the provider's token endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessTokenRecord {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// User profile record as returned by the provider's userinfo endpoint.
///
/// Google gives picture, id, locale, gender, name, link, family_name,
/// given_name; other providers differ, so only the fields the application
/// renders are named.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Per-session login state, owned by the hosting session layer and keyed by
/// session id. The resolver only ever reads a snapshot and instructs
/// mutations; it never holds state across requests.
///
/// Invariant: `current_user` present means the session is authenticated;
/// `access_token` present without a user means "authenticated with the
/// provider, profile not yet fetched."
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub current_user: Option<UserRecord>,
    pub access_token: Option<AccessTokenRecord>,
}

impl SessionSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }
}

/// A single instructed change to session state. The login flow returns these
/// rather than touching the session itself; applying them is the hosting
/// layer's job.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionMutation {
    SetAccessToken(AccessTokenRecord),
    ClearAccessToken,
    SetUser(UserRecord),
    ClearUser,
}

impl SessionSnapshot {
    /// Applies a mutation to this snapshot. Used by the web layer to keep an
    /// in-request view consistent, and by tests to simulate successive
    /// request cycles.
    pub fn apply(&mut self, mutation: &SessionMutation) {
        match mutation {
            SessionMutation::SetAccessToken(access) => self.access_token = Some(access.clone()),
            SessionMutation::ClearAccessToken => self.access_token = None,
            SessionMutation::SetUser(user) => self.current_user = Some(user.clone()),
            SessionMutation::ClearUser => self.current_user = None,
        }
    }
}
