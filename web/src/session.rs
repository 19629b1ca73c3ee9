//! Named session slots for the login flow.
//!
//! The domain layer works against a plain `SessionSnapshot` and returns
//! `SessionMutation`s; this module is the bridge to tower-sessions, which
//! owns cookie signing and per-session isolation. Two slots are used:
//! `access` for the provider token record and `user` for the cached profile,
//! stored as JSON so opaque provider fields round-trip faithfully.

use domain::error::session_error;
use domain::{AccessTokenRecord, SessionMutation, SessionSnapshot, UserRecord};
use tower_sessions::Session;

use crate::error::Result;

pub(crate) const ACCESS_SLOT: &str = "access";
pub(crate) const USER_SLOT: &str = "user";

/// Reads both slots into a snapshot for the resolver.
pub(crate) async fn snapshot(session: &Session) -> Result<SessionSnapshot> {
    let access_token = session
        .get::<AccessTokenRecord>(ACCESS_SLOT)
        .await
        .map_err(|e| session_error(Box::new(e)))?;
    let current_user = session
        .get::<UserRecord>(USER_SLOT)
        .await
        .map_err(|e| session_error(Box::new(e)))?;

    Ok(SessionSnapshot {
        current_user,
        access_token,
    })
}

/// Reads only the cached user profile, if any.
pub(crate) async fn current_user(session: &Session) -> Result<Option<UserRecord>> {
    Ok(session
        .get::<UserRecord>(USER_SLOT)
        .await
        .map_err(|e| session_error(Box::new(e)))?)
}

/// Applies the resolver's instructed mutations to the session, in order.
pub(crate) async fn apply(session: &Session, mutations: &[SessionMutation]) -> Result<()> {
    for mutation in mutations {
        match mutation {
            SessionMutation::SetAccessToken(access) => session
                .insert(ACCESS_SLOT, access)
                .await
                .map_err(|e| session_error(Box::new(e)))?,
            SessionMutation::ClearAccessToken => {
                session
                    .remove::<AccessTokenRecord>(ACCESS_SLOT)
                    .await
                    .map_err(|e| session_error(Box::new(e)))?;
            }
            SessionMutation::SetUser(user) => session
                .insert(USER_SLOT, user)
                .await
                .map_err(|e| session_error(Box::new(e)))?,
            SessionMutation::ClearUser => {
                session
                    .remove::<UserRecord>(USER_SLOT)
                    .await
                    .map_err(|e| session_error(Box::new(e)))?;
            }
        }
    }
    Ok(())
}
