//! OAuth2 provider gateway.
//!
//! The login flow is generic over this small capability trait: supporting a
//! new identity provider means supplying a new implementation, not a new
//! handler hierarchy.

use async_trait::async_trait;

use crate::error::Error;
use crate::session::{AccessTokenRecord, UserRecord};

pub mod google;

/// Capability interface for an OAuth2 "authorization code" identity provider.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Builds the consent URL the user agent is redirected to when the flow
    /// starts from scratch. `redirect_uri` is where the provider sends the
    /// user back, carrying a `code` query parameter.
    fn authorize_redirect_url(&self, redirect_uri: &str) -> String;

    /// Exchanges an authorization code for an access-token record via the
    /// provider's token endpoint. `redirect_uri` must match the one used in
    /// the consent redirect. Provider rejection surfaces as a
    /// `TokenExchange` error carrying the raw error payload.
    async fn exchange_code(
        &self,
        redirect_uri: &str,
        code: &str,
    ) -> Result<AccessTokenRecord, Error>;

    /// Fetches the signed-in user's profile from the provider's userinfo
    /// endpoint using the bearer token in `access`. Provider rejection
    /// surfaces as an `Auth` error.
    async fn fetch_user_info(&self, access: &AccessTokenRecord) -> Result<UserRecord, Error>;
}
