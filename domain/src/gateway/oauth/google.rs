//! Google OAuth2 provider client.
//!
//! This module provides an HTTP client for Google's OAuth2 endpoints: the
//! authorization (consent) redirect, the code-for-token exchange, and the
//! userinfo profile fetch. All endpoint URLs are configurable so tests can
//! point the client at a mock server.

use async_trait::async_trait;
use log::*;
use serde::Serialize;

use crate::error::{auth_error, config_error, token_exchange_error, Error};
use crate::gateway::oauth::Provider;
use crate::session::{AccessTokenRecord, UserRecord};
use service::config::Config;

/// Configuration for the provider's OAuth2 endpoint URLs.
#[derive(Debug, Clone)]
pub struct ProviderUrls {
    pub authorize_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

/// Request to exchange an authorization code for tokens
#[derive(Debug, Serialize)]
struct TokenExchangeRequest {
    redirect_uri: String,
    code: String,
    client_id: String,
    client_secret: String,
    grant_type: String,
}

/// Google OAuth2 client implementing the `Provider` capability.
pub struct GoogleProvider {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    scope: Vec<String>,
    urls: ProviderUrls,
}

impl GoogleProvider {
    /// Create a new Google OAuth client with configurable URLs
    pub fn new(
        client_id: &str,
        client_secret: &str,
        scope: Vec<String>,
        urls: ProviderUrls,
    ) -> Result<Self, Error> {
        let client = reqwest::Client::builder().use_rustls_tls().build()?;

        Ok(Self {
            client,
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            scope,
            urls,
        })
    }

    /// Builds a provider from application config. Fails with a Config error
    /// when the OAuth client credentials are not set.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let client_id = config
            .oauth_client_id()
            .ok_or_else(|| config_error("OAUTH_CLIENT_ID is not set"))?;
        let client_secret = config
            .oauth_client_secret()
            .ok_or_else(|| config_error("OAUTH_CLIENT_SECRET is not set"))?;

        Self::new(
            &client_id,
            &client_secret,
            config.oauth_scope().to_vec(),
            ProviderUrls {
                authorize_url: config.authorize_url().to_string(),
                token_url: config.token_url().to_string(),
                userinfo_url: config.userinfo_url().to_string(),
            },
        )
    }
}

#[async_trait]
impl Provider for GoogleProvider {
    /// Generate the OAuth authorization URL for user consent.
    ///
    /// `approval_prompt=auto` skips the consent screen when the user has
    /// already approved this application.
    fn authorize_redirect_url(&self, redirect_uri: &str) -> String {
        let scopes = self.scope.join(" ");

        format!(
            "{}?\
            client_id={}&\
            redirect_uri={}&\
            response_type=code&\
            scope={}&\
            approval_prompt=auto",
            self.urls.authorize_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&scopes),
        )
    }

    /// Exchange authorization code for an access-token record
    async fn exchange_code(
        &self,
        redirect_uri: &str,
        code: &str,
    ) -> Result<AccessTokenRecord, Error> {
        let request = TokenExchangeRequest {
            redirect_uri: redirect_uri.to_string(),
            code: code.to_string(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            grant_type: "authorization_code".to_string(),
        };

        debug!("Exchanging OAuth authorization code for tokens");

        let response = self
            .client
            .post(&self.urls.token_url)
            .form(&request)
            .send()
            .await
            .inspect_err(|e| warn!("Failed to reach token endpoint: {:?}", e))?;

        if response.status().is_success() {
            let access: AccessTokenRecord = response.json().await.map_err(|e| {
                warn!("Failed to parse token response: {:?}", e);
                token_exchange_error("Invalid response from token endpoint".to_string())
            })?;
            info!("Successfully exchanged authorization code for tokens");
            Ok(access)
        } else {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Token exchange rejected by provider: {}", error_text);
            Err(token_exchange_error(error_text))
        }
    }

    /// Get the user's profile using the access token
    async fn fetch_user_info(&self, access: &AccessTokenRecord) -> Result<UserRecord, Error> {
        let response = self
            .client
            .get(&self.urls.userinfo_url)
            .bearer_auth(&access.access_token)
            .send()
            .await
            .inspect_err(|e| warn!("Failed to reach userinfo endpoint: {:?}", e))?;

        if response.status().is_success() {
            let user: UserRecord = response.json().await.map_err(|e| {
                warn!("Failed to parse userinfo response: {:?}", e);
                auth_error("Invalid response from userinfo endpoint")
            })?;
            Ok(user)
        } else {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Userinfo rejected the access token: {}", error_text);
            Err(auth_error(&error_text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, ExternalErrorKind};
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn provider_for(server_url: &str) -> GoogleProvider {
        GoogleProvider::new(
            "client_123",
            "secret_456",
            vec!["profile".to_string()],
            ProviderUrls {
                authorize_url: format!("{server_url}/o/oauth2/auth"),
                token_url: format!("{server_url}/o/oauth2/token"),
                userinfo_url: format!("{server_url}/oauth2/v1/userinfo"),
            },
        )
        .expect("failed to build test provider")
    }

    #[test]
    fn test_authorize_redirect_url_contains_required_parameters() {
        let provider = provider_for("https://accounts.example.com");
        let url = provider.authorize_redirect_url("http://localhost:9000/login");

        assert!(url.starts_with("https://accounts.example.com/o/oauth2/auth?"));
        assert!(url.contains("client_id=client_123"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A9000%2Flogin"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=profile"));
        assert!(url.contains("approval_prompt=auto"));
    }

    #[tokio::test]
    async fn test_exchange_code_posts_form_encoded_grant() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/o/oauth2/token")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("code".into(), "abc123".into()),
                Matcher::UrlEncoded("client_id".into(), "client_123".into()),
                Matcher::UrlEncoded("client_secret".into(), "secret_456".into()),
                Matcher::UrlEncoded(
                    "redirect_uri".into(),
                    "http://localhost:9000/login".into(),
                ),
                Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
            ]))
            .with_status(200)
            .with_body(
                json!({
                    "access_token": "T1",
                    "refresh_token": "R1",
                    "expires_in": 3600,
                    "token_type": "Bearer"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let provider = provider_for(&server.url());
        let access = provider
            .exchange_code("http://localhost:9000/login", "abc123")
            .await
            .expect("exchange should succeed");

        assert_eq!(access.access_token, "T1");
        assert_eq!(access.refresh_token.as_deref(), Some("R1"));
        assert_eq!(access.expires_in, Some(3600));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_exchange_code_rejection_carries_provider_payload() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/o/oauth2/token")
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant"}"#)
            .create_async()
            .await;

        let provider = provider_for(&server.url());
        let err = provider
            .exchange_code("http://localhost:9000/login", "stale")
            .await
            .expect_err("exchange should fail");

        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::TokenExchange(
                r#"{"error":"invalid_grant"}"#.to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_fetch_user_info_attaches_bearer_token() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/oauth2/v1/userinfo")
            .match_header("authorization", "Bearer T1")
            .with_status(200)
            .with_body(
                json!({
                    "id": "1001",
                    "name": "Alice",
                    "picture": "https://example.com/u.png"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let provider = provider_for(&server.url());
        let access: AccessTokenRecord =
            serde_json::from_value(json!({"access_token": "T1"})).unwrap();
        let user = provider
            .fetch_user_info(&access)
            .await
            .expect("userinfo should succeed");

        assert_eq!(user.name.as_deref(), Some("Alice"));
        assert_eq!(user.picture.as_deref(), Some("https://example.com/u.png"));
        assert_eq!(user.extra["id"], "1001");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_user_info_rejection_is_auth_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/oauth2/v1/userinfo")
            .with_status(401)
            .with_body(r#"{"error":"invalid_token"}"#)
            .create_async()
            .await;

        let provider = provider_for(&server.url());
        let access: AccessTokenRecord =
            serde_json::from_value(json!({"access_token": "stale"})).unwrap();
        let err = provider
            .fetch_user_info(&access)
            .await
            .expect_err("userinfo should fail");

        assert!(err.is_auth(), "a rejected token must map to an Auth error");
    }
}
