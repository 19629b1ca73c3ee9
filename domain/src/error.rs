//! Error types for the `domain` layer.
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors are modeled as a tree structure with `domain::error::Error` as the
/// root type holding a tree of `error_kind` enums that represent the kinds of
/// errors that can occur in the domain layer or in lower layers. The `source`
/// field holds the original error that caused the domain error. The intent is
/// to translate errors between layers while maintaining layer boundaries:
/// `web` depends on `domain` but never interprets reqwest or session-store
/// errors directly. The various `error_kind`s are ultimately used by `web` to
/// return appropriate HTTP status codes and pages to the client.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Config,
    Session,
    Other(String),
}

/// Enum representing the various kinds of errors caused by the identity
/// provider or the network path to it.
///
/// `TokenExchange` is the provider rejecting a code-for-token exchange and
/// carries the provider's raw error payload; it is terminal for the request.
/// `Auth` is the provider rejecting a stored access token (typically expired
/// or revoked); the login flow recovers from it by clearing the token and
/// restarting the dance.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Network,
    TokenExchange(String),
    Auth,
    Other(String),
}

impl Error {
    /// True when this error is the recoverable stored-token rejection.
    pub fn is_auth(&self) -> bool {
        self.error_kind == DomainErrorKind::External(ExternalErrorKind::Auth)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Errors that result from issues building the reqwest::Client instance. This
        // type of error will occur prior to any network calls being made.
        if err.is_builder() {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                    "Failed to build reqwest client".to_string(),
                )),
            }
        // Errors that result from issues with the network call itself.
        } else {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            }
        }
    }
}

/// Helper function to create configuration errors.
pub fn config_error(message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
    }
}

/// Helper function to create session-layer errors.
pub fn session_error(source: Box<dyn StdError + Send + Sync>) -> Error {
    Error {
        source: Some(source),
        error_kind: DomainErrorKind::Internal(InternalErrorKind::Session),
    }
}

/// Helper function to create token-exchange errors carrying the provider's
/// raw error payload.
pub fn token_exchange_error(payload: String) -> Error {
    Error {
        source: None,
        error_kind: DomainErrorKind::External(ExternalErrorKind::TokenExchange(payload)),
    }
}

/// Helper function to create stored-token rejection errors.
pub fn auth_error(message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: DomainErrorKind::External(ExternalErrorKind::Auth),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_auth_only_matches_auth_kind() {
        assert!(auth_error("token rejected").is_auth());
        assert!(!token_exchange_error("invalid_grant".to_string()).is_auth());
        assert!(!config_error("missing client id").is_auth());
    }

    #[test]
    fn test_token_exchange_error_carries_provider_payload() {
        let err = token_exchange_error(r#"{"error":"invalid_grant"}"#.to_string());
        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::TokenExchange(
                r#"{"error":"invalid_grant"}"#.to_string()
            ))
        );
    }
}
