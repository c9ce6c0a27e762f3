use std::fmt;

use engine_logging::{engine_debug, engine_info};
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;

use crate::fetch::{ensure_success, map_reqwest_error, parse_url};
use crate::{AuthError, FailureKind, FetchError};

/// Short-lived bearer token for the API. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub(crate) fn header_value(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BearerToken(<{} chars>)", self.0.len())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    jwt: Option<String>,
}

/// Exchanges the static API key for a bearer token.
#[derive(Debug, Clone)]
pub struct AuthClient {
    client: reqwest::Client,
    endpoint: String,
}

impl AuthClient {
    pub fn new(client: reqwest::Client, api_base: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/jwt", api_base.trim_end_matches('/')),
        }
    }

    /// One exchange, no retry: the run cannot continue without a token.
    pub async fn authenticate(&self, key: &str) -> Result<BearerToken, AuthError> {
        let url = parse_url(&self.endpoint)?;
        engine_debug!("Requesting token from {}", url);

        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, key)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        if let Err(err) = ensure_success(&response) {
            return match err.kind {
                FailureKind::HttpStatus(code) => Err(AuthError::Rejected(code)),
                _ => Err(AuthError::Transport(err)),
            };
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        let parsed: TokenResponse = serde_json::from_slice(&body).map_err(|err| {
            AuthError::Transport(FetchError::new(FailureKind::InvalidBody, err.to_string()))
        })?;
        let jwt = parsed.jwt.filter(|t| !t.is_empty()).ok_or(AuthError::MissingToken)?;

        engine_info!("Authenticated against {}", self.endpoint);
        Ok(BearerToken::new(jwt))
    }
}
