//! Bearer credential sources.
//!
//! The client never decides where a token comes from. It asks the
//! [`CredentialProvider`] it was built with, once per high-level operation,
//! and threads the result through every request of that operation.

use crate::api::parse_token_response;
use crate::headers::add_common_headers;
use crate::types::{AccessToken, VibeSyncError};
use crate::Result;
use async_trait::async_trait;
use http_client::{HttpClient, Request};
use http_types::{Method, Url};
use std::sync::Arc;

/// Source of bearer credentials.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait(?Send)]
pub trait CredentialProvider {
    /// Obtain a bearer token.
    ///
    /// Implementations return [`VibeSyncError::MissingCredential`] when no
    /// token is available.
    async fn access_token(&self) -> Result<AccessToken>;
}

/// A token known up front, e.g. from the command line or the environment.
#[derive(Clone, Debug)]
pub struct StaticToken {
    token: AccessToken,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: AccessToken::new(token),
        }
    }
}

#[async_trait(?Send)]
impl CredentialProvider for StaticToken {
    async fn access_token(&self) -> Result<AccessToken> {
        if self.token.is_empty() {
            return Err(VibeSyncError::MissingCredential(
                "static token is empty".to_string(),
            ));
        }
        Ok(self.token.clone())
    }
}

/// Fetches `{ "access_token": ... }` from the dashboard's local token endpoint.
///
/// No caching or refresh happens here; every call hits the endpoint.
#[derive(Clone)]
pub struct TokenEndpoint {
    client: Arc<dyn HttpClient + Send + Sync>,
    url: String,
}

impl TokenEndpoint {
    pub fn new(client: Box<dyn HttpClient + Send + Sync>, url: impl Into<String>) -> Self {
        Self {
            client: Arc::from(client),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait(?Send)]
impl CredentialProvider for TokenEndpoint {
    async fn access_token(&self) -> Result<AccessToken> {
        let url = self
            .url
            .parse::<Url>()
            .map_err(|e| VibeSyncError::Http(format!("invalid token URL {}: {e}", self.url)))?;

        let mut request = Request::new(Method::Get, url);
        add_common_headers(&mut request);

        log::debug!("Requesting access token from {}", self.url);
        let mut response = self
            .client
            .send(request)
            .await
            .map_err(|e| VibeSyncError::Http(e.to_string()))?;

        let body = response
            .body_string()
            .await
            .map_err(|e| VibeSyncError::Http(e.to_string()))?;

        if !response.status().is_success() {
            log::debug!(
                "Token endpoint answered {}; treating as missing credential",
                response.status()
            );
        }

        parse_token_response(&body).map_err(|e| match e {
            VibeSyncError::Parse(msg) => VibeSyncError::MissingCredential(format!(
                "token endpoint returned status {} with undecodable body: {msg}",
                u16::from(response.status())
            )),
            other => other,
        })
    }
}
