//! Blocking HTTP transport
//!
//! Every request carries `Authorization: Bearer <token>` from the
//! [`TokenStore`]; a request without a token fails before anything is sent.

use crate::core::config::LoaderConfig;
use crate::core::error::LoaderError;
use crate::core::traits::Transport;
use crate::security::TokenStore;
use reqwest::Method;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use secrecy::ExposeSecret;
use serde_json::Value;
use std::fs::File;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Longest response body quoted in an error message
const MAX_ERROR_BODY: usize = 512;

/// [`Transport`] over `reqwest`'s blocking client
#[derive(Debug)]
pub struct HttpTransport {
    client: Client,
    tokens: TokenStore,
}

impl HttpTransport {
    pub fn new(
        tokens: TokenStore,
        timeout: Duration,
        accept_invalid_certs: bool,
    ) -> Result<Self, LoaderError> {
        let client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| LoaderError::InvalidConfig {
                field: "http_client",
                message: e.to_string(),
            })?;

        Ok(Self { client, tokens })
    }

    /// Transport configured from a [`LoaderConfig`], taking its token
    pub fn from_config(config: &mut LoaderConfig) -> Result<Self, LoaderError> {
        let tokens = TokenStore::new(config.access_token.take());
        Self::new(tokens, config.timeout, config.accept_invalid_certs)
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Request builder with the authorization header attached
    pub fn authorized(&self, method: Method, url: &str) -> Result<RequestBuilder, LoaderError> {
        let token = self.tokens.get_token()?;
        Ok(self
            .client
            .request(method, url)
            .header(ACCEPT, "application/json")
            .bearer_auth(token.expose_secret()))
    }

    fn execute(
        &self,
        method: &Method,
        url: &str,
        builder: RequestBuilder,
    ) -> Result<Value, LoaderError> {
        debug!(%method, url, "Sending request");

        let response = builder.send().map_err(|e| LoaderError::Transport {
            method: method.to_string(),
            url: url.to_string(),
            status: None,
            message: self.tokens.mask_in(&e.to_string()),
        })?;

        self.read_response(method, url, response)
    }

    fn read_response(
        &self,
        method: &Method,
        url: &str,
        response: Response,
    ) -> Result<Value, LoaderError> {
        let status = response.status();
        let body = response.text().map_err(|e| LoaderError::InvalidResponse {
            method: method.to_string(),
            url: url.to_string(),
            message: e.to_string(),
        })?;

        debug!(%method, url, status = status.as_u16(), "Received response");

        if !status.is_success() {
            return Err(LoaderError::Transport {
                method: method.to_string(),
                url: url.to_string(),
                status: Some(status.as_u16()),
                message: format!("HTTP {}: {}", status, self.tokens.mask_in(&truncate(&body))),
            });
        }

        parse_body(&body).map_err(|e| LoaderError::InvalidResponse {
            method: method.to_string(),
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

impl Transport for HttpTransport {
    fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Value, LoaderError> {
        let mut builder = self.authorized(method.clone(), url)?;
        if let Some(body) = body {
            builder = builder.json(body);
        }

        self.execute(&method, url, builder)
    }

    fn upload(&self, method: Method, url: &str, file: &Path) -> Result<Value, LoaderError> {
        let builder = self.authorized(method.clone(), url)?;
        let content = File::open(file).map_err(|source| LoaderError::Io {
            path: file.to_path_buf(),
            source,
        })?;

        let builder = builder
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(content);

        self.execute(&method, url, builder)
    }
}

/// Empty bodies decode to `null`
fn parse_body(body: &str) -> Result<Value, serde_json::Error> {
    if body.trim().is_empty() {
        Ok(Value::Null)
    } else {
        serde_json::from_str(body)
    }
}

fn truncate(body: &str) -> String {
    let body = body.trim();
    if body.chars().count() <= MAX_ERROR_BODY {
        body.to_string()
    } else {
        let head: String = body.chars().take(MAX_ERROR_BODY).collect();
        format!("{}...", head)
    }
}
