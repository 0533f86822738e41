//! Configuration for a loader run
//!
//! Values come from the command line (with environment fallbacks handled by
//! the CLI parser); this module only holds and validates them.

use crate::core::error::LoaderError;
use reqwest::Url;
use secrecy::SecretString;
use std::time::Duration;

/// Per-request timeout used when none is configured
pub const DEFAULT_TIMEOUT_SECS: u64 = 12;

/// Settings for the package loader
#[derive(Debug)]
pub struct LoaderConfig {
    /// Base URL of the package API (e.g. `https://127.0.0.1:5000/api/packages`)
    pub package_api: String,

    /// Base URL of the record API (e.g. `https://127.0.0.1:5000/api/records`)
    pub record_api: String,

    /// Personal access token
    pub access_token: Option<SecretString>,

    /// Timeout applied to every request
    pub timeout: Duration,

    /// Accept invalid TLS certificates (development servers)
    pub accept_invalid_certs: bool,
}

impl LoaderConfig {
    pub fn new(package_api: impl Into<String>, record_api: impl Into<String>) -> Self {
        Self {
            package_api: package_api.into(),
            record_api: record_api.into(),
            access_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            accept_invalid_certs: false,
        }
    }

    /// Set the access token; empty strings count as no token
    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token
            .filter(|t| !t.is_empty())
            .map(|t| SecretString::new(t.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Check both endpoints and the timeout
    pub fn validate(&self) -> Result<(), LoaderError> {
        validate_endpoint("package_api", &self.package_api)?;
        validate_endpoint("record_api", &self.record_api)?;

        if self.timeout.is_zero() {
            return Err(LoaderError::InvalidConfig {
                field: "timeout",
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

fn validate_endpoint(field: &'static str, value: &str) -> Result<(), LoaderError> {
    let url = Url::parse(value).map_err(|e| LoaderError::InvalidConfig {
        field,
        message: format!("`{}` is not a valid URL: {}", value, e),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(LoaderError::InvalidConfig {
            field,
            message: format!("unsupported scheme `{}`", scheme),
        }),
    }
}
