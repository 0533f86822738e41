//! Core traits and types for package loading
//!
//! This module defines the element types understood by the service and the
//! transport abstraction every remote operation goes through.

use crate::core::error::LoaderError;
use reqwest::Method;
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

// ============================================================================
// Element Types
// ============================================================================

/// Kind of element being loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    /// The knowledge package itself, created on the package endpoint
    Package,
    /// A resource associated with the package, created on the record endpoint
    Resource,
}

impl ElementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Package => "package",
            Self::Resource => "resource",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementType {
    type Err = LoaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "package" => Ok(Self::Package),
            "resource" => Ok(Self::Resource),
            other => Err(LoaderError::InvalidElementType {
                value: other.to_string(),
            }),
        }
    }
}

// ============================================================================
// Transport Trait
// ============================================================================

/// Authenticated access to the remote service
///
/// Implementations check the response status and decode the body as JSON
/// (an empty body decodes to `Value::Null`). Nothing is retried.
pub trait Transport {
    /// Send a request with an optional JSON body
    fn request(&self, method: Method, url: &str, body: Option<&Value>)
    -> Result<Value, LoaderError>;

    /// Send the content of a local file as the request body
    fn upload(&self, method: Method, url: &str, file: &Path) -> Result<Value, LoaderError>;
}
