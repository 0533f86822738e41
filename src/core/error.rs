//! Error handling for package loading
//!
//! Every failure aborts the current run. Variants are grouped into a small
//! taxonomy (`ErrorKind`) and carry a stable code plus recovery hints for
//! the command-line output.

use std::path::PathBuf;
use thiserror::Error;

/// Broad category of a [`LoaderError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing local input, invalid element type, missing link
    Validation,
    /// The package descriptor is absent
    NotFound,
    /// An authenticated call was attempted without an access token
    UnsetToken,
    /// Non-success HTTP status or network failure
    Transport,
    /// Registered files and committed files do not match
    Consistency,
}

/// Main error type for package loading operations
#[derive(Error, Debug)]
pub enum LoaderError {
    // Local repository errors
    #[error("package repository must be a valid directory: {}", .path.display())]
    NotADirectory { path: PathBuf },

    #[error("`{marker}` not found in {}", .path.display())]
    DescriptorNotFound { path: PathBuf, marker: &'static str },

    #[error("invalid package repository: {message}")]
    InvalidRepository { message: String },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // Remote record errors
    #[error("invalid draft type `{value}` (expected `package` or `resource`)")]
    InvalidElementType { value: String },

    #[error("metadata does not have the `{link}` link required for this operation")]
    MissingLink { link: &'static str },

    #[error("remote record is malformed: {message}")]
    MalformedRecord { message: String },

    // Configuration errors
    #[error("invalid configuration for `{field}`: {message}")]
    InvalidConfig { field: &'static str, message: String },

    #[error("access token is not defined yet, provide one with --access-token")]
    UnsetToken,

    // Network errors
    #[error("{method} {url} failed: {message}")]
    Transport {
        method: String,
        url: String,
        status: Option<u16>,
        message: String,
    },

    #[error("{method} {url} returned an unreadable body: {message}")]
    InvalidResponse {
        method: String,
        url: String,
        message: String,
    },

    // Upload consistency errors
    #[error("upload returned an entry for `{key}` which was not pending")]
    UnexpectedUploadEntry { key: String },

    #[error("error to upload the data, files not committed: {}", .pending.join(", "))]
    IncompleteUpload { pending: Vec<String> },
}

impl LoaderError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DescriptorNotFound { .. } => ErrorKind::NotFound,
            Self::UnsetToken => ErrorKind::UnsetToken,
            Self::Transport { .. } | Self::InvalidResponse { .. } => ErrorKind::Transport,
            Self::UnexpectedUploadEntry { .. } | Self::IncompleteUpload { .. } => {
                ErrorKind::Consistency
            }
            Self::NotADirectory { .. }
            | Self::InvalidRepository { .. }
            | Self::Io { .. }
            | Self::Json { .. }
            | Self::InvalidElementType { .. }
            | Self::MissingLink { .. }
            | Self::MalformedRecord { .. }
            | Self::InvalidConfig { .. } => ErrorKind::Validation,
        }
    }

    /// HTTP status of a failed remote call, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// Get error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotADirectory { .. } => "NOT_A_DIRECTORY",
            Self::DescriptorNotFound { .. } => "DESCRIPTOR_NOT_FOUND",
            Self::InvalidRepository { .. } => "INVALID_REPOSITORY",
            Self::Io { .. } => "IO_ERROR",
            Self::Json { .. } => "INVALID_JSON",
            Self::InvalidElementType { .. } => "INVALID_ELEMENT_TYPE",
            Self::MissingLink { .. } => "MISSING_LINK",
            Self::MalformedRecord { .. } => "MALFORMED_RECORD",
            Self::InvalidConfig { .. } => "INVALID_CONFIG",
            Self::UnsetToken => "UNSET_TOKEN",
            Self::Transport { .. } => "TRANSPORT_ERROR",
            Self::InvalidResponse { .. } => "INVALID_RESPONSE",
            Self::UnexpectedUploadEntry { .. } => "UNEXPECTED_UPLOAD_ENTRY",
            Self::IncompleteUpload { .. } => "INCOMPLETE_UPLOAD",
        }
    }

    /// Get suggested actions for this error
    pub fn suggested_actions(&self) -> Vec<&'static str> {
        match self {
            Self::NotADirectory { .. } => {
                vec!["Check the --knowledge-package-repository path"]
            }
            Self::DescriptorNotFound { .. } => vec![
                "Add a knowledge-package.json file to the repository directory",
                "Check the --knowledge-package-repository path",
            ],
            Self::InvalidRepository { .. } | Self::Io { .. } => vec![
                "Check the paths listed in knowledge-package.json",
                "Paths are resolved relative to the repository directory",
            ],
            Self::Json { .. } => vec!["Fix the JSON syntax of the reported file"],
            Self::InvalidElementType { .. } => vec!["Use `package` or `resource`"],
            Self::MissingLink { .. } | Self::MalformedRecord { .. } => vec![
                "Check that the API URLs point to the packages and records endpoints",
                "Check that the access token grants access to the draft",
            ],
            Self::InvalidConfig { .. } => vec!["Use absolute http(s) URLs for both APIs"],
            Self::UnsetToken => vec![
                "Pass --access-token",
                "Or set the KNOWLEDGE_HUB_ACCESS_TOKEN environment variable",
            ],
            Self::Transport { status, .. } => match status {
                Some(401) | Some(403) => vec![
                    "Check that the access token is valid and has not expired",
                    "Check that the token has the deposit scope",
                ],
                Some(_) => vec![
                    "Check the metadata against the service schema",
                    "Drafts created before the failure remain on the service",
                ],
                None => vec![
                    "Check the network connection and the API URLs",
                    "Use --insecure for development servers with self-signed certificates",
                ],
            },
            Self::InvalidResponse { .. } => {
                vec!["Check that the API URLs point to a JSON REST API"]
            }
            Self::UnexpectedUploadEntry { .. } | Self::IncompleteUpload { .. } => vec![
                "Inspect the draft files on the service",
                "Drafts created before the failure remain on the service",
            ],
        }
    }
}
