//! Access token holder with masking capabilities
//!
//! The token for a run is stored once, before any request is sent, and read
//! for every authenticated call. The `secrecy` crate keeps it out of `Debug`
//! output; the masking helpers keep it out of logs and error messages.

use crate::core::error::LoaderError;
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};

/// Holder of the access token used by the transport
///
/// # Examples
///
/// ```
/// use knowledge_package_loader::security::TokenStore;
/// use secrecy::ExposeSecret;
///
/// let store = TokenStore::from_value(Some("my-personal-token".to_string()));
/// assert_eq!(store.get_token().unwrap().expose_secret(), "my-personal-token");
///
/// let empty = TokenStore::from_value(None);
/// assert!(empty.get_token().is_err());
/// ```
#[derive(Debug, Default)]
pub struct TokenStore {
    token: Option<SecretString>,
}

impl TokenStore {
    pub fn new(token: Option<SecretString>) -> Self {
        let token = token.filter(|t| !t.expose_secret().is_empty());
        Self { token }
    }

    /// Store a plain token value; `None` and empty strings leave the store unset
    pub fn from_value(token: Option<String>) -> Self {
        Self::new(token.map(|t| SecretString::new(t.into())))
    }

    /// Token for an authenticated call, or `UnsetToken`
    pub fn get_token(&self) -> Result<&SecretString, LoaderError> {
        self.token.as_ref().ok_or(LoaderError::UnsetToken)
    }

    pub fn is_set(&self) -> bool {
        self.token.is_some()
    }

    /// Masks a token for safe logging
    ///
    /// Shows only the first 3 and last 3 characters for identification purposes.
    /// Tokens shorter than 10 characters are fully masked as "****".
    ///
    /// ```
    /// use knowledge_package_loader::security::TokenStore;
    ///
    /// assert_eq!(TokenStore::mask_token("abcdef123456"), "abc...456");
    /// assert_eq!(TokenStore::mask_token("short"), "****");
    /// ```
    pub fn mask_token(token: &str) -> String {
        if token.chars().count() < 10 {
            return "****".to_string();
        }

        let prefix: String = token.chars().take(3).collect();
        let suffix: String = token.chars().skip(token.chars().count() - 3).collect();
        format!("{}...{}", prefix, suffix)
    }

    /// Masked form of the stored token, for display
    pub fn masked(&self) -> Option<String> {
        self.token
            .as_ref()
            .map(|t| Self::mask_token(t.expose_secret()))
    }

    /// Replaces every occurrence of the stored token in `text`
    pub fn mask_in(&self, text: &str) -> String {
        let Some(token) = &self.token else {
            return text.to_string();
        };

        let token_str = token.expose_secret();
        match Regex::new(&regex::escape(token_str)) {
            Ok(regex) => regex
                .replace_all(text, Self::mask_token(token_str).as_str())
                .to_string(),
            Err(_) => text.to_string(),
        }
    }
}
