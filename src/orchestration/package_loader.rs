//! Package Loader - Wires a configuration into a ready-to-use service

use crate::client::api::KnowledgeHubApi;
use crate::client::transport::HttpTransport;
use crate::core::config::LoaderConfig;
use crate::core::error::LoaderError;
use crate::orchestration::loader_service::PackageLoaderService;
use tracing::debug;

/// Entry point to upload and publish complete knowledge packages
///
/// # Examples
///
/// ```no_run
/// use knowledge_package_loader::{LoaderConfig, PackageLoader};
///
/// # fn example() -> Result<(), knowledge_package_loader::LoaderError> {
/// let config = LoaderConfig::new(
///     "https://127.0.0.1:5000/api/packages",
///     "https://127.0.0.1:5000/api/records",
/// )
/// .with_access_token(Some("my-personal-token".to_string()));
///
/// let loader = PackageLoader::new(config)?;
/// let package = loader.service().load_package("./my-package", true)?;
/// println!("Published {}", package.id().unwrap_or("-"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PackageLoader {
    service: PackageLoaderService<HttpTransport>,
}

impl PackageLoader {
    /// Validate the configuration and build the HTTP stack
    pub fn new(mut config: LoaderConfig) -> Result<Self, LoaderError> {
        config.validate()?;

        let transport = HttpTransport::from_config(&mut config)?;
        debug!(
            package_api = %config.package_api,
            record_api = %config.record_api,
            token = transport.tokens().masked().as_deref().unwrap_or("<unset>"),
            "Configured package loader"
        );

        let api = KnowledgeHubApi::new(transport, config.package_api, config.record_api);
        Ok(Self {
            service: PackageLoaderService::new(api),
        })
    }

    pub fn service(&self) -> &PackageLoaderService<HttpTransport> {
        &self.service
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_builds_service() {
        let config = LoaderConfig::new(
            "https://127.0.0.1:5000/api/packages",
            "https://127.0.0.1:5000/api/records",
        )
        .with_access_token(Some("abcdef123456".to_string()));

        let loader = PackageLoader::new(config).unwrap();
        let api = loader.service().api();

        assert_eq!(api.package_api(), "https://127.0.0.1:5000/api/packages");
        assert_eq!(api.record_api(), "https://127.0.0.1:5000/api/records");
        assert_eq!(api.transport().tokens().masked().as_deref(), Some("abc...456"));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = LoaderConfig::new("packages", "records");
        assert_eq!(PackageLoader::new(config).unwrap_err().code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_unset_token_fails_at_first_request() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("knowledge-package.json"),
            r#"{"knowledge_package": {"metadata_file": "pkg.json"}, "resources": []}"#,
        )
        .unwrap();
        std::fs::write(temp_dir.path().join("pkg.json"), "{}").unwrap();

        let config = LoaderConfig::new(
            "http://127.0.0.1:9/api/packages",
            "http://127.0.0.1:9/api/records",
        );
        let loader = PackageLoader::new(config).unwrap();

        let error = loader
            .service()
            .load_package(temp_dir.path(), true)
            .unwrap_err();
        assert!(matches!(error, LoaderError::UnsetToken));
    }
}
