//! Package Loader Service - Main orchestrator for package loading
//!
//! Runs the complete loading workflow:
//! - Reading the package repository
//! - Creating drafts, uploading files and reserving DOIs for the package and
//!   each of its resources
//! - Associating the resources to the package
//! - Publishing the package
//!
//! Each step returns a new [`Record`]; the first failure aborts the run.
//! Drafts created before a failure are left on the service.

use crate::client::api::KnowledgeHubApi;
use crate::core::error::LoaderError;
use crate::core::record::Record;
use crate::core::traits::{ElementType, Transport};
use crate::repository::reader::{Element, load_package_repository};
use chrono::{DateTime, Utc};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::info;

/// Report returned after a loading run
#[derive(Debug, Clone)]
pub struct LoadReport {
    /// Latest package state: the published record when published
    pub package: Record,
    /// Resource records, in descriptor order
    pub resources: Vec<Record>,
    pub published: bool,
    pub started_at: DateTime<Utc>,
    /// Duration in milliseconds
    pub duration: u64,
}

/// High-level API to load and publish packages and their resources
#[derive(Debug)]
pub struct PackageLoaderService<T: Transport> {
    api: KnowledgeHubApi<T>,
}

impl<T: Transport> PackageLoaderService<T> {
    pub fn new(api: KnowledgeHubApi<T>) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &KnowledgeHubApi<T> {
        &self.api
    }

    /// Load a package and its resources, returning the package metadata
    ///
    /// # Arguments
    ///
    /// * `package_repository` - Directory holding `knowledge-package.json`
    /// * `publish` - Publish the package once its resources are associated
    pub fn load_package(
        &self,
        package_repository: impl AsRef<Path>,
        publish: bool,
    ) -> Result<Record, LoaderError> {
        Ok(self.load_package_report(package_repository, publish)?.package)
    }

    /// Same as [`load_package`](Self::load_package), returning the full report
    pub fn load_package_report(
        &self,
        package_repository: impl AsRef<Path>,
        publish: bool,
    ) -> Result<LoadReport, LoaderError> {
        let package_repository = package_repository.as_ref();
        let started_at = Utc::now();
        let start_time = Instant::now();

        if !package_repository.is_dir() {
            return Err(LoaderError::NotADirectory {
                path: package_repository.to_path_buf(),
            });
        }

        let definition = load_package_repository(package_repository)?;

        // 1. Package
        let package = self.load_element(&definition.knowledge_package, ElementType::Package)?;

        // 2. Resources
        let resources = definition
            .resources
            .iter()
            .map(|resource| self.load_element(resource, ElementType::Resource))
            .collect::<Result<Vec<_>, _>>()?;

        // 3. Association
        let package = self.api.associate_package_resources(&package, &resources)?;

        // 4. Publishing
        let package = if publish {
            self.api.publish(&package)?
        } else {
            package
        };

        let duration = duration_millis(start_time.elapsed());
        info!(
            id = package.id().unwrap_or("-"),
            resources = resources.len(),
            published = publish,
            duration_ms = duration,
            "Package loaded"
        );

        Ok(LoadReport {
            package,
            resources,
            published: publish,
            started_at,
            duration,
        })
    }

    fn load_element(
        &self,
        element: &Element,
        element_type: ElementType,
    ) -> Result<Record, LoaderError> {
        info!(
            kind = %element_type,
            metadata_file = %element.metadata_file.display(),
            "Loading element"
        );

        let draft = self.api.create_draft(&element.metadata, element_type)?;
        let uploaded = self.api.upload_files(&draft, &element.files, element_type)?;

        if element.options.include_doi {
            self.api.reserve_doi(&uploaded)
        } else {
            Ok(uploaded)
        }
    }
}

/// Milliseconds in `duration`, saturating at `u64::MAX`
fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
