//! Knowledge Hub API client
//!
//! Translates package operations into calls on two REST endpoints: the
//! package endpoint, where knowledge packages are created, and the record
//! endpoint, where resources are created. After creation every operation
//! follows the links of the latest [`Record`].

use crate::core::error::LoaderError;
use crate::core::record::{Link, Record};
use crate::core::traits::{ElementType, Transport};
use reqwest::Method;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// API client for packages and resources
#[derive(Debug)]
pub struct KnowledgeHubApi<T: Transport> {
    transport: T,
    package_api: String,
    record_api: String,
}

impl<T: Transport> KnowledgeHubApi<T> {
    pub fn new(transport: T, package_api: impl Into<String>, record_api: impl Into<String>) -> Self {
        Self {
            transport,
            package_api: package_api.into(),
            record_api: record_api.into(),
        }
    }

    pub fn package_api(&self) -> &str {
        &self.package_api
    }

    pub fn record_api(&self) -> &str {
        &self.record_api
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Create a draft on the endpoint matching `element_type`
    pub fn create_draft(
        &self,
        metadata: &Value,
        element_type: ElementType,
    ) -> Result<Record, LoaderError> {
        let address = match element_type {
            ElementType::Package => &self.package_api,
            ElementType::Resource => &self.record_api,
        };

        let record = Record::from_document(self.transport.request(
            Method::POST,
            address,
            Some(metadata),
        )?)?;

        info!(kind = %element_type, id = record.id().unwrap_or("-"), "Draft created");
        Ok(record)
    }

    /// Upload and commit `files` to a draft, then reload it
    ///
    /// The `files` link is required even when there is nothing to upload.
    /// Every registered file name must come back as an upload entry and be
    /// committed; anything left pending is an `IncompleteUpload`.
    pub fn upload_files(
        &self,
        record: &Record,
        files: &[PathBuf],
        element_type: ElementType,
    ) -> Result<Record, LoaderError> {
        let address = record.links().require(Link::Files)?;
        if !files.is_empty() {
            self.upload_and_commit(files, address)?;

            info!(
                kind = %element_type,
                id = record.id().unwrap_or("-"),
                files = files.len(),
                "Files uploaded"
            );
        }

        self.load_element(record.links().require(Link::SelfLink)?)
    }

    /// Reserve a DOI for a draft
    pub fn reserve_doi(&self, record: &Record) -> Result<Record, LoaderError> {
        let address = record.links().require(Link::ReserveDoi)?;
        let reserved = Record::from_document(self.transport.request(Method::POST, address, None)?)?;

        info!(id = reserved.id().unwrap_or("-"), "DOI reserved");
        Ok(reserved)
    }

    /// Associate resources to the package context and to the current
    /// package version, then reload the package
    pub fn associate_package_resources(
        &self,
        package: &Record,
        resources: &[Record],
    ) -> Result<Record, LoaderError> {
        let context_address = package.links().require(Link::ContextAssociate)?;
        let version_address = package.links().require(Link::Resources)?;
        let self_address = package.links().require(Link::SelfLink)?;

        let records = resources
            .iter()
            .map(|resource| resource.require_id().map(|id| json!({ "id": id })))
            .collect::<Result<Vec<_>, _>>()?;

        self.transport.request(
            Method::POST,
            context_address,
            Some(&json!({ "records": records })),
        )?;
        debug!(resources = records.len(), "Resources associated to the package context");

        self.transport.request(
            Method::POST,
            version_address,
            Some(&json!({ "resources": records })),
        )?;
        debug!(resources = records.len(), "Resources associated to the package version");

        let package = self.load_element(self_address)?;
        info!(
            id = package.id().unwrap_or("-"),
            resources = records.len(),
            "Package and resources associated"
        );
        Ok(package)
    }

    /// Publish a package or resource
    pub fn publish(&self, record: &Record) -> Result<Record, LoaderError> {
        let address = record.links().require(Link::Publish)?;
        let published = Record::from_document(self.transport.request(Method::POST, address, None)?)?;

        info!(id = published.id().unwrap_or("-"), "Published");
        Ok(published)
    }

    fn load_element(&self, address: &str) -> Result<Record, LoaderError> {
        Record::from_document(self.transport.request(Method::GET, address, None)?)
    }

    fn upload_and_commit(&self, files: &[PathBuf], address: &str) -> Result<(), LoaderError> {
        let mut pending: BTreeMap<String, &Path> = BTreeMap::new();
        for file in files {
            let key = file_key(file)?;
            if pending.insert(key.clone(), file.as_path()).is_some() {
                return Err(LoaderError::InvalidRepository {
                    message: format!("file name `{}` is used more than once", key),
                });
            }
        }

        let keys: Vec<Value> = files
            .iter()
            .map(|file| file_key(file).map(|key| json!({ "key": key })))
            .collect::<Result<_, _>>()?;

        let registration = self
            .transport
            .request(Method::POST, address, Some(&Value::Array(keys)))?;

        let entries = registration
            .get("entries")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for entry in entries {
            let key = entry
                .get("key")
                .and_then(Value::as_str)
                .ok_or_else(|| LoaderError::MalformedRecord {
                    message: "file entry has no `key`".to_string(),
                })?;
            let path = *pending
                .get(key)
                .ok_or_else(|| LoaderError::UnexpectedUploadEntry {
                    key: key.to_string(),
                })?;

            let content_address = entry_link(entry, "content")?;
            let commit_address = entry_link(entry, "commit")?;

            self.transport.upload(Method::PUT, content_address, path)?;
            self.transport.request(Method::POST, commit_address, None)?;
            debug!(key, "File committed");

            pending.remove(key);
        }

        if !pending.is_empty() {
            return Err(LoaderError::IncompleteUpload {
                pending: pending.into_keys().collect(),
            });
        }

        Ok(())
    }
}

fn file_key(file: &Path) -> Result<String, LoaderError> {
    file.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| LoaderError::InvalidRepository {
            message: format!("invalid file name: {}", file.display()),
        })
}

fn entry_link<'a>(entry: &'a Value, link: &'static str) -> Result<&'a str, LoaderError> {
    entry
        .get("links")
        .and_then(|links| links.get(link))
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .ok_or(LoaderError::MissingLink { link })
}
