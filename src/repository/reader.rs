//! Package Repository Reader - Loads a knowledge package definition from disk
//!
//! A package repository is a directory holding a `knowledge-package.json`
//! descriptor, the metadata documents it references and the files to upload.
//!
//! ```json
//! {
//!   "knowledge_package": {"metadata_file": "package.json", "options": {"include_doi": true}},
//!   "resources": [
//!     {"metadata_file": "resources/dem.json", "files": ["data/dem.tif"]}
//!   ]
//! }
//! ```

use crate::core::error::LoaderError;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Marker contained in the descriptor file name
pub const DESCRIPTOR_MARKER: &str = "knowledge-package.json";

/// Per-element loading options
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ElementOptions {
    /// Reserve a DOI for the element once its files are uploaded
    pub include_doi: bool,
}

#[derive(Debug, Deserialize)]
struct PackageDescriptor {
    knowledge_package: ElementDescriptor,
    #[serde(default)]
    resources: Vec<ElementDescriptor>,
}

#[derive(Debug, Deserialize)]
struct ElementDescriptor {
    metadata_file: PathBuf,
    #[serde(default)]
    files: Vec<PathBuf>,
    #[serde(default)]
    options: ElementOptions,
}

/// A package or resource ready to be loaded
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Metadata document, resolved against the repository directory
    pub metadata_file: PathBuf,
    /// Files to upload, resolved against the repository directory
    pub files: Vec<PathBuf>,
    pub options: ElementOptions,
    /// Parsed content of `metadata_file`
    pub metadata: Value,
}

/// The knowledge package and its resources, in descriptor order
#[derive(Debug, Clone, PartialEq)]
pub struct PackageDefinition {
    pub knowledge_package: Element,
    pub resources: Vec<Element>,
}

impl PackageDefinition {
    /// Number of files across the package and all resources
    pub fn file_count(&self) -> usize {
        self.knowledge_package.files.len()
            + self.resources.iter().map(|r| r.files.len()).sum::<usize>()
    }
}

/// Locate the descriptor file in a repository directory
///
/// Entries are inspected in file name order and the first regular file whose
/// name contains [`DESCRIPTOR_MARKER`] wins.
pub fn find_descriptor(repository: &Path) -> Result<PathBuf, LoaderError> {
    let entries = fs::read_dir(repository).map_err(|source| LoaderError::Io {
        path: repository.to_path_buf(),
        source,
    })?;

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.contains(DESCRIPTOR_MARKER))
        })
        .collect();
    candidates.sort();

    candidates
        .into_iter()
        .next()
        .ok_or_else(|| LoaderError::DescriptorNotFound {
            path: repository.to_path_buf(),
            marker: DESCRIPTOR_MARKER,
        })
}

/// Parse and load a package repository
pub fn load_package_repository(repository: &Path) -> Result<PackageDefinition, LoaderError> {
    let descriptor_path = find_descriptor(repository)?;
    debug!(descriptor = %descriptor_path.display(), "Found package descriptor");

    let descriptor: PackageDescriptor = read_json(&descriptor_path)?;

    let knowledge_package = load_element(repository, descriptor.knowledge_package)?;
    let resources = descriptor
        .resources
        .into_iter()
        .map(|resource| load_element(repository, resource))
        .collect::<Result<Vec<_>, _>>()?;

    let definition = PackageDefinition {
        knowledge_package,
        resources,
    };

    info!(
        repository = %repository.display(),
        resources = definition.resources.len(),
        files = definition.file_count(),
        "Loaded package repository"
    );

    Ok(definition)
}

fn load_element(repository: &Path, descriptor: ElementDescriptor) -> Result<Element, LoaderError> {
    let metadata_file = repository.join(&descriptor.metadata_file);
    let files: Vec<PathBuf> = descriptor
        .files
        .iter()
        .map(|file| repository.join(file))
        .collect();

    ensure_file(&metadata_file, "metadata file")?;
    for file in &files {
        ensure_file(file, "resource file")?;
    }

    let metadata: Value = read_json(&metadata_file)?;
    if !metadata.is_object() {
        return Err(LoaderError::InvalidRepository {
            message: format!(
                "metadata file {} must contain a JSON object",
                metadata_file.display()
            ),
        });
    }

    Ok(Element {
        metadata_file,
        files,
        options: descriptor.options,
        metadata,
    })
}

fn ensure_file(path: &Path, what: &str) -> Result<(), LoaderError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(LoaderError::InvalidRepository {
            message: format!("{} does not exist: {}", what, path.display()),
        })
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, LoaderError> {
    let content = fs::read_to_string(path).map_err(|source| LoaderError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| LoaderError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn sample_repository() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();

        write(
            dir,
            "knowledge-package.json",
            &json!({
                "knowledge_package": {
                    "metadata_file": "pkg.json",
                    "options": {"include_doi": true}
                },
                "resources": [
                    {"metadata_file": "resources/res1.json", "files": ["data/res1.csv"]},
                    {"metadata_file": "resources/res2.json"}
                ]
            })
            .to_string(),
        );
        write(dir, "pkg.json", r#"{"metadata": {"title": "Package"}}"#);
        write(dir, "resources/res1.json", r#"{"metadata": {"title": "One"}}"#);
        write(dir, "resources/res2.json", r#"{"metadata": {"title": "Two"}}"#);
        write(dir, "data/res1.csv", "a,b\n1,2\n");

        temp_dir
    }

    #[test]
    fn test_load_package_repository() {
        let temp_dir = sample_repository();
        let dir = temp_dir.path();

        let definition = load_package_repository(dir).unwrap();

        let package = &definition.knowledge_package;
        assert_eq!(package.metadata_file, dir.join("pkg.json"));
        assert!(package.files.is_empty());
        assert!(package.options.include_doi);
        assert_eq!(package.metadata["metadata"]["title"], "Package");

        assert_eq!(definition.resources.len(), 2);
        assert_eq!(definition.resources[0].files, vec![dir.join("data/res1.csv")]);
        assert_eq!(definition.resources[0].metadata["metadata"]["title"], "One");
        assert_eq!(definition.resources[1].metadata["metadata"]["title"], "Two");
        assert!(!definition.resources[1].options.include_doi);
        assert_eq!(definition.file_count(), 1);
    }

    #[test]
    fn test_missing_descriptor() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "pkg.json", "{}");

        let error = load_package_repository(temp_dir.path()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_descriptor_name_only_needs_marker() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        write(dir, "b-knowledge-package.json", "{}");
        write(dir, "a-knowledge-package.json", "{}");
        fs::create_dir(dir.join("0-knowledge-package.json")).unwrap();

        let descriptor = find_descriptor(dir).unwrap();
        assert_eq!(descriptor, dir.join("a-knowledge-package.json"));
    }

    #[test]
    fn test_missing_metadata_file() {
        let temp_dir = sample_repository();
        fs::remove_file(temp_dir.path().join("resources/res2.json")).unwrap();

        let error = load_package_repository(temp_dir.path()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Validation);
        assert!(error.to_string().contains("res2.json"));
    }

    #[test]
    fn test_missing_resource_file() {
        let temp_dir = sample_repository();
        fs::remove_file(temp_dir.path().join("data/res1.csv")).unwrap();

        let error = load_package_repository(temp_dir.path()).unwrap_err();
        assert_eq!(error.code(), "INVALID_REPOSITORY");
        assert!(error.to_string().contains("res1.csv"));
    }

    #[test]
    fn test_descriptor_without_resources() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        write(
            dir,
            "knowledge-package.json",
            r#"{"knowledge_package": {"metadata_file": "pkg.json"}}"#,
        );
        write(dir, "pkg.json", "{}");

        let definition = load_package_repository(dir).unwrap();
        assert!(definition.resources.is_empty());
    }

    #[test]
    fn test_invalid_descriptor_json() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "knowledge-package.json", "{not json");

        let error = load_package_repository(temp_dir.path()).unwrap_err();
        assert_eq!(error.code(), "INVALID_JSON");
        assert_eq!(error.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_metadata_must_be_object() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        write(
            dir,
            "knowledge-package.json",
            r#"{"knowledge_package": {"metadata_file": "pkg.json"}, "resources": []}"#,
        );
        write(dir, "pkg.json", "[1, 2]");

        let error = load_package_repository(dir).unwrap_err();
        assert_eq!(error.code(), "INVALID_REPOSITORY");
    }
}
