//! Orchestration layer for package loading

pub mod loader_service;
pub mod package_loader;

pub use loader_service::{LoadReport, PackageLoaderService};
pub use package_loader::PackageLoader;
