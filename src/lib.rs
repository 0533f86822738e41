pub mod client;
pub mod core;
pub mod orchestration;
pub mod repository;
pub mod security;

pub use client::{HttpTransport, KnowledgeHubApi};
pub use self::core::*;
pub use orchestration::{LoadReport, PackageLoader, PackageLoaderService};
pub use repository::{Element, ElementOptions, PackageDefinition, load_package_repository};
pub use security::TokenStore;
