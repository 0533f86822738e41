pub mod reader;

pub use reader::{
    DESCRIPTOR_MARKER, Element, ElementOptions, PackageDefinition, find_descriptor,
    load_package_repository,
};
