pub mod config;
pub mod error;
pub mod record;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use config::*;
pub use error::*;
pub use record::*;
pub use traits::*;
