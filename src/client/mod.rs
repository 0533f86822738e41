pub mod api;
pub mod transport;

pub use api::KnowledgeHubApi;
pub use transport::HttpTransport;
