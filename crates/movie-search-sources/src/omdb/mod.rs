pub mod client;
pub mod api;

pub use client::OmdbClient;
pub use api::DEFAULT_BASE_URL;
