pub mod error;
pub mod traits;
pub mod omdb;

pub use error::ProviderError;
pub use traits::MovieProvider;
pub use omdb::{OmdbClient, DEFAULT_BASE_URL};
