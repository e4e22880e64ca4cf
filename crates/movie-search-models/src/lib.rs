pub mod fetch_state;
pub mod movie;
pub mod movie_details;
pub mod storage_key;
pub mod watched;

pub use fetch_state::{FetchError, FetchState};
pub use movie::{MovieId, MovieSummary};
pub use movie_details::MovieDetails;
pub use storage_key::is_valid_storage_key;
pub use watched::WatchedEntry;
