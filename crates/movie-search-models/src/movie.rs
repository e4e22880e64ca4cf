use serde::{Deserialize, Serialize};

/// Provider identifier of a title (an IMDb id such as `tt0133093`)
pub type MovieId = String;

/// One row of a search result, in provider order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieSummary {
    #[serde(rename = "imdbID")]
    pub id: MovieId,
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: String,
    #[serde(rename = "Poster", default)]
    pub poster_url: Option<String>,
}
