use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use crate::movie::MovieId;

/// Full record for a single title.
///
/// Every field is optional: the payload is free-form text from an external
/// provider and only `id` is needed to key it. Values such as `"N/A"` are kept
/// verbatim; interpretation happens where a number is derived from them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MovieDetails {
    #[serde(rename = "imdbID", default)]
    pub id: MovieId,
    #[serde(rename = "Title", default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(rename = "Year", default, deserialize_with = "lenient_text")]
    pub year: Option<String>,
    #[serde(rename = "Poster", default, deserialize_with = "lenient_text")]
    pub poster: Option<String>,
    #[serde(rename = "Runtime", default, deserialize_with = "lenient_text")]
    pub runtime: Option<String>,
    #[serde(rename = "imdbRating", default, deserialize_with = "lenient_text")]
    pub imdb_rating: Option<String>,
    #[serde(rename = "Plot", default, deserialize_with = "lenient_text")]
    pub plot: Option<String>,
    #[serde(rename = "Released", default, deserialize_with = "lenient_text")]
    pub released: Option<String>,
    #[serde(rename = "Actors", default, deserialize_with = "lenient_text")]
    pub actors: Option<String>,
    #[serde(rename = "Director", default, deserialize_with = "lenient_text")]
    pub director: Option<String>,
    #[serde(rename = "Genre", default, deserialize_with = "lenient_text")]
    pub genre: Option<String>,
}

impl MovieDetails {
    /// Title for display, falling back to the id when the provider sent none
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }
}

/// Accepts strings, numbers and booleans; anything else becomes `None`
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_fields() {
        let json = r#"{"imdbID":"tt0133093","Title":"The Matrix","Runtime":136,"imdbRating":["bad"],"Genre":null}"#;
        let details: MovieDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.title.as_deref(), Some("The Matrix"));
        assert_eq!(details.runtime.as_deref(), Some("136"));
        assert_eq!(details.imdb_rating, None);
        assert_eq!(details.genre, None);
        assert_eq!(details.director, None);
    }

    #[test]
    fn test_display_title_falls_back_to_id() {
        let details = MovieDetails { id: "tt42".to_string(), ..MovieDetails::default() };
        assert_eq!(details.display_title(), "tt42");
    }
}
