use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::movie::MovieId;

/// A rated title in the user's watched list.
///
/// Field names on the wire match the layout the list has always been stored
/// with, so an existing store keeps loading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchedEntry {
    #[serde(rename = "imdbID")]
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub year: String,
    #[serde(rename = "poster", default)]
    pub poster_url: Option<String>,
    /// Provider rating; absent when the provider sent something non-numeric
    #[serde(rename = "imdbRating", default)]
    pub external_rating: Option<f64>,
    #[serde(rename = "runtime")]
    pub runtime_minutes: u32,
    #[serde(rename = "userRating")]
    pub user_rating: u8,
    #[serde(rename = "addedAt", default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}
