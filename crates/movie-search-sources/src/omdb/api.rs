use crate::error::ProviderError;
use movie_search_models::{MovieDetails, MovieSummary};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

// OMDb API base URL
pub const DEFAULT_BASE_URL: &str = "https://www.omdbapi.com/";

/// `"Response": "False"` marks an empty result, whatever the HTTP status
fn is_not_found(body: &Value) -> bool {
    body.get("Response").and_then(Value::as_str) == Some("False")
}

async fn get_json(
    client: &Client,
    base_url: &str,
    api_key: &str,
    param: (&str, &str),
) -> Result<Value, ProviderError> {
    let response = client
        .get(base_url)
        .query(&[("apikey", api_key), param])
        .header("Accept", "application/json")
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        return Err(ProviderError::Transport(format!("{} - {}", status, error_text)));
    }

    let text = response.text().await?;
    serde_json::from_str(&text)
        .map_err(|e| ProviderError::Transport(format!("undecodable response body: {}", e)))
}

/// Search titles by free text
pub async fn search_movies(
    client: &Client,
    base_url: &str,
    api_key: &str,
    query: &str,
) -> Result<Vec<MovieSummary>, ProviderError> {
    let body = get_json(client, base_url, api_key, ("s", query)).await?;

    if is_not_found(&body) {
        debug!(query, error = ?body.get("Error"), "Provider reported no results");
        return Err(ProviderError::NotFound);
    }

    let rows = match body.get("Search") {
        Some(Value::Array(rows)) => rows,
        _ => {
            warn!(query, "Search response has no result array, treating as empty");
            return Ok(Vec::new());
        }
    };

    let mut results = Vec::with_capacity(rows.len());
    for row in rows {
        match serde_json::from_value::<MovieSummary>(row.clone()) {
            Ok(summary) => results.push(summary),
            Err(e) => debug!(query, error = %e, "Skipping malformed search row"),
        }
    }
    Ok(results)
}

/// Fetch the full record for one identifier
pub async fn get_movie_details(
    client: &Client,
    base_url: &str,
    api_key: &str,
    id: &str,
) -> Result<MovieDetails, ProviderError> {
    let body = get_json(client, base_url, api_key, ("i", id)).await?;

    if is_not_found(&body) {
        debug!(id, error = ?body.get("Error"), "Provider reported unknown id");
        return Err(ProviderError::NotFound);
    }

    let mut details = match serde_json::from_value::<MovieDetails>(body) {
        Ok(details) => details,
        Err(e) => {
            warn!(id, error = %e, "Malformed detail payload, using an empty record");
            MovieDetails::default()
        }
    };
    if details.id.is_empty() {
        details.id = id.to_string();
    }
    Ok(details)
}
