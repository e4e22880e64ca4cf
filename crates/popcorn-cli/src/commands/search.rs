use super::context::AppContext;
use super::spinner::FetchSpinner;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use movie_search_core::{QueryFetcher, MIN_QUERY_CHARS};
use movie_search_models::FetchState;

pub async fn run_search(ctx: &AppContext, query: String, output: &Output) -> Result<()> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_CHARS {
        output.warn(format!("Type at least {} characters to search", MIN_QUERY_CHARS));
        return Ok(());
    }

    let mut fetcher = QueryFetcher::new(ctx.provider(output)?);
    if fetcher.observe(query).is_loading() {
        let spinner = FetchSpinner::start(format!("Searching for \"{}\"...", query), output.is_quiet());
        fetcher.settle().await;
        spinner.finish();
    }

    match fetcher.state() {
        FetchState::Ready(movies) => {
            output.movies(&movies);
            Ok(())
        }
        FetchState::Failed(e) => {
            tracing::debug!(query = %query, error = %e, "Search failed");
            Err(eyre!("{}", e.user_message()))
        }
        FetchState::Idle | FetchState::Loading => Err(eyre!("Search did not complete")),
    }
}
