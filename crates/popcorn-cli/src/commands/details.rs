use super::context::AppContext;
use super::spinner::FetchSpinner;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use movie_search_core::{DetailFetcher, DocumentTitle};
use movie_search_models::{FetchState, MovieDetails};
use movie_search_sources::MovieProvider;
use std::sync::Arc;

/// Loads one record through a [`DetailFetcher`], with a spinner while it loads
pub async fn fetch_details(
    provider: Arc<dyn MovieProvider>,
    title: DocumentTitle,
    id: &str,
    output: &Output,
) -> Result<MovieDetails> {
    let mut fetcher = DetailFetcher::new(provider, title);
    if fetcher.observe(Some(id)).is_loading() {
        let spinner = FetchSpinner::start(format!("Loading {}...", id), output.is_quiet());
        fetcher.settle().await;
        spinner.finish();
    }

    let result = match fetcher.state() {
        FetchState::Ready(details) => Ok(details),
        FetchState::Failed(e) => {
            tracing::debug!(id = %id, error = %e, "Detail request failed");
            Err(eyre!("{}", e.user_message()))
        }
        FetchState::Idle | FetchState::Loading => Err(eyre!("Detail request did not complete")),
    };
    fetcher.release();
    result
}

pub async fn run_details(ctx: &AppContext, id: String, output: &Output) -> Result<()> {
    let provider = ctx.provider(output)?;
    let title = DocumentTitle::new(ctx.config.ui.default_title.clone());
    let details = fetch_details(provider, title, id.trim(), output).await?;

    let rated = ctx.watched_list()?.user_rating_for(&details.id);
    output.details(&details, rated);
    Ok(())
}
