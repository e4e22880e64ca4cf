use super::context::AppContext;
use super::details::fetch_details;
use super::prompts;
use crate::output::Output;
use crate::WatchedCommands;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use movie_search_core::{to_watched_entry, DocumentTitle, WatchedError};

pub async fn run_watched(ctx: &AppContext, cmd: WatchedCommands, output: &Output) -> Result<()> {
    match cmd {
        WatchedCommands::List => {
            output.watched(ctx.watched_list()?.entries());
            Ok(())
        }
        WatchedCommands::Summary => {
            output.summary(&ctx.watched_list()?.summary());
            Ok(())
        }
        WatchedCommands::Add { id, rating } => add_watched(ctx, id.trim(), rating, output).await,
        WatchedCommands::Remove { id } => {
            let mut list = ctx.watched_list()?;
            if list.remove(id.trim())? {
                output.success(format!("Removed {} from your watched list", id.trim()));
            } else {
                output.info(format!("{} is not in your watched list", id.trim()));
            }
            Ok(())
        }
    }
}

async fn add_watched(ctx: &AppContext, id: &str, rating: Option<u8>, output: &Output) -> Result<()> {
    let mut list = ctx.watched_list()?;
    if let Some(rated) = list.user_rating_for(id) {
        output.info(format!("You rated this movie {}", rated));
        return Ok(());
    }

    let provider = ctx.provider(output)?;
    let title = DocumentTitle::new(ctx.config.ui.default_title.clone());
    let details = fetch_details(provider, title, id, output).await?;

    let rating = match rating {
        Some(rating) => rating,
        None => {
            output.details(&details, None);
            prompts::prompt_rating("Your rating (1-10)", output)?
        }
    };

    let entry = to_watched_entry(&details, rating).map_err(|e| eyre!("Cannot add {}: {}", id, e))?;
    let title = entry.title.clone();
    match list.add(entry) {
        Ok(()) => {
            output.success(format!("Added \"{}\" with your rating {}", title, rating));
            Ok(())
        }
        Err(WatchedError::AlreadyWatched(_)) => {
            output.info(format!("\"{}\" is already in your watched list", title));
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
