use super::context::AppContext;
use super::prompts;
use super::spinner;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::fs;

pub async fn run_clear(ctx: &AppContext, all: bool, watched: bool, credentials: bool, output: &Output) -> Result<()> {
    if !(all || watched || credentials) {
        output.warn("No clear option specified. Use --watched, --credentials, or --all");
        output.info("\nExample: popcorn clear --watched");
        return Ok(());
    }

    if (all || watched) && spinner::is_interactive()
        && !prompts::prompt_yes_no("This deletes your watched list and ratings. Continue?", false)?
    {
        output.info("Nothing cleared");
        return Ok(());
    }

    if all || watched {
        clear_watched(ctx, output)?;
    }
    if all || credentials {
        clear_credentials(ctx, output)?;
    }
    if all {
        output.success("Watched list and credentials cleared");
    }
    Ok(())
}

fn clear_watched(ctx: &AppContext, output: &Output) -> Result<()> {
    let mut list = ctx.watched_list()?;
    let count = list.len();
    list.clear()?;
    output.success(format!("Cleared watched list ({} movies)", count));
    Ok(())
}

fn clear_credentials(ctx: &AppContext, output: &Output) -> Result<()> {
    let credentials_file = ctx.paths.credentials_file();

    if credentials_file.exists() {
        fs::remove_file(&credentials_file).map_err(|e| {
            eyre!("Failed to remove credentials file at {}: {}", credentials_file.display(), e)
        })?;
        output.success(format!("Cleared credentials: {}", credentials_file.display()));
    } else {
        output.info("No credentials file found to clear");
    }
    Ok(())
}
