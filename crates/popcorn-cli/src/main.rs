use clap::{ArgAction, Parser, Subcommand};
use commands::context::AppContext;
use commands::{clear, config, details, interactive, search, watched};
use movie_search_config::PathManager;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "popcorn")]
#[command(about = "Search movies, look up details and keep a list of what you've watched")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the catalog by title
    Search {
        /// Title to search for (at least two characters)
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Show full details of one movie
    Details {
        /// IMDb id, e.g. tt1375666
        id: String,
    },
    /// Manage your watched list
    Watched {
        #[command(subcommand)]
        cmd: Option<WatchedCommands>,
    },
    /// Show or change configuration
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommands>,
    },
    /// Clear stored data
    #[command(long_about = "Clear stored data. Use --watched to delete your watched list, --credentials to remove the stored API key, or --all for both.")]
    Clear {
        /// Clear the watched list and stored credentials
        #[arg(long, action = ArgAction::SetTrue)]
        all: bool,

        /// Clear the watched list
        #[arg(long, action = ArgAction::SetTrue)]
        watched: bool,

        /// Clear stored credentials
        #[arg(long, action = ArgAction::SetTrue)]
        credentials: bool,
    },
    /// Interactive search session (default)
    Interactive,
}

#[derive(Subcommand)]
pub enum WatchedCommands {
    /// List watched movies in the order they were added
    List,
    /// Show count and average ratings and runtime
    Summary,
    /// Rate a movie and add it to the list
    Add {
        /// IMDb id, e.g. tt1375666
        id: String,

        /// Your rating from 1 to 10 (prompts if omitted)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=10))]
        rating: Option<u8>,
    },
    /// Remove a movie from the list
    Remove {
        id: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (masks the API key)
    Show {
        /// Show the API key unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Store the OMDb API key
    SetKey {
        /// API key (if not provided, will prompt)
        #[arg(long)]
        key: Option<String>,
    },
    /// Print the config file location
    Path,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Interactive);
    let output = output::Output::new(cli.output, cli.quiet);
    let paths = PathManager::default();

    // The interactive screen owns the terminal, so its logs go to a file
    let logging_ready = if matches!(command, Commands::Interactive) {
        logging::init_file_logging(cli.verbose, cli.quiet, &paths.session_log_file())
    } else {
        logging::init_logging(cli.verbose, cli.quiet)
    };
    logging_ready.map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let ctx = AppContext::load(paths)?;

    match command {
        Commands::Search { query } => search::run_search(&ctx, query.join(" "), &output).await,
        Commands::Details { id } => details::run_details(&ctx, id, &output).await,
        Commands::Watched { cmd } => {
            watched::run_watched(&ctx, cmd.unwrap_or(WatchedCommands::List), &output).await
        }
        Commands::Config { cmd } => {
            config::run_config(&ctx, cmd.unwrap_or(ConfigCommands::Show { full: false }), &output).await
        }
        Commands::Clear { all, watched, credentials } => {
            clear::run_clear(&ctx, all, watched, credentials, &output).await
        }
        Commands::Interactive => interactive::run_interactive(&ctx, &output).await,
    }
}
