use super::context::AppContext;
use super::spinner;
use crate::output::Output;
use color_eyre::Result;
use movie_search_core::{Change, Session, UiEvent, MIN_QUERY_CHARS};
use movie_search_models::FetchState;
use owo_colors::OwoColorize;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Type anything to search. Commands:
  :open <n|id>   open a result (again to close)
  :close         close the open movie
  :rate <1-10>   rate the open movie
  :add           add the open movie to your watched list
  :rm <id>       remove a movie from your watched list
  :watched       show your watched list
  :key <code>    press a shortcut key (e.g. Escape, Enter)
  :quit          leave";

#[derive(Debug, PartialEq)]
enum ReplCommand {
    Quit,
    Help,
    Watched,
    Open(String),
    Event(UiEvent),
    Invalid(String),
}

fn parse_command(line: &str) -> ReplCommand {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(rest) = line.strip_prefix(':') else {
        return ReplCommand::Event(UiEvent::QueryChanged(line.to_string()));
    };

    let mut parts = rest.trim().splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default();
    let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());

    match (name, arg) {
        ("q" | "quit" | "exit", _) => ReplCommand::Quit,
        ("h" | "help", _) => ReplCommand::Help,
        ("w" | "watched", _) => ReplCommand::Watched,
        ("o" | "open", Some(target)) => ReplCommand::Open(target.to_string()),
        ("c" | "close", _) => ReplCommand::Event(UiEvent::CloseDetail),
        ("a" | "add", _) => ReplCommand::Event(UiEvent::AddWatched),
        ("r" | "rate", Some(value)) => match value.parse::<u8>() {
            Ok(rating) => ReplCommand::Event(UiEvent::Rate(rating)),
            Err(_) => ReplCommand::Invalid(format!("Not a rating: {}", value)),
        },
        ("rm" | "remove", Some(id)) => ReplCommand::Event(UiEvent::RemoveWatched(id.to_string())),
        ("k" | "key", Some(code)) => ReplCommand::Event(UiEvent::KeyPressed {
            code: code.to_string(),
            query_focused: false,
        }),
        _ => ReplCommand::Invalid(format!("Unknown command :{} (try :help)", rest.trim())),
    }
}

/// `n` picks the n-th result of the current search, anything else is an id
fn resolve_target(session: &Session, target: &str) -> Option<String> {
    match target.parse::<usize>() {
        Ok(n) => session
            .search_state()
            .ready()
            .and_then(|movies| movies.get(n.checked_sub(1)?).map(|m| m.id.clone())),
        Err(_) => Some(target.to_string()),
    }
}

fn set_terminal_title(title: &str) {
    if spinner::is_interactive() {
        print!("\x1b]0;{}\x07", title);
        let _ = std::io::stdout().flush();
    }
}

fn render(session: &Session, change: Change, output: &Output) {
    match change {
        Change::Search => match session.search_state() {
            FetchState::Loading => output.info("Searching...".bright_black().to_string()),
            FetchState::Ready(movies) if session.query().chars().count() >= MIN_QUERY_CHARS => {
                output.movies(&movies)
            }
            FetchState::Failed(e) => output.error(e.user_message()),
            _ => {}
        },
        Change::Detail => match session.detail_state() {
            FetchState::Loading => output.info("Loading...".bright_black().to_string()),
            FetchState::Ready(details) => {
                output.details(&details, session.watched().user_rating_for(&details.id))
            }
            FetchState::Failed(e) => output.error(e.user_message()),
            FetchState::Idle => {}
        },
        Change::Title => set_terminal_title(&session.title()),
        Change::Selection | Change::Closed => {}
    }
}

pub async fn run_interactive(ctx: &AppContext, output: &Output) -> Result<()> {
    let provider = ctx.provider(output)?;
    let mut session = Session::new(provider, ctx.storage()?, ctx.session_options());
    set_terminal_title(&session.title());

    output.info(format!("{} {}", "🍿".yellow(), "usePopcorn".bold()));
    output.info(HELP);
    output.summary(&session.watched().summary());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    ReplCommand::Quit => break,
                    ReplCommand::Help => output.info(HELP),
                    ReplCommand::Watched => {
                        output.watched(session.watched().entries());
                        output.summary(&session.watched().summary());
                    }
                    ReplCommand::Open(target) => match resolve_target(&session, &target) {
                        Some(id) => {
                            if let Err(e) = session.handle(UiEvent::Select(id)) {
                                output.error(e.to_string());
                            }
                        }
                        None => output.error(format!("No result number {}", target)),
                    },
                    ReplCommand::Event(event) => {
                        let adding = event == UiEvent::AddWatched;
                        match session.handle(event) {
                            Ok(()) if adding => output.summary(&session.watched().summary()),
                            Ok(()) => {}
                            Err(e) => output.error(e.to_string()),
                        }
                    }
                    ReplCommand::Invalid(msg) => output.warn(msg),
                }
            }
            change = session.changed() => {
                if change == Change::Closed {
                    break;
                }
                render(&session, change, output);
            }
        }
    }

    session.shutdown();
    set_terminal_title("");
    tracing::debug!("Interactive session ended");
    Ok(())
}
