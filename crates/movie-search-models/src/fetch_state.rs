use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal failure of one fetch cycle. Cancellation is not represented here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum FetchError {
    /// The provider answered with its "not found" marker
    NotFound,
    /// Non-success status, network failure or an undecodable body
    Transport(String),
}

impl FetchError {
    /// The single message shown to the user for this failure
    pub fn user_message(&self) -> &'static str {
        match self {
            FetchError::NotFound => "Movie not found!",
            FetchError::Transport(_) => "Something went wrong while fetching movies",
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::NotFound => write!(f, "not found"),
            FetchError::Transport(detail) => write!(f, "transport error: {}", detail),
        }
    }
}

/// State exposed by every asynchronous unit
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchState<T> {
    #[default]
    Idle,
    Loading,
    Ready(T),
    Failed(FetchError),
}

impl<T> FetchState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            FetchState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            FetchState::Failed(error) => Some(error),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FetchState<U> {
        match self {
            FetchState::Idle => FetchState::Idle,
            FetchState::Loading => FetchState::Loading,
            FetchState::Ready(value) => FetchState::Ready(f(value)),
            FetchState::Failed(error) => FetchState::Failed(error),
        }
    }
}
