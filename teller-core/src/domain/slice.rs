//! Independently loading data slices (balance, transaction history)

use serde::{Deserialize, Serialize};

use super::result::{Error, ErrorKind};

/// Why a slice fetch failed, in a form that can be cloned into every observer
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct FetchFailure {
    pub kind: ErrorKind,
    pub message: String,
    /// Endpoint that failed; None when the fetch never reached the network
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl From<&Error> for FetchFailure {
    fn from(error: &Error) -> Self {
        Self {
            kind: error.kind(),
            message: error.user_message(),
            endpoint: error.endpoint().map(str::to_string),
        }
    }
}

/// State of one slice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum SliceState<T> {
    /// Nothing requested since the slice was created or invalidated
    Idle,
    Loading,
    Loaded(T),
    Failed(FetchFailure),
}

impl<T> Default for SliceState<T> {
    fn default() -> Self {
        SliceState::Idle
    }
}

impl<T> SliceState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, SliceState::Loading)
    }

    /// Loaded or Failed
    pub fn is_terminal(&self) -> bool {
        matches!(self, SliceState::Loaded(_) | SliceState::Failed(_))
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            SliceState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&FetchFailure> {
        match self {
            SliceState::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// A slice state tagged with the fetch cycle that produced it
///
/// `cycle` increases every time a fetch starts or the slice is invalidated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceSnapshot<T> {
    pub cycle: u64,
    pub state: SliceState<T>,
}

impl<T> Default for SliceSnapshot<T> {
    fn default() -> Self {
        Self {
            cycle: 0,
            state: SliceState::Idle,
        }
    }
}
