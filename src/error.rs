//! Error types shared across the engine.
//!
//! None of these abort the simulation. They are returned to callers that can
//! react, and otherwise reported as diagnostics through the `log` facade.

use std::path::PathBuf;

use crate::systems::scheduler::{Phase, StateAction};

/// Outcome of a [`ResourceStore::request`](crate::resources::resourcestore::ResourceStore::request)
/// that did not produce a payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceError {
    /// The name was never registered. This is the silent "empty" answer.
    #[error("resource '{0}' is not registered")]
    UnknownResource(String),

    /// The name is registered but its loader has not finished.
    #[error("resource '{0}' was requested before it finished loading")]
    NotYetLoaded(String),
}

/// Failure of an asynchronous asset load. The entry stays unloaded.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("asset file type '{extension}' of '{path}' is not supported")]
    UnsupportedAssetType { path: PathBuf, extension: String },

    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image '{path}': {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to parse json '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Rejected lifecycle request on the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// A string on the `State` channel that names no action.
    #[error("invalid state action: {0}")]
    InvalidAction(String),

    /// A known action that makes no sense from the current phase.
    #[error("cannot {action:?} while {from:?}")]
    InvalidTransition { from: Phase, action: StateAction },
}

/// A keybinding that names an action the owning entity never bound.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("action '{action}' has no handler on its entity")]
pub struct MissingCallbackTarget {
    pub action: String,
}
