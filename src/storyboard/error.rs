//! Storyboard error taxonomy.
//!
//! Every parse-time error is contained to the unit that caused it (a single
//! command or a single object). The loader logs them and keeps a copy in
//! [`Storyboard::warnings`](super::Storyboard::warnings); none of them abort
//! a load.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoryboardError {
    /// No storyboard script exists for the beatmap.
    #[error("no storyboard script found in {0}")]
    MissingResource(PathBuf),
    /// Object header or command block could not be understood; the object is dropped.
    #[error("line {line}: malformed object: {reason}")]
    MalformedObject { line: usize, reason: String },
    /// A texture file could not be loaded; the frame draws as a no-op.
    #[error("missing asset {path}: {reason}")]
    MissingAsset { path: PathBuf, reason: String },
    /// A single command line could not be parsed; the command is dropped.
    #[error("line {line}: corrupt command: {reason}")]
    CorruptCommand { line: usize, reason: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StoryboardError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        StoryboardError::MalformedObject {
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn corrupt(line: usize, reason: impl Into<String>) -> Self {
        StoryboardError::CorruptCommand {
            line,
            reason: reason.into(),
        }
    }
}
