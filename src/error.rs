//! Failure kinds that terminate a run, each with its own exit status.
//!
//! Usage errors never reach this type: clap reports them and exits with 2.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot {action} {}", path.display())]
    FileAccess {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a JSON array of [timestamp, value] pairs", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    Alignment(String),
}

impl Error {
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::FileAccess { .. } => 3,
            Error::Parse { .. } => 4,
            Error::Alignment(_) => 5,
        }
    }
}

/// Exit status for an error coming out of the pipeline.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<Error>().map_or(1, Error::exit_code)
}
