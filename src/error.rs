//! Transport errors raised while talking to the ngccm tool.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NgccmError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("bad response pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("timed out after {secs}s waiting for response to \"{waiting_for}\"")]
    Timeout { waiting_for: String, secs: u64 },

    #[error("tool closed its output while waiting for response to \"{waiting_for}\"")]
    Eof { waiting_for: String, output: String },
}

pub type Result<T> = std::result::Result<T, NgccmError>;
