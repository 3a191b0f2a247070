use std::collections::TryReserveError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Backing storage could not be grown. The value that reported this is unchanged.
    #[error("failed to grow storage: {0}")]
    Allocation(#[from] TryReserveError),

    #[error("invalid emitter config: {0}")]
    InvalidConfig(String),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
