//! Error types for executor infrastructure failures
//!
//! Only unexpected backend-level faults surface as errors. Ordinary execution
//! failures, including code that does not compile or exits nonzero, are
//! reported as data through [`CodeResult`](crate::core_types::CodeResult) so
//! that an agent can read the diagnostic text and correct the code. Extraction
//! never raises at all; malformed or absent content degrades to an empty list.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("Bollard (Docker client) error: {0}")]
    BollardError(#[from] bollard::errors::Error),
    #[error("I/O error during execution: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Could not create temporary file/directory: {0}")]
    TempFileError(String),
    #[error("Script execution timed out")]
    Timeout,
    #[error("Backend terminated unexpectedly: {0}")]
    UnexpectedTermination(String),
}
