use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
/// Batch error
pub enum BatchError {
    #[error("Invalid batch size: {0}")]
    InvalidBatchSize(String),

    #[error(
        "Attempts failing to create IDs: {accepted}/{requested} accepted after {attempts} attempts"
    )]
    GenerationExhausted {
        requested: usize,
        accepted: usize,
        attempts: usize,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Malformed identifier: {0}")]
    MalformedIdentifier(String),
}
