use repsense_core::CoreError;

/// Error type for the worker pipeline.
///
/// Wraps [`CoreError`] for configuration problems detected by the core and
/// adds the I/O and decoding failures of the surrounding plumbing.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// A domain-level error from `repsense_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An input line that is neither a frame nor a stream header.
    #[error("Malformed input on line {line}: {source}")]
    Decode {
        line: usize,
        source: serde_json::Error,
    },

    #[error("Failed to encode rep record: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Convenience type alias for worker results.
pub type WorkerResult<T> = Result<T, WorkerError>;
