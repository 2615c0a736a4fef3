use thiserror::Error;

/// Fatal errors surfaced by the engine.
///
/// Every `Result`-returning function in this crate resolves its error type
/// to `EngineError`. There is no partial-failure mode: the CLI either emits
/// the full report or prints the `{"error": ..., "message": ...}` envelope
/// for one of these variants and exits nonzero.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Missing columns, empty file, unparseable timestamp, non-numeric amount.
    #[error("invalid input at row {row}, column '{column}': {detail}")]
    InvalidInput {
        row: usize,
        column: String,
        detail: String,
    },

    /// The input file itself could not be read.
    #[error("failed to read input file '{path}': {source}")]
    IOFailure {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A graph invariant was violated; indicates a bug in the engine rather
    /// than malformed input.
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),
}

impl EngineError {
    /// Stable machine-readable tag for the stderr error envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::InvalidInput { .. } => "InvalidInput",
            EngineError::IOFailure { .. } => "IOFailure",
            EngineError::InternalInvariant(_) => "InternalInvariant",
        }
    }
}
