use std::path::PathBuf;

use thiserror::Error;

/// Fatal pipeline errors. None of these are recoverable at the pipeline
/// level: a failure aborts startup before any table is handed out.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Source file missing, unreadable, or not parseable as delimited text.
    #[error("failed to load incident table from `{}`: {}", path.display(), reason)]
    Load { path: PathBuf, reason: String },

    /// A date cell the feature extractor could not parse. The whole stage
    /// fails rather than nulling the row.
    #[error("unparseable date `{value}` in column `{column}` at row {row}")]
    Parse {
        column: String,
        row: usize,
        value: String,
    },

    /// A column incompatible with every recognized semantic type.
    #[error("no semantic type for column `{column}`: {reason}")]
    TypeAssignment { column: String, reason: String },
}
