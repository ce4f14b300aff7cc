use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Failures surfaced to the user. No variant is ever retried; each halts the
/// operation it came from and is shown as a status message.
#[derive(Debug, Error)]
pub enum DataError {
    /// Required columns are absent from the source file. Fatal to the load:
    /// nothing is rendered from a dataset that failed the schema check.
    #[error("missing required columns: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    /// The source file is missing, unreadable, or unparsable.
    #[error("dataset unavailable: {0}")]
    Unavailable(#[from] anyhow::Error),

    /// The export destination could not be written. Does not affect charts
    /// already on screen.
    #[error("export failed: {0}")]
    Export(String),
}
