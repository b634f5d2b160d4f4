use thiserror::Error;

/// Reasons a request produces no KML. Messages are shown to the user as-is.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Invalid input. Make sure to enter ZIP and population per line (e.g., 30013<TAB>1).")]
    NoValidRows,

    #[error("No matching ZIP codes found.")]
    NoMatches,

    #[error("Color choice {index} is out of range (expected 0..{palette_len}).")]
    InvalidOverride { index: usize, palette_len: usize },

    #[error("Failed to render KML")]
    Render(#[from] std::fmt::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
