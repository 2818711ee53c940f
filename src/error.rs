use thiserror::Error;

/// Main error type for the phase server
#[derive(Error, Debug)]
pub enum PhaseServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No phase label found for phase id {0}")]
    UnknownPhase(u32),

    #[error("No annotations for video id {0}")]
    NoAnnotations(i64),

    #[error("Video not found: {0}")]
    VideoNotFound(String),

    #[error("Invalid Range header: {0}")]
    MalformedRange(String),

    #[error("Range not satisfiable: start={start}, file size={file_size}")]
    RangeNotSatisfiable { start: u64, file_size: u64 },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, PhaseServerError>;
