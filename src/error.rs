use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShepherdError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Unknown source system: {0}")]
    UnknownSource(String),

    #[error("Could not detect a source system in {0}")]
    NoSourceDetected(String),

    #[error("Missing input file: {0}")]
    MissingInput(String),

    #[error("Record loop exceeded the configured threshold of {0} rows")]
    LoopThreshold(u64),

    #[error("Export cancelled")]
    Cancelled,

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ShepherdError>;
