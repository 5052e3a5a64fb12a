use thiserror::Error;

#[derive(Error, Debug)]
pub enum PedigreeError {
    #[error("Data error: {0}")]
    Data(String),

    #[error("Animal '{0}' not found in registry")]
    AnimalNotFound(String),

    #[error("Duplicate animal ID: '{0}'")]
    DuplicateAnimal(String),

    #[error("Pedigree error: {0}")]
    Pedigree(String),

    #[error("Pedigree contains a cycle through '{0}'")]
    Cycle(String),

    #[error("Invalid ear tag '{tag}': {reason}")]
    InvalidEarTag { tag: String, reason: String },

    #[error("Pedigree grid needs between 1 and {max} columns, got {got}")]
    InvalidColumns { got: usize, max: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PedigreeError>;
