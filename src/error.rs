use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("missing required column '{column}' in {context}")]
    MissingColumn { column: String, context: String },

    #[error("invalid formula for '{name}': {message}")]
    Formula { name: String, message: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AtlasResult<T> = Result<T, AtlasError>;
