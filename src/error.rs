use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum BiocycError {
    #[error("invalid detail level: {0} (expected none, low or full)")]
    InvalidDetailLevel(String),

    #[error("invalid expiry window: {0}")]
    #[diagnostic(help("use <n><unit> with unit one of s, m, h, d, w (e.g. 26w)"))]
    InvalidExpiry(String),

    #[error("invalid organism: {0:?}")]
    InvalidOrganism(String),

    #[error("invalid record category: {0}")]
    InvalidCategory(String),

    #[error("invalid relation: {0}")]
    InvalidRelation(String),

    #[error("invalid BioCyc base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("BioCyc request failed: {0}")]
    Http(String),

    #[error("malformed BioCyc document: {0}")]
    DocumentParse(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}

impl BiocycError {
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            BiocycError::InvalidDetailLevel(_)
                | BiocycError::InvalidExpiry(_)
                | BiocycError::InvalidOrganism(_)
                | BiocycError::InvalidBaseUrl(_)
                | BiocycError::ConfigRead(_)
                | BiocycError::ConfigParse(_)
        )
    }
}
