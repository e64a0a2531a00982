use thiserror::Error;

/// Errors surfaced by pedigree construction and inference.
#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("invalid pedigree: {0}")]
    InvalidPedigree(String),

    #[error("pedigree has {count} members, exact enumeration supports at most {max}")]
    PedigreeTooLarge { count: usize, max: usize },

    #[error("invalid probability tables: {0}")]
    InvalidTables(String),

    #[error("evidence is unsatisfiable: no hypothesis has positive probability")]
    EvidenceUnsatisfiable,

    #[error("inference deadline exceeded")]
    DeadlineExceeded,
}
