use std::path::PathBuf;
use thiserror::Error;

/// Broad category of a failure, stable across message wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidAmount,
    Validation,
    /// The record store could not complete the operation; safe to retry.
    Unavailable,
    Config,
    Render,
    Io,
}

#[derive(Error, Debug)]
pub enum DairyError {
    #[error("Config directory not found at {0}. Run 'dairy init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Customer '{0}' not found")]
    CustomerNotFound(String),

    #[error("Invalid amount '{value}': {reason}")]
    InvalidAmount { value: String, reason: String },

    #[error("Payment amount must be greater than zero")]
    NonPositivePayment,

    #[error("Customer name is required")]
    MissingName,

    #[error("Customer phone is required")]
    MissingPhone,

    #[error("A customer with phone '{0}' already exists")]
    DuplicatePhone(String),

    #[error("Invalid month '{0}'. Expected YYYY-MM (e.g., '2026-03')")]
    InvalidMonth(String),

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid line '{input}': {reason}")]
    InvalidLine { input: String, reason: String },

    #[error("Failed to read entry payload {path}: {source}")]
    PayloadParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse records file {path}: {source}")]
    StoreParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Record store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Typst not found. Install it from https://typst.app/ or run: cargo install typst-cli")]
    TypstNotFound,

    #[error("Failed to generate PDF: {0}")]
    PdfGeneration(String),

    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DairyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CustomerNotFound(_) => ErrorKind::NotFound,
            Self::InvalidAmount { .. } | Self::NonPositivePayment => ErrorKind::InvalidAmount,
            Self::MissingName
            | Self::MissingPhone
            | Self::DuplicatePhone(_)
            | Self::InvalidMonth(_)
            | Self::InvalidDate(_)
            | Self::InvalidLine { .. }
            | Self::PayloadParse { .. } => ErrorKind::Validation,
            Self::StoreUnavailable(_) => ErrorKind::Unavailable,
            Self::ConfigNotFound(_)
            | Self::ConfigFileNotFound(_)
            | Self::ConfigParse { .. }
            | Self::AlreadyInitialized(_)
            | Self::StoreParse { .. } => ErrorKind::Config,
            Self::TypstNotFound | Self::PdfGeneration(_) => ErrorKind::Render,
            Self::Csv(_) | Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Whether the caller may retry the same operation unchanged.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Unavailable
    }

    pub(crate) fn invalid_amount(value: impl ToString, reason: &str) -> Self {
        Self::InvalidAmount {
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DairyError>;
