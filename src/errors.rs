//! Error types shared across the application.

use std::fmt::{Display, Formatter};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all domain failure modes.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing or validation failure.
    Config(String),
    /// Backing JSON document store is unreadable, unwritable, or corrupt.
    Store(String),
    /// Notebook rendering produced an invalid or unwritable document.
    Template(String),
    /// Outbound call to Roboflow, Gemini, or another third-party API failed.
    External(String),
    /// Referenced session, dataset, or model does not exist.
    NotFound(String),
    /// A generated notebook artifact has already been deleted or never existed.
    ArtifactMissing(String),
    /// File-system or I/O operation failure.
    Io(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Store(msg) => write!(f, "store: {msg}"),
            Self::Template(msg) => write!(f, "template: {msg}"),
            Self::External(msg) => write!(f, "external: {msg}"),
            Self::NotFound(msg) => write!(f, "not found: {msg}"),
            Self::ArtifactMissing(msg) => write!(f, "artifact missing: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Store(format!("json encoding: {err}"))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        Self::External(err.to_string())
    }
}
