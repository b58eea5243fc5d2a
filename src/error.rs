use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading, normalizing and publishing recipes
#[derive(Error, Debug)]
pub enum PublishError {
    /// Reading or writing a file failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A source file is not valid structured data
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A source record parsed fine but breaks a domain rule
    #[error("Invalid recipe in {origin}: {reason}")]
    Validation { origin: String, reason: String },

    /// A single field could not be interpreted
    #[error("Malformed {field} '{value}': {reason}")]
    Format {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// A configured template could not be used
    #[error("Template {}: {reason}", path.display())]
    Template { path: PathBuf, reason: String },

    /// Packaging the EPUB archive failed
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// A discovery pattern could not be built
    #[error("Failed to create glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

impl PublishError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PublishError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn format(
        field: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        PublishError::Format {
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }
}
