//! Error types for bigiron-virt.
//!
//! All errors use `thiserror` for ergonomic error handling and proper error chains.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for bigiron-virt operations.
pub type Result<T> = std::result::Result<T, VirtError>;

/// Main error type for bigiron-virt.
#[derive(Error, Debug)]
pub enum VirtError {
    // Machine lifecycle errors
    #[error("Machine not found: {name}")]
    MachineNotFound { name: String },

    #[error("Machine already exists: {name}")]
    MachineAlreadyExists { name: String },

    // Image errors
    #[error("Image not found: {id}")]
    ImageNotFound { id: String },

    #[error("Image hash mismatch: expected {expected}, computed {computed}")]
    ImageHashMismatch { expected: String, computed: String },

    #[error("Image URL scheme not supported: {scheme}")]
    UnsupportedUrlScheme { scheme: String },

    #[error("Image URL does not map to a local path: {url}")]
    InvalidImageUrl { url: String },

    #[error("Failed to create disk image: {reason}")]
    ImageCreateFailed { reason: String },

    // Manifest errors
    #[error("Invalid size string: {value}")]
    InvalidSize { value: String },

    #[error("No drive letters left for storage device at index {index}")]
    DriveLettersExhausted { index: usize },

    // Config drive errors
    #[error("Failed to build config drive ISO: {reason}")]
    IsoBuildFailed { reason: String },

    // Configuration errors
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // File system errors
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Libvirt(#[from] virt::error::Error),

    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl VirtError {
    /// Attach a path to a raw I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
