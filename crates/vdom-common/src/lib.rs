//! # vdom common
//!
//! Error types and logging configuration shared by the vdom crates and tools.
//!
//! ## Features
//!
//! - A top-level error type for front ends that drive the engine
//! - Logging configuration and setup
//! - Result and Option extension traits

use thiserror::Error;

pub mod logging;

pub use logging::{init_logging, LogConfig, LogFormat};

/// Top-level error for tools built on the vdom crates.
#[derive(Error, Debug)]
pub enum VdomError {
    /// A selector failed to compile.
    #[error("Selector error: {message}")]
    Selector {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Input could not be read as markup text.
    #[error("Markup error: {message}")]
    Markup {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration errors.
    #[error("Config error: {0}")]
    Config(String),

    /// I/O errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl VdomError {
    /// Create a selector error with source.
    pub fn selector_with_source<E: std::error::Error + Send + Sync + 'static>(
        message: impl Into<String>,
        source: E,
    ) -> Self {
        Self::Selector {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a markup error with source.
    pub fn markup_with_source<E: std::error::Error + Send + Sync + 'static>(
        message: impl Into<String>,
        source: E,
    ) -> Self {
        Self::Markup {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get the error category, used as the process exit code family.
    pub fn category(&self) -> &'static str {
        match self {
            VdomError::Selector { .. } => "selector",
            VdomError::Markup { .. } => "markup",
            VdomError::Config(_) => "config",
            VdomError::Io(_) => "io",
            VdomError::NotFound(_) => "not_found",
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            VdomError::Io(_) | VdomError::NotFound(_) => 2,
            VdomError::Selector { .. } | VdomError::Config(_) => 3,
            VdomError::Markup { .. } => 4,
        }
    }
}

/// Result type alias for vdom tools.
pub type Result<T> = std::result::Result<T, VdomError>;

/// Extension trait for Result.
pub trait ResultExt<T> {
    /// Wrap any error as a selector error with context.
    fn selector_context(self, message: impl Into<String>) -> Result<T>;
}

impl<T, E: std::error::Error + Send + Sync + 'static> ResultExt<T> for std::result::Result<T, E> {
    fn selector_context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| VdomError::selector_with_source(message, e))
    }
}

/// Extension trait for Option.
pub trait OptionExt<T> {
    /// Convert None to a NotFound error.
    fn ok_or_not_found(self, resource: impl Into<String>) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, resource: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| VdomError::NotFound(resource.into()))
    }
}
