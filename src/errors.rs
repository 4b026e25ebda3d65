//! Error types for searchdelta operations.
//!
//! Configuration and argument problems are reported eagerly with typed
//! errors. Per-record anomalies (an unparseable URL, a row with a bad date)
//! degrade to sentinels at the point of use instead of failing the run,
//! while structural problems in input data (a missing date or metric
//! column) are `DataShape` errors and fail fast.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyticsError {
    /// Invalid client configuration (bad dimension, ambiguous brand phrase).
    #[error("invalid configuration: {message}")]
    Config { message: String },

    /// Unsupported argument to a facade operation (unknown dimension,
    /// unknown metric or periodicity token).
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Input data missing an expected column or otherwise structurally off.
    #[error("unexpected data shape: {message}{}", fmt_path(.path))]
    DataShape {
        message: String,
        path: Option<PathBuf>,
    },

    /// File system failures while loading or exporting.
    #[error("io error: {message}{}", fmt_path(.path))]
    Io {
        message: String,
        path: Option<PathBuf>,
    },

    /// A delimited file that could not be parsed.
    #[error("parse error: {message}{}{}", fmt_path(.path), fmt_line(.line))]
    Parse {
        message: String,
        path: Option<PathBuf>,
        line: Option<u64>,
    },
}

fn fmt_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => format!(" (path: {})", p.display()),
        None => String::new(),
    }
}

fn fmt_line(line: &Option<u64>) -> String {
    match line {
        Some(l) => format!(" (line {l})"),
        None => String::new(),
    }
}

impl AnalyticsError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn data_shape(message: impl Into<String>) -> Self {
        Self::DataShape {
            message: message.into(),
            path: None,
        }
    }

    pub fn data_shape_with_path(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::DataShape {
            message: message.into(),
            path: Some(path.into()),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            path: None,
        }
    }

    pub fn io_with_path(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            message: message.into(),
            path: Some(path.into()),
        }
    }

    pub fn parse_with_context(
        message: impl Into<String>,
        path: impl Into<PathBuf>,
        line: u64,
    ) -> Self {
        Self::Parse {
            message: message.into(),
            path: Some(path.into()),
            line: Some(line),
        }
    }

    /// True for errors the caller can usually recover from by fixing inputs.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Config { .. } | Self::InvalidArgument { .. } | Self::DataShape { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
