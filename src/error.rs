//! # Error Handling
//!
//! One error type, [`PipelineError`], covers every way a single image can fail
//! to go through the pipeline. The numeric core (scoring, the optimization loop,
//! screen fit) is defined over any valid RGB buffer and only surfaces
//! [`PipelineError::Scale`] when the resampler is handed a malformed buffer.
//! Everything else comes from the collaborators around it:
//!
//! | Variant | Raised by | Meaning |
//! |---------|-----------|---------|
//! | `Decode` | decoder | file unreadable, truncated or not an image |
//! | `UnsupportedColorMode` | normalizer | pixel layout that cannot be mapped to RGB |
//! | `Encode` | encoder | unknown output extension or write failure |
//! | `Io` | batch driver | input/output directory cannot be listed or created |
//! | `Config` | configuration | validation or JSON loading failure |
//!
//! `process_image` returns these unchanged; `process_batch` turns them into
//! failure entries with [`ToString`] and moves on to the next file.
//!
//! ## Usage
//!
//! ```rust
//! use imgpre::error::PipelineError;
//!
//! let err = PipelineError::UnsupportedColorMode { color: "Unknown".into() };
//! assert_eq!(err.stage(), "normalize");
//! ```

use std::path::{Path, PathBuf};

use image::ImageError;
use imgpre_scale::ScaleError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Source file could not be opened or decoded
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    /// Decoded pixels use a color model the normalizer cannot flatten to RGB
    #[error("unsupported color mode: {color}")]
    UnsupportedColorMode { color: String },

    /// Output could not be encoded or written
    #[error("failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    /// Resampler rejected a buffer
    #[error(transparent)]
    Scale(#[from] ScaleError),

    /// Directory access during batch processing
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid or unreadable configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Convenience result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

impl PipelineError {
    pub fn decode(path: impl AsRef<Path>, source: ImageError) -> Self {
        Self::Decode {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn encode(path: impl AsRef<Path>, source: ImageError) -> Self {
        Self::Encode {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config(reason.into())
    }

    /// Pipeline stage the error originated from, for log fields.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Decode { .. } => "decode",
            Self::UnsupportedColorMode { .. } => "normalize",
            Self::Encode { .. } => "encode",
            Self::Scale(_) => "resample",
            Self::Io { .. } => "io",
            Self::Config(_) => "config",
        }
    }
}
