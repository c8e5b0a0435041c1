//! Error types for slice planning.

use thiserror::Error;

/// Errors that can occur while turning slicing parameters into a plan.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SliceError {
    /// A dimension or slicing parameter is zero, negative or not an integer.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The requested count cannot be met without zero-length slices.
    #[error("Cannot split {length} pixels into {count} slices: each slice needs at least 1 pixel")]
    NotPartitionable {
        /// Image length along the slicing axis.
        length: u32,
        /// Requested number of slices.
        count: u32,
    },
}

/// Result type for slice planning.
pub type SliceResult<T> = std::result::Result<T, SliceError>;
