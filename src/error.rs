//! # Error standards
//! 
//! This module provides a standardised error enum and result type for this crate.

// -----------------------------------------------------------------------------------------------
// TYPES
// -----------------------------------------------------------------------------------------------

/// Standard result type used in the disparity crate.
pub type Result<T> = std::result::Result<T, Error>;

// -----------------------------------------------------------------------------------------------
// ENUMERATIONS
// -----------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Maximum disparity {0} is outside the supported range 0..=240")]
    MaxDisparityOutOfRange(usize),

    #[error("Segmentation colour threshold must be greater than zero")]
    InvalidSegmentThreshold,

    #[error("Stereo images must have a non-zero width and height")]
    EmptyImage,

    #[error("Stereo images differ in size: left is {left:?}, right is {right:?}")]
    DimensionMismatch {
        left: (u32, u32),
        right: (u32, u32)
    },

    /// Tree growth ran out of candidate edges before reaching every segment.
    #[error("Segment graph is disconnected: spanned {spanned} of {total} segments")]
    DisconnectedGraph {
        spanned: usize,
        total: usize
    }
}
