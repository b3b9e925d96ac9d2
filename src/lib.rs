//! # Line-segment tree dynamic programming stereo
//!
//! This crate computes a disparity map from a rectified colour stereo pair by segmenting the
//! left image into scanline runs, linking the runs into a spanning tree and solving a dynamic
//! program over that tree.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

mod disparity;
mod error;
pub mod lstdp;

// -----------------------------------------------------------------------------------------------
// EXPORTS
// -----------------------------------------------------------------------------------------------

pub use error::{Error, Result};

pub mod prelude {
    pub use crate::disparity::{DisparityAlgorithm, DisparityMap, StereoFrame};
}
