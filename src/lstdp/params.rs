//! # Algorithm parameters

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use serde::Deserialize;

use crate::error::*;

// -----------------------------------------------------------------------------------------------
// CONSTANTS
// -----------------------------------------------------------------------------------------------

/// Largest supported maximum disparity.
pub const MAX_DISPARITY_LIMIT: usize = 240;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Params {
    pub segment: SegmentParams,

    /// Largest candidate disparity, levels are `0..=max_disparity`.
    pub max_disparity: usize,

    /// Smoothness strength added on top of the floor for similar-coloured segments.
    pub smoothness: u32,

    /// Smoothness floor, also the cost of a one level disparity step.
    pub smoothness_floor: u32,

    /// Per-channel matching cost cap.
    pub trim_diff: u8,

    /// Matching cost of pixels whose match falls outside the right image.
    pub out_diff: u8,

    pub traversal: Traversal
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SegmentParams {
    /// Colour range a run may span in any channel before it is split.
    pub t: u32,

    /// Boundary snapping radius in pixels.
    pub max_adjust_x: usize,

    /// Isolation removal radii.
    pub rx: usize,
    pub ry: usize
}

/// How the tree dynamic program walks the segment tree.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Traversal {
    /// Explicit stack, safe for arbitrarily deep trees.
    Iterative,

    /// Call-stack recursion, depth equals tree height.
    Recursive
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl Params {
    /// Check the parameters before any processing takes place.
    pub fn validate(&self) -> Result<()> {
        if self.segment.t == 0 {
            return Err(Error::InvalidSegmentThreshold);
        }

        if self.max_disparity > MAX_DISPARITY_LIMIT {
            return Err(Error::MaxDisparityOutOfRange(self.max_disparity));
        }

        Ok(())
    }

    /// Number of candidate disparity levels.
    pub fn levels(&self) -> usize {
        self.max_disparity + 1
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            segment: SegmentParams::default(),
            max_disparity: 20,
            smoothness: 10,
            smoothness_floor: 2,
            trim_diff: 15,
            out_diff: 5,
            traversal: Traversal::default()
        }
    }
}

impl Default for SegmentParams {
    fn default() -> Self {
        Self {
            t: 20,
            max_adjust_x: 2,
            rx: 2,
            ry: 2
        }
    }
}

impl Default for Traversal {
    fn default() -> Self {
        Traversal::Iterative
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
