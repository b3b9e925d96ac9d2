//! # Line-segment tree DP disparity computation
//!
//! Global stereo matching over a tree of scanline segments:
//!
//! 1. segment the left image into colour-homogeneous row runs ([`segment`]),
//! 2. build a clipped, envelope-based matching cost volume ([`dsi`]),
//! 3. grow a spanning tree over adjacent segments ([`graph`]),
//! 4. sum pixel costs per segment ([`aggregate`]),
//! 5. pick one disparity per segment with a tree dynamic program ([`dp`]).

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod aggregate;
pub mod dp;
pub mod dsi;
pub mod envelope;
pub mod graph;
mod params;
pub mod segment;

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use log::debug;

use crate::disparity::{DisparityAlgorithm, DisparityMap, StereoFrame};
use crate::error::*;

use self::aggregate::aggregate_costs;
use self::dsi::CostVolume;
use self::graph::SegmentGraph;
use self::segment::segment_image;

pub use self::params::{Params, SegmentParams, Traversal, MAX_DISPARITY_LIMIT};

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

pub struct Lstdp {
    params: Params
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl Lstdp {
    /// Create a new instance of the algorithm with the given parameters.
    pub fn new(params: Params) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }
}

impl DisparityAlgorithm for Lstdp {
    /// Compute the disparity map for the given frame.
    fn compute(&mut self, frame: &StereoFrame) -> Result<DisparityMap> {
        frame.validate()?;

        let params = &self.params;

        // ---- SEGMENTATION ----

        let map = segment_image(&frame.left, &params.segment);

        // ---- MATCHING COST ----

        let dsi = CostVolume::new(
            &frame.left,
            &frame.right,
            params.levels(),
            params.trim_diff,
            params.out_diff
        );

        // ---- SEGMENT TREE ----

        let mut graph = SegmentGraph::new(&frame.left, &map);
        graph.grow_tree(&map)?;

        // ---- OPTIMISATION ----

        let costs = aggregate_costs(&graph, &dsi);
        let solution = dp::solve(&graph, &costs, params);

        let mut disp_map = DisparityMap::new(map.width(), map.height());
        for (seg, &label) in graph.segments().iter().zip(solution.labels.iter()) {
            for x in seg.x_beg..seg.x_end {
                disp_map.put(x, seg.y, label);
            }
        }
        disp_map.update_range();

        debug!(
            "Disparity range {:?}..={:?} over {} segments",
            disp_map.min_disp,
            disp_map.max_disp,
            graph.len()
        );

        Ok(disp_map)
    }
}
