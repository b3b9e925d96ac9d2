//! # Segment cost aggregation

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use super::dsi::CostVolume;
use super::graph::SegmentGraph;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Matching cost of each segment at each disparity level.
pub struct SegmentCosts {
    levels: usize,
    costs: Vec<i64>
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl SegmentCosts {
    /// Wrap precomputed costs laid out as `segment * levels + d`.
    pub fn new(levels: usize, costs: Vec<i64>) -> Self {
        Self { levels, costs }
    }

    pub fn levels(&self) -> usize {
        self.levels
    }

    /// Costs of segment `id`, indexed by disparity.
    pub fn segment(&self, id: usize) -> &[i64] {
        &self.costs[id * self.levels..(id + 1) * self.levels]
    }
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Sum the pixel costs of every segment's run at every disparity.
pub fn aggregate_costs(graph: &SegmentGraph, dsi: &CostVolume) -> SegmentCosts {
    let levels = dsi.levels();
    let mut costs = Vec::with_capacity(graph.len() * levels);

    for seg in graph.segments() {
        for d in 0..levels {
            let sum = dsi
                .span(d, seg.y, seg.x_beg, seg.x_end)
                .iter()
                .map(|&c| c as i64)
                .sum::<i64>();
            costs.push(sum);
        }
    }

    SegmentCosts::new(levels, costs)
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
