//! # Tree dynamic program
//!
//! Chooses one disparity per segment, minimising the summed segment matching costs plus a
//! smoothness penalty on every tree edge. A child may follow its parent exactly for free,
//! step one level for `T1 * overlap`, or take any other level for `curT * overlap`, where
//! `curT` shrinks from `T1 + T` towards `T1` as the two segments' colours diverge.
//!
//! The bottom-up pass computes, for every segment and every parent disparity, the cheapest
//! cost of its subtree and the disparity achieving it. The top-down pass then reads the
//! choices back starting from the root's unconstrained optimum.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use log::debug;

use super::aggregate::SegmentCosts;
use super::graph::SegmentGraph;
use super::params::{Params, Traversal};

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Disparity chosen for every segment, and the total cost of that labelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub labels: Vec<u8>,
    pub energy: i64
}

struct TreeDp<'a> {
    graph: &'a SegmentGraph,
    costs: &'a SegmentCosts,
    params: &'a Params,
    levels: usize,

    /// Subtree cost of each segment given its parent's disparity.
    energies: Vec<i64>,

    /// Best own disparity of each segment given its parent's disparity.
    choices: Vec<u8>,

    labels: Vec<u8>
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Solve the dynamic program over a grown segment tree rooted at segment 0.
pub fn solve(graph: &SegmentGraph, costs: &SegmentCosts, params: &Params) -> Solution {
    if graph.is_empty() {
        return Solution {
            labels: Vec::new(),
            energy: 0
        };
    }

    let mut dp = TreeDp::new(graph, costs, params);

    let solution = match params.traversal {
        Traversal::Iterative => dp.solve_iterative(),
        Traversal::Recursive => dp.solve_recursive()
    };

    debug!(
        "Tree DP labelled {} segments, root disparity {}, energy {}",
        graph.len(),
        solution.labels[0],
        solution.energy
    );

    solution
}

/// Total cost of an arbitrary labelling under the same model the dynamic program minimises.
pub fn labelling_energy(
    graph: &SegmentGraph,
    costs: &SegmentCosts,
    params: &Params,
    labels: &[u8]
) -> i64 {
    let mut energy = 0;

    for (id, &label) in labels.iter().enumerate() {
        energy += costs.segment(id)[label as usize];

        for child in graph.children(id) {
            let (step, jump) = edge_penalties(graph, params, id, child);

            energy += match (label as i64 - labels[child] as i64).abs() {
                0 => 0,
                1 => step,
                _ => jump
            };
        }
    }

    energy
}

/// Penalties for a one level step and for a larger jump across the edge `parent -> cur`.
fn edge_penalties(
    graph: &SegmentGraph,
    params: &Params,
    parent: usize,
    cur: usize
) -> (i64, i64) {
    let segs = graph.segments();
    let (par, seg) = (&segs[parent], &segs[cur]);

    let floor = params.smoothness_floor as i64;
    let strength = params.smoothness as i64;

    let similarity = 128 - (par.color_diff(seg) / 3).clamp(0, 128);
    let cur_t = floor + strength * similarity / 128;
    let overlap = par.overlap(seg);

    (floor * overlap, cur_t * overlap)
}

/// First index of the smallest value.
fn argmin(buf: &[i64]) -> usize {
    let mut best = 0;

    for d in 1..buf.len() {
        if buf[d] < buf[best] {
            best = d;
        }
    }

    best
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl<'a> TreeDp<'a> {
    fn new(graph: &'a SegmentGraph, costs: &'a SegmentCosts, params: &'a Params) -> Self {
        let levels = costs.levels();

        Self {
            graph,
            costs,
            params,
            levels,
            energies: vec![0; graph.len() * levels],
            choices: vec![0; graph.len() * levels],
            labels: vec![0; graph.len()]
        }
    }

    /// Own cost of `cur` plus the already computed costs of its children, per disparity.
    fn subtree_costs(&self, cur: usize) -> Vec<i64> {
        let mut buf = self.costs.segment(cur).to_vec();

        for child in self.graph.children(cur) {
            let child_e = &self.energies[child * self.levels..(child + 1) * self.levels];
            for (b, e) in buf.iter_mut().zip(child_e.iter()) {
                *b += e;
            }
        }

        buf
    }

    /// Fill the energy and choice tables of `cur`, whose children are already done.
    fn relax(&mut self, parent: usize, cur: usize) {
        let buf = self.subtree_costs(cur);
        let best = argmin(&buf);

        // Decoupled from the parent: own optimum plus the full edge penalty.
        let (e1, jump) = edge_penalties(self.graph, self.params, parent, cur);
        let min_e = buf[best] + jump;

        let base = cur * self.levels;
        for d in 0..self.levels {
            let mut best_d = best;
            let mut best_e = min_e;

            if buf[d] < best_e {
                best_d = d;
                best_e = buf[d];
            }

            if d > 0 && buf[d - 1] + e1 < best_e {
                best_d = d - 1;
                best_e = buf[d - 1] + e1;
            }

            if d + 1 < self.levels && buf[d + 1] + e1 < best_e {
                best_d = d + 1;
                best_e = buf[d + 1] + e1;
            }

            self.energies[base + d] = best_e;
            self.choices[base + d] = best_d as u8;
        }
    }

    /// Pick the root's disparity once all its children are relaxed.
    fn finish_root(&mut self) -> i64 {
        let buf = self.subtree_costs(0);
        let best = argmin(&buf);
        self.labels[0] = best as u8;
        buf[best]
    }

    fn choice(&self, cur: usize, parent_label: u8) -> u8 {
        self.choices[cur * self.levels + parent_label as usize]
    }

    fn solve_iterative(&mut self) -> Solution {
        let n = self.graph.len();
        let mut order = Vec::with_capacity(n);
        let mut parents = vec![0; n];

        let mut stack = vec![0];
        while let Some(cur) = stack.pop() {
            order.push(cur);
            for child in self.graph.children(cur) {
                parents[child] = cur;
                stack.push(child);
            }
        }

        // Reverse pre-order visits every child before its parent.
        for &cur in order[1..].iter().rev() {
            self.relax(parents[cur], cur);
        }

        let energy = self.finish_root();

        for &cur in order[1..].iter() {
            let label = self.choice(cur, self.labels[parents[cur]]);
            self.labels[cur] = label;
        }

        Solution {
            labels: std::mem::take(&mut self.labels),
            energy
        }
    }

    fn solve_recursive(&mut self) -> Solution {
        let graph = self.graph;

        for child in graph.children(0) {
            self.collect(0, child);
        }

        let energy = self.finish_root();

        for child in graph.children(0) {
            let label = self.choice(child, self.labels[0]);
            self.assign(child, label);
        }

        Solution {
            labels: std::mem::take(&mut self.labels),
            energy
        }
    }

    fn collect(&mut self, parent: usize, cur: usize) {
        let graph = self.graph;

        for child in graph.children(cur) {
            self.collect(cur, child);
        }

        self.relax(parent, cur);
    }

    fn assign(&mut self, cur: usize, label: u8) {
        let graph = self.graph;
        self.labels[cur] = label;

        for child in graph.children(cur) {
            let child_label = self.choice(child, label);
            self.assign(child, child_label);
        }
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lstdp::aggregate::aggregate_costs;
    use crate::lstdp::dsi::CostVolume;
    use crate::lstdp::segment::segment_image;
    use image::{Rgb, RgbImage};

    fn textured(width: u32, height: u32, seed: u32) -> RgbImage {
        let mut img = RgbImage::new(width, height);
        for (x, y, px) in img.enumerate_pixels_mut() {
            let h = (x * 73 + y * 151 + seed * 37) % 255;
            let band: u32 = if (x / 3 + y / 2) % 2 == 0 { 40 } else { 190 };
            *px = Rgb([band as u8, h as u8, (band + h / 4) as u8]);
        }
        img
    }

    fn shift_left(img: &RgbImage, shift: u32) -> RgbImage {
        let (w, h) = img.dimensions();
        let mut out = RgbImage::new(w, h);
        for (x, y, px) in out.enumerate_pixels_mut() {
            *px = *img.get_pixel((x + shift).min(w - 1), y);
        }
        out
    }

    fn setup(params: &Params) -> (SegmentGraph, SegmentCosts) {
        let left = textured(14, 6, 1);
        let right = shift_left(&left, 2);

        let map = segment_image(&left, &params.segment);
        let mut graph = SegmentGraph::new(&left, &map);
        graph.grow_tree(&map).unwrap();

        let dsi = CostVolume::new(
            &left,
            &right,
            params.levels(),
            params.trim_diff,
            params.out_diff
        );
        let costs = aggregate_costs(&graph, &dsi);

        (graph, costs)
    }

    #[test]
    fn traversals_agree() {
        let mut params = Params::default();
        params.max_disparity = 5;
        let (graph, costs) = setup(&params);

        params.traversal = Traversal::Iterative;
        let iterative = solve(&graph, &costs, &params);
        params.traversal = Traversal::Recursive;
        let recursive = solve(&graph, &costs, &params);

        assert_eq!(iterative, recursive);
        assert_eq!(iterative.labels.len(), graph.len());
    }

    #[test]
    fn solution_energy_matches_its_labelling() {
        let mut params = Params::default();
        params.max_disparity = 5;
        let (graph, costs) = setup(&params);

        let solution = solve(&graph, &costs, &params);
        assert_eq!(
            labelling_energy(&graph, &costs, &params, &solution.labels),
            solution.energy
        );
    }

    #[test]
    fn no_simple_relabelling_is_cheaper() {
        let mut params = Params::default();
        params.max_disparity = 5;
        let (graph, costs) = setup(&params);

        let solution = solve(&graph, &costs, &params);

        // Constant labellings.
        for d in 0..params.levels() {
            let labels = vec![d as u8; graph.len()];
            assert!(solution.energy <= labelling_energy(&graph, &costs, &params, &labels));
        }

        // Every segment at its own best disparity.
        let own: Vec<u8> = (0..graph.len())
            .map(|id| argmin(costs.segment(id)) as u8)
            .collect();
        assert!(solution.energy <= labelling_energy(&graph, &costs, &params, &own));

        // Single segment perturbations.
        for id in 0..graph.len() {
            for d in 0..params.levels() {
                let mut labels = solution.labels.clone();
                labels[id] = d as u8;
                assert!(solution.energy <= labelling_energy(&graph, &costs, &params, &labels));
            }
        }
    }

    /// Relax the single child of a one column, two row image against hand-made costs.
    fn relax_child(floor: u32, strength: u32, child_costs: &[i64]) -> (Vec<u8>, Vec<i64>) {
        let params = Params {
            smoothness: strength,
            smoothness_floor: floor,
            ..Default::default()
        };

        let img = RgbImage::from_pixel(1, 2, Rgb([70, 70, 70]));
        let map = segment_image(&img, &params.segment);
        let mut graph = SegmentGraph::new(&img, &map);
        graph.grow_tree(&map).unwrap();
        assert_eq!(graph.children(0).collect::<Vec<_>>(), vec![1]);

        let levels = child_costs.len();
        let mut raw = vec![0; levels];
        raw.extend_from_slice(child_costs);
        let costs = SegmentCosts::new(levels, raw);

        let mut dp = TreeDp::new(&graph, &costs, &params);
        dp.relax(0, 1);

        (dp.choices[levels..].to_vec(), dp.energies[levels..].to_vec())
    }

    #[test]
    fn own_optimum_wins_a_three_way_tie() {
        // Step 2, jump 5: at d = 2 the own optimum 4 costs 7 + 5, both steps cost 10 + 2.
        let (choices, energies) = relax_child(2, 3, &[20, 10, 20, 10, 7]);

        assert_eq!(choices[2], 4);
        assert_eq!(energies[2], 12);
    }

    #[test]
    fn lower_step_wins_over_upper_step() {
        // Step 2, jump 12: own optimum 6 costs 21, both steps from d = 2 cost 12.
        let (choices, energies) = relax_child(2, 10, &[30, 10, 30, 10, 30, 30, 9]);

        assert_eq!(choices[2], 1);
        assert_eq!(energies[2], 12);
    }

    #[test]
    fn following_the_parent_wins_over_a_step() {
        // At d = 1 following costs 10, stepping down costs 8 + 2.
        let (choices, energies) = relax_child(2, 10, &[8, 10, 30, 30, 30]);

        assert_eq!(choices[1], 1);
        assert_eq!(energies[1], 10);
        assert_eq!(choices[0], 0);
        assert_eq!(energies[0], 8);
    }

    #[test]
    fn argmin_prefers_smallest_index() {
        assert_eq!(argmin(&[4, 2, 7, 2]), 1);
        assert_eq!(argmin(&[3]), 0);
    }
}
