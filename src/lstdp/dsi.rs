//! # Disparity space image
//!
//! Per-pixel matching costs for every candidate disparity. Costs are the symmetric,
//! envelope-clipped colour difference between the left pixel and the right pixel `d` columns
//! to its left, trimmed per channel and averaged over the channels.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use image::RgbImage;
use log::debug;
use ndarray::{Array3, ArrayView1, ArrayViewMut2, s};

use super::envelope::Envelope;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Matching costs laid out as `(disparity, row, column)`.
pub struct CostVolume {
    costs: Array3<u8>
}

/// Everything one disparity level needs to fill its slice.
struct Matcher<'a> {
    left: &'a RgbImage,
    right: &'a RgbImage,
    left_env: &'a Envelope,
    right_env: &'a Envelope,
    trim_diff: u8,
    out_diff: u8
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl CostVolume {
    /// Build the cost volume for disparities `0..levels`.
    ///
    /// Both images must have the same dimensions.
    pub fn new(
        left: &RgbImage,
        right: &RgbImage,
        levels: usize,
        trim_diff: u8,
        out_diff: u8
    ) -> Self {
        let (width, height) = left.dimensions();
        let left_env = Envelope::new(left);
        let right_env = Envelope::new(right);

        let matcher = Matcher {
            left,
            right,
            left_env: &left_env,
            right_env: &right_env,
            trim_diff,
            out_diff
        };

        let mut costs = Array3::<u8>::zeros((levels, height as usize, width as usize));

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            costs
                .outer_iter_mut()
                .into_par_iter()
                .enumerate()
                .for_each(|(d, level)| matcher.fill_level(d, level));
        }

        #[cfg(not(feature = "parallel"))]
        for (d, level) in costs.outer_iter_mut().enumerate() {
            matcher.fill_level(d, level);
        }

        debug!("Built {}x{}x{} cost volume", levels, height, width);

        Self { costs }
    }

    pub fn levels(&self) -> usize {
        self.costs.dim().0
    }

    pub fn get(&self, d: usize, x: usize, y: usize) -> u8 {
        self.costs[[d, y, x]]
    }

    /// Costs of columns `x_beg..x_end` of row `y` at disparity `d`.
    pub fn span(&self, d: usize, y: usize, x_beg: usize, x_end: usize) -> ArrayView1<'_, u8> {
        self.costs.slice(s![d, y, x_beg..x_end])
    }
}

impl<'a> Matcher<'a> {
    fn fill_level(&self, d: usize, mut level: ArrayViewMut2<u8>) {
        let (height, width) = level.dim();

        for y in 0..height {
            let mut row = level.row_mut(y);

            for x in 0..d.min(width) {
                row[x] = self.out_diff;
            }

            for x in d..width {
                row[x] = self.cost(x as u32, y as u32, d as u32);
            }
        }
    }

    fn cost(&self, x: u32, y: u32, d: u32) -> u8 {
        let xr = x - d;

        let cl_left = self.left.get_pixel(x, y).0;
        let mn_left = self.left_env.mn.get_pixel(x, y).0;
        let mx_left = self.left_env.mx.get_pixel(x, y).0;

        let cl_right = self.right.get_pixel(xr, y).0;
        let mn_right = self.right_env.mn.get_pixel(xr, y).0;
        let mx_right = self.right_env.mx.get_pixel(xr, y).0;

        let mut diff = 0u32;
        for c in 0..3 {
            let diff_left = outside(cl_left[c], mn_right[c], mx_right[c]);
            let diff_right = outside(cl_right[c], mn_left[c], mx_left[c]);

            diff += self.trim_diff.min(diff_left).min(diff_right) as u32;
        }

        (diff / 3) as u8
    }
}

/// Distance of `v` from the band `[mn, mx]`, zero inside it.
fn outside(v: u8, mn: u8, mx: u8) -> u8 {
    if v < mn {
        mn - v
    }
    else if v > mx {
        v - mx
    }
    else {
        0
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
