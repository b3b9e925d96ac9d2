//! # Scanline segmentation
//!
//! Splits each row of the left image into colour-homogeneous horizontal runs. Boundaries are
//! first placed greedily, then snapped to the strongest nearby colour edge, and finally
//! dropped if no other boundary lies near them.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use image::{Rgb, RgbImage};
use log::debug;

use super::params::SegmentParams;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Per-pixel segment ids in raster order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentMap {
    width: usize,
    height: usize,
    ids: Vec<usize>,
    count: usize
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl SegmentMap {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of segments, ids are `0..count`.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn id(&self, x: usize, y: usize) -> usize {
        self.ids[y * self.width + x]
    }

    pub fn row(&self, y: usize) -> &[usize] {
        &self.ids[y * self.width..(y + 1) * self.width]
    }
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Sum of absolute per-channel differences.
pub fn rgb_diff(a: &Rgb<u8>, b: &Rgb<u8>) -> i32 {
    a.0.iter()
        .zip(b.0.iter())
        .map(|(&p, &q)| (p as i32 - q as i32).abs())
        .sum()
}

/// Segment the image into scanline runs.
pub fn segment_image(img: &RgbImage, params: &SegmentParams) -> SegmentMap {
    let width = img.width() as usize;
    let height = img.height() as usize;

    let mut marks = vec![false; width * height];

    for y in 0..height {
        let row = &mut marks[y * width..(y + 1) * width];
        mark_row(img, y, params.t, row);
        reposition_row(img, y, params.max_adjust_x, row);
    }

    remove_isolated(&mut marks, width, height, params.rx, params.ry);

    // Column 0 is always marked, so the first increment takes the counter to zero.
    let mut ids = Vec::with_capacity(width * height);
    let mut count = 0usize;
    for &mark in marks.iter() {
        if mark {
            count += 1;
        }
        ids.push(count - 1);
    }

    debug!("Segmented {}x{} image into {} segments", width, height, count);

    SegmentMap {
        width,
        height,
        ids,
        count
    }
}

/// Greedy boundary placement along one row.
fn mark_row(img: &RgbImage, y: usize, t: u32, row: &mut [bool]) {
    if row.is_empty() {
        return;
    }

    row[0] = true;

    let first = img.get_pixel(0, y as u32).0;
    let mut mn = first;
    let mut mx = first;

    for x in 1..row.len() {
        let p = img.get_pixel(x as u32, y as u32).0;

        let mut to_mark = false;
        for c in 0..3 {
            if p[c] < mn[c] {
                mn[c] = p[c];
            }
            else if p[c] > mx[c] {
                mx[c] = p[c];
            }

            if (mx[c] - mn[c]) as u32 > t {
                to_mark = true;
                break;
            }
        }

        if to_mark {
            row[x] = true;
            mn = p;
            mx = p;
        }
    }
}

/// Move each boundary to the strongest colour edge within `max_adjust` pixels, without
/// crossing a neighbouring boundary.
fn reposition_row(img: &RgbImage, y: usize, max_adjust: usize, row: &mut [bool]) {
    let y = y as u32;
    let edge = |x: usize| rgb_diff(img.get_pixel(x as u32, y), img.get_pixel(x as u32 - 1, y));

    for x in 1..row.len() {
        if !row[x] {
            continue;
        }

        let mut max_diff = edge(x);
        let mut max_x = x;

        let lo = x.saturating_sub(max_adjust).max(1);
        for x1 in (lo..x).rev() {
            if row[x1] {
                break;
            }
            let diff = edge(x1);
            if diff > max_diff {
                max_diff = diff;
                max_x = x1;
            }
        }

        let hi = (x + max_adjust).min(row.len() - 1);
        for x1 in x + 1..=hi {
            if row[x1] {
                break;
            }
            let diff = edge(x1);
            if diff > max_diff {
                max_diff = diff;
                max_x = x1;
            }
        }

        if max_x != x {
            row[x] = false;
            row[max_x] = true;
        }
    }
}

/// Drop boundaries with no other boundary in their `(2rx+1) x (2ry+1)` neighbourhood.
fn remove_isolated(marks: &mut [bool], width: usize, height: usize, rx: usize, ry: usize) {
    let mut removed = 0usize;

    for y in 0..height {
        for x in 1..width {
            if !marks[y * width + x] {
                continue;
            }

            let y0 = y.saturating_sub(ry);
            let y1 = (y + ry).min(height - 1);
            let x0 = x.saturating_sub(rx);
            let x1 = (x + rx).min(width - 1);

            let supported = (y0..=y1).any(|ny| {
                (x0..=x1).any(|nx| (nx != x || ny != y) && marks[ny * width + nx])
            });

            if !supported {
                marks[y * width + x] = false;
                removed += 1;
            }
        }
    }

    log::trace!("Removed {} isolated segment boundaries", removed);
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
