//! # Segment graph
//!
//! Segment geometry and mean colour, plus the spanning tree grown over the segment adjacency
//! graph. The tree is stored inside the segment records as first-child/next-sibling indices.
//!
//! Growth is Prim-like: candidate edges are dropped into buckets keyed by a quantised
//! dissimilarity score and taken lowest bucket first, first in first out within a bucket.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::ops::RangeInclusive;

use image::RgbImage;
use log::{debug, trace, warn};

use super::segment::SegmentMap;
use crate::error::*;

// -----------------------------------------------------------------------------------------------
// CONSTANTS
// -----------------------------------------------------------------------------------------------

/// Highest edge score, scores are quantised into `0..=EDGE_DIFF_MAX`.
pub const EDGE_DIFF_MAX: usize = 1024;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Tree membership of a segment, together with the head of its child list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeLink {
    NotInTree,
    NoChildren,
    FirstChild(usize)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub y: usize,
    pub x_beg: usize,
    pub x_end: usize,

    /// Mean colour of the run.
    pub color: [i32; 3],

    pub link: TreeLink,
    pub next_sibling: Option<usize>
}

pub struct SegmentGraph {
    segments: Vec<Segment>,
    width: usize,
    height: usize,
    max_len: usize
}

/// Iterator over the children of one tree node, most recently attached first.
pub struct Children<'a> {
    segments: &'a [Segment],
    next: Option<usize>
}

#[derive(Default)]
struct Bucket {
    edges: Vec<(usize, usize)>,
    cursor: usize
}

/// Bounded-range priority queue of candidate `(from, to)` edges.
///
/// Extraction scans forward from `lowest`. An edge pushed below `lowest` moves it back down
/// to that bucket; when every new edge scores at or above the current bucket this never
/// happens and the scan is purely forward.
struct EdgeBuckets {
    buckets: Vec<Bucket>,
    lowest: usize
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl Segment {
    pub fn len(&self) -> usize {
        self.x_end - self.x_beg
    }

    pub fn in_tree(&self) -> bool {
        self.link != TreeLink::NotInTree
    }

    /// Sum of absolute channel differences of the mean colours.
    pub fn color_diff(&self, other: &Segment) -> i64 {
        self.color
            .iter()
            .zip(other.color.iter())
            .map(|(&a, &b)| (a - b).abs() as i64)
            .sum()
    }

    /// Contact length with an adjacent segment: 1 on the same row, otherwise the length of
    /// the shared column range.
    pub fn overlap(&self, other: &Segment) -> i64 {
        if self.y == other.y {
            return 1;
        }

        let beg = self.x_beg.max(other.x_beg);
        let end = self.x_end.min(other.x_end);

        if end > beg {
            (end - beg) as i64
        }
        else {
            0
        }
    }
}

impl SegmentGraph {
    /// Collect the geometry and mean colour of every segment of `map`.
    pub fn new(img: &RgbImage, map: &SegmentMap) -> Self {
        let mut segments: Vec<Segment> = Vec::with_capacity(map.count());
        let mut sums: Vec<[u32; 3]> = Vec::with_capacity(map.count());

        for y in 0..map.height() {
            for (x, &id) in map.row(y).iter().enumerate() {
                if id == segments.len() {
                    segments.push(Segment {
                        y,
                        x_beg: x,
                        x_end: x,
                        color: [0; 3],
                        link: TreeLink::NotInTree,
                        next_sibling: None
                    });
                    sums.push([0; 3]);
                }

                let px = img.get_pixel(x as u32, y as u32).0;
                for c in 0..3 {
                    sums[id][c] += px[c] as u32;
                }
                segments[id].x_end = x + 1;
            }
        }

        for (seg, sum) in segments.iter_mut().zip(sums.iter()) {
            let len = seg.len() as u32;
            for c in 0..3 {
                seg.color[c] = (sum[c] / len) as i32;
            }
        }

        let max_len = segments.iter().map(Segment::len).max().unwrap_or(0);

        Self {
            segments,
            width: map.width(),
            height: map.height(),
            max_len
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn children(&self, id: usize) -> Children<'_> {
        let next = match self.segments[id].link {
            TreeLink::FirstChild(c) => Some(c),
            _ => None
        };

        Children {
            segments: &self.segments,
            next
        }
    }

    /// Segments sharing an edge with `id`: left, right, then the overlapping runs of the row
    /// above and of the row below, each in increasing id order.
    pub fn neighbours(&self, id: usize, map: &SegmentMap) -> impl Iterator<Item = usize> {
        let seg = &self.segments[id];

        let left = if seg.x_beg > 0 { Some(id - 1) } else { None };
        let right = if seg.x_end < self.width { Some(id + 1) } else { None };

        let span = |y: usize| -> RangeInclusive<usize> {
            map.id(seg.x_beg, y)..=map.id(seg.x_end - 1, y)
        };

        let up = if seg.y > 0 { Some(span(seg.y - 1)) } else { None };
        let down = if seg.y + 1 < self.height { Some(span(seg.y + 1)) } else { None };

        left.into_iter()
            .chain(right)
            .chain(up.into_iter().flatten())
            .chain(down.into_iter().flatten())
    }

    /// Quantised dissimilarity of the edge `a -> b`; long contact and similar colour score low.
    pub fn edge_score(&self, a: usize, b: usize) -> usize {
        let sa = &self.segments[a];
        let sb = &self.segments[b];

        let max_len255 = 255 * self.max_len as i64;
        let similarity = 255 - sa.color_diff(sb) / 3;
        let score = (max_len255 - sa.overlap(sb) * similarity) * EDGE_DIFF_MAX as i64
            / max_len255;

        score.max(0).min(EDGE_DIFF_MAX as i64) as usize
    }

    /// Grow the spanning tree from segment 0.
    ///
    /// Fails if some segment cannot be reached, the graph is left partially linked.
    pub fn grow_tree(&mut self, map: &SegmentMap) -> Result<()> {
        let total = self.segments.len();
        if total == 0 {
            return Ok(());
        }

        let mut buckets = EdgeBuckets::new();

        self.segments[0].link = TreeLink::NoChildren;
        self.enqueue_neighbours(0, map, &mut buckets);

        for spanned in 1..total {
            let (from, to) = loop {
                match buckets.pop() {
                    Some((_, to)) if self.segments[to].in_tree() => continue,
                    Some(edge) => break edge,
                    None => {
                        warn!(
                            "Tree growth ran out of edges after {} of {} segments",
                            spanned,
                            total
                        );
                        return Err(Error::DisconnectedGraph { spanned, total });
                    }
                }
            };

            self.attach(from, to);
            self.enqueue_neighbours(to, map, &mut buckets);
        }

        debug!(
            "Grew segment tree over {} segments from {} candidate edges",
            total,
            buckets.pushed()
        );

        Ok(())
    }

    fn enqueue_neighbours(&self, from: usize, map: &SegmentMap, buckets: &mut EdgeBuckets) {
        for to in self.neighbours(from, map) {
            if !self.segments[to].in_tree() {
                buckets.push(self.edge_score(from, to), from, to);
            }
        }
    }

    /// Link `child` at the head of `parent`'s child list.
    fn attach(&mut self, parent: usize, child: usize) {
        let head = match self.segments[parent].link {
            TreeLink::FirstChild(c) => Some(c),
            _ => None
        };

        self.segments[child].next_sibling = head;
        self.segments[child].link = TreeLink::NoChildren;
        self.segments[parent].link = TreeLink::FirstChild(child);

        trace!("Attached segment {} under {}", child, parent);
    }
}

impl<'a> Iterator for Children<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let cur = self.next?;
        self.next = self.segments[cur].next_sibling;
        Some(cur)
    }
}

impl EdgeBuckets {
    fn new() -> Self {
        let mut buckets = Vec::with_capacity(EDGE_DIFF_MAX + 1);
        buckets.resize_with(EDGE_DIFF_MAX + 1, Bucket::default);

        Self {
            buckets,
            lowest: 0
        }
    }

    fn push(&mut self, score: usize, from: usize, to: usize) {
        self.buckets[score].edges.push((from, to));

        if score < self.lowest {
            self.lowest = score;
        }
    }

    /// Take the oldest edge from the lowest non-exhausted bucket.
    fn pop(&mut self) -> Option<(usize, usize)> {
        while self.lowest <= EDGE_DIFF_MAX {
            let bucket = &mut self.buckets[self.lowest];

            if let Some(&edge) = bucket.edges.get(bucket.cursor) {
                bucket.cursor += 1;
                return Some(edge);
            }

            self.lowest += 1;
        }

        None
    }

    fn pushed(&self) -> usize {
        self.buckets.iter().map(|b| b.edges.len()).sum()
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
