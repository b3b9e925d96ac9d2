//! # General disparity objects
//!
//! This module provides generic disparity traits and structures shared by the pipeline stages.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use image::{GrayImage, RgbImage};
use crate::error::*;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// A rectified colour stereo pair.
pub struct StereoFrame {
    pub left: RgbImage,
    pub right: RgbImage
}

/// A disparity map holding one integer disparity level per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisparityMap {
    width: usize,
    height: usize,
    data: Vec<u8>,
    pub max_disp: Option<u8>,
    pub min_disp: Option<u8>
}

// -----------------------------------------------------------------------------------------------
// TRAITS
// -----------------------------------------------------------------------------------------------

pub trait DisparityAlgorithm {
    /// Compute the disparity map of the given stereo frame.
    fn compute(&mut self, frame: &StereoFrame) -> Result<DisparityMap>;
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl StereoFrame {
    pub fn new(left: RgbImage, right: RgbImage) -> Self {
        Self { left, right }
    }

    pub fn width(&self) -> u32 {
        self.left.width()
    }

    pub fn height(&self) -> u32 {
        self.left.height()
    }

    /// Check that both views are non-empty and share the same dimensions.
    pub fn validate(&self) -> Result<()> {
        let left = self.left.dimensions();
        let right = self.right.dimensions();

        if left != right {
            return Err(Error::DimensionMismatch { left, right });
        }

        if left.0 == 0 || left.1 == 0 {
            return Err(Error::EmptyImage);
        }

        Ok(())
    }
}

impl DisparityMap {
    pub fn new(width: usize, height: usize) -> Self {
        DisparityMap {
            width,
            height,
            data: vec![0; width * height],
            min_disp: None,
            max_disp: None
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    pub fn put(&mut self, x: usize, y: usize, val: u8) {
        self.data[y * self.width + x] = val;
    }

    /// Raw row-major disparity levels.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Recompute `min_disp`/`max_disp` from the stored values.
    pub fn update_range(&mut self) {
        self.min_disp = self.data.iter().copied().min();
        self.max_disp = self.data.iter().copied().max();
    }

    /// Converts the map into a Luma8 image holding the raw disparity levels.
    pub fn to_luma(&self) -> GrayImage {
        let mut new = GrayImage::new(self.width as u32, self.height as u32);

        for (x, y, px) in new.enumerate_pixels_mut() {
            *px = image::Luma([self.get(x as usize, y as usize)]);
        }

        new
    }

    /// Converts the map to a normalised GrayImage.
    ///
    /// Normalises by the maximum observed disparity in the map. If the maximum disparity is not
    /// set (or is zero) then the function is equivalent to `.to_luma()`.
    pub fn to_luma_normalised(&self) -> GrayImage {
        let mult = match self.max_disp {
            Some(d) if d > 0 => 255.0 / d as f32,
            _ => 1.0
        };

        let mut new = GrayImage::new(self.width as u32, self.height as u32);

        for (x, y, px) in new.enumerate_pixels_mut() {
            let mut val = self.get(x as usize, y as usize) as f32 * mult;

            if val > 255.0 {
                val = 255.0;
            }

            *px = image::Luma([val as u8]);
        }

        new
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
