//! # Colour envelopes
//!
//! For every pixel the per-channel min and max of its own value and the half-way values
//! towards its horizontal neighbours. Matching against this band rather than a single sample
//! makes the cost insensitive to sub-pixel shifts.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use image::{Rgb, RgbImage};

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

pub struct Envelope {
    pub mn: RgbImage,
    pub mx: RgbImage
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl Envelope {
    pub fn new(src: &RgbImage) -> Self {
        let (width, height) = src.dimensions();
        let mut mn = RgbImage::new(width, height);
        let mut mx = RgbImage::new(width, height);

        for y in 0..height {
            for x in 0..width {
                let vl = src.get_pixel(x, y).0;
                let left = if x > 0 { Some(src.get_pixel(x - 1, y).0) } else { None };
                let right = if x + 1 < width { Some(src.get_pixel(x + 1, y).0) } else { None };

                let mut lo = vl;
                let mut hi = vl;
                for c in 0..3 {
                    for n in left.iter().chain(right.iter()) {
                        let half = ((vl[c] as u16 + n[c] as u16) / 2) as u8;
                        lo[c] = lo[c].min(half);
                        hi[c] = hi[c].max(half);
                    }
                }

                mn.put_pixel(x, y, Rgb(lo));
                mx.put_pixel(x, y, Rgb(hi));
            }
        }

        Self { mn, mx }
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_spans_half_way_to_neighbours() {
        let mut img = RgbImage::new(3, 1);
        img.put_pixel(0, 0, Rgb([0, 100, 255]));
        img.put_pixel(1, 0, Rgb([100, 100, 100]));
        img.put_pixel(2, 0, Rgb([201, 100, 0]));

        let env = Envelope::new(&img);

        assert_eq!(env.mn.get_pixel(1, 0).0, [50, 100, 50]);
        assert_eq!(env.mx.get_pixel(1, 0).0, [150, 100, 177]);

        // Borders only see one neighbour.
        assert_eq!(env.mn.get_pixel(0, 0).0, [0, 100, 177]);
        assert_eq!(env.mx.get_pixel(0, 0).0, [50, 100, 255]);
        assert_eq!(env.mn.get_pixel(2, 0).0, [150, 100, 0]);
        assert_eq!(env.mx.get_pixel(2, 0).0, [201, 100, 50]);
    }

    #[test]
    fn single_column_envelope_is_the_pixel() {
        let img = RgbImage::from_pixel(1, 2, Rgb([9, 8, 7]));
        let env = Envelope::new(&img);
        assert_eq!(env.mn, img);
        assert_eq!(env.mx, img);
    }
}
