//! Synthetic stereo pairs shared by the integration tests.

use image::{Rgb, RgbImage};

/// Rows of `[0, 80, 160, 240, ...]` grey ramps.
pub fn ramp(width: u32, height: u32) -> RgbImage {
    let mut img = RgbImage::new(width, height);
    for (x, _, px) in img.enumerate_pixels_mut() {
        let v = ((x * 80) % 256) as u8;
        *px = Rgb([v, v, v]);
    }
    img
}

/// Deterministic textured colour image.
pub fn textured(width: u32, height: u32) -> RgbImage {
    let mut img = RgbImage::new(width, height);
    for (x, y, px) in img.enumerate_pixels_mut() {
        let h = (x * 73 + y * 151) % 255;
        let band: u32 = if (x / 4 + y / 3) % 2 == 0 { 40 } else { 190 };
        *px = Rgb([band as u8, h as u8, (band + h / 4) as u8]);
    }
    img
}

/// `img` moved `shift` columns to the left, replicating the right edge.
pub fn shift_left(img: &RgbImage, shift: u32) -> RgbImage {
    let (w, h) = img.dimensions();
    let mut out = RgbImage::new(w, h);
    for (x, y, px) in out.enumerate_pixels_mut() {
        *px = *img.get_pixel((x + shift).min(w - 1), y);
    }
    out
}
