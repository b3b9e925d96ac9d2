//! End to end disparity computation on synthetic stereo pairs.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

mod common;

use common::{ramp, shift_left, textured};
use cv_lstdp::lstdp::{Lstdp, Params, Traversal};
use cv_lstdp::{prelude::*, Error};
use image::{Rgb, RgbImage};

// -----------------------------------------------------------------------------------------------
// HELPERS
// -----------------------------------------------------------------------------------------------

fn params(max_disparity: usize) -> Params {
    Params {
        max_disparity,
        ..Default::default()
    }
}

fn run(params: Params, left: RgbImage, right: RgbImage) -> Result<DisparityMap, Error> {
    let mut alg = Lstdp::new(params)?;
    alg.compute(&StereoFrame::new(left, right))
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------

#[test]
fn identical_views_without_search_range_give_zero() -> Result<(), Box<dyn std::error::Error>> {
    let img = ramp(4, 4);
    let disp = run(params(0), img.clone(), img)?;

    assert!(disp.as_slice().iter().all(|&d| d == 0));
    assert_eq!(disp.max_disp, Some(0));

    Ok(())
}

#[test]
fn shifted_view_recovers_the_shift() -> Result<(), Box<dyn std::error::Error>> {
    let left = ramp(4, 4);
    let right = shift_left(&left, 2);
    let disp = run(params(2), left, right)?;

    for y in 0..4 {
        for x in 2..4 {
            assert_eq!(disp.get(x, y), 2, "pixel ({}, {})", x, y);
        }
    }

    Ok(())
}

#[test]
fn uniform_pair_takes_the_cheapest_level() -> Result<(), Box<dyn std::error::Error>> {
    let img = RgbImage::from_pixel(8, 4, Rgb([120, 60, 30]));
    let disp = run(params(4), img.clone(), img)?;

    // Every level above zero pays the out-of-image cost on the leftmost pixels.
    assert!(disp.as_slice().iter().all(|&d| d == 0));

    Ok(())
}

#[test]
fn output_matches_input_size_and_range() -> Result<(), Box<dyn std::error::Error>> {
    let left = textured(24, 10);
    let right = shift_left(&left, 3);
    let disp = run(params(6), left, right)?;

    assert_eq!((disp.width(), disp.height()), (24, 10));
    assert!(disp.as_slice().iter().all(|&d| d <= 6));
    assert_eq!(disp.to_luma().dimensions(), (24, 10));

    Ok(())
}

#[test]
fn repeated_runs_are_identical() -> Result<(), Box<dyn std::error::Error>> {
    let left = textured(20, 12);
    let right = shift_left(&left, 2);
    let frame = StereoFrame::new(left, right);

    let mut alg = Lstdp::new(params(5))?;
    let first = alg.compute(&frame)?;
    let second = alg.compute(&frame)?;
    assert_eq!(first, second);

    let mut recursive = Lstdp::new(Params {
        traversal: Traversal::Recursive,
        ..params(5)
    })?;
    assert_eq!(first, recursive.compute(&frame)?);

    Ok(())
}

#[test]
fn deep_trees_do_not_exhaust_the_stack() -> Result<(), Box<dyn std::error::Error>> {
    // A single column links every row into one long chain.
    let mut img = RgbImage::new(1, 20_000);
    for (_, y, px) in img.enumerate_pixels_mut() {
        *px = Rgb([(y % 7 * 30) as u8, 0, 0]);
    }

    let disp = run(params(2), img.clone(), img)?;
    assert_eq!(disp.height(), 20_000);

    Ok(())
}

#[test]
fn invalid_configuration_is_rejected() {
    assert_eq!(
        Lstdp::new(params(241)).err(),
        Some(Error::MaxDisparityOutOfRange(241))
    );

    let zero_t = Params {
        segment: cv_lstdp::lstdp::SegmentParams {
            t: 0,
            ..Default::default()
        },
        ..Default::default()
    };
    assert_eq!(Lstdp::new(zero_t).err(), Some(Error::InvalidSegmentThreshold));
}

#[test]
fn mismatched_views_are_rejected() {
    let result = run(params(4), RgbImage::new(8, 4), RgbImage::new(8, 5));

    assert_eq!(
        result.err(),
        Some(Error::DimensionMismatch { left: (8, 4), right: (8, 5) })
    );
}
