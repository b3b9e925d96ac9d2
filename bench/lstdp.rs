use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cv_lstdp::{prelude::*, lstdp::{Lstdp, Params}};
use image::{Rgb, RgbImage};

fn textured(width: u32, height: u32) -> RgbImage {
    let mut img = RgbImage::new(width, height);
    for (x, y, px) in img.enumerate_pixels_mut() {
        let h = (x * 73 + y * 151) % 255;
        let band: u32 = if (x / 8 + y / 6) % 2 == 0 { 40 } else { 190 };
        *px = Rgb([band as u8, h as u8, (band + h / 4) as u8]);
    }
    img
}

fn lstdp_bench(c: &mut Criterion) {

    // Build a synthetic pair with a constant 8 pixel shift
    let left = textured(320, 240);
    let mut right = RgbImage::new(320, 240);
    for (x, y, px) in right.enumerate_pixels_mut() {
        *px = *left.get_pixel((x + 8).min(319), y);
    }

    // Build disparity alg
    let mut disp = Lstdp::new(Params {
        max_disparity: 32,
        ..Default::default()
    }).unwrap();

    let frame = StereoFrame::new(left, right);

    // Benchmark compute function
    c.bench_function("lstdp textured 320x240", |b| b.iter(|| disp.compute(black_box(&frame))));
}

criterion_group!(benches, lstdp_bench);
criterion_main!(benches);
