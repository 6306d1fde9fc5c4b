//! Separable gaussian blur with independent horizontal and vertical sigma.

use image::GrayImage;
use rayon::prelude::*;

fn kernel(sigma: f32) -> Vec<f32> {
    let radius = (3.0 * sigma).ceil() as usize;
    let denom = 2.0 * sigma * sigma;
    let mut k: Vec<f32> = (0..=2 * radius)
        .map(|i| {
            let d = i as f32 - radius as f32;
            (-(d * d) / denom).exp()
        })
        .collect();
    let sum: f32 = k.iter().sum();
    k.iter_mut().for_each(|v| *v /= sum);
    k
}

fn convolve(line: &[f32], kernel: &[f32], border: f32, out: &mut [f32]) {
    let radius = (kernel.len() / 2) as isize;
    let n = line.len() as isize;
    for (i, o) in out.iter_mut().enumerate() {
        let mut acc = 0.0;
        for (j, &w) in kernel.iter().enumerate() {
            let p = i as isize + j as isize - radius;
            let v = if p < 0 || p >= n { border } else { line[p as usize] };
            acc += w * v;
        }
        *o = acc;
    }
}

/// Blur with a gaussian of standard deviation `sigma_x` along rows and
/// `sigma_y` along columns, in place.
///
/// Each kernel has radius `ceil(3 * sigma)`; samples outside the image read
/// as `border`. A non-positive sigma leaves that axis untouched.
pub fn gaussian_directional(image: &mut GrayImage, sigma_x: f32, sigma_y: f32, border: u8) {
    let (width, height) = image.dimensions();
    let (w, h) = (width as usize, height as usize);
    if w == 0 || h == 0 {
        return;
    }
    let border = border as f32;
    let mut buf: Vec<f32> = image.as_raw().iter().map(|&v| v as f32).collect();

    if sigma_x > 0.0 {
        let k = kernel(sigma_x);
        buf.par_chunks_mut(w).for_each(|row| {
            let src = row.to_vec();
            convolve(&src, &k, border, row);
        });
    }

    if sigma_y > 0.0 {
        let k = kernel(sigma_y);
        let mut column = vec![0.0f32; h];
        let mut out = vec![0.0f32; h];
        for x in 0..w {
            for y in 0..h {
                column[y] = buf[y * w + x];
            }
            convolve(&column, &k, border, &mut out);
            for y in 0..h {
                buf[y * w + x] = out[y];
            }
        }
    }

    for (dst, v) in image.iter_mut().zip(buf) {
        *dst = v.round().clamp(0.0, 255.0) as u8;
    }
}
