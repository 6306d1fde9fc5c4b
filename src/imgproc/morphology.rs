//! Separable grayscale morphology with rectangular windows.
//!
//! Rectangles decompose into a horizontal and a vertical line; each line is
//! filtered with the van Herk / Gil-Werman algorithm, which costs three
//! comparisons per pixel whatever the window size.

use image::GrayImage;
use rayon::prelude::*;

/// Rectangular structuring element of size `(2 * half_width + 1) x (2 * half_height + 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Window {
    /// Half width in pixels
    pub half_width: usize,
    /// Half height in pixels
    pub half_height: usize,
}

impl Window {
    /// Create a rectangular window.
    pub fn new(half_width: usize, half_height: usize) -> Self {
        Self {
            half_width,
            half_height,
        }
    }

    /// Horizontal line of `2 * half + 1` pixels.
    pub fn horizontal(half: usize) -> Self {
        Self::new(half, 0)
    }

    /// Vertical line of `2 * half + 1` pixels.
    pub fn vertical(half: usize) -> Self {
        Self::new(0, half)
    }
}

#[derive(Clone, Copy)]
enum Op {
    Min,
    Max,
}

impl Op {
    #[inline]
    fn apply(self, a: u8, b: u8) -> u8 {
        match self {
            Op::Min => a.min(b),
            Op::Max => a.max(b),
        }
    }

    /// Value that never wins the comparison.
    fn identity(self) -> u8 {
        match self {
            Op::Min => u8::MAX,
            Op::Max => 0,
        }
    }
}

/// Grayscale erosion (min filter). Ink grows by the window.
pub fn erode(image: &GrayImage, window: Window) -> GrayImage {
    filter(image, window, Op::Min)
}

/// Grayscale dilation (max filter). Background grows by the window.
pub fn dilate(image: &GrayImage, window: Window) -> GrayImage {
    filter(image, window, Op::Max)
}

/// Opening: erosion followed by dilation.
///
/// # Examples
///
/// ```
/// use image::{GrayImage, Luma};
/// use layout_oxide::imgproc::{open, Window};
///
/// // Two ink dots separated by a 1-pixel gap merge under a 3-pixel line
/// let mut img = GrayImage::from_pixel(5, 1, Luma([255]));
/// img.put_pixel(1, 0, Luma([0]));
/// img.put_pixel(3, 0, Luma([0]));
/// let out = open(&img, Window::horizontal(1));
/// assert_eq!(out.get_pixel(2, 0)[0], 0);
/// ```
pub fn open(image: &GrayImage, window: Window) -> GrayImage {
    dilate(&erode(image, window), window)
}

/// Closing: dilation followed by erosion.
pub fn close(image: &GrayImage, window: Window) -> GrayImage {
    erode(&dilate(image, window), window)
}

fn filter(image: &GrayImage, window: Window, op: Op) -> GrayImage {
    let (width, height) = image.dimensions();
    let (w, h) = (width as usize, height as usize);
    let mut data = image.as_raw().clone();
    if w == 0 || h == 0 {
        return image.clone();
    }

    if window.half_width > 0 {
        data.par_chunks_mut(w).for_each_init(
            || LineFilter::new(w, window.half_width),
            |lf, row| lf.run(row, op),
        );
    }

    if window.half_height > 0 {
        let mut column = vec![0u8; h];
        let mut lf = LineFilter::new(h, window.half_height);
        for x in 0..w {
            for y in 0..h {
                column[y] = data[y * w + x];
            }
            lf.run(&mut column, op);
            for y in 0..h {
                data[y * w + x] = column[y];
            }
        }
    }

    GrayImage::from_raw(width, height, data).unwrap_or_else(|| image.clone())
}

/// Scratch buffers for a 1-D van Herk filter over lines of a fixed length.
struct LineFilter {
    half: usize,
    padded: Vec<u8>,
    prefix: Vec<u8>,
    suffix: Vec<u8>,
}

impl LineFilter {
    fn new(len: usize, half: usize) -> Self {
        let m = len + 2 * half;
        Self {
            half,
            padded: vec![0; m],
            prefix: vec![0; m],
            suffix: vec![0; m],
        }
    }

    fn run(&mut self, line: &mut [u8], op: Op) {
        let k = 2 * self.half + 1;
        let n = line.len();
        let m = n + 2 * self.half;

        // Pixels outside the image never win
        self.padded.fill(op.identity());
        self.padded[self.half..self.half + n].copy_from_slice(line);

        for j in 0..m {
            self.prefix[j] = if j % k == 0 {
                self.padded[j]
            } else {
                op.apply(self.prefix[j - 1], self.padded[j])
            };
        }
        for j in (0..m).rev() {
            self.suffix[j] = if j == m - 1 || (j + 1) % k == 0 {
                self.padded[j]
            } else {
                op.apply(self.suffix[j + 1], self.padded[j])
            };
        }

        // Window [i, i + k) of the padded line is centred on pixel i of the input
        for (i, v) in line.iter_mut().enumerate() {
            *v = op.apply(self.suffix[i], self.prefix[i + k - 1]);
        }
    }
}
