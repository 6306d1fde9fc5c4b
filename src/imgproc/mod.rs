//! Grayscale image operators for layout analysis.
//!
//! Pages are 8-bit grayscale images with dark ink on a white background.
//! Following the usual morphology conventions on such pages:
//!
//! - [`erode`] (min filter) grows ink, [`dilate`] (max filter) grows background
//! - [`open`] fills background gaps narrower than the window, merging
//!   letters into words and words into blocks
//! - [`close`] removes ink features narrower than the window
//!
//! The line extractor additionally needs a directional blur
//! ([`gaussian_directional`]), a geodesic [`reconstruct_by_erosion`] and a
//! marker-free [`watershed`].

mod gaussian;
mod morphology;
mod reconstruction;
mod watershed;

pub use gaussian::gaussian_directional;
pub use morphology::{close, dilate, erode, open, Window};
pub use reconstruction::reconstruct_by_erosion;
pub use watershed::watershed;

use image::{GrayImage, ImageBuffer, Luma};

use crate::error::{Error, Result};

/// Per-pixel label image produced by the watershed (0 = watershed line).
pub type LabelImage = ImageBuffer<Luma<u16>, Vec<u16>>;

/// Import an 8-bit buffer whose rows are `stride` bytes apart.
///
/// # Errors
///
/// Returns [`Error::InvalidImage`] if `stride < width` or the buffer is too
/// short for `height` rows.
///
/// # Examples
///
/// ```
/// use layout_oxide::imgproc::gray_from_strided;
///
/// // 2x2 image stored with 4 bytes per row
/// let data = [10, 20, 0, 0, 30, 40, 0, 0];
/// let img = gray_from_strided(2, 2, 4, &data).unwrap();
/// assert_eq!(img.get_pixel(1, 1)[0], 40);
/// ```
pub fn gray_from_strided(width: u32, height: u32, stride: usize, data: &[u8]) -> Result<GrayImage> {
    let w = width as usize;
    let h = height as usize;
    if stride < w {
        return Err(Error::InvalidImage(format!("stride {} is smaller than width {}", stride, w)));
    }
    let needed = if h == 0 { 0 } else { (h - 1) * stride + w };
    if data.len() < needed {
        return Err(Error::InvalidImage(format!(
            "buffer holds {} bytes, {}x{} with stride {} needs {}",
            data.len(),
            w,
            h,
            stride,
            needed
        )));
    }

    let mut pixels = Vec::with_capacity(w * h);
    for row in 0..h {
        pixels.extend_from_slice(&data[row * stride..row * stride + w]);
    }
    GrayImage::from_raw(width, height, pixels)
        .ok_or_else(|| Error::InvalidImage("pixel buffer size mismatch".to_string()))
}
