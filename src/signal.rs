//! 1-D signal primitives used by the splitter.
//!
//! A region of the page is reduced to a binary profile (one value per row or
//! per column, 1 = blank) with [`blank_profile`]; the profile is then cut into
//! sections with [`partitions`]. Callers may overwrite profile entries with
//! [`FORCED_SPLIT`] to force a cut regardless of the separator length.

use image::GrayImage;
use rayon::prelude::*;

use crate::geometry::Rect;

/// Profile value that forces a section boundary.
pub const FORCED_SPLIT: u8 = u8::MAX;

/// Direction along which a profile is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// One value per row of the region
    Rows,
    /// One value per column of the region
    Columns,
}

/// Ink-count threshold under which a row/column is blank.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold {
    /// Absolute number of ink pixels
    Count(usize),
    /// Fraction of the orthogonal extent of the region, truncated
    Fraction(f32),
}

impl Threshold {
    fn resolve(self, extent: usize) -> usize {
        match self {
            Threshold::Count(n) => n,
            Threshold::Fraction(f) => (f.max(0.0) * extent as f32) as usize,
        }
    }
}

/// Build the blank profile of `region` along `axis`.
///
/// A pixel is ink when its value is `< white_level`. Each output value is 1
/// when the ink count of the row (or column) is strictly below `threshold`,
/// and 0 otherwise. Parts of the region outside the image hold no ink.
///
/// # Examples
///
/// ```
/// use image::{GrayImage, Luma};
/// use layout_oxide::geometry::Rect;
/// use layout_oxide::signal::{blank_profile, Axis, Threshold};
///
/// let mut img = GrayImage::from_pixel(4, 3, Luma([255]));
/// img.put_pixel(1, 1, Luma([0]));
///
/// let rows = blank_profile(&img, Rect::new(0, 0, 4, 3), Axis::Rows, 150, Threshold::Count(1));
/// assert_eq!(rows, vec![1, 0, 1]);
/// let cols = blank_profile(&img, Rect::new(0, 0, 4, 3), Axis::Columns, 150, Threshold::Count(1));
/// assert_eq!(cols, vec![1, 0, 1, 1]);
/// ```
pub fn blank_profile(
    image: &GrayImage,
    region: Rect,
    axis: Axis,
    white_level: u8,
    threshold: Threshold,
) -> Vec<u8> {
    let width = region.width.max(0) as usize;
    let height = region.height.max(0) as usize;
    let clip = region.clamp_to(image.width(), image.height());
    let stride = image.width() as usize;
    let data = image.as_raw();

    match axis {
        Axis::Rows => {
            let limit = threshold.resolve(width);
            (0..height)
                .into_par_iter()
                .map(|dy| {
                    let y = region.y + dy as i32;
                    if clip.is_empty() || y < clip.top() || y >= clip.bottom() {
                        return 0;
                    }
                    let start = y as usize * stride;
                    data[start + clip.left() as usize..start + clip.right() as usize]
                        .iter()
                        .filter(|&&v| v < white_level)
                        .count()
                })
                .map(|count| (count < limit) as u8)
                .collect()
        },
        Axis::Columns => {
            let limit = threshold.resolve(height);
            (0..width)
                .into_par_iter()
                .map(|dx| {
                    let x = region.x + dx as i32;
                    if clip.is_empty() || x < clip.left() || x >= clip.right() {
                        return 0;
                    }
                    (clip.top()..clip.bottom())
                        .filter(|&y| data[y as usize * stride + x as usize] < white_level)
                        .count()
                })
                .map(|count| (count < limit) as u8)
                .collect()
        },
    }
}

/// Find the local maxima of a signal.
///
/// A plateau of equal values yields a single peak at its first position.
/// Peaks are returned by descending value; equal values keep their order.
///
/// # Examples
///
/// ```
/// use layout_oxide::signal::find_peaks;
///
/// assert_eq!(find_peaks(&[0.0, 3.0, 1.0, 5.0, 5.0, 2.0]), vec![3, 1]);
/// assert!(find_peaks(&[]).is_empty());
/// ```
pub fn find_peaks(signal: &[f32]) -> Vec<usize> {
    let n = signal.len();
    let mut is_peak = vec![true; n];

    for i in 1..n {
        if signal[i - 1] > signal[i] || (signal[i - 1] == signal[i] && !is_peak[i - 1]) {
            is_peak[i] = false;
        }
    }
    for i in (0..n.saturating_sub(1)).rev() {
        if signal[i + 1] > signal[i] || (signal[i + 1] == signal[i] && !is_peak[i + 1]) {
            is_peak[i] = false;
        }
    }

    // The backward pass keeps the whole plateau; report its first position only
    let mut peaks: Vec<usize> = (0..n)
        .filter(|&i| is_peak[i] && !(i > 0 && is_peak[i - 1] && signal[i - 1] == signal[i]))
        .collect();
    peaks.sort_by(|&a, &b| signal[b].total_cmp(&signal[a]));
    peaks
}

/// Cut a binary profile into sections.
///
/// Non-zero values are separators. A separator run closes the current section
/// when it is at least `min_separator_size` long, when it contains
/// [`FORCED_SPLIT`], or when it reaches the end of the data. Sections shorter
/// than `min_section_size` are dropped. Sections are half-open `(start, end)`.
///
/// # Examples
///
/// ```
/// use layout_oxide::signal::partitions;
///
/// let data = [1, 0, 0, 0, 1, 1, 0, 0, 1, 1, 1, 0, 0, 1];
/// assert_eq!(partitions(&data, 3, 0), vec![(1, 8), (11, 13)]);
/// ```
pub fn partitions(data: &[u8], min_separator_size: usize, min_section_size: usize) -> Vec<(usize, usize)> {
    split_sections(data, min_separator_size, min_section_size, |v| v != 0, |v| v == FORCED_SPLIT)
}

/// [`partitions`] over an integer signal: values `>= threshold` are
/// separators and `i32::MAX` forces a split.
pub fn partitions_by_threshold(
    data: &[i32],
    threshold: i32,
    min_separator_size: usize,
    min_section_size: usize,
) -> Vec<(usize, usize)> {
    split_sections(data, min_separator_size, min_section_size, |v| v >= threshold, |v| v == i32::MAX)
}

fn split_sections<T: Copy>(
    data: &[T],
    min_separator_size: usize,
    min_section_size: usize,
    is_separator: impl Fn(T) -> bool,
    is_forced: impl Fn(T) -> bool,
) -> Vec<(usize, usize)> {
    let n = data.len();
    let mut sections = Vec::new();

    let mut i = 0;
    while i < n && is_separator(data[i]) {
        i += 1;
    }

    let mut left = i;
    while i < n {
        while i < n && !is_separator(data[i]) {
            i += 1;
        }
        let right = i;

        let mut forced = false;
        while i < n && is_separator(data[i]) {
            forced |= is_forced(data[i]);
            i += 1;
        }

        if i == n || i - right >= min_separator_size || forced {
            if right - left >= min_section_size {
                sections.push((left, right));
            }
            left = i;
        }
    }
    sections
}
