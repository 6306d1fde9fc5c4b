//! Meyer's flooding watershed (4-connectivity).

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use image::GrayImage;

use super::LabelImage;
use crate::error::{Error, Result};

const UNLABELLED: u32 = 0;
const IN_QUEUE: u32 = u32::MAX - 1;
const WATERSHED: u32 = u32::MAX;

fn neighbours(p: usize, w: usize, h: usize) -> impl Iterator<Item = usize> {
    let (x, y) = (p % w, p / w);
    [
        (x > 0).then(|| p - 1),
        (x + 1 < w).then(|| p + 1),
        (y > 0).then(|| p - w),
        (y + 1 < h).then(|| p + w),
    ]
    .into_iter()
    .flatten()
}

/// Label the regional minima of `image` (flat zones with no lower
/// neighbour) with consecutive labels starting at 1.
fn label_minima(data: &[u8], w: usize, h: usize, labels: &mut [u32]) -> usize {
    let mut visited = vec![false; data.len()];
    let mut zone = Vec::new();
    let mut stack = Vec::new();
    let mut count = 0u32;

    for start in 0..data.len() {
        if visited[start] {
            continue;
        }
        let level = data[start];
        let mut is_minimum = true;
        zone.clear();
        stack.push(start);
        visited[start] = true;

        while let Some(p) = stack.pop() {
            zone.push(p);
            for q in neighbours(p, w, h) {
                if data[q] < level {
                    is_minimum = false;
                } else if data[q] == level && !visited[q] {
                    visited[q] = true;
                    stack.push(q);
                }
            }
        }

        if is_minimum {
            count += 1;
            for &p in &zone {
                labels[p] = count;
            }
        }
    }
    count as usize
}

/// Flood `image` from its regional minima.
///
/// Returns the label image and the number of basins `n`. Basins carry labels
/// `1..=n` in raster order of their first pixel; watershed lines are 0.
/// Pixels of equal level are flooded in arrival order.
///
/// # Errors
///
/// Returns [`Error::LabelOverflow`] when the image has more than
/// `u16::MAX` regional minima.
///
/// # Examples
///
/// ```
/// use image::{GrayImage, Luma};
/// use layout_oxide::imgproc::watershed;
///
/// let img = GrayImage::from_fn(7, 1, |x, _| Luma([[0, 1, 2, 9, 2, 1, 0][x as usize]]));
/// let (labels, n) = watershed(&img).unwrap();
/// assert_eq!(n, 2);
/// assert_eq!(labels.get_pixel(0, 0)[0], 1);
/// assert_eq!(labels.get_pixel(3, 0)[0], 0);
/// assert_eq!(labels.get_pixel(6, 0)[0], 2);
/// ```
pub fn watershed(image: &GrayImage) -> Result<(LabelImage, usize)> {
    let (width, height) = image.dimensions();
    let (w, h) = (width as usize, height as usize);
    let data = image.as_raw();
    let mut state = vec![UNLABELLED; data.len()];

    let n = label_minima(data, w, h, &mut state);
    if n > u16::MAX as usize {
        return Err(Error::LabelOverflow(n));
    }
    log::debug!("Watershed: {} regional minima", n);

    // (level, arrival) ordering gives FIFO flooding within a level
    let mut heap = BinaryHeap::new();
    let mut arrival = 0u64;
    let seeds: Vec<usize> = (0..data.len()).filter(|&p| state[p] != UNLABELLED).collect();
    for p in seeds {
        for q in neighbours(p, w, h) {
            if state[q] == UNLABELLED {
                state[q] = IN_QUEUE;
                heap.push(Reverse((data[q], arrival, q)));
                arrival += 1;
            }
        }
    }

    while let Some(Reverse((_, _, p))) = heap.pop() {
        let mut label = UNLABELLED;
        let mut conflict = false;
        for q in neighbours(p, w, h) {
            let l = state[q];
            if l == UNLABELLED || l == IN_QUEUE || l == WATERSHED {
                continue;
            }
            if label == UNLABELLED {
                label = l;
            } else if label != l {
                conflict = true;
                break;
            }
        }

        if conflict || label == UNLABELLED {
            state[p] = WATERSHED;
            continue;
        }
        state[p] = label;
        for q in neighbours(p, w, h) {
            if state[q] == UNLABELLED {
                state[q] = IN_QUEUE;
                heap.push(Reverse((data[q], arrival, q)));
                arrival += 1;
            }
        }
    }

    let labels: Vec<u16> = state
        .into_iter()
        .map(|l| match l {
            WATERSHED | IN_QUEUE => 0,
            l => l as u16,
        })
        .collect();
    let labels = LabelImage::from_raw(width, height, labels)
        .ok_or_else(|| Error::InvalidImage("label buffer size mismatch".to_string()))?;
    Ok((labels, n))
}
