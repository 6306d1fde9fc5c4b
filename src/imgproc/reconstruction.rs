//! Geodesic reconstruction by erosion (4-connectivity).
//!
//! Hybrid algorithm: one forward and one backward raster scan, then a FIFO
//! propagation seeded by the pixels the backward scan could still lower.

use std::collections::VecDeque;

use image::GrayImage;

/// Reconstruct `mask` from `marker` by erosion.
///
/// The result is the greatest image `r` with `mask <= r <= max(marker, mask)`
/// whose regional minima all come from the marker. Filling every basin of the
/// mask not marked by a seed yields a closing by reconstruction.
///
/// # Panics
///
/// Panics if the two images have different dimensions.
pub fn reconstruct_by_erosion(marker: &GrayImage, mask: &GrayImage) -> GrayImage {
    assert_eq!(marker.dimensions(), mask.dimensions(), "marker and mask sizes differ");

    let (width, height) = mask.dimensions();
    let (w, h) = (width as usize, height as usize);
    let m = mask.as_raw();
    let mut r: Vec<u8> = marker.as_raw().iter().zip(m).map(|(&a, &b)| a.max(b)).collect();

    // Forward scan over the causal neighbours (up, left)
    for y in 0..h {
        for x in 0..w {
            let p = y * w + x;
            let mut v = r[p];
            if x > 0 {
                v = v.min(r[p - 1]);
            }
            if y > 0 {
                v = v.min(r[p - w]);
            }
            r[p] = v.max(m[p]);
        }
    }

    // Backward scan over (down, right), queueing pixels that can still lower a neighbour
    let mut queue = VecDeque::new();
    for y in (0..h).rev() {
        for x in (0..w).rev() {
            let p = y * w + x;
            let mut v = r[p];
            if x + 1 < w {
                v = v.min(r[p + 1]);
            }
            if y + 1 < h {
                v = v.min(r[p + w]);
            }
            r[p] = v.max(m[p]);

            let lowers = |q: usize| r[q] > r[p] && r[q] > m[q];
            if (x + 1 < w && lowers(p + 1)) || (y + 1 < h && lowers(p + w)) {
                queue.push_back(p);
            }
        }
    }

    while let Some(p) = queue.pop_front() {
        let (x, y) = (p % w, p / w);
        let mut neighbours = [usize::MAX; 4];
        if x > 0 {
            neighbours[0] = p - 1;
        }
        if x + 1 < w {
            neighbours[1] = p + 1;
        }
        if y > 0 {
            neighbours[2] = p - w;
        }
        if y + 1 < h {
            neighbours[3] = p + w;
        }
        for q in neighbours.into_iter().filter(|&q| q != usize::MAX) {
            if r[q] > r[p] && r[q] != m[q] {
                r[q] = r[p].max(m[q]);
                queue.push_back(q);
            }
        }
    }

    GrayImage::from_raw(width, height, r).unwrap_or_else(|| mask.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    /// Reference: iterate geodesic erosions until stability.
    fn naive(marker: &GrayImage, mask: &GrayImage) -> GrayImage {
        let (w, h) = mask.dimensions();
        let mut r = GrayImage::from_fn(w, h, |x, y| {
            Luma([marker.get_pixel(x, y)[0].max(mask.get_pixel(x, y)[0])])
        });
        loop {
            let mut next = r.clone();
            for y in 0..h {
                for x in 0..w {
                    let mut v = r.get_pixel(x, y)[0];
                    if x > 0 {
                        v = v.min(r.get_pixel(x - 1, y)[0]);
                    }
                    if x + 1 < w {
                        v = v.min(r.get_pixel(x + 1, y)[0]);
                    }
                    if y > 0 {
                        v = v.min(r.get_pixel(x, y - 1)[0]);
                    }
                    if y + 1 < h {
                        v = v.min(r.get_pixel(x, y + 1)[0]);
                    }
                    next.put_pixel(x, y, Luma([v.max(mask.get_pixel(x, y)[0])]));
                }
            }
            if next == r {
                return r;
            }
            r = next;
        }
    }

    #[test]
    fn test_fills_unmarked_basins() {
        // Two basins separated by a ridge; only the left one is marked
        let mask = GrayImage::from_fn(11, 3, |x, _| Luma([match x {
            0..=4 => 50,
            5 => 200,
            _ => 80,
        }]));
        let mut marker = GrayImage::from_pixel(11, 3, Luma([255]));
        marker.put_pixel(2, 1, Luma([50]));

        let r = reconstruct_by_erosion(&marker, &mask);
        assert_eq!(r.get_pixel(0, 0)[0], 50);
        assert_eq!(r.get_pixel(4, 2)[0], 50);
        assert_eq!(r.get_pixel(5, 1)[0], 200);
        // Right basin is filled up to the ridge
        assert_eq!(r.get_pixel(8, 1)[0], 200);
    }

    #[test]
    fn test_matches_iterated_erosions() {
        let mask = GrayImage::from_fn(17, 13, |x, y| Luma([((x * 53 + y * 29 + x * y * 7) % 200) as u8]));
        let mut marker = GrayImage::from_pixel(17, 13, Luma([255]));
        marker.put_pixel(3, 3, Luma([10]));
        marker.put_pixel(12, 9, Luma([0]));
        marker.put_pixel(16, 0, Luma([120]));
        assert_eq!(reconstruct_by_erosion(&marker, &mask), naive(&marker, &mask));
    }
}
