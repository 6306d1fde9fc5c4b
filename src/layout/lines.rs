//! Text line extraction inside columns.
//!
//! Each column is blurred much more along rows than along columns, so the
//! letters of a line melt into one dark horizontal stripe. One seed per
//! stripe and per row is kept, seeds are bridged vertically, and every basin
//! not holding a seed is filled by reconstruction. A watershed over the
//! prepared page then gives one basin per line. Basins whose ink centres are
//! closer than the x-height are finally merged into a single line.

use image::{imageops, GrayImage, Luma};

use crate::config::LayoutConfig;
use crate::error::Result;
use crate::geometry::Rect;
use crate::imgproc::{close, gaussian_directional, open, reconstruct_by_erosion, watershed, LabelImage, Window};
use crate::layout::LayoutRegion;

/// Result of a line extraction.
#[derive(Debug, Clone)]
pub struct LineExtraction {
    /// Per-pixel line label (0 = background or watershed line)
    pub labels: LabelImage,
    /// Number of watershed basins before merging
    pub label_count: usize,
    /// One region per line; `parent` is the position of the column in the
    /// input slice
    pub lines: Vec<LayoutRegion>,
}

/// Accumulated ink statistics of one label.
#[derive(Debug, Clone, Copy)]
struct LabelStats {
    xmin: i32,
    xmax: i32,
    ymin: i32,
    ymax: i32,
    sum_y: i64,
    count: i64,
}

impl Default for LabelStats {
    fn default() -> Self {
        Self {
            xmin: i32::MAX,
            xmax: i32::MIN,
            ymin: i32::MAX,
            ymax: i32::MIN,
            sum_y: 0,
            count: 0,
        }
    }
}

impl LabelStats {
    fn take(&mut self, x: i32, y: i32) {
        self.xmin = self.xmin.min(x);
        self.xmax = self.xmax.max(x);
        self.ymin = self.ymin.min(y);
        self.ymax = self.ymax.max(y);
        self.sum_y += y as i64;
        self.count += 1;
    }

    fn absorb(&mut self, other: &LabelStats) {
        self.xmin = self.xmin.min(other.xmin);
        self.xmax = self.xmax.max(other.xmax);
        self.ymin = self.ymin.min(other.ymin);
        self.ymax = self.ymax.max(other.ymax);
        self.sum_y += other.sum_y;
        self.count += other.count;
    }

    /// Box of the label; `None` unless it spans more than one pixel on both axes.
    fn bbox(&self) -> Option<Rect> {
        if self.xmin < self.xmax && self.ymin < self.ymax {
            Some(Rect::new(self.xmin, self.ymin, self.xmax - self.xmin + 1, self.ymax - self.ymin + 1))
        } else {
            None
        }
    }

    fn centre_y(&self) -> f32 {
        if self.count == 0 {
            0.0
        } else {
            self.sum_y as f32 / self.count as f32
        }
    }
}

/// Watershed-based line extractor.
pub struct LineExtractor<'a> {
    config: &'a LayoutConfig,
}

impl<'a> LineExtractor<'a> {
    /// Create an extractor using `config` thresholds.
    pub fn new(config: &'a LayoutConfig) -> Self {
        Self { config }
    }

    /// Extract the text lines of every column of `image`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::LabelOverflow`] when the prepared page has
    /// more basins than a 16-bit label image can hold.
    pub fn extract(&self, image: &GrayImage, columns: &[Rect]) -> Result<LineExtraction> {
        let (width, height) = image.dimensions();
        let mut prepared = GrayImage::from_pixel(width, height, Luma([u8::MAX]));

        for column in columns {
            let region = column.clamp_to(width, height);
            if region.is_empty() {
                continue;
            }
            let basins = self.prepare_region(image, region);
            imageops::replace(&mut prepared, &basins, region.x as i64, region.y as i64);
        }

        let (mut labels, label_count) = watershed(&prepared)?;
        log::debug!("Line watershed: {} basins over {} columns", label_count, columns.len());

        let mut remap: Vec<u16> = (0..=label_count as u16).collect();
        let mut lines = Vec::new();
        for (position, column) in columns.iter().enumerate() {
            let region = column.clamp_to(width, height);
            if region.is_empty() {
                continue;
            }
            lines.extend(merge_column_lines(
                image,
                &labels,
                label_count,
                region,
                position,
                self.config,
                &mut remap,
            ));
        }

        // Merges recorded in later columns may target labels already merged away
        let resolved = resolve_remap(&remap);
        for v in labels.iter_mut() {
            *v = resolved[*v as usize];
        }
        for line in &mut lines {
            line.mask_instance_id = line.mask_instance_id.map(|l| resolved[l as usize]);
        }

        if lines.len() != label_count {
            log::warn!(
                "Invalid number of lines between WS (={}) and output (={}). A layout error is likely.",
                label_count,
                lines.len()
            );
        }

        Ok(LineExtraction {
            labels,
            label_count,
            lines,
        })
    }

    /// Blur one column and turn it into an image whose regional minima are
    /// the seeds of its lines.
    fn prepare_region(&self, image: &GrayImage, region: Rect) -> GrayImage {
        let config = self.config;
        let mut blurred =
            imageops::crop_imm(image, region.x as u32, region.y as u32, region.width as u32, region.height as u32)
                .to_image();
        gaussian_directional(&mut blurred, 0.3 * config.word_width, 0.1 * config.line_height, u8::MAX);

        let window = Window::new(
            (2.0 * config.one_em + 0.5) as usize / 2,
            (0.5 * config.x_height + 0.5) as usize / 2,
        );
        let closed = close(&blurred, window);

        let markers = bridge_seeds(&row_minima(&closed, config.line_split_white_level), config);
        reconstruct_by_erosion(&markers, &closed)
    }
}

/// Keep the leftmost minimum of every run of pixels `<= white_level` in each
/// row; everything else becomes background.
fn row_minima(image: &GrayImage, white_level: u8) -> GrayImage {
    let (width, height) = image.dimensions();
    let w = width as usize;
    let mut markers = GrayImage::from_pixel(width, height, Luma([u8::MAX]));
    if w == 0 {
        return markers;
    }

    for (y, row) in image.as_raw().chunks(w).enumerate() {
        let mut x = 0;
        while x < w {
            while x < w && row[x] > white_level {
                x += 1;
            }
            if x == w {
                break;
            }
            let mut xmin = x;
            while x < w && row[x] <= white_level {
                if row[x] < row[xmin] {
                    xmin = x;
                }
                x += 1;
            }
            markers.put_pixel(xmin as u32, y as u32, Luma([row[xmin]]));
        }
    }
    markers
}

/// Join seeds of the same stripe that are a few rows apart.
///
/// Seeds are dark on a white background, so the ink-merging `open` links
/// vertical runs separated by less than the window height.
fn bridge_seeds(markers: &GrayImage, config: &LayoutConfig) -> GrayImage {
    open(markers, Window::vertical((config.x_height / 4.0) as usize))
}

/// Build the lines of one column and merge labels lying on the same line.
///
/// Merges are recorded in `remap` (`merged label -> kept label`).
fn merge_column_lines(
    image: &GrayImage,
    labels: &LabelImage,
    label_count: usize,
    region: Rect,
    position: usize,
    config: &LayoutConfig,
    remap: &mut [u16],
) -> Vec<LayoutRegion> {
    let mut stats = vec![LabelStats::default(); label_count + 1];
    for y in region.top()..region.bottom() {
        for x in region.left()..region.right() {
            let (px, py) = (x as u32, y as u32);
            if image.get_pixel(px, py)[0] >= config.white_level {
                continue;
            }
            let label = labels.get_pixel(px, py)[0] as usize;
            if label != 0 {
                stats[label].take(x, y);
            }
        }
    }

    let mut candidates: Vec<usize> = (1..=label_count).filter(|&l| stats[l].bbox().is_some()).collect();
    if candidates.is_empty() {
        return Vec::new();
    }
    candidates.sort_by(|&a, &b| stats[a].centre_y().total_cmp(&stats[b].centre_y()));

    let mut prev = candidates[0];
    let mut reference = stats[prev].centre_y();
    for &cur in &candidates[1..] {
        let centre = stats[cur].centre_y();
        if centre - reference < config.x_height {
            let merged = stats[cur];
            stats[prev].absorb(&merged);
            stats[cur] = LabelStats::default();
            remap[cur] = prev as u16;
        } else {
            reference = centre;
            prev = cur;
        }
    }

    candidates
        .into_iter()
        .filter_map(|l| stats[l].bbox().map(|b| LayoutRegion::line(b, position, l as u16)))
        .collect()
}

/// Follow merge chains so that every label maps to a label that was kept.
fn resolve_remap(remap: &[u16]) -> Vec<u16> {
    (0..remap.len())
        .map(|label| {
            let mut target = label;
            // Bounded walk: a merge chain never revisits a label
            for _ in 0..remap.len() {
                let next = remap[target] as usize;
                if next == target {
                    break;
                }
                target = next;
            }
            target as u16
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::DomCategory;

    fn fill(img: &mut GrayImage, r: Rect, v: u8) {
        for y in r.top()..r.bottom() {
            for x in r.left()..r.right() {
                img.put_pixel(x as u32, y as u32, Luma([v]));
            }
        }
    }

    #[test]
    fn test_row_minima_keeps_leftmost() {
        let img = GrayImage::from_fn(10, 1, |x, _| Luma([[255, 200, 100, 100, 240, 90, 255, 255, 10, 10][x as usize]]));
        let m = row_minima(&img, 230);
        let row: Vec<u8> = m.pixels().map(|p| p[0]).collect();
        assert_eq!(row, vec![255, 255, 100, 255, 255, 90, 255, 255, 10, 255]);
    }

    #[test]
    fn test_broken_seed_column_is_bridged() {
        let mut markers = GrayImage::from_pixel(5, 12, Luma([255]));
        for y in [3, 4, 6, 7] {
            markers.put_pixel(2, y, Luma([50]));
        }
        let config = LayoutConfig::new(10, false);

        let bridged = bridge_seeds(&markers, &config);
        let column: Vec<u8> = (0..12).map(|y| bridged.get_pixel(2, y)[0]).collect();
        assert_eq!(column, vec![255, 255, 255, 50, 50, 50, 50, 50, 255, 255, 255, 255]);
        assert!((0..12).all(|y| bridged.get_pixel(1, y)[0] == 255));

        // A closing would wipe the short seed runs instead
        let closed = close(&markers, Window::vertical(2));
        assert!(closed.pixels().all(|p| p[0] == 255));
    }

    #[test]
    fn test_labels_on_same_line_are_merged() {
        let image = GrayImage::from_pixel(100, 60, Luma([0]));
        let mut labels = LabelImage::new(100, 60);
        let paint = |labels: &mut LabelImage, rows: std::ops::Range<u32>, label: u16| {
            for y in rows {
                for x in 10..90 {
                    labels.put_pixel(x, y, Luma([label]));
                }
            }
        };
        paint(&mut labels, 10..13, 1);
        paint(&mut labels, 15..18, 2);
        paint(&mut labels, 40..45, 3);

        let config = LayoutConfig::new(10, false);
        let mut remap: Vec<u16> = (0..=3).collect();
        let lines = merge_column_lines(&image, &labels, 3, Rect::new(0, 0, 100, 60), 0, &config, &mut remap);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].bbox, Rect::new(10, 10, 80, 8));
        assert_eq!(lines[0].mask_instance_id, Some(1));
        assert_eq!(lines[1].bbox, Rect::new(10, 40, 80, 5));
        assert_eq!(lines[1].mask_instance_id, Some(3));
        assert_eq!(remap, vec![0, 1, 1, 3]);
        assert!(lines.iter().all(|l| l.category == DomCategory::Line && l.parent == Some(0)));
    }

    #[test]
    fn test_thin_labels_are_dropped() {
        let image = GrayImage::from_pixel(20, 20, Luma([0]));
        let mut labels = LabelImage::new(20, 20);
        // Single row: no vertical extent
        for x in 2..18 {
            labels.put_pixel(x, 5, Luma([1]));
        }
        let config = LayoutConfig::new(10, false);
        let mut remap: Vec<u16> = (0..=1).collect();
        assert!(merge_column_lines(&image, &labels, 1, Rect::new(0, 0, 20, 20), 0, &config, &mut remap).is_empty());
    }

    #[test]
    fn test_resolve_remap_follows_chains() {
        assert_eq!(resolve_remap(&[0, 1, 1, 2, 4]), vec![0, 1, 1, 1, 4]);
        // Cycles terminate
        let r = resolve_remap(&[0, 2, 1]);
        assert_eq!(r.len(), 3);
    }

    #[test]
    fn test_extract_three_lines() {
        let mut image = GrayImage::from_pixel(400, 300, Luma([255]));
        let bars = [Rect::new(60, 70, 280, 10), Rect::new(60, 110, 280, 10), Rect::new(60, 150, 280, 10)];
        for b in bars {
            fill(&mut image, b, 0);
        }
        let config = LayoutConfig::new(10, false);
        let column = Rect::new(50, 50, 300, 200);

        let result = LineExtractor::new(&config).extract(&image, &[column]).unwrap();
        assert_eq!(result.label_count, 3);
        assert_eq!(result.lines.len(), 3);
        for (line, bar) in result.lines.iter().zip(bars.iter()) {
            assert!(line.bbox.intersects(bar));
            assert!(column.contains_rect(&line.bbox));
            let label = line.mask_instance_id.unwrap();
            assert_eq!(result.labels.get_pixel(200, bar.y as u32 + 5)[0], label);
        }
        // Outside the column nothing is ink, but every pixel still belongs to a basin or a watershed line
        assert_eq!(result.labels.dimensions(), (400, 300));
    }

    #[test]
    fn test_extract_without_columns() {
        let image = GrayImage::from_pixel(30, 30, Luma([255]));
        let config = LayoutConfig::new(10, false);
        let result = LineExtractor::new(&config).extract(&image, &[]).unwrap();
        assert!(result.lines.is_empty());
        assert_eq!(result.label_count, 1);
    }
}
