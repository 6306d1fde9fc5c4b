//! XY-Cut splitting of a page into sections and columns.
//!
//! The splitter alternates two cuts over a morphological "block" image in
//! which letters, words and lines have been merged into solid blocks:
//!
//! - a horizontal cut (`vsplit`) separates a region into stacked sections
//!   along blank rows
//! - a vertical cut (`hsplit`) separates a section into side-by-side columns
//!   along blank columns
//!
//! Detected separator segments correct the projections: a long horizontal
//! rule forces a horizontal cut, a vertical rule forces a vertical cut and
//! prevents any horizontal cut across its extent.
//!
//! The recursion is bounded by the category grammar: page → section → column
//! → section → column. Every region is appended to a [`LayoutTree`] before its
//! children, and only arena indices are held across recursive calls.

use image::{imageops, GrayImage, Luma};

use crate::config::LayoutConfig;
use crate::error::{Error, Result};
use crate::geometry::{IntervalSet, Rect, Segment};
use crate::imgproc::{open, Window};
use crate::layout::{DomCategory, LayoutRegion, LayoutTree};
use crate::signal::{blank_profile, partitions, Axis, Threshold, FORCED_SPLIT};

/// Locate the page inside the scan, ignoring dark borders.
///
/// `is_blank` holds one flag per row (or column). Starting `margin * n` from
/// each end, each bound first moves outwards across content, then inwards
/// across blank lines. Returns the half-open range `[l, r)`.
///
/// # Examples
///
/// ```
/// use layout_oxide::layout::detect_border;
///
/// let mut profile = vec![1u8; 100];
/// profile[10..90].fill(0);
/// assert_eq!(detect_border(&profile, 0.1), (10, 90));
/// assert_eq!(detect_border(&[], 0.1), (0, 0));
/// ```
pub fn detect_border(is_blank: &[u8], margin: f32) -> (usize, usize) {
    let n = is_blank.len();
    if n == 0 {
        return (0, 0);
    }
    let blank = |i: usize| is_blank[i] != 0;

    let mut l = ((margin * n as f32) as usize).min(n - 1);
    let mut r = (((1.0 - margin) * n as f32) as usize).min(n - 1);

    while l > 0 && !blank(l) {
        l -= 1;
    }
    while l < r && blank(l) {
        l += 1;
    }
    while r < n - 1 && !blank(r) {
        r += 1;
    }
    while r > l && blank(r) {
        r -= 1;
    }
    (l, r + 1)
}

/// Compute the page region of a scan.
///
/// Columns are tested on the image opened by a tall vertical line, rows on
/// the image opened by a long horizontal line and then by a short vertical
/// one. A row or column is blank when less than `1 - page_full_line_white`
/// of it is ink.
pub fn crop_page(image: &GrayImage, config: &LayoutConfig) -> Rect {
    let (width, height) = image.dimensions();
    let full = Rect::new(0, 0, width as i32, height as i32);
    let threshold = Threshold::Fraction(1.0 - config.page_full_line_white);

    let hblock = open(image, Window::vertical(config.page_opening_height / 2));
    let columns = blank_profile(&hblock, full, Axis::Columns, config.ink_threshold, threshold);
    let (x0, x1) = detect_border(&columns, config.page_margin);

    let vblock = open(image, Window::horizontal(config.page_opening_width / 2));
    let vblock = open(&vblock, Window::vertical(config.block_opening_height));
    let rows = blank_profile(&vblock, full, Axis::Rows, config.ink_threshold, threshold);
    let (y0, y1) = detect_border(&rows, config.page_margin);

    let roi = Rect::from_points(x0 as i32, y0 as i32, x1 as i32, y1 as i32);
    log::debug!(
        "Document border (x1,y1,x2,y2): {} {} {} {}",
        roi.left(),
        roi.top(),
        roi.right(),
        roi.bottom()
    );
    roi
}

/// Merge letters and lines of the cropped page into blocks.
///
/// The result has the size of the full page; everything outside `crop` is
/// background.
fn block_image(image: &GrayImage, crop: Rect, config: &LayoutConfig) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut blocks = GrayImage::from_pixel(width, height, Luma([u8::MAX]));
    if crop.is_empty() {
        return blocks;
    }

    let page = imageops::crop_imm(image, crop.x as u32, crop.y as u32, crop.width as u32, crop.height as u32)
        .to_image();
    let merged = open(&page, Window::vertical(config.block_opening_height / 2));
    let merged = open(&merged, Window::horizontal(config.block_opening_width / 2));
    imageops::replace(&mut blocks, &merged, crop.x as i64, crop.y as i64);
    blocks
}

/// Recursive XY-Cut page splitter.
///
/// # Examples
///
/// ```
/// use image::{GrayImage, Luma};
/// use layout_oxide::config::LayoutConfig;
/// use layout_oxide::layout::{DomCategory, XyCutSplitter};
///
/// let mut page = GrayImage::from_pixel(400, 500, Luma([255]));
/// for y in 100..400 {
///     for x in 50..350 {
///         page.put_pixel(x, y, Luma([0]));
///     }
/// }
/// let config = LayoutConfig::new(10, false);
/// let tree = XyCutSplitter::new(&config).split(&page, &[]).unwrap();
/// assert_eq!(tree.regions_of(DomCategory::SectionLevel1).count(), 1);
/// assert_eq!(tree.regions_of(DomCategory::ColumnLevel2).count(), 1);
/// ```
pub struct XyCutSplitter<'a> {
    config: &'a LayoutConfig,
}

impl<'a> XyCutSplitter<'a> {
    /// Create a splitter using `config` thresholds.
    pub fn new(config: &'a LayoutConfig) -> Self {
        Self { config }
    }

    /// Split a cleaned page into its region tree.
    ///
    /// `segments` are the deskewed separators found on the page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLayout`] when a cut produces a region whose
    /// category cannot be nested under its parent. The page is then unusable.
    pub fn split(&self, image: &GrayImage, segments: &[Segment]) -> Result<LayoutTree> {
        let crop = crop_page(image, self.config);
        let blocks = block_image(image, crop, self.config);

        let mut segments = segments.to_vec();
        segments.sort_by_key(|s| s.start.y);

        let mut tree = LayoutTree::new(crop);
        let pass = SplitPass {
            config: self.config,
            blocks: &blocks,
        };
        pass.vsplit(&mut tree, 0, &segments, 0)?;

        log::debug!("XY-Cut produced {} regions", tree.len());
        Ok(tree)
    }
}

/// State shared by one split of a page.
struct SplitPass<'a> {
    config: &'a LayoutConfig,
    blocks: &'a GrayImage,
}

impl SplitPass<'_> {
    fn region(tree: &LayoutTree, id: usize) -> Result<LayoutRegion> {
        tree.get(id).cloned().ok_or(Error::InvalidParent {
            parent: id,
            len: tree.len(),
        })
    }

    /// Cut `parent_id` into stacked sections or titles, then split every
    /// section into columns.
    fn vsplit(&self, tree: &mut LayoutTree, parent_id: usize, segments: &[Segment], level: usize) -> Result<()> {
        let config = self.config;
        let parent = Self::region(tree, parent_id)?;
        let region = parent.bbox;
        let inner = region.inflated(-config.inner_region_margin);

        let mut region_segments = Vec::new();
        let mut hor_segments = Vec::new();
        let mut ver_intervals = IntervalSet::new();
        for s in segments {
            let inside = region.contains_segment(s);
            if inside {
                region_segments.push(*s);
            }
            if inside && s.is_horizontal(config.angle_tolerance) {
                hor_segments.push(*s);
            } else if s.is_vertical(config.angle_tolerance) && inner.contains_segment(s) {
                ver_intervals.insert(s.start.y.min(s.end.y), s.start.y.max(s.end.y));
            }
        }

        // A row is blank only when each third of it is blank
        let w = region.width;
        let h = region.height.max(0) as usize;
        let thirds = [(0, w / 3), (w / 3, 2 * (w / 3)), (2 * (w / 3), w)];
        let mut ysum = vec![1u8; h];
        for (x0, x1) in thirds {
            let part = Rect::new(region.x + x0, region.y, x1 - x0, region.height);
            let profile = blank_profile(
                self.blocks,
                part,
                Axis::Rows,
                config.ink_threshold,
                Threshold::Count(config.count_empty_line),
            );
            for (v, p) in ysum.iter_mut().zip(profile) {
                *v = (*v).min(p);
            }
        }

        for s in &hor_segments {
            if s.length < 0.25 * w as f64 {
                continue;
            }
            log::debug!(
                "Horizontal split forced by segment (y={}, x1={} x2={} angle={})",
                s.start.y,
                s.start.x,
                s.end.x,
                s.angle
            );
            let y0 = (s.start.y - region.y - 3).max(0) as usize;
            let y1 = ((s.end.y + 3).min(region.bottom()) - region.y).max(0) as usize;
            fill(&mut ysum, y0, y1, FORCED_SPLIT);
        }

        for iv in ver_intervals.iter() {
            log::debug!("Horizontal split prevented by segment (y0={} y1={})", iv.a, iv.b);
            let y0 = (iv.a - region.y).max(0) as usize;
            let y1 = (region.bottom().min(iv.b) - region.y).max(0) as usize;
            fill(&mut ysum, y0, y1, 0);
        }

        let bands = partitions(&ysum, config.section_min_spacing, config.section_min_size);
        log::debug!("{:indent$}** Horizontal split - number of regions={}", "", bands.len(), indent = level * 2);

        let first_child = tree.len();
        for (y0, y1) in bands {
            let y0 = y0 as i32 + region.y - config.extra_margin;
            let y1 = y1 as i32 + region.y + config.extra_margin;
            let is_title = ((y1 - y0) as f32) < 1.5 * config.line_height;

            let category = match (parent.category, is_title) {
                (DomCategory::Page, true) => DomCategory::TitleLevel1,
                (DomCategory::Page, false) => DomCategory::SectionLevel1,
                (DomCategory::ColumnLevel1, true) => DomCategory::TitleLevel2,
                (DomCategory::ColumnLevel1, false) => DomCategory::SectionLevel2,
                (found, _) => {
                    log::error!(
                        "Invalid parent type {} (Expected: {} or {})",
                        found,
                        DomCategory::Page,
                        DomCategory::ColumnLevel1
                    );
                    return Err(Error::InvalidLayout {
                        found,
                        expected: [DomCategory::Page, DomCategory::ColumnLevel1],
                    });
                },
            };

            let y0 = y0.max(region.top());
            let y1 = y1.min(region.bottom());
            log::debug!("{:indent$} Detected y-section [{}--{}]", "", y0, y1, indent = level * 2);
            tree.push(LayoutRegion::new(
                Rect::new(region.x, y0, region.width, y1 - y0),
                category,
                Some(parent_id),
            ))?;
        }

        let last_child = tree.len();
        for id in first_child..last_child {
            let category = Self::region(tree, id)?.category;
            if matches!(category, DomCategory::SectionLevel1 | DomCategory::SectionLevel2) {
                self.hsplit(tree, id, &region_segments, level + 1)?;
            }
        }
        Ok(())
    }

    /// Cut `parent_id` into side-by-side columns, splitting every top-level
    /// column again into sections.
    fn hsplit(&self, tree: &mut LayoutTree, parent_id: usize, segments: &[Segment], level: usize) -> Result<()> {
        let config = self.config;
        let parent = Self::region(tree, parent_id)?;
        let region = parent.bbox;

        let region_segments: Vec<Segment> = segments.iter().filter(|s| region.contains_segment(s)).copied().collect();

        let mut cols = blank_profile(
            self.blocks,
            region,
            Axis::Columns,
            config.white_level,
            Threshold::Fraction(0.01),
        );

        let spread = 3.0 * config.extra_margin as f32;
        for s in region_segments.iter().filter(|s| s.is_vertical(config.angle_tolerance)) {
            log::debug!(
                "Vertical split forced by segment (x={}, y1={} y2={} angle={})",
                s.start.x,
                s.start.y,
                s.end.y,
                s.angle
            );
            let x = s.mid_x() - region.x as f32;
            let x0 = (x - spread).max(0.0) as usize;
            let x1 = (x + spread).min(region.width as f32).max(0.0) as usize;
            fill(&mut cols, x0, x1, FORCED_SPLIT);
        }

        let columns = partitions(&cols, config.column_min_spacing, 0);
        log::debug!("{:indent$}** Vertical split - number of regions={}", "", columns.len(), indent = level * 2);

        let margin = 3 * config.extra_margin;
        for (x0, x1) in columns {
            let x0 = region.left().max(region.x + x0 as i32 - margin);
            let x1 = region.right().min(region.x + x1 as i32 + margin);

            let category = match parent.category {
                DomCategory::SectionLevel1 => DomCategory::ColumnLevel1,
                DomCategory::SectionLevel2 => DomCategory::ColumnLevel2,
                found => {
                    log::error!(
                        "Invalid parent type {} (Expected: {} or {})",
                        found,
                        DomCategory::SectionLevel1,
                        DomCategory::SectionLevel2
                    );
                    return Err(Error::InvalidLayout {
                        found,
                        expected: [DomCategory::SectionLevel1, DomCategory::SectionLevel2],
                    });
                },
            };

            log::debug!("{:>indent$} Detected x-section [{}--{}]", "+", x0, x1, indent = level * 2);
            let id = tree.push(LayoutRegion::new(
                Rect::new(x0, region.y, x1 - x0, region.height),
                category,
                Some(parent_id),
            ))?;
            if category == DomCategory::ColumnLevel1 {
                self.vsplit(tree, id, &region_segments, level + 1)?;
            }
        }
        Ok(())
    }
}

fn fill(data: &mut [u8], start: usize, end: usize, value: u8) {
    let end = end.min(data.len());
    if start < end {
        data[start..end].fill(value);
    }
}
