//! Page segmentation pipeline.
//!
//! ```text
//! Cleaned grayscale page + deskewed separator segments
//!     ↓
//! [XyCutSplitter] (page → sections → columns → sections → columns)
//!     ↓
//! LayoutTree + COLUMN_LEVEL_2 boxes
//!     ↓
//! [LineExtractor] (watershed inside every text column)
//!     ↓
//! LayoutTree with LINE regions + per-pixel label image
//! ```
//!
//! One call processes one page to completion.

use std::time::Instant;

use image::GrayImage;

use crate::config::LayoutConfig;
use crate::error::Result;
use crate::geometry::Segment;
use crate::imgproc::LabelImage;
use crate::layout::{DomCategory, LayoutTree, LineExtractor, XyCutSplitter};

/// Segmented page.
#[derive(Debug, Clone)]
pub struct PageLayout {
    /// Region tree, lines included
    pub tree: LayoutTree,
    /// Line label of every pixel (0 = no line)
    pub labels: LabelImage,
    /// Number of watershed basins found before same-line merging
    pub label_count: usize,
}

impl PageLayout {
    /// Number of text lines in the tree.
    pub fn line_count(&self) -> usize {
        self.tree.regions_of(DomCategory::Line).count()
    }
}

/// Runs the splitter and the line extractor on a page.
///
/// # Examples
///
/// ```
/// use image::{GrayImage, Luma};
/// use layout_oxide::config::LayoutConfig;
/// use layout_oxide::pipeline::PageSegmenter;
///
/// let page = GrayImage::from_pixel(300, 300, Luma([255]));
/// let layout = PageSegmenter::new(LayoutConfig::new(10, false)).segment(&page, &[]).unwrap();
/// assert_eq!(layout.line_count(), 0);
/// ```
pub struct PageSegmenter {
    config: LayoutConfig,
}

impl PageSegmenter {
    /// Create a segmenter for pages matching `config`.
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Get the current configuration.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Segment one page.
    ///
    /// # Errors
    ///
    /// Fails when the splitter meets an impossible category nesting or when
    /// the watershed overflows its label range.
    pub fn segment(&self, image: &GrayImage, segments: &[Segment]) -> Result<PageLayout> {
        let start = Instant::now();

        let mut tree = XyCutSplitter::new(&self.config).split(image, segments)?;
        let split_time = start.elapsed();

        let (column_ids, columns) = tree.text_columns();
        let extraction = LineExtractor::new(&self.config).extract(image, &columns)?;
        tree.append_lines(&column_ids, extraction.lines)?;

        log::info!(
            "Segmented {}x{} page: {} regions, {} text columns, {} lines in {:?} (xy-cut {:?})",
            image.width(),
            image.height(),
            tree.len(),
            column_ids.len(),
            tree.regions_of(DomCategory::Line).count(),
            start.elapsed(),
            split_time
        );

        Ok(PageLayout {
            tree,
            labels: extraction.labels,
            label_count: extraction.label_count,
        })
    }
}
