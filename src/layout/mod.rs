//! Layout region tree for a scanned page.
//!
//! This module provides:
//! - The region categories of a page ([`DomCategory`])
//! - The append-only region arena ([`LayoutTree`]) shared by the splitter and
//!   the line extractor
//! - XY-cut splitting of a page into sections and columns ([`xycut`])
//! - Watershed extraction of text lines inside columns ([`lines`])
//!
//! Regions reference their parent by arena index. A parent always precedes
//! its children, so a single forward pass over the arena visits a region
//! after everything it depends on.

pub mod lines;
pub mod xycut;

pub use lines::{LineExtraction, LineExtractor};
pub use xycut::{crop_page, detect_border, XyCutSplitter};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::Rect;

/// Category of a layout region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DomCategory {
    /// The cropped page, root of the tree
    #[serde(rename = "PAGE")]
    Page,
    /// Short band directly under the page
    #[serde(rename = "TITLE_LEVEL_1")]
    TitleLevel1,
    /// Short band inside a top-level column
    #[serde(rename = "TITLE_LEVEL_2")]
    TitleLevel2,
    /// Horizontal band of the page
    #[serde(rename = "SECTION_LEVEL_1")]
    SectionLevel1,
    /// Horizontal band inside a top-level column
    #[serde(rename = "SECTION_LEVEL_2")]
    SectionLevel2,
    /// Column of a top-level section
    #[serde(rename = "COLUMN_LEVEL_1")]
    ColumnLevel1,
    /// Column of a nested section; holds text lines
    #[serde(rename = "COLUMN_LEVEL_2")]
    ColumnLevel2,
    /// Paragraph grouping of lines
    #[serde(rename = "ENTRY")]
    Entry,
    /// Single text line
    #[serde(rename = "LINE")]
    Line,
}

impl DomCategory {
    /// Name used in exported layouts.
    pub fn as_str(&self) -> &'static str {
        match self {
            DomCategory::Page => "PAGE",
            DomCategory::TitleLevel1 => "TITLE_LEVEL_1",
            DomCategory::TitleLevel2 => "TITLE_LEVEL_2",
            DomCategory::SectionLevel1 => "SECTION_LEVEL_1",
            DomCategory::SectionLevel2 => "SECTION_LEVEL_2",
            DomCategory::ColumnLevel1 => "COLUMN_LEVEL_1",
            DomCategory::ColumnLevel2 => "COLUMN_LEVEL_2",
            DomCategory::Entry => "ENTRY",
            DomCategory::Line => "LINE",
        }
    }

    /// Categories a region of this category may be attached to.
    pub fn allowed_parents(&self) -> &'static [DomCategory] {
        match self {
            DomCategory::Page => &[],
            DomCategory::TitleLevel1 | DomCategory::SectionLevel1 => &[DomCategory::Page],
            DomCategory::ColumnLevel1 => &[DomCategory::SectionLevel1],
            DomCategory::TitleLevel2 | DomCategory::SectionLevel2 => &[DomCategory::ColumnLevel1],
            DomCategory::ColumnLevel2 => &[DomCategory::SectionLevel2],
            DomCategory::Entry => &[DomCategory::ColumnLevel2],
            DomCategory::Line => &[DomCategory::ColumnLevel2, DomCategory::Entry],
        }
    }
}

impl fmt::Display for DomCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of the layout tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutRegion {
    /// Bounding box in page coordinates
    pub bbox: Rect,
    /// Region category
    pub category: DomCategory,
    /// Arena index of the parent (`None` for the page)
    pub parent: Option<usize>,
    /// Watershed label of the line (only set on [`DomCategory::Line`])
    pub mask_instance_id: Option<u16>,
}

impl LayoutRegion {
    /// Create a region without a mask label.
    pub fn new(bbox: Rect, category: DomCategory, parent: Option<usize>) -> Self {
        Self {
            bbox,
            category,
            parent,
            mask_instance_id: None,
        }
    }

    /// Create a text line carrying its watershed label.
    pub fn line(bbox: Rect, parent: usize, label: u16) -> Self {
        Self {
            bbox,
            category: DomCategory::Line,
            parent: Some(parent),
            mask_instance_id: Some(label),
        }
    }
}

/// Append-only arena of layout regions.
///
/// Index 0 is the page. Regions are never removed or reordered, so an index
/// stays valid for the lifetime of the tree.
///
/// # Examples
///
/// ```
/// use layout_oxide::geometry::Rect;
/// use layout_oxide::layout::{DomCategory, LayoutRegion, LayoutTree};
///
/// let mut tree = LayoutTree::new(Rect::new(0, 0, 100, 200));
/// let section = tree
///     .push(LayoutRegion::new(Rect::new(0, 0, 100, 80), DomCategory::SectionLevel1, Some(0)))
///     .unwrap();
/// assert_eq!(section, 1);
/// assert_eq!(tree.children(0).collect::<Vec<_>>(), vec![1]);
/// assert!(tree.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutTree {
    regions: Vec<LayoutRegion>,
}

impl LayoutTree {
    /// Create a tree holding only the page region.
    pub fn new(page: Rect) -> Self {
        Self {
            regions: vec![LayoutRegion::new(page, DomCategory::Page, None)],
        }
    }

    /// Append a region and return its index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParent`] when the parent index does not refer
    /// to an existing region.
    pub fn push(&mut self, region: LayoutRegion) -> Result<usize> {
        if let Some(parent) = region.parent {
            if parent >= self.regions.len() {
                return Err(Error::InvalidParent {
                    parent,
                    len: self.regions.len(),
                });
            }
        }
        self.regions.push(region);
        Ok(self.regions.len() - 1)
    }

    /// Region at `id`.
    pub fn get(&self, id: usize) -> Option<&LayoutRegion> {
        self.regions.get(id)
    }

    /// The page region.
    pub fn page(&self) -> Option<&LayoutRegion> {
        self.regions.first()
    }

    /// Number of regions, page included.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// True when the arena holds no region.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// All regions in arena order.
    pub fn regions(&self) -> &[LayoutRegion] {
        &self.regions
    }

    /// Iterate `(index, region)` in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &LayoutRegion)> {
        self.regions.iter().enumerate()
    }

    /// Indices of the direct children of `id`, in arena order.
    pub fn children(&self, id: usize) -> impl Iterator<Item = usize> + '_ {
        self.iter().filter(move |(_, r)| r.parent == Some(id)).map(|(i, _)| i)
    }

    /// Regions of one category, in arena order.
    pub fn regions_of(&self, category: DomCategory) -> impl Iterator<Item = (usize, &LayoutRegion)> {
        self.iter().filter(move |(_, r)| r.category == category)
    }

    /// Indices and boxes of the columns that hold text lines.
    pub fn text_columns(&self) -> (Vec<usize>, Vec<Rect>) {
        self.regions_of(DomCategory::ColumnLevel2).map(|(i, r)| (i, r.bbox)).unzip()
    }

    /// Append lines whose parent is a position in `column_ids`.
    ///
    /// Each line is re-parented to the arena index found at that position.
    pub fn append_lines(&mut self, column_ids: &[usize], lines: Vec<LayoutRegion>) -> Result<()> {
        for mut line in lines {
            let position = line.parent.unwrap_or(usize::MAX);
            let column = column_ids.get(position).copied().ok_or(Error::InvalidParent {
                parent: position,
                len: column_ids.len(),
            })?;
            line.parent = Some(column);
            self.push(line)?;
        }
        Ok(())
    }

    /// Scale every box by `s`, e.g. back to full resolution after a
    /// half-resolution run.
    pub fn scale(&mut self, s: f32) {
        for region in &mut self.regions {
            region.bbox.scale(s);
        }
    }

    /// Check the structural invariants of the tree.
    ///
    /// - index 0 is the only region without a parent, and it is the page
    /// - every parent precedes its child
    /// - the category of a child is allowed under its parent
    /// - a child box lies inside its parent box
    pub fn validate(&self) -> Result<()> {
        for (id, region) in self.iter() {
            let parent = match (id, region.parent) {
                (0, None) if region.category == DomCategory::Page => continue,
                (0, _) => {
                    return Err(Error::InvalidRegion {
                        id,
                        reason: "root must be a page without parent".to_string(),
                    })
                },
                (_, None) => {
                    return Err(Error::InvalidRegion {
                        id,
                        reason: "missing parent".to_string(),
                    })
                },
                (_, Some(p)) if p >= id => return Err(Error::InvalidParent { parent: p, len: id }),
                (_, Some(p)) => &self.regions[p],
            };

            let allowed = region.category.allowed_parents();
            if !allowed.contains(&parent.category) {
                return Err(Error::InvalidRegion {
                    id,
                    reason: format!("{} cannot be a child of {}", region.category, parent.category),
                });
            }
            if !parent.bbox.contains_rect(&region.bbox) {
                return Err(Error::InvalidRegion {
                    id,
                    reason: format!("box {:?} lies outside parent box {:?}", region.bbox, parent.bbox),
                });
            }
        }
        Ok(())
    }
}
