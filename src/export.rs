//! JSON export of a layout tree.
//!
//! The output is a flat array in arena order:
//!
//! ```text
//! [
//!   { "id": 0, "parent": -1, "type": "PAGE", "box": [x, y, w, h] },
//!   { "id": 1, "parent": 0, "type": "SECTION_LEVEL_1", "box": [x, y, w, h] },
//!   ...
//! ]
//! ```

use std::io::Write;

use serde::Serialize;

use crate::error::Result;
use crate::layout::{DomCategory, LayoutTree};

#[derive(Serialize)]
struct ExportedRegion {
    id: usize,
    parent: i64,
    #[serde(rename = "type")]
    category: DomCategory,
    #[serde(rename = "box")]
    bbox: [i32; 4],
}

fn exported(tree: &LayoutTree) -> Vec<ExportedRegion> {
    tree.iter()
        .map(|(id, r)| ExportedRegion {
            id,
            parent: r.parent.map_or(-1, |p| p as i64),
            category: r.category,
            bbox: [r.bbox.x, r.bbox.y, r.bbox.width, r.bbox.height],
        })
        .collect()
}

/// Serialize `tree` to a pretty-printed JSON string.
///
/// # Examples
///
/// ```
/// use layout_oxide::export::to_json;
/// use layout_oxide::geometry::Rect;
/// use layout_oxide::layout::LayoutTree;
///
/// let json = to_json(&LayoutTree::new(Rect::new(0, 0, 10, 20))).unwrap();
/// assert!(json.contains("\"parent\": -1"));
/// assert!(json.contains("\"PAGE\""));
/// ```
pub fn to_json(tree: &LayoutTree) -> Result<String> {
    Ok(serde_json::to_string_pretty(&exported(tree))?)
}

/// Write `tree` as pretty-printed JSON to `writer`.
pub fn write_json<W: Write>(tree: &LayoutTree, mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, &exported(tree))?;
    writeln!(writer)?;
    Ok(())
}
