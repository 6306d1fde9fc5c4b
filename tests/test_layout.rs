//! Integration tests for page segmentation.
//!
//! These tests run the splitter and the full pipeline on synthetic pages made
//! of solid ink blocks and text-like bars, with injected separator segments.

use image::{GrayImage, Luma};
use layout_oxide::config::LayoutConfig;
use layout_oxide::export::{to_json, write_json};
use layout_oxide::geometry::{Point, Rect, Segment};
use layout_oxide::layout::{DomCategory, LayoutTree, XyCutSplitter};
use layout_oxide::pipeline::PageSegmenter;

// ============================================================================
// Helper Functions for Creating Synthetic Pages
// ============================================================================

/// White 600x800 page with the given boxes filled with ink.
fn page_with(boxes: &[Rect]) -> GrayImage {
    let mut img = GrayImage::from_pixel(600, 800, Luma([255]));
    for b in boxes {
        for y in b.top()..b.bottom() {
            for x in b.left()..b.right() {
                img.put_pixel(x as u32, y as u32, Luma([0]));
            }
        }
    }
    img
}

fn boxes_of(tree: &LayoutTree, category: DomCategory) -> Vec<Rect> {
    tree.regions_of(category).map(|(_, r)| r.bbox).collect()
}

fn config() -> LayoutConfig {
    LayoutConfig::new(10, false)
}

// ============================================================================
// XY-Cut
// ============================================================================

#[test]
fn test_horizontal_rules_split_page_into_three_sections() {
    let page = page_with(&[Rect::new(60, 100, 480, 500)]);
    let rules = [
        Segment::new(Point::new(80, 430), Point::new(520, 430)),
        Segment::new(Point::new(80, 260), Point::new(520, 260)),
    ];

    let config = config();
    let tree = XyCutSplitter::new(&config).split(&page, &rules).unwrap();
    tree.validate().unwrap();

    let sections: Vec<(usize, Rect)> = tree
        .regions_of(DomCategory::SectionLevel1)
        .map(|(i, r)| (i, r.bbox))
        .collect();
    assert_eq!(sections.len(), 3);
    assert!(sections.iter().all(|(i, _)| tree.get(*i).and_then(|r| r.parent) == Some(0)));

    let margin = config.extra_margin + 3;
    let bounds: Vec<(i32, i32)> = sections.iter().map(|(_, b)| (b.top(), b.bottom())).collect();
    assert_eq!(bounds[0].0, 100);
    assert!((bounds[0].1 - 260).abs() <= margin);
    assert!((bounds[1].0 - 260).abs() <= margin);
    assert!((bounds[1].1 - 430).abs() <= margin);
    assert!((bounds[2].0 - 430).abs() <= margin);
    assert_eq!(bounds[2].1, 600);

    // Every section holds one column, one nested section and one text column
    for (id, _) in &sections {
        let columns: Vec<usize> = tree.children(*id).collect();
        assert_eq!(columns.len(), 1);
        assert_eq!(tree.get(columns[0]).map(|r| r.category), Some(DomCategory::ColumnLevel1));
        let nested: Vec<usize> = tree.children(columns[0]).collect();
        assert_eq!(nested.len(), 1);
        assert_eq!(tree.get(nested[0]).map(|r| r.category), Some(DomCategory::SectionLevel2));
        assert_eq!(tree.children(nested[0]).count(), 1);
    }
    assert_eq!(tree.text_columns().0.len(), 3);
}

#[test]
fn test_short_rule_does_not_force_split() {
    let page = page_with(&[Rect::new(60, 100, 480, 500)]);
    // Shorter than a quarter of the page width
    let rule = Segment::new(Point::new(200, 300), Point::new(300, 300));

    let config = config();
    let tree = XyCutSplitter::new(&config).split(&page, &[rule]).unwrap();
    assert_eq!(boxes_of(&tree, DomCategory::SectionLevel1).len(), 1);
}

#[test]
fn test_vertical_rule_prevents_horizontal_split() {
    let blocks = [Rect::new(60, 100, 480, 200), Rect::new(60, 400, 480, 200)];
    let page = page_with(&blocks);
    let config = config();

    let tree = XyCutSplitter::new(&config).split(&page, &[]).unwrap();
    assert_eq!(boxes_of(&tree, DomCategory::SectionLevel1).len(), 2);

    let rule = Segment::new(Point::new(300, 150), Point::new(300, 550));
    let tree = XyCutSplitter::new(&config).split(&page, &[rule]).unwrap();
    tree.validate().unwrap();
    let sections = boxes_of(&tree, DomCategory::SectionLevel1);
    assert_eq!(sections, vec![Rect::new(60, 100, 480, 500)]);
    // The same rule splits the section into two columns
    assert_eq!(boxes_of(&tree, DomCategory::ColumnLevel1).len(), 2);
}

#[test]
fn test_rule_near_region_border_does_not_prevent_split() {
    let page = page_with(&[Rect::new(60, 100, 480, 200), Rect::new(60, 400, 480, 200)]);
    // Inside the page but within the inner margin of its left edge
    let rule = Segment::new(Point::new(65, 150), Point::new(65, 550));

    let config = config();
    let tree = XyCutSplitter::new(&config).split(&page, &[rule]).unwrap();
    assert_eq!(boxes_of(&tree, DomCategory::SectionLevel1).len(), 2);
    tree.validate().unwrap();
}

#[test]
fn test_segment_order_does_not_matter() {
    let page = page_with(&[Rect::new(60, 100, 480, 500)]);
    let a = Segment::new(Point::new(80, 260), Point::new(520, 260));
    let b = Segment::new(Point::new(80, 430), Point::new(520, 430));

    let config = config();
    let first = XyCutSplitter::new(&config).split(&page, &[a, b]).unwrap();
    let second = XyCutSplitter::new(&config).split(&page, &[b, a]).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_inverted_rule_from_json_prevents_split() {
    let page = page_with(&[Rect::new(60, 100, 480, 200), Rect::new(60, 400, 480, 200)]);
    // Detectors may list a vertical rule bottom to top
    let json = r#"[{"start":{"x":300,"y":550},"end":{"x":300,"y":150},"width":1.0,"length":400.0,"angle":90.0,"nfa":0.0}]"#;
    let rules: Vec<Segment> = serde_json::from_str(json).unwrap();

    let config = config();
    let tree = XyCutSplitter::new(&config).split(&page, &rules).unwrap();
    tree.validate().unwrap();
    assert_eq!(boxes_of(&tree, DomCategory::SectionLevel1), vec![Rect::new(60, 100, 480, 500)]);
    assert_eq!(boxes_of(&tree, DomCategory::ColumnLevel1).len(), 2);
}

#[test]
fn test_column_with_heading_gets_level_two_title() {
    // Left column: heading band above a body block; right column: one block
    let page = page_with(&[
        Rect::new(60, 100, 200, 20),
        Rect::new(60, 160, 200, 440),
        Rect::new(340, 100, 200, 500),
    ]);

    let config = config();
    let tree = XyCutSplitter::new(&config).split(&page, &[]).unwrap();
    tree.validate().unwrap();

    assert_eq!(tree.regions_of(DomCategory::SectionLevel1).count(), 1);
    let columns: Vec<usize> = tree.regions_of(DomCategory::ColumnLevel1).map(|(i, _)| i).collect();
    assert_eq!(columns.len(), 2);

    let titles: Vec<(usize, Rect)> = tree
        .regions_of(DomCategory::TitleLevel2)
        .map(|(i, r)| (i, r.bbox))
        .collect();
    assert_eq!(titles.len(), 1);
    let (title, bbox) = titles[0];
    assert_eq!(tree.get(title).and_then(|r| r.parent), Some(columns[0]));
    assert_eq!(bbox, Rect::new(60, 100, 206, 22));
    assert_eq!(tree.children(title).count(), 0);

    // One nested section per column, each holding one text column
    let sections: Vec<(usize, Option<usize>)> = tree
        .regions_of(DomCategory::SectionLevel2)
        .map(|(i, r)| (i, r.parent))
        .collect();
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].1, Some(columns[0]));
    assert_eq!(sections[1].1, Some(columns[1]));
    for (id, _) in &sections {
        let children: Vec<usize> = tree.children(*id).collect();
        assert_eq!(children.len(), 1);
        assert_eq!(tree.get(children[0]).map(|r| r.category), Some(DomCategory::ColumnLevel2));
    }

    let (_, text_columns) = tree.text_columns();
    assert_eq!(text_columns, vec![Rect::new(60, 158, 206, 442), Rect::new(334, 100, 206, 500)]);
}

#[test]
fn test_half_resolution_config_matches_halved_page() {
    let full = LayoutConfig::new(20, false);
    let half = LayoutConfig::new(20, true);
    assert_eq!(half.x_height, 10.0);
    assert_eq!(half.column_min_spacing, 15);
    assert_eq!(full.column_min_spacing, 30);
}

// ============================================================================
// Full pipeline
// ============================================================================

/// Page with a single text column of `n` x-height bars on a 20 px baseline grid.
fn text_page(n: i32) -> (GrayImage, Vec<Rect>) {
    let bars: Vec<Rect> = (0..n).map(|i| Rect::new(100, 150 + 20 * i, 400, 10)).collect();
    (page_with(&bars), bars)
}

#[test]
fn test_pipeline_extracts_lines() {
    let (page, bars) = text_page(6);
    let layout = PageSegmenter::new(config()).segment(&page, &[]).unwrap();
    layout.tree.validate().unwrap();

    let columns = boxes_of(&layout.tree, DomCategory::ColumnLevel2);
    assert_eq!(columns.len(), 1);

    let lines = boxes_of(&layout.tree, DomCategory::Line);
    assert_eq!(lines.len(), bars.len());
    assert_eq!(layout.line_count(), bars.len());
    for (line, bar) in lines.iter().zip(&bars) {
        assert!(line.intersects(bar), "{:?} does not cover {:?}", line, bar);
    }

    // Line labels point into the label image
    for (_, region) in layout.tree.regions_of(DomCategory::Line) {
        let label = region.mask_instance_id.unwrap();
        assert_ne!(label, 0);
        let centre = (region.bbox.x + region.bbox.width / 2, region.bbox.y + region.bbox.height / 2);
        assert_eq!(layout.labels.get_pixel(centre.0 as u32, centre.1 as u32)[0], label);
    }
}

#[test]
fn test_pipeline_lines_hang_under_text_columns() {
    let (page, _) = text_page(4);
    let layout = PageSegmenter::new(config()).segment(&page, &[]).unwrap();
    let (column_ids, _) = layout.tree.text_columns();

    for (_, line) in layout.tree.regions_of(DomCategory::Line) {
        let parent = line.parent.unwrap();
        assert!(column_ids.contains(&parent));
    }
}

#[test]
fn test_blank_page_has_no_lines() {
    let page = GrayImage::from_pixel(200, 200, Luma([255]));
    let layout = PageSegmenter::new(config()).segment(&page, &[]).unwrap();
    assert_eq!(layout.line_count(), 0);
    assert_eq!(layout.tree.page().map(|p| p.category), Some(DomCategory::Page));
}

// ============================================================================
// Export
// ============================================================================

#[test]
fn test_export_round_trip_through_file() {
    let (page, _) = text_page(3);
    let layout = PageSegmenter::new(config()).segment(&page, &[]).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("layout.json");
    write_json(&layout.tree, std::fs::File::create(&path).unwrap()).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.trim_end(), to_json(&layout.tree).unwrap());

    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    let items = value.as_array().unwrap();
    assert_eq!(items.len(), layout.tree.len());
    assert_eq!(items[0]["parent"], -1);
    assert!(items.iter().any(|e| e["type"] == "LINE"));
    for (i, item) in items.iter().enumerate() {
        assert_eq!(item["id"], i);
        assert_eq!(item["box"].as_array().map(|b| b.len()), Some(4));
    }
}
