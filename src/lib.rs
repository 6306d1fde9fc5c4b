// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::enum_variant_names)]

//! # Layout Oxide
//!
//! Page layout segmentation for scanned documents: a region tree from a
//! recursive XY-cut, and text lines from a marker-controlled watershed.
//!
//! ## Core Features
//!
//! - **Page cropping**: finds the page inside a scan with dark borders
//! - **XY-Cut**: alternates horizontal and vertical cuts on ink projections,
//!   corrected by detected separator rules
//! - **Region tree**: PAGE → SECTION/TITLE → COLUMN → SECTION/TITLE → COLUMN → LINE,
//!   stored in an append-only arena
//! - **Line extraction**: directional blur + watershed, one basin per text line,
//!   with same-line basins merged
//! - **Export**: JSON region list and 16-bit label image
//!
//! ## Quick Start
//!
//! ```no_run
//! use layout_oxide::config::LayoutConfig;
//! use layout_oxide::export::to_json;
//! use layout_oxide::pipeline::PageSegmenter;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let page = image::open("page.png")?.to_luma8();
//!
//! // x-height of the body text, in pixels
//! let segmenter = PageSegmenter::new(LayoutConfig::new(18, false));
//! let layout = segmenter.segment(&page, &[])?;
//!
//! println!("{}", to_json(&layout.tree)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## License
//!
//! Licensed under either of:
//!
//! * Apache License, Version 2.0 (<http://www.apache.org/licenses/LICENSE-2.0>)
//! * MIT license (<http://opensource.org/licenses/MIT>)
//!
//! at your option.

#![warn(missing_docs)]

// Error handling
pub mod error;

// Configuration
pub mod config;

// Geometry and 1-D signals
pub mod geometry;
pub mod signal;

// Image operators
pub mod imgproc;

// Layout analysis
pub mod layout;

// Page pipeline
pub mod pipeline;

// Output
pub mod export;

// Re-exports
pub use config::LayoutConfig;
pub use error::{Error, Result};
pub use geometry::{Point, Rect, Segment};
pub use layout::{DomCategory, LayoutRegion, LayoutTree};
pub use pipeline::{PageLayout, PageSegmenter};

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
