//! Error types for the layout engine.
//!
//! This module defines all error types that can occur while segmenting a page.

use crate::layout::DomCategory;

/// Result type alias for layout operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during page segmentation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A region was split under a parent whose category does not allow it.
    ///
    /// This aborts the page: the partial tree is not usable.
    #[error("Invalid document layout: parent is {found:?}, expected {:?} or {:?}", expected[0], expected[1])]
    InvalidLayout {
        /// Category of the parent region
        found: DomCategory,
        /// Categories accepted by the active split phase
        expected: [DomCategory; 2],
    },

    /// A region was appended with a parent that does not precede it
    #[error("Invalid parent index {parent} for arena of length {len}")]
    InvalidParent {
        /// Parent index of the rejected region
        parent: usize,
        /// Arena length at the time of the append
        len: usize,
    },

    /// A region breaks a structural invariant of the layout tree
    #[error("Invalid region {id}: {reason}")]
    InvalidRegion {
        /// Arena index of the region
        id: usize,
        /// What is wrong with it
        reason: String,
    },

    /// Input buffer does not describe a valid image
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// The watershed produced more basins than a 16-bit label image can hold
    #[error("Too many watershed labels: {0} (max: 65535)")]
    LabelOverflow(usize),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding/encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
