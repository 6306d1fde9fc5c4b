//! Layout thresholds derived from the page x-height.
//!
//! Every geometric decision of the splitter and the line extractor reads its
//! threshold from one [`LayoutConfig`], built once per page from the estimated
//! x-height (the pixel height of lowercase letters).

/// Layout configuration for one page.
///
/// Construct it with [`LayoutConfig::new`]; the `with_*` methods adjust the
/// fixed tunables that do not depend on the x-height.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Estimated x-height in pixels
    pub x_height: f32,
    /// Font size (1.5 x-height)
    pub one_em: f32,
    /// Distance between two consecutive baselines
    pub line_height: f32,
    /// Blank pixels between two words
    pub word_spacing: f32,
    /// Approximate width of a short word
    pub word_width: f32,

    /// Horizontal opening size used to merge letters into blocks
    pub block_opening_width: usize,
    /// Vertical opening size used to merge lines into blocks
    pub block_opening_height: usize,
    /// Minimal block height
    pub block_min_height: usize,
    /// Minimal block width
    pub block_min_width: usize,

    /// Minimal blank run between two columns
    pub column_min_spacing: usize,
    /// Minimal column width
    pub column_min_size: usize,

    /// Minimal blank run between two sections
    pub section_min_spacing: usize,
    /// Minimal section height
    pub section_min_size: usize,
    /// Maximal number of ink pixels for a row third to be blank
    pub count_empty_line: usize,

    /// Maximal deviation (degrees) for a segment to count as horizontal/vertical
    pub angle_tolerance: f64,
    /// Horizontal opening used for page border detection
    pub page_opening_width: usize,
    /// Vertical opening used for page border detection
    pub page_opening_height: usize,
    /// Fraction of white pixels for a page row/column to be blank
    pub page_full_line_white: f32,
    /// Fraction of the page scanned as potential border on each side
    pub page_margin: f32,

    /// Gray level below which a pixel is ink for column splitting and line boxes
    pub white_level: u8,
    /// Gray level below which a pixel is ink for page cropping and section splitting
    pub ink_threshold: u8,
    /// Gray level above which the blurred image is background during line seeding
    pub line_split_white_level: u8,
    /// Margin added around split regions
    pub extra_margin: i32,
    /// Inset of the region in which vertical separators prevent a horizontal split
    pub inner_region_margin: i32,
}

impl LayoutConfig {
    /// Derive every threshold from the x-height.
    ///
    /// When `half_resolution` is set the page was subsampled by two and the
    /// x-height is halved first.
    ///
    /// # Examples
    ///
    /// ```
    /// use layout_oxide::config::LayoutConfig;
    ///
    /// let config = LayoutConfig::new(10, false);
    /// assert_eq!(config.line_height, 20.0);
    /// assert_eq!(config.column_min_spacing, 15);
    ///
    /// let half = LayoutConfig::new(21, true);
    /// assert_eq!(half.x_height, 10.0);
    /// ```
    pub fn new(x_height: u32, half_resolution: bool) -> Self {
        let xh = if half_resolution {
            x_height / 2
        } else {
            x_height
        } as f32;
        let one_em = 1.5 * xh;

        Self {
            x_height: xh,
            one_em,
            line_height: 2.0 * xh,
            word_spacing: 0.5 * xh,
            word_width: 4.0 * xh,

            block_opening_width: one_em.round() as usize,
            block_opening_height: xh.round() as usize,
            block_min_height: (0.5 * xh + 0.5) as usize,
            block_min_width: (10.0 * xh + 0.5) as usize,

            column_min_spacing: one_em.round() as usize,
            column_min_size: (6.0 * one_em).round() as usize,

            section_min_spacing: (0.5 * xh).round() as usize,
            section_min_size: xh.round() as usize,
            count_empty_line: (0.5 * one_em).round() as usize,

            angle_tolerance: 5.0,
            page_opening_width: 400,
            page_opening_height: 400,
            page_full_line_white: 0.95,
            page_margin: 0.1,

            white_level: 150,
            ink_threshold: 200,
            line_split_white_level: 230,
            extra_margin: 2,
            inner_region_margin: 10,
        }
    }

    /// Set the segment angle tolerance in degrees.
    pub fn with_angle_tolerance(mut self, degrees: f64) -> Self {
        self.angle_tolerance = degrees.max(0.0);
        self
    }

    /// Set the fraction of the page scanned for borders (0.0-0.5).
    pub fn with_page_margin(mut self, margin: f32) -> Self {
        self.page_margin = margin.clamp(0.0, 0.5);
        self
    }

    /// Set the ink gray level used for column splitting and line boxes.
    pub fn with_white_level(mut self, level: u8) -> Self {
        self.white_level = level;
        self
    }

    /// Set the ink gray level used for cropping and section splitting.
    pub fn with_ink_threshold(mut self, level: u8) -> Self {
        self.ink_threshold = level;
        self
    }

    /// Set the opening sizes used for page border detection.
    pub fn with_page_opening(mut self, width: usize, height: usize) -> Self {
        self.page_opening_width = width;
        self.page_opening_height = height;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_thresholds() {
        let c = LayoutConfig::new(10, false);
        assert_eq!(c.x_height, 10.0);
        assert_eq!(c.one_em, 15.0);
        assert_eq!(c.line_height, 20.0);
        assert_eq!(c.word_spacing, 5.0);
        assert_eq!(c.word_width, 40.0);
        assert_eq!(c.block_opening_width, 15);
        assert_eq!(c.block_opening_height, 10);
        assert_eq!(c.block_min_height, 5);
        assert_eq!(c.block_min_width, 100);
        assert_eq!(c.column_min_spacing, 15);
        assert_eq!(c.column_min_size, 90);
        assert_eq!(c.section_min_spacing, 5);
        assert_eq!(c.section_min_size, 10);
        assert_eq!(c.count_empty_line, 8);
    }

    #[test]
    fn test_half_resolution() {
        let full = LayoutConfig::new(20, false);
        let half = LayoutConfig::new(41, true);
        assert_eq!(half.x_height, 20.0);
        assert_eq!(half, full);
    }

    #[test]
    fn test_builders() {
        let c = LayoutConfig::new(12, false)
            .with_angle_tolerance(3.0)
            .with_page_margin(0.9)
            .with_white_level(120)
            .with_ink_threshold(180)
            .with_page_opening(100, 50);
        assert_eq!(c.angle_tolerance, 3.0);
        assert_eq!(c.page_margin, 0.5);
        assert_eq!(c.white_level, 120);
        assert_eq!(c.ink_threshold, 180);
        assert_eq!(c.page_opening_width, 100);
        assert_eq!(c.page_opening_height, 50);
    }
}
