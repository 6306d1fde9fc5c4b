//! Separator line segments supplied by the external line detector.

use serde::{Deserialize, Serialize};

use super::Point;

/// A detected line segment.
///
/// End points are ordered top to bottom (`start.y <= end.y`). The angle is in
/// degrees in `[0, 180]`; 0/180 is horizontal and 90 is vertical.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSegment")]
pub struct Segment {
    /// Upper end point
    pub start: Point,
    /// Lower end point
    pub end: Point,
    /// Stroke width in pixels
    pub width: f64,
    /// Length in pixels
    pub length: f64,
    /// Angle in degrees
    pub angle: f64,
    /// Detection confidence (number of false alarms)
    pub nfa: f64,
}

impl Segment {
    /// Create a segment from two end points; length and angle are derived.
    ///
    /// # Examples
    ///
    /// ```
    /// use layout_oxide::geometry::{Point, Segment};
    ///
    /// let s = Segment::new(Point::new(10, 50), Point::new(10, 0));
    /// assert_eq!(s.start.y, 0);
    /// assert!(s.is_vertical(5.0));
    /// assert_eq!(s.length, 50.0);
    /// ```
    pub fn new(start: Point, end: Point) -> Self {
        let (start, end) = ordered(start, end);
        let dx = (end.x - start.x) as f64;
        let dy = (end.y - start.y) as f64;
        Self {
            start,
            end,
            width: 1.0,
            length: dx.hypot(dy),
            angle: dy.atan2(dx).to_degrees(),
            nfa: 0.0,
        }
    }

    /// Create a segment with every attribute given by the detector.
    pub fn from_parts(
        start: Point,
        end: Point,
        width: f64,
        length: f64,
        angle: f64,
        nfa: f64,
    ) -> Self {
        let (start, end) = ordered(start, end);
        Self {
            start,
            end,
            width,
            length,
            angle,
            nfa,
        }
    }

    /// Set the stroke width.
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    /// Set the detection confidence.
    pub fn with_nfa(mut self, nfa: f64) -> Self {
        self.nfa = nfa;
        self
    }

    /// True when the angle is within `tolerance` degrees of horizontal.
    pub fn is_horizontal(&self, tolerance: f64) -> bool {
        let a = if self.angle <= 90.0 {
            self.angle
        } else {
            180.0 - self.angle
        };
        a < tolerance
    }

    /// True when the angle is within `tolerance` degrees of vertical.
    pub fn is_vertical(&self, tolerance: f64) -> bool {
        (self.angle - 90.0).abs() < tolerance
    }

    /// Scale the end points (truncating) and the length.
    pub fn scale(&mut self, s: f64) {
        self.start = Point::new((self.start.x as f64 * s) as i32, (self.start.y as f64 * s) as i32);
        self.end = Point::new((self.end.x as f64 * s) as i32, (self.end.y as f64 * s) as i32);
        self.length *= s;
    }

    /// Undo a page shear of `angle` degrees: `x -= y * cos(angle)`.
    pub fn deskew(&mut self, angle: f64) {
        let c = angle.to_radians().cos();
        self.start.x = (self.start.x as f64 - self.start.y as f64 * c) as i32;
        self.end.x = (self.end.x as f64 - self.end.y as f64 * c) as i32;
    }

    /// Mean x position of the two end points.
    pub fn mid_x(&self) -> f32 {
        (self.start.x + self.end.x) as f32 / 2.0
    }
}

/// Detector output as found in JSON; end points may come in any order.
#[derive(Deserialize)]
struct RawSegment {
    start: Point,
    end: Point,
    #[serde(default = "default_width")]
    width: f64,
    length: f64,
    angle: f64,
    #[serde(default)]
    nfa: f64,
}

fn default_width() -> f64 {
    1.0
}

impl From<RawSegment> for Segment {
    fn from(raw: RawSegment) -> Self {
        Segment::from_parts(raw.start, raw.end, raw.width, raw.length, raw.angle, raw.nfa)
    }
}

fn ordered(a: Point, b: Point) -> (Point, Point) {
    if a.y <= b.y {
        (a, b)
    } else {
        (b, a)
    }
}

/// Apply [`Segment::deskew`] to every segment.
pub fn deskew_segments(segments: &mut [Segment], angle: f64) {
    for s in segments.iter_mut() {
        s.deskew(angle);
    }
}

/// Estimate the page shear from its vertical separators.
///
/// Averages the angle of every vertical segment that stays clear of the left
/// and right 10% of the page. Returns 90 (no shear) when no segment qualifies.
pub fn estimate_deskew_angle(segments: &[Segment], image_width: u32, tolerance: f64) -> f64 {
    const BORDER: f64 = 0.1;
    let width = image_width as f64;

    let mut sum = 0.0;
    let mut count = 0usize;
    for s in segments.iter().filter(|s| s.is_vertical(tolerance)) {
        let x_min = s.start.x.min(s.end.x) as f64;
        let x_max = s.start.x.max(s.end.x) as f64;
        if x_min < BORDER * width || x_max > (1.0 - BORDER) * width {
            continue;
        }
        sum += s.angle;
        count += 1;
    }

    if count == 0 {
        log::info!("No vertical segment available for deskew estimation");
        return 90.0;
    }
    log::debug!("Deskew estimated from {} segments", count);
    sum / count as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_ordering() {
        let s = Segment::new(Point::new(5, 40), Point::new(6, 10));
        assert_eq!(s.start, Point::new(6, 10));
        assert_eq!(s.end, Point::new(5, 40));
        assert!(s.start.y <= s.end.y);
    }

    #[test]
    fn test_deserialize_orders_end_points() {
        let json = r#"{"start":{"x":300,"y":550},"end":{"x":300,"y":150},"width":2.0,"length":400.0,"angle":90.0,"nfa":0.0}"#;
        let s: Segment = serde_json::from_str(json).unwrap();
        assert_eq!(s.start, Point::new(300, 150));
        assert_eq!(s.end, Point::new(300, 550));
        assert_eq!(s.width, 2.0);
        assert!(s.is_vertical(5.0));

        // Width and nfa are optional
        let s: Segment = serde_json::from_str(r#"{"start":{"x":0,"y":9},"end":{"x":80,"y":8},"length":80.0,"angle":0.7}"#).unwrap();
        assert_eq!(s.start.y, 8);
        assert_eq!(s.width, 1.0);
        assert_eq!(s.nfa, 0.0);
    }

    #[test]
    fn test_serialize_round_trip_keeps_order() {
        let s = Segment::new(Point::new(10, 90), Point::new(12, 5));
        let back: Segment = serde_json::from_str(&serde_json::to_string(&s).unwrap()).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn test_segment_orientation() {
        let h = Segment::new(Point::new(0, 10), Point::new(100, 12));
        assert!(h.is_horizontal(5.0));
        assert!(!h.is_vertical(5.0));

        let v = Segment::new(Point::new(50, 0), Point::new(52, 200));
        assert!(v.is_vertical(5.0));
        assert!(!v.is_horizontal(5.0));

        // Right-to-left horizontal line has an angle near 180
        let back = Segment::from_parts(Point::new(100, 10), Point::new(0, 11), 1.0, 100.0, 179.0, 0.0);
        assert!(back.is_horizontal(5.0));

        let diagonal = Segment::new(Point::new(0, 0), Point::new(100, 100));
        assert!(!diagonal.is_horizontal(5.0));
        assert!(!diagonal.is_vertical(5.0));
    }

    #[test]
    fn test_segment_scale() {
        let mut s = Segment::new(Point::new(10, 20), Point::new(30, 21));
        let len = s.length;
        s.scale(0.5);
        assert_eq!(s.start, Point::new(5, 10));
        assert_eq!(s.end, Point::new(15, 10));
        assert!((s.length - len * 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_deskew_noop_at_90() {
        let mut segs = vec![Segment::new(Point::new(100, 0), Point::new(100, 500))];
        deskew_segments(&mut segs, 90.0);
        assert_eq!(segs[0].start.x, 100);
        assert_eq!(segs[0].end.x, 100);
    }

    #[test]
    fn test_deskew_shear() {
        // A line leaning right by 1px every 10 rows is straightened
        let angle = (0.1f64).acos().to_degrees();
        let mut s = Segment::new(Point::new(100, 0), Point::new(110, 100));
        s.deskew(angle);
        assert_eq!(s.start.x, 100);
        assert!((s.end.x - 100).abs() <= 1);
    }

    #[test]
    fn test_estimate_deskew_angle() {
        let segs = vec![
            Segment::from_parts(Point::new(500, 0), Point::new(501, 900), 1.0, 900.0, 89.0, 0.0),
            Segment::from_parts(Point::new(300, 0), Point::new(300, 900), 1.0, 900.0, 91.0, 0.0),
            // Near the left border: ignored
            Segment::from_parts(Point::new(10, 0), Point::new(10, 900), 1.0, 900.0, 80.0, 0.0),
            // Horizontal: ignored
            Segment::new(Point::new(200, 50), Point::new(800, 50)),
        ];
        let angle = estimate_deskew_angle(&segs, 1000, 15.0);
        assert!((angle - 90.0).abs() < 1e-9);
        assert_eq!(estimate_deskew_angle(&[], 1000, 5.0), 90.0);
    }
}
