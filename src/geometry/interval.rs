//! Closed integer intervals and merged interval sets.
//!
//! The splitter uses an [`IntervalSet`] to collect the row ranges covered by
//! vertical separators, where a horizontal cut is not allowed.

/// A closed interval `[a, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    /// Lower bound (inclusive)
    pub a: i32,
    /// Upper bound (inclusive)
    pub b: i32,
}

impl Interval {
    /// Create a new interval.
    pub fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// True when the two intervals share no value.
    pub fn disjoint(&self, other: &Interval) -> bool {
        self.b < other.a || other.b < self.a
    }

    /// True when the two intervals share at least one value.
    pub fn intersects(&self, other: &Interval) -> bool {
        !self.disjoint(other)
    }

    /// True when `v` lies in the interval.
    pub fn contains(&self, v: i32) -> bool {
        self.a <= v && v <= self.b
    }

    /// Distance between the bounds.
    pub fn length(&self) -> i32 {
        self.b - self.a
    }

    /// Fraction of `other` covered by this interval.
    pub fn overlap(&self, other: &Interval) -> f32 {
        let u = self.a.max(other.a);
        let v = self.b.min(other.b);
        if v <= u || other.length() == 0 {
            0.0
        } else {
            (v - u) as f32 / other.length() as f32
        }
    }
}

/// A sorted collection of pairwise disjoint intervals.
///
/// # Examples
///
/// ```
/// use layout_oxide::geometry::{Interval, IntervalSet};
///
/// let mut set = IntervalSet::new();
/// set.insert(2, 5);
/// set.insert(8, 15);
/// set.insert(5, 8);
/// assert_eq!(set.intervals(), &[Interval::new(2, 15)]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntervalSet {
    data: Vec<Interval>,
}

impl IntervalSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `[a, b]`, merging every interval that intersects it.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `a > b`.
    pub fn insert(&mut self, a: i32, b: i32) {
        debug_assert!(a <= b, "interval bounds out of order: [{}, {}]", a, b);

        // First interval ending at or after `a`, first interval starting after `b`
        let start = self.data.partition_point(|i| i.b < a);
        let end = start + self.data[start..].partition_point(|i| i.a <= b);

        if start == end {
            self.data.insert(start, Interval::new(a, b));
        } else {
            let merged = Interval::new(self.data[start].a.min(a), self.data[end - 1].b.max(b));
            self.data[start] = merged;
            self.data.drain(start + 1..end);
        }
    }

    /// True when `v` is covered by the set.
    pub fn contains(&self, v: i32) -> bool {
        self.data.iter().any(|i| i.contains(v))
    }

    /// True when any interval of the set intersects `interval`.
    pub fn intersects(&self, interval: &Interval) -> bool {
        self.data.iter().any(|i| i.intersects(interval))
    }

    /// True when any interval covers more than `p` of `interval`.
    pub fn intersects_by(&self, interval: &Interval, p: f32) -> bool {
        self.data.iter().any(|i| i.overlap(interval) > p)
    }

    /// The intervals in ascending order.
    pub fn intervals(&self) -> &[Interval] {
        &self.data
    }

    /// Iterate the intervals in ascending order.
    pub fn iter(&self) -> std::slice::Iter<'_, Interval> {
        self.data.iter()
    }

    /// Number of disjoint intervals.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when nothing was inserted.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<'a> IntoIterator for &'a IntervalSet {
    type Item = &'a Interval;
    type IntoIter = std::slice::Iter<'a, Interval>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}
