//! Points and boxes in surface pixels.
//!
//! Browser hosts use CSS pixels relative to the viewport; terminal hosts
//! use cells. The engine only needs them to be the same unit as
//! [`Surface::viewport_height`](super::Surface::viewport_height).

/// A pointer position relative to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// Horizontal offset from the left edge.
    pub x: f64,
    /// Vertical offset from the top edge.
    pub y: f64,
}

impl Point {
    /// Creates a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// An axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge.
    pub left: f64,
    /// Top edge.
    pub top: f64,
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl Rect {
    /// Creates a box.
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Right edge (exclusive).
    #[must_use]
    pub fn right(self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge (exclusive).
    #[must_use]
    pub fn bottom(self) -> f64 {
        self.top + self.height
    }

    /// Whether `p` lies inside, counting the top-left edges only.
    #[must_use]
    pub fn contains(self, p: Point) -> bool {
        p.x >= self.left && p.x < self.right() && p.y >= self.top && p.y < self.bottom()
    }

    /// Midpoint of the box.
    #[must_use]
    pub fn center(self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// Same size, moved so its centre sits on `p`.
    #[must_use]
    pub fn centered_on(self, p: Point) -> Self {
        Self {
            left: p.x - self.width / 2.0,
            top: p.y - self.height / 2.0,
            ..self
        }
    }

    /// Same size, moved vertically by `dy`.
    #[must_use]
    pub fn shifted_y(self, dy: f64) -> Self {
        Self {
            top: self.top + dy,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_half_open() {
        let r = Rect::new(10.0, 10.0, 100.0, 50.0);
        assert!(r.contains(Point::new(10.0, 10.0)));
        assert!(r.contains(Point::new(109.9, 59.9)));
        assert!(!r.contains(Point::new(110.0, 30.0)));
        assert!(!r.contains(Point::new(50.0, 60.0)));
    }

    #[test]
    fn centering_keeps_size() {
        let r = Rect::new(0.0, 0.0, 200.0, 100.0).centered_on(Point::new(300.0, 300.0));
        assert_eq!(r, Rect::new(200.0, 250.0, 200.0, 100.0));
        assert_eq!(r.center(), Point::new(300.0, 300.0));
    }

    #[test]
    fn distance() {
        assert!((Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)) - 5.0).abs() < f64::EPSILON);
    }
}
