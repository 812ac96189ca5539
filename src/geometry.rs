#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

/// A point in screen, canvas, or native page space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Both coordinates are finite numbers.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    #[must_use]
    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Width and height in a single coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Scale uniformly so the width equals `width`.
    #[must_use]
    pub fn scaled_to_width(self, width: f64) -> Size {
        if self.width <= 0.0 {
            return Size::new(width, 0.0);
        }
        let k = width / self.width;
        Size::new(width, self.height * k)
    }
}

/// Axis-aligned rectangle anchored at its top-left corner (Y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    #[must_use]
    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// Smallest rectangle enclosing every point, or `None` for an empty set.
    #[must_use]
    pub fn bounding<I: IntoIterator<Item = Point>>(points: I) -> Option<Rect> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in iter {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Rect::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    #[must_use]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether `p` lies inside the rectangle. Edges count as inside.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Same rectangle moved so its centre sits on `center`.
    #[must_use]
    pub fn centered_on(&self, center: Point) -> Rect {
        Rect::new(center.x - self.width / 2.0, center.y - self.height / 2.0, self.width, self.height)
    }

    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Corners `[tl, tr, br, bl]` after rotating `rotation_deg` clockwise about the centre.
    #[must_use]
    pub fn rotated_corners(&self, rotation_deg: f64) -> [Point; 4] {
        let corners = [
            Point::new(self.x, self.y),
            Point::new(self.right(), self.y),
            Point::new(self.right(), self.bottom()),
            Point::new(self.x, self.bottom()),
        ];
        if rotation_deg == 0.0 {
            return corners;
        }
        let c = self.center();
        let (sin, cos) = rotation_deg.to_radians().sin_cos();
        corners.map(|p| {
            let dx = p.x - c.x;
            let dy = p.y - c.y;
            Point::new(c.x + dx * cos - dy * sin, c.y + dx * sin + dy * cos)
        })
    }
}

/// Maps canvas units (the page stack at zoom 1) onto the on-screen canvas.
///
/// A canvas point `p` is drawn at `p * zoom + pan`, in CSS pixels of the
/// host element. Native page points are a third space, handled by
/// [`crate::transform`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { zoom: 1.0, pan_x: 0.0, pan_y: 0.0 }
    }
}

impl Viewport {
    /// Canvas-unit position under a pointer at `screen`.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point::new((screen.x - self.pan_x) / self.zoom, (screen.y - self.pan_y) / self.zoom)
    }

    /// Where the canvas-unit point `world` is drawn on screen.
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point::new(world.x * self.zoom + self.pan_x, world.y * self.zoom + self.pan_y)
    }

    /// Pixel length on screen expressed in canvas units.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.zoom
    }

    /// Canvas-space rectangle currently visible on a canvas of `canvas` pixels.
    #[must_use]
    pub fn visible_window(&self, canvas: Size) -> Rect {
        let tl = self.screen_to_world(Point::new(0.0, 0.0));
        Rect::new(tl.x, tl.y, self.screen_dist_to_world(canvas.width), self.screen_dist_to_world(canvas.height))
    }

    /// Change zoom while keeping the canvas point under `pivot` (screen space) fixed.
    pub fn zoom_to_point(&mut self, pivot: Point, zoom: f64) {
        let anchor = self.screen_to_world(pivot);
        self.zoom = zoom;
        self.pan_x = pivot.x - anchor.x * zoom;
        self.pan_y = pivot.y - anchor.y * zoom;
    }
}
