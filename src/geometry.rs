use serde::{Deserialize, Serialize};

/// Image-space position in natural pixels.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Vector from `self` to `other`.
    pub fn delta(self, other: Point) -> (f64, f64) {
        (other.x - self.x, other.y - self.y)
    }

    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    pub fn is_within(self, target: Point, tolerance: f64) -> bool {
        self.distance(target) < tolerance
    }
}

/// Axis-aligned extent of a point set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        Some(iter.fold(
            Self {
                min: first,
                max: first,
            },
            |acc, p| Self {
                min: Point::new(acc.min.x.min(p.x), acc.min.y.min(p.y)),
                max: Point::new(acc.max.x.max(p.x), acc.max.y.max(p.y)),
            },
        ))
    }

    /// Normalized box spanned by two opposite corners in either order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn expand(&self, amount: f64) -> Self {
        Self {
            min: self.min.offset(-amount, -amount),
            max: self.max.offset(amount, amount),
        }
    }
}

/// Which part of a circle a pointer lands on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CirclePart {
    Center,
    Edge,
}

/// Hit-tests the circle's edge band first, then its center.
///
/// Both use the same tolerance; when the bands overlap on small circles the
/// edge wins.
pub fn circle_hit(center: Point, radius: f64, p: Point, tolerance: f64) -> Option<CirclePart> {
    let d = center.distance(p);
    if (d - radius).abs() < tolerance {
        Some(CirclePart::Edge)
    } else if d < tolerance {
        Some(CirclePart::Center)
    } else {
        None
    }
}

pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let (abx, aby) = a.delta(b);
    let (apx, apy) = a.delta(p);
    let len_sq = abx * abx + aby * aby;
    if len_sq <= f64::EPSILON {
        return a.distance(p);
    }
    let t = ((apx * abx + apy * aby) / len_sq).clamp(0.0, 1.0);
    Point::new(a.x + abx * t, a.y + aby * t).distance(p)
}

/// Even-odd ray casting; points exactly on an edge may land either side.
pub fn point_in_polygon(p: Point, vertices: &[Point]) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (vi, vj) = (vertices[i], vertices[j]);
        if (vi.y > p.y) != (vj.y > p.y) {
            let x_cross = (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
