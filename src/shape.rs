use serde::{Deserialize, Serialize};

use crate::geometry::{circle_hit, distance_to_segment, point_in_polygon, Bounds, CirclePart, Point};

pub type ShapeId = u64;

/// Smallest width/height a rectangle keeps while one of its corners is dragged.
pub const MIN_RECT_EXTENT: f64 = 1.0;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ShapeKind {
    Circle,
    Rectangle,
    Polygon,
}

impl ShapeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Rectangle => "rectangle",
            Self::Polygon => "polygon",
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Self::TopLeft => Self::BottomRight,
            Self::TopRight => Self::BottomLeft,
            Self::BottomRight => Self::TopLeft,
            Self::BottomLeft => Self::TopRight,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Handle {
    Center,
    Edge,
    Corner(Corner),
    Vertex(usize),
}

/// Pixel-space geometry of one ROI.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum Geometry {
    Circle { center: Point, radius: f64 },
    Rectangle { origin: Point, width: f64, height: f64 },
    Polygon { vertices: Vec<Point> },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Shape {
    pub id: ShapeId,
    pub name: String,
    pub geometry: Geometry,
}

impl Geometry {
    /// Rectangle spanned by two drag endpoints, in either order.
    pub fn rectangle_from_corners(a: Point, b: Point) -> Self {
        let bounds = Bounds::from_corners(a, b);
        Self::Rectangle {
            origin: bounds.min,
            width: bounds.width(),
            height: bounds.height(),
        }
    }

    pub fn rectangle_centered(center: Point, size: f64) -> Self {
        Self::Rectangle {
            origin: center.offset(-size * 0.5, -size * 0.5),
            width: size,
            height: size,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Circle { .. } => ShapeKind::Circle,
            Self::Rectangle { .. } => ShapeKind::Rectangle,
            Self::Polygon { .. } => ShapeKind::Polygon,
        }
    }

    pub fn bounds(&self) -> Bounds {
        match self {
            Self::Circle { center, radius } => Bounds {
                min: center.offset(-radius, -radius),
                max: center.offset(*radius, *radius),
            },
            Self::Rectangle {
                origin,
                width,
                height,
            } => Bounds {
                min: *origin,
                max: origin.offset(*width, *height),
            },
            Self::Polygon { vertices } => Bounds::from_points(vertices).unwrap_or(Bounds {
                min: Point::default(),
                max: Point::default(),
            }),
        }
    }

    pub fn corner(&self, corner: Corner) -> Option<Point> {
        let Self::Rectangle {
            origin,
            width,
            height,
        } = self
        else {
            return None;
        };
        Some(match corner {
            Corner::TopLeft => *origin,
            Corner::TopRight => origin.offset(*width, 0.0),
            Corner::BottomRight => origin.offset(*width, *height),
            Corner::BottomLeft => origin.offset(0.0, *height),
        })
    }

    pub fn handles(&self) -> Vec<(Handle, Point)> {
        match self {
            Self::Circle { center, radius } => vec![
                (Handle::Center, *center),
                (Handle::Edge, center.offset(*radius, 0.0)),
            ],
            Self::Rectangle { .. } => Corner::ALL
                .iter()
                .filter_map(|corner| self.corner(*corner).map(|p| (Handle::Corner(*corner), p)))
                .collect(),
            Self::Polygon { vertices } => vertices
                .iter()
                .enumerate()
                .map(|(idx, p)| (Handle::Vertex(idx), *p))
                .collect(),
        }
    }

    /// Finds the handle under `p`. Circles use the same edge-before-center
    /// band test as the reference circle.
    pub fn handle_at(&self, p: Point, tolerance: f64) -> Option<Handle> {
        if let Self::Circle { center, radius } = self {
            return circle_hit(*center, *radius, p, tolerance).map(|part| match part {
                CirclePart::Edge => Handle::Edge,
                CirclePart::Center => Handle::Center,
            });
        }
        self.handles()
            .into_iter()
            .filter(|(_, handle_pos)| handle_pos.is_within(p, tolerance))
            .min_by(|a, b| a.1.distance(p).total_cmp(&b.1.distance(p)))
            .map(|(handle, _)| handle)
    }

    /// Body hit test: inside the shape or within `tolerance` of its outline.
    pub fn contains(&self, p: Point, tolerance: f64) -> bool {
        match self {
            Self::Circle { center, radius } => center.distance(p) <= radius + tolerance,
            Self::Rectangle { .. } => self.bounds().expand(tolerance).contains(p),
            Self::Polygon { vertices } => {
                point_in_polygon(p, vertices)
                    || vertices
                        .iter()
                        .zip(vertices.iter().cycle().skip(1))
                        .any(|(a, b)| distance_to_segment(p, *a, *b) <= tolerance)
            }
        }
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        match self {
            Self::Circle { center, .. } => *center = center.offset(dx, dy),
            Self::Rectangle { origin, .. } => *origin = origin.offset(dx, dy),
            Self::Polygon { vertices } => {
                for v in vertices.iter_mut() {
                    *v = v.offset(dx, dy);
                }
            }
        }
    }

    /// Applies a handle drag to `self`, which must be the geometry as it was
    /// when the drag started. Rectangle corners keep the opposite corner
    /// fixed and may cross it; the result is always normalized.
    pub fn drag_handle(&mut self, handle: Handle, to: Point, min_radius: f64) {
        match (self, handle) {
            (Self::Circle { center, .. }, Handle::Center) => *center = to,
            (Self::Circle { center, radius }, Handle::Edge) => {
                *radius = center.distance(to).max(min_radius);
            }
            (rect @ Self::Rectangle { .. }, Handle::Corner(corner)) => {
                let Some(fixed) = rect.corner(corner.opposite()) else {
                    return;
                };
                let (x, width) = span(fixed.x, to.x);
                let (y, height) = span(fixed.y, to.y);
                *rect = Self::Rectangle {
                    origin: Point::new(x, y),
                    width,
                    height,
                };
            }
            (Self::Polygon { vertices }, Handle::Vertex(idx)) => {
                if let Some(v) = vertices.get_mut(idx) {
                    *v = to;
                }
            }
            _ => {}
        }
    }

    /// Returns why this geometry cannot be committed, if it cannot.
    pub fn degenerate_reason(&self, min_size: f64) -> Option<String> {
        match self {
            Self::Circle { radius, .. } if *radius < min_size => {
                Some(format!("circle radius must be at least {min_size} px"))
            }
            Self::Rectangle { width, height, .. } if *width < min_size || *height < min_size => {
                Some(format!("rectangle must be at least {min_size}x{min_size} px"))
            }
            Self::Polygon { vertices } if vertices.len() < 3 => Some(format!(
                "a polygon needs at least 3 vertices, got {}",
                vertices.len()
            )),
            _ => None,
        }
    }
}

/// Start and length of the span between a fixed coordinate and a dragged one,
/// never shorter than `MIN_RECT_EXTENT`.
fn span(fixed: f64, moving: f64) -> (f64, f64) {
    let len = (moving - fixed).abs().max(MIN_RECT_EXTENT);
    if moving < fixed {
        (fixed - len, len)
    } else {
        (fixed, len)
    }
}

#[cfg(test)]
mod tests {
    use super::{Corner, Geometry, Handle};
    use crate::geometry::Point;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Geometry {
        Geometry::Rectangle {
            origin: Point::new(x, y),
            width: w,
            height: h,
        }
    }

    #[test]
    fn drag_corner_keeps_opposite_fixed() {
        let mut g = rect(100.0, 100.0, 200.0, 100.0);
        g.drag_handle(Handle::Corner(Corner::BottomRight), Point::new(350.0, 260.0), 10.0);
        assert_eq!(g, rect(100.0, 100.0, 250.0, 160.0));
    }

    #[test]
    fn drag_corner_past_opposite_flips_without_negative_size() {
        let mut g = rect(100.0, 100.0, 200.0, 100.0);
        // top-left dragged beyond bottom-right (300, 200)
        g.drag_handle(Handle::Corner(Corner::TopLeft), Point::new(400.0, 260.0), 10.0);
        assert_eq!(g, rect(300.0, 200.0, 100.0, 60.0));
        // the old fixed corner is now the top-left, the dragged one bottom-right
        assert_eq!(g.corner(Corner::TopLeft), Some(Point::new(300.0, 200.0)));
        assert_eq!(g.corner(Corner::BottomRight), Some(Point::new(400.0, 260.0)));
    }

    #[test]
    fn collapsing_corner_keeps_minimum_extent() {
        let mut g = rect(0.0, 0.0, 50.0, 50.0);
        g.drag_handle(Handle::Corner(Corner::TopRight), Point::new(0.0, 50.0), 10.0);
        let Geometry::Rectangle { width, height, .. } = g else {
            panic!("still a rectangle");
        };
        assert!(width > 0.0 && height > 0.0);
    }

    #[test]
    fn circle_edge_drag_clamps_radius() {
        let mut g = Geometry::Circle {
            center: Point::new(0.0, 0.0),
            radius: 40.0,
        };
        g.drag_handle(Handle::Edge, Point::new(3.0, 4.0), 10.0);
        assert_eq!(
            g,
            Geometry::Circle {
                center: Point::new(0.0, 0.0),
                radius: 10.0
            }
        );
        assert_eq!(g.handle_at(Point::new(10.0, 0.0), 18.0), Some(Handle::Edge));
    }

    #[test]
    fn vertex_drag_moves_only_that_vertex() {
        let mut g = Geometry::Polygon {
            vertices: vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
            ],
        };
        assert_eq!(g.handle_at(Point::new(9.0, 1.0), 5.0), Some(Handle::Vertex(1)));
        g.drag_handle(Handle::Vertex(1), Point::new(20.0, -5.0), 10.0);
        let Geometry::Polygon { vertices } = &g else {
            panic!("still a polygon");
        };
        assert_eq!(
            vertices,
            &vec![
                Point::new(0.0, 0.0),
                Point::new(20.0, -5.0),
                Point::new(10.0, 10.0)
            ]
        );
    }

    #[test]
    fn polygon_body_hit_includes_outline() {
        let g = Geometry::Polygon {
            vertices: vec![
                Point::new(0.0, 0.0),
                Point::new(100.0, 0.0),
                Point::new(0.0, 100.0),
            ],
        };
        assert!(g.contains(Point::new(10.0, 10.0), 2.0));
        assert!(g.contains(Point::new(50.0, -1.5), 2.0));
        assert!(!g.contains(Point::new(90.0, 90.0), 2.0));
    }

    #[test]
    fn degenerate_shapes_are_reported() {
        assert!(rect(0.0, 0.0, 0.0, 40.0).degenerate_reason(5.0).is_some());
        assert!(rect(0.0, 0.0, 40.0, 40.0).degenerate_reason(5.0).is_none());
        let two = Geometry::Polygon {
            vertices: vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)],
        };
        assert!(two.degenerate_reason(5.0).is_some());
    }
}
