//! Pointer-driven creation and editing of ROIs once the scale is known.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::collection::ShapeCollection;
use crate::geometry::Point;
use crate::shape::{Geometry, Handle, ShapeId};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Tool {
    Select,
    Rectangle,
    Polygon,
    Circle,
}

impl Tool {
    pub fn creates_shapes(self) -> bool {
        !matches!(self, Self::Select)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum EditDrag {
    Handle {
        id: ShapeId,
        handle: Handle,
        original: Geometry,
    },
    Move {
        id: ShapeId,
        start: Point,
        original: Geometry,
    },
    DrawRectangle {
        start: Point,
        current: Point,
    },
    DrawCircle {
        center: Point,
        current: Point,
    },
}

/// Hit radii already converted to image pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitRadii {
    pub handle: f64,
    pub body: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DownOutcome {
    Ignored,
    Changed,
    /// The draft polygon was closed by clicking its first vertex.
    ClosePolygon,
}

#[derive(Clone, Debug)]
pub struct ShapeEditor {
    tool: Tool,
    drag: Option<EditDrag>,
    polygon: Vec<Point>,
}

impl Default for ShapeEditor {
    fn default() -> Self {
        Self {
            tool: Tool::Select,
            drag: None,
            polygon: Vec::new(),
        }
    }
}

impl ShapeEditor {
    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Switching tools abandons any in-progress drag or polygon draft.
    pub fn set_tool(&mut self, tool: Tool) {
        if self.tool != tool {
            debug!("tool: {:?} -> {:?}", self.tool, tool);
        }
        self.tool = tool;
        self.drag = None;
        self.polygon.clear();
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn polygon_draft(&self) -> &[Point] {
        &self.polygon
    }

    pub fn take_polygon(&mut self) -> Vec<Point> {
        std::mem::take(&mut self.polygon)
    }

    pub fn cancel_polygon(&mut self) -> bool {
        let had_draft = !self.polygon.is_empty();
        self.polygon.clear();
        had_draft
    }

    /// Drops a running drag without producing a draft. Handle and move
    /// edits keep whatever geometry they reached.
    pub fn abandon_drag(&mut self) -> bool {
        self.drag.take().is_some()
    }

    pub fn pointer_down(
        &mut self,
        shapes: &mut ShapeCollection,
        p: Point,
        radii: HitRadii,
    ) -> DownOutcome {
        if self.drag.is_some() {
            return DownOutcome::Ignored;
        }
        match self.tool {
            Tool::Select => self.select_down(shapes, p, radii),
            Tool::Rectangle => {
                self.drag = Some(EditDrag::DrawRectangle {
                    start: p,
                    current: p,
                });
                DownOutcome::Changed
            }
            Tool::Circle => {
                self.drag = Some(EditDrag::DrawCircle {
                    center: p,
                    current: p,
                });
                DownOutcome::Changed
            }
            Tool::Polygon => self.polygon_down(p, radii.handle),
        }
    }

    fn select_down(
        &mut self,
        shapes: &mut ShapeCollection,
        p: Point,
        radii: HitRadii,
    ) -> DownOutcome {
        if let Some(active) = shapes.active() {
            if let Some(handle) = active.geometry.handle_at(p, radii.handle) {
                debug!("handle drag {:?} on shape {}", handle, active.id);
                self.drag = Some(EditDrag::Handle {
                    id: active.id,
                    handle,
                    original: active.geometry.clone(),
                });
                return DownOutcome::Changed;
            }
        }

        match shapes.pick(p, radii.body) {
            Some(id) => {
                shapes.set_active(Some(id));
                if let Some(shape) = shapes.get(id) {
                    self.drag = Some(EditDrag::Move {
                        id,
                        start: p,
                        original: shape.geometry.clone(),
                    });
                }
                DownOutcome::Changed
            }
            None if shapes.active_id().is_some() => {
                shapes.set_active(None);
                DownOutcome::Changed
            }
            None => DownOutcome::Ignored,
        }
    }

    fn polygon_down(&mut self, p: Point, tolerance: f64) -> DownOutcome {
        if self.polygon.len() >= 3 && self.polygon[0].is_within(p, tolerance) {
            return DownOutcome::ClosePolygon;
        }
        // a second press on the last vertex (e.g. the tail of a double-click)
        if self.polygon.last().is_some_and(|last| last.is_within(p, tolerance)) {
            return DownOutcome::Ignored;
        }
        self.polygon.push(p);
        debug!("polygon vertex {} at ({:.1}, {:.1})", self.polygon.len(), p.x, p.y);
        DownOutcome::Changed
    }

    pub fn pointer_move(&mut self, shapes: &mut ShapeCollection, p: Point, min_radius: f64) -> bool {
        let Some(drag) = self.drag.as_mut() else {
            return false;
        };
        match drag {
            EditDrag::Handle {
                id,
                handle,
                original,
            } => {
                let Some(shape) = shapes.get_mut(*id) else {
                    return false;
                };
                let mut geometry = original.clone();
                geometry.drag_handle(*handle, p, min_radius);
                shape.geometry = geometry;
            }
            EditDrag::Move {
                id,
                start,
                original,
            } => {
                let Some(shape) = shapes.get_mut(*id) else {
                    return false;
                };
                let (dx, dy) = start.delta(p);
                let mut geometry = original.clone();
                geometry.translate(dx, dy);
                shape.geometry = geometry;
            }
            EditDrag::DrawRectangle { current, .. } | EditDrag::DrawCircle { current, .. } => {
                *current = p;
            }
        }
        true
    }

    /// Ends the running drag. Draw drags yield the drafted geometry, which
    /// still needs validation and a name before it joins the collection.
    pub fn end_drag(&mut self, last: Option<Point>) -> Option<Geometry> {
        let drag = self.drag.take()?;
        match drag {
            EditDrag::DrawRectangle { start, current } => Some(Geometry::rectangle_from_corners(
                start,
                last.unwrap_or(current),
            )),
            EditDrag::DrawCircle { center, current } => Some(Geometry::Circle {
                center,
                radius: center.distance(last.unwrap_or(current)),
            }),
            EditDrag::Handle { id, .. } | EditDrag::Move { id, .. } => {
                debug!("edit of shape {id} finished");
                None
            }
        }
    }

    /// Preview of what a running draw drag would create.
    pub fn draw_preview(&self) -> Option<Geometry> {
        match self.drag.as_ref()? {
            EditDrag::DrawRectangle { start, current } => {
                Some(Geometry::rectangle_from_corners(*start, *current))
            }
            EditDrag::DrawCircle { center, current } => Some(Geometry::Circle {
                center: *center,
                radius: center.distance(*current),
            }),
            EditDrag::Handle { .. } | EditDrag::Move { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DownOutcome, HitRadii, ShapeEditor, Tool};
    use crate::collection::ShapeCollection;
    use crate::geometry::Point;
    use crate::shape::Geometry;

    const RADII: HitRadii = HitRadii {
        handle: 18.0,
        body: 6.0,
    };

    #[test]
    fn draw_rectangle_is_order_independent() {
        let mut shapes = ShapeCollection::default();
        let mut forward = ShapeEditor::default();
        forward.set_tool(Tool::Rectangle);
        forward.pointer_down(&mut shapes, Point::new(100.0, 100.0), RADII);
        let a = forward.end_drag(Some(Point::new(300.0, 200.0)));

        let mut backward = ShapeEditor::default();
        backward.set_tool(Tool::Rectangle);
        backward.pointer_down(&mut shapes, Point::new(300.0, 200.0), RADII);
        let b = backward.end_drag(Some(Point::new(100.0, 100.0)));

        assert_eq!(a, b);
        assert_eq!(
            a,
            Some(Geometry::Rectangle {
                origin: Point::new(100.0, 100.0),
                width: 200.0,
                height: 100.0
            })
        );
        assert!(shapes.is_empty());
    }

    #[test]
    fn select_then_drag_corner_handle() {
        let mut shapes = ShapeCollection::default();
        let id = shapes.add(
            "a",
            Geometry::rectangle_from_corners(Point::new(0.0, 0.0), Point::new(100.0, 100.0)),
        );
        let mut editor = ShapeEditor::default();

        assert_eq!(
            editor.pointer_down(&mut shapes, Point::new(50.0, 50.0), RADII),
            DownOutcome::Changed
        );
        assert_eq!(shapes.active_id(), Some(id));
        editor.end_drag(None);

        editor.pointer_down(&mut shapes, Point::new(101.0, 99.0), RADII);
        assert!(editor.pointer_move(&mut shapes, Point::new(150.0, 120.0), 10.0));
        assert_eq!(editor.end_drag(None), None);
        assert_eq!(
            shapes.get(id).map(|s| s.geometry.clone()),
            Some(Geometry::Rectangle {
                origin: Point::new(0.0, 0.0),
                width: 150.0,
                height: 120.0
            })
        );
    }

    #[test]
    fn body_drag_moves_shape() {
        let mut shapes = ShapeCollection::default();
        let id = shapes.add(
            "c",
            Geometry::Circle {
                center: Point::new(200.0, 200.0),
                radius: 50.0,
            },
        );
        let mut editor = ShapeEditor::default();
        editor.pointer_down(&mut shapes, Point::new(230.0, 200.0), RADII);
        editor.pointer_move(&mut shapes, Point::new(240.0, 210.0), 10.0);
        editor.end_drag(None);
        assert_eq!(
            shapes.get(id).map(|s| s.geometry.clone()),
            Some(Geometry::Circle {
                center: Point::new(210.0, 210.0),
                radius: 50.0
            })
        );
    }

    #[test]
    fn clicking_empty_space_deselects() {
        let mut shapes = ShapeCollection::default();
        let id = shapes.add(
            "a",
            Geometry::rectangle_from_corners(Point::new(0.0, 0.0), Point::new(10.0, 10.0)),
        );
        shapes.set_active(Some(id));
        let mut editor = ShapeEditor::default();
        assert_eq!(
            editor.pointer_down(&mut shapes, Point::new(500.0, 500.0), RADII),
            DownOutcome::Changed
        );
        assert_eq!(shapes.active_id(), None);
    }

    #[test]
    fn polygon_draft_skips_duplicates_and_closes_on_first_vertex() {
        let mut shapes = ShapeCollection::default();
        let mut editor = ShapeEditor::default();
        editor.set_tool(Tool::Polygon);
        for p in [
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(101.0, 1.0),
            Point::new(100.0, 100.0),
        ] {
            editor.pointer_down(&mut shapes, p, RADII);
        }
        assert_eq!(editor.polygon_draft().len(), 3);
        assert_eq!(
            editor.pointer_down(&mut shapes, Point::new(2.0, 2.0), RADII),
            DownOutcome::ClosePolygon
        );
        assert_eq!(editor.take_polygon().len(), 3);
        assert!(editor.polygon_draft().is_empty());
    }

    #[test]
    fn switching_tool_discards_draft() {
        let mut shapes = ShapeCollection::default();
        let mut editor = ShapeEditor::default();
        editor.set_tool(Tool::Polygon);
        editor.pointer_down(&mut shapes, Point::new(0.0, 0.0), RADII);
        editor.set_tool(Tool::Select);
        assert!(editor.polygon_draft().is_empty());
    }
}
