use crate::geometry::Point;
use crate::shape::{Geometry, Shape, ShapeId};

/// Ordered ROI store. Insertion order is creation order and export order.
///
/// The active shape is tracked by id only, so removing a shape can never
/// leave a dangling selection.
#[derive(Clone, Debug)]
pub struct ShapeCollection {
    shapes: Vec<Shape>,
    active: Option<ShapeId>,
    next_id: ShapeId,
}

impl Default for ShapeCollection {
    fn default() -> Self {
        Self {
            shapes: Vec::new(),
            active: None,
            next_id: 1,
        }
    }
}

impl ShapeCollection {
    pub fn add(&mut self, name: impl Into<String>, geometry: Geometry) -> ShapeId {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        self.shapes.push(Shape {
            id,
            name: name.into(),
            geometry,
        });
        id
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|shape| shape.id == id)
    }

    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|shape| shape.id == id)
    }

    pub fn remove(&mut self, id: ShapeId) -> Option<Shape> {
        let idx = self.shapes.iter().position(|shape| shape.id == id)?;
        if self.active == Some(id) {
            self.active = None;
        }
        Some(self.shapes.remove(idx))
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
        self.active = None;
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn active_id(&self) -> Option<ShapeId> {
        self.active
    }

    pub fn active(&self) -> Option<&Shape> {
        self.active.and_then(|id| self.get(id))
    }

    /// Makes `id` the single active shape; `None` clears the selection.
    /// Unknown ids are refused and leave the selection unchanged.
    pub fn set_active(&mut self, id: Option<ShapeId>) -> bool {
        match id {
            Some(id) if self.get(id).is_none() => false,
            _ => {
                self.active = id;
                true
            }
        }
    }

    /// Topmost (most recently created) shape whose body is under `p`.
    pub fn pick(&self, p: Point, tolerance: f64) -> Option<ShapeId> {
        self.shapes
            .iter()
            .rev()
            .find(|shape| shape.geometry.contains(p, tolerance))
            .map(|shape| shape.id)
    }
}
