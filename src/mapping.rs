//! Conversion between host viewport coordinates and image pixels.

use crate::geometry::Point;

/// Where and how large the image is drawn on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenTransform {
    origin: Point,
    scale_x: f64,
    scale_y: f64,
}

impl ScreenTransform {
    #[cfg(test)]
    pub const IDENTITY: Self = Self {
        origin: Point::new(0.0, 0.0),
        scale_x: 1.0,
        scale_y: 1.0,
    };

    /// Builds the transform from the displayed image box and the image's
    /// natural pixel size. Returns `None` for an empty box or image.
    pub fn from_display(
        display_min: Point,
        display_size: (f64, f64),
        natural_size: (u32, u32),
    ) -> Option<Self> {
        let (w, h) = display_size;
        let (nw, nh) = natural_size;
        if nw == 0 || nh == 0 || w <= 0.0 || h <= 0.0 {
            return None;
        }
        Some(Self {
            origin: display_min,
            scale_x: w / nw as f64,
            scale_y: h / nh as f64,
        })
    }

    pub fn uniform(origin: Point, scale: f64) -> Self {
        Self {
            origin,
            scale_x: scale,
            scale_y: scale,
        }
    }

    pub fn to_image(&self, client: Point) -> Point {
        Point::new(
            (client.x - self.origin.x) / self.scale_x,
            (client.y - self.origin.y) / self.scale_y,
        )
    }

    pub fn to_screen(&self, image: Point) -> Point {
        Point::new(
            self.origin.x + image.x * self.scale_x,
            self.origin.y + image.y * self.scale_y,
        )
    }

    /// Converts a length measured on screen into image pixels.
    pub fn screen_len_to_image(&self, len: f64) -> f64 {
        len / self.scale()
    }

    pub fn scale(&self) -> f64 {
        (self.scale_x + self.scale_y) * 0.5
    }
}

/// One pointer as reported by the host: mouse, pen, or a single touch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSample {
    pub client: Point,
    pub pointer_id: u64,
    pub is_primary: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchContact {
    pub id: u64,
    pub client: Point,
}

/// Raw input from the host before it is reduced to a single contact.
#[derive(Clone, Debug, PartialEq)]
pub enum HostEvent {
    Pointer(PointerSample),
    /// Active touch list in contact order.
    Touch(Vec<TouchContact>),
}

impl HostEvent {
    pub fn mouse(x: f64, y: f64) -> Self {
        Self::Pointer(PointerSample {
            client: Point::new(x, y),
            pointer_id: 0,
            is_primary: true,
        })
    }
}

/// Reduces an event to its primary contact. Secondary pointers and every
/// touch except the first in the active list are ignored.
pub fn primary_contact(event: &HostEvent) -> Option<PointerSample> {
    match event {
        HostEvent::Pointer(sample) if sample.is_primary => Some(*sample),
        HostEvent::Pointer(_) => None,
        HostEvent::Touch(touches) => touches.first().map(|touch| PointerSample {
            client: touch.client,
            pointer_id: touch.id,
            is_primary: true,
        }),
    }
}

pub fn to_image_space(event: &HostEvent, transform: &ScreenTransform) -> Option<Point> {
    primary_contact(event).map(|sample| transform.to_image(sample.client))
}

pub fn to_screen_space(image: Point, transform: &ScreenTransform) -> Point {
    transform.to_screen(image)
}
