//! Conversion of the pixel-space collection into the game-unit JSON document.

use serde::{Deserialize, Serialize};

use crate::calibration::CalibrationState;
use crate::collection::ShapeCollection;
use crate::error::RoiError;
use crate::geometry::{Bounds, Point};
use crate::shape::Geometry;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExportPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExportBounds {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// One entry of the exported array. All numbers are game units.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ExportedShape {
    Circle {
        name: String,
        cx: f64,
        cy: f64,
        r: f64,
    },
    Rectangle {
        name: String,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
    },
    Polygon {
        name: String,
        points: Vec<ExportPoint>,
        /// Derived from `points`; not authoritative.
        bounds: ExportBounds,
    },
}

#[cfg(test)]
impl ExportedShape {
    pub fn name(&self) -> &str {
        match self {
            Self::Circle { name, .. } | Self::Rectangle { name, .. } | Self::Polygon { name, .. } => {
                name
            }
        }
    }
}

/// Scales one shape's geometry by `units_per_pixel`. The stored geometry is
/// only read.
pub fn export_shape(name: &str, geometry: &Geometry, units_per_pixel: f64) -> ExportedShape {
    let name = name.to_string();
    match geometry {
        Geometry::Circle { center, radius } => ExportedShape::Circle {
            name,
            cx: center.x * units_per_pixel,
            cy: center.y * units_per_pixel,
            r: radius * units_per_pixel,
        },
        Geometry::Rectangle {
            origin,
            width,
            height,
        } => ExportedShape::Rectangle {
            name,
            x: origin.x * units_per_pixel,
            y: origin.y * units_per_pixel,
            w: width * units_per_pixel,
            h: height * units_per_pixel,
        },
        Geometry::Polygon { vertices } => {
            let scaled: Vec<Point> = vertices.iter().map(|v| v.scaled(units_per_pixel)).collect();
            let bounds = Bounds::from_points(&scaled).map_or(
                ExportBounds {
                    x: 0.0,
                    y: 0.0,
                    w: 0.0,
                    h: 0.0,
                },
                |b| ExportBounds {
                    x: b.min.x,
                    y: b.min.y,
                    w: b.width(),
                    h: b.height(),
                },
            );
            ExportedShape::Polygon {
                name,
                points: scaled
                    .into_iter()
                    .map(|p| ExportPoint { x: p.x, y: p.y })
                    .collect(),
                bounds,
            }
        }
    }
}

/// Builds the export document in collection order. When `reference_name` is
/// given the confirmed reference circle is emitted first under that name.
pub fn export(
    shapes: &ShapeCollection,
    calibration: &CalibrationState,
    reference_name: Option<&str>,
) -> Result<Vec<ExportedShape>, RoiError> {
    let units_per_pixel = calibration
        .units_per_pixel()
        .ok_or(RoiError::NotCalibrated)?;

    let reference = reference_name.zip(calibration.circle()).map(|(name, circle)| {
        export_shape(
            name,
            &Geometry::Circle {
                center: circle.center,
                radius: circle.radius_px,
            },
            units_per_pixel,
        )
    });

    Ok(reference
        .into_iter()
        .chain(
            shapes
                .iter()
                .map(|shape| export_shape(&shape.name, &shape.geometry, units_per_pixel)),
        )
        .collect())
}

pub fn to_json(document: &[ExportedShape]) -> Result<String, RoiError> {
    Ok(serde_json::to_string_pretty(document)?)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{export, export_shape, to_json, ExportedShape};
    use crate::calibration::CalibrationState;
    use crate::collection::ShapeCollection;
    use crate::error::RoiError;
    use crate::geometry::Point;
    use crate::shape::Geometry;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    fn confirmed(radius_px: f64, units: f64) -> CalibrationState {
        let mut calibration = CalibrationState::default();
        calibration.begin(true).expect("image");
        calibration.place_center(Point::new(400.0, 300.0));
        calibration.begin_drag(Point::new(460.0, 300.0), 20.0);
        calibration.drag_to(Point::new(400.0 + radius_px, 300.0));
        calibration.end_drag();
        calibration.confirm(units).expect("confirm");
        calibration
    }

    #[test]
    fn refuses_without_calibration() {
        let shapes = ShapeCollection::default();
        assert_eq!(
            export(&shapes, &CalibrationState::default(), None),
            Err(RoiError::NotCalibrated)
        );
    }

    #[test]
    fn rectangle_scenario_exports_scaled_values() {
        let calibration = confirmed(100.0, 50.0);
        let mut shapes = ShapeCollection::default();
        shapes.add(
            "spawn",
            Geometry::rectangle_from_corners(Point::new(100.0, 100.0), Point::new(300.0, 200.0)),
        );
        let doc = export(&shapes, &calibration, None).expect("export");
        assert_eq!(
            serde_json::to_value(&doc).expect("json"),
            json!([{ "type": "rectangle", "name": "spawn", "x": 50.0, "y": 50.0, "w": 100.0, "h": 50.0 }])
        );
    }

    #[test]
    fn every_coordinate_is_multiplied_by_scale() {
        let upp = 67.0 / 83.0;
        let circle = Geometry::Circle {
            center: Point::new(12.5, 99.0),
            radius: 33.3,
        };
        let ExportedShape::Circle { cx, cy, r, .. } = export_shape("c", &circle, upp) else {
            panic!("circle expected");
        };
        assert!(close(cx, 12.5 * upp));
        assert!(close(cy, 99.0 * upp));
        assert!(close(r, 33.3 * upp));
    }

    #[test]
    fn polygon_gets_points_and_bounds() {
        let polygon = Geometry::Polygon {
            vertices: vec![
                Point::new(10.0, 40.0),
                Point::new(50.0, 20.0),
                Point::new(30.0, 80.0),
            ],
        };
        let value = serde_json::to_value(export_shape("zone", &polygon, 0.5)).expect("json");
        assert_eq!(
            value,
            json!({
                "type": "polygon",
                "name": "zone",
                "points": [{ "x": 5.0, "y": 20.0 }, { "x": 25.0, "y": 10.0 }, { "x": 15.0, "y": 40.0 }],
                "bounds": { "x": 5.0, "y": 10.0, "w": 20.0, "h": 30.0 }
            })
        );
    }

    #[test]
    fn reference_circle_comes_first_and_storage_is_untouched() {
        let calibration = confirmed(100.0, 50.0);
        let mut shapes = ShapeCollection::default();
        let id = shapes.add(
            "ring",
            Geometry::Circle {
                center: Point::new(10.0, 10.0),
                radius: 20.0,
            },
        );
        let doc = export(&shapes, &calibration, Some("Fangradius")).expect("export");
        let names: Vec<_> = doc.iter().map(ExportedShape::name).collect();
        assert_eq!(names, ["Fangradius", "ring"]);
        assert_eq!(
            doc[0],
            ExportedShape::Circle {
                name: "Fangradius".into(),
                cx: 200.0,
                cy: 150.0,
                r: 50.0
            }
        );
        assert_eq!(
            shapes.get(id).map(|s| s.geometry.clone()),
            Some(Geometry::Circle {
                center: Point::new(10.0, 10.0),
                radius: 20.0
            })
        );
        assert!(to_json(&doc).expect("encode").starts_with('['));
    }
}
