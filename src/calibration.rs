//! Reference-circle calibration.
//!
//! The user places a circle over something of known in-game size, drags it
//! to fit, and types the real radius. The ratio of the two becomes the
//! scale applied to every exported coordinate.

use log::{debug, info};

use crate::error::RoiError;
use crate::geometry::{circle_hit, CirclePart, Point};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalibrationPhase {
    Idle,
    CenterPending,
    Editing,
    Confirmed,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReferenceCircle {
    pub center: Point,
    pub radius_px: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scale {
    pub radius_units: f64,
    pub units_per_pixel: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Stage {
    Idle,
    CenterPending,
    Editing(ReferenceCircle),
    Confirmed(ReferenceCircle, Scale),
}

/// Smallest reference radius accepted regardless of settings. The scale
/// divides by the radius.
pub const MIN_RADIUS_FLOOR: f64 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CalibrationParams {
    pub initial_radius: f64,
    pub min_radius: f64,
}

impl CalibrationParams {
    /// Replaces non-finite values with the defaults and keeps the minimum
    /// radius at or above [`MIN_RADIUS_FLOOR`].
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let finite_or = |value: f64, fallback: f64| if value.is_finite() { value } else { fallback };
        let min_radius = finite_or(self.min_radius, defaults.min_radius).max(MIN_RADIUS_FLOOR);
        Self {
            initial_radius: finite_or(self.initial_radius, defaults.initial_radius).max(min_radius),
            min_radius,
        }
    }
}

impl Default for CalibrationParams {
    fn default() -> Self {
        Self {
            initial_radius: 60.0,
            min_radius: 10.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CalibrationState {
    stage: Stage,
    drag: Option<CirclePart>,
    params: CalibrationParams,
}

impl CalibrationState {
    pub fn new(params: CalibrationParams) -> Self {
        Self {
            stage: Stage::Idle,
            drag: None,
            params: params.sanitized(),
        }
    }

    pub fn phase(&self) -> CalibrationPhase {
        match self.stage {
            Stage::Idle => CalibrationPhase::Idle,
            Stage::CenterPending => CalibrationPhase::CenterPending,
            Stage::Editing(_) => CalibrationPhase::Editing,
            Stage::Confirmed(..) => CalibrationPhase::Confirmed,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self.stage, Stage::Confirmed(..))
    }

    pub fn circle(&self) -> Option<ReferenceCircle> {
        match self.stage {
            Stage::Editing(circle) | Stage::Confirmed(circle, _) => Some(circle),
            Stage::Idle | Stage::CenterPending => None,
        }
    }

    pub fn scale(&self) -> Option<Scale> {
        match self.stage {
            Stage::Confirmed(_, scale) => Some(scale),
            _ => None,
        }
    }

    pub fn units_per_pixel(&self) -> Option<f64> {
        self.scale().map(|scale| scale.units_per_pixel)
    }

    pub fn set_params(&mut self, params: CalibrationParams) {
        self.params = params.sanitized();
    }

    pub fn active_drag(&self) -> Option<CirclePart> {
        self.drag
    }

    /// Starts (or restarts) calibration. Any previous scale is discarded.
    pub fn begin(&mut self, image_loaded: bool) -> Result<(), RoiError> {
        if !image_loaded {
            return Err(RoiError::NoImageLoaded);
        }
        debug!("calibration: {:?} -> CenterPending", self.phase());
        self.stage = Stage::CenterPending;
        self.drag = None;
        Ok(())
    }

    /// Drops all calibration data, e.g. when a new image replaces the old one.
    pub fn clear(&mut self) {
        self.stage = Stage::Idle;
        self.drag = None;
    }

    /// Places the circle center. Only meaningful in `CenterPending`.
    pub fn place_center(&mut self, p: Point) -> bool {
        if self.stage != Stage::CenterPending {
            return false;
        }
        self.stage = Stage::Editing(ReferenceCircle {
            center: p,
            radius_px: self.params.initial_radius,
        });
        debug!("calibration: center placed at ({:.1}, {:.1})", p.x, p.y);
        true
    }

    pub fn hit_test(&self, p: Point, tolerance: f64) -> Option<CirclePart> {
        match self.stage {
            Stage::Editing(circle) => circle_hit(circle.center, circle.radius_px, p, tolerance),
            _ => None,
        }
    }

    /// Begins a center or edge drag if `p` hits one and no drag is running.
    pub fn begin_drag(&mut self, p: Point, tolerance: f64) -> Option<CirclePart> {
        if self.drag.is_some() {
            return None;
        }
        let part = self.hit_test(p, tolerance)?;
        self.drag = Some(part);
        Some(part)
    }

    pub fn drag_to(&mut self, p: Point) -> bool {
        let (Some(part), Stage::Editing(circle)) = (self.drag, &mut self.stage) else {
            return false;
        };
        match part {
            CirclePart::Center => circle.center = p,
            CirclePart::Edge => {
                circle.radius_px = circle.center.distance(p).max(self.params.min_radius);
            }
        }
        true
    }

    pub fn end_drag(&mut self) -> bool {
        self.drag.take().is_some()
    }

    /// Confirms with the user-typed reference size.
    pub fn confirm_input(&mut self, input: &str) -> Result<Scale, RoiError> {
        let units = parse_units(input)?;
        self.confirm(units)
    }

    pub fn confirm(&mut self, radius_units: f64) -> Result<Scale, RoiError> {
        let Stage::Editing(circle) = self.stage else {
            return Err(RoiError::CalibrationNotEditing);
        };
        if !radius_units.is_finite() || radius_units <= 0.0 {
            return Err(RoiError::InvalidCalibrationInput(radius_units.to_string()));
        }
        let units_per_pixel = radius_units / circle.radius_px;
        if circle.radius_px < MIN_RADIUS_FLOOR || !units_per_pixel.is_finite() {
            return Err(RoiError::DegenerateShape(format!(
                "the reference circle radius ({:.2} px) is too small to calibrate",
                circle.radius_px
            )));
        }
        let scale = Scale {
            radius_units,
            units_per_pixel,
        };
        info!(
            "reference radius confirmed: {:.2} px = {} units ({:.6} units/px, {:.6} px/unit)",
            circle.radius_px,
            radius_units,
            scale.units_per_pixel,
            circle.radius_px / radius_units
        );
        self.stage = Stage::Confirmed(circle, scale);
        self.drag = None;
        Ok(scale)
    }
}

impl Default for CalibrationState {
    fn default() -> Self {
        Self::new(CalibrationParams::default())
    }
}

/// Parses a reference size typed by the user. Accepts a decimal comma.
pub fn parse_units(input: &str) -> Result<f64, RoiError> {
    let trimmed = input.trim();
    let value = trimmed
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| RoiError::InvalidCalibrationInput(trimmed.to_string()))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(RoiError::InvalidCalibrationInput(trimmed.to_string()));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::{parse_units, CalibrationParams, CalibrationPhase, CalibrationState};
    use crate::error::RoiError;
    use crate::geometry::{CirclePart, Point};

    fn editing_at(center: Point) -> CalibrationState {
        let mut state = CalibrationState::default();
        state.begin(true).expect("image loaded");
        assert!(state.place_center(center));
        state
    }

    #[test]
    fn begin_requires_image() {
        let mut state = CalibrationState::default();
        assert_eq!(state.begin(false), Err(RoiError::NoImageLoaded));
        assert_eq!(state.phase(), CalibrationPhase::Idle);
    }

    #[test]
    fn center_then_edge_drag_sets_radius() {
        let mut state = editing_at(Point::new(400.0, 300.0));
        assert_eq!(state.phase(), CalibrationPhase::Editing);
        assert_eq!(state.circle().map(|c| c.radius_px), Some(60.0));

        assert_eq!(
            state.begin_drag(Point::new(460.0, 300.0), 20.0),
            Some(CirclePart::Edge)
        );
        assert!(state.drag_to(Point::new(500.0, 300.0)));
        assert!(state.end_drag());
        assert_eq!(state.circle().map(|c| c.radius_px), Some(100.0));
        assert_eq!(state.phase(), CalibrationPhase::Editing);
    }

    #[test]
    fn center_drag_moves_circle() {
        let mut state = editing_at(Point::new(100.0, 100.0));
        assert_eq!(
            state.begin_drag(Point::new(105.0, 100.0), 20.0),
            Some(CirclePart::Center)
        );
        state.drag_to(Point::new(150.0, 120.0));
        state.end_drag();
        assert_eq!(state.circle().map(|c| c.center), Some(Point::new(150.0, 120.0)));
    }

    #[test]
    fn radius_is_clamped_to_minimum() {
        let mut state = editing_at(Point::new(100.0, 100.0));
        state.begin_drag(Point::new(160.0, 100.0), 20.0);
        state.drag_to(Point::new(101.0, 100.0));
        assert_eq!(state.circle().map(|c| c.radius_px), Some(10.0));
    }

    #[test]
    fn only_one_drag_at_a_time() {
        let mut state = editing_at(Point::new(100.0, 100.0));
        assert!(state.begin_drag(Point::new(160.0, 100.0), 20.0).is_some());
        assert!(state.begin_drag(Point::new(100.0, 100.0), 20.0).is_none());
        assert_eq!(state.active_drag(), Some(CirclePart::Edge));
    }

    #[test]
    fn confirm_computes_units_per_pixel() {
        let mut state = editing_at(Point::new(400.0, 300.0));
        state.begin_drag(Point::new(460.0, 300.0), 20.0);
        state.drag_to(Point::new(500.0, 300.0));
        state.end_drag();

        let scale = state.confirm_input("50").expect("valid input");
        assert_eq!(scale.units_per_pixel, 0.5);
        assert_eq!(state.phase(), CalibrationPhase::Confirmed);
        assert_eq!(state.units_per_pixel(), Some(0.5));
        // confirmed circles are frozen
        assert!(state.begin_drag(Point::new(500.0, 300.0), 20.0).is_none());
    }

    #[test]
    fn invalid_input_keeps_editing() {
        let mut state = editing_at(Point::new(400.0, 300.0));
        for input in ["", "abc", "0", "-5", "NaN", "inf"] {
            assert!(matches!(
                state.confirm_input(input),
                Err(RoiError::InvalidCalibrationInput(_))
            ));
            assert_eq!(state.phase(), CalibrationPhase::Editing);
            assert_eq!(state.units_per_pixel(), None);
        }
    }

    #[test]
    fn confirm_outside_editing_is_rejected() {
        let mut state = CalibrationState::default();
        assert_eq!(state.confirm(10.0), Err(RoiError::CalibrationNotEditing));
        state.begin(true).expect("image loaded");
        assert_eq!(state.confirm(10.0), Err(RoiError::CalibrationNotEditing));
    }

    #[test]
    fn restart_discards_scale() {
        let mut state = editing_at(Point::new(10.0, 10.0));
        state.confirm(5.0).expect("confirm");
        state.begin(true).expect("restart");
        assert_eq!(state.phase(), CalibrationPhase::CenterPending);
        assert_eq!(state.units_per_pixel(), None);
        assert!(state.circle().is_none());
    }

    #[test]
    fn zero_min_radius_still_yields_finite_scale() {
        let mut state = CalibrationState::new(CalibrationParams {
            initial_radius: 60.0,
            min_radius: 0.0,
        });
        state.begin(true).expect("image loaded");
        state.place_center(Point::new(100.0, 100.0));
        state.begin_drag(Point::new(160.0, 100.0), 20.0);
        state.drag_to(Point::new(100.0, 100.0));
        state.end_drag();
        assert_eq!(state.circle().map(|c| c.radius_px), Some(1.0));

        let scale = state.confirm_input("50").expect("valid input");
        assert!(scale.units_per_pixel.is_finite());
        assert_eq!(scale.units_per_pixel, 50.0);
    }

    #[test]
    fn params_replace_non_finite_values() {
        let params = CalibrationParams {
            initial_radius: f64::NAN,
            min_radius: -4.0,
        }
        .sanitized();
        assert_eq!(params.min_radius, 1.0);
        assert_eq!(params.initial_radius, 60.0);

        let tiny_initial = CalibrationParams {
            initial_radius: 2.0,
            min_radius: 10.0,
        }
        .sanitized();
        assert_eq!(tiny_initial.initial_radius, 10.0);
    }

    #[test]
    fn parses_decimal_comma() {
        assert_eq!(parse_units(" 67,5 "), Ok(67.5));
    }
}
