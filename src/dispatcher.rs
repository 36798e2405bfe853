//! Routes host pointer events to the calibration state machine or the shape
//! editor, depending on where the session is.

use log::debug;

use crate::calibration::CalibrationPhase;
use crate::editor::{DownOutcome, HitRadii, Tool};
use crate::error::RoiError;
use crate::geometry::Point;
use crate::host::RenderSink;
use crate::mapping::{primary_contact, HostEvent, ScreenTransform};
use crate::session::Session;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
    /// The pointer left the canvas. Ends a drag exactly like `Up`.
    Leave,
    DoubleClick,
}

impl PointerPhase {
    pub fn ends_drag(self) -> bool {
        matches!(self, Self::Up | Self::Cancel | Self::Leave)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub input: HostEvent,
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, input: HostEvent) -> Self {
        Self { phase, input }
    }

    pub fn mouse(phase: PointerPhase, x: f64, y: f64) -> Self {
        Self::new(phase, HostEvent::mouse(x, y))
    }
}

/// Holds the pointer capture: while a drag runs only the capturing pointer
/// may move or end it.
#[derive(Debug, Default)]
pub struct InteractionDispatcher {
    capture: Option<u64>,
}

impl InteractionDispatcher {
    pub fn captured(&self) -> Option<u64> {
        self.capture
    }

    /// Handles one event. Returns whether the session changed; the sink is
    /// asked to render after every change, including one that ends in an
    /// error.
    pub fn dispatch(
        &mut self,
        session: &mut Session,
        event: &PointerEvent,
        transform: &ScreenTransform,
        sink: &mut dyn RenderSink,
    ) -> Result<bool, RoiError> {
        // capture only lives as long as a drag; a modal may have ended it
        if self.capture.is_some()
            && session.calibration.active_drag().is_none()
            && !session.editor.is_dragging()
        {
            debug!("releasing stale capture of pointer {:?}", self.capture);
            self.capture = None;
        }
        if session.is_modal() {
            if event.phase.ends_drag() && self.capture.take().is_some() {
                session.end_drags();
            }
            return Ok(false);
        }
        let revision = session.revision();
        let result = self.route(session, event, transform);
        if matches!(result, Ok(true)) || session.revision() != revision {
            session.mark_changed();
            sink.render(session);
        }
        result.map(|changed| changed || session.revision() != revision)
    }

    fn route(
        &mut self,
        session: &mut Session,
        event: &PointerEvent,
        transform: &ScreenTransform,
    ) -> Result<bool, RoiError> {
        let sample = primary_contact(&event.input);
        let point = sample.map(|s| transform.to_image(s.client));
        match event.phase {
            PointerPhase::Down => {
                let (Some(sample), Some(point)) = (sample, point) else {
                    return Ok(false);
                };
                if self.capture.is_some() {
                    return Ok(false);
                }
                let (changed, captured) = Self::pointer_down(session, point, transform)?;
                if captured {
                    self.capture = Some(sample.pointer_id);
                }
                Ok(changed)
            }
            PointerPhase::Move => {
                let (Some(sample), Some(point)) = (sample, point) else {
                    return Ok(false);
                };
                if self.capture != Some(sample.pointer_id) {
                    return Ok(false);
                }
                Ok(Self::pointer_move(session, point))
            }
            PointerPhase::Up | PointerPhase::Cancel | PointerPhase::Leave => {
                if let (Some(captured), Some(sample)) = (self.capture, sample) {
                    if sample.pointer_id != captured && event.phase == PointerPhase::Up {
                        return Ok(false);
                    }
                }
                let Some(pointer) = self.capture.take() else {
                    return Ok(false);
                };
                debug!("pointer {pointer} released ({:?})", event.phase);
                Self::pointer_up(session, point)
            }
            PointerPhase::DoubleClick => {
                if self.capture.is_some()
                    || !session.calibration.is_confirmed()
                    || session.editor.tool() != Tool::Polygon
                    || session.editor.polygon_draft().is_empty()
                {
                    return Ok(false);
                }
                session.finish_polygon().map(|()| true)
            }
        }
    }

    /// Returns `(changed, captured)`.
    fn pointer_down(
        session: &mut Session,
        p: Point,
        transform: &ScreenTransform,
    ) -> Result<(bool, bool), RoiError> {
        match session.phase() {
            CalibrationPhase::Idle => Ok((false, false)),
            CalibrationPhase::CenterPending => Ok((session.calibration.place_center(p), false)),
            CalibrationPhase::Editing => {
                let tolerance = transform.screen_len_to_image(session.settings.hit_tolerance);
                let part = session.calibration.begin_drag(p, tolerance);
                if let Some(part) = part {
                    debug!("calibration drag on {part:?}");
                }
                Ok((part.is_some(), part.is_some()))
            }
            CalibrationPhase::Confirmed => {
                let radii = HitRadii {
                    handle: transform.screen_len_to_image(session.settings.handle_hit_radius),
                    body: transform.screen_len_to_image(session.settings.body_tolerance),
                };
                match session.editor.pointer_down(&mut session.shapes, p, radii) {
                    DownOutcome::Ignored => Ok((false, false)),
                    DownOutcome::Changed => Ok((true, session.editor.is_dragging())),
                    DownOutcome::ClosePolygon => session.finish_polygon().map(|()| (true, false)),
                }
            }
        }
    }

    fn pointer_move(session: &mut Session, p: Point) -> bool {
        if session.calibration.active_drag().is_some() {
            return session.calibration.drag_to(p);
        }
        let min_radius = session.settings.min_radius;
        session.editor.pointer_move(&mut session.shapes, p, min_radius)
    }

    fn pointer_up(session: &mut Session, last: Option<Point>) -> Result<bool, RoiError> {
        if session.calibration.end_drag() {
            if let Some(circle) = session.calibration.circle() {
                debug!("reference radius now {:.1} px", circle.radius_px);
            }
            return Ok(true);
        }
        let was_dragging = session.editor.is_dragging();
        match session.editor.end_drag(last) {
            Some(draft) => session.commit_draft(draft).map(|()| true),
            None => Ok(was_dragging),
        }
    }
}
