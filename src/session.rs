//! The single owner of all annotation state for one image.

use log::{debug, info, warn};

use crate::calibration::{CalibrationPhase, CalibrationState};
use crate::collection::ShapeCollection;
use crate::editor::{ShapeEditor, Tool};
use crate::error::RoiError;
use crate::export::{self, ExportedShape};
use crate::geometry::Point;
use crate::host::{PromptPoll, PromptProvider};
use crate::settings::Settings;
use crate::shape::{Geometry, Shape, ShapeId, ShapeKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
}

impl ImageInfo {
    pub fn center(&self) -> Point {
        Point::new(self.width as f64 * 0.5, self.height as f64 * 0.5)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum PromptKind {
    ReferenceUnits,
    /// A validated shape waiting for its name.
    ShapeName(Geometry),
}

#[derive(Clone, Debug, PartialEq)]
pub struct PromptRequest {
    pub kind: PromptKind,
    pub title: String,
    pub message: String,
    pub initial: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

impl From<&RoiError> for Notice {
    fn from(err: &RoiError) -> Self {
        Self {
            title: err.title().to_string(),
            message: err.to_string(),
        }
    }
}

pub struct Session {
    pub settings: Settings,
    pub image: Option<ImageInfo>,
    pub calibration: CalibrationState,
    pub shapes: ShapeCollection,
    pub editor: ShapeEditor,
    pub prompt: Option<PromptRequest>,
    pub notice: Option<Notice>,
    revision: u64,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        Self {
            calibration: CalibrationState::new(settings.calibration_params()),
            settings,
            image: None,
            shapes: ShapeCollection::default(),
            editor: ShapeEditor::default(),
            prompt: None,
            notice: None,
            revision: 0,
        }
    }

    /// Bumped on every state mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn mark_changed(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    pub fn phase(&self) -> CalibrationPhase {
        self.calibration.phase()
    }

    pub fn is_modal(&self) -> bool {
        self.prompt.is_some() || self.notice.is_some()
    }

    /// Ends whatever drag is running. Called before a modal opens, because
    /// the canvas stops receiving the release while one is shown.
    pub fn end_drags(&mut self) -> bool {
        let calibration = self.calibration.end_drag();
        let editor = self.editor.abandon_drag();
        if calibration || editor {
            debug!("drag ended by modal");
            self.mark_changed();
        }
        calibration || editor
    }

    fn open_prompt(&mut self, request: PromptRequest) {
        self.end_drags();
        self.prompt = Some(request);
        self.mark_changed();
    }

    /// Replaces the image; everything derived from the previous one goes.
    pub fn load_image(&mut self, width: u32, height: u32) {
        info!("image loaded: {width}x{height}");
        self.image = Some(ImageInfo { width, height });
        self.calibration.set_params(self.settings.calibration_params());
        self.calibration.clear();
        self.shapes.clear();
        self.editor.set_tool(Tool::Select);
        self.prompt = None;
        self.mark_changed();
    }

    pub fn start_calibration(&mut self) -> Result<(), RoiError> {
        self.calibration.set_params(self.settings.calibration_params());
        self.calibration.begin(self.image.is_some())?;
        self.editor.set_tool(Tool::Select);
        if self.settings.clear_shapes_on_recalibrate && !self.shapes.is_empty() {
            debug!("recalibration drops {} shapes", self.shapes.len());
            self.shapes.clear();
        }
        self.mark_changed();
        Ok(())
    }

    /// Asks the user for the real-world radius of the reference circle.
    pub fn request_reference_confirm(&mut self) -> Result<(), RoiError> {
        if self.phase() != CalibrationPhase::Editing {
            return Err(RoiError::CalibrationNotEditing);
        }
        self.open_prompt(PromptRequest {
            kind: PromptKind::ReferenceUnits,
            title: format!("{} in game units", self.settings.reference_name),
            message: "Real radius of the reference circle in game units:".to_string(),
            initial: self.settings.reference_units.to_string(),
        });
        Ok(())
    }

    /// Polls the host for an answer to the pending prompt, if any.
    /// Returns whether the prompt was resolved.
    pub fn drive_prompt(&mut self, provider: &mut dyn PromptProvider) -> Result<bool, RoiError> {
        let Some(request) = self.prompt.as_ref() else {
            return Ok(false);
        };
        match provider.poll(request) {
            PromptPoll::Pending => Ok(false),
            PromptPoll::Answered(answer) => self.resolve_prompt(answer).map(|()| true),
        }
    }

    pub fn resolve_prompt(&mut self, answer: Option<String>) -> Result<(), RoiError> {
        let Some(request) = self.prompt.take() else {
            return Ok(());
        };
        self.mark_changed();
        let Some(answer) = answer else {
            debug!("prompt '{}' cancelled", request.title);
            return Ok(());
        };
        match request.kind {
            PromptKind::ReferenceUnits => {
                let scale = self.calibration.confirm_input(&answer)?;
                self.settings.reference_units = scale.radius_units;
                Ok(())
            }
            PromptKind::ShapeName(geometry) => {
                let name = answer.trim();
                if name.is_empty() {
                    debug!("empty name, {} discarded", geometry.kind().label());
                    return Ok(());
                }
                self.add_shape(name, geometry).map(|_| ())
            }
        }
    }

    fn require_calibration(&self) -> Result<(), RoiError> {
        if self.calibration.is_confirmed() {
            Ok(())
        } else {
            Err(RoiError::NotCalibrated)
        }
    }

    fn add_shape(&mut self, name: &str, geometry: Geometry) -> Result<ShapeId, RoiError> {
        self.require_calibration()?;
        let kind = geometry.kind();
        let id = self.shapes.add(name, geometry);
        self.shapes.set_active(Some(id));
        debug!("{} '{}' created with id {}", kind.label(), name, id);
        self.mark_changed();
        Ok(id)
    }

    pub fn set_tool(&mut self, tool: Tool) -> Result<(), RoiError> {
        if tool.creates_shapes() {
            self.require_calibration()?;
        }
        self.editor.set_tool(tool);
        self.mark_changed();
        Ok(())
    }

    /// Default-size square centered on the image, named through a prompt.
    pub fn quick_add_rectangle(&mut self) -> Result<(), RoiError> {
        self.require_calibration()?;
        let center = self
            .image
            .map(|image| image.center())
            .ok_or(RoiError::NoImageLoaded)?;
        let geometry = Geometry::rectangle_centered(center, self.settings.default_rect_size);
        self.request_shape_name(geometry);
        Ok(())
    }

    /// Validates a drafted shape and asks for its name.
    pub fn commit_draft(&mut self, geometry: Geometry) -> Result<(), RoiError> {
        self.require_calibration()?;
        let min_size = match geometry.kind() {
            ShapeKind::Circle => self.settings.min_radius,
            ShapeKind::Rectangle | ShapeKind::Polygon => self.settings.min_draw_size,
        };
        if let Some(reason) = geometry.degenerate_reason(min_size) {
            return Err(RoiError::DegenerateShape(reason));
        }
        self.request_shape_name(geometry);
        Ok(())
    }

    fn request_shape_name(&mut self, geometry: Geometry) {
        let kind = geometry.kind();
        self.open_prompt(PromptRequest {
            title: format!("Name this {}", kind.label()),
            message: "ROI name:".to_string(),
            initial: format!("{} {}", kind.label(), self.shapes.len() + 1),
            kind: PromptKind::ShapeName(geometry),
        });
    }

    /// Finishes the polygon draft; fewer than three vertices discard it.
    pub fn finish_polygon(&mut self) -> Result<(), RoiError> {
        self.require_calibration()?;
        let vertices = self.editor.take_polygon();
        self.mark_changed();
        self.commit_draft(Geometry::Polygon { vertices })
    }

    pub fn cancel_polygon(&mut self) -> bool {
        let cancelled = self.editor.cancel_polygon();
        if cancelled {
            self.mark_changed();
        }
        cancelled
    }

    pub fn select(&mut self, id: Option<ShapeId>) -> bool {
        let changed = self.shapes.set_active(id);
        if changed {
            self.mark_changed();
        }
        changed
    }

    pub fn delete_active(&mut self) -> Option<Shape> {
        let id = self.shapes.active_id()?;
        let removed = self.shapes.remove(id);
        if let Some(shape) = &removed {
            debug!("shape '{}' deleted", shape.name);
            self.mark_changed();
        }
        removed
    }

    pub fn export(&self) -> Result<Vec<ExportedShape>, RoiError> {
        let reference = self
            .settings
            .export_reference_circle
            .then_some(self.settings.reference_name.as_str());
        export::export(&self.shapes, &self.calibration, reference)
    }

    pub fn export_json(&self) -> Result<String, RoiError> {
        export::to_json(&self.export()?)
    }

    /// Surfaces a rejected operation to the user.
    pub fn notify(&mut self, err: &RoiError) {
        warn!("{}: {err}", err.title());
        self.end_drags();
        self.notice = Some(Notice::from(err));
        self.mark_changed();
    }

    pub fn notify_message(&mut self, title: &str, message: impl Into<String>) {
        self.end_drags();
        self.notice = Some(Notice {
            title: title.to_string(),
            message: message.into(),
        });
        self.mark_changed();
    }

    pub fn dismiss_notice(&mut self) {
        if self.notice.take().is_some() {
            self.mark_changed();
        }
    }

    /// One-line instruction for the current step.
    pub fn status_line(&self) -> String {
        if self.image.is_none() {
            return "Open an image to begin".to_string();
        }
        match self.phase() {
            CalibrationPhase::Idle => format!("Set the {} to unlock ROI tools", self.settings.reference_name),
            CalibrationPhase::CenterPending => {
                format!("Tap the center of the {}", self.settings.reference_name)
            }
            CalibrationPhase::Editing => {
                let radius = self.calibration.circle().map_or(0.0, |c| c.radius_px);
                format!("Drag the center or edge to fit ({radius:.0} px), then confirm")
            }
            CalibrationPhase::Confirmed => {
                let upp = self.calibration.units_per_pixel().unwrap_or_default();
                let draft = self.editor.polygon_draft().len();
                if draft > 0 {
                    format!("Polygon: {draft} vertices (double-click or Enter to finish, Esc to cancel)")
                } else {
                    format!("{} ROIs, {upp:.4} units/px", self.shapes.len())
                }
            }
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::{PromptKind, Session};
    use crate::calibration::CalibrationPhase;
    use crate::editor::Tool;
    use crate::error::RoiError;
    use crate::geometry::Point;
    use crate::host::{PromptPoll, PromptProvider};
    use crate::session::PromptRequest;
    use crate::shape::Geometry;

    struct Scripted(Vec<PromptPoll>);

    impl PromptProvider for Scripted {
        fn poll(&mut self, _request: &PromptRequest) -> PromptPoll {
            if self.0.is_empty() {
                PromptPoll::Pending
            } else {
                self.0.remove(0)
            }
        }
    }

    fn calibrated() -> Session {
        let mut session = Session::default();
        session.settings.export_reference_circle = false;
        session.load_image(800, 600);
        session.start_calibration().expect("image loaded");
        session.calibration.place_center(Point::new(400.0, 300.0));
        session.request_reference_confirm().expect("editing");
        session.calibration.confirm(30.0).expect("confirm");
        session.prompt = None;
        session
    }

    #[test]
    fn calibration_needs_image() {
        let mut session = Session::default();
        assert_eq!(session.start_calibration(), Err(RoiError::NoImageLoaded));
        assert_eq!(session.phase(), CalibrationPhase::Idle);
    }

    #[test]
    fn creation_is_gated_until_confirmed() {
        let mut session = Session::default();
        session.load_image(800, 600);
        assert_eq!(session.set_tool(Tool::Rectangle), Err(RoiError::NotCalibrated));
        assert_eq!(session.quick_add_rectangle(), Err(RoiError::NotCalibrated));
        assert_eq!(session.finish_polygon(), Err(RoiError::NotCalibrated));
        assert!(session.export().is_err());
        assert!(session.shapes.is_empty());
        assert!(session.prompt.is_none());
    }

    #[test]
    fn invalid_units_keep_editing_and_cancel_aborts() {
        let mut session = Session::default();
        session.load_image(800, 600);
        session.start_calibration().expect("image loaded");
        session.calibration.place_center(Point::new(10.0, 10.0));

        session.request_reference_confirm().expect("editing");
        assert!(matches!(
            session.resolve_prompt(Some("-3".into())),
            Err(RoiError::InvalidCalibrationInput(_))
        ));
        assert_eq!(session.phase(), CalibrationPhase::Editing);

        session.request_reference_confirm().expect("editing");
        assert_eq!(session.resolve_prompt(None), Ok(()));
        assert_eq!(session.phase(), CalibrationPhase::Editing);
        assert!(session.notice.is_none());
    }

    #[test]
    fn prompt_provider_drives_confirmation() {
        let mut session = Session::default();
        session.load_image(800, 600);
        session.start_calibration().expect("image loaded");
        session.calibration.place_center(Point::new(10.0, 10.0));
        session.request_reference_confirm().expect("editing");

        let mut provider = Scripted(vec![PromptPoll::Pending, PromptPoll::Answered(Some("120".into()))]);
        assert_eq!(session.drive_prompt(&mut provider), Ok(false));
        assert_eq!(session.drive_prompt(&mut provider), Ok(true));
        assert_eq!(session.calibration.units_per_pixel(), Some(2.0));
        assert_eq!(session.settings.reference_units, 120.0);
    }

    #[test]
    fn quick_rectangle_is_centered_and_named() {
        let mut session = calibrated();
        session.quick_add_rectangle().expect("calibrated");
        let Some(PromptKind::ShapeName(geometry)) = session.prompt.as_ref().map(|p| p.kind.clone()) else {
            panic!("name prompt expected");
        };
        assert_eq!(
            geometry,
            Geometry::Rectangle {
                origin: Point::new(350.0, 250.0),
                width: 100.0,
                height: 100.0
            }
        );
        session.resolve_prompt(Some("  lane  ".into())).expect("named");
        let active = session.shapes.active().expect("new shape is active");
        assert_eq!(active.name, "lane");
    }

    #[test]
    fn empty_or_cancelled_name_discards_shape() {
        let mut session = calibrated();
        session.quick_add_rectangle().expect("calibrated");
        session.resolve_prompt(Some("   ".into())).expect("discarded");
        session.quick_add_rectangle().expect("calibrated");
        session.resolve_prompt(None).expect("discarded");
        assert!(session.shapes.is_empty());
    }

    #[test]
    fn polygon_needs_three_vertices() {
        let mut session = calibrated();
        session.set_tool(Tool::Polygon).expect("calibrated");
        assert!(matches!(
            session.finish_polygon(),
            Err(RoiError::DegenerateShape(_))
        ));
        assert!(session.prompt.is_none());
    }

    #[test]
    fn recalibration_clears_shapes() {
        let mut session = calibrated();
        session.quick_add_rectangle().expect("calibrated");
        session.resolve_prompt(Some("a".into())).expect("named");
        assert_eq!(session.shapes.len(), 1);
        session.start_calibration().expect("restart");
        assert!(session.shapes.is_empty());
        assert_eq!(session.calibration.units_per_pixel(), None);
    }

    #[test]
    fn delete_removes_active_shape() {
        let mut session = calibrated();
        session.quick_add_rectangle().expect("calibrated");
        session.resolve_prompt(Some("a".into())).expect("named");
        assert!(session.delete_active().is_some());
        assert!(session.shapes.is_empty());
        assert!(session.delete_active().is_none());
    }
}
