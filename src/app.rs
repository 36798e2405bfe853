use std::path::Path;

use anyhow::{Context as _, Result};
use eframe::egui::{self, Context as EguiContext, Key, TopBottomPanel};
use eframe::{App, Frame};
use log::{debug, info, warn};

use crate::action_bar;
use crate::calibration::CalibrationPhase;
use crate::canvas::{self, CanvasInput};
use crate::dialogs::{self, PromptDialog};
use crate::editor::Tool;
use crate::error::RoiError;
use crate::picture::{Picture, View};
use crate::session::Session;
use crate::settings::Settings;
use crate::shape_list;
use crate::theme;
use crate::toolbar;
use crate::ui_controls;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

pub struct RoiMapperApp {
    session: Session,
    picture: Option<Picture>,
    view: View,
    input: CanvasInput,
    prompt: PromptDialog,
    saved_settings: Settings,
    copy_feedback_until: Option<f64>,
    theme: theme::AppTheme,
}

impl RoiMapperApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let theme = theme::dark_theme();
        theme::apply_theme(&cc.egui_ctx, &theme);

        let settings = Settings::load().unwrap_or_else(|err| {
            debug!("using default settings: {err:#}");
            Settings::default()
        });

        Self {
            session: Session::new(settings.clone()),
            picture: None,
            view: View::default(),
            input: CanvasInput::default(),
            prompt: PromptDialog::new(cc.egui_ctx.clone(), theme.clone()),
            saved_settings: settings,
            copy_feedback_until: None,
            theme,
        }
    }

    fn report(&mut self, result: Result<(), RoiError>) {
        if let Err(err) = result {
            self.session.notify(&err);
        }
    }

    fn report_io(&mut self, title: &str, result: Result<()>) {
        if let Err(err) = result {
            warn!("{title}: {err:#}");
            self.session.notify_message(title, format!("{err:#}"));
        }
    }

    fn open_image_dialog(&mut self) {
        let file = rfd::FileDialog::new()
            .set_title("Open map image")
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_file();
        if let Some(path) = file {
            let result = self.open_image(&path);
            self.report_io("Cannot open image", result);
        }
    }

    fn open_image(&mut self, path: &Path) -> Result<()> {
        let picture = Picture::open(path)?;
        self.session.load_image(picture.width(), picture.height());
        self.picture = Some(picture);
        self.view.request_fit();
        self.input = CanvasInput::default();
        Ok(())
    }

    fn export_json(&mut self) -> Option<String> {
        match self.session.export_json() {
            Ok(json) => Some(json),
            Err(err) => {
                self.session.notify(&err);
                None
            }
        }
    }

    fn copy_json(&mut self, ctx: &EguiContext) {
        let Some(json) = self.export_json() else {
            return;
        };
        let result = arboard::Clipboard::new()
            .and_then(|mut clipboard| clipboard.set_text(json))
            .context("clipboard unavailable");
        match result {
            Ok(()) => {
                info!("copied {} ROIs as JSON", self.session.shapes.len());
                self.copy_feedback_until = Some(ctx.input(|input| input.time) + 1.5);
            }
            Err(err) => self.report_io("Copy failed", Err(err)),
        }
    }

    fn save_json(&mut self) {
        let Some(json) = self.export_json() else {
            return;
        };
        let file = rfd::FileDialog::new()
            .set_title("Save ROI export")
            .set_file_name(&self.session.settings.export_file_name)
            .add_filter("JSON", &["json"])
            .save_file();
        let Some(path) = file else {
            return;
        };
        let result = std::fs::write(&path, json)
            .with_context(|| format!("cannot write {}", path.display()));
        if result.is_ok() {
            info!(
                "exported {} ROIs to {}",
                self.session.shapes.len(),
                path.display()
            );
        }
        self.report_io("Save failed", result);
    }

    fn set_tool(&mut self, tool: Tool) {
        let result = self.session.set_tool(tool);
        self.report(result);
    }

    fn handle_shortcuts(&mut self, ctx: &EguiContext) {
        let cmd = ctx.input(|input| input.modifiers.command || input.modifiers.ctrl);
        let shift = ctx.input(|input| input.modifiers.shift);
        let pressed = |key: Key| ctx.input(|input| input.key_pressed(key));

        if pressed(Key::Escape) {
            if !self.session.cancel_polygon() {
                if self.session.editor.tool() != Tool::Select {
                    self.set_tool(Tool::Select);
                } else {
                    self.session.select(None);
                }
            }
        }

        if pressed(Key::Enter) {
            let result = if !self.session.editor.polygon_draft().is_empty() {
                self.session.finish_polygon()
            } else if self.session.phase() == CalibrationPhase::Editing {
                self.session.request_reference_confirm()
            } else {
                Ok(())
            };
            self.report(result);
        }

        if cmd {
            if pressed(Key::O) {
                self.open_image_dialog();
            }
            if pressed(Key::S) {
                self.save_json();
            }
            if shift && pressed(Key::C) {
                self.copy_json(ctx);
            }
            return;
        }

        if pressed(Key::Delete) || pressed(Key::Backspace) {
            self.session.delete_active();
        }
        if self.session.calibration.is_confirmed() {
            for (key, tool) in [
                (Key::V, Tool::Select),
                (Key::R, Tool::Rectangle),
                (Key::C, Tool::Circle),
                (Key::P, Tool::Polygon),
            ] {
                if pressed(key) {
                    self.set_tool(tool);
                }
            }
        }
        if pressed(Key::Plus) || pressed(Key::Equals) {
            self.view.zoom_in();
        }
        if pressed(Key::Minus) {
            self.view.zoom_out();
        }
        if pressed(Key::Num0) {
            self.view.request_fit();
        }
    }

    fn persist_settings(&mut self) {
        if self.session.settings == self.saved_settings {
            return;
        }
        match self.session.settings.save() {
            Ok(()) => debug!("settings saved"),
            Err(err) => warn!("cannot persist settings: {err:#}"),
        }
        self.saved_settings = self.session.settings.clone();
    }
}

impl App for RoiMapperApp {
    fn update(&mut self, ctx: &EguiContext, _frame: &mut Frame) {
        theme::apply_theme(ctx, &self.theme);

        let was_modal = self.session.is_modal();
        if let Some(notice) = self.session.notice.clone() {
            if dialogs::show_notice(ctx, &self.theme, &notice) {
                self.session.dismiss_notice();
            }
        } else {
            let result = self.session.drive_prompt(&mut self.prompt).map(|_| ());
            self.report(result);
        }
        if !was_modal {
            self.handle_shortcuts(ctx);
        }

        let toolbar_output = TopBottomPanel::top("toolbar")
            .exact_height(self.theme.layout.toolbar_height)
            .frame(ui_controls::toolbar_frame(&self.theme))
            .show(ctx, |ui| {
                let width_class = self.theme.width_class(ui.available_width());
                toolbar::show_toolbar(ui, &self.session, &self.theme, width_class)
            })
            .inner;

        if toolbar_output.open {
            self.open_image_dialog();
        }
        if toolbar_output.calibrate {
            let result = self.session.start_calibration();
            self.report(result);
        }
        if toolbar_output.confirm {
            let result = self.session.request_reference_confirm();
            self.report(result);
        }
        if let Some(tool) = toolbar_output.tool {
            self.set_tool(tool);
        }
        if toolbar_output.quick_rectangle {
            let result = self.session.quick_add_rectangle();
            self.report(result);
        }

        let copied_feedback = self
            .copy_feedback_until
            .is_some_and(|deadline| ctx.input(|input| input.time) <= deadline);

        let action_output = TopBottomPanel::bottom("action_bar")
            .exact_height(self.theme.layout.action_bar_height)
            .frame(ui_controls::action_bar_frame(&self.theme))
            .show(ctx, |ui| {
                let width_class = self.theme.width_class(ui.available_width());
                action_bar::show_action_bar(
                    ui,
                    &self.session,
                    self.view.zoom,
                    copied_feedback,
                    &self.theme,
                    width_class,
                )
            })
            .inner;

        if action_output.zoom_in {
            self.view.zoom_in();
        }
        if action_output.zoom_out {
            self.view.zoom_out();
        }
        if action_output.fit {
            self.view.request_fit();
        }
        if action_output.copy {
            self.copy_json(ctx);
        }
        if action_output.save {
            self.save_json();
        }

        if self.session.image.is_some() {
            let list_output = egui::SidePanel::right("roi_list")
                .exact_width(self.theme.layout.side_panel_width)
                .resizable(false)
                .frame(ui_controls::side_panel_frame(&self.theme))
                .show(ctx, |ui| shape_list::show_shape_list(ui, &self.session, &self.theme))
                .inner;
            if let Some(id) = list_output.select {
                self.session.select(Some(id));
            }
            if list_output.delete {
                self.session.delete_active();
            }
        }

        let canvas_error = egui::CentralPanel::default()
            .frame(
                egui::Frame::none()
                    .fill(self.theme.surfaces.app_bg)
                    .inner_margin(egui::Margin::symmetric(
                        self.theme.layout.panel_padding_x,
                        self.theme.layout.panel_padding_y + 2.0,
                    )),
            )
            .show(ctx, |ui| {
                canvas::show_canvas(
                    ui,
                    ctx,
                    &mut self.session,
                    self.picture.as_mut(),
                    &mut self.view,
                    &mut self.input,
                    &self.theme,
                )
            })
            .inner;
        if let Some(err) = canvas_error {
            self.session.notify(&err);
        }

        self.persist_settings();

        if copied_feedback {
            ctx.request_repaint_after(std::time::Duration::from_millis(250));
        }
    }
}
