use egui::{vec2, Align, Layout, RichText, Ui};

use crate::session::Session;
use crate::theme::{AppTheme, WidthClass};
use crate::ui_controls;

#[derive(Debug, Default)]
pub struct ActionBarOutput {
    pub zoom_out: bool,
    pub zoom_in: bool,
    pub fit: bool,
    pub copy: bool,
    pub save: bool,
}

pub fn should_show_shortcut_label(width_class: WidthClass, available_width: f32) -> bool {
    match width_class {
        WidthClass::Compact => available_width >= 420.0,
        WidthClass::Regular | WidthClass::Wide => true,
    }
}

pub fn should_show_status(width_class: WidthClass) -> bool {
    width_class != WidthClass::Compact
}

pub fn show_action_bar(
    ui: &mut Ui,
    session: &Session,
    zoom: f32,
    copied_feedback: bool,
    theme: &AppTheme,
    width_class: WidthClass,
) -> ActionBarOutput {
    let action_h = theme.controls.action_height;
    let button_gap = theme.layout.space_3 + 2.0;
    let zoom_w = 32.0;
    let export_w = if width_class == WidthClass::Compact {
        96.0
    } else {
        112.0
    };
    let exportable = session.calibration.is_confirmed();
    let shortcut_visible = should_show_shortcut_label(
        width_class,
        ui.available_width() - zoom_w * 3.0 - export_w * 2.0 - button_gap * 4.0,
    );

    let mut out = ActionBarOutput::default();

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing = vec2(theme.layout.space_2, 0.0);

        ui.add_enabled_ui(session.image.is_some(), |ui| {
            out.zoom_out = ui_controls::ghost_button(ui, theme, "−", vec2(zoom_w, action_h))
                .on_hover_text("Zoom out (-)")
                .clicked();
            if ui_controls::ghost_button(ui, theme, &format!("{:.0}%", zoom * 100.0), vec2(56.0, action_h))
                .on_hover_text("Fit to window (0)")
                .clicked()
            {
                out.fit = true;
            }
            out.zoom_in = ui_controls::ghost_button(ui, theme, "+", vec2(zoom_w, action_h))
                .on_hover_text("Zoom in (+)")
                .clicked();
        });

        if should_show_status(width_class) {
            ui.add_space(theme.layout.space_3);
            ui.label(
                RichText::new(session.status_line())
                    .color(theme.text.secondary)
                    .size(13.0),
            );
        }

        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            ui.add_space(theme.layout.space_2);

            if shortcut_visible {
                ui_controls::keycap(ui, theme, "S");
                ui.add_space(theme.layout.space_2);
                ui_controls::keycap(ui, theme, "Ctrl");
                ui.add_space(theme.layout.space_3);
                ui_controls::vertical_divider(ui, theme, 16.0);
                ui.add_space(theme.layout.space_3);
            }

            let save_button = ui.add_enabled_ui(exportable, |ui| {
                ui_controls::primary_button(ui, theme, "Save JSON…", vec2(export_w, action_h))
            });
            let mut save_response = save_button.inner;
            if !shortcut_visible {
                save_response = save_response.on_hover_text("Ctrl+S");
            }
            if save_response.clicked() {
                out.save = true;
            }

            ui.add_space(button_gap);

            if copied_feedback && width_class != WidthClass::Compact {
                ui_controls::badge(ui, "clipboard updated", theme.text.accent);
                ui.add_space(button_gap);
            }

            let copy_text = if copied_feedback { "Copied" } else { "Copy JSON" };
            let copy_button = ui.add_enabled_ui(exportable, |ui| {
                ui_controls::ghost_button(ui, theme, copy_text, vec2(export_w, action_h))
            });
            if copy_button.inner.on_hover_text("Ctrl+Shift+C").clicked() {
                out.copy = true;
            }
        });
    });

    out
}
