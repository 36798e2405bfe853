use egui::{vec2, Align, Color32, Layout, Pos2, Rect, RichText, Shape, Stroke, Ui};

use crate::calibration::CalibrationPhase;
use crate::editor::Tool;
use crate::session::Session;
use crate::theme::{AppTheme, WidthClass};
use crate::ui_controls;

#[derive(Clone, Copy, Debug)]
pub struct ToolbarPlan {
    pub show_button_labels: bool,
    pub show_scale_inline: bool,
    pub show_overflow: bool,
}

#[derive(Debug, Default)]
pub struct ToolbarOutput {
    pub open: bool,
    pub calibrate: bool,
    pub confirm: bool,
    pub tool: Option<Tool>,
    pub quick_rectangle: bool,
}

pub fn plan_toolbar_items(width_class: WidthClass, session: &Session) -> ToolbarPlan {
    let calibrated = session.calibration.is_confirmed();
    ToolbarPlan {
        show_button_labels: width_class != WidthClass::Compact,
        show_scale_inline: calibrated && width_class == WidthClass::Wide,
        show_overflow: width_class == WidthClass::Compact,
    }
}

pub fn show_toolbar(
    ui: &mut Ui,
    session: &Session,
    theme: &AppTheme,
    width_class: WidthClass,
) -> ToolbarOutput {
    let plan = plan_toolbar_items(width_class, session);
    let mut out = ToolbarOutput::default();
    let has_image = session.image.is_some();
    let phase = session.phase();
    let calibrated = phase == CalibrationPhase::Confirmed;

    ui.with_layout(Layout::left_to_right(Align::Center), |ui| {
        ui.spacing_mut().interact_size.y = theme.layout.chip_h;
        ui.spacing_mut().button_padding.y = theme.layout.space_1;
        ui.spacing_mut().item_spacing = vec2(theme.layout.control_gap, 0.0);

        let open_label = if plan.show_button_labels { "Open…" } else { "📂" };
        if ui_controls::ghost_button(ui, theme, open_label, vec2(0.0, theme.layout.chip_h))
            .on_hover_text("Open map image (Ctrl+O)")
            .clicked()
        {
            out.open = true;
        }

        group_separator(ui, theme);

        let calibrate_label = match (phase, plan.show_button_labels) {
            (CalibrationPhase::Idle, true) => "Set reference",
            (_, true) => "Recalibrate",
            (_, false) => "◎",
        };
        let calibrate = ui.add_enabled_ui(has_image, |ui| {
            ui_controls::ghost_button(ui, theme, calibrate_label, vec2(0.0, theme.layout.chip_h))
                .on_hover_text(format!("Place the {} circle", session.settings.reference_name))
        });
        if calibrate.inner.clicked() {
            out.calibrate = true;
        }

        if phase == CalibrationPhase::Editing {
            let confirm_label = if plan.show_button_labels {
                "Confirm radius"
            } else {
                "✔"
            };
            if ui_controls::primary_button(ui, theme, confirm_label, vec2(0.0, theme.layout.chip_h))
                .on_hover_text("Enter the real radius (Enter)")
                .clicked()
            {
                out.confirm = true;
            }
        }

        group_separator(ui, theme);

        ui.add_enabled_ui(calibrated, |ui| {
            tool_button(ui, session, theme, Tool::Select, "Select (V)", &mut out);
            tool_button(ui, session, theme, Tool::Rectangle, "Rectangle (R)", &mut out);
            tool_button(ui, session, theme, Tool::Circle, "Circle (C)", &mut out);
            tool_button(ui, session, theme, Tool::Polygon, "Polygon (P)", &mut out);

            if !plan.show_overflow {
                group_separator(ui, theme);
                if ui_controls::ghost_button(ui, theme, "Add rectangle", vec2(0.0, theme.layout.chip_h))
                    .on_hover_text("Default-size rectangle at the image center")
                    .clicked()
                {
                    out.quick_rectangle = true;
                }
            }
        });

        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            if plan.show_overflow {
                ui.menu_button("…", |ui| {
                    ui.spacing_mut().item_spacing =
                        vec2(theme.layout.control_gap, theme.layout.space_2);
                    if ui
                        .add_enabled(calibrated, egui::Button::new("Add rectangle"))
                        .clicked()
                    {
                        out.quick_rectangle = true;
                        ui.close_menu();
                    }
                });
            }

            if plan.show_scale_inline {
                if let Some(scale) = session.calibration.scale() {
                    ui.label(
                        RichText::new(format!("{:.4} units/px", scale.units_per_pixel))
                            .color(theme.text.muted)
                            .size(12.0),
                    );
                }
            }
        });
    });

    out
}

fn group_separator(ui: &mut Ui, theme: &AppTheme) {
    ui.separator();
    let extra = (theme.layout.group_gap - theme.layout.control_gap).max(0.0);
    if extra > 0.0 {
        ui.add_space(extra);
    }
}

fn tool_button(
    ui: &mut Ui,
    session: &Session,
    theme: &AppTheme,
    tool: Tool,
    hint: &str,
    out: &mut ToolbarOutput,
) {
    let selected = session.calibration.is_confirmed() && session.editor.tool() == tool;
    let response = ui_controls::tool_chip(ui, theme, "", selected).on_hover_text(hint);
    let color = if !ui.is_enabled() {
        theme.text.muted
    } else if selected {
        theme.text.primary
    } else {
        theme.text.secondary
    };
    draw_tool_icon(ui, response.rect, tool, color);
    if response.clicked() {
        out.tool = Some(tool);
    }
}

fn draw_tool_icon(ui: &Ui, rect: Rect, tool: Tool, color: Color32) {
    let stroke = Stroke::new(1.65, color);
    let painter = ui.painter();
    let icon_rect = rect.shrink2(vec2(8.0, 5.0));

    match tool {
        Tool::Select => {
            let tip = Pos2::new(icon_rect.left() + 2.0, icon_rect.top() + 1.0);
            let base = Pos2::new(icon_rect.left() + 8.6, icon_rect.bottom() - 1.6);
            let inner = Pos2::new(icon_rect.left() + 10.8, icon_rect.center().y + 1.8);
            let wing = Pos2::new(icon_rect.right() - 1.8, icon_rect.center().y - 0.6);

            painter.add(Shape::convex_polygon(
                vec![tip, base, inner, wing],
                Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), 40),
                Stroke::NONE,
            ));
            painter.add(Shape::closed_line(vec![tip, base, inner, wing], stroke));
        }
        Tool::Rectangle => {
            let r = icon_rect.shrink2(vec2(2.0, 3.0));
            painter.rect_stroke(r, 1.5, stroke);
            for corner in [r.left_top(), r.right_top(), r.right_bottom(), r.left_bottom()] {
                painter.circle_filled(corner, 1.6, color);
            }
        }
        Tool::Circle => {
            let radius = icon_rect.width().min(icon_rect.height()) * 0.42;
            painter.circle_stroke(icon_rect.center(), radius, stroke);
            painter.circle_filled(icon_rect.center(), 1.4, color);
            painter.circle_filled(icon_rect.center() + vec2(radius, 0.0), 1.8, color);
        }
        Tool::Polygon => {
            let c = icon_rect.center();
            let w = icon_rect.width() * 0.45;
            let h = icon_rect.height() * 0.45;
            let points = vec![
                Pos2::new(c.x - w, c.y + h * 0.6),
                Pos2::new(c.x - w * 0.4, c.y - h),
                Pos2::new(c.x + w, c.y - h * 0.3),
                Pos2::new(c.x + w * 0.3, c.y + h),
            ];
            painter.add(Shape::closed_line(points.clone(), stroke));
            for p in points {
                painter.circle_filled(p, 1.4, color);
            }
        }
    }
}
