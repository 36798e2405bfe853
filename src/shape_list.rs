use egui::{vec2, RichText, ScrollArea, Ui};

use crate::export::{export_shape, ExportedShape};
use crate::session::Session;
use crate::shape::{Shape, ShapeId};
use crate::theme::AppTheme;
use crate::ui_controls;

#[derive(Debug, Default)]
pub struct ShapeListOutput {
    pub select: Option<ShapeId>,
    pub delete: bool,
}

/// Short size summary in game units, e.g. `r 33.5` or `100 × 50`.
pub fn describe(shape: &Shape, units_per_pixel: f64) -> String {
    match export_shape(&shape.name, &shape.geometry, units_per_pixel) {
        ExportedShape::Circle { r, .. } => format!("r {r:.1}"),
        ExportedShape::Rectangle { w, h, .. } => format!("{w:.1} × {h:.1}"),
        ExportedShape::Polygon { points, .. } => format!("{} pts", points.len()),
    }
}

pub fn show_shape_list(ui: &mut Ui, session: &Session, theme: &AppTheme) -> ShapeListOutput {
    let mut out = ShapeListOutput::default();

    ui.label(RichText::new("ROIs").strong().color(theme.text.primary));
    ui.add_space(theme.layout.space_1);

    let Some(units_per_pixel) = session.calibration.units_per_pixel() else {
        ui.label(
            RichText::new(format!(
                "Confirm the {} to start adding ROIs.",
                session.settings.reference_name
            ))
            .color(theme.text.muted)
            .size(12.0),
        );
        return out;
    };

    if session.shapes.is_empty() {
        ui.label(
            RichText::new("No ROIs yet. Pick a tool and draw on the map.")
                .color(theme.text.muted)
                .size(12.0),
        );
    }

    let active_id = session.shapes.active_id();
    ScrollArea::vertical()
        .id_source("roi_shape_list")
        .max_height(ui.available_height() - theme.controls.action_height - theme.layout.space_4)
        .show(ui, |ui| {
            for shape in session.shapes.iter() {
                let active = Some(shape.id) == active_id;
                ui.horizontal(|ui| {
                    let label = RichText::new(&shape.name).color(if active {
                        theme.text.primary
                    } else {
                        theme.text.secondary
                    });
                    if ui.selectable_label(active, label).clicked() {
                        out.select = Some(shape.id);
                    }
                    ui.label(
                        RichText::new(format!(
                            "{} · {}",
                            shape.geometry.kind().label(),
                            describe(shape, units_per_pixel)
                        ))
                        .color(theme.text.muted)
                        .size(11.0),
                    );
                });
            }
        });

    ui.add_space(theme.layout.space_2);
    let delete = ui.add_enabled_ui(active_id.is_some(), |ui| {
        ui_controls::danger_button(
            ui,
            theme,
            "Delete selected",
            vec2(ui.available_width(), theme.controls.action_height),
        )
    });
    if delete.inner.on_hover_text("Delete").clicked() {
        out.delete = true;
    }

    out
}
