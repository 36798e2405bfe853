use egui::{
    vec2, Align2, Color32, Context, CursorIcon, Event, FontId, Painter, PointerButton, Pos2, Rect,
    ScrollArea, Sense, Shape as EguiShape, Stroke, TouchPhase, Ui,
};

use crate::calibration::CalibrationPhase;
use crate::dispatcher::{InteractionDispatcher, PointerEvent, PointerPhase};
use crate::error::RoiError;
use crate::geometry::Point;
use crate::mapping::{to_screen_space, HostEvent, ScreenTransform, TouchContact};
use crate::picture::{Picture, View};
use crate::session::Session;
use crate::shape::{Geometry, Handle, ShapeKind};
use crate::theme::{with_alpha, AppTheme};

const CANVAS_MARGIN: f32 = 48.0;

/// Host-side input bookkeeping that survives between frames.
#[derive(Default)]
pub struct CanvasInput {
    pub dispatcher: InteractionDispatcher,
    touches: Vec<TouchContact>,
    last_mouse: Option<Point>,
}

impl CanvasInput {
    /// Turns one frame of egui events into pointer events. Presses only count
    /// inside `canvas`; moves and releases are delivered wherever they happen
    /// so a drag can continue past the image border. Frames carrying touch
    /// events ignore the mouse events egui synthesizes from them.
    pub fn translate(
        &mut self,
        events: &[Event],
        canvas: Rect,
        double_click: Option<Pos2>,
    ) -> Vec<PointerEvent> {
        let has_touch = events.iter().any(|event| matches!(event, Event::Touch { .. }));
        let mut out = Vec::new();

        for event in events {
            match event {
                Event::Touch { id, phase, pos, .. } => {
                    out.extend(self.touch(id.0, *phase, to_point(*pos), canvas));
                }
                _ if has_touch => {}
                Event::PointerMoved(pos) => {
                    let p = to_point(*pos);
                    self.last_mouse = Some(p);
                    out.push(PointerEvent::mouse(PointerPhase::Move, p.x, p.y));
                }
                Event::PointerButton {
                    pos,
                    button: PointerButton::Primary,
                    pressed,
                    ..
                } => {
                    let p = to_point(*pos);
                    self.last_mouse = Some(p);
                    if !*pressed {
                        out.push(PointerEvent::mouse(PointerPhase::Up, p.x, p.y));
                    } else if canvas.contains(*pos) {
                        out.push(PointerEvent::mouse(PointerPhase::Down, p.x, p.y));
                    }
                }
                Event::PointerGone => {
                    if let Some(p) = self.last_mouse.take() {
                        out.push(PointerEvent::mouse(PointerPhase::Leave, p.x, p.y));
                    }
                }
                _ => {}
            }
        }

        if let Some(pos) = double_click.filter(|pos| !has_touch && canvas.contains(*pos)) {
            out.push(PointerEvent::mouse(PointerPhase::DoubleClick, pos.x as f64, pos.y as f64));
        }
        out
    }

    /// Only the first active contact drives the editor; later fingers are
    /// tracked so that the list order stays right but never start a drag.
    fn touch(&mut self, id: u64, phase: TouchPhase, p: Point, canvas: Rect) -> Option<PointerEvent> {
        let index = self.touches.iter().position(|touch| touch.id == id);
        match (phase, index) {
            (TouchPhase::Start, None) => {
                self.touches.push(TouchContact { id, client: p });
                let first = self.touches.len() == 1;
                let inside = canvas.contains(Pos2::new(p.x as f32, p.y as f32));
                (first && inside).then(|| self.event(PointerPhase::Down))
            }
            (TouchPhase::Move, Some(index)) => {
                self.touches[index].client = p;
                (index == 0).then(|| self.event(PointerPhase::Move))
            }
            (TouchPhase::End | TouchPhase::Cancel, Some(index)) => {
                self.touches[index].client = p;
                let phase = if phase == TouchPhase::End {
                    PointerPhase::Up
                } else {
                    PointerPhase::Cancel
                };
                let event = (index == 0).then(|| self.event(phase));
                self.touches.remove(index);
                event
            }
            _ => None,
        }
    }

    fn event(&self, phase: PointerPhase) -> PointerEvent {
        PointerEvent::new(phase, HostEvent::Touch(self.touches.clone()))
    }
}

fn to_point(pos: Pos2) -> Point {
    Point::new(pos.x as f64, pos.y as f64)
}

fn to_pos(transform: &ScreenTransform, p: Point) -> Pos2 {
    let screen = to_screen_space(p, transform);
    Pos2::new(screen.x as f32, screen.y as f32)
}

fn screen_len(transform: &ScreenTransform, len: f64) -> f32 {
    (len * transform.scale()) as f32
}

/// Dispatches this frame's input, then draws the image and the complete
/// overlay. Returns the first rejected operation, if any.
pub fn show_canvas(
    ui: &mut Ui,
    ctx: &Context,
    session: &mut Session,
    picture: Option<&mut Picture>,
    view: &mut View,
    input: &mut CanvasInput,
    theme: &AppTheme,
) -> Option<RoiError> {
    let Some(picture) = picture else {
        empty_canvas(ui, theme);
        return None;
    };

    let texture_id = picture.ensure_texture(ctx).id();
    let image_size = picture.size_vec2();
    let natural_size = (picture.width(), picture.height());

    let available = ui.available_size();
    if view.fit_pending {
        view.fit(image_size, available - vec2(CANVAS_MARGIN, CANVAS_MARGIN));
    }

    let scaled = image_size * view.zoom;
    let canvas_size = vec2(
        (scaled.x + CANVAS_MARGIN).max(available.x),
        (scaled.y + CANVAS_MARGIN).max(available.y),
    );

    ScrollArea::both()
        .id_source("roi_canvas_scroll")
        .drag_to_scroll(false)
        .show(ui, |ui| {
            let (canvas_rect, response) =
                ui.allocate_exact_size(canvas_size, Sense::click_and_drag());

            let origin = Pos2::new(
                canvas_rect.center().x - scaled.x * 0.5,
                canvas_rect.center().y - scaled.y * 0.5,
            );
            let image_rect = Rect::from_min_size(origin, scaled);
            let transform = ScreenTransform::from_display(
                to_point(image_rect.min),
                (scaled.x as f64, scaled.y as f64),
                natural_size,
            )
            .unwrap_or_else(|| ScreenTransform::uniform(to_point(image_rect.min), view.zoom as f64));

            let visible = canvas_rect.intersect(ui.clip_rect());
            let error = dispatch_frame(ctx, session, input, &transform, visible);

            let hover = response.hover_pos().map(|pos| transform.to_image(to_point(pos)));
            if hover.is_some() && wants_crosshair(session) {
                ctx.set_cursor_icon(CursorIcon::Crosshair);
            }

            let painter = ui.painter_at(canvas_rect);
            painter.rect_filled(canvas_rect, 16.0, theme.surfaces.canvas_bg);
            painter.rect_stroke(
                image_rect.expand(1.0),
                0.0,
                Stroke::new(1.0, theme.surfaces.stroke_strong),
            );
            painter.image(
                texture_id,
                image_rect,
                Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                Color32::WHITE,
            );

            draw_shapes(&painter, session, &transform, theme);
            draw_reference_circle(&painter, session, &transform, theme);
            draw_draft(&painter, session, &transform, theme, hover);
            if session.phase() == CalibrationPhase::CenterPending {
                if let Some(hover) = hover {
                    draw_crosshair(&painter, to_pos(&transform, hover), theme);
                }
            }

            error
        })
        .inner
}

fn dispatch_frame(
    ctx: &Context,
    session: &mut Session,
    input: &mut CanvasInput,
    transform: &ScreenTransform,
    visible: Rect,
) -> Option<RoiError> {
    let (events, double_click) = ctx.input(|i| {
        let double = i
            .pointer
            .button_double_clicked(PointerButton::Primary)
            .then(|| i.pointer.interact_pos())
            .flatten();
        (i.events.clone(), double)
    });

    let mut first_error = None;
    let mut sink = ctx.clone();
    for event in input.translate(&events, visible, double_click) {
        if let Err(err) = input
            .dispatcher
            .dispatch(session, &event, transform, &mut sink)
        {
            first_error.get_or_insert(err);
        }
    }
    first_error
}

fn wants_crosshair(session: &Session) -> bool {
    match session.phase() {
        CalibrationPhase::CenterPending => true,
        CalibrationPhase::Confirmed => session.editor.tool().creates_shapes(),
        CalibrationPhase::Idle | CalibrationPhase::Editing => false,
    }
}

fn empty_canvas(ui: &mut Ui, theme: &AppTheme) {
    let (rect, _) = ui.allocate_exact_size(ui.available_size(), Sense::hover());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 16.0, theme.surfaces.canvas_bg);
    painter.rect_stroke(rect, 16.0, Stroke::new(1.0, theme.surfaces.stroke_soft));
    painter.text(
        rect.center(),
        Align2::CENTER_CENTER,
        "Open a map image (Ctrl+O)",
        FontId::proportional(19.0),
        theme.text.secondary,
    );
}

fn kind_color(kind: ShapeKind, theme: &AppTheme) -> Color32 {
    match kind {
        ShapeKind::Circle => theme.overlay.circle_roi,
        ShapeKind::Rectangle => theme.overlay.rect_roi,
        ShapeKind::Polygon => theme.overlay.polygon_roi,
    }
}

fn draw_shapes(painter: &Painter, session: &Session, transform: &ScreenTransform, theme: &AppTheme) {
    let overlay = &theme.overlay;
    let active_id = session.shapes.active_id();

    for shape in session.shapes.iter() {
        let active = Some(shape.id) == active_id;
        let color = if active {
            overlay.active_roi
        } else {
            kind_color(shape.geometry.kind(), theme)
        };
        let width = if active {
            overlay.active_roi_stroke
        } else {
            overlay.roi_stroke
        };
        draw_geometry(
            painter,
            &shape.geometry,
            transform,
            Stroke::new(width, color),
            with_alpha(color, overlay.roi_fill_alpha),
        );

        let anchor = to_pos(transform, shape.geometry.bounds().min) + vec2(4.0, -6.0);
        draw_label(painter, anchor, Align2::LEFT_BOTTOM, &shape.name, theme);
    }

    if let Some(active) = session.shapes.active() {
        let radius = session.settings.handle_radius as f32;
        for (handle, point) in active.geometry.handles() {
            let fill = if handle == Handle::Edge {
                overlay.edge_handle_fill
            } else {
                overlay.handle_fill
            };
            painter.circle(
                to_pos(transform, point),
                radius,
                fill,
                Stroke::new(1.5, overlay.handle_ring),
            );
        }
    }
}

fn draw_geometry(
    painter: &Painter,
    geometry: &Geometry,
    transform: &ScreenTransform,
    stroke: Stroke,
    fill: Color32,
) {
    match geometry {
        Geometry::Circle { center, radius } => {
            painter.circle(
                to_pos(transform, *center),
                screen_len(transform, *radius),
                fill,
                stroke,
            );
        }
        Geometry::Rectangle { .. } => {
            let bounds = geometry.bounds();
            let rect = Rect::from_min_max(to_pos(transform, bounds.min), to_pos(transform, bounds.max));
            painter.rect_filled(rect, 0.0, fill);
            painter.rect_stroke(rect, 0.0, stroke);
        }
        Geometry::Polygon { vertices } => {
            // concave outlines would be mis-filled, so polygons are outline only
            let points = vertices.iter().map(|v| to_pos(transform, *v)).collect();
            painter.add(EguiShape::closed_line(points, stroke));
        }
    }
}

fn draw_reference_circle(
    painter: &Painter,
    session: &Session,
    transform: &ScreenTransform,
    theme: &AppTheme,
) {
    let Some(circle) = session.calibration.circle() else {
        return;
    };
    let overlay = &theme.overlay;
    let confirmed = session.calibration.is_confirmed();
    let color = overlay.reference_color(confirmed);
    let center = to_pos(transform, circle.center);
    let radius = screen_len(transform, circle.radius_px);

    painter.circle(
        center,
        radius,
        with_alpha(color, overlay.reference_fill_alpha),
        Stroke::new(overlay.reference_stroke, color),
    );
    painter.circle_filled(center, 5.0, overlay.handle_fill);

    if !confirmed {
        painter.circle(
            center + vec2(radius, 0.0),
            8.0,
            overlay.edge_handle_fill,
            Stroke::new(1.5, overlay.handle_fill),
        );
    }

    let mut label = format!("Radius: {:.0} px", circle.radius_px);
    if let Some(scale) = session.calibration.scale() {
        label.push_str(&format!(" = {} units", scale.radius_units));
    }
    draw_label(
        painter,
        center + vec2(10.0, -radius - 10.0),
        Align2::LEFT_BOTTOM,
        &label,
        theme,
    );
}

fn draw_draft(
    painter: &Painter,
    session: &Session,
    transform: &ScreenTransform,
    theme: &AppTheme,
    hover: Option<Point>,
) {
    let overlay = &theme.overlay;
    let stroke = Stroke::new(1.5, overlay.draft);

    if let Some(preview) = session.editor.draw_preview() {
        draw_geometry(painter, &preview, transform, stroke, with_alpha(overlay.draft, 20));
    }

    let draft = session.editor.polygon_draft();
    if draft.is_empty() {
        return;
    }
    let points: Vec<Pos2> = draft.iter().map(|v| to_pos(transform, *v)).collect();
    painter.add(EguiShape::line(points.clone(), stroke));
    if let (Some(last), Some(hover)) = (points.last(), hover) {
        painter.extend(EguiShape::dashed_line(
            &[*last, to_pos(transform, hover)],
            stroke,
            6.0,
            4.0,
        ));
    }
    for (idx, point) in points.iter().enumerate() {
        let radius = if idx == 0 { 6.0 } else { 4.0 };
        painter.circle(*point, radius, overlay.handle_fill, Stroke::new(1.0, overlay.handle_ring));
    }
}

fn draw_crosshair(painter: &Painter, at: Pos2, theme: &AppTheme) {
    let stroke = Stroke::new(1.0, theme.overlay.reference_pending);
    painter.line_segment([at - vec2(12.0, 0.0), at + vec2(12.0, 0.0)], stroke);
    painter.line_segment([at - vec2(0.0, 12.0), at + vec2(0.0, 12.0)], stroke);
}

fn draw_label(painter: &Painter, at: Pos2, align: Align2, text: &str, theme: &AppTheme) {
    let font = FontId::proportional(theme.overlay.label_size);
    painter.text(
        at + vec2(1.0, 1.0),
        align,
        text,
        font.clone(),
        theme.overlay.label_shadow,
    );
    painter.text(at, align, text, font, theme.overlay.label);
}
