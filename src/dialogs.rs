use egui::{Context as EguiContext, Key, RichText, TextEdit};

use crate::host::{PromptPoll, PromptProvider};
use crate::session::{Notice, PromptRequest};
use crate::theme::AppTheme;
use crate::ui_controls;

/// Modal text prompt drawn as an egui window. Answers arrive on a later
/// frame, so the session polls it instead of blocking.
pub struct PromptDialog {
    ctx: EguiContext,
    theme: AppTheme,
    buffer: String,
    open_for: Option<String>,
}

impl PromptDialog {
    pub fn new(ctx: EguiContext, theme: AppTheme) -> Self {
        Self {
            ctx,
            theme,
            buffer: String::new(),
            open_for: None,
        }
    }
}

impl PromptProvider for PromptDialog {
    fn poll(&mut self, request: &PromptRequest) -> PromptPoll {
        let fresh = self.open_for.as_deref() != Some(request.title.as_str());
        if fresh {
            self.buffer = request.initial.clone();
            self.open_for = Some(request.title.clone());
        }

        let mut answer = PromptPoll::Pending;
        egui::Window::new(&request.title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .frame(ui_controls::card_frame(&self.theme))
            .show(&self.ctx, |ui| {
                ui.label(
                    RichText::new(&request.message)
                        .color(self.theme.text.secondary)
                        .size(15.0),
                );
                ui.add_space(6.0);
                let edit = ui.add(TextEdit::singleline(&mut self.buffer).desired_width(260.0));
                if fresh {
                    edit.request_focus();
                }
                let (enter, escape) =
                    ui.input(|input| (input.key_pressed(Key::Enter), input.key_pressed(Key::Escape)));
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    let ok = ui_controls::primary_button(
                        ui,
                        &self.theme,
                        "OK",
                        egui::vec2(96.0, 32.0),
                    )
                    .clicked();
                    let cancel = ui_controls::ghost_button(
                        ui,
                        &self.theme,
                        "Cancel",
                        egui::vec2(96.0, 32.0),
                    )
                    .clicked();
                    if ok || enter {
                        answer = PromptPoll::Answered(Some(self.buffer.clone()));
                    } else if cancel || escape {
                        answer = PromptPoll::Answered(None);
                    }
                });
            });

        if answer != PromptPoll::Pending {
            self.open_for = None;
        }
        answer
    }
}

/// Shows the pending notice; returns true once the user dismissed it.
pub fn show_notice(ctx: &EguiContext, theme: &AppTheme, notice: &Notice) -> bool {
    let mut dismissed = ctx.input(|input| input.key_pressed(Key::Escape) || input.key_pressed(Key::Enter));

    egui::Window::new(&notice.title)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .frame(ui_controls::card_frame(theme))
        .show(ctx, |ui| {
            ui.label(
                RichText::new(&notice.message)
                    .color(theme.text.secondary)
                    .size(15.0),
            );
            ui.add_space(8.0);
            if ui_controls::primary_button(ui, theme, "OK", egui::vec2(96.0, 32.0)).clicked() {
                dismissed = true;
            }
        });

    dismissed
}
