//! Capabilities the annotation core expects from its host UI.

use crate::session::{PromptRequest, Session};

/// Draws the image plus the complete overlay for the given session state.
///
/// Called after every mutation; implementations rebuild the whole overlay
/// rather than patching what changed.
pub trait RenderSink {
    fn render(&mut self, session: &Session);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PromptPoll {
    /// The user has not answered yet; poll again on the next event.
    Pending,
    /// `Some` is a confirmed value, `None` a cancelled prompt.
    Answered(Option<String>),
}

/// Non-blocking text input. A cancelled prompt is an aborted operation and
/// is reported as `Answered(None)`, never as an empty string.
pub trait PromptProvider {
    fn poll(&mut self, request: &PromptRequest) -> PromptPoll;
}

impl RenderSink for egui::Context {
    fn render(&mut self, _session: &Session) {
        self.request_repaint();
    }
}
