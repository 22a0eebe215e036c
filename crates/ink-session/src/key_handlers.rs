use tracing::{debug, debug_span};

use super::types::{EngineRequest, Key, KeyModifiers, Stage};
use super::TraceInputSession;

impl TraceInputSession {
    /// Returns true when the key was consumed.
    pub(crate) fn handle_key(&mut self, key: Key, text: &str, modifiers: KeyModifiers) -> bool {
        let _span = debug_span!("key_event", ?key, text, ?modifiers).entered();
        let consumed = if modifiers.is_command() {
            // Shortcuts act on committed text only.
            self.update_state();
            false
        } else {
            match key {
                Key::Backspace => self.handle_backspace(),
                Key::Escape => self.handle_escape(),
                Key::Shift | Key::CapsLock => false,
                Key::Space | Key::Enter | Key::Character | Key::Other(_) => {
                    self.update_state();
                    false
                }
            }
        };
        self.flush_selection_events();
        consumed
    }

    /// Undo in order: the trace being drawn, the last finished stroke, the
    /// running attempt, the last pre-edit character.
    fn handle_backspace(&mut self) -> bool {
        if let Some(active) = self.capture.pop() {
            debug!(trace = %active.handle.id(), "active trace dropped");
            active.handle.discard();
            return true;
        }
        if let Some(id) = self.recognition.pop_pending() {
            debug!(trace = %id, "stroke undone");
            return true;
        }
        if let Some(id) = self.recognition.cancel_in_flight() {
            self.output
                .requests
                .push(EngineRequest::CancelRecognition(id));
            return true;
        }
        if self.preedit.is_empty() {
            return false;
        }
        let mut text = self.preedit.clone();
        text.pop();
        self.shown = None;
        self.lists.clear_all();
        self.set_preedit(text);
        true
    }

    fn handle_escape(&mut self) -> bool {
        if self.stage() == Stage::Idle && self.preedit.is_empty() {
            return false;
        }
        self.reset_state();
        true
    }
}
