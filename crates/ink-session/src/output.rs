use ink_core::selection::SelectionEvent;

use super::types::{HostEvent, SessionOutput};
use super::TraceInputSession;

impl TraceInputSession {
    pub(crate) fn set_preedit(&mut self, text: String) {
        if self.preedit != text {
            self.preedit = text.clone();
            self.output.events.push(HostEvent::PreeditChanged(text));
        }
    }

    /// Move the coalesced list notifications of the finished operation into
    /// the outbox. Called once at the end of every public operation.
    pub(crate) fn flush_selection_events(&mut self) {
        for e in self.lists.take_events() {
            self.output.events.push(match e {
                SelectionEvent::ListChanged(t) => HostEvent::SelectionListChanged(t),
                SelectionEvent::ActiveItemChanged(t, i) => {
                    HostEvent::SelectionListActiveItemChanged(t, i)
                }
            });
        }
    }

    /// Drain host events and engine requests produced so far.
    pub fn take_output(&mut self) -> SessionOutput {
        std::mem::take(&mut self.output)
    }
}
