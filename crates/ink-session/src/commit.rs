use tracing::{debug, error};

use ink_core::recognition::Segmentation;
use ink_core::selection::{SelectionError, SelectionListType};

use super::reselect::ReselectSpan;
use super::types::{EngineRequest, HostEvent};
use super::TraceInputSession;

impl TraceInputSession {
    /// Insert text into the context and remember how it was recognized.
    /// The host treats the commit as replacing the pre-edit.
    pub(crate) fn commit_text(
        &mut self,
        text: String,
        alternatives: Vec<String>,
        segmentation: Option<Segmentation>,
    ) {
        if text.is_empty() {
            return;
        }
        debug!(%text, "commit");
        self.preedit.clear();
        let range = self.context.insert(&text);
        self.reselect.on_insert(range.start, range.len());
        if !alternatives.is_empty() {
            self.reselect.record(ReselectSpan {
                range,
                text: text.clone(),
                alternatives,
                segmentation,
                committed_at: self.clock.now(),
            });
        }
        self.output.events.push(HostEvent::Commit(text));
    }

    pub(crate) fn commit_preedit(&mut self) {
        let shown = self.shown.take();
        if self.preedit.is_empty() {
            return;
        }
        let text = self.preedit.clone();
        let (alternatives, segmentation) = shown
            .map(|s| (s.alternatives, s.segmentation))
            .unwrap_or_default();
        self.commit_text(text, alternatives, segmentation);
        self.lists.clear_all();
    }

    /// Drop everything that has not reached the recognizer's answer yet.
    pub(crate) fn abort_capture(&mut self) {
        for a in self.capture.drain(..) {
            a.handle.discard();
        }
        self.recognition.discard_pending();
        if let Some(id) = self.recognition.cancel_in_flight() {
            self.output
                .requests
                .push(EngineRequest::CancelRecognition(id));
        }
    }

    /// Finish the current word: commit the pre-edit, abandon capture.
    pub(crate) fn update_state(&mut self) {
        self.abort_capture();
        self.commit_preedit();
        self.shown = None;
        self.lists.clear_all();
    }

    /// Abandon everything without committing.
    pub(crate) fn reset_state(&mut self) {
        self.abort_capture();
        self.shown = None;
        self.set_preedit(String::new());
        self.lists.clear_all();
    }

    pub(crate) fn select_item(
        &mut self,
        list: SelectionListType,
        index: usize,
    ) -> Result<(), SelectionError> {
        let model = self.lists.get(list)?;
        let item = match model.item(index) {
            Ok(item) => item.clone(),
            Err(e) => {
                error!(error = %e, "selection of a missing item");
                return Err(e);
            }
        };
        match list {
            SelectionListType::WordCandidates => {
                let alternatives = model.items().iter().map(|i| i.text.clone()).collect();
                // The segmentation only describes the word currently shown.
                let segmentation = self
                    .shown
                    .take()
                    .and_then(|s| s.segmentation)
                    .filter(|_| item.text == self.preedit);
                self.abort_capture();
                self.commit_text(item.text, alternatives, segmentation);
                self.lists.clear_all();
            }
            SelectionListType::CharacterAlternatives => {
                self.replace_last_segment(&item.text);
                self.lists.set_active(list, Some(index))?;
            }
        }
        Ok(())
    }

    /// Swap the last character segment of the pre-edit for an alternative.
    fn replace_last_segment(&mut self, replacement: &str) {
        let Some(segment) = self
            .shown
            .as_mut()
            .and_then(|s| s.segmentation.as_mut())
            .and_then(|s| s.segments.last_mut())
        else {
            return;
        };
        let chars: Vec<char> = self.preedit.chars().collect();
        if segment.range.end > chars.len() || segment.range.start > segment.range.end {
            return;
        }
        let mut text: String = chars[..segment.range.start].iter().collect();
        text.push_str(replacement);
        text.extend(&chars[segment.range.end..]);
        segment.range = segment.range.start..segment.range.start + replacement.chars().count();
        self.set_preedit(text);
    }
}
