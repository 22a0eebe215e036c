//! Input method state machine for trace (handwriting and gesture) input.
//!
//! `TraceInputSession` owns the pre-edit, the selection lists, the active
//! traces and the recognition attempts. It never blocks: recognition and
//! dictionary loads are emitted as `EngineRequest`s, and their results are
//! fed back through `reconcile`. Host notifications are batched per call and
//! drained with `take_output`.

pub(crate) mod types;

mod capability;
mod clock;
mod commit;
mod context;
mod key_handlers;
mod output;
mod reconcile;
mod recognition;
mod reselect;
mod trace_handlers;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use ink_core::dict::DictionaryRegistry;
use ink_core::modes::{InputMode, TextCase};
use ink_core::recognition::{AttemptId, AttemptStatus};
use ink_core::selection::{SelectionError, SelectionListModel, SelectionListType, SelectionLists};
use ink_core::trace::TraceHandle;

pub use capability::InputMethod;
pub use clock::{Clock, ManualClock, SystemClock};
pub use context::InputContext;
pub use types::{
    Completion, EngineRequest, HostEvent, Key, KeyModifiers, ReselectFlags, SessionConfig,
    SessionOutput, Stage,
};

use recognition::RecognitionSession;
use reselect::ReselectCache;
use types::{ActiveTrace, ShownResult};

/// Channels declared when the session is created and on every
/// `selection_lists` call.
pub const DECLARED_LISTS: [SelectionListType; 2] = [
    SelectionListType::WordCandidates,
    SelectionListType::CharacterAlternatives,
];

pub struct TraceInputSession {
    config: SessionConfig,
    clock: Arc<dyn Clock>,

    locale: Option<String>,
    input_mode: Option<InputMode>,
    text_case: TextCase,

    context: InputContext,
    preedit: String,
    shown: Option<ShownResult>,
    lists: SelectionLists,

    capture: Vec<ActiveTrace>,
    next_trace_id: u32,
    recognition: RecognitionSession,

    dictionaries: DictionaryRegistry,
    reselect: ReselectCache,

    output: SessionOutput,
}

impl TraceInputSession {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: SessionConfig, clock: Arc<dyn Clock>) -> Self {
        let mut lists = SelectionLists::new();
        lists.declare(&DECLARED_LISTS);
        let reselect = ReselectCache::new(config.reselect_cache_size);
        Self {
            config,
            clock,
            locale: None,
            input_mode: None,
            text_case: TextCase::Lower,
            context: InputContext::new(),
            preedit: String::new(),
            shown: None,
            lists,
            capture: Vec::new(),
            next_trace_id: 0,
            recognition: RecognitionSession::new(),
            dictionaries: DictionaryRegistry::new(),
            reselect,
            output: SessionOutput::default(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn stage(&self) -> Stage {
        if self.recognition.is_awaiting() {
            Stage::Recognizing
        } else if !self.capture.is_empty() || self.recognition.has_pending() {
            Stage::Capturing
        } else {
            Stage::Idle
        }
    }

    pub fn preedit(&self) -> &str {
        &self.preedit
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn input_mode(&self) -> Option<InputMode> {
        self.input_mode
    }

    pub fn text_case(&self) -> TextCase {
        self.text_case
    }

    pub fn context(&self) -> &InputContext {
        &self.context
    }

    /// Host edits outside the input method (cursor moves, paste, ...).
    pub fn set_surrounding_text(&mut self, text: &str, cursor: usize) {
        self.context.set_surrounding_text(text, cursor);
    }

    pub fn selection_list(
        &self,
        list: SelectionListType,
    ) -> Result<&SelectionListModel, SelectionError> {
        self.lists.get(list)
    }

    pub fn active_traces(&self) -> Vec<TraceHandle> {
        self.capture.iter().map(|a| a.handle.clone()).collect()
    }

    pub fn pending_stroke_count(&self) -> usize {
        self.recognition.pending_len()
    }

    /// Attempt currently with the recognizer.
    pub fn awaiting_attempt(&self) -> Option<AttemptId> {
        self.recognition.awaiting_id()
    }

    /// Status of a recent attempt; older ones are forgotten.
    pub fn attempt_status(&self, id: AttemptId) -> Option<AttemptStatus> {
        self.recognition.status(id)
    }

    pub fn dictionaries(&self) -> &DictionaryRegistry {
        &self.dictionaries
    }
}
