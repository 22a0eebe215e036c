use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use ink_core::dict::{DictionaryLoader, FileDictionaryLoader};
use ink_core::modes::{InputMode, PatternRecognitionMode, TextCase};
use ink_core::recognition::{Recognizer, UnavailableRecognizer};
use ink_core::selection::{RoleValue, SelectionError, SelectionListType, SelectionRole};
use ink_core::trace::{InfoMap, TraceHandle};
use ink_session::{
    Clock, EngineRequest, HostEvent, InputMethod, Key, KeyModifiers, ReselectFlags,
    SessionConfig, SystemClock, TraceInputSession,
};

use crate::async_worker::AsyncWorker;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Input method with its recognizer and dictionary loader running on
/// background threads.
///
/// Every host call returns immediately. Completed work is applied on the
/// next `poll`; host notifications accumulate until `take_events`.
pub struct InkEngine {
    session: TraceInputSession,
    worker: AsyncWorker,
    events: Vec<HostEvent>,
}

impl InkEngine {
    pub fn new(
        config: SessionConfig,
        recognizer: Arc<dyn Recognizer>,
        loader: Arc<dyn DictionaryLoader>,
    ) -> Result<Self, EngineError> {
        Self::with_clock(config, Arc::new(SystemClock), recognizer, loader)
    }

    pub fn with_clock(
        config: SessionConfig,
        clock: Arc<dyn Clock>,
        recognizer: Arc<dyn Recognizer>,
        loader: Arc<dyn DictionaryLoader>,
    ) -> Result<Self, EngineError> {
        Ok(Self {
            session: TraceInputSession::with_clock(config, clock),
            worker: AsyncWorker::new(recognizer, loader)?,
            events: Vec::new(),
        })
    }

    /// Global settings, no recognizer installed, dictionaries from disk.
    pub fn with_defaults() -> Result<Self, EngineError> {
        Self::new(
            SessionConfig::default(),
            Arc::new(UnavailableRecognizer),
            Arc::new(FileDictionaryLoader::new()),
        )
    }

    pub fn session(&self) -> &TraceInputSession {
        &self.session
    }

    pub fn set_surrounding_text(&mut self, text: &str, cursor: usize) {
        self.session.set_surrounding_text(text, cursor);
    }

    /// Hand the session's requests to the workers and collect its events.
    fn dispatch(&mut self) {
        let out = self.session.take_output();
        for request in out.requests {
            match request {
                EngineRequest::Recognize(req) => self.worker.submit_recognition(req),
                EngineRequest::CancelRecognition(id) => self.worker.cancel_recognition(id),
                EngineRequest::LoadDictionary { locale, uri } => {
                    debug!(%locale, %uri, "loading dictionary");
                    self.worker.load_dictionary(uri);
                }
            }
        }
        self.events.extend(out.events);
    }

    /// Apply every completion that has arrived. Returns true if any did.
    pub fn poll(&mut self) -> bool {
        let mut applied = false;
        while let Some(completion) = self.worker.try_recv() {
            self.session.reconcile(completion);
            applied = true;
        }
        self.dispatch();
        applied
    }

    /// Wait up to `timeout` for one completion, then apply whatever else
    /// has arrived.
    pub fn poll_blocking(&mut self, timeout: Duration) -> bool {
        match self.worker.recv_timeout(timeout) {
            Some(completion) => {
                self.session.reconcile(completion);
                self.poll();
                true
            }
            None => false,
        }
    }

    pub fn tick(&mut self) {
        self.session.tick();
        self.dispatch();
    }

    pub fn take_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }
}

impl InputMethod for InkEngine {
    fn input_modes(&self, locale: &str) -> Vec<InputMode> {
        self.session.input_modes(locale)
    }

    fn set_input_mode(&mut self, locale: &str, mode: InputMode) -> bool {
        let ok = self.session.set_input_mode(locale, mode);
        self.dispatch();
        ok
    }

    fn set_text_case(&mut self, case: TextCase) -> bool {
        self.session.set_text_case(case)
    }

    fn key_event(&mut self, key: Key, text: &str, modifiers: KeyModifiers) -> bool {
        let consumed = self.session.key_event(key, text, modifiers);
        self.dispatch();
        consumed
    }

    fn reset(&mut self) {
        self.session.reset();
        self.dispatch();
    }

    fn update(&mut self) {
        self.session.update();
        self.dispatch();
    }

    fn selection_lists(&mut self) -> Vec<SelectionListType> {
        let lists = self.session.selection_lists();
        self.dispatch();
        lists
    }

    fn selection_list_item_count(&self, list: SelectionListType) -> usize {
        self.session.selection_list_item_count(list)
    }

    fn selection_list_data(
        &self,
        list: SelectionListType,
        index: usize,
        role: SelectionRole,
    ) -> Result<RoleValue, SelectionError> {
        self.session.selection_list_data(list, index, role)
    }

    fn selection_list_item_selected(
        &mut self,
        list: SelectionListType,
        index: usize,
    ) -> Result<(), SelectionError> {
        let result = self.session.selection_list_item_selected(list, index);
        self.dispatch();
        result
    }

    fn pattern_recognition_modes(&self) -> Vec<PatternRecognitionMode> {
        self.session.pattern_recognition_modes()
    }

    fn trace_begin(
        &mut self,
        mode: PatternRecognitionMode,
        device_info: InfoMap,
        screen_info: InfoMap,
    ) -> Option<TraceHandle> {
        let trace = self.session.trace_begin(mode, device_info, screen_info);
        self.dispatch();
        trace
    }

    fn trace_end(&mut self, trace: &TraceHandle) -> bool {
        let ended = self.session.trace_end(trace);
        self.dispatch();
        ended
    }

    fn reselect(&mut self, cursor: usize, flags: ReselectFlags) -> bool {
        let reopened = self.session.reselect(cursor, flags);
        self.dispatch();
        reopened
    }
}
