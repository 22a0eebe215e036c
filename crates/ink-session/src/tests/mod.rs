mod dictionary;
mod recognition;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use ink_core::dict::WordDictionary;
use ink_core::modes::{InputMode, PatternRecognitionMode};
use ink_core::recognition::{AttemptId, RecognitionOutput, RecognitionRequest};
use ink_core::selection::SelectionListType;
use ink_core::trace::{InfoMap, TraceHandle};

use super::{
    Completion, EngineRequest, HostEvent, InputMethod, ManualClock, SessionConfig,
    TraceInputSession,
};

pub(super) const EN_GB_URI: &str = "file:///dict/en_GB.inkd";
pub(super) const FI_FI_URI: &str = "file:///dict/fi_FI.inkd";

pub(super) fn test_config() -> SessionConfig {
    SessionConfig {
        max_active_traces: 2,
        max_points: 256,
        inactivity_timeout: Duration::from_millis(5000),
        pattern_modes: vec![PatternRecognitionMode::Handwriting],
        group_window: Duration::from_millis(400),
        max_strokes: 8,
        max_candidates: 5,
        word_completions: 2,
        reselect_cache_size: 4,
        reselect_expiry: Duration::from_secs(60),
        latin_locales: vec!["en_GB".into(), "en_US".into(), "fi_FI".into()],
        dictionaries: HashMap::from([
            ("en_GB".to_string(), EN_GB_URI.to_string()),
            ("fi_FI".to_string(), FI_FI_URI.to_string()),
        ]),
    }
}

/// A session on a manual clock with its output collected.
pub(super) struct Harness {
    pub(super) session: TraceInputSession,
    pub(super) clock: Arc<ManualClock>,
    events: Vec<HostEvent>,
    requests: Vec<EngineRequest>,
}

impl Harness {
    /// Session with no input mode selected yet.
    pub(super) fn bare(config: SessionConfig) -> Self {
        let clock = Arc::new(ManualClock::new());
        let session = TraceInputSession::with_clock(config, clock.clone());
        Self {
            session,
            clock,
            events: Vec::new(),
            requests: Vec::new(),
        }
    }

    /// en_GB Latin, dictionary load left pending, output drained.
    pub(super) fn with_config(config: SessionConfig) -> Self {
        let mut h = Self::bare(config);
        assert!(h.session.set_input_mode("en_GB", InputMode::Latin));
        h.session.selection_lists();
        h.take_requests();
        h.take_events();
        h
    }

    pub(super) fn new() -> Self {
        Self::with_config(test_config())
    }

    /// en_GB Latin with the given dictionary loaded.
    pub(super) fn with_dictionary(words: &[(&str, u32)]) -> Self {
        let mut h = Self::new();
        let dict = WordDictionary::from_entries(words.iter().copied());
        h.session
            .dictionary_load_completed(EN_GB_URI, Ok(Arc::new(dict)));
        h.take_events();
        h
    }

    pub(super) fn advance(&self, ms: u64) {
        self.clock.advance(Duration::from_millis(ms));
    }

    fn pump(&mut self) {
        let out = self.session.take_output();
        self.events.extend(out.events);
        self.requests.extend(out.requests);
    }

    pub(super) fn take_events(&mut self) -> Vec<HostEvent> {
        self.pump();
        std::mem::take(&mut self.events)
    }

    pub(super) fn take_requests(&mut self) -> Vec<EngineRequest> {
        self.pump();
        std::mem::take(&mut self.requests)
    }

    /// Recognition requests issued since the last drain. Other requests
    /// are dropped.
    pub(super) fn submitted(&mut self) -> Vec<RecognitionRequest> {
        self.take_requests()
            .into_iter()
            .filter_map(|r| match r {
                EngineRequest::Recognize(req) => Some(req),
                _ => None,
            })
            .collect()
    }

    pub(super) fn begin(&mut self) -> TraceHandle {
        self.session
            .trace_begin(
                PatternRecognitionMode::Handwriting,
                InfoMap::new(),
                InfoMap::new(),
            )
            .expect("trace accepted")
    }

    /// One complete stroke of three points.
    pub(super) fn stroke(&mut self) -> TraceHandle {
        let t = self.begin();
        for i in 0..3u64 {
            t.add_point(i as f32, i as f32, i * 10).unwrap();
        }
        assert!(self.session.trace_end(&t));
        t
    }

    /// Let the grouping window close and return what was submitted.
    pub(super) fn close_group(&mut self) -> Vec<RecognitionRequest> {
        self.advance(400);
        self.session.tick();
        self.submitted()
    }

    /// A one-stroke word, submitted to the recognizer.
    pub(super) fn draw_word(&mut self) -> AttemptId {
        self.stroke();
        let subs = self.close_group();
        assert_eq!(subs.len(), 1);
        subs[0].attempt
    }

    pub(super) fn answer(&mut self, attempt: AttemptId, words: &[&str]) {
        self.answer_with(attempt, RecognitionOutput::from_words(words.iter().copied()));
    }

    pub(super) fn answer_with(&mut self, attempt: AttemptId, output: RecognitionOutput) {
        self.session.reconcile(Completion::Recognition {
            attempt,
            outcome: Ok(output),
        });
    }

    /// Draw a word and show the recognizer's answer for it.
    pub(super) fn write_word(&mut self, words: &[&str]) -> AttemptId {
        let id = self.draw_word();
        self.answer(id, words);
        id
    }

    pub(super) fn list(&self, list: SelectionListType) -> Vec<String> {
        self.session
            .selection_list(list)
            .map(|l| l.items().iter().map(|i| i.text.clone()).collect())
            .unwrap_or_default()
    }

    pub(super) fn words(&self) -> Vec<String> {
        self.list(SelectionListType::WordCandidates)
    }

    pub(super) fn chars(&self) -> Vec<String> {
        self.list(SelectionListType::CharacterAlternatives)
    }

    pub(super) fn active(&self, list: SelectionListType) -> Option<usize> {
        self.session.selection_list(list).ok().and_then(|l| l.active())
    }
}

pub(super) fn commits(events: &[HostEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            HostEvent::Commit(t) => Some(t.clone()),
            _ => None,
        })
        .collect()
}

pub(super) fn cancels(requests: &[EngineRequest]) -> Vec<AttemptId> {
    requests
        .iter()
        .filter_map(|r| match r {
            EngineRequest::CancelRecognition(id) => Some(*id),
            _ => None,
        })
        .collect()
}
