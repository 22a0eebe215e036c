use std::ops::Range;
use std::sync::Arc;

use ink_core::dict::{DictError, WordDictionary};
use ink_core::recognition::{AttemptId, RecognitionOutput, RecognitionRequest, RecognizerError};
use ink_core::selection::SelectionListType;

/// Notification for the host.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// Insert text at the cursor. Replaces (and clears) the pre-edit.
    Commit(String),
    /// Delete this character range of committed text; the cursor moves to
    /// its start. Sent when a committed word is reopened into the pre-edit.
    DeleteSurrounding(Range<usize>),
    PreeditChanged(String),
    SelectionListChanged(SelectionListType),
    SelectionListActiveItemChanged(SelectionListType, Option<usize>),
}

/// Work the session needs done off the owner thread.
#[derive(Debug, Clone)]
pub enum EngineRequest {
    Recognize(RecognitionRequest),
    /// Best effort; a late result for the attempt is dropped regardless.
    CancelRecognition(AttemptId),
    LoadDictionary { locale: String, uri: String },
}

/// Everything produced since the last `take_output`.
#[derive(Debug, Default)]
pub struct SessionOutput {
    pub events: Vec<HostEvent>,
    pub requests: Vec<EngineRequest>,
}

impl SessionOutput {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.requests.is_empty()
    }
}

/// Completion delivered from a worker thread, applied by
/// `TraceInputSession::reconcile` on the owner thread.
#[derive(Debug)]
pub enum Completion {
    Recognition {
        attempt: AttemptId,
        outcome: Result<RecognitionOutput, RecognizerError>,
    },
    Dictionary {
        uri: String,
        result: Result<Arc<WordDictionary>, DictError>,
    },
}
