//! Recognition attempts and the contract of the external recognizer engine.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use crate::dict::WordDictionary;
use crate::modes::{InputMode, PatternRecognitionMode};
use crate::trace::{SealedTrace, TraceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttemptId(pub u64);

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attempt-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptStatus {
    Pending,
    AwaitingRecognizer,
    Completed,
    Failed,
    Cancelled,
}

impl AttemptStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Statuses only move forward; cancellation is possible until the
    /// recognizer has answered.
    pub fn can_transition_to(self, next: AttemptStatus) -> bool {
        use AttemptStatus::*;
        matches!(
            (self, next),
            (Pending, AwaitingRecognizer)
                | (Pending, Cancelled)
                | (Pending, Failed)
                | (AwaitingRecognizer, Completed)
                | (AwaitingRecognizer, Failed)
                | (AwaitingRecognizer, Cancelled)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{id}: illegal status transition {from:?} -> {to:?}")]
pub struct AttemptError {
    pub id: AttemptId,
    pub from: AttemptStatus,
    pub to: AttemptStatus,
}

/// One or more traces grouped for a single recognition pass.
#[derive(Debug, Clone)]
pub struct RecognitionAttempt {
    id: AttemptId,
    trace_ids: Vec<TraceId>,
    pattern_mode: PatternRecognitionMode,
    status: AttemptStatus,
}

impl RecognitionAttempt {
    pub fn new(id: AttemptId, trace_ids: Vec<TraceId>, pattern_mode: PatternRecognitionMode) -> Self {
        Self {
            id,
            trace_ids,
            pattern_mode,
            status: AttemptStatus::Pending,
        }
    }

    pub fn id(&self) -> AttemptId {
        self.id
    }

    pub fn trace_ids(&self) -> &[TraceId] {
        &self.trace_ids
    }

    pub fn pattern_mode(&self) -> PatternRecognitionMode {
        self.pattern_mode
    }

    pub fn status(&self) -> AttemptStatus {
        self.status
    }

    pub fn transition(&mut self, next: AttemptStatus) -> Result<(), AttemptError> {
        if !self.status.can_transition_to(next) {
            return Err(AttemptError {
                id: self.id,
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedCandidate {
    pub text: String,
    /// Engine-specific score, higher is better. Only used for display.
    pub confidence: f32,
}

impl RecognizedCandidate {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// One recognized character of the best candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct CharSegment {
    /// Character offsets into the best candidate.
    pub range: Range<usize>,
    /// Alternative readings of this character, best first.
    pub alternatives: Vec<String>,
    pub trace_ids: Vec<TraceId>,
}

/// Per-character structure of the best candidate, kept for reselection and
/// for the character-alternatives list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Segmentation {
    pub segments: Vec<CharSegment>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecognitionOutput {
    /// Best first.
    pub candidates: Vec<RecognizedCandidate>,
    pub segmentation: Option<Segmentation>,
}

impl RecognitionOutput {
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            candidates: words
                .into_iter()
                .map(|w| RecognizedCandidate::new(w, 0.0))
                .collect(),
            segmentation: None,
        }
    }
}

/// Everything the recognizer needs for one attempt. Cheap to clone.
#[derive(Debug, Clone)]
pub struct RecognitionRequest {
    pub attempt: AttemptId,
    pub pattern_mode: PatternRecognitionMode,
    pub input_mode: InputMode,
    pub locale: String,
    pub traces: Vec<Arc<SealedTrace>>,
    /// Language model for the locale, when it has finished loading.
    pub dictionary: Option<Arc<WordDictionary>>,
    pub max_candidates: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecognizerError {
    #[error("recognizer unavailable")]
    Unavailable,
    #[error("input rejected: {0}")]
    Rejected(String),
    #[error("engine error: {0}")]
    Engine(String),
}

/// The external stroke-recognition engine. Called on a worker thread; may
/// block for as long as recognition takes.
pub trait Recognizer: Send + Sync {
    fn recognize(&self, request: &RecognitionRequest) -> Result<RecognitionOutput, RecognizerError>;
}

/// Stand-in used when no engine is installed.
pub struct UnavailableRecognizer;

impl Recognizer for UnavailableRecognizer {
    fn recognize(&self, _request: &RecognitionRequest) -> Result<RecognitionOutput, RecognizerError> {
        Err(RecognizerError::Unavailable)
    }
}
