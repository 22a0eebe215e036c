//! Grouping of finished strokes into recognition attempts, and the
//! bookkeeping that keeps at most one attempt with the recognizer.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use ink_core::modes::PatternRecognitionMode;
use ink_core::recognition::{
    AttemptId, AttemptStatus, RecognitionAttempt, RecognitionOutput, RecognizerError,
};
use ink_core::trace::{SealedTrace, TraceHandle, TraceId};

const STATUS_HISTORY: usize = 32;

/// A finished stroke. The handle is kept so the host-visible trace stays
/// alive (and can be marked canceled) until its attempt is resolved.
pub(crate) struct Stroke {
    pub(crate) sealed: Arc<SealedTrace>,
    pub(crate) handle: TraceHandle,
}

struct InFlight {
    attempt: RecognitionAttempt,
    strokes: Vec<Stroke>,
}

pub(crate) struct Submission {
    pub(crate) attempt: AttemptId,
    pub(crate) pattern_mode: PatternRecognitionMode,
    pub(crate) traces: Vec<Arc<SealedTrace>>,
    /// Attempt that was in flight and got superseded.
    pub(crate) cancelled: Option<AttemptId>,
}

pub(crate) struct RecognitionSession {
    next_id: u64,
    pending: Vec<Stroke>,
    last_stroke_end: Option<Instant>,
    in_flight: Option<InFlight>,
    history: VecDeque<(AttemptId, AttemptStatus)>,
}

fn advance(attempt: &mut RecognitionAttempt, next: AttemptStatus) {
    if let Err(e) = attempt.transition(next) {
        warn!(error = %e, "attempt status not advanced");
    }
}

impl RecognitionSession {
    pub(crate) fn new() -> Self {
        Self {
            next_id: 0,
            pending: Vec::new(),
            last_stroke_end: None,
            in_flight: None,
            history: VecDeque::new(),
        }
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub(crate) fn is_awaiting(&self) -> bool {
        self.in_flight.is_some()
    }

    pub(crate) fn awaiting_id(&self) -> Option<AttemptId> {
        self.in_flight.as_ref().map(|f| f.attempt.id())
    }

    pub(crate) fn pending_mode(&self) -> Option<PatternRecognitionMode> {
        self.pending.first().map(|s| s.sealed.mode)
    }

    pub(crate) fn in_flight_mode(&self) -> Option<PatternRecognitionMode> {
        self.in_flight.as_ref().map(|f| f.attempt.pattern_mode())
    }

    pub(crate) fn in_flight_len(&self) -> usize {
        self.in_flight.as_ref().map_or(0, |f| f.strokes.len())
    }

    pub(crate) fn push_stroke(&mut self, stroke: Stroke, now: Instant) {
        debug!(trace = %stroke.sealed.id, points = stroke.sealed.points.len(), "stroke grouped");
        self.pending.push(stroke);
        self.last_stroke_end = Some(now);
    }

    /// True once the grouping window after the last stroke has closed.
    pub(crate) fn group_expired(&self, now: Instant, window: Duration) -> bool {
        self.has_pending()
            && self
                .last_stroke_end
                .map_or(true, |t| now.saturating_duration_since(t) >= window)
    }

    /// True while a new stroke would still belong to the last group.
    pub(crate) fn within_window(&self, now: Instant, window: Duration) -> bool {
        self.last_stroke_end
            .is_some_and(|t| now.saturating_duration_since(t) <= window)
    }

    /// Undo the last finished stroke of the open group.
    pub(crate) fn pop_pending(&mut self) -> Option<TraceId> {
        let stroke = self.pending.pop()?;
        stroke.handle.discard();
        if self.pending.is_empty() {
            self.last_stroke_end = None;
        }
        Some(stroke.sealed.id)
    }

    pub(crate) fn discard_pending(&mut self) -> usize {
        let n = self.pending.len();
        for s in self.pending.drain(..) {
            s.handle.discard();
        }
        self.last_stroke_end = None;
        n
    }

    /// Close the open group into a new attempt. Any attempt still with the
    /// recognizer is cancelled first.
    pub(crate) fn submit(&mut self) -> Option<Submission> {
        let pattern_mode = self.pending_mode()?;
        let cancelled = self.cancel_in_flight();
        let strokes = std::mem::take(&mut self.pending);

        self.next_id += 1;
        let id = AttemptId(self.next_id);
        let trace_ids = strokes.iter().map(|s| s.sealed.id).collect();
        let mut attempt = RecognitionAttempt::new(id, trace_ids, pattern_mode);
        advance(&mut attempt, AttemptStatus::AwaitingRecognizer);
        self.record(id, attempt.status());

        let traces = strokes.iter().map(|s| Arc::clone(&s.sealed)).collect();
        self.in_flight = Some(InFlight { attempt, strokes });
        Some(Submission {
            attempt: id,
            pattern_mode,
            traces,
            cancelled,
        })
    }

    /// Cancel the attempt with the recognizer and drop its strokes.
    pub(crate) fn cancel_in_flight(&mut self) -> Option<AttemptId> {
        let mut f = self.in_flight.take()?;
        advance(&mut f.attempt, AttemptStatus::Cancelled);
        for s in &f.strokes {
            s.handle.discard();
        }
        let id = f.attempt.id();
        self.record(id, f.attempt.status());
        debug!(attempt = %id, "attempt cancelled");
        Some(id)
    }

    /// Cancel the attempt with the recognizer but keep its strokes: they
    /// reopen the group so a late stroke can join them.
    pub(crate) fn regroup(&mut self) -> Option<AttemptId> {
        let mut f = self.in_flight.take()?;
        advance(&mut f.attempt, AttemptStatus::Cancelled);
        let id = f.attempt.id();
        self.record(id, f.attempt.status());
        debug!(attempt = %id, strokes = f.strokes.len(), "attempt regrouped");
        f.strokes.append(&mut self.pending);
        self.pending = f.strokes;
        Some(id)
    }

    /// Resolve the in-flight attempt. Results for any other attempt are
    /// stale and yield `None`.
    pub(crate) fn complete(
        &mut self,
        id: AttemptId,
        outcome: Result<RecognitionOutput, RecognizerError>,
    ) -> Option<Result<RecognitionOutput, RecognizerError>> {
        if self.awaiting_id() != Some(id) {
            debug!(attempt = %id, "dropping result of stale attempt");
            return None;
        }
        let mut f = self.in_flight.take()?;
        let next = if outcome.is_ok() {
            AttemptStatus::Completed
        } else {
            AttemptStatus::Failed
        };
        advance(&mut f.attempt, next);
        self.record(id, f.attempt.status());
        Some(outcome)
    }

    pub(crate) fn status(&self, id: AttemptId) -> Option<AttemptStatus> {
        if let Some(f) = &self.in_flight {
            if f.attempt.id() == id {
                return Some(f.attempt.status());
            }
        }
        self.history
            .iter()
            .rev()
            .find(|(h, _)| *h == id)
            .map(|(_, s)| *s)
    }

    fn record(&mut self, id: AttemptId, status: AttemptStatus) {
        if let Some(entry) = self.history.iter_mut().find(|(h, _)| *h == id) {
            entry.1 = status;
            return;
        }
        if self.history.len() == STATUS_HISTORY {
            self.history.pop_front();
        }
        self.history.push_back((id, status));
    }
}
