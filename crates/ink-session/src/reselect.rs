//! Reopening recently committed words for correction.

use std::collections::VecDeque;
use std::ops::Range;
use std::time::{Duration, Instant};

use tracing::debug;

use ink_core::recognition::Segmentation;
use ink_core::selection::{SelectionItem, SelectionListType};

use super::context::InputContext;
use super::types::{HostEvent, ReselectFlags, ShownResult};
use super::TraceInputSession;

/// A committed word and the recognition metadata needed to reopen it.
#[derive(Debug, Clone)]
pub(crate) struct ReselectSpan {
    /// Character range in the input context.
    pub(crate) range: Range<usize>,
    pub(crate) text: String,
    pub(crate) alternatives: Vec<String>,
    pub(crate) segmentation: Option<Segmentation>,
    pub(crate) committed_at: Instant,
}

impl ReselectSpan {
    fn matches(&self, cursor: usize, flags: ReselectFlags) -> bool {
        let r = &self.range;
        (flags.contains(ReselectFlags::WORD_BEFORE_CURSOR) && r.start < cursor && cursor <= r.end)
            || (flags.contains(ReselectFlags::WORD_AFTER_CURSOR)
                && r.start <= cursor
                && cursor < r.end)
    }
}

/// Bounded, most-recent-last cache of committed spans.
#[derive(Debug)]
pub(crate) struct ReselectCache {
    spans: VecDeque<ReselectSpan>,
    capacity: usize,
}

impl ReselectCache {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            spans: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.spans.len()
    }

    pub(crate) fn record(&mut self, span: ReselectSpan) {
        if self.spans.len() == self.capacity {
            self.spans.pop_front();
        }
        self.spans.push_back(span);
    }

    /// Text of `len` chars was inserted at `at`: spans split by the
    /// insertion are forgotten, later ones shift right.
    pub(crate) fn on_insert(&mut self, at: usize, len: usize) {
        self.spans
            .retain(|s| !(s.range.start < at && at < s.range.end));
        for s in self.spans.iter_mut().filter(|s| s.range.start >= at) {
            s.range = s.range.start + len..s.range.end + len;
        }
    }

    /// A range was removed: overlapping spans are forgotten, later ones
    /// shift left.
    pub(crate) fn on_remove(&mut self, removed: &Range<usize>) {
        let len = removed.len();
        self.spans
            .retain(|s| s.range.end <= removed.start || s.range.start >= removed.end);
        for s in self.spans.iter_mut().filter(|s| s.range.start >= removed.end) {
            s.range = s.range.start - len..s.range.end - len;
        }
    }

    pub(crate) fn purge_expired(&mut self, now: Instant, expiry: Duration) {
        self.spans
            .retain(|s| now.saturating_duration_since(s.committed_at) < expiry);
    }

    /// Remove and return the newest span at the cursor whose text is still
    /// in the context unchanged.
    pub(crate) fn take_match(
        &mut self,
        cursor: usize,
        flags: ReselectFlags,
        context: &InputContext,
    ) -> Option<ReselectSpan> {
        let pos = self.spans.iter().rposition(|s| {
            s.matches(cursor, flags) && context.slice(&s.range) == Some(s.text.as_str())
        })?;
        self.spans.remove(pos)
    }
}

impl TraceInputSession {
    pub(crate) fn reselect_at(&mut self, cursor: usize, flags: ReselectFlags) -> bool {
        if !self.preedit.is_empty() || self.stage() != super::Stage::Idle {
            debug!("reselect while composing");
            return false;
        }
        self.reselect
            .purge_expired(self.clock.now(), self.config.reselect_expiry);
        let Some(span) = self.reselect.take_match(cursor, flags, &self.context) else {
            return false;
        };
        if !self.context.remove(&span.range) {
            return false;
        }
        self.reselect.on_remove(&span.range);
        debug!(text = %span.text, "word reopened");
        self.output
            .events
            .push(HostEvent::DeleteSurrounding(span.range.clone()));

        let active = span.alternatives.iter().position(|a| *a == span.text);
        let items = span.alternatives.iter().map(SelectionItem::new).collect();
        self.lists
            .replace(SelectionListType::WordCandidates, items, active);
        self.show_char_alternatives(span.segmentation.as_ref(), &span.text);
        self.shown = Some(ShownResult {
            alternatives: span.alternatives,
            segmentation: span.segmentation,
        });
        self.set_preedit(span.text);
        true
    }
}
