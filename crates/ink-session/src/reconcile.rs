//! Applying worker completions on the owner thread.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, debug_span, warn};

use ink_core::dict::{DictError, LoadOutcome, WordDictionary};
use ink_core::modes::{InputMode, TextCase};
use ink_core::recognition::{
    AttemptId, RecognitionOutput, RecognizedCandidate, RecognizerError, Segmentation,
};
use ink_core::selection::{SelectionItem, SelectionListType};

use super::types::{Completion, ShownResult};
use super::TraceInputSession;

/// Order recognizer candidates for display: words the dictionary knows come
/// first, recognizer order is kept otherwise. Case is applied before
/// duplicates are dropped.
pub(crate) fn rank_candidates(
    candidates: &[RecognizedCandidate],
    dictionary: Option<&WordDictionary>,
    case: TextCase,
    max: usize,
) -> Vec<RecognizedCandidate> {
    let mut seen = HashSet::new();
    let mut ranked: Vec<(bool, RecognizedCandidate)> = candidates
        .iter()
        .filter_map(|c| {
            let text = case.apply(&c.text);
            if text.is_empty() || !seen.insert(text.clone()) {
                return None;
            }
            let known = dictionary.is_some_and(|d| d.frequency(&text).is_some());
            Some((known, RecognizedCandidate::new(text, c.confidence)))
        })
        .collect();
    ranked.sort_by_key(|(known, _)| !*known);
    ranked.truncate(max);
    ranked.into_iter().map(|(_, c)| c).collect()
}

impl TraceInputSession {
    /// Apply a worker completion. Results of cancelled or superseded
    /// attempts are dropped here.
    pub fn reconcile(&mut self, completion: Completion) {
        let _span = debug_span!("reconcile").entered();
        match completion {
            Completion::Recognition { attempt, outcome } => {
                self.apply_recognition(attempt, outcome)
            }
            Completion::Dictionary { uri, result } => self.apply_dictionary(&uri, result),
        }
        self.flush_selection_events();
    }

    pub fn dictionary_load_completed(
        &mut self,
        uri: &str,
        result: Result<Arc<WordDictionary>, DictError>,
    ) {
        self.reconcile(Completion::Dictionary {
            uri: uri.to_string(),
            result,
        });
    }

    fn apply_recognition(
        &mut self,
        attempt: AttemptId,
        outcome: Result<RecognitionOutput, RecognizerError>,
    ) {
        match self.recognition.complete(attempt, outcome) {
            None => {}
            Some(Err(e)) => warn!(%attempt, error = %e, "recognition failed"),
            Some(Ok(output)) => self.show_result(output),
        }
    }

    fn apply_dictionary(&mut self, uri: &str, result: Result<Arc<WordDictionary>, DictError>) {
        match self.dictionaries.complete(uri, result) {
            LoadOutcome::Activated => debug!(uri, "dictionary active"),
            LoadOutcome::Cached | LoadOutcome::Stale | LoadOutcome::Failed => {}
        }
    }

    fn show_result(&mut self, output: RecognitionOutput) {
        // The word still composing came from an earlier attempt; this result
        // starts the next one.
        if !self.preedit.is_empty() {
            self.commit_preedit();
        }
        let dictionary = self.dictionaries.active();
        let words = rank_candidates(
            &output.candidates,
            dictionary.as_deref(),
            self.text_case,
            self.config.max_candidates,
        );
        let Some(best) = words.first().map(|c| c.text.clone()) else {
            debug!("recognizer returned no candidates");
            self.shown = None;
            self.lists.clear_all();
            return;
        };

        let mut items: Vec<SelectionItem> = words
            .iter()
            .map(|c| SelectionItem::new(c.text.as_str()).with_confidence(c.confidence))
            .collect();
        if self.input_mode == Some(InputMode::Latin) {
            if let Some(d) = &dictionary {
                self.append_completions(&mut items, d, &best);
            }
        }

        // Segment ranges refer to the recognizer's top word; they only hold
        // while that word is what the pre-edit shows.
        let top = output
            .candidates
            .first()
            .map(|c| self.text_case.apply(&c.text));
        let segmentation = output
            .segmentation
            .filter(|_| top.as_deref() == Some(best.as_str()));

        debug!(%best, candidates = items.len(), "recognition shown");
        let alternatives = items.iter().map(|i| i.text.clone()).collect();
        self.lists
            .replace(SelectionListType::WordCandidates, items, None);
        self.show_char_alternatives(segmentation.as_ref(), &best);
        self.shown = Some(ShownResult {
            alternatives,
            segmentation,
        });
        self.set_preedit(best);
    }

    fn append_completions(&self, items: &mut Vec<SelectionItem>, d: &WordDictionary, best: &str) {
        let prefix = best.to_lowercase();
        let prefix_len = best.chars().count();
        let mut added = 0;
        for (word, _) in d.predict(&prefix, self.config.word_completions + items.len()) {
            if added == self.config.word_completions {
                break;
            }
            let text = self.text_case.apply(&word);
            if items.iter().any(|i| i.text == text) {
                continue;
            }
            let extra = text.chars().count().saturating_sub(prefix_len);
            items.push(SelectionItem::new(text).with_completion_length(extra));
            added += 1;
        }
    }

    /// Fill the character alternatives list from the last segment of the
    /// shown word, or clear it when there is none.
    pub(crate) fn show_char_alternatives(&mut self, segmentation: Option<&Segmentation>, word: &str) {
        let list = SelectionListType::CharacterAlternatives;
        let Some(segment) = segmentation
            .and_then(|s| s.segments.last())
            .filter(|s| !s.alternatives.is_empty())
        else {
            self.lists.clear(list);
            return;
        };
        let current: String = word
            .chars()
            .skip(segment.range.start)
            .take(segment.range.len())
            .collect();
        let alternatives: Vec<String> = segment
            .alternatives
            .iter()
            .map(|a| self.text_case.apply(a))
            .collect();
        let active = alternatives.iter().position(|a| *a == current);
        let items = alternatives.into_iter().map(SelectionItem::new).collect();
        self.lists.replace(list, items, active);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cands(words: &[&str]) -> Vec<RecognizedCandidate> {
        words
            .iter()
            .map(|w| RecognizedCandidate::new(*w, 0.5))
            .collect()
    }

    fn texts(c: &[RecognizedCandidate]) -> Vec<&str> {
        c.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn known_words_first() {
        let d = WordDictionary::from_entries([("car", 5), ("cap", 1)]);
        let r = rank_candidates(&cands(&["cat", "car", "cxp", "cap"]), Some(&d), TextCase::Lower, 10);
        assert_eq!(texts(&r), ["car", "cap", "cat", "cxp"]);
    }

    #[test]
    fn recognizer_order_without_dictionary() {
        let r = rank_candidates(&cands(&["cat", "car", "cap"]), None, TextCase::Lower, 2);
        assert_eq!(texts(&r), ["cat", "car"]);
    }

    #[test]
    fn case_applied_then_deduplicated() {
        let r = rank_candidates(&cands(&["cat", "Cat", "", "car"]), None, TextCase::Upper, 10);
        assert_eq!(texts(&r), ["CAT", "CAR"]);
    }
}
