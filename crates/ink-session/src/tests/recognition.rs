use ink_core::modes::{InputMode, PatternRecognitionMode};
use ink_core::recognition::{AttemptStatus, RecognitionOutput, RecognizerError};
use ink_core::trace::InfoMap;

use super::{cancels, commits, test_config, Harness};
use crate::{Completion, EngineRequest, InputMethod, Key, KeyModifiers, Stage};

#[test]
fn request_carries_context() {
    let mut h = Harness::new();
    h.stroke();
    let subs = h.close_group();
    let req = &subs[0];
    assert_eq!(req.locale, "en_GB");
    assert_eq!(req.input_mode, InputMode::Latin);
    assert_eq!(req.pattern_mode, PatternRecognitionMode::Handwriting);
    assert_eq!(req.max_candidates, 5);
    assert!(req.dictionary.is_none());
    assert_eq!(h.session.awaiting_attempt(), Some(req.attempt));
}

#[test]
fn result_after_cancel_is_dropped() {
    let mut h = Harness::new();
    let id = h.draw_word();
    assert!(h.session.key_event(Key::Backspace, "", KeyModifiers::NONE));
    assert_eq!(cancels(&h.take_requests()), vec![id]);
    assert_eq!(h.session.attempt_status(id), Some(AttemptStatus::Cancelled));
    h.take_events();

    h.answer(id, &["cat"]);
    assert!(h.take_events().is_empty());
    assert_eq!(h.session.preedit(), "");
    assert!(h.words().is_empty());
    assert_eq!(h.session.attempt_status(id), Some(AttemptStatus::Cancelled));
}

#[test]
fn result_after_update_is_dropped() {
    let mut h = Harness::new();
    let id = h.draw_word();
    h.session.update();
    assert_eq!(cancels(&h.take_requests()), vec![id]);
    assert_eq!(h.session.stage(), Stage::Idle);
    h.answer(id, &["cat"]);
    assert_eq!(h.session.preedit(), "");
    assert!(commits(&h.take_events()).is_empty());
}

#[test]
fn superseded_result_is_dropped() {
    let mut h = Harness::new();
    let first = h.draw_word();
    h.session.reset();
    h.take_requests();
    let second = h.draw_word();
    assert!(second > first);

    h.answer(first, &["old"]);
    assert_eq!(h.session.preedit(), "");
    h.answer(second, &["new"]);
    assert_eq!(h.session.preedit(), "new");
}

#[test]
fn failure_shows_nothing() {
    let mut h = Harness::new();
    let id = h.draw_word();
    h.take_events();
    h.session.reconcile(Completion::Recognition {
        attempt: id,
        outcome: Err(RecognizerError::Engine("model missing".into())),
    });
    assert!(h.take_events().is_empty());
    assert_eq!(h.session.attempt_status(id), Some(AttemptStatus::Failed));
    assert_eq!(h.session.stage(), Stage::Idle);
    // The session keeps accepting input.
    h.write_word(&["cat"]);
    assert_eq!(h.session.preedit(), "cat");
}

#[test]
fn empty_result_clears_lists() {
    let mut h = Harness::new();
    h.write_word(&["cat", "car"]);
    h.session.update();
    h.take_events();

    let id = h.draw_word();
    h.answer_with(id, RecognitionOutput::from_words(Vec::<String>::new()));
    assert!(h.words().is_empty());
    assert_eq!(h.session.preedit(), "");
    assert_eq!(h.session.attempt_status(id), Some(AttemptStatus::Completed));
}

#[test]
fn duplicate_completion_is_ignored() {
    let mut h = Harness::new();
    let id = h.write_word(&["cat"]);
    h.take_events();
    h.answer(id, &["dog"]);
    assert_eq!(h.session.preedit(), "cat");
    assert!(h.take_events().is_empty());
}

#[test]
fn late_stroke_regroups_running_attempt() {
    let mut config = test_config();
    config.max_strokes = 2;
    let mut h = Harness::with_config(config);
    h.stroke();
    // Submitted as the window closes; a stroke starting now still belongs
    // to the group.
    let first = h.close_group();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].traces.len(), 1);

    let t = h.begin();
    let requests = h.take_requests();
    assert_eq!(cancels(&requests), vec![first[0].attempt]);
    t.add_point(0.0, 0.0, 0).unwrap();
    assert!(h.session.trace_end(&t));
    let second = h.submitted();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].traces.len(), 2);
    assert_eq!(
        h.session.attempt_status(first[0].attempt),
        Some(AttemptStatus::Cancelled)
    );
}

#[test]
fn full_attempt_is_not_regrouped() {
    let mut config = test_config();
    config.max_strokes = 1;
    let mut h = Harness::with_config(config);
    h.stroke();
    let first = h.submitted();
    assert_eq!(first.len(), 1);

    h.advance(100);
    assert!(h
        .session
        .trace_begin(PatternRecognitionMode::Handwriting, InfoMap::new(), InfoMap::new())
        .is_none());
    assert!(cancels(&h.take_requests()).is_empty());
    assert_eq!(h.session.awaiting_attempt(), Some(first[0].attempt));
    assert_eq!(
        h.session.attempt_status(first[0].attempt),
        Some(AttemptStatus::AwaitingRecognizer)
    );

    h.answer(first[0].attempt, &["i"]);
    h.stroke();
    let next = h.submitted();
    assert_eq!(next.len(), 1);
    assert_eq!(next[0].traces.len(), 1);
}

#[test]
fn unrelated_stroke_is_refused_while_recognizing() {
    let mut h = Harness::new();
    let id = h.draw_word();
    h.advance(1);
    assert!(h
        .session
        .trace_begin(PatternRecognitionMode::Handwriting, InfoMap::new(), InfoMap::new())
        .is_none());
    assert_eq!(h.session.awaiting_attempt(), Some(id));
    assert!(cancels(&h.take_requests()).is_empty());
}

#[test]
fn numeric_mode_request() {
    let mut h = Harness::new();
    assert!(h.session.set_input_mode("en_GB", InputMode::Numeric));
    h.stroke();
    let subs = h.close_group();
    assert_eq!(subs[0].input_mode, InputMode::Numeric);
    let id = subs[0].attempt;
    h.answer(id, &["42"]);
    assert_eq!(h.session.preedit(), "42");
}

#[test]
fn stage_follows_attempt() {
    let mut h = Harness::new();
    assert_eq!(h.session.stage(), Stage::Idle);
    h.stroke();
    assert_eq!(h.session.stage(), Stage::Capturing);
    let id = h.close_group()[0].attempt;
    assert_eq!(h.session.stage(), Stage::Recognizing);
    h.answer(id, &["cat"]);
    assert_eq!(h.session.stage(), Stage::Idle);
    assert!(h
        .take_requests()
        .iter()
        .all(|r| !matches!(r, EngineRequest::CancelRecognition(_))));
}
