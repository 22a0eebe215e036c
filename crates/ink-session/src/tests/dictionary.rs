use std::sync::Arc;

use ink_core::dict::{DictError, WordDictionary};
use ink_core::modes::InputMode;
use ink_core::selection::{RoleValue, SelectionListType, SelectionRole};

use super::{test_config, Harness, EN_GB_URI, FI_FI_URI};
use crate::{EngineRequest, InputMethod};

fn dict(words: &[(&str, u32)]) -> Arc<WordDictionary> {
    Arc::new(WordDictionary::from_entries(words.iter().copied()))
}

fn load_requests(requests: &[EngineRequest]) -> Vec<(String, String)> {
    requests
        .iter()
        .filter_map(|r| match r {
            EngineRequest::LoadDictionary { locale, uri } => Some((locale.clone(), uri.clone())),
            _ => None,
        })
        .collect()
}

#[test]
fn locale_switch_requests_load() {
    let mut h = Harness::bare(test_config());
    assert!(h.session.set_input_mode("en_GB", InputMode::Latin));
    assert_eq!(
        load_requests(&h.take_requests()),
        vec![("en_GB".to_string(), EN_GB_URI.to_string())]
    );

    // Same locale, other mode: nothing to load.
    assert!(h.session.set_input_mode("en_GB", InputMode::Numeric));
    assert!(h.take_requests().is_empty());
    assert!(h.session.dictionaries().is_loading("en_GB"));
}

#[test]
fn locale_without_dictionary() {
    let mut h = Harness::new();
    assert!(h.session.set_input_mode("en_US", InputMode::Latin));
    assert!(load_requests(&h.take_requests()).is_empty());
    assert!(h.session.dictionaries().active().is_none());
}

#[test]
fn loaded_dictionary_reaches_recognizer() {
    let mut h = Harness::with_dictionary(&[("cat", 4)]);
    assert!(h.session.dictionaries().active().is_some());
    h.stroke();
    let subs = h.close_group();
    let d = subs[0].dictionary.as_ref().unwrap();
    assert!(d.contains("cat"));
}

#[test]
fn late_load_for_previous_locale_is_not_used() {
    let mut h = Harness::new();
    assert!(h.session.set_input_mode("fi_FI", InputMode::Latin));
    assert_eq!(
        load_requests(&h.take_requests()),
        vec![("fi_FI".to_string(), FI_FI_URI.to_string())]
    );

    // en_GB finishes after the switch.
    h.session
        .dictionary_load_completed(EN_GB_URI, Ok(dict(&[("car", 9)])));
    assert!(h.session.dictionaries().active().is_none());
    h.write_word(&["cat", "car"]);
    assert_eq!(h.words(), ["cat", "car"]);
    h.session.update();

    h.session
        .dictionary_load_completed(FI_FI_URI, Ok(dict(&[("kissa", 9)])));
    assert!(h.session.dictionaries().active().unwrap().contains("kissa"));

    // Back to en_GB: the cached dictionary is used without a new load.
    assert!(h.session.set_input_mode("en_GB", InputMode::Latin));
    assert!(load_requests(&h.take_requests()).is_empty());
    assert!(h.session.dictionaries().active().unwrap().contains("car"));
}

#[test]
fn failed_load_leaves_recognition_working() {
    let mut h = Harness::new();
    h.session.dictionary_load_completed(
        EN_GB_URI,
        Err(DictError::UnsupportedUri("file:///dict/en_GB.inkd".into())),
    );
    assert!(h.session.dictionaries().active().is_none());
    assert!(!h.session.dictionaries().is_loading("en_GB"));
    h.write_word(&["cat"]);
    assert_eq!(h.session.preedit(), "cat");
}

#[test]
fn dictionary_ranks_and_completes() {
    let mut h = Harness::with_dictionary(&[("car", 10), ("cart", 5), ("care", 3), ("card", 1)]);
    h.write_word(&["cat", "car"]);
    assert_eq!(h.session.preedit(), "car");
    assert_eq!(h.words(), ["car", "cat", "cart", "care"]);
    assert_eq!(
        h.session.selection_list_data(
            SelectionListType::WordCandidates,
            2,
            SelectionRole::WordCompletionLength
        ),
        Ok(RoleValue::Int(1))
    );
    assert_eq!(
        h.session.selection_list_data(
            SelectionListType::WordCandidates,
            1,
            SelectionRole::WordCompletionLength
        ),
        Ok(RoleValue::Int(0))
    );
}

#[test]
fn no_completions_outside_latin() {
    let mut h = Harness::with_dictionary(&[("12", 1), ("123", 1)]);
    assert!(h.session.set_input_mode("en_GB", InputMode::Numeric));
    h.write_word(&["12"]);
    assert_eq!(h.words(), ["12"]);
}
