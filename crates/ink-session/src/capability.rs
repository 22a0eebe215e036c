use tracing::{debug, debug_span};

use ink_core::modes::{InputMode, PatternRecognitionMode, TextCase};
use ink_core::selection::{RoleValue, SelectionError, SelectionListType, SelectionRole};
use ink_core::trace::{InfoMap, TraceHandle};

use super::types::{EngineRequest, Key, KeyModifiers, ReselectFlags};
use super::{TraceInputSession, DECLARED_LISTS};

/// The operations a keyboard host drives an input method with.
///
/// Every call runs on the host's thread and returns without waiting for
/// recognition or dictionary loading.
pub trait InputMethod {
    /// Input modes usable for `locale`.
    fn input_modes(&self, locale: &str) -> Vec<InputMode>;
    fn set_input_mode(&mut self, locale: &str, mode: InputMode) -> bool;
    fn set_text_case(&mut self, case: TextCase) -> bool;
    /// `text` carries the produced characters; case is not part of `key`.
    fn key_event(&mut self, key: Key, text: &str, modifiers: KeyModifiers) -> bool;
    /// Discard all transient state without committing.
    fn reset(&mut self);
    /// Commit the pre-edit and return to idle.
    fn update(&mut self);

    fn selection_lists(&mut self) -> Vec<SelectionListType>;
    fn selection_list_item_count(&self, list: SelectionListType) -> usize;
    fn selection_list_data(
        &self,
        list: SelectionListType,
        index: usize,
        role: SelectionRole,
    ) -> Result<RoleValue, SelectionError>;
    fn selection_list_item_selected(
        &mut self,
        list: SelectionListType,
        index: usize,
    ) -> Result<(), SelectionError>;

    fn pattern_recognition_modes(&self) -> Vec<PatternRecognitionMode>;
    fn trace_begin(
        &mut self,
        mode: PatternRecognitionMode,
        device_info: InfoMap,
        screen_info: InfoMap,
    ) -> Option<TraceHandle>;
    fn trace_end(&mut self, trace: &TraceHandle) -> bool;

    fn reselect(&mut self, cursor: usize, flags: ReselectFlags) -> bool;
}

impl InputMethod for TraceInputSession {
    fn input_modes(&self, locale: &str) -> Vec<InputMode> {
        let mut modes = Vec::with_capacity(3);
        if self.config.latin_locales.iter().any(|l| l == locale) {
            modes.push(InputMode::Latin);
        }
        modes.extend([InputMode::Numeric, InputMode::Dialable]);
        modes
    }

    fn set_input_mode(&mut self, locale: &str, mode: InputMode) -> bool {
        let _span = debug_span!("set_input_mode", locale, ?mode).entered();
        if !self.input_modes(locale).contains(&mode) {
            debug!("mode not available for locale");
            return false;
        }
        self.update_state();

        if self.locale.as_deref() != Some(locale) {
            self.locale = Some(locale.to_string());
            self.dictionaries.set_active_locale(locale);
            let loaded = self.dictionaries.dictionary_for(locale).is_some();
            if let Some(uri) = self.config.dictionaries.get(locale).cloned() {
                if !loaded && self.dictionaries.begin_load(locale, &uri) {
                    self.output.requests.push(EngineRequest::LoadDictionary {
                        locale: locale.to_string(),
                        uri,
                    });
                }
            }
        }
        self.input_mode = Some(mode);
        if mode != InputMode::Latin {
            self.text_case = TextCase::Lower;
        }
        self.flush_selection_events();
        true
    }

    fn set_text_case(&mut self, case: TextCase) -> bool {
        if case == TextCase::Upper && self.input_mode != Some(InputMode::Latin) {
            return false;
        }
        self.text_case = case;
        true
    }

    fn key_event(&mut self, key: Key, text: &str, modifiers: KeyModifiers) -> bool {
        self.handle_key(key, text, modifiers)
    }

    fn reset(&mut self) {
        let _span = debug_span!("reset").entered();
        self.reset_state();
        self.flush_selection_events();
    }

    fn update(&mut self) {
        let _span = debug_span!("update").entered();
        self.update_state();
        self.flush_selection_events();
    }

    fn selection_lists(&mut self) -> Vec<SelectionListType> {
        // Re-declaring empties every list; finish the word they belong to.
        self.update_state();
        self.flush_selection_events();
        self.lists.declare(&DECLARED_LISTS);
        self.lists.declared()
    }

    fn selection_list_item_count(&self, list: SelectionListType) -> usize {
        self.lists.item_count(list)
    }

    fn selection_list_data(
        &self,
        list: SelectionListType,
        index: usize,
        role: SelectionRole,
    ) -> Result<RoleValue, SelectionError> {
        self.lists.item_data(list, index, role)
    }

    fn selection_list_item_selected(
        &mut self,
        list: SelectionListType,
        index: usize,
    ) -> Result<(), SelectionError> {
        let _span = debug_span!("item_selected", ?list, index).entered();
        let result = self.select_item(list, index);
        self.flush_selection_events();
        result
    }

    fn pattern_recognition_modes(&self) -> Vec<PatternRecognitionMode> {
        self.config.pattern_modes.clone()
    }

    fn trace_begin(
        &mut self,
        mode: PatternRecognitionMode,
        device_info: InfoMap,
        screen_info: InfoMap,
    ) -> Option<TraceHandle> {
        self.begin_trace(mode, device_info, screen_info)
    }

    fn trace_end(&mut self, trace: &TraceHandle) -> bool {
        self.end_trace(trace)
    }

    fn reselect(&mut self, cursor: usize, flags: ReselectFlags) -> bool {
        let _span = debug_span!("reselect", cursor, ?flags).entered();
        let reopened = self.reselect_at(cursor, flags);
        self.flush_selection_events();
        reopened
    }
}
