use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use super::{DictError, WordDictionary};

#[derive(Debug, Clone)]
struct PendingLoad {
    locale: String,
    generation: u64,
}

/// What happened to a completed load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Stored and in use for the active locale.
    Activated,
    /// Stored for a locale that is not active right now.
    Cached,
    /// Superseded by a newer load, or never requested. Dropped.
    Stale,
    /// The loader failed; the locale stays without a dictionary.
    Failed,
}

/// Locale → dictionary map owned by the input method.
///
/// Loads complete asynchronously and in any order. Only the newest load
/// issued for a locale may install a dictionary for it.
#[derive(Debug, Default)]
pub struct DictionaryRegistry {
    active_locale: Option<String>,
    loaded: HashMap<String, Arc<WordDictionary>>,
    pending: HashMap<String, PendingLoad>,
    latest: HashMap<String, u64>,
    next_generation: u64,
}

impl DictionaryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_active_locale(&mut self, locale: &str) {
        self.active_locale = Some(locale.to_string());
    }

    pub fn active_locale(&self) -> Option<&str> {
        self.active_locale.as_deref()
    }

    /// Dictionary for the active locale, if one has finished loading.
    pub fn active(&self) -> Option<Arc<WordDictionary>> {
        self.active_locale
            .as_ref()
            .and_then(|l| self.loaded.get(l))
            .cloned()
    }

    pub fn dictionary_for(&self, locale: &str) -> Option<Arc<WordDictionary>> {
        self.loaded.get(locale).cloned()
    }

    pub fn is_loading(&self, locale: &str) -> bool {
        self.pending.values().any(|p| p.locale == locale)
    }

    /// Record a load request. Returns false when the same URI is already
    /// being loaded for this locale, in which case no new request is needed.
    pub fn begin_load(&mut self, locale: &str, uri: &str) -> bool {
        if let Some(p) = self.pending.get(uri) {
            if p.locale == locale && self.latest.get(locale) == Some(&p.generation) {
                return false;
            }
        }
        self.next_generation += 1;
        let generation = self.next_generation;
        self.latest.insert(locale.to_string(), generation);
        self.pending.insert(
            uri.to_string(),
            PendingLoad {
                locale: locale.to_string(),
                generation,
            },
        );
        true
    }

    pub fn complete(
        &mut self,
        uri: &str,
        result: Result<Arc<WordDictionary>, DictError>,
    ) -> LoadOutcome {
        let Some(pending) = self.pending.remove(uri) else {
            debug!(uri, "dictionary completion without a pending load");
            return LoadOutcome::Stale;
        };
        if self.latest.get(&pending.locale) != Some(&pending.generation) {
            debug!(uri, locale = %pending.locale, "dictionary load overtaken by a newer one");
            return LoadOutcome::Stale;
        }
        let dict = match result {
            Ok(d) => d,
            Err(e) => {
                warn!(uri, locale = %pending.locale, error = %e, "dictionary load failed");
                return LoadOutcome::Failed;
            }
        };
        debug!(uri, locale = %pending.locale, words = dict.len(), "dictionary loaded");
        let is_active = self.active_locale.as_deref() == Some(pending.locale.as_str());
        self.loaded.insert(pending.locale, dict);
        if is_active {
            LoadOutcome::Activated
        } else {
            LoadOutcome::Cached
        }
    }
}
