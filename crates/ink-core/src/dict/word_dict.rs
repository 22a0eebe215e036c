use std::collections::BTreeMap;
use std::ops::Bound;

use super::DictError;

/// Immutable word list with frequencies. Replaced wholesale on reload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordDictionary {
    words: BTreeMap<String, u32>,
}

impl WordDictionary {
    /// Build from `(word, frequency)` pairs. Duplicate words keep the
    /// highest frequency.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let mut words = BTreeMap::new();
        for (word, freq) in entries {
            let slot = words.entry(word.into()).or_insert(0u32);
            *slot = (*slot).max(freq);
        }
        words.retain(|w: &String, _| !w.is_empty());
        Self { words }
    }

    /// Parse a plain word list: one `word` or `word<TAB>frequency` per line.
    /// Blank lines and lines starting with `#` are skipped. Words without a
    /// frequency get 1.
    pub fn from_word_list(text: &str) -> Result<Self, DictError> {
        let mut entries = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let mut cols = line.split('\t');
            let word = cols.next().unwrap_or_default().trim();
            let freq = match cols.next() {
                Some(f) => f.trim().parse::<u32>().map_err(|e| DictError::Parse {
                    line: i + 1,
                    reason: format!("bad frequency {f:?}: {e}"),
                })?,
                None => 1,
            };
            if word.is_empty() {
                return Err(DictError::Parse {
                    line: i + 1,
                    reason: "empty word".to_string(),
                });
            }
            entries.push((word.to_string(), freq));
        }
        Ok(Self::from_entries(entries))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains_key(word)
    }

    /// Case-insensitive fallback lookup used for capitalized input.
    pub fn frequency(&self, word: &str) -> Option<u32> {
        self.words.get(word).copied().or_else(|| {
            let lower = word.to_lowercase();
            if lower == word {
                None
            } else {
                self.words.get(&lower).copied()
            }
        })
    }

    /// Words starting with `prefix` (excluding `prefix` itself), most
    /// frequent first, ties in lexical order.
    pub fn predict(&self, prefix: &str, max_results: usize) -> Vec<(String, u32)> {
        if prefix.is_empty() || max_results == 0 {
            return Vec::new();
        }
        let mut found: Vec<(String, u32)> = self
            .words
            .range::<str, _>((Bound::Excluded(prefix), Bound::Unbounded))
            .take_while(|(w, _)| w.starts_with(prefix))
            .map(|(w, &f)| (w.clone(), f))
            .collect();
        found.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        found.truncate(max_results);
        found
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.words.iter().map(|(w, &f)| (w.as_str(), f))
    }

    pub(super) fn entries(&self) -> Vec<(String, u32)> {
        self.words.iter().map(|(w, &f)| (w.clone(), f)).collect()
    }
}
