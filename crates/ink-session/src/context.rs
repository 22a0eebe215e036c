use std::ops::Range;

/// The host's text field as far as the input method knows it: committed
/// text and the cursor, in characters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputContext {
    text: String,
    cursor: usize,
}

impl InputContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Sync with the host after edits the input method did not make.
    pub fn set_surrounding_text(&mut self, text: &str, cursor: usize) {
        self.text = text.to_string();
        self.cursor = cursor.min(self.text.chars().count());
    }

    fn byte_offset(&self, char_index: usize) -> Option<usize> {
        if char_index == self.text.chars().count() {
            return Some(self.text.len());
        }
        self.text.char_indices().nth(char_index).map(|(b, _)| b)
    }

    /// Insert at the cursor and move the cursor past the insertion.
    /// Returns the inserted character range.
    pub(crate) fn insert(&mut self, s: &str) -> Range<usize> {
        let start = self.cursor;
        let at = self.byte_offset(start).unwrap_or(self.text.len());
        self.text.insert_str(at, s);
        self.cursor = start + s.chars().count();
        start..self.cursor
    }

    pub(crate) fn slice(&self, range: &Range<usize>) -> Option<&str> {
        let start = self.byte_offset(range.start)?;
        let end = self.byte_offset(range.end)?;
        self.text.get(start..end)
    }

    /// Remove a character range; the cursor moves to where it started.
    pub(crate) fn remove(&mut self, range: &Range<usize>) -> bool {
        let (Some(start), Some(end)) = (self.byte_offset(range.start), self.byte_offset(range.end))
        else {
            return false;
        };
        self.text.replace_range(start..end, "");
        self.cursor = range.start;
        true
    }
}
