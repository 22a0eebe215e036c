//! Candidate channels shown to the user.
//!
//! Mutations only mark a channel dirty; `SelectionLists::take_events`
//! turns the accumulated changes of one logical operation into at most one
//! `ListChanged` and one `ActiveItemChanged` per channel.

use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SelectionListType {
    WordCandidates,
    CharacterAlternatives,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionRole {
    Display,
    /// Characters the item adds beyond the recognized word.
    WordCompletionLength,
    Confidence,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoleValue {
    Text(String),
    Int(i64),
    Float(f32),
    /// The item has no data for the role.
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionItem {
    pub text: String,
    pub completion_length: usize,
    pub confidence: Option<f32>,
}

impl SelectionItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            completion_length: 0,
            confidence: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_completion_length(mut self, len: usize) -> Self {
        self.completion_length = len;
        self
    }

    pub fn data(&self, role: SelectionRole) -> RoleValue {
        match role {
            SelectionRole::Display => RoleValue::Text(self.text.clone()),
            SelectionRole::WordCompletionLength => RoleValue::Int(self.completion_length as i64),
            SelectionRole::Confidence => match self.confidence {
                Some(c) => RoleValue::Float(c),
                None => RoleValue::Empty,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEvent {
    ListChanged(SelectionListType),
    ActiveItemChanged(SelectionListType, Option<usize>),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("index {index} out of range for {list:?} ({len} items)")]
    IndexOutOfRange {
        list: SelectionListType,
        index: usize,
        len: usize,
    },
    #[error("selection list {0:?} was not declared")]
    UndeclaredList(SelectionListType),
}

#[derive(Debug)]
pub struct SelectionListModel {
    list_type: SelectionListType,
    items: Vec<SelectionItem>,
    active: Option<usize>,
    content_changed: bool,
    /// Active index when the current batch started, if it has changed since.
    active_before: Option<Option<usize>>,
}

impl SelectionListModel {
    fn new(list_type: SelectionListType) -> Self {
        Self {
            list_type,
            items: Vec::new(),
            active: None,
            content_changed: false,
            active_before: None,
        }
    }

    pub fn list_type(&self) -> SelectionListType {
        self.list_type
    }

    pub fn items(&self) -> &[SelectionItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn item(&self, index: usize) -> Result<&SelectionItem, SelectionError> {
        self.items.get(index).ok_or_else(|| {
            let err = SelectionError::IndexOutOfRange {
                list: self.list_type,
                index,
                len: self.items.len(),
            };
            error!(%err, "selection list index out of range");
            err
        })
    }

    fn note_active(&mut self) {
        if self.active_before.is_none() {
            self.active_before = Some(self.active);
        }
    }

    fn replace(&mut self, items: Vec<SelectionItem>, active: Option<usize>) {
        self.note_active();
        self.active = active.filter(|&i| i < items.len());
        self.items = items;
        self.content_changed = true;
    }

    fn clear(&mut self) {
        if self.items.is_empty() && self.active.is_none() {
            return;
        }
        self.replace(Vec::new(), None);
    }

    fn set_active(&mut self, index: Option<usize>) -> Result<(), SelectionError> {
        if let Some(i) = index {
            self.item(i)?;
        }
        self.note_active();
        self.active = index;
        Ok(())
    }

    fn take_events(&mut self, out: &mut Vec<SelectionEvent>) {
        if std::mem::take(&mut self.content_changed) {
            out.push(SelectionEvent::ListChanged(self.list_type));
        }
        if let Some(before) = self.active_before.take() {
            if before != self.active {
                out.push(SelectionEvent::ActiveItemChanged(self.list_type, self.active));
            }
        }
    }
}

/// The set of channels the input method declared at activation.
#[derive(Debug, Default)]
pub struct SelectionLists {
    lists: Vec<SelectionListModel>,
}

impl SelectionLists {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-declare the channels. Previous content is dropped without events;
    /// the host rebuilds its views from the returned declaration.
    pub fn declare(&mut self, types: &[SelectionListType]) {
        self.lists = types.iter().map(|&t| SelectionListModel::new(t)).collect();
    }

    pub fn declared(&self) -> Vec<SelectionListType> {
        self.lists.iter().map(|l| l.list_type).collect()
    }

    pub fn get(&self, list: SelectionListType) -> Result<&SelectionListModel, SelectionError> {
        self.lists
            .iter()
            .find(|l| l.list_type == list)
            .ok_or(SelectionError::UndeclaredList(list))
    }

    fn get_mut(
        &mut self,
        list: SelectionListType,
    ) -> Result<&mut SelectionListModel, SelectionError> {
        self.lists
            .iter_mut()
            .find(|l| l.list_type == list)
            .ok_or(SelectionError::UndeclaredList(list))
    }

    /// Item count; undeclared channels are empty.
    pub fn item_count(&self, list: SelectionListType) -> usize {
        self.get(list).map(|l| l.len()).unwrap_or(0)
    }

    pub fn item_data(
        &self,
        list: SelectionListType,
        index: usize,
        role: SelectionRole,
    ) -> Result<RoleValue, SelectionError> {
        Ok(self.get(list)?.item(index)?.data(role))
    }

    /// Replace a channel's content wholesale. Writes to undeclared channels
    /// are dropped: the host never asked for them.
    pub fn replace(
        &mut self,
        list: SelectionListType,
        items: Vec<SelectionItem>,
        active: Option<usize>,
    ) {
        if let Ok(l) = self.get_mut(list) {
            l.replace(items, active);
        }
    }

    pub fn clear(&mut self, list: SelectionListType) {
        if let Ok(l) = self.get_mut(list) {
            l.clear();
        }
    }

    pub fn clear_all(&mut self) {
        for l in &mut self.lists {
            l.clear();
        }
    }

    pub fn set_active(
        &mut self,
        list: SelectionListType,
        index: Option<usize>,
    ) -> Result<(), SelectionError> {
        self.get_mut(list)?.set_active(index)
    }

    /// Drain coalesced change notifications for the finished operation.
    pub fn take_events(&mut self) -> Vec<SelectionEvent> {
        let mut out = Vec::new();
        for l in &mut self.lists {
            l.take_events(&mut out);
        }
        out
    }
}
