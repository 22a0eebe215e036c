mod output;
pub use output::*;

use std::collections::HashMap;
use std::ops::BitOr;
use std::time::{Duration, Instant};

use ink_core::modes::PatternRecognitionMode;
use ink_core::recognition::Segmentation;
use ink_core::settings::Settings;
use ink_core::trace::TraceHandle;

/// Key identity. Case is carried by the `text` argument, not the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Backspace,
    Enter,
    Space,
    Escape,
    Shift,
    CapsLock,
    /// Any key producing printable text.
    Character,
    Other(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyModifiers(u8);

impl KeyModifiers {
    pub const NONE: Self = Self(0);
    pub const SHIFT: Self = Self(1);
    pub const CONTROL: Self = Self(2);
    pub const ALT: Self = Self(4);
    pub const META: Self = Self(8);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Ctrl, Alt or Meta: the key is a command, not text input.
    pub fn is_command(self) -> bool {
        self.0 & (Self::CONTROL.0 | Self::ALT.0 | Self::META.0) != 0
    }
}

impl BitOr for KeyModifiers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Which committed word `reselect` may reopen relative to the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReselectFlags(u8);

impl ReselectFlags {
    /// The word ending at, or containing, the cursor.
    pub const WORD_BEFORE_CURSOR: Self = Self(1);
    /// The word starting at, or containing, the cursor.
    pub const WORD_AFTER_CURSOR: Self = Self(2);
    pub const WORD_AT_CURSOR: Self = Self(3);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ReselectFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Coarse state of the input method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    /// Strokes are being drawn or wait for the grouping window to close.
    Capturing,
    /// An attempt is with the recognizer.
    Recognizing,
}

/// Policy knobs, taken from `Settings` so tests can vary them.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub max_active_traces: usize,
    pub max_points: usize,
    pub inactivity_timeout: Duration,
    pub pattern_modes: Vec<PatternRecognitionMode>,
    pub group_window: Duration,
    pub max_strokes: usize,
    pub max_candidates: usize,
    pub word_completions: usize,
    pub reselect_cache_size: usize,
    pub reselect_expiry: Duration,
    pub latin_locales: Vec<String>,
    pub dictionaries: HashMap<String, String>,
}

impl SessionConfig {
    pub fn from_settings(s: &Settings) -> Self {
        Self {
            max_active_traces: s.trace.max_active,
            max_points: s.trace.max_points,
            inactivity_timeout: Duration::from_millis(s.trace.inactivity_timeout_ms),
            pattern_modes: s.recognition.pattern_modes.clone(),
            group_window: Duration::from_millis(s.recognition.group_window_ms),
            max_strokes: s.recognition.max_strokes,
            max_candidates: s.recognition.max_candidates,
            word_completions: s.recognition.word_completions,
            reselect_cache_size: s.reselect.cache_size,
            reselect_expiry: Duration::from_millis(s.reselect.expiry_ms),
            latin_locales: s.locales.latin.clone(),
            dictionaries: s.dictionaries.clone(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_settings(ink_core::settings::settings())
    }
}

/// A trace whose pointer is still down.
pub(crate) struct ActiveTrace {
    pub(crate) handle: TraceHandle,
    seen_len: usize,
    last_change: Instant,
}

impl ActiveTrace {
    pub(crate) fn new(handle: TraceHandle, now: Instant) -> Self {
        Self {
            handle,
            seen_len: 0,
            last_change: now,
        }
    }

    /// Time since the host last appended a point.
    pub(crate) fn idle_for(&mut self, now: Instant) -> Duration {
        let len = self.handle.len();
        if len != self.seen_len {
            self.seen_len = len;
            self.last_change = now;
        }
        now.saturating_duration_since(self.last_change)
    }
}

/// What the pre-edit was recognized from; kept so the committed word can
/// be reselected later.
#[derive(Debug, Clone)]
pub(crate) struct ShownResult {
    pub(crate) alternatives: Vec<String>,
    /// Present only while the pre-edit is the word the segmentation describes.
    pub(crate) segmentation: Option<Segmentation>,
}
