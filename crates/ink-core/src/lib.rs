//! Data model shared by the trace input method: strokes, selection lists,
//! recognition attempts, word dictionaries and settings.

pub mod dict;
pub mod modes;
pub mod recognition;
pub mod selection;
pub mod settings;
pub mod trace;
