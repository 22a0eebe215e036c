//! Word dictionaries used to rank and complete recognition candidates.
//!
//! `WordDictionary` maps words to corpus frequencies. Dictionaries are
//! loaded by URI through a `DictionaryLoader` on a worker thread and kept
//! per locale in a `DictionaryRegistry`.

mod io;
mod loader;
mod registry;
#[cfg(test)]
mod tests;
mod word_dict;

pub use loader::{DictionaryLoader, FileDictionaryLoader};
pub use registry::{DictionaryRegistry, LoadOutcome};
pub use word_dict::WordDictionary;

/// Errors raised while loading or storing a dictionary.
#[derive(Debug, thiserror::Error)]
pub enum DictError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid header (too short)")]
    InvalidHeader,

    #[error("invalid magic bytes (expected INKD)")]
    InvalidMagic,

    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),

    #[error("checksum mismatch (expected {expected:08x}, got {actual:08x})")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("serialization error: {0}")]
    Serialize(bincode::Error),

    #[error("deserialization error: {0}")]
    Deserialize(bincode::Error),

    #[error("parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("unsupported URI: {0}")]
    UnsupportedUri(String),
}
