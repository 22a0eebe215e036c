use std::path::{Path, PathBuf};

use tracing::debug_span;

use super::{DictError, WordDictionary};

/// Loads a dictionary by URI. Called on the dictionary worker thread; may
/// block on I/O.
pub trait DictionaryLoader: Send + Sync {
    fn load(&self, uri: &str) -> Result<WordDictionary, DictError>;
}

/// Loads `file://` URIs and plain paths. Relative paths resolve against
/// `base_dir` when one is set.
#[derive(Debug, Clone, Default)]
pub struct FileDictionaryLoader {
    base_dir: Option<PathBuf>,
}

impl FileDictionaryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    pub fn resolve(&self, uri: &str) -> Result<PathBuf, DictError> {
        let path = match uri.split_once("://") {
            Some(("file", rest)) => rest,
            Some(_) => return Err(DictError::UnsupportedUri(uri.to_string())),
            None => uri,
        };
        if path.is_empty() {
            return Err(DictError::UnsupportedUri(uri.to_string()));
        }
        let path = Path::new(path);
        Ok(match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        })
    }
}

impl DictionaryLoader for FileDictionaryLoader {
    fn load(&self, uri: &str) -> Result<WordDictionary, DictError> {
        let _span = debug_span!("dictionary_load", uri).entered();
        let path = self.resolve(uri)?;
        WordDictionary::open(&path)
    }
}
