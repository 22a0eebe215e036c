//! Global settings loaded from TOML.
//!
//! - `init_custom(toml_content)` sets a custom TOML before first `settings()` call
//! - `settings()` returns `&'static Settings` (lazy-init singleton)
//! - Default values are embedded via `include_str!("default_settings.toml")`

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::Deserialize;

use crate::modes::PatternRecognitionMode;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

/// Set custom TOML before first `settings()` call.
pub fn init_custom(toml_content: String) -> Result<(), SettingsError> {
    parse_settings_toml(&toml_content)?;
    CUSTOM_TOML
        .set(toml_content)
        .map_err(|_| SettingsError::AlreadyInitialized)
}

/// Get or initialize the global settings singleton.
pub fn settings() -> &'static Settings {
    static INSTANCE: OnceLock<Settings> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        let parsed = CUSTOM_TOML
            .get()
            .map(|s| parse_settings_toml(s))
            .unwrap_or_else(|| parse_settings_toml(DEFAULT_SETTINGS_TOML));
        // Custom TOML was validated in init_custom and the default is checked
        // by build.rs and the tests below, so this only falls back in theory.
        parsed.unwrap_or_else(|e| {
            tracing::error!(error = %e, "settings rejected, using built-in policy");
            Settings::fallback()
        })
    })
}

/// Returns the embedded default settings TOML content.
pub fn default_toml() -> &'static str {
    DEFAULT_SETTINGS_TOML
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("settings already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub trace: TraceSettings,
    pub recognition: RecognitionSettings,
    pub reselect: ReselectSettings,
    pub locales: LocaleSettings,
    /// locale → dictionary URI
    #[serde(default)]
    pub dictionaries: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TraceSettings {
    pub max_active: usize,
    pub max_points: usize,
    pub inactivity_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecognitionSettings {
    pub pattern_modes: Vec<PatternRecognitionMode>,
    pub group_window_ms: u64,
    pub max_strokes: usize,
    pub max_candidates: usize,
    pub word_completions: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReselectSettings {
    pub cache_size: usize,
    pub expiry_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocaleSettings {
    pub latin: Vec<String>,
}

impl Settings {
    fn fallback() -> Self {
        Self {
            trace: TraceSettings {
                max_active: 2,
                max_points: 4096,
                inactivity_timeout_ms: 5000,
            },
            recognition: RecognitionSettings {
                pattern_modes: vec![PatternRecognitionMode::Handwriting],
                group_window_ms: 400,
                max_strokes: 32,
                max_candidates: 10,
                word_completions: 3,
            },
            reselect: ReselectSettings {
                cache_size: 16,
                expiry_ms: 300_000,
            },
            locales: LocaleSettings {
                latin: vec!["en_GB".to_string(), "en_US".to_string()],
            },
            dictionaries: HashMap::new(),
        }
    }

    pub fn dictionary_uri(&self, locale: &str) -> Option<&str> {
        self.dictionaries.get(locale).map(|s| s.as_str())
    }
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings = toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    macro_rules! check_positive {
        ($section:ident . $field:ident) => {
            if s.$section.$field == 0 {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must be positive".to_string(),
                });
            }
        };
    }

    check_positive!(trace.max_active);
    check_positive!(trace.max_points);
    check_positive!(trace.inactivity_timeout_ms);
    check_positive!(recognition.max_strokes);
    check_positive!(recognition.max_candidates);
    check_positive!(reselect.cache_size);
    check_positive!(reselect.expiry_ms);
    // group_window_ms = 0 is valid: every stroke is recognized on its own.

    if s.recognition.pattern_modes.is_empty() {
        return Err(SettingsError::InvalidValue {
            field: "recognition.pattern_modes".to_string(),
            reason: "at least one mode is required".to_string(),
        });
    }
    for (locale, uri) in &s.dictionaries {
        if uri.trim().is_empty() {
            return Err(SettingsError::InvalidValue {
                field: format!("dictionaries.{locale}"),
                reason: "URI must not be empty".to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_default_toml() {
        let s = parse_settings_toml(DEFAULT_SETTINGS_TOML).unwrap();
        assert_eq!(s.trace.max_active, 2);
        assert_eq!(s.recognition.group_window_ms, 400);
        assert_eq!(
            s.recognition.pattern_modes,
            vec![PatternRecognitionMode::Handwriting]
        );
        assert!(s.locales.latin.iter().any(|l| l == "en_GB"));
        assert!(s.dictionaries.is_empty());
    }

    #[test]
    fn dictionaries_table() {
        let toml = DEFAULT_SETTINGS_TOML.replace(
            "[dictionaries]",
            "[dictionaries]\nen_GB = \"file:///usr/share/ink/en_GB.inkd\"",
        );
        let s = parse_settings_toml(&toml).unwrap();
        assert_eq!(
            s.dictionary_uri("en_GB"),
            Some("file:///usr/share/ink/en_GB.inkd")
        );
        assert_eq!(s.dictionary_uri("fi_FI"), None);
    }

    #[test]
    fn zero_limit_is_rejected() {
        let toml = DEFAULT_SETTINGS_TOML.replace("max_active = 2", "max_active = 0");
        let err = parse_settings_toml(&toml).unwrap_err();
        assert!(err.to_string().contains("trace.max_active"));
    }

    #[test]
    fn empty_pattern_modes_rejected() {
        let toml = DEFAULT_SETTINGS_TOML.replace(
            "pattern_modes = [\"handwriting\"]",
            "pattern_modes = []",
        );
        assert!(parse_settings_toml(&toml).is_err());
    }

    #[test]
    fn unknown_pattern_mode_is_parse_error() {
        let toml = DEFAULT_SETTINGS_TOML.replace(
            "pattern_modes = [\"handwriting\"]",
            "pattern_modes = [\"telepathy\"]",
        );
        assert!(matches!(
            parse_settings_toml(&toml),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn fallback_is_valid() {
        assert!(validate(&Settings::fallback()).is_ok());
    }
}
