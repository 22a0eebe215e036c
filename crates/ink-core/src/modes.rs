use serde::Deserialize;

/// Input mode advertised per locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputMode {
    /// Letters of a Latin-script alphabet.
    Latin,
    /// Digits and numeric punctuation.
    Numeric,
    /// Phone-number characters (digits, `+`, `*`, `#`).
    Dialable,
}

impl InputMode {
    pub fn name(self) -> &'static str {
        match self {
            Self::Latin => "latin",
            Self::Numeric => "numeric",
            Self::Dialable => "dialable",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "latin" => Some(Self::Latin),
            "numeric" => Some(Self::Numeric),
            "dialable" => Some(Self::Dialable),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextCase {
    #[default]
    Lower,
    Upper,
}

impl TextCase {
    /// Apply the case to recognized text. Lower leaves the recognizer's
    /// casing untouched.
    pub fn apply(self, text: &str) -> String {
        match self {
            Self::Lower => text.to_string(),
            Self::Upper => text.to_uppercase(),
        }
    }
}

/// Interaction style a trace is captured under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternRecognitionMode {
    Handwriting,
    Gesture,
}
