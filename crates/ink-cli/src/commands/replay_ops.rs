//! Scripted replay of a trace input session.
//!
//! A script names the locale and input mode, the answers the recognizer
//! gives (one per recognition request, in order) and a list of host steps.
//! Worker requests are served synchronously between steps and time only
//! moves on `wait`, so a replay is deterministic. Every host event is
//! printed as one JSON line.

use std::collections::VecDeque;
use std::fs;
use std::process;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};

use ink_core::dict::{DictionaryLoader, FileDictionaryLoader};
use ink_core::modes::{InputMode, PatternRecognitionMode, TextCase};
use ink_core::recognition::{
    CharSegment, RecognitionOutput, RecognitionRequest, Recognizer, RecognizerError, Segmentation,
};
use ink_core::selection::SelectionListType;
use ink_core::settings::{parse_settings_toml, settings};
use ink_core::trace::InfoMap;
use ink_session::{
    Completion, EngineRequest, HostEvent, InputMethod, Key, KeyModifiers, ManualClock,
    ReselectFlags, SessionConfig, TraceInputSession,
};

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("unknown input mode '{0}' (latin, numeric, dialable)")]
    InputMode(String),
    #[error("input mode {mode} is not available for {locale}")]
    Unavailable { locale: String, mode: &'static str },
    #[error("unknown key '{0}'")]
    Key(String),
    #[error("unknown modifier '{0}'")]
    Modifier(String),
    #[error("unknown selection list '{0}' (word, char)")]
    List(String),
    #[error("unknown reselect flags '{0}' (before, after, at)")]
    Flags(String),
    #[error("unknown pattern mode '{0}' (handwriting, gesture)")]
    PatternMode(String),
}

// --- Script ---

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    pub locale: String,
    #[serde(default = "default_input_mode")]
    pub input_mode: String,
    #[serde(default)]
    pub upper_case: bool,
    /// Dictionary for the locale: a path or `file://` URI.
    #[serde(default)]
    pub dictionary: Option<String>,
    /// Committed text already in the field, with the cursor at its end.
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub responses: Vec<Response>,
    pub steps: Vec<Step>,
}

fn default_input_mode() -> String {
    "latin".to_string()
}

/// One recognizer answer.
#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    pub words: Vec<String>,
    /// Alternatives for each character of the first word, one list per
    /// character. Empty means no segmentation.
    #[serde(default)]
    pub chars: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// A complete stroke: `[x, y, t_ms]` samples.
    Stroke {
        points: Vec<(f32, f32, u64)>,
        #[serde(default = "default_pattern_mode")]
        mode: String,
    },
    Wait {
        ms: u64,
    },
    Key {
        key: String,
        #[serde(default)]
        text: String,
        #[serde(default)]
        modifiers: Vec<String>,
    },
    Select {
        list: String,
        index: usize,
    },
    Update,
    Reset,
    Reselect {
        cursor: usize,
        #[serde(default = "default_flags")]
        flags: String,
    },
}

fn default_pattern_mode() -> String {
    "handwriting".to_string()
}

fn default_flags() -> String {
    "at".to_string()
}

// --- Recognizer ---

/// Answers requests from a fixed table, in order. Runs dry as
/// `Unavailable`.
pub struct TableRecognizer {
    responses: Mutex<VecDeque<Response>>,
}

impl TableRecognizer {
    pub fn new(responses: Vec<Response>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }
}

impl Recognizer for TableRecognizer {
    fn recognize(&self, request: &RecognitionRequest) -> Result<RecognitionOutput, RecognizerError> {
        let response = self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .ok_or(RecognizerError::Unavailable)?;
        let mut output = RecognitionOutput::from_words(response.words);
        if !response.chars.is_empty() {
            let trace_ids: Vec<_> = request.traces.iter().map(|t| t.id).collect();
            output.segmentation = Some(Segmentation {
                segments: response
                    .chars
                    .into_iter()
                    .enumerate()
                    .map(|(i, alternatives)| CharSegment {
                        range: i..i + 1,
                        alternatives,
                        trace_ids: trace_ids.clone(),
                    })
                    .collect(),
            });
        }
        Ok(output)
    }
}

// --- Parsing helpers ---

fn parse_key(name: &str) -> Result<Key, ReplayError> {
    Ok(match name {
        "backspace" => Key::Backspace,
        "enter" => Key::Enter,
        "space" => Key::Space,
        "escape" => Key::Escape,
        "shift" => Key::Shift,
        "capslock" => Key::CapsLock,
        _ if name.chars().count() == 1 => Key::Character,
        _ => return Err(ReplayError::Key(name.to_string())),
    })
}

fn parse_modifiers(names: &[String]) -> Result<KeyModifiers, ReplayError> {
    names.iter().try_fold(KeyModifiers::NONE, |acc, name| {
        let m = match name.as_str() {
            "shift" => KeyModifiers::SHIFT,
            "control" | "ctrl" => KeyModifiers::CONTROL,
            "alt" => KeyModifiers::ALT,
            "meta" => KeyModifiers::META,
            _ => return Err(ReplayError::Modifier(name.clone())),
        };
        Ok(acc | m)
    })
}

fn parse_list(name: &str) -> Result<SelectionListType, ReplayError> {
    match name {
        "word" => Ok(SelectionListType::WordCandidates),
        "char" => Ok(SelectionListType::CharacterAlternatives),
        _ => Err(ReplayError::List(name.to_string())),
    }
}

fn list_name(list: SelectionListType) -> &'static str {
    match list {
        SelectionListType::WordCandidates => "word",
        SelectionListType::CharacterAlternatives => "char",
    }
}

fn parse_flags(name: &str) -> Result<ReselectFlags, ReplayError> {
    match name {
        "before" => Ok(ReselectFlags::WORD_BEFORE_CURSOR),
        "after" => Ok(ReselectFlags::WORD_AFTER_CURSOR),
        "at" => Ok(ReselectFlags::WORD_AT_CURSOR),
        _ => Err(ReplayError::Flags(name.to_string())),
    }
}

fn parse_pattern_mode(name: &str) -> Result<PatternRecognitionMode, ReplayError> {
    match name {
        "handwriting" => Ok(PatternRecognitionMode::Handwriting),
        "gesture" => Ok(PatternRecognitionMode::Gesture),
        _ => Err(ReplayError::PatternMode(name.to_string())),
    }
}

// --- Driver ---

struct Replay {
    session: TraceInputSession,
    clock: Arc<ManualClock>,
    recognizer: TableRecognizer,
    loader: FileDictionaryLoader,
    lines: Vec<Value>,
}

impl Replay {
    /// Serve every pending request and record the host events.
    fn drain(&mut self) {
        loop {
            let out = self.session.take_output();
            if out.is_empty() {
                return;
            }
            for event in out.events {
                let line = self.event_line(event);
                self.lines.push(line);
            }
            for request in out.requests {
                match request {
                    EngineRequest::Recognize(req) => {
                        let outcome = self.recognizer.recognize(&req);
                        self.lines.push(json!({ "recognize": req.attempt.0 }));
                        self.session.reconcile(Completion::Recognition {
                            attempt: req.attempt,
                            outcome,
                        });
                    }
                    EngineRequest::CancelRecognition(id) => {
                        self.lines.push(json!({ "cancel": id.0 }));
                    }
                    EngineRequest::LoadDictionary { locale, uri } => {
                        let result = self.loader.load(&uri).map(Arc::new);
                        let line = match &result {
                            Ok(d) => json!({ "dictionary": locale, "words": d.len() }),
                            Err(e) => json!({ "dictionary": locale, "error": e.to_string() }),
                        };
                        self.lines.push(line);
                        self.session.dictionary_load_completed(&uri, result);
                    }
                }
            }
        }
    }

    fn event_line(&self, event: HostEvent) -> Value {
        match event {
            HostEvent::Commit(text) => json!({ "commit": text }),
            HostEvent::DeleteSurrounding(range) => json!({ "delete": [range.start, range.end] }),
            HostEvent::PreeditChanged(text) => json!({ "preedit": text }),
            HostEvent::SelectionListChanged(list) => {
                let items: Vec<&str> = self
                    .session
                    .selection_list(list)
                    .map(|m| m.items().iter().map(|i| i.text.as_str()).collect())
                    .unwrap_or_default();
                json!({ "list": list_name(list), "items": items })
            }
            HostEvent::SelectionListActiveItemChanged(list, active) => {
                json!({ "list": list_name(list), "active": active })
            }
        }
    }

    fn step(&mut self, step: &Step) -> Result<(), ReplayError> {
        match step {
            Step::Stroke { points, mode } => {
                let mode = parse_pattern_mode(mode)?;
                let Some(trace) = self.session.trace_begin(mode, InfoMap::new(), InfoMap::new())
                else {
                    self.lines.push(json!({ "rejected": "stroke" }));
                    return Ok(());
                };
                for &(x, y, t) in points {
                    if let Err(e) = trace.add_point(x, y, t) {
                        self.lines.push(json!({ "error": e.to_string() }));
                        break;
                    }
                }
                self.session.trace_end(&trace);
            }
            Step::Wait { ms } => {
                self.clock.advance(Duration::from_millis(*ms));
                self.session.tick();
            }
            Step::Key {
                key,
                text,
                modifiers,
            } => {
                let k = parse_key(key)?;
                // A bare character key types itself.
                let text = if text.is_empty() && k == Key::Character {
                    key.as_str()
                } else {
                    text.as_str()
                };
                let consumed = self
                    .session
                    .key_event(k, text, parse_modifiers(modifiers)?);
                if !consumed {
                    self.lines.push(json!({ "key": key, "consumed": false }));
                }
            }
            Step::Select { list, index } => {
                if let Err(e) = self
                    .session
                    .selection_list_item_selected(parse_list(list)?, *index)
                {
                    self.lines.push(json!({ "error": e.to_string() }));
                }
            }
            Step::Update => self.session.update(),
            Step::Reset => self.session.reset(),
            Step::Reselect { cursor, flags } => {
                if !self.session.reselect(*cursor, parse_flags(flags)?) {
                    self.lines.push(json!({ "reselect": cursor, "found": false }));
                }
            }
        }
        self.drain();
        Ok(())
    }
}

/// Run a script against a fresh session. Returns one JSON value per line
/// of output.
pub fn run_script(script: Script, mut config: SessionConfig) -> Result<Vec<Value>, ReplayError> {
    let mode = InputMode::from_name(&script.input_mode)
        .ok_or_else(|| ReplayError::InputMode(script.input_mode.clone()))?;
    if let Some(uri) = &script.dictionary {
        config.dictionaries.insert(script.locale.clone(), uri.clone());
    }

    let clock = Arc::new(ManualClock::new());
    let mut replay = Replay {
        session: TraceInputSession::with_clock(config, clock.clone()),
        clock,
        recognizer: TableRecognizer::new(script.responses),
        loader: FileDictionaryLoader::new(),
        lines: Vec::new(),
    };

    let cursor = script.text.chars().count();
    replay.session.set_surrounding_text(&script.text, cursor);
    if !replay.session.set_input_mode(&script.locale, mode) {
        return Err(ReplayError::Unavailable {
            locale: script.locale,
            mode: mode.name(),
        });
    }
    if script.upper_case {
        replay.session.set_text_case(TextCase::Upper);
    }
    replay.drain();

    for step in &script.steps {
        replay.step(step)?;
    }
    replay
        .lines
        .push(json!({ "text": replay.session.context().text() }));
    Ok(replay.lines)
}

pub fn replay_cmd(script_file: &str, settings_file: Option<&str>) {
    let config = match settings_file {
        Some(path) => {
            let content = die!(fs::read_to_string(path), "Error reading {path}: {}");
            let s = die!(parse_settings_toml(&content), "Error: {}");
            SessionConfig::from_settings(&s)
        }
        None => SessionConfig::from_settings(settings()),
    };
    let content = die!(
        fs::read_to_string(script_file),
        "Error reading {script_file}: {}"
    );
    let script: Script = die!(serde_json::from_str(&content), "Error parsing script: {}");
    let lines = die!(run_script(script, config), "Error: {}");
    for line in lines {
        println!("{line}");
    }
}
