use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Milliseconds since the unix epoch, matching the persisted timestamp format.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Self-asserted identity. No credentials, one current user at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
}

/// A saved grammar-pattern explanation. `source` is the dedup key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarEntry {
    pub id: String,
    pub source: String,
    pub explanation: String,
    pub timestamp: u64,
}

/// A saved vocabulary explanation. `word` is the dedup key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub id: String,
    pub word: String,
    pub explanation: String,
    pub timestamp: u64,
}

/// One delimiter-bounded segment of a streamed grammar explanation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternRecord {
    pub form: String,
    pub explanation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    Grammar,
    Vocabulary,
}

/// Input to a grammar explanation: raw text or an image of text.
#[derive(Debug, Clone)]
pub enum GrammarInput {
    Text(String),
    Image {
        data: Vec<u8>,
        mime: String,
        name: String,
    },
}

impl GrammarInput {
    pub fn is_empty(&self) -> bool {
        match self {
            GrammarInput::Text(text) => text.trim().is_empty(),
            GrammarInput::Image { data, .. } => data.is_empty(),
        }
    }

    /// Short label used for status output and logs.
    pub fn label(&self) -> String {
        match self {
            GrammarInput::Text(text) => text.clone(),
            GrammarInput::Image { name, .. } => format!("[image: {name}]"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    // UI -> app
    Login(String),
    Logout,
    ExplainGrammar(GrammarInput),
    ExplainVocabulary(String),
    SaveGrammar(Vec<PatternRecord>),
    SaveVocabulary { word: String, explanation: String },
    DeleteEntry { kind: CollectionKind, id: String },
    ReorderEntries { kind: CollectionKind, order: Vec<String> },

    // app -> UI
    SessionChanged(Option<User>),
    LibraryChanged {
        grammar: Vec<GrammarEntry>,
        vocabulary: Vec<VocabularyEntry>,
    },
    PatternParsed(PatternRecord),
    ExplainFinished,
    VocabularyExplained { word: String, explanation: String },
    ShowError(String),
}
