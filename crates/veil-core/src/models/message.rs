use serde::{Deserialize, Serialize};

/// A single chat message as stored in the host's log.
///
/// Identity is the position in the log; indices shift on deletion.
/// The hidden flag is persisted under the host's `is_system` key, and every key
/// this crate does not model is carried through `extra` so rewrites are lossless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_user: bool,
    #[serde(default)]
    pub mes: String,
    #[serde(rename = "is_system", default)]
    pub is_hidden: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Message {
    pub fn new(name: impl Into<String>, is_user: bool, mes: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_user,
            mes: mes.into(),
            is_hidden: false,
            extra: serde_json::Map::new(),
        }
    }

    pub fn hidden(mut self) -> Self {
        self.is_hidden = true;
        self
    }
}

/// Number of hidden messages in a log.
pub fn hidden_count(chat: &[Message]) -> usize {
    chat.iter().filter(|m| m.is_hidden).count()
}
