//! A host backed by files on disk: one chat log plus the character and group lists.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use veil_core::models::{CharacterRecord, GroupRecord};
use veil_core::scope::{ContextSource, HostContext};
use veil_core::{CoreConfig, Host, HostEvent, Message};

use super::chat_file::ChatFile;

pub struct FileHost {
    context: Option<HostContext>,
    chat_path: Option<PathBuf>,
    chat: Option<ChatFile>,
    /// Hidden flags as last read from or written to disk.
    saved_flags: Vec<bool>,
    /// Raw file content as last seen, to detect outside edits.
    last_content: Option<String>,
    characters: Vec<CharacterRecord>,
    groups: Vec<GroupRecord>,
}

impl FileHost {
    pub fn new(context: Option<HostContext>) -> Self {
        Self {
            context,
            chat_path: None,
            chat: None,
            saved_flags: Vec::new(),
            last_content: None,
            characters: Vec::new(),
            groups: Vec::new(),
        }
    }

    pub fn with_chat_file(mut self, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read chat file: {}", path.display()))?;
        let chat = ChatFile::parse(&content)
            .with_context(|| format!("Failed to parse chat file: {}", path.display()))?;
        self.saved_flags = flags(&chat.messages);
        self.chat = Some(chat);
        self.last_content = Some(content);
        self.chat_path = Some(path.to_path_buf());
        Ok(self)
    }

    /// Load `characters.json` and `groups.json` from the data dir if present.
    pub fn with_records(mut self, config: &CoreConfig) -> Result<Self> {
        self.characters = load_list(&config.characters_path())?;
        self.groups = load_list(&config.groups_path())?;
        Ok(self)
    }

    pub fn chat_path(&self) -> Option<&Path> {
        self.chat_path.as_deref()
    }

    /// Whether any hidden flag differs from what is on disk.
    pub fn is_chat_dirty(&self) -> bool {
        self.chat
            .as_ref()
            .is_some_and(|chat| flags(&chat.messages) != self.saved_flags)
    }

    pub fn save_chat(&mut self) -> Result<()> {
        let (Some(chat), Some(path)) = (&self.chat, &self.chat_path) else {
            return Ok(());
        };
        chat.save(path)?;
        self.saved_flags = flags(&chat.messages);
        self.last_content = Some(chat.to_jsonl()?);
        tracing::debug!(path = %path.display(), "Chat file written");
        Ok(())
    }

    /// Re-read the chat file and describe what changed since the last read or write.
    pub fn reload_chat(&mut self) -> Result<Option<HostEvent>> {
        let Some(path) = self.chat_path.clone() else {
            return Ok(None);
        };
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read chat file: {}", path.display()))?;
        if self.last_content.as_deref() == Some(content.as_str()) {
            return Ok(None);
        }
        let reloaded = ChatFile::parse(&content)
            .with_context(|| format!("Failed to parse chat file: {}", path.display()))?;
        let previous = self.chat.as_ref().map(|c| c.messages.as_slice()).unwrap_or_default();
        let event = classify_change(previous, &reloaded.messages);

        self.saved_flags = flags(&reloaded.messages);
        self.chat = Some(reloaded);
        self.last_content = Some(content);
        Ok(event)
    }
}

/// Map a change in the log to the notification a live host would have sent.
pub fn classify_change(previous: &[Message], current: &[Message]) -> Option<HostEvent> {
    if current.len() > previous.len() {
        let sent = current.last().is_some_and(|m| m.is_user);
        return Some(if sent {
            HostEvent::MessageSent
        } else {
            HostEvent::MessageReceived
        });
    }
    if current.len() < previous.len() {
        return Some(HostEvent::MessageDeleted);
    }
    match (previous.last(), current.last()) {
        (Some(before), Some(after)) if before.mes != after.mes => Some(HostEvent::MessageSwiped),
        _ => None,
    }
}

fn flags(messages: &[Message]) -> Vec<bool> {
    messages.iter().map(|m| m.is_hidden).collect()
}

/// Read a JSON array of records. A list or element that does not parse is logged and
/// skipped; only I/O failures are errors.
fn load_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let values: Vec<Value> = match serde_json::from_str(&content) {
        Ok(values) => values,
        Err(e) => {
            tracing::warn!(path = %path.display(), "Ignoring unreadable record list: {}", e);
            return Ok(Vec::new());
        }
    };

    let mut records = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value(value) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!(
                path = %path.display(),
                index,
                "Skipping malformed record: {}",
                e
            ),
        }
    }
    Ok(records)
}

impl ContextSource for FileHost {
    fn context(&self) -> Option<HostContext> {
        self.context.clone()
    }
}

impl Host for FileHost {
    fn chat(&self) -> Option<&[Message]> {
        self.chat.as_ref().map(|c| c.messages.as_slice())
    }

    fn chat_mut(&mut self) -> Option<&mut [Message]> {
        self.chat.as_mut().map(|c| c.messages.as_mut_slice())
    }

    fn characters(&self) -> Vec<CharacterRecord> {
        self.characters.clone()
    }

    fn groups(&self) -> Vec<GroupRecord> {
        self.groups.clone()
    }
}
