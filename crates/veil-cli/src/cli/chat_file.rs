//! Line-delimited JSON chat logs.
//!
//! The first line may be a header object (no `mes` key) with chat metadata; every other
//! line is one message. Keys this tool does not model are written back unchanged.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use veil_core::Message;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatFile {
    pub header: Option<Value>,
    pub messages: Vec<Message>,
}

impl ChatFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read chat file: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse chat file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut chat = ChatFile::default();
        let lines = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());

        for (position, (line_no, line)) in lines.enumerate() {
            let value: Value = serde_json::from_str(line)
                .with_context(|| format!("Invalid JSON on line {}", line_no + 1))?;
            if position == 0 && is_header(&value) {
                chat.header = Some(value);
                continue;
            }
            let message: Message = serde_json::from_value(value)
                .with_context(|| format!("Invalid message on line {}", line_no + 1))?;
            chat.messages.push(message);
        }
        Ok(chat)
    }

    pub fn to_jsonl(&self) -> Result<String> {
        let mut out = String::new();
        if let Some(header) = &self.header {
            out.push_str(&serde_json::to_string(header).context("Failed to serialize header")?);
            out.push('\n');
        }
        for message in &self.messages {
            out.push_str(&serde_json::to_string(message).context("Failed to serialize message")?);
            out.push('\n');
        }
        Ok(out)
    }

    /// Write to a temp file and rename it over the chat file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_jsonl()?;
        let temp_path = path.with_extension("jsonl.tmp");
        std::fs::write(&temp_path, content)
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        std::fs::rename(&temp_path, path)
            .with_context(|| format!("Failed to replace chat file: {}", path.display()))?;
        Ok(())
    }
}

fn is_header(value: &Value) -> bool {
    value.as_object().is_some_and(|object| !object.contains_key("mes"))
}
