//! Where the settings blob lives.
//!
//! The host owns durability; the store only hands it a JSON value to keep.

use serde_json::{Map, Value};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::constants::EXTENSION_NAME;
use crate::error::VeilError;

pub trait SettingsBackend {
    /// Read the stored blob. `Ok(None)` when nothing has been stored yet.
    fn read(&self) -> Result<Option<Value>, VeilError>;

    fn write(&mut self, blob: &Value) -> Result<(), VeilError>;
}

// =============================================================================
// JsonFileBackend
// =============================================================================

/// Keeps the blob under the extension's key in a shared extension-settings JSON file,
/// leaving every other extension's entry untouched.
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read_document(&self) -> Result<Option<Map<String, Value>>, VeilError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(VeilError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        match serde_json::from_str::<Value>(&contents)? {
            Value::Object(document) => Ok(Some(document)),
            _ => Err(VeilError::Backend {
                message: format!("{} is not a JSON object", self.path.display()),
            }),
        }
    }
}

impl SettingsBackend for JsonFileBackend {
    fn read(&self) -> Result<Option<Value>, VeilError> {
        Ok(self
            .read_document()?
            .and_then(|mut document| document.remove(EXTENSION_NAME)))
    }

    /// Write-to-temp-then-rename so a crash mid-write never leaves a torn file.
    fn write(&mut self, blob: &Value) -> Result<(), VeilError> {
        let mut document = self.read_document()?.unwrap_or_default();
        document.insert(EXTENSION_NAME.to_string(), blob.clone());
        let json = serde_json::to_string_pretty(&Value::Object(document))?;

        let io_err = |source: std::io::Error| VeilError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let temp_file = self.path.with_extension("json.tmp");
        std::fs::write(&temp_file, json).map_err(io_err)?;
        std::fs::rename(&temp_file, &self.path).map_err(io_err)?;
        Ok(())
    }
}

// =============================================================================
// MemoryBackend
// =============================================================================

#[derive(Debug, Default)]
struct MemoryState {
    blob: Option<Value>,
    failing: bool,
    writes: usize,
}

/// In-process backend. Clones share the same slot, so a caller can keep a handle
/// after boxing one into the store.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(blob: Value) -> Self {
        let backend = Self::default();
        backend.state.borrow_mut().blob = Some(blob);
        backend
    }

    pub fn blob(&self) -> Option<Value> {
        self.state.borrow().blob.clone()
    }

    /// Make every subsequent write fail until cleared.
    pub fn set_failing(&self, failing: bool) {
        self.state.borrow_mut().failing = failing;
    }

    /// Number of successful writes.
    pub fn writes(&self) -> usize {
        self.state.borrow().writes
    }
}

impl SettingsBackend for MemoryBackend {
    fn read(&self) -> Result<Option<Value>, VeilError> {
        Ok(self.state.borrow().blob.clone())
    }

    fn write(&mut self, blob: &Value) -> Result<(), VeilError> {
        let mut state = self.state.borrow_mut();
        if state.failing {
            return Err(VeilError::Backend {
                message: "memory backend set to fail".to_string(),
            });
        }
        state.blob = Some(blob.clone());
        state.writes += 1;
        Ok(())
    }
}
