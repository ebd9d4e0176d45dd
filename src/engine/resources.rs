//! Opaque collaborators forwarded to the engine
//!
//! The harness hands these to the engine untouched; only scripts read them.

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

/// Memoised script values shared across runs (lock-free)
#[derive(Debug, Clone, Default)]
pub struct ScriptCache {
    entries: Arc<DashMap<String, Value>>,
}

impl ScriptCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value for `key`, computing it on first use
    pub fn get_or_insert_with(&self, key: &str, compute: impl FnOnce() -> Value) -> Value {
        if let Some(hit) = self.entries.get(key) {
            return hit.clone();
        }
        self.entries
            .entry(key.to_string())
            .or_insert_with(compute)
            .clone()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// In-memory store of files "uploaded" through file widgets, keyed by widget id
#[derive(Debug, Clone, Default)]
pub struct UploadedFileManager {
    files: Arc<DashMap<String, Vec<UploadedFile>>>,
}

impl UploadedFileManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, widget_id: impl Into<String>, file: UploadedFile) {
        self.files.entry(widget_id.into()).or_default().push(file);
    }

    pub fn files(&self, widget_id: &str) -> Vec<UploadedFile> {
        self.files
            .get(widget_id)
            .map(|files| files.clone())
            .unwrap_or_default()
    }

    pub fn remove_files(&self, widget_id: &str) {
        self.files.remove(widget_id);
    }
}

/// Pass-through collaborators handed to an engine
#[derive(Debug, Clone, Default)]
pub struct EngineResources {
    pub script_cache: ScriptCache,
    pub uploaded_files: UploadedFileManager,
}
