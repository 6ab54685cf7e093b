use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use search_wasm::{HistoryStore, StoreError};

/// 以 JSON 文件保存的键值存储，命令行下代替 localStorage
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    // 文件不存在或内容损坏时视为空
    fn read_all(&self) -> BTreeMap<String, String> {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }
}

impl HistoryStore for FileStore {
    fn read(&self, key: &str) -> Option<String> {
        self.read_all().remove(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.read_all();
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::Write(e.to_string()))?;
        }

        let json = serde_json::to_string_pretty(&entries)
            .map_err(|e| StoreError::Write(e.to_string()))?;
        fs::write(&self.path, json)
            .map_err(|e| StoreError::Write(format!("{}: {}", self.path.display(), e)))
    }
}
