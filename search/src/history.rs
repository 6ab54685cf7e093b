use std::collections::HashMap;

use crate::error::StoreError;

/// 键值存储 - 页面上对应 localStorage
pub trait HistoryStore {
    /// 读取键对应的值，不存在或不可读时返回 None
    fn read(&self, key: &str) -> Option<String>;

    /// 写入键值
    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// 内存存储，用于测试和没有 localStorage 的环境
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置一个键值
    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }
}

impl HistoryStore for MemoryStore {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// 浏览器 localStorage
pub struct LocalStorageStore {
    storage: web_sys::Storage,
}

impl LocalStorageStore {
    /// 打开当前窗口的 localStorage（隐私模式等情况下可能不可用）
    pub fn open() -> Result<Self, StoreError> {
        let window = web_sys::window()
            .ok_or_else(|| StoreError::Unavailable("window 对象不存在".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|e| StoreError::Unavailable(format!("{:?}", e)))?
            .ok_or_else(|| StoreError::Unavailable("localStorage 不可用".to_string()))?;
        Ok(Self { storage })
    }
}

impl HistoryStore for LocalStorageStore {
    fn read(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| StoreError::Write(format!("{:?}", e)))
    }
}

/// 搜索历史 - 最近的查询在前，去重，最多保留 `limit` 条
///
/// 每次修改后立即以 JSON 数组写回存储。
pub struct SearchHistory {
    entries: Vec<String>,
    key: String,
    limit: usize,
    store: Box<dyn HistoryStore>,
}

impl SearchHistory {
    /// 从存储中读取历史，数据缺失或损坏时视为空历史
    pub fn load(store: Box<dyn HistoryStore>, key: &str, limit: usize) -> Self {
        let stored = match store.read(key) {
            Some(raw) => serde_json::from_str::<Vec<String>>(&raw).unwrap_or_else(|e| {
                tracing::warn!("搜索历史已损坏，按空历史处理: {}", e);
                Vec::new()
            }),
            None => Vec::new(),
        };
        let entries = normalize(stored, limit);

        Self {
            entries,
            key: key.to_string(),
            limit,
            store,
        }
    }

    /// 历史记录，最近的在前
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 底层存储
    pub fn store(&self) -> &dyn HistoryStore {
        self.store.as_ref()
    }

    /// 记录一次提交的查询：移除已有的相同项，放到最前，截断到上限并写回
    pub fn record(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }

        self.entries.retain(|entry| entry != query);
        self.entries.insert(0, query.to_string());
        self.entries.truncate(self.limit);
        self.persist();
    }

    /// 清空历史并写回
    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    // 写入失败只记录日志，不影响搜索
    fn persist(&mut self) {
        match serde_json::to_string(&self.entries) {
            Ok(json) => {
                if let Err(e) = self.store.write(&self.key, &json) {
                    tracing::warn!("保存搜索历史失败: {}", e);
                }
            }
            Err(e) => tracing::warn!("序列化搜索历史失败: {}", e),
        }
    }
}

// 存储中的数据可能被手工改过：去除首尾空白，丢弃空项，重复项保留最靠前的一条
fn normalize(stored: Vec<String>, limit: usize) -> Vec<String> {
    let mut entries: Vec<String> = Vec::with_capacity(stored.len().min(limit));
    for entry in stored {
        if entries.len() >= limit {
            break;
        }
        let entry = entry.trim();
        if entry.is_empty() || entries.iter().any(|existing| existing == entry) {
            continue;
        }
        entries.push(entry.to_string());
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const KEY: &str = "search_history";

    struct FailingStore;

    impl HistoryStore for FailingStore {
        fn read(&self, _key: &str) -> Option<String> {
            None
        }

        fn write(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Write("quota exceeded".to_string()))
        }
    }

    fn empty_history() -> SearchHistory {
        SearchHistory::load(Box::new(MemoryStore::new()), KEY, 10)
    }

    #[test]
    fn record_pushes_to_front_and_persists() {
        let mut history = empty_history();
        history.record("rust");
        history.record("wasm");

        assert_eq!(history.entries(), &["wasm", "rust"]);
        assert_eq!(history.store().read(KEY).as_deref(), Some(r#"["wasm","rust"]"#));
    }

    #[test]
    fn record_moves_existing_query_to_front() {
        let mut history = empty_history();
        for query in ["a", "b", "a", "c"] {
            history.record(query);
        }
        assert_eq!(history.entries(), &["c", "a", "b"]);
    }

    #[test]
    fn record_ignores_blank_queries() {
        let mut history = empty_history();
        history.record("   ");
        assert!(history.is_empty());
        assert_eq!(history.store().read(KEY), None);
    }

    #[test]
    fn history_is_capped() {
        let mut history = empty_history();
        for i in 0..15 {
            history.record(&format!("q{}", i));
        }
        assert_eq!(history.len(), 10);
        assert_eq!(history.entries()[0], "q14");
        assert_eq!(history.entries()[9], "q5");
    }

    #[test]
    fn corrupt_storage_reads_as_empty() {
        let store = MemoryStore::new().with_entry(KEY, "{not json");
        assert!(SearchHistory::load(Box::new(store), KEY, 10).is_empty());

        let store = MemoryStore::new().with_entry(KEY, r#"[1, 2, 3]"#);
        assert!(SearchHistory::load(Box::new(store), KEY, 10).is_empty());
    }

    #[test]
    fn reads_back_previous_session() {
        let store = MemoryStore::new().with_entry(KEY, r#"["old", "older"]"#);
        let mut history = SearchHistory::load(Box::new(store), KEY, 10);
        assert_eq!(history.entries(), &["old", "older"]);

        history.record("older");
        assert_eq!(history.entries(), &["older", "old"]);
    }

    #[test]
    fn stored_entries_are_normalized_on_load() {
        let store = MemoryStore::new().with_entry(KEY, r#"["a", "a", " b ", "", "  ", "b", "c"]"#);
        let history = SearchHistory::load(Box::new(store), KEY, 10);
        assert_eq!(history.entries(), &["a", "b", "c"]);

        let store = MemoryStore::new().with_entry(KEY, r#"["x", "x", "y", "z"]"#);
        assert_eq!(SearchHistory::load(Box::new(store), KEY, 2).entries(), &["x", "y"]);
    }

    #[test]
    fn write_failures_are_swallowed() {
        let mut history = SearchHistory::load(Box::new(FailingStore), KEY, 10);
        history.record("rust");
        assert_eq!(history.entries(), &["rust"]);
    }

    #[test]
    fn clear_empties_and_persists() {
        let mut history = empty_history();
        history.record("rust");
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.store().read(KEY).as_deref(), Some("[]"));
    }
}
