use wasm_bindgen::prelude::*;
use web_sys::console;

use article_filter::SortMode;
use utils_common::config::SearchConfig;

// 导出模块
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod excerpt;
pub mod history;
pub mod loader;
pub mod logging;
pub mod models;

pub use dispatch::{Debouncer, QuerySequencer, QueryTicket};
pub use engine::{query, query_with_limit, score, SearchEngine};
pub use error::{LoadError, StoreError};
pub use excerpt::{excerpt, highlight};
pub use history::{HistoryStore, LocalStorageStore, MemoryStore, SearchHistory};
pub use loader::{load, parse_feed, CorpusSource, FeedFormat, FileSource, StaticSource};
pub use models::{ScoredDocument, SearchResultItem, SearchResults};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// 初始化函数 - 设置错误处理和控制台日志
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    logging::init(tracing::Level::INFO);
}

/// 版本信息
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// 页面计时
fn performance_now() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

fn to_js_error(message: String) -> JsValue {
    console::log_1(&JsValue::from_str(&message));
    JsValue::from_str(&message)
}

fn not_loaded() -> JsValue {
    JsValue::from_str("索引未加载")
}

/// 搜索引擎JS接口 - 页面持有一个实例，输入事件调用这里的方法
#[wasm_bindgen]
pub struct SearchEngineJS {
    config: SearchConfig,
    engine: Option<SearchEngine>,
    history: SearchHistory,
    debouncer: Debouncer,
    sequencer: QuerySequencer,
}

#[wasm_bindgen]
impl SearchEngineJS {
    /// 创建实例，`config_json` 可覆盖部分默认配置
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<SearchEngineJS, JsValue> {
        console_error_panic_hook::set_once();

        let config = SearchConfig::from_json(config_json.as_deref().unwrap_or(""))
            .map_err(|e| to_js_error(format!("初始化搜索失败: {}", e)))?;

        // localStorage 不可用时退回内存存储，历史只在本次会话内有效
        let store: Box<dyn HistoryStore> = match LocalStorageStore::open() {
            Ok(store) => Box::new(store),
            Err(e) => {
                console::warn_1(&JsValue::from_str(&format!("搜索历史将不会保存: {}", e)));
                Box::new(MemoryStore::new())
            }
        };
        let history = SearchHistory::load(store, &config.history_key, config.history_limit);

        Ok(SearchEngineJS {
            debouncer: Debouncer::new(config.debounce_ms),
            sequencer: QuerySequencer::new(),
            config,
            engine: None,
            history,
        })
    }

    /// feed 路径，页面据此发起请求
    #[wasm_bindgen(getter)]
    pub fn feed_path(&self) -> String {
        self.config.feed_path.clone()
    }

    /// 加载页面取回的 feed 文本，返回文章数量
    pub fn load(&mut self, feed_text: &str) -> Result<usize, JsValue> {
        let source = loader::StaticSource::with_location(self.config.feed_path.clone(), feed_text);
        let corpus = loader::load(&source).map_err(|e| to_js_error(format!("加载搜索数据失败: {}", e)))?;

        let count = corpus.len();
        self.engine = Some(SearchEngine::new(corpus, self.config.clone()));
        Ok(count)
    }

    /// 语料是否已加载
    #[wasm_bindgen(getter)]
    pub fn loaded(&self) -> bool {
        self.engine.is_some()
    }

    /// 实时搜索
    pub fn search(&mut self, query: &str) -> Result<JsValue, JsValue> {
        let start_time = performance_now();
        let engine = self.engine.as_mut().ok_or_else(not_loaded)?;
        let results = engine.search(query);
        Self::finish(results, start_time)
    }

    /// 提交搜索，写入搜索历史
    pub fn submit(&mut self, query: &str) -> Result<JsValue, JsValue> {
        let start_time = performance_now();
        let engine = self.engine.as_mut().ok_or_else(not_loaded)?;
        let results = engine.submit(query, &mut self.history);
        Self::finish(results, start_time)
    }

    /// 用当前查询和筛选条件重新搜索
    pub fn refresh(&self) -> Result<JsValue, JsValue> {
        let start_time = performance_now();
        let engine = self.engine.as_ref().ok_or_else(not_loaded)?;
        Self::finish(engine.refresh(), start_time)
    }

    pub fn toggle_tag(&mut self, tag: &str) -> Result<bool, JsValue> {
        let engine = self.engine.as_mut().ok_or_else(not_loaded)?;
        Ok(engine.toggle_tag(tag))
    }

    pub fn toggle_category(&mut self, category: &str) -> Result<bool, JsValue> {
        let engine = self.engine.as_mut().ok_or_else(not_loaded)?;
        Ok(engine.toggle_category(category))
    }

    /// 设置排序方式: "relevance", "date", "reading_time"，其他值按相关度处理
    pub fn set_sort_mode(&mut self, mode: &str) -> Result<(), JsValue> {
        let engine = self.engine.as_mut().ok_or_else(not_loaded)?;
        engine.set_sort_mode(SortMode::parse(mode));
        Ok(())
    }

    pub fn clear_filters(&mut self) -> Result<(), JsValue> {
        let engine = self.engine.as_mut().ok_or_else(not_loaded)?;
        engine.clear_filters();
        Ok(())
    }

    /// 当前筛选状态
    pub fn filter_state(&self) -> Result<JsValue, JsValue> {
        let engine = self.engine.as_ref().ok_or_else(not_loaded)?;
        serde_wasm_bindgen::to_value(engine.filter())
            .map_err(|e| to_js_error(format!("序列化筛选状态失败: {}", e)))
    }

    /// 热门标签 [{name, count}]
    pub fn popular_tags(&self) -> Result<JsValue, JsValue> {
        let engine = self.engine.as_ref().ok_or_else(not_loaded)?;
        serde_wasm_bindgen::to_value(engine.popular_tags())
            .map_err(|e| to_js_error(format!("序列化标签失败: {}", e)))
    }

    /// 热门分类 [{name, count}]
    pub fn popular_categories(&self) -> Result<JsValue, JsValue> {
        let engine = self.engine.as_ref().ok_or_else(not_loaded)?;
        serde_wasm_bindgen::to_value(engine.popular_categories())
            .map_err(|e| to_js_error(format!("序列化分类失败: {}", e)))
    }

    /// 搜索历史，最近的在前
    pub fn history(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.history.entries())
            .map_err(|e| to_js_error(format!("序列化搜索历史失败: {}", e)))
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// 记录一次按键输入，开始防抖计时
    pub fn input(&mut self, text: &str) {
        self.debouncer.input(text, js_sys::Date::now() as u64);
    }

    /// 防抖时间到达后返回待搜索的查询，否则返回 undefined
    pub fn poll(&mut self) -> Option<String> {
        self.debouncer.poll(js_sys::Date::now() as u64)
    }

    /// 回车：跳过防抖，返回应立即提交的查询
    pub fn enter(&mut self, text: &str) -> String {
        self.debouncer.enter(text)
    }

    /// 为即将发出的查询领取票据
    pub fn issue_ticket(&mut self) -> u32 {
        self.sequencer.issue().0
    }

    /// 票据对应的查询是否仍是最新一次，过期结果不应渲染
    pub fn is_current(&self, ticket: u32) -> bool {
        self.sequencer.is_current(QueryTicket(ticket))
    }

    fn finish(mut results: SearchResults, start_time: f64) -> Result<JsValue, JsValue> {
        results.time_ms = (performance_now() - start_time).max(0.0) as usize;
        serde_wasm_bindgen::to_value(&results)
            .map_err(|e| to_js_error(format!("序列化搜索结果失败: {}", e)))
    }
}
