use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 排序方式
///
/// 无法识别的取值一律回退到相关度排序。
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// 按发布时间降序
    Date,
    /// 按阅读时长降序
    #[serde(alias = "readingTime")]
    ReadingTime,
    /// 按相关度降序，`#[serde(other)]` 必须放在最后一个变体上
    #[default]
    #[serde(other)]
    Relevance,
}

impl SortMode {
    /// 从界面传入的字符串解析排序方式
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "date" => SortMode::Date,
            "reading_time" | "readingTime" => SortMode::ReadingTime,
            _ => SortMode::Relevance,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Relevance => "relevance",
            SortMode::Date => "date",
            SortMode::ReadingTime => "reading_time",
        }
    }
}

impl From<&str> for SortMode {
    fn from(value: &str) -> Self {
        SortMode::parse(value)
    }
}

/// 筛选状态 - 当前页面会话内的标签/分类条件、排序方式和查询文本
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct FilterState {
    /// 激活的标签
    pub active_tags: BTreeSet<String>,
    /// 激活的分类
    pub active_categories: BTreeSet<String>,
    /// 排序方式
    pub sort_mode: SortMode,
    /// 当前查询，空字符串表示不按文本筛选
    pub current_query: String,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 切换标签，返回切换后该标签是否处于激活状态
    pub fn toggle_tag(&mut self, tag: &str) -> bool {
        toggle(&mut self.active_tags, tag)
    }

    /// 切换分类，返回切换后该分类是否处于激活状态
    pub fn toggle_category(&mut self, category: &str) -> bool {
        toggle(&mut self.active_categories, category)
    }

    /// 清除所有标签和分类条件，排序方式和查询保持不变
    pub fn clear(&mut self) {
        self.active_tags.clear();
        self.active_categories.clear();
    }

    /// 激活的筛选条件数量
    pub fn active_filter_count(&self) -> usize {
        self.active_tags.len() + self.active_categories.len()
    }

    pub fn set_sort_mode(&mut self, mode: SortMode) {
        self.sort_mode = mode;
    }
}

fn toggle(set: &mut BTreeSet<String>, token: &str) -> bool {
    if set.remove(token) {
        false
    } else {
        set.insert(token.to_string());
        true
    }
}

/// 标签或分类的使用次数
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FacetCount {
    /// 标签/分类名
    pub name: String,
    /// 使用该标签/分类的文章数
    pub count: usize,
}

/// 语料的标签和分类统计
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Facets {
    /// 按使用次数降序排列的标签
    pub tags: Vec<FacetCount>,
    /// 按使用次数降序排列的分类
    pub categories: Vec<FacetCount>,
}

impl Facets {
    /// 最热门的前 `limit` 个标签
    pub fn top_tags(&self, limit: usize) -> &[FacetCount] {
        &self.tags[..limit.min(self.tags.len())]
    }

    /// 最热门的前 `limit` 个分类
    pub fn top_categories(&self, limit: usize) -> &[FacetCount] {
        &self.categories[..limit.min(self.categories.len())]
    }
}
