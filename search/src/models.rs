use article_filter::SortMode;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utils_common::models::Document;

/// 带相关度分数的文档，引用语料中的原始条目
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredDocument<'a> {
    /// 在语料中的位置
    pub position: usize,
    /// 文档
    pub document: &'a Document,
    /// 相关度分数（空查询时为 0，不参与筛选）
    pub score: u32,
}

/// 搜索结果条目 - 交给页面渲染
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SearchResultItem {
    /// 文章标题
    pub title: String,
    /// 高亮后的标题（已转义，只包含 `<mark>` 标记）
    pub highlighted_title: String,
    /// 文章URL
    pub url: String,
    /// 正文摘要
    pub excerpt: String,
    /// 标签
    pub tags: Vec<String>,
    /// 分类
    pub categories: Vec<String>,
    /// 发布时间
    pub date: Option<DateTime<Utc>>,
    /// 字数
    pub word_count: u32,
    /// 阅读时长（分钟）
    pub reading_time_minutes: u32,
    /// 所属系列
    pub series_name: Option<String>,
    /// 匹配分数
    pub score: u32,
}

/// 搜索结果
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SearchResults {
    /// 结果条目
    pub items: Vec<SearchResultItem>,
    /// 结果总数
    pub total: usize,
    /// 激活的筛选条件数量
    pub active_filters: usize,
    /// 实际使用的查询（已去除首尾空白）
    pub query: String,
    /// 排序方式
    pub sort_mode: SortMode,
    /// 是否为空查询时的浏览结果
    pub browse: bool,
    /// 搜索耗时(毫秒)，由页面绑定层填充
    pub time_ms: usize,
}
