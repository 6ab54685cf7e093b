use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// 文档 - 语料中的一篇文章
///
/// `url` 在同一份语料中唯一，作为文档的身份标识。
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Document {
    /// 文章标题
    pub title: String,
    /// 文章正文（可能包含HTML标记）
    #[serde(default)]
    pub content: String,
    /// 文章URL路径
    pub url: String,
    /// 标签列表，保持源顺序，不去重
    #[serde(default)]
    pub tags: Vec<String>,
    /// 分类列表
    #[serde(default)]
    pub categories: Vec<String>,
    /// 发布时间，缺失或无法解析时为 None（排序时视为最旧）
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    /// 字数
    #[serde(default)]
    pub word_count: u32,
    /// 预计阅读时长（分钟）
    #[serde(default)]
    pub reading_time_minutes: u32,
    /// 所属系列
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_name: Option<String>,
}

impl Document {
    /// 用于排序的发布时间键，None 小于任何有效时间
    pub fn date_key(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }
}

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// 解析feed中的日期字段
///
/// 依次尝试 RFC 3339、RFC 2822、不带时区的日期时间和纯日期；
/// 不带时区的值按 UTC 处理。全部失败时返回 None。
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }

    None
}
