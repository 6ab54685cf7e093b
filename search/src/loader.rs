use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};
use utils_common::models::{parse_date, Document};
use utils_common::text::split_list;

use crate::error::LoadError;

/// JSON feed 根节点为对象时，记录列表可能所在的键
const FEED_LIST_KEYS: [&str; 3] = ["posts", "entries", "entry"];

/// 语料数据源
///
/// 页面中由宿主负责网络请求，拿到文本后交给 [`StaticSource`]；
/// 本地工具直接从文件读取。
pub trait CorpusSource {
    /// 数据源位置，用于日志和错误信息
    fn location(&self) -> String;

    /// 读取 feed 原文
    fn fetch(&self) -> Result<String, LoadError>;
}

/// 已在内存中的 feed 文本
pub struct StaticSource {
    location: String,
    text: String,
}

impl StaticSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_location("inline", text)
    }

    pub fn with_location(location: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            text: text.into(),
        }
    }
}

impl CorpusSource for StaticSource {
    fn location(&self) -> String {
        self.location.clone()
    }

    fn fetch(&self) -> Result<String, LoadError> {
        Ok(self.text.clone())
    }
}

/// 本地 feed 文件
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CorpusSource for FileSource {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<String, LoadError> {
        fs::read_to_string(&self.path).map_err(|e| LoadError::Fetch {
            location: self.location(),
            message: e.to_string(),
        })
    }
}

/// feed 格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    /// `<search><entry>...</entry></search>`
    Xml,
    /// 记录数组，或包含记录数组的对象
    Json,
}

impl FeedFormat {
    /// 根据第一个非空白字符判断格式
    pub fn detect(text: &str) -> Option<Self> {
        match text.trim_start_matches('\u{feff}').trim_start().chars().next() {
            Some('<') => Some(FeedFormat::Xml),
            Some('[') | Some('{') => Some(FeedFormat::Json),
            _ => None,
        }
    }
}

/// 从数据源加载语料
pub fn load(source: &dyn CorpusSource) -> Result<Vec<Document>, LoadError> {
    let text = source.fetch()?;
    let corpus = parse_feed(&text)?;
    tracing::info!("语料加载完成: {} 篇文章 (来源: {})", corpus.len(), source.location());
    Ok(corpus)
}

/// 解析 feed 文本
///
/// 单条记录中格式错误的字段退化为默认值，记录本身仍然保留；
/// 只有整个文档无法解析时才返回错误。URL 重复的记录只保留第一条。
pub fn parse_feed(text: &str) -> Result<Vec<Document>, LoadError> {
    let records = match FeedFormat::detect(text) {
        Some(FeedFormat::Xml) => parse_xml_records(text)?,
        Some(FeedFormat::Json) => parse_json_records(text)?,
        None => return Err(LoadError::Parse("无法识别的 feed 格式".to_string())),
    };

    Ok(dedup_by_url(records.into_iter().map(RawRecord::into_document)))
}

/// 解析前的原始记录，所有字段保持文本形式
#[derive(Default, Debug)]
struct RawRecord {
    title: String,
    content: String,
    url: String,
    link: String,
    date: String,
    word_count: String,
    reading_time: String,
    series: String,
    tags: Vec<String>,
    categories: Vec<String>,
}

impl RawRecord {
    fn is_list_field(field: &str) -> bool {
        matches!(field, "tags" | "tag" | "categories" | "category")
    }

    fn push_text(&mut self, field: &str, text: &str) {
        match field {
            "title" => self.title.push_str(text),
            "content" => self.content.push_str(text),
            "url" => self.url.push_str(text),
            "link" | "permalink" | "path" => self.link.push_str(text),
            "date" => self.date.push_str(text),
            "word_count" | "wordCount" => self.word_count.push_str(text),
            "reading_time" | "readingTime" => self.reading_time.push_str(text),
            "series" => self.series.push_str(text),
            "tags" | "tag" => self.tags.extend(split_list(text)),
            "categories" | "category" => self.categories.extend(split_list(text)),
            _ => {}
        }
    }

    fn into_document(self) -> Document {
        let url = if self.url.trim().is_empty() {
            self.link.trim().to_string()
        } else {
            self.url.trim().to_string()
        };
        let series = self.series.trim().to_string();

        Document {
            title: self.title.trim().to_string(),
            content: self.content,
            url,
            tags: self.tags,
            categories: self.categories,
            published_at: parse_date(&self.date),
            word_count: parse_count(&self.word_count),
            reading_time_minutes: parse_count(&self.reading_time),
            series_name: (!series.is_empty()).then_some(series),
        }
    }
}

/// 取开头的数字部分，"12 分钟" 得到 12，无法解析时为 0
fn parse_count(raw: &str) -> u32 {
    let digits: String = raw.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

fn dedup_by_url(documents: impl Iterator<Item = Document>) -> Vec<Document> {
    let mut seen = HashSet::new();
    let mut corpus = Vec::new();

    for document in documents {
        if !document.url.is_empty() && !seen.insert(document.url.clone()) {
            tracing::warn!("忽略重复的文章URL: {}", document.url);
            continue;
        }
        corpus.push(document);
    }

    corpus
}

//===== XML =====

fn parse_xml_records(text: &str) -> Result<Vec<RawRecord>, LoadError> {
    let mut reader = Reader::from_str(text);
    reader.trim_text(true);

    let mut records = Vec::new();
    // 当前打开的元素栈
    let mut stack: Vec<String> = Vec::new();
    let mut current: Option<RawRecord> = None;
    // entry 的直接子元素在栈中的下标
    let mut entry_depth = 0;
    let mut saw_element = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                saw_element = true;
                let name = element_name(&e);

                if current.is_none() && name == "entry" {
                    current = Some(RawRecord::default());
                    entry_depth = stack.len() + 1;
                } else if let Some(record) = current.as_mut() {
                    if stack.len() == entry_depth && name == "link" {
                        read_href(&e, record);
                    }
                }

                stack.push(name);
            }
            Ok(Event::Empty(e)) => {
                saw_element = true;
                if let Some(record) = current.as_mut() {
                    if stack.len() == entry_depth && element_name(&e) == "link" {
                        read_href(&e, record);
                    }
                }
            }
            Ok(Event::Text(t)) => {
                if let (Some(record), Some(field)) = (current.as_mut(), stack.get(entry_depth)) {
                    // 无法识别的实体不影响整条记录，保留原文
                    let text = t
                        .unescape()
                        .map(|s| s.into_owned())
                        .unwrap_or_else(|_| String::from_utf8_lossy(&t).into_owned());
                    record.push_text(field, &text);
                }
            }
            Ok(Event::CData(c)) => {
                if let (Some(record), Some(field)) = (current.as_mut(), stack.get(entry_depth)) {
                    let text = String::from_utf8_lossy(&c.into_inner()).into_owned();
                    record.push_text(field, &text);
                }
            }
            Ok(Event::End(_)) => {
                stack.pop();
                if current.is_some() && stack.len() < entry_depth {
                    if let Some(record) = current.take() {
                        records.push(record);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(LoadError::Parse(format!(
                    "XML 第 {} 字节附近格式错误: {}",
                    reader.buffer_position(),
                    e
                )));
            }
        }
    }

    if !saw_element {
        return Err(LoadError::Parse("feed 中没有任何 XML 元素".to_string()));
    }
    if current.is_some() || !stack.is_empty() {
        return Err(LoadError::Parse("XML 文档不完整: 存在未闭合的元素".to_string()));
    }

    Ok(records)
}

fn element_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

// <link href="..."/> 作为 url 的后备值
fn read_href(e: &BytesStart, record: &mut RawRecord) {
    if let Ok(Some(attr)) = e.try_get_attribute("href") {
        if let Ok(value) = attr.unescape_value() {
            record.link = value.into_owned();
        }
    }
}

//===== JSON =====

fn parse_json_records(text: &str) -> Result<Vec<RawRecord>, LoadError> {
    let root: Value = serde_json::from_str(text.trim_start_matches('\u{feff}'))?;

    let items = match root {
        Value::Array(items) => items,
        Value::Object(mut map) => FEED_LIST_KEYS
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .ok_or_else(|| LoadError::Parse("JSON feed 中找不到记录列表".to_string()))?,
        _ => return Err(LoadError::Parse("JSON feed 根节点必须是数组或对象".to_string())),
    };

    let mut records = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match item {
            Value::Object(fields) => records.push(record_from_json(fields)),
            _ => tracing::warn!("跳过第 {} 条记录: 不是对象", i),
        }
    }

    Ok(records)
}

fn record_from_json(fields: &Map<String, Value>) -> RawRecord {
    let mut record = RawRecord::default();
    for (field, value) in fields {
        push_json_value(&mut record, field, value);
    }
    record
}

fn push_json_value(record: &mut RawRecord, field: &str, value: &Value) {
    match value {
        Value::String(s) => record.push_text(field, s),
        Value::Number(n) => record.push_text(field, &n.to_string()),
        Value::Bool(b) => record.push_text(field, &b.to_string()),
        Value::Array(items) if RawRecord::is_list_field(field) => {
            for item in items {
                push_json_value(record, field, item);
            }
        }
        // {"name": "rust", "slug": "rust", ...}
        Value::Object(obj) if RawRecord::is_list_field(field) => {
            if let Some(Value::String(name)) = obj.get("name") {
                record.push_text(field, name);
            }
        }
        _ => {}
    }
}
