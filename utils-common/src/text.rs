use std::sync::LazyLock;

use regex::{Captures, Regex};

/// 按逗号拆分标签/分类字段：去除首尾空白，丢弃空项，保留顺序和重复项
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

// 成对的 `<...>` 标签
static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

// 文本末尾被截断、没有闭合的标签，如 `<a href="/x`
static TRAILING_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[A-Za-z/!][^<>]*$").expect("valid regex"));

static ENTITY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#([0-9]{1,7})|#[xX]([0-9A-Fa-f]{1,6})|(amp|lt|gt|quot|apos|nbsp));")
        .expect("valid regex")
});

/// 移除字符串中的HTML标签
///
/// 只移除成对的 `<...>` 和末尾未闭合的标签；正文里单独出现的 `<`、`>`
/// （如 `a < b`）原样保留。连续空白折叠为一个空格。
pub fn strip_markup(text: &str) -> String {
    let without_tags = TAG_REGEX.replace_all(text, "");
    let without_tags = TRAILING_TAG_REGEX.replace(&without_tags, "");
    without_tags.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 解码常见的HTML实体，无法识别的实体保留原文
///
/// 只扫描一遍，`&amp;lt;` 得到 `&lt;` 而不是 `<`。
pub fn decode_entities(text: &str) -> String {
    ENTITY_REGEX
        .replace_all(text, |caps: &Captures| {
            let decoded = if let Some(dec) = caps.get(1) {
                dec.as_str().parse::<u32>().ok().and_then(char::from_u32)
            } else if let Some(hex) = caps.get(2) {
                u32::from_str_radix(hex.as_str(), 16).ok().and_then(char::from_u32)
            } else {
                match caps.get(3).map(|m| m.as_str()) {
                    Some("amp") => Some('&'),
                    Some("lt") => Some('<'),
                    Some("gt") => Some('>'),
                    Some("quot") => Some('"'),
                    Some("apos") => Some('\''),
                    Some("nbsp") => Some('\u{a0}'),
                    _ => None,
                }
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

/// 逐字符转小写，评分和高亮共用同一种折叠方式
pub fn fold_case(text: &str) -> String {
    text.chars().flat_map(char::to_lowercase).collect()
}

/// 转义HTML特殊字符
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
