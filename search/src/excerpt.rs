use utils_common::text::{decode_entities, escape_html, fold_case, strip_markup};

/// 摘要中匹配位置前后默认保留的字符数
pub const DEFAULT_RADIUS: usize = 50;
/// 截断标记
pub const ELLIPSIS: &str = "...";
/// 高亮标记
pub const MARK_OPEN: &str = "<mark>";
pub const MARK_CLOSE: &str = "</mark>";

/// 逐字符小写后的文本，保留到原文的字节位置映射
///
/// 小写可能改变字符数（`İ` 变成 `i` 加组合点），所以匹配在折叠后的文本上进行，
/// 再换算回原文的字符边界。
struct FoldedText {
    folded: String,
    /// 折叠文本中每个字符: (折叠文本起始字节, 原字符起始字节, 原字符结束字节)
    spans: Vec<(usize, usize, usize)>,
}

impl FoldedText {
    fn new(text: &str) -> Self {
        let mut folded = String::with_capacity(text.len());
        let mut spans = Vec::with_capacity(text.len());

        for (start, c) in text.char_indices() {
            let end = start + c.len_utf8();
            for lower in c.to_lowercase() {
                spans.push((folded.len(), start, end));
                folded.push(lower);
            }
        }

        Self { folded, spans }
    }

    // 折叠文本中的 [start, end) 换算为原文区间，部分命中的原字符整体计入
    fn original_range(&self, start: usize, end: usize) -> Option<(usize, usize)> {
        let first = self.spans.partition_point(|span| span.0 < start);
        let last = self.spans.partition_point(|span| span.0 < end).checked_sub(1)?;
        Some((self.spans.get(first)?.1, self.spans.get(last)?.2))
    }

    /// 已折叠查询在原文中的所有（不重叠）出现位置，查询按字面匹配
    fn find_all<'a>(
        &'a self,
        folded_query: &'a str,
    ) -> impl Iterator<Item = (usize, usize)> + 'a {
        self.folded
            .match_indices(folded_query)
            .filter(move |_| !folded_query.is_empty())
            .filter_map(move |(i, m)| self.original_range(i, i + m.len()))
    }
}

/// 生成正文摘要
///
/// 先去掉HTML标签并解码实体，再定位查询第一次出现的位置，截取前后各 `radius`
/// 个字符；哪一侧被截断就在哪一侧加上省略号。查询为空或未命中时返回开头
/// `3 * radius` 个字符并以省略号结尾。结果是纯文本。
pub fn excerpt(content: &str, query: &str, radius: usize) -> String {
    let clean = decode_entities(&strip_markup(content));
    let folded_query = fold_case(query.trim());

    let folded = FoldedText::new(&clean);
    if let Some((found_start, found_end)) = folded.find_all(&folded_query).next() {
        let start = back_chars(&clean, found_start, radius);
        let end = forward_chars(&clean, found_end, radius);

        let mut result = String::with_capacity(end - start + ELLIPSIS.len() * 2);
        if start > 0 {
            result.push_str(ELLIPSIS);
        }
        result.push_str(&clean[start..end]);
        if end < clean.len() {
            result.push_str(ELLIPSIS);
        }
        return result;
    }

    let end = forward_chars(&clean, 0, radius.saturating_mul(3));
    format!("{}{}", &clean[..end], ELLIPSIS)
}

/// 高亮文本中所有（大小写不敏感的）查询出现位置
///
/// 用于纯文本字段（如标题）：非匹配部分和匹配部分都会做HTML转义，
/// 结果中唯一的标记是 `<mark>`。大小写折叠方式与评分一致。
pub fn highlight(text: &str, query: &str) -> String {
    let folded_query = fold_case(query.trim());
    if folded_query.is_empty() {
        return escape_html(text);
    }

    let mut highlighted = String::with_capacity(text.len() + 16);
    let mut last_pos = 0;

    for (start, end) in FoldedText::new(text).find_all(&folded_query) {
        if start < last_pos {
            continue;
        }
        highlighted.push_str(&escape_html(&text[last_pos..start]));
        highlighted.push_str(MARK_OPEN);
        highlighted.push_str(&escape_html(&text[start..end]));
        highlighted.push_str(MARK_CLOSE);
        last_pos = end;
    }

    highlighted.push_str(&escape_html(&text[last_pos..]));
    highlighted
}

// 从字节位置 index 向前数 count 个字符，返回新的字节位置
fn back_chars(s: &str, index: usize, count: usize) -> usize {
    s[..index]
        .char_indices()
        .rev()
        .take(count)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(index)
}

// 从字节位置 index 向后数 count 个字符，返回新的字节位置
fn forward_chars(s: &str, index: usize, count: usize) -> usize {
    s[index..]
        .char_indices()
        .nth(count)
        .map(|(i, _)| index + i)
        .unwrap_or(s.len())
}
