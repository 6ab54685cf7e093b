use article_filter::{ArticleFilter, FacetBuilder, FacetCount, Facets, FilterState, SortMode};
use utils_common::config::SearchConfig;
use utils_common::models::Document;
use utils_common::text::fold_case;

use crate::excerpt::{excerpt, highlight};
use crate::history::SearchHistory;
use crate::models::{ScoredDocument, SearchResultItem, SearchResults};

/// 标题命中权重
pub const TITLE_WEIGHT: u32 = 10;
/// 任一标签命中权重
pub const TAG_WEIGHT: u32 = 5;
/// 正文命中权重
pub const CONTENT_WEIGHT: u32 = 1;
/// 空查询时返回的最近文章数
pub const DEFAULT_BROWSE_LIMIT: usize = 10;

/// 计算文档对（已用 [`fold_case`] 小写的）查询的相关度
///
/// 标题、标签、正文各自按子串包含计分，分数可叠加，范围 0 到 16。
pub fn score(document: &Document, lowered_query: &str) -> u32 {
    let mut score = 0;

    if fold_case(&document.title).contains(lowered_query) {
        score += TITLE_WEIGHT;
    }

    if document
        .tags
        .iter()
        .any(|tag| fold_case(tag).contains(lowered_query))
    {
        score += TAG_WEIGHT;
    }

    if fold_case(&document.content).contains(lowered_query) {
        score += CONTENT_WEIGHT;
    }

    score
}

/// 执行一次查询：筛选 -> 计分 -> 排序
pub fn query<'a>(
    corpus: &'a [Document],
    filter: &FilterState,
    query_text: &str,
) -> Vec<ScoredDocument<'a>> {
    query_with_limit(corpus, filter, query_text, DEFAULT_BROWSE_LIMIT)
}

/// 执行一次查询，`browse_limit` 为空查询时返回的文章数上限
///
/// 查询非空时，0 分的文档被排除，其余按筛选状态中的排序方式稳定排序；
/// 查询为空时忽略排序方式，返回满足筛选条件的最近 `browse_limit` 篇文章。
pub fn query_with_limit<'a>(
    corpus: &'a [Document],
    filter: &FilterState,
    query_text: &str,
    browse_limit: usize,
) -> Vec<ScoredDocument<'a>> {
    let candidate_ids = ArticleFilter::apply(corpus, filter);
    let query_text = query_text.trim();

    if query_text.is_empty() {
        return browse(corpus, candidate_ids, browse_limit);
    }

    let lowered = fold_case(query_text);
    let mut hits: Vec<ScoredDocument<'a>> = candidate_ids
        .into_iter()
        .filter_map(|position| {
            let document = corpus.get(position)?;
            let relevance = score(document, &lowered);
            (relevance > 0).then_some(ScoredDocument {
                position,
                document,
                score: relevance,
            })
        })
        .collect();

    sort_hits(&mut hits, filter.sort_mode);
    hits
}

// 空查询：按发布时间取最近的文章
fn browse<'a>(
    corpus: &'a [Document],
    candidate_ids: Vec<usize>,
    limit: usize,
) -> Vec<ScoredDocument<'a>> {
    let mut recent: Vec<ScoredDocument<'a>> = candidate_ids
        .into_iter()
        .filter_map(|position| {
            corpus.get(position).map(|document| ScoredDocument {
                position,
                document,
                score: 0,
            })
        })
        .collect();

    sort_hits(&mut recent, SortMode::Date);
    recent.truncate(limit);
    recent
}

// 应用排序，sort_by 是稳定排序，键相同时保持语料顺序
fn sort_hits(hits: &mut [ScoredDocument<'_>], mode: SortMode) {
    match mode {
        SortMode::Date => {
            hits.sort_by(|a, b| b.document.date_key().cmp(&a.document.date_key()));
        }
        SortMode::ReadingTime => {
            hits.sort_by(|a, b| {
                b.document
                    .reading_time_minutes
                    .cmp(&a.document.reading_time_minutes)
            });
        }
        SortMode::Relevance => {
            hits.sort_by(|a, b| b.score.cmp(&a.score));
        }
    }
}

/// 搜索引擎 - 持有语料和筛选状态
///
/// 语料在构造后只读；筛选状态只能通过这里的方法修改。
pub struct SearchEngine {
    corpus: Vec<Document>,
    filter: FilterState,
    config: SearchConfig,
    facets: Facets,
}

impl SearchEngine {
    pub fn new(corpus: Vec<Document>, config: SearchConfig) -> Self {
        Self::with_filter(corpus, FilterState::new(), config)
    }

    pub fn with_filter(corpus: Vec<Document>, filter: FilterState, config: SearchConfig) -> Self {
        let facets = FacetBuilder::from_corpus(&corpus);
        tracing::debug!(
            "搜索引擎初始化完成，文章: {}, 标签: {}, 分类: {}",
            corpus.len(),
            facets.tags.len(),
            facets.categories.len()
        );

        Self {
            corpus,
            filter,
            config,
            facets,
        }
    }

    pub fn corpus(&self) -> &[Document] {
        &self.corpus
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// 实时搜索（防抖后的输入），不写入历史
    pub fn search(&mut self, text: &str) -> SearchResults {
        self.filter.current_query = text.trim().to_string();
        self.refresh()
    }

    /// 提交搜索（回车），非空查询写入调用方持有的搜索历史
    pub fn submit(&mut self, text: &str, history: &mut SearchHistory) -> SearchResults {
        history.record(text);
        self.search(text)
    }

    /// 用当前查询和筛选条件重新计算结果
    pub fn refresh(&self) -> SearchResults {
        let query_text = self.filter.current_query.as_str();
        let hits =
            query_with_limit(&self.corpus, &self.filter, query_text, self.config.browse_limit);

        let items: Vec<SearchResultItem> = hits
            .iter()
            .map(|hit| build_item(hit, query_text, self.config.excerpt_radius))
            .collect();

        tracing::debug!(
            "查询 {:?} 完成: {} 条结果, 排序: {}, 筛选条件: {}",
            query_text,
            items.len(),
            self.filter.sort_mode.as_str(),
            self.filter.active_filter_count()
        );

        SearchResults {
            total: items.len(),
            items,
            active_filters: self.filter.active_filter_count(),
            query: query_text.to_string(),
            sort_mode: self.filter.sort_mode,
            browse: query_text.is_empty(),
            time_ms: 0,
        }
    }

    /// 切换标签筛选，返回该标签是否处于激活状态
    pub fn toggle_tag(&mut self, tag: &str) -> bool {
        self.filter.toggle_tag(tag)
    }

    /// 切换分类筛选，返回该分类是否处于激活状态
    pub fn toggle_category(&mut self, category: &str) -> bool {
        self.filter.toggle_category(category)
    }

    pub fn set_sort_mode(&mut self, mode: SortMode) {
        self.filter.set_sort_mode(mode);
    }

    /// 清除所有标签和分类条件
    pub fn clear_filters(&mut self) {
        self.filter.clear();
    }

    /// 热门标签
    pub fn popular_tags(&self) -> &[FacetCount] {
        self.facets.top_tags(self.config.popular_tag_limit)
    }

    /// 热门分类
    pub fn popular_categories(&self) -> &[FacetCount] {
        self.facets.top_categories(self.config.popular_tag_limit)
    }
}

fn build_item(hit: &ScoredDocument<'_>, query_text: &str, radius: usize) -> SearchResultItem {
    let document = hit.document;
    SearchResultItem {
        title: document.title.clone(),
        highlighted_title: highlight(&document.title, query_text),
        url: document.url.clone(),
        excerpt: excerpt(&document.content, query_text, radius),
        tags: document.tags.clone(),
        categories: document.categories.clone(),
        date: document.published_at,
        word_count: document.word_count,
        reading_time_minutes: document.reading_time_minutes,
        series_name: document.series_name.clone(),
        score: hit.score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryStore;
    use pretty_assertions::assert_eq;
    use utils_common::models::parse_date;

    fn doc(title: &str, tags: &[&str], content: &str, date: &str, reading_time: u32) -> Document {
        Document {
            title: title.to_string(),
            content: content.to_string(),
            url: format!("/{}", title.to_lowercase().replace(' ', "-")),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            published_at: parse_date(date),
            reading_time_minutes: reading_time,
            ..Default::default()
        }
    }

    fn sample_corpus() -> Vec<Document> {
        vec![
            doc("Rust async", &["rust", "async"], "deep dive into async", "2024-01-01", 5),
            doc("Go channels", &["go"], "channels and goroutines", "2024-02-01", 8),
        ]
    }

    fn titles(hits: &[ScoredDocument<'_>]) -> Vec<String> {
        hits.iter().map(|hit| hit.document.title.clone()).collect()
    }

    #[test]
    fn relevance_query_excludes_zero_scores() {
        let corpus = sample_corpus();
        let hits = query(&corpus, &FilterState::new(), "async");

        assert_eq!(titles(&hits), vec!["Rust async"]);
        assert_eq!(hits[0].score, 16);
    }

    #[test]
    fn title_and_content_match_scores_eleven() {
        let corpus = vec![doc("Rust async", &["rust"], "deep dive into async", "2024-01-01", 5)];
        let hits = query(&corpus, &FilterState::new(), "async");
        assert_eq!(hits[0].score, TITLE_WEIGHT + CONTENT_WEIGHT);
    }

    #[test]
    fn empty_query_browses_by_date_regardless_of_sort_mode() {
        let corpus = sample_corpus();
        let mut filter = FilterState::new();
        filter.set_sort_mode(SortMode::ReadingTime);

        let hits = query(&corpus, &filter, "");
        assert_eq!(titles(&hits), vec!["Go channels", "Rust async"]);
        assert!(hits.iter().all(|hit| hit.score == 0));

        assert_eq!(titles(&query(&corpus, &filter, "   ")), vec!["Go channels", "Rust async"]);
    }

    #[test]
    fn score_weights_are_additive() {
        let document = doc("Async Rust", &["ASYNC"], "<p>async</p>", "", 0);
        assert_eq!(score(&document, "async"), 16);
        assert_eq!(score(&document, "rust"), 10);
        assert_eq!(score(&document, "<p>"), 1);
        assert_eq!(score(&document, "zig"), 0);
    }

    #[test]
    fn query_is_case_insensitive() {
        let corpus = sample_corpus();
        assert_eq!(titles(&query(&corpus, &FilterState::new(), "GO")), vec!["Go channels"]);
    }

    #[test]
    fn scored_titles_are_always_highlighted() {
        let document = doc("İzmir travel", &[], "", "", 0);
        let folded = fold_case("İ");
        assert_eq!(score(&document, &folded), TITLE_WEIGHT);
        assert_eq!(highlight(&document.title, "İ"), "<mark>İ</mark>zmir travel");
    }

    #[test]
    fn relevance_ties_keep_corpus_order() {
        let corpus = vec![
            doc("alpha", &[], "shared", "2020-01-01", 1),
            doc("beta", &[], "shared", "2024-01-01", 9),
            doc("shared title", &[], "", "2019-01-01", 0),
            doc("gamma", &[], "shared", "2022-01-01", 3),
        ];
        let hits = query(&corpus, &FilterState::new(), "shared");
        assert_eq!(titles(&hits), vec!["shared title", "alpha", "beta", "gamma"]);
    }

    #[test]
    fn date_sort_puts_missing_dates_last() {
        let corpus = vec![
            doc("undated note", &[], "", "garbage", 0),
            doc("old note", &[], "", "2001-01-01", 0),
            doc("new note", &[], "", "2024-05-01", 0),
        ];
        let mut filter = FilterState::new();
        filter.set_sort_mode(SortMode::Date);

        let hits = query(&corpus, &filter, "note");
        assert_eq!(titles(&hits), vec!["new note", "old note", "undated note"]);
    }

    #[test]
    fn reading_time_sort_is_descending() {
        let corpus = vec![
            doc("short read", &[], "", "", 2),
            doc("long read", &[], "", "", 20),
            doc("medium read", &[], "", "", 7),
        ];
        let mut filter = FilterState::new();
        filter.set_sort_mode(SortMode::ReadingTime);

        let hits = query(&corpus, &filter, "read");
        assert_eq!(titles(&hits), vec!["long read", "medium read", "short read"]);
    }

    #[test]
    fn browse_is_capped_and_respects_filters() {
        let corpus: Vec<Document> = (1..=15)
            .map(|day| {
                let tag = if day % 2 == 0 { "even" } else { "odd" };
                doc(&format!("post {}", day), &[tag], "", &format!("2024-03-{:02}", day), 0)
            })
            .collect();

        let all = query(&corpus, &FilterState::new(), "");
        assert_eq!(all.len(), 10);
        assert_eq!(all[0].document.title, "post 15");
        assert_eq!(all[9].document.title, "post 6");

        let mut filter = FilterState::new();
        filter.toggle_tag("even");
        let even = query(&corpus, &filter, "");
        assert_eq!(even.len(), 7);
        assert!(even.iter().all(|hit| hit.document.tags == vec!["even"]));
    }

    #[test]
    fn engine_search_builds_render_items() {
        let mut engine = SearchEngine::new(sample_corpus(), SearchConfig::default());
        let results = engine.search("  async ");

        assert_eq!(results.query, "async");
        assert_eq!(results.total, 1);
        assert!(!results.browse);

        let item = &results.items[0];
        assert_eq!(item.highlighted_title, "Rust <mark>async</mark>");
        assert_eq!(item.excerpt, "deep dive into async");
        assert_eq!(item.url, "/rust-async");
    }

    #[test]
    fn engine_submit_records_history_but_search_does_not() {
        let mut engine = SearchEngine::new(sample_corpus(), SearchConfig::default());
        let mut history = SearchHistory::load(Box::new(MemoryStore::new()), "search_history", 10);

        engine.search("go");
        assert!(history.is_empty());

        engine.submit("go", &mut history);
        engine.submit("", &mut history);
        assert_eq!(history.entries(), &["go"]);
    }

    #[test]
    fn engine_filters_and_refresh() {
        let mut engine = SearchEngine::new(sample_corpus(), SearchConfig::default());
        engine.search("o");

        assert!(engine.toggle_tag("go"));
        let results = engine.refresh();
        assert_eq!(results.active_filters, 1);
        assert_eq!(results.items.len(), 1);
        assert_eq!(results.items[0].title, "Go channels");

        engine.clear_filters();
        assert_eq!(engine.refresh().active_filters, 0);
    }

    #[test]
    fn engine_exposes_popular_tags() {
        let mut corpus = sample_corpus();
        corpus.push(doc("More rust", &["rust"], "", "", 0));
        let engine = SearchEngine::new(corpus, SearchConfig::default());

        let popular = engine.popular_tags();
        assert_eq!(popular[0].name, "rust");
        assert_eq!(popular[0].count, 2);
    }
}
