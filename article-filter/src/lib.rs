use utils_common::models::Document;

// 导出模块
pub mod builder;
pub mod models;

pub use builder::FacetBuilder;
pub use models::{FacetCount, Facets, FilterState, SortMode};

/// 文章过滤器 - 处理标签/分类筛选逻辑
///
/// 标签和分类各自是"任一命中"语义，两者之间是"且"的关系；
/// 条件集合为空时该维度不参与筛选。
pub struct ArticleFilter;

impl ArticleFilter {
    /// 判断文章是否满足当前筛选条件
    pub fn matches(document: &Document, state: &FilterState) -> bool {
        Self::matches_tags(document, state) && Self::matches_categories(document, state)
    }

    /// 按语料顺序返回满足条件的文章下标
    pub fn apply(corpus: &[Document], state: &FilterState) -> Vec<usize> {
        let candidate_ids: Vec<usize> = corpus
            .iter()
            .enumerate()
            .filter(|(_, document)| Self::matches(document, state))
            .map(|(id, _)| id)
            .collect();

        tracing::debug!(
            "筛选完成: {}/{} 篇文章满足条件 (标签 {} 个, 分类 {} 个)",
            candidate_ids.len(),
            corpus.len(),
            state.active_tags.len(),
            state.active_categories.len()
        );

        candidate_ids
    }

    // 标签筛选
    fn matches_tags(document: &Document, state: &FilterState) -> bool {
        state.active_tags.is_empty()
            || document.tags.iter().any(|tag| state.active_tags.contains(tag))
    }

    // 分类筛选
    fn matches_categories(document: &Document, state: &FilterState) -> bool {
        state.active_categories.is_empty()
            || document
                .categories
                .iter()
                .any(|category| state.active_categories.contains(category))
    }
}
