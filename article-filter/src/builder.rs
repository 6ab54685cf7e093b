use crate::models::{FacetCount, Facets};
use std::collections::HashMap;
use utils_common::models::Document;

/// 统计表：名称 -> (次数, 首次出现的顺序)
type Tally = HashMap<String, (usize, usize)>;

/// 标签/分类统计构建器
pub struct FacetBuilder {
    tags: Tally,
    categories: Tally,
}

impl FacetBuilder {
    /// 创建新的统计构建器
    pub fn new() -> Self {
        Self {
            tags: HashMap::new(),
            categories: HashMap::new(),
        }
    }

    /// 统计一篇文章的标签和分类
    ///
    /// 同一篇文章里重复出现的标签按出现次数累计，与源数据保持一致。
    pub fn add_document(&mut self, document: &Document) {
        for tag in &document.tags {
            bump(&mut self.tags, tag);
        }
        for category in &document.categories {
            bump(&mut self.categories, category);
        }
    }

    /// 构建统计结果：次数降序，次数相同时按首次出现的顺序
    pub fn build(self) -> Facets {
        tracing::debug!(
            "标签统计完成，标签数量: {}, 分类数量: {}",
            self.tags.len(),
            self.categories.len()
        );

        Facets {
            tags: rank(self.tags),
            categories: rank(self.categories),
        }
    }

    /// 直接从语料构建统计
    pub fn from_corpus(corpus: &[Document]) -> Facets {
        let mut builder = Self::new();
        for document in corpus {
            builder.add_document(document);
        }
        builder.build()
    }
}

impl Default for FacetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn bump(tally: &mut Tally, name: &str) {
    let order = tally.len();
    tally.entry(name.to_string()).or_insert((0, order)).0 += 1;
}

fn rank(tally: Tally) -> Vec<FacetCount> {
    let mut entries: Vec<(String, usize, usize)> = tally
        .into_iter()
        .map(|(name, (count, order))| (name, count, order))
        .collect();

    entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    entries
        .into_iter()
        .map(|(name, count, _)| FacetCount { name, count })
        .collect()
}
