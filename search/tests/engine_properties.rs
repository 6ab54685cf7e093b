use std::collections::HashSet;

use article_filter::{ArticleFilter, FilterState, SortMode};
use chrono::DateTime;
use proptest::prelude::*;
use search_wasm::{query_with_limit, score, MemoryStore, SearchHistory};
use utils_common::models::Document;
use utils_common::text::fold_case;

const TITLES: [&str; 6] =
    ["Rust async", "Go channels", "wasm notes", "Async IO", "misc", "GO and rust"];
const CONTENTS: [&str; 5] =
    ["", "deep dive into async", "<p>channels</p>", "rust and wasm", "nothing here"];
const TAGS: [&str; 4] = ["rust", "async", "go", "wasm"];
const CATEGORIES: [&str; 2] = ["dev", "life"];
const QUERIES: [&str; 9] = ["", "  ", "async", "rust", "GO", "wasm", "zzz", "as", " notes "];

fn document() -> impl Strategy<Value = Document> {
    (
        prop::sample::select(TITLES.to_vec()),
        prop::sample::select(CONTENTS.to_vec()),
        prop::sample::subsequence(TAGS.to_vec(), 0..=2),
        prop::sample::subsequence(CATEGORIES.to_vec(), 0..=1),
        prop::option::of(0i64..2_000),
        0u32..20,
    )
        .prop_map(|(title, content, tags, categories, day, reading_time)| Document {
            title: title.to_string(),
            content: content.to_string(),
            tags: tags.into_iter().map(String::from).collect(),
            categories: categories.into_iter().map(String::from).collect(),
            published_at: day.and_then(|d| DateTime::from_timestamp(1_600_000_000 + d * 86_400, 0)),
            reading_time_minutes: reading_time,
            ..Default::default()
        })
}

fn corpus() -> impl Strategy<Value = Vec<Document>> {
    prop::collection::vec(document(), 0..24).prop_map(|documents| {
        documents
            .into_iter()
            .enumerate()
            .map(|(i, mut document)| {
                document.url = format!("/posts/{}/", i);
                document
            })
            .collect()
    })
}

fn filter_state() -> impl Strategy<Value = FilterState> {
    (
        prop::sample::subsequence(TAGS.to_vec(), 0..=2),
        prop::sample::subsequence(CATEGORIES.to_vec(), 0..=1),
        prop::sample::select(vec![SortMode::Relevance, SortMode::Date, SortMode::ReadingTime]),
    )
        .prop_map(|(tags, categories, sort_mode)| {
            let mut state = FilterState::new();
            for tag in tags {
                state.toggle_tag(tag);
            }
            for category in categories {
                state.toggle_category(category);
            }
            state.set_sort_mode(sort_mode);
            state
        })
}

proptest! {
    #[test]
    fn results_are_exactly_the_matching_filtered_documents(
        corpus in corpus(),
        state in filter_state(),
        query in prop::sample::select(QUERIES.to_vec()),
    ) {
        let hits = query_with_limit(&corpus, &state, query, 10);
        let lowered = fold_case(query.trim());

        for hit in &hits {
            prop_assert!(ArticleFilter::matches(hit.document, &state));
        }

        if lowered.is_empty() {
            let eligible = corpus.iter().filter(|d| ArticleFilter::matches(d, &state)).count();
            prop_assert_eq!(hits.len(), eligible.min(10));
        } else {
            let expected: HashSet<usize> = (0..corpus.len())
                .filter(|&i| {
                    ArticleFilter::matches(&corpus[i], &state) && score(&corpus[i], &lowered) > 0
                })
                .collect();
            let actual: HashSet<usize> = hits.iter().map(|hit| hit.position).collect();
            prop_assert_eq!(actual, expected);

            for hit in &hits {
                prop_assert_eq!(hit.score, score(hit.document, &lowered));
            }
        }
    }

    #[test]
    fn ordering_is_descending_and_stable(
        corpus in corpus(),
        state in filter_state(),
        query in prop::sample::select(QUERIES.to_vec()),
    ) {
        let hits = query_with_limit(&corpus, &state, query, usize::MAX);
        let browse = query.trim().is_empty();

        for pair in hits.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            let mode = if browse { SortMode::Date } else { state.sort_mode };
            let ordering = match mode {
                SortMode::Relevance => b.score.cmp(&a.score),
                SortMode::Date => b.document.date_key().cmp(&a.document.date_key()),
                SortMode::ReadingTime => b
                    .document
                    .reading_time_minutes
                    .cmp(&a.document.reading_time_minutes),
            };
            prop_assert!(ordering.is_le());
            if ordering.is_eq() {
                prop_assert!(a.position < b.position);
            }
        }
    }

    #[test]
    fn history_stays_unique_and_bounded(queries in prop::collection::vec("[a-c ]{0,3}", 0..40)) {
        let mut history = SearchHistory::load(Box::new(MemoryStore::new()), "search_history", 10);
        for query in &queries {
            history.record(query);
        }

        let entries = history.entries();
        prop_assert!(entries.len() <= 10);

        let unique: HashSet<&String> = entries.iter().collect();
        prop_assert_eq!(unique.len(), entries.len());
        prop_assert!(entries.iter().all(|entry| !entry.is_empty() && entry.trim() == entry));

        if let Some(last) = queries.iter().rev().map(|q| q.trim()).find(|q| !q.is_empty()) {
            prop_assert_eq!(entries[0].as_str(), last);
        }
    }
}
