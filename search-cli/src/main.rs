use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use article_filter::{FilterState, SortMode};
use search_wasm::{load, SearchEngine, SearchHistory, SearchResults};
use utils_common::config::SearchConfig;

mod source;
mod store;

use store::FileStore;

const DEFAULT_FEED: &str = "public/search.xml";
const DEFAULT_HISTORY_FILE: &str = ".blog-search-history.json";

fn cli() -> Command {
    Command::new("博客搜索")
        .version(env!("CARGO_PKG_VERSION"))
        .about("在命令行中查询博客搜索 feed")
        .arg(Arg::new("query")
            .value_name("QUERY")
            .help("搜索关键词，留空时列出最近的文章"))
        .arg(Arg::new("feed")
            .short('f')
            .long("feed")
            .value_name("PATH_OR_URL")
            .help("feed 文件路径或 http(s) 地址")
            .default_value(DEFAULT_FEED))
        .arg(Arg::new("tag")
            .short('t')
            .long("tag")
            .value_name("TAG")
            .help("按标签筛选，可重复")
            .action(ArgAction::Append))
        .arg(Arg::new("category")
            .short('c')
            .long("category")
            .value_name("CATEGORY")
            .help("按分类筛选，可重复")
            .action(ArgAction::Append))
        .arg(Arg::new("sort")
            .short('s')
            .long("sort")
            .value_name("MODE")
            .help("排序方式")
            .value_parser(["relevance", "date", "reading_time"])
            .default_value("relevance"))
        .arg(Arg::new("config")
            .long("config")
            .value_name("CONFIG_FILE")
            .help("JSON 配置文件"))
        .arg(Arg::new("history_file")
            .long("history-file")
            .value_name("FILE")
            .help("搜索历史文件")
            .default_value(DEFAULT_HISTORY_FILE))
        .arg(Arg::new("show_history")
            .long("show-history")
            .help("显示搜索历史")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("clear_history")
            .long("clear-history")
            .help("清空搜索历史")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("popular")
            .long("popular")
            .help("显示热门标签和分类")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("json")
            .long("json")
            .help("以 JSON 输出结果")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .help("显示详细信息")
            .action(ArgAction::SetTrue))
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&String>) -> Result<SearchConfig> {
    match path {
        Some(path) => {
            let raw = fs::read_to_string(path).with_context(|| format!("无法读取配置文件 {}", path))?;
            SearchConfig::from_json(&raw).with_context(|| format!("配置文件 {} 无效", path))
        }
        None => Ok(SearchConfig::default()),
    }
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("verbose"));

    let config = load_config(matches.get_one::<String>("config"))?;

    let history_path = matches
        .get_one::<String>("history_file")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_HISTORY_FILE));
    let mut history = SearchHistory::load(
        Box::new(FileStore::new(history_path)),
        &config.history_key,
        config.history_limit,
    );

    if matches.get_flag("clear_history") {
        history.clear();
        println!("搜索历史已清空");
        return Ok(());
    }

    if matches.get_flag("show_history") {
        print_history(&history);
        return Ok(());
    }

    let feed = matches
        .get_one::<String>("feed")
        .map(String::as_str)
        .unwrap_or(DEFAULT_FEED);
    let feed_source = source::open(feed);
    let corpus = load(&*feed_source).with_context(|| format!("加载 feed 失败: {}", feed))?;
    tracing::info!("已加载 {} 篇文章", corpus.len());

    let mut filter = FilterState::new();
    for tag in matches.get_many::<String>("tag").into_iter().flatten() {
        filter.toggle_tag(tag);
    }
    for category in matches.get_many::<String>("category").into_iter().flatten() {
        filter.toggle_category(category);
    }
    if let Some(mode) = matches.get_one::<String>("sort") {
        filter.set_sort_mode(SortMode::parse(mode));
    }

    let mut engine = SearchEngine::with_filter(corpus, filter, config);

    if matches.get_flag("popular") {
        print_popular(&engine);
        return Ok(());
    }

    let query = matches.get_one::<String>("query").map(String::as_str).unwrap_or("");
    let start_time = std::time::Instant::now();
    let mut results = engine.submit(query, &mut history);
    results.time_ms = start_time.elapsed().as_millis() as usize;

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_results(&results);
    }

    Ok(())
}

fn print_results(results: &SearchResults) {
    if results.browse {
        println!("最近的 {} 篇文章:", results.total);
    } else if results.items.is_empty() {
        println!("没有找到与 \"{}\" 相关的文章", results.query);
        return;
    } else {
        println!(
            "找到 {} 篇与 \"{}\" 相关的文章 (排序: {}):",
            results.total,
            results.query,
            results.sort_mode.as_str()
        );
    }

    for (i, item) in results.items.iter().enumerate() {
        let date = item
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "----------".to_string());

        println!();
        println!("{:>2}. {}  [{}]", i + 1, item.title, date);
        println!("    {}", item.url);
        if !item.tags.is_empty() {
            println!("    标签: {}", item.tags.join(", "));
        }
        if !item.categories.is_empty() {
            println!("    分类: {}", item.categories.join(", "));
        }
        if item.reading_time_minutes > 0 {
            println!("    阅读时长: {} 分钟", item.reading_time_minutes);
        }
        if !item.excerpt.is_empty() {
            println!("    {}", item.excerpt);
        }
    }

    if results.active_filters > 0 {
        println!();
        println!("已启用 {} 个筛选条件", results.active_filters);
    }
    tracing::debug!("搜索耗时 {}ms", results.time_ms);
}

fn print_history(history: &SearchHistory) {
    if history.is_empty() {
        println!("暂无搜索历史");
        return;
    }
    for (i, entry) in history.entries().iter().enumerate() {
        println!("{:>2}. {}", i + 1, entry);
    }
}

fn print_popular(engine: &SearchEngine) {
    println!("热门标签:");
    for facet in engine.popular_tags() {
        println!("  {} ({})", facet.name, facet.count);
    }
    println!("热门分类:");
    for facet in engine.popular_categories() {
        println!("  {} ({})", facet.name, facet.count);
    }
}
