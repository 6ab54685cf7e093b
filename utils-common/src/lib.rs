pub mod config;
pub mod models;
pub mod text;

// 重新导出常用类型和函数，方便直接使用
pub use config::{ConfigError, SearchConfig};
pub use models::{parse_date, Document};
pub use text::{decode_entities, escape_html, fold_case, split_list, strip_markup};
