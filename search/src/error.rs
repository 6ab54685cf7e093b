use thiserror::Error;

/// 语料加载错误
///
/// 单条记录的字段问题不会产生错误，只有传输失败或整个 feed 无法解析时才会失败。
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("获取 feed 失败 ({location}): {message}")]
    Fetch { location: String, message: String },

    #[error("feed 解析失败: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> Self {
        LoadError::Parse(format!("JSON 格式错误: {}", e))
    }
}

/// 搜索历史存储错误
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("存储不可用: {0}")]
    Unavailable(String),

    #[error("写入存储失败: {0}")]
    Write(String),
}
