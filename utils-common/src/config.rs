use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置解析失败: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("配置项 {field} 无效: {message}")]
    Invalid { field: &'static str, message: String },
}

/// 搜索配置 - 所有字段都有默认值，宿主只需传入需要覆盖的项
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// feed 的固定路径
    pub feed_path: String,
    /// 搜索历史在存储中的键名
    pub history_key: String,
    /// 搜索历史保留条数
    pub history_limit: usize,
    /// 空查询时返回的最近文章数
    pub browse_limit: usize,
    /// 摘要中匹配位置前后保留的字符数
    pub excerpt_radius: usize,
    /// 输入防抖间隔（毫秒）
    pub debounce_ms: u64,
    /// 热门标签数量
    pub popular_tag_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            feed_path: "/search.xml".to_string(),
            history_key: "search_history".to_string(),
            history_limit: 10,
            browse_limit: 10,
            excerpt_radius: 50,
            debounce_ms: 300,
            popular_tag_limit: 20,
        }
    }
}

impl SearchConfig {
    /// 从JSON解析配置，缺失的字段使用默认值
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: SearchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 校验取值范围
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_limit == 0 {
            return Err(ConfigError::Invalid {
                field: "history_limit",
                message: "必须大于0".to_string(),
            });
        }
        if self.browse_limit == 0 {
            return Err(ConfigError::Invalid {
                field: "browse_limit",
                message: "必须大于0".to_string(),
            });
        }
        if self.history_key.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "history_key",
                message: "不能为空".to_string(),
            });
        }
        Ok(())
    }
}
