use std::time::Duration;

use search_wasm::{CorpusSource, FileSource, LoadError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// 通过 HTTP 获取的 feed
pub struct HttpSource {
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl CorpusSource for HttpSource {
    fn location(&self) -> String {
        self.url.clone()
    }

    fn fetch(&self) -> Result<String, LoadError> {
        let fetch_error = |message: String| LoadError::Fetch {
            location: self.url.clone(),
            message,
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| fetch_error(e.to_string()))?;

        let response = client.get(&self.url).send().map_err(|e| fetch_error(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("HTTP {}", status)));
        }

        response.text().map_err(|e| fetch_error(e.to_string()))
    }
}

/// 根据位置选择数据源：http(s) 地址走网络，其他按本地文件处理
pub fn open(location: &str) -> Box<dyn CorpusSource> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Box::new(HttpSource::new(location))
    } else {
        Box::new(FileSource::new(location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_source_by_scheme() {
        let url = "https://blog.example/search.xml";
        assert_eq!(open(url).location(), url);
        assert_eq!(open("public/search.xml").location(), "public/search.xml");
    }

    #[test]
    fn missing_file_is_a_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.xml");
        let err = open(&path.display().to_string()).fetch().unwrap_err();
        assert!(matches!(err, LoadError::Fetch { .. }));
    }
}
