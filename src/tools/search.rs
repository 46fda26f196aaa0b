//! 网络搜索工具 - 基于Serper.dev的Google搜索

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::SearchConfig;

/// 单条搜索结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub position: u32,
}

/// Serper响应中我们关心的部分
#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SearchResult>,
}

/// 搜索客户端
#[derive(Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    config: SearchConfig,
}

impl SearchClient {
    /// 创建搜索客户端，缺少API KEY视为配置错误
    pub fn new(config: SearchConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            bail!("SERP_API_KEY not found in environment or configuration");
        }
        Ok(Self {
            http: reqwest::Client::new(),
            config,
        })
    }

    /// 执行搜索并返回原始组织结果
    ///
    /// 搜索失败不会中断调研流程，返回空列表并记录错误。
    pub async fn search(&self, query: &str) -> Vec<SearchResult> {
        match self.search_inner(query).await {
            Ok(results) => results,
            Err(e) => {
                eprintln!("❌ 搜索请求失败: {}", e);
                Vec::new()
            }
        }
    }

    async fn search_inner(&self, query: &str) -> Result<Vec<SearchResult>> {
        let payload = json!({
            "q": query,
            "num": self.config.results_per_query,
        });

        let response = self
            .http
            .post(&self.config.endpoint)
            .header("X-API-KEY", &self.config.api_key)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        let parsed: SerperResponse = response.json().await?;
        Ok(parsed.organic)
    }

    /// 过滤低质量搜索结果
    ///
    /// 过滤规则：域名命中黑名单、缺少标题或摘要的条目都被剔除。
    pub fn filter_quality(&self, results: Vec<SearchResult>) -> Vec<SearchResult> {
        results
            .into_iter()
            .filter(|result| {
                let url = result.link.to_lowercase();
                if self
                    .config
                    .blacklist_domains
                    .iter()
                    .any(|domain| url.contains(domain))
                {
                    return false;
                }
                !result.title.is_empty() && !result.snippet.is_empty()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{SearchClient, SearchResult, SerperResponse};
    use crate::config::SearchConfig;

    fn test_client() -> SearchClient {
        let config = SearchConfig {
            api_key: "test-key".to_string(),
            ..Default::default()
        };
        SearchClient::new(config).unwrap()
    }

    fn result(title: &str, link: &str, snippet: &str) -> SearchResult {
        SearchResult {
            title: title.to_string(),
            link: link.to_string(),
            snippet: snippet.to_string(),
            position: 1,
        }
    }

    #[test]
    fn test_new_requires_api_key() {
        let config = SearchConfig {
            api_key: String::new(),
            ..Default::default()
        };
        assert!(SearchClient::new(config).is_err());
    }

    #[test]
    fn test_filter_drops_blacklisted_domains() {
        let client = test_client();
        let results = vec![
            result("Good doc", "https://docs.example.com/a", "useful snippet"),
            result("A video", "https://www.youtube.com/watch?v=1", "watch this"),
            result("Thread", "https://reddit.com/r/tech/1", "discussion"),
        ];

        let filtered = client.filter_quality(results);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].link, "https://docs.example.com/a");
    }

    #[test]
    fn test_filter_drops_results_without_content() {
        let client = test_client();
        let results = vec![
            result("", "https://example.com/a", "snippet"),
            result("Title", "https://example.com/b", ""),
            result("Title", "https://example.com/c", "snippet"),
        ];

        let filtered = client.filter_quality(results);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].link, "https://example.com/c");
    }

    #[test]
    fn test_serper_response_parsing() {
        let raw = r#"{
            "searchParameters": {"q": "rust async"},
            "organic": [
                {"title": "Tokio", "link": "https://tokio.rs", "snippet": "An async runtime", "position": 1},
                {"title": "Async book", "link": "https://rust-lang.github.io/async-book/", "snippet": "Learn async", "position": 2}
            ]
        }"#;

        let parsed: SerperResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.organic.len(), 2);
        assert_eq!(parsed.organic[0].title, "Tokio");
        assert_eq!(parsed.organic[1].position, 2);
    }

    #[test]
    fn test_serper_response_without_organic() {
        let parsed: SerperResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.organic.is_empty());
    }
}
