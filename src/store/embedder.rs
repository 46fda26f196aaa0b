//! 文本向量化客户端 - 调用OpenAI兼容的/embeddings接口

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::json;

use crate::config::LLMConfig;

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
}

/// 向量化客户端
#[derive(Clone)]
pub struct Embedder {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl Embedder {
    pub fn new(config: &LLMConfig) -> Self {
        let base = config.embedding_api_base_url.trim_end_matches('/');
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_default();
        Self {
            http,
            api_key: config.api_key.clone(),
            endpoint: format!("{}/embeddings", base),
            model: config.embedding_model.clone(),
        }
    }

    /// 批量向量化，返回与输入同序的向量列表
    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let payload = json!({
            "model": self.model,
            "input": texts,
        });

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .context("向量化请求发送失败")?
            .error_for_status()
            .context("向量化接口返回错误状态")?;

        let parsed: EmbeddingsResponse = response
            .json()
            .await
            .context("向量化响应解析失败")?;

        if parsed.data.len() != texts.len() {
            bail!(
                "向量化结果数量不匹配: 期望{}个，实际{}个",
                texts.len(),
                parsed.data.len()
            );
        }

        Ok(parsed.data.into_iter().map(|item| item.embedding).collect())
    }

    /// 向量化单条文本
    pub async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed(&[text.to_string()]).await?;
        vectors
            .pop()
            .context("向量化接口返回了空结果")
    }
}

#[cfg(test)]
mod tests {
    use super::{Embedder, EmbeddingsResponse};
    use crate::config::LLMConfig;

    #[test]
    fn test_endpoint_normalization() {
        let config = LLMConfig {
            embedding_api_base_url: "https://api.mistral.ai/v1/".to_string(),
            ..Default::default()
        };
        let embedder = Embedder::new(&config);
        assert_eq!(embedder.endpoint, "https://api.mistral.ai/v1/embeddings");
    }

    #[test]
    fn test_construction_with_custom_timeout() {
        let config = LLMConfig {
            timeout_seconds: 5,
            ..Default::default()
        };
        let embedder = Embedder::new(&config);
        assert_eq!(embedder.model, config.embedding_model);
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{
            "object": "list",
            "data": [
                {"object": "embedding", "index": 0, "embedding": [0.1, 0.2, 0.3]},
                {"object": "embedding", "index": 1, "embedding": [0.4, 0.5, 0.6]}
            ],
            "model": "mistral-embed"
        }"#;

        let parsed: EmbeddingsResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.data.len(), 2);
        assert_eq!(parsed.data[0].embedding, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn test_empty_input_skips_request() {
        let embedder = Embedder::new(&LLMConfig::default());
        let vectors = embedder.embed(&[]).await.unwrap();
        assert!(vectors.is_empty());
    }
}
