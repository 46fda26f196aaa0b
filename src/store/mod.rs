//! 文档向量库 - 会话级内存向量检索，用于报告写作与问答的上下文召回

pub mod embedder;

pub use embedder::Embedder;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::LLMConfig;

/// 入库的文档分块
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub content: String,
    pub source_url: String,
    pub title: String,
    pub scraped_at: DateTime<Utc>,
    pub chunk_index: usize,
}

/// 检索命中
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: DocumentChunk,
    pub score: f32,
}

/// 会话级向量库
///
/// 向量只在单次会话内有效，不做持久化。
pub struct DocumentStore {
    embedder: Embedder,
    chunks: Vec<DocumentChunk>,
    embeddings: Vec<Vec<f32>>,
}

impl DocumentStore {
    pub fn new(config: &LLMConfig) -> Self {
        Self {
            embedder: Embedder::new(config),
            chunks: Vec::new(),
            embeddings: Vec::new(),
        }
    }

    /// 向量化并入库一批分块
    pub async fn add_documents(&mut self, chunks: Vec<DocumentChunk>) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors = self.embedder.embed(&texts).await?;

        let added = chunks.len();
        for (chunk, vector) in chunks.into_iter().zip(vectors) {
            self.insert_raw(chunk, vector);
        }

        println!("📦 已入库 {} 个文档分块（累计 {}）", added, self.count());
        Ok(added)
    }

    /// 直接插入已有向量的分块
    pub fn insert_raw(&mut self, chunk: DocumentChunk, embedding: Vec<f32>) {
        self.chunks.push(chunk);
        self.embeddings.push(embedding);
    }

    /// 按查询文本做相似度检索，返回得分最高的top_k个分块
    ///
    /// 空库直接返回空列表，不发起向量化请求。
    pub async fn similarity_search(&self, query: &str, top_k: usize) -> Result<Vec<ScoredChunk>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }

        let query_vector = self.embedder.embed_one(query).await?;
        Ok(self.search_by_embedding(&query_vector, top_k))
    }

    /// 按已有查询向量检索
    pub fn search_by_embedding(&self, query: &[f32], top_k: usize) -> Vec<ScoredChunk> {
        let mut scored: Vec<ScoredChunk> = self
            .chunks
            .iter()
            .zip(self.embeddings.iter())
            .map(|(chunk, embedding)| ScoredChunk {
                chunk: chunk.clone(),
                score: cosine_similarity(query, embedding),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k.min(self.chunks.len()));
        scored
    }

    pub fn count(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// 清空向量库
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.embeddings.clear();
    }
}

/// 余弦相似度，零向量或维度不一致时返回0
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
