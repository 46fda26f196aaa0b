//! 资料收集阶段 - 搜索、抓取、分块入库

use anyhow::{Context, Result};
use futures::StreamExt;
use serde::{Deserialize, Serialize};

use crate::agent::context::AgentContext;
use crate::agent::memory::{MemoryScope, ScopedKeys};
use crate::config::Config;
use crate::store::DocumentChunk;
use crate::tools::{ScraperClient, SearchClient};
use crate::utils::text_splitter::TextSplitter;

/// 已抓取来源的摘要，存入Memory供写作与评审参考
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedSource {
    pub url: String,
    pub title: String,
    pub status: String,
    pub chunks_indexed: usize,
}

/// 调研过程统计
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    pub search_queries_made: u32,
    pub urls_scraped: u32,
    pub chunks_indexed: u32,
    pub loops_completed: u32,
}

/// 单轮资料收集的结果
#[derive(Debug, Clone)]
pub struct RoundSummary {
    pub topic: String,
    pub urls_considered: usize,
    pub pages_indexed: usize,
    pub chunks_indexed: usize,
}

/// 资料收集器
pub struct ResearchCollector {
    search: SearchClient,
    scraper: ScraperClient,
    splitter: TextSplitter,
}

impl ResearchCollector {
    pub fn new(config: &Config) -> Result<Self> {
        let search =
            SearchClient::new(config.search.clone()).context("搜索客户端初始化失败")?;
        let scraper = ScraperClient::new(config.scraper.clone());
        let splitter = TextSplitter::new(config.research.chunk_size, config.research.chunk_overlap);

        Ok(Self {
            search,
            scraper,
            splitter,
        })
    }

    /// 针对单个子主题执行一轮收集：搜索、抓取、分块入库
    ///
    /// 追加轮次（loop_count > 0）的搜索词带上补充调研标记，拉开与首轮的结果差异。
    pub async fn execute_round(
        &self,
        context: &AgentContext,
        topic: &str,
        loop_count: u32,
    ) -> Result<RoundSummary> {
        let query: String = context
            .get_from_memory(MemoryScope::RESEARCH, ScopedKeys::QUERY)
            .await
            .context("Memory中缺少调研问题")?;

        let mut search_query = format!("{} : {}", query, topic);
        if loop_count > 0 {
            search_query.push_str(" - additional research needed");
        }

        println!("🔍 搜索: {}", search_query);
        let raw_results = self.search.search(&search_query).await;
        let filtered = self.search.filter_quality(raw_results);

        let urls: Vec<(String, String)> = filtered
            .into_iter()
            .take(context.config.research.max_urls_per_topic)
            .map(|r| (r.link, r.title))
            .collect();

        if urls.is_empty() {
            println!("⚠️ 子主题 [{}] 没有可用的搜索结果", topic);
        }

        // 并发抓取，单页失败不影响其他页面
        let pages: Vec<_> = futures::stream::iter(urls.iter())
            .map(|(url, _)| self.scraper.scrape(url))
            .buffer_unordered(context.config.scraper.max_concurrency)
            .collect()
            .await;

        let mut round = RoundSummary {
            topic: topic.to_string(),
            urls_considered: urls.len(),
            pages_indexed: 0,
            chunks_indexed: 0,
        };
        let mut sources: Vec<ScrapedSource> = context
            .get_from_memory(MemoryScope::RESEARCH, ScopedKeys::SCRAPED_SOURCES)
            .await
            .unwrap_or_default();

        for page in pages {
            let mut indexed = 0;

            if page.is_success() {
                let chunks: Vec<DocumentChunk> = self
                    .splitter
                    .split_text(&page.content)
                    .into_iter()
                    .enumerate()
                    .map(|(i, content)| DocumentChunk {
                        content,
                        source_url: page.url.clone(),
                        title: page.title.clone(),
                        scraped_at: page.scraped_at,
                        chunk_index: i,
                    })
                    .collect();

                let mut store = context.store.write().await;
                indexed = store.add_documents(chunks).await?;

                round.pages_indexed += 1;
                round.chunks_indexed += indexed;
            }

            sources.push(ScrapedSource {
                url: page.url.clone(),
                title: page.title.clone(),
                status: serde_json::to_value(page.status)?
                    .as_str()
                    .unwrap_or("error")
                    .to_string(),
                chunks_indexed: indexed,
            });
        }

        context
            .store_to_memory(MemoryScope::RESEARCH, ScopedKeys::SCRAPED_SOURCES, &sources)
            .await?;

        // 累计统计
        let mut stats: RunStats = context
            .get_from_memory(MemoryScope::RESEARCH, ScopedKeys::RUN_STATS)
            .await
            .unwrap_or_default();
        accumulate_round(&mut stats, &round);
        context
            .store_to_memory(MemoryScope::RESEARCH, ScopedKeys::RUN_STATS, &stats)
            .await?;

        println!(
            "✓ 子主题 [{}] 收集完成：{} 个页面，{} 个分块入库",
            topic, round.pages_indexed, round.chunks_indexed
        );
        Ok(round)
    }
}

/// 将单轮收集结果并入累计统计，抓取失败的URL不计入urls_scraped
fn accumulate_round(stats: &mut RunStats, round: &RoundSummary) {
    stats.search_queries_made += 1;
    stats.urls_scraped += round.pages_indexed as u32;
    stats.chunks_indexed += round.chunks_indexed as u32;
}

#[cfg(test)]
mod tests {
    use super::{RoundSummary, RunStats, accumulate_round};

    #[test]
    fn test_stats_count_only_indexed_pages() {
        let mut stats = RunStats::default();
        let round = RoundSummary {
            topic: "manufacturing challenges".to_string(),
            urls_considered: 5,
            pages_indexed: 2,
            chunks_indexed: 14,
        };

        accumulate_round(&mut stats, &round);
        assert_eq!(stats.search_queries_made, 1);
        assert_eq!(stats.urls_scraped, 2);
        assert_eq!(stats.chunks_indexed, 14);
    }

    #[test]
    fn test_stats_accumulate_across_rounds() {
        let mut stats = RunStats::default();
        let round = RoundSummary {
            topic: "cost trends".to_string(),
            urls_considered: 3,
            pages_indexed: 3,
            chunks_indexed: 9,
        };

        accumulate_round(&mut stats, &round);
        accumulate_round(&mut stats, &round);
        assert_eq!(stats.search_queries_made, 2);
        assert_eq!(stats.urls_scraped, 6);
        assert_eq!(stats.chunks_indexed, 18);
    }
}
