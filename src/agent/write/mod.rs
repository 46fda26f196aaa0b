//! 写作Agent - 基于向量库检索到的资料撰写带引用的调研报告

use anyhow::Result;
use async_trait::async_trait;

use crate::agent::context::AgentContext;
use crate::agent::memory::{MemoryScope, ScopedKeys};
use crate::agent::step_forward_agent::{
    AgentDataConfig, DataSource, FormatterConfig, LLMCallMode, PromptTemplate, StepForwardAgent,
};
use crate::store::ScoredChunk;

/// 写作Agent
#[derive(Default)]
pub struct ReportWriter;

/// 将检索命中格式化为写作素材，单块正文按truncate_length截断
pub fn format_retrieved_context(hits: &[ScoredChunk], truncate_length: usize) -> String {
    if hits.is_empty() {
        return "### Retrieved material\n(no indexed sources available)\n\n".to_string();
    }

    let mut content = String::from("### Retrieved material\n");
    for (i, hit) in hits.iter().enumerate() {
        let snippet: String = hit.chunk.content.chars().take(truncate_length).collect();
        content.push_str(&format!(
            "#### Source {} — {} ({})\n{}\n\n",
            i + 1,
            hit.chunk.title,
            hit.chunk.source_url,
            snippet
        ));
    }
    content
}

#[async_trait]
impl StepForwardAgent for ReportWriter {
    type Output = String;

    fn agent_type(&self) -> String {
        "ReportWriter".to_string()
    }

    fn data_config(&self) -> AgentDataConfig {
        AgentDataConfig {
            required_sources: vec![DataSource::QUERY],
            optional_sources: vec![DataSource::SUB_TOPICS, DataSource::SCRAPED_SOURCES],
        }
    }

    fn prompt_template(&self) -> PromptTemplate {
        PromptTemplate {
            system_prompt: r#"You are a senior research analyst.
Write a comprehensive, well-structured research report in Markdown that answers the research query using only the retrieved material provided.

Requirements:
- Start with a title and a short executive summary.
- Organize the body with meaningful section headings.
- Every factual claim must cite its source inline as a Markdown link to the source URL.
- If the material does not cover an aspect of the query, say so explicitly instead of inventing facts.
- End with a "Sources" section listing every cited URL."#
                .to_string(),
            opening_instruction:
                "Write the research report for the following query using the retrieved material."
                    .to_string(),
            closing_instruction:
                "Output only the Markdown report, without surrounding commentary.".to_string(),
            llm_call_mode: LLMCallMode::Prompt,
            formatter_config: FormatterConfig::default(),
        }
    }

    /// 把向量库中与调研问题最相关的资料注入prompt
    async fn provide_custom_prompt_content(
        &self,
        context: &AgentContext,
    ) -> Result<Option<String>> {
        let Some(query) = context
            .get_from_memory::<String>(MemoryScope::RESEARCH, ScopedKeys::QUERY)
            .await
        else {
            return Ok(None);
        };

        let research = &context.config.research;
        let hits = context.retrieve(&query, research.retrieval_top_k).await?;
        Ok(Some(format_retrieved_context(
            &hits,
            research.snippet_truncate_length,
        )))
    }

}
