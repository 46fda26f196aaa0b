//! 规划Agent - 将调研问题拆解为聚焦的子主题

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::agent::step_forward_agent::{
    AgentDataConfig, DataSource, FormatterConfig, LLMCallMode, PromptTemplate, StepForwardAgent,
};

/// 调研计划
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResearchPlan {
    /// 拆解出的子主题，覆盖调研问题的不同侧面
    pub sub_topics: Vec<String>,
}

impl ResearchPlan {
    /// 规范化计划：去掉空白子主题、限制数量；全空时回退为原始问题本身
    pub fn normalize(mut self, query: &str, max_sub_topics: usize) -> Self {
        self.sub_topics = self
            .sub_topics
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .take(max_sub_topics)
            .collect();

        if self.sub_topics.is_empty() {
            self.sub_topics = vec![query.to_string()];
        }
        self
    }
}

/// 规划Agent
#[derive(Default)]
pub struct Planner;

impl StepForwardAgent for Planner {
    type Output = ResearchPlan;

    fn agent_type(&self) -> String {
        "Planner".to_string()
    }

    fn data_config(&self) -> AgentDataConfig {
        AgentDataConfig {
            required_sources: vec![DataSource::QUERY],
            optional_sources: vec![],
        }
    }

    fn prompt_template(&self) -> PromptTemplate {
        PromptTemplate {
            system_prompt: r#"You are a research planning specialist.
Your job is to break a research query into focused sub-topics that can each be investigated through web search.

Rules:
- Produce between 3 and 5 sub-topics.
- Each sub-topic must be a short, self-contained search phrase.
- Together the sub-topics must cover the query from complementary angles: background, current state, key players, challenges, outlook.
- Do not repeat the original query verbatim as a sub-topic."#
                .to_string(),
            opening_instruction:
                "Break the following research query into focused sub-topics.".to_string(),
            closing_instruction:
                "Return only the list of sub-topics, with no commentary.".to_string(),
            llm_call_mode: LLMCallMode::Extract,
            formatter_config: FormatterConfig::default(),
        }
    }
}
