//! 评审Agent - 判定报告是否完整回答了调研问题

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::agent::step_forward_agent::{
    AgentDataConfig, DataSource, FormatterConfig, LLMCallMode, PromptTemplate, StepForwardAgent,
};

/// 评审结论类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum VerdictKind {
    /// 报告完整回答了调研问题
    #[serde(rename = "COMPLETE")]
    Complete,
    /// 报告有缺口，需要继续收集资料
    #[serde(rename = "NEED_MORE_RESEARCH")]
    NeedMoreResearch,
    /// 现有来源质量不足以支撑报告
    #[serde(rename = "SOURCES_INSUFFICIENT")]
    SourcesInsufficient,
}

/// 评审结论
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReviewVerdict {
    /// 评审判定
    pub status: VerdictKind,
    /// 判定理由（简短）
    pub reasoning: String,
}

/// 评审Agent
#[derive(Default)]
pub struct Reviewer;

impl StepForwardAgent for Reviewer {
    type Output = ReviewVerdict;

    fn agent_type(&self) -> String {
        "Reviewer".to_string()
    }

    fn data_config(&self) -> AgentDataConfig {
        AgentDataConfig {
            required_sources: vec![DataSource::QUERY, DataSource::REPORT_DRAFT],
            optional_sources: vec![DataSource::SUB_TOPICS, DataSource::SCRAPED_SOURCES],
        }
    }

    fn prompt_template(&self) -> PromptTemplate {
        PromptTemplate {
            system_prompt: r#"You are a strict research quality reviewer.
Given a research query and a draft report, decide one of:
- COMPLETE: the report answers the query thoroughly with cited sources.
- NEED_MORE_RESEARCH: the report has concrete gaps that further web research could fill.
- SOURCES_INSUFFICIENT: the gathered sources are too thin or low quality to support a reliable report.

Judge the substance, not the formatting. A report that admits missing coverage of a core aspect of the query is not COMPLETE."#
                .to_string(),
            opening_instruction: "Review the draft report against the research query.".to_string(),
            closing_instruction: "Return the verdict and a short reasoning.".to_string(),
            llm_call_mode: LLMCallMode::Extract,
            formatter_config: FormatterConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ReviewVerdict, VerdictKind};

    #[test]
    fn test_verdict_serde_uses_screaming_names() {
        let verdict = ReviewVerdict {
            status: VerdictKind::NeedMoreResearch,
            reasoning: "missing cost analysis".to_string(),
        };

        let json = serde_json::to_string(&verdict).unwrap();
        assert!(json.contains("NEED_MORE_RESEARCH"));

        let parsed: ReviewVerdict =
            serde_json::from_str(r#"{"status": "COMPLETE", "reasoning": "ok"}"#).unwrap();
        assert_eq!(parsed.status, VerdictKind::Complete);
    }
}
