use anyhow::{Result, anyhow};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::agent::agent_executor::{AgentExecuteParams, extract, prompt};
use crate::agent::context::AgentContext;
use crate::agent::memory::{MemoryScope, ScopedKeys};
use crate::agent::research::ScrapedSource;

/// 数据源配置 - 基于Memory Key的直接数据访问机制
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// 从Memory中获取数据
    MemoryData {
        scope: &'static str,
        key: &'static str,
    },
}

impl DataSource {
    /// 预定义的常用数据源
    pub const QUERY: DataSource = DataSource::MemoryData {
        scope: MemoryScope::RESEARCH,
        key: ScopedKeys::QUERY,
    };
    pub const SUB_TOPICS: DataSource = DataSource::MemoryData {
        scope: MemoryScope::RESEARCH,
        key: ScopedKeys::SUB_TOPICS,
    };
    pub const SCRAPED_SOURCES: DataSource = DataSource::MemoryData {
        scope: MemoryScope::RESEARCH,
        key: ScopedKeys::SCRAPED_SOURCES,
    };
    pub const REPORT_DRAFT: DataSource = DataSource::MemoryData {
        scope: MemoryScope::RESEARCH,
        key: ScopedKeys::REPORT_DRAFT,
    };
}

/// Agent数据配置 - 声明所需的数据源
#[derive(Debug, Clone)]
pub struct AgentDataConfig {
    /// 必需的数据源 - 缺少时执行失败
    pub required_sources: Vec<DataSource>,
    /// 可选的数据源 - 缺少时不影响执行
    pub optional_sources: Vec<DataSource>,
}

/// LLM调用方式配置
#[derive(Debug, Clone, PartialEq)]
pub enum LLMCallMode {
    /// 使用extract方法，返回特定要求的结构化数据
    Extract,
    /// 使用prompt方法，返回泛化推理文本
    Prompt,
}

/// 数据格式化配置
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// 来源列表显示数量限制
    pub sources_limit: usize,
    /// 报告草稿截断长度
    pub draft_truncate_length: Option<usize>,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            sources_limit: 50,
            draft_truncate_length: Some(16384),
        }
    }
}

/// Prompt模板配置
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// 系统提示词
    pub system_prompt: String,
    /// 开头的说明性指令
    pub opening_instruction: String,
    /// 结尾的强调性指令
    pub closing_instruction: String,
    /// LLM调用方式
    pub llm_call_mode: LLMCallMode,
    /// 数据格式化配置
    pub formatter_config: FormatterConfig,
}

/// 通用数据格式化器
pub struct DataFormatter {
    config: FormatterConfig,
}

impl DataFormatter {
    pub fn new(config: FormatterConfig) -> Self {
        Self { config }
    }

    /// 格式化调研问题
    pub fn format_query(&self, query: &str) -> String {
        format!("### Research query\n{}\n\n", query)
    }

    /// 格式化子主题列表
    pub fn format_sub_topics(&self, topics: &[String]) -> String {
        let mut content = String::from("### Planned sub-topics\n");
        for (i, topic) in topics.iter().enumerate() {
            content.push_str(&format!("{}. {}\n", i + 1, topic));
        }
        content.push('\n');
        content
    }

    /// 格式化已抓取来源摘要
    pub fn format_scraped_sources(&self, sources: &[ScrapedSource]) -> String {
        let mut content = String::from("### Sources gathered so far\n");
        for source in sources.iter().take(self.config.sources_limit) {
            content.push_str(&format!(
                "- [{}]({}) — status: {}, {} chunks indexed\n",
                source.title, source.url, source.status, source.chunks_indexed
            ));
        }
        content.push('\n');
        content
    }

    /// 格式化报告草稿
    pub fn format_report_draft(&self, draft: &str) -> String {
        let content = if let Some(limit) = self.config.draft_truncate_length
            && draft.chars().count() > limit
        {
            let truncated: String = draft.chars().take(limit).collect();
            format!("{}...(truncated)", truncated)
        } else {
            draft.to_string()
        };
        format!("### Current report draft\n{}\n\n", content)
    }
}

/// 标准的调研Agent Prompt构建器
pub struct AgentPromptBuilder {
    template: PromptTemplate,
    formatter: DataFormatter,
}

impl AgentPromptBuilder {
    pub fn new(template: PromptTemplate) -> Self {
        let formatter = DataFormatter::new(template.formatter_config.clone());
        Self {
            template,
            formatter,
        }
    }

    /// 构建标准的prompt（系统提示词和用户提示词）
    pub async fn build_prompts(
        &self,
        context: &AgentContext,
        data_sources: &[DataSource],
        custom_content: Option<String>,
    ) -> Result<(String, String)> {
        let system_prompt = self.template.system_prompt.clone();
        let user_prompt = self
            .build_standard_user_prompt(context, data_sources, custom_content)
            .await?;
        Ok((system_prompt, user_prompt))
    }

    /// 构建标准的用户提示词
    async fn build_standard_user_prompt(
        &self,
        context: &AgentContext,
        data_sources: &[DataSource],
        custom_content: Option<String>,
    ) -> Result<String> {
        let mut prompt = String::new();

        // 开头说明性指令
        prompt.push_str(&self.template.opening_instruction);
        prompt.push_str("\n\n");

        // 调研材料参考部分
        prompt.push_str("## Research material\n");

        // 插入自定义内容（如果有）
        if let Some(custom) = custom_content {
            prompt.push_str(&custom);
            prompt.push('\n');
        }

        for source in data_sources {
            let DataSource::MemoryData { scope, key } = source;
            match *key {
                ScopedKeys::QUERY => {
                    if let Some(query) = context.get_from_memory::<String>(scope, key).await {
                        prompt.push_str(&self.formatter.format_query(&query));
                    }
                }
                ScopedKeys::SUB_TOPICS => {
                    if let Some(topics) = context.get_from_memory::<Vec<String>>(scope, key).await {
                        prompt.push_str(&self.formatter.format_sub_topics(&topics));
                    }
                }
                ScopedKeys::SCRAPED_SOURCES => {
                    if let Some(sources) = context
                        .get_from_memory::<Vec<ScrapedSource>>(scope, key)
                        .await
                    {
                        prompt.push_str(&self.formatter.format_scraped_sources(&sources));
                    }
                }
                ScopedKeys::REPORT_DRAFT => {
                    if let Some(draft) = context.get_from_memory::<String>(scope, key).await {
                        prompt.push_str(&self.formatter.format_report_draft(&draft));
                    }
                }
                _ => {}
            }
        }

        // 结尾强调性指令
        prompt.push_str(&self.template.closing_instruction);

        Ok(prompt)
    }
}

/// 极简Agent trait - 大幅简化agent实现
#[async_trait]
pub trait StepForwardAgent: Send + Sync {
    /// Agent的输出类型 - 必须支持JSON序列化
    type Output: JsonSchema + for<'a> Deserialize<'a> + Serialize + Send + Sync + 'static;

    /// Agent类型标识
    fn agent_type(&self) -> String;

    fn memory_scope_key(&self) -> String {
        MemoryScope::RESEARCH.to_string()
    }

    /// 数据源配置
    fn data_config(&self) -> AgentDataConfig;

    /// Prompt模板配置
    fn prompt_template(&self) -> PromptTemplate;

    /// 可选的后处理钩子
    fn post_process(&self, _result: &Self::Output, _context: &AgentContext) -> Result<()> {
        Ok(())
    }

    /// 可选的自定义prompt内容提供钩子
    /// 返回自定义的prompt内容，将被插入到标准prompt的调研材料参考部分
    async fn provide_custom_prompt_content(
        &self,
        _context: &AgentContext,
    ) -> Result<Option<String>> {
        Ok(None)
    }

    /// 默认实现的execute方法 - 完全标准化，自动数据验证
    async fn execute(&self, context: &AgentContext) -> Result<Self::Output> {
        // 1. 获取数据配置
        let config = self.data_config();

        // 2. 检查required数据源是否可用（自动验证）
        for source in &config.required_sources {
            let DataSource::MemoryData { scope, key } = source;
            if !context.has_memory_data(scope, key).await {
                return Err(anyhow!("必需的数据源 {}:{} 不可用", scope, key));
            }
        }

        // 3. 收集所有数据源（required + optional）
        let all_sources = [config.required_sources, config.optional_sources].concat();

        // 4. 使用标准模板构建prompt，并根据目标语言调整
        let mut template = self.prompt_template();

        // 根据配置的目标语言添加语言指令
        let language_instruction = context.config.target_language.prompt_instruction();
        template.system_prompt = format!("{}\n\n{}", template.system_prompt, language_instruction);

        let prompt_builder = AgentPromptBuilder::new(template.clone());

        // 获取自定义prompt内容
        let custom_content = self.provide_custom_prompt_content(context).await?;

        let (system_prompt, user_prompt) = prompt_builder
            .build_prompts(context, &all_sources, custom_content)
            .await?;

        // 5. 根据配置选择LLM调用方式
        let params = AgentExecuteParams {
            prompt_sys: system_prompt,
            prompt_user: user_prompt,
            cache_scope: format!("{}/{}", self.memory_scope_key(), self.agent_type()),
            log_tag: self.agent_type().to_string(),
        };

        let result_value = match template.llm_call_mode {
            LLMCallMode::Extract => {
                let result: Self::Output = extract(context, params).await?;
                serde_json::to_value(&result)?
            }
            LLMCallMode::Prompt => {
                let result_text: String = prompt(context, params).await?;
                serde_json::to_value(&result_text)?
            }
        };

        // 6. 存储结果
        context
            .store_to_memory(
                &self.memory_scope_key(),
                &self.agent_type(),
                result_value.clone(),
            )
            .await?;

        // 7. 执行后处理
        match serde_json::from_value::<Self::Output>(result_value) {
            Ok(typed_result) => {
                self.post_process(&typed_result, context)?;
                println!("✅ Sub-Agent [{}]执行完成", self.agent_type());
                Ok(typed_result)
            }
            Err(e) => Err(anyhow!("Agent [{}] 输出类型转换失败: {}", self.agent_type(), e)),
        }
    }
}
