use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use crate::i18n::TargetLanguage;

/// LLM Provider类型
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub enum LLMProvider {
    #[serde(rename = "mistral")]
    #[default]
    Mistral,
    #[serde(rename = "openai")]
    OpenAI,
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "ollama")]
    Ollama,
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::Mistral => write!(f, "mistral"),
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::DeepSeek => write!(f, "deepseek"),
            LLMProvider::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for LLMProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mistral" => Ok(LLMProvider::Mistral),
            "openai" => Ok(LLMProvider::OpenAI),
            "deepseek" => Ok(LLMProvider::DeepSeek),
            "ollama" => Ok(LLMProvider::Ollama),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// 应用程序配置
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// 调研会话ID，不配置时自动生成
    pub session_id: Option<String>,

    /// 输出路径
    pub output_path: PathBuf,

    /// 内部工作目录路径 (.deepresearch)
    pub internal_path: PathBuf,

    /// 报告目标语言
    pub target_language: TargetLanguage,

    /// LLM模型配置
    pub llm: LLMConfig,

    /// 网络搜索配置
    pub search: SearchConfig,

    /// 网页抓取配置
    pub scraper: ScraperConfig,

    /// 调研流程配置
    pub research: ResearchConfig,

    /// 追问聊天配置
    pub chat: ChatConfig,

    /// 前后端进程启动器配置
    pub launcher: LauncherConfig,

    /// 缓存配置
    pub cache: CacheConfig,

    /// 跳过知识图谱生成
    pub skip_knowledge_graph: bool,

    /// 跳过HTML报告导出
    pub skip_html_export: bool,

    /// 调研完成后进入追问聊天模式
    pub chat_after_research: bool,

    /// 强制重新生成（忽略缓存内容）
    pub force_regenerate: bool,

    /// 是否启用详细日志
    pub verbose: bool,
}

/// LLM模型配置
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LLMConfig {
    /// LLM Provider类型
    pub provider: LLMProvider,

    /// LLM API KEY
    pub api_key: String,

    /// LLM API基地址
    pub api_base_url: String,

    /// 高能效模型，优先用于常规推理任务
    pub model_efficient: String,

    /// 高质量模型，用于复杂推理任务，以及作为efficient失效情况下的兜底
    pub model_powerful: String,

    /// 嵌入模型，用于调研资料的向量化检索
    pub embedding_model: String,

    /// 嵌入服务API基地址
    pub embedding_api_base_url: String,

    /// 最大tokens
    pub max_tokens: u32,

    /// 温度
    pub temperature: f64,

    /// 重试次数
    pub retry_attempts: u32,

    /// 重试间隔（毫秒）
    pub retry_delay_ms: u64,

    /// 超时时间（秒）
    pub timeout_seconds: u64,

    /// 工具调用Agent的最大迭代轮数
    pub max_tool_iterations: usize,
}

/// 网络搜索配置（Serper.dev）
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SearchConfig {
    /// Serper API KEY
    pub api_key: String,

    /// 搜索服务端点
    pub endpoint: String,

    /// 每次搜索返回的结果数量
    pub results_per_query: usize,

    /// 低质量域名黑名单，命中即过滤
    pub blacklist_domains: Vec<String>,
}

/// 网页抓取配置（Browserless.io）
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScraperConfig {
    /// Browserless API KEY
    pub api_key: String,

    /// 抓取服务端点
    pub endpoint: String,

    /// 页面加载超时（毫秒）
    pub goto_timeout_ms: u64,

    /// 整体请求超时（秒）
    pub request_timeout_seconds: u64,

    /// 正文长度下限，低于该值视为抓取内容过少
    pub min_content_length: usize,

    /// 正文长度上限，超出部分截断
    pub max_content_length: usize,

    /// 请求拦截模式（静态资源与跟踪脚本）
    pub reject_patterns: Vec<String>,

    /// 并发抓取上限
    pub max_concurrency: usize,
}

/// 调研流程配置
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ResearchConfig {
    /// 研究-评审循环的最大轮数
    pub max_loops: u32,

    /// 每个子主题最多抓取的URL数量
    pub max_urls_per_topic: usize,

    /// 子主题数量上限
    pub max_sub_topics: usize,

    /// 文本分块大小（字符）
    pub chunk_size: usize,

    /// 分块重叠大小（字符）
    pub chunk_overlap: usize,

    /// 撰写报告时检索的资料块数量
    pub retrieval_top_k: usize,

    /// 注入prompt时单块资料的截断长度
    pub snippet_truncate_length: usize,
}

/// 追问聊天配置
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChatConfig {
    /// 每次回答检索的资料块数量
    pub retrieval_top_k: usize,

    /// 上下文中单块资料的截断长度
    pub snippet_truncate_length: usize,
}

/// 前后端进程启动器配置
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct LauncherConfig {
    /// 后端进程启动命令
    pub backend_command: Option<String>,

    /// 前端进程启动命令
    pub frontend_command: Option<String>,

    /// 后端启动后等待的固定延时（秒）
    pub startup_delay_secs: u64,
}

/// 缓存配置
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CacheConfig {
    /// 是否启用缓存
    pub enabled: bool,

    /// 缓存目录
    pub cache_dir: PathBuf,

    /// 缓存过期时间（小时）
    pub expire_hours: u64,
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let mut file =
            File::open(path).context(format!("Failed to open config file: {:?}", path))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// 获取会话ID，优先使用配置值，否则自动生成
    pub fn get_session_id(&self) -> String {
        if let Some(ref id) = self.session_id
            && !id.trim().is_empty()
        {
            return id.clone();
        }

        uuid::Uuid::new_v4().to_string()[..8].to_string()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_id: None,
            output_path: PathBuf::from("./deepresearch.out"),
            internal_path: PathBuf::from("./.deepresearch"),
            target_language: TargetLanguage::default(),
            llm: LLMConfig::default(),
            search: SearchConfig::default(),
            scraper: ScraperConfig::default(),
            research: ResearchConfig::default(),
            chat: ChatConfig::default(),
            launcher: LauncherConfig::default(),
            cache: CacheConfig::default(),
            skip_knowledge_graph: false,
            skip_html_export: false,
            chat_after_research: false,
            force_regenerate: false,
            verbose: false,
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::default(),
            api_key: std::env::var("DEEPRESEARCH_LLM_API_KEY").unwrap_or_default(),
            api_base_url: String::from("https://api.mistral.ai/v1"),
            model_efficient: String::from("mistral-small-latest"),
            model_powerful: String::from("mistral-large-latest"),
            embedding_model: String::from("mistral-embed"),
            embedding_api_base_url: String::from("https://api.mistral.ai/v1"),
            max_tokens: 32768,
            temperature: 0.0,
            retry_attempts: 5,
            retry_delay_ms: 5000,
            timeout_seconds: 300,
            max_tool_iterations: 8,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("SERP_API_KEY").unwrap_or_default(),
            endpoint: String::from("https://google.serper.dev/search"),
            results_per_query: 10,
            blacklist_domains: vec![
                "youtube.com".to_string(),
                "youtu.be".to_string(),
                "pinterest.com".to_string(),
                "instagram.com".to_string(),
                "facebook.com".to_string(),
                "twitter.com".to_string(),
                "tiktok.com".to_string(),
                "reddit.com".to_string(),
            ],
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("BROWSERLESS_API_KEY").unwrap_or_default(),
            endpoint: String::from("https://chrome.browserless.io/content"),
            goto_timeout_ms: 15000,
            request_timeout_seconds: 45,
            min_content_length: 200,
            max_content_length: 20000,
            reject_patterns: vec![
                ".jpg".to_string(),
                ".jpeg".to_string(),
                ".png".to_string(),
                ".gif".to_string(),
                ".svg".to_string(),
                ".css".to_string(),
                ".mp4".to_string(),
                ".woff".to_string(),
                ".woff2".to_string(),
                ".ico".to_string(),
                ".webp".to_string(),
                "google-analytics".to_string(),
                "doubleclick".to_string(),
                "googletagmanager".to_string(),
            ],
            max_concurrency: 3,
        }
    }
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            max_loops: 3,
            max_urls_per_topic: 5,
            max_sub_topics: 5,
            chunk_size: 1000,
            chunk_overlap: 200,
            retrieval_top_k: 10,
            snippet_truncate_length: 500,
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            retrieval_top_k: 5,
            snippet_truncate_length: 300,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cache_dir: PathBuf::from(".deepresearch/cache"),
            expire_hours: 168,
        }
    }
}

// Include tests
#[cfg(test)]
mod tests;
