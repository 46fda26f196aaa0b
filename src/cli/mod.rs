use crate::config::{Config, LLMProvider};
use crate::i18n::TargetLanguage;
use clap::Parser;
use std::path::PathBuf;

/// DeepResearch-RS - 由Rust与AI驱动的网络深度调研引擎
#[derive(Parser, Debug)]
#[command(name = "deepresearch-rs")]
#[command(
    about = "AI-powered deep research engine. It plans a research query into sub-topics, gathers and indexes live web sources, and writes a reviewed, cited research report."
)]
#[command(version)]
pub struct Args {
    /// 调研问题
    pub query: Option<String>,

    /// 启动器模式：托管前后端进程而不执行调研
    #[arg(long)]
    pub launch: bool,

    /// 输出路径（默认 ./deepresearch.out）
    #[arg(short, long)]
    pub output_path: Option<PathBuf>,

    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 调研会话ID（不指定时自动生成）
    #[arg(long)]
    pub session_id: Option<String>,

    /// 是否启用详细日志
    #[arg(short, long)]
    pub verbose: bool,

    /// 高能效模型，优先用于常规推理任务
    #[arg(long)]
    pub model_efficient: Option<String>,

    /// 高质量模型，用于复杂推理任务，以及作为efficient失效情况下的兜底
    #[arg(long)]
    pub model_powerful: Option<String>,

    /// 嵌入模型，用于调研资料的向量化检索
    #[arg(long)]
    pub embedding_model: Option<String>,

    /// LLM API基地址
    #[arg(long)]
    pub llm_api_base_url: Option<String>,

    /// LLM API KEY
    #[arg(long)]
    pub llm_api_key: Option<String>,

    /// 最大tokens数
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// 温度参数
    #[arg(long)]
    pub temperature: Option<f64>,

    /// LLM Provider (mistral, openai, deepseek, ollama)
    #[arg(long)]
    pub llm_provider: Option<String>,

    /// Serper搜索API KEY
    #[arg(long)]
    pub serp_api_key: Option<String>,

    /// Browserless抓取API KEY
    #[arg(long)]
    pub browserless_api_key: Option<String>,

    /// 并发抓取数上限
    #[arg(long)]
    pub max_concurrency: Option<usize>,

    /// 目标语言 (en, zh, ja, de, fr)
    #[arg(long)]
    pub target_language: Option<String>,

    /// 研究-评审循环的最大轮数
    #[arg(long)]
    pub max_loops: Option<u32>,

    /// 调研完成后进入追问聊天模式
    #[arg(long)]
    pub chat: bool,

    /// 跳过知识图谱生成
    #[arg(long)]
    pub skip_knowledge_graph: bool,

    /// 跳过HTML报告导出
    #[arg(long)]
    pub skip_html_export: bool,

    /// 是否禁用缓存
    #[arg(long)]
    pub no_cache: bool,

    /// 强制重新生成（清除缓存）
    #[arg(long)]
    pub force_regenerate: bool,

    /// 启动器模式的后端启动命令
    #[arg(long)]
    pub backend_command: Option<String>,

    /// 启动器模式的前端启动命令
    #[arg(long)]
    pub frontend_command: Option<String>,

    /// 启动器模式中后端启动后的固定延时（秒）
    #[arg(long)]
    pub startup_delay_secs: Option<u64>,
}

impl Args {
    /// 将CLI参数转换为配置，CLI参数优先于配置文件
    pub fn into_config(self) -> Config {
        let mut config = if let Some(config_path) = &self.config {
            // 显式指定配置文件时，加载失败视为致命错误
            Config::from_file(config_path)
                .unwrap_or_else(|e| panic!("无法读取配置文件 {:?}: {}", config_path, e))
        } else {
            // 尝试从工作目录的默认位置加载
            let default_config_path = std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join("deepresearch.toml");

            if default_config_path.exists() {
                Config::from_file(&default_config_path).unwrap_or_else(|e| {
                    panic!("无法读取配置文件 {:?}: {}", default_config_path, e)
                })
            } else {
                Config::default()
            }
        };

        if let Some(output_path) = self.output_path {
            config.output_path = output_path;
        }

        if let Some(session_id) = self.session_id {
            config.session_id = Some(session_id);
        }

        // 覆盖LLM配置
        if let Some(provider_str) = self.llm_provider {
            if let Ok(provider) = provider_str.parse::<LLMProvider>() {
                config.llm.provider = provider;
            } else {
                eprintln!(
                    "⚠️ 警告: 未知的provider: {}，使用默认provider",
                    provider_str
                );
            }
        }
        if let Some(llm_api_base_url) = self.llm_api_base_url {
            config.llm.api_base_url = llm_api_base_url;
        }
        if let Some(llm_api_key) = self.llm_api_key {
            config.llm.api_key = llm_api_key;
        }
        if let Some(model_efficient) = self.model_efficient {
            config.llm.model_efficient = model_efficient;
        }
        if let Some(model_powerful) = self.model_powerful {
            config.llm.model_powerful = model_powerful;
        }
        if let Some(embedding_model) = self.embedding_model {
            config.llm.embedding_model = embedding_model;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.llm.max_tokens = max_tokens;
        }
        if let Some(temperature) = self.temperature {
            config.llm.temperature = temperature;
        }

        // 搜索与抓取配置
        if let Some(serp_api_key) = self.serp_api_key {
            config.search.api_key = serp_api_key;
        }
        if let Some(browserless_api_key) = self.browserless_api_key {
            config.scraper.api_key = browserless_api_key;
        }
        if let Some(max_concurrency) = self.max_concurrency {
            config.scraper.max_concurrency = max_concurrency;
        }

        // 目标语言配置
        if let Some(target_language_str) = self.target_language {
            if let Ok(target_language) = target_language_str.parse::<TargetLanguage>() {
                config.target_language = target_language;
            } else {
                eprintln!(
                    "⚠️ 警告: 未知的目标语言: {}，使用默认语言 (English)",
                    target_language_str
                );
            }
        }

        // 调研流程配置
        if let Some(max_loops) = self.max_loops {
            config.research.max_loops = max_loops;
        }

        // 启动器配置
        if let Some(backend_command) = self.backend_command {
            config.launcher.backend_command = Some(backend_command);
        }
        if let Some(frontend_command) = self.frontend_command {
            config.launcher.frontend_command = Some(frontend_command);
        }
        if let Some(startup_delay_secs) = self.startup_delay_secs {
            config.launcher.startup_delay_secs = startup_delay_secs;
        }

        // 缓存配置
        if self.no_cache {
            config.cache.enabled = false;
        }

        // 其他配置
        config.chat_after_research = self.chat || config.chat_after_research;
        config.skip_knowledge_graph = self.skip_knowledge_graph || config.skip_knowledge_graph;
        config.skip_html_export = self.skip_html_export || config.skip_html_export;
        config.force_regenerate = self.force_regenerate || config.force_regenerate;
        config.verbose = self.verbose || config.verbose;

        config
    }
}
