#[cfg(test)]
mod tests {
    use crate::config::{CacheConfig, Config, LLMProvider, ResearchConfig, ScraperConfig};
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert!(config.session_id.is_none());
        assert_eq!(config.output_path, PathBuf::from("./deepresearch.out"));
        assert_eq!(config.internal_path, PathBuf::from("./.deepresearch"));
        assert!(!config.skip_knowledge_graph);
        assert!(!config.skip_html_export);
        assert!(!config.chat_after_research);
        assert!(!config.force_regenerate);
        assert!(!config.verbose);
    }

    #[test]
    fn test_llm_provider_default() {
        let provider = LLMProvider::default();
        assert_eq!(provider, LLMProvider::Mistral);
    }

    #[test]
    fn test_llm_provider_from_str() {
        assert_eq!(
            "mistral".parse::<LLMProvider>().unwrap(),
            LLMProvider::Mistral
        );
        assert_eq!(
            "openai".parse::<LLMProvider>().unwrap(),
            LLMProvider::OpenAI
        );
        assert_eq!(
            "deepseek".parse::<LLMProvider>().unwrap(),
            LLMProvider::DeepSeek
        );
        assert_eq!(
            "ollama".parse::<LLMProvider>().unwrap(),
            LLMProvider::Ollama
        );

        assert!("invalid".parse::<LLMProvider>().is_err());
    }

    #[test]
    fn test_llm_provider_display() {
        assert_eq!(LLMProvider::Mistral.to_string(), "mistral");
        assert_eq!(LLMProvider::OpenAI.to_string(), "openai");
        assert_eq!(LLMProvider::DeepSeek.to_string(), "deepseek");
        assert_eq!(LLMProvider::Ollama.to_string(), "ollama");
    }

    #[test]
    fn test_llm_config_default() {
        let config = Config::default().llm;

        assert_eq!(config.provider, LLMProvider::Mistral);
        // api_key may be empty if env var is not set
        assert!(!config.api_base_url.is_empty());
        assert_eq!(config.model_efficient, "mistral-small-latest");
        assert_eq!(config.model_powerful, "mistral-large-latest");
        assert_eq!(config.embedding_model, "mistral-embed");
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.retry_attempts, 5);
        assert_eq!(config.retry_delay_ms, 5000);
        assert_eq!(config.max_tool_iterations, 8);
    }

    #[test]
    fn test_search_config_default() {
        let config = Config::default().search;

        assert_eq!(config.endpoint, "https://google.serper.dev/search");
        assert_eq!(config.results_per_query, 10);
        assert!(config.blacklist_domains.contains(&"youtube.com".to_string()));
        assert!(config.blacklist_domains.contains(&"reddit.com".to_string()));
    }

    #[test]
    fn test_scraper_config_default() {
        let config = ScraperConfig::default();

        assert_eq!(config.endpoint, "https://chrome.browserless.io/content");
        assert_eq!(config.goto_timeout_ms, 15000);
        assert_eq!(config.min_content_length, 200);
        assert_eq!(config.max_content_length, 20000);
        assert!(config.reject_patterns.contains(&".css".to_string()));
        assert!(config.reject_patterns.contains(&"doubleclick".to_string()));
    }

    #[test]
    fn test_research_config_default() {
        let config = ResearchConfig::default();

        assert_eq!(config.max_loops, 3);
        assert_eq!(config.max_urls_per_topic, 5);
        assert_eq!(config.max_sub_topics, 5);
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.chunk_overlap, 200);
        assert_eq!(config.retrieval_top_k, 10);
    }

    #[test]
    fn test_cache_config_default() {
        let config = CacheConfig::default();

        assert!(config.enabled);
        assert_eq!(config.cache_dir, PathBuf::from(".deepresearch/cache"));
        assert_eq!(config.expire_hours, 168); // 1 week
    }

    #[test]
    fn test_get_session_id_with_configured_id() {
        let config = Config {
            session_id: Some("abc123".to_string()),
            ..Default::default()
        };

        assert_eq!(config.get_session_id(), "abc123");
    }

    #[test]
    fn test_get_session_id_generated() {
        let config = Config::default();

        let id = config.get_session_id();
        assert_eq!(id.len(), 8);
        // 每次生成的ID应当不同
        assert_ne!(id, config.get_session_id());
    }

    #[test]
    fn test_get_session_id_empty_configured_id() {
        let config = Config {
            session_id: Some("   ".to_string()),
            ..Default::default()
        };

        assert_eq!(config.get_session_id().len(), 8);
    }

    #[test]
    fn test_config_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("deepresearch.toml");

        let content = r#"
session_id = "filecfg1"
output_path = "./out"
internal_path = "./.deepresearch"
target_language = "en"
skip_knowledge_graph = true
skip_html_export = false
chat_after_research = false
force_regenerate = false
verbose = true

[llm]
provider = "mistral"
api_key = "test-key"
api_base_url = "https://api.mistral.ai/v1"
model_efficient = "mistral-small-latest"
model_powerful = "mistral-large-latest"
embedding_model = "mistral-embed"
embedding_api_base_url = "https://api.mistral.ai/v1"
max_tokens = 4096
temperature = 0.0
retry_attempts = 2
retry_delay_ms = 100
timeout_seconds = 60
max_tool_iterations = 4

[search]
api_key = "serp-key"
endpoint = "https://google.serper.dev/search"
results_per_query = 5
blacklist_domains = ["youtube.com"]

[scraper]
api_key = "browserless-key"
endpoint = "https://chrome.browserless.io/content"
goto_timeout_ms = 10000
request_timeout_seconds = 30
min_content_length = 100
max_content_length = 10000
reject_patterns = [".css"]
max_concurrency = 2

[research]
max_loops = 2
max_urls_per_topic = 3
max_sub_topics = 4
chunk_size = 500
chunk_overlap = 50
retrieval_top_k = 6
snippet_truncate_length = 400

[chat]
retrieval_top_k = 3
snippet_truncate_length = 200

[launcher]
backend_command = "python backend.py"
frontend_command = "python frontend.py"
startup_delay_secs = 3

[cache]
enabled = false
cache_dir = ".deepresearch/cache"
expire_hours = 24
"#;
        std::fs::write(&config_path, content).unwrap();

        let config = Config::from_file(&config_path).unwrap();
        assert_eq!(config.session_id, Some("filecfg1".to_string()));
        assert!(config.skip_knowledge_graph);
        assert!(config.verbose);
        assert_eq!(config.llm.api_key, "test-key");
        assert_eq!(config.search.results_per_query, 5);
        assert_eq!(config.scraper.max_concurrency, 2);
        assert_eq!(config.research.max_loops, 2);
        assert_eq!(
            config.launcher.backend_command,
            Some("python backend.py".to_string())
        );
        assert_eq!(config.launcher.startup_delay_secs, 3);
        assert!(!config.cache.enabled);
    }

    #[test]
    fn test_config_from_missing_file() {
        let result = Config::from_file(&PathBuf::from("/nonexistent/deepresearch.toml"));
        assert!(result.is_err());
    }
}
