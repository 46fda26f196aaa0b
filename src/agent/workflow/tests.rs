#[cfg(test)]
mod tests {
    use crate::agent::context::AgentContext;
    use crate::agent::memory::{MemoryScope, ScopedKeys};
    use crate::agent::review::VerdictKind;
    use crate::agent::workflow::{
        LIMITED_RESEARCH_NOTE, LoopAdvance, TimingKeys, TimingScope, advance_after_review,
        append_limited_note,
    };
    use crate::config::Config;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn create_test_context() -> (AgentContext, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            output_path: temp_dir.path().join("output"),
            internal_path: temp_dir.path().join(".deepresearch"),
            ..Default::default()
        };

        let context = AgentContext::new(config).unwrap();
        (context, temp_dir)
    }

    #[test]
    fn test_agent_context_creation() {
        let (_context, _temp_dir) = create_test_context();
    }

    #[test]
    fn test_agent_context_paths() {
        let (context, temp_dir) = create_test_context();

        assert_eq!(context.config.output_path, temp_dir.path().join("output"));
        assert_eq!(
            context.config.internal_path,
            temp_dir.path().join(".deepresearch")
        );
    }

    #[test]
    fn test_agent_context_config_values() {
        let (context, _temp_dir) = create_test_context();

        assert_eq!(context.config.research.max_loops, 3);
        assert_eq!(context.config.research.max_urls_per_topic, 5);
        assert_eq!(context.config.research.max_sub_topics, 5);
        assert_eq!(context.config.research.chunk_size, 1000);
        assert_eq!(context.config.research.chunk_overlap, 200);
        assert!(!context.config.force_regenerate);
        assert!(!context.config.verbose);
    }

    #[test]
    fn test_agent_context_llm_config() {
        let (context, _temp_dir) = create_test_context();

        // api_key may be empty if env var is not set
        assert!(!context.config.llm.api_base_url.is_empty());
        assert!(!context.config.llm.model_efficient.is_empty());
        assert!(!context.config.llm.model_powerful.is_empty());
        assert!(!context.config.llm.embedding_model.is_empty());
        assert_eq!(context.config.llm.max_tokens, 32768);
        assert_eq!(context.config.llm.temperature, 0.0);
    }

    #[test]
    fn test_agent_context_cache_config() {
        let (context, _temp_dir) = create_test_context();

        assert!(context.config.cache.enabled);
        assert_eq!(
            context.config.cache.cache_dir,
            PathBuf::from(".deepresearch/cache")
        );
        assert_eq!(context.config.cache.expire_hours, 168);
    }

    #[tokio::test]
    async fn test_memory_roundtrip_through_context() {
        let (context, _temp_dir) = create_test_context();

        context
            .store_to_memory(MemoryScope::RESEARCH, ScopedKeys::QUERY, "test query")
            .await
            .unwrap();

        assert!(
            context
                .has_memory_data(MemoryScope::RESEARCH, ScopedKeys::QUERY)
                .await
        );
        let query: Option<String> = context
            .get_from_memory(MemoryScope::RESEARCH, ScopedKeys::QUERY)
            .await;
        assert_eq!(query, Some("test query".to_string()));
    }

    #[tokio::test]
    async fn test_empty_store_guard() {
        let (context, _temp_dir) = create_test_context();

        assert_eq!(context.store_count().await, 0);
        let hits = context.retrieve("anything", 5).await.unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_timing_scope_accumulates_phases() {
        let mut timing = TimingScope::new();

        timing.start_phase(TimingKeys::RESEARCH);
        let first = timing.end_phase(TimingKeys::RESEARCH);
        assert!(first.is_some());

        timing.start_phase(TimingKeys::RESEARCH);
        timing.end_phase(TimingKeys::RESEARCH);

        let report = timing.generate_timing_report();
        assert!(report.contains("research"));
    }

    #[test]
    fn test_timing_scope_unknown_phase() {
        let mut timing = TimingScope::new();
        assert!(timing.end_phase("never-started").is_none());
    }

    #[test]
    fn test_loop_finishes_on_complete_verdict() {
        let advance = advance_after_review(&VerdictKind::Complete, 1, 0, 3, 4);
        assert_eq!(advance, LoopAdvance::Finish);
    }

    #[test]
    fn test_loop_advances_to_next_topic() {
        let advance = advance_after_review(&VerdictKind::NeedMoreResearch, 0, 0, 3, 4);
        assert_eq!(
            advance,
            LoopAdvance::Continue {
                next_index: 1,
                loop_count: 1
            }
        );
    }

    #[test]
    fn test_loop_index_wraps_past_last_topic() {
        let advance = advance_after_review(&VerdictKind::SourcesInsufficient, 3, 0, 3, 4);
        assert_eq!(
            advance,
            LoopAdvance::Continue {
                next_index: 0,
                loop_count: 1
            }
        );
    }

    #[test]
    fn test_loop_forces_completion_at_max_loops() {
        let advance = advance_after_review(&VerdictKind::NeedMoreResearch, 2, 2, 3, 4);
        assert_eq!(advance, LoopAdvance::ForceFinish { loop_count: 3 });
    }

    #[test]
    fn test_loop_terminates_within_max_loops() {
        // 评审始终不通过时，循环必须在max_loops轮内强制收尾
        let max_loops: u32 = 3;
        let mut index = 0usize;
        let mut loops = 0u32;
        let mut iterations = 0u32;

        loop {
            iterations += 1;
            match advance_after_review(&VerdictKind::NeedMoreResearch, index, loops, max_loops, 2)
            {
                LoopAdvance::ForceFinish { .. } => break,
                LoopAdvance::Continue {
                    next_index,
                    loop_count,
                } => {
                    index = next_index;
                    loops = loop_count;
                }
                LoopAdvance::Finish => unreachable!(),
            }
            assert!(iterations <= max_loops, "循环未在最大轮数内终止");
        }
        assert_eq!(iterations, max_loops);
    }

    #[test]
    fn test_forced_completion_appends_limited_note() {
        let report = append_limited_note("# Draft report".to_string());
        assert!(report.starts_with("# Draft report"));
        assert!(report.ends_with(LIMITED_RESEARCH_NOTE));
    }

    #[test]
    fn test_config_with_custom_values() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            output_path: temp_dir.path().join("custom_output"),
            internal_path: temp_dir.path().join(".deepresearch"),
            force_regenerate: true,
            verbose: true,
            chat_after_research: true,
            ..Default::default()
        };

        let context = AgentContext::new(config).unwrap();
        assert!(context.config.force_regenerate);
        assert!(context.config.verbose);
        assert!(context.config.chat_after_research);
    }

    #[test]
    fn test_skip_flags() {
        let config = Config {
            skip_knowledge_graph: true,
            skip_html_export: true,
            ..Default::default()
        };

        let context = AgentContext::new(config).unwrap();
        assert!(context.config.skip_knowledge_graph);
        assert!(context.config.skip_html_export);
    }

    #[test]
    fn test_target_language() {
        use crate::i18n::TargetLanguage;

        let config = Config {
            target_language: TargetLanguage::Japanese,
            ..Default::default()
        };

        let context = AgentContext::new(config).unwrap();
        assert_eq!(context.config.target_language, TargetLanguage::Japanese);
    }

    #[test]
    fn test_session_id_generation() {
        let config = Config::default();
        let id = config.get_session_id();
        assert_eq!(id.len(), 8);

        let configured = Config {
            session_id: Some("my-session".to_string()),
            ..Default::default()
        };
        assert_eq!(configured.get_session_id(), "my-session");
    }
}
