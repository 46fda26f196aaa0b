use std::sync::LazyLock;

use crate::{config::LLMConfig, utils::token_estimator::TokenEstimator};

static TOKEN_ESTIMATOR: LazyLock<TokenEstimator> = LazyLock::new(TokenEstimator::new);

/// 高效模型可承受的估算token上限，超出则直接使用强力模型
const EFFICIENT_MODEL_TOKEN_LIMIT: usize = 8 * 1024;

/// 按prompt规模选择模型：小任务用高效模型并保留强力模型兜底，大任务直接用强力模型
pub fn evaluate_befitting_model(
    llm_config: &LLMConfig,
    system_prompt: &str,
    user_prompt: &str,
) -> (String, Option<String>) {
    let estimated = TOKEN_ESTIMATOR.estimate_tokens(system_prompt)
        + TOKEN_ESTIMATOR.estimate_tokens(user_prompt);

    if estimated <= EFFICIENT_MODEL_TOKEN_LIMIT {
        return (
            llm_config.model_efficient.clone(),
            Some(llm_config.model_powerful.clone()),
        );
    }
    (llm_config.model_powerful.clone(), None)
}

#[cfg(test)]
mod tests {
    use super::evaluate_befitting_model;
    use crate::config::LLMConfig;

    #[test]
    fn test_small_prompt_uses_efficient_model_with_fallover() {
        let config = LLMConfig::default();
        let (model, fallover) = evaluate_befitting_model(&config, "system", "user question");

        assert_eq!(model, config.model_efficient);
        assert_eq!(fallover, Some(config.model_powerful.clone()));
    }

    #[test]
    fn test_large_prompt_uses_powerful_model_without_fallover() {
        let config = LLMConfig::default();
        let huge = "x".repeat(64 * 1024);
        let (model, fallover) = evaluate_befitting_model(&config, "system", &huge);

        assert_eq!(model, config.model_powerful);
        assert!(fallover.is_none());
    }
}
