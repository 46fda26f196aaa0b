//! Agent执行辅助 - 统一封装LLM调用前后的缓存读写

use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::agent::context::AgentContext;

/// Agent执行参数
pub struct AgentExecuteParams {
    pub prompt_sys: String,
    pub prompt_user: String,
    /// 缓存目录分类，形如 "research/Planner"
    pub cache_scope: String,
    pub log_tag: String,
}

impl AgentExecuteParams {
    fn cache_key(&self) -> String {
        format!("{}\n---\n{}", self.prompt_sys, self.prompt_user)
    }
}

/// 结构化提取调用（带缓存）
pub async fn extract<T>(context: &AgentContext, params: AgentExecuteParams) -> Result<T>
where
    T: JsonSchema + for<'a> Deserialize<'a> + Serialize + Send + Sync + 'static,
{
    let cache_key = params.cache_key();

    if !context.config.force_regenerate {
        let cache = context.cache_manager.read().await;
        if let Some(cached) = cache.get::<T>(&params.cache_scope, &cache_key).await? {
            println!("   📦 [{}] 命中缓存，跳过模型调用", params.log_tag);
            return Ok(cached);
        }
    }

    let result: T = context
        .llm_client
        .extract(&params.prompt_sys, &params.prompt_user)
        .await?;

    let cache = context.cache_manager.read().await;
    cache
        .set(&params.cache_scope, &cache_key, &result, None)
        .await?;

    Ok(result)
}

/// 文本生成调用（带缓存）
pub async fn prompt(context: &AgentContext, params: AgentExecuteParams) -> Result<String> {
    let cache_key = params.cache_key();

    if !context.config.force_regenerate {
        let cache = context.cache_manager.read().await;
        if let Some(cached) = cache.get::<String>(&params.cache_scope, &cache_key).await? {
            println!("   📦 [{}] 命中缓存，跳过模型调用", params.log_tag);
            return Ok(cached);
        }
    }

    let result = context
        .llm_client
        .prompt(&params.prompt_sys, &params.prompt_user)
        .await?;

    let cache = context.cache_manager.read().await;
    cache
        .set(&params.cache_scope, &cache_key, &result, None)
        .await?;

    Ok(result)
}
