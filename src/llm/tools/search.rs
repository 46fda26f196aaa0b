//! 网络搜索Agent工具

use rig::tool::Tool;
use serde::{Deserialize, Serialize};

use crate::tools::{SearchClient, SearchResult};

/// 搜索工具 - 让Agent在向量库无法回答时检索实时网络信息
#[derive(Clone)]
pub struct AgentToolWebSearch {
    client: SearchClient,
    max_results: usize,
}

/// 搜索参数
#[derive(Debug, Deserialize)]
pub struct WebSearchArgs {
    pub query: String,
}

/// 搜索结果
#[derive(Debug, Serialize)]
pub struct WebSearchOutput {
    pub results: Vec<SearchResult>,
}

/// 搜索工具错误
#[derive(Debug, thiserror::Error)]
#[error("web search failed: {0}")]
pub struct WebSearchToolError(String);

impl AgentToolWebSearch {
    pub fn new(client: SearchClient, max_results: usize) -> Self {
        Self {
            client,
            max_results,
        }
    }
}

impl Tool for AgentToolWebSearch {
    const NAME: &'static str = "web_search";

    type Error = WebSearchToolError;
    type Args = WebSearchArgs;
    type Output = WebSearchOutput;

    async fn definition(&self, _prompt: String) -> rig::completion::ToolDefinition {
        rig::completion::ToolDefinition {
            name: Self::NAME.to_string(),
            description:
                "Search the web for current information. Returns a list of results with title, link and snippet."
                    .to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query."
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        println!("   🔧 tool called...web_search@{}", args.query);

        let raw = self.client.search(&args.query).await;
        let mut results = self.client.filter_quality(raw);
        results.truncate(self.max_results);

        if results.is_empty() {
            return Err(WebSearchToolError(format!(
                "no usable results for query '{}'",
                args.query
            )));
        }

        Ok(WebSearchOutput { results })
    }
}
