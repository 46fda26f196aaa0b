//! 网页抓取Agent工具

use rig::tool::Tool;
use serde::{Deserialize, Serialize};

use crate::tools::ScraperClient;

/// 工具输出的正文长度上限，避免撑爆对话上下文
const TOOL_CONTENT_LIMIT: usize = 8000;

/// 抓取工具 - 让Agent读取某条搜索结果的完整正文
#[derive(Clone)]
pub struct AgentToolScrapeWebsite {
    client: ScraperClient,
}

/// 抓取参数
#[derive(Debug, Deserialize)]
pub struct ScrapeWebsiteArgs {
    pub url: String,
}

/// 抓取结果
#[derive(Debug, Serialize)]
pub struct ScrapeWebsiteOutput {
    pub url: String,
    pub title: String,
    pub content: String,
}

/// 抓取工具错误
#[derive(Debug, thiserror::Error)]
#[error("scrape failed for {url}: {message}")]
pub struct ScrapeWebsiteToolError {
    url: String,
    message: String,
}

impl AgentToolScrapeWebsite {
    pub fn new(client: ScraperClient) -> Self {
        Self { client }
    }
}

impl Tool for AgentToolScrapeWebsite {
    const NAME: &'static str = "scrape_website";

    type Error = ScrapeWebsiteToolError;
    type Args = ScrapeWebsiteArgs;
    type Output = ScrapeWebsiteOutput;

    async fn definition(&self, _prompt: String) -> rig::completion::ToolDefinition {
        rig::completion::ToolDefinition {
            name: Self::NAME.to_string(),
            description:
                "Fetch the readable text content of a web page. Use this after web_search to read a promising result in full."
                    .to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "The URL of the page to read."
                    }
                },
                "required": ["url"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        println!("   🔧 tool called...scrape_website@{}", args.url);

        let page = self.client.scrape(&args.url).await;
        if !page.is_success() {
            return Err(ScrapeWebsiteToolError {
                url: args.url,
                message: page.content,
            });
        }

        let content: String = page.content.chars().take(TOOL_CONTENT_LIMIT).collect();
        Ok(ScrapeWebsiteOutput {
            url: page.url,
            title: page.title,
            content,
        })
    }
}
