//! 追问聊天模式 - 基于已入库调研资料回答后续问题，资料不足时回退到带工具的Agent

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::agent::context::AgentContext;
use crate::agent::write::format_retrieved_context;
use crate::llm::tools::{AgentToolScrapeWebsite, AgentToolWebSearch, ResearchToolset};
use crate::tools::{ScraperClient, SearchClient};

/// 低于该相似度的检索结果视为不相关
const MIN_RELEVANCE_SCORE: f32 = 0.5;

/// 向量库为空时的提示，不触发任何LLM调用
const EMPTY_STORE_MESSAGE: &str =
    "No research material has been indexed in this session. Run a research session first.";

/// 检索无果且联网工具不可用时的兜底回复
const NO_SOURCES_MESSAGE: &str =
    "The indexed research material does not cover this question and web tools are not \
     configured. Set SERP_API_KEY to enable live web search.";

const CHAT_SYSTEM_PROMPT: &str = r#"You answer follow-up questions about a completed research session.
Use only the retrieved material provided with each question.

Rules:
- Cite every factual claim inline as [Source: URL].
- If the retrieved material does not answer the question, say so plainly instead of guessing.
- Keep answers focused and concise."#;

const FALLBACK_SYSTEM_PROMPT: &str = r#"You are a research assistant with live web access.
The indexed research material does not cover the user's question, so investigate it yourself:
1. Call web_search to find promising sources.
2. Call scrape_website on the most relevant results to read them in full.
3. Answer from what you actually read.

Rules:
- Label facts taken from search snippets as [Search Result: URL].
- Label facts taken from scraped pages as [Source: URL].
- If the web yields nothing useful, say so instead of guessing."#;

/// 进入交互式追问循环，输入 exit / quit 退出
pub async fn run(context: &AgentContext) -> Result<()> {
    println!("\n💬 进入追问模式（输入 exit 或 quit 退出）");

    let toolset = build_toolset(context);
    if toolset.is_none() {
        println!("⚠️ SERP_API_KEY 未配置，资料不足时无法联网兜底");
    }

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        stdout.write_all("❓ > ".as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();

        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            break;
        }

        match answer(context, toolset.as_ref(), question).await {
            Ok(response) => println!("\n{}\n", response),
            Err(e) => eprintln!("❌ 回答失败: {}", e),
        }
    }

    println!("👋 追问模式已退出");
    Ok(())
}

/// 回答单个问题
///
/// 优先使用向量库检索；检索不到相关资料且工具可用时回退到联网Agent。
pub async fn answer(
    context: &AgentContext,
    toolset: Option<&ResearchToolset>,
    question: &str,
) -> Result<String> {
    // 向量库为空时不消耗任何LLM调用
    if context.store_count().await == 0 {
        return Ok(EMPTY_STORE_MESSAGE.to_string());
    }

    let chat_config = &context.config.chat;
    let mut hits = context.retrieve(question, chat_config.retrieval_top_k).await?;
    hits.retain(|hit| hit.score >= MIN_RELEVANCE_SCORE);

    if !hits.is_empty() {
        let material = format_retrieved_context(&hits, chat_config.snippet_truncate_length);
        let user_prompt = build_user_prompt(question, &material);
        return context
            .llm_client
            .prompt(CHAT_SYSTEM_PROMPT, &user_prompt)
            .await;
    }

    match toolset {
        Some(tools) => {
            println!("🔁 向量库中没有相关资料，转入联网调研...");
            context
                .llm_client
                .prompt_with_tools(FALLBACK_SYSTEM_PROMPT, question, tools)
                .await
        }
        None => Ok(NO_SOURCES_MESSAGE.to_string()),
    }
}

/// 构建问答用户prompt
fn build_user_prompt(question: &str, material: &str) -> String {
    format!("{}\n### Question\n{}", material, question)
}

/// 构建联网兜底工具集，搜索KEY缺失时返回None
fn build_toolset(context: &AgentContext) -> Option<ResearchToolset> {
    let search_client = SearchClient::new(context.config.search.clone()).ok()?;
    let scraper_client = ScraperClient::new(context.config.scraper.clone());

    Some(ResearchToolset::new(
        AgentToolWebSearch::new(search_client, context.config.research.max_urls_per_topic),
        AgentToolScrapeWebsite::new(scraper_client),
    ))
}
