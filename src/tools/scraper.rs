//! 网页抓取工具 - 基于Browserless.io的无头浏览器内容抓取

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::LazyLock;
use std::time::Duration;

use crate::config::ScraperConfig;

/// 抓取结果状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScrapeStatus {
    /// 正文抓取成功
    Success,
    /// 页面可达但正文过短（可能被反爬拦截）
    Minimal,
    /// 请求超时
    Timeout,
    /// 其他错误
    Error,
}

/// 抓取到的页面
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedPage {
    pub url: String,
    pub title: String,
    pub content: String,
    pub scraped_at: DateTime<Utc>,
    pub status: ScrapeStatus,
}

impl ScrapedPage {
    pub fn is_success(&self) -> bool {
        self.status == ScrapeStatus::Success
    }
}

/// 需要整块移除的非正文标签
const STRIP_TAGS: [&str; 9] = [
    "script", "style", "nav", "footer", "header", "aside", "iframe", "noscript", "svg",
];

static STRIP_TAG_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    STRIP_TAGS
        .iter()
        .map(|tag| Regex::new(&format!(r"(?is)<{tag}\b.*?</{tag}\s*>")).expect("valid tag regex"))
        .collect()
});

static TITLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid title regex"));

static COMMENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment regex"));

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));

static WHITESPACE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// 抓取客户端
#[derive(Clone)]
pub struct ScraperClient {
    http: reqwest::Client,
    config: ScraperConfig,
}

impl ScraperClient {
    pub fn new(config: ScraperConfig) -> Self {
        if config.api_key.trim().is_empty() {
            eprintln!("⚠️ 警告: BROWSERLESS_API_KEY 未配置，抓取将不可用");
        }
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// 抓取单个URL
    ///
    /// 单个页面的失败不会中断调研流程，失败信息记录在返回页面的状态中。
    pub async fn scrape(&self, url: &str) -> ScrapedPage {
        println!("🌐 抓取页面: {}", url);

        if self.config.api_key.trim().is_empty() {
            return self.failed_page(url, ScrapeStatus::Error, "Error: Missing API Key");
        }

        let payload = json!({
            "url": url,
            "rejectRequestPattern": self.config.reject_patterns,
            "gotoOptions": {
                "timeout": self.config.goto_timeout_ms,
                "waitUntil": "domcontentloaded",
            },
        });

        let response = self
            .http
            .post(&self.config.endpoint)
            .query(&[("token", self.config.api_key.as_str())])
            .json(&payload)
            .timeout(Duration::from_secs(self.config.request_timeout_seconds))
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                let status = if e.is_timeout() {
                    ScrapeStatus::Timeout
                } else {
                    ScrapeStatus::Error
                };
                let message = self.redact(&format!("Error: Technical issue scraping website: {}", e));
                eprintln!("❌ 抓取异常: {}", message);
                return self.failed_page(url, status, &message);
            }
        };

        if !response.status().is_success() {
            let code = response.status();
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(100).collect();
            eprintln!("❌ Browserless错误: {} - {}", code, self.redact(&preview));
            return self.failed_page(
                url,
                ScrapeStatus::Error,
                &format!("Error: Scrape failed with status {}", code),
            );
        }

        let html = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                let message = self.redact(&format!("Error: Failed to read response body: {}", e));
                return self.failed_page(url, ScrapeStatus::Error, &message);
            }
        };

        self.page_from_html(url, &html)
    }

    /// 从HTML构造页面结果，做正文清洗与长度分级
    fn page_from_html(&self, url: &str, html: &str) -> ScrapedPage {
        let title = extract_title(html).unwrap_or_else(|| url.to_string());
        let text = html_to_text(html);

        if text.chars().count() < self.config.min_content_length {
            return ScrapedPage {
                url: url.to_string(),
                title,
                content: "Error: Content too short or blocked.".to_string(),
                scraped_at: Utc::now(),
                status: ScrapeStatus::Minimal,
            };
        }

        let content: String = text.chars().take(self.config.max_content_length).collect();
        ScrapedPage {
            url: url.to_string(),
            title,
            content,
            scraped_at: Utc::now(),
            status: ScrapeStatus::Success,
        }
    }

    fn failed_page(&self, url: &str, status: ScrapeStatus, message: &str) -> ScrapedPage {
        ScrapedPage {
            url: url.to_string(),
            title: "Error".to_string(),
            content: message.to_string(),
            scraped_at: Utc::now(),
            status,
        }
    }

    /// 错误信息脱敏，避免API KEY泄露到日志
    fn redact(&self, message: &str) -> String {
        if self.config.api_key.is_empty() {
            return message.to_string();
        }
        message.replace(&self.config.api_key, "REDACTED_KEY")
    }
}

/// 提取页面标题
fn extract_title(html: &str) -> Option<String> {
    TITLE_PATTERN.captures(html).and_then(|caps| {
        let title = decode_entities(caps.get(1)?.as_str()).trim().to_string();
        if title.is_empty() { None } else { Some(title) }
    })
}

/// HTML转纯文本：移除非正文标签块、剥离标签、解码常见实体并折叠空白
fn html_to_text(html: &str) -> String {
    let mut text = COMMENT_PATTERN.replace_all(html, " ").into_owned();
    for pattern in STRIP_TAG_PATTERNS.iter() {
        text = pattern.replace_all(&text, " ").into_owned();
    }
    let text = TAG_PATTERN.replace_all(&text, " ");
    let text = decode_entities(&text);
    WHITESPACE_PATTERN.replace_all(&text, " ").trim().to_string()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

#[cfg(test)]
mod tests {
    use super::{ScrapeStatus, ScraperClient, extract_title, html_to_text};
    use crate::config::ScraperConfig;

    fn test_client() -> ScraperClient {
        ScraperClient::new(ScraperConfig {
            api_key: "secret-token".to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_html_to_text_strips_non_content_tags() {
        let html = r#"
            <html><head><title>Doc</title><style>body { color: red; }</style></head>
            <body>
                <nav>Home | About</nav>
                <script>var tracking = true;</script>
                <p>Actual article content here.</p>
                <footer>Copyright 2025</footer>
            </body></html>
        "#;

        let text = html_to_text(html);
        assert!(text.contains("Actual article content here."));
        assert!(!text.contains("tracking"));
        assert!(!text.contains("color: red"));
        assert!(!text.contains("Home | About"));
        assert!(!text.contains("Copyright"));
    }

    #[test]
    fn test_html_to_text_decodes_entities_and_collapses_whitespace() {
        let html = "<p>a&nbsp;&amp;&nbsp;b</p>\n\n\n<p>c    d</p>";
        assert_eq!(html_to_text(html), "a & b c d");
    }

    #[test]
    fn test_html_to_text_removes_comments() {
        let html = "<p>visible</p><!-- hidden note -->";
        let text = html_to_text(html);
        assert!(text.contains("visible"));
        assert!(!text.contains("hidden"));
    }

    #[test]
    fn test_extract_title() {
        assert_eq!(
            extract_title("<html><head><title> My Page </title></head></html>"),
            Some("My Page".to_string())
        );
        assert_eq!(extract_title("<html><body>no title</body></html>"), None);
    }

    #[test]
    fn test_page_from_html_minimal_content() {
        let client = test_client();
        let page = client.page_from_html("https://example.com", "<title>T</title><p>tiny</p>");

        assert_eq!(page.status, ScrapeStatus::Minimal);
        assert_eq!(page.title, "T");
        assert!(!page.is_success());
    }

    #[test]
    fn test_page_from_html_success_and_truncation() {
        let client = ScraperClient::new(ScraperConfig {
            api_key: "secret-token".to_string(),
            min_content_length: 10,
            max_content_length: 50,
            ..Default::default()
        });

        let body = "word ".repeat(100);
        let html = format!("<title>Long</title><p>{}</p>", body);
        let page = client.page_from_html("https://example.com", &html);

        assert_eq!(page.status, ScrapeStatus::Success);
        assert_eq!(page.content.chars().count(), 50);
    }

    #[test]
    fn test_redact_hides_api_key() {
        let client = test_client();
        let message = client.redact("request to ?token=secret-token failed");
        assert!(!message.contains("secret-token"));
        assert!(message.contains("REDACTED_KEY"));
    }

    #[test]
    fn test_missing_title_falls_back_to_url() {
        let client = ScraperClient::new(ScraperConfig {
            api_key: "k".to_string(),
            min_content_length: 1,
            ..Default::default()
        });
        let page = client.page_from_html("https://example.com/x", "<p>some body text</p>");
        assert_eq!(page.title, "https://example.com/x");
    }
}
