pub mod scraper;
pub mod search;

pub use scraper::AgentToolScrapeWebsite;
pub use search::AgentToolWebSearch;

/// 问答兜底Agent可用的工具集
#[derive(Clone)]
pub struct ResearchToolset {
    pub search: AgentToolWebSearch,
    pub scrape: AgentToolScrapeWebsite,
}

impl ResearchToolset {
    pub fn new(search: AgentToolWebSearch, scrape: AgentToolScrapeWebsite) -> Self {
        Self { search, scrape }
    }
}
