pub mod scraper;
pub mod search;

pub use scraper::{ScrapeStatus, ScrapedPage, ScraperClient};
pub use search::{SearchClient, SearchResult};
