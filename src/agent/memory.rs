//! 调研流水线的Memory作用域与键约定

/// Memory作用域
pub struct MemoryScope;

impl MemoryScope {
    pub const RESEARCH: &'static str = "research";
    pub const CHAT: &'static str = "chat";
}

/// 各作用域下的数据键
pub struct ScopedKeys;

impl ScopedKeys {
    /// 用户的原始调研问题
    pub const QUERY: &'static str = "query";
    /// 规划阶段产出的子主题列表
    pub const SUB_TOPICS: &'static str = "sub_topics";
    /// 已抓取来源的摘要列表
    pub const SCRAPED_SOURCES: &'static str = "scraped_sources";
    /// 当前报告草稿
    pub const REPORT_DRAFT: &'static str = "report_draft";
    /// 最终报告
    pub const REPORT: &'static str = "report";
    /// 评审结论历史
    pub const REVIEW_HISTORY: &'static str = "review_history";
    /// 调研过程统计
    pub const RUN_STATS: &'static str = "run_stats";
}
