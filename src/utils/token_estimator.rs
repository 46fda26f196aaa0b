/// Token估算器，用于估算文本的token数量
pub struct TokenEstimator {
    /// ASCII字符的平均token比例（字符数/token数）
    ascii_char_per_token: f64,
    /// CJK字符的平均token比例
    cjk_char_per_token: f64,
    /// 基础token开销（系统prompt等）
    base_token_overhead: usize,
}

impl Default for TokenEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenEstimator {
    pub fn new() -> Self {
        // 基于GPT系列模型的经验值
        Self {
            ascii_char_per_token: 4.0,
            cjk_char_per_token: 1.5,
            base_token_overhead: 50,
        }
    }

    /// 估算文本的token数量
    pub fn estimate_tokens(&self, text: &str) -> usize {
        let cjk_count = text.chars().filter(|c| Self::is_cjk_char(*c)).count();
        let other_count = text.chars().count() - cjk_count;

        let cjk_tokens = (cjk_count as f64 / self.cjk_char_per_token).ceil() as usize;
        let other_tokens = (other_count as f64 / self.ascii_char_per_token).ceil() as usize;

        cjk_tokens + other_tokens + self.base_token_overhead
    }

    /// 检查文本是否超过token限制
    pub fn exceeds_limit(&self, text: &str, limit: usize) -> bool {
        self.estimate_tokens(text) > limit
    }

    fn is_cjk_char(c: char) -> bool {
        matches!(c as u32,
            0x4E00..=0x9FFF |   // CJK统一汉字
            0x3400..=0x4DBF |   // CJK扩展A
            0x20000..=0x2A6DF | // CJK扩展B
            0x3040..=0x30FF     // 日文假名
        )
    }
}

#[cfg(test)]
mod tests {
    use super::TokenEstimator;

    #[test]
    fn test_estimate_tokens_english() {
        let estimator = TokenEstimator::new();
        // 40个ASCII字符 → 10 tokens + 基础开销50
        let text = "a".repeat(40);
        assert_eq!(estimator.estimate_tokens(&text), 60);
    }

    #[test]
    fn test_estimate_tokens_cjk_heavier() {
        let estimator = TokenEstimator::new();
        let english = "word ".repeat(20);
        let chinese = "汉".repeat(100);
        assert!(
            estimator.estimate_tokens(&chinese) > estimator.estimate_tokens(&english),
            "CJK text should produce more tokens per char"
        );
    }

    #[test]
    fn test_exceeds_limit() {
        let estimator = TokenEstimator::new();
        assert!(estimator.exceeds_limit(&"x".repeat(10000), 100));
        assert!(!estimator.exceeds_limit("short", 100));
    }
}
