//! 递归字符文本分块器 - 将抓取的长文本切分为带重叠的片段用于向量化

/// 文本分块器
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<&'static str>,
}

impl TextSplitter {
    /// 创建分块器，chunk_overlap必须小于chunk_size
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_overlap = chunk_overlap.min(chunk_size.saturating_sub(1));
        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap,
            separators: vec!["\n\n", "\n", " "],
        }
    }

    /// 将文本切分为不超过chunk_size的片段，相邻片段保留chunk_overlap的重叠
    ///
    /// 切分点优先选择段落、换行、空格边界，找不到边界时按字符硬切。
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return Vec::new();
        }
        if chars.len() <= self.chunk_size {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Vec::new();
            }
            return vec![trimmed.to_string()];
        }

        let mut chunks = Vec::new();
        let mut start = 0usize;

        while start < chars.len() {
            let end_limit = (start + self.chunk_size).min(chars.len());
            let mut end = end_limit;

            // 只有在非末尾块时才需要寻找切分边界
            if end_limit < chars.len()
                && let Some(cut) = self.find_cut_point(&chars, start, end_limit)
            {
                end = cut;
            }

            let chunk: String = chars[start..end].iter().collect();
            let trimmed = chunk.trim();
            if !trimmed.is_empty() {
                chunks.push(trimmed.to_string());
            }

            if end >= chars.len() {
                break;
            }
            // 回退overlap个字符作为下一块起点，同时保证向前推进
            start = std::cmp::max(end.saturating_sub(self.chunk_overlap), start + 1);
        }

        chunks
    }

    /// 从end_limit向前搜索最近的分隔符边界，按分隔符优先级依次尝试
    fn find_cut_point(&self, chars: &[char], start: usize, end_limit: usize) -> Option<usize> {
        // 切分点不早于块的一半，避免产生过碎的片段
        let min_cut = start + self.chunk_size / 2;

        for sep in &self.separators {
            let sep_chars: Vec<char> = sep.chars().collect();
            if sep_chars.is_empty() || end_limit < sep_chars.len() {
                continue;
            }

            let mut i = end_limit - sep_chars.len();
            while i > min_cut {
                if chars[i..i + sep_chars.len()] == sep_chars[..] {
                    return Some(i + sep_chars.len());
                }
                i -= 1;
            }
        }

        None
    }
}
