use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// 会话内存管理器 - 调研流水线各阶段通过作用域键值对共享中间产物
#[derive(Debug)]
pub struct Memory {
    data: HashMap<String, Value>,
    created_at: DateTime<Utc>,
    last_updated: DateTime<Utc>,
    access_counts: HashMap<String, u64>,
    data_sizes: HashMap<String, usize>,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            created_at: Utc::now(),
            last_updated: Utc::now(),
            access_counts: HashMap::new(),
            data_sizes: HashMap::new(),
        }
    }

    /// 存储数据到指定作用域和键
    pub fn store<T>(&mut self, scope: &str, key: &str, data: T) -> Result<()>
    where
        T: Serialize,
    {
        let full_key = format!("{}:{}", scope, key);
        let serialized = serde_json::to_value(data)?;

        self.data_sizes
            .insert(full_key.clone(), serialized.to_string().len());
        self.last_updated = Utc::now();
        self.data.insert(full_key, serialized);
        Ok(())
    }

    /// 从指定作用域和键获取数据
    pub fn get<T>(&mut self, scope: &str, key: &str) -> Option<T>
    where
        T: for<'a> Deserialize<'a>,
    {
        let full_key = format!("{}:{}", scope, key);

        *self.access_counts.entry(full_key.clone()).or_insert(0) += 1;

        self.data
            .get(&full_key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// 检查是否存在指定数据
    pub fn has_data(&self, scope: &str, key: &str) -> bool {
        self.data.contains_key(&format!("{}:{}", scope, key))
    }

    /// 列出指定作用域的所有键
    pub fn list_keys(&self, scope: &str) -> Vec<String> {
        let prefix = format!("{}:", scope);
        self.data
            .keys()
            .filter(|key| key.starts_with(&prefix))
            .map(|key| key[prefix.len()..].to_string())
            .collect()
    }

    /// 清空指定作用域的全部数据
    pub fn clear_scope(&mut self, scope: &str) {
        let prefix = format!("{}:", scope);
        self.data.retain(|key, _| !key.starts_with(&prefix));
        self.data_sizes.retain(|key, _| !key.starts_with(&prefix));
        self.last_updated = Utc::now();
    }

    /// 获取各作用域的内存占用统计（字节）
    pub fn get_usage_stats(&self) -> HashMap<String, usize> {
        let mut stats = HashMap::new();

        for (key, size) in &self.data_sizes {
            let scope = key.split(':').next().unwrap_or("unknown").to_string();
            *stats.entry(scope).or_insert(0) += size;
        }

        stats
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::Memory;

    #[test]
    fn test_store_and_get() {
        let mut memory = Memory::new();
        memory
            .store("research", "query", "solid state batteries")
            .unwrap();

        let value: Option<String> = memory.get("research", "query");
        assert_eq!(value, Some("solid state batteries".to_string()));
    }

    #[test]
    fn test_get_missing_key() {
        let mut memory = Memory::new();
        let value: Option<String> = memory.get("research", "missing");
        assert!(value.is_none());
    }

    #[test]
    fn test_scopes_are_isolated() {
        let mut memory = Memory::new();
        memory.store("research", "report", "draft-1").unwrap();
        memory.store("chat", "report", "answer").unwrap();

        assert_eq!(
            memory.get::<String>("research", "report"),
            Some("draft-1".to_string())
        );
        assert_eq!(
            memory.get::<String>("chat", "report"),
            Some("answer".to_string())
        );
    }

    #[test]
    fn test_has_data_and_list_keys() {
        let mut memory = Memory::new();
        memory.store("research", "sub_topics", vec!["a", "b"]).unwrap();

        assert!(memory.has_data("research", "sub_topics"));
        assert!(!memory.has_data("research", "report"));

        let keys = memory.list_keys("research");
        assert_eq!(keys, vec!["sub_topics".to_string()]);
    }

    #[test]
    fn test_clear_scope() {
        let mut memory = Memory::new();
        memory.store("research", "query", "q").unwrap();
        memory.store("chat", "history", "h").unwrap();

        memory.clear_scope("research");

        assert!(!memory.has_data("research", "query"));
        assert!(memory.has_data("chat", "history"));
    }

    #[test]
    fn test_usage_stats_grouped_by_scope() {
        let mut memory = Memory::new();
        memory.store("research", "query", "q").unwrap();
        memory.store("research", "report", "a longer report body").unwrap();

        let stats = memory.get_usage_stats();
        assert!(stats.get("research").copied().unwrap_or(0) > 0);
        assert!(stats.get("chat").is_none());
    }
}
