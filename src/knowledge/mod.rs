//! 知识图谱 - 从报告文本中抽取实体与共现关系，渲染为交互式HTML

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// 实体共现的最大字符距离
const CO_OCCURRENCE_WINDOW: usize = 1000;

/// 图谱节点数量上限，超出时按出现频次保留
const MAX_NODES: usize = 50;

/// 实体类别与对应的识别模式
static ENTITY_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    vec![
        (
            "technology",
            Regex::new(
                r"(?i)\b(artificial intelligence|machine learning|deep learning|neural networks?|large language models?|blockchain|quantum computing|cloud computing|edge computing|robotics|automation|semiconductors?|batteries|solar energy|renewable energy|5G|IoT|APIs?|algorithms?)\b",
            )
            .expect("valid technology regex"),
        ),
        (
            "organization",
            Regex::new(
                r"\b([A-Z][A-Za-z]+(?: [A-Z][A-Za-z]+)? (?:Inc|Corp|Corporation|Company|Labs|Group|University|Institute|Agency|Commission))\b",
            )
            .expect("valid organization regex"),
        ),
        (
            "concept",
            Regex::new(
                r"(?i)\b(sustainability|innovation|efficiency|scalability|security|privacy|regulation|compliance|investment|market growth|supply chain|adoption|competition|infrastructure)\b",
            )
            .expect("valid concept regex"),
        ),
        (
            "keyword",
            Regex::new(r"\b([A-Z][a-z]{2,}(?: [A-Z][a-z]{2,}){1,3})\b").expect("valid keyword regex"),
        ),
    ]
});

/// 抽取出的实体
#[derive(Debug, Clone)]
pub struct Entity {
    pub name: String,
    pub category: String,
    pub occurrences: usize,
    /// 在原文中的出现位置（字节偏移）
    pub positions: Vec<usize>,
}

/// 图谱节点
#[derive(Debug, Clone, Serialize)]
pub struct GraphNode {
    pub id: usize,
    pub label: String,
    pub group: String,
    pub value: usize,
}

/// 图谱边（共现关系）
#[derive(Debug, Clone, Serialize)]
pub struct GraphEdge {
    pub from: usize,
    pub to: usize,
    pub value: usize,
}

/// 知识图谱
#[derive(Debug, Clone)]
pub struct KnowledgeGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl KnowledgeGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// 从文本中抽取实体，按小写名称去重，先命中的类别优先
pub fn extract_entities(text: &str) -> Vec<Entity> {
    let mut by_name: BTreeMap<String, Entity> = BTreeMap::new();

    for (category, pattern) in ENTITY_PATTERNS.iter() {
        for m in pattern.find_iter(text) {
            let name = m.as_str().trim().to_string();
            let key = name.to_lowercase();

            by_name
                .entry(key)
                .and_modify(|entity| {
                    entity.occurrences += 1;
                    entity.positions.push(m.start());
                })
                .or_insert_with(|| Entity {
                    name,
                    category: category.to_string(),
                    occurrences: 1,
                    positions: vec![m.start()],
                });
        }
    }

    by_name.into_values().collect()
}

/// 构建知识图谱：实体为节点，文本距离内共现的实体之间建边
pub fn build_graph(text: &str) -> KnowledgeGraph {
    let mut entities = extract_entities(text);

    // 按出现频次排序并截断，保持名称字典序作为次序稳定因子
    entities.sort_by(|a, b| b.occurrences.cmp(&a.occurrences).then(a.name.cmp(&b.name)));
    entities.truncate(MAX_NODES);

    let nodes: Vec<GraphNode> = entities
        .iter()
        .enumerate()
        .map(|(id, entity)| GraphNode {
            id,
            label: entity.name.clone(),
            group: entity.category.clone(),
            value: entity.occurrences,
        })
        .collect();

    let mut edges = Vec::new();
    for i in 0..entities.len() {
        for j in (i + 1)..entities.len() {
            let weight = co_occurrence_count(&entities[i], &entities[j]);
            if weight > 0 {
                edges.push(GraphEdge {
                    from: i,
                    to: j,
                    value: weight,
                });
            }
        }
    }

    KnowledgeGraph { nodes, edges }
}

/// 统计两个实体在共现窗口内出现的次数
fn co_occurrence_count(a: &Entity, b: &Entity) -> usize {
    let mut count = 0;
    for &pa in &a.positions {
        for &pb in &b.positions {
            if pa.abs_diff(pb) <= CO_OCCURRENCE_WINDOW {
                count += 1;
            }
        }
    }
    count
}

/// 渲染为自包含的vis-network交互页面
pub fn render_html(graph: &KnowledgeGraph, title: &str) -> String {
    let nodes_json = serde_json::to_string(&graph.nodes).unwrap_or_else(|_| "[]".to_string());
    let edges_json = serde_json::to_string(&graph.edges).unwrap_or_else(|_| "[]".to_string());

    format!(
        r##"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Knowledge Graph — {title}</title>
<script src="https://unpkg.com/vis-network/standalone/umd/vis-network.min.js"></script>
<style>
  body {{ font-family: -apple-system, "Segoe UI", Roboto, sans-serif; margin: 0; }}
  #header {{ padding: 16px 24px; background: #2c3e50; color: #fff; }}
  #legend {{ padding: 8px 24px; background: #f5f6fa; font-size: 14px; }}
  .legend-item {{ display: inline-block; margin-right: 18px; }}
  .legend-swatch {{ display: inline-block; width: 12px; height: 12px; border-radius: 3px; margin-right: 6px; vertical-align: middle; }}
  #graph {{ width: 100%; height: calc(100vh - 110px); }}
</style>
</head>
<body>
<div id="header"><strong>Knowledge Graph</strong> — {title}</div>
<div id="legend">
  <span class="legend-item"><span class="legend-swatch" style="background:#FF6B6B"></span>technology</span>
  <span class="legend-item"><span class="legend-swatch" style="background:#4ECDC4"></span>organization</span>
  <span class="legend-item"><span class="legend-swatch" style="background:#45B7D1"></span>concept</span>
  <span class="legend-item"><span class="legend-swatch" style="background:#96CEB4"></span>keyword</span>
</div>
<div id="graph"></div>
<script>
  const nodes = new vis.DataSet({nodes_json});
  const edges = new vis.DataSet({edges_json});
  const options = {{
    groups: {{
      technology: {{ color: "#FF6B6B" }},
      organization: {{ color: "#4ECDC4" }},
      concept: {{ color: "#45B7D1" }},
      keyword: {{ color: "#96CEB4" }}
    }},
    nodes: {{ shape: "dot", scaling: {{ min: 8, max: 32 }}, font: {{ size: 14 }} }},
    edges: {{ smooth: true, color: {{ opacity: 0.5 }} }},
    physics: {{
      barnesHut: {{ gravitationalConstant: -3000, springLength: 160 }},
      stabilization: {{ iterations: 200 }}
    }}
  }};
  new vis.Network(document.getElementById("graph"), {{ nodes, edges }}, options);
</script>
</body>
</html>
"##
    )
}

#[cfg(test)]
mod tests {
    use super::{build_graph, extract_entities, render_html};

    const SAMPLE: &str = "Machine learning and quantum computing are advancing fast. \
        Acme Corp has invested heavily in machine learning infrastructure, \
        citing efficiency and scalability as the main drivers.";

    #[test]
    fn test_extract_entities_finds_categories() {
        let entities = extract_entities(SAMPLE);

        let ml = entities
            .iter()
            .find(|e| e.name.to_lowercase() == "machine learning")
            .expect("machine learning entity");
        assert_eq!(ml.category, "technology");
        assert_eq!(ml.occurrences, 2);

        assert!(entities.iter().any(|e| e.name == "Acme Corp"));
        assert!(
            entities
                .iter()
                .any(|e| e.category == "concept" && e.name.to_lowercase() == "efficiency")
        );
    }

    #[test]
    fn test_extract_entities_dedupes_case_insensitively() {
        let entities = extract_entities("Blockchain is popular. blockchain adoption grows.");
        let hits: Vec<_> = entities
            .iter()
            .filter(|e| e.name.to_lowercase() == "blockchain")
            .collect();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].occurrences, 2);
    }

    #[test]
    fn test_build_graph_creates_co_occurrence_edges() {
        let graph = build_graph(SAMPLE);
        assert!(!graph.nodes.is_empty());
        // 样例文本全部落在共现窗口内，节点之间应有边
        assert!(!graph.edges.is_empty());

        for edge in &graph.edges {
            assert!(edge.from < graph.nodes.len());
            assert!(edge.to < graph.nodes.len());
            assert!(edge.value > 0);
        }
    }

    #[test]
    fn test_distant_entities_have_no_edge() {
        let filler = "plain filler text without entities. ".repeat(60);
        let text = format!("Blockchain here. {} Robotics there.", filler);
        let graph = build_graph(&text);

        let find = |label: &str| {
            graph
                .nodes
                .iter()
                .find(|n| n.label.to_lowercase() == label)
                .map(|n| n.id)
        };
        let (a, b) = (find("blockchain"), find("robotics"));
        assert!(a.is_some() && b.is_some());

        let connected = graph.edges.iter().any(|e| {
            (e.from == a.unwrap() && e.to == b.unwrap())
                || (e.from == b.unwrap() && e.to == a.unwrap())
        });
        assert!(!connected, "entities beyond the window must not be linked");
    }

    #[test]
    fn test_render_html_embeds_nodes() {
        let graph = build_graph(SAMPLE);
        let html = render_html(&graph, "test session");

        assert!(html.contains("vis-network"));
        assert!(html.contains("test session"));
        assert!(html.contains("Machine learning") || html.contains("machine learning"));
    }

    #[test]
    fn test_render_html_embeds_group_colors() {
        let graph = build_graph(SAMPLE);
        let html = render_html(&graph, "s1");

        assert!(html.contains(r##"color: "#FF6B6B""##));
        assert!(html.contains("background:#96CEB4"));
        assert!(html.contains("barnesHut"));
    }

    #[test]
    fn test_empty_text_yields_empty_graph() {
        let graph = build_graph("");
        assert!(graph.is_empty());
        assert!(graph.edges.is_empty());
    }
}
