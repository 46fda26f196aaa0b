//! 报告出口 - 将最终报告落盘为Markdown、样式化HTML与知识图谱页面

use anyhow::{Context, Result, anyhow};
use tokio::fs;

use crate::agent::context::AgentContext;
use crate::knowledge;

/// 样式化HTML导出用的页面样式
const REPORT_CSS: &str = r#"
body {
  font-family: -apple-system, "Segoe UI", Roboto, "Helvetica Neue", sans-serif;
  max-width: 860px;
  margin: 0 auto;
  padding: 40px 24px;
  color: #2c3e50;
  line-height: 1.7;
}
h1 { color: #1a252f; border-bottom: 3px solid #3498db; padding-bottom: 10px; }
h2 { color: #2c3e50; border-bottom: 1px solid #ecf0f1; padding-bottom: 6px; margin-top: 36px; }
h3 { color: #34495e; }
a { color: #2980b9; text-decoration: none; }
a:hover { text-decoration: underline; }
blockquote {
  border-left: 4px solid #3498db;
  margin: 16px 0;
  padding: 4px 16px;
  background: #f8f9fa;
  color: #555;
}
code { background: #f4f4f4; padding: 2px 5px; border-radius: 3px; font-size: 0.92em; }
pre { background: #f4f4f4; padding: 14px; border-radius: 6px; overflow-x: auto; }
table { border-collapse: collapse; width: 100%; margin: 16px 0; }
th, td { border: 1px solid #ddd; padding: 8px 12px; text-align: left; }
th { background: #f5f6fa; }
"#;

/// 保存最终报告及其衍生产物
pub async fn save(context: &AgentContext, session_id: &str, report: &str) -> Result<()> {
    let out_dir = &context.config.output_path;
    fs::create_dir_all(out_dir)
        .await
        .context("创建输出目录失败")?;

    // 同一会话重复运行时清掉上一次的产物
    cleanup_stale_outputs(context, session_id).await?;

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");

    let md_path = out_dir.join(format!("research_report_{}_{}.md", session_id, timestamp));
    fs::write(&md_path, report).await.context("写入Markdown报告失败")?;
    println!("📄 报告已保存: {}", md_path.display());

    if !context.config.skip_html_export {
        let html = render_styled_html(report)?;
        let html_path = out_dir.join(format!("research_report_{}_{}.html", session_id, timestamp));
        fs::write(&html_path, html)
            .await
            .context("写入HTML报告失败")?;
        println!("🌐 HTML版本已保存: {}", html_path.display());
    }

    if !context.config.skip_knowledge_graph {
        let graph = knowledge::build_graph(report);
        if graph.is_empty() {
            println!("⚠️ 报告中未识别出实体，跳过知识图谱生成");
        } else {
            let graph_html = knowledge::render_html(&graph, session_id);
            let graph_path = out_dir.join(format!("knowledge_graph_{}.html", session_id));
            fs::write(&graph_path, graph_html)
                .await
                .context("写入知识图谱失败")?;
            println!(
                "🕸️ 知识图谱已保存: {} ({} 个节点, {} 条边)",
                graph_path.display(),
                graph.nodes.len(),
                graph.edges.len()
            );
        }
    }

    Ok(())
}

/// 删除同一会话此前生成的报告与知识图谱文件
async fn cleanup_stale_outputs(context: &AgentContext, session_id: &str) -> Result<()> {
    let report_prefix = format!("research_report_{}_", session_id);
    let graph_name = format!("knowledge_graph_{}.html", session_id);

    let mut entries = fs::read_dir(&context.config.output_path)
        .await
        .context("读取输出目录失败")?;

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(&report_prefix) || name == graph_name {
            fs::remove_file(entry.path())
                .await
                .with_context(|| format!("清理过期产物失败: {}", name))?;
        }
    }

    Ok(())
}

/// 将Markdown报告渲染为自包含的样式化HTML页面
pub fn render_styled_html(report: &str) -> Result<String> {
    let body = markdown::to_html_with_options(report, &markdown::Options::gfm())
        .map_err(|e| anyhow!("Markdown渲染失败: {}", e))?;

    let title = extract_report_title(report).unwrap_or_else(|| "Research Report".to_string());

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{REPORT_CSS}</style>
</head>
<body>
{body}
</body>
</html>
"#
    ))
}

/// 提取报告首个一级标题作为页面标题
fn extract_report_title(report: &str) -> Option<String> {
    report.lines().find_map(|line| {
        let trimmed = line.trim();
        if let Some(stripped) = trimmed.strip_prefix("# ")
            && !stripped.trim().is_empty()
        {
            Some(stripped.trim().to_string())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::{extract_report_title, render_styled_html};

    #[test]
    fn test_extract_report_title() {
        let report = "Some preamble\n# Solid State Batteries\n## Background\n";
        assert_eq!(
            extract_report_title(report),
            Some("Solid State Batteries".to_string())
        );
        assert_eq!(extract_report_title("no heading here"), None);
    }

    #[test]
    fn test_render_styled_html_contains_body_and_title() {
        let report = "# Quantum Report\n\nA **bold** claim with a [source](https://example.com).";
        let html = render_styled_html(report).unwrap();

        assert!(html.contains("<title>Quantum Report</title>"));
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("https://example.com"));
    }

    #[test]
    fn test_render_styled_html_gfm_tables() {
        let report = "| a | b |\n|---|---|\n| 1 | 2 |\n";
        let html = render_styled_html(report).unwrap();
        assert!(html.contains("<table>"));
    }
}
