//! 调研工作流 - 规划、收集、写作、评审的循环编排

use anyhow::Result;
use std::collections::HashMap;
use std::time::Duration;

use crate::agent::context::AgentContext;
use crate::agent::memory::{MemoryScope, ScopedKeys};
use crate::agent::outlet;
use crate::agent::plan::Planner;
use crate::agent::research::{ResearchCollector, RunStats};
use crate::agent::review::{ReviewVerdict, Reviewer, VerdictKind};
use crate::agent::step_forward_agent::StepForwardAgent;
use crate::agent::write::ReportWriter;
use crate::config::Config;

/// 资料不足而强制收尾时附加的报告注记
const LIMITED_RESEARCH_NOTE: &str = "*Note: Research was limited due to source availability.*";

/// 时间跟踪作用域
pub struct TimingScope {
    start_time: std::time::Instant,
    phase_start_times: HashMap<String, std::time::Instant>,
    phase_durations: HashMap<String, Duration>,
}

impl Default for TimingScope {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingScope {
    pub fn new() -> Self {
        Self {
            start_time: std::time::Instant::now(),
            phase_start_times: HashMap::new(),
            phase_durations: HashMap::new(),
        }
    }

    /// 开始一个新的阶段计时
    pub fn start_phase(&mut self, phase_name: &str) {
        self.phase_start_times
            .insert(phase_name.to_string(), std::time::Instant::now());
    }

    /// 结束一个阶段的计时，同名阶段多次计时则累加
    pub fn end_phase(&mut self, phase_name: &str) -> Option<Duration> {
        if let Some(start_time) = self.phase_start_times.remove(phase_name) {
            let duration = start_time.elapsed();
            *self
                .phase_durations
                .entry(phase_name.to_string())
                .or_insert(Duration::ZERO) += duration;
            Some(duration)
        } else {
            None
        }
    }

    /// 获取总执行时间
    pub fn get_total_duration(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// 获取格式化的执行时间报告
    pub fn generate_timing_report(&self) -> String {
        let mut report = format!(
            "总执行时间: {:.2}秒\n",
            self.get_total_duration().as_secs_f64()
        );

        if !self.phase_durations.is_empty() {
            report.push_str("\n各阶段执行时间:\n");
            let mut phases: Vec<_> = self.phase_durations.iter().collect();
            phases.sort_by(|a, b| b.1.cmp(a.1));
            for (phase, duration) in phases {
                report.push_str(&format!("- {}: {:.3}秒\n", phase, duration.as_secs_f64()));
            }
        }

        report
    }
}

/// 时间跟踪常量
pub struct TimingKeys;

impl TimingKeys {
    pub const PLAN: &'static str = "plan";
    pub const RESEARCH: &'static str = "research";
    pub const WRITE: &'static str = "write";
    pub const REVIEW: &'static str = "review";
    pub const OUTPUT: &'static str = "output";
}

/// 评审结论对循环的推进决策
#[derive(Debug, PartialEq)]
enum LoopAdvance {
    /// 报告通过评审，结束循环
    Finish,
    /// 达到最大轮数，以现有草稿收尾
    ForceFinish { loop_count: u32 },
    /// 推进到下一个子主题继续收集
    Continue { next_index: usize, loop_count: u32 },
}

/// 根据评审结论推进循环：非通过结论累加轮数，子主题索引越界时绕回0
fn advance_after_review(
    status: &VerdictKind,
    current_index: usize,
    loop_count: u32,
    max_loops: u32,
    topic_count: usize,
) -> LoopAdvance {
    match status {
        VerdictKind::Complete => LoopAdvance::Finish,
        VerdictKind::NeedMoreResearch | VerdictKind::SourcesInsufficient => {
            let loop_count = loop_count + 1;
            if loop_count >= max_loops {
                return LoopAdvance::ForceFinish { loop_count };
            }

            let mut next_index = current_index + 1;
            if next_index >= topic_count {
                next_index = 0;
            }
            LoopAdvance::Continue {
                next_index,
                loop_count,
            }
        }
    }
}

/// 为强制收尾的报告附加资料受限注记
fn append_limited_note(draft: String) -> String {
    format!("{}\n\n{}", draft, LIMITED_RESEARCH_NOTE)
}

/// 启动调研工作流
pub async fn launch(config: &Config, query: &str) -> Result<()> {
    let context = AgentContext::new(config.clone())?;
    let session_id = config.get_session_id();
    let mut timing = TimingScope::new();

    println!("🚀 开始调研会话 [{}]: {}", session_id, query);

    if config.force_regenerate {
        let cache = context.cache_manager.read().await;
        cache.invalidate_all().await?;
        println!("♻️ 已清空缓存，将强制重新生成");
    }

    // 启动时检查模型连接
    context.llm_client.check_connection().await?;

    context
        .store_to_memory(MemoryScope::RESEARCH, ScopedKeys::QUERY, query)
        .await?;

    // 规划阶段
    timing.start_phase(TimingKeys::PLAN);
    let plan = Planner
        .execute(&context)
        .await?
        .normalize(query, config.research.max_sub_topics);
    timing.end_phase(TimingKeys::PLAN);

    println!("📋 调研计划（{} 个子主题）:", plan.sub_topics.len());
    for (i, topic) in plan.sub_topics.iter().enumerate() {
        println!("   {}. {}", i + 1, topic);
    }
    context
        .store_to_memory(MemoryScope::RESEARCH, ScopedKeys::SUB_TOPICS, &plan.sub_topics)
        .await?;

    // 收集-写作-评审循环
    let collector = ResearchCollector::new(config)?;
    let final_report = run_research_loop(&context, &collector, &plan.sub_topics, &mut timing).await?;

    context
        .store_to_memory(MemoryScope::RESEARCH, ScopedKeys::REPORT, &final_report)
        .await?;

    // 出口阶段
    timing.start_phase(TimingKeys::OUTPUT);
    outlet::save(&context, &session_id, &final_report).await?;
    timing.end_phase(TimingKeys::OUTPUT);

    print_run_summary(&context, &timing).await;

    if config.chat_after_research {
        crate::chat::run(&context).await?;
    }

    Ok(())
}

/// 执行收集-写作-评审循环，返回最终报告
async fn run_research_loop(
    context: &AgentContext,
    collector: &ResearchCollector,
    sub_topics: &[String],
    timing: &mut TimingScope,
) -> Result<String> {
    let max_loops = context.config.research.max_loops;
    let mut current_index = 0usize;
    let mut loop_count = 0u32;
    let mut review_history: Vec<ReviewVerdict> = Vec::new();

    let final_report = loop {
        if let Some(topic) = sub_topics.get(current_index) {
            timing.start_phase(TimingKeys::RESEARCH);
            collector.execute_round(context, topic, loop_count).await?;
            timing.end_phase(TimingKeys::RESEARCH);
        }

        timing.start_phase(TimingKeys::WRITE);
        let draft = ReportWriter.execute(context).await?;
        context
            .store_to_memory(MemoryScope::RESEARCH, ScopedKeys::REPORT_DRAFT, &draft)
            .await?;
        timing.end_phase(TimingKeys::WRITE);

        timing.start_phase(TimingKeys::REVIEW);
        let verdict = Reviewer.execute(context).await?;
        timing.end_phase(TimingKeys::REVIEW);

        println!("🔎 评审结论: {:?} — {}", verdict.status, verdict.reasoning);
        review_history.push(verdict.clone());
        context
            .store_to_memory(
                MemoryScope::RESEARCH,
                ScopedKeys::REVIEW_HISTORY,
                &review_history,
            )
            .await?;

        match advance_after_review(
            &verdict.status,
            current_index,
            loop_count,
            max_loops,
            sub_topics.len(),
        ) {
            LoopAdvance::Finish => break draft,
            LoopAdvance::ForceFinish { loop_count: reached } => {
                loop_count = reached;
                println!("⚠️ 达到最大调研轮数 ({}), 以现有资料收尾", max_loops);
                break append_limited_note(draft);
            }
            LoopAdvance::Continue {
                next_index,
                loop_count: advanced,
            } => {
                current_index = next_index;
                loop_count = advanced;
            }
        }
    };

    // 记录完成的循环轮数
    let mut stats: RunStats = context
        .get_from_memory(MemoryScope::RESEARCH, ScopedKeys::RUN_STATS)
        .await
        .unwrap_or_default();
    stats.loops_completed = loop_count;
    context
        .store_to_memory(MemoryScope::RESEARCH, ScopedKeys::RUN_STATS, &stats)
        .await?;

    Ok(final_report)
}

/// 打印调研过程统计
async fn print_run_summary(context: &AgentContext, timing: &TimingScope) {
    println!("\n📊 调研统计:");

    if let Some(stats) = context
        .get_from_memory::<RunStats>(MemoryScope::RESEARCH, ScopedKeys::RUN_STATS)
        .await
    {
        println!("   搜索次数: {}", stats.search_queries_made);
        println!("   抓取URL数: {}", stats.urls_scraped);
        println!("   入库分块数: {}", stats.chunks_indexed);
        println!("   追加调研轮数: {}", stats.loops_completed);
    }

    let (hits, misses) = {
        let cache = context.cache_manager.read().await;
        cache.stats()
    };
    println!("   缓存命中/未命中: {}/{}", hits, misses);

    if context.config.verbose {
        let memory_stats = context.get_memory_stats().await;
        for (scope, bytes) in memory_stats {
            println!("   Memory[{}]: {} 字节", scope, bytes);
        }
    }

    println!("\n{}", timing.generate_timing_report());
}

// Include tests
#[cfg(test)]
mod tests;
