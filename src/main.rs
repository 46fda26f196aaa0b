use anyhow::{Result, bail};
use clap::Parser;

use deepresearch_rs::agent::workflow;
use deepresearch_rs::cli::Args;
use deepresearch_rs::launcher::ProcessLauncher;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let launch_mode = args.launch;
    let query = args.query.clone();
    let config = args.into_config();

    if launch_mode {
        return ProcessLauncher::new(config.launcher.clone()).launch().await;
    }

    let Some(query) = query.filter(|q| !q.trim().is_empty()) else {
        bail!("缺少调研问题。用法: deepresearch-rs \"<research query>\"，或使用 --launch 进入启动器模式");
    };

    workflow::launch(&config, query.trim()).await
}
