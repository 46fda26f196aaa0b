//! 前后端进程启动器 - 先起后端，固定延时后起前端，前端退出时回收后端

use anyhow::{Context, Result, bail};
use std::time::Duration;
use tokio::process::{Child, Command};

use crate::config::LauncherConfig;

/// 进程启动器
pub struct ProcessLauncher {
    config: LauncherConfig,
}

impl ProcessLauncher {
    pub fn new(config: LauncherConfig) -> Self {
        Self { config }
    }

    /// 启动前后端进程并托管其生命周期
    ///
    /// 后端先启动，等待固定延时给它初始化时间；随后启动前端并阻塞等待。
    /// 前端退出或收到Ctrl-C时，后端一并终止。
    pub async fn launch(&self) -> Result<()> {
        let Some(backend_command) = self
            .config
            .backend_command
            .as_deref()
            .filter(|c| !c.trim().is_empty())
        else {
            bail!("launcher.backend_command 未配置");
        };
        let Some(frontend_command) = self
            .config
            .frontend_command
            .as_deref()
            .filter(|c| !c.trim().is_empty())
        else {
            bail!("launcher.frontend_command 未配置");
        };

        println!("🚀 启动后端: {}", backend_command);
        let mut backend = spawn_shell(backend_command).context("后端进程启动失败")?;

        // 固定延时，等待后端完成初始化
        println!(
            "⏳ 等待后端初始化 ({} 秒)...",
            self.config.startup_delay_secs
        );
        tokio::time::sleep(Duration::from_secs(self.config.startup_delay_secs)).await;

        // 延时结束后后端已退出，视为启动失败
        if let Some(status) = backend.try_wait().context("检查后端进程状态失败")? {
            bail!("后端进程在启动阶段退出: {}", status);
        }

        println!("🚀 启动前端: {}", frontend_command);
        let mut frontend = match spawn_shell(frontend_command) {
            Ok(child) => child,
            Err(e) => {
                let _ = backend.kill().await;
                return Err(e).context("前端进程启动失败");
            }
        };

        tokio::select! {
            status = frontend.wait() => {
                let status = status.context("等待前端进程失败")?;
                println!("ℹ️ 前端已退出: {}", status);
            }
            _ = tokio::signal::ctrl_c() => {
                println!("\nℹ️ 收到中断信号，正在关闭...");
                let _ = frontend.kill().await;
            }
        }

        // 回收后端，避免孤儿进程
        println!("🛑 正在终止后端进程...");
        let _ = backend.kill().await;
        let _ = backend.wait().await;
        println!("✓ 启动器已退出");

        Ok(())
    }
}

/// 通过shell启动命令，kill_on_drop兜底防止进程泄漏
fn spawn_shell(command: &str) -> Result<Child> {
    Command::new("sh")
        .arg("-c")
        .arg(command)
        .kill_on_drop(true)
        .spawn()
        .context(format!("无法启动命令: {}", command))
}
