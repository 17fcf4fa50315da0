//! # Kortex CLI
//!
//! 机械臂动作流程的命令行驱动程序。
//!
//! ```bash
//! # 回到安全位置
//! kortex-cli --ip 192.168.1.10 home
//!
//! # 绘制多边形（home → 起点 → 各顶点）
//! kortex-cli draw
//!
//! # 夹爪张开 + 闭合
//! kortex-cli grip --step-delay-ms 200
//!
//! # 执行脚本
//! kortex-cli --config kortex.toml run square.json
//! ```
//!
//! 所有步骤都完成时退出码为 0，否则为 1。

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

mod commands;
mod script;
mod session;

use commands::{ActionsCommand, DrawCommand, GripCommand, HomeCommand, RunCommand};
use session::{ConnectionArgs, Session};

/// Kortex CLI - 机械臂命令行工具
#[derive(Parser, Debug)]
#[command(name = "kortex-cli")]
#[command(about = "Command-line driver for Kortex arm workflows", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 回到安全位置
    Home {
        #[command(flatten)]
        args: HomeCommand,
    },

    /// 绘制多边形
    Draw {
        #[command(flatten)]
        args: DrawCommand,
    },

    /// 夹爪张开 + 闭合
    Grip {
        #[command(flatten)]
        args: GripCommand,
    },

    /// 执行脚本
    Run {
        #[command(flatten)]
        args: RunCommand,
    },

    /// 列出预存动作
    Actions {
        #[command(flatten)]
        args: ActionsCommand,
    },
}

fn execute(cli: &Cli) -> Result<bool> {
    let session = Session::open(&cli.connection)?;

    match &cli.command {
        Commands::Home { args } => args.execute(&session),
        Commands::Draw { args } => args.execute(&session),
        Commands::Grip { args } => args.execute(&session),
        Commands::Run { args } => args.execute(&session),
        Commands::Actions { args } => args.execute(&session),
    }
}

fn main() -> ExitCode {
    // 初始化日志
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("kortex_cli=info,kortex_client=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match execute(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "kortex-cli",
            "home",
            "--ip",
            "10.0.0.3",
            "-u",
            "operator",
            "--action-timeout-ms",
            "500",
        ])
        .unwrap();

        assert_eq!(cli.connection.ip.as_deref(), Some("10.0.0.3"));
        assert_eq!(cli.connection.username.as_deref(), Some("operator"));
        assert_eq!(cli.connection.action_timeout_ms, Some(500));
        assert!(matches!(cli.command, Commands::Home { .. }));
    }

    #[test]
    fn test_run_requires_script() {
        assert!(Cli::try_parse_from(["kortex-cli", "run"]).is_err());
        let cli = Cli::try_parse_from(["kortex-cli", "run", "square.json"]).unwrap();
        assert!(matches!(cli.command, Commands::Run { .. }));
    }

    #[test]
    fn test_execute_home_succeeds() {
        let cli = Cli::try_parse_from(["kortex-cli", "home"]).unwrap();
        assert!(execute(&cli).unwrap());
    }
}
