//! # Vizible CLI
//!
//! Command-line interface for the Vizible obstacle-alert rig.
//!
//! ## 使用方式
//!
//! ```bash
//! # 配置默认链路和后端
//! vizible-cli config set --device /dev/rfcomm0 --server-url http://192.168.1.100:5000/
//!
//! # 连上并开始监听（Ctrl-C 退出）
//! vizible-cli run
//!
//! # 临时覆盖配置
//! vizible-cli run --tcp 192.168.1.50:7000 --threshold 100
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{ConfigCommand, RunCommand};

/// Vizible CLI - 障碍预警装置命令行工具
#[derive(Parser, Debug)]
#[command(name = "vizible-cli")]
#[command(about = "Command-line interface for the Vizible obstacle-alert rig", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),

    /// 连接传感装置并持续播报 / 打印读数
    Run {
        #[command(flatten)]
        args: RunCommand,
    },
}

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vizible_cli=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config(cmd) => {
            // One-shot 模式：配置管理
            cmd.execute()
        },

        Commands::Run { args } => {
            // 长驻模式：连接 -> 监听 -> Ctrl-C 断开
            args.execute()
        },
    }
}
