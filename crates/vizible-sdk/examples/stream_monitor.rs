//! 流监听演示
//!
//! 连接真实传感装置（串口或 TCP），播报警报并打印每条读数。
//!
//! ```bash
//! cargo run --example stream_monitor -- --device /dev/rfcomm0
//! cargo run --example stream_monitor -- --tcp 192.168.1.50:7000 --threshold 100
//! ```

use clap::Parser;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use vizible_sdk::VizibleBuilder;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "stream_monitor")]
#[command(about = "流监听演示 - 连接传感装置并播报障碍警报")]
struct Args {
    /// 串口设备路径
    #[arg(long, default_value = "/dev/rfcomm0", conflicts_with = "tcp")]
    device: String,

    /// TCP 链路地址（host:port）
    #[arg(long)]
    tcp: Option<String>,

    /// 串口波特率
    #[arg(long, default_value = "115200")]
    baud: u32,

    /// 障碍判定阈值（厘米）
    #[arg(long, default_value = "125")]
    threshold: u32,

    /// 检测服务基地址
    #[arg(long)]
    server_url: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    vizible_sdk::init_tracing();
    let args = Args::parse();

    println!("📡 Vizible SDK - 流监听演示");
    println!("==========================\n");

    let mut builder = VizibleBuilder::new().threshold_cm(args.threshold);
    builder = match &args.tcp {
        Some(addr) => builder.tcp(addr.clone()),
        None => builder.serial(&args.device, args.baud),
    };
    if let Some(url) = args.server_url {
        builder = builder.server_url(url);
    }

    let mut vizible = builder.build()?;
    let readings = vizible.subscribe();

    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();
    ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst))?;

    println!("监听中…（Ctrl-C 退出）\n");
    while running.load(Ordering::SeqCst) && vizible.is_running() {
        if let Ok(reading) = readings.recv_timeout(Duration::from_millis(200)) {
            println!(
                "📏 front={:>4}cm  left={:>4}cm  right={:>4}cm",
                reading.front, reading.left, reading.right
            );
        }
    }

    let fault = vizible.take_link_fault();
    vizible.stop()?;

    let metrics = vizible.metrics();
    let stats = vizible.dispatcher_stats();
    println!("\n📊 会话小结:");
    println!("  有效读数: {}", metrics.readings_parsed);
    println!("  障碍事件: {}", metrics.obstacle_events);
    println!("  警报: 基础 {} / 升级 {}", stats.basic_alerts, stats.enriched_alerts);

    if let Some(fault) = fault {
        println!("⚠️ 链路故障退出: {}", fault);
    }
    Ok(())
}
