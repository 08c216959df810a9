//! run 命令
//!
//! 连接传感装置，警报走标准输出播报，读数逐条打印，
//! 周期性输出一行计数。Ctrl-C 有序停机。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Args;
use crossbeam_channel::RecvTimeoutError;
use vizible_sdk::VizibleBuilder;

use crate::commands::config::CliConfig;

const DEFAULT_BAUD: u32 = 115_200;
const STATUS_INTERVAL: Duration = Duration::from_secs(10);

/// 流监听命令参数
///
/// 未给出的参数回落到配置文件，再回落到内置默认值。
#[derive(Args, Debug)]
pub struct RunCommand {
    /// 串口设备路径（如 /dev/rfcomm0）
    #[arg(short, long)]
    pub device: Option<String>,

    /// 串口波特率
    #[arg(short, long)]
    pub baud: Option<u32>,

    /// TCP 链路地址（host:port，与 --device 互斥）
    #[arg(long, conflicts_with = "device")]
    pub tcp: Option<String>,

    /// 检测服务基地址（覆盖配置）
    #[arg(short, long)]
    pub server_url: Option<String>,

    /// 障碍判定阈值（厘米，覆盖配置）
    #[arg(short, long)]
    pub threshold: Option<u32>,

    /// 检测请求时限（毫秒，覆盖配置）
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// 不打印读数，只播报警报和计数
    #[arg(short, long)]
    pub quiet: bool,
}

impl RunCommand {
    /// 连接并监听，直到 Ctrl-C 或链路故障
    pub fn execute(&self) -> Result<()> {
        let config = CliConfig::load()?;

        let mut builder = VizibleBuilder::new();

        if let Some(ref addr) = self.tcp {
            println!("🔗 TCP 链路: {}", addr);
            builder = builder.tcp(addr.clone());
        } else {
            let device = self
                .device
                .clone()
                .or(config.default.device.clone())
                .context("未指定链路：用 --device / --tcp，或先 `config set --device …`")?;
            let baud = self.baud.or(config.default.baud).unwrap_or(DEFAULT_BAUD);
            println!("🔗 串口链路: {} @ {}", device, baud);
            builder = builder.serial(device, baud);
        }

        if let Some(url) = self.server_url.clone().or(config.default.server_url.clone()) {
            builder = builder.server_url(url);
        }
        if let Some(threshold) = self.threshold.or(config.default.threshold_cm) {
            builder = builder.threshold_cm(threshold);
        }
        if let Some(timeout) = self.timeout_ms.or(config.default.timeout_ms) {
            builder = builder.enrichment_timeout_ms(timeout);
        }

        let mut vizible = builder.build().context("启动失败")?;
        let readings = vizible.subscribe();

        // Ctrl-C -> 置位退出标志，主循环在下个超时边界收尾
        let running = Arc::new(AtomicBool::new(true));
        {
            let running = running.clone();
            ctrlc::set_handler(move || {
                running.store(false, Ordering::SeqCst);
            })
            .context("安装 Ctrl-C 处理失败")?;
        }

        println!("📡 监听中…（Ctrl-C 退出）");
        let mut next_status = Instant::now() + STATUS_INTERVAL;

        while running.load(Ordering::SeqCst) {
            match readings.recv_timeout(Duration::from_millis(200)) {
                Ok(reading) => {
                    if !self.quiet {
                        println!(
                            "📏 front={:>4}cm  left={:>4}cm  right={:>4}cm",
                            reading.front, reading.left, reading.right
                        );
                    }
                },
                Err(RecvTimeoutError::Timeout) => {},
                Err(RecvTimeoutError::Disconnected) => break,
            }

            if !vizible.is_running() {
                break;
            }

            if Instant::now() >= next_status {
                let m = vizible.metrics();
                let d = vizible.dispatcher_stats();
                println!(
                    "📊 records={} readings={} parse_err={} oversized={} alerts={}+{} stale={}",
                    m.records_framed,
                    m.readings_parsed,
                    m.parse_failures,
                    m.records_oversized,
                    d.basic_alerts,
                    d.enriched_alerts,
                    d.stale_discarded,
                );
                next_status += STATUS_INTERVAL;
            }
        }

        let fault = vizible.take_link_fault();
        vizible.stop().context("停机失败")?;

        let m = vizible.metrics();
        let d = vizible.dispatcher_stats();
        println!();
        println!("📊 会话小结:");
        println!("  读取字节: {}", m.bytes_read);
        println!("  切分记录: {}（超长 {}，解析失败 {}）",
            m.records_framed, m.records_oversized, m.parse_failures);
        println!("  有效读数: {}", m.readings_parsed);
        println!("  障碍事件: {}", m.obstacle_events);
        println!("  警报: 基础 {} / 升级 {}（过期丢弃 {}，补充失败 {}）",
            d.basic_alerts, d.enriched_alerts, d.stale_discarded, d.enrich_failures);

        if let Some(fault) = fault {
            anyhow::bail!("链路故障: {}", fault);
        }
        Ok(())
    }
}
