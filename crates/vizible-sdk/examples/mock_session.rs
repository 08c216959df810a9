//! 无硬件演示
//!
//! 不需要传感装置：脚本化链路喂入几条读数，检测服务用回环 TCP
//! 线程模拟。展示基础警报与升级警报的完整时序。
//!
//! ```bash
//! cargo run --example mock_session
//! ```

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;
use vizible_sdk::link::MockLink;
use vizible_sdk::VizibleBuilder;

/// 起一个极简检测服务：对每个请求都应答同一组标签
fn spawn_detection_server(payload: &str) -> Result<String, std::io::Error> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    let body = format!(r#"{{"detections": "{payload}"}}"#);

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf);
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });

    Ok(format!("http://{addr}/"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    vizible_sdk::init_tracing();

    println!("🎯 Vizible SDK - 无硬件演示\n");

    let base_url = spawn_detection_server("Front:{box} | Right:{} | Left:{pole,bin}")?;
    let (link, handle) = MockLink::new();

    let mut vizible = VizibleBuilder::new()
        .custom_link(Box::new(link))
        .server_url(base_url)
        .threshold_cm(125)
        .build()?;

    // 模拟传感装置：一条触发 front 警报，一条全部安全，一条触发双向
    handle.push_chunk(b"Front: 50cm | Left: 200cm | Right: 300cm\n");
    thread::sleep(Duration::from_millis(600));
    handle.push_chunk(b"Front: 400cm | Left: 400cm | Right: 400cm\n");
    thread::sleep(Duration::from_millis(300));
    handle.push_chunk(b"Front: 90cm | Left: 80cm | Right: 300cm\n");
    thread::sleep(Duration::from_millis(600));

    let metrics = vizible.metrics();
    let stats = vizible.dispatcher_stats();
    println!("\n📊 读数 {} 条，障碍事件 {} 个", metrics.readings_parsed, metrics.obstacle_events);
    println!("📊 警报: 基础 {} / 升级 {}", stats.basic_alerts, stats.enriched_alerts);

    vizible.stop()?;
    println!("✅ 会话结束");
    Ok(())
}
