//! 端到端警报验收
//!
//! 整条链路一起跑：脚本化链路 → 流水线 → 分发器 → 记录播报器，
//! 检测服务用回环 TCP 模拟。验证：
//! 1. 低于阈值的方向恰好一条基础警报 + 一条升级警报，顺序固定
//! 2. 订阅方同时拿到解析后的读数
//! 3. 检测服务不可用时只剩基础警报，流程不受影响
//! 4. 停止会取消在途补充请求

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, unbounded};
use vizible_sdk::link::MockLink;
use vizible_sdk::{LinkState, MemorySpeaker, SensorReading, VizibleBuilder};

fn wait_for<F: Fn() -> bool>(cond: F) {
    let deadline = Instant::now() + Duration::from_secs(3);
    while !cond() {
        assert!(Instant::now() < deadline, "condition not met in time");
        thread::sleep(Duration::from_millis(1));
    }
}

/// 回环检测服务：按给定载荷应答 `times` 次，上报每个请求行
fn serve_detections(payload: &str, times: usize) -> (String, Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let body = serde_json::json!({ "detections": payload }).to_string();
    let (tx, rx) = unbounded();

    thread::spawn(move || {
        for _ in 0..times {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let mut buf = [0u8; 2048];
            let n = stream.read(&mut buf).unwrap_or(0);
            let request = String::from_utf8_lossy(&buf[..n]);
            let _ = tx.send(request.lines().next().unwrap_or("").to_string());
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });

    (format!("http://{addr}/"), rx)
}

#[test]
fn test_front_obstacle_speaks_basic_then_enriched() {
    let (base_url, requests) = serve_detections("Front:{box} | Right:{} | Left:{}", 1);
    let (link, handle) = MockLink::new();
    let sink = MemorySpeaker::new();

    let mut vizible = VizibleBuilder::new()
        .custom_link(Box::new(link))
        .speaker(sink.clone())
        .server_url(base_url)
        .threshold_cm(125)
        .build()
        .unwrap();
    let readings = vizible.subscribe();

    // 只有 front 低于 125cm
    handle.push_chunk(b"Front: 50cm | Left: 200cm | Right: 300cm\n");

    // 订阅方拿到解析后的读数
    let reading = readings.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(reading, SensorReading::new(50, 200, 300));

    // 恰好一条基础 + 一条升级，顺序固定
    wait_for(|| sink.len() == 2);
    thread::sleep(Duration::from_millis(50));
    assert_eq!(
        sink.phrases(),
        vec![
            "Obstruction in front at 50 centimeters",
            "box obstacle in front at 50 centimeters",
        ],
        "exactly one basic then one enriched alert, nothing for left/right"
    );

    // 检测请求确实只发了一次，路径正确
    let request_line = requests.recv_timeout(Duration::from_secs(2)).unwrap();
    assert!(request_line.starts_with("GET /detections "));
    assert!(requests.try_recv().is_err(), "one obstacle batch → one request");

    let stats = vizible.dispatcher_stats();
    assert_eq!(stats.basic_alerts, 1);
    assert_eq!(stats.enriched_alerts, 1);
    assert_eq!(stats.enrich_failures, 0);

    vizible.stop().unwrap();
    assert_eq!(vizible.state(), LinkState::Disconnected);
}

#[test]
fn test_unreachable_service_degrades_to_basic_alert() {
    // 绑定后立即释放端口：连接必然被拒
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let dead_addr = listener.local_addr().unwrap();
    drop(listener);

    let (link, handle) = MockLink::new();
    let sink = MemorySpeaker::new();
    let mut vizible = VizibleBuilder::new()
        .custom_link(Box::new(link))
        .speaker(sink.clone())
        .server_url(format!("http://{dead_addr}/"))
        .build()
        .unwrap();

    handle.push_chunk(b"Front: 50cm | Left: 200cm | Right: 300cm\n");

    wait_for(|| vizible.dispatcher_stats().enrich_failures >= 1);
    wait_for(|| sink.len() == 1);
    thread::sleep(Duration::from_millis(50));

    assert_eq!(
        sink.phrases(),
        vec!["Obstruction in front at 50 centimeters"],
        "basic alert stands, no upgrade, no retraction"
    );
    assert!(vizible.is_running(), "enrichment failure must not stop the stream");

    vizible.stop().unwrap();
}

#[test]
fn test_clear_readings_produce_no_alerts() {
    let (link, handle) = MockLink::new();
    let sink = MemorySpeaker::new();
    let mut vizible = VizibleBuilder::new()
        .custom_link(Box::new(link))
        .speaker(sink.clone())
        .build()
        .unwrap();

    handle.push_chunk(b"Front: 200cm | Left: 300cm | Right: 400cm\n");
    wait_for(|| vizible.metrics().readings_parsed == 1);
    thread::sleep(Duration::from_millis(50));

    assert!(sink.is_empty(), "all distances above threshold → silence");
    assert_eq!(vizible.dispatcher_stats().basic_alerts, 0);

    vizible.stop().unwrap();
}

#[test]
fn test_threshold_boundary_is_strict() {
    let (link, handle) = MockLink::new();
    let sink = MemorySpeaker::new();
    let mut vizible = VizibleBuilder::new()
        .custom_link(Box::new(link))
        .speaker(sink.clone())
        .threshold_cm(125)
        .build()
        .unwrap();

    // 恰好等于阈值：不触发
    handle.push_chunk(b"Front: 125cm | Left: 125cm | Right: 125cm\n");
    wait_for(|| vizible.metrics().readings_parsed == 1);
    thread::sleep(Duration::from_millis(50));
    assert!(sink.is_empty());

    vizible.stop().unwrap();
}

#[test]
fn test_stop_cancels_pending_enrichment() {
    // 服务端收下连接但从不应答
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let silent_server = thread::spawn(move || {
        if let Ok((stream, _)) = listener.accept() {
            thread::sleep(Duration::from_millis(500));
            drop(stream);
        }
    });

    let (link, handle) = MockLink::new();
    let sink = MemorySpeaker::new();
    let mut vizible = VizibleBuilder::new()
        .custom_link(Box::new(link))
        .speaker(sink.clone())
        .server_url(format!("http://{addr}/"))
        .enrichment_timeout_ms(200)
        .build()
        .unwrap();

    handle.push_chunk(b"Front: 50cm | Left: 200cm | Right: 300cm\n");
    wait_for(|| sink.len() == 1);

    // 补充请求还挂在网络上时停机
    let started = Instant::now();
    vizible.stop().unwrap();
    assert!(
        started.elapsed() < Duration::from_secs(3),
        "stop must not hang on the in-flight request"
    );

    thread::sleep(Duration::from_millis(100));
    assert_eq!(
        sink.phrases(),
        vec!["Obstruction in front at 50 centimeters"],
        "cancelled enrichment must never speak"
    );

    let _ = silent_server.join();
}

#[test]
fn test_multiple_directions_alert_in_fixed_order() {
    let (base_url, _requests) = serve_detections("Front:{} | Right:{} | Left:{}", 1);
    let (link, handle) = MockLink::new();
    let sink = MemorySpeaker::new();
    let mut vizible = VizibleBuilder::new()
        .custom_link(Box::new(link))
        .speaker(sink.clone())
        .server_url(base_url)
        .build()
        .unwrap();

    handle.push_chunk(b"Front: 30cm | Left: 40cm | Right: 50cm\n");

    wait_for(|| sink.len() == 3);
    thread::sleep(Duration::from_millis(50));
    assert_eq!(
        sink.phrases(),
        vec![
            "Obstruction in front at 30 centimeters",
            "Obstruction in left at 40 centimeters",
            "Obstruction in right at 50 centimeters",
        ],
        "empty label groups upgrade nothing; basic order is front, left, right"
    );

    vizible.stop().unwrap();
}
