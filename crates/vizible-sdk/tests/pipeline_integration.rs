//! 流水线集成测试
//!
//! 通过 SDK 顶层导出验证：
//! 1. 任意切块的字节流最终产出同样的读数序列
//! 2. 最新读数快照与计数器跟随数据流
//! 3. 停止与链路故障的生命周期语义

use std::thread;
use std::time::{Duration, Instant};

use rand::Rng;
use vizible_sdk::link::MockLink;
use vizible_sdk::{LinkState, Pipeline, PipelineConfig, SensorReading};

fn wait_for<F: Fn() -> bool>(cond: F) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !cond() {
        assert!(Instant::now() < deadline, "condition not met in time");
        thread::sleep(Duration::from_millis(1));
    }
}

fn fast_config() -> PipelineConfig {
    PipelineConfig {
        read_timeout_ms: 5,
        ..Default::default()
    }
}

fn sensor_line(front: u32, left: u32, right: u32) -> String {
    format!("Front: {front}cm | Left: {left}cm | Right: {right}cm\n")
}

#[test]
fn test_random_chunk_splits_reach_subscriber_in_order() {
    // 构造 20 条读数的完整字节流
    let expected: Vec<SensorReading> = (0..20)
        .map(|i| SensorReading::new(100 + i, 200 + i, 300 + i))
        .collect();
    let stream: Vec<u8> = expected
        .iter()
        .map(|r| sensor_line(r.front, r.left, r.right))
        .collect::<String>()
        .into_bytes();

    let (link, handle) = MockLink::new();
    let pipeline = Pipeline::start(Box::new(link), fast_config()).unwrap();
    let readings = pipeline.subscribe();

    // 随机切块投喂，模拟串口任意到达边界
    let mut rng = rand::thread_rng();
    let mut rest = &stream[..];
    while !rest.is_empty() {
        let cut = rng.gen_range(1..=rest.len().min(13));
        handle.push_chunk(&rest[..cut]);
        rest = &rest[cut..];
    }

    for expected_reading in &expected {
        let reading = readings
            .recv_timeout(Duration::from_secs(2))
            .expect("subscriber should receive every reading");
        assert_eq!(reading, *expected_reading);
    }
}

#[test]
fn test_latest_reading_tracks_most_recent() {
    let (link, handle) = MockLink::new();
    let pipeline = Pipeline::start(Box::new(link), fast_config()).unwrap();

    assert_eq!(pipeline.latest_reading(), None);

    handle.push_chunk(sensor_line(10, 20, 30).as_bytes());
    wait_for(|| pipeline.latest_reading().is_some());
    assert_eq!(pipeline.latest_reading(), Some(SensorReading::new(10, 20, 30)));

    handle.push_chunk(sensor_line(11, 21, 31).as_bytes());
    wait_for(|| pipeline.latest_reading() == Some(SensorReading::new(11, 21, 31)));
}

#[test]
fn test_metrics_count_stream_anomalies() {
    let (link, handle) = MockLink::new();
    let config = PipelineConfig {
        read_timeout_ms: 5,
        max_record_bytes: 64,
        ..Default::default()
    };
    let pipeline = Pipeline::start(Box::new(link), config).unwrap();

    // 一条正常、一条乱码、一条超长
    handle.push_chunk(sensor_line(50, 200, 300).as_bytes());
    handle.push_chunk(b"###garbage###\n");
    handle.push_chunk(vec![b'x'; 200].as_slice());
    handle.push_chunk(b"\n");

    wait_for(|| pipeline.metrics().records_oversized == 1);
    let snapshot = pipeline.metrics();
    assert_eq!(snapshot.readings_parsed, 1, "only the well-formed line parses");
    assert_eq!(snapshot.parse_failures, 1, "garbage line is dropped, not fatal");
    assert!(snapshot.bytes_read >= 200);
    assert!(pipeline.is_running(), "anomalies must not stop the stream");
}

#[test]
fn test_stop_terminates_read_thread_promptly() {
    let (link, _handle) = MockLink::new();
    let mut pipeline = Pipeline::start(Box::new(link), fast_config()).unwrap();
    wait_for(|| pipeline.state().is_streaming());

    let started = Instant::now();
    pipeline.stop().unwrap();
    let elapsed = started.elapsed();

    assert!(
        elapsed < Duration::from_secs(1),
        "stop should return within the join bound, took {:?}",
        elapsed
    );
    assert_eq!(pipeline.state(), LinkState::Disconnected);
    assert!(pipeline.take_link_fault().is_none());
}

#[test]
fn test_link_fault_surfaces_and_loop_exits() {
    let (link, handle) = MockLink::new();
    handle.push_chunk(sensor_line(10, 20, 30).as_bytes());
    handle.close();

    let pipeline = Pipeline::start(Box::new(link), fast_config()).unwrap();
    wait_for(|| !pipeline.is_running());

    assert_eq!(pipeline.state(), LinkState::Disconnected);
    assert!(
        pipeline.take_link_fault().is_some(),
        "EOF must surface as a link fault to the owner"
    );
    // 故障前已解析的读数仍然可见
    assert_eq!(pipeline.latest_reading(), Some(SensorReading::new(10, 20, 30)));
}

#[test]
fn test_monitor_reports_stream_activity() {
    let (link, handle) = MockLink::new();
    let pipeline = Pipeline::start(Box::new(link), fast_config()).unwrap();

    assert!(!pipeline.monitor().is_active(Duration::from_secs(60)));

    handle.push_chunk(sensor_line(50, 200, 300).as_bytes());
    wait_for(|| pipeline.monitor().is_active(Duration::from_secs(60)));
    assert!(pipeline.monitor().time_since_last_reading().is_some());
}
