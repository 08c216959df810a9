//! 检测补充客户端
//!
//! 警报触发后向远端检测服务拉取各方向的物体标签，把基础警报
//! 升级为带标签的文案。远端返回 JSON 信封
//! `{"detections": "<载荷>"}`，载荷格式见
//! [`DetectionSet`](vizible_protocol::DetectionSet)。

use std::error::Error as _;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;
use vizible_protocol::constants::{DEFAULT_BASE_URL, DEFAULT_ENRICHMENT_TIMEOUT_MS, DETECTIONS_PATH};
use vizible_protocol::{DetectionSet, SensorReading};

use crate::error::EnrichmentError;

/// 补充数据源
///
/// 生产实现是 [`EnrichmentClient`]；测试注入脚本化实现。
/// `fetch` 在补充线程上调用，允许阻塞到配置的时限。
pub trait DetectionSource: Send + Sync {
    fn fetch(&self, reading: &SensorReading) -> Result<DetectionSet, EnrichmentError>;
}

/// 补充请求配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentConfig {
    /// 服务基地址，以 `/` 结尾与否均可
    pub base_url: String,
    /// 单次请求时限（毫秒）
    pub timeout_ms: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_ENRICHMENT_TIMEOUT_MS,
        }
    }
}

/// HTTP 检测客户端
///
/// 每次 `fetch` 发一个 GET 到 `base_url` + `detections`，
/// 整个请求（连接 + 读取）受 `timeout_ms` 约束。
pub struct EnrichmentClient {
    agent: ureq::Agent,
    url: String,
}

impl EnrichmentClient {
    pub fn new(config: &EnrichmentConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build();
        Self {
            agent,
            url: join_url(&config.base_url, DETECTIONS_PATH),
        }
    }

    /// 请求的完整 URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Default for EnrichmentClient {
    fn default() -> Self {
        Self::new(&EnrichmentConfig::default())
    }
}

#[derive(Debug, Deserialize)]
struct DetectionsPayload {
    detections: String,
}

impl DetectionSource for EnrichmentClient {
    fn fetch(&self, _reading: &SensorReading) -> Result<DetectionSet, EnrichmentError> {
        let response = match self.agent.get(&self.url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(code, _)) => return Err(EnrichmentError::Status(code)),
            Err(ureq::Error::Transport(transport)) => return Err(classify_transport(&transport)),
        };

        let payload: DetectionsPayload = serde_json::from_reader(response.into_reader())
            .map_err(|e| EnrichmentError::Malformed(format!("bad envelope: {e}")))?;
        debug!("Detections payload: {:?}", payload.detections);

        DetectionSet::parse(&payload.detections)
            .map_err(|e| EnrichmentError::Malformed(e.to_string()))
    }
}

fn join_url(base: &str, path: &str) -> String {
    if base.ends_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

/// 超时与其他传输错误分开归类
fn classify_transport(transport: &ureq::Transport) -> EnrichmentError {
    let mut source = transport.source();
    while let Some(err) = source {
        if let Some(io_err) = err.downcast_ref::<std::io::Error>() {
            if matches!(
                io_err.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            ) {
                return EnrichmentError::Timeout;
            }
        }
        source = err.source();
    }
    EnrichmentError::Unreachable(transport.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{Receiver, unbounded};
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    /// 起一个只应答一次的回环 HTTP 服务，返回基地址和请求行
    fn serve_once(response: String) -> (String, Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = unbounded();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 2048];
                let n = stream.read(&mut buf).unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]);
                let first_line = request.lines().next().unwrap_or("").to_string();
                let _ = tx.send(first_line);
                let _ = stream.write_all(response.as_bytes());
            }
        });
        (format!("http://{addr}/"), rx)
    }

    fn client_for(base_url: String, timeout_ms: u64) -> EnrichmentClient {
        EnrichmentClient::new(&EnrichmentConfig {
            base_url,
            timeout_ms,
        })
    }

    #[test]
    fn test_fetch_parses_detections() {
        let body = r#"{"detections": "Front:{person,chair} | Right:{} | Left:{door}"}"#;
        let (base_url, request_rx) = serve_once(http_response("200 OK", body));

        let client = client_for(base_url, 2000);
        let set = client.fetch(&SensorReading::new(50, 200, 300)).unwrap();

        assert_eq!(set.front, vec!["person", "chair"]);
        assert!(set.right.is_empty());
        assert_eq!(set.left, vec!["door"]);

        let request_line = request_rx.recv().unwrap();
        assert!(
            request_line.starts_with("GET /detections "),
            "unexpected request line: {request_line}"
        );
    }

    #[test]
    fn test_http_error_status_reported() {
        let (base_url, _rx) = serve_once(http_response("500 Internal Server Error", "{}"));
        let client = client_for(base_url, 2000);
        let err = client.fetch(&SensorReading::new(1, 2, 3)).unwrap_err();
        assert!(matches!(err, EnrichmentError::Status(500)));
    }

    #[test]
    fn test_connection_refused_is_unreachable() {
        // 绑定后立刻释放端口，确保无人监听
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(format!("http://{addr}/"), 2000);
        let err = client.fetch(&SensorReading::new(1, 2, 3)).unwrap_err();
        assert!(matches!(err, EnrichmentError::Unreachable(_)));
    }

    #[test]
    fn test_bad_json_envelope_is_malformed() {
        let (base_url, _rx) = serve_once(http_response("200 OK", "not json at all"));
        let client = client_for(base_url, 2000);
        let err = client.fetch(&SensorReading::new(1, 2, 3)).unwrap_err();
        assert!(matches!(err, EnrichmentError::Malformed(_)));
    }

    #[test]
    fn test_bad_payload_inside_envelope_is_malformed() {
        let body = r#"{"detections": "Left:{a} | Front:{b} | Right:{}"}"#; // 组序错误
        let (base_url, _rx) = serve_once(http_response("200 OK", body));
        let client = client_for(base_url, 2000);
        let err = client.fetch(&SensorReading::new(1, 2, 3)).unwrap_err();
        assert!(matches!(err, EnrichmentError::Malformed(_)));
    }

    #[test]
    fn test_silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (hold_tx, hold_rx) = unbounded::<()>();
        thread::spawn(move || {
            if let Ok((stream, _)) = listener.accept() {
                // 既不读也不答，拖到客户端超时
                let _ = hold_rx.recv_timeout(Duration::from_secs(5));
                drop(stream);
            }
        });

        let client = client_for(format!("http://{addr}/"), 100);
        let err = client.fetch(&SensorReading::new(1, 2, 3)).unwrap_err();
        assert!(matches!(err, EnrichmentError::Timeout));
        drop(hold_tx);
    }

    #[test]
    fn test_url_joining() {
        let with_slash = client_for("http://10.0.0.1:5000/".to_string(), 100);
        let without_slash = client_for("http://10.0.0.1:5000".to_string(), 100);
        assert_eq!(with_slash.url(), "http://10.0.0.1:5000/detections");
        assert_eq!(without_slash.url(), "http://10.0.0.1:5000/detections");
    }
}
