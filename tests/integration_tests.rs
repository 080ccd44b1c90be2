//! Integration tests for the recommendation service.
//!
//! These tests run the full handler chain behind a real listener and talk to
//! it over raw HTTP/1.1.

use recommendation::config::Config;
use recommendation::routes::build_service;
use recommendation::server::HttpServer;
use recommendation::util::ShutdownSignal;
use recommendation::AppState;
use std::net::SocketAddr;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// A running service plus the fixtures it reads from.
struct TestService {
    addr: SocketAddr,
    state: AppState,
    shutdown: ShutdownSignal,
    _dir: TempDir,
}

impl TestService {
    async fn start() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        std::fs::write(dir.path().join("config.json"), r#"{"version": "3.1.4"}"#)
            .expect("failed to write app config");
        std::fs::create_dir(dir.path().join("static")).expect("failed to create static dir");
        std::fs::write(dir.path().join("static").join("app.js"), "console.log(1);")
            .expect("failed to write static file");

        let mut config = Config::default();
        config.server.listen = "127.0.0.1:0".parse().unwrap();
        config.server.app_config = dir.path().join("config.json");
        config.server.static_dir = dir.path().join("static");
        config.server.templates_dir = dir.path().join("templates");

        Self::start_with(config, dir).await
    }

    async fn start_with(config: Config, dir: TempDir) -> Self {
        let listen = config.server.listen;
        let state = AppState::from_config(config).expect("failed to build state");
        let server = HttpServer::bind(listen, build_service(&state))
            .await
            .expect("failed to bind");
        let addr = server.local_addr().unwrap();

        let shutdown = ShutdownSignal::new();
        tokio::spawn(server.run(shutdown.subscribe()));

        Self {
            addr,
            state,
            shutdown,
            _dir: dir,
        }
    }

    async fn get(&self, path: &str) -> Response {
        self.request("GET", path).await
    }

    async fn request(&self, method: &str, path: &str) -> Response {
        let request = format!(
            "{} {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
            method, path
        );
        let raw = self.send_raw(request.as_bytes()).await;
        Response::parse(&String::from_utf8_lossy(&raw))
    }

    /// Write raw bytes and read until the server closes. A reset after a
    /// partial response is tolerated.
    async fn send_raw(&self, request: &[u8]) -> Vec<u8> {
        let mut stream = TcpStream::connect(self.addr).await.expect("failed to connect");
        stream.write_all(request).await.expect("failed to write");

        let mut raw = Vec::new();
        let _ = stream.read_to_end(&mut raw).await;
        raw
    }

    async fn metrics(&self) -> String {
        self.get("/metrics").await.body
    }
}

impl Drop for TestService {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

struct Response {
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
}

impl Response {
    fn parse(raw: &str) -> Self {
        let (head, body) = raw.split_once("\r\n\r\n").expect("malformed response");
        let mut lines = head.lines();
        let status = lines
            .next()
            .and_then(|l| l.split_whitespace().nth(1))
            .and_then(|s| s.parse().ok())
            .expect("missing status line");
        let headers = lines
            .filter_map(|l| l.split_once(':'))
            .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
            .collect();

        Self {
            status,
            headers,
            body: body.to_string(),
        }
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[tokio::test]
async fn test_health_endpoint_is_instrumented() {
    let service = TestService::start().await;

    let resp = service.get("/health").await;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, r#"{"status":"healthy"}"#);

    let metrics = service.metrics().await;
    assert!(metrics.contains(
        "recommendation_http_requests_total{method=\"GET\",endpoint=\"/health\",status=\"OK\"} 1\n"
    ));
    assert!(metrics.contains(
        "recommendation_http_request_duration_seconds_count{method=\"GET\",endpoint=\"/health\"} 1\n"
    ));
}

#[tokio::test]
async fn test_metrics_endpoint_content_type() {
    let service = TestService::start().await;

    let resp = service.get("/metrics").await;
    assert_eq!(resp.status, 200);
    assert_eq!(
        resp.header("content-type"),
        Some("text/plain; version=0.0.4; charset=utf-8")
    );
    assert!(resp.body.contains("# TYPE recommendation_http_requests_total counter"));
    assert!(resp.body.contains("# TYPE recommendation_http_request_duration_seconds histogram"));
    assert!(resp.body.contains("recommendation_origami_of_day_total 0\n"));
}

#[tokio::test]
async fn test_scrape_is_recorded_after_it_renders() {
    let service = TestService::start().await;

    let first = service.metrics().await;
    assert!(!first.contains("endpoint=\"/metrics\""));

    let second = service.metrics().await;
    assert!(second.contains(
        "recommendation_http_requests_total{method=\"GET\",endpoint=\"/metrics\",status=\"OK\"} 1\n"
    ));
}

#[tokio::test]
async fn test_origami_counter_moves_once_per_call() {
    let service = TestService::start().await;

    for _ in 0..3 {
        let resp = service.get("/api/origami-of-the-day").await;
        assert_eq!(resp.status, 200);
        let origami: serde_json::Value = serde_json::from_str(&resp.body).unwrap();
        assert!(origami["name"].is_string());
    }

    let metrics = service.metrics().await;
    assert!(metrics.contains("recommendation_origami_of_day_total 3\n"));
    assert!(metrics.contains(
        "recommendation_http_requests_total{method=\"GET\",endpoint=\"/api/origami-of-the-day\",status=\"OK\"} 3\n"
    ));
    assert_eq!(
        service
            .state
            .metrics()
            .recommendations_served()
            .value(&[]),
        Some(3)
    );
}

#[tokio::test]
async fn test_recommendation_status() {
    let service = TestService::start().await;

    let resp = service.get("/api/recommendation-status").await;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, r#"{"status":"operational"}"#);

    // Only the middleware's own writes; the served counter stays put.
    let metrics = service.metrics().await;
    assert!(metrics.contains("recommendation_origami_of_day_total 0\n"));
}

#[tokio::test]
async fn test_unknown_route_labeled_with_literal_path() {
    let service = TestService::start().await;

    let resp = service.get("/no/such/page").await;
    assert_eq!(resp.status, 404);

    let metrics = service.metrics().await;
    let matching: Vec<&str> = metrics
        .lines()
        .filter(|l| l.starts_with("recommendation_http_requests_total{") && l.contains("/no/such/page"))
        .collect();
    assert_eq!(
        matching,
        vec![
            "recommendation_http_requests_total{method=\"GET\",endpoint=\"/no/such/page\",status=\"Not Found\"} 1"
        ]
    );
}

#[tokio::test]
async fn test_static_files_use_route_template() {
    let service = TestService::start().await;

    let resp = service.get("/static/app.js").await;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, "console.log(1);");

    let resp = service.get("/static/missing.js").await;
    assert_eq!(resp.status, 404);

    let metrics = service.metrics().await;
    assert!(metrics.contains(
        "recommendation_http_requests_total{method=\"GET\",endpoint=\"/static/*filepath\",status=\"OK\"} 1\n"
    ));
    assert!(metrics.contains(
        "recommendation_http_requests_total{method=\"GET\",endpoint=\"/static/*filepath\",status=\"Not Found\"} 1\n"
    ));
    assert!(!metrics.contains("endpoint=\"/static/app.js\""));
}

#[tokio::test]
async fn test_static_files_answer_head() {
    let service = TestService::start().await;

    let resp = service.request("HEAD", "/static/app.js").await;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.header("content-length"), Some("15"));
    assert!(resp.header("last-modified").is_some());
    assert_eq!(resp.body, "");

    let metrics = service.metrics().await;
    assert!(metrics.contains(
        "recommendation_http_requests_total{method=\"HEAD\",endpoint=\"/static/*filepath\",status=\"OK\"} 1\n"
    ));
}

#[tokio::test]
async fn test_wrong_method_is_not_found() {
    let service = TestService::start().await;

    let resp = service.request("POST", "/health").await;
    assert_eq!(resp.status, 404);
    assert_eq!(resp.body, "404 page not found");

    let metrics = service.metrics().await;
    assert!(metrics.contains(
        "recommendation_http_requests_total{method=\"POST\",endpoint=\"/health\",status=\"Not Found\"} 1\n"
    ));
}

#[tokio::test]
async fn test_malformed_body_is_still_recorded() {
    let service = TestService::start().await;

    service
        .send_raw(
            b"POST /health HTTP/1.1\r\nHost: localhost\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\nzz\r\nnot a chunk\r\n",
        )
        .await;

    assert_eq!(
        service
            .state
            .metrics()
            .http()
            .requests_total()
            .value(&["POST", "/health", "Not Found"]),
        Some(1)
    );
}

#[tokio::test]
async fn test_home_page_renders() {
    let service = TestService::start().await;

    let resp = service.get("/").await;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.header("content-type"), Some("text/html; charset=utf-8"));
    assert!(resp.body.contains("3.1.4"));
}

#[tokio::test]
async fn test_home_page_config_failure_is_500() {
    let dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.server.listen = "127.0.0.1:0".parse().unwrap();
    config.server.app_config = dir.path().join("missing.json");
    config.server.templates_dir = dir.path().to_path_buf();

    let service = TestService::start_with(config, dir).await;

    let resp = service.get("/").await;
    assert_eq!(resp.status, 500);
    assert_eq!(resp.body, "Internal Server Error");

    let metrics = service.metrics().await;
    assert!(metrics.contains(
        "recommendation_http_requests_total{method=\"GET\",endpoint=\"/\",status=\"Internal Server Error\"} 1\n"
    ));
}

#[tokio::test]
async fn test_concurrent_requests_are_all_counted() {
    let service = TestService::start().await;

    let requests: Vec<_> = (0..25)
        .map(|_| {
            let addr = service.addr;
            tokio::spawn(async move {
                let mut stream = TcpStream::connect(addr).await.unwrap();
                stream
                    .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
                    .await
                    .unwrap();
                let mut raw = Vec::new();
                stream.read_to_end(&mut raw).await.unwrap();
            })
        })
        .collect();

    for request in requests {
        request.await.unwrap();
    }

    assert_eq!(
        service
            .state
            .metrics()
            .http()
            .requests_total()
            .value(&["GET", "/health", "OK"]),
        Some(25)
    );
}

#[test]
fn test_config_parsing() {
    use recommendation::config::load_config;
    use std::io::Write;
    use tempfile::NamedTempFile;

    let config_content = r#"
global:
  log_level: warn

server:
  listen: "127.0.0.1:0"

metrics:
  path: /internal/metrics
  duration_buckets: [0.1, 0.5, 1]
"#;

    let mut temp_file = NamedTempFile::new().expect("failed to create temp file");
    temp_file
        .write_all(config_content.as_bytes())
        .expect("failed to write config");

    let config = load_config(temp_file.path()).expect("failed to load config");

    assert_eq!(config.global.log_level, "warn");
    assert_eq!(config.metrics.path, "/internal/metrics");
    assert_eq!(config.metrics.duration_buckets, vec![0.1, 0.5, 1.0]);
}

#[tokio::test]
async fn test_custom_metrics_path() {
    let dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.server.listen = "127.0.0.1:0".parse().unwrap();
    config.server.templates_dir = dir.path().to_path_buf();
    config.metrics.path = "/internal/metrics".to_string();
    config.metrics.namespace = "origami".to_string();

    let service = TestService::start_with(config, dir).await;

    assert_eq!(service.get("/metrics").await.status, 404);

    let resp = service.get("/internal/metrics").await;
    assert_eq!(resp.status, 200);
    assert!(resp.body.contains(
        "origami_http_requests_total{method=\"GET\",endpoint=\"/metrics\",status=\"Not Found\"} 1\n"
    ));
}
