//! HTTP connector tests against a one-shot local responder

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use autothresh_connectors::http::{HttpConfig, HttpError, HttpSignalSource, HttpThresholdSink};
use autothresh_core::traits::{SignalSource, ThresholdPair, ThresholdSink};

/// Request as seen by the responder
struct Captured {
    request_line: String,
    headers: Vec<String>,
    body: String,
}

impl Captured {
    fn header(&self, name: &str) -> Option<&str> {
        let prefix = format!("{}:", name.to_ascii_lowercase());
        self.headers
            .iter()
            .find(|h| h.to_ascii_lowercase().starts_with(&prefix))
            .map(|h| h[prefix.len()..].trim())
    }
}

/// Accept one connection, answer with `status` and `body` after `delay`
fn serve_once(status: &'static str, body: &'static str, delay: Duration) -> (String, JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/config", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();

        let mut headers = Vec::new();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let line = line.trim_end().to_string();
            if line.is_empty() {
                break;
            }
            headers.push(line);
        }

        let length = headers
            .iter()
            .find_map(|h| {
                let lower = h.to_ascii_lowercase();
                lower
                    .strip_prefix("content-length:")
                    .map(|v| v.trim().parse::<usize>().unwrap())
            })
            .unwrap_or(0);
        let mut raw = vec![0u8; length];
        reader.read_exact(&mut raw).unwrap();

        thread::sleep(delay);
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        // the client may have given up already
        let _ = (&stream).write_all(response.as_bytes());

        Captured {
            request_line: request_line.trim_end().to_string(),
            headers,
            body: String::from_utf8(raw).unwrap(),
        }
    });

    (url, handle)
}

fn source(url: &str, timeout_ms: u64) -> HttpSignalSource {
    HttpSignalSource::new(HttpConfig::new(url).timeout_ms(timeout_ms), "ema_R").unwrap()
}

#[test]
fn fetch_reads_signal_field() {
    let (url, server) = serve_once("200 OK", r#"{"ema_R": 41.5, "raw": 40}"#, Duration::ZERO);
    let mut source = source(&url, 1_000);

    assert_eq!(source.fetch().unwrap(), Some(41.5));
    assert_eq!(source.stats().requests_ok, 1);

    let captured = server.join().unwrap();
    assert_eq!(captured.request_line, "GET /config HTTP/1.1");
}

#[test]
fn fetch_without_field_is_no_reading() {
    let (url, server) = serve_once("200 OK", r#"{"raw": 40}"#, Duration::ZERO);
    let mut source = source(&url, 1_000);

    assert_eq!(source.fetch().unwrap(), None);
    assert_eq!(source.stats().requests_failed, 0);
    server.join().unwrap();
}

#[test]
fn fetch_reports_server_error() {
    let (url, server) = serve_once("503 Service Unavailable", "{}", Duration::ZERO);
    let mut source = source(&url, 1_000);

    assert!(matches!(source.fetch(), Err(HttpError::Status { status: 503 })));
    assert_eq!(source.stats().requests_failed, 1);
    assert!(source.stats().last_error.is_some());
    server.join().unwrap();
}

#[test]
fn fetch_rejects_non_200_success() {
    let (url, server) = serve_once("202 Accepted", r#"{"ema_R": 1.0}"#, Duration::ZERO);
    let mut source = source(&url, 1_000);

    assert!(matches!(source.fetch(), Err(HttpError::Status { status: 202 })));
    server.join().unwrap();
}

#[test]
fn fetch_reports_malformed_body() {
    let (url, server) = serve_once("200 OK", "temperature: high", Duration::ZERO);
    let mut source = source(&url, 1_000);

    assert!(matches!(source.fetch(), Err(HttpError::Payload(_))));
    server.join().unwrap();
}

#[test]
fn fetch_is_bounded_by_timeout() {
    let (url, server) = serve_once("200 OK", r#"{"ema_R": 1.0}"#, Duration::from_millis(600));
    let mut source = source(&url, 150);

    assert!(matches!(source.fetch(), Err(HttpError::Transport(_))));
    server.join().unwrap();
}

#[test]
fn fetch_reports_refused_connection() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let mut source = source(&format!("http://127.0.0.1:{}/config", port), 300);

    assert!(matches!(source.fetch(), Err(HttpError::Transport(_))));
}

#[test]
fn push_posts_threshold_json() {
    let (url, server) = serve_once("200 OK", "{}", Duration::ZERO);
    let mut sink = HttpThresholdSink::new(HttpConfig::new(url).timeout_ms(800)).unwrap();

    sink.push(ThresholdPair::from_off(30)).unwrap();
    assert_eq!(sink.stats().requests_ok, 1);

    let captured = server.join().unwrap();
    assert_eq!(captured.request_line, "POST /config HTTP/1.1");
    assert_eq!(captured.header("Content-Type"), Some("application/json"));
    let body: serde_json::Value = serde_json::from_str(&captured.body).unwrap();
    assert_eq!(body, serde_json::json!({"th_on": 31, "th_off": 30}));
}

#[test]
fn push_failure_is_an_error() {
    let (url, server) = serve_once("500 Internal Server Error", "", Duration::ZERO);
    let mut sink = HttpThresholdSink::new(HttpConfig::new(url).timeout_ms(800)).unwrap();

    assert!(matches!(
        sink.push(ThresholdPair::from_off(30)),
        Err(HttpError::Status { status: 500 })
    ));
    assert_eq!(sink.stats().requests_failed, 1);
    server.join().unwrap();
}
