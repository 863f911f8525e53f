//! Every JSON log line carries the process component and boot timestamp.
//!
//! Kept in its own test binary: the global subscriber is installed once per
//! process and must write to this test's log file.

use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;

use wavefleet::config::Role;
use wavefleet::lifecycle::Coordinator;

mod common;

fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

async fn get_health(port: u16) -> String {
    for _ in 0..100 {
        if let Ok(mut stream) = TcpStream::connect(("127.0.0.1", port)).await {
            stream
                .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
                .await
                .unwrap();
            let mut response = String::new();
            stream.read_to_string(&mut response).await.unwrap();
            return response;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("service never accepted a connection on port {}", port);
}

#[tokio::test]
async fn test_every_record_is_tagged() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("wfcentral.log");
    let port = free_port();
    let (stop, termination) = common::termination();
    let (ready_tx, ready_rx) = oneshot::channel();

    let builder = common::builder(Role::Central, &dir)
        .with_port(port.to_string())
        .with_log_file(&log_path);
    let run = tokio::spawn(
        Coordinator::new(Role::Central)
            .with_ready_notifier(ready_tx)
            .with_termination(termination)
            .run(builder),
    );

    ready_rx.await.unwrap();
    let response = get_health(port).await;
    assert!(response.starts_with("HTTP/1.1 200"));

    stop.send(()).unwrap();
    run.await.unwrap().unwrap();

    let content = std::fs::read_to_string(&log_path).unwrap();
    let lines: Vec<serde_json::Value> = content
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert!(lines
        .iter()
        .any(|line| line["span"]["name"] == "request"));

    for line in &lines {
        let tagged = line["spans"].as_array().is_some_and(|spans| {
            spans.iter().any(|span| {
                span["component"] == "wfcentral" && span["boot_ts"].is_u64()
            })
        });
        assert!(tagged, "untagged log record: {}", line);
    }
}
