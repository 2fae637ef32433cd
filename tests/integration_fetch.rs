//! Concurrent loading over HTTP against a loopback server.

use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wptree::fetch::{FetchError, Fetcher, Source};
use wptree::parser::ParseError;
use wptree::test_helpers::{make_item, payload_json};

/// Serve canned responses by request path until the test ends.
async fn spawn_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let good = payload_json(vec![
        make_item(1, "Activity", "Open", "2024-06-20"),
        make_item(2, "Activity", "Open", "2024-07-20"),
    ]);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let good = good.clone();
            tokio::spawn(async move {
                let mut buf = vec![0u8; 4096];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]).to_string();
                let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();

                let (status, body) = match path.as_str() {
                    "/good" => ("200 OK", good),
                    "/broken" => ("200 OK", r#"{"_embedded": {}}"#.to_string()),
                    _ => ("500 Internal Server Error", "oops".to_string()),
                };
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_fetch_all_isolates_failing_urls() {
    let base = spawn_server().await;
    let sources = vec![
        Source::parse(&format!("{}/error", base)),
        Source::parse(&format!("{}/good", base)),
        Source::parse(&format!("{}/broken", base)),
    ];

    let fetcher = Fetcher::new(Duration::from_secs(5)).unwrap();
    let report = fetcher.fetch_all(&sources).await;

    let ids: Vec<u64> = report.records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert!(report.has_failures());
    assert_eq!(report.failures.len(), 2);
    assert!(matches!(
        report.failures[0].error,
        FetchError::Status(status) if status.as_u16() == 500
    ));
    assert_eq!(report.failures[0].source, sources[0]);
    assert!(matches!(
        report.failures[1].error,
        FetchError::Parse(ParseError::Structure(_))
    ));
}

#[tokio::test]
async fn test_fetch_payload_ok() {
    let base = spawn_server().await;
    let fetcher = Fetcher::new(Duration::from_secs(5)).unwrap();
    let payload = fetcher.fetch_payload(&format!("{}/good", base)).await.unwrap();
    assert_eq!(payload.embedded.elements.len(), 2);
}

#[tokio::test]
async fn test_unreachable_host_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let fetcher = Fetcher::new(Duration::from_secs(2)).unwrap();
    let report = fetcher
        .fetch_all(&[Source::parse(&format!("http://{}/x", addr))])
        .await;
    assert!(report.records.is_empty());
    assert!(matches!(report.failures[0].error, FetchError::Transport(_)));
}
