mod common;

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve one HTTP request with a canned response; returns the base URL and
/// a handle yielding the raw request text.
async fn one_shot_server(
    status: &'static str,
    content_type: &'static str,
    body: impl Into<String>,
) -> (String, tokio::task::JoinHandle<String>) {
    let body: String = body.into();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut received = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            received.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&received);
            if let Some(head_end) = text.find("\r\n\r\n") {
                let content_length = text[..head_end]
                    .lines()
                    .find_map(|l| {
                        let (k, v) = l.split_once(':')?;
                        k.eq_ignore_ascii_case("content-length")
                            .then(|| v.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if received.len() >= head_end + 4 + content_length {
                    break;
                }
            }
        }
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        String::from_utf8_lossy(&received).into_owned()
    });
    (format!("http://{addr}"), handle)
}

#[tokio::test]
async fn test_http_get_with_query() {
    let (base, server) = one_shot_server("200 OK", "application/json", r#"{"ok":true}"#).await;
    let payload = common::client()
        .call_tool_json(
            "api",
            "http",
            json!({ "url": format!("{base}/items"), "params": { "q": "rust" } }),
        )
        .await;

    assert_eq!(payload["status_code"], 200);
    assert_eq!(payload["success"], true);
    assert_eq!(payload["json"], json!({ "ok": true }));
    assert_eq!(payload["body"], r#"{"ok":true}"#);

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /items?q=rust HTTP/1.1"), "{request}");
}

#[tokio::test]
async fn test_http_post_json_body() {
    let (base, server) = one_shot_server("201 Created", "text/plain", "made").await;
    let payload = common::client()
        .call_tool_json(
            "api",
            "http",
            json!({ "url": base, "method": "post", "body": "{\"name\":\"x\"}" }),
        )
        .await;
    assert_eq!(payload["status_code"], 201);
    assert!(payload["json"].is_null());

    let request = server.await.unwrap();
    assert!(request.starts_with("POST / HTTP/1.1"));
    assert!(request.to_ascii_lowercase().contains("content-type: application/json"));
    assert!(request.ends_with("{\"name\":\"x\"}"));
}

#[tokio::test]
async fn test_webhook() {
    let (base, server) = one_shot_server("500 Internal Server Error", "text/plain", "nope").await;
    let payload = common::client()
        .call_tool_json(
            "api",
            "webhook",
            json!({ "url": base, "payload": { "event": "done" }, "method": "PUT" }),
        )
        .await;
    assert_eq!(
        payload,
        json!({ "success": false, "status_code": 500, "response": "nope" })
    );
    assert!(server.await.unwrap().starts_with("PUT / HTTP/1.1"));
}

#[tokio::test]
async fn test_graphql_errors() {
    let (base, _server) = one_shot_server(
        "200 OK",
        "application/json",
        r#"{"data":null,"errors":[{"message":"bad field"}]}"#,
    )
    .await;
    let payload = common::client()
        .call_tool_json("api", "graphql", json!({ "endpoint": base, "query": "{ x }" }))
        .await;
    assert_eq!(payload["success"], false);
    assert_eq!(payload["errors"][0]["message"], "bad field");
}

#[tokio::test]
async fn test_webhook_rejects_get() {
    let payload = common::client()
        .call_tool_json(
            "api",
            "webhook",
            json!({ "url": "http://127.0.0.1:9", "payload": {}, "method": "GET" }),
        )
        .await;
    assert_eq!(
        payload,
        json!({ "error": "Invalid arguments: webhook method must be POST or PUT, got GET" })
    );
}

#[tokio::test]
async fn test_connection_refused() {
    // Bind then drop to get a port nobody listens on
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let payload = common::client()
        .call_tool_json("api", "http", json!({ "url": format!("http://127.0.0.1:{port}/") }))
        .await;
    let message = payload["error"].as_str().unwrap();
    assert!(message.starts_with("Connection error"), "{message}");
}

#[tokio::test]
async fn test_http_body_is_capped() {
    let oversized = "a".repeat(chalice_common::MAX_OUTPUT_BYTES + 100);
    let (base, server) = one_shot_server("200 OK", "text/plain", oversized).await;
    let payload = common::client()
        .call_tool_json("api", "http", json!({ "url": format!("{base}/big") }))
        .await;

    assert_eq!(payload["status_code"], 200);
    let body = payload["body"].as_str().unwrap();
    assert!(body.starts_with("aaaa"));
    assert!(body.ends_with("[output truncated, 100 bytes omitted]"), "{}", &body[body.len() - 60..]);
    assert_eq!(payload["json"], serde_json::Value::Null);
    server.await.unwrap();
}
