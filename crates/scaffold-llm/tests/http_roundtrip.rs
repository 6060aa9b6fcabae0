//! Client against a one-shot local HTTP server

use scaffold_core::{GenerationParams, ModelClient, ModelError, ModelRequest, StageId};
use scaffold_llm::{ChatClient, ClientConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve exactly one request, answering with `status` and `body`.
/// Resolves to the raw request text.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}/v1", listener.local_addr().unwrap());
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            raw.extend_from_slice(&buf[..n]);
            if n == 0 || request_complete(&raw) {
                break;
            }
        }
        let reply = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(reply.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&raw).into_owned()
    });
    (base, handle)
}

fn request_complete(raw: &[u8]) -> bool {
    let text = String::from_utf8_lossy(raw);
    let Some(split) = text.find("\r\n\r\n") else {
        return false;
    };
    let length = text[..split]
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);
    raw.len() >= split + 4 + length
}

fn request() -> ModelRequest {
    ModelRequest {
        stage: StageId::Models,
        system: "Emit models".to_string(),
        prompt: "Tables:\n- users".to_string(),
        params: GenerationParams {
            model: None,
            temperature: 0.2,
            top_p: 0.9,
            max_tokens: 256,
        },
    }
}

#[tokio::test]
async fn posts_messages_and_returns_first_choice() {
    let (base, server) = serve_once(
        "200 OK",
        r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"{\"files\":[]}"},"finish_reason":"stop"}]}"#,
    )
    .await;
    let client = ChatClient::new(
        ClientConfig::new()
            .with_base_url(base)
            .with_api_key("sk-test")
            .with_model("local-model"),
    )
    .unwrap();

    let text = client.complete(&request()).await.unwrap();
    assert_eq!(text, r#"{"files":[]}"#);

    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /v1/chat/completions "));
    assert!(raw.to_ascii_lowercase().contains("authorization: bearer sk-test"));
    assert!(raw.contains(r#""model":"local-model""#));
    assert!(raw.contains(r#""role":"system","content":"Emit models""#));
    assert!(raw.contains(r#""max_tokens":256"#));
}

#[tokio::test]
async fn error_status_is_reported_with_message() {
    let (base, server) = serve_once(
        "429 Too Many Requests",
        r#"{"error":{"message":"Rate limit reached","type":"requests"}}"#,
    )
    .await;
    let client = ChatClient::new(ClientConfig::new().with_base_url(base)).unwrap();

    let err = client.complete(&request()).await.unwrap_err();
    assert!(matches!(
        err,
        ModelError::Status { status: 429, ref body } if body == "Rate limit reached"
    ));
    let raw = server.await.unwrap();
    assert!(!raw.to_ascii_lowercase().contains("authorization:"));
}

#[tokio::test]
async fn no_choices_is_an_empty_response() {
    let (base, _server) = serve_once("200 OK", r#"{"choices":[]}"#).await;
    let client = ChatClient::new(ClientConfig::new().with_base_url(base)).unwrap();
    let err = client.complete(&request()).await.unwrap_err();
    assert!(matches!(err, ModelError::EmptyResponse));
}
