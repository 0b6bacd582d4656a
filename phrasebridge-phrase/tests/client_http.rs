//! `PhraseClient` against a local one-shot HTTP stub.
//!
//! Each scripted response is served on its own connection with
//! `Connection: close`, and the raw request head is handed back for
//! assertions.

use std::time::Duration;

use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use phrasebridge_core::{LocaleId, ProjectId, UploadId, UploadState};
use phrasebridge_phrase::{PhraseClient, PhraseError, PollPolicy, UploadStatusSource};

/// Serve `responses` in order; resolves to the request heads received.
async fn stub_server(responses: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");

    let handle = tokio::spawn(async move {
        let mut heads = Vec::new();
        for (status, body) in responses {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let head = read_request(&mut socket).await;
            heads.push(head);

            let reason = match status {
                200 => "OK",
                201 => "Created",
                404 => "Not Found",
                _ => "Error",
            };
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket
                .write_all(response.as_bytes())
                .await
                .expect("write response");
            let _ = socket.shutdown().await;
        }
        heads
    });

    (format!("http://{addr}/api/v2"), handle)
}

/// Read one request (head plus content-length body) and return the head.
async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let head_end = loop {
        let n = socket.read(&mut chunk).await.expect("read");
        assert!(n > 0, "client closed before sending a full request");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };
    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();

    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);
    let mut remaining = content_length.saturating_sub(buf.len() - head_end);
    while remaining > 0 {
        let n = socket.read(&mut chunk).await.expect("read body");
        if n == 0 {
            break;
        }
        remaining = remaining.saturating_sub(n);
    }
    head
}

const LOCALES: &str = r#"[{"id":"l-en","name":"en","code":"en-GB","default":true,"main":true,"rtl":false,"plural_forms":["one","other"],"source_locale":null,"created_at":"2020-01-01T00:00:00Z","updated_at":"2020-01-02T00:00:00Z"}]"#;

#[tokio::test]
async fn fetch_locales_sends_token_and_parses_list() {
    let (base, server) = stub_server(vec![(200, LOCALES)]).await;
    let client = PhraseClient::new("secret", base);

    let locales = client
        .fetch_locales(&ProjectId::from("p1"))
        .await
        .expect("fetch");
    assert_eq!(locales.len(), 1);
    assert_eq!(locales[0].name, "en");

    let heads = server.await.expect("server");
    assert!(heads[0].starts_with("GET /api/v2/projects/p1/locales HTTP/1.1"));
    assert!(heads[0].to_ascii_lowercase().contains("authorization: token secret"));
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let (base, server) = stub_server(vec![(404, r#"{"message":"Not Found"}"#)]).await;
    let client = PhraseClient::new("secret", base);

    let err = client
        .fetch_locales(&ProjectId::from("missing"))
        .await
        .expect_err("404");
    assert!(matches!(err, PhraseError::Status { status: 404, .. }), "got {err:?}");
    server.await.expect("server");
}

#[tokio::test]
async fn download_returns_body_verbatim() {
    let body = r#"{"home":{"title":"Willkommen"}}"#;
    let (base, server) = stub_server(vec![(200, body)]).await;
    let client = PhraseClient::new("secret", base);

    let downloaded = client
        .download_locale(&LocaleId::from("l-de"), &ProjectId::from("p1"))
        .await
        .expect("download");
    assert_eq!(downloaded, body);

    let heads = server.await.expect("server");
    assert!(heads[0]
        .starts_with("GET /api/v2/projects/p1/locales/l-de/download?file_format=nested_json "));
}

#[tokio::test]
async fn upload_status_is_classified() {
    let (base, server) = stub_server(vec![
        (200, r#"{"id":"u1","state":"success"}"#),
        (200, r#"{"id":"u1","state":"processing"}"#),
        (200, "not json"),
    ])
    .await;
    let client = PhraseClient::new("secret", base);
    let project = ProjectId::from("p1");
    let upload = UploadId::from("u1");

    let first = client.query_upload_status(&project, &upload).await.expect("1");
    let second = client.query_upload_status(&project, &upload).await.expect("2");
    let third = client.query_upload_status(&project, &upload).await.expect("3");
    assert_eq!(first, UploadState::Success);
    assert_eq!(second, UploadState::Pending);
    assert_eq!(third, UploadState::Pending);

    let heads = server.await.expect("server");
    assert!(heads[0].starts_with("GET /api/v2/projects/p1/uploads/u1 HTTP/1.1"));
}

#[tokio::test]
async fn upload_locale_posts_multipart_and_returns_id() {
    let dir = TempDir::new().expect("tmp");
    let file = dir.path().join("en.json");
    tokio::fs::write(&file, r#"{"home":{"title":"Welcome"}}"#)
        .await
        .expect("write");

    let (base, server) = stub_server(vec![(201, r#"{"id":"up-42","state":"initialized"}"#)]).await;
    let client = PhraseClient::new("secret", base);

    let id = client
        .upload_locale(&LocaleId::from("l-en"), &file, &ProjectId::from("p1"))
        .await
        .expect("upload");
    assert_eq!(id, UploadId::from("up-42"));

    let heads = server.await.expect("server");
    assert!(heads[0].starts_with("POST /api/v2/projects/p1/uploads HTTP/1.1"));
    assert!(heads[0].to_ascii_lowercase().contains("multipart/form-data"));
}

#[tokio::test]
async fn upload_of_missing_file_is_io_error() {
    let client = PhraseClient::new("secret", "http://127.0.0.1:9/api/v2");
    let err = client
        .upload_locale(
            &LocaleId::from("l-en"),
            std::path::Path::new("/definitely/not/here/en.json"),
            &ProjectId::from("p1"),
        )
        .await
        .expect_err("missing file");
    assert!(matches!(err, PhraseError::Io { .. }));
}

#[tokio::test]
async fn remove_unmentioned_keys_deletes_after_success() {
    let (base, server) = stub_server(vec![
        (200, r#"{"id":"u1","state":"success"}"#),
        (200, r#"{"records_affected":7}"#),
    ])
    .await;
    let client = PhraseClient::new("secret", base);

    let removed = client
        .remove_unmentioned_keys(
            &ProjectId::from("p1"),
            &UploadId::from("u1"),
            PollPolicy::new(Duration::from_millis(5), 3),
        )
        .await
        .expect("remove");
    assert_eq!(removed, 7);

    let heads = server.await.expect("server");
    assert_eq!(heads.len(), 2);
    assert!(heads[1].starts_with(
        "DELETE /api/v2/projects/p1/keys?q=unmentioned_in_upload%3Au1 HTTP/1.1"
    ));
}

#[tokio::test]
async fn remove_unmentioned_keys_skips_delete_when_upload_failed() {
    let (base, server) = stub_server(vec![(200, r#"{"id":"u1","state":"error"}"#)]).await;
    let client = PhraseClient::new("secret", base);

    let err = client
        .remove_unmentioned_keys(
            &ProjectId::from("p1"),
            &UploadId::from("u1"),
            PollPolicy::new(Duration::from_millis(5), 3),
        )
        .await
        .expect_err("not confirmed");
    assert!(matches!(err, PhraseError::UploadNotConfirmed { .. }));

    let heads = server.await.expect("server");
    assert_eq!(heads.len(), 1, "no DELETE after a failed upload");
}

#[tokio::test]
async fn remove_unmentioned_keys_rejects_empty_upload_id() {
    let client = PhraseClient::new("secret", "http://127.0.0.1:9/api/v2");
    let err = client
        .remove_unmentioned_keys(
            &ProjectId::from("p1"),
            &UploadId::from(""),
            PollPolicy::default(),
        )
        .await
        .expect_err("empty id");
    assert!(matches!(err, PhraseError::InvalidArgument { .. }));
}
