// ReqScope - tests/e2e_http_source.rs
//
// End-to-end tests for the HTTP log source against a fake backend.
//
// The backend is a wiremock server speaking the same two endpoints as the
// real one: `GET /api/logs/files[?latest=<name>]` and `GET /logs/<name>`.
// The blocking reqwest client must not run on a tokio worker thread, so every
// source call goes through `spawn_blocking`.

use reqscope::app::poller::{poll_once, PollCursor};
use reqscope::app::source::{HttpLogSource, LogSource};
use reqscope::core::model::PollProgress;
use reqscope::util::error::SourceError;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

/// Matches listing requests that carry no `latest` parameter.
struct NoLatestParam;

impl Match for NoLatestParam {
    fn matches(&self, request: &Request) -> bool {
        !request.url.query_pairs().any(|(k, _)| k == "latest")
    }
}

fn record(ts: &str, url: &str) -> serde_json::Value {
    json!({
        "timestamp": ts,
        "method": "POST",
        "full-url": url,
        "path": "api/login",
        "headers": {"Content-Type": "application/json"},
        "body": {"user": "alice"},
        "response": {
            "status_code": 200,
            "headers": {"Content-Type": "text/html"},
            "body": "<html><body><p>ok</p></body></html>"
        },
        "cost": 0.12
    })
}

/// Build the source on a blocking thread and run `f` there.
async fn with_source<T, F>(server: &MockServer, f: F) -> T
where
    T: Send + 'static,
    F: FnOnce(HttpLogSource) -> T + Send + 'static,
{
    let uri = server.uri();
    tokio::task::spawn_blocking(move || {
        let source = HttpLogSource::new(&uri, Duration::from_secs(5)).unwrap();
        f(source)
    })
    .await
    .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn e2e_lists_files_from_array_and_object_shapes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/logs/files"))
        .and(NoLatestParam)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["1_a.json", "2_b.json"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/logs/files"))
        .and(query_param("latest", "1_a.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"files": ["2_b.json"]})))
        .mount(&server)
        .await;

    let (all, newer) = with_source(&server, |source| {
        (
            source.list_files(None).unwrap(),
            source.list_files(Some("1_a.json")).unwrap(),
        )
    })
    .await;

    assert_eq!(all, vec!["1_a.json".to_string(), "2_b.json".to_string()]);
    assert_eq!(newer, vec!["2_b.json".to_string()]);
}

#[tokio::test(flavor = "multi_thread")]
async fn e2e_fetches_and_decodes_a_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/logs/1714557600000_1.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(record("2024-05-01T10:00:00.5", "http://localhost:3000/api/login")),
        )
        .mount(&server)
        .await;

    let entry = with_source(&server, |source| source.fetch_entry("1714557600000_1.json"))
        .await
        .unwrap();

    assert_eq!(entry.id(), "2024-05-01T10:00:00.5");
    assert_eq!(entry.method, "POST");
    assert_eq!(entry.full_url, "http://localhost:3000/api/login");
    assert_eq!(entry.response.status_code, Some(200));
    assert_eq!(entry.cost, Some(0.12));
}

#[tokio::test(flavor = "multi_thread")]
async fn e2e_error_status_and_bad_body_are_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/logs/files"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/logs/1_bad.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{ truncated"))
        .mount(&server)
        .await;

    let (listing, fetch) = with_source(&server, |source| {
        (source.list_files(None), source.fetch_entry("1_bad.json"))
    })
    .await;

    assert!(matches!(listing, Err(SourceError::Status { status: 500, .. })));
    assert!(matches!(fetch, Err(SourceError::Decode { .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn e2e_poll_cycle_against_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/logs/files"))
        .and(NoLatestParam)
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!(["2_b.json", "1_a.json", "3_gone.json"])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/logs/files"))
        .and(query_param("latest", "3_gone.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/logs/1_a.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(record("2024-05-01T10:00:01", "http://h/a")),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/logs/2_b.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(record("2024-05-01T10:00:02", "http://h/b")),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/logs/3_gone.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (first, second) = with_source(&server, |source| {
        let mut cursor = PollCursor::new();
        let first = poll_once(&source, &mut cursor);
        let second = poll_once(&source, &mut cursor);
        (first, second)
    })
    .await;

    // The missing file is reported and dropped; the rest arrive in time order.
    assert!(first.iter().any(
        |m| matches!(m, PollProgress::FetchWarning { file, .. } if file == "3_gone.json")
    ));
    match first.last() {
        Some(PollProgress::NewEntries { entries }) => {
            let urls: Vec<&str> = entries.iter().map(|e| e.full_url.as_str()).collect();
            assert_eq!(urls, vec!["http://h/a", "http://h/b"]);
        }
        other => panic!("expected NewEntries, got {other:?}"),
    }

    // Second tick asks for files after the newest known name and finds none.
    assert!(matches!(second.as_slice(), [PollProgress::Idle]));
}
