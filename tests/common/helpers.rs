#![allow(dead_code)]

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use hubfetch::downloader::{Fetcher, TaskProgress, TaskState};
use hubfetch::hub::{Dialect, Hub};
use hubfetch::product::ProductRecord;
use hubfetch::progress::{ProgressBarOpts, StyleOptions};
use hubfetch::Error;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

pub const TEST_USER: &str = "hub-user";
pub const TEST_PASSWORD: &str = "hub-secret";
pub const TEST_USER_AGENT: &str = "hubfetch-test-agent";

/// Creates a temporary directory for testing purposes
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Creates a temporary file with the given content
pub fn create_temp_file(dir: &Path, filename: &str, content: &[u8]) -> PathBuf {
    let file_path = dir.join(filename);
    fs::write(&file_path, content).expect("Failed to write temporary file");
    file_path
}

/// Asserts that a file exists at the given path
pub fn assert_file_exists(path: &Path) {
    assert!(path.exists(), "File should exist at path: {:?}", path);
}

/// Builds an in-memory ZIP archive from `(name, content)` pairs
pub fn create_zip(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        zip.start_file(*name, zip::write::FileOptions::default())
            .expect("Failed to start zip entry");
        zip.write_all(content.as_bytes())
            .expect("Failed to write zip entry");
    }
    zip.finish().expect("Failed to finish zip").into_inner()
}

/// Creates disabled style options for testing
pub fn create_disabled_style_options() -> StyleOptions {
    StyleOptions::new(ProgressBarOpts::hidden(), ProgressBarOpts::hidden())
}

/// Title of the `i`-th catalogue entry
pub fn title(i: usize) -> String {
    format!("S3A_SL_2_LST____2024{:04}", i)
}

/// Creates a record for a hub nobody will contact
pub fn create_test_record(name: &str) -> ProductRecord {
    let hub = Arc::new(Hub::new(
        "offline",
        "http://127.0.0.1:9",
        TEST_USER,
        TEST_PASSWORD,
        Dialect::OData,
    ));
    ProductRecord::new(name, name, "unused", hub)
}

// === Mock hub ===

/// A product payload served by the mock hub.
#[derive(Debug, Clone)]
pub struct Payload {
    pub body: Vec<u8>,
    pub disposition: Option<String>,
}

impl Payload {
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            disposition: None,
        }
    }

    pub fn named(body: impl Into<Vec<u8>>, filename: &str) -> Self {
        Self {
            body: body.into(),
            disposition: Some(format!("attachment; filename=\"{}\"", filename)),
        }
    }
}

/// In-process catalogue answering in one dialect.
///
/// Entry `i` has id `id-{i}`; product downloads are looked up by id.
#[derive(Debug, Default)]
pub struct MockHub {
    pub dialect: Dialect,
    pub titles: Vec<String>,
    pub payloads: HashMap<String, Payload>,
    pub fail_at_skip: Option<usize>,
    pub report_total: bool,
    pub page_skips: Mutex<Vec<usize>>,
    pub search_params: Mutex<Vec<HashMap<String, String>>>,
    pub authorizations: Mutex<Vec<String>>,
    pub user_agents: Mutex<Vec<String>>,
    pub downloads: AtomicUsize,
}

impl MockHub {
    pub fn new(dialect: Dialect, titles: Vec<String>) -> Self {
        Self {
            dialect,
            titles,
            ..MockHub::default()
        }
    }

    pub fn with_catalogue_size(dialect: Dialect, size: usize) -> Self {
        Self::new(dialect, (0..size).map(title).collect())
    }

    pub fn payload(mut self, id: &str, payload: Payload) -> Self {
        self.payloads.insert(id.to_string(), payload);
        self
    }

    pub fn fail_at_skip(mut self, skip: usize) -> Self {
        self.fail_at_skip = Some(skip);
        self
    }

    pub fn page_skips(&self) -> Vec<usize> {
        self.page_skips.lock().unwrap().clone()
    }

    fn page(&self, params: &HashMap<String, String>) -> Response {
        let number = |keys: &[&str], default: usize| {
            keys.iter()
                .find_map(|k| params.get(*k))
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        };
        let skip = number(&["$skip", "start"], 0);
        let top = number(&["$top", "rows"], 100);
        self.page_skips.lock().unwrap().push(skip);
        self.search_params.lock().unwrap().push(params.clone());

        if self.fail_at_skip == Some(skip) {
            return (StatusCode::INTERNAL_SERVER_ERROR, "catalogue unavailable").into_response();
        }

        let entries: Vec<(String, String)> = self
            .titles
            .iter()
            .enumerate()
            .skip(skip)
            .take(top)
            .map(|(i, t)| (format!("id-{}", i), t.clone()))
            .collect();

        let body = match self.dialect {
            Dialect::OData => json!({
                "d": { "results": entries.iter().map(|(id, t)| json!({"Id": id, "Name": t})).collect::<Vec<_>>() }
            }),
            Dialect::OpenSearch => {
                let mut items: Vec<_> = entries
                    .iter()
                    .map(|(id, t)| json!({"id": id, "title": t}))
                    .collect();
                let mut feed = serde_json::Map::new();
                if self.report_total {
                    feed.insert(
                        "opensearch:totalResults".into(),
                        json!(self.titles.len().to_string()),
                    );
                }
                match items.len() {
                    0 => {}
                    1 => {
                        feed.insert("entry".into(), items.remove(0));
                    }
                    _ => {
                        feed.insert("entry".into(), json!(items));
                    }
                }
                json!({ "feed": feed })
            }
            Dialect::Onda => json!({
                "value": entries.iter().map(|(id, t)| json!({"id": id, "name": t})).collect::<Vec<_>>()
            }),
        };
        axum::Json(body).into_response()
    }

    fn product(&self, id: &str) -> Response {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        match self.payloads.get(id) {
            Some(payload) => {
                let mut builder = Response::builder()
                    .status(StatusCode::OK)
                    .header(header::CONTENT_TYPE, "application/octet-stream");
                if let Some(ref disposition) = payload.disposition {
                    builder = builder.header(header::CONTENT_DISPOSITION, disposition.as_str());
                }
                builder
                    .body(Body::from(payload.body.clone()))
                    .expect("Failed to build response")
            }
            None => (StatusCode::NOT_FOUND, "no such product").into_response(),
        }
    }
}

/// Extracts the product id from `.../Products('{id}')/$value` or `.../Products({id})/$value`
fn product_id(path: &str) -> Option<&str> {
    let inner = path.strip_suffix("/$value")?;
    let start = inner.rfind("Products(")? + "Products(".len();
    inner[start..].strip_suffix(')').map(|id| id.trim_matches('\''))
}

async fn handle(State(hub): State<Arc<MockHub>>, uri: Uri, headers: HeaderMap) -> Response {
    if let Some(auth) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        hub.authorizations.lock().unwrap().push(auth.to_string());
    }
    if let Some(agent) = headers.get(header::USER_AGENT).and_then(|v| v.to_str().ok()) {
        hub.user_agents.lock().unwrap().push(agent.to_string());
    }

    let path = uri.path();
    if let Some(id) = product_id(path) {
        return hub.product(id);
    }

    let params: HashMap<String, String> =
        form_urlencoded::parse(uri.query().unwrap_or_default().as_bytes())
            .into_owned()
            .collect();
    match path {
        "/odata/v1/Products" | "/search" | "/Products" => hub.page(&params),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Serves `mock` on an ephemeral local port and returns a [`Hub`] pointing at it.
pub async fn serve(mock: MockHub) -> (Hub, Arc<MockHub>) {
    let dialect = mock.dialect;
    let mock = Arc::new(mock);
    let app = Router::new().fallback(handle).with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock hub");
    let addr = listener.local_addr().expect("Mock hub has no address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Mock hub failed");
    });

    let hub = Hub::new(
        "mock",
        format!("http://{}", addr),
        TEST_USER,
        TEST_PASSWORD,
        dialect,
    );
    (hub, mock)
}

// === Simulated transport ===

#[derive(Debug, Default)]
struct SimulatedState {
    delay: Duration,
    size: u64,
    failing: HashSet<String>,
    started: Mutex<Vec<String>>,
    running: AtomicUsize,
    peak: AtomicUsize,
}

/// [`Fetcher`] that takes `delay` per product without touching the network or disk.
#[derive(Debug, Clone, Default)]
pub struct SimulatedFetcher {
    state: Arc<SimulatedState>,
}

impl SimulatedFetcher {
    pub fn new(delay: Duration, size: u64) -> Self {
        Self::failing(delay, size, &[])
    }

    /// Products named in `failing` end with a stream error.
    pub fn failing(delay: Duration, size: u64, failing: &[&str]) -> Self {
        Self {
            state: Arc::new(SimulatedState {
                delay,
                size,
                failing: failing.iter().map(|s| s.to_string()).collect(),
                ..SimulatedState::default()
            }),
        }
    }

    /// Product names in the order their transfer started.
    pub fn started(&self) -> Vec<String> {
        self.state.started.lock().unwrap().clone()
    }

    /// Highest number of transfers observed running at once.
    pub fn peak(&self) -> usize {
        self.state.peak.load(Ordering::SeqCst)
    }
}

impl Fetcher for SimulatedFetcher {
    async fn fetch(&self, record: &mut ProductRecord, progress: &TaskProgress) -> hubfetch::Result<()> {
        let state = &self.state;
        state.started.lock().unwrap().push(record.name.clone());
        let running = state.running.fetch_add(1, Ordering::SeqCst) + 1;
        state.peak.fetch_max(running, Ordering::SeqCst);

        record.expected_size = state.size;
        progress.set_expected_size(state.size);
        progress.transition(TaskState::Streaming);

        for _ in 0..4 {
            tokio::time::sleep(state.delay / 4).await;
            progress.advance(state.size / 4);
        }
        state.running.fetch_sub(1, Ordering::SeqCst);

        if state.failing.contains(&record.name) {
            return Err(Error::Stream {
                product: record.name.clone(),
                message: "connection reset by peer".into(),
            });
        }
        Ok(())
    }
}
