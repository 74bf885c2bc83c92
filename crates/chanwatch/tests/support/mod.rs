//! Scripted axum test server and event recorder shared by the integration
//! tests.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::Value;
use tokio::sync::Notify;

use chanwatch::{Handler, ListenerContext, Update, WatchEvent};

/// One canned response.
#[derive(Clone)]
pub enum Scripted {
    /// Status plus JSON body.
    Json(StatusCode, Value),
    /// Bare status, no body.
    Status(StatusCode),
}

struct RouteLog {
    hits: AtomicUsize,
    headers: Mutex<Vec<Option<String>>>,
    script: Mutex<VecDeque<Scripted>>,
}

struct ServerState {
    routes: HashMap<String, Arc<RouteLog>>,
    gate: Option<Arc<Notify>>,
}

/// Test server that plays back per-path response scripts and records the
/// `If-Modified-Since` header of every request. Once a path's script is
/// exhausted it answers 304, simulating an unchanged resource.
pub struct TestServer {
    pub base_url: String,
    routes: HashMap<String, Arc<RouteLog>>,
    gate: Option<Arc<Notify>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Starts a server scripting a single path.
    pub async fn start(path: &str, script: Vec<Scripted>) -> Self {
        Self::start_inner(vec![(path, script)], false).await
    }

    /// Starts a server scripting several paths at once.
    pub async fn start_routes(routes: Vec<(&str, Vec<Scripted>)>) -> Self {
        Self::start_inner(routes, false).await
    }

    /// Starts a server that holds every response until [`TestServer::release`]
    /// is called. The request is still logged on arrival.
    pub async fn start_gated(path: &str, script: Vec<Scripted>) -> Self {
        Self::start_inner(vec![(path, script)], true).await
    }

    async fn start_inner(routes: Vec<(&str, Vec<Scripted>)>, gated: bool) -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let routes: HashMap<String, Arc<RouteLog>> = routes
            .into_iter()
            .map(|(path, script)| {
                (
                    path.to_string(),
                    Arc::new(RouteLog {
                        hits: AtomicUsize::new(0),
                        headers: Mutex::new(Vec::new()),
                        script: Mutex::new(script.into()),
                    }),
                )
            })
            .collect();
        let gate = gated.then(|| Arc::new(Notify::new()));
        let state = Arc::new(ServerState {
            routes: routes.clone(),
            gate: gate.clone(),
        });

        let app = Router::new().fallback(respond).with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        let addr: SocketAddr = listener.local_addr().expect("listener addr");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve test server");
        });

        Self {
            base_url: format!("http://{addr}"),
            routes,
            gate,
            _handle: handle,
        }
    }

    /// Lets one held response through.
    pub fn release(&self) {
        self.gate
            .as_ref()
            .expect("release requires a gated server")
            .notify_one();
    }

    /// Requests served (or, for a gated server, received) on `path`.
    pub fn hits(&self, path: &str) -> usize {
        self.route(path).hits.load(Ordering::SeqCst)
    }

    /// Recorded `If-Modified-Since` headers for `path`, in request order.
    pub fn headers(&self, path: &str) -> Vec<Option<String>> {
        self.route(path).headers.lock().unwrap().clone()
    }

    /// Waits until `path` has received at least `n` requests.
    pub async fn wait_hits(&self, path: &str, n: usize) {
        for _ in 0..20_000 {
            if self.hits(path) >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        panic!("timed out waiting for {n} hits on {path} (got {})", self.hits(path));
    }

    fn route(&self, path: &str) -> &Arc<RouteLog> {
        self.routes
            .get(path)
            .unwrap_or_else(|| panic!("no script registered for {path}"))
    }
}

async fn respond(
    State(state): State<Arc<ServerState>>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let Some(log) = state.routes.get(uri.path()) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    log.hits.fetch_add(1, Ordering::SeqCst);
    log.headers.lock().unwrap().push(
        headers
            .get(header::IF_MODIFIED_SINCE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
    );

    if let Some(gate) = &state.gate {
        gate.notified().await;
    }

    let next = log.script.lock().unwrap().pop_front();
    match next {
        Some(Scripted::Json(status, body)) => (status, axum::Json(body)).into_response(),
        Some(Scripted::Status(status)) => status.into_response(),
        None => StatusCode::NOT_MODIFIED.into_response(),
    }
}

/// Builds a catalog payload: one entry per page, each a list of thread
/// numbers.
pub fn catalog(pages: &[&[u64]]) -> Value {
    Value::Array(
        pages
            .iter()
            .enumerate()
            .map(|(i, nos)| {
                serde_json::json!({
                    "page": i + 1,
                    "threads": nos
                        .iter()
                        .map(|no| serde_json::json!({ "no": no }))
                        .collect::<Vec<_>>(),
                })
            })
            .collect(),
    )
}

/// Builds a thread payload from post numbers.
pub fn thread(nos: &[u64]) -> Value {
    serde_json::json!({
        "posts": nos
            .iter()
            .map(|no| serde_json::json!({ "no": no }))
            .collect::<Vec<_>>(),
    })
}

/// A delivered event reduced to something comparable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Threads(Vec<u64>),
    Posts(Vec<u64>),
    Error(String),
}

/// Handler that records every delivered event.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<Recorded>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Recorded> {
        self.events.lock().unwrap().clone()
    }

    /// Waits until at least `n` events have been delivered.
    pub async fn wait_for(&self, n: usize) {
        for _ in 0..20_000 {
            if self.events().len() >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        panic!("timed out waiting for {n} events (got {:?})", self.events());
    }
}

#[async_trait::async_trait]
impl Handler for Recorder {
    async fn handle(&self, _context: &ListenerContext, event: WatchEvent) {
        let recorded = match event {
            WatchEvent::Update(Update::Threads(threads)) => {
                Recorded::Threads(threads.iter().map(|thread| thread.no).collect())
            }
            WatchEvent::Update(Update::Posts(posts)) => {
                Recorded::Posts(posts.iter().map(|post| post.no).collect())
            }
            WatchEvent::Error(error) => Recorded::Error(error.to_string()),
        };
        self.events.lock().unwrap().push(recorded);
    }
}
