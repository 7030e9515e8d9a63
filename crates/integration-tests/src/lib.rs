//! Integration tests for Kasir.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p kasir-integration-tests
//! ```
//!
//! No external services are needed: every test starts a [`MockBackend`], an
//! in-process stand-in for `json-server` serving the `categories`,
//! `products` and `cart` collections on a random local port. The mock logs
//! every request and can inject failures and latency.
//!
//! # Test Categories
//!
//! - `api_client` - REST operations of `KasirApi`
//! - `connection` - Endpoint resolution, retries and port scanning
//! - `page` - The cashier screen controller
//! - `routes` - The front-end router, driven with `tower::ServiceExt::oneshot`

use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::{Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, put},
};
use kasir_web::config::{ApiConfig, KasirConfig, PortScan, RetryPolicy};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

/// A request received by the mock backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
}

impl LoggedRequest {
    /// Whether this is a `method` request for exactly `path`.
    #[must_use]
    pub fn is(&self, method: &Method, path: &str) -> bool {
        self.method == *method && self.path == path
    }
}

/// Collections served by the mock backend.
#[derive(Debug, Default)]
pub struct Db {
    pub categories: Vec<Value>,
    pub products: Vec<Value>,
    pub cart: Vec<Value>,
}

impl Db {
    /// Two categories and three products, with an empty cart.
    #[must_use]
    pub fn seeded() -> Self {
        Self {
            categories: vec![
                json!({ "id": 1, "name": "Makanan", "icon": "fas fa-utensils" }),
                json!({ "id": 2, "name": "Minuman", "icon": "fas fa-mug-hot" }),
            ],
            products: vec![
                json!({
                    "id": 1,
                    "nama": "Nasi Goreng",
                    "harga": 25000,
                    "kode": "MKN-001",
                    "gambar": "/images/products/nasi-goreng.jpg",
                    "kategori": 1
                }),
                json!({
                    "id": 2,
                    "nama": "Mie Ayam",
                    "harga": 20000,
                    "kode": "MKN-002",
                    "gambar": "",
                    "kategori": 1
                }),
                json!({
                    "id": 3,
                    "nama": "Es Teh",
                    "harga": 5000,
                    "kode": "MNM-001",
                    "gambar": "",
                    "kategori": 2
                }),
            ],
            cart: Vec::new(),
        }
    }
}

#[derive(Default)]
struct MockState {
    db: Mutex<Db>,
    next_cart_id: Mutex<i64>,
    string_ids: AtomicBool,
    log: Mutex<Vec<LoggedRequest>>,
    failing_reads: Mutex<HashSet<String>>,
    failing_deletes: Mutex<HashSet<String>>,
    product_delays: Mutex<HashMap<Option<String>, Duration>>,
}

impl MockState {
    fn take_cart_id(&self) -> i64 {
        let mut next = lock(&self.next_cart_id);
        let id = *next;
        *next += 1;
        id
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A number or string reference as text, the way `json-server` matches it.
fn key(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

fn record_key(record: &Value) -> Option<String> {
    record.get("id").and_then(key)
}

// =============================================================================
// MockBackend
// =============================================================================

/// In-process `json-server` stand-in. Stops when dropped.
pub struct MockBackend {
    addr: SocketAddr,
    state: Arc<MockState>,
    server: JoinHandle<()>,
}

impl MockBackend {
    /// Start a backend with [`Db::seeded`] data.
    pub async fn start() -> Self {
        Self::with_db(Db::seeded()).await
    }

    /// Start a backend serving `db`.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn with_db(db: Db) -> Self {
        let next_cart_id = db
            .cart
            .iter()
            .filter_map(|record| record.get("id").and_then(Value::as_i64))
            .max()
            .unwrap_or(0)
            + 1;
        let state = Arc::new(MockState {
            db: Mutex::new(db),
            next_cart_id: Mutex::new(next_cart_id),
            ..MockState::default()
        });

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().expect("Mock backend has no address");

        let app = router(Arc::clone(&state));
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            server,
        }
    }

    #[must_use]
    pub const fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Base URL of the backend.
    ///
    /// # Panics
    ///
    /// Never in practice; the address is always a valid URL.
    #[must_use]
    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).expect("Mock backend URL is valid")
    }

    /// Client settings pointing at this backend, with short retry delays.
    #[must_use]
    pub fn api_config(&self) -> ApiConfig {
        fast_api_config(self.url(), self.port())
    }

    /// Front-end settings pointing at this backend.
    #[must_use]
    pub fn kasir_config(&self) -> KasirConfig {
        kasir_config(self.api_config())
    }

    /// Every request received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<LoggedRequest> {
        lock(&self.state.log).clone()
    }

    /// Forget the requests received so far.
    pub fn clear_requests(&self) {
        lock(&self.state.log).clear();
    }

    /// Number of `method` requests for exactly `path`.
    #[must_use]
    pub fn count(&self, method: &Method, path: &str) -> usize {
        lock(&self.state.log)
            .iter()
            .filter(|request| request.is(method, path))
            .count()
    }

    /// Current cart records as stored.
    #[must_use]
    pub fn cart(&self) -> Vec<Value> {
        lock(&self.state.db).cart.clone()
    }

    /// Insert a cart record directly with a numeric id and return the id.
    pub fn seed_cart(&self, mut record: Value) -> i64 {
        let id = self.state.take_cart_id();
        if let Some(object) = record.as_object_mut() {
            object.insert("id".to_string(), json!(id));
        }
        lock(&self.state.db).cart.push(record);
        id
    }

    /// Answer `GET path` with 500 from now on.
    pub fn fail_reads(&self, path: &str) {
        lock(&self.state.failing_reads).insert(path.to_string());
    }

    /// Give records created through `POST /cart` short string ids
    /// (`"9f31"`, `"9f32"`, ...), as `json-server` 1.x does.
    pub fn use_string_ids(&self) {
        self.state.string_ids.store(true, Ordering::SeqCst);
    }

    /// Answer `DELETE /cart/{id}` with 500 from now on.
    pub fn fail_delete(&self, id: impl Display) {
        lock(&self.state.failing_deletes).insert(id.to_string());
    }

    /// Delay product list answers for `category` (`None` = all products).
    pub fn delay_products(&self, category: Option<i64>, delay: Duration) {
        lock(&self.state.product_delays).insert(category.map(|id| id.to_string()), delay);
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// A local port with nothing listening on it.
///
/// # Panics
///
/// Panics if no local port can be bound.
pub async fn unused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind probe port");
    listener
        .local_addr()
        .expect("Probe listener has no address")
        .port()
}

/// Client settings for a backend at `base_url`, scanning only `scan_port`
/// and retrying quickly.
#[must_use]
pub fn fast_api_config(base_url: Url, scan_port: u16) -> ApiConfig {
    ApiConfig {
        timeout: Duration::from_secs(2),
        retry: RetryPolicy {
            max_attempts: 3,
            delay: Duration::from_millis(10),
            backoff: 1,
        },
        scan: PortScan {
            start_port: scan_port,
            span: 1,
        },
        ..ApiConfig::new(base_url)
    }
}

/// Client settings for a local port where nothing listens.
///
/// # Panics
///
/// Never in practice; the address is always a valid URL.
pub async fn dead_api_config() -> ApiConfig {
    let port = unused_port().await;
    let url = Url::parse(&format!("http://127.0.0.1:{port}")).expect("Dead URL is valid");
    fast_api_config(url, port)
}

/// Front-end settings around `api`, serving the web crate's static assets.
#[must_use]
pub fn kasir_config(api: ApiConfig) -> KasirConfig {
    KasirConfig {
        host: [127, 0, 0, 1].into(),
        port: 0,
        static_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../web/static")),
        api,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

// =============================================================================
// Handlers
// =============================================================================

fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/products", get(list_products))
        .route("/cart", get(list_cart).post(create_cart_item))
        .route("/cart/{id}", put(replace_cart_item).delete(delete_cart_item))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            log_request,
        ))
        .with_state(state)
}

async fn log_request(
    State(state): State<Arc<MockState>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    lock(&state.log).push(LoggedRequest {
        method: request.method().clone(),
        path: path.clone(),
        query: request.uri().query().map(String::from),
    });

    if *request.method() == Method::GET && lock(&state.failing_reads).contains(&path) {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({}))).into_response();
    }

    next.run(request).await
}

async fn list_categories(State(state): State<Arc<MockState>>) -> Json<Vec<Value>> {
    Json(lock(&state.db).categories.clone())
}

async fn list_products(
    State(state): State<Arc<MockState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Vec<Value>> {
    let category = query
        .get("kategori")
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty());

    let delay = lock(&state.product_delays).get(&category).copied();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let products = lock(&state.db)
        .products
        .iter()
        .filter(|product| {
            category
                .as_ref()
                .is_none_or(|id| product.get("kategori").and_then(key).as_ref() == Some(id))
        })
        .cloned()
        .collect();
    Json(products)
}

async fn list_cart(State(state): State<Arc<MockState>>) -> Json<Vec<Value>> {
    Json(lock(&state.db).cart.clone())
}

async fn create_cart_item(
    State(state): State<Arc<MockState>>,
    Json(mut record): Json<Value>,
) -> Response {
    let Some(object) = record.as_object_mut() else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    let n = state.take_cart_id();
    let id = if state.string_ids.load(Ordering::SeqCst) {
        json!(format!("{:x}", 0x9f30 + n))
    } else {
        json!(n)
    };
    object.insert("id".to_string(), id);

    lock(&state.db).cart.push(record.clone());
    (StatusCode::CREATED, Json(record)).into_response()
}

async fn replace_cart_item(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    Json(mut record): Json<Value>,
) -> Response {
    let mut db = lock(&state.db);
    let Some(existing) = db
        .cart
        .iter_mut()
        .find(|item| record_key(item).as_deref() == Some(id.as_str()))
    else {
        return (StatusCode::NOT_FOUND, Json(json!({}))).into_response();
    };

    // The stored id keeps its type, number or string
    let stored_id = existing.get("id").cloned().unwrap_or(Value::Null);
    let Some(object) = record.as_object_mut() else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    object.insert("id".to_string(), stored_id);

    *existing = record.clone();
    Json(record).into_response()
}

async fn delete_cart_item(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
) -> Response {
    if lock(&state.failing_deletes).contains(&id) {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({}))).into_response();
    }

    let mut db = lock(&state.db);
    let before = db.cart.len();
    db.cart
        .retain(|item| record_key(item).as_deref() != Some(id.as_str()));

    if db.cart.len() == before {
        (StatusCode::NOT_FOUND, Json(json!({}))).into_response()
    } else {
        Json(json!({})).into_response()
    }
}
