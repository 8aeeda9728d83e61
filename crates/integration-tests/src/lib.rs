//! Integration tests for the TechMart client.
//!
//! Tests drive a real [`AppContext`] against [`FakeBackend`], an axum server
//! bound to `127.0.0.1:0` that records every request and answers from a
//! script. Cart endpoints fall back to a small in-memory cart so mutation
//! sequences can be checked against the backend's own snapshot.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p techmart-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `session` - Bootstrap, login reconciliation, logout, session expiry
//! - `cart` - The cart mutation gateway
//! - `checkout` - Orders, returns, and reviews
//! - `admin` - Back-office endpoints

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;

use techmart_client::{
    ApiClient, AppContext, GuestCartRetention, MemoryStore, RecordingNotifier, SessionStorage,
};
use techmart_core::{Product, UserSummary};

/// One request as the backend saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path relative to `/api`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: String,
    pub authorization: Option<String>,
}

impl RecordedRequest {
    /// First value of query parameter `key`.
    #[must_use]
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Body parsed as JSON, if it is JSON.
    #[must_use]
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }

    fn is(&self, method: &str, path: &str) -> bool {
        self.method == method && self.path == path
    }
}

/// A scripted answer.
#[derive(Debug, Clone)]
pub struct Reply {
    status: u16,
    body: String,
}

impl Reply {
    /// 200 with a JSON body.
    #[must_use]
    pub fn ok(body: &Value) -> Self {
        Self::json(200, body)
    }

    /// Any status with a JSON body.
    #[must_use]
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }

    /// Any status with an empty body.
    #[must_use]
    pub const fn status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(header::CONTENT_TYPE, "application/json")], self.body).into_response()
    }
}

#[derive(Debug)]
struct Script {
    method: String,
    path: String,
    reply: Reply,
    once: bool,
}

#[derive(Debug, Clone, Copy)]
struct FakeLine {
    id: i64,
    product_id: i64,
    quantity: i64,
}

#[derive(Debug)]
struct CartState {
    catalog: BTreeMap<i64, (String, f64)>,
    carts: BTreeMap<String, Vec<FakeLine>>,
    next_line_id: i64,
}

impl Default for CartState {
    fn default() -> Self {
        Self {
            catalog: BTreeMap::new(),
            carts: BTreeMap::new(),
            next_line_id: 100,
        }
    }
}

impl CartState {
    fn snapshot(&self, email: &str) -> Value {
        let lines = self.carts.get(email).map_or(&[][..], Vec::as_slice);
        Value::Array(
            lines
                .iter()
                .map(|line| {
                    let (name, price) = self
                        .catalog
                        .get(&line.product_id)
                        .cloned()
                        .unwrap_or_default();
                    json!({
                        "id": line.id,
                        "productId": line.product_id,
                        "name": name,
                        "price": price,
                        "quantity": line.quantity,
                    })
                })
                .collect(),
        )
    }

    fn add(&mut self, email: &str, product_id: i64, quantity: i64) -> Reply {
        if !self.catalog.contains_key(&product_id) {
            return Reply::json(404, &json!({"message": "Product not found"}));
        }
        if quantity < 1 {
            return Reply::json(400, &json!({"message": "Quantity must be at least 1"}));
        }
        let lines = self.carts.entry(email.to_string()).or_default();
        if let Some(line) = lines.iter_mut().find(|line| line.product_id == product_id) {
            line.quantity += quantity;
        } else {
            lines.push(FakeLine {
                id: self.next_line_id,
                product_id,
                quantity,
            });
            self.next_line_id += 1;
        }
        Reply::status(200)
    }

    fn serve(&mut self, request: &RecordedRequest) -> Reply {
        let Some(email) = request.query("email").map(str::to_string) else {
            return Reply::json(400, &json!({"message": "email is required"}));
        };
        let number = |key: &str| request.query(key).and_then(|value| value.parse::<i64>().ok());
        let rest = request.path.strip_prefix("/cart").unwrap_or_default();

        match (request.method.as_str(), rest) {
            ("GET", "") => Reply::ok(&self.snapshot(&email)),
            ("POST", "/add") => match (number("productId"), number("quantity")) {
                (Some(product_id), Some(quantity)) => self.add(&email, product_id, quantity),
                _ => Reply::status(400),
            },
            ("POST", "/merge") => {
                let entries = request.json().unwrap_or_default();
                for entry in entries.as_array().map_or(&[][..], Vec::as_slice) {
                    let field = |key: &str| entry.get(key).and_then(Value::as_i64).unwrap_or_default();
                    let product_id = field("productId");
                    let quantity = field("quantity");
                    // Unknown products are skipped, as the real merge does
                    let _ = self.add(&email, product_id, quantity);
                }
                Reply::status(200)
            }
            ("DELETE", "/clear") => {
                self.carts.remove(&email);
                Reply::status(200)
            }
            ("PUT", rest) if rest.starts_with("/update/") => {
                let id = rest.trim_start_matches("/update/").parse::<i64>().ok();
                let Some(quantity) = number("quantity").filter(|quantity| *quantity >= 1) else {
                    return Reply::json(400, &json!({"message": "Quantity must be at least 1"}));
                };
                let lines = self.carts.entry(email).or_default();
                match lines.iter_mut().find(|line| Some(line.id) == id) {
                    Some(line) => {
                        line.quantity = quantity;
                        Reply::status(200)
                    }
                    None => Reply::json(404, &json!({"message": "Cart item not found"})),
                }
            }
            ("DELETE", rest) if rest.starts_with("/remove/") => {
                let id = rest.trim_start_matches("/remove/").parse::<i64>().ok();
                let lines = self.carts.entry(email).or_default();
                lines.retain(|line| Some(line.id) != id);
                Reply::status(200)
            }
            _ => Reply::status(404),
        }
    }
}

#[derive(Debug, Default)]
struct Shared {
    requests: Mutex<Vec<RecordedRequest>>,
    scripts: Mutex<Vec<Script>>,
    cart: Mutex<CartState>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    fn reply_to(&self, request: &RecordedRequest) -> Reply {
        {
            let mut scripts = lock(&self.scripts);
            if let Some(index) = scripts
                .iter()
                .position(|script| request.is(&script.method, &script.path))
            {
                let reply = scripts
                    .get(index)
                    .map_or_else(|| Reply::status(500), |script| script.reply.clone());
                if scripts.get(index).is_some_and(|script| script.once) {
                    scripts.remove(index);
                }
                return reply;
            }
        }
        if request.path == "/cart" || request.path.starts_with("/cart/") {
            return lock(&self.cart).serve(request);
        }
        Reply::status(200)
    }
}

async fn handle(
    State(shared): State<Arc<Shared>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path();
    let request = RecordedRequest {
        method: method.to_string(),
        path: path.strip_prefix("/api").unwrap_or(path).to_string(),
        query: uri
            .query()
            .map(|query| {
                url::form_urlencoded::parse(query.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default(),
        body: String::from_utf8_lossy(&body).into_owned(),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
    };
    let reply = shared.reply_to(&request);
    lock(&shared.requests).push(request);
    reply.into_response()
}

/// A recording, scriptable stand-in for the storefront backend.
#[derive(Debug, Clone)]
pub struct FakeBackend {
    origin: Url,
    shared: Arc<Shared>,
}

impl FakeBackend {
    /// Bind to an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener
            .local_addr()
            .expect("Fake backend has no local address");
        let shared = Arc::new(Shared::default());
        let app = Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&shared));

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            origin: Url::parse(&format!("http://{addr}")).expect("Invalid fake backend address"),
            shared,
        }
    }

    /// Origin to configure the client with.
    #[must_use]
    pub const fn origin(&self) -> &Url {
        &self.origin
    }

    /// Make a product known to the in-memory cart.
    pub fn add_product(&self, id: i64, name: &str, price: f64) {
        lock(&self.shared.cart)
            .catalog
            .insert(id, (name.to_string(), price));
    }

    /// Answer every `method path` request with `reply`.
    pub fn respond(&self, method: &str, path: &str, reply: Reply) {
        self.script(method, path, reply, false);
    }

    /// Answer the next `method path` request with `reply`.
    pub fn respond_once(&self, method: &str, path: &str, reply: Reply) {
        self.script(method, path, reply, true);
    }

    fn script(&self, method: &str, path: &str, reply: Reply, once: bool) {
        let script = Script {
            method: method.to_string(),
            path: path.to_string(),
            reply,
            once,
        };
        let mut scripts = lock(&self.shared.scripts);
        if once {
            scripts.insert(0, script);
        } else {
            scripts.push(script);
        }
    }

    /// Every request so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.shared.requests).clone()
    }

    /// Requests for `method path`, oldest first.
    #[must_use]
    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.is(method, path))
            .collect()
    }

    /// Forget recorded requests.
    pub fn clear_requests(&self) {
        lock(&self.shared.requests).clear();
    }

    /// The in-memory cart of `email` as the backend would return it.
    #[must_use]
    pub fn server_cart(&self, email: &str) -> Value {
        lock(&self.shared.cart).snapshot(email)
    }

    /// A client for this backend.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn api(&self, storage: SessionStorage) -> (ApiClient, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        let api = ApiClient::new(&self.origin, storage, notifier.clone())
            .expect("Failed to build API client");
        (api, notifier)
    }

    /// Bootstrap a context over `storage`.
    pub async fn context(
        &self,
        storage: SessionStorage,
        retention: GuestCartRetention,
    ) -> (AppContext, Arc<RecordingNotifier>) {
        let (api, notifier) = self.api(storage);
        (AppContext::bootstrap(api, retention).await, notifier)
    }
}

/// Persisted storage over an inspectable in-memory store.
#[must_use]
pub fn memory_storage() -> (Arc<MemoryStore>, SessionStorage) {
    let store = Arc::new(MemoryStore::default());
    let storage = SessionStorage::new(store.clone());
    (store, storage)
}

/// Storage holding a persisted session for `user`.
///
/// # Panics
///
/// Panics if the in-memory store rejects a write.
#[must_use]
pub fn signed_in_storage(user: &UserSummary) -> (Arc<MemoryStore>, SessionStorage) {
    let (store, storage) = memory_storage();
    storage.set_token(&token()).expect("Failed to persist token");
    storage.set_user(user).expect("Failed to persist user");
    (store, storage)
}

/// The bearer token fixtures sign in with.
#[must_use]
pub fn token() -> SecretString {
    SecretString::from("test-jwt".to_string())
}

/// A customer account.
///
/// # Panics
///
/// Panics if the fixture does not deserialize.
#[must_use]
pub fn customer() -> UserSummary {
    serde_json::from_value(customer_json()).expect("Invalid customer fixture")
}

/// The customer as the backend sends it.
#[must_use]
pub fn customer_json() -> Value {
    json!({
        "id": 3,
        "firstName": "Priya",
        "lastName": "Sharma",
        "email": "priya@techmart.in",
        "role": "CUSTOMER"
    })
}

/// An admin account.
///
/// # Panics
///
/// Panics if the fixture does not deserialize.
#[must_use]
pub fn admin() -> UserSummary {
    serde_json::from_value(admin_json()).expect("Invalid admin fixture")
}

/// The admin as the backend sends it.
#[must_use]
pub fn admin_json() -> Value {
    json!({
        "id": 1,
        "firstName": "Store",
        "lastName": "Admin",
        "email": "admin@techmart.in",
        "role": "ADMIN"
    })
}

/// A catalogue product.
///
/// # Panics
///
/// Panics if the fixture does not deserialize.
#[must_use]
pub fn product(id: i64, name: &str, price: f64) -> Product {
    serde_json::from_value(json!({
        "id": id,
        "name": name,
        "category": "Audio",
        "brand": "Sony",
        "price": price,
        "stock": 25
    }))
    .expect("Invalid product fixture")
}
