#![allow(dead_code)]

use axum::extract::ConnectInfo;
use axum_test::TestServer;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::Layer;

use shortlink_resolver::domain::click_recorder::{ClickReceiver, click_queue};
use shortlink_resolver::infrastructure::memory::{
    MemoryClickRepository, MemoryLinkRepository, MemoryTokenRepository,
};
use shortlink_resolver::routes::service_router;
use shortlink_resolver::state::{AppState, ServiceSettings};

pub const TEST_SECRET: &str = "test-signing-secret";
pub const DEFAULT_DOMAIN: &str = "sho.rt";

/// In-memory application with handles on its stores and click queue.
pub struct TestApp {
    pub state: AppState,
    pub clicks: ClickReceiver,
    pub links: Arc<MemoryLinkRepository>,
    pub click_store: Arc<MemoryClickRepository>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_queue_capacity(128)
    }

    pub fn with_queue_capacity(capacity: usize) -> Self {
        let links = Arc::new(MemoryLinkRepository::new());
        let click_store = Arc::new(MemoryClickRepository::new());
        let tokens = Arc::new(MemoryTokenRepository::new());
        let (recorder, clicks) = click_queue(capacity);

        let settings = ServiceSettings {
            default_domain: DEFAULT_DOMAIN.to_string(),
            token_signing_secret: TEST_SECRET.to_string(),
            ..ServiceSettings::default()
        };

        let state = AppState::new(
            links.clone(),
            click_store.clone(),
            tokens,
            recorder,
            &settings,
        );

        Self {
            state,
            clicks,
            links,
            click_store,
        }
    }

    /// Issues an API token for `owner` and returns the raw value.
    pub async fn token_for(&self, owner: &str) -> String {
        let (_, raw) = self.state.auth_service.issue_token(owner).await.unwrap();
        raw
    }

    pub fn server(&self) -> TestServer {
        self.server_from("127.0.0.1:12345")
    }

    /// Test server whose requests appear to come from `peer`.
    pub fn server_from(&self, peer: &str) -> TestServer {
        let app = service_router(self.state.clone()).layer(MockConnectInfoLayer::new(peer));
        TestServer::new(app).unwrap()
    }
}

/// Inserts a fixed `ConnectInfo` into every request.
#[derive(Clone)]
pub struct MockConnectInfoLayer {
    addr: SocketAddr,
}

impl MockConnectInfoLayer {
    pub fn new(addr: &str) -> Self {
        Self {
            addr: addr.parse().unwrap(),
        }
    }
}

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService {
            inner,
            addr: self.addr,
        }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
    addr: SocketAddr,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        req.extensions_mut().insert(ConnectInfo(self.addr));
        self.inner.call(req)
    }
}

// ─── PostgreSQL fixtures ─────────────────────────────────────────────────────

pub async fn insert_link(pool: &PgPool, domain: Option<&str>, code: &str, url: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO links (short_code, domain, destination_url) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(code)
    .bind(domain)
    .bind(url)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn insert_limited_link(
    pool: &PgPool,
    code: &str,
    max_clicks: Option<i64>,
    expires_at: Option<DateTime<Utc>>,
    is_one_time: bool,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO links (short_code, destination_url, max_clicks, expires_at, is_one_time)
         VALUES ($1, 'https://example.com', $2, $3, $4) RETURNING id",
    )
    .bind(code)
    .bind(max_clicks)
    .bind(expires_at)
    .bind(is_one_time)
    .fetch_one(pool)
    .await
    .unwrap()
}
