//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Bytes,
    extract::Path as UrlPath,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use tempfile::TempDir;
use tokio::net::TcpListener;

use clinic_gateway::{GatewayConfig, HttpServer, Shutdown};

pub const TEST_SECRET: &str = "integration-test-secret";

/// Start a backend that echoes each request back.
///
/// The body is returned unchanged with the inbound content type; the
/// method, URI, Host and content type the backend saw are reported in
/// `x-echo-*` headers. `/api/status/{code}` answers with that status.
pub async fn start_echo_backend() -> SocketAddr {
    let app = Router::new()
        .route("/api/status/{code}", any(status))
        .fallback(echo);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
    let seen = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string()
    };
    let content_type = seen(header::CONTENT_TYPE);

    let mut response = (
        [
            ("x-echo-method", method.to_string()),
            ("x-echo-uri", uri.to_string()),
            ("x-echo-host", seen(header::HOST)),
            ("x-echo-content-type", content_type.clone()),
            ("x-echo-request-id", seen(header::HeaderName::from_static("x-request-id"))),
        ],
        body,
    )
        .into_response();
    if !content_type.is_empty() {
        if let Ok(value) = content_type.parse() {
            response.headers_mut().insert(header::CONTENT_TYPE, value);
        }
    }
    response
}

async fn status(UrlPath(code): UrlPath<u16>) -> Response {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [("x-backend", "status")], format!("status {code}")).into_response()
}

/// Configuration pointing at `backend`, listening on an ephemeral port.
pub fn gateway_config(backend: &str, site_root: &Path) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.backend.url = backend.to_string();
    config.backend.timeout_secs = 5;
    config.auth.jwt_secret = TEST_SECRET.into();
    config.site.root = site_root.display().to_string();
    config
}

/// A running gateway. Dropping it stops the server and removes the site.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub site: TempDir,
    shutdown: Shutdown,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// A site root with a handful of built pages.
pub fn build_site() -> TempDir {
    let site = tempfile::tempdir().unwrap();
    let write = |rel: &str, contents: &str| {
        let path = site.path().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    };
    write("index.html", "login page");
    write("configuracion/index.html", "configuracion page");
    write("dashboardEmpleado/index.html", "employee dashboard");
    write("perfil/index.html", "perfil page");
    write("_astro/app.js", "console.log('app')");
    site
}

/// Start a gateway in front of `backend` (e.g. `http://127.0.0.1:1234`).
pub async fn start_gateway(backend: &str) -> TestGateway {
    start_gateway_with(backend, |_| {}).await
}

pub async fn start_gateway_with(
    backend: &str,
    customize: impl FnOnce(&mut GatewayConfig),
) -> TestGateway {
    let site = build_site();
    let mut config = gateway_config(backend, site.path());
    customize(&mut config);

    let server = HttpServer::new(&config).unwrap();
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        server.run(listener, rx).await.unwrap();
    });

    TestGateway { addr, site, shutdown }
}

/// Client that reports redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

fn now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs()
}

/// Session token for `role`, valid for an hour.
pub fn token_for_role(role: i64) -> String {
    sign(json!({ "idrol": role, "exp": now() + 3600 }))
}

/// Session token that expired an hour ago.
pub fn expired_token(role: i64) -> String {
    sign(json!({ "idrol": role, "exp": now() - 3600 }))
}

pub fn sign(claims: serde_json::Value) -> String {
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn session_cookie(token: &str) -> String {
    format!("auth_token={token}")
}
