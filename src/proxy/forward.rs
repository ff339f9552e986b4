//! Forwarding of API traffic to the backend origin.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{Request, State},
    http::Uri,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{debug, error, warn};
use url::Url;

use crate::config::GatewayConfig;
use crate::http::request::request_id;
use crate::http::response::ProxyFailure;
use crate::observability::metrics;
use crate::proxy::body::OutboundBody;
use crate::proxy::headers::{forward_request_headers, relay_response_headers};
use crate::routing::{Matcher, MountMatcher};

/// Error building the proxy.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("backend url `{url}` is invalid: {source}")]
    Origin {
        url: String,
        source: url::ParseError,
    },

    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Relays requests under the API prefix to one backend origin.
#[derive(Debug, Clone)]
pub struct BackendProxy {
    client: reqwest::Client,
    origin: Url,
    mount: MountMatcher,
    max_body_bytes: usize,
}

impl BackendProxy {
    pub fn from_config(config: &GatewayConfig) -> Result<Self, ProxyError> {
        let origin = Url::parse(&config.backend.url).map_err(|source| ProxyError::Origin {
            url: config.backend.url.clone(),
            source,
        })?;

        if config.backend.insecure_tls {
            warn!(
                backend = %origin,
                "TLS certificate verification disabled for backend traffic"
            );
        }

        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.backend.insecure_tls)
            .timeout(Duration::from_secs(config.backend.timeout_secs))
            .connect_timeout(Duration::from_secs(config.backend.connect_timeout_secs))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            origin,
            mount: MountMatcher::new(config.proxy.api_prefix.as_str()),
            max_body_bytes: config.proxy.max_body_bytes,
        })
    }

    /// The API prefix this proxy serves, without a trailing slash.
    pub fn mount(&self) -> &str {
        self.mount.prefix()
    }

    pub fn handles(&self, path: &str) -> bool {
        self.mount.matches(path)
    }

    /// Re-base the inbound path and query onto the backend origin.
    /// Any path on the configured origin is replaced.
    pub fn target_url(&self, uri: &Uri) -> Url {
        let mut target = self.origin.clone();
        target.set_path(uri.path());
        target.set_query(uri.query());
        target
    }
}

/// Handler for every method under the API prefix.
pub async fn forward(State(proxy): State<Arc<BackendProxy>>, req: Request) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(req.headers()).to_owned();

    let (parts, body) = req.into_parts();
    let method = parts.method;
    let target = proxy.target_url(&parts.uri);

    let mut headers = forward_request_headers(&parts.headers);
    let body = OutboundBody::read(&method, &parts.headers, body, proxy.max_body_bytes).await;

    debug!(
        request_id = %request_id,
        method = %method,
        target = %target,
        body_bytes = body.len(),
        "Forwarding to backend"
    );
    if let Some(preview) = body.preview() {
        debug!(request_id = %request_id, body = %preview, "Forwarded JSON body");
    }

    let payload = body.into_payload(&mut headers);
    let mut outbound = proxy
        .client
        .request(method.clone(), target.clone())
        .headers(headers);
    if let Some(payload) = payload {
        outbound = outbound.body(payload);
    }

    match outbound.send().await {
        Ok(upstream) => {
            let status = upstream.status();
            metrics::record_proxy_request(method.as_str(), status.as_u16(), start_time);
            debug!(
                request_id = %request_id,
                status = %status,
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "Backend responded"
            );

            let headers = relay_response_headers(upstream.headers());
            let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
            *response.status_mut() = status;
            *response.headers_mut() = headers;
            response
        }
        Err(err) => {
            error!(
                request_id = %request_id,
                method = %method,
                target = %target,
                error = %err,
                "Backend unavailable"
            );
            metrics::record_proxy_request(method.as_str(), 502, start_time);
            ProxyFailure::from_error(&err, &target).into_response()
        }
    }
}
