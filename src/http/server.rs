//! HTTP server setup.
//!
//! # Responsibilities
//! - Build the Axum router: API proxy, consent endpoint, static site
//! - Wire up middleware (session gate, timeout, request ID, tracing)
//! - Serve on a listener until shutdown is signalled
//!
//! # Layer order (outermost first)
//! ```text
//! SetRequestId → Trace → PropagateRequestId → Timeout → session gate → handler
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{any, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer, services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer,
};

use crate::auth::{require_session, AuthGate};
use crate::config::{GatewayConfig, PLACEHOLDER_JWT_SECRET};
use crate::http::documents::{consent_document, CONSENT_PATH};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::proxy::{forward, BackendProxy, ProxyError};

/// HTTP server for the clinic gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: &GatewayConfig) -> Result<Self, ProxyError> {
        if config.auth.jwt_secret == PLACEHOLDER_JWT_SECRET {
            tracing::warn!("Using the built-in development JWT secret; set JWT_SECRET in production");
        }

        let proxy = Arc::new(BackendProxy::from_config(config)?);
        let gate = Arc::new(AuthGate::from_config(config));

        tracing::info!(
            backend = %config.backend.url,
            api_prefix = %proxy.mount(),
            site_root = %config.site.root,
            "Gateway configured"
        );

        Ok(Self {
            router: Self::build_router(config, proxy, gate),
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, proxy: Arc<BackendProxy>, gate: Arc<AuthGate>) -> Router {
        let mount = proxy.mount().to_string();
        let api = Router::new()
            .route(&mount, any(forward))
            .route(&format!("{mount}/{{*rest}}"), any(forward))
            .with_state(proxy);

        let documents = Router::new()
            .route(CONSENT_PATH, post(consent_document))
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(config.proxy.max_body_bytes))
            .with_state(Arc::new(config.consent.clone()));

        api.merge(documents)
            .fallback_service(ServeDir::new(&config.site.root))
            .layer(middleware::from_fn_with_state(gate, require_session))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.listener.request_timeout_secs,
            )))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for embedding or in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
