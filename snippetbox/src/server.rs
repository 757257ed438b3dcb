//! HTTP server with graceful shutdown

use std::future::Future;

use axum::Router;
use http::StatusCode;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{
    catch_panic::CatchPanicLayer,
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

use crate::{
    config::ServerConfig,
    error::Result,
    middleware::{request_id_layer, request_id_propagation_layer, sensitive_headers_layer},
};

/// Server instance
pub struct Server {
    config: ServerConfig,
}

impl Server {
    /// Create a new server instance
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Wrap `app` in the middleware stack
    ///
    /// Layers added later run first: panics are caught outermost, then the
    /// request id is assigned, then tracing, body limit and timeout apply.
    pub fn layered(&self, app: Router) -> Router {
        app.layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            self.config.timeout(),
        ))
        .layer(RequestBodyLimitLayer::new(self.config.body_limit_bytes()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(sensitive_headers_layer())
        .layer(request_id_propagation_layer())
        .layer(request_id_layer())
        .layer(CatchPanicLayer::new())
    }

    /// Bind the configured address
    pub async fn bind(&self) -> Result<TcpListener> {
        let addr = self.config.bind_addr();
        let listener = TcpListener::bind(&addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);
        Ok(listener)
    }

    /// Run the server until SIGINT or SIGTERM
    pub async fn serve(self, app: Router) -> Result<()> {
        let listener = self.bind().await?;
        self.serve_with_shutdown(listener, app, shutdown_signal()).await
    }

    /// Run the server on `listener` until `signal` resolves
    ///
    /// In-flight requests are allowed to finish; each one is still bounded by
    /// the request timeout.
    pub async fn serve_with_shutdown<F>(self, listener: TcpListener, app: Router, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.log_middleware_config();

        let app = self.layered(app);

        axum::serve(listener, app)
            .with_graceful_shutdown(signal)
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    fn log_middleware_config(&self) {
        tracing::info!("Middleware configuration:");
        tracing::info!("  - Panic recovery: enabled");
        tracing::info!("  - Request ID tracking: enabled");
        tracing::info!("  - Sensitive header masking: enabled");
        tracing::info!("  - Request body limit: {} KiB", self.config.body_limit_kb);
        tracing::info!("  - Request timeout: {} seconds", self.config.timeout_secs);
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl+C), starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }

    tracing::info!("Shutdown signal received, draining requests...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{body::Body, extract::Request, routing::get};
    use http::{header, Method};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;
    use tower::ServiceExt;

    use crate::handlers::router;
    use crate::state::AppState;
    use crate::store::MemorySnippetStore;

    fn server(body_limit_kb: usize) -> Server {
        Server::new(ServerConfig {
            addr: "127.0.0.1:0".to_string(),
            body_limit_kb,
            ..ServerConfig::default()
        })
    }

    fn app() -> Router {
        router(AppState::new(Arc::new(MemorySnippetStore::new())))
    }

    #[test]
    fn test_server_creation() {
        let config = ServerConfig::default();
        let server = Server::new(config.clone());
        assert_eq!(server.config().addr, config.addr);
    }

    #[tokio::test]
    async fn test_layered_router_sets_request_id() {
        let app = server(1024).layered(app());
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let app = server(1).layered(app());
        let body = format!("title=t&content={}&expires=1", "x".repeat(4096));
        let request = Request::builder()
            .method(Method::POST)
            .uri("/snippet/create")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(header::CONTENT_LENGTH, body.len())
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_panics_become_500() {
        let app = server(1024).layered(
            Router::new().route("/panic", get(|| async { panic!("handler bug") as () })),
        );
        let request = Request::builder().uri("/panic").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_serves_until_shutdown() {
        let server = server(1024);
        let listener = server.bind().await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop, stopped) = oneshot::channel::<()>();

        let handle = tokio::spawn(server.serve_with_shutdown(listener, app(), async {
            let _ = stopped.await;
        }));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /snippet?id=1 HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut raw = String::new();
        stream.read_to_string(&mut raw).await.unwrap();
        assert!(raw.starts_with("HTTP/1.1 404"), "{raw}");
        assert!(raw.to_ascii_lowercase().contains("x-request-id:"));

        stop.send(()).unwrap();
        handle.await.unwrap().unwrap();
    }
}
