//! HTTP server bootstrap.
//!
//! Wires the storage handle into the router, binds the listener and runs
//! until a shutdown signal arrives.

use std::future::Future;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api;
use crate::config::Config;
use crate::error::Result;
use crate::storage::Storage;

/// Shared state handed to every request handler.
#[derive(Debug, Clone)]
pub struct AppState {
    storage: Storage,
}

impl AppState {
    /// Create state around an opened storage handle.
    #[must_use]
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// The storage backing this service.
    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::index))
        .route("/static/main.js", get(api::main_js))
        .route(
            "/api/feedback",
            get(api::list_feedback).post(api::create_feedback),
        )
        .route("/health", get(api::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Open storage and serve HTTP until shutdown.
///
/// Storage is opened exactly once here, which creates the database
/// directory and schema if needed.
///
/// # Errors
///
/// Returns an error if storage cannot be opened or the listener cannot bind.
pub async fn run(config: &Config) -> Result<()> {
    let storage = Storage::open(config.database_path())?;
    serve(config, storage).await
}

/// Serve HTTP with an already opened storage handle.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails.
pub async fn serve(config: &Config, storage: Storage) -> Result<()> {
    let listener = bind(config).await?;
    serve_on(listener, storage, shutdown_signal()).await
}

/// Bind the configured host and port.
///
/// # Errors
///
/// Returns an error if the address cannot be bound.
pub async fn bind(config: &Config) -> Result<TcpListener> {
    let listener = TcpListener::bind(config.bind_address()).await?;
    info!("listening on http://{}", listener.local_addr()?);
    Ok(listener)
}

/// Serve on a bound listener until `shutdown` resolves.
///
/// In-flight requests are drained before this returns.
///
/// # Errors
///
/// Returns an error if the server fails.
pub async fn serve_on<F>(listener: TcpListener, storage: Storage, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(AppState::new(storage));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                tracing::warn!("failed to install SIGTERM handler: {err}");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    fn local_config() -> Config {
        let mut config = Config::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 0;
        config
    }

    async fn get_health(addr: std::net::SocketAddr) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_bind_uses_configured_host() {
        let listener = bind(&local_config()).await.unwrap();
        let addr = listener.local_addr().unwrap();
        assert!(addr.ip().is_loopback());
        assert_ne!(addr.port(), 0);
    }

    #[tokio::test]
    async fn test_serve_on_answers_health_and_shuts_down() {
        let storage = Storage::open_in_memory().unwrap();
        let listener = bind(&local_config()).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let server = tokio::spawn(serve_on(listener, storage, async move {
            let _ = stop_rx.await;
        }));

        let response = get_health(addr).await;
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains(r#"{"status":"ok"}"#));

        stop_tx.send(()).unwrap();
        let result = tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("server stops after shutdown")
            .unwrap();
        assert!(result.is_ok());
        assert!(TcpStream::connect(addr).await.is_err());
    }

    #[tokio::test]
    async fn test_serve_stops_when_aborted() {
        let mut config = local_config();
        let reserved = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        config.server.port = reserved.local_addr().unwrap().port();
        drop(reserved);
        let addr = config.bind_address();

        let server = tokio::spawn({
            let config = config.clone();
            async move { serve(&config, Storage::open_in_memory().unwrap()).await }
        });

        let mut response = None;
        for _ in 0..50 {
            if TcpStream::connect(&addr).await.is_ok() {
                response = Some(get_health(addr.parse().unwrap()).await);
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        let response = response.expect("serve accepted a connection");
        assert!(response.starts_with("HTTP/1.1 200"));

        server.abort();
        assert!(server.await.unwrap_err().is_cancelled());
    }

    #[test]
    fn test_app_state_exposes_storage() {
        let storage = Storage::open_in_memory().unwrap();
        let state = AppState::new(storage);
        assert_eq!(state.storage().path().to_string_lossy(), ":memory:");
    }
}
