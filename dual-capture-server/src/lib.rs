//! # dual-capture-server
//!
//! HTTP persistence for dual-view captures.
//!
//! ## Architecture
//!
//! ```text
//! dual-capture-server (this crate)
//! ├── config    ← ServerConfig (defaults + DUAL_CAPTURE_* environment)
//! ├── storage   ← MemoryStorage: in-memory records, demo seed, CaptureStore impl
//! ├── routes    ← axum router for GET/POST /api/captures and GET /api/captures/{id}
//! └── client    ← HttpCaptureStore: CaptureStore over the same wire shape (reqwest)
//! ```

pub mod client;
pub mod config;
pub mod routes;
pub mod storage;

use thiserror::Error;
use tokio::net::TcpListener;

pub use client::HttpCaptureStore;
pub use config::ServerConfig;
pub use routes::{router, ErrorBody};
pub use storage::MemoryStorage;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Capture(#[from] dual_capture_core::CaptureError),
}

/// Serve the capture API on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, storage: MemoryStorage, shutdown: F) -> Result<(), ServerError>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let app = router(storage);
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    Ok(())
}
