//! Minimal HTTP front end over the conversion pipeline.
//!
//! One tokio task per connection, HTTP/1.1 via `hyper`. Conversions run on
//! the blocking pool, so a slow render never stalls other connections.
//! Routes and the JSON contract live in [`handler`].

pub mod handler;

use crate::config::{ConversionConfig, ServerConfig};
use crate::error::Md2PdfError;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

/// Shared, read-only state handed to every request.
pub struct AppState {
    /// Baseline conversion settings; requests override stylesheet and watermark.
    pub conversion: ConversionConfig,
    pub max_body_bytes: usize,
}

/// A bound, not yet running HTTP server.
pub struct Server {
    listener: TcpListener,
    state: Arc<AppState>,
}

impl Server {
    /// Bind the listening socket.
    ///
    /// # Errors
    /// [`Md2PdfError::StartupFailed`] when the address cannot be bound.
    pub async fn bind(config: ServerConfig) -> Result<Self, Md2PdfError> {
        let addr = config.addr();
        let listener = TcpListener::bind((config.host.as_str(), config.port))
            .await
            .map_err(|e| Md2PdfError::startup(addr.clone(), e))?;
        debug!("Bound {addr}");

        Ok(Self {
            listener,
            state: Arc::new(AppState {
                conversion: config.conversion,
                max_body_bytes: config.max_body_bytes,
            }),
        })
    }

    /// The actual bound address (useful with port `0`).
    pub fn local_addr(&self) -> Result<SocketAddr, Md2PdfError> {
        self.listener
            .local_addr()
            .map_err(|e| Md2PdfError::Internal(format!("local address: {e}")))
    }

    /// Serve until Ctrl-C.
    pub async fn run(self) -> Result<(), Md2PdfError> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Cannot listen for Ctrl-C ({e}); serving until killed");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Serve until `shutdown` resolves. In-flight connections are left to
    /// finish on their own tasks.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), Md2PdfError>
    where
        F: Future<Output = ()>,
    {
        if let Ok(addr) = self.listener.local_addr() {
            info!("HTTP server listening on http://{addr}");
        }
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    info!("HTTP server stopped");
                    return Ok(());
                }
                accepted = self.listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            warn!("Accept failed: {e}");
                            tokio::time::sleep(Duration::from_millis(50)).await;
                            continue;
                        }
                    };
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        let service = service_fn(move |req| handler::handle(req, Arc::clone(&state)));
                        if let Err(e) = http1::Builder::new()
                            .serve_connection(TokioIo::new(stream), service)
                            .await
                        {
                            debug!("Connection from {peer} ended with error: {e}");
                        }
                    });
                }
            }
        }
    }
}

/// Bind and serve until Ctrl-C.
pub async fn serve(config: ServerConfig) -> Result<(), Md2PdfError> {
    Server::bind(config).await?.run().await
}
