//! HTTP/1 and HTTP/2 serving loop
//!
//! Accepts connections until the shutdown future resolves, then stops
//! accepting and gives open connections a grace period to finish.

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder;
use pluck_core::error::{PluckError, PluckResult};
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::gateway::Gateway;

/// How long open connections may keep running after shutdown starts
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Serve the gateway on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, gateway: Arc<Gateway>, shutdown: F) -> PluckResult<()>
where
    F: Future<Output = ()>,
{
    let local_addr = listener
        .local_addr()
        .map_err(|e| PluckError::io("Failed to read listener address", e))?;
    info!("Listening on http://{} (registry {})", local_addr, gateway.registry_url());

    let mut connections = JoinSet::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested, no longer accepting connections");
                break;
            }
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!("Failed to accept connection: {}", e);
                        continue;
                    }
                };
                debug!("Connection from {}", peer);

                let gateway = Arc::clone(&gateway);
                connections.spawn(async move {
                    let service = service_fn(move |request| {
                        let gateway = Arc::clone(&gateway);
                        async move { Ok::<_, Infallible>(gateway.handle(request).await) }
                    });

                    if let Err(e) = Builder::new(TokioExecutor::new())
                        .serve_connection(TokioIo::new(stream), service)
                        .await
                    {
                        debug!("Connection from {} closed with error: {}", peer, e);
                    }
                });
            }
            // Reap finished connections so the set does not grow unbounded
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
        }
    }

    let drained = tokio::time::timeout(SHUTDOWN_GRACE, async {
        while connections.join_next().await.is_some() {}
    })
    .await;
    if drained.is_err() {
        warn!("Aborting {} connections still open after grace period", connections.len());
        connections.abort_all();
    }

    info!("Server stopped");
    Ok(())
}
