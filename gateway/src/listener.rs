//! TCP accept loop (C3).

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::context::GatewayContext;
use crate::connection::handle_connection;

/// Runs the Wyoming TCP listener until `shutdown` is cancelled.
///
/// Each accepted connection is registered in `ctx.connections`, spawned onto
/// its own task carrying a clone of `shutdown`, and deregistered on exit.
/// When `shutdown` fires, the accept loop stops and this function waits for
/// every still-open connection to unwind (each races `shutdown` in its own
/// select loop) before returning, so no connection outlives the listener.
/// Accept errors increment the connection-error counter and mark the
/// listener unhealthy; they do not stop the loop, since they are almost
/// always transient (e.g. a peer resetting the connection mid-handshake).
pub async fn serve(ctx: Arc<GatewayContext>, addr: &str, shutdown: CancellationToken) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "wyoming tcp listener started");
    ctx.metrics.listener_up.set(1);

    let mut handlers = JoinSet::new();

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("wyoming tcp listener shutting down");
                break;
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        tracing::debug!(%peer, "accepted connection");
                        ctx.metrics.listener_up.set(1);
                        let conn_id = ctx.connections.register();
                        let ctx = ctx.clone();
                        let conn_shutdown = shutdown.clone();
                        handlers.spawn(async move {
                            handle_connection(ctx, stream, conn_id, conn_shutdown).await;
                        });
                    }
                    Err(e) => {
                        ctx.metrics.connection_errors.inc();
                        ctx.metrics.listener_up.set(0);
                        tracing::warn!(error = %e, "accept failed");
                    }
                }
            }
        }
    }

    while handlers.join_next().await.is_some() {}
    Ok(())
}
