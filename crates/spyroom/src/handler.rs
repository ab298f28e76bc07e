//! Per-connection session adapter.
//!
//! Each accepted connection gets a reader (this task) and a writer task:
//!   1. Register with the lobby, handing it the outbound channel
//!   2. Writer: drain the channel, encode, send; ping on an interval
//!   3. Reader: receive frames → decode → dispatch to the lobby. Any
//!      frame, pongs included, resets the idle timer
//!   4. On close, error, or idle timeout: tell the lobby, exactly once

use std::sync::Arc;

use spyroom_protocol::{ClientEvent, Codec, ErrorCode, ServerEvent};
use spyroom_room::{ConnectionSender, LobbyHandle};
use spyroom_transport::{Connection, ConnectionId, Inbound, WebSocketConnection};
use tokio::sync::mpsc;

use crate::server::ServerState;
use crate::SpyroomError;

/// Drop guard that reports the disconnect when the handler exits.
///
/// Cleanup runs even if the handler panics. `Drop` is synchronous, so the
/// lobby send happens in a fire-and-forget task.
struct DisconnectGuard {
    connection: ConnectionId,
    lobby: LobbyHandle,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        let connection = self.connection;
        let lobby = self.lobby.clone();
        tokio::spawn(async move {
            if lobby.disconnect(connection).await.is_err() {
                tracing::debug!(%connection, "lobby gone before disconnect");
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) -> Result<(), SpyroomError> {
    let connection = conn.id();
    let conn = Arc::new(conn);
    tracing::debug!(%connection, "handling new connection");

    let (outbound, rx) = mpsc::unbounded_channel();
    state.lobby.connect(connection, outbound.clone()).await?;
    let guard = DisconnectGuard {
        connection,
        lobby: state.lobby.clone(),
    };

    let writer = tokio::spawn(write_loop(
        Arc::clone(&conn),
        Arc::clone(&state),
        rx,
    ));

    let result = read_loop(&conn, &state, &outbound).await;

    // The writer stops once the lobby drops its sender for us.
    drop(outbound);
    drop(guard);
    if let Err(e) = writer.await {
        tracing::warn!(%connection, error = %e, "writer task failed");
    }
    if let Err(e) = conn.close().await {
        tracing::debug!(%connection, error = %e, "close failed");
    }

    tracing::debug!(%connection, "connection finished");
    result
}

/// Reads frames until the peer goes away or idles out.
async fn read_loop(
    conn: &WebSocketConnection,
    state: &ServerState,
    outbound: &ConnectionSender,
) -> Result<(), SpyroomError> {
    let connection = conn.id();

    loop {
        let data = match tokio::time::timeout(state.idle_timeout, conn.recv()).await {
            Ok(Ok(Some(Inbound::Data(data)))) => data,
            Ok(Ok(Some(Inbound::KeepAlive))) => {
                tracing::trace!(%connection, "keep-alive");
                continue;
            }
            Ok(Ok(None)) => {
                tracing::debug!(%connection, "connection closed cleanly");
                return Ok(());
            }
            Ok(Err(e)) => {
                tracing::debug!(%connection, error = %e, "recv error");
                return Ok(());
            }
            Err(_) => {
                tracing::info!(%connection, "connection idle, dropping");
                return Ok(());
            }
        };

        let event: ClientEvent = match state.codec.decode(&data) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(%connection, error = %e, "failed to decode event");
                let _ = outbound.send(ServerEvent::GameError {
                    code: ErrorCode::BadRequest,
                    message: e.to_string(),
                });
                continue;
            }
        };

        tracing::trace!(%connection, event = event.name(), "event received");
        state.lobby.dispatch(connection, event).await?;
    }
}

/// Sends queued events in order and pings on `state.ping_interval`, until
/// the channel closes or a send fails.
async fn write_loop(
    conn: Arc<WebSocketConnection>,
    state: Arc<ServerState>,
    mut rx: mpsc::UnboundedReceiver<ServerEvent>,
) {
    let connection = conn.id();
    let start = tokio::time::Instant::now() + state.ping_interval;
    let mut pings = tokio::time::interval_at(start, state.ping_interval);
    pings.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else { break };
                let bytes = match state.codec.encode(&event) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::warn!(%connection, error = %e, "failed to encode event");
                        continue;
                    }
                };
                if let Err(e) = conn.send(&bytes).await {
                    tracing::debug!(%connection, error = %e, "send failed, writer stopping");
                    break;
                }
            }
            _ = pings.tick() => {
                if let Err(e) = conn.ping().await {
                    tracing::debug!(%connection, error = %e, "ping failed, writer stopping");
                    break;
                }
            }
        }
    }
}
