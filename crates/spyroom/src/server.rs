//! `SpyroomServer` builder and accept loop.
//!
//! Ties the layers together: transport → session adapter → lobby actor.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use spyroom_protocol::JsonCodec;
use spyroom_room::{spawn_lobby, GameRules, LobbyHandle, RoomManager};
use spyroom_transport::{Transport, TransportError, WebSocketTransport};

use crate::handler::handle_connection;
use crate::{ServerConfig, SpyroomError};

/// Shared state handed to every connection task.
pub(crate) struct ServerState {
    pub(crate) lobby: LobbyHandle,
    pub(crate) codec: JsonCodec,
    pub(crate) idle_timeout: Duration,
    pub(crate) ping_interval: Duration,
}

/// Builder for configuring and starting a Spyroom server.
///
/// # Example
///
/// ```rust,no_run
/// use spyroom::prelude::*;
///
/// # async fn start() -> Result<(), SpyroomError> {
/// let server = SpyroomServer::builder()
///     .bind("127.0.0.1:3000")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct SpyroomServerBuilder {
    config: ServerConfig,
    rules: Option<GameRules>,
    seed: Option<u64>,
}

impl SpyroomServerBuilder {
    /// Creates a builder with [`ServerConfig::default`].
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            rules: None,
            seed: None,
        }
    }

    /// Sets the address to bind to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Overrides the game rules. Without this, the defaults are used with
    /// the configured secret word.
    pub fn rules(mut self, rules: GameRules) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Seeds room codes and spy draws for reproducible runs.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Binds the listener and starts the lobby actor.
    ///
    /// # Errors
    /// [`SpyroomError::Transport`] if the address cannot be bound.
    pub async fn build(self) -> Result<SpyroomServer, SpyroomError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;

        let rules = self.rules.unwrap_or_else(|| GameRules {
            secret_word: self.config.secret_word.clone(),
            ..GameRules::default()
        });
        let manager = match self.seed {
            Some(seed) => RoomManager::seeded(rules, seed),
            None => RoomManager::new(rules),
        };
        let lobby = spawn_lobby(manager, self.config.lobby_channel_size);

        let state = Arc::new(ServerState {
            lobby,
            codec: JsonCodec,
            idle_timeout: self.config.idle_timeout,
            ping_interval: self.config.ping_interval,
        });

        Ok(SpyroomServer { transport, state })
    }
}

impl Default for SpyroomServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Spyroom server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct SpyroomServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
}

impl SpyroomServer {
    pub fn builder() -> SpyroomServerBuilder {
        SpyroomServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// A handle to the lobby, for inspecting live rooms.
    pub fn lobby(&self) -> LobbyHandle {
        self.state.lobby.clone()
    }

    /// Accepts connections forever, one handler task each.
    pub async fn run(self) -> Result<(), SpyroomError> {
        self.run_until(std::future::pending()).await
    }

    /// Accepts connections until `shutdown` resolves, then stops the lobby.
    pub async fn run_until<F>(mut self, shutdown: F) -> Result<(), SpyroomError>
    where
        F: Future<Output = ()>,
    {
        let addr = self.local_addr().map_err(TransportError::Accept)?;
        tracing::info!(%addr, "Spyroom server running");

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => {
                        let state = Arc::clone(&self.state);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(conn, state).await {
                                tracing::debug!(error = %e, "connection ended with error");
                            }
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "accept failed");
                    }
                },
                () = &mut shutdown => {
                    tracing::info!("shutdown requested");
                    break;
                }
            }
        }

        self.state.lobby.shutdown().await?;
        Ok(())
    }
}
