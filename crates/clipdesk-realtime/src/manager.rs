//! Connection manager.
//!
//! One spawned task per opened channel runs the loop
//! connect -> read frames -> (channel drops) -> wait fixed delay -> connect,
//! forever, until [`ConnectionManager::close`] cancels it. The manager keeps
//! the only handle to that task, so at most one channel is alive at a time.

use std::sync::Arc;
use std::time::Duration;

use clipdesk_models::{decode_event, ConnectionState, EngineEvent};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::config::ConnectionConfig;
use crate::error::{ChannelError, ChannelResult};
use crate::metrics;

type EngineSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long `close` waits for the channel task to wind down.
const TEARDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Everything the channel reports to its owner.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// A decoded engine event
    Event(EngineEvent),
    /// Synthetic connection-state-changed notification
    ConnectionChanged(ConnectionState),
}

/// Callback receiving every [`Inbound`] value, in order.
pub type Dispatch = Arc<dyn Fn(Inbound) + Send + Sync>;

struct ActiveChannel {
    cancel: CancellationToken,
    outbound: mpsc::UnboundedSender<String>,
    task: JoinHandle<()>,
}

/// Owns the real-time channel to the engine.
pub struct ConnectionManager {
    config: ConnectionConfig,
    dispatch: Dispatch,
    state: Arc<watch::Sender<ConnectionState>>,
    active: Option<ActiveChannel>,
}

impl ConnectionManager {
    pub fn new(config: ConnectionConfig, dispatch: Dispatch) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            config,
            dispatch,
            state: Arc::new(state),
            active: None,
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Subscribe to connection state changes.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Start the channel. An already-open channel is torn down first.
    pub async fn open(&mut self) {
        self.close().await;

        let cancel = CancellationToken::new();
        let (outbound, outbound_rx) = mpsc::unbounded_channel();

        let channel = ChannelTask {
            url: self.config.url.clone(),
            reconnect_delay: self.config.reconnect_delay,
            dispatch: Arc::clone(&self.dispatch),
            state: Arc::clone(&self.state),
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(channel.run(outbound_rx));

        self.active = Some(ActiveChannel {
            cancel,
            outbound,
            task,
        });
    }

    /// Tear down the channel and any pending reconnect. Idempotent.
    pub async fn close(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };

        debug!(url = %self.config.url, "Closing real-time channel");
        active.cancel.cancel();
        drop(active.outbound);
        if tokio::time::timeout(TEARDOWN_TIMEOUT, active.task)
            .await
            .is_err()
        {
            warn!(url = %self.config.url, "Channel task did not stop in time");
        }
    }

    /// Queue a text frame for the engine.
    pub fn send(&self, text: impl Into<String>) -> ChannelResult<()> {
        let active = self.active.as_ref().ok_or(ChannelError::NotOpen)?;
        if !self.state().is_open() {
            return Err(ChannelError::NotOpen);
        }
        active
            .outbound
            .send(text.into())
            .map_err(|_| ChannelError::Closed)
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel.cancel();
        }
    }
}

/// State moved into the spawned channel task.
struct ChannelTask {
    url: String,
    reconnect_delay: Duration,
    dispatch: Dispatch,
    state: Arc<watch::Sender<ConnectionState>>,
    cancel: CancellationToken,
}

impl ChannelTask {
    fn set_state(&self, state: ConnectionState) {
        self.state.send_replace(state);
        (self.dispatch)(Inbound::ConnectionChanged(state));
    }

    async fn run(self, mut outbound: mpsc::UnboundedReceiver<String>) {
        let delay_ms = self.reconnect_delay.as_millis() as u64;
        let mut attempt = 0u64;

        loop {
            attempt += 1;
            self.set_state(ConnectionState::Connecting);
            metrics::record_connection_attempt();

            let connected = tokio::select! {
                _ = self.cancel.cancelled() => break,
                result = connect_async(self.url.as_str()) => result,
            };

            match connected {
                Ok((socket, _response)) => {
                    info!(url = %self.url, attempt, "Real-time channel open");
                    // Stale frames queued for a previous socket are not replayed.
                    while outbound.try_recv().is_ok() {}
                    self.set_state(ConnectionState::Open);
                    self.pump(socket, &mut outbound).await;
                    if self.cancel.is_cancelled() {
                        break;
                    }
                    info!(url = %self.url, "Real-time channel closed");
                }
                Err(e) => {
                    let e = ChannelError::from(e);
                    warn!(url = %self.url, attempt, error = %e, "Real-time channel connect failed");
                }
            }

            self.set_state(ConnectionState::ReconnectPending { delay_ms });
            metrics::record_reconnect_scheduled();
            info!(delay_ms, "Reconnect scheduled");

            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(self.reconnect_delay) => {}
            }
        }

        self.set_state(ConnectionState::Disconnected);
        debug!(url = %self.url, "Channel task exited");
    }

    /// Move frames both ways until the socket closes or the task is cancelled.
    async fn pump(&self, socket: EngineSocket, outbound: &mut mpsc::UnboundedReceiver<String>) {
        let (mut sink, mut stream) = socket.split();

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    let _ = sink.send(Message::Close(None)).await;
                    return;
                }
                Some(text) = outbound.recv() => {
                    if let Err(e) = sink.send(Message::Text(text)).await {
                        warn!(error = %e, "Failed to write to real-time channel");
                        return;
                    }
                }
                frame = stream.next() => match frame {
                    Some(Ok(Message::Text(text))) => self.handle_text(&text),
                    Some(Ok(Message::Binary(_))) => {
                        trace!("Ignoring binary frame");
                        metrics::record_frame_dropped("binary");
                    }
                    Some(Ok(Message::Close(frame))) => {
                        debug!(?frame, "Engine closed the channel");
                        return;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        let e = ChannelError::from(e);
                        warn!(error = %e, "Real-time channel receive error");
                        return;
                    }
                    None => return,
                },
            }
        }
    }

    fn handle_text(&self, text: &str) {
        metrics::record_frame_received();
        match decode_event(text) {
            Ok(event) => (self.dispatch)(Inbound::Event(event)),
            Err(e) => {
                metrics::record_frame_dropped(e.reason());
                warn!(reason = e.reason(), error = %e, "Dropping inbound frame");
            }
        }
    }
}
