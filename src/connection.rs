//! Event stream connection and the manager that shares it.
//!
//! A [`Connection`] owns a driver task that speaks the Socket.IO handshake,
//! answers pings and hands named events to registered listeners. Listeners
//! run on the driver task one at a time, in delivery order, while the
//! registry lock is held, so they must not register or remove listeners
//! themselves. A server that sends nothing for `pingInterval + pingTimeout`
//! after the handshake is treated as gone.
//!
//! [`ConnectionManager`] hands out reference counted leases on a single
//! connection. Releasing the last lease keeps the connection open for the
//! next `acquire` unless the manager was built to close idle connections.

use crate::errors::StreamError;
use crate::models::ConnectionStatus;
use crate::protocol::{DEFAULT_NAMESPACE, EnginePacket, SocketPacket, SocketPacketKind};
use crate::transport::{Channel, Transport};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{Mutex as AsyncMutex, watch};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, error, info, warn};

pub const UPDATE_EVENT: &str = "update_frontend";

type Callback = Box<dyn Fn(Option<&Value>) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
struct Listeners {
    next_id: u64,
    by_event: HashMap<String, Vec<(ListenerId, Callback)>>,
}

impl Listeners {
    fn dispatch(&self, event: &str, payload: Option<&Value>) -> usize {
        let Some(callbacks) = self.by_event.get(event) else {
            return 0;
        };
        for (_, callback) in callbacks {
            callback(payload);
        }
        callbacks.len()
    }
}

type SharedListeners = Arc<Mutex<Listeners>>;

fn lock(listeners: &Mutex<Listeners>) -> MutexGuard<'_, Listeners> {
    listeners.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct Connection {
    listeners: SharedListeners,
    status: Arc<watch::Sender<ConnectionStatus>>,
    driver: JoinHandle<()>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("status", &*self.status.borrow())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Connection {
    pub async fn open(transport: &dyn Transport) -> Result<Arc<Self>, StreamError> {
        let channel = transport.open().await?;
        let listeners = SharedListeners::default();
        let (status_tx, _) = watch::channel(ConnectionStatus::Connecting);
        let status = Arc::new(status_tx);

        let driver = tokio::spawn(drive(channel, Arc::clone(&listeners), Arc::clone(&status)));

        Ok(Arc::new(Self {
            listeners,
            status,
            driver,
        }))
    }

    pub fn on<F>(&self, event: &str, callback: F) -> ListenerId
    where
        F: Fn(Option<&Value>) + Send + Sync + 'static,
    {
        let mut listeners = lock(&self.listeners);
        listeners.next_id += 1;
        let id = ListenerId(listeners.next_id);
        listeners
            .by_event
            .entry(event.to_string())
            .or_default()
            .push((id, Box::new(callback)));
        id
    }

    /// Detaches every listener registered for `event`.
    pub fn off(&self, event: &str) {
        lock(&self.listeners).by_event.remove(event);
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = lock(&self.listeners);
        let mut removed = false;
        listeners.by_event.retain(|_, callbacks| {
            let before = callbacks.len();
            callbacks.retain(|(listener, _)| *listener != id);
            removed |= callbacks.len() != before;
            !callbacks.is_empty()
        });
        removed
    }

    pub fn listener_count(&self, event: &str) -> usize {
        lock(&self.listeners)
            .by_event
            .get(event)
            .map_or(0, Vec::len)
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.status.borrow()
    }

    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        self.driver.is_finished()
    }

    pub fn close(&self) {
        self.driver.abort();
        self.status.send_replace(ConnectionStatus::Disconnected);
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

async fn drive(
    mut channel: Channel,
    listeners: SharedListeners,
    status: Arc<watch::Sender<ConnectionStatus>>,
) {
    // Set from the handshake; any frame from the server resets it.
    let mut deadline: Option<Duration> = None;

    loop {
        let next = match deadline {
            Some(limit) => match time::timeout(limit, channel.incoming.recv()).await {
                Ok(next) => next,
                Err(_) => {
                    warn!(?limit, "event stream went quiet past its ping deadline");
                    break;
                }
            },
            None => channel.incoming.recv().await,
        };
        let Some(frame) = next else { break };

        let packet = match EnginePacket::decode(&frame) {
            Ok(packet) => packet,
            Err(err) => {
                warn!("skipping frame: {err}");
                continue;
            }
        };

        let reply = match packet {
            EnginePacket::Open(handshake) => {
                debug!(sid = %handshake.sid, ping_interval = handshake.ping_interval, "engine handshake");
                let window = handshake.ping_interval.saturating_add(handshake.ping_timeout);
                deadline = (window > 0).then(|| Duration::from_millis(window));
                Some(SocketPacket::connect(DEFAULT_NAMESPACE).encode())
            }
            EnginePacket::Ping(data) => Some(EnginePacket::Pong(data).encode()),
            EnginePacket::Pong(_) | EnginePacket::Noop => None,
            EnginePacket::Close => {
                info!("event stream closed by server");
                break;
            }
            EnginePacket::Message(body) => {
                let packet = match SocketPacket::decode(&body) {
                    Ok(packet) => packet,
                    Err(err) => {
                        warn!("skipping frame: {err}");
                        continue;
                    }
                };
                if !handle_packet(&packet, &listeners, &status) {
                    break;
                }
                None
            }
        };

        if let Some(frame) = reply {
            if channel.outgoing.send(frame).await.is_err() {
                break;
            }
        }
    }

    status.send_replace(ConnectionStatus::Disconnected);
    warn!("event stream disconnected");
}

/// Returns false when the packet ends the session.
fn handle_packet(
    packet: &SocketPacket,
    listeners: &Mutex<Listeners>,
    status: &watch::Sender<ConnectionStatus>,
) -> bool {
    if packet.namespace != DEFAULT_NAMESPACE {
        debug!(namespace = %packet.namespace, "ignoring packet for foreign namespace");
        return true;
    }

    match packet.kind {
        SocketPacketKind::Connect => {
            status.send_replace(ConnectionStatus::Connected);
            info!("connected to event stream");
            true
        }
        SocketPacketKind::Disconnect => {
            info!("event stream namespace disconnected by server");
            false
        }
        SocketPacketKind::ConnectError => {
            error!(data = ?packet.data, "event stream refused the connection");
            false
        }
        SocketPacketKind::Event => {
            if let Some((name, payload)) = packet.as_event() {
                let delivered = lock(listeners).dispatch(name, payload);
                if delivered == 0 {
                    debug!(event = name, "no listener for event");
                }
            }
            true
        }
        SocketPacketKind::Ack => true,
    }
}

#[derive(Default)]
struct Pool {
    connection: Option<Arc<Connection>>,
    leases: usize,
}

/// A counted claim on the shared connection; hand it back with
/// [`ConnectionManager::release`].
#[derive(Debug)]
pub struct ConnectionLease {
    connection: Arc<Connection>,
}

impl ConnectionLease {
    pub fn connection(&self) -> &Connection {
        &self.connection
    }
}

pub struct ConnectionManager {
    transport: Arc<dyn Transport>,
    close_when_idle: bool,
    pool: AsyncMutex<Pool>,
}

impl ConnectionManager {
    pub fn new(transport: Arc<dyn Transport>, close_when_idle: bool) -> Self {
        Self {
            transport,
            close_when_idle,
            pool: AsyncMutex::new(Pool::default()),
        }
    }

    pub async fn acquire(&self) -> Result<ConnectionLease, StreamError> {
        let mut pool = self.pool.lock().await;
        let reusable = pool
            .connection
            .as_ref()
            .filter(|existing| !existing.is_closed())
            .cloned();
        let connection = match reusable {
            Some(existing) => existing,
            None => {
                let opened = Connection::open(self.transport.as_ref()).await?;
                pool.connection = Some(Arc::clone(&opened));
                opened
            }
        };
        pool.leases += 1;
        debug!(leases = pool.leases, "event stream connection acquired");
        Ok(ConnectionLease { connection })
    }

    pub async fn release(&self, lease: ConnectionLease) {
        let mut pool = self.pool.lock().await;
        drop(lease);
        pool.leases = pool.leases.saturating_sub(1);
        debug!(leases = pool.leases, "event stream connection released");

        if pool.leases == 0 && self.close_when_idle {
            if let Some(connection) = pool.connection.take() {
                info!("closing idle event stream connection");
                connection.close();
            }
        }
    }

    pub async fn leases(&self) -> usize {
        self.pool.lock().await.leases
    }

    pub async fn is_open(&self) -> bool {
        self.pool
            .lock()
            .await
            .connection
            .as_ref()
            .is_some_and(|connection| !connection.is_closed())
    }

    /// Status of the connection currently held by the pool.
    pub async fn status(&self) -> ConnectionStatus {
        self.pool
            .lock()
            .await
            .connection
            .as_ref()
            .map_or(ConnectionStatus::Disconnected, |connection| connection.status())
    }

    pub async fn shutdown(&self) {
        let mut pool = self.pool.lock().await;
        pool.leases = 0;
        if let Some(connection) = pool.connection.take() {
            connection.close();
        }
    }
}
