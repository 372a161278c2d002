use crate::errors::StreamError;
use crate::protocol::websocket_url;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

const FRAME_BUFFER: usize = 64;

/// Text frames flowing in both directions of an open transport.
///
/// The transport is finished when `incoming` yields `None`.
#[derive(Debug)]
pub struct Channel {
    pub incoming: mpsc::Receiver<String>,
    pub outgoing: mpsc::Sender<String>,
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn open(&self) -> Result<Channel, StreamError>;
}

#[derive(Debug, Clone)]
pub struct WebSocketTransport {
    url: String,
}

impl WebSocketTransport {
    pub fn new(base_url: &str) -> Result<Self, StreamError> {
        Ok(Self {
            url: websocket_url(base_url)?,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn open(&self) -> Result<Channel, StreamError> {
        info!("connecting to event stream at {}", self.url);
        let (ws_stream, _) = connect_async(self.url.as_str())
            .await
            .map_err(|err| StreamError::Connect(err.to_string()))?;
        let (mut write, mut read) = ws_stream.split();

        let (in_tx, in_rx) = mpsc::channel(FRAME_BUFFER);
        let (out_tx, mut out_rx) = mpsc::channel::<String>(FRAME_BUFFER);

        tokio::spawn(async move {
            while let Some(frame) = out_rx.recv().await {
                if let Err(err) = write.send(Message::Text(frame)).await {
                    warn!("failed to write to event stream: {err}");
                    break;
                }
            }
            let _ = write.close().await;
            debug!("event stream writer finished");
        });

        tokio::spawn(async move {
            while let Some(msg) = read.next().await {
                match msg {
                    Ok(Message::Text(text)) => {
                        if in_tx.send(text).await.is_err() {
                            break;
                        }
                    }
                    Ok(Message::Close(_)) => {
                        info!("event stream closed by server");
                        break;
                    }
                    Ok(_) => {}
                    Err(err) => {
                        error!("event stream error: {err}");
                        break;
                    }
                }
            }
        });

        Ok(Channel {
            incoming: in_rx,
            outgoing: out_tx,
        })
    }
}

/// Server side of a [`MemoryTransport`] channel.
#[derive(Debug)]
pub struct ServerEnd {
    pub to_client: mpsc::Sender<String>,
    pub from_client: mpsc::Receiver<String>,
}

/// In-process transport; each `open` hands a [`ServerEnd`] to the receiver
/// returned alongside it by [`MemoryTransport::pair`].
#[derive(Debug)]
pub struct MemoryTransport {
    accepted: mpsc::UnboundedSender<ServerEnd>,
    opens: AtomicUsize,
}

impl MemoryTransport {
    pub fn pair() -> (Self, mpsc::UnboundedReceiver<ServerEnd>) {
        let (accepted, rx) = mpsc::unbounded_channel();
        let transport = Self {
            accepted,
            opens: AtomicUsize::new(0),
        };
        (transport, rx)
    }

    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn open(&self) -> Result<Channel, StreamError> {
        let (to_client, incoming) = mpsc::channel(FRAME_BUFFER);
        let (outgoing, from_client) = mpsc::channel(FRAME_BUFFER);
        self.accepted
            .send(ServerEnd {
                to_client,
                from_client,
            })
            .map_err(|_| StreamError::Connect("memory server is gone".into()))?;
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Channel { incoming, outgoing })
    }
}
