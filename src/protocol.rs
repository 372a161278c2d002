//! Text framing for Engine.IO v4 and the Socket.IO v4 packets carried inside
//! its message frames. Binary attachments are not supported.

use crate::errors::StreamError;
use serde::Deserialize;
use serde_json::Value;

pub const DEFAULT_NAMESPACE: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub ping_interval: u64,
    #[serde(default)]
    pub ping_timeout: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(Handshake),
    Close,
    Ping(String),
    Pong(String),
    Message(String),
    Noop,
}

impl EnginePacket {
    pub fn decode(frame: &str) -> Result<Self, StreamError> {
        let mut chars = frame.chars();
        let kind = chars
            .next()
            .ok_or_else(|| StreamError::Protocol("empty frame".into()))?;
        let body = chars.as_str();
        match kind {
            '0' => serde_json::from_str(body)
                .map(EnginePacket::Open)
                .map_err(|err| StreamError::Protocol(format!("bad handshake: {err}"))),
            '1' => Ok(EnginePacket::Close),
            '2' => Ok(EnginePacket::Ping(body.to_string())),
            '3' => Ok(EnginePacket::Pong(body.to_string())),
            '4' => Ok(EnginePacket::Message(body.to_string())),
            '6' => Ok(EnginePacket::Noop),
            other => Err(StreamError::Protocol(format!("unknown engine packet type {other:?}"))),
        }
    }

    pub fn encode(&self) -> String {
        match self {
            EnginePacket::Open(handshake) => format!(
                "0{{\"sid\":{},\"pingInterval\":{},\"pingTimeout\":{}}}",
                Value::String(handshake.sid.clone()),
                handshake.ping_interval,
                handshake.ping_timeout
            ),
            EnginePacket::Close => "1".to_string(),
            EnginePacket::Ping(data) => format!("2{data}"),
            EnginePacket::Pong(data) => format!("3{data}"),
            EnginePacket::Message(data) => format!("4{data}"),
            EnginePacket::Noop => "6".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketPacketKind {
    Connect,
    Disconnect,
    Event,
    Ack,
    ConnectError,
}

impl SocketPacketKind {
    fn code(self) -> char {
        match self {
            SocketPacketKind::Connect => '0',
            SocketPacketKind::Disconnect => '1',
            SocketPacketKind::Event => '2',
            SocketPacketKind::Ack => '3',
            SocketPacketKind::ConnectError => '4',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SocketPacket {
    pub kind: SocketPacketKind,
    pub namespace: String,
    pub ack_id: Option<u64>,
    pub data: Option<Value>,
}

impl SocketPacket {
    pub fn connect(namespace: &str) -> Self {
        Self {
            kind: SocketPacketKind::Connect,
            namespace: namespace.to_string(),
            ack_id: None,
            data: None,
        }
    }

    pub fn event(name: &str, payload: Value) -> Self {
        Self {
            kind: SocketPacketKind::Event,
            namespace: DEFAULT_NAMESPACE.to_string(),
            ack_id: None,
            data: Some(Value::Array(vec![Value::String(name.to_string()), payload])),
        }
    }

    /// Decodes the body of an engine message frame (without the leading `4`).
    pub fn decode(body: &str) -> Result<Self, StreamError> {
        let mut chars = body.chars();
        let kind = match chars.next() {
            Some('0') => SocketPacketKind::Connect,
            Some('1') => SocketPacketKind::Disconnect,
            Some('2') => SocketPacketKind::Event,
            Some('3') => SocketPacketKind::Ack,
            Some('4') => SocketPacketKind::ConnectError,
            Some('5' | '6') => {
                return Err(StreamError::Protocol("binary packets are not supported".into()));
            }
            Some(other) => {
                return Err(StreamError::Protocol(format!("unknown socket packet type {other:?}")));
            }
            None => return Err(StreamError::Protocol("empty socket packet".into())),
        };
        let mut rest = chars.as_str();

        let namespace = if rest.starts_with('/') {
            let (namespace, tail) = match rest.find(',') {
                Some(idx) => (&rest[..idx], &rest[idx + 1..]),
                None => (rest, ""),
            };
            rest = tail;
            namespace.to_string()
        } else {
            DEFAULT_NAMESPACE.to_string()
        };

        let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        let ack_id = if digits > 0 {
            let id = rest[..digits]
                .parse()
                .map_err(|err| StreamError::Protocol(format!("bad ack id: {err}")))?;
            rest = &rest[digits..];
            Some(id)
        } else {
            None
        };

        let data = if rest.is_empty() {
            None
        } else {
            Some(
                serde_json::from_str(rest)
                    .map_err(|err| StreamError::Protocol(format!("bad packet payload: {err}")))?,
            )
        };

        Ok(Self {
            kind,
            namespace,
            ack_id,
            data,
        })
    }

    /// Encodes as a full engine message frame.
    pub fn encode(&self) -> String {
        let mut out = String::from("4");
        out.push(self.kind.code());
        if self.namespace != DEFAULT_NAMESPACE {
            out.push_str(&self.namespace);
            out.push(',');
        }
        if let Some(id) = self.ack_id {
            out.push_str(&id.to_string());
        }
        if let Some(data) = &self.data {
            out.push_str(&data.to_string());
        }
        out
    }

    /// Event name and first argument, when this is a named event.
    pub fn as_event(&self) -> Option<(&str, Option<&Value>)> {
        if self.kind != SocketPacketKind::Event {
            return None;
        }
        let args = self.data.as_ref()?.as_array()?;
        let name = args.first()?.as_str()?;
        Some((name, args.get(1)))
    }
}

/// Maps an http/ws base address to the Engine.IO websocket endpoint.
///
/// The websocket client is built without a TLS backend, so https and wss
/// addresses are refused here instead of failing on every connect.
pub fn websocket_url(base: &str) -> Result<String, StreamError> {
    let (scheme, rest) = base
        .split_once("://")
        .ok_or_else(|| StreamError::InvalidUrl(base.to_string()))?;
    match scheme.to_ascii_lowercase().as_str() {
        "http" | "ws" => {}
        "https" | "wss" => return Err(StreamError::TlsUnsupported(base.to_string())),
        _ => return Err(StreamError::InvalidUrl(base.to_string())),
    }
    let authority = rest.split('/').next().unwrap_or_default();
    if authority.is_empty() {
        return Err(StreamError::InvalidUrl(base.to_string()));
    }
    Ok(format!("ws://{authority}/socket.io/?EIO=4&transport=websocket"))
}
