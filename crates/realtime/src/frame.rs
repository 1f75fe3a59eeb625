//! Engine.IO v4 / Socket.IO v5 text frame codec.
//!
//! Every WebSocket text frame starts with one Engine.IO packet type digit.
//! Type `4` (message) wraps a Socket.IO packet, which has its own type digit,
//! an optional `/namespace,` prefix, an optional numeric ack id and a JSON
//! body. Binary attachments are not supported.
//!
//! ```text
//! 2                       ping
//! 3                       pong
//! 40                      connect to the default namespace
//! 42["getMessage",{...}]  event
//! 42/admin,7["x",1]       event on /admin with ack id 7
//! ```

use serde_json::Value;

use crate::error::RealtimeError;

/// Default Socket.IO namespace.
pub const DEFAULT_NAMESPACE: &str = "/";

/// An Engine.IO packet.
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    /// Handshake data from the server (JSON text).
    Open(String),
    Close,
    Ping(String),
    Pong(String),
    Message(SocketPacket),
    Upgrade,
    Noop,
}

/// A Socket.IO packet carried inside an Engine.IO message.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect {
        namespace: String,
        data: Option<Value>,
    },
    Disconnect {
        namespace: String,
    },
    Event {
        namespace: String,
        ack_id: Option<u64>,
        name: String,
        args: Vec<Value>,
    },
    Ack {
        namespace: String,
        ack_id: u64,
        args: Vec<Value>,
    },
    ConnectError {
        namespace: String,
        data: Option<Value>,
    },
}

impl Packet {
    /// Connect to the default namespace.
    pub fn connect() -> Self {
        Packet::Message(SocketPacket::Connect {
            namespace: DEFAULT_NAMESPACE.to_string(),
            data: None,
        })
    }

    /// Leave the default namespace.
    pub fn disconnect() -> Self {
        Packet::Message(SocketPacket::Disconnect {
            namespace: DEFAULT_NAMESPACE.to_string(),
        })
    }

    /// A single-argument event on the default namespace.
    pub fn event(name: impl Into<String>, payload: Value) -> Self {
        Packet::Message(SocketPacket::Event {
            namespace: DEFAULT_NAMESPACE.to_string(),
            ack_id: None,
            name: name.into(),
            args: vec![payload],
        })
    }
}

/// Decode one text frame.
pub fn decode(frame: &str) -> Result<Packet, RealtimeError> {
    let mut chars = frame.chars();
    let kind = chars
        .next()
        .ok_or_else(|| RealtimeError::Protocol("empty frame".to_string()))?;
    let body = chars.as_str();

    match kind {
        '0' => Ok(Packet::Open(body.to_string())),
        '1' => Ok(Packet::Close),
        '2' => Ok(Packet::Ping(body.to_string())),
        '3' => Ok(Packet::Pong(body.to_string())),
        '4' => decode_socket(body).map(Packet::Message),
        '5' => Ok(Packet::Upgrade),
        '6' => Ok(Packet::Noop),
        other => Err(RealtimeError::Protocol(format!(
            "unknown engine packet type {:?}",
            other
        ))),
    }
}

fn decode_socket(body: &str) -> Result<SocketPacket, RealtimeError> {
    let mut chars = body.chars();
    let kind = chars
        .next()
        .ok_or_else(|| RealtimeError::Protocol("empty socket packet".to_string()))?;
    let mut rest = chars.as_str();

    let namespace = if rest.starts_with('/') {
        match rest.find(',') {
            Some(idx) => {
                let ns = &rest[..idx];
                rest = &rest[idx + 1..];
                ns.to_string()
            }
            None => {
                let ns = rest.to_string();
                rest = "";
                ns
            }
        }
    } else {
        DEFAULT_NAMESPACE.to_string()
    };

    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    let ack_id = if digits > 0 {
        let id = rest[..digits]
            .parse::<u64>()
            .map_err(|e| RealtimeError::Protocol(format!("bad ack id: {}", e)))?;
        rest = &rest[digits..];
        Some(id)
    } else {
        None
    };

    let data = if rest.is_empty() {
        None
    } else {
        Some(
            serde_json::from_str::<Value>(rest)
                .map_err(|e| RealtimeError::Protocol(format!("bad packet body: {}", e)))?,
        )
    };

    match kind {
        '0' => Ok(SocketPacket::Connect { namespace, data }),
        '1' => Ok(SocketPacket::Disconnect { namespace }),
        '2' => {
            let mut args = match data {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(RealtimeError::Protocol(
                        "event body is not an array".to_string(),
                    ))
                }
            };
            if args.is_empty() {
                return Err(RealtimeError::Protocol("event without a name".to_string()));
            }
            let name = match args.remove(0) {
                Value::String(name) => name,
                other => {
                    return Err(RealtimeError::Protocol(format!(
                        "event name is not a string: {}",
                        other
                    )))
                }
            };
            Ok(SocketPacket::Event {
                namespace,
                ack_id,
                name,
                args,
            })
        }
        '3' => {
            let ack_id = ack_id
                .ok_or_else(|| RealtimeError::Protocol("ack without an id".to_string()))?;
            let args = match data {
                Some(Value::Array(items)) => items,
                None => Vec::new(),
                Some(other) => vec![other],
            };
            Ok(SocketPacket::Ack {
                namespace,
                ack_id,
                args,
            })
        }
        '4' => Ok(SocketPacket::ConnectError { namespace, data }),
        '5' | '6' => Err(RealtimeError::Protocol(
            "binary packets are not supported".to_string(),
        )),
        other => Err(RealtimeError::Protocol(format!(
            "unknown socket packet type {:?}",
            other
        ))),
    }
}

/// Encode one packet as a text frame.
pub fn encode(packet: &Packet) -> String {
    match packet {
        Packet::Open(data) => format!("0{}", data),
        Packet::Close => "1".to_string(),
        Packet::Ping(data) => format!("2{}", data),
        Packet::Pong(data) => format!("3{}", data),
        Packet::Message(socket) => format!("4{}", encode_socket(socket)),
        Packet::Upgrade => "5".to_string(),
        Packet::Noop => "6".to_string(),
    }
}

fn encode_socket(packet: &SocketPacket) -> String {
    let mut out = String::new();
    match packet {
        SocketPacket::Connect { namespace, data } => {
            out.push('0');
            push_namespace(&mut out, namespace, data.is_some());
            if let Some(data) = data {
                out.push_str(&data.to_string());
            }
        }
        SocketPacket::Disconnect { namespace } => {
            out.push('1');
            push_namespace(&mut out, namespace, false);
        }
        SocketPacket::Event {
            namespace,
            ack_id,
            name,
            args,
        } => {
            out.push('2');
            push_namespace(&mut out, namespace, true);
            if let Some(id) = ack_id {
                out.push_str(&id.to_string());
            }
            let mut items = Vec::with_capacity(args.len() + 1);
            items.push(Value::String(name.clone()));
            items.extend(args.iter().cloned());
            out.push_str(&Value::Array(items).to_string());
        }
        SocketPacket::Ack {
            namespace,
            ack_id,
            args,
        } => {
            out.push('3');
            push_namespace(&mut out, namespace, true);
            out.push_str(&ack_id.to_string());
            out.push_str(&Value::Array(args.clone()).to_string());
        }
        SocketPacket::ConnectError { namespace, data } => {
            out.push('4');
            push_namespace(&mut out, namespace, data.is_some());
            if let Some(data) = data {
                out.push_str(&data.to_string());
            }
        }
    }
    out
}

fn push_namespace(out: &mut String, namespace: &str, followed: bool) {
    if namespace != DEFAULT_NAMESPACE {
        out.push_str(namespace);
        if followed {
            out.push(',');
        }
    }
}
