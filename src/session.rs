//! Session passed to every handler.
//!
//! A [`Session`] identifies the connection a request arrived on and lets
//! handler code push messages back to it:
//! - `bind` / `uid` - associate a user id with the connection
//! - `push` - send a structured message (MsgPack)
//! - `push_raw` - send pre-encoded bytes
//!
//! The transport owns the receiving end of the outbound channel. A session
//! created with [`Session::new`] has no channel and silently drops pushes,
//! which is what unit tests want.

use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;
use tokio::sync::mpsc::UnboundedSender;

use crate::codec::{MsgPackCodec, RawCodec};
use crate::error::{Result, ServiceError};

/// Message pushed from handler code to the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    /// Route the client listens on.
    pub route: String,
    /// Encoded payload.
    pub payload: Bytes,
}

struct Inner {
    id: u64,
    uid: RwLock<Option<String>>,
    outbound: Option<UnboundedSender<Outbound>>,
}

/// Session capability handed to handlers as their first parameter.
///
/// `Session` is `Clone`; clones share the same bound uid and outbound channel.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

impl Session {
    /// Create a session without an outbound channel.
    pub fn new(id: u64) -> Self {
        Self::build(id, None)
    }

    /// Create a session that forwards pushes to `outbound`.
    pub fn with_outbound(id: u64, outbound: UnboundedSender<Outbound>) -> Self {
        Self::build(id, Some(outbound))
    }

    fn build(id: u64, outbound: Option<UnboundedSender<Outbound>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                id,
                uid: RwLock::new(None),
                outbound,
            }),
        }
    }

    /// Get the session ID.
    #[inline]
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Bind a user id to this session, replacing any previous one.
    pub fn bind(&self, uid: impl Into<String>) {
        *self.inner.uid.write() = Some(uid.into());
    }

    /// Get the bound user id.
    pub fn uid(&self) -> Option<String> {
        self.inner.uid.read().clone()
    }

    /// Push a structured message to the connection.
    pub fn push<T: serde::Serialize>(&self, route: &str, payload: &T) -> Result<()> {
        let data = MsgPackCodec::encode(payload)?;
        self.send(route, data)
    }

    /// Push pre-encoded bytes to the connection (zero-copy).
    pub fn push_raw(&self, route: &str, payload: Bytes) -> Result<()> {
        self.send(route, RawCodec::encode_bytes(payload))
    }

    fn send(&self, route: &str, payload: Bytes) -> Result<()> {
        let Some(outbound) = &self.inner.outbound else {
            return Ok(());
        };

        outbound
            .send(Outbound {
                route: route.to_string(),
                payload,
            })
            .map_err(|_| ServiceError::SessionClosed)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.inner.id)
            .field("uid", &*self.inner.uid.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    #[test]
    fn test_session_creation() {
        let session = Session::new(42);
        assert_eq!(session.id(), 42);
        assert_eq!(session.uid(), None);
    }

    #[test]
    fn test_bind_is_shared_by_clones() {
        let session = Session::new(1);
        let clone = session.clone();

        session.bind("alice");
        assert_eq!(clone.uid().as_deref(), Some("alice"));
    }

    #[test]
    fn test_push_without_outbound() {
        let session = Session::new(1);

        assert!(session.push("chat.message", &"hi").is_ok());
        assert!(session.push_raw("chat.raw", Bytes::from_static(b"hi")).is_ok());
    }

    #[test]
    fn test_push_with_outbound() {
        let (tx, mut rx) = unbounded_channel();
        let session = Session::with_outbound(7, tx);

        session.push("chat.message", &"hi").unwrap();
        session
            .push_raw("chat.raw", Bytes::from_static(b"\x01\x02"))
            .unwrap();

        let first = rx.try_recv().unwrap();
        assert_eq!(first.route, "chat.message");
        let text: String = MsgPackCodec::decode(&first.payload).unwrap();
        assert_eq!(text, "hi");

        let second = rx.try_recv().unwrap();
        assert_eq!(second.route, "chat.raw");
        assert_eq!(&second.payload[..], b"\x01\x02");
    }

    #[test]
    fn test_push_after_receiver_dropped() {
        let (tx, rx) = unbounded_channel();
        let session = Session::with_outbound(7, tx);
        drop(rx);

        let result = session.push("chat.message", &1u8);
        assert!(matches!(result, Err(ServiceError::SessionClosed)));
    }
}
