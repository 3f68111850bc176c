//! Codec module - payload conversion at the handler boundary.
//!
//! - [`RawCodec`] - Pass-through for handlers that take raw bytes
//! - [`MsgPackCodec`] - MessagePack using `rmp-serde` for structured arguments and replies
//!
//! Registration never touches payload bytes. Codecs are only used by
//! [`HandlerDescriptor`](crate::handler::HandlerDescriptor) when a dispatcher
//! asks it to decode an argument or when a handler reply is encoded.
//!
//! # Example
//!
//! ```
//! use service_registry::codec::{MsgPackCodec, RawCodec};
//!
//! let encoded = MsgPackCodec::encode(&"hello").unwrap();
//! let decoded: String = MsgPackCodec::decode(&encoded).unwrap();
//! assert_eq!(decoded, "hello");
//!
//! let raw = RawCodec::decode(b"binary data");
//! assert_eq!(&raw[..], b"binary data");
//! ```

mod msgpack;
mod raw;

pub use msgpack::MsgPackCodec;
pub use raw::RawCodec;
