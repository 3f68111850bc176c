//! Raw codec - pass-through for binary data.

use std::any::Any;

use bytes::Bytes;

/// Raw codec that passes bytes through without transformation.
pub struct RawCodec;

impl RawCodec {
    /// Copy a byte slice into `Bytes`.
    #[inline]
    pub fn decode(data: &[u8]) -> Bytes {
        Bytes::copy_from_slice(data)
    }

    /// Copy a byte slice into a boxed, type-erased `Bytes`.
    #[inline]
    pub fn decode_boxed(data: &[u8]) -> Box<dyn Any + Send> {
        Box::new(Self::decode(data))
    }

    /// Pass `Bytes` through unchanged (zero-copy).
    #[inline]
    pub fn encode_bytes(data: Bytes) -> Bytes {
        data
    }
}
