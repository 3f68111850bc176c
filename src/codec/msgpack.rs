//! MsgPack codec using `rmp-serde`.
//!
//! Structs are written as maps (`to_vec_named`) so that field order does not
//! matter to non-Rust peers.

use std::any::Any;

use bytes::Bytes;

use crate::error::Result;

/// MessagePack codec for structured arguments and replies.
pub struct MsgPackCodec;

impl MsgPackCodec {
    /// Encode a value to MsgPack bytes.
    ///
    /// # Errors
    ///
    /// Returns error if the value cannot be serialized.
    #[inline]
    pub fn encode<T: serde::Serialize + ?Sized>(value: &T) -> Result<Bytes> {
        Ok(Bytes::from(rmp_serde::to_vec_named(value)?))
    }

    /// Decode MsgPack bytes to a value.
    ///
    /// # Errors
    ///
    /// Returns error if the bytes cannot be deserialized to type T.
    #[inline]
    pub fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        Ok(rmp_serde::from_slice(bytes)?)
    }

    /// Decode MsgPack bytes into a boxed, type-erased `T`.
    pub fn decode_boxed<T>(bytes: &[u8]) -> Result<Box<dyn Any + Send>>
    where
        T: serde::de::DeserializeOwned + Send + 'static,
    {
        let value: T = Self::decode(bytes)?;
        Ok(Box::new(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct LoginRequest {
        user: String,
        token: u64,
    }

    #[test]
    fn test_encode_decode_struct() {
        let original = LoginRequest {
            user: "alice".to_string(),
            token: 7,
        };

        let encoded = MsgPackCodec::encode(&original).unwrap();
        let decoded: LoginRequest = MsgPackCodec::decode(&encoded).unwrap();

        assert_eq!(decoded, original);
    }

    #[test]
    fn test_struct_encoded_as_map() {
        let encoded = MsgPackCodec::encode(&LoginRequest {
            user: "bob".to_string(),
            token: 1,
        })
        .unwrap();

        // fixmap with 2 entries
        assert_eq!(encoded[0], 0x82);
    }

    #[test]
    fn test_decode_boxed_downcasts() {
        let encoded = MsgPackCodec::encode(&42u32).unwrap();
        let boxed = MsgPackCodec::decode_boxed::<u32>(&encoded).unwrap();

        assert_eq!(*boxed.downcast::<u32>().unwrap(), 42);
    }

    #[test]
    fn test_decode_invalid_data() {
        let invalid = [0xc1];
        let result: Result<String> = MsgPackCodec::decode(&invalid);

        assert!(matches!(result, Err(ServiceError::MsgPackDecode(_))));
    }

    #[test]
    fn test_none_encodes_as_nil() {
        let encoded = MsgPackCodec::encode(&Option::<u8>::None).unwrap();
        assert_eq!(&encoded[..], &[0xc0]);
    }
}
