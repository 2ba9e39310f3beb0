use serde::{de::DeserializeOwned, Serialize};

use super::content_id::LD_DAG_CBOR_CODEC;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("failed to encode block: {0}")]
    Encode(String),
    #[error("failed to decode block: {0}")]
    Decode(String),
}

/// A serialization format with a multicodec tag
pub trait Codec {
    const CODE: u64;

    fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError>;
    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError>;
}

/// DAG-CBOR, the canonical encoding for structured nodes
#[derive(Debug, Clone, Copy, Default)]
pub struct DagCborCodec;

impl Codec for DagCborCodec {
    const CODE: u64 = LD_DAG_CBOR_CODEC;

    fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
        serde_ipld_dagcbor::to_vec(value).map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
        serde_ipld_dagcbor::from_slice(bytes).map_err(|e| CodecError::Decode(e.to_string()))
    }
}

/// Types that live in the store as blocks of a given codec.
///  Implementors usually just opt in with an empty impl.
pub trait BlockEncoded<C: Codec>: Serialize + DeserializeOwned {
    fn encode(&self) -> Result<Vec<u8>, CodecError> {
        C::encode(self)
    }

    fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        C::decode(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Pair {
        left: u64,
        right: String,
    }

    impl BlockEncoded<DagCborCodec> for Pair {}

    #[test]
    fn test_encode_is_deterministic() {
        let pair = Pair {
            left: 7,
            right: "seven".into(),
        };
        assert_eq!(pair.encode().unwrap(), pair.encode().unwrap());
        assert_eq!(Pair::decode(&pair.encode().unwrap()).unwrap(), pair);
    }

    #[test]
    fn test_decode_garbage() {
        let result = Pair::decode(&[0xff, 0x00, 0x13]);
        assert!(matches!(result, Err(CodecError::Decode(_))));
    }
}
