use iroh_blobs::Hash;
use multihash::Multihash;

pub use ::cid::Cid;

/// Multicodec for raw, uninterpreted bytes
pub const LD_RAW_CODEC: u64 = 0x55;
/// Multicodec for DAG-CBOR encoded nodes
pub const LD_DAG_CBOR_CODEC: u64 = 0x71;
/// Multihash code for a 32 byte BLAKE3 digest
pub const BLAKE3_MH_CODE: u64 = 0x1e;

const BLAKE3_DIGEST_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum CidError {
    #[error("empty content identifier")]
    Empty,
    #[error("malformed content identifier '{input}': {source}")]
    Malformed {
        input: String,
        #[source]
        source: ::cid::Error,
    },
    #[error("unsupported multihash {code:#x} ({len} byte digest)")]
    UnsupportedHash { code: u64, len: usize },
}

/// Derive the CID of `data` under the given content codec.
pub fn compute_cid(codec: u64, data: &[u8]) -> Cid {
    let digest = blake3::hash(data);
    let mh = Multihash::<64>::wrap(BLAKE3_MH_CODE, digest.as_bytes())
        .expect("a 32 byte digest always fits a 64 byte multihash");
    Cid::new_v1(codec, mh)
}

/// Parse the textual form of a CID.
pub fn parse_cid(input: &str) -> Result<Cid, CidError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CidError::Empty);
    }
    Cid::try_from(trimmed).map_err(|source| CidError::Malformed {
        input: trimmed.to_string(),
        source,
    })
}

/// The blob store key for a CID.
///
/// Only CIDs carrying a BLAKE3 digest can be addressed in the blob store;
///  anything else (e.g. a sha2 CIDv0) is reported as unsupported.
pub fn blob_hash(cid: &Cid) -> Result<Hash, CidError> {
    let mh = cid.hash();
    let digest = mh.digest();
    if mh.code() != BLAKE3_MH_CODE || digest.len() != BLAKE3_DIGEST_LEN {
        return Err(CidError::UnsupportedHash {
            code: mh.code(),
            len: digest.len(),
        });
    }
    let mut bytes = [0u8; BLAKE3_DIGEST_LEN];
    bytes.copy_from_slice(digest);
    Ok(Hash::from_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_bytes_same_cid() {
        let a = compute_cid(LD_RAW_CODEC, b"hello world");
        let b = compute_cid(LD_RAW_CODEC, b"hello world");
        let c = compute_cid(LD_RAW_CODEC, b"hello world!");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_codec_is_part_of_identity() {
        let raw = compute_cid(LD_RAW_CODEC, b"node");
        let cbor = compute_cid(LD_DAG_CBOR_CODEC, b"node");
        assert_ne!(raw, cbor);
        assert_eq!(raw.hash(), cbor.hash());
    }

    #[test]
    fn test_parse_display() {
        let cid = compute_cid(LD_DAG_CBOR_CODEC, b"some node bytes");
        let text = cid.to_string();
        assert!(text.starts_with('b'));
        assert_eq!(parse_cid(&text).unwrap(), cid);
        assert_eq!(parse_cid(&format!("  {}\n", text)).unwrap(), cid);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse_cid(""), Err(CidError::Empty)));
        assert!(matches!(parse_cid("   "), Err(CidError::Empty)));
        assert!(matches!(
            parse_cid("not-a-cid"),
            Err(CidError::Malformed { .. })
        ));
    }

    #[test]
    fn test_blob_hash_matches_blake3() {
        let data = b"blob contents";
        let cid = compute_cid(LD_RAW_CODEC, data);
        let hash = blob_hash(&cid).unwrap();
        assert_eq!(hash, Hash::new(data));
    }

    #[test]
    fn test_blob_hash_rejects_foreign_multihash() {
        // sha2-256
        let mh = Multihash::<64>::wrap(0x12, &[7u8; 32]).unwrap();
        let cid = Cid::new_v1(LD_RAW_CODEC, mh);
        assert!(matches!(
            blob_hash(&cid),
            Err(CidError::UnsupportedHash { code: 0x12, .. })
        ));
    }
}
