use bytes::Bytes;

use super::content_id::{compute_cid, Cid, LD_RAW_CODEC};

/// Raw bytes together with the CID derived from them.
///  Blocks are immutable and cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    cid: Cid,
    data: Bytes,
}

impl Block {
    /// Create a raw block, deriving its CID
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self::with_codec(LD_RAW_CODEC, data)
    }

    /// Create a block tagged with the given content codec
    pub fn with_codec(codec: u64, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        let cid = compute_cid(codec, &data);
        Self { cid, data }
    }

    /// Pair bytes with a CID the caller claims they hash to.
    ///  Use [`Block::verify`] before trusting blocks built this way.
    pub fn from_parts(cid: Cid, data: Bytes) -> Self {
        Self { cid, data }
    }

    pub fn cid(&self) -> &Cid {
        &self.cid
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn into_data(self) -> Bytes {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Check that the bytes really hash to the CID
    pub fn verify(&self) -> bool {
        compute_cid(self.cid.codec(), &self.data) == self.cid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_bytes_equal_cid() {
        let a = Block::new(b"payload".to_vec());
        let b = Block::new(Bytes::from_static(b"payload"));
        assert_eq!(a.cid(), b.cid());
        assert!(a.verify());
    }

    #[test]
    fn test_different_bytes_different_cid() {
        let a = Block::new(b"payload-a".to_vec());
        let b = Block::new(b"payload-b".to_vec());
        assert_ne!(a.cid(), b.cid());
    }

    #[test]
    fn test_from_parts_detects_tampering() {
        let good = Block::new(b"original".to_vec());
        let forged = Block::from_parts(*good.cid(), Bytes::from_static(b"tampered"));
        assert!(!forged.verify());
    }
}
