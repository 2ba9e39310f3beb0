use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::linked_data::{
    Block, BlockEncoded, Cid, CodecError, DagCborCodec, LD_DAG_CBOR_CODEC,
};

/// A named, sized edge to a child node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DagLink {
    cid: Cid,
    name: String,
    /// Aggregate payload size of the subtree behind the link
    size: u64,
}

impl DagLink {
    pub fn new(name: impl Into<String>, cid: Cid, size: u64) -> Self {
        Self {
            cid,
            name: name.into(),
            size,
        }
    }

    pub fn cid(&self) -> &Cid {
        &self.cid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Wire form of a node. Field order matches DAG-CBOR canonical key order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct NodeRepr {
    data: Bytes,
    links: Vec<DagLink>,
}

impl BlockEncoded<DagCborCodec> for NodeRepr {}

/// An immutable DAG node: an opaque payload plus ordered links.
///
/// The node keeps its encoded block around, so its cid is fixed at
///  construction and two nodes are equal exactly when their cids are.
#[derive(Debug, Clone)]
pub struct DagNode {
    repr: NodeRepr,
    block: Block,
}

impl DagNode {
    pub fn new(data: impl Into<Bytes>, links: Vec<DagLink>) -> Result<Self, CodecError> {
        let repr = NodeRepr {
            data: data.into(),
            links,
        };
        let encoded = repr.encode()?;
        let block = Block::with_codec(LD_DAG_CBOR_CODEC, encoded);
        Ok(Self { repr, block })
    }

    /// A node with a payload and no links
    pub fn leaf(data: impl Into<Bytes>) -> Result<Self, CodecError> {
        Self::new(data, Vec::new())
    }

    /// Decode a node from a block. The block must carry the dag-cbor codec.
    pub fn decode(block: Block) -> Result<Self, CodecError> {
        if block.cid().codec() != LD_DAG_CBOR_CODEC {
            return Err(CodecError::Decode(format!(
                "block {} has codec {:#x}, expected dag-cbor",
                block.cid(),
                block.cid().codec()
            )));
        }
        let repr = NodeRepr::decode(block.data())?;
        Ok(Self { repr, block })
    }

    pub fn cid(&self) -> &Cid {
        self.block.cid()
    }

    pub fn block(&self) -> &Block {
        &self.block
    }

    pub fn data(&self) -> &Bytes {
        &self.repr.data
    }

    pub fn links(&self) -> &[DagLink] {
        &self.repr.links
    }

    pub fn is_leaf(&self) -> bool {
        self.repr.links.is_empty()
    }

    /// First link with the given name
    pub fn get_link(&self, name: &str) -> Option<&DagLink> {
        self.repr.links.iter().find(|link| link.name == name)
    }

    /// Payload bytes in this node and everything below it
    pub fn size(&self) -> u64 {
        self.repr.data.len() as u64 + self.repr.links.iter().map(|l| l.size).sum::<u64>()
    }

    /// A link to this node under `name`
    pub fn link(&self, name: impl Into<String>) -> DagLink {
        DagLink::new(name, *self.cid(), self.size())
    }

    pub fn into_parts(self) -> (Bytes, Vec<DagLink>) {
        (self.repr.data, self.repr.links)
    }
}

impl PartialEq for DagNode {
    fn eq(&self, other: &Self) -> bool {
        self.cid() == other.cid()
    }
}

impl Eq for DagNode {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_content_same_cid() {
        let a = DagNode::leaf(Bytes::from_static(b"payload")).unwrap();
        let b = DagNode::leaf(b"payload".to_vec()).unwrap();
        assert_eq!(a.cid(), b.cid());
        assert_eq!(a, b);
        assert_eq!(a.cid().codec(), LD_DAG_CBOR_CODEC);
        assert!(a.block().verify());
    }

    #[test]
    fn test_decode_round_trip() {
        let leaf = DagNode::leaf(b"child".to_vec()).unwrap();
        let parent = DagNode::new(b"root".to_vec(), vec![leaf.link("child")]).unwrap();

        let decoded = DagNode::decode(parent.block().clone()).unwrap();
        assert_eq!(decoded.data().as_ref(), b"root");
        assert_eq!(decoded.links(), parent.links());
        assert_eq!(decoded.get_link("child").unwrap().cid(), leaf.cid());
        assert!(decoded.get_link("other").is_none());
        assert_eq!(decoded.size(), 9);
    }

    #[test]
    fn test_link_order_changes_cid() {
        let a = DagNode::leaf(b"a".to_vec()).unwrap();
        let b = DagNode::leaf(b"b".to_vec()).unwrap();
        let ab = DagNode::new(Bytes::new(), vec![a.link(""), b.link("")]).unwrap();
        let ba = DagNode::new(Bytes::new(), vec![b.link(""), a.link("")]).unwrap();
        assert_ne!(ab.cid(), ba.cid());
    }

    #[test]
    fn test_decode_rejects_raw_blocks() {
        let raw = Block::new(b"not a node".to_vec());
        assert!(DagNode::decode(raw).is_err());

        let garbage = Block::with_codec(LD_DAG_CBOR_CODEC, vec![0xff, 0x00, 0x13]);
        assert!(DagNode::decode(garbage).is_err());
    }
}
