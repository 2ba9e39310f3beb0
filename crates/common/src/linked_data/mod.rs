//! Content identifiers, blocks, and the DAG-CBOR codec.
//!
//! Every piece of data the system stores is a [`Block`]: a run of bytes
//! addressed by a [`Cid`] derived from those bytes. CIDs here are always
//! version 1, carry a BLAKE3 multihash, and tag the content codec:
//!
//! - [`LD_RAW_CODEC`] for opaque bytes
//! - [`LD_DAG_CBOR_CODEC`] for structured DAG nodes
//!
//! The BLAKE3 digest inside a CID is the same hash the blob store keys
//! content by, so a CID maps straight onto a storage key
//! (see [`blob_hash`]).

mod block;
mod codec;
mod content_id;

pub use self::block::Block;
pub use self::content_id::{
    blob_hash, compute_cid, parse_cid, Cid, CidError, BLAKE3_MH_CODE, LD_DAG_CBOR_CODEC,
    LD_RAW_CODEC,
};
pub use self::codec::{BlockEncoded, Codec, CodecError, DagCborCodec};
