/**
 * Local block storage keyed by CID.
 *  A thin layer over iroh-blobs, plus the
 *  trait the rest of the crate stores through.
 */
pub mod blockstore;
/**
 * Cancellation plumbing shared by every
 *  blocking entry point.
 */
pub mod cancel;
/**
 * Chunking, DAG construction and lazy
 *  DAG reads.
 */
pub mod dag;
/**
 * Injectable latency for storage, routing
 *  and transport.
 */
pub mod delay;
/**
 * Coarse error classification shared by
 *  every layer's error type.
 */
pub mod error;
/**
 * Block exchange between peers: routing,
 *  an in-process network and sessions.
 */
pub mod exchange;
/**
 * Internal wrapper around IPLD, renamed to
 *  something a little more down-to-earth.
 * Handles CIDs, blocks and the DAG-CBOR codec.
 */
pub mod linked_data;
/**
 * References, naming and path resolution.
 */
pub mod path;
/**
 * Add/cat scenarios over a virtual network
 *  with tunable latencies.
 */
pub mod testkit;

pub mod prelude {
    pub use crate::blockstore::{BlobsStore, Blockstore};
    pub use crate::cancel::CancellationToken;
    pub use crate::dag::{DagBuilder, DagNode, DagReader, DagService, Layout, SizeSplitter};
    pub use crate::delay::{Delay, Delayed};
    pub use crate::error::ErrorKind;
    pub use crate::exchange::{Exchange, PeerId, Session, SessionGenerator};
    pub use crate::linked_data::{Block, Cid};
    pub use crate::path::{Reference, Resolver};
    pub use crate::testkit::Config;
}
