//! Merkle DAGs of file content.
//!
//! A byte stream is cut into chunks by a [`Splitter`], each chunk becomes a
//!  leaf [`DagNode`], and a [`DagBuilder`] links the leaves into a tree (or a
//!  chain) stored through a [`DagService`]. A [`DagReader`] walks the same
//!  structure back into the original bytes.

mod builder;
mod chunker;
mod node;
mod reader;
mod service;

pub use builder::{DagBuilder, Layout, DEFAULT_MAX_LINKS};
pub use chunker::{Chunks, SizeSplitter, Splitter, DEFAULT_CHUNK_SIZE};
pub use node::{DagLink, DagNode};
pub use reader::DagReader;
pub use service::DagService;

use crate::error::ErrorKind;
use crate::exchange::ExchangeError;
use crate::linked_data::{Cid, CodecError};

#[derive(Debug, thiserror::Error)]
pub enum DagError {
    #[error("node not found: {0}")]
    NotFound(Cid),
    #[error("operation cancelled")]
    Cancelled,
    #[error("node {cid} is corrupt: {reason}")]
    Corrupt { cid: Cid, reason: String },
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
    #[error("exchange error: {0}")]
    Exchange(ExchangeError),
}

impl From<ExchangeError> for DagError {
    fn from(err: ExchangeError) -> Self {
        match err {
            ExchangeError::NotFound(cid) => DagError::NotFound(cid),
            ExchangeError::Cancelled(_) => DagError::Cancelled,
            ExchangeError::Corrupt(cid) => DagError::Corrupt {
                cid,
                reason: "no provider returned a matching block".to_string(),
            },
            err => DagError::Exchange(err),
        }
    }
}

impl DagError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DagError::NotFound(_) => ErrorKind::NotFound,
            DagError::Cancelled => ErrorKind::Cancelled,
            DagError::Corrupt { .. } => ErrorKind::Corrupt,
            DagError::Codec(_) | DagError::Io(_) => ErrorKind::Other,
            DagError::Exchange(err) => err.kind(),
        }
    }
}
