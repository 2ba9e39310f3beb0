use std::sync::Arc;

use super::{DagError, DagNode};
use crate::blockstore::Blockstore;
use crate::cancel::CancellationToken;
use crate::exchange::{Exchange, OfflineExchange};
use crate::linked_data::Cid;

/// Node-level get/put over an [`Exchange`].
///  The exchange only ever sees raw blocks; encoding happens here.
#[derive(Debug, Clone)]
pub struct DagService {
    exchange: Arc<dyn Exchange>,
}

impl DagService {
    pub fn new(exchange: Arc<dyn Exchange>) -> Self {
        Self { exchange }
    }

    /// A service that only ever reads local storage
    pub fn offline(blockstore: Arc<dyn Blockstore>) -> Self {
        Self::new(Arc::new(OfflineExchange::new(blockstore)))
    }

    pub fn exchange(&self) -> &Arc<dyn Exchange> {
        &self.exchange
    }

    pub async fn get(&self, cid: &Cid, cancel: &CancellationToken) -> Result<DagNode, DagError> {
        let block = self.exchange.get_block(cid, cancel).await?;
        DagNode::decode(block).map_err(|err| DagError::Corrupt {
            cid: *cid,
            reason: err.to_string(),
        })
    }

    pub async fn put(&self, node: &DagNode) -> Result<Cid, DagError> {
        let cid = *node.cid();
        if self.exchange.has_block(&cid).await? {
            // present locally, but an earlier announcement may have failed
            self.exchange.provide(&cid).await?;
            tracing::trace!(%cid, "DagService::put: already present");
            return Ok(cid);
        }
        self.exchange.put_block(node.block().clone()).await?;
        tracing::debug!(%cid, links = node.links().len(), "DagService::put: stored node");
        Ok(cid)
    }
}
