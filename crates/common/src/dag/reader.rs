use std::vec;

use bytes::Bytes;
use futures::Stream;

use super::{DagError, DagLink, DagNode, DagService};
use crate::cancel::CancellationToken;

/// Lazy, in-order reader over the payloads of a DAG.
///
/// Nodes are visited depth first in link order, each node's own payload
///  before its children. Children are fetched only when the reader gets
///  to them.
#[derive(Debug)]
pub struct DagReader {
    dag: DagService,
    cancel: CancellationToken,
    size: u64,
    pending: Option<Bytes>,
    stack: Vec<vec::IntoIter<DagLink>>,
}

impl DagReader {
    pub fn new(root: DagNode, dag: DagService, cancel: CancellationToken) -> Self {
        let size = root.size();
        let (data, links) = root.into_parts();
        Self {
            dag,
            cancel,
            size,
            pending: Some(data),
            stack: vec![links.into_iter()],
        }
    }

    /// Total payload size recorded in the root
    pub fn size(&self) -> u64 {
        self.size
    }

    /// The next non-empty payload, or `None` at the end of the DAG
    pub async fn read_chunk(&mut self) -> Result<Option<Bytes>, DagError> {
        loop {
            if let Some(data) = self.pending.take() {
                if !data.is_empty() {
                    return Ok(Some(data));
                }
            }

            let Some(frame) = self.stack.last_mut() else {
                return Ok(None);
            };
            let Some(link) = frame.next() else {
                self.stack.pop();
                continue;
            };
            // drop the parent frame before descending into its last child
            if frame.len() == 0 {
                self.stack.pop();
            }

            let node = self.dag.get(link.cid(), &self.cancel).await?;
            let (data, links) = node.into_parts();
            self.pending = Some(data);
            if !links.is_empty() {
                self.stack.push(links.into_iter());
            }
        }
    }

    /// Read everything that's left into memory
    pub async fn read_to_end(mut self) -> Result<Vec<u8>, DagError> {
        let mut out = Vec::new();
        while let Some(chunk) = self.read_chunk().await? {
            out.extend_from_slice(&chunk);
        }
        Ok(out)
    }

    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes, DagError>> + Send {
        futures::stream::try_unfold(self, |mut reader| async move {
            let chunk = reader.read_chunk().await?;
            Ok::<_, DagError>(chunk.map(|chunk| (chunk, reader)))
        })
    }

    #[cfg(test)]
    fn depth(&self) -> usize {
        self.stack.len()
    }
}
