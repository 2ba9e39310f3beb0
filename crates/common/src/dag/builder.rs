use std::io::Read;

use bytes::Bytes;

use super::{DagError, DagLink, DagNode, DagService, Splitter};
use crate::cancel::CancellationToken;
use crate::linked_data::Cid;

pub const DEFAULT_MAX_LINKS: usize = 174;

/// Shape of the DAG a [`DagBuilder`] produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Every leaf at the same depth, at most `max_links` children per parent
    Balanced { max_links: usize },
    /// Each chain node links to one leaf and then to the rest of the chain
    Chained,
}

impl Default for Layout {
    fn default() -> Self {
        Layout::Balanced {
            max_links: DEFAULT_MAX_LINKS,
        }
    }
}

/// Turns a byte stream into a DAG, storing each node as it goes
#[derive(Debug, Clone)]
pub struct DagBuilder {
    dag: DagService,
    layout: Layout,
}

impl DagBuilder {
    pub fn new(dag: DagService) -> Self {
        Self {
            dag,
            layout: Layout::default(),
        }
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Chunk `reader`, store every node and return the root cid
    pub async fn build<R, S>(
        &self,
        reader: R,
        splitter: &S,
        cancel: &CancellationToken,
    ) -> Result<Cid, DagError>
    where
        R: Read + Send,
        S: Splitter,
    {
        let mut leaves = 0usize;
        let mut bytes = 0u64;
        let mut layout = match self.layout {
            Layout::Balanced { max_links } => LayoutState::Balanced {
                max_links: max_links.max(2),
                levels: vec![Vec::new()],
            },
            Layout::Chained => LayoutState::Chained { leaves: Vec::new() },
        };

        for chunk in splitter.split(reader) {
            if cancel.is_cancelled() {
                return Err(DagError::Cancelled);
            }
            let leaf = DagNode::leaf(chunk?)?;
            self.dag.put(&leaf).await?;
            leaves += 1;
            bytes += leaf.size();
            layout.push(&self.dag, leaf.link("")).await?;
        }
        if cancel.is_cancelled() {
            return Err(DagError::Cancelled);
        }

        let root = match layout.finish(&self.dag).await? {
            Some(root) => root,
            None => {
                let empty = DagNode::leaf(Bytes::new())?;
                self.dag.put(&empty).await?
            }
        };
        tracing::debug!(%root, leaves, bytes, layout = ?self.layout, "DagBuilder::build: complete");
        Ok(root)
    }
}

enum LayoutState {
    /// `levels[0]` holds leaf links, `levels[n]` links to nodes of height n
    Balanced {
        max_links: usize,
        levels: Vec<Vec<DagLink>>,
    },
    Chained {
        leaves: Vec<DagLink>,
    },
}

impl LayoutState {
    async fn push(&mut self, dag: &DagService, leaf: DagLink) -> Result<(), DagError> {
        match self {
            LayoutState::Balanced { max_links, levels } => {
                levels[0].push(leaf);
                let mut depth = 0;
                while levels[depth].len() == *max_links {
                    let links = std::mem::take(&mut levels[depth]);
                    let parent = store_parent(dag, links).await?;
                    if levels.len() == depth + 1 {
                        levels.push(Vec::new());
                    }
                    levels[depth + 1].push(parent);
                    depth += 1;
                }
            }
            LayoutState::Chained { leaves } => leaves.push(leaf),
        }
        Ok(())
    }

    /// The root cid, or `None` if nothing was pushed
    async fn finish(self, dag: &DagService) -> Result<Option<Cid>, DagError> {
        match self {
            LayoutState::Balanced { mut levels, .. } => {
                let mut depth = 0;
                loop {
                    let is_top = levels[depth + 1..].iter().all(Vec::is_empty);
                    if is_top {
                        match levels[depth].len() {
                            0 => return Ok(None),
                            1 => return Ok(Some(*levels[depth][0].cid())),
                            _ => {}
                        }
                    }
                    if !levels[depth].is_empty() {
                        let links = std::mem::take(&mut levels[depth]);
                        let parent = store_parent(dag, links).await?;
                        if levels.len() == depth + 1 {
                            levels.push(Vec::new());
                        }
                        levels[depth + 1].push(parent);
                    }
                    depth += 1;
                }
            }
            LayoutState::Chained { leaves } => {
                if leaves.len() <= 1 {
                    return Ok(leaves.first().map(|leaf| *leaf.cid()));
                }
                let mut next: Option<DagLink> = None;
                for leaf in leaves.into_iter().rev() {
                    let mut links = vec![leaf];
                    links.extend(next.take());
                    next = Some(store_parent(dag, links).await?);
                }
                Ok(next.map(|link| *link.cid()))
            }
        }
    }
}

async fn store_parent(dag: &DagService, links: Vec<DagLink>) -> Result<DagLink, DagError> {
    let node = DagNode::new(Bytes::new(), links)?;
    dag.put(&node).await?;
    Ok(node.link(""))
}
