use std::sync::Arc;

use super::{NameError, NameSystem, OfflineNameSystem, Path, PathError, PathRoot, Reference};
use crate::cancel::{until_cancelled, CancellationToken};
use crate::dag::{DagError, DagNode, DagService};
use crate::error::ErrorKind;
use crate::linked_data::Cid;

/// How many name hops a single resolution may take
pub const DEFAULT_DEPTH_LIMIT: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("invalid reference: {0}")]
    InvalidReference(#[from] PathError),
    #[error("cannot resolve name {0:?} while offline")]
    Offline(String),
    #[error("name {0:?} does not resolve to anything")]
    NameNotFound(String),
    #[error("name resolution exceeded {0} hops")]
    RecursionLimit(usize),
    #[error("no link named {name:?} at {path}")]
    LinkNotFound { name: String, path: String },
    #[error("resolution cancelled")]
    Cancelled,
    #[error("dag error: {0}")]
    Dag(DagError),
}

impl From<DagError> for ResolveError {
    fn from(err: DagError) -> Self {
        match err {
            DagError::Cancelled => ResolveError::Cancelled,
            err => ResolveError::Dag(err),
        }
    }
}

impl ResolveError {
    fn from_name(name: &str, err: NameError) -> Self {
        match err {
            NameError::Offline => ResolveError::Offline(name.to_string()),
            NameError::NotFound(_) => ResolveError::NameNotFound(name.to_string()),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::InvalidReference(_) => ErrorKind::InvalidReference,
            ResolveError::Offline(_) => ErrorKind::Offline,
            ResolveError::NameNotFound(_) | ResolveError::LinkNotFound { .. } => ErrorKind::NotFound,
            ResolveError::RecursionLimit(_) => ErrorKind::Other,
            ResolveError::Cancelled => ErrorKind::Cancelled,
            ResolveError::Dag(err) => err.kind(),
        }
    }
}

/// Turns references (bare cids or paths) into DAG nodes
#[derive(Debug, Clone)]
pub struct Resolver {
    dag: DagService,
    names: Arc<dyn NameSystem>,
    depth_limit: usize,
}

impl Resolver {
    pub fn new(dag: DagService, names: Arc<dyn NameSystem>) -> Self {
        Self {
            dag,
            names,
            depth_limit: DEFAULT_DEPTH_LIMIT,
        }
    }

    /// A resolver with no naming system; name roots fail with `Offline`
    pub fn offline(dag: DagService) -> Self {
        Self::new(dag, Arc::new(OfflineNameSystem))
    }

    pub fn with_depth_limit(mut self, depth_limit: usize) -> Self {
        self.depth_limit = depth_limit;
        self
    }

    pub fn dag(&self) -> &DagService {
        &self.dag
    }

    /// Parse and resolve a reference string
    pub async fn resolve(
        &self,
        reference: &str,
        cancel: &CancellationToken,
    ) -> Result<DagNode, ResolveError> {
        let reference = Reference::parse(reference)?;
        self.resolve_reference(&reference, cancel).await
    }

    pub async fn resolve_reference(
        &self,
        reference: &Reference,
        cancel: &CancellationToken,
    ) -> Result<DagNode, ResolveError> {
        match reference {
            Reference::Cid(cid) => Ok(self.dag.get(cid, cancel).await?),
            Reference::Path(path) => self.resolve_path(path, cancel).await,
        }
    }

    pub async fn resolve_path(
        &self,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<DagNode, ResolveError> {
        let (root, path) = self.resolve_root(path, cancel).await?;
        let root_node = self.dag.get(&root, cancel).await?;
        self.walk_links(root_node, &path, cancel).await
    }

    /// Follow name roots until the path starts at a cid
    pub async fn resolve_names(
        &self,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<Path, ResolveError> {
        let (_, path) = self.resolve_root(path, cancel).await?;
        Ok(path)
    }

    async fn resolve_root(
        &self,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<(Cid, Path), ResolveError> {
        let mut current = path.clone();
        let mut hops = 0;
        loop {
            let name = match current.root() {
                PathRoot::Cid(cid) => {
                    let cid = *cid;
                    return Ok((cid, current));
                }
                PathRoot::Name(name) => name.clone(),
            };
            if hops == self.depth_limit {
                return Err(ResolveError::RecursionLimit(self.depth_limit));
            }
            hops += 1;

            let target = until_cancelled(cancel, self.names.resolve(&name))
                .await
                .ok_or(ResolveError::Cancelled)?
                .map_err(|err| ResolveError::from_name(&name, err))?;
            tracing::debug!(%name, %target, hops, "Resolver::resolve_root: name resolved");
            current = target.join(current.segments());
        }
    }

    async fn walk_links(
        &self,
        root: DagNode,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<DagNode, ResolveError> {
        let mut current = root;
        let mut consumed = Path::from_cid(*current.cid());

        for segment in path.segments() {
            let next = current
                .get_link(segment)
                .ok_or_else(|| ResolveError::LinkNotFound {
                    name: segment.clone(),
                    path: consumed.to_string(),
                })?;
            let next_cid = *next.cid();
            consumed = consumed.join(&[segment]);
            current = self.dag.get(&next_cid, cancel).await?;
        }
        Ok(current)
    }
}
