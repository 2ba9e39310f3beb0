//! References and their resolution to DAG nodes.
//!
//! A reference is a bare cid or a `/`-separated path. Paths rooted at a
//!  cid are immutable; paths rooted at a name go through a [`NameSystem`]
//!  first. Once a path has an immutable root its segments are walked link
//!  by link.

mod naming;
mod reference;
mod resolver;

pub use naming::{MemoryNameSystem, NameError, NameSystem, OfflineNameSystem};
pub use reference::{Path, PathError, PathRoot, Reference, IPFS_NAMESPACE, IPNS_NAMESPACE};
pub use resolver::{ResolveError, Resolver, DEFAULT_DEPTH_LIMIT};
