use std::fmt;
use std::str::FromStr;

use crate::linked_data::{parse_cid, Cid, CidError};

pub const IPFS_NAMESPACE: &str = "ipfs";
pub const IPNS_NAMESPACE: &str = "ipns";

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("empty reference")]
    Empty,
    #[error("path {0:?} contains an empty segment")]
    EmptySegment(String),
    #[error("path {path:?} has no root after /{namespace}/")]
    MissingRoot { namespace: String, path: String },
    #[error("invalid cid: {0}")]
    Cid(#[from] CidError),
}

/// Where a path starts
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathRoot {
    /// An immutable root
    Cid(Cid),
    /// A mutable name, looked up through a naming system
    Name(String),
}

/// A root followed by link names
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    root: PathRoot,
    segments: Vec<String>,
}

impl Path {
    pub fn from_cid(cid: Cid) -> Self {
        Self {
            root: PathRoot::Cid(cid),
            segments: Vec::new(),
        }
    }

    pub fn from_name(name: impl Into<String>) -> Self {
        Self {
            root: PathRoot::Name(name.into()),
            segments: Vec::new(),
        }
    }

    /// Parse a `/`-separated path.
    ///
    /// The leading slash is optional and one trailing slash is ignored.
    ///  `/ipfs/<cid>/..` roots at a cid; `/ipns/<name>/..`, or any other
    ///  first segment, roots at a name.
    pub fn parse(input: &str) -> Result<Self, PathError> {
        let trimmed = input.trim();
        let stripped = trimmed.strip_prefix('/').unwrap_or(trimmed);
        let stripped = stripped.strip_suffix('/').unwrap_or(stripped);
        if stripped.is_empty() {
            return Err(PathError::Empty);
        }

        let segments: Vec<&str> = stripped.split('/').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(PathError::EmptySegment(input.to_string()));
        }

        let (root, rest) = match segments.as_slice() {
            [ns, root, rest @ ..] if *ns == IPFS_NAMESPACE => (PathRoot::Cid(parse_cid(root)?), rest),
            [ns, root, rest @ ..] if *ns == IPNS_NAMESPACE => {
                (PathRoot::Name(root.to_string()), rest)
            }
            [ns] if *ns == IPFS_NAMESPACE || *ns == IPNS_NAMESPACE => {
                return Err(PathError::MissingRoot {
                    namespace: ns.to_string(),
                    path: input.to_string(),
                })
            }
            [name, rest @ ..] => (PathRoot::Name(name.to_string()), rest),
            [] => return Err(PathError::Empty),
        };

        Ok(Self {
            root,
            segments: rest.iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn root(&self) -> &PathRoot {
        &self.root
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_immutable(&self) -> bool {
        matches!(self.root, PathRoot::Cid(_))
    }

    /// This path with `segments` appended
    pub fn join<S: AsRef<str>>(&self, segments: &[S]) -> Self {
        let mut joined = self.clone();
        joined
            .segments
            .extend(segments.iter().map(|s| s.as_ref().to_string()));
        joined
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root {
            PathRoot::Cid(cid) => write!(f, "/{}/{}", IPFS_NAMESPACE, cid)?,
            PathRoot::Name(name) => write!(f, "/{}/{}", IPNS_NAMESPACE, name)?,
        }
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Anything a caller can ask to resolve
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    Cid(Cid),
    Path(Path),
}

impl Reference {
    /// Input with a `/` is a path; anything else must be a bare cid
    pub fn parse(input: &str) -> Result<Self, PathError> {
        if input.trim().is_empty() {
            return Err(PathError::Empty);
        }
        if input.contains('/') {
            Ok(Reference::Path(Path::parse(input)?))
        } else {
            Ok(Reference::Cid(parse_cid(input)?))
        }
    }
}

impl FromStr for Reference {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Cid(cid) => write!(f, "{}", cid),
            Reference::Path(path) => write!(f, "{}", path),
        }
    }
}
