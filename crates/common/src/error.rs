use std::fmt;

/// Coarse classification shared by every error in the crate.
///
/// Each layer keeps its own error type; `kind()` lets callers branch on
///  what went wrong without matching through the whole stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed CID or path string
    InvalidReference,
    /// A naming lookup was required but no naming system is reachable
    Offline,
    /// The content is not held locally and no peer could supply it
    NotFound,
    /// Bytes were fetched but are not what the caller expected
    Corrupt,
    /// The caller gave up via its cancellation token
    Cancelled,
    /// Anything else (closed substrates, backend failures, ...)
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidReference => "invalid reference",
            ErrorKind::Offline => "offline",
            ErrorKind::NotFound => "not found",
            ErrorKind::Corrupt => "corrupt",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Other => "other",
        };
        f.write_str(name)
    }
}
