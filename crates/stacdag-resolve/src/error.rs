//! Error types for catalog resolution.

use std::fmt;
use std::path::PathBuf;

use stacdag_codec::CodecError;
use stacdag_store::StoreError;
use stacdag_types::TypeError;

/// A retained link that could not be mapped to a cid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnresolvedLink {
    /// File name of the document holding the link.
    pub document: String,
    /// The link target as written in the document.
    pub href: String,
}

impl fmt::Display for UnresolvedLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.document, self.href)
    }
}

/// Coarse classification of a [`ResolveError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Io,
    MalformedInput,
    UnresolvedReference,
    UnsupportedLink,
    Encoding,
    NamespaceCollision,
}

/// Errors that abort the resolution of a catalog tree.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Listing a directory or reading a file failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A document is not valid JSON or does not have the expected shape.
    #[error("malformed document {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: TypeError,
    },

    /// Retained links whose targets are neither in a subdirectory nor
    /// addressable siblings (missing files, cycles, self-links).
    #[error("unresolved references in {}: {}", directory.display(), join(links))]
    UnresolvedReference {
        directory: PathBuf,
        links: Vec<UnresolvedLink>,
    },

    /// A link relation the resolver refuses to guess a strategy for.
    #[error("unsupported `{rel}` link in {}: {href}", path.display())]
    UnsupportedLink {
        path: PathBuf,
        rel: String,
        href: String,
    },

    /// The document could not be canonically encoded.
    #[error("cannot encode {}: {source}", path.display())]
    Encoding {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    /// Persisting a block failed.
    #[error("cannot store block for {}: {source}", path.display())]
    Store {
        path: PathBuf,
        #[source]
        source: StoreError,
    },

    /// Two subdirectories contributed the same namespace key.
    #[error("namespace collision in {}: `{key}` is defined more than once", directory.display())]
    NamespaceCollision { directory: PathBuf, key: String },

    /// A spawned task panicked or was cancelled.
    #[error("task failed while processing {}: {reason}", path.display())]
    Task { path: PathBuf, reason: String },
}

impl ResolveError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } | Self::Store { .. } | Self::Task { .. } => ErrorKind::Io,
            Self::Malformed { .. } => ErrorKind::MalformedInput,
            Self::UnresolvedReference { .. } => ErrorKind::UnresolvedReference,
            Self::UnsupportedLink { .. } => ErrorKind::UnsupportedLink,
            Self::Encoding { .. } => ErrorKind::Encoding,
            Self::NamespaceCollision { .. } => ErrorKind::NamespaceCollision,
        }
    }
}

fn join(links: &[UnresolvedLink]) -> String {
    links
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convenience alias for resolution results.
pub type ResolveResult<T> = Result<T, ResolveError>;
