//! Foundation types for stacdag.
//!
//! This crate provides the identifier and document types shared by every
//! other stacdag crate.
//!
//! # Key Types
//!
//! - [`Cid`] -- Content identifier of a block (BLAKE3, CIDv1 text form)
//! - [`Document`] -- A parsed catalog document
//! - [`NormalizedDocument`] -- A document with only its retained links
//! - [`ResolvedDocument`] -- A document whose links all point at cids
//! - [`Link`] / [`Relation`] -- Typed references between documents

pub mod cid;
pub mod document;
pub mod error;
pub mod link;

pub use cid::Cid;
pub use document::{Document, DocumentKind, NormalizedDocument, ResolvedDocument};
pub use error::TypeError;
pub use link::{Link, NormalizedLink, Relation, ResolvedLink};
