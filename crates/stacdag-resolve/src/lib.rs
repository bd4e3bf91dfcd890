//! Conversion of a STAC catalog tree into a content-addressed DAG.
//!
//! Documents are read from a [`CatalogSource`], stripped of navigation
//! links ([`normalize`]), and addressed bottom-up by a [`TreeResolver`]: a
//! document's links are rewritten to the cids of their targets before the
//! document itself is encoded and stored. The cid of the root catalog names
//! the whole tree.
//!
//! # Scoping
//!
//! Each directory is resolved in its own namespace. A parent sees a child
//! directory's documents as `<child>/<name>`, never by bare name, and never
//! sees grandchildren at all.

pub mod addresser;
pub mod config;
pub mod error;
pub mod namespace;
pub mod normalize;
pub mod resolver;
pub mod schedule;
pub mod source;

pub use addresser::{AddressError, BlockAddresser, ContentAddresser};
pub use config::{ConfigError, ResolverConfig};
pub use error::{ErrorKind, ResolveError, ResolveResult, UnresolvedLink};
pub use namespace::{merge_subdirectories, normalize_href, ResolvedItemMap};
pub use normalize::normalize;
pub use resolver::{Resolution, ResolveStats, TreeResolver};
pub use schedule::Schedule;
pub use source::{CatalogSource, EntryKind, FsCatalogSource, MemoryCatalog, SourceEntry};
