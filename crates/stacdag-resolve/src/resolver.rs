//! Bottom-up resolution of a catalog tree.
//!
//! [`TreeResolver`] walks the tree depth-first. For every directory it
//!
//! 1. resolves all subdirectories (concurrently) and merges their
//!    namespaces, prefixing keys with the subdirectory name,
//! 2. loads and normalizes the documents of the directory itself,
//! 3. orders them so that sibling link targets are addressed first
//!    (see [`schedule::plan`]),
//! 4. replaces every link `href` with the target's cid and addresses the
//!    document,
//! 5. returns only its own documents' cids to the parent.
//!
//! A document is never hashed before every block it links to exists. Any
//! failure aborts the whole traversal: a parent's cids are meaningless if a
//! child failed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::{stream, StreamExt, TryStreamExt};
use serde::Serialize;
use stacdag_codec::CanonicalEncoder;
use stacdag_store::BlockStore;
use stacdag_types::{Cid, Document, NormalizedDocument};
use tracing::{debug, info, info_span, Instrument};

use crate::addresser::{AddressError, BlockAddresser, ContentAddresser};
use crate::config::ResolverConfig;
use crate::error::{ResolveError, ResolveResult, UnresolvedLink};
use crate::namespace::{merge_subdirectories, ResolvedItemMap};
use crate::normalize::normalize;
use crate::schedule;
use crate::source::{CatalogSource, SourceEntry};

/// Counters aggregated over a resolved subtree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ResolveStats {
    /// Directories visited, including the root.
    pub directories: usize,
    /// Documents addressed.
    pub documents: usize,
}

impl ResolveStats {
    fn merge(self, other: Self) -> Self {
        Self {
            directories: self.directories + other.directories,
            documents: self.documents + other.documents,
        }
    }
}

/// Result of resolving one directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// Cids of the documents located directly in the directory.
    pub items: ResolvedItemMap,
    /// Totals for the directory and everything below it.
    pub stats: ResolveStats,
}

/// Converts a catalog tree into content-addressed blocks.
pub struct TreeResolver<S, A> {
    source: S,
    addresser: A,
    config: ResolverConfig,
}

impl<S> TreeResolver<S, BlockAddresser>
where
    S: CatalogSource,
{
    /// Resolver writing blocks to `store`, encoded with the configured
    /// block size limit.
    pub fn with_store(source: S, store: Arc<dyn BlockStore>, config: ResolverConfig) -> Self {
        let addresser = BlockAddresser::new(store, CanonicalEncoder::new(config.max_block_size));
        Self::new(source, addresser, config)
    }
}

impl<S, A> TreeResolver<S, A>
where
    S: CatalogSource,
    A: ContentAddresser,
{
    pub fn new(source: S, addresser: A, config: ResolverConfig) -> Self {
        Self {
            source,
            addresser,
            config,
        }
    }

    /// Resolve the tree rooted at `root` and return the cids of the
    /// documents located directly in `root`.
    pub async fn resolve(&self, root: &Path) -> ResolveResult<ResolvedItemMap> {
        Ok(self.resolve_with_report(root).await?.items)
    }

    /// Like [`resolve`](Self::resolve), also reporting totals.
    pub async fn resolve_with_report(&self, root: &Path) -> ResolveResult<Resolution> {
        self.resolve_directory(root.to_path_buf()).await
    }

    fn resolve_directory(&self, directory: PathBuf) -> BoxFuture<'_, ResolveResult<Resolution>> {
        let span = info_span!("resolve_directory", directory = %directory.display());
        Box::pin(
            async move {
                let mut entries = self
                    .source
                    .list(&directory)
                    .await
                    .map_err(|source| ResolveError::Io {
                        path: directory.clone(),
                        source,
                    })?;
                entries.sort_by(|a, b| a.name.cmp(&b.name));

                let (subdirectories, files): (Vec<SourceEntry>, Vec<SourceEntry>) =
                    entries.into_iter().partition(SourceEntry::is_dir);
                let document_names: Vec<String> = files
                    .into_iter()
                    .filter_map(|entry| {
                        if entry.is_file() && self.config.is_document(&entry.name) {
                            Some(entry.name)
                        } else {
                            debug!(name = %entry.name, kind = ?entry.kind, "skipping entry");
                            None
                        }
                    })
                    .collect();

                let children: Vec<(String, Resolution)> = stream::iter(subdirectories)
                    .map(|entry| {
                        let path = directory.join(&entry.name);
                        async move {
                            let resolution = self.resolve_directory(path).await?;
                            Ok::<_, ResolveError>((entry.name, resolution))
                        }
                    })
                    .buffered(self.config.max_concurrent_directories)
                    .try_collect()
                    .await?;

                let child_stats = children
                    .iter()
                    .fold(ResolveStats::default(), |acc, (_, child)| acc.merge(child.stats));
                let subdirectory_items = merge_subdirectories(
                    &directory,
                    children.into_iter().map(|(name, child)| (name, child.items)),
                )?;

                let documents: BTreeMap<String, NormalizedDocument> =
                    stream::iter(document_names)
                        .map(|name| {
                            let path = directory.join(&name);
                            async move {
                                let document = self.load(&path).await?;
                                Ok::<_, ResolveError>((name, document))
                            }
                        })
                        .buffered(self.config.max_concurrent_documents)
                        .try_collect()
                        .await?;

                let items = self
                    .address_documents(&directory, documents, &subdirectory_items)
                    .await?;

                info!(
                    documents = items.len(),
                    subdirectories = subdirectory_items.len(),
                    cids = ?items.cids().map(ToString::to_string).collect::<Vec<_>>(),
                    "resolved directory"
                );

                let stats = child_stats.merge(ResolveStats {
                    directories: 1,
                    documents: items.len(),
                });
                Ok(Resolution { items, stats })
            }
            .instrument(span),
        )
    }

    /// Read, parse and normalize one document.
    async fn load(&self, path: &Path) -> ResolveResult<NormalizedDocument> {
        let bytes = self
            .source
            .read(path)
            .await
            .map_err(|source| ResolveError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let document = Document::from_slice(&bytes).map_err(|source| ResolveError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), kind = %document.kind, "loaded document");
        Ok(normalize(document))
    }

    /// Address the documents of one directory, wave by wave.
    async fn address_documents(
        &self,
        directory: &Path,
        mut documents: BTreeMap<String, NormalizedDocument>,
        subdirectory_items: &ResolvedItemMap,
    ) -> ResolveResult<ResolvedItemMap> {
        let schedule = schedule::plan(directory, &documents, subdirectory_items)?;
        let mut items = ResolvedItemMap::new();

        for (depth, wave) in schedule.waves.into_iter().enumerate() {
            let mut ready = Vec::with_capacity(wave.len());
            for (name, document) in wave
                .into_iter()
                .filter_map(|name| documents.remove_entry(&name))
            {
                let resolved = document
                    .resolve(|link| {
                        subdirectory_items
                            .lookup(&link.href)
                            .or_else(|| items.lookup(&link.href))
                            .copied()
                    })
                    .map_err(|missing| ResolveError::UnresolvedReference {
                        directory: directory.to_path_buf(),
                        links: missing
                            .into_iter()
                            .map(|href| UnresolvedLink {
                                document: name.clone(),
                                href,
                            })
                            .collect(),
                    })?;
                ready.push((name, resolved));
            }

            let addressed: Vec<(String, Cid)> = stream::iter(ready)
                .map(|(name, document)| async move {
                    let cid = self
                        .addresser
                        .address(&document)
                        .await
                        .map_err(|e| address_error(directory.join(&name), e))?;
                    debug!(document = %name, kind = %document.kind, depth, %cid, "addressed document");
                    Ok::<_, ResolveError>((name, cid))
                })
                .buffered(self.config.max_concurrent_documents)
                .try_collect()
                .await?;

            for (name, cid) in addressed {
                items.insert(name, cid);
            }
        }

        Ok(items)
    }
}

fn address_error(path: PathBuf, error: AddressError) -> ResolveError {
    match error {
        AddressError::Encoding(source) => ResolveError::Encoding { path, source },
        AddressError::Store(source) => ResolveError::Store { path, source },
        AddressError::Task(reason) => ResolveError::Task { path, reason },
    }
}
