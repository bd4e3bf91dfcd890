//! Per-directory namespaces of addressed documents.
//!
//! A [`ResolvedItemMap`] maps a path relative to one directory to the cid of
//! the block produced for the document at that path. Each directory builds
//! its own map from the files it holds; a parent sees a child directory's
//! entries only through [`merge_subdirectories`], which prefixes every key
//! with the subdirectory name.

use std::collections::btree_map::{self, BTreeMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use stacdag_types::Cid;

use crate::error::{ResolveError, ResolveResult};

/// Relative path -> cid bindings visible at one directory scope.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolvedItemMap(BTreeMap<String, Cid>);

impl ResolvedItemMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up a key exactly as stored.
    pub fn get(&self, key: &str) -> Option<&Cid> {
        self.0.get(key)
    }

    /// Look up a link href after lexical normalization.
    pub fn lookup(&self, href: &str) -> Option<&Cid> {
        self.0.get(&normalize_href(href))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Bind `key` to `cid`. Returns the previous binding, if any.
    pub fn insert(&mut self, key: impl Into<String>, cid: Cid) -> Option<Cid> {
        self.0.insert(key.into(), cid)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Cid> {
        self.0.iter()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, String, Cid> {
        self.0.keys()
    }

    pub fn cids(&self) -> btree_map::Values<'_, String, Cid> {
        self.0.values()
    }
}

impl IntoIterator for ResolvedItemMap {
    type Item = (String, Cid);
    type IntoIter = btree_map::IntoIter<String, Cid>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResolvedItemMap {
    type Item = (&'a String, &'a Cid);
    type IntoIter = btree_map::Iter<'a, String, Cid>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, Cid)> for ResolvedItemMap {
    fn from_iter<I: IntoIterator<Item = (String, Cid)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Lexically normalize a relative href into namespace-key form.
///
/// `.` and empty segments are dropped, so `./sub//catalog.json` becomes
/// `sub/catalog.json`. `..` segments are kept: a key never contains them,
/// so such hrefs stay unresolvable.
pub fn normalize_href(href: &str) -> String {
    href.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Merge the namespaces of a directory's subdirectories into one map whose
/// keys are prefixed with the subdirectory name (`x.json` inside `a` becomes
/// `a/x.json`).
///
/// A key contributed twice is an error rather than last-write-wins.
pub fn merge_subdirectories<I>(directory: &Path, subdirectories: I) -> ResolveResult<ResolvedItemMap>
where
    I: IntoIterator<Item = (String, ResolvedItemMap)>,
{
    let mut merged = ResolvedItemMap::new();
    for (name, items) in subdirectories {
        for (key, cid) in items {
            let prefixed = normalize_href(&format!("{name}/{key}"));
            if merged.insert(prefixed.clone(), cid).is_some() {
                return Err(ResolveError::NamespaceCollision {
                    directory: directory.to_path_buf(),
                    key: prefixed,
                });
            }
        }
    }
    Ok(merged)
}
