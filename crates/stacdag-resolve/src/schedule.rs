//! Addressing order for the documents of one directory.
//!
//! A document can only be hashed once every document it links to has a
//! cid. Targets in subdirectories are already addressed when a directory is
//! processed; targets among the siblings are not. [`plan`] builds the
//! sibling dependency graph and orders it with Kahn's algorithm into
//! waves: every document in a wave links only to subdirectory entries or to
//! documents of earlier waves, so the documents of one wave can be
//! addressed concurrently.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use stacdag_types::{NormalizedDocument, Relation};

use crate::error::{ResolveError, ResolveResult, UnresolvedLink};
use crate::namespace::{normalize_href, ResolvedItemMap};

/// Addressing order for one directory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Schedule {
    /// Document names, grouped into waves; each wave sorted by name.
    pub waves: Vec<Vec<String>>,
}

impl Schedule {
    /// Total number of scheduled documents.
    pub fn len(&self) -> usize {
        self.waves.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    /// Depth of the longest same-directory link chain.
    pub fn depth(&self) -> usize {
        self.waves.len()
    }
}

/// Order the documents of `directory`.
///
/// `documents` maps file names to normalized documents; `subdirectories` is
/// the merged namespace of the directory's subdirectories.
///
/// Fails with [`ResolveError::UnsupportedLink`] on the first `collection`
/// link, and with [`ResolveError::UnresolvedReference`] listing every link
/// that points nowhere, or that sits on (or behind) a dependency cycle.
pub fn plan(
    directory: &Path,
    documents: &BTreeMap<String, NormalizedDocument>,
    subdirectories: &ResolvedItemMap,
) -> ResolveResult<Schedule> {
    // name -> sibling names it links to
    let mut dependencies: BTreeMap<&str, BTreeSet<String>> = BTreeMap::new();
    let mut unresolved = Vec::new();

    for (name, document) in documents {
        let deps = dependencies.entry(name.as_str()).or_default();
        for link in &document.links {
            if link.rel == Relation::Collection {
                return Err(ResolveError::UnsupportedLink {
                    path: directory.join(name),
                    rel: link.rel.to_string(),
                    href: link.href.clone(),
                });
            }
            let key = normalize_href(&link.href);
            if subdirectories.contains_key(&key) {
                continue;
            }
            if documents.contains_key(&key) {
                deps.insert(key);
            } else {
                unresolved.push(UnresolvedLink {
                    document: name.clone(),
                    href: link.href.clone(),
                });
            }
        }
    }

    if !unresolved.is_empty() {
        return Err(ResolveError::UnresolvedReference {
            directory: directory.to_path_buf(),
            links: unresolved,
        });
    }

    // Kahn's algorithm. In-degree = number of siblings a document waits on.
    let mut in_degree: HashMap<&str, usize> = HashMap::new();
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
    for (&name, deps) in &dependencies {
        in_degree.insert(name, deps.len());
        for dep in deps {
            if let Some((target, _)) = documents.get_key_value(dep.as_str()) {
                dependents.entry(target.as_str()).or_default().push(name);
            }
        }
    }

    let mut waves = Vec::new();
    let mut current: Vec<&str> = dependencies
        .keys()
        .copied()
        .filter(|name| in_degree[name] == 0)
        .collect();

    while !current.is_empty() {
        let mut next = Vec::new();
        for &done in &current {
            for &waiting in dependents.get(done).map(Vec::as_slice).unwrap_or_default() {
                if let Some(degree) = in_degree.get_mut(waiting) {
                    *degree -= 1;
                    if *degree == 0 {
                        next.push(waiting);
                    }
                }
            }
        }
        next.sort_unstable();
        waves.push(current.iter().map(|name| name.to_string()).collect());
        current = next;
    }

    let stuck: BTreeSet<&str> = in_degree
        .iter()
        .filter(|(_, &degree)| degree > 0)
        .map(|(&name, _)| name)
        .collect();

    if !stuck.is_empty() {
        let on_cycle = &stuck;
        let links = stuck
            .iter()
            .flat_map(move |&name| {
                documents[name]
                    .links
                    .iter()
                    .filter(move |link| on_cycle.contains(normalize_href(&link.href).as_str()))
                    .map(move |link| UnresolvedLink {
                        document: name.to_owned(),
                        href: link.href.clone(),
                    })
            })
            .collect();
        return Err(ResolveError::UnresolvedReference {
            directory: directory.to_path_buf(),
            links,
        });
    }

    Ok(Schedule { waves })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::Map;
    use stacdag_types::{Cid, DocumentKind, NormalizedLink};

    fn doc(hrefs: &[&str]) -> NormalizedDocument {
        NormalizedDocument {
            kind: DocumentKind::Catalog,
            links: hrefs
                .iter()
                .map(|href| NormalizedLink {
                    rel: Relation::Item,
                    href: href.to_string(),
                    title: Some(href.to_string()),
                    extra: Map::new(),
                })
                .collect(),
            attributes: Map::new(),
        }
    }

    fn docs(entries: Vec<(&str, Vec<&str>)>) -> BTreeMap<String, NormalizedDocument> {
        entries
            .into_iter()
            .map(|(name, hrefs)| (name.to_string(), doc(&hrefs)))
            .collect()
    }

    fn waves(schedule: &Schedule) -> Vec<Vec<&str>> {
        schedule
            .waves
            .iter()
            .map(|wave| wave.iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn self_contained_documents_form_one_wave() {
        let documents = docs(vec![("item2.json", vec![]), ("item1.json", vec![])]);
        let schedule = plan(Path::new("leaf"), &documents, &ResolvedItemMap::new()).unwrap();
        assert_eq!(waves(&schedule), vec![vec!["item1.json", "item2.json"]]);
    }

    #[test]
    fn catalog_waits_for_its_items() {
        let documents = docs(vec![("catalog.json", vec!["item1.json"]), ("item1.json", vec![])]);
        let schedule = plan(Path::new("leaf"), &documents, &ResolvedItemMap::new()).unwrap();
        assert_eq!(
            waves(&schedule),
            vec![vec!["item1.json"], vec!["catalog.json"]]
        );
    }

    #[test]
    fn chains_deeper_than_one_level_resolve() {
        let documents = docs(vec![
            ("a.json", vec!["b.json"]),
            ("b.json", vec!["./c.json"]),
            ("c.json", vec![]),
        ]);
        let schedule = plan(Path::new("leaf"), &documents, &ResolvedItemMap::new()).unwrap();
        assert_eq!(schedule.depth(), 3);
        assert_eq!(
            waves(&schedule),
            vec![vec!["c.json"], vec!["b.json"], vec!["a.json"]]
        );
    }

    #[test]
    fn subdirectory_targets_are_not_dependencies() {
        let documents = docs(vec![("catalog.json", vec!["sub/catalog.json"])]);
        let mut subs = ResolvedItemMap::new();
        subs.insert("sub/catalog.json", Cid::from_bytes(b"sub"));
        let schedule = plan(Path::new("root"), &documents, &subs).unwrap();
        assert_eq!(waves(&schedule), vec![vec!["catalog.json"]]);
    }

    #[test]
    fn mutual_links_are_unresolved_for_both() {
        let documents = docs(vec![("a.json", vec!["b.json"]), ("b.json", vec!["a.json"])]);
        let err = plan(Path::new("leaf"), &documents, &ResolvedItemMap::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnresolvedReference);
        let ResolveError::UnresolvedReference { links, .. } = err else {
            unreachable!()
        };
        assert_eq!(
            links,
            vec![
                UnresolvedLink {
                    document: "a.json".into(),
                    href: "b.json".into()
                },
                UnresolvedLink {
                    document: "b.json".into(),
                    href: "a.json".into()
                },
            ]
        );
    }

    #[test]
    fn documents_behind_a_cycle_are_reported() {
        let documents = docs(vec![
            ("a.json", vec!["b.json"]),
            ("b.json", vec!["a.json"]),
            ("c.json", vec!["a.json"]),
            ("d.json", vec![]),
        ]);
        let err = plan(Path::new("leaf"), &documents, &ResolvedItemMap::new()).unwrap_err();
        let ResolveError::UnresolvedReference { links, .. } = err else {
            panic!("expected unresolved reference");
        };
        let documents: Vec<&str> = links.iter().map(|l| l.document.as_str()).collect();
        assert_eq!(documents, vec!["a.json", "b.json", "c.json"]);
    }

    #[test]
    fn self_link_is_a_cycle() {
        let documents = docs(vec![("a.json", vec!["a.json"])]);
        let err = plan(Path::new("leaf"), &documents, &ResolvedItemMap::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnresolvedReference);
    }

    #[test]
    fn missing_target_is_unresolved() {
        let documents = docs(vec![("catalog.json", vec!["missing.json", "../up.json"])]);
        let err = plan(Path::new("leaf"), &documents, &ResolvedItemMap::new()).unwrap_err();
        let ResolveError::UnresolvedReference { links, directory } = err else {
            panic!("expected unresolved reference");
        };
        assert_eq!(directory, Path::new("leaf"));
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn collection_link_is_unsupported() {
        let mut documents = docs(vec![("item.json", vec![])]);
        documents.get_mut("item.json").unwrap().links.push(NormalizedLink {
            rel: Relation::Collection,
            href: "https://example.com/collection.json".into(),
            title: None,
            extra: Map::new(),
        });
        let err = plan(Path::new("leaf"), &documents, &ResolvedItemMap::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedLink);
        assert!(err.to_string().contains("collection"));
    }

    #[test]
    fn empty_directory_has_empty_schedule() {
        let schedule = plan(Path::new("empty"), &BTreeMap::new(), &ResolvedItemMap::new()).unwrap();
        assert!(schedule.is_empty());
        assert_eq!(schedule.len(), 0);
    }
}
