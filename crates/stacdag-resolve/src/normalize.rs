//! Link normalization.
//!
//! Tree-navigation links (`self`, `root`, `parent`) have no meaning once a
//! document is a block, so they are dropped. `child` and `item` links are
//! kept and always carry a title, because their `href` is about to become
//! an opaque cid. `collection` links are kept as they are; the resolver
//! rejects them. Everything else is dropped.

use stacdag_types::{Document, NormalizedDocument, NormalizedLink, Relation};
use tracing::debug;

/// Normalize a parsed document. Pure; never fails.
pub fn normalize(document: Document) -> NormalizedDocument {
    debug!(kind = %document.kind, "normalizing document");
    let links = document
        .links
        .into_iter()
        .filter_map(|link| match link.rel {
            Relation::Child | Relation::Item => {
                let title = match link.title {
                    Some(title) if !title.is_empty() => title,
                    _ => {
                        debug!(href = %link.href, "no title given, using href");
                        link.href.clone()
                    }
                };
                Some(NormalizedLink {
                    rel: link.rel,
                    href: link.href,
                    title: Some(title),
                    extra: link.extra,
                })
            }
            Relation::Collection => Some(NormalizedLink {
                rel: link.rel,
                href: link.href,
                title: link.title,
                extra: link.extra,
            }),
            Relation::SelfRef | Relation::Root | Relation::Parent | Relation::Other(_) => None,
        })
        .collect();

    NormalizedDocument {
        kind: document.kind,
        links,
        attributes: document.attributes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::{json, Map};
    use stacdag_types::Link;

    fn doc(value: serde_json::Value) -> Document {
        Document::from_value(value).unwrap()
    }

    #[test]
    fn navigation_links_are_dropped() {
        let normalized = normalize(doc(json!({
            "id": "a",
            "links": [
                {"rel": "self", "href": "./a.json"},
                {"rel": "item", "href": "a.json"},
                {"rel": "root", "href": "../catalog.json"},
                {"rel": "parent", "href": "../catalog.json"}
            ]
        })));
        assert_eq!(normalized.links.len(), 1);
        assert_eq!(normalized.links[0].rel, Relation::Item);
        assert_eq!(normalized.links[0].href, "a.json");
    }

    #[test]
    fn missing_title_defaults_to_href() {
        let normalized = normalize(doc(json!({
            "links": [{"rel": "item", "href": "item1.json"}]
        })));
        assert_eq!(normalized.links[0].title.as_deref(), Some("item1.json"));
    }

    #[test]
    fn empty_title_defaults_to_href() {
        let normalized = normalize(doc(json!({
            "links": [{"rel": "child", "href": "sub/catalog.json", "title": ""}]
        })));
        assert_eq!(normalized.links[0].title.as_deref(), Some("sub/catalog.json"));
    }

    #[test]
    fn existing_title_is_kept() {
        let normalized = normalize(doc(json!({
            "links": [{"rel": "child", "href": "sub/catalog.json", "title": "Sub"}]
        })));
        assert_eq!(normalized.links[0].title.as_deref(), Some("Sub"));
    }

    #[test]
    fn unknown_relations_are_dropped() {
        let normalized = normalize(doc(json!({
            "links": [
                {"rel": "license", "href": "https://example.com/license"},
                {"rel": "via", "href": "https://example.com"}
            ]
        })));
        assert!(normalized.is_self_contained());
    }

    #[test]
    fn collection_links_are_retained_untouched() {
        let normalized = normalize(doc(json!({
            "asset": {},
            "links": [{"rel": "collection", "href": "https://example.com/collection.json"}]
        })));
        assert_eq!(normalized.links.len(), 1);
        assert_eq!(normalized.links[0].rel, Relation::Collection);
        assert!(normalized.links[0].title.is_none());
    }

    #[test]
    fn attributes_and_link_extras_pass_through() {
        let normalized = normalize(doc(json!({
            "id": "cat",
            "description": "d",
            "links": [{"rel": "item", "href": "i.json", "type": "application/json"}]
        })));
        assert_eq!(normalized.attributes["description"], json!("d"));
        assert_eq!(normalized.links[0].extra["type"], json!("application/json"));
    }

    fn any_relation() -> impl Strategy<Value = Relation> {
        prop_oneof![
            Just(Relation::SelfRef),
            Just(Relation::Root),
            Just(Relation::Parent),
            Just(Relation::Child),
            Just(Relation::Item),
            Just(Relation::Collection),
            "[a-z]{1,8}".prop_map(|rel| Relation::parse(&rel)),
        ]
    }

    fn any_link() -> impl Strategy<Value = Link> {
        (
            any_relation(),
            "[a-z0-9/._-]{1,16}",
            proptest::option::of("[a-zA-Z ]{0,8}"),
        )
            .prop_map(|(rel, href, title)| Link {
                rel,
                href,
                title,
                extra: Map::new(),
            })
    }

    proptest! {
        #[test]
        fn retained_links_are_never_navigation(links in proptest::collection::vec(any_link(), 0..12)) {
            let document = Document {
                kind: stacdag_types::DocumentKind::Catalog,
                links,
                attributes: Map::new(),
            };
            let normalized = normalize(document);
            for link in &normalized.links {
                prop_assert!(!link.rel.is_navigation());
                if link.rel.is_reference() {
                    prop_assert!(link.title.as_deref().is_some_and(|t| !t.is_empty()));
                }
            }
        }

        #[test]
        fn retained_links_keep_their_order(links in proptest::collection::vec(any_link(), 0..12)) {
            let expected: Vec<String> = links
                .iter()
                .filter(|l| l.rel.is_retained())
                .map(|l| l.href.clone())
                .collect();
            let document = Document {
                kind: stacdag_types::DocumentKind::Item,
                links,
                attributes: Map::new(),
            };
            let hrefs: Vec<String> = normalize(document).links.into_iter().map(|l| l.href).collect();
            prop_assert_eq!(hrefs, expected);
        }
    }
}
