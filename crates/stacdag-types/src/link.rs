use std::fmt;

use serde_json::{Map, Value};

use crate::cid::Cid;
use crate::error::TypeError;

/// The relation kind of a link.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
    /// Location of the document itself.
    SelfRef,
    /// The root catalog of the tree.
    Root,
    /// The enclosing catalog.
    Parent,
    /// A child catalog.
    Child,
    /// An item belonging to this catalog.
    Item,
    /// The collection an item belongs to (usually an absolute URL).
    Collection,
    /// Any relation without special meaning here.
    Other(String),
}

impl Relation {
    /// Parse a `rel` attribute value.
    pub fn parse(rel: &str) -> Self {
        match rel {
            "self" => Self::SelfRef,
            "root" => Self::Root,
            "parent" => Self::Parent,
            "child" => Self::Child,
            "item" => Self::Item,
            "collection" => Self::Collection,
            other => Self::Other(other.to_owned()),
        }
    }

    /// The `rel` attribute value.
    pub fn as_str(&self) -> &str {
        match self {
            Self::SelfRef => "self",
            Self::Root => "root",
            Self::Parent => "parent",
            Self::Child => "child",
            Self::Item => "item",
            Self::Collection => "collection",
            Self::Other(rel) => rel,
        }
    }

    /// Tree-navigation relations: meaningless once documents are content-addressed.
    pub fn is_navigation(&self) -> bool {
        matches!(self, Self::SelfRef | Self::Root | Self::Parent)
    }

    /// Relations whose target must be resolved to a cid.
    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Child | Self::Item)
    }

    /// Relations that survive normalization and so need a usable `href`.
    pub fn is_retained(&self) -> bool {
        self.is_reference() || *self == Self::Collection
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A link as it appears in a source document: `href` is a relative path
/// (or a URL for collections).
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
    pub rel: Relation,
    pub href: String,
    pub title: Option<String>,
    /// Every other link attribute (`type`, ...), kept verbatim.
    pub extra: Map<String, Value>,
}

impl Link {
    /// Parse entry `index` of a document's `links` array.
    ///
    /// Parsing is lenient for links that normalization drops: a missing or
    /// non-string `rel`, or a non-object entry, yields [`Relation::Other`],
    /// and only retained relations must carry a string `href`. A non-string
    /// `title` counts as no title.
    pub fn from_value(index: usize, value: Value) -> Result<Self, TypeError> {
        let Value::Object(mut extra) = value else {
            return Ok(Self {
                rel: Relation::Other(String::new()),
                href: String::new(),
                title: None,
                extra: Map::new(),
            });
        };

        let rel = match extra.remove("rel") {
            Some(Value::String(rel)) => Relation::parse(&rel),
            other => Relation::Other(other.map(|v| v.to_string()).unwrap_or_default()),
        };

        let href = match extra.remove("href") {
            Some(Value::String(href)) => href,
            _ if !rel.is_retained() => String::new(),
            Some(other) => {
                return Err(TypeError::MalformedLink {
                    index,
                    reason: format!("`href` of a `{rel}` link is not a string: {other}"),
                })
            }
            None => {
                return Err(TypeError::MalformedLink {
                    index,
                    reason: format!("`{rel}` link has no `href`"),
                })
            }
        };

        let title = match extra.remove("title") {
            Some(Value::String(title)) => Some(title),
            _ => None,
        };

        Ok(Self {
            rel,
            href,
            title,
            extra,
        })
    }
}

/// A link that survived normalization.
///
/// `title` is always present and non-empty for `child` and `item` links.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedLink {
    pub rel: Relation,
    pub href: String,
    pub title: Option<String>,
    pub extra: Map<String, Value>,
}

impl NormalizedLink {
    /// Replace `href` with the cid of the target block.
    pub fn resolve(self, cid: Cid) -> ResolvedLink {
        ResolvedLink {
            rel: self.rel,
            href: cid,
            title: self.title,
            extra: self.extra,
        }
    }
}

/// A link whose target has been addressed.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedLink {
    pub rel: Relation,
    pub href: Cid,
    pub title: Option<String>,
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn relation_parse_known_values() {
        assert_eq!(Relation::parse("self"), Relation::SelfRef);
        assert_eq!(Relation::parse("child"), Relation::Child);
        assert_eq!(Relation::parse("collection"), Relation::Collection);
        assert_eq!(
            Relation::parse("license"),
            Relation::Other("license".into())
        );
    }

    #[test]
    fn relation_string_form_is_stable() {
        for rel in ["self", "root", "parent", "child", "item", "collection", "via"] {
            assert_eq!(Relation::parse(rel).as_str(), rel);
        }
    }

    #[test]
    fn navigation_and_reference_are_disjoint() {
        for rel in ["self", "root", "parent", "child", "item", "collection"] {
            let rel = Relation::parse(rel);
            assert!(!(rel.is_navigation() && rel.is_reference()));
        }
        assert!(!Relation::Collection.is_reference());
    }

    #[test]
    fn link_keeps_extra_attributes() {
        let link = Link::from_value(
            0,
            json!({
                "rel": "item",
                "href": "item1.json",
                "type": "application/json"
            }),
        )
        .unwrap();
        assert_eq!(link.rel, Relation::Item);
        assert_eq!(link.href, "item1.json");
        assert!(link.title.is_none());
        assert_eq!(link.extra["type"], json!("application/json"));
        assert!(!link.extra.contains_key("rel"));
    }

    #[test]
    fn retained_link_without_href_is_rejected() {
        let err = Link::from_value(3, json!({"rel": "item"})).unwrap_err();
        assert!(matches!(err, TypeError::MalformedLink { index: 3, .. }));

        let err = Link::from_value(0, json!({"rel": "collection", "href": 5})).unwrap_err();
        assert!(matches!(err, TypeError::MalformedLink { index: 0, .. }));
    }

    #[test]
    fn odd_rel_values_parse_as_other() {
        let numeric = Link::from_value(0, json!({"rel": 7, "href": "x.json"})).unwrap();
        assert!(matches!(numeric.rel, Relation::Other(_)));

        let missing = Link::from_value(0, json!({"href": "x.json"})).unwrap();
        assert!(matches!(missing.rel, Relation::Other(_)));

        let not_an_object = Link::from_value(0, json!("x.json")).unwrap();
        assert!(!not_an_object.rel.is_retained());
    }

    #[test]
    fn dropped_relations_need_no_href() {
        let link = Link::from_value(0, json!({"rel": "self"})).unwrap();
        assert_eq!(link.rel, Relation::SelfRef);
        assert!(link.href.is_empty());
    }

    #[test]
    fn non_string_title_counts_as_absent() {
        let link = Link::from_value(0, json!({"rel": "child", "href": "c.json", "title": 3})).unwrap();
        assert!(link.title.is_none());
    }
}
