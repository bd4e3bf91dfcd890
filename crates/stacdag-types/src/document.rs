//! Catalog documents at each processing stage.
//!
//! A document moves through three immutable stages:
//! [`Document`] (as parsed) -> [`NormalizedDocument`] (only retained links)
//! -> [`ResolvedDocument`] (every link points at a [`Cid`]). Top-level
//! attributes other than `links` travel through every stage untouched.

use serde_json::{Map, Value};

use crate::cid::Cid;
use crate::error::TypeError;
use crate::link::{Link, NormalizedLink, ResolvedLink};

/// Key holding the link list.
pub const LINKS_KEY: &str = "links";
/// Key whose presence marks a document as an item.
pub const ASSET_KEY: &str = "asset";

/// Document variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// Aggregates links to child catalogs or items.
    Catalog,
    /// A leaf asset.
    Item,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Catalog => write!(f, "catalog"),
            Self::Item => write!(f, "item"),
        }
    }
}

/// A parsed catalog document.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub kind: DocumentKind,
    pub links: Vec<Link>,
    /// Every top-level key except `links`.
    pub attributes: Map<String, Value>,
}

impl Document {
    /// Parse a document from raw JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TypeError> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| TypeError::MalformedJson(e.to_string()))?;
        Self::from_value(value)
    }

    /// Build a document from an already parsed JSON value.
    ///
    /// A missing `links` key is treated as an empty link list.
    pub fn from_value(value: Value) -> Result<Self, TypeError> {
        let Value::Object(mut attributes) = value else {
            return Err(TypeError::MalformedDocument(
                "top-level value is not an object".into(),
            ));
        };

        let links = match attributes.remove(LINKS_KEY) {
            None => Vec::new(),
            Some(Value::Array(raw)) => raw
                .into_iter()
                .enumerate()
                .map(|(index, link)| Link::from_value(index, link))
                .collect::<Result<Vec<Link>, _>>()?,
            Some(_) => {
                return Err(TypeError::MalformedDocument(
                    "`links` is not an array".into(),
                ))
            }
        };

        let kind = if attributes.contains_key(ASSET_KEY) {
            DocumentKind::Item
        } else {
            DocumentKind::Catalog
        };

        Ok(Self {
            kind,
            links,
            attributes,
        })
    }
}

/// A document holding only the links that matter once content-addressed.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedDocument {
    pub kind: DocumentKind,
    pub links: Vec<NormalizedLink>,
    pub attributes: Map<String, Value>,
}

impl NormalizedDocument {
    /// Whether the document can be addressed without resolving anything.
    pub fn is_self_contained(&self) -> bool {
        self.links.is_empty()
    }

    /// Resolve every link through `lookup`.
    ///
    /// On failure returns the hrefs that `lookup` could not map, in link order.
    pub fn resolve<F>(self, mut lookup: F) -> Result<ResolvedDocument, Vec<String>>
    where
        F: FnMut(&NormalizedLink) -> Option<Cid>,
    {
        let mut missing = Vec::new();
        let mut links = Vec::with_capacity(self.links.len());
        for link in self.links {
            match lookup(&link) {
                Some(cid) => links.push(link.resolve(cid)),
                None => missing.push(link.href),
            }
        }
        if !missing.is_empty() {
            return Err(missing);
        }
        Ok(ResolvedDocument {
            kind: self.kind,
            links,
            attributes: self.attributes,
        })
    }
}

/// A document whose links all point at cids; ready to be encoded.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedDocument {
    pub kind: DocumentKind,
    pub links: Vec<ResolvedLink>,
    pub attributes: Map<String, Value>,
}
