//! Canonical DAG-JSON encoding of resolved documents.
//!
//! Rules:
//!
//! 1. Object keys are sorted bytewise at every depth.
//! 2. No insignificant whitespace.
//! 3. A link target is written as `{"/": "<cid>"}`; no other value may take
//!    that shape.
//! 4. Link order is preserved.

use serde_json::{Map, Value};
use stacdag_types::{Cid, ResolvedDocument, ResolvedLink};

use crate::error::{CodecError, CodecResult};

/// Key marking a link object.
pub const LINK_KEY: &str = "/";

/// Default upper bound on the size of an encoded block (1 MiB).
pub const DEFAULT_MAX_BLOCK_SIZE: usize = 1024 * 1024;

/// Encodes resolved documents into canonical block bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CanonicalEncoder {
    /// Largest block accepted, in bytes. `0` disables the limit.
    pub max_block_size: usize,
}

impl Default for CanonicalEncoder {
    fn default() -> Self {
        Self {
            max_block_size: DEFAULT_MAX_BLOCK_SIZE,
        }
    }
}

impl CanonicalEncoder {
    /// Create an encoder with a block size limit.
    pub fn new(max_block_size: usize) -> Self {
        Self { max_block_size }
    }

    /// Encode a document into its canonical bytes.
    pub fn encode(&self, document: &ResolvedDocument) -> CodecResult<Vec<u8>> {
        let value = to_canonical_value(document)?;
        let bytes =
            serde_json::to_vec(&value).map_err(|e| CodecError::Serialization(e.to_string()))?;
        if self.max_block_size != 0 && bytes.len() > self.max_block_size {
            return Err(CodecError::BlockTooLarge {
                size: bytes.len(),
                limit: self.max_block_size,
            });
        }
        Ok(bytes)
    }
}

/// Build the canonical JSON value of a document.
pub fn to_canonical_value(document: &ResolvedDocument) -> CodecResult<Value> {
    let mut root = Map::new();
    for (key, value) in &document.attributes {
        let pointer = format!("/{}", escape_pointer(key));
        root.insert(key.clone(), canonicalize(value, &pointer)?);
    }

    let mut links = Vec::with_capacity(document.links.len());
    for (index, link) in document.links.iter().enumerate() {
        links.push(link_value(link, index)?);
    }
    root.insert(stacdag_types::document::LINKS_KEY.to_owned(), Value::Array(links));

    Ok(sorted(root))
}

/// Collect the cids a block links to, in link order.
pub fn extract_links(block: &[u8]) -> CodecResult<Vec<Cid>> {
    let value: Value =
        serde_json::from_slice(block).map_err(|e| CodecError::Serialization(e.to_string()))?;
    let Some(Value::Array(links)) = value.get(stacdag_types::document::LINKS_KEY) else {
        return Ok(Vec::new());
    };
    links
        .iter()
        .filter_map(|link| link.get("href")?.get(LINK_KEY)?.as_str())
        .map(|text| {
            text.parse::<Cid>()
                .map_err(|e| CodecError::Serialization(e.to_string()))
        })
        .collect()
}

fn link_value(link: &ResolvedLink, index: usize) -> CodecResult<Value> {
    let mut map = Map::new();
    for (key, value) in &link.extra {
        let pointer = format!("/links/{index}/{}", escape_pointer(key));
        map.insert(key.clone(), canonicalize(value, &pointer)?);
    }
    map.insert("rel".into(), Value::String(link.rel.as_str().to_owned()));
    map.insert("href".into(), cid_value(&link.href));
    if let Some(title) = &link.title {
        map.insert("title".into(), Value::String(title.clone()));
    }
    Ok(sorted(map))
}

fn cid_value(cid: &Cid) -> Value {
    let mut map = Map::new();
    map.insert(LINK_KEY.into(), Value::String(cid.to_string()));
    Value::Object(map)
}

/// Rebuild `value` with sorted keys, rejecting link-shaped objects.
fn canonicalize(value: &Value, pointer: &str) -> CodecResult<Value> {
    match value {
        Value::Object(map) => {
            if map.len() == 1 && map.contains_key(LINK_KEY) {
                return Err(CodecError::ReservedKey {
                    pointer: pointer.to_owned(),
                });
            }
            let mut out = Map::new();
            for (key, inner) in map {
                let child = format!("{pointer}/{}", escape_pointer(key));
                out.insert(key.clone(), canonicalize(inner, &child)?);
            }
            Ok(sorted(out))
        }
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| canonicalize(item, &format!("{pointer}/{i}")))
            .collect::<CodecResult<Vec<_>>>()
            .map(Value::Array),
        other => Ok(other.clone()),
    }
}

/// Re-insert entries in key order so the result is sorted whatever map
/// implementation `serde_json` was built with.
fn sorted(map: Map<String, Value>) -> Value {
    let mut entries: Vec<(String, Value)> = map.into_iter().collect();
    entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
    Value::Object(entries.into_iter().collect())
}

// RFC 6901 escaping, for error locations only.
fn escape_pointer(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}
