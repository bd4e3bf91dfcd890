use std::fmt;
use std::str::FromStr;

use data_encoding::BASE32_NOPAD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// CID version byte.
const CID_VERSION: u8 = 0x01;
/// Unsigned varint encoding of the dag-json multicodec (0x0129).
const DAG_JSON_CODEC: [u8; 2] = [0xa9, 0x02];
/// Multihash code for BLAKE3.
const BLAKE3_MULTIHASH: u8 = 0x1e;
/// Digest length in bytes.
const DIGEST_LEN: u8 = 0x20;
/// Multibase prefix for lowercase, unpadded base32.
const MULTIBASE_BASE32: char = 'b';

/// Length of the binary CID: version, codec, multihash header, digest.
const BINARY_LEN: usize = 1 + DAG_JSON_CODEC.len() + 2 + DIGEST_LEN as usize;

/// Content identifier of a block.
///
/// A `Cid` is the BLAKE3 digest of a block's canonical bytes. Identical
/// bytes always produce the same `Cid`. Its canonical textual form is a
/// CIDv1 string (dag-json codec, blake3 multihash, base32 multibase), which
/// is also the on-disk name of the block.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cid([u8; 32]);

impl Cid {
    /// Compute a `Cid` over raw block bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// The raw 32-byte digest.
    pub fn digest(&self) -> &[u8; 32] {
        &self.0
    }

    /// Binary CIDv1 representation.
    pub fn to_binary(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(BINARY_LEN);
        out.push(CID_VERSION);
        out.extend_from_slice(&DAG_JSON_CODEC);
        out.push(BLAKE3_MULTIHASH);
        out.push(DIGEST_LEN);
        out.extend_from_slice(&self.0);
        out
    }

    /// Parse the binary CIDv1 representation.
    pub fn from_binary(bytes: &[u8]) -> Result<Self, TypeError> {
        if bytes.len() != BINARY_LEN {
            return Err(TypeError::InvalidLength {
                expected: BINARY_LEN,
                actual: bytes.len(),
            });
        }
        if bytes[0] != CID_VERSION {
            return Err(TypeError::InvalidCid(format!(
                "unsupported version {:#04x}",
                bytes[0]
            )));
        }
        if bytes[1..3] != DAG_JSON_CODEC {
            return Err(TypeError::InvalidCid("unsupported codec".into()));
        }
        if bytes[3] != BLAKE3_MULTIHASH || bytes[4] != DIGEST_LEN {
            return Err(TypeError::InvalidCid("unsupported multihash".into()));
        }
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&bytes[5..]);
        Ok(Self(digest))
    }

    /// Short hex representation (first 8 characters) for logs.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Debug for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cid({})", self.short_hex())
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = BASE32_NOPAD.encode(&self.to_binary()).to_ascii_lowercase();
        write!(f, "{MULTIBASE_BASE32}{encoded}")
    }
}

impl FromStr for Cid {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(body) = s.strip_prefix(MULTIBASE_BASE32) else {
            return Err(TypeError::InvalidCid(format!(
                "expected multibase prefix '{MULTIBASE_BASE32}'"
            )));
        };
        let bytes = BASE32_NOPAD
            .decode(body.to_ascii_uppercase().as_bytes())
            .map_err(|e| TypeError::InvalidCid(e.to_string()))?;
        Self::from_binary(&bytes)
    }
}

impl Serialize for Cid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Cid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn from_bytes_is_deterministic() {
        let data = br#"{"id":"item1"}"#;
        assert_eq!(Cid::from_bytes(data), Cid::from_bytes(data));
    }

    #[test]
    fn digest_is_blake3_of_the_block() {
        let data = b"hello world";
        assert_eq!(Cid::from_bytes(data).digest(), blake3::hash(data).as_bytes());
    }

    #[test]
    fn different_data_produces_different_cids() {
        assert_ne!(Cid::from_bytes(b"hello"), Cid::from_bytes(b"world"));
    }

    #[test]
    fn text_form_is_lowercase_base32_multibase() {
        let cid = Cid::from_bytes(b"block");
        let text = cid.to_string();
        assert!(text.starts_with('b'));
        assert!(text
            .chars()
            .all(|c| c.is_ascii_lowercase() || ('2'..='7').contains(&c)));
        // 37 bytes of binary CID -> 60 base32 characters, plus the prefix.
        assert_eq!(text.len(), 61);
    }

    #[test]
    fn text_form_carries_cidv1_header() {
        let cid = Cid::from_bytes(b"block");
        let binary = cid.to_binary();
        assert_eq!(&binary[..5], &[0x01, 0xa9, 0x02, 0x1e, 0x20]);
        assert_eq!(&binary[5..], cid.digest());
    }

    #[test]
    fn parse_rejects_missing_prefix() {
        let text = Cid::from_bytes(b"x").to_string();
        let err = text[1..].parse::<Cid>().unwrap_err();
        assert!(matches!(err, TypeError::InvalidCid(_)));
    }

    #[test]
    fn parse_rejects_wrong_length() {
        let err = "baaaq".parse::<Cid>().unwrap_err();
        assert!(matches!(
            err,
            TypeError::InvalidLength { .. } | TypeError::InvalidCid(_)
        ));
    }

    #[test]
    fn parse_rejects_foreign_codec() {
        let mut binary = Cid::from_bytes(b"x").to_binary();
        binary[1] = 0x71;
        let err = Cid::from_binary(&binary).unwrap_err();
        assert_eq!(err, TypeError::InvalidCid("unsupported codec".into()));
    }

    #[test]
    fn serializes_as_text() {
        let cid = Cid::from_bytes(b"serde");
        let json = serde_json::to_string(&cid).unwrap();
        assert_eq!(json, format!("\"{cid}\""));
        let parsed: Cid = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, cid);
    }

    #[test]
    fn short_hex_is_8_chars() {
        assert_eq!(Cid::from_bytes(b"test").short_hex().len(), 8);
    }

    proptest! {
        #[test]
        fn any_block_cid_survives_text_form(data in proptest::collection::vec(any::<u8>(), 0..256)) {
            let cid = Cid::from_bytes(&data);
            prop_assert_eq!(cid.to_string().parse::<Cid>().unwrap(), cid);
        }
    }
}
