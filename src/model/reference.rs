//! Content addresses

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length of a reference in bytes
pub const REFERENCE_LEN: usize = 32;

/// BLAKE3 address of a stored chunk or of arbitrary content
///
/// Chunk addresses cover the chunk's kind tag as well as its payload, so a
/// fork table and a file with identical bytes never share an address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Reference([u8; REFERENCE_LEN]);

impl Reference {
    pub fn digest(data: &[u8]) -> Self {
        Reference(*blake3::hash(data).as_bytes())
    }

    /// Address of a chunk with kind `tag`
    pub(crate) fn of_chunk(tag: u8, payload: &[u8]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&[tag]);
        hasher.update(payload);
        Reference(*hasher.finalize().as_bytes())
    }

    /// Read a reference from the first `REFERENCE_LEN` bytes of `bytes`
    pub(crate) fn from_prefix(bytes: &[u8]) -> Option<Self> {
        let raw: [u8; REFERENCE_LEN] = bytes.get(..REFERENCE_LEN)?.try_into().ok()?;
        Some(Reference(raw))
    }

    pub fn as_bytes(&self) -> &[u8; REFERENCE_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First 8 hex digits, for log lines
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reference({})", self.short())
    }
}

/// Parses the 64-digit hex form printed by the CLI
impl FromStr for Reference {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| crate::Error::InvalidReference(format!("'{}': {}", s, reason));
        let bytes = hex::decode(s).map_err(|e| invalid(e.to_string()))?;
        if bytes.len() != REFERENCE_LEN {
            return Err(invalid(format!(
                "expected {} bytes, got {}",
                REFERENCE_LEN,
                bytes.len()
            )));
        }
        Reference::from_prefix(&bytes).ok_or_else(|| invalid("truncated".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_address_depends_on_tag() {
        let a = Reference::of_chunk(b't', b"payload");
        let b = Reference::of_chunk(b'c', b"payload");
        assert_ne!(a, b);
        assert_eq!(a, Reference::of_chunk(b't', b"payload"));
        assert_eq!(a, Reference::digest(b"tpayload"));
    }

    #[test]
    fn test_cli_form_parses_back() {
        let r = Reference::digest(b"index.html");
        assert_eq!(r.to_hex().len(), 64);
        assert_eq!(r.to_string().parse::<Reference>().unwrap(), r);
        assert!(r.to_hex().starts_with(&r.short()));
    }

    #[test]
    fn test_malformed_hex_rejected() {
        for input in ["", "abcd", "zz", "0".repeat(66).as_str()] {
            let err = input.parse::<Reference>().unwrap_err();
            assert!(matches!(err, crate::Error::InvalidReference(_)), "{}", input);
        }
    }

    #[test]
    fn test_from_prefix_needs_full_length() {
        let r = Reference::digest(b"x");
        let mut record = r.as_bytes().to_vec();
        record.extend_from_slice(&[1, 2, 3]);

        assert_eq!(Reference::from_prefix(&record), Some(r));
        assert_eq!(Reference::from_prefix(&record[..31]), None);
    }
}
