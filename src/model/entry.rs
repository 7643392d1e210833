//! Value payload attached to a vertex that terminates a stored path

use super::Reference;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque string metadata attached to an entry
pub type Metadata = BTreeMap<String, String>;

/// The content a stored path resolves to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Address of the leaf content
    pub reference: Reference,
    /// Caller-defined key/value pairs
    pub metadata: Metadata,
}

impl Entry {
    pub fn new(reference: Reference) -> Self {
        Entry {
            reference,
            metadata: Metadata::new(),
        }
    }

    /// Attach a metadata pair
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
