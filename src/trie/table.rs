//! Fork table encoding
//!
//! One persisted vertex is a bincode-encoded list of fork records in ascending
//! key order. Each record carries the child's entry, so whether a child is a
//! value is known without loading it. Childless children are stored inline
//! (`child: None`) and decode as resolved leaves.

use super::node::{Fork, Node};
use crate::model::{Entry, Reference};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Format version written into every table
const TABLE_VERSION: u8 = 1;

#[derive(Serialize, Deserialize)]
struct ForkRecord {
    label: Vec<u8>,
    child: Option<Reference>,
    entry: Option<Entry>,
}

#[derive(Serialize, Deserialize)]
struct ForkTable {
    version: u8,
    forks: Vec<ForkRecord>,
}

/// Serialize a resolved fork table; every child with forks must already be
/// persisted
pub(crate) fn encode(forks: &BTreeMap<u8, Fork>) -> Result<Vec<u8>> {
    let mut records = Vec::with_capacity(forks.len());
    for fork in forks.values() {
        let child = if fork.child.has_forks() {
            let reference = fork.child.reference().copied().ok_or_else(|| {
                Error::InvalidReference(format!(
                    "child '{}' has not been persisted",
                    String::from_utf8_lossy(&fork.label)
                ))
            })?;
            Some(reference)
        } else {
            None
        };
        records.push(ForkRecord {
            label: fork.label.clone(),
            child,
            entry: fork.child.entry().cloned(),
        });
    }

    let table = ForkTable {
        version: TABLE_VERSION,
        forks: records,
    };
    Ok(bincode::serialize(&table)?)
}

/// Parse and validate a fork table
pub(crate) fn decode(bytes: &[u8]) -> Result<BTreeMap<u8, Fork>> {
    let table: ForkTable = bincode::deserialize(bytes)
        .map_err(|e| Error::Decode(format!("malformed fork table: {}", e)))?;

    if table.version != TABLE_VERSION {
        return Err(Error::Decode(format!(
            "unsupported fork table version {}",
            table.version
        )));
    }

    let mut forks = BTreeMap::new();
    let mut previous: Option<u8> = None;
    for record in table.forks {
        let Some(&key) = record.label.first() else {
            return Err(Error::Decode("empty fork label".into()));
        };
        if previous.is_some_and(|p| p >= key) {
            return Err(Error::Decode(format!(
                "fork key {:#04x} is duplicated or out of order",
                key
            )));
        }
        previous = Some(key);

        let child = match (record.child, record.entry) {
            (Some(reference), entry) => Node::from_reference(reference).with_entry(entry),
            (None, Some(entry)) => Node::leaf(entry),
            (None, None) => {
                return Err(Error::Decode(format!(
                    "fork '{}' leads to neither a table nor an entry",
                    String::from_utf8_lossy(&record.label)
                )))
            }
        };
        forks.insert(
            key,
            Fork {
                label: record.label,
                child,
            },
        );
    }
    Ok(forks)
}
