//! Core data model types for radix_manifest

mod entry;
mod reference;

pub use entry::{Entry, Metadata};
pub use reference::{Reference, REFERENCE_LEN};
