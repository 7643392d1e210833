//! Stored chunks
//!
//! A manifest stores two kinds of object: the fork table of one persisted
//! vertex, and the content a stored path points at. Both are framed the same
//! way for storage: a one-byte kind tag followed by a zstd frame of the
//! payload.

use crate::model::Reference;
use crate::{Error, Result};

const FORK_TABLE_TAG: u8 = b't';
const CONTENT_TAG: u8 = b'c';

const ZSTD_LEVEL: i32 = 3;

/// One stored object, tagged by what it holds
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Chunk {
    /// Encoded fork table of a vertex
    ForkTable(Vec<u8>),
    /// Leaf content referenced by an entry
    Content(Vec<u8>),
}

impl Chunk {
    fn tag(&self) -> u8 {
        match self {
            Chunk::ForkTable(_) => FORK_TABLE_TAG,
            Chunk::Content(_) => CONTENT_TAG,
        }
    }

    pub fn payload(&self) -> &[u8] {
        match self {
            Chunk::ForkTable(data) | Chunk::Content(data) => data,
        }
    }

    pub fn reference(&self) -> Reference {
        Reference::of_chunk(self.tag(), self.payload())
    }

    /// Frame for storage
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut frame = vec![self.tag()];
        zstd::stream::copy_encode(self.payload(), &mut frame, ZSTD_LEVEL)?;
        Ok(frame)
    }

    /// Parse a stored frame; anything unreadable is [`Error::Corruption`]
    pub fn decode(frame: &[u8]) -> Result<Self> {
        let Some((&tag, body)) = frame.split_first() else {
            return Err(Error::Corruption("empty chunk frame".into()));
        };
        let payload = zstd::decode_all(body)
            .map_err(|e| Error::Corruption(format!("unreadable chunk payload: {}", e)))?;

        match tag {
            FORK_TABLE_TAG => Ok(Chunk::ForkTable(payload)),
            CONTENT_TAG => Ok(Chunk::Content(payload)),
            other => Err(Error::Corruption(format!("unknown chunk tag {:#04x}", other))),
        }
    }

    /// The fork table bytes, or [`Error::Decode`] for a content chunk
    pub fn into_fork_table(self, reference: &Reference) -> Result<Vec<u8>> {
        match self {
            Chunk::ForkTable(table) => Ok(table),
            Chunk::Content(_) => Err(Error::Decode(format!(
                "{} holds content, not a fork table",
                reference.short()
            ))),
        }
    }

    /// The content bytes, or [`Error::Corruption`] for a fork table
    pub fn into_content(self, reference: &Reference) -> Result<Vec<u8>> {
        match self {
            Chunk::Content(data) => Ok(data),
            Chunk::ForkTable(_) => Err(Error::Corruption(format!(
                "{} is a fork table, not content",
                reference.short()
            ))),
        }
    }
}
