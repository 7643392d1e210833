//! Append-only chunk log in a single file
//!
//! ```text
//! header:  "RMANIFST" | version u32 LE
//! record:  reference (32) | frame length u32 LE | frame
//! ```
//!
//! Records are only ever appended. The in-memory index is rebuilt by scanning
//! the records on open; a record cut short by an interrupted write is dropped
//! and the file truncated back to the last complete record.

use super::traits::fetch_fork_table;
use super::{Chunk, ChunkStore, Loader};
use crate::model::{Reference, REFERENCE_LEN};
use crate::{Error, Result, MAGIC, VERSION};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

const HEADER_LEN: u64 = 12;
const RECORD_HEAD_LEN: u64 = REFERENCE_LEN as u64 + 4;

/// Where a chunk's frame sits in the log
#[derive(Clone, Copy, Debug)]
struct Span {
    offset: u64,
    len: u32,
}

/// A chunk store backed by one append-only file
///
/// Reads verify that the frame found under a reference still hashes to it.
pub struct ObjectStore {
    path: PathBuf,
    log: Mutex<File>,
    index: RwLock<HashMap<Reference, Span>>,
}

impl ObjectStore {
    /// Start an empty log at `path`, replacing any existing file
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;

        file.write_all(MAGIC)?;
        file.write_all(&VERSION.to_le_bytes())?;
        file.sync_data()?;
        tracing::debug!(path = %path.display(), "created chunk log");

        Ok(ObjectStore {
            path,
            log: Mutex::new(file),
            index: RwLock::new(HashMap::new()),
        })
    }

    /// Open an existing log and index its records
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new().read(true).write(true).open(&path)?;

        let mut header = [0u8; HEADER_LEN as usize];
        file.read_exact(&mut header).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => Error::InvalidFile("shorter than its header".into()),
            _ => Error::Io(e),
        })?;
        if &header[..8] != MAGIC {
            return Err(Error::InvalidFile("not a chunk log".into()));
        }
        let version = u32::from_le_bytes([header[8], header[9], header[10], header[11]]);
        if version != VERSION {
            return Err(Error::VersionMismatch {
                expected: VERSION,
                found: version,
            });
        }

        let file_len = file.metadata()?.len();
        let (index, end) = scan(&mut file, file_len)?;
        if end < file_len {
            tracing::warn!(
                path = %path.display(),
                dropped = file_len - end,
                "truncating incomplete trailing record"
            );
            file.set_len(end)?;
        }
        tracing::debug!(path = %path.display(), chunks = index.len(), "opened chunk log");

        Ok(ObjectStore {
            path,
            log: Mutex::new(file),
            index: RwLock::new(index),
        })
    }

    pub fn open_or_create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    pub fn chunk_count(&self) -> usize {
        self.index.read().len()
    }

    /// Flush appended records to disk
    pub fn sync(&self) -> Result<()> {
        self.log.lock().sync_data()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Index every complete record after the header; returns the index and the
/// offset just past the last complete record
fn scan(file: &mut File, file_len: u64) -> Result<(HashMap<Reference, Span>, u64)> {
    let mut index = HashMap::new();
    let mut reader = BufReader::new(file);
    reader.seek(SeekFrom::Start(HEADER_LEN))?;

    let mut pos = HEADER_LEN;
    let mut head = [0u8; RECORD_HEAD_LEN as usize];
    while pos + RECORD_HEAD_LEN <= file_len {
        reader.read_exact(&mut head)?;
        let reference = Reference::from_prefix(&head)
            .ok_or_else(|| Error::InvalidFile("short record head".into()))?;
        let len_bytes = &head[REFERENCE_LEN..];
        let len = u32::from_le_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]]);

        let offset = pos + RECORD_HEAD_LEN;
        if offset + u64::from(len) > file_len {
            break;
        }
        reader.seek_relative(i64::from(len))?;
        index.insert(reference, Span { offset, len });
        pos = offset + u64::from(len);
    }
    Ok((index, pos))
}

impl ChunkStore for ObjectStore {
    fn put(&self, chunk: &Chunk) -> Result<Reference> {
        let reference = chunk.reference();
        if self.contains(&reference) {
            return Ok(reference);
        }

        let frame = chunk.encode()?;
        let len = u32::try_from(frame.len())
            .map_err(|_| Error::InvalidFile(format!("chunk of {} bytes is too large", frame.len())))?;
        let mut record = Vec::with_capacity(RECORD_HEAD_LEN as usize + frame.len());
        record.extend_from_slice(reference.as_bytes());
        record.extend_from_slice(&len.to_le_bytes());
        record.extend_from_slice(&frame);

        let offset = {
            let mut log = self.log.lock();
            let start = log.seek(SeekFrom::End(0))?;
            log.write_all(&record)?;
            start + RECORD_HEAD_LEN
        };
        self.index.write().insert(reference, Span { offset, len });
        Ok(reference)
    }

    fn get(&self, reference: &Reference) -> Result<Chunk> {
        let span = self
            .index
            .read()
            .get(reference)
            .copied()
            .ok_or_else(|| Error::NotFound(reference.to_hex()))?;

        let mut frame = vec![0u8; span.len as usize];
        {
            let mut log = self.log.lock();
            log.seek(SeekFrom::Start(span.offset))?;
            log.read_exact(&mut frame)?;
        }

        let chunk = Chunk::decode(&frame)?;
        if chunk.reference() != *reference {
            return Err(Error::Corruption(format!(
                "record {} no longer matches its address",
                reference.short()
            )));
        }
        Ok(chunk)
    }

    fn contains(&self, reference: &Reference) -> bool {
        self.index.read().contains_key(reference)
    }
}

impl Loader for ObjectStore {
    fn fetch(&self, reference: &Reference) -> Result<Vec<u8>> {
        fetch_fork_table(self, reference)
    }
}
