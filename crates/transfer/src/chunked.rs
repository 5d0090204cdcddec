use std::sync::Arc;

use crate::TransferError;
use crate::file::{FileHandle, FileSource, read_span};
use crate::types::{Chunk, ChunkSpan};

// ---------------------------------------------------------------------------
// ChunkPlan
// ---------------------------------------------------------------------------

/// Splits `file_size` bytes into consecutive `chunk_size` spans.
///
/// The plan always has at least one span: an empty file yields a single
/// zero-length chunk so the backend still sees the upload.
pub fn split(file_size: u64, chunk_size: u64) -> Result<ChunkPlan, TransferError> {
    if chunk_size == 0 {
        return Err(TransferError::ZeroChunkSize);
    }
    let total = file_size.div_ceil(chunk_size).max(1) as usize;
    Ok(ChunkPlan {
        file_size,
        chunk_size,
        total,
        next: 0,
    })
}

/// Ordered, single-pass sequence of chunk spans covering `[0, file_size)`.
#[derive(Debug)]
pub struct ChunkPlan {
    file_size: u64,
    chunk_size: u64,
    total: usize,
    next: usize,
}

impl ChunkPlan {
    /// Number of chunks in the whole plan, including ones already yielded.
    pub fn total_chunks(&self) -> usize {
        self.total
    }
}

impl Iterator for ChunkPlan {
    type Item = ChunkSpan;

    fn next(&mut self) -> Option<ChunkSpan> {
        if self.next >= self.total {
            return None;
        }
        let start = self.next as u64 * self.chunk_size;
        let end = start.saturating_add(self.chunk_size).min(self.file_size);
        let span = ChunkSpan {
            index: self.next,
            total_chunks: self.total,
            start,
            end,
        };
        self.next += 1;
        Some(span)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ChunkPlan {}

// ---------------------------------------------------------------------------
// ChunkReader
// ---------------------------------------------------------------------------

/// Reads the chunks of a [`FileHandle`] in index order.
///
/// A disk file is opened once and each span is read when it is reached.
#[derive(Debug)]
pub struct ChunkReader {
    source: ChunkSource,
    plan: ChunkPlan,
}

#[derive(Debug)]
enum ChunkSource {
    Memory(Arc<[u8]>),
    Disk(std::fs::File),
}

impl ChunkReader {
    pub fn new(file: &FileHandle, chunk_size: u64) -> Result<Self, TransferError> {
        let plan = split(file.size(), chunk_size)?;
        let source = match file.source() {
            FileSource::Memory(data) => ChunkSource::Memory(Arc::clone(data)),
            FileSource::Disk(path) => ChunkSource::Disk(std::fs::File::open(path)?),
        };
        Ok(Self { source, plan })
    }

    pub fn total_chunks(&self) -> usize {
        self.plan.total_chunks()
    }

    /// Reads the next chunk. Returns `None` once every span was read.
    pub fn next_chunk(&mut self) -> Result<Option<Chunk>, TransferError> {
        let Some(span) = self.plan.next() else {
            return Ok(None);
        };
        let data = match &mut self.source {
            ChunkSource::Memory(data) => data[span.start as usize..span.end as usize].to_vec(),
            ChunkSource::Disk(file) => read_span(file, span.range())?,
        };
        Ok(Some(Chunk { span, data }))
    }
}
