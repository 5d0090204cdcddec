use std::ops::Range;

/// Byte range of one chunk within its file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpan {
    /// Zero-based position in the plan.
    pub index: usize,
    /// Number of chunks in the plan.
    pub total_chunks: usize,
    /// Inclusive start offset.
    pub start: u64,
    /// Exclusive end offset.
    pub end: u64,
}

impl ChunkSpan {
    pub fn range(&self) -> Range<u64> {
        self.start..self.end
    }
}

/// A chunk of file data read for transmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub span: ChunkSpan,
    /// Bytes of `span` within the source file.
    pub data: Vec<u8>,
}

impl Chunk {
    pub fn index(&self) -> usize {
        self.span.index
    }
}
