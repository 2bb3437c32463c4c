//! # Chunked Transmission
//!
//! Splits an encoded document into bounded slices for links with small
//! input buffers (Bluetooth SPP, slow serial).
//!
//! The stream is pull-based: the consumer awaits [`ChunkStream::next`],
//! sends the chunk, and only then pulls again — that await is the
//! backpressure point. Dropping the stream stops production; no chunks
//! are materialised ahead of the consumer.
//!
//! Concatenating every chunk reproduces the encoded byte stream exactly,
//! in order; only the final chunk may be short.

use serde::Serialize;

use crate::error::{ReciboError, Result};

/// Default chunk size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 512;

/// One slice of the encoded document, with transmission progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    /// Zero-based chunk index.
    pub index: usize,
    /// Total number of chunks in the stream.
    pub total: usize,
    /// The slice itself, at most `chunk_size` bytes.
    pub bytes: Vec<u8>,
    /// Cumulative bytes delivered including this chunk.
    pub bytes_sent: usize,
    /// Size of the whole encoded document.
    pub total_bytes: usize,
    pub is_last: bool,
}

/// A lazy, finite sequence of document slices.
#[derive(Debug)]
pub struct ChunkStream {
    data: Vec<u8>,
    chunk_size: usize,
    offset: usize,
    index: usize,
}

impl ChunkStream {
    pub(crate) fn new(data: Vec<u8>, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(ReciboError::configuration("chunk size must be at least 1"));
        }
        Ok(Self {
            data,
            chunk_size,
            offset: 0,
            index: 0,
        })
    }

    /// Number of chunks this stream will yield.
    pub fn total_chunks(&self) -> usize {
        self.data.len().div_ceil(self.chunk_size)
    }

    /// Size of the encoded document in bytes.
    pub fn total_bytes(&self) -> usize {
        self.data.len()
    }

    /// Yield the next chunk, or `None` when the document is fully
    /// delivered. Control returns to the scheduler before each chunk.
    pub async fn next(&mut self) -> Option<Chunk> {
        if self.offset >= self.data.len() {
            return None;
        }

        tokio::task::yield_now().await;

        let end = (self.offset + self.chunk_size).min(self.data.len());
        let chunk = Chunk {
            index: self.index,
            total: self.total_chunks(),
            bytes: self.data[self.offset..end].to_vec(),
            bytes_sent: end,
            total_bytes: self.data.len(),
            is_last: end == self.data.len(),
        };

        self.offset = end;
        self.index += 1;
        Some(chunk)
    }
}
