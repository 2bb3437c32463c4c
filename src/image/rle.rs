//! # Run-Length Encoding
//!
//! The control-byte RLE scheme accepted by the GS v 0 raster command in
//! mode 1.
//!
//! ## Stream Format
//!
//! | Control byte | Meaning |
//! |--------------|---------|
//! | `>= 0x80` | Run: the next byte repeats `(ctrl - 0x80) + 2` times (2–129) |
//! | `< 0x80` | Literal block: the next `ctrl + 1` bytes are copied (1–128) |
//!
//! A run longer than 129 bytes restarts: 130 identical bytes encode as
//! `{0xFF, b}` followed by the literal-of-one `{0x00, b}`. That leftover
//! literal never merges with following literal data — the wire format is
//! bit-compatible with what printers were validated against, so the
//! encoder must not be "improved" here.
//!
//! ## Fallback
//!
//! Compression is only worthwhile when it shrinks the payload. When the
//! encoded stream is as large as the input or larger, [`compress`]
//! returns a copy of the input flagged `compressed: false` and the caller
//! frames the uncompressed variant instead.

use crate::pool::BufferPool;

/// Longest run a single control byte can express.
pub const MAX_RUN: usize = 129;

/// Longest literal block a single control byte can express.
pub const MAX_LITERAL: usize = 128;

/// Result of a compression attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Rle {
    /// Encoded stream, or a copy of the input when `compressed` is false.
    pub data: Vec<u8>,
    /// Whether `data` is RLE-encoded.
    pub compressed: bool,
    pub original_size: usize,
    pub compressed_size: usize,
    /// `compressed_size / original_size`.
    pub ratio: f32,
}

/// Compress `data`, recycling scratch buffers through `pool`.
///
/// The candidate output buffer comes from the pool; when compression
/// loses, it goes straight back.
pub fn compress_with(data: &[u8], pool: &mut BufferPool) -> Rle {
    let len = data.len();
    if len == 0 {
        return Rle {
            data: Vec::new(),
            compressed: false,
            original_size: 0,
            compressed_size: 0,
            ratio: 1.0,
        };
    }

    // Worst case: literal-only input costs one header per 128 bytes.
    let mut out = pool.acquire(len + len / MAX_LITERAL + 2);
    out.clear();

    let mut i = 0;
    while i < len {
        let run = run_length(data, i);
        if run >= 2 {
            let byte = data[i];
            let mut remaining = run;
            while remaining >= 2 {
                let chunk = remaining.min(MAX_RUN);
                out.push(0x80 + (chunk - 2) as u8);
                out.push(byte);
                remaining -= chunk;
            }
            if remaining == 1 {
                // Capped-run leftover: literal-of-one, kept separate.
                out.push(0x00);
                out.push(byte);
            }
            i += run;
        } else {
            let start = i;
            i += 1;
            while i < len && i - start < MAX_LITERAL && run_length(data, i) < 2 {
                i += 1;
            }
            out.push((i - start - 1) as u8);
            out.extend_from_slice(&data[start..i]);
        }
    }

    if out.len() >= len {
        pool.release(out);
        return Rle {
            data: data.to_vec(),
            compressed: false,
            original_size: len,
            compressed_size: len,
            ratio: 1.0,
        };
    }

    let compressed_size = out.len();
    Rle {
        ratio: compressed_size as f32 / len as f32,
        data: out,
        compressed: true,
        original_size: len,
        compressed_size,
    }
}

/// Compress without an external pool.
pub fn compress(data: &[u8]) -> Rle {
    compress_with(data, &mut BufferPool::new())
}

/// Decode an RLE stream. Inverse of [`compress`]; exposed for tests and
/// diagnostics.
pub fn decompress(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() * 2);
    let mut i = 0;

    while i < data.len() {
        let ctrl = data[i];
        i += 1;
        if ctrl >= 0x80 {
            let count = (ctrl - 0x80) as usize + 2;
            if i < data.len() {
                out.extend(std::iter::repeat(data[i]).take(count));
                i += 1;
            }
        } else {
            let count = ctrl as usize + 1;
            let end = (i + count).min(data.len());
            out.extend_from_slice(&data[i..end]);
            i = end;
        }
    }

    out
}

#[inline]
fn run_length(data: &[u8], i: usize) -> usize {
    let byte = data[i];
    data[i..].iter().take_while(|&&b| b == byte).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        let rle = compress(&[]);
        assert!(!rle.compressed);
        assert!(rle.data.is_empty());
        assert_eq!(rle.original_size, 0);
    }

    #[test]
    fn test_simple_run() {
        // 5 identical bytes: {0x80 + 3, byte}.
        let rle = compress(&[0xAA; 5]);
        assert!(rle.compressed);
        assert_eq!(rle.data, vec![0x83, 0xAA]);
        assert_eq!(rle.original_size, 5);
        assert_eq!(rle.compressed_size, 2);
    }

    #[test]
    fn test_run_of_exactly_129() {
        let rle = compress(&[0x42; 129]);
        assert!(rle.compressed);
        assert_eq!(rle.data, vec![0xFF, 0x42]);
    }

    #[test]
    fn test_run_of_130_restarts_with_literal() {
        let rle = compress(&[0x42; 130]);
        assert!(rle.compressed);
        assert_eq!(rle.data, vec![0xFF, 0x42, 0x00, 0x42]);
    }

    #[test]
    fn test_run_of_131_two_runs() {
        let rle = compress(&[0x42; 131]);
        assert!(rle.compressed);
        assert_eq!(rle.data, vec![0xFF, 0x42, 0x80, 0x42]);
    }

    #[test]
    fn test_golden_capped_run_and_literals() {
        // 130 bytes of 0xAA then 0x01..0x05 — the documented wire vector.
        let mut input = vec![0xAA; 130];
        input.extend([0x01, 0x02, 0x03, 0x04, 0x05]);

        let rle = compress(&input);
        assert!(rle.compressed);
        assert_eq!(
            rle.data,
            vec![0xFF, 0xAA, 0x00, 0xAA, 0x04, 0x01, 0x02, 0x03, 0x04, 0x05]
        );
        assert_eq!(rle.compressed_size, 10);
        assert_eq!(decompress(&rle.data), input);
    }

    #[test]
    fn test_incompressible_returns_original() {
        let input: Vec<u8> = (0..64).collect();
        let rle = compress(&input);
        assert!(!rle.compressed);
        assert_eq!(rle.data, input);
        assert_eq!(rle.compressed_size, rle.original_size);
        assert_eq!(rle.ratio, 1.0);
    }

    #[test]
    fn test_literal_block_cap() {
        // 200 distinct-pair bytes: literal blocks of at most 128.
        let input: Vec<u8> = (0..200u16).map(|i| (i % 251) as u8).collect();
        let rle = compress(&input);
        // All-literal output is larger than the input, so it passes through.
        assert!(!rle.compressed);
        // The raw encoding logic still round-trips.
        let mut encoded = vec![127u8];
        encoded.extend(&input[..128]);
        encoded.push(71);
        encoded.extend(&input[128..]);
        assert_eq!(decompress(&encoded), input);
    }

    #[test]
    fn test_literal_stops_before_run() {
        // 3 literals then a run of 4.
        let input = [0x01, 0x02, 0x03, 0x09, 0x09, 0x09, 0x09];
        let rle = compress(&input);
        assert!(rle.compressed);
        assert_eq!(rle.data, vec![0x02, 0x01, 0x02, 0x03, 0x82, 0x09]);
    }

    #[test]
    fn test_round_trip_mixed() {
        let mut input = Vec::new();
        input.extend([0u8; 300]);
        input.extend((0..40u8).map(|i| i.wrapping_mul(7)));
        input.extend([0xFFu8; 2]);
        input.extend([1, 2, 2, 3, 3, 3]);

        let rle = compress(&input);
        assert!(rle.compressed);
        assert_eq!(decompress(&rle.data), input);
        assert!(rle.ratio < 1.0);
    }

    #[test]
    fn test_pool_recycles_losing_buffer() {
        let mut pool = BufferPool::new();
        let input: Vec<u8> = (0..64).collect();
        let rle = compress_with(&input, &mut pool);
        assert!(!rle.compressed);
        // The rejected candidate buffer went back to the pool.
        assert_eq!(pool.pooled_count(), 1);
    }

    #[test]
    fn test_ratio() {
        let rle = compress(&[0x00; 100]);
        assert!(rle.compressed);
        assert!((rle.ratio - 0.02).abs() < f32::EPSILON);
    }
}
