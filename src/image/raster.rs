//! # Raster Packing
//!
//! Packs a [`Bitmap`] into the row-major monochrome layout used by the
//! GS v 0 raster command family.
//!
//! ## Data Layout
//!
//! ```text
//! Row 0:    d[0]       d[1]       ... d[width_bytes-1]
//! Row 1:    d[wb]      d[wb+1]    ... d[2*wb-1]
//! ...
//! Each byte: bit7 = leftmost of 8 horizontal dots, 1 = black
//! ```
//!
//! ## Strips
//!
//! A full-height raster buffer for a long receipt can run to hundreds of
//! kilobytes — beyond printer input buffers and beyond what we want as a
//! single allocation. [`strips`] partitions the image into slices of at
//! most `max_rows` rows (see [`MAX_STRIP_ROWS`](super::MAX_STRIP_ROWS));
//! every strip is framed as its own command and printers render them as
//! continuous output.

use super::Bitmap;
use crate::pool::BufferPool;

/// Yield to the scheduler after this many strips on the async path.
pub const YIELD_STRIP_INTERVAL: usize = 4;

/// One horizontal slice of a raster image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterStrip {
    /// Number of pixel rows covered by this strip.
    pub rows: usize,
    /// Packed data, `rows * width_bytes` bytes.
    pub data: Vec<u8>,
}

/// Pack the whole image into one raster buffer of `(W/8) * H` bytes.
pub fn pack(bitmap: &Bitmap) -> Vec<u8> {
    let mut pool = BufferPool::new();
    pack_rows(bitmap, 0, bitmap.height(), &mut pool)
}

/// Pack `rows` rows starting at `start_row`.
pub fn pack_rows(
    bitmap: &Bitmap,
    start_row: usize,
    rows: usize,
    pool: &mut BufferPool,
) -> Vec<u8> {
    let width_bytes = bitmap.width_bytes();
    let mut data = pool.acquire(width_bytes * rows);

    for row in 0..rows {
        let y = start_row + row;
        for byte_col in 0..width_bytes {
            let mut byte = 0u8;
            for bit in 0..8 {
                byte |= bitmap.pixel(byte_col * 8 + bit, y) << (7 - bit);
            }
            data[row * width_bytes + byte_col] = byte;
        }
    }

    data
}

/// Partition the image into strips of at most `max_rows` rows.
///
/// The last strip may be shorter; all strips share the same row stride.
pub fn strips(bitmap: &Bitmap, max_rows: usize, pool: &mut BufferPool) -> Vec<RasterStrip> {
    debug_assert!(max_rows >= 1, "strip height must be at least one row");

    let height = bitmap.height();
    let mut out = Vec::with_capacity(height.div_ceil(max_rows.max(1)));
    let mut start_row = 0;

    while start_row < height {
        let rows = max_rows.min(height - start_row);
        out.push(RasterStrip {
            rows,
            data: pack_rows(bitmap, start_row, rows, pool),
        });
        start_row += rows;
    }

    out
}

/// Strip partitioning for large images, yielding to the scheduler after
/// every [`YIELD_STRIP_INTERVAL`] strips. Output is identical to
/// [`strips`].
pub async fn strips_yielding(
    bitmap: &Bitmap,
    max_rows: usize,
    pool: &mut BufferPool,
) -> Vec<RasterStrip> {
    let height = bitmap.height();
    let mut out = Vec::with_capacity(height.div_ceil(max_rows.max(1)));
    let mut start_row = 0;

    while start_row < height {
        let rows = max_rows.min(height - start_row);
        out.push(RasterStrip {
            rows,
            data: pack_rows(bitmap, start_row, rows, pool),
        });
        start_row += rows;

        if out.len() % YIELD_STRIP_INTERVAL == 0 {
            tokio::task::yield_now().await;
        }
    }

    out
}
