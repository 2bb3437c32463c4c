//! # Column Packing
//!
//! Packs a [`Bitmap`] into vertical 24-dot strips for the legacy
//! bit-image commands (ESC * on ESC/POS, ESC X on Star).
//!
//! ## Data Layout
//!
//! Each strip covers 24 pixel rows and every column. Per column, three
//! bytes stack vertically, MSB on top:
//!
//! ```text
//! Column x:   byte 3x   bits 7..0 = rows 24s+0 .. 24s+7
//!             byte 3x+1 bits 7..0 = rows 24s+8 .. 24s+15
//!             byte 3x+2 bits 7..0 = rows 24s+16 .. 24s+23
//! ```
//!
//! A strip is always 3·W bytes. When the image height is not a multiple
//! of 24, the final strip reads past the bottom edge; out-of-bounds
//! pixels are white, so the overhang packs as zero bits.

use super::Bitmap;
use crate::pool::BufferPool;

/// Rows covered by one column strip.
pub const STRIP_HEIGHT: usize = 24;

/// Yield to the scheduler after this many columns on the async path.
pub const YIELD_COLUMN_INTERVAL: usize = 100;

/// Pack the image into ⌈H/24⌉ strips of `3 * width` bytes each.
pub fn strips(bitmap: &Bitmap, pool: &mut BufferPool) -> Vec<Vec<u8>> {
    let count = bitmap.height().div_ceil(STRIP_HEIGHT);
    (0..count).map(|s| pack_strip(bitmap, s, pool)).collect()
}

/// Column packing for large images, yielding to the scheduler every
/// [`YIELD_COLUMN_INTERVAL`] columns within a strip. Output is identical
/// to [`strips`].
pub async fn strips_yielding(bitmap: &Bitmap, pool: &mut BufferPool) -> Vec<Vec<u8>> {
    let count = bitmap.height().div_ceil(STRIP_HEIGHT);
    let mut out = Vec::with_capacity(count);

    for s in 0..count {
        let width = bitmap.width();
        let mut data = pool.acquire(3 * width);
        for x in 0..width {
            pack_column(bitmap, s, x, &mut data);
            if (x + 1) % YIELD_COLUMN_INTERVAL == 0 {
                tokio::task::yield_now().await;
            }
        }
        out.push(data);
    }

    out
}

fn pack_strip(bitmap: &Bitmap, strip: usize, pool: &mut BufferPool) -> Vec<u8> {
    let width = bitmap.width();
    let mut data = pool.acquire(3 * width);
    for x in 0..width {
        pack_column(bitmap, strip, x, &mut data);
    }
    data
}

#[inline]
fn pack_column(bitmap: &Bitmap, strip: usize, x: usize, data: &mut [u8]) {
    let top_row = strip * STRIP_HEIGHT;
    for c in 0..3 {
        let mut byte = 0u8;
        for bit in 0..8 {
            byte |= bitmap.pixel(x, top_row + c * 8 + bit) << (7 - bit);
        }
        data[3 * x + c] = byte;
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::bitmap_from_fn;
    use super::*;

    #[test]
    fn test_strip_count_and_size() {
        let mut pool = BufferPool::new();
        let bitmap = bitmap_from_fn(16, 50, |_, _| false);
        let strips = strips(&bitmap, &mut pool);
        // ⌈50/24⌉ = 3 strips of 3*16 bytes.
        assert_eq!(strips.len(), 3);
        assert!(strips.iter().all(|s| s.len() == 48));
    }

    #[test]
    fn test_top_row_is_msb() {
        // Single black pixel at (0, 0): first byte 0b1000_0000.
        let mut pool = BufferPool::new();
        let bitmap = bitmap_from_fn(8, 24, |x, y| x == 0 && y == 0);
        let strips = strips(&bitmap, &mut pool);
        assert_eq!(strips[0][0], 0x80);
        assert!(strips[0][1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_rows_map_to_byte_tiers() {
        // Row 8 lands in byte 1 of the column, row 16 in byte 2.
        let mut pool = BufferPool::new();
        let bitmap = bitmap_from_fn(8, 24, |x, y| x == 2 && (y == 8 || y == 16));
        let strips = strips(&bitmap, &mut pool);
        assert_eq!(strips[0][3 * 2], 0x00);
        assert_eq!(strips[0][3 * 2 + 1], 0x80);
        assert_eq!(strips[0][3 * 2 + 2], 0x80);
    }

    #[test]
    fn test_height_one_overhang_is_white() {
        // Height 1: rows 1..24 read out of bounds and pack as zeros.
        let mut pool = BufferPool::new();
        let bitmap = bitmap_from_fn(8, 1, |_, _| true);
        let strips = strips(&bitmap, &mut pool);
        assert_eq!(strips.len(), 1);
        for x in 0..8 {
            assert_eq!(strips[0][3 * x], 0x80);
            assert_eq!(strips[0][3 * x + 1], 0x00);
            assert_eq!(strips[0][3 * x + 2], 0x00);
        }
    }

    #[test]
    fn test_second_strip_offsets_rows() {
        // Pixel at y = 24 appears at the top of strip 1.
        let mut pool = BufferPool::new();
        let bitmap = bitmap_from_fn(8, 48, |x, y| x == 0 && y == 24);
        let strips = strips(&bitmap, &mut pool);
        assert!(strips[0].iter().all(|&b| b == 0));
        assert_eq!(strips[1][0], 0x80);
    }

    #[tokio::test]
    async fn test_yielding_matches_sync() {
        let mut pool = BufferPool::new();
        let bitmap = bitmap_from_fn(208, 60, |x, y| (x ^ y) % 5 == 0);
        let sync = strips(&bitmap, &mut pool);
        let yielded = strips_yielding(&bitmap, &mut pool).await;
        assert_eq!(sync, yielded);
    }
}
