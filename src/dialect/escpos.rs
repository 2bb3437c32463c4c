//! # ESC/POS Driver
//!
//! Command builders for the ESC/POS protocol used by Epson thermal
//! printers and the broad compatible ecosystem (Bixolon, Citizen, HP,
//! Xprinter and many no-name 58mm units).
//!
//! ## Escape Sequence Structure
//!
//! | Pattern | Example |
//! |---------|---------|
//! | Two bytes | `ESC @` (initialize) |
//! | Parameterised | `ESC a n` (align), `GS ! n` (size) |
//! | Enveloped | `GS ( k pL pH cn fn ...` (2D codes) |
//!
//! ## Reference
//!
//! Based on the Epson "ESC/POS Application Programming Guide" command
//! set; byte sequences are the de-facto dialect shared by compatibles.

use async_trait::async_trait;

use super::{
    u16_le, Alignment, BarcodeOptions, CutType, Dialect, DialectKind, Font, ImageMode,
    Pdf417Options, QrOptions, Symbology, ESC, FS, GS, LF,
};
use crate::error::{ReciboError, Result};
use crate::image::{column, raster, rle, Bitmap, MAX_STRIP_ROWS};
use crate::pool::BufferPool;

// ============================================================================
// BASIC COMMANDS
// ============================================================================

/// # Initialize Printer (ESC @)
///
/// Resets formatting to power-on defaults, then leaves Kanji character
/// mode (FS .) and selects font A (ESC M 0) so the starting state is
/// identical across firmware revisions.
///
/// | Format | Bytes |
/// |--------|-------|
/// | Hex    | 1B 40  1C 2E  1B 4D 00 |
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@', FS, b'.', ESC, b'M', 0x00]
}

/// # Select Font (ESC M n)
///
/// | Format | Bytes |
/// |--------|-------|
/// | Hex    | 1B 4D {A=00, B=01, C=02} |
#[inline]
pub fn font(f: Font) -> Vec<u8> {
    vec![ESC, b'M', f as u8]
}

/// # Set Alignment (ESC a n)
///
/// | Format | Bytes |
/// |--------|-------|
/// | Hex    | 1B 61 {left=00, center=01, right=02} |
#[inline]
pub fn align(alignment: Alignment) -> Vec<u8> {
    vec![ESC, b'a', alignment as u8]
}

/// Bold on/off (ESC E n).
#[inline]
pub fn bold(enabled: bool) -> Vec<u8> {
    vec![ESC, b'E', enabled as u8]
}

/// Italic on/off (ESC 4 n). Not in the original Epson set but honored
/// by the compatible ecosystem this dialect targets.
#[inline]
pub fn italic(enabled: bool) -> Vec<u8> {
    vec![ESC, b'4', enabled as u8]
}

/// Underline on/off (ESC - n).
#[inline]
pub fn underline(enabled: bool) -> Vec<u8> {
    vec![ESC, b'-', enabled as u8]
}

/// White-on-black on/off (GS B n).
#[inline]
pub fn invert(enabled: bool) -> Vec<u8> {
    vec![GS, b'B', enabled as u8]
}

/// # Set Character Size (GS ! n)
///
/// Width multiplier in the high nibble, height in the low nibble, both
/// 0-based:
///
/// ```text
/// n = ((width - 1) << 4) | (height - 1)
/// ```
#[inline]
pub fn size(width: u8, height: u8) -> Vec<u8> {
    let w = width.clamp(1, 8) - 1;
    let h = height.clamp(1, 8) - 1;
    vec![GS, b'!', (w << 4) | h]
}

/// # Select Codepage Slot (ESC t n)
#[inline]
pub fn codepage(value: u8) -> Vec<u8> {
    vec![ESC, b't', value]
}

/// # Cut Paper (GS V m)
///
/// | Format | Bytes |
/// |--------|-------|
/// | Hex    | 1D 56 {full=00, partial=01} |
#[inline]
pub fn cut(variant: CutType) -> Vec<u8> {
    let m = match variant {
        CutType::Full => 0x00,
        CutType::Partial => 0x01,
    };
    vec![GS, b'V', m]
}

/// # Cash Drawer Pulse (ESC p m t1 t2)
///
/// Pulse times are in 2ms units, so the millisecond arguments are
/// clamped to 500 and halved.
#[inline]
pub fn pulse(device: u8, on_ms: u16, off_ms: u16) -> Vec<u8> {
    vec![
        ESC,
        b'p',
        device,
        (on_ms.min(500) / 2) as u8,
        (off_ms.min(500) / 2) as u8,
    ]
}

// ============================================================================
// BARCODES (GS k)
// ============================================================================

/// Function-B symbology identifier (GS k m, m = 65..).
const fn symbology_id(symbology: Symbology) -> u8 {
    match symbology {
        Symbology::UpcA => 65,
        Symbology::UpcE => 66,
        Symbology::Ean13 => 67,
        Symbology::Ean8 => 68,
        Symbology::Code39 => 69,
        Symbology::Itf => 70,
        Symbology::Codabar => 71,
        Symbology::Code93 => 72,
        Symbology::Code128 => 73,
    }
}

/// HRI position (GS H n): 0 = none, 2 = below the bars.
#[inline]
pub fn barcode_text(below: bool) -> Vec<u8> {
    vec![GS, b'H', if below { 2 } else { 0 }]
}

/// Bar height in dots (GS h n).
#[inline]
pub fn barcode_height(height: u8) -> Vec<u8> {
    vec![GS, b'h', height]
}

/// Module width in dots (GS w n), 2..=6.
#[inline]
pub fn barcode_width(width: u8) -> Vec<u8> {
    vec![GS, b'w', width]
}

/// # Print Barcode, Function B (GS k m n d1..dn)
///
/// | Format | Bytes |
/// |--------|-------|
/// | Hex    | 1D 6B id len data |
pub fn barcode_print(symbology: Symbology, data: &[u8]) -> Vec<u8> {
    let mut cmd = Vec::with_capacity(4 + data.len());
    cmd.push(GS);
    cmd.push(b'k');
    cmd.push(symbology_id(symbology));
    cmd.push(data.len() as u8);
    cmd.extend_from_slice(data);
    cmd
}

// ============================================================================
// QR CODE (GS ( k, cn = 49)
// ============================================================================

/// QR model: 49 = model 1, 50 = model 2.
#[inline]
pub fn qr_model(model: u8) -> Vec<u8> {
    vec![GS, b'(', b'k', 0x04, 0x00, 0x31, 0x41, 48 + model, 0x00]
}

/// QR cell size in dots.
#[inline]
pub fn qr_size(size: u8) -> Vec<u8> {
    vec![GS, b'(', b'k', 0x03, 0x00, 0x31, 0x43, size]
}

/// QR error correction level, 48..=51 on the wire.
#[inline]
pub fn qr_error_level(level: u8) -> Vec<u8> {
    vec![GS, b'(', b'k', 0x03, 0x00, 0x31, 0x45, 48 + level]
}

/// Store QR data in the symbol buffer (function 80).
pub fn qr_data(data: &[u8]) -> Vec<u8> {
    let [pl, ph] = u16_le(data.len() as u16 + 3);
    let mut cmd = vec![GS, b'(', b'k', pl, ph, 0x31, 0x50, 0x30];
    cmd.extend_from_slice(data);
    cmd
}

/// Print the stored QR symbol (function 81).
#[inline]
pub fn qr_print() -> Vec<u8> {
    vec![GS, b'(', b'k', 0x03, 0x00, 0x31, 0x51, 0x30]
}

// ============================================================================
// PDF417 (GS ( k, cn = 48)
// ============================================================================

/// Data columns, 0 = auto.
#[inline]
pub fn pdf417_columns(columns: u8) -> Vec<u8> {
    vec![GS, b'(', b'k', 0x03, 0x00, 0x30, 0x41, columns]
}

/// Rows, 0 = auto.
#[inline]
pub fn pdf417_rows(rows: u8) -> Vec<u8> {
    vec![GS, b'(', b'k', 0x03, 0x00, 0x30, 0x42, rows]
}

/// Module width in dots.
#[inline]
pub fn pdf417_width(width: u8) -> Vec<u8> {
    vec![GS, b'(', b'k', 0x03, 0x00, 0x30, 0x43, width]
}

/// Row height multiplier.
#[inline]
pub fn pdf417_row_height(height: u8) -> Vec<u8> {
    vec![GS, b'(', b'k', 0x03, 0x00, 0x30, 0x44, height]
}

/// Error correction level 0..=8 (function 69, fixed-ratio mode).
#[inline]
pub fn pdf417_error_level(level: u8) -> Vec<u8> {
    vec![GS, b'(', b'k', 0x04, 0x00, 0x30, 0x45, 0x31, level]
}

/// Store PDF417 data in the symbol buffer (function 80).
pub fn pdf417_data(data: &[u8]) -> Vec<u8> {
    let [pl, ph] = u16_le(data.len() as u16 + 3);
    let mut cmd = vec![GS, b'(', b'k', pl, ph, 0x30, 0x50, 0x30];
    cmd.extend_from_slice(data);
    cmd
}

/// Print the stored PDF417 symbol (function 81).
#[inline]
pub fn pdf417_print() -> Vec<u8> {
    vec![GS, b'(', b'k', 0x03, 0x00, 0x30, 0x51, 0x30]
}

// ============================================================================
// GRAPHICS
// ============================================================================

/// # Print Raster Bit Image (GS v 0 m xL xH yL yH d1..dk)
///
/// | Format | Bytes |
/// |--------|-------|
/// | Hex    | 1D 76 30 m xL xH yL yH data |
///
/// - `m`: 0 = uncompressed, 1 = RLE mode 1 payload
/// - `x`: width in bytes, little-endian
/// - `y`: strip row count, little-endian
///
/// One command frames one strip; tall images send several in sequence
/// and the printer renders them as continuous output.
pub fn raster_frame(width_bytes: u16, rows: u16, mode: u8, data: &[u8]) -> Vec<u8> {
    let [xl, xh] = u16_le(width_bytes);
    let [yl, yh] = u16_le(rows);

    let mut cmd = Vec::with_capacity(8 + data.len());
    cmd.extend_from_slice(&[GS, b'v', b'0', mode, xl, xh, yl, yh]);
    cmd.extend_from_slice(data);
    cmd
}

/// Set line spacing to 24 dots (ESC 3 24) so column strips abut.
#[inline]
pub fn line_spacing_24() -> Vec<u8> {
    vec![ESC, b'3', 0x24]
}

/// Reset line spacing to the default (ESC 2).
#[inline]
pub fn line_spacing_reset() -> Vec<u8> {
    vec![ESC, b'2']
}

/// # Bit Image Strip (ESC * m nL nH d1..dk)
///
/// 24-dot double-density column mode (m = 33); `n` is the dot width.
/// Each strip is terminated with LF by the caller.
pub fn column_frame(width: u16, data: &[u8]) -> Vec<u8> {
    let [nl, nh] = u16_le(width);
    let mut cmd = Vec::with_capacity(5 + data.len() + 1);
    cmd.extend_from_slice(&[ESC, b'*', 0x21, nl, nh]);
    cmd.extend_from_slice(data);
    cmd.push(LF);
    cmd
}

// ============================================================================
// DRIVER
// ============================================================================

/// The ESC/POS dialect driver.
pub struct EscPos;

#[async_trait]
impl Dialect for EscPos {
    fn kind(&self) -> DialectKind {
        DialectKind::EscPos
    }

    fn initialize(&self) -> Vec<u8> {
        init()
    }

    fn font(&self, f: Font) -> Vec<u8> {
        font(f)
    }

    fn align(&self, alignment: Alignment) -> Vec<u8> {
        align(alignment)
    }

    fn bold(&self, enabled: bool) -> Vec<u8> {
        bold(enabled)
    }

    fn italic(&self, enabled: bool) -> Vec<u8> {
        italic(enabled)
    }

    fn underline(&self, enabled: bool) -> Vec<u8> {
        underline(enabled)
    }

    fn invert(&self, enabled: bool) -> Vec<u8> {
        invert(enabled)
    }

    fn size(&self, width: u8, height: u8) -> Vec<u8> {
        size(width, height)
    }

    fn codepage(&self, value: u8) -> Vec<u8> {
        codepage(value)
    }

    fn cut(&self, variant: CutType) -> Vec<u8> {
        cut(variant)
    }

    fn pulse(&self, device: u8, on_ms: u16, off_ms: u16) -> Vec<u8> {
        pulse(device, on_ms, off_ms)
    }

    fn flush(&self) -> Vec<u8> {
        Vec::new()
    }

    fn barcode(
        &self,
        data: &str,
        symbology: Symbology,
        options: &BarcodeOptions,
    ) -> Result<Vec<u8>> {
        if data.is_empty() || data.len() > 255 || !data.is_ascii() {
            return Err(ReciboError::validation(
                "barcode data must be 1-255 ASCII characters",
            ));
        }
        if !(2..=6).contains(&options.width) {
            return Err(ReciboError::validation(format!(
                "barcode width must be 2-6 dots, got {}",
                options.width
            )));
        }
        if options.height == 0 {
            return Err(ReciboError::validation("barcode height must be at least 1"));
        }

        // Function B Code128 wants an explicit code-set prefix.
        let payload = if symbology == Symbology::Code128 && !data.starts_with('{') {
            let mut prefixed = String::with_capacity(data.len() + 2);
            prefixed.push_str("{B");
            prefixed.push_str(data);
            prefixed.into_bytes()
        } else {
            data.as_bytes().to_vec()
        };

        let mut cmd = Vec::new();
        cmd.extend(barcode_text(options.text));
        cmd.extend(barcode_height(options.height));
        cmd.extend(barcode_width(options.width));
        cmd.extend(barcode_print(symbology, &payload));
        Ok(cmd)
    }

    fn qrcode(&self, data: &str, options: &QrOptions) -> Result<Vec<u8>> {
        if !(1..=2).contains(&options.model) {
            return Err(ReciboError::validation(format!(
                "QR model must be 1 or 2, got {}",
                options.model
            )));
        }
        if !(1..=8).contains(&options.size) {
            return Err(ReciboError::validation(format!(
                "QR cell size must be 1-8, got {}",
                options.size
            )));
        }
        if data.is_empty() || data.len() > u16::MAX as usize - 3 {
            return Err(ReciboError::validation("QR data length out of range"));
        }

        let mut cmd = Vec::new();
        cmd.extend(qr_model(options.model));
        cmd.extend(qr_size(options.size));
        cmd.extend(qr_error_level(options.error_level as u8));
        cmd.extend(qr_data(data.as_bytes()));
        cmd.extend(qr_print());
        Ok(cmd)
    }

    fn pdf417(&self, data: &str, options: &Pdf417Options) -> Result<Vec<u8>> {
        validate_pdf417(options)?;
        if data.is_empty() || data.len() > u16::MAX as usize - 3 {
            return Err(ReciboError::validation("PDF417 data length out of range"));
        }

        let mut cmd = Vec::new();
        cmd.extend(pdf417_columns(options.columns));
        cmd.extend(pdf417_rows(options.rows));
        cmd.extend(pdf417_width(options.width));
        cmd.extend(pdf417_row_height(options.height));
        cmd.extend(pdf417_error_level(options.error_level));
        cmd.extend(pdf417_data(data.as_bytes()));
        cmd.extend(pdf417_print());
        Ok(cmd)
    }

    async fn image(
        &self,
        bitmap: &Bitmap,
        mode: ImageMode,
        compress: bool,
        pool: &mut BufferPool,
    ) -> Result<Vec<u8>> {
        match mode {
            ImageMode::Raster => raster_image(bitmap, compress, pool).await,
            ImageMode::Column => column_image(bitmap, pool).await,
        }
    }
}

/// Shared PDF417 range validation (the Star driver uses the same limits).
pub(super) fn validate_pdf417(options: &Pdf417Options) -> Result<()> {
    if options.columns != 0 && !(1..=30).contains(&options.columns) {
        return Err(ReciboError::validation(format!(
            "PDF417 columns must be 0 (auto) or 1-30, got {}",
            options.columns
        )));
    }
    if options.rows != 0 && !(3..=90).contains(&options.rows) {
        return Err(ReciboError::validation(format!(
            "PDF417 rows must be 0 (auto) or 3-90, got {}",
            options.rows
        )));
    }
    if !(2..=8).contains(&options.width) {
        return Err(ReciboError::validation(format!(
            "PDF417 width must be 2-8, got {}",
            options.width
        )));
    }
    if !(2..=8).contains(&options.height) {
        return Err(ReciboError::validation(format!(
            "PDF417 row height must be 2-8, got {}",
            options.height
        )));
    }
    if options.error_level > 8 {
        return Err(ReciboError::validation(format!(
            "PDF417 error level must be 0-8, got {}",
            options.error_level
        )));
    }
    Ok(())
}

async fn raster_image(bitmap: &Bitmap, compress: bool, pool: &mut BufferPool) -> Result<Vec<u8>> {
    let strips = if bitmap.is_large() {
        raster::strips_yielding(bitmap, MAX_STRIP_ROWS, pool).await
    } else {
        raster::strips(bitmap, MAX_STRIP_ROWS, pool)
    };

    let width_bytes = bitmap.width_bytes() as u16;
    let mut out = Vec::new();

    for strip in strips {
        if compress {
            let rle = rle::compress_with(&strip.data, pool);
            if rle.compressed {
                out.extend(raster_frame(width_bytes, strip.rows as u16, 1, &rle.data));
                pool.release(strip.data);
                pool.release(rle.data);
                continue;
            }
        }
        out.extend(raster_frame(width_bytes, strip.rows as u16, 0, &strip.data));
        pool.release(strip.data);
    }

    Ok(out)
}

async fn column_image(bitmap: &Bitmap, pool: &mut BufferPool) -> Result<Vec<u8>> {
    let strips = if bitmap.is_large() {
        column::strips_yielding(bitmap, pool).await
    } else {
        column::strips(bitmap, pool)
    };

    let width = bitmap.width() as u16;
    let mut out = line_spacing_24();
    for strip in strips {
        out.extend(column_frame(width, &strip));
        pool.release(strip);
    }
    out.extend(line_spacing_reset());
    Ok(out)
}
