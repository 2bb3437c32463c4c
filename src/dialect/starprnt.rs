//! # StarPRNT Driver
//!
//! Command builders for the StarPRNT protocol used by current Star
//! Micronics receipt printers (TSP100IV, TSP650II, mC-Print series).
//!
//! StarPRNT printers buffer output in page mode; the [`flush`] sequence
//! forces the page out, which is why auto-flush defaults on for this
//! dialect and no other.
//!
//! The byte builders here are shared with the Star Line driver — the two
//! dialects diverge only where the legacy line-mode firmware lacks a
//! feature (see [`super::starline`]).
//!
//! ## Reference
//!
//! Based on "StarPRNT Command Specifications Rev. 4.10"
//! by Star Micronics Co., Ltd.

use async_trait::async_trait;

use super::escpos::validate_pdf417;
use super::{
    u16_le, Alignment, BarcodeOptions, CutType, Dialect, DialectKind, Font, ImageMode,
    Pdf417Options, QrOptions, Symbology, CR, ESC, GS, LF, RS,
};
use crate::error::{ReciboError, Result};
use crate::image::{column, Bitmap};
use crate::pool::BufferPool;

// ============================================================================
// BASIC COMMANDS
// ============================================================================

/// # Initialize Printer (ESC @ CAN)
///
/// Resets formatting and cancels any buffered page-mode data.
///
/// | Format | Bytes |
/// |--------|-------|
/// | Hex    | 1B 40 18 |
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@', 0x18]
}

/// # Select Font (ESC RS F n)
///
/// | Format | Bytes |
/// |--------|-------|
/// | Hex    | 1B 1E 46 {A=0, B=1, C=2} |
#[inline]
pub fn font(f: Font) -> Vec<u8> {
    vec![ESC, RS, b'F', f as u8]
}

/// # Set Alignment (ESC GS a n)
#[inline]
pub fn align(alignment: Alignment) -> Vec<u8> {
    vec![ESC, GS, b'a', alignment as u8]
}

/// Bold on (ESC E) / off (ESC F).
#[inline]
pub fn bold(enabled: bool) -> Vec<u8> {
    vec![ESC, if enabled { b'E' } else { b'F' }]
}

/// Underline on/off (ESC - n).
#[inline]
pub fn underline(enabled: bool) -> Vec<u8> {
    vec![ESC, b'-', enabled as u8]
}

/// Invert on (ESC 4) / off (ESC 5).
#[inline]
pub fn invert(enabled: bool) -> Vec<u8> {
    vec![ESC, if enabled { b'4' } else { b'5' }]
}

/// # Set Character Size (ESC i n1 n2)
///
/// Height multiplier first, then width, both 0-based.
#[inline]
pub fn size(width: u8, height: u8) -> Vec<u8> {
    vec![ESC, b'i', height.clamp(1, 8) - 1, width.clamp(1, 8) - 1]
}

/// # Select Codepage Slot (ESC GS t n)
#[inline]
pub fn codepage(value: u8) -> Vec<u8> {
    vec![ESC, GS, b't', value]
}

/// # Cut Paper (ESC d m)
///
/// | Format | Bytes |
/// |--------|-------|
/// | Hex    | 1B 64 {full=00, partial=01} |
#[inline]
pub fn cut(variant: CutType) -> Vec<u8> {
    let m = match variant {
        CutType::Full => 0x00,
        CutType::Partial => 0x01,
    };
    vec![ESC, b'd', m]
}

/// # Cash Drawer Pulse (ESC BEL t1 t2 d)
///
/// Pulse times are in 10ms units, clamped to 127; the trailing byte
/// selects the drawer circuit (BEL = drawer 1, SUB = drawer 2).
#[inline]
pub fn pulse(device: u8, on_ms: u16, off_ms: u16) -> Vec<u8> {
    vec![
        ESC,
        0x07,
        (on_ms / 10).min(127) as u8,
        (off_ms / 10).min(127) as u8,
        if device == 0 { 0x07 } else { 0x1A },
    ]
}

/// # Flush Page-Mode Output (ESC GS P 0, ESC GS P 1)
///
/// Sets then releases page mode so everything buffered prints.
#[inline]
pub fn flush() -> Vec<u8> {
    vec![ESC, GS, b'P', b'0', ESC, GS, b'P', b'1']
}

// ============================================================================
// BARCODES (ESC b)
// ============================================================================

/// Star barcode type codes (ESC b n1).
const fn symbology_id(symbology: Symbology) -> u8 {
    match symbology {
        Symbology::UpcE => 48,
        Symbology::UpcA => 49,
        Symbology::Ean8 => 50,
        Symbology::Ean13 => 51,
        Symbology::Code39 => 52,
        Symbology::Itf => 53,
        Symbology::Code128 => 54,
        Symbology::Code93 => 55,
        Symbology::Codabar => 56,
    }
}

/// # Print 1D Barcode (ESC b n1 n2 n3 n4 data RS)
///
/// | Parameter | Meaning |
/// |-----------|---------|
/// | n1 | symbology code |
/// | n2 | HRI + line feed: '1' = none, '2' = under bars |
/// | n3 | 48 + module width |
/// | n4 | height in dots |
pub fn barcode(symbology: Symbology, data: &[u8], options: &BarcodeOptions) -> Vec<u8> {
    let n2 = if options.text { 50 } else { 49 };
    let n3 = 48 + options.width;
    let n4 = options.height.max(1);

    let mut cmd = Vec::with_capacity(6 + data.len() + 1);
    cmd.extend_from_slice(&[ESC, b'b', symbology_id(symbology), n2, n3, n4]);
    cmd.extend_from_slice(data);
    cmd.push(RS);
    cmd
}

// ============================================================================
// QR CODE (ESC GS y)
// ============================================================================

/// QR model, 1 or 2 (ESC GS y S 0 n).
#[inline]
pub fn qr_model(model: u8) -> Vec<u8> {
    vec![ESC, GS, b'y', b'S', b'0', model]
}

/// QR error correction level, 0..=3 (ESC GS y S 1 n).
#[inline]
pub fn qr_error_level(level: u8) -> Vec<u8> {
    vec![ESC, GS, b'y', b'S', b'1', level]
}

/// QR cell size in dots (ESC GS y S 2 n).
#[inline]
pub fn qr_size(size: u8) -> Vec<u8> {
    vec![ESC, GS, b'y', b'S', b'2', size]
}

/// Store QR data, auto mode analysis (ESC GS y D 1 0 nL nH data).
pub fn qr_data(data: &[u8]) -> Vec<u8> {
    let [nl, nh] = u16_le(data.len() as u16);
    let mut cmd = vec![ESC, GS, b'y', b'D', b'1', 0x00, nl, nh];
    cmd.extend_from_slice(data);
    cmd
}

/// Print the stored QR symbol (ESC GS y P).
#[inline]
pub fn qr_print() -> Vec<u8> {
    vec![ESC, GS, b'y', b'P']
}

// ============================================================================
// PDF417 (ESC GS x)
// ============================================================================

/// Fixed rows/columns, 0 = auto (ESC GS x S 0 1 p1 p2).
#[inline]
pub fn pdf417_size(rows: u8, columns: u8) -> Vec<u8> {
    vec![ESC, GS, b'x', b'S', b'0', 0x01, rows, columns]
}

/// Error correction level 0..=8 (ESC GS x S 1 n).
#[inline]
pub fn pdf417_error_level(level: u8) -> Vec<u8> {
    vec![ESC, GS, b'x', b'S', b'1', level]
}

/// Module width in dots (ESC GS x S 2 n).
#[inline]
pub fn pdf417_width(width: u8) -> Vec<u8> {
    vec![ESC, GS, b'x', b'S', b'2', width]
}

/// Module aspect ratio (ESC GS x S 3 n).
#[inline]
pub fn pdf417_aspect(aspect: u8) -> Vec<u8> {
    vec![ESC, GS, b'x', b'S', b'3', aspect]
}

/// Store PDF417 data (ESC GS x D nL nH data).
pub fn pdf417_data(data: &[u8]) -> Vec<u8> {
    let [nl, nh] = u16_le(data.len() as u16);
    let mut cmd = vec![ESC, GS, b'x', b'D', nl, nh];
    cmd.extend_from_slice(data);
    cmd
}

/// Print the stored PDF417 symbol (ESC GS x P).
#[inline]
pub fn pdf417_print() -> Vec<u8> {
    vec![ESC, GS, b'x', b'P']
}

// ============================================================================
// GRAPHICS (ESC X)
// ============================================================================

/// # Column Strip (ESC X nL nH d1..dk, LF CR)
///
/// One 24-dot strip; `n` is the dot width and the data is 3 bytes per
/// column, MSB topmost.
pub fn column_frame(width: u16, data: &[u8]) -> Vec<u8> {
    let [nl, nh] = u16_le(width);
    let mut cmd = Vec::with_capacity(4 + data.len() + 2);
    cmd.extend_from_slice(&[ESC, b'X', nl, nh]);
    cmd.extend_from_slice(data);
    cmd.push(LF);
    cmd.push(CR);
    cmd
}

// ============================================================================
// SHARED DRIVER LOGIC
// ============================================================================

pub(super) fn validated_barcode(
    data: &str,
    symbology: Symbology,
    options: &BarcodeOptions,
) -> Result<Vec<u8>> {
    if data.is_empty() || data.len() > 255 || !data.is_ascii() {
        return Err(ReciboError::validation(
            "barcode data must be 1-255 ASCII characters",
        ));
    }
    if !(1..=3).contains(&options.width) {
        return Err(ReciboError::validation(format!(
            "barcode width must be 1-3 for Star printers, got {}",
            options.width
        )));
    }
    if options.height == 0 {
        return Err(ReciboError::validation("barcode height must be at least 1"));
    }
    Ok(barcode(symbology, data.as_bytes(), options))
}

pub(super) fn validated_qrcode(data: &str, options: &QrOptions) -> Result<Vec<u8>> {
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
    if data.is_empty() || data.len() > u16::MAX as usize {
        return Err(ReciboError::validation("QR data length out of range"));
    }

    let mut cmd = Vec::new();
    cmd.extend(qr_model(options.model));
    cmd.extend(qr_error_level(options.error_level as u8));
    cmd.extend(qr_size(options.size));
    cmd.extend(qr_data(data.as_bytes()));
    cmd.extend(qr_print());
    Ok(cmd)
}

pub(super) fn validated_pdf417(data: &str, options: &Pdf417Options) -> Result<Vec<u8>> {
    validate_pdf417(options)?;
    if data.is_empty() || data.len() > u16::MAX as usize {
        return Err(ReciboError::validation("PDF417 data length out of range"));
    }

    let mut cmd = Vec::new();
    cmd.extend(pdf417_size(options.rows, options.columns));
    cmd.extend(pdf417_error_level(options.error_level));
    cmd.extend(pdf417_width(options.width));
    cmd.extend(pdf417_aspect(options.height));
    cmd.extend(pdf417_data(data.as_bytes()));
    cmd.extend(pdf417_print());
    Ok(cmd)
}

/// Star image framing: column strips only, regardless of requested mode.
pub(super) async fn column_image(bitmap: &Bitmap, pool: &mut BufferPool) -> Result<Vec<u8>> {
    let strips = if bitmap.is_large() {
        column::strips_yielding(bitmap, pool).await
    } else {
        column::strips(bitmap, pool)
    };

    let width = bitmap.width() as u16;
    let mut out = Vec::new();
    for strip in strips {
        out.extend(column_frame(width, &strip));
        pool.release(strip);
    }
    Ok(out)
}

// ============================================================================
// DRIVER
// ============================================================================

/// The StarPRNT dialect driver.
pub struct StarPrnt;

#[async_trait]
impl Dialect for StarPrnt {
    fn kind(&self) -> DialectKind {
        DialectKind::StarPrnt
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

    fn italic(&self, _enabled: bool) -> Vec<u8> {
        // StarPRNT has no italic mode.
        Vec::new()
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
        flush()
    }

    fn barcode(
        &self,
        data: &str,
        symbology: Symbology,
        options: &BarcodeOptions,
    ) -> Result<Vec<u8>> {
        validated_barcode(data, symbology, options)
    }

    fn qrcode(&self, data: &str, options: &QrOptions) -> Result<Vec<u8>> {
        validated_qrcode(data, options)
    }

    fn pdf417(&self, data: &str, options: &Pdf417Options) -> Result<Vec<u8>> {
        validated_pdf417(data, options)
    }

    async fn image(
        &self,
        bitmap: &Bitmap,
        _mode: ImageMode,
        _compress: bool,
        pool: &mut BufferPool,
    ) -> Result<Vec<u8>> {
        column_image(bitmap, pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::test_support::bitmap_from_fn;

    #[test]
    fn test_init() {
        assert_eq!(init(), vec![0x1B, 0x40, 0x18]);
    }

    #[test]
    fn test_font() {
        assert_eq!(font(Font::A), vec![0x1B, 0x1E, 0x46, 0x00]);
        assert_eq!(font(Font::B), vec![0x1B, 0x1E, 0x46, 0x01]);
        assert_eq!(font(Font::C), vec![0x1B, 0x1E, 0x46, 0x02]);
    }

    #[test]
    fn test_align() {
        assert_eq!(align(Alignment::Center), vec![0x1B, 0x1D, 0x61, 0x01]);
    }

    #[test]
    fn test_bold_invert_pairs() {
        assert_eq!(bold(true), vec![0x1B, 0x45]);
        assert_eq!(bold(false), vec![0x1B, 0x46]);
        assert_eq!(invert(true), vec![0x1B, 0x34]);
        assert_eq!(invert(false), vec![0x1B, 0x35]);
    }

    #[test]
    fn test_italic_is_empty() {
        assert!(StarPrnt.italic(true).is_empty());
        assert!(StarPrnt.italic(false).is_empty());
    }

    #[test]
    fn test_size_height_first() {
        assert_eq!(size(1, 1), vec![0x1B, 0x69, 0x00, 0x00]);
        // width 3, height 2 → ESC i 1 2.
        assert_eq!(size(3, 2), vec![0x1B, 0x69, 0x01, 0x02]);
    }

    #[test]
    fn test_codepage() {
        assert_eq!(codepage(1), vec![0x1B, 0x1D, 0x74, 0x01]);
    }

    #[test]
    fn test_cut() {
        assert_eq!(cut(CutType::Full), vec![0x1B, 0x64, 0x00]);
        assert_eq!(cut(CutType::Partial), vec![0x1B, 0x64, 0x01]);
    }

    #[test]
    fn test_pulse() {
        assert_eq!(pulse(0, 100, 200), vec![0x1B, 0x07, 10, 20, 0x07]);
        assert_eq!(pulse(1, 5000, 5000), vec![0x1B, 0x07, 127, 127, 0x1A]);
    }

    #[test]
    fn test_flush() {
        assert_eq!(
            flush(),
            vec![0x1B, 0x1D, 0x50, 0x30, 0x1B, 0x1D, 0x50, 0x31]
        );
    }

    #[test]
    fn test_barcode_framing() {
        let cmd = StarPrnt
            .barcode("TEST", Symbology::Code39, &BarcodeOptions::default())
            .unwrap();
        assert_eq!(cmd[0], 0x1B);
        assert_eq!(cmd[1], b'b');
        assert_eq!(cmd[2], 52); // Code39
        assert_eq!(cmd[3], 50); // HRI under bars
        assert_eq!(cmd[4], 50); // 48 + width 2
        assert_eq!(cmd[5], 60); // height
        assert_eq!(&cmd[6..10], b"TEST");
        assert_eq!(cmd[10], 0x1E); // RS terminator
    }

    #[test]
    fn test_barcode_no_text() {
        let opts = BarcodeOptions {
            text: false,
            ..Default::default()
        };
        let cmd = StarPrnt.barcode("1", Symbology::UpcA, &opts).unwrap();
        assert_eq!(cmd[2], 49);
        assert_eq!(cmd[3], 49); // no HRI
    }

    #[test]
    fn test_barcode_width_range() {
        let opts = BarcodeOptions {
            width: 4,
            ..Default::default()
        };
        assert!(StarPrnt.barcode("1", Symbology::Code39, &opts).is_err());
    }

    #[test]
    fn test_qr_sequence() {
        let cmd = StarPrnt.qrcode("Hello", &QrOptions::default()).unwrap();
        assert!(cmd.starts_with(&[0x1B, 0x1D, 0x79, 0x53, 0x30, 0x02]));
        // Data header with little-endian length.
        assert!(cmd
            .windows(8)
            .any(|w| w == [0x1B, 0x1D, 0x79, 0x44, 0x31, 0x00, 5, 0]));
        assert!(cmd.ends_with(&[0x1B, 0x1D, 0x79, 0x50]));
    }

    #[test]
    fn test_pdf417_sequence() {
        let cmd = StarPrnt.pdf417("Test123", &Pdf417Options::default()).unwrap();
        assert!(cmd.starts_with(&[0x1B, 0x1D, 0x78, 0x53, 0x30, 0x01, 0x00, 0x00]));
        assert!(cmd
            .windows(6)
            .any(|w| w == [0x1B, 0x1D, 0x78, 0x44, 7, 0]));
        assert!(cmd.ends_with(&[0x1B, 0x1D, 0x78, 0x50]));
    }

    #[test]
    fn test_column_frame() {
        let data = vec![0xFF; 3 * 8];
        let cmd = column_frame(8, &data);
        assert_eq!(&cmd[0..4], &[0x1B, 0x58, 8, 0]);
        assert_eq!(&cmd[cmd.len() - 2..], &[0x0A, 0x0D]);
        assert_eq!(cmd.len(), 4 + 24 + 2);
    }

    #[tokio::test]
    async fn test_image_is_column_mode_even_when_raster_requested() {
        let mut pool = BufferPool::new();
        let bitmap = bitmap_from_fn(8, 24, |_, _| true);
        let cmd = StarPrnt
            .image(&bitmap, ImageMode::Raster, true, &mut pool)
            .await
            .unwrap();
        assert!(cmd.starts_with(&[0x1B, 0x58, 8, 0]));
        assert!(cmd.ends_with(&[0x0A, 0x0D]));
    }
}
