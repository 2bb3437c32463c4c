//! # Dialect Drivers
//!
//! A uniform capability interface over the three printer command
//! languages, each with divergent byte sequences for every operation:
//!
//! | Module | Dialect | Heritage |
//! |--------|---------|----------|
//! | [`escpos`] | ESC/POS | Epson and the wide compatible ecosystem |
//! | [`starprnt`] | StarPRNT | Star Micronics, page-mode capable |
//! | [`starline`] | Star Line | Star Micronics legacy line mode |
//!
//! The encoder holds a `Box<dyn Dialect>` selected from the printer
//! registry and drives it polymorphically: style and layout operations
//! return ready-to-queue byte sequences, barcode/QR/PDF417 operations
//! validate their parameters against the dialect's ranges, and the image
//! operation frames packed pixel strips — cooperatively yielding for
//! large images.
//!
//! ## Byte Order
//!
//! Multi-byte integers in all three dialects are **little-endian**:
//! `u16` value 0x0240 (576) is sent as `[0x40, 0x02]`.

pub mod escpos;
pub mod starline;
pub mod starprnt;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;
use crate::image::Bitmap;
use crate::pool::BufferPool;

pub use escpos::EscPos;
pub use starline::StarLine;
pub use starprnt::StarPrnt;

// ============================================================================
// ESCAPE SEQUENCE CONSTANTS
// ============================================================================

/// ESC (Escape) - primary command prefix.
pub const ESC: u8 = 0x1B;

/// GS (Group Separator) - extended command prefix.
pub const GS: u8 = 0x1D;

/// FS (File Separator) - character-mode command prefix (ESC/POS).
pub const FS: u8 = 0x1C;

/// RS (Record Separator) - data terminator in Star barcode commands.
pub const RS: u8 = 0x1E;

/// LF (Line Feed).
pub const LF: u8 = 0x0A;

/// CR (Carriage Return).
pub const CR: u8 = 0x0D;

/// Encode a u16 value as little-endian bytes [low, high].
#[inline]
pub const fn u16_le(value: u16) -> [u8; 2] {
    [value as u8, (value >> 8) as u8]
}

// ============================================================================
// SHARED VOCABULARY
// ============================================================================

/// The three supported wire dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DialectKind {
    EscPos,
    StarPrnt,
    StarLine,
}

impl DialectKind {
    /// Instantiate the driver for this dialect.
    pub fn driver(self) -> Box<dyn Dialect> {
        match self {
            Self::EscPos => Box::new(EscPos),
            Self::StarPrnt => Box::new(StarPrnt),
            Self::StarLine => Box::new(StarLine),
        }
    }

    /// Parse a dialect name as used in options and model data.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "esc-pos" => Some(Self::EscPos),
            "star-prnt" => Some(Self::StarPrnt),
            "star-line" => Some(Self::StarLine),
            _ => None,
        }
    }
}

/// Text alignment options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left = 0,
    Center = 1,
    Right = 2,
}

/// Character fonts. Columns per font come from the printer model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Font {
    #[default]
    A = 0,
    B = 1,
    C = 2,
}

/// Paper cut variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CutType {
    #[default]
    Full,
    Partial,
}

/// Image transmission modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageMode {
    /// Vertical 24-dot strips (ESC * / ESC X).
    Column,
    /// Row-major raster (GS v 0).
    Raster,
}

/// 1D barcode symbologies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Symbology {
    UpcA,
    UpcE,
    Ean13,
    Ean8,
    Code39,
    Itf,
    Codabar,
    Code93,
    Code128,
}

/// QR error correction levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QrErrorLevel {
    /// ~7% recovery.
    L = 0,
    /// ~15% recovery.
    #[default]
    M = 1,
    /// ~25% recovery.
    Q = 2,
    /// ~30% recovery.
    H = 3,
}

/// 1D barcode parameters.
#[derive(Debug, Clone, Copy)]
pub struct BarcodeOptions {
    /// Bar height in dots.
    pub height: u8,
    /// Module (narrow bar) width; dialect-specific range.
    pub width: u8,
    /// Print the human-readable text line under the bars.
    pub text: bool,
}

impl Default for BarcodeOptions {
    fn default() -> Self {
        Self {
            height: 60,
            width: 2,
            text: true,
        }
    }
}

/// QR code parameters.
#[derive(Debug, Clone, Copy)]
pub struct QrOptions {
    /// QR model, 1 or 2.
    pub model: u8,
    /// Cell size in dots, 1..=8.
    pub size: u8,
    pub error_level: QrErrorLevel,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            model: 2,
            size: 6,
            error_level: QrErrorLevel::M,
        }
    }
}

/// PDF417 parameters.
#[derive(Debug, Clone, Copy)]
pub struct Pdf417Options {
    /// Data columns, 0 = auto, else 1..=30.
    pub columns: u8,
    /// Rows, 0 = auto, else 3..=90.
    pub rows: u8,
    /// Module width in dots, 2..=8.
    pub width: u8,
    /// Row height multiplier, 2..=8.
    pub height: u8,
    /// Error correction level, 0..=8.
    pub error_level: u8,
}

impl Default for Pdf417Options {
    fn default() -> Self {
        Self {
            columns: 0,
            rows: 0,
            width: 3,
            height: 3,
            error_level: 1,
        }
    }
}

// ============================================================================
// THE DIALECT TRAIT
// ============================================================================

/// A printer command language.
///
/// Style and control operations are infallible byte builders. Code
/// operations validate parameters against dialect-specific ranges and
/// return `ValidationError` on violations. `image` packs and frames pixel
/// strips, switching to the cooperatively-yielding path for large inputs.
#[async_trait]
pub trait Dialect: Send + Sync {
    fn kind(&self) -> DialectKind;

    /// Reset to power-on defaults.
    fn initialize(&self) -> Vec<u8>;

    fn font(&self, font: Font) -> Vec<u8>;
    fn align(&self, alignment: Alignment) -> Vec<u8>;
    fn bold(&self, enabled: bool) -> Vec<u8>;
    fn italic(&self, enabled: bool) -> Vec<u8>;
    fn underline(&self, enabled: bool) -> Vec<u8>;
    fn invert(&self, enabled: bool) -> Vec<u8>;

    /// Character cell multipliers; `width` and `height` are 1..=8.
    fn size(&self, width: u8, height: u8) -> Vec<u8>;

    /// Select the codepage slot `value` from the printer's mapping.
    fn codepage(&self, value: u8) -> Vec<u8>;

    fn cut(&self, cut: CutType) -> Vec<u8>;

    /// Fire the cash-drawer pulse on `device` with on/off times in ms.
    fn pulse(&self, device: u8, on_ms: u16, off_ms: u16) -> Vec<u8>;

    /// Force buffered page-mode output; empty for line-mode dialects.
    fn flush(&self) -> Vec<u8>;

    fn barcode(&self, data: &str, symbology: Symbology, options: &BarcodeOptions)
        -> Result<Vec<u8>>;

    fn qrcode(&self, data: &str, options: &QrOptions) -> Result<Vec<u8>>;

    fn pdf417(&self, data: &str, options: &Pdf417Options) -> Result<Vec<u8>>;

    /// Frame an image in `mode`, compressing when the printer supports it.
    async fn image(
        &self,
        bitmap: &Bitmap,
        mode: ImageMode,
        compress: bool,
        pool: &mut BufferPool,
    ) -> Result<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u16_le() {
        assert_eq!(u16_le(0x0000), [0x00, 0x00]);
        assert_eq!(u16_le(0x1234), [0x34, 0x12]);
        assert_eq!(u16_le(576), [0x40, 0x02]);
    }

    #[test]
    fn test_dialect_parse() {
        assert_eq!(DialectKind::parse("esc-pos"), Some(DialectKind::EscPos));
        assert_eq!(DialectKind::parse("star-prnt"), Some(DialectKind::StarPrnt));
        assert_eq!(DialectKind::parse("star-line"), Some(DialectKind::StarLine));
        assert_eq!(DialectKind::parse("zpl"), None);
    }

    #[test]
    fn test_driver_round_trip() {
        for kind in [
            DialectKind::EscPos,
            DialectKind::StarPrnt,
            DialectKind::StarLine,
        ] {
            assert_eq!(kind.driver().kind(), kind);
        }
    }
}
