//! # Star Line Driver
//!
//! The legacy Star Micronics line-mode dialect (TSP700II era firmware).
//!
//! Star Line shares almost the entire StarPRNT byte set — the builders in
//! [`super::starprnt`] serve both. The load-bearing difference is that
//! line-mode firmware has no page mode: there is nothing to flush, so
//! [`Dialect::flush`] is empty here and auto-flush never applies to this
//! dialect. Feature gaps beyond that (QR/PDF417 on older units) are
//! expressed in the printer registry rather than the driver.

use async_trait::async_trait;

use super::starprnt;
use super::{
    Alignment, BarcodeOptions, CutType, Dialect, DialectKind, Font, ImageMode, Pdf417Options,
    QrOptions, Symbology,
};
use crate::error::Result;
use crate::image::Bitmap;
use crate::pool::BufferPool;

/// The Star Line dialect driver.
pub struct StarLine;

#[async_trait]
impl Dialect for StarLine {
    fn kind(&self) -> DialectKind {
        DialectKind::StarLine
    }

    fn initialize(&self) -> Vec<u8> {
        starprnt::init()
    }

    fn font(&self, f: Font) -> Vec<u8> {
        starprnt::font(f)
    }

    fn align(&self, alignment: Alignment) -> Vec<u8> {
        starprnt::align(alignment)
    }

    fn bold(&self, enabled: bool) -> Vec<u8> {
        starprnt::bold(enabled)
    }

    fn italic(&self, _enabled: bool) -> Vec<u8> {
        Vec::new()
    }

    fn underline(&self, enabled: bool) -> Vec<u8> {
        starprnt::underline(enabled)
    }

    fn invert(&self, enabled: bool) -> Vec<u8> {
        starprnt::invert(enabled)
    }

    fn size(&self, width: u8, height: u8) -> Vec<u8> {
        starprnt::size(width, height)
    }

    fn codepage(&self, value: u8) -> Vec<u8> {
        starprnt::codepage(value)
    }

    fn cut(&self, variant: CutType) -> Vec<u8> {
        starprnt::cut(variant)
    }

    fn pulse(&self, device: u8, on_ms: u16, off_ms: u16) -> Vec<u8> {
        starprnt::pulse(device, on_ms, off_ms)
    }

    fn flush(&self) -> Vec<u8> {
        // Line mode prints as it goes; there is no page to force out.
        Vec::new()
    }

    fn barcode(
        &self,
        data: &str,
        symbology: Symbology,
        options: &BarcodeOptions,
    ) -> Result<Vec<u8>> {
        starprnt::validated_barcode(data, symbology, options)
    }

    fn qrcode(&self, data: &str, options: &QrOptions) -> Result<Vec<u8>> {
        starprnt::validated_qrcode(data, options)
    }

    fn pdf417(&self, data: &str, options: &Pdf417Options) -> Result<Vec<u8>> {
        starprnt::validated_pdf417(data, options)
    }

    async fn image(
        &self,
        bitmap: &Bitmap,
        _mode: ImageMode,
        _compress: bool,
        pool: &mut BufferPool,
    ) -> Result<Vec<u8>> {
        starprnt::column_image(bitmap, pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::StarPrnt;
    use super::*;

    #[test]
    fn test_shares_star_byte_set() {
        assert_eq!(StarLine.initialize(), StarPrnt.initialize());
        assert_eq!(StarLine.cut(CutType::Full), StarPrnt.cut(CutType::Full));
        assert_eq!(StarLine.bold(true), StarPrnt.bold(true));
        assert_eq!(StarLine.size(2, 3), StarPrnt.size(2, 3));
    }

    #[test]
    fn test_flush_is_empty() {
        assert!(StarLine.flush().is_empty());
        assert!(!StarPrnt.flush().is_empty());
    }
}
