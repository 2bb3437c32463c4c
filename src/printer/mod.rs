//! # Printer Registry
//!
//! Hardware capability records for supported receipt printers.
//!
//! Constructing an encoder with a model id pulls defaults from here:
//! column count (font A), wire dialect, codepage mapping, newline
//! terminator, pre-cut feed and image mode. Explicit encoder options
//! override whatever the model declares.
//!
//! ## Capability surface
//!
//! | Field | Drives |
//! |-------|--------|
//! | `dialect` | which [`Dialect`](crate::dialect::Dialect) driver runs |
//! | `codepages` | the wire mapping used for codepage commands |
//! | `fonts` | column budget per font, font-change rescaling |
//! | `barcodes` / `qr_models` / `pdf417` | capability checks on code operations |
//! | `image_mode` / `image_compression` | image framing |
//! | `feed_before_cut` | blank lines fed ahead of the cutter |
//!
//! The table is data: adding a printer means adding a record, not code.

use serde::Serialize;

use crate::dialect::{DialectKind, Font, ImageMode, Symbology};

/// One font entry: glyph cell size and the column count it yields on the
/// model's paper width.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FontSpec {
    pub font: Font,
    /// Glyph cell width in dots.
    pub width: u8,
    /// Glyph cell height in dots.
    pub height: u8,
    /// Characters per line at 1x width.
    pub columns: u8,
}

/// PDF417 capability of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Pdf417Support {
    /// Printer renders PDF417 natively.
    Native,
    /// No native support; the encoder substitutes this 1D symbology.
    Fallback(Symbology),
    Unsupported,
}

/// Everything the encoder needs to know about one printer model.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Capabilities {
    pub dialect: DialectKind,
    /// Codepage mapping name, resolved through [`crate::codepage::mapping`].
    pub codepages: &'static str,
    /// Preferred line terminator: `"\n"`, `"\n\r"` or `""`.
    pub newline: &'static str,
    pub fonts: &'static [FontSpec],
    pub barcodes: &'static [Symbology],
    /// Supported QR models; empty means no QR capability.
    pub qr_models: &'static [u8],
    pub pdf417: Pdf417Support,
    pub image_mode: ImageMode,
    pub image_compression: bool,
    /// Blank lines fed before a cut so the tear-off clears the print head.
    pub feed_before_cut: u8,
}

impl Capabilities {
    /// Spec for a font, if the model has it.
    pub fn font(&self, font: Font) -> Option<&'static FontSpec> {
        self.fonts.iter().find(|spec| spec.font == font)
    }

    /// Column count of font A — the model's base column budget.
    pub fn columns(&self) -> u8 {
        self.font(Font::A).map(|spec| spec.columns).unwrap_or(48)
    }

    pub fn supports_symbology(&self, symbology: Symbology) -> bool {
        self.barcodes.contains(&symbology)
    }

    pub fn supports_qr_model(&self, model: u8) -> bool {
        self.qr_models.contains(&model)
    }
}

/// A registry entry.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PrinterModel {
    pub id: &'static str,
    pub name: &'static str,
    pub capabilities: Capabilities,
}

// ============================================================================
// MODEL TABLE
// ============================================================================

const ALL_SYMBOLOGIES: &[Symbology] = &[
    Symbology::UpcA,
    Symbology::UpcE,
    Symbology::Ean13,
    Symbology::Ean8,
    Symbology::Code39,
    Symbology::Itf,
    Symbology::Codabar,
    Symbology::Code93,
    Symbology::Code128,
];

/// The common retail set on budget 58mm boards.
const BASIC_SYMBOLOGIES: &[Symbology] = &[
    Symbology::UpcA,
    Symbology::Ean13,
    Symbology::Ean8,
    Symbology::Code39,
    Symbology::Itf,
    Symbology::Code128,
];

const EPSON_80MM_FONTS: &[FontSpec] = &[
    FontSpec {
        font: Font::A,
        width: 12,
        height: 24,
        columns: 42,
    },
    FontSpec {
        font: Font::B,
        width: 9,
        height: 17,
        columns: 56,
    },
];

const EPSON_T20_FONTS: &[FontSpec] = &[
    FontSpec {
        font: Font::A,
        width: 12,
        height: 24,
        columns: 48,
    },
    FontSpec {
        font: Font::B,
        width: 9,
        height: 17,
        columns: 64,
    },
];

const EPSON_58MM_FONTS: &[FontSpec] = &[
    FontSpec {
        font: Font::A,
        width: 12,
        height: 24,
        columns: 32,
    },
    FontSpec {
        font: Font::B,
        width: 9,
        height: 17,
        columns: 42,
    },
];

const STAR_80MM_FONTS: &[FontSpec] = &[
    FontSpec {
        font: Font::A,
        width: 12,
        height: 24,
        columns: 48,
    },
    FontSpec {
        font: Font::B,
        width: 9,
        height: 24,
        columns: 64,
    },
    FontSpec {
        font: Font::C,
        width: 9,
        height: 17,
        columns: 64,
    },
];

const STAR_58MM_FONTS: &[FontSpec] = &[
    FontSpec {
        font: Font::A,
        width: 12,
        height: 24,
        columns: 32,
    },
    FontSpec {
        font: Font::B,
        width: 9,
        height: 24,
        columns: 42,
    },
];

/// All registered printer models.
pub const MODELS: &[PrinterModel] = &[
    PrinterModel {
        id: "epson-tm-t20iii",
        name: "Epson TM-T20III",
        capabilities: Capabilities {
            dialect: DialectKind::EscPos,
            codepages: "epson",
            newline: "\n\r",
            fonts: EPSON_T20_FONTS,
            barcodes: ALL_SYMBOLOGIES,
            qr_models: &[1, 2],
            pdf417: Pdf417Support::Native,
            image_mode: ImageMode::Raster,
            image_compression: true,
            feed_before_cut: 4,
        },
    },
    PrinterModel {
        id: "epson-tm-t70ii",
        name: "Epson TM-T70II",
        capabilities: Capabilities {
            dialect: DialectKind::EscPos,
            codepages: "epson",
            newline: "\n\r",
            fonts: EPSON_80MM_FONTS,
            barcodes: ALL_SYMBOLOGIES,
            qr_models: &[1, 2],
            pdf417: Pdf417Support::Native,
            image_mode: ImageMode::Raster,
            image_compression: false,
            feed_before_cut: 4,
        },
    },
    PrinterModel {
        id: "epson-tm-t88iv",
        name: "Epson TM-T88IV",
        capabilities: Capabilities {
            dialect: DialectKind::EscPos,
            codepages: "epson",
            newline: "\n\r",
            fonts: EPSON_80MM_FONTS,
            barcodes: ALL_SYMBOLOGIES,
            qr_models: &[],
            pdf417: Pdf417Support::Unsupported,
            image_mode: ImageMode::Column,
            image_compression: false,
            feed_before_cut: 4,
        },
    },
    PrinterModel {
        id: "epson-tm-t88v",
        name: "Epson TM-T88V",
        capabilities: Capabilities {
            dialect: DialectKind::EscPos,
            codepages: "epson",
            newline: "\n\r",
            fonts: EPSON_80MM_FONTS,
            barcodes: ALL_SYMBOLOGIES,
            qr_models: &[1, 2],
            pdf417: Pdf417Support::Native,
            image_mode: ImageMode::Raster,
            image_compression: false,
            feed_before_cut: 4,
        },
    },
    PrinterModel {
        id: "epson-tm-t88vii",
        name: "Epson TM-T88VII",
        capabilities: Capabilities {
            dialect: DialectKind::EscPos,
            codepages: "epson",
            newline: "\n\r",
            fonts: EPSON_80MM_FONTS,
            barcodes: ALL_SYMBOLOGIES,
            qr_models: &[1, 2],
            pdf417: Pdf417Support::Native,
            image_mode: ImageMode::Raster,
            image_compression: true,
            feed_before_cut: 4,
        },
    },
    PrinterModel {
        id: "epson-tm-p20ii",
        name: "Epson TM-P20II",
        capabilities: Capabilities {
            dialect: DialectKind::EscPos,
            codepages: "epson",
            newline: "\n\r",
            fonts: EPSON_58MM_FONTS,
            barcodes: ALL_SYMBOLOGIES,
            qr_models: &[1, 2],
            pdf417: Pdf417Support::Native,
            image_mode: ImageMode::Raster,
            image_compression: true,
            feed_before_cut: 3,
        },
    },
    PrinterModel {
        id: "bixolon-srp-350iii",
        name: "Bixolon SRP-350III",
        capabilities: Capabilities {
            dialect: DialectKind::EscPos,
            codepages: "bixolon",
            newline: "\n\r",
            fonts: EPSON_80MM_FONTS,
            barcodes: ALL_SYMBOLOGIES,
            qr_models: &[1, 2],
            pdf417: Pdf417Support::Native,
            image_mode: ImageMode::Raster,
            image_compression: false,
            feed_before_cut: 4,
        },
    },
    PrinterModel {
        id: "citizen-ct-s310ii",
        name: "Citizen CT-S310II",
        capabilities: Capabilities {
            dialect: DialectKind::EscPos,
            codepages: "citizen",
            newline: "\n\r",
            fonts: EPSON_T20_FONTS,
            barcodes: ALL_SYMBOLOGIES,
            qr_models: &[1, 2],
            pdf417: Pdf417Support::Native,
            image_mode: ImageMode::Raster,
            image_compression: false,
            feed_before_cut: 3,
        },
    },
    PrinterModel {
        id: "hp-a779",
        name: "HP A779",
        capabilities: Capabilities {
            dialect: DialectKind::EscPos,
            codepages: "epson",
            newline: "\n\r",
            fonts: &[FontSpec {
                font: Font::A,
                width: 12,
                height: 24,
                columns: 44,
            }],
            barcodes: BASIC_SYMBOLOGIES,
            qr_models: &[],
            pdf417: Pdf417Support::Unsupported,
            image_mode: ImageMode::Column,
            image_compression: false,
            feed_before_cut: 4,
        },
    },
    PrinterModel {
        id: "pos-5890",
        name: "POS-5890 (generic 58mm)",
        capabilities: Capabilities {
            dialect: DialectKind::EscPos,
            codepages: "epson",
            newline: "\n\r",
            fonts: EPSON_58MM_FONTS,
            barcodes: BASIC_SYMBOLOGIES,
            qr_models: &[2],
            pdf417: Pdf417Support::Fallback(Symbology::Code128),
            image_mode: ImageMode::Column,
            image_compression: false,
            feed_before_cut: 4,
        },
    },
    PrinterModel {
        id: "xprinter-xp-n160ii",
        name: "Xprinter XP-N160II",
        capabilities: Capabilities {
            dialect: DialectKind::EscPos,
            codepages: "epson",
            newline: "\n\r",
            fonts: EPSON_T20_FONTS,
            barcodes: ALL_SYMBOLOGIES,
            qr_models: &[2],
            pdf417: Pdf417Support::Fallback(Symbology::Code128),
            image_mode: ImageMode::Raster,
            image_compression: true,
            feed_before_cut: 4,
        },
    },
    PrinterModel {
        id: "star-tsp100iv",
        name: "Star TSP100IV",
        capabilities: Capabilities {
            dialect: DialectKind::StarPrnt,
            codepages: "star",
            newline: "\n\r",
            fonts: STAR_80MM_FONTS,
            barcodes: ALL_SYMBOLOGIES,
            qr_models: &[1, 2],
            pdf417: Pdf417Support::Native,
            image_mode: ImageMode::Column,
            image_compression: false,
            feed_before_cut: 3,
        },
    },
    PrinterModel {
        id: "star-tsp650ii",
        name: "Star TSP650II",
        capabilities: Capabilities {
            dialect: DialectKind::StarPrnt,
            codepages: "star",
            newline: "\n\r",
            fonts: STAR_80MM_FONTS,
            barcodes: ALL_SYMBOLOGIES,
            qr_models: &[1, 2],
            pdf417: Pdf417Support::Native,
            image_mode: ImageMode::Column,
            image_compression: false,
            feed_before_cut: 3,
        },
    },
    PrinterModel {
        id: "star-mc-print2",
        name: "Star mC-Print2",
        capabilities: Capabilities {
            dialect: DialectKind::StarPrnt,
            codepages: "star",
            newline: "\n\r",
            fonts: STAR_58MM_FONTS,
            barcodes: ALL_SYMBOLOGIES,
            qr_models: &[1, 2],
            pdf417: Pdf417Support::Native,
            image_mode: ImageMode::Column,
            image_compression: false,
            feed_before_cut: 3,
        },
    },
    PrinterModel {
        id: "star-tsp700ii",
        name: "Star TSP700II",
        capabilities: Capabilities {
            dialect: DialectKind::StarLine,
            codepages: "star",
            newline: "\n\r",
            fonts: STAR_80MM_FONTS,
            barcodes: ALL_SYMBOLOGIES,
            qr_models: &[],
            pdf417: Pdf417Support::Fallback(Symbology::Code128),
            image_mode: ImageMode::Column,
            image_compression: false,
            feed_before_cut: 3,
        },
    },
];

/// Capabilities assumed when an encoder is configured from raw options
/// instead of a model id: everything enabled, conservative wire features
/// (no compression, no pre-cut feed).
pub fn fallback(dialect: DialectKind) -> Capabilities {
    match dialect {
        DialectKind::EscPos => Capabilities {
            dialect,
            codepages: "epson",
            newline: "\n\r",
            fonts: EPSON_80MM_FONTS,
            barcodes: ALL_SYMBOLOGIES,
            qr_models: &[1, 2],
            pdf417: Pdf417Support::Native,
            image_mode: ImageMode::Raster,
            image_compression: false,
            feed_before_cut: 0,
        },
        DialectKind::StarPrnt | DialectKind::StarLine => Capabilities {
            dialect,
            codepages: "star",
            newline: "\n\r",
            fonts: STAR_80MM_FONTS,
            barcodes: ALL_SYMBOLOGIES,
            qr_models: &[1, 2],
            pdf417: Pdf417Support::Native,
            image_mode: ImageMode::Column,
            image_compression: false,
            feed_before_cut: 0,
        },
    }
}

/// Look up a model by id.
pub fn lookup(id: &str) -> Option<&'static PrinterModel> {
    MODELS.iter().find(|model| model.id == id)
}

/// Enumerate `(id, display name)` for every registered model.
pub fn models() -> impl Iterator<Item = (&'static str, &'static str)> {
    MODELS.iter().map(|model| (model.id, model.name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_model() {
        let model = lookup("epson-tm-t88v").unwrap();
        assert_eq!(model.name, "Epson TM-T88V");
        assert_eq!(model.capabilities.dialect, DialectKind::EscPos);
        assert_eq!(model.capabilities.columns(), 42);
    }

    #[test]
    fn test_lookup_unknown_model() {
        assert!(lookup("dot-matrix-3000").is_none());
    }

    #[test]
    fn test_enumeration_matches_table() {
        let listed: Vec<_> = models().collect();
        assert_eq!(listed.len(), MODELS.len());
        assert!(listed.contains(&("star-tsp650ii", "Star TSP650II")));
    }

    #[test]
    fn test_ids_are_unique() {
        let mut ids: Vec<_> = MODELS.iter().map(|m| m.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), MODELS.len());
    }

    #[test]
    fn test_every_model_has_font_a() {
        for model in MODELS {
            assert!(
                model.capabilities.font(Font::A).is_some(),
                "{} lacks font A",
                model.id
            );
        }
    }

    #[test]
    fn test_every_mapping_resolves() {
        for model in MODELS {
            assert!(
                crate::codepage::mapping(model.capabilities.codepages).is_some(),
                "{} references unknown mapping {}",
                model.id,
                model.capabilities.codepages
            );
        }
    }

    #[test]
    fn test_column_counts_are_valid() {
        for model in MODELS {
            let columns = model.capabilities.columns();
            assert!(
                [32, 35, 42, 44, 48].contains(&columns),
                "{} has invalid column count {}",
                model.id,
                columns
            );
        }
    }

    #[test]
    fn test_star_models_use_star_mapping() {
        for model in MODELS {
            if matches!(
                model.capabilities.dialect,
                DialectKind::StarPrnt | DialectKind::StarLine
            ) {
                assert_eq!(model.capabilities.codepages, "star");
            }
        }
    }

    #[test]
    fn test_capability_queries() {
        let caps = lookup("pos-5890").unwrap().capabilities;
        assert!(caps.supports_symbology(Symbology::Code128));
        assert!(!caps.supports_symbology(Symbology::Code93));
        assert!(caps.supports_qr_model(2));
        assert!(!caps.supports_qr_model(1));
        assert_eq!(caps.pdf417, Pdf417Support::Fallback(Symbology::Code128));
    }
}
