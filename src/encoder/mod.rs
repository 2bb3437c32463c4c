//! # Encoder Facade
//!
//! The fluent document API. An [`Encoder`] owns a line composer, a
//! dialect driver and the per-document state; calls accumulate command
//! items, and finalisation linearises them into printer bytes:
//!
//! ```text
//! ┌────────────┐    ┌──────────┐    ┌───────────┐    ┌───────────┐
//! │ fluent API │ ─► │ composer │ ─► │ Vec<Line> │ ─► │ Vec<u8>   │
//! │ (calls)    │    │ (items)  │    │ commands()│    │ encode()  │
//! └────────────┘    └──────────┘    └───────────┘    └───────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use recibo::{CutType, Encoder};
//!
//! let mut encoder = Encoder::for_model("epson-tm-t20iii")?;
//! encoder
//!     .initialize()?
//!     .bold(true)?
//!     .line("RECEIPT")?
//!     .bold(false)?
//!     .line("1x Espresso  4.50")?
//!     .cut(CutType::Partial)?;
//! let bytes = encoder.encode();
//! # Ok::<(), recibo::ReciboError>(())
//! ```
//!
//! ## Embedded encoders
//!
//! Tables and boxes render each cell through a fresh encoder in embedded
//! mode: line padding always fills the cell width, and top-level-only
//! operations (initialize, cut, pulse, images, codes, nested tables) are
//! rejected with a `Context` error.

pub mod chunk;

pub use chunk::{Chunk, ChunkStream, DEFAULT_CHUNK_SIZE};

use crate::codepage::{self, Mapping};
use crate::compose::{FlushOptions, Item, Line, LineComposer, StyleDelta, TextEncoding};
use crate::dialect::{
    Alignment, BarcodeOptions, CutType, Dialect, DialectKind, Font, ImageMode, Pdf417Options,
    QrOptions, Symbology,
};
use crate::error::{ReciboError, Result, Strictness};
use crate::image::Bitmap;
use crate::pool::BufferPool;
use crate::printer::{self, Capabilities, FontSpec, Pdf417Support};

/// Column counts accepted for top-level encoders.
const VALID_COLUMNS: &[usize] = &[32, 35, 42, 44, 48];

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Builder for [`Encoder`] construction.
///
/// Start from a printer model, raw options, or both — explicit options
/// override model defaults.
#[derive(Debug, Default)]
pub struct EncoderBuilder {
    model: Option<String>,
    dialect: Option<DialectKind>,
    columns: Option<usize>,
    codepage_mapping: Option<String>,
    newline: Option<String>,
    feed_before_cut: Option<u8>,
    image_mode: Option<ImageMode>,
    image_compression: Option<bool>,
    auto_flush: Option<bool>,
    strictness: Strictness,
}

impl EncoderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take defaults from a registered printer model.
    pub fn model(mut self, id: impl Into<String>) -> Self {
        self.model = Some(id.into());
        self
    }

    pub fn dialect(mut self, dialect: DialectKind) -> Self {
        self.dialect = Some(dialect);
        self
    }

    /// Column budget; must be one of 32, 35, 42, 44 or 48.
    pub fn columns(mut self, columns: usize) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Codepage mapping family (`"epson"`, `"star"`, ...).
    pub fn codepage_mapping(mut self, name: impl Into<String>) -> Self {
        self.codepage_mapping = Some(name.into());
        self
    }

    /// Line terminator: `"\n"`, `"\n\r"` or `""`.
    pub fn newline(mut self, newline: impl Into<String>) -> Self {
        self.newline = Some(newline.into());
        self
    }

    /// Blank lines fed ahead of every cut.
    pub fn feed_before_cut(mut self, lines: u8) -> Self {
        self.feed_before_cut = Some(lines);
        self
    }

    pub fn image_mode(mut self, mode: ImageMode) -> Self {
        self.image_mode = Some(mode);
        self
    }

    pub fn image_compression(mut self, enabled: bool) -> Self {
        self.image_compression = Some(enabled);
        self
    }

    /// Override the auto-flush policy (defaults to on for StarPRNT).
    pub fn auto_flush(mut self, enabled: bool) -> Self {
        self.auto_flush = Some(enabled);
        self
    }

    /// Raise capability errors instead of logging and skipping.
    pub fn strict(mut self) -> Self {
        self.strictness = Strictness::Strict;
        self
    }

    pub fn build(self) -> Result<Encoder> {
        let capabilities = match &self.model {
            Some(id) => {
                printer::lookup(id)
                    .ok_or_else(|| {
                        ReciboError::configuration(format!("unknown printer model '{id}'"))
                    })?
                    .capabilities
            }
            None => printer::fallback(self.dialect.unwrap_or(DialectKind::EscPos)),
        };

        let kind = self.dialect.unwrap_or(capabilities.dialect);
        let columns = self.columns.unwrap_or(capabilities.columns() as usize);
        if !VALID_COLUMNS.contains(&columns) {
            return Err(ReciboError::configuration(format!(
                "column count must be one of {VALID_COLUMNS:?}, got {columns}"
            )));
        }

        let mapping_name = self
            .codepage_mapping
            .as_deref()
            .unwrap_or(capabilities.codepages);
        let mapping = codepage::mapping(mapping_name).ok_or_else(|| {
            ReciboError::configuration(format!("unknown codepage mapping '{mapping_name}'"))
        })?;

        let newline = self.newline.as_deref().unwrap_or(capabilities.newline);
        let newline = match newline {
            "\n" => vec![0x0A],
            "\n\r" => vec![0x0A, 0x0D],
            "" => Vec::new(),
            other => {
                return Err(ReciboError::configuration(format!(
                    "newline must be \"\\n\", \"\\n\\r\" or \"\", got {other:?}"
                )))
            }
        };

        Ok(Encoder {
            dialect: kind.driver(),
            kind,
            mapping,
            capabilities,
            columns,
            newline,
            feed_before_cut: self
                .feed_before_cut
                .unwrap_or(capabilities.feed_before_cut),
            image_mode: self.image_mode.unwrap_or(capabilities.image_mode),
            image_compression: self
                .image_compression
                .unwrap_or(capabilities.image_compression),
            auto_flush: self
                .auto_flush
                .unwrap_or(kind == DialectKind::StarPrnt),
            strictness: self.strictness,
            embedded: false,
            composer: LineComposer::new(columns, false),
            codepage: None,
            font: Font::A,
            pool: BufferPool::new(),
        })
    }
}

// ============================================================================
// TABLE / RULE / BOX OPTIONS
// ============================================================================

/// Vertical placement of a short cell within its row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerticalAlign {
    #[default]
    Top,
    Bottom,
}

/// One table column definition.
#[derive(Debug, Clone, Copy)]
pub struct TableColumn {
    /// Cell content width in characters.
    pub width: usize,
    pub margin_left: usize,
    pub margin_right: usize,
    pub align: Alignment,
    pub vertical_align: VerticalAlign,
}

impl TableColumn {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            margin_left: 0,
            margin_right: 0,
            align: Alignment::Left,
            vertical_align: VerticalAlign::Top,
        }
    }

    pub fn align(mut self, align: Alignment) -> Self {
        self.align = align;
        self
    }

    pub fn margins(mut self, left: usize, right: usize) -> Self {
        self.margin_left = left;
        self.margin_right = right;
        self
    }

    pub fn vertical_align(mut self, vertical_align: VerticalAlign) -> Self {
        self.vertical_align = vertical_align;
        self
    }
}

/// A table cell: plain text, or a draw callback running a nested encoder.
pub enum TableCell<'a> {
    Text(String),
    Draw(Box<dyn FnOnce(&mut Encoder) -> Result<()> + 'a>),
}

impl TableCell<'_> {
    pub fn draw<'a, F>(draw: F) -> TableCell<'a>
    where
        F: FnOnce(&mut Encoder) -> Result<()> + 'a,
    {
        TableCell::Draw(Box::new(draw))
    }
}

impl From<&str> for TableCell<'static> {
    fn from(value: &str) -> Self {
        TableCell::Text(value.to_string())
    }
}

impl From<String> for TableCell<'static> {
    fn from(value: String) -> Self {
        TableCell::Text(value)
    }
}

/// Border drawing styles for rules and boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderStyle {
    #[default]
    Single,
    Double,
    /// No border glyphs at all (boxes become plain padding).
    None,
}

/// Options for [`Encoder::rule`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleOptions {
    pub style: BorderStyle,
    /// Rule width; defaults to the full column budget.
    pub width: Option<usize>,
}

/// Options for [`Encoder::box_`].
#[derive(Debug, Clone, Copy)]
pub struct BoxOptions {
    pub style: BorderStyle,
    /// Outer box width; defaults to the full column budget.
    pub width: Option<usize>,
    pub margin_left: usize,
    pub margin_right: usize,
    pub padding_left: usize,
    pub padding_right: usize,
    /// Alignment of the box contents.
    pub align: Alignment,
}

impl Default for BoxOptions {
    fn default() -> Self {
        Self {
            style: BorderStyle::Single,
            width: None,
            margin_left: 0,
            margin_right: 0,
            padding_left: 1,
            padding_right: 1,
            align: Alignment::Left,
        }
    }
}

// ============================================================================
// THE ENCODER
// ============================================================================

/// Fluent command-stream encoder for thermal receipt printers.
pub struct Encoder {
    dialect: Box<dyn Dialect>,
    kind: DialectKind,
    mapping: &'static Mapping,
    capabilities: Capabilities,
    /// Configured column budget at font A.
    columns: usize,
    newline: Vec<u8>,
    feed_before_cut: u8,
    image_mode: ImageMode,
    image_compression: bool,
    auto_flush: bool,
    strictness: Strictness,
    embedded: bool,
    composer: LineComposer,
    /// Active codepage selection; `None` means automatic per-run.
    codepage: TextEncoding,
    font: Font,
    pool: BufferPool,
}

impl std::fmt::Debug for Encoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Encoder")
            .field("kind", &self.kind)
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}

impl Encoder {
    /// Build an encoder from a registered printer model.
    pub fn for_model(id: &str) -> Result<Self> {
        EncoderBuilder::new().model(id).build()
    }

    /// Start a configuration builder.
    pub fn builder() -> EncoderBuilder {
        EncoderBuilder::new()
    }

    /// A fresh embedded encoder sharing this encoder's configuration.
    fn nested(&self, columns: usize) -> Encoder {
        Encoder {
            dialect: self.kind.driver(),
            kind: self.kind,
            mapping: self.mapping,
            capabilities: self.capabilities,
            columns,
            newline: self.newline.clone(),
            feed_before_cut: 0,
            image_mode: self.image_mode,
            image_compression: self.image_compression,
            auto_flush: false,
            strictness: self.strictness,
            embedded: true,
            composer: LineComposer::new(columns, true),
            codepage: self.codepage,
            font: Font::A,
            pool: BufferPool::new(),
        }
    }

    /// Active column budget (scaled by the current font).
    pub fn columns(&self) -> usize {
        self.composer.columns()
    }

    pub fn dialect(&self) -> DialectKind {
        self.kind
    }

    /// The active font.
    pub fn current_font(&self) -> Font {
        self.font
    }

    // ========== Guards ==========

    fn ensure_top_level(&self, operation: &str) -> Result<()> {
        if self.embedded {
            return Err(ReciboError::context(format!(
                "{operation} is not available inside tables or boxes"
            )));
        }
        Ok(())
    }

    /// Relaxed mode logs and skips; strict mode raises.
    fn capability_failure(&self, message: String) -> Result<()> {
        match self.strictness {
            Strictness::Strict => Err(ReciboError::capability(message)),
            Strictness::Relaxed => {
                log::warn!("{message}; skipping");
                Ok(())
            }
        }
    }

    fn font_spec(&self, font: Font) -> Option<&'static FontSpec> {
        self.capabilities.font(font)
    }

    // ========== Document control ==========

    /// Reset the printer to power-on defaults.
    pub fn initialize(&mut self) -> Result<&mut Self> {
        self.ensure_top_level("initialize")?;
        self.composer
            .add(Item::Initialize(self.dialect.initialize()), 0);
        Ok(self)
    }

    /// Select a codepage by name, or `"auto"` for per-run detection.
    pub fn codepage(&mut self, name: &str) -> Result<&mut Self> {
        if name == "auto" {
            self.codepage = None;
            return Ok(self);
        }
        let entry = self
            .mapping
            .entries
            .iter()
            .find(|(_, candidate)| *candidate == name)
            .ok_or_else(|| {
                ReciboError::configuration(format!(
                    "codepage '{name}' is not in the '{}' mapping",
                    self.mapping.name
                ))
            })?;
        self.codepage = Some(entry.1);
        Ok(self)
    }

    // ========== Text ==========

    pub fn text(&mut self, value: &str) -> Result<&mut Self> {
        self.composer.text(value, self.codepage);
        Ok(self)
    }

    pub fn newline(&mut self) -> Result<&mut Self> {
        self.composer.flush(FlushOptions::newline());
        Ok(self)
    }

    pub fn newlines(&mut self, count: usize) -> Result<&mut Self> {
        for _ in 0..count {
            self.composer.flush(FlushOptions::newline());
        }
        Ok(self)
    }

    /// Text followed by a newline.
    pub fn line(&mut self, value: &str) -> Result<&mut Self> {
        self.text(value)?.newline()
    }

    // ========== Styling ==========

    pub fn bold(&mut self, enabled: bool) -> Result<&mut Self> {
        self.composer.bold(enabled);
        Ok(self)
    }

    pub fn italic(&mut self, enabled: bool) -> Result<&mut Self> {
        self.composer.italic(enabled);
        Ok(self)
    }

    pub fn underline(&mut self, enabled: bool) -> Result<&mut Self> {
        self.composer.underline(enabled);
        Ok(self)
    }

    pub fn invert(&mut self, enabled: bool) -> Result<&mut Self> {
        self.composer.invert(enabled);
        Ok(self)
    }

    /// Character width multiplier, 1..=8.
    pub fn width(&mut self, width: u8) -> Result<&mut Self> {
        validate_multiplier("width", width)?;
        self.composer.width(width);
        Ok(self)
    }

    /// Character height multiplier, 1..=8.
    pub fn height(&mut self, height: u8) -> Result<&mut Self> {
        validate_multiplier("height", height)?;
        self.composer.height(height);
        Ok(self)
    }

    pub fn size(&mut self, width: u8, height: u8) -> Result<&mut Self> {
        validate_multiplier("width", width)?;
        validate_multiplier("height", height)?;
        self.composer.size(width, height);
        Ok(self)
    }

    /// Switch fonts. Rejected mid-line; rescales the column budget by
    /// the font's column ratio.
    pub fn font(&mut self, font: Font) -> Result<&mut Self> {
        self.ensure_top_level("font change")?;
        if self.composer.cursor() > 0 {
            return Err(ReciboError::context(
                "font can only change at the start of a line",
            ));
        }
        let Some(spec) = self.font_spec(font) else {
            self.capability_failure(format!(
                "font {font:?} is not available on this printer"
            ))?;
            return Ok(self);
        };
        let base = self.font_spec(Font::A).map(|s| s.columns).unwrap_or(48) as usize;
        let scaled = self.columns * spec.columns as usize / base;

        self.font = font;
        self.composer.set_columns(scaled);
        self.composer
            .add(Item::Font {
                font,
                payload: self.dialect.font(font),
            }, 0);
        Ok(self)
    }

    pub fn align(&mut self, alignment: Alignment) -> Result<&mut Self> {
        self.composer.add(
            Item::Align {
                value: alignment,
                payload: None,
            },
            0,
        );
        Ok(self)
    }

    // ========== Structured content ==========

    /// Render a table. Each cell runs through a nested embedded encoder
    /// sized to its column; short cells pad to the row's tallest cell.
    pub fn table(
        &mut self,
        columns: &[TableColumn],
        rows: Vec<Vec<TableCell<'_>>>,
    ) -> Result<&mut Self> {
        self.ensure_top_level("table")?;
        self.composer.flush(FlushOptions::default());

        for row in rows {
            if row.len() != columns.len() {
                return Err(ReciboError::validation(format!(
                    "table row has {} cells, expected {}",
                    row.len(),
                    columns.len()
                )));
            }

            let mut rendered: Vec<Vec<Line>> = Vec::with_capacity(columns.len());
            for (spec, cell) in columns.iter().zip(row) {
                let mut nested = self.nested(spec.width);
                nested.align(spec.align)?;
                match cell {
                    TableCell::Text(text) => {
                        nested.text(&text)?;
                    }
                    TableCell::Draw(draw) => draw(&mut nested)?,
                }
                rendered.push(nested.commands());
            }

            let height = rendered.iter().map(Vec::len).max().unwrap_or(0);
            for (spec, lines) in columns.iter().zip(rendered.iter_mut()) {
                while lines.len() < height {
                    let blank = Line::from_items(vec![Item::Space(spec.width)]);
                    match spec.vertical_align {
                        VerticalAlign::Top => lines.push(blank),
                        VerticalAlign::Bottom => lines.insert(0, blank),
                    }
                }
            }

            for index in 0..height {
                for (spec, lines) in columns.iter().zip(rendered.iter_mut()) {
                    if spec.margin_left > 0 {
                        self.composer.space(spec.margin_left);
                    }
                    let line = std::mem::replace(&mut lines[index], Line::from_items(Vec::new()));
                    self.composer.append(line.items, spec.width);
                    if spec.margin_right > 0 {
                        self.composer.space(spec.margin_right);
                    }
                }
                self.composer.flush(FlushOptions::newline());
            }
        }
        Ok(self)
    }

    /// Draw a horizontal rule.
    pub fn rule(&mut self, options: RuleOptions) -> Result<&mut Self> {
        self.composer.flush(FlushOptions::default());
        let width = options
            .width
            .unwrap_or(self.composer.columns())
            .min(self.composer.columns());
        let glyph = match options.style {
            BorderStyle::Double => '═',
            _ => '─',
        };
        let value: String = std::iter::repeat(glyph).take(width).collect();
        self.composer.text(&value, self.codepage);
        self.composer.flush(FlushOptions::newline());
        Ok(self)
    }

    /// Draw a bordered box around nested content.
    pub fn box_<F>(&mut self, options: BoxOptions, contents: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Encoder) -> Result<()>,
    {
        self.ensure_top_level("box")?;
        self.composer.flush(FlushOptions::default());

        let outer = options
            .width
            .unwrap_or_else(|| {
                self.composer
                    .columns()
                    .saturating_sub(options.margin_left + options.margin_right)
            });
        let border = usize::from(options.style != BorderStyle::None);
        let inner = outer
            .checked_sub(2 * border + options.padding_left + options.padding_right)
            .filter(|inner| *inner > 0)
            .ok_or_else(|| {
                ReciboError::validation(format!(
                    "box width {outer} leaves no room for contents"
                ))
            })?;

        let mut nested = self.nested(inner);
        nested.align(options.align)?;
        contents(&mut nested)?;
        let lines = nested.commands();

        let (top_left, horizontal, top_right, vertical, bottom_left, bottom_right) =
            match options.style {
                BorderStyle::Single => ('┌', '─', '┐', '│', '└', '┘'),
                BorderStyle::Double => ('╔', '═', '╗', '║', '╚', '╝'),
                BorderStyle::None => (' ', ' ', ' ', ' ', ' ', ' '),
            };

        if border == 1 {
            if options.margin_left > 0 {
                self.composer.space(options.margin_left);
            }
            let mut top = String::with_capacity(outer);
            top.push(top_left);
            top.extend(std::iter::repeat(horizontal).take(outer - 2));
            top.push(top_right);
            self.composer.text(&top, self.codepage);
            self.composer.flush(FlushOptions::newline());
        }

        for line in lines {
            if options.margin_left > 0 {
                self.composer.space(options.margin_left);
            }
            if border == 1 {
                self.composer
                    .text(&vertical.to_string(), self.codepage);
            }
            if options.padding_left > 0 {
                self.composer.space(options.padding_left);
            }
            self.composer.append(line.items, inner);
            if options.padding_right > 0 {
                self.composer.space(options.padding_right);
            }
            if border == 1 {
                self.composer
                    .text(&vertical.to_string(), self.codepage);
            }
            self.composer.flush(FlushOptions::newline());
        }

        if border == 1 {
            if options.margin_left > 0 {
                self.composer.space(options.margin_left);
            }
            let mut bottom = String::with_capacity(outer);
            bottom.push(bottom_left);
            bottom.extend(std::iter::repeat(horizontal).take(outer - 2));
            bottom.push(bottom_right);
            self.composer.text(&bottom, self.codepage);
            self.composer.flush(FlushOptions::newline());
        }
        Ok(self)
    }

    // ========== Codes ==========

    /// Print a 1D barcode.
    pub fn barcode(
        &mut self,
        value: &str,
        symbology: Symbology,
        options: BarcodeOptions,
    ) -> Result<&mut Self> {
        self.ensure_top_level("barcode")?;
        if !self.capabilities.supports_symbology(symbology) {
            self.capability_failure(format!(
                "barcode symbology {symbology:?} is not supported by this printer"
            ))?;
            return Ok(self);
        }

        let payload = self.dialect.barcode(value, symbology, &options)?;
        self.out_of_band(Item::Barcode(payload));
        Ok(self)
    }

    /// Print a QR code.
    pub fn qrcode(&mut self, value: &str, options: QrOptions) -> Result<&mut Self> {
        self.ensure_top_level("qrcode")?;
        if self.capabilities.qr_models.is_empty() {
            self.capability_failure("QR codes are not supported by this printer".into())?;
            return Ok(self);
        }
        if !self.capabilities.supports_qr_model(options.model) {
            self.capability_failure(format!(
                "QR model {} is not supported by this printer",
                options.model
            ))?;
            return Ok(self);
        }

        let payload = self.dialect.qrcode(value, &options)?;
        self.out_of_band(Item::QrCode(payload));
        Ok(self)
    }

    /// Print a PDF417 symbol, falling back to a 1D symbology when the
    /// printer declares one instead of native support.
    pub fn pdf417(&mut self, value: &str, options: Pdf417Options) -> Result<&mut Self> {
        self.ensure_top_level("pdf417")?;
        match self.capabilities.pdf417 {
            Pdf417Support::Native => {
                let payload = self.dialect.pdf417(value, &options)?;
                self.out_of_band(Item::Pdf417(payload));
                Ok(self)
            }
            Pdf417Support::Fallback(symbology) => {
                self.barcode(value, symbology, BarcodeOptions::default())
            }
            Pdf417Support::Unsupported => {
                self.capability_failure("PDF417 is not supported by this printer".into())?;
                Ok(self)
            }
        }
    }

    /// Print an image in the active image mode.
    pub async fn image(&mut self, bitmap: &Bitmap) -> Result<&mut Self> {
        self.ensure_top_level("image")?;
        let payload = self
            .dialect
            .image(bitmap, self.image_mode, self.image_compression, &mut self.pool)
            .await?;
        self.out_of_band(Item::Image(payload));
        Ok(self)
    }

    /// Flush the pending line, then emit `item` on its own line wrapped
    /// in dialect alignment commands when the layout is not left-aligned.
    fn out_of_band(&mut self, item: Item) {
        self.composer.flush(FlushOptions::default());

        let alignment = self.composer.pending_alignment();
        if alignment != Alignment::Left {
            self.composer.add(
                Item::Align {
                    value: alignment,
                    payload: Some(self.dialect.align(alignment)),
                },
                0,
            );
        }
        self.composer.add(item, 0);
        if alignment != Alignment::Left {
            self.composer.add(
                Item::Align {
                    value: Alignment::Left,
                    payload: Some(self.dialect.align(Alignment::Left)),
                },
                0,
            );
        }
        self.composer.flush(FlushOptions::raw());
    }

    // ========== Hardware ==========

    /// Feed and cut the paper.
    pub fn cut(&mut self, variant: CutType) -> Result<&mut Self> {
        self.ensure_top_level("cut")?;
        for _ in 0..self.feed_before_cut {
            self.composer.flush(FlushOptions::newline());
        }
        self.composer.flush(FlushOptions::default());
        self.composer.add(Item::Cut(self.dialect.cut(variant)), 0);
        self.composer.flush(FlushOptions::raw());
        Ok(self)
    }

    /// Fire the cash-drawer pulse.
    pub fn pulse(&mut self, device: u8, on_ms: u16, off_ms: u16) -> Result<&mut Self> {
        self.ensure_top_level("pulse")?;
        self.composer.flush(FlushOptions::default());
        self.composer
            .add(Item::Pulse(self.dialect.pulse(device, on_ms, off_ms)), 0);
        self.composer.flush(FlushOptions::raw());
        Ok(self)
    }

    /// Append raw dialect bytes in place.
    pub fn raw(&mut self, bytes: Vec<u8>) -> Result<&mut Self> {
        self.composer.raw(bytes, 0);
        Ok(self)
    }

    // ========== Finalisation ==========

    /// Finalize the composer and return the queued lines, resetting the
    /// encoder for the next document.
    pub fn commands(&mut self) -> Vec<Line> {
        if self.composer.has_pending() {
            self.composer.flush(FlushOptions {
                force_flush: true,
                ..FlushOptions::default()
            });
        }

        let mut lines = self.composer.take_lines();

        if self.auto_flush && !self.embedded {
            let needs_flush = !matches!(
                lines.last().and_then(|line| line.items.last()),
                Some(Item::Cut(_)) | Some(Item::Pulse(_))
            );
            let flush = self.dialect.flush();
            if needs_flush && !flush.is_empty() {
                match lines.last_mut() {
                    Some(last) => last.items.push(Item::Raw(flush)),
                    None => lines.push(Line::from_items(vec![Item::Raw(flush)])),
                }
            }
        }

        self.reset();
        lines
    }

    /// Linearize the document into one contiguous byte buffer.
    pub fn encode(&mut self) -> Vec<u8> {
        let lines = self.commands();
        let candidates = self.mapping.candidates();

        let mut out = Vec::new();
        // Last codepage byte written to the wire; starts at a sentinel so
        // the first text run always selects one explicitly.
        let mut wire_codepage: Option<u8> = None;

        let total = lines.len();
        for (index, line) in lines.iter().enumerate() {
            for item in &line.items {
                self.encode_item(item, &candidates, &mut out, &mut wire_codepage);
            }

            let ends_with_pulse =
                index + 1 == total && matches!(line.items.last(), Some(Item::Pulse(_)));
            if !ends_with_pulse {
                out.extend_from_slice(&self.newline);
            }
        }

        out
    }

    /// Stream the encoded document in bounded chunks.
    pub fn chunks(&mut self, chunk_size: usize) -> Result<ChunkStream> {
        ChunkStream::new(self.encode(), chunk_size)
    }

    fn encode_item(
        &self,
        item: &Item,
        candidates: &[&'static str],
        out: &mut Vec<u8>,
        wire_codepage: &mut Option<u8>,
    ) {
        match item {
            Item::Text { value, codepage } => match codepage {
                Some(name) => {
                    let id = self.mapping.wire_id(name).unwrap_or(0);
                    self.switch_codepage(id, out, wire_codepage);
                    out.extend(codepage::encode(value, name));
                }
                None => {
                    for run in codepage::auto_encode(value, candidates) {
                        let id = self.mapping.wire_id(run.codepage).unwrap_or(0);
                        self.switch_codepage(id, out, wire_codepage);
                        out.extend(run.bytes);
                    }
                }
            },
            Item::Style(delta) => match *delta {
                StyleDelta::Bold(enabled) => out.extend(self.dialect.bold(enabled)),
                StyleDelta::Italic(enabled) => out.extend(self.dialect.italic(enabled)),
                StyleDelta::Underline(enabled) => out.extend(self.dialect.underline(enabled)),
                StyleDelta::Invert(enabled) => out.extend(self.dialect.invert(enabled)),
                StyleDelta::Size { width, height } => out.extend(self.dialect.size(width, height)),
            },
            Item::Space(size) => out.extend(std::iter::repeat(b' ').take(*size)),
            Item::Align { payload, .. } => {
                if let Some(bytes) = payload {
                    out.extend_from_slice(bytes);
                }
            }
            Item::Codepage(id) => self.switch_codepage(*id, out, wire_codepage),
            Item::Font { payload, .. } => out.extend_from_slice(payload),
            Item::Raw(bytes)
            | Item::Image(bytes)
            | Item::Barcode(bytes)
            | Item::QrCode(bytes)
            | Item::Pdf417(bytes)
            | Item::Cut(bytes)
            | Item::Pulse(bytes)
            | Item::Initialize(bytes)
            | Item::LineSpacing(bytes) => out.extend_from_slice(bytes),
            Item::Empty => {}
        }
    }

    fn switch_codepage(&self, id: u8, out: &mut Vec<u8>, wire_codepage: &mut Option<u8>) {
        if *wire_codepage != Some(id) {
            out.extend(self.dialect.codepage(id));
            *wire_codepage = Some(id);
        }
    }

    fn reset(&mut self) {
        self.composer = LineComposer::new(self.columns, self.embedded);
        self.codepage = None;
        self.font = Font::A;
        self.pool.clear();
    }
}

fn validate_multiplier(name: &str, value: u8) -> Result<()> {
    if !(1..=8).contains(&value) {
        return Err(ReciboError::validation(format!(
            "{name} multiplier must be 1-8, got {value}"
        )));
    }
    Ok(())
}
