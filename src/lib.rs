//! # Recibo - Receipt Printer Command Encoder
//!
//! Recibo turns high-level document operations (text, styling, tables,
//! barcodes, images, cuts) into the raw command bytes thermal receipt
//! printers understand, in any of three wire dialects:
//!
//! - **ESC/POS** — Epson and the wide compatible ecosystem
//! - **StarPRNT** — current Star Micronics printers
//! - **Star Line** — legacy Star line-mode firmware
//!
//! The output is a plain byte buffer, ready for whatever link reaches the
//! printer (TCP, USB, serial, Bluetooth); transports are out of scope.
//!
//! ## Quick Start
//!
//! ```
//! use recibo::{CutType, Encoder};
//!
//! let mut encoder = Encoder::for_model("epson-tm-t88v")?;
//! encoder
//!     .initialize()?
//!     .align(recibo::Alignment::Center)?
//!     .bold(true)?
//!     .line("CHURRA MART")?
//!     .bold(false)?
//!     .align(recibo::Alignment::Left)?
//!     .line("1x Espresso          4.50")?
//!     .cut(CutType::Partial)?;
//!
//! let bytes = encoder.encode();
//! // Send `bytes` to the printer...
//! # Ok::<(), recibo::ReciboError>(())
//! ```
//!
//! ## Streaming
//!
//! Large documents (images especially) can overrun printer input
//! buffers. [`Encoder::chunks`] yields the document in bounded slices
//! with progress metadata; awaiting between pulls is the backpressure
//! point.
//!
//! ```
//! # async fn send(mut encoder: recibo::Encoder) -> Result<(), recibo::ReciboError> {
//! let mut stream = encoder.chunks(512)?;
//! while let Some(chunk) = stream.next().await {
//!     // transport.write_all(&chunk.bytes)...
//!     println!("sent {}/{} bytes", chunk.bytes_sent, chunk.total_bytes);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`encoder`] | Fluent document API and byte linearisation |
//! | [`dialect`] | ESC/POS, StarPRNT and Star Line command builders |
//! | [`compose`] | Word wrap, style tracking, line composition |
//! | [`image`] | Raster/column bit packing and RLE compression |
//! | [`codepage`] | Single-byte text encoding and wire mappings |
//! | [`printer`] | Printer model registry |
//! | [`pool`] | Byte buffer recycling |
//! | [`error`] | Error types |

pub mod codepage;
pub mod compose;
pub mod dialect;
pub mod encoder;
pub mod error;
pub mod image;
pub mod pool;
pub mod printer;

// Re-exports for convenience
pub use dialect::{
    Alignment, BarcodeOptions, CutType, DialectKind, Font, ImageMode, Pdf417Options, QrErrorLevel,
    QrOptions, Symbology,
};
pub use encoder::{
    BorderStyle, BoxOptions, Chunk, ChunkStream, Encoder, EncoderBuilder, RuleOptions, TableCell,
    TableColumn, VerticalAlign, DEFAULT_CHUNK_SIZE,
};
pub use error::{ReciboError, Result, Strictness};
pub use image::Bitmap;
