//! # Line Composition
//!
//! The stateful layout pipeline between the fluent API and the wire:
//!
//! ```text
//! ┌─────────┐     ┌──────────────┐     ┌───────────────┐     ┌─────────┐
//! │ Encoder │ ──► │ LineComposer │ ──► │  Line queue   │ ──► │ encode  │
//! │ (calls) │     │ (items)      │     │ (Vec<Line>)   │     │ (bytes) │
//! └─────────┘     └──────────────┘     └───────────────┘     └─────────┘
//! ```
//!
//! - [`wrap`] breaks text against a cell budget
//! - [`style`] tracks the live style and produces save/restore brackets
//! - [`line`] accumulates items, applies alignment padding and flushes
//!   finished lines
//!
//! Items are either deferred (text awaiting codepage encoding, style
//! deltas awaiting dialect translation) or finalized payload bytes
//! (images, barcodes, cuts). The encoder linearizes the queue at the end
//! of the document.

pub mod line;
pub mod style;
pub mod wrap;

pub use line::{FlushOptions, LineComposer};
pub use style::{Style, StyleDelta, StyleTracker};

use crate::dialect::{Alignment, Font};

/// The codepage a text item should be encoded with: a specific name, or
/// `None` for automatic per-run detection against the printer's mapping.
pub type TextEncoding = Option<&'static str>;

/// One queued command item.
///
/// `Text`, `Style`, `Codepage` and `Font` are translated at encode time;
/// the byte-carrying variants are already framed by a dialect driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// Text awaiting codepage encoding.
    Text {
        value: String,
        codepage: TextEncoding,
    },
    /// A style change awaiting dialect translation.
    Style(StyleDelta),
    /// Opaque dialect bytes.
    Raw(Vec<u8>),
    /// Horizontal whitespace measured in character cells.
    Space(usize),
    /// Alignment: layout marker when `payload` is `None`, an embedded
    /// dialect emission otherwise.
    Align {
        value: Alignment,
        payload: Option<Vec<u8>>,
    },
    Image(Vec<u8>),
    Barcode(Vec<u8>),
    QrCode(Vec<u8>),
    Pdf417(Vec<u8>),
    Cut(Vec<u8>),
    Pulse(Vec<u8>),
    Initialize(Vec<u8>),
    Font {
        font: Font,
        payload: Vec<u8>,
    },
    /// Deferred codepage switch; deduplicated on the wire.
    Codepage(u8),
    LineSpacing(Vec<u8>),
    /// Placeholder so a forced blank line still advances the paper.
    Empty,
}

impl Item {
    /// Whether this item occupies horizontal space on the line.
    pub(crate) fn is_content(&self) -> bool {
        matches!(
            self,
            Item::Text { .. }
                | Item::Space(_)
                | Item::Raw(_)
                | Item::Image(_)
                | Item::Barcode(_)
                | Item::QrCode(_)
                | Item::Pdf417(_)
                | Item::Align {
                    payload: Some(_),
                    ..
                }
        )
    }
}

/// A finished line: ordered items plus the derived character height.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub items: Vec<Item>,
    /// Max height multiplier seen on the line; scales paper feed.
    pub height: u8,
}

impl Line {
    pub(crate) fn from_items(items: Vec<Item>) -> Self {
        let height = items
            .iter()
            .filter_map(|item| match item {
                Item::Style(StyleDelta::Size { height, .. }) => Some(*height),
                _ => None,
            })
            .max()
            .unwrap_or(1)
            .max(1);
        Self { items, height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_height_defaults_to_one() {
        let line = Line::from_items(vec![Item::Text {
            value: "x".into(),
            codepage: None,
        }]);
        assert_eq!(line.height, 1);
    }

    #[test]
    fn test_line_height_takes_max_size_delta() {
        let line = Line::from_items(vec![
            Item::Style(StyleDelta::Size {
                width: 1,
                height: 3,
            }),
            Item::Text {
                value: "x".into(),
                codepage: None,
            },
            Item::Style(StyleDelta::Size {
                width: 1,
                height: 1,
            }),
        ]);
        assert_eq!(line.height, 3);
    }

    #[test]
    fn test_content_classification() {
        assert!(Item::Space(1).is_content());
        assert!(Item::Raw(vec![0x00]).is_content());
        assert!(!Item::Style(StyleDelta::Bold(true)).is_content());
        assert!(!Item::Align {
            value: Alignment::Left,
            payload: None
        }
        .is_content());
        assert!(Item::Align {
            value: Alignment::Left,
            payload: Some(vec![0x1B])
        }
        .is_content());
    }
}
