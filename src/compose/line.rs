//! # Line Composer
//!
//! Accumulates mixed text/style/raw/space/align items into lines,
//! applies alignment padding, and flushes finished lines to a queue.
//!
//! ## Cursor model
//!
//! The cursor counts occupied character cells (0..=columns). Deferred
//! items advance it by their logical width; style deltas and layout
//! markers are zero-width. When an item would overflow the budget the
//! composer flushes first, so content never crosses a line boundary.
//!
//! ## Style brackets
//!
//! Each fetched line is wrapped as `[restore-of-previous] items [store]`,
//! with the next line's restore bracket rotated in at flush time. A line
//! therefore re-establishes its own style and cleans up after itself,
//! which keeps alignment padding and embedded sub-documents honest.

use super::style::StyleTracker;
use super::{wrap, Item, Line, StyleDelta, TextEncoding};
use crate::dialect::Alignment;

/// Flags controlling [`LineComposer::flush`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FlushOptions {
    /// Emit a line even when empty (a paper advance).
    pub force_newline: bool,
    /// Emit whatever is buffered even at cursor zero.
    pub force_flush: bool,
    /// Lay the line out left-aligned regardless of the active alignment.
    pub ignore_alignment: bool,
}

impl FlushOptions {
    /// An explicit newline.
    pub fn newline() -> Self {
        Self {
            force_newline: true,
            ..Self::default()
        }
    }

    /// Flush out-of-band content (cuts, barcodes) without layout.
    pub fn raw() -> Self {
        Self {
            force_flush: true,
            ignore_alignment: true,
            ..Self::default()
        }
    }
}

/// The stateful line composition engine.
#[derive(Debug)]
pub struct LineComposer {
    columns: usize,
    embedded: bool,
    cursor: usize,
    buffer: Vec<Item>,
    /// Restore bracket carried over from the previous line.
    stored: Vec<Item>,
    align: Alignment,
    style: StyleTracker,
    lines: Vec<Line>,
}

impl LineComposer {
    pub fn new(columns: usize, embedded: bool) -> Self {
        Self {
            columns,
            embedded,
            cursor: 0,
            buffer: Vec::new(),
            stored: Vec::new(),
            align: Alignment::Left,
            style: StyleTracker::new(),
            lines: Vec::new(),
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Rescale the column budget (font change).
    pub fn set_columns(&mut self, columns: usize) {
        self.columns = columns;
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The alignment lines are currently laid out with.
    pub fn alignment(&self) -> Alignment {
        self.align
    }

    /// The alignment in effect once buffered layout markers resolve.
    pub fn pending_alignment(&self) -> Alignment {
        self.buffer
            .iter()
            .rev()
            .find_map(|item| match item {
                Item::Align {
                    value,
                    payload: None,
                } => Some(*value),
                _ => None,
            })
            .unwrap_or(self.align)
    }

    pub fn style(&self) -> &super::Style {
        self.style.current()
    }

    // ========== Style passthrough ==========

    pub fn bold(&mut self, enabled: bool) {
        if let Some(item) = self.style.set_bold(enabled) {
            self.add(item, 0);
        }
    }

    pub fn italic(&mut self, enabled: bool) {
        if let Some(item) = self.style.set_italic(enabled) {
            self.add(item, 0);
        }
    }

    pub fn underline(&mut self, enabled: bool) {
        if let Some(item) = self.style.set_underline(enabled) {
            self.add(item, 0);
        }
    }

    pub fn invert(&mut self, enabled: bool) {
        if let Some(item) = self.style.set_invert(enabled) {
            self.add(item, 0);
        }
    }

    pub fn width(&mut self, width: u8) {
        if let Some(item) = self.style.set_width(width) {
            self.add(item, 0);
        }
    }

    pub fn height(&mut self, height: u8) {
        if let Some(item) = self.style.set_height(height) {
            self.add(item, 0);
        }
    }

    pub fn size(&mut self, width: u8, height: u8) {
        if let Some(item) = self.style.set_size(width, height) {
            self.add(item, 0);
        }
    }

    // ========== Content ==========

    /// Word-wrap `value` from the current cursor position. Every wrapped
    /// line except the last is flushed; the last stays open so following
    /// calls continue on the same line.
    pub fn text(&mut self, value: &str, codepage: TextEncoding) {
        let width = self.style.width() as usize;
        let wrapped = wrap::wrap(value, self.columns, width, self.cursor);
        let count = wrapped.len();

        for (index, line) in wrapped.into_iter().enumerate() {
            if !line.is_empty() {
                let cells = line.chars().count() * width;
                self.add(
                    Item::Text {
                        value: line,
                        codepage,
                    },
                    cells,
                );
            }
            if index + 1 < count {
                self.flush(FlushOptions::newline());
            }
        }
    }

    /// Horizontal whitespace of `size` cells.
    pub fn space(&mut self, size: usize) {
        self.add(Item::Space(size), size);
    }

    /// Opaque dialect bytes occupying `width` cells.
    pub fn raw(&mut self, bytes: Vec<u8>, width: usize) {
        self.add(Item::Raw(bytes), width);
    }

    /// Append an item of logical `width` cells, flushing first when it
    /// would overflow the line.
    pub fn add(&mut self, item: Item, width: usize) {
        if self.cursor + width > self.columns {
            self.flush(FlushOptions::default());
        }
        self.buffer.push(item);
        self.cursor += width;
    }

    /// Append a pre-rendered run of items (an embedded cell line)
    /// occupying `width` cells in total.
    pub fn append(&mut self, items: Vec<Item>, width: usize) {
        if self.cursor + width > self.columns {
            self.flush(FlushOptions::default());
        }
        self.buffer.extend(items);
        self.cursor += width;
    }

    /// Whether anything is buffered or the cursor has advanced.
    pub fn has_pending(&self) -> bool {
        self.cursor > 0 || !self.buffer.is_empty()
    }

    /// Force the cursor to the end of the line; the next add flushes.
    pub fn end(&mut self) {
        self.cursor = self.columns;
    }

    /// Fetch the current line and emit it to the queue.
    pub fn flush(&mut self, options: FlushOptions) {
        let items = self.fetch(options);
        if !items.is_empty() {
            self.lines.push(Line::from_items(items));
        }
    }

    /// Lines flushed so far.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Drain the queue, leaving the composer ready for the next document.
    pub fn take_lines(&mut self) -> Vec<Line> {
        std::mem::take(&mut self.lines)
    }

    // ========== Line assembly ==========

    fn fetch(&mut self, options: FlushOptions) -> Vec<Item> {
        if self.cursor == 0 && !options.force_newline && !options.force_flush {
            return Vec::new();
        }

        // Layout markers: the last one sets the alignment of subsequent
        // lines; the last one still preceding content also governs this
        // line. A marker after all content is a next-line instruction.
        let markers: Vec<(usize, Alignment)> = self
            .buffer
            .iter()
            .enumerate()
            .filter_map(|(index, item)| match item {
                Item::Align {
                    value,
                    payload: None,
                } => Some((index, *value)),
                _ => None,
            })
            .collect();

        let mut current_align = self.align;
        if let Some(&(_, last_value)) = markers.last() {
            self.align = last_value;
            current_align = match self.buffer.iter().rposition(Item::is_content) {
                Some(content_pos) => markers
                    .iter()
                    .rev()
                    .find(|(index, _)| *index < content_pos)
                    .map(|&(_, value)| value)
                    .unwrap_or(current_align),
                None => last_value,
            };
        }
        if options.ignore_alignment {
            current_align = Alignment::Left;
        }

        let mut buffer: Vec<Item> = std::mem::take(&mut self.buffer)
            .into_iter()
            .filter(|item| {
                !matches!(
                    item,
                    Item::Align {
                        payload: None,
                        ..
                    }
                )
            })
            .collect();

        let mut cursor = self.cursor;
        let mut out: Vec<Item> = Vec::new();

        match current_align {
            Alignment::Left => {
                out.append(&mut self.stored);
                out.append(&mut buffer);
                out.extend(self.style.store());
                let pad = self.columns.saturating_sub(cursor);
                if self.embedded && pad > 0 {
                    out.push(Item::Space(pad));
                }
            }
            Alignment::Right => {
                strip_trailing_space(&mut buffer, &mut cursor, self.style.width() as usize);
                let pad = self.columns.saturating_sub(cursor);
                if pad > 0 {
                    out.push(Item::Space(pad));
                }
                out.append(&mut self.stored);
                out.append(&mut buffer);
                out.extend(self.style.store());
            }
            Alignment::Center => {
                let pad = self.columns.saturating_sub(cursor);
                let left = pad / 2;
                let right = pad - left;
                if left > 0 {
                    out.push(Item::Space(left));
                }
                out.append(&mut self.stored);
                out.append(&mut buffer);
                out.extend(self.style.store());
                if self.embedded && right > 0 {
                    out.push(Item::Space(right));
                }
            }
        }

        let mut out = merge_adjacent(out);

        if out.is_empty() && options.force_newline {
            out.push(Item::Empty);
        }

        self.cursor = 0;
        self.stored = self.style.restore();
        out
    }
}

/// Remove trailing whitespace from the line tail: whole `Space` items and
/// trailing spaces inside the last text item, cells scaled by the width
/// multiplier.
fn strip_trailing_space(buffer: &mut Vec<Item>, cursor: &mut usize, width: usize) {
    loop {
        match buffer.last_mut() {
            Some(Item::Space(size)) => {
                *cursor = cursor.saturating_sub(*size);
                buffer.pop();
            }
            Some(Item::Text { value, .. }) => {
                let trimmed = value.trim_end();
                let removed = value.chars().count() - trimmed.chars().count();
                if removed > 0 {
                    *cursor = cursor.saturating_sub(removed * width);
                    *value = trimmed.to_string();
                }
                if value.is_empty() {
                    buffer.pop();
                } else {
                    return;
                }
            }
            _ => return,
        }
    }
}

/// Merge adjacent text items with compatible codepages and adjacent size
/// deltas (the latter wins).
fn merge_adjacent(items: Vec<Item>) -> Vec<Item> {
    let mut out: Vec<Item> = Vec::with_capacity(items.len());

    for item in items {
        match (out.last_mut(), item) {
            (
                Some(Item::Text {
                    value: prev_value,
                    codepage: prev_codepage,
                }),
                Item::Text { value, codepage },
            ) if compatible(*prev_codepage, codepage) => {
                prev_value.push_str(&value);
                *prev_codepage = prev_codepage.or(codepage);
            }
            (
                Some(previous @ Item::Style(StyleDelta::Size { .. })),
                Item::Style(delta @ StyleDelta::Size { .. }),
            ) => {
                *previous = Item::Style(delta);
            }
            (_, item) => out.push(item),
        }
    }

    out
}

#[inline]
fn compatible(a: TextEncoding, b: TextEncoding) -> bool {
    a.is_none() || b.is_none() || a == b
}
