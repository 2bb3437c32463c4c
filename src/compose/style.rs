//! # Style Tracking
//!
//! Tracks the live text style against the default and emits deltas only
//! when something actually changes, so the wire never carries redundant
//! style commands.
//!
//! [`StyleTracker::store`] and [`StyleTracker::restore`] produce the
//! save/restore brackets the composer wraps around each line: `store`
//! drives the current style back to the default, `restore` re-applies it.
//! Bracketing every line makes per-line style state idempotent, which is
//! what lets embedded sub-documents (table cells, boxes) interleave
//! without leaking style into their neighbours.

use super::Item;

/// A full style state: toggles plus character cell multipliers (1..=8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub invert: bool,
    pub width: u8,
    pub height: u8,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            bold: false,
            italic: false,
            underline: false,
            invert: false,
            width: 1,
            height: 1,
        }
    }
}

/// A single style change. Width and height always travel together as one
/// `Size` delta because both dialects set them with one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleDelta {
    Bold(bool),
    Italic(bool),
    Underline(bool),
    Invert(bool),
    Size { width: u8, height: u8 },
}

/// Current style vs default style, emitting deltas on change.
#[derive(Debug, Default)]
pub struct StyleTracker {
    current: Style,
    default: Style,
}

impl StyleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &Style {
        &self.current
    }

    pub fn width(&self) -> u8 {
        self.current.width
    }

    pub fn height(&self) -> u8 {
        self.current.height
    }

    pub fn set_bold(&mut self, enabled: bool) -> Option<Item> {
        if self.current.bold == enabled {
            return None;
        }
        self.current.bold = enabled;
        Some(Item::Style(StyleDelta::Bold(enabled)))
    }

    pub fn set_italic(&mut self, enabled: bool) -> Option<Item> {
        if self.current.italic == enabled {
            return None;
        }
        self.current.italic = enabled;
        Some(Item::Style(StyleDelta::Italic(enabled)))
    }

    pub fn set_underline(&mut self, enabled: bool) -> Option<Item> {
        if self.current.underline == enabled {
            return None;
        }
        self.current.underline = enabled;
        Some(Item::Style(StyleDelta::Underline(enabled)))
    }

    pub fn set_invert(&mut self, enabled: bool) -> Option<Item> {
        if self.current.invert == enabled {
            return None;
        }
        self.current.invert = enabled;
        Some(Item::Style(StyleDelta::Invert(enabled)))
    }

    /// Width and height updates coalesce into one `Size` delta carrying
    /// both current values.
    pub fn set_width(&mut self, width: u8) -> Option<Item> {
        self.set_size(width, self.current.height)
    }

    pub fn set_height(&mut self, height: u8) -> Option<Item> {
        self.set_size(self.current.width, height)
    }

    pub fn set_size(&mut self, width: u8, height: u8) -> Option<Item> {
        if self.current.width == width && self.current.height == height {
            return None;
        }
        self.current.width = width;
        self.current.height = height;
        Some(Item::Style(StyleDelta::Size { width, height }))
    }

    /// Deltas that would drive the current style back to the default.
    /// Does not mutate the tracker.
    pub fn store(&self) -> Vec<Item> {
        diff(&self.current, &self.default)
    }

    /// Deltas that re-apply the current style from the default. Inverse
    /// of [`store`](Self::store).
    pub fn restore(&self) -> Vec<Item> {
        diff(&self.default, &self.current)
    }
}

/// Deltas turning style `from` into style `to`.
fn diff(from: &Style, to: &Style) -> Vec<Item> {
    let mut items = Vec::new();
    if from.bold != to.bold {
        items.push(Item::Style(StyleDelta::Bold(to.bold)));
    }
    if from.italic != to.italic {
        items.push(Item::Style(StyleDelta::Italic(to.italic)));
    }
    if from.underline != to.underline {
        items.push(Item::Style(StyleDelta::Underline(to.underline)));
    }
    if from.invert != to.invert {
        items.push(Item::Style(StyleDelta::Invert(to.invert)));
    }
    if from.width != to.width || from.height != to.height {
        items.push(Item::Style(StyleDelta::Size {
            width: to.width,
            height: to.height,
        }));
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setter_emits_delta_on_change() {
        let mut tracker = StyleTracker::new();
        assert_eq!(
            tracker.set_bold(true),
            Some(Item::Style(StyleDelta::Bold(true)))
        );
        assert!(tracker.current().bold);
    }

    #[test]
    fn test_setter_silent_when_unchanged() {
        let mut tracker = StyleTracker::new();
        assert_eq!(tracker.set_bold(false), None);
        tracker.set_bold(true);
        assert_eq!(tracker.set_bold(true), None);
    }

    #[test]
    fn test_width_height_coalesce_into_size() {
        let mut tracker = StyleTracker::new();
        assert_eq!(
            tracker.set_width(2),
            Some(Item::Style(StyleDelta::Size {
                width: 2,
                height: 1
            }))
        );
        // Height update carries the live width along.
        assert_eq!(
            tracker.set_height(3),
            Some(Item::Style(StyleDelta::Size {
                width: 2,
                height: 3
            }))
        );
    }

    #[test]
    fn test_store_drives_to_default() {
        let mut tracker = StyleTracker::new();
        tracker.set_bold(true);
        tracker.set_size(2, 2);
        let store = tracker.store();
        assert!(store.contains(&Item::Style(StyleDelta::Bold(false))));
        assert!(store.contains(&Item::Style(StyleDelta::Size {
            width: 1,
            height: 1
        })));
        // store() is a projection, not a reset.
        assert!(tracker.current().bold);
    }

    #[test]
    fn test_store_restore_round_trip() {
        let mut tracker = StyleTracker::new();
        tracker.set_bold(true);
        tracker.set_underline(true);
        tracker.set_size(3, 2);

        // Applying store then restore is the identity on the style state.
        let mut replay = StyleTracker::new();
        for item in tracker.restore() {
            if let Item::Style(delta) = item {
                apply(&mut replay, delta);
            }
        }
        assert_eq!(replay.current(), tracker.current());

        for item in tracker.store() {
            if let Item::Style(delta) = item {
                apply(&mut replay, delta);
            }
        }
        for item in tracker.restore() {
            if let Item::Style(delta) = item {
                apply(&mut replay, delta);
            }
        }
        assert_eq!(replay.current(), tracker.current());
    }

    #[test]
    fn test_default_style_has_empty_brackets() {
        let tracker = StyleTracker::new();
        assert!(tracker.store().is_empty());
        assert!(tracker.restore().is_empty());
    }

    fn apply(tracker: &mut StyleTracker, delta: StyleDelta) {
        match delta {
            StyleDelta::Bold(v) => drop(tracker.set_bold(v)),
            StyleDelta::Italic(v) => drop(tracker.set_italic(v)),
            StyleDelta::Underline(v) => drop(tracker.set_underline(v)),
            StyleDelta::Invert(v) => drop(tracker.set_invert(v)),
            StyleDelta::Size { width, height } => drop(tracker.set_size(width, height)),
        }
    }
}
