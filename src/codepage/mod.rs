//! # Codepage Encoding
//!
//! Converts Unicode strings to the single-byte codepages understood by
//! thermal printers, and maps codepage names to the wire bytes a given
//! printer family expects.
//!
//! ASCII (U+0000–U+007F) passes through unchanged in every codepage.
//! Characters without a mapping are replaced with `?` — deterministic, so
//! encoding the same document twice produces identical bytes.
//!
//! ## Mappings
//!
//! A [`Mapping`] is a named, ordered list of `(wire byte, codepage name)`
//! pairs for one printer family. The order doubles as the candidate list
//! for [`auto_encode`]: when the encoder is in automatic codepage mode,
//! each text run is tagged with the first candidate able to encode it.
//!
//! ## Example
//!
//! ```
//! use recibo::codepage;
//!
//! let bytes = codepage::encode("Año", "cp437");
//! assert_eq!(bytes, vec![0x41, 0xA4, 0x6F]);
//! ```

mod tables;

/// A text run tagged with the codepage used to encode it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRun {
    pub codepage: &'static str,
    pub bytes: Vec<u8>,
}

/// Whether `name` names a codepage this module can encode.
pub fn supports(name: &str) -> bool {
    tables::table(name).is_some()
}

/// Encode `text` into the named codepage.
///
/// Unmappable characters become `?`. Callers are expected to have
/// validated the codepage name; an unknown name falls back to plain
/// ASCII-with-`?` so the output length still matches the input.
pub fn encode(text: &str, name: &str) -> Vec<u8> {
    let table = tables::table(name);
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        out.push(encode_char(ch, table));
    }
    out
}

/// Whether a single character is encodable in the named codepage.
pub fn can_encode(ch: char, name: &str) -> bool {
    if (ch as u32) < 0x80 {
        return true;
    }
    match tables::table(name) {
        Some(table) => table.contains(&ch),
        None => false,
    }
}

/// Segment `text` into maximal runs, each encodable in one of the
/// `candidates`, preserving candidate order.
///
/// A character stays in the current run when its codepage can encode it;
/// otherwise the first capable candidate (in declared order) opens a new
/// run. Characters no candidate can encode are emitted as `?` in the
/// current run. The first run starts in the first candidate.
pub fn auto_encode(text: &str, candidates: &[&'static str]) -> Vec<EncodedRun> {
    let mut runs: Vec<EncodedRun> = Vec::new();
    if candidates.is_empty() || text.is_empty() {
        return runs;
    }

    let mut current = candidates[0];
    let mut bytes: Vec<u8> = Vec::new();

    for ch in text.chars() {
        let target = if can_encode(ch, current) {
            current
        } else if let Some(name) = candidates.iter().copied().find(|name| can_encode(ch, name)) {
            name
        } else {
            // No candidate encodes it: substitute in place.
            bytes.push(b'?');
            continue;
        };

        if target != current {
            if !bytes.is_empty() {
                runs.push(EncodedRun {
                    codepage: current,
                    bytes: std::mem::take(&mut bytes),
                });
            }
            current = target;
        }
        bytes.push(encode_char(ch, tables::table(current)));
    }

    if !bytes.is_empty() {
        runs.push(EncodedRun {
            codepage: current,
            bytes,
        });
    }
    runs
}

#[inline]
fn encode_char(ch: char, table: Option<&'static [char; 128]>) -> u8 {
    if (ch as u32) < 0x80 {
        return ch as u8;
    }
    match table.and_then(|t| t.iter().position(|&c| c == ch)) {
        Some(index) => 0x80 + index as u8,
        None => b'?',
    }
}

// ============================================================================
// WIRE MAPPINGS
// ============================================================================

/// Named ordered list of codepage identifiers for one printer family.
///
/// Translates codepage names to the byte value the printer's codepage
/// command expects, and supplies the candidate order for automatic
/// codepage selection.
#[derive(Debug, Clone, Copy)]
pub struct Mapping {
    pub name: &'static str,
    pub entries: &'static [(u8, &'static str)],
}

impl Mapping {
    /// Wire byte for a codepage name, if the family supports it.
    pub fn wire_id(&self, codepage: &str) -> Option<u8> {
        self.entries
            .iter()
            .find(|(_, name)| *name == codepage)
            .map(|(id, _)| *id)
    }

    /// Candidate codepages in declared order.
    pub fn candidates(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(_, name)| *name).collect()
    }

    /// The family's default codepage (first entry).
    pub fn default_codepage(&self) -> &'static str {
        self.entries[0].1
    }
}

const EPSON: Mapping = Mapping {
    name: "epson",
    entries: &[
        (0, "cp437"),
        (2, "cp850"),
        (16, "cp1252"),
        (17, "cp866"),
        (19, "cp858"),
    ],
};

const STAR: Mapping = Mapping {
    name: "star",
    entries: &[(1, "cp437"), (3, "cp858"), (9, "cp866"), (32, "cp1252")],
};

const BIXOLON: Mapping = Mapping {
    name: "bixolon",
    entries: &[(0, "cp437"), (2, "cp850"), (16, "cp1252"), (17, "cp866")],
};

const CITIZEN: Mapping = Mapping {
    name: "citizen",
    entries: &[(0, "cp437"), (2, "cp850"), (40, "cp1252")],
};

/// Look up a wire mapping by family name.
pub fn mapping(name: &str) -> Option<&'static Mapping> {
    match name {
        "epson" => Some(&EPSON),
        "star" => Some(&STAR),
        "bixolon" => Some(&BIXOLON),
        "citizen" => Some(&CITIZEN),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passthrough() {
        assert_eq!(encode("Hello, world!", "cp437"), b"Hello, world!");
    }

    #[test]
    fn test_empty_string() {
        assert_eq!(encode("", "cp437"), b"");
    }

    #[test]
    fn test_spanish_text() {
        // "¿Qué?" → ¿=0xA8, Q=0x51, u=0x75, é=0x82, ?=0x3F
        assert_eq!(
            encode("¿Qué?", "cp437"),
            vec![0xA8, 0x51, 0x75, 0x82, 0x3F]
        );
    }

    #[test]
    fn test_unmapped_becomes_question_mark() {
        assert_eq!(encode("★", "cp437"), vec![b'?']);
    }

    #[test]
    fn test_box_drawing_cp437() {
        assert_eq!(encode("┌──┐", "cp437"), vec![0xDA, 0xC4, 0xC4, 0xBF]);
        assert_eq!(encode("╔══╗", "cp437"), vec![0xC9, 0xCD, 0xCD, 0xBB]);
    }

    #[test]
    fn test_cyrillic_cp866() {
        assert_eq!(encode("Да", "cp866"), vec![0x84, 0xA0]);
    }

    #[test]
    fn test_euro_cp858() {
        assert_eq!(encode("€", "cp858"), vec![0xD5]);
        assert_eq!(encode("€", "cp1252"), vec![0x80]);
        assert_eq!(encode("€", "cp437"), vec![b'?']);
    }

    #[test]
    fn test_supports() {
        assert!(supports("cp437"));
        assert!(supports("cp866"));
        assert!(!supports("shift-jis"));
    }

    #[test]
    fn test_deterministic() {
        let a = encode("Crème brûlée ★", "cp850");
        let b = encode("Crème brûlée ★", "cp850");
        assert_eq!(a, b);
    }

    #[test]
    fn test_auto_encode_single_run() {
        let runs = auto_encode("hello", &["cp437", "cp866"]);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].codepage, "cp437");
        assert_eq!(runs[0].bytes, b"hello");
    }

    #[test]
    fn test_auto_encode_switches_runs() {
        // ASCII sticks to the open run; Cyrillic forces cp866.
        let runs = auto_encode("hi Да", &["cp437", "cp866"]);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].codepage, "cp437");
        assert_eq!(runs[0].bytes, b"hi ");
        assert_eq!(runs[1].codepage, "cp866");
        assert_eq!(runs[1].bytes, vec![0x84, 0xA0]);
    }

    #[test]
    fn test_auto_encode_candidate_order_preserved() {
        // 'é' encodable in both cp437 and cp850: the run stays in cp437
        // because it is already open and capable.
        let runs = auto_encode("café", &["cp437", "cp850"]);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].codepage, "cp437");
        assert_eq!(runs[0].bytes, vec![0x63, 0x61, 0x66, 0x82]);
    }

    #[test]
    fn test_auto_encode_unmappable_anywhere() {
        let runs = auto_encode("a★b", &["cp437"]);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].bytes, b"a?b");
    }

    #[test]
    fn test_mapping_wire_ids() {
        let epson = mapping("epson").unwrap();
        assert_eq!(epson.wire_id("cp437"), Some(0));
        assert_eq!(epson.wire_id("cp1252"), Some(16));
        assert_eq!(epson.wire_id("shift-jis"), None);
        assert_eq!(epson.default_codepage(), "cp437");

        let star = mapping("star").unwrap();
        assert_eq!(star.wire_id("cp437"), Some(1));
        assert!(mapping("unknown").is_none());
    }
}
