//! # Text Wrapping
//!
//! Breaks text against a column budget measured in character cells. The
//! width multiplier scales every character, so a 2x-wide style halves the
//! characters that fit on a line.
//!
//! Break opportunities are whitespace, soft hyphen points (`foo-bar` may
//! break after `foo-`) and explicit newlines. A token longer than a whole
//! line is split character-wise as a last resort.
//!
//! Whitespace at a break point is dropped; whitespace at the very end of
//! the text stays on the last line so the composer can account for it
//! during alignment.

/// Minimum leftover cells (in units of `width`) worth starting an
/// oversized-token prefix on the current line.
const MIN_PREFIX_CELLS: usize = 8;

/// Wrap `text` so every produced line fits `columns` cells, with each
/// character costing `width` cells and the first line starting `indent`
/// cells in.
pub fn wrap(text: &str, columns: usize, width: usize, indent: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    // Cells consumed on the line under construction.
    let mut used = indent;

    let mut explicit = text.split('\n').peekable();
    while let Some(segment) = explicit.next() {
        let mut pending_gap: Option<&str> = None;

        for piece in pieces(segment) {
            let word = match piece {
                Piece::Gap(gap) => {
                    pending_gap = Some(gap);
                    continue;
                }
                Piece::Word(word) => word,
            };

            let gap = pending_gap.take();
            let gap_cells = gap.map(|g| g.chars().count()).unwrap_or(0) * width;
            let word_cells = word.chars().count() * width;

            if used + gap_cells + word_cells <= columns {
                if let Some(gap) = gap {
                    current.push_str(gap);
                }
                current.push_str(word);
                used += gap_cells + word_cells;
                continue;
            }

            if word_cells <= columns {
                // Fits on a fresh line; the gap dies at the break.
                push_trimmed(&mut lines, &mut current);
                current.push_str(word);
                used = word_cells;
                continue;
            }

            // Oversized token: split character-wise.
            if let Some(gap) = gap {
                if used + gap_cells < columns {
                    current.push_str(gap);
                    used += gap_cells;
                } else {
                    push_trimmed(&mut lines, &mut current);
                    used = 0;
                }
            }
            let remaining = columns.saturating_sub(used);
            let mut chars: Vec<char> = word.chars().collect();
            if remaining >= MIN_PREFIX_CELLS * width {
                let take = (remaining / width).min(chars.len());
                current.extend(chars.drain(..take));
            }
            push_trimmed(&mut lines, &mut current);

            let per_line = (columns / width).max(1);
            while chars.len() > per_line {
                lines.push(chars.drain(..per_line).collect());
            }
            current = chars.into_iter().collect();
            used = current.chars().count() * width;
        }

        // Trailing gap survives on the final line, capped to the budget.
        if let Some(gap) = pending_gap {
            for ch in gap.chars() {
                if used + width > columns {
                    break;
                }
                current.push(ch);
                used += width;
            }
        }

        if explicit.peek().is_some() {
            // Explicit newline: close the segment, empty lines included.
            push_trimmed(&mut lines, &mut current);
            used = 0;
        }
    }

    lines.push(current);
    lines
}

enum Piece<'a> {
    Word(&'a str),
    Gap(&'a str),
}

/// Split a segment into alternating whitespace gaps and words, with each
/// word further split at soft hyphen points: a `-` followed by an
/// alphanumeric character opens a break, the hyphen staying on the
/// leading part. Hyphen continuations carry no gap, so parts rejoin
/// seamlessly when they fit on one line.
fn pieces(segment: &str) -> Vec<Piece<'_>> {
    let mut out = Vec::new();
    let mut rest = segment;

    while !rest.is_empty() {
        let word_start = rest
            .find(|c: char| !c.is_whitespace())
            .unwrap_or(rest.len());
        if word_start > 0 {
            out.push(Piece::Gap(&rest[..word_start]));
            rest = &rest[word_start..];
            continue;
        }

        let word_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let word = &rest[..word_end];
        rest = &rest[word_end..];

        let mut start = 0;
        let indices: Vec<(usize, char)> = word.char_indices().collect();
        for (i, (offset, ch)) in indices.iter().enumerate() {
            if *ch == '-' && *offset >= start {
                if let Some((next_offset, next_ch)) = indices.get(i + 1) {
                    if next_ch.is_alphanumeric() {
                        out.push(Piece::Word(&word[start..*next_offset]));
                        start = *next_offset;
                    }
                }
            }
        }
        out.push(Piece::Word(&word[start..]));
    }

    out
}

fn push_trimmed(lines: &mut Vec<String>, current: &mut String) {
    lines.push(current.trim_end().to_string());
    current.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fits_on_one_line() {
        assert_eq!(wrap("hello world", 20, 1, 0), vec!["hello world"]);
    }

    #[test]
    fn test_breaks_at_whitespace() {
        assert_eq!(
            wrap("the quick brown fox", 10, 1, 0),
            vec!["the quick", "brown fox"]
        );
    }

    #[test]
    fn test_line_budget_honoured() {
        for line in wrap("lorem ipsum dolor sit amet consectetur", 12, 1, 0) {
            assert!(line.chars().count() <= 12, "line too long: {line:?}");
        }
    }

    #[test]
    fn test_width_multiplier_halves_budget() {
        // 2x width: 10 columns fit 5 characters.
        assert_eq!(wrap("abcde fgh", 10, 2, 0), vec!["abcde", "fgh"]);
    }

    #[test]
    fn test_indent_consumes_first_line() {
        // 6 cells already used: "hello" (5) no longer fits 10.
        assert_eq!(wrap("hello", 10, 1, 6), vec!["", "hello"]);
        // 4 cells used: it fits.
        assert_eq!(wrap("hello", 10, 1, 4), vec!["hello"]);
    }

    #[test]
    fn test_hyphen_break() {
        assert_eq!(wrap("twenty-fourth", 8, 1, 0), vec!["twenty-", "fourth"]);
    }

    #[test]
    fn test_hyphen_kept_together_when_fitting() {
        assert_eq!(wrap("twenty-fourth", 20, 1, 0), vec!["twenty-fourth"]);
    }

    #[test]
    fn test_trailing_hyphen_no_break() {
        // No word character after the hyphen: nothing to break on.
        assert_eq!(wrap("dash- here", 20, 1, 0), vec!["dash- here"]);
    }

    #[test]
    fn test_double_hyphen_breaks_after_last() {
        assert_eq!(wrap("a--b", 3, 1, 0), vec!["a--", "b"]);
    }

    #[test]
    fn test_explicit_newlines() {
        assert_eq!(wrap("a\nb", 10, 1, 0), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_lines_preserved() {
        assert_eq!(wrap("a\n\nb", 10, 1, 0), vec!["a", "", "b"]);
    }

    #[test]
    fn test_oversized_token_splits_characterwise() {
        assert_eq!(
            wrap("abcdefghijklmnopqrstuvwxyz", 10, 1, 0),
            vec!["abcdefghij", "klmnopqrst", "uvwxyz"]
        );
    }

    #[test]
    fn test_oversized_token_prefix_needs_eight_cells() {
        // 7 cells remain after "he " on a 10-column line: below the
        // 8-cell minimum, so the long token starts fresh.
        let lines = wrap("he abcdefghijklm", 10, 1, 0);
        assert_eq!(lines, vec!["he", "abcdefghij", "klm"]);
    }

    #[test]
    fn test_oversized_token_takes_prefix_when_room() {
        // 12-column line, "x " uses 2, 10 >= 8 cells remain: prefix fills
        // the current line.
        let lines = wrap("x abcdefghijklmnop", 12, 1, 0);
        assert_eq!(lines, vec!["x abcdefghij", "klmnop"]);
    }

    #[test]
    fn test_trailing_whitespace_kept_on_last_line() {
        assert_eq!(wrap("hello ", 10, 1, 0), vec!["hello "]);
    }

    #[test]
    fn test_trailing_whitespace_stripped_at_breaks() {
        let lines = wrap("aaa    bbb", 6, 1, 0);
        assert_eq!(lines, vec!["aaa", "bbb"]);
    }

    #[test]
    fn test_internal_gaps_preserved() {
        assert_eq!(wrap("a  b", 10, 1, 0), vec!["a  b"]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(wrap("", 10, 1, 0), vec![""]);
    }
}
