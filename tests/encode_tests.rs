//! # Golden Wire Tests
//!
//! End-to-end scenarios asserting the exact bytes an encoded document
//! puts on the wire, plus the cross-module properties that only show up
//! when the composer, dialect drivers and codepage client run together.
//!
//! Expected sequences are short enough to inline as byte vectors; when a
//! framing changes intentionally, update the vector alongside the driver.

use recibo::{
    Alignment, BarcodeOptions, Bitmap, BorderStyle, CutType, Encoder, QrOptions, RuleOptions,
    Symbology, TableCell, TableColumn,
};

fn escpos_42() -> Encoder {
    Encoder::builder()
        .columns(42)
        .newline("\n\r")
        .build()
        .unwrap()
}

/// Solid-color RGBA bitmap.
fn bitmap(width: usize, height: usize, black: bool) -> Bitmap {
    let pixel = if black { 0u8 } else { 0xFFu8 };
    Bitmap::from_rgba(vec![pixel; width * height * 4], width, height).unwrap()
}

// ============================================================================
// SCENARIO 1: simple line + cut, ESC/POS
// ============================================================================

#[test]
fn test_simple_line_and_cut() {
    let mut encoder = escpos_42();
    encoder
        .initialize()
        .unwrap()
        .line("Hi")
        .unwrap()
        .cut(CutType::Full)
        .unwrap();

    let bytes = encoder.encode();
    let expected_prefix = [
        0x1B, 0x40, // ESC @
        0x1C, 0x2E, // FS . (cancel kanji mode)
        0x1B, 0x4D, 0x00, // ESC M 0 (font A)
        0x1B, 0x74, 0x00, // ESC t 0 (cp437)
        0x48, 0x69, // "Hi"
        0x0A, 0x0D, // newline
        0x1D, 0x56, 0x00, // GS V 0 (full cut)
    ];
    assert!(
        bytes.starts_with(&expected_prefix),
        "wire prefix mismatch: {bytes:02X?}"
    );
}

// ============================================================================
// SCENARIO 2: bold toggle mid-line
// ============================================================================

#[test]
fn test_bold_toggle_wire_order() {
    let mut encoder = escpos_42();
    encoder
        .text("a")
        .unwrap()
        .bold(true)
        .unwrap()
        .text("b")
        .unwrap()
        .bold(false)
        .unwrap()
        .text("c")
        .unwrap()
        .newline()
        .unwrap();

    let bytes = encoder.encode();
    let expected = [
        0x1B, 0x74, 0x00, // codepage select before the first text run
        b'a', 0x1B, 0x45, 0x01, // bold on between "a" and "b"
        b'b', 0x1B, 0x45, 0x00, // bold off between "b" and "c"
        b'c', 0x0A, 0x0D,
    ];
    assert_eq!(bytes, expected);
}

// ============================================================================
// SCENARIO 4: raster strip partition, 576x1000
// ============================================================================

#[tokio::test]
async fn test_raster_strip_partition_headers() {
    let mut encoder = Encoder::builder()
        .columns(48)
        .image_compression(false)
        .build()
        .unwrap();
    encoder.image(&bitmap(576, 1000, false)).await.unwrap();

    let lines = encoder.commands();
    let payload: Vec<u8> = lines
        .iter()
        .flat_map(|line| {
            line.items.iter().filter_map(|item| match item {
                recibo::compose::Item::Image(bytes) => Some(bytes.clone()),
                _ => None,
            })
        })
        .flatten()
        .collect();

    // Two GS v 0 commands: 512 rows then 488 rows, both 72 bytes wide.
    assert_eq!(
        &payload[0..8],
        &[0x1D, 0x76, 0x30, 0x00, 0x48, 0x00, 0x00, 0x02]
    );
    let second = 8 + 72 * 512;
    assert_eq!(
        &payload[second..second + 8],
        &[0x1D, 0x76, 0x30, 0x00, 0x48, 0x00, 0xE8, 0x01]
    );
    // 16 header bytes + 72 bytes/row * 1000 rows.
    assert_eq!(payload.len(), 16 + 72_000);
}

// ============================================================================
// SCENARIO 5: chunked streaming
// ============================================================================

#[tokio::test]
async fn test_chunking_covers_encoded_payload() {
    let make = || {
        let mut encoder = Encoder::builder()
            .columns(42)
            .newline("")
            .build()
            .unwrap();
        encoder
            .raw((0..2050u16).map(|i| i as u8).collect())
            .unwrap();
        encoder
    };

    let whole = make().encode();
    assert_eq!(whole.len(), 2050);

    let mut stream = make().chunks(512).unwrap();
    assert_eq!(stream.total_chunks(), 5);

    let mut sizes = Vec::new();
    let mut collected = Vec::new();
    let mut final_sent = 0;
    let mut last_seen = Vec::new();
    while let Some(chunk) = stream.next().await {
        sizes.push(chunk.bytes.len());
        final_sent = chunk.bytes_sent;
        last_seen.push(chunk.is_last);
        collected.extend(chunk.bytes);
    }

    assert_eq!(sizes, vec![512, 512, 512, 512, 2]);
    assert_eq!(final_sent, 2050);
    assert_eq!(last_seen, vec![false, false, false, false, true]);
    assert_eq!(collected, whole);
}

#[tokio::test]
async fn test_chunk_count_property() {
    for chunk_size in [1usize, 3, 7, 64, 512, 4096] {
        let mut encoder = Encoder::builder()
            .columns(42)
            .newline("")
            .build()
            .unwrap();
        encoder.raw(vec![0x55; 1000]).unwrap();

        let mut stream = encoder.chunks(chunk_size).unwrap();
        let expected = 1000usize.div_ceil(chunk_size);
        assert_eq!(stream.total_chunks(), expected);

        let mut count = 0;
        let mut short_seen = false;
        while let Some(chunk) = stream.next().await {
            // Only the last chunk may run short.
            assert!(!short_seen);
            if chunk.bytes.len() < chunk_size {
                short_seen = true;
                assert!(chunk.is_last);
            }
            count += 1;
        }
        assert_eq!(count, expected);
    }
}

// ============================================================================
// SCENARIO 6: right alignment with trailing space
// ============================================================================

#[test]
fn test_right_align_strips_trailing_space() {
    let mut encoder = Encoder::builder()
        .columns(32)
        .newline("\n")
        .build()
        .unwrap();
    encoder
        .align(Alignment::Right)
        .unwrap()
        .text("hello ")
        .unwrap()
        .newline()
        .unwrap();

    let bytes = encoder.encode();
    // 27 cells of padding, then codepage select, then the stripped text.
    let mut expected = vec![b' '; 27];
    expected.extend([0x1B, 0x74, 0x00]);
    expected.extend(b"hello");
    expected.push(0x0A);
    assert_eq!(bytes, expected);
}

// ============================================================================
// DETERMINISM & INITIALIZATION
// ============================================================================

#[test]
fn test_output_is_deterministic() {
    let run = || {
        let mut encoder = Encoder::for_model("epson-tm-t88v").unwrap();
        encoder
            .initialize()
            .unwrap()
            .line("Crème brûlée 4,50€")
            .unwrap()
            .barcode("4006381333931", Symbology::Ean13, BarcodeOptions::default())
            .unwrap()
            .cut(CutType::Full)
            .unwrap();
        encoder.encode()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_initialize_prefix_per_dialect() {
    let mut escpos = escpos_42();
    escpos.initialize().unwrap();
    assert!(escpos
        .encode()
        .starts_with(&[0x1B, 0x40, 0x1C, 0x2E, 0x1B, 0x4D, 0x00]));

    let mut star = Encoder::for_model("star-tsp650ii").unwrap();
    star.initialize().unwrap();
    assert!(star.encode().starts_with(&[0x1B, 0x40, 0x18]));
}

// ============================================================================
// CODEPAGE HANDLING
// ============================================================================

#[test]
fn test_codepage_switch_only_when_changed() {
    let mut encoder = escpos_42();
    encoder
        .line("abc")
        .unwrap()
        .line("def")
        .unwrap()
        .codepage("cp866")
        .unwrap()
        .line("Да")
        .unwrap()
        .line("Нет")
        .unwrap();

    let bytes = encoder.encode();
    let switches: Vec<u8> = bytes
        .windows(3)
        .filter(|window| window[0] == 0x1B && window[1] == 0x74)
        .map(|window| window[2])
        .collect();
    // One switch to cp437 (slot 0), one to cp866 (slot 17), no repeats.
    assert_eq!(switches, vec![0, 17]);
}

#[test]
fn test_auto_codepage_splits_runs() {
    let mut encoder = escpos_42();
    encoder.line("hi Да").unwrap();

    let bytes = encoder.encode();
    let expected = [
        0x1B, 0x74, 0x00, // cp437 for the ASCII run
        b'h', b'i', b' ', 0x1B, 0x74, 0x11, // cp866 for the Cyrillic run
        0x84, 0xA0, // "Да"
        0x0A, 0x0D,
    ];
    assert_eq!(bytes, expected);
}

// ============================================================================
// ALIGNMENT AROUND CODES
// ============================================================================

#[test]
fn test_centered_qrcode_brackets_alignment() {
    let mut encoder = escpos_42();
    encoder
        .align(Alignment::Center)
        .unwrap()
        .qrcode("https://example.com", QrOptions::default())
        .unwrap();

    let bytes = encoder.encode();
    let center = [0x1B, 0x61, 0x01];
    let left = [0x1B, 0x61, 0x00];
    let center_pos = bytes
        .windows(3)
        .position(|w| w == center)
        .expect("center align emitted");
    let left_pos = bytes
        .windows(3)
        .position(|w| w == left)
        .expect("left align restored");
    let qr_pos = bytes
        .windows(3)
        .position(|w| w == [0x1D, 0x28, 0x6B])
        .expect("QR envelope emitted");
    assert!(center_pos < qr_pos && qr_pos < left_pos);
}

// ============================================================================
// TABLES AND BOXES
// ============================================================================

#[test]
fn test_table_rows_fill_every_cell() {
    let mut encoder = Encoder::builder()
        .columns(32)
        .newline("\n")
        .build()
        .unwrap();
    let columns = [
        TableColumn::new(20),
        TableColumn::new(12).align(Alignment::Right),
    ];
    encoder
        .table(
            &columns,
            vec![
                vec![TableCell::from("Espresso"), TableCell::from("4.50")],
                vec![TableCell::from("Flat white"), TableCell::from("5.00")],
            ],
        )
        .unwrap();

    let bytes = encoder.encode();
    let text = String::from_utf8_lossy(&bytes);
    let lines: Vec<&str> = text
        .split('\n')
        .filter(|l| !l.is_empty())
        // The first line carries the one-time codepage select.
        .map(|l| l.strip_prefix("\u{1B}t\u{0}").unwrap_or(l))
        .collect();
    assert_eq!(lines.len(), 2);
    for line in &lines {
        // Embedded cells pad to exactly the table width.
        assert_eq!(line.chars().count(), 32, "row not padded: {line:?}");
    }
    assert!(lines[0].starts_with("Espresso"));
    assert!(lines[0].ends_with("4.50"));
    assert!(lines[1].ends_with("5.00"));
}

#[test]
fn test_multi_line_cell_pads_neighbours() {
    let mut encoder = Encoder::builder()
        .columns(32)
        .newline("\n")
        .build()
        .unwrap();
    let columns = [TableColumn::new(10), TableColumn::new(22)];
    encoder
        .table(
            &columns,
            vec![vec![
                TableCell::from("wraps over two lines"),
                TableCell::from("short"),
            ]],
        )
        .unwrap();

    let bytes = encoder.encode();
    let text = String::from_utf8_lossy(&bytes);
    let lines: Vec<&str> = text
        .split('\n')
        .filter(|l| !l.is_empty())
        .map(|l| l.strip_prefix("\u{1B}t\u{0}").unwrap_or(l))
        .collect();
    assert!(lines.len() >= 2, "expected a wrapped row: {lines:?}");
    for line in &lines {
        assert_eq!(line.chars().count(), 32);
    }
}

#[test]
fn test_box_draws_borders() {
    let mut encoder = Encoder::builder()
        .columns(32)
        .newline("\n")
        .build()
        .unwrap();
    encoder
        .box_(
            recibo::BoxOptions {
                width: Some(12),
                ..Default::default()
            },
            |inner| inner.text("hey").map(|_| ()),
        )
        .unwrap();

    let bytes = encoder.encode();
    // cp437 box drawing: ┌ ─ ┐ │ └ ┘
    assert!(bytes.contains(&0xDA));
    assert!(bytes.contains(&0xBF));
    assert!(bytes.contains(&0xB3));
    assert!(bytes.contains(&0xC0));
    assert!(bytes.contains(&0xD9));
    // Three lines: top border, content, bottom border.
    assert_eq!(bytes.iter().filter(|&&b| b == 0x0A).count(), 3);
}

#[test]
fn test_double_rule() {
    let mut encoder = Encoder::builder()
        .columns(32)
        .newline("\n")
        .build()
        .unwrap();
    encoder
        .rule(RuleOptions {
            style: BorderStyle::Double,
            width: Some(6),
        })
        .unwrap();
    let bytes = encoder.encode();
    assert_eq!(
        bytes,
        vec![0x1B, 0x74, 0x00, 0xCD, 0xCD, 0xCD, 0xCD, 0xCD, 0xCD, 0x0A]
    );
}

// ============================================================================
// FULL DOCUMENTS PER DIALECT
// ============================================================================

#[test]
fn test_star_document_ends_with_flush() {
    let mut encoder = Encoder::for_model("star-tsp100iv").unwrap();
    encoder.initialize().unwrap().line("hello").unwrap();
    let bytes = encoder.encode();

    assert!(bytes.starts_with(&[0x1B, 0x40, 0x18]));
    // Star codepage select for cp437 is slot 1.
    assert!(bytes.windows(4).any(|w| w == [0x1B, 0x1D, 0x74, 0x01]));
    // Auto-flush page-mode kick before the final terminator.
    assert!(bytes
        .windows(8)
        .any(|w| w == [0x1B, 0x1D, 0x50, 0x30, 0x1B, 0x1D, 0x50, 0x31]));
}

#[test]
fn test_star_line_document_has_no_flush() {
    let mut encoder = Encoder::for_model("star-tsp700ii").unwrap();
    encoder.initialize().unwrap().line("hello").unwrap();
    let bytes = encoder.encode();
    assert!(!bytes.windows(4).any(|w| w == [0x1B, 0x1D, 0x50, 0x30]));
}

#[test]
fn test_trailing_pulse_suppresses_newline() {
    let mut encoder = Encoder::builder()
        .columns(42)
        .newline("\n\r")
        .build()
        .unwrap();
    encoder.line("done").unwrap().pulse(0, 100, 200).unwrap();
    let bytes = encoder.encode();
    assert!(bytes.ends_with(&[0x1B, 0x70, 0x00, 50, 100]));
}

#[tokio::test]
async fn test_star_image_uses_column_mode() {
    let mut encoder = Encoder::for_model("star-mc-print2").unwrap();
    encoder.image(&bitmap(16, 24, true)).await.unwrap();
    let lines = encoder.commands();
    let has_esc_x = lines.iter().any(|line| {
        line.items.iter().any(|item| match item {
            recibo::compose::Item::Image(bytes) => bytes.starts_with(&[0x1B, 0x58, 16, 0]),
            _ => false,
        })
    });
    assert!(has_esc_x);
}

#[test]
fn test_image_rejects_bad_width() {
    assert!(Bitmap::from_rgba(vec![0; 12 * 2 * 4], 12, 2).is_err());
}
