// Integration tests for the scan driver and pipeline
// Tests cover: offset correctness vs a naive reference scanner, carried
// state across windows, error taxonomy, suppression, and pipeline behavior

use std::sync::Arc;

use bytes::Bytes;
use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;
use structrs::{ScanConfig, ScanContext, ScanError, ScanSummary, Scanner, scan_pipeline};

// ============================================================================
// Reference scanner
// ============================================================================

/// Byte-at-a-time reference implementation of the structural character rules:
/// structural symbols outside strings, every unescaped quote, and the first
/// byte of every bare literal. Returns the offsets plus whether the input
/// ended inside a string and whether a control byte was seen inside one.
fn reference_scan(input: &[u8]) -> (Vec<u64>, bool, bool) {
    let mut out = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    let mut pred = true;
    let mut control_error = false;

    for (i, &b) in input.iter().enumerate() {
        let is_escaped = escaped;
        escaped = b == b'\\' && !is_escaped;

        let unescaped_quote = b == b'"' && !is_escaped;
        let in_region = if in_string {
            if unescaped_quote {
                in_string = false;
                false
            } else {
                true
            }
        } else if unescaped_quote {
            in_string = true;
            true
        } else {
            false
        };

        if in_region && b < 0x20 {
            control_error = true;
        }

        let ws = matches!(b, b' ' | b'\t' | b'\n' | b'\r');
        let sym = matches!(b, b'{' | b'}' | b'[' | b']' | b':' | b',');
        let structural = unescaped_quote || (!in_region && sym);

        if structural || (!in_region && !ws && pred) {
            out.push(i as u64);
        }
        pred = ws || structural;
    }

    (out, in_string, control_error)
}

/// Runs a scan collecting every published offset, regardless of the verdict.
fn scan_collect(input: &[u8], config: ScanConfig) -> (Result<ScanSummary, ScanError>, Vec<u64>) {
    let (ctx, rx) = ScanContext::new(&config).unwrap();
    let scanner = Scanner::new(config);
    std::thread::scope(|scope| {
        let collector = scope.spawn(move || {
            let mut all = Vec::new();
            for batch in rx {
                all.extend_from_slice(batch.offsets());
            }
            all
        });
        let result = scanner.scan(input, ctx);
        (result, collector.join().unwrap())
    })
}

fn small_windows() -> ScanConfig {
    ScanConfig::new(64, 4, 2).unwrap()
}

// ============================================================================
// Basic Functionality Tests
// ============================================================================

#[test]
fn test_empty_input_has_no_structural_content() {
    let (result, offsets) = scan_collect(b"", ScanConfig::default());
    assert!(matches!(result, Err(ScanError::NoStructuralContent)));
    assert!(offsets.is_empty());
}

#[test]
fn test_whitespace_only_has_no_structural_content() {
    let (result, offsets) = scan_collect(b" \t\r\n  \n", ScanConfig::default());
    assert!(matches!(result, Err(ScanError::NoStructuralContent)));
    assert!(offsets.is_empty());
}

#[test]
fn test_simple_object_offsets() {
    let input = br#"{"a":1}"#;
    let (result, offsets) = scan_collect(input, ScanConfig::default());
    let summary = result.unwrap();

    assert_eq!(offsets, vec![0, 1, 3, 4, 5, 6]);
    assert_eq!(summary.structural_count, 6);
    assert_eq!(summary.bytes_scanned, input.len() as u64);
}

#[test]
fn test_array_with_literals() {
    let (result, offsets) = scan_collect(b"[true, false, null, 42]", ScanConfig::default());
    assert!(result.is_ok());

    let (expected, _, _) = reference_scan(b"[true, false, null, 42]");
    assert_eq!(offsets, expected);
    // [ t , f , n , 4 ]
    assert_eq!(offsets, vec![0, 1, 5, 7, 12, 14, 18, 20, 22]);
}

#[test]
fn test_nested_document_matches_reference() {
    let input = br#"{"key": [1, 2, {"nested": "value"}], "other": true}"#;
    let (result, offsets) = scan_collect(input, ScanConfig::default());
    assert!(result.is_ok());

    let (expected, ends_in_string, control) = reference_scan(input);
    assert!(!ends_in_string);
    assert!(!control);
    assert_eq!(offsets, expected);
}

#[test]
fn test_surrounding_whitespace_ok() {
    let (result, offsets) = scan_collect(b"  \n {\"a\": []} \t ", ScanConfig::default());
    assert!(result.is_ok());
    assert_eq!(offsets, vec![4, 5, 7, 8, 10, 11, 12]);
}

// ============================================================================
// Strings and Escapes
// ============================================================================

#[test]
fn test_escaped_quote_is_not_a_terminator() {
    // {"a":"b\"c"} - the embedded \" must not close the value string.
    let input = br#"{"a":"b\"c"}"#;
    let (result, offsets) = scan_collect(input, ScanConfig::default());
    assert!(result.is_ok());
    assert_eq!(offsets, vec![0, 1, 3, 4, 5, 10, 11]);
}

#[test]
fn test_double_backslash_before_quote() {
    // {"a":"b\\"} - the quote after two backslashes does close the string.
    let input = br#"{"a":"b\\"}"#;
    let (result, offsets) = scan_collect(input, ScanConfig::default());
    assert!(result.is_ok());
    assert_eq!(offsets, vec![0, 1, 3, 4, 5, 9, 10]);
}

#[test]
fn test_structural_symbols_inside_strings_ignored() {
    let input = br#"["{}[]:,", 1]"#;
    let (result, offsets) = scan_collect(input, ScanConfig::default());
    assert!(result.is_ok());

    let (expected, _, _) = reference_scan(input);
    assert_eq!(offsets, expected);
}

#[test]
fn test_unterminated_string_suppresses_final_batch() {
    // Ends with an odd backslash run inside an open string.
    let (result, offsets) = scan_collect(b"\"abc\\", ScanConfig::default());
    assert!(matches!(result, Err(ScanError::UnterminatedString)));
    // The only batch was the final one, and it was withheld.
    assert!(offsets.is_empty());
}

#[test]
fn test_unterminated_string_across_windows() {
    // The string opens in the first window and never closes; earlier batches
    // are still published, only the final one is withheld.
    let mut input = Vec::new();
    input.extend_from_slice(b"[\"start");
    input.extend(std::iter::repeat_n(b'x', 200));

    let (result, offsets) = scan_collect(&input, small_windows());
    assert!(matches!(result, Err(ScanError::UnterminatedString)));

    let (expected, ends_in_string, _) = reference_scan(&input);
    assert!(ends_in_string);
    // Published offsets are a prefix of the reference scan.
    assert_eq!(offsets, expected[..offsets.len()]);
    assert!(offsets.contains(&0));
}

// ============================================================================
// Container Matching
// ============================================================================

#[test]
fn test_mismatched_container_object_closed_by_bracket() {
    let (result, _) = scan_collect(br#"{"a":1]"#, ScanConfig::default());
    match result {
        Err(ScanError::MismatchedContainer { opening, closing }) => {
            assert_eq!(opening, b'{');
            assert_eq!(closing, b']');
        }
        other => panic!("expected MismatchedContainer, got {:?}", other),
    }
}

#[test]
fn test_mismatched_container_array_closed_by_brace() {
    let (result, _) = scan_collect(b"[1}", ScanConfig::default());
    assert!(matches!(
        result,
        Err(ScanError::MismatchedContainer {
            opening: b'[',
            closing: b'}'
        })
    ));
}

#[test]
fn test_bare_literal_is_not_a_container() {
    let (result, _) = scan_collect(b"7", ScanConfig::default());
    assert!(matches!(
        result,
        Err(ScanError::MismatchedContainer {
            opening: b'7',
            closing: b'7'
        })
    ));
}

#[test]
fn test_bare_string_is_not_a_container() {
    let (result, _) = scan_collect(br#""abc""#, ScanConfig::default());
    assert!(matches!(
        result,
        Err(ScanError::MismatchedContainer {
            opening: b'"',
            closing: b'"'
        })
    ));
}

#[test]
fn test_both_container_kinds_match() {
    assert!(scan_collect(b"{}", ScanConfig::default()).0.is_ok());
    assert!(scan_collect(b"[]", ScanConfig::default()).0.is_ok());
}

// ============================================================================
// Encoding Validation
// ============================================================================

#[test]
fn test_invalid_utf8_is_fatal() {
    let input = [b'[', 0xFF, b'1', b']'];
    let (result, _) = scan_collect(&input, ScanConfig::default());
    assert!(matches!(
        result,
        Err(ScanError::InvalidEncoding { offset: 1 })
    ));
}

#[test]
fn test_truncated_multibyte_at_end_is_fatal() {
    // First two bytes of a three-byte sequence, then end of input.
    let input = [b'[', b'"', 0xE2, 0x82];
    let (result, _) = scan_collect(&input, ScanConfig::default());
    assert!(matches!(
        result,
        Err(ScanError::InvalidEncoding { offset: 2 })
    ));
}

#[test]
fn test_multibyte_spanning_window_boundary() {
    // Position a three-byte character so it straddles the 64-byte window
    // edge; the watermark defers validation to the next window.
    let mut input = Vec::new();
    input.extend_from_slice(b"[\"");
    input.extend(std::iter::repeat_n(b'a', 61)); // next byte lands at offset 63
    input.extend_from_slice("€\"]".as_bytes());
    assert_eq!(&input[63..66], "€".as_bytes());

    let (result, offsets) = scan_collect(&input, small_windows());
    assert!(result.is_ok());
    let (expected, _, _) = reference_scan(&input);
    assert_eq!(offsets, expected);
}

#[test]
fn test_valid_multibyte_content() {
    let input = r#"{"città": "München"}"#.as_bytes();
    let (result, offsets) = scan_collect(input, ScanConfig::default());
    assert!(result.is_ok());
    let (expected, _, _) = reference_scan(input);
    assert_eq!(offsets, expected);
}

// ============================================================================
// Control Bytes
// ============================================================================

#[test]
fn test_control_byte_inside_string_fails() {
    let input = b"[\"a\x01b\"]";
    let (result, _) = scan_collect(input, ScanConfig::default());
    assert!(matches!(result, Err(ScanError::UnescapedControlByte)));
}

#[test]
fn test_control_byte_error_is_sticky_not_short_circuiting() {
    // The offending byte sits in the first window of many; later windows
    // must still be scanned and published.
    let mut input = Vec::new();
    input.extend_from_slice(b"[\"a\x02b\", ");
    for i in 0..100 {
        input.extend_from_slice(format!("{}, ", i).as_bytes());
    }
    input.extend_from_slice(b"9]");

    let (result, offsets) = scan_collect(&input, small_windows());
    assert!(matches!(result, Err(ScanError::UnescapedControlByte)));

    let (expected, _, control) = reference_scan(&input);
    assert!(control);
    // Every batch was still published; the verdict came at the end.
    assert_eq!(offsets, expected);
}

#[test]
fn test_control_whitespace_outside_string_is_fine() {
    let (result, _) = scan_collect(b"[\n\t1\r\n]", ScanConfig::default());
    assert!(result.is_ok());
}

// ============================================================================
// Carried State Across Windows
// ============================================================================

#[test]
fn test_string_spanning_windows() {
    let mut input = Vec::new();
    input.extend_from_slice(b"[\"");
    input.extend(std::iter::repeat_n(b'x', 150));
    input.extend_from_slice(b"\"]");

    let (result, offsets) = scan_collect(&input, small_windows());
    assert!(result.is_ok());
    assert_eq!(offsets, vec![0, 1, 152, 153]);
}

#[test]
fn test_backslash_run_spanning_windows() {
    // Backslash as the last byte of window one, escaped quote as the first
    // byte of window two.
    let mut input = Vec::new();
    input.push(b'[');
    input.push(b'"');
    input.extend(std::iter::repeat_n(b'y', 61));
    input.push(b'\\'); // offset 63
    input.push(b'"'); // offset 64: escaped, still inside the string
    input.extend_from_slice(b"\"]");

    let (result, offsets) = scan_collect(&input, small_windows());
    assert!(result.is_ok());
    assert_eq!(offsets, vec![0, 1, 65, 66]);
}

#[test]
fn test_literal_starting_at_window_boundary() {
    let mut input = Vec::new();
    input.push(b'[');
    input.extend(std::iter::repeat_n(b' ', 63));
    input.extend_from_slice(b"true]");

    let (result, offsets) = scan_collect(&input, small_windows());
    assert!(result.is_ok());
    assert_eq!(offsets, vec![0, 64, 68]);
}

#[test]
fn test_offsets_strictly_increase_across_batches() {
    let input = large_doc();
    let config = ScanConfig::new(256, 8, 4).unwrap();
    let (ctx, rx) = ScanContext::new(&config).unwrap();
    let scanner = Scanner::new(config);

    std::thread::scope(|scope| {
        let checker = scope.spawn(move || {
            let mut prev: Option<u64> = None;
            let mut batches = 0u64;
            for batch in rx {
                for offset in batch.iter() {
                    assert!(prev.is_none_or(|p| offset > p), "offsets must increase");
                    prev = Some(offset);
                }
                batches += 1;
            }
            batches
        });

        let summary = scanner.scan(&input, ctx).unwrap();
        let batches = checker.join().unwrap();
        assert_eq!(summary.batches, batches);
        assert!(batches > 1, "document must span multiple windows");
    });
}

// ============================================================================
// Pipeline and Concurrency
// ============================================================================

fn large_doc() -> Vec<u8> {
    let mut items = Vec::new();
    for i in 0..500 {
        items.push(serde_json::json!({
            "id": i,
            "name": format!("item-{i}"),
            "tags": ["plain", "back\\slash", "quo\"te"],
            "active": i % 2 == 0,
            "nested": {"x": [1, 2, 3], "y": null}
        }));
    }
    serde_json::to_vec(&serde_json::Value::Array(items)).unwrap()
}

#[test]
fn test_pipeline_matches_reference_on_generated_document() {
    let input = large_doc();
    let (expected, _, _) = reference_scan(&input);

    let pipeline = scan_pipeline(Bytes::from(input.clone()), ScanConfig::default()).unwrap();
    let mut offsets = Vec::new();
    for batch in pipeline.batches() {
        offsets.extend(batch.iter());
    }
    let summary = pipeline.join().unwrap();

    assert_eq!(offsets, expected);
    assert_eq!(summary.structural_count, expected.len() as u64);
    assert_eq!(summary.bytes_scanned, input.len() as u64);
}

#[test]
fn test_slow_consumer_never_corrupts_offsets() {
    let input = large_doc();
    let (expected, _, _) = reference_scan(&input);

    // Tight pipeline: small windows, shallow pool, capacity below depth.
    let config = ScanConfig::new(512, 4, 2).unwrap();
    let pipeline = scan_pipeline(Bytes::from(input), config).unwrap();

    let mut offsets = Vec::new();
    for (i, batch) in pipeline.batches().iter().enumerate() {
        if i % 16 == 0 {
            std::thread::sleep(std::time::Duration::from_micros(200));
        }
        offsets.extend(batch.iter());
    }
    let summary = pipeline.join().unwrap();

    assert_eq!(offsets, expected);
    assert_eq!(summary.structural_count, expected.len() as u64);
}

#[test]
fn test_held_batches_fall_back_to_fresh_allocations() {
    // Hold every batch alive so nothing is recycled; offsets must still be
    // correct because exhausted claims allocate instead of aliasing.
    let input = large_doc();
    let (expected, _, _) = reference_scan(&input);

    let config = ScanConfig::new(512, 4, 4).unwrap();
    let pipeline = scan_pipeline(Bytes::from(input), config).unwrap();

    let mut held = Vec::new();
    for batch in pipeline.batches() {
        held.push(batch);
    }
    assert!(pipeline.join().is_ok());

    let mut offsets = Vec::new();
    for batch in &held {
        offsets.extend(batch.iter());
    }
    assert_eq!(offsets, expected);
}

#[test]
fn test_context_pool_tracks_claims_and_recycling() {
    let config = ScanConfig::new(64, 4, 2).unwrap();
    let (ctx, rx) = ScanContext::new(&config).unwrap();
    let pool = Arc::clone(ctx.pool());
    assert_eq!(pool.claims(), 0);
    assert_eq!(pool.available(), pool.depth());

    let mut input = Vec::new();
    input.push(b'[');
    while input.len() < 300 {
        input.extend_from_slice(b"1234, ");
    }
    input.extend_from_slice(b"1]");
    let windows = input.len().div_ceil(64) as u64;

    let scanner = Scanner::new(config);
    let result = std::thread::scope(|scope| {
        let collector = scope.spawn(move || rx.iter().count());
        let result = scanner.scan(&input, ctx);
        collector.join().unwrap();
        result
    });
    assert!(result.is_ok());

    // One claim per scanned window, and every buffer back home once the
    // consumer has dropped its batches.
    assert_eq!(pool.claims(), windows);
    assert_eq!(pool.available(), pool.depth());
}

// ============================================================================
// Round-Trip Property
// ============================================================================

#[derive(Clone, Debug)]
struct JsonishDoc(Vec<u8>);

impl Arbitrary for JsonishDoc {
    fn arbitrary(g: &mut Gen) -> Self {
        const ALPHABET: &[u8] = b"{}[]:,\"\\ \t\nabc123truefalsnul.-";
        let len = usize::arbitrary(g) % 300;
        JsonishDoc(
            (0..len)
                .map(|_| *g.choose(ALPHABET).unwrap_or(&b' '))
                .collect(),
        )
    }
}

#[quickcheck]
fn prop_published_offsets_match_reference(doc: JsonishDoc) -> bool {
    let (expected, ends_in_string, _) = reference_scan(&doc.0);
    let (result, offsets) = scan_collect(&doc.0, small_windows());

    // Published offsets are always an in-order prefix of the reference scan;
    // only an unterminated string may withhold the tail, and a successful
    // scan must reproduce the reference exactly.
    let prefix_ok = offsets.len() <= expected.len() && offsets == expected[..offsets.len()];
    let complete_ok = ends_in_string || offsets == expected;
    let success_ok = result.is_err() || offsets == expected;

    prefix_ok && complete_ok && success_ok
}
