#![no_main]

use libfuzzer_sys::fuzz_target;
use structrs::{ScanConfig, ScanContext, Scanner};

/// Byte-at-a-time reference for the structural character rules.
fn reference_scan(input: &[u8]) -> (Vec<u64>, bool) {
    let mut out = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    let mut pred = true;

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

        let ws = matches!(b, b' ' | b'\t' | b'\n' | b'\r');
        let sym = matches!(b, b'{' | b'}' | b'[' | b']' | b':' | b',');
        let structural = unescaped_quote || (!in_region && sym);

        if structural || (!in_region && !ws && pred) {
            out.push(i as u64);
        }
        pred = ws || structural;
    }

    (out, in_string)
}

fuzz_target!(|data: Vec<u8>| {
    let configs = [
        ScanConfig::new(64, 2, 1).unwrap(),
        ScanConfig::new(256, 4, 4).unwrap(),
        ScanConfig::default(),
    ];

    let (expected, ends_in_string) = reference_scan(&data);

    for config in configs {
        let (ctx, rx) = ScanContext::new(&config).unwrap();
        let scanner = Scanner::new(config);

        let (result, offsets) = std::thread::scope(|scope| {
            let collector = scope.spawn(move || {
                let mut all: Vec<u64> = Vec::new();
                for batch in rx {
                    all.extend_from_slice(batch.offsets());
                }
                all
            });
            let result = scanner.scan(&data, ctx);
            (result, collector.join().unwrap())
        });

        // Published offsets are an in-order prefix of the reference scan.
        assert!(offsets.len() <= expected.len());
        assert_eq!(offsets, expected[..offsets.len()]);

        // Only an unterminated string may withhold the tail, and only when
        // the input survived encoding validation that far.
        if !ends_in_string && result.is_ok() {
            assert_eq!(offsets, expected);
        }

        // Offsets strictly increase and stay in bounds.
        for pair in offsets.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        if let Some(&last) = offsets.last() {
            assert!((last as usize) < data.len());
        }

        // A successful scan implies structural content was found.
        if let Ok(summary) = &result {
            assert!(summary.structural_count > 0);
            assert_eq!(summary.structural_count as usize, offsets.len());
        }
    }
});
