//! Minimal synchronous scan: collect every structural offset of a document.
//!
//! Run with:
//!     cargo run --example sync_scan

use structrs::{ScanConfig, ScanError, Scanner};

fn main() -> Result<(), ScanError> {
    let doc = br#"{"user": "ada", "scores": [95, 87, 100], "active": true}"#;

    let scanner = Scanner::new(ScanConfig::default());
    let offsets = scanner.scan_to_vec(doc)?;

    println!("document: {}", String::from_utf8_lossy(doc));
    println!("{} structural characters:", offsets.len());
    for offset in offsets {
        let byte = doc[offset as usize];
        println!("  {:>3}: {:?}", offset, char::from(byte));
    }
    Ok(())
}
