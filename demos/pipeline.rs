//! Two-stage pipeline: the producer scans on its own thread while this
//! thread plays the part of a stage-2 consumer draining batches.
//!
//! Run with:
//!     cargo run --example pipeline

use bytes::Bytes;
use structrs::{ScanConfig, ScanError, scan_pipeline};

fn main() -> Result<(), ScanError> {
    // A larger document so the scan spans several windows.
    let mut items = Vec::new();
    for i in 0..1000 {
        items.push(serde_json::json!({
            "id": i,
            "label": format!("record-{i}"),
            "values": [i, i * 2, i * 3],
        }));
    }
    let doc = serde_json::to_vec(&serde_json::Value::Array(items)).expect("serialization");
    println!("scanning {} bytes", doc.len());

    let config = ScanConfig::default()
        .with_window_bytes(4096)
        .with_pool_depth(8)
        .with_channel_capacity(8);
    let pipeline = scan_pipeline(Bytes::from(doc), config)?;

    let mut total = 0u64;
    for (i, batch) in pipeline.batches().iter().enumerate() {
        total += batch.len() as u64;
        if i < 3 {
            println!("  {}", batch);
        }
    }

    let summary = pipeline.join()?;
    assert_eq!(total, summary.structural_count);
    println!(
        "done: {} offsets in {} batches over {} bytes",
        summary.structural_count, summary.batches, summary.bytes_scanned
    );
    Ok(())
}
