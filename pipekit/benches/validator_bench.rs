//! Benchmarks for message validation and property stores.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use pipekit::document::PropertyStore;
use pipekit::testing::{MessageBuilder, PipelineResultValidator};
use serde_json::json;

const NS: &str = "urn:bench";

fn validator_benchmark(c: &mut Criterion) {
    let body = "<Order>".to_string() + &"<Line/>".repeat(500) + "</Order>";
    let validator = PipelineResultValidator::new()
        .assert_part_count(2)
        .assert_part_order(&["body", "trailer"])
        .and_then(|v| v.assert_part_content_type("body", "text/xml"))
        .and_then(|v| v.assert_part_stream("body", body.clone()))
        .and_then(|v| v.assert_part_stream_matches("trailer", r"^\d+$"))
        .and_then(|v| v.assert_property("MessageType", NS, json!("urn:acme#Order")))
        .map(PipelineResultValidator::assert_unexpected_parts)
        .expect("benchmark validator configuration is valid");

    c.bench_function("validate_two_part_message", |b| {
        b.iter_batched(
            || {
                MessageBuilder::new()
                    .part("body", "text/xml", body.as_bytes(), true)
                    .text_part("trailer", "text/plain", "500")
                    .promoted("MessageType", NS, json!("urn:acme#Order"))
                    .build()
            },
            |mut msg| black_box(validator.validate(&mut msg).is_ok()),
            BatchSize::SmallInput,
        );
    });
}

fn property_store_benchmark(c: &mut Criterion) {
    c.bench_function("property_store_write_read_100", |b| {
        b.iter(|| {
            let mut store = PropertyStore::new();
            for i in 0..100 {
                store.write(format!("p{i}"), NS, json!(i));
            }
            black_box(store.read("p50", NS).cloned())
        });
    });
}

criterion_group!(benches, validator_benchmark, property_store_benchmark);
criterion_main!(benches);
