// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Document Round Trip Benchmark
//!
//! Measures send and receive of a generic document tree through both
//! wire formats:
//! - JSON compact write, then parse back into an empty `Node`
//! - XML write, then parse back (all leaves come back as text)
//!
//! Row count is the only size knob; each row is a small object with a
//! repeated member so the permissive array conversion path is exercised.

#![allow(clippy::uninlined_format_args)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use stowage::{Identity, JsonTransport, Node, SendOptions, Transport, XmlTransport};

fn document(rows: usize) -> Node {
    let items = (0..rows)
        .map(|i| {
            Node::object()
                .with("id", i as i64)
                .with("name", format!("row-{}", i))
                .with("ratio", i as f64 / 7.0)
                .with(
                    "tags",
                    Node::array(vec![Node::from("a"), Node::from("b"), Node::from("c")]),
                )
        })
        .collect();
    Node::object().with("rows", Node::array(items))
}

fn bench_round_trip(c: &mut Criterion, name: &str, transport: &mut dyn Transport) {
    let root = Identity::new("doc");
    let mut group = c.benchmark_group(name);
    for rows in [10usize, 100, 1000] {
        let doc = document(rows);
        let text = transport
            .send_to_string(&doc, &root, &SendOptions::new())
            .expect("send");
        group.throughput(Throughput::Bytes(text.len() as u64));

        group.bench_with_input(BenchmarkId::new("send", rows), &doc, |b, doc| {
            b.iter(|| {
                transport
                    .send_to_string(black_box(doc), &root, &SendOptions::new())
                    .expect("send")
            });
        });
        group.bench_with_input(BenchmarkId::new("receive", rows), &text, |b, text| {
            b.iter(|| {
                let mut back = Node::Undefined;
                transport
                    .receive_str(&mut back, &root, black_box(text))
                    .expect("receive");
                back
            });
        });
    }
    group.finish();
}

fn bench_json(c: &mut Criterion) {
    bench_round_trip(c, "json_round_trip", &mut JsonTransport::new());
}

fn bench_xml(c: &mut Criterion) {
    bench_round_trip(c, "xml_round_trip", &mut XmlTransport::new());
}

criterion_group!(benches, bench_json, bench_xml);
criterion_main!(benches);
