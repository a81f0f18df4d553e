//! Markup benchmarks
//!
//! Target: parse and serialize a long landing-page body in well under 1ms

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sitebuilder_markup::{parse, serialize};

fn generate_field(num_blocks: usize) -> String {
    let mut source = String::new();

    for i in 0..num_blocks {
        match i % 4 {
            0 => source.push_str(&format!(
                r#"<h1 style="text-align:center">Section {}</h1>"#,
                i
            )),
            1 => source.push_str(&format!(
                r#"<p>Build <strong>faster</strong> with <em>templates</em> &amp; <a href="https://example.com/{}">guides</a></p>"#,
                i
            )),
            2 => source.push_str(&format!(
                r##"<blockquote><span style="color:#3366ff">Quote {}</span><br>- Customer</blockquote>"##,
                i
            )),
            _ => source.push_str(&format!(
                "<h2>Feature {}</h2><p><code>npm i</code> <u>today</u></p>",
                i
            )),
        }
    }

    source
}

fn bench_parse(c: &mut Criterion) {
    let small = generate_field(8);
    let large = generate_field(400);

    c.bench_function("parse_small_field", |b| b.iter(|| parse(black_box(&small))));
    c.bench_function("parse_large_field", |b| b.iter(|| parse(black_box(&large))));
}

fn bench_serialize(c: &mut Criterion) {
    let doc = parse(&generate_field(400)).expect("benchmark input parses");

    c.bench_function("serialize_large_field", |b| {
        b.iter(|| serialize(black_box(&doc)))
    });
}

criterion_group!(benches, bench_parse, bench_serialize);
criterion_main!(benches);
