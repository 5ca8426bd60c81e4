use criterion::{criterion_group, criterion_main, Criterion};
use std::path::Path;

fn fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(path).unwrap()
}

fn bench_parse_simple(c: &mut Criterion) {
    let raw = fixture("simple.eml");
    c.bench_function("parse_simple_eml", |b| {
        b.iter(|| mailsift::parse_email(&raw).unwrap())
    });
}

fn bench_parse_multipart(c: &mut Criterion) {
    let raw = fixture("multipart.eml");
    let parser = mailsift::EmailParser::default();
    c.bench_function("parse_multipart_eml", |b| {
        b.iter(|| parser.parse(&raw).unwrap())
    });
}

fn bench_decode_header(c: &mut Criterion) {
    let value = "Re: =?UTF-8?Q?Caf=C3=A9_con_le=C3=B1a?= =?UTF-8?B?IG11bmRv?=";
    c.bench_function("decode_mail_header", |b| {
        b.iter(|| mailsift::parser::header::decode_mail_header(value, "us-ascii"))
    });
}

criterion_group!(
    benches,
    bench_parse_simple,
    bench_parse_multipart,
    bench_decode_header
);
criterion_main!(benches);
