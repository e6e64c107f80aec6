//! Criterion benchmarks for signing and verification.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use hsu::{Config, Hsu, MemorySession, SignableUrl, digest};

const URLS: [(&str, &str); 4] = [
    ("path_only", "/reset"),
    ("typical", "/reset?user=42"),
    ("many_params", "/search?q=npm+hsu&page=2&sort=desc&lang=en&region=au&safe=1"),
    (
        "absolute",
        "https://www.google.com.au/webhp?sourceid=chrome-instant&ion=1&espv=2&ie=UTF-8#q=npm+hsu",
    ),
];

/// Benchmark: raw HMAC digest over canonical strings of growing length
fn bench_digest(c: &mut Criterion) {
    let mut group = c.benchmark_group("digest");

    for len in [16usize, 128, 1024] {
        let canonical = format!("/{}", "a".repeat(len));
        group.throughput(Throughput::Bytes(canonical.len() as u64));
        group.bench_with_input(BenchmarkId::new("len", len), &canonical, |b, canonical| {
            b.iter(|| digest(black_box("saltsaltsaltsaltsalt"), black_box(b"s3cr3t"), canonical));
        });
    }

    group.finish();
}

/// Benchmark: parse and canonicalize
fn bench_canonicalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("canonicalize");

    for (name, url) in URLS {
        group.throughput(Throughput::Bytes(url.len() as u64));
        group.bench_with_input(BenchmarkId::new("url", name), &url, |b, url| {
            b.iter(|| SignableUrl::parse(black_box(url)).map(|u| u.canonicalize(&["signature"])));
        });
    }

    group.finish();
}

/// Benchmark: full sign and verify through a scope
fn bench_sign_verify(c: &mut Criterion) {
    let hsu = Hsu::new(Config::new("s3cr3t").unwrap()).unwrap();
    let scope = hsu.scope("bench").unwrap();
    let mut group = c.benchmark_group("scope");

    for (name, url) in URLS {
        group.bench_with_input(BenchmarkId::new("sign", name), &url, |b, url| {
            let mut session = MemorySession::new();
            b.iter(|| scope.setup(&mut session).sign(black_box(url)));
        });

        let mut session = MemorySession::new();
        let link = scope.setup(&mut session).sign(url).unwrap();
        group.bench_with_input(BenchmarkId::new("verify", name), &link, |b, link| {
            b.iter(|| scope.verify(&session, black_box(link.as_str())));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_digest, bench_canonicalize, bench_sign_verify);
criterion_main!(benches);
