use std::hint::black_box;
use std::io::{self, Write};

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use hexpipe_codec::{DumpConfig, FormatConfig, HexDumper, HexEncoder, HexFormatter, can_encode_to, encode_to_string};

fn payload(len: usize) -> Vec<u8> { (0..len).map(|i| (i * 31 + 7) as u8).collect() }

fn bench_encoder(c: &mut Criterion) {
    let mut group = c.benchmark_group("hex_encoder");
    for size in [64usize, 4 * 1024, 256 * 1024] {
        let data = payload(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("stream", size), &data, |b, data| {
            b.iter(|| {
                let mut enc = HexEncoder::new(io::sink(), false);
                enc.write_all(black_box(data)).unwrap();
                enc.close().unwrap();
            })
        });
    }
    group.finish();
}

fn bench_formatter(c: &mut Criterion) {
    let data = payload(64 * 1024);
    let cfg = FormatConfig::new().sep(" ").block_len(4);
    let mut group = c.benchmark_group("hex_formatter");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("blocked", |b| {
        b.iter(|| {
            let mut f = HexFormatter::new(io::sink(), &cfg);
            f.write_all(black_box(&data)).unwrap();
            f.close().unwrap();
        })
    });
    group.bench_function("dump_canonical", |b| {
        b.iter(|| {
            let mut d = HexDumper::new(io::sink(), hexpipe_codec::canonical(false));
            d.write_all(black_box(&data)).unwrap();
            d.close().unwrap();
        })
    });
    group.bench_function("dump_plain_lines", |b| {
        b.iter(|| {
            let cfg = DumpConfig::new(cfg.clone()).blocks_per_line(8).line_sep("\n");
            let mut d = HexDumper::new(io::sink(), cfg);
            d.write_all(black_box(&data)).unwrap();
            d.close().unwrap();
        })
    });
    group.finish();
}

fn bench_compare(c: &mut Criterion) {
    let digest = payload(32);
    let hex = encode_to_string(&digest, true);
    c.bench_function("can_encode_to_sha256", |b| {
        b.iter(|| can_encode_to(black_box(&digest), black_box(hex.as_bytes())))
    });
}

criterion_group!(benches, bench_encoder, bench_formatter, bench_compare);
criterion_main!(benches);
