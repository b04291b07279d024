use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::hint::black_box;
use std::io::Write;
use wzimage::crypto::encrypt_blocks;
use wzimage::{decode_pixels, generate_keystream, PixelFormat, WzDecoder};

fn canvas_bytes(size: usize) -> Vec<u8> {
    (0..size).map(|i| ((i * 31) ^ (i >> 5)) as u8).collect()
}

fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("Compression failed");
    encoder.finish().expect("Compression failed")
}

fn pixel_formats(c: &mut Criterion) {
    let mut group = c.benchmark_group("pixel_formats");
    let (width, height) = (256u32, 256u32);

    for format in PixelFormat::ALL {
        let raw = canvas_bytes(format.raw_size(width, height).expect("Canvas size failed"));
        group.throughput(Throughput::Elements(u64::from(width * height)));
        group.bench_with_input(BenchmarkId::from_parameter(format.name()), &raw, |b, raw| {
            b.iter(|| decode_pixels(black_box(raw), width, height, format))
        });
    }

    group.finish();
}

fn keystream(c: &mut Criterion) {
    let mut group = c.benchmark_group("keystream");

    for length in [4096usize, 65536] {
        group.throughput(Throughput::Bytes(length as u64));
        group.bench_with_input(BenchmarkId::from_parameter(length), &length, |b, &length| {
            b.iter(|| generate_keystream(black_box([0x4D, 0x23, 0xC7, 0x2B]), length))
        });
    }

    group.finish();
}

fn full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_pipeline");
    let decoder = WzDecoder::default();

    for side in [64u32, 256, 1024] {
        let raw = canvas_bytes(
            PixelFormat::Bgra8888
                .raw_size(side, side)
                .expect("Canvas size failed"),
        );
        let plain = zlib(&raw);
        let encrypted = encrypt_blocks(&plain, decoder.keystream(), 8192);

        group.throughput(Throughput::Elements(u64::from(side * side)));
        group.bench_with_input(BenchmarkId::new("plain", side), &plain, |b, payload| {
            b.iter(|| decoder.decode_raw(black_box(payload), side, side, Some(2)))
        });
        group.bench_with_input(BenchmarkId::new("encrypted", side), &encrypted, |b, payload| {
            b.iter(|| decoder.decode_raw(black_box(payload), side, side, Some(2)))
        });
        group.bench_with_input(BenchmarkId::new("inferred_png", side), &plain, |b, payload| {
            b.iter(|| {
                decoder
                    .decode_raw(black_box(payload), side, side, None)
                    .and_then(|image| image.to_png())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, pixel_formats, keystream, full_pipeline);
criterion_main!(benches);
