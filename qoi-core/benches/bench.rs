//! One throughput group per codec path, keyed by image name. No fixture directory ships with
//! this crate, so the images are generated in-memory rather than loaded from disk.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use qoi_core::decode::DecodeContext;
use qoi_core::encode::EncodeContext;
use qoi_core::{Channels, DeltaBias, Pixel};

fn gradient(width: u32, height: u32) -> Vec<Pixel> {
    (0..height)
        .flat_map(|y| {
            (0..width).map(move |x| {
                Pixel::rgba((x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255)
            })
        })
        .collect()
}

fn test_images() -> Vec<(&'static str, u32, u32, Vec<Pixel>)> {
    vec![
        ("gradient_256x256", 256, 256, gradient(256, 256)),
        ("gradient_1024x1024", 1024, 1024, gradient(1024, 1024)),
    ]
}

fn decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for (name, width, height, pixels) in test_images() {
        let pixel_count = pixels.len();
        let mut encoded = Vec::with_capacity(pixel_count * 5);
        assert!(qoi_core::alloc_api::encode_to_vec(
            width,
            height,
            &pixels,
            Channels::Rgba,
            DeltaBias::Standard,
            &mut encoded
        ));
        let body = encoded[14..encoded.len() - 8].to_vec();

        group.throughput(Throughput::Elements(pixel_count as u64));

        group.bench_with_input(BenchmarkId::new("unchecked", name), &body, |b, body| {
            let mut output = vec![Pixel::default(); pixel_count];
            b.iter(|| {
                let mut bytes = body.iter().copied();
                unsafe {
                    DecodeContext::new().decode_to_slice_unchecked(
                        Channels::Rgba,
                        DeltaBias::Standard,
                        &mut || bytes.next(),
                        &mut output,
                    )
                }
                .unwrap();
            })
        });

        group.bench_with_input(BenchmarkId::new("checked_to_vec", name), &encoded, |b, encoded| {
            let mut output = Vec::with_capacity(pixel_count);
            b.iter(|| {
                output.clear();
                DecodeContext::decode_to_vec(encoded, DeltaBias::Standard, &mut output).unwrap();
            })
        });
    }
}

fn encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for (name, width, height, pixels) in test_images() {
        let pixel_count = pixels.len();
        group.throughput(Throughput::Elements(pixel_count as u64));

        group.bench_with_input(BenchmarkId::new("encode_to_vec", name), &pixels, |b, pixels| {
            let mut encoded = Vec::with_capacity(pixel_count * 5);
            b.iter(|| {
                encoded.clear();
                qoi_core::alloc_api::encode_to_vec(
                    width,
                    height,
                    pixels,
                    Channels::Rgba,
                    DeltaBias::Standard,
                    &mut encoded,
                )
            })
        });

        group.bench_with_input(BenchmarkId::new("encode_writer", name), &pixels, |b, pixels| {
            let mut encoded = Vec::with_capacity(pixel_count * 5);
            b.iter(|| {
                encoded.clear();
                EncodeContext::encode(
                    width,
                    height,
                    pixels,
                    Channels::Rgba,
                    DeltaBias::Standard,
                    &mut encoded,
                )
                .unwrap();
            })
        });
    }
}

criterion_group!(benches, decode, encode);
criterion_main!(benches);
