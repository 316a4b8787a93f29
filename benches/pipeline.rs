//! Benchmarks for the mipa image pipeline.

use std::fs;
use std::path::PathBuf;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mipa::parser::{parse_palette, parse_script};
use mipa::process::{extract_median_cut, extract_simple};
use mipa::{BuiltinMatrices, Colour, ColourStrategy, Image, Picker, Quantizer, Sparsity};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn load_fixture(name: &str) -> String {
    fs::read_to_string(fixtures_dir().join(name)).unwrap()
}

/// 128x128 image with every channel varying.
fn gradient_image() -> Image {
    Image::from_fn(128, 128, |x, y| {
        let colour = Colour::rgb(
            ((x * 2) % 256) as u8,
            ((y * 2) % 256) as u8,
            (((x + y) * 3) % 256) as u8,
        );
        image::Rgba(colour.to_rgba())
    })
}

// -- Parsing benchmarks --

fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");

    let palette_source = load_fixture("primaries.palette");
    let mut script = String::new();
    for i in 0..50 {
        script.push_str(&format!(
            "p{i} = palette(#102030, rgb({i}, 20, 30)).gradient(#ffffff, 4)\n\
             q{i} = dither_ord(\"bayer4\", 8, 0.5)\n"
        ));
    }

    group.bench_function("parse_palette", |b| {
        b.iter(|| parse_palette(black_box(&palette_source)).unwrap())
    });

    group.bench_function("parse_script", |b| {
        b.iter(|| parse_script(black_box(&script)).unwrap())
    });

    group.finish();
}

// -- Extraction benchmarks --

fn bench_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extraction");
    let image = gradient_image();

    group.bench_function("extract_simple", |b| {
        b.iter(|| extract_simple(black_box(&image), 3, true))
    });

    group.bench_function("extract_median_cut", |b| {
        b.iter(|| extract_median_cut(black_box(&image), 4, false))
    });

    group.finish();
}

// -- Quantization benchmarks --

fn bench_quantization(c: &mut Criterion) {
    let mut group = c.benchmark_group("quantization");

    let image = gradient_image();
    let palette = parse_palette(&load_fixture("primaries.palette")).unwrap();
    let strategy = ColourStrategy::closest(palette, Picker::Rgb);

    let direct = Quantizer::Direct;
    let ordered = Quantizer::ordered(
        BuiltinMatrices::get("bayer4").unwrap(),
        Sparsity::Auto { fallback: 3.0 },
        1.0,
    );
    let fs = Quantizer::floyd_steinberg(1.0);

    for (name, quantizer) in [("quantize_direct", &direct), ("dither_ordered", &ordered), ("dither_floyd_steinberg", &fs)] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut out = image.clone();
                quantizer.apply(black_box(&mut out), &strategy);
                out
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parsing, bench_extraction, bench_quantization);
criterion_main!(benches);
