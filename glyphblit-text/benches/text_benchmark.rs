use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use glyphblit_core::{CharacterCode, FontId};
use glyphblit_text::{decode, BitmapFontSet, EncodingConverter, FontRegistry, FontSource};

const MIXED: &str = "诸葛高   皇甫杰   魑魅魍魉 Hello, glyphblit! 啊啊啊";

fn bench_convert_short(c: &mut Criterion) {
    let conv = EncodingConverter::new("utf-8", "gb2312").unwrap();

    c.bench_function("convert_utf8_to_gb2312", |b| {
        b.iter(|| conv.convert_to_fit(black_box(MIXED.as_bytes())));
    });
}

fn bench_convert_fixed_capacity(c: &mut Criterion) {
    let conv = EncodingConverter::new("utf-8", "gb2312").unwrap();
    let mut out = vec![0u8; 255];

    c.bench_function("convert_into_255", |b| {
        b.iter(|| conv.convert_into(black_box(MIXED.as_bytes()), &mut out));
    });
}

fn bench_decode(c: &mut Criterion) {
    let conv = EncodingConverter::new("utf-8", "gb2312").unwrap();
    let gbk = conv.convert_to_fit(MIXED.repeat(16).as_bytes()).unwrap();

    c.bench_function("decode_code_units", |b| {
        b.iter(|| decode(black_box(&gbk)).count());
    });
}

fn bench_glyph_lookup(c: &mut Criterion) {
    let mut registry = FontRegistry::new();
    registry.register(FontId(1), BitmapFontSet::placeholder(16, 16, 8));

    c.bench_function("glyph_lookup", |b| {
        let mut code = 0xB0A1u16;
        b.iter(|| {
            code = code.wrapping_add(1) | 0x8000;
            registry.glyph_bitmap(FontId(1), black_box(CharacterCode::Double(code)))
        });
    });
}

criterion_group!(
    benches,
    bench_convert_short,
    bench_convert_fixed_capacity,
    bench_decode,
    bench_glyph_lookup
);
criterion_main!(benches);
