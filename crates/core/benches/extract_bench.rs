//! Benchmarks for document loading and end-to-end text extraction.
//!
//! Documents are generated in memory so the numbers track parsing and
//! interpretation cost, not disk reads.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::io::Write;

use bytes::Bytes;
use gleaner_core::document::Document;
use gleaner_core::extract::extract_text;

/// Assembles a one-generation PDF: bodies become objects numbered from 1,
/// followed by a classic xref table and a trailer naming object 1 as the
/// catalog.
fn build_pdf(objects: &[Vec<u8>]) -> Vec<u8> {
    let mut data = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::new();
    for (i, body) in objects.iter().enumerate() {
        offsets.push(data.len());
        data.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
        data.extend_from_slice(body);
        data.extend_from_slice(b"\nendobj\n");
    }
    let xref_at = data.len();
    data.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    data.extend_from_slice(b"0000000000 65535 f \n");
    for off in &offsets {
        data.extend_from_slice(format!("{off:010} 00000 n \n").as_bytes());
    }
    data.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
            objects.len() + 1
        )
        .as_bytes(),
    );
    data
}

/// Forty lines of text per page, shown with `Tj` and `Td` line moves.
fn page_content(page: usize) -> String {
    let mut content = String::from("BT /F1 12 Tf 72 720 Td ");
    for line in 0..40 {
        content.push_str(&format!(
            "(Page {page} line {line} with a plausible amount of words) Tj 0 -14 Td "
        ));
    }
    content.push_str("ET");
    content
}

/// A document with `pages` pages, optionally flate-compressing the content.
fn generate(pages: usize, compress: bool) -> Bytes {
    let font_id = 3 + 2 * pages;
    let mut objects = vec![b"<< /Type /Catalog /Pages 2 0 R >>".to_vec()];
    let kids = (0..pages)
        .map(|i| format!("{} 0 R", 3 + i))
        .collect::<Vec<_>>()
        .join(" ");
    objects.push(
        format!("<< /Type /Pages /Kids [{kids}] /Count {pages} >>").into_bytes(),
    );
    for i in 0..pages {
        objects.push(
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
                 /Resources << /Font << /F1 {font_id} 0 R >> >> /Contents {} 0 R >>",
                3 + pages + i
            )
            .into_bytes(),
        );
    }
    for i in 0..pages {
        let content = page_content(i);
        let (body, extra) = if compress {
            let mut enc = flate2::write::ZlibEncoder::new(
                Vec::new(),
                flate2::Compression::default(),
            );
            enc.write_all(content.as_bytes()).unwrap();
            (enc.finish().unwrap(), " /Filter /FlateDecode")
        } else {
            (content.into_bytes(), "")
        };
        let mut object =
            format!("<< /Length {}{extra} >>\nstream\n", body.len()).into_bytes();
        object.extend_from_slice(&body);
        object.extend_from_slice(b"\nendstream");
        objects.push(object);
    }
    objects.push(b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_vec());
    Bytes::from(build_pdf(&objects))
}

/// Document initialization: xref parsing, trailer, and catalog lookup.
fn bench_document_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("document_load");
    for pages in [1usize, 16, 64] {
        let data = generate(pages, false);
        group.bench_with_input(BenchmarkId::from_parameter(pages), &data, |b, data| {
            b.iter(|| Document::load(black_box(data.clone())).unwrap())
        });
    }
    group.finish();
}

/// Full pipeline: load, interpret every page, accumulate text.
fn bench_extract_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_text");
    for pages in [1usize, 16, 64] {
        let data = generate(pages, false);
        group.bench_with_input(BenchmarkId::from_parameter(pages), &data, |b, data| {
            b.iter(|| extract_text(black_box(data.clone())).unwrap())
        });
    }
    group.finish();
}

/// The same pipeline over flate-compressed content streams.
fn bench_extract_compressed(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_text_flate");
    let data = generate(16, true);
    group.bench_function("16_pages", |b| {
        b.iter(|| extract_text(black_box(data.clone())).unwrap())
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_document_load,
    bench_extract_text,
    bench_extract_compressed
);
criterion_main!(benches);
