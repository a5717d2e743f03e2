//! Decode throughput on a synthetic image.
//!
//! The image is built in memory, a flat grayscale frame whose
//! blocks are all DC-only, so the bench needs no fixture files.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lumo_jpeg::JpegDecoder;

fn segment(marker: u8, payload: &[u8]) -> Vec<u8>
{
    let mut out = vec![0xFF, marker];

    out.extend(u16::try_from(payload.len() + 2).unwrap().to_be_bytes());
    out.extend(payload);
    out
}

/// A `width` x `height` grayscale image, every block a zero DC
/// differential followed by EOB.
fn build_flat_grayscale(width: u16, height: u16) -> Vec<u8>
{
    assert_eq!(width % 8, 0);
    assert_eq!(height % 8, 0);

    let blocks = usize::from(width / 8) * usize::from(height / 8);

    // each block is two zero bits, so four blocks pack per byte
    assert_eq!(blocks % 4, 0);

    let entropy = vec![0_u8; blocks / 4];

    let mut dqt = vec![0_u8];
    dqt.extend([16_u8; 64]);

    // DC table: '0' encodes a zero-bit differential
    let mut dc_payload = vec![0x00_u8];
    dc_payload.push(1);
    dc_payload.extend([0_u8; 15]);
    dc_payload.push(0x00);

    // AC table: '0' is EOB
    let mut ac_payload = vec![0x10_u8];
    ac_payload.push(1);
    ac_payload.extend([0_u8; 15]);
    ac_payload.push(0x00);

    let mut sof_payload = vec![8_u8];
    sof_payload.extend(height.to_be_bytes());
    sof_payload.extend(width.to_be_bytes());
    sof_payload.extend([1, 1, 0x11, 0]);

    let mut out = vec![0xFF, 0xD8];

    out.extend(segment(0xDB, &dqt));
    out.extend(segment(0xC0, &sof_payload));
    out.extend(segment(0xC4, &dc_payload));
    out.extend(segment(0xC4, &ac_payload));
    out.extend(segment(0xDA, &[1, 1, 0x00, 0, 63, 0]));
    out.extend(entropy);
    out.extend([0xFF, 0xD9]);

    out
}

fn criterion_benchmark(c: &mut Criterion)
{
    let data = build_flat_grayscale(256, 256);

    c.bench_function("decode 256x256 grayscale to rgb", |b| {
        b.iter(|| {
            let mut decoder = JpegDecoder::new(black_box(&data));

            decoder.decode().unwrap()
        });
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
