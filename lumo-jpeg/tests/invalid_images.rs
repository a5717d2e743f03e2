//! Malformed and unsupported streams must be rejected with the
//! right error, never mis-decoded.

mod common;

use common::{
    assemble, dht, dqt, eoi, segment, soi, sos, sof, sof0, test_ac_table, test_dc_table,
    BitWriter
};
use lumo_jpeg::errors::{DecodeErrors, UnsupportedSchemes};
use lumo_jpeg::JpegDecoder;

#[test]
fn progressive_images_are_rejected_before_entropy_decode()
{
    // SOF2 declares progressive DCT; rejection happens while parsing
    // headers, no scan data is even present
    let data = assemble(&[
        soi(),
        dqt(0, &[16; 64]),
        sof(0xC2, 8, 8, 8, &[(1, 1, 1, 0)])
    ]);

    let err = JpegDecoder::new(&data).decode().unwrap_err();

    assert!(
        matches!(
            err,
            DecodeErrors::Unsupported(UnsupportedSchemes::ProgressiveDctHuffman)
        ),
        "{err:?}"
    );
}

#[test]
fn extended_sequential_images_are_rejected()
{
    let data = assemble(&[soi(), sof(0xC1, 8, 8, 8, &[(1, 1, 1, 0)])]);

    let err = JpegDecoder::new(&data).decode().unwrap_err();

    assert!(matches!(
        err,
        DecodeErrors::Unsupported(UnsupportedSchemes::ExtendedSequentialHuffman)
    ));
}

#[test]
fn restart_intervals_are_rejected()
{
    let data = assemble(&[
        soi(),
        segment(0xDD, &4_u16.to_be_bytes()), // DRI, interval 4
        dqt(0, &[16; 64])
    ]);

    let err = JpegDecoder::new(&data).decode().unwrap_err();

    assert!(matches!(
        err,
        DecodeErrors::Unsupported(UnsupportedSchemes::RestartIntervals)
    ));
}

#[test]
fn twelve_bit_precision_is_rejected()
{
    let data = assemble(&[soi(), sof(0xC0, 12, 8, 8, &[(1, 1, 1, 0)])]);

    let err = JpegDecoder::new(&data).decode().unwrap_err();

    assert!(matches!(
        err,
        DecodeErrors::Unsupported(UnsupportedSchemes::SamplePrecision(12))
    ));
}

#[test]
fn four_component_images_are_rejected()
{
    let data = assemble(&[
        soi(),
        sof0(8, 8, &[(1, 1, 1, 0), (2, 1, 1, 0), (3, 1, 1, 0), (4, 1, 1, 0)])
    ]);

    let err = JpegDecoder::new(&data).decode().unwrap_err();

    assert!(matches!(
        err,
        DecodeErrors::Unsupported(UnsupportedSchemes::ComponentCount(4))
    ));
}

#[test]
fn zero_dimensions_are_rejected()
{
    let data = assemble(&[soi(), sof0(0, 8, &[(1, 1, 1, 0)])]);

    let err = JpegDecoder::new(&data).decode().unwrap_err();

    assert!(matches!(err, DecodeErrors::MalformedSegment(_)), "{err:?}");
}

#[test]
fn bad_marker_byte_in_headers()
{
    // 0xFF 0x01 is not a marker
    let data = assemble(&[soi(), vec![0xFF, 0x01]]);

    let err = JpegDecoder::new(&data).decode().unwrap_err();

    assert!(
        matches!(
            err,
            DecodeErrors::BadMarker {
                marker: 0x01,
                offset: 3
            }
        ),
        "{err:?}"
    );
}

#[test]
fn truncated_header_segment()
{
    // DQT declares 67 bytes but the file ends after 3
    let data = assemble(&[soi(), vec![0xFF, 0xDB, 0x00, 0x43, 0x00]]);

    let err = JpegDecoder::new(&data).decode().unwrap_err();

    assert!(matches!(err, DecodeErrors::TruncatedInput { .. }), "{err:?}");
}

#[test]
fn huffman_counts_above_256_are_rejected()
{
    let data = assemble(&[
        soi(),
        dht(0, 0, &[17; 16], &[]) // 272 symbols cannot exist
    ]);

    let err = JpegDecoder::new(&data).decode().unwrap_err();

    assert!(
        matches!(err, DecodeErrors::MalformedHuffmanTable(_)),
        "{err:?}"
    );
}

#[test]
fn huffman_counts_exceeding_segment_length_are_rejected()
{
    // ten symbols declared, none present in the segment
    let data = assemble(&[soi(), dht(0, 0, &[10, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0], &[])]);

    let err = JpegDecoder::new(&data).decode().unwrap_err();

    assert!(
        matches!(err, DecodeErrors::MalformedHuffmanTable(_)),
        "{err:?}"
    );
}

#[test]
fn degenerate_huffman_tree_is_rejected()
{
    // two one-bit codes use the whole code space, which canonical
    // Huffman forbids
    let data = assemble(&[
        soi(),
        dht(0, 0, &[2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0], &[0x00, 0x01])
    ]);

    let err = JpegDecoder::new(&data).decode().unwrap_err();

    assert!(
        matches!(err, DecodeErrors::MalformedHuffmanTable(_)),
        "{err:?}"
    );
}

fn gray_image_parts() -> (Vec<u8>, Vec<u8>)
{
    let mut bits = BitWriter::new();
    bits.put_bits(0b0, 1);
    bits.put_bits(0b0, 1);

    let headers = assemble(&[
        soi(),
        dqt(0, &[16; 64]),
        sof0(8, 8, &[(1, 1, 1, 0)]),
        test_dc_table(),
        test_ac_table(),
        sos(&[(1, 0, 0)])
    ]);

    (headers, bits.finish())
}

#[test]
fn empty_entropy_stream_is_truncated()
{
    let (headers, _) = gray_image_parts();

    let err = JpegDecoder::new(&headers).decode().unwrap_err();

    assert!(
        matches!(err, DecodeErrors::TruncatedBitstream { .. }),
        "{err:?}"
    );
}

#[test]
fn missing_eoi_is_truncated_input()
{
    let (headers, entropy) = gray_image_parts();
    let data = assemble(&[headers, entropy]);

    let err = JpegDecoder::new(&data).decode().unwrap_err();

    assert!(matches!(err, DecodeErrors::TruncatedInput { .. }), "{err:?}");
}

#[test]
fn stray_restart_marker_after_scan_is_rejected()
{
    let (headers, entropy) = gray_image_parts();
    let data = assemble(&[headers, entropy, vec![0xFF, 0xD0], eoi()]);

    let err = JpegDecoder::new(&data).decode().unwrap_err();

    assert!(
        matches!(
            err,
            DecodeErrors::Unsupported(UnsupportedSchemes::RestartIntervals)
        ),
        "{err:?}"
    );
}

#[test]
fn missing_quantization_table()
{
    let mut bits = BitWriter::new();
    bits.put_bits(0b0, 1);
    bits.put_bits(0b0, 1);

    let data = assemble(&[
        soi(),
        sof0(8, 8, &[(1, 1, 1, 0)]),
        test_dc_table(),
        test_ac_table(),
        sos(&[(1, 0, 0)]),
        bits.finish(),
        eoi()
    ]);

    let err = JpegDecoder::new(&data).decode().unwrap_err();

    assert!(matches!(err, DecodeErrors::MalformedSegment(_)), "{err:?}");
}

#[test]
fn missing_huffman_table()
{
    let mut bits = BitWriter::new();
    bits.put_bits(0b0, 1);
    bits.put_bits(0b0, 1);

    // no AC table is ever defined
    let data = assemble(&[
        soi(),
        dqt(0, &[16; 64]),
        sof0(8, 8, &[(1, 1, 1, 0)]),
        test_dc_table(),
        sos(&[(1, 0, 0)]),
        bits.finish(),
        eoi()
    ]);

    let err = JpegDecoder::new(&data).decode().unwrap_err();

    assert!(matches!(err, DecodeErrors::MalformedSegment(_)), "{err:?}");
}

#[test]
fn runaway_zero_run_overflows_the_block()
{
    // DC 0 then four ZRL symbols, driving the coefficient index to 65
    let mut bits = BitWriter::new();

    bits.put_bits(0b0, 1);
    for _ in 0..4
    {
        bits.put_bits(0b10, 2);
    }

    let data = assemble(&[
        soi(),
        dqt(0, &[16; 64]),
        sof0(8, 8, &[(1, 1, 1, 0)]),
        test_dc_table(),
        test_ac_table(),
        sos(&[(1, 0, 0)]),
        bits.finish(),
        eoi()
    ]);

    let err = JpegDecoder::new(&data).decode().unwrap_err();

    assert!(matches!(err, DecodeErrors::BlockOverflow { .. }), "{err:?}");
}

#[test]
fn scan_must_cover_every_frame_component()
{
    let data = assemble(&[
        soi(),
        dqt(0, &[16; 64]),
        sof0(16, 16, &[(1, 2, 2, 0), (2, 1, 1, 0), (3, 1, 1, 0)]),
        test_dc_table(),
        test_ac_table(),
        sos(&[(1, 0, 0)])
    ]);

    let err = JpegDecoder::new(&data).decode().unwrap_err();

    assert!(matches!(err, DecodeErrors::MalformedSegment(_)), "{err:?}");
}

#[test]
fn scan_before_frame_header_is_rejected()
{
    let data = assemble(&[soi(), sos(&[(1, 0, 0)])]);

    let err = JpegDecoder::new(&data).decode().unwrap_err();

    assert!(matches!(err, DecodeErrors::FormatStatic(_)), "{err:?}");
}

#[test]
fn premature_eoi_is_rejected()
{
    let data = assemble(&[soi(), eoi()]);

    let err = JpegDecoder::new(&data).decode().unwrap_err();

    assert!(matches!(err, DecodeErrors::FormatStatic(_)), "{err:?}");
}

#[test]
fn not_a_jpeg_at_all()
{
    let err = JpegDecoder::new(b"PNG is not a jpeg").decode().unwrap_err();

    assert!(matches!(err, DecodeErrors::Format(_)), "{err:?}");
}

#[test]
fn empty_input_is_truncated()
{
    let err = JpegDecoder::new(&[]).decode().unwrap_err();

    assert!(
        matches!(err, DecodeErrors::TruncatedInput { offset: 0 }),
        "{err:?}"
    );
}
