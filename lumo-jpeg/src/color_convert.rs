//! Color conversion routines.
//!
//! Converts rows of level-shifted Y/Cb/Cr samples to interleaved
//! RGB using 16.16 fixed point BT.601 coefficients. The samples
//! arriving here are already in `0..=255`, Y is used directly and
//! the chroma channels are re-centered by subtracting 128.

/// 1.402 in 16.16 fixed point, Cr contribution to red
const CR_R: i32 = 91881;
/// 0.344136 in 16.16 fixed point, Cb contribution to green
const CB_G: i32 = 22554;
/// 0.714136 in 16.16 fixed point, Cr contribution to green
const CR_G: i32 = 46802;
/// 1.772 in 16.16 fixed point, Cb contribution to blue
const CB_B: i32 = 116130;

/// Limit values to 0 and 255
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp(a: i32) -> u8
{
    a.clamp(0, 255) as u8
}

/// Convert one row of Y/Cb/Cr samples into interleaved RGB.
///
/// All three input rows have the same length, chroma replication has
/// already happened upstream. `output` holds three bytes per input
/// sample.
pub(crate) fn ycbcr_to_rgb_row(y: &[i16], cb: &[i16], cr: &[i16], output: &mut [u8])
{
    for (((y, cb), cr), pix) in y
        .iter()
        .zip(cb.iter())
        .zip(cr.iter())
        .zip(output.chunks_exact_mut(3))
    {
        let y = i32::from(*y);
        let cb = i32::from(*cb) - 128;
        let cr = i32::from(*cr) - 128;

        let r = y + ((CR_R * cr) >> 16);
        let g = y - ((CB_G * cb) >> 16) - ((CR_G * cr) >> 16);
        let b = y + ((CB_B * cb) >> 16);

        pix[0] = clamp(r);
        pix[1] = clamp(g);
        pix[2] = clamp(b);
    }
}

/// Replicate one row of luma samples into gray RGB.
pub(crate) fn luma_to_rgb_row(y: &[i16], output: &mut [u8])
{
    for (y, pix) in y.iter().zip(output.chunks_exact_mut(3))
    {
        let luma = clamp(i32::from(*y));

        pix[0] = luma;
        pix[1] = luma;
        pix[2] = luma;
    }
}

#[cfg(test)]
mod tests
{
    use super::ycbcr_to_rgb_row;

    /// Floating point BT.601 conversion used as the accuracy
    /// reference, clamped but not rounded.
    fn reference(y: f64, cb: f64, cr: f64) -> [f64; 3]
    {
        let r = y + 1.402 * (cr - 128.0);
        let g = y - 0.344136 * (cb - 128.0) - 0.714136 * (cr - 128.0);
        let b = y + 1.772 * (cb - 128.0);

        [
            r.clamp(0.0, 255.0),
            g.clamp(0.0, 255.0),
            b.clamp(0.0, 255.0)
        ]
    }

    #[test]
    fn neutral_chroma_is_grayscale()
    {
        let y = [0_i16, 64, 128, 200, 255];
        let cb = [128_i16; 5];
        let cr = [128_i16; 5];

        let mut out = [0_u8; 15];

        ycbcr_to_rgb_row(&y, &cb, &cr, &mut out);

        for (pix, y) in out.chunks_exact(3).zip(y.iter())
        {
            assert_eq!(pix, [*y as u8, *y as u8, *y as u8]);
        }
    }

    #[test]
    fn tracks_the_floating_point_reference()
    {
        // The fixed point products floor toward negative infinity, so
        // each chroma term can sit up to one count above the real
        // value. Red and blue carry one term, green carries two.
        let tolerance = [1.0, 2.0, 1.0];

        // sample the whole cube at a coarse step
        for y in (0..=255_i32).step_by(17)
        {
            for cb in (0..=255_i32).step_by(17)
            {
                for cr in (0..=255_i32).step_by(17)
                {
                    let mut out = [0_u8; 3];

                    ycbcr_to_rgb_row(
                        &[y as i16],
                        &[cb as i16],
                        &[cr as i16],
                        &mut out
                    );

                    let want = reference(f64::from(y), f64::from(cb), f64::from(cr));

                    for (channel, (got, expected)) in out.iter().zip(want.iter()).enumerate()
                    {
                        assert!(
                            (f64::from(*got) - expected).abs() <= tolerance[channel],
                            "channel {channel} for ({y},{cb},{cr}): got {got}, reference {expected}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn saturated_inputs_clip()
    {
        let mut out = [0_u8; 3];

        // strong red overshoots red and undershoots blue
        ycbcr_to_rgb_row(&[128], &[0], &[255], &mut out);
        assert_eq!(out[0], 255);
        assert_eq!(out[2], 0);

        // strong blue
        ycbcr_to_rgb_row(&[0], &[255], &[128], &mut out);
        assert_eq!(out, [0, 0, 225]);
    }
}
