//! Post processing, chroma upsampling and raster assembly.
//!
//! Upsampling is block replication, each output pixel maps back to
//! the sample at its coordinates divided by the component's
//! replication ratio. The rows produced here feed straight into the
//! color converter.

use lumo_core::colorspace::ColorSpace;

use crate::color_convert::{luma_to_rgb_row, ycbcr_to_rgb_row};
use crate::components::Components;
use crate::decoder::MAX_COMPONENTS;
use crate::errors::DecodeErrors;

/// Replicate one plane row out to full resolution.
///
/// `input` is a row of the component's plane, `ratio` its horizontal
/// replication factor.
fn upsample_row_replicate(input: &[i16], ratio: usize, output: &mut [i16])
{
    if ratio == 1
    {
        output.copy_from_slice(&input[..output.len()]);
        return;
    }

    for (pos, out) in output.iter_mut().enumerate()
    {
        *out = input[pos / ratio];
    }
}

/// Upsample the decoded planes and convert them into an interleaved
/// RGB raster of `width` x `height` pixels.
pub(crate) fn upsample_and_color_convert(
    channels: &[Vec<i16>; MAX_COMPONENTS], components: &[Components],
    input_colorspace: ColorSpace, output: &mut [u8], width: usize, height: usize
) -> Result<(), DecodeErrors>
{
    match input_colorspace
    {
        ColorSpace::Luma =>
        {
            let luma = &components[0];
            let mut scratch = vec![0_i16; width];

            for (y, out_row) in output.chunks_exact_mut(width * 3).enumerate().take(height)
            {
                let row_start = (y / luma.v_ratio) * luma.width_stride;
                let row = &channels[0][row_start..row_start + luma.width_stride];

                if luma.h_ratio == 1
                {
                    luma_to_rgb_row(&row[..width], out_row);
                }
                else
                {
                    upsample_row_replicate(row, luma.h_ratio, &mut scratch);
                    luma_to_rgb_row(&scratch, out_row);
                }
            }
        }
        ColorSpace::YCbCr =>
        {
            let mut y_row = vec![0_i16; width];
            let mut cb_row = vec![0_i16; width];
            let mut cr_row = vec![0_i16; width];

            for (y, out_row) in output.chunks_exact_mut(width * 3).enumerate().take(height)
            {
                for (pos, (component, row)) in components
                    .iter()
                    .zip([&mut y_row, &mut cb_row, &mut cr_row])
                    .enumerate()
                {
                    let row_start = (y / component.v_ratio) * component.width_stride;
                    let plane_row =
                        &channels[pos][row_start..row_start + component.width_stride];

                    upsample_row_replicate(plane_row, component.h_ratio, row);
                }

                ycbcr_to_rgb_row(&y_row, &cb_row, &cr_row, out_row);
            }
        }
        colorspace =>
        {
            return Err(DecodeErrors::Format(format!(
                "Unimplemented colorspace mapping from {colorspace:?} to RGB"
            )));
        }
    }

    Ok(())
}

/// Copy the luma plane out as single channel pixels.
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
pub(crate) fn copy_luma(
    channel: &[i16], component: &Components, output: &mut [u8], width: usize, height: usize
)
{
    for (y, out_row) in output.chunks_exact_mut(width).enumerate().take(height)
    {
        let row_start = (y / component.v_ratio) * component.width_stride;
        let row = &channel[row_start..row_start + component.width_stride];

        for (x, out) in out_row.iter_mut().enumerate()
        {
            *out = row[x / component.h_ratio].clamp(0, 255) as u8;
        }
    }
}

/// Concatenate the decoded planes, each at its native resolution,
/// Y first then Cb then Cr.
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
pub(crate) fn copy_planes(
    channels: &[Vec<i16>; MAX_COMPONENTS], components: &[Components], output: &mut Vec<u8>
)
{
    for channel in channels.iter().take(components.len())
    {
        output.extend(channel.iter().map(|sample| (*sample).clamp(0, 255) as u8));
    }
}
