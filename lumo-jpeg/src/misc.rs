//! Miscellaneous stuff

use crate::errors::DecodeErrors;
use crate::JpegDecoder;

/// Undo run length encoding of coefficients by placing them in natural order
///
/// The table is deliberately over-long, indices past 63 all land on the
/// last coefficient so a corrupt run cannot index out of bounds.
#[rustfmt::skip]
pub const UN_ZIGZAG: [usize; 64 + 16] = [
     0,  1,  8, 16,  9,  2,  3, 10,
    17, 24, 32, 25, 18, 11,  4,  5,
    12, 19, 26, 33, 40, 48, 41, 34,
    27, 20, 13,  6,  7, 14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36,
    29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46,
    53, 60, 61, 54, 47, 55, 62, 63,
    // Prevent overflowing
    63, 63, 63, 63, 63, 63, 63, 63,
    63, 63, 63, 63, 63, 63, 63, 63
];

/// Set up component parameters before the scan starts.
///
/// This computes each component's plane geometry and replication
/// ratios, and moves its quantization table out of the table store.
pub(crate) fn setup_component_params(img: &mut JpegDecoder) -> Result<(), DecodeErrors>
{
    let (h_max, v_max) = (img.h_max, img.v_max);
    let (mcu_x, mcu_y) = (img.mcu_x, img.mcu_y);

    // The luma plane must carry the maximum sampling factors, a
    // frame where chroma out-samples luma has no sensible
    // reconstruction here.
    if img.components.len() > 1
        && (img.components[0].horizontal_sample != h_max
            || img.components[0].vertical_sample != v_max)
    {
        return Err(DecodeErrors::FormatStatic(
            "Unsupported down-sampled luma component with sampled chroma components"
        ));
    }

    for component in &mut img.components
    {
        // Replication upsampling only works when the maximum sampling
        // factor is an exact multiple of the component's own.
        if h_max % component.horizontal_sample != 0 || v_max % component.vertical_sample != 0
        {
            return Err(DecodeErrors::Format(format!(
                "Sampling factors ({},{}) for component {:?} do not evenly divide the maximum ({h_max},{v_max})",
                component.horizontal_sample,
                component.vertical_sample,
                component.component_id
            )));
        }

        component.h_ratio = h_max / component.horizontal_sample;
        component.v_ratio = v_max / component.vertical_sample;
        component.width_stride = mcu_x * component.horizontal_sample * 8;
        component.plane_height = mcu_y * component.vertical_sample * 8;

        // Extract quantization tables from the store into components
        let qt_table = *img.qt_tables[usize::from(component.quantization_table_number)]
            .as_ref()
            .ok_or_else(|| {
                DecodeErrors::MalformedSegment(format!(
                    "No quantization table {} for component {:?}",
                    component.quantization_table_number, component.component_id
                ))
            })?;

        component.quantization_table = qt_table;
    }

    Ok(())
}
