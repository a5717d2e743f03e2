//! Image components
//!
//! A component is a single color channel of the frame, established
//! by the start-of-frame segment and annotated with Huffman table
//! ids by the start-of-scan segment.

use crate::errors::DecodeErrors;

/// Color channels a frame component can represent.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum ComponentID
{
    /// Luminance
    Y,
    /// Blue chrominance
    Cb,
    /// Red chrominance
    Cr
}

/// One color channel of the frame.
pub(crate) struct Components
{
    /// Which channel this is
    pub component_id: ComponentID,
    /// Component identifier as stored in the file
    pub id: u8,
    /// Horizontal sampling factor, 1..=4
    pub horizontal_sample: usize,
    /// Vertical sampling factor, 1..=4
    pub vertical_sample: usize,
    /// Which quantization table this component references
    pub quantization_table_number: u8,
    /// The dequantization multipliers, in zig-zag order.
    ///
    /// Copied out of the decoder's table store when the scan starts.
    pub quantization_table: [i32; 64],
    /// DC Huffman table id assigned by the scan header
    pub dc_huff_table: usize,
    /// AC Huffman table id assigned by the scan header
    pub ac_huff_table: usize,
    /// Running DC predictor for the scan
    pub dc_pred: i32,
    /// Samples per row of this component's plane
    pub width_stride: usize,
    /// Rows in this component's plane
    pub plane_height: usize,
    /// Horizontal replication factor, `h_max / horizontal_sample`
    pub h_ratio: usize,
    /// Vertical replication factor, `v_max / vertical_sample`
    pub v_ratio: usize,
    /// Whether the decoded samples are needed for the requested
    /// output, chroma is skipped for grayscale output
    pub needed: bool
}

impl Components
{
    /// Create a component from the three bytes of a start-of-frame
    /// component specification.
    ///
    /// `pos` is the component's position in the frame header, used as
    /// a fallback channel assignment for encoders that do not use the
    /// conventional 1, 2, 3 identifiers.
    pub fn from(value: [u8; 3], pos: u8) -> Result<Components, DecodeErrors>
    {
        let id = value[0];

        let component_id = match id
        {
            1 => ComponentID::Y,
            2 => ComponentID::Cb,
            3 => ComponentID::Cr,
            _ => match pos
            {
                0 => ComponentID::Y,
                1 => ComponentID::Cb,
                2 => ComponentID::Cr,
                _ =>
                {
                    return Err(DecodeErrors::Format(format!(
                        "Unknown component id {id} at position {pos}"
                    )))
                }
            }
        };

        let horizontal_sample = usize::from(value[1] >> 4);
        let vertical_sample = usize::from(value[1] & 0x0f);
        let quantization_table_number = value[2];

        if !(1..=4).contains(&horizontal_sample) || !(1..=4).contains(&vertical_sample)
        {
            return Err(DecodeErrors::Format(format!(
                "Invalid sampling factors ({horizontal_sample},{vertical_sample}) for component {component_id:?}, expected between 1 and 4"
            )));
        }

        if quantization_table_number > 3
        {
            return Err(DecodeErrors::Format(format!(
                "Invalid quantization table id {quantization_table_number} for component {component_id:?}, expected between 0 and 3"
            )));
        }

        trace!(
            "Component ID : {:?}, sampling factors ({},{}), quantization table {}",
            component_id,
            horizontal_sample,
            vertical_sample,
            quantization_table_number
        );

        Ok(Components {
            component_id,
            id,
            horizontal_sample,
            vertical_sample,
            quantization_table_number,
            quantization_table: [0; 64],
            dc_huff_table: 0,
            ac_huff_table: 0,
            dc_pred: 0,
            width_stride: horizontal_sample,
            plane_height: vertical_sample,
            h_ratio: 1,
            v_ratio: 1,
            needed: true
        })
    }
}

#[cfg(test)]
mod tests
{
    use super::{ComponentID, Components};

    #[test]
    fn conventional_identifiers()
    {
        let y = Components::from([1, 0x22, 0], 0).unwrap();

        assert_eq!(y.component_id, ComponentID::Y);
        assert_eq!(y.horizontal_sample, 2);
        assert_eq!(y.vertical_sample, 2);
        assert_eq!(y.quantization_table_number, 0);

        let cr = Components::from([3, 0x11, 1], 2).unwrap();
        assert_eq!(cr.component_id, ComponentID::Cr);
    }

    #[test]
    fn unconventional_identifiers_fall_back_to_position()
    {
        let comp = Components::from([0, 0x11, 0], 1).unwrap();

        assert_eq!(comp.component_id, ComponentID::Cb);
    }

    #[test]
    fn rejects_zero_sampling_factor()
    {
        assert!(Components::from([1, 0x02, 0], 0).is_err());
        assert!(Components::from([1, 0x20, 0], 0).is_err());
    }

    #[test]
    fn rejects_out_of_range_quantization_table()
    {
        assert!(Components::from([1, 0x11, 4], 0).is_err());
    }
}
