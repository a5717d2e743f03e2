//! The main decoder loop.
//!
//! Drives the interleaved scan, for every MCU in raster order, for
//! every component in scan order, decode that component's blocks,
//! run the inverse transform into the component's plane, and once
//! the whole scan is in, hand the planes to the post processor.

use lumo_core::colorspace::ColorSpace;

use crate::bitstream::BitStream;
use crate::components::ComponentID;
use crate::decoder::MAX_COMPONENTS;
use crate::errors::{DecodeErrors, UnsupportedSchemes};
use crate::idct::idct_int;
use crate::marker::Marker;
use crate::misc::setup_component_params;
use crate::worker::{copy_luma, copy_planes, upsample_and_color_convert};
use crate::JpegDecoder;

/// The number of coefficients in a DCT block.
pub const DCT_BLOCK: usize = 64;

impl<'a> JpegDecoder<'a>
{
    /// Check that every component's DC and AC Huffman tables exist
    /// before entering the hot decode loop.
    pub(crate) fn check_tables(&self) -> Result<(), DecodeErrors>
    {
        for component in &self.components
        {
            if self.dc_huffman_tables[component.dc_huff_table].is_none()
            {
                return Err(DecodeErrors::MalformedSegment(format!(
                    "No DC Huffman table {} for component {:?}",
                    component.dc_huff_table, component.component_id
                )));
            }

            if self.ac_huffman_tables[component.ac_huff_table].is_none()
            {
                return Err(DecodeErrors::MalformedSegment(format!(
                    "No AC Huffman table {} for component {:?}",
                    component.ac_huff_table, component.component_id
                )));
            }
        }
        Ok(())
    }

    /// Decode the scan and post process the result into the
    /// requested output colorspace.
    #[allow(clippy::too_many_lines)]
    pub(crate) fn decode_mcu_ycbcr_baseline(&mut self) -> Result<Vec<u8>, DecodeErrors>
    {
        // A single component scan is never interleaved, its declared
        // sampling factors do not apply.
        if self.input_colorspace == ColorSpace::Luma && (self.h_max != 1 || self.v_max != 1)
        {
            warn!("Grayscale image with down-sampled component, resetting component details");
            self.reset_params();
        }

        setup_component_params(self)?;
        self.check_tables()?;

        let out_colorspace = self.options.get_out_colorspace();

        // Planes the output does not touch still have to be entropy
        // decoded, the stream is serial, but their inverse transform
        // can be skipped.
        for component in &mut self.components
        {
            component.needed =
                !(out_colorspace == ColorSpace::Luma && component.component_id != ComponentID::Y);
            // DC predictors start at zero for every scan
            component.dc_pred = 0;
        }

        let mut channels: [Vec<i16>; MAX_COMPONENTS] = [vec![], vec![], vec![]];

        for (pos, component) in self.components.iter().enumerate()
        {
            if component.needed
            {
                channels[pos] = vec![0; component.width_stride * component.plane_height];
            }
        }

        let entropy_offset = self.stream.get_position();
        let mut stream = BitStream::new(self.stream.remaining_bytes(), entropy_offset);
        let mut tmp = [0_i32; DCT_BLOCK];

        for mcu_row in 0..self.mcu_y
        {
            for mcu_col in 0..self.mcu_x
            {
                for scan_pos in 0..self.components.len()
                {
                    let pos = self.z_order[scan_pos];
                    let component = &mut self.components[pos];

                    let dc_table = self.dc_huffman_tables[component.dc_huff_table]
                        .as_ref()
                        .ok_or(DecodeErrors::FormatStatic("No DC table for a component"))?;
                    let ac_table = self.ac_huffman_tables[component.ac_huff_table]
                        .as_ref()
                        .ok_or(DecodeErrors::FormatStatic("No AC table for a component"))?;

                    for v_samp in 0..component.vertical_sample
                    {
                        for h_samp in 0..component.horizontal_sample
                        {
                            // decode_block expects a zeroed buffer
                            tmp.fill(0);

                            stream.decode_block(
                                dc_table,
                                ac_table,
                                &component.quantization_table,
                                &mut tmp,
                                &mut component.dc_pred
                            )?;

                            if component.needed
                            {
                                let idct_position = {
                                    let row = (mcu_row * component.vertical_sample + v_samp) * 8;
                                    let col = (mcu_col * component.horizontal_sample + h_samp) * 8;

                                    row * component.width_stride + col
                                };

                                idct_int(
                                    &mut tmp,
                                    &mut channels[pos][idct_position..],
                                    component.width_stride
                                );
                            }
                        }
                    }
                }
            }
        }

        // hand consumed entropy bytes back to the outer reader and
        // make sure the image is properly terminated
        self.stream.skip(stream.bytes_consumed());
        self.confirm_eoi()?;

        info!("Finished decoding image");

        self.assemble_output(&channels)
    }

    /// Turn the decoded component planes into the output buffer.
    fn assemble_output(
        &mut self, channels: &[Vec<i16>; MAX_COMPONENTS]
    ) -> Result<Vec<u8>, DecodeErrors>
    {
        let out_colorspace = self.options.get_out_colorspace();

        match out_colorspace
        {
            ColorSpace::RGB =>
            {
                let (width, height) = self.output_dimensions().unwrap_or((0, 0));

                let mut pixels = vec![0; width * height * 3];

                upsample_and_color_convert(
                    channels,
                    &self.components,
                    self.input_colorspace,
                    &mut pixels,
                    width,
                    height
                )?;

                Ok(pixels)
            }
            ColorSpace::Luma =>
            {
                let luma = &self.components[0];

                let (width, height) = if self.options.get_crop_to_dimensions()
                {
                    (
                        (usize::from(self.info.width) + luma.h_ratio - 1) / luma.h_ratio,
                        (usize::from(self.info.height) + luma.v_ratio - 1) / luma.v_ratio
                    )
                }
                else
                {
                    (luma.width_stride, luma.plane_height)
                };

                let mut pixels = vec![0; width * height];

                copy_luma(&channels[0], luma, &mut pixels, width, height);

                Ok(pixels)
            }
            ColorSpace::YCbCr =>
            {
                if self.input_colorspace != ColorSpace::YCbCr
                {
                    return Err(DecodeErrors::Format(format!(
                        "Unimplemented colorspace mapping from {:?} to planar YCbCr",
                        self.input_colorspace
                    )));
                }

                let mut pixels = Vec::with_capacity(self.output_buffer_size().unwrap_or(0));

                copy_planes(channels, &self.components, &mut pixels);

                Ok(pixels)
            }
            colorspace => Err(DecodeErrors::Format(format!(
                "Unsupported output colorspace {colorspace:?}"
            )))
        }
    }

    /// Confirm the entropy stream is followed by an EOI marker.
    ///
    /// The scan may be padded with fill bits and fill bytes, so scan
    /// forward for the next marker.
    fn confirm_eoi(&mut self) -> Result<(), DecodeErrors>
    {
        loop
        {
            let byte = self.stream.get_u8_err()?;

            if byte != 0xFF
            {
                continue;
            }

            // skip fill bytes before the marker byte
            let mut marker = self.stream.get_u8_err()?;

            while marker == 0xFF
            {
                marker = self.stream.get_u8_err()?;
            }

            if marker == 0x00
            {
                // stuffed data byte, not a marker
                continue;
            }

            return match Marker::from_u8(marker)
            {
                Some(Marker::EOI) =>
                {
                    trace!("Found EOI marker");
                    Ok(())
                }
                Some(Marker::RST(_)) =>
                {
                    Err(DecodeErrors::Unsupported(UnsupportedSchemes::RestartIntervals))
                }
                _ => Err(DecodeErrors::BadMarker {
                    marker,
                    offset: self.stream.get_position() - 1
                })
            };
        }
    }
}
