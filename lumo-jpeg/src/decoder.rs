//! Main image logic.

use lumo_core::bytestream::ByteReader;
use lumo_core::colorspace::ColorSpace;
use lumo_core::options::DecoderOptions;

use crate::components::Components;
use crate::errors::{DecodeErrors, UnsupportedSchemes};
use crate::headers::{parse_app0, parse_dqt, parse_huffman, parse_sos, parse_start_of_frame};
use crate::huffman::HuffmanTable;
use crate::marker::Marker;

/// Maximum number of color components
pub(crate) const MAX_COMPONENTS: usize = 3;

/// Maximum number of quantization or Huffman tables of one class
pub(crate) const MAX_TABLES: usize = 4;

/// A JPEG decoder instance.
///
/// Decodes a single baseline, Huffman-coded JPEG image from a byte
/// buffer into pixels.
pub struct JpegDecoder<'a>
{
    /// Struct to hold image information from SOI
    pub(crate) info:              ImageInfo,
    /// Quantization tables, stored in zig-zag order and moved into
    /// `components` when the scan starts
    pub(crate) qt_tables:         [Option<[i32; 64]>; MAX_TABLES],
    /// DC Huffman tables, at most 4
    pub(crate) dc_huffman_tables: [Option<HuffmanTable>; MAX_TABLES],
    /// AC Huffman tables, at most 4
    pub(crate) ac_huffman_tables: [Option<HuffmanTable>; MAX_TABLES],
    /// Image components, holds information like DC prediction and
    /// quantization tables of a component
    pub(crate) components:        Vec<Components>,
    /// maximum horizontal sampling factor of all channels
    pub(crate) h_max:             usize,
    /// maximum vertical sampling factor of all channels
    pub(crate) v_max:             usize,
    /// MCU width in pixels, `8 * h_max`
    pub(crate) mcu_width:         usize,
    /// MCU height in pixels, `8 * v_max`
    pub(crate) mcu_height:        usize,
    /// Number of MCUs per row
    pub(crate) mcu_x:             usize,
    /// Number of MCUs per column
    pub(crate) mcu_y:             usize,
    /// Maps scan order positions to component indices
    pub(crate) z_order:           [usize; MAX_COMPONENTS],
    /// Image input colorspace, YCbCr for a color image, Luma for a
    /// single component one
    pub(crate) input_colorspace:  ColorSpace,
    /// decoder options
    pub(crate) options:           DecoderOptions,
    /// byte stream over the whole file
    pub(crate) stream:            ByteReader<'a>,
    /// Indicates whether headers have been decoded
    pub(crate) headers_decoded:   bool,
    /// Whether a start of frame segment has been seen
    pub(crate) seen_sof:          bool
}

impl<'a> JpegDecoder<'a>
{
    fn default(options: DecoderOptions, buffer: &'a [u8]) -> Self
    {
        JpegDecoder {
            info: ImageInfo::default(),
            qt_tables: [None; MAX_TABLES],
            dc_huffman_tables: [None, None, None, None],
            ac_huffman_tables: [None, None, None, None],
            components: vec![],
            h_max: 1,
            v_max: 1,
            mcu_width: 0,
            mcu_height: 0,
            mcu_x: 0,
            mcu_y: 0,
            z_order: [0; MAX_COMPONENTS],
            input_colorspace: ColorSpace::YCbCr,
            options,
            stream: ByteReader::new(buffer),
            headers_decoded: false,
            seen_sof: false
        }
    }

    /// Create a new decoder instance over `stream`.
    ///
    /// The buffer should hold a complete baseline jpeg file, perhaps
    /// created by `std::fs::read()`.
    #[must_use]
    #[allow(clippy::new_without_default)]
    pub fn new(stream: &'a [u8]) -> JpegDecoder
    {
        JpegDecoder::default(DecoderOptions::default(), stream)
    }

    /// Create a new decoder with the specified options to be used
    /// for decoding an image.
    #[must_use]
    pub fn new_with_options(options: DecoderOptions, buf: &'a [u8]) -> JpegDecoder
    {
        JpegDecoder::default(options, buf)
    }

    /// Decode the image, returning pixels in the configured output
    /// colorspace.
    ///
    /// For the default RGB output this is one interleaved `R,G,B`
    /// triple per pixel over the padded block grid, row major; see
    /// [`output_dimensions`](Self::output_dimensions) for the raster
    /// size. For planar YCbCr output the planes are concatenated,
    /// each at its component's native resolution.
    ///
    /// # Errors
    /// See [`DecodeErrors`] for the possible failure modes. All
    /// errors are fatal, no partial pixels are returned.
    pub fn decode(&mut self) -> Result<Vec<u8>, DecodeErrors>
    {
        self.decode_headers_internal()?;
        self.decode_mcu_ycbcr_baseline()
    }

    /// Read only the headers from a jpeg image buffer.
    ///
    /// This allows extracting important information like image width
    /// and height without decoding the entropy stream.
    ///
    /// # Errors
    /// See [`DecodeErrors`] for the possible failure modes.
    pub fn decode_headers(&mut self) -> Result<(), DecodeErrors>
    {
        self.decode_headers_internal()?;
        Ok(())
    }

    /// Returns the image information.
    ///
    /// This **must** be called after [`decode`](Self::decode) or
    /// [`decode_headers`](Self::decode_headers), otherwise it
    /// returns `None`.
    #[must_use]
    pub fn info(&self) -> Option<ImageInfo>
    {
        if !self.headers_decoded
        {
            return None;
        }

        return Some(self.info.clone());
    }

    /// Get the width of the image as declared in the frame header.
    #[must_use]
    pub fn width(&self) -> u16
    {
        self.info.width
    }

    /// Get the height of the image as declared in the frame header.
    #[must_use]
    pub fn height(&self) -> u16
    {
        self.info.height
    }

    /// Width of the decoded block grid, the declared width rounded
    /// up to a whole number of MCUs.
    #[must_use]
    pub fn padded_width(&self) -> usize
    {
        self.mcu_x * self.mcu_width
    }

    /// Height of the decoded block grid, the declared height rounded
    /// up to a whole number of MCUs.
    #[must_use]
    pub fn padded_height(&self) -> usize
    {
        self.mcu_y * self.mcu_height
    }

    /// Get the colorspace the image pixels will be decoded into.
    #[must_use]
    pub fn get_output_colorspace(&self) -> ColorSpace
    {
        return self.options.get_out_colorspace();
    }

    /// Dimensions of the raster [`decode`](Self::decode) will
    /// produce, honoring the crop option.
    ///
    /// Only meaningful for interleaved outputs (RGB and Luma);
    /// planar YCbCr output returns `None` since its planes may have
    /// different resolutions.
    #[must_use]
    pub fn output_dimensions(&self) -> Option<(usize, usize)>
    {
        if !self.headers_decoded
        {
            return None;
        }

        match self.options.get_out_colorspace()
        {
            ColorSpace::RGB | ColorSpace::Luma =>
            {
                if self.options.get_crop_to_dimensions()
                {
                    Some((usize::from(self.info.width), usize::from(self.info.height)))
                }
                else
                {
                    Some((self.padded_width(), self.padded_height()))
                }
            }
            _ => None
        }
    }

    /// Number of bytes [`decode`](Self::decode) will return, or
    /// `None` if headers are not yet decoded.
    #[must_use]
    pub fn output_buffer_size(&self) -> Option<usize>
    {
        if !self.headers_decoded
        {
            return None;
        }

        match self.options.get_out_colorspace()
        {
            ColorSpace::YCbCr =>
            {
                let total = self
                    .components
                    .iter()
                    .map(|c| {
                        (self.mcu_x * c.horizontal_sample * 8)
                            * (self.mcu_y * c.vertical_sample * 8)
                    })
                    .sum();

                Some(total)
            }
            colorspace =>
            {
                let (width, height) = self.output_dimensions()?;

                Some(width * height * colorspace.num_components())
            }
        }
    }

    /// Decode headers up to, and including, the start of scan.
    ///
    /// # Supported headers
    ///  - APP(n), only JFIF densities are kept
    ///  - SOF(0), baseline DCT
    ///  - DQT, quantization tables
    ///  - DHT, Huffman tables
    ///  - SOS, start of scan
    ///
    /// Everything else is either skipped by length or rejected.
    fn decode_headers_internal(&mut self) -> Result<(), DecodeErrors>
    {
        if self.headers_decoded
        {
            warn!("Headers already decoded");
            return Ok(());
        }

        // First two bytes should be the SOI marker
        let magic_bytes = self.stream.get_u16_be_err()?;

        if magic_bytes != 0xffd8
        {
            return Err(DecodeErrors::Format(format!(
                "No SOI marker, expected ffd8 found {magic_bytes:04x}, not a jpeg file"
            )));
        }

        let mut last_byte = 0;
        let mut bytes_before_marker = 0;

        loop
        {
            let m = self.stream.get_u8_err()?;

            // A marker is 0xFF followed by the marker byte.
            if last_byte == 0xFF
            {
                match Marker::from_u8(m)
                {
                    Some(marker) =>
                    {
                        if bytes_before_marker > 3
                        {
                            if self.options.get_strict_headers()
                            {
                                return Err(DecodeErrors::FormatStatic(
                                    "Extra bytes between header segments"
                                ));
                            }

                            warn!(
                                "Extra bytes {} before marker 0xFF{:X}",
                                bytes_before_marker - 3,
                                m
                            );
                        }

                        bytes_before_marker = 0;

                        self.parse_marker_inner(marker)?;

                        if marker == Marker::SOS
                        {
                            self.headers_decoded = true;
                            return Ok(());
                        }
                    }
                    None =>
                    {
                        return Err(DecodeErrors::BadMarker {
                            marker: m,
                            offset: self.stream.get_position() - 1
                        });
                    }
                }
            }

            last_byte = m;
            bytes_before_marker += 1;
        }
    }

    pub(crate) fn parse_marker_inner(&mut self, m: Marker) -> Result<(), DecodeErrors>
    {
        match m
        {
            Marker::SOF(0) =>
            {
                info!("Baseline DCT frame");
                parse_start_of_frame(self)?;
            }
            // Start of frame segments the decoder does not support
            Marker::SOF(v) =>
            {
                if let Some(feature) = UnsupportedSchemes::from_int(v)
                {
                    return Err(DecodeErrors::Unsupported(feature));
                }

                return Err(DecodeErrors::Format(format!(
                    "Unsupported start of frame marker SOF{v}"
                )));
            }
            Marker::DQT =>
            {
                parse_dqt(self)?;
            }
            Marker::DHT =>
            {
                parse_huffman(self)?;
            }
            Marker::SOS =>
            {
                parse_sos(self)?;
                // what follows is the entropy coded image data
                return Ok(());
            }
            Marker::APP(0) =>
            {
                parse_app0(self)?;
            }
            Marker::APP(n) =>
            {
                trace!("Skipping APP{n} segment");
                self.skip_by_length()?;
            }
            Marker::COM =>
            {
                trace!("Skipping comment segment");
                self.skip_by_length()?;
            }
            Marker::DRI =>
            {
                // restart machinery is not implemented, and a file
                // relying on it would be mis-decoded, so reject it
                return Err(DecodeErrors::Unsupported(UnsupportedSchemes::RestartIntervals));
            }
            Marker::DAC =>
            {
                return Err(DecodeErrors::Unsupported(UnsupportedSchemes::ArithmeticConditioning));
            }
            Marker::EOI =>
            {
                return Err(DecodeErrors::FormatStatic("Premature end of image"));
            }
            Marker::SOI =>
            {
                return Err(DecodeErrors::FormatStatic(
                    "Duplicate start of image marker"
                ));
            }
            Marker::RST(n) =>
            {
                return Err(DecodeErrors::BadMarker {
                    marker: 0xd0 + n,
                    offset: self.stream.get_position() - 1
                });
            }
            Marker::DNL =>
            {
                return Err(DecodeErrors::FormatStatic(
                    "DNL segments are not supported, cannot continue"
                ));
            }
        }
        Ok(())
    }

    /// Reset sampling factors to 1x1 and recompute the block grid.
    ///
    /// Used for single component images that declare down-sampled
    /// components, whose scans are never interleaved.
    pub(crate) fn reset_params(&mut self)
    {
        self.h_max = 1;
        self.v_max = 1;
        self.mcu_width = 8;
        self.mcu_height = 8;
        self.mcu_x = (usize::from(self.info.width) + 7) / 8;
        self.mcu_y = (usize::from(self.info.height) + 7) / 8;

        for component in &mut self.components
        {
            component.horizontal_sample = 1;
            component.vertical_sample = 1;
        }
    }

    /// Skip a segment using its declared length.
    fn skip_by_length(&mut self) -> Result<(), DecodeErrors>
    {
        let length = self.stream.get_u16_be_err()?;

        if length < 2
        {
            return Err(DecodeErrors::MalformedSegment(format!(
                "Found a marker with invalid length: {length}"
            )));
        }

        self.stream.skip(usize::from(length) - 2);

        Ok(())
    }
}

/// Image properties collected while parsing headers.
///
/// The header parsers fill the fields in directly as the relevant
/// segments arrive, width, height and precision from the frame
/// header, the densities from a JFIF APP0 segment if one is present.
#[derive(Default, Clone, Eq, PartialEq, Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct ImageInfo
{
    /// Width of the image
    pub width:         u16,
    /// Height of the image
    pub height:        u16,
    /// Bits per sample, always 8 for images this decoder accepts
    pub pixel_density: u8,
    /// Horizontal pixel density from the JFIF header
    pub x_density:     u16,
    /// Vertical pixel density from the JFIF header
    pub y_density:     u16,
    /// Number of color components
    pub components:    u8
}
