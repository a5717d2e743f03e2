use bitflags::bitflags;

use crate::colorspace::ColorSpace;

bitflags! {
    /// Decoder options that are flags
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub struct DecoderFlags: u32 {
        /// Crop the output raster to the image dimensions declared in
        /// the file instead of emitting the full padded block grid.
        const CROP_TO_DIMENSIONS = 0b0000_0001;
        /// Treat stray bytes between header segments as an error
        /// instead of a logged warning.
        const STRICT_HEADERS     = 0b0000_0010;
    }
}

/// Decoder options
///
/// Not all options are respected by every decoder; each option
/// documents the decoders that respect it.
#[derive(Debug, Copy, Clone)]
pub struct DecoderOptions
{
    /// Maximum width for which decoders will
    /// not try to decode images larger than
    /// the specified width.
    ///
    /// - Default value: 16384
    max_width:      usize,
    /// Maximum height for which decoders will not
    /// try to decode images larger than the
    /// specified height
    ///
    /// - Default value: 16384
    max_height:     usize,
    /// Output colorspace
    ///
    /// - Default value: `ColorSpace::RGB`
    out_colorspace: ColorSpace,
    flags:          DecoderFlags
}

impl DecoderOptions
{
    /// Get maximum width configured for the decoder
    #[must_use]
    pub const fn get_max_width(&self) -> usize
    {
        self.max_width
    }

    /// Get maximum height configured for the decoder
    #[must_use]
    pub const fn get_max_height(&self) -> usize
    {
        self.max_height
    }

    /// Get the colorspace the decoded pixels will be returned in
    #[must_use]
    pub const fn get_out_colorspace(&self) -> ColorSpace
    {
        self.out_colorspace
    }

    /// Return true if the output raster should be cropped to the
    /// declared image dimensions instead of the padded block grid.
    #[must_use]
    pub const fn get_crop_to_dimensions(&self) -> bool
    {
        self.flags.contains(DecoderFlags::CROP_TO_DIMENSIONS)
    }

    /// Return true if stray bytes between header segments should be
    /// rejected instead of warned about.
    #[must_use]
    pub const fn get_strict_headers(&self) -> bool
    {
        self.flags.contains(DecoderFlags::STRICT_HEADERS)
    }

    /// Set maximum width for which the decoder should not try
    /// decoding images greater than that width
    #[must_use]
    pub fn set_max_width(mut self, width: usize) -> Self
    {
        self.max_width = width;
        self
    }

    /// Set maximum height for which the decoder should not try
    /// decoding images greater than that height
    #[must_use]
    pub fn set_max_height(mut self, height: usize) -> Self
    {
        self.max_height = height;
        self
    }

    /// Set the colorspace the decoded pixels should be returned in
    #[must_use]
    pub fn set_out_colorspace(mut self, colorspace: ColorSpace) -> Self
    {
        self.out_colorspace = colorspace;
        self
    }

    /// Set whether the output raster should be cropped to the
    /// declared image dimensions
    #[must_use]
    pub fn set_crop_to_dimensions(mut self, yes: bool) -> Self
    {
        self.flags.set(DecoderFlags::CROP_TO_DIMENSIONS, yes);
        self
    }

    /// Set whether stray bytes between header segments should be
    /// an error
    #[must_use]
    pub fn set_strict_headers(mut self, yes: bool) -> Self
    {
        self.flags.set(DecoderFlags::STRICT_HEADERS, yes);
        self
    }
}

impl Default for DecoderOptions
{
    fn default() -> Self
    {
        Self {
            out_colorspace: ColorSpace::RGB,
            max_width:      1 << 14,
            max_height:     1 << 14,
            flags:          DecoderFlags::empty()
        }
    }
}
