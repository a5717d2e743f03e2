/// Colorspaces the decoders understand.
#[allow(clippy::upper_case_acronyms)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ColorSpace
{
    RGB,
    YCbCr,
    Luma
}

impl ColorSpace
{
    /// Number of color channels this colorspace carries.
    #[must_use]
    pub const fn num_components(&self) -> usize
    {
        match self
        {
            Self::RGB | Self::YCbCr => 3,
            Self::Luma => 1
        }
    }
}
