//! Errors possible during decoding.

use std::fmt;

use lumo_core::bytestream::EndOfBuffer;

/// All errors the decoder can surface.
///
/// Every error is fatal for the image being decoded, no partial
/// pixels are returned. Positional variants carry the file offset
/// at which the condition was detected.
pub enum DecodeErrors
{
    /// Any other thing we do not know
    Format(String),
    /// Any other thing we do not know but we
    /// don't need to allocate space on the heap
    FormatStatic(&'static str),
    /// The file ended before the current segment, or the image,
    /// was complete
    TruncatedInput
    {
        /// Offset the reader was at when it ran out of bytes
        offset: usize
    },
    /// A `0xFF` followed by a byte that is not a valid marker
    /// in the header region
    BadMarker
    {
        /// The byte that followed `0xFF`
        marker: u8,
        /// Offset of the marker byte
        offset: usize
    },
    /// A segment whose declared length disagrees with its content
    MalformedSegment(String),
    /// A Huffman table whose counts cannot form a valid code tree
    MalformedHuffmanTable(String),
    /// 16 bits were consumed from the entropy stream without
    /// matching any Huffman code
    HuffmanDecode
    {
        /// Offset in the entropy stream where the match failed
        offset: usize
    },
    /// A run length drove the coefficient index past the end
    /// of an 8x8 block
    BlockOverflow
    {
        /// The coefficient index the run would have reached
        index:  usize,
        /// Offset in the entropy stream
        offset: usize
    },
    /// The entropy stream ended before the scan was complete
    TruncatedBitstream
    {
        /// Offset at which the stream ran dry
        offset: usize
    },
    /// The image uses a coding scheme we do not support
    Unsupported(UnsupportedSchemes),
    /// Image dimensions exceed the configured limits
    LargeDimensions(usize)
}

impl From<EndOfBuffer> for DecodeErrors
{
    fn from(err: EndOfBuffer) -> Self
    {
        DecodeErrors::TruncatedInput {
            offset: err.position
        }
    }
}

impl fmt::Debug for DecodeErrors
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self
        {
            Self::Format(reason) => write!(f, "{reason}"),
            Self::FormatStatic(reason) => write!(f, "{reason}"),
            Self::TruncatedInput { offset } =>
            {
                write!(f, "file ended unexpectedly at offset {offset}")
            }
            Self::BadMarker { marker, offset } =>
            {
                write!(
                    f,
                    "unexpected byte 0xFF{marker:02X} at offset {offset}, not a valid marker"
                )
            }
            Self::MalformedSegment(reason) => write!(f, "malformed segment: {reason}"),
            Self::MalformedHuffmanTable(reason) =>
            {
                write!(f, "malformed huffman table: {reason}")
            }
            Self::HuffmanDecode { offset } =>
            {
                write!(
                    f,
                    "could not match a huffman code after 16 bits, near offset {offset}"
                )
            }
            Self::BlockOverflow { index, offset } =>
            {
                write!(
                    f,
                    "zero run drove the coefficient index to {index}, past the block end, near offset {offset}"
                )
            }
            Self::TruncatedBitstream { offset } =>
            {
                write!(f, "entropy stream ended mid scan at offset {offset}")
            }
            Self::Unsupported(scheme) =>
            {
                write!(f, "unsupported: {scheme:?}")
            }
            Self::LargeDimensions(dimensions) =>
            {
                write!(
                    f,
                    "image dimensions {dimensions} larger than the configured limit"
                )
            }
        }
    }
}

impl fmt::Display for DecodeErrors
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for DecodeErrors {}

/// Coding schemes the decoder recognises but does not implement.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum UnsupportedSchemes
{
    /// SOF_1 Extended sequential DCT, Huffman coding
    ExtendedSequentialHuffman,
    /// Progressive DCT, Huffman coding
    ProgressiveDctHuffman,
    /// Lossless (sequential), Huffman coding
    LosslessHuffman,
    /// Extended sequential DCT, arithmetic coding
    ExtendedSequentialDctArithmetic,
    /// Progressive DCT, arithmetic coding
    ProgressiveDctArithmetic,
    /// Lossless (sequential), arithmetic coding
    LosslessArithmetic,
    /// A DAC segment, arithmetic coding conditioning
    ArithmeticConditioning,
    /// A DRI segment declaring a restart interval, or a stray
    /// RSTn marker
    RestartIntervals,
    /// Sample precision other than 8 bits
    SamplePrecision(u8),
    /// More color components than the decoder handles
    ComponentCount(u8)
}

impl UnsupportedSchemes
{
    /// Create a scheme from the low byte of an unsupported
    /// `SOF` marker.
    #[must_use]
    pub fn from_int(int: u8) -> Option<UnsupportedSchemes>
    {
        match int
        {
            0x1 => Some(Self::ExtendedSequentialHuffman),
            0x2 => Some(Self::ProgressiveDctHuffman),
            0x3 => Some(Self::LosslessHuffman),
            0x9 => Some(Self::ExtendedSequentialDctArithmetic),
            0xa => Some(Self::ProgressiveDctArithmetic),
            0xb => Some(Self::LosslessArithmetic),
            _ => None
        }
    }
}

impl fmt::Debug for UnsupportedSchemes
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self
        {
            Self::ExtendedSequentialHuffman =>
            {
                write!(f, "the extended sequential DCT encoding scheme")
            }
            Self::ProgressiveDctHuffman => write!(f, "the progressive DCT encoding scheme"),
            Self::LosslessHuffman => write!(f, "the lossless sequential encoding scheme"),
            Self::ExtendedSequentialDctArithmetic =>
            {
                write!(
                    f,
                    "the extended sequential DCT encoding scheme with arithmetic coding"
                )
            }
            Self::ProgressiveDctArithmetic =>
            {
                write!(
                    f,
                    "the progressive DCT encoding scheme with arithmetic coding"
                )
            }
            Self::LosslessArithmetic =>
            {
                write!(
                    f,
                    "the lossless sequential encoding scheme with arithmetic coding"
                )
            }
            Self::ArithmeticConditioning => write!(f, "arithmetic coding"),
            Self::RestartIntervals => write!(f, "restart intervals"),
            Self::SamplePrecision(precision) =>
            {
                write!(f, "images with {precision} bits of sample precision")
            }
            Self::ComponentCount(components) =>
            {
                write!(f, "images with {components} color components")
            }
        }
    }
}
