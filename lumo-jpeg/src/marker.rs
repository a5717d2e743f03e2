//! JPEG segment markers.
//!
//! Every segment in the container starts with `0xFF` followed by one
//! of these bytes. `0xFF 0x00` inside the entropy-coded stream is
//! byte-stuffing and never reaches this table.

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub(crate) enum Marker
{
    /// Start of image
    SOI,
    /// Start of frame n, non-differential.
    ///
    /// The payload is `n`, `0` being baseline DCT.
    SOF(u8),
    /// Define Huffman tables
    DHT,
    /// Define arithmetic coding conditioning
    DAC,
    /// Restart marker, modulo-8 count
    RST(u8),
    /// Start of scan
    SOS,
    /// End of image
    EOI,
    /// Define quantization tables
    DQT,
    /// Define number of lines
    DNL,
    /// Define restart interval
    DRI,
    /// Application segment n
    APP(u8),
    /// Comment
    COM
}

impl Marker
{
    /// Map a marker byte, the byte following `0xFF`, to a marker.
    ///
    /// Returns `None` for bytes that are not valid markers, including
    /// `0x00` which is only meaningful as byte stuffing inside the
    /// entropy stream.
    pub fn from_u8(value: u8) -> Option<Marker>
    {
        use self::Marker::{APP, COM, DAC, DHT, DNL, DQT, DRI, EOI, RST, SOF, SOI, SOS};

        match value
        {
            0xd8 => Some(SOI),
            0xc0..=0xc3 | 0xc5..=0xc7 | 0xc9..=0xcb | 0xcd..=0xcf => Some(SOF(value - 0xc0)),
            0xc4 => Some(DHT),
            0xcc => Some(DAC),
            0xd0..=0xd7 => Some(RST(value - 0xd0)),
            0xda => Some(SOS),
            0xd9 => Some(EOI),
            0xdb => Some(DQT),
            0xdc => Some(DNL),
            0xdd => Some(DRI),
            0xe0..=0xef => Some(APP(value - 0xe0)),
            0xfe => Some(COM),
            _ => None
        }
    }
}
