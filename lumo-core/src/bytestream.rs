use core::fmt;

/// Error returned when a read would pass the end of the buffer.
///
/// The position stored is where the reader was when the failed
/// read was issued, callers use it to report file offsets.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EndOfBuffer
{
    /// Byte offset at which the failed read started.
    pub position: usize
}

impl fmt::Display for EndOfBuffer
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "no more bytes at offset {}", self.position)
    }
}

impl std::error::Error for EndOfBuffer {}

/// An encapsulation of a byte stream reader.
///
/// This provides an interface similar to [`std::io::Cursor`]
/// but without generics, and with big-endian integer accessors
/// tuned for binary container formats.
///
/// There are two variants of most accessors, an error and a
/// non-error variant. The error variants are useful where a caller
/// needs the bytes and cannot do with a zero result, and they report
/// the position the read failed at. The non-error variants return
/// zero once the buffer is exhausted and are useful where the caller
/// has already proved the data exists, e.g. by calling [`has`].
///
/// [`has`]: Self::has
pub struct ByteReader<'a>
{
    /// Data stream
    stream:   &'a [u8],
    position: usize
}

impl<'a> ByteReader<'a>
{
    /// Create a new instance of the byte stream
    pub const fn new(buf: &'a [u8]) -> ByteReader<'a>
    {
        ByteReader {
            stream:   buf,
            position: 0
        }
    }

    /// Skip `num` bytes ahead of the stream.
    pub fn skip(&mut self, num: usize)
    {
        self.position = self.position.wrapping_add(num);
    }

    /// Undo a buffer read by moving the position pointer `num`
    /// bytes behind.
    ///
    /// This operation will saturate at zero.
    pub fn rewind(&mut self, num: usize)
    {
        self.position = self.position.saturating_sub(num);
    }

    /// Return whether the underlying buffer
    /// has `num` bytes available for reading
    #[inline]
    pub const fn has(&self, num: usize) -> bool
    {
        self.position + num <= self.stream.len()
    }

    /// Get length of the underlying buffer.
    #[inline]
    pub const fn len(&self) -> usize
    {
        self.stream.len()
    }

    /// Return true if the underlying buffer stream is empty
    #[inline]
    pub const fn is_empty(&self) -> bool
    {
        self.stream.len() == 0
    }

    /// Get current position of the buffer.
    #[inline]
    pub const fn get_position(&self) -> usize
    {
        self.position
    }

    /// Return true whether or not we read to the end of the
    /// buffer and have no more bytes left.
    #[inline]
    pub const fn eof(&self) -> bool
    {
        self.position >= self.len()
    }

    /// Get number of bytes unread inside this stream.
    #[inline]
    pub const fn remaining(&self) -> usize
    {
        self.stream.len().saturating_sub(self.position)
    }

    /// Return the unread portion of the buffer without
    /// advancing the position.
    #[inline]
    pub fn remaining_bytes(&self) -> &'a [u8]
    {
        &self.stream[self.position.min(self.stream.len())..]
    }

    /// Look ahead `position` bytes from the current position and
    /// return a reference to `num_bytes` from there, or an error if
    /// the peek would be out of bounds.
    ///
    /// This doesn't increment the position, bytes would have to be
    /// discarded at a later point.
    #[inline]
    pub fn peek_at(&self, position: usize, num_bytes: usize) -> Result<&'a [u8], EndOfBuffer>
    {
        let start = self.position + position;
        let end = start + num_bytes;

        match self.stream.get(start..end)
        {
            Some(bytes) => Ok(bytes),
            None => Err(EndOfBuffer {
                position: self.position
            })
        }
    }

    /// Fill `buf` from the stream, advancing the position,
    /// or error out without consuming anything if the stream
    /// cannot satisfy the whole read.
    #[inline]
    pub fn read_exact_bytes(&mut self, buf: &mut [u8]) -> Result<(), EndOfBuffer>
    {
        match self.stream.get(self.position..self.position + buf.len())
        {
            Some(bytes) =>
            {
                buf.copy_from_slice(bytes);
                self.position += buf.len();
                Ok(())
            }
            None => Err(EndOfBuffer {
                position: self.position
            })
        }
    }

    /// Retrieve a byte from the underlying stream
    /// returning 0 if there are no more bytes available.
    ///
    /// This means 0 might indicate a byte or an end of stream, which
    /// is okay for scenarios where the caller already proved bytes
    /// exist. For the erroring one, see [`get_u8_err`].
    ///
    /// [`get_u8_err`]: Self::get_u8_err
    #[inline(always)]
    pub fn get_u8(&mut self) -> u8
    {
        let byte = *self.stream.get(self.position).unwrap_or(&0);

        self.position += usize::from(self.position < self.len());
        byte
    }

    /// Retrieve a byte from the underlying stream
    /// returning an error if there are no more bytes available.
    ///
    /// For the non erroring one, see [`get_u8`].
    ///
    /// [`get_u8`]: Self::get_u8
    #[inline(always)]
    pub fn get_u8_err(&mut self) -> Result<u8, EndOfBuffer>
    {
        match self.stream.get(self.position)
        {
            Some(byte) =>
            {
                self.position += 1;
                Ok(*byte)
            }
            None => Err(EndOfBuffer {
                position: self.position
            })
        }
    }

    /// Read a `u16` as a big endian integer,
    /// returning 0 if the underlying buffer does not have
    /// enough bytes for the read.
    #[inline(always)]
    pub fn get_u16_be(&mut self) -> u16
    {
        self.get_u16_be_err().unwrap_or(0)
    }

    /// Read a `u16` as a big endian integer,
    /// returning an error if the underlying buffer cannot
    /// support the read.
    #[inline]
    pub fn get_u16_be_err(&mut self) -> Result<u16, EndOfBuffer>
    {
        match self.stream.get(self.position..self.position + 2)
        {
            Some(bytes) =>
            {
                self.position += 2;
                Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
            }
            None => Err(EndOfBuffer {
                position: self.position
            })
        }
    }
}
