//! The cursor decoder.

use bstr::{BString, ByteSlice};
use log::{debug, trace};
use crate::buffer::Retained;
use crate::builder::{DecoderBuilder, Required};
use crate::data::{LengthPrefix, PlainData};
use crate::endian::Endian;
use crate::stream::{DecodeError, Exhausted, Source};

/// Largest single request handed to a source, so that a huge deficit does not allocate upfront.
const MAX_PULL: usize = 64 * 1024;

/// Sequential decoder over a [`Source`], tolerant of input that arrives in pieces.
///
/// Bytes pulled from the source but not yet consumed by a completed read are retained inside the
/// decoder. Every read first makes sure enough bytes are retained, pulling exactly the missing
/// amount from the source. If the source cannot deliver that many yet, the read fails with
/// [`DecodeError::BufferUnderflow`] and consumes nothing; whatever was pulled stays retained, so
/// calling the same read again later picks up where it left off.
/// ```
/// # use bin_stream::{Decoder, Endian};
/// let mut decoder = Decoder::from_bytes(*b"\x00hello\x00\x05world", Endian::Big);
/// assert_eq!(decoder.read_null_terminated_string().unwrap(), "");
/// assert_eq!(decoder.read_null_terminated_string().unwrap(), "hello");
/// assert_eq!(decoder.read_u8_prefixed_string().unwrap(), "world");
/// assert!(decoder.read_u8().unwrap_err().is_underflow());
/// ```
#[derive(Debug)]
pub struct Decoder<S> {
    source: S,
    buffer: Retained,
    endian: Endian,
    length_limit: Option<usize>,
}

impl Decoder<Exhausted> {
    /// Decode from in-memory bytes, all of which are available immediately.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>, endian: Endian) -> Self {
        Decoder::builder().endian(endian).build_from_bytes(bytes)
    }
}

impl Decoder<()> {
    /// Configure a decoder step by step.
    pub fn builder() -> DecoderBuilder<Required> { DecoderBuilder::new() }
}

impl<S: Source> Decoder<S> {
    /// Decode from `source`, pulling bytes on demand.
    pub fn new(source: S, endian: Endian) -> Self {
        Decoder::builder().endian(endian).build(source)
    }

    pub(crate) fn from_parts(source: S, buffer: Retained, endian: Endian, length_limit: Option<usize>) -> Self {
        Decoder { source, buffer, endian, length_limit }
    }

    /// Byte order used for multi-byte reads.
    pub fn endian(&self) -> Endian { self.endian }
    /// Number of bytes retained, i.e. readable without touching the source.
    pub fn available(&self) -> usize { self.buffer.len() }
    /// Bytes retained, i.e. readable without touching the source.
    pub fn retained(&self) -> &[u8] { self.buffer.as_slice() }
    /// Get a reference to the underlying source.
    pub fn source(&self) -> &S { &self.source }
    /// Get a mutable reference to the underlying source.
    pub fn source_mut(&mut self) -> &mut S { &mut self.source }
    /// Unwrap into the source and the bytes retained but not yet consumed.
    pub fn into_parts(self) -> (S, Vec<u8>) { (self.source, self.buffer.into_vec()) }

    /// Make sure at least `n` bytes are retained, pulling the missing bytes from the source.
    ///
    /// Never asks the source for more than the deficit. On [`BufferUnderflow`], the bytes that
    /// did arrive are kept, and nothing is consumed.
    ///
    /// [`BufferUnderflow`]: DecodeError::BufferUnderflow
    pub fn ensure_available(&mut self, n: usize) -> Result<(), DecodeError> {
        let mut deficit = n.saturating_sub(self.buffer.len());
        while deficit > 0 {
            let request = deficit.min(MAX_PULL);
            let pull = self.buffer.fill_from(&mut self.source, request)?;
            trace!("pulled {} of {} requested bytes (end of stream: {})", pull.len, request, pull.end_of_stream);
            deficit -= pull.len;
            if pull.len < request || pull.end_of_stream { break; }
        }
        if deficit == 0 { return Ok(()); }
        let available = self.buffer.len();
        debug!("buffer underflow: {n} bytes requested, {available} available");
        Err(DecodeError::BufferUnderflow { requested: n, available })
    }

    /// Decode a value of plain data.
    /// ```
    /// # use bin_stream::{Decoder, Endian};
    /// let mut decoder = Decoder::from_bytes([0xFF, 0xFE, 0x3F, 0xC0, 0x00, 0x00], Endian::Big);
    /// assert_eq!(decoder.read::<i16>().unwrap(), -2);
    /// assert_eq!(decoder.read::<f32>().unwrap(), 1.5);
    /// ```
    pub fn read<T: PlainData>(&mut self) -> Result<T, DecodeError> {
        self.ensure_available(T::WIDTH)?;
        let value = T::from_bytes(&self.buffer.as_slice()[..T::WIDTH], self.endian);
        self.buffer.consume(T::WIDTH);
        Ok(value)
    }

    /// Decode a `u8`.
    pub fn read_u8(&mut self) -> Result<u8, DecodeError> { self.read() }
    /// Decode a `u16` in the configured byte order.
    pub fn read_u16(&mut self) -> Result<u16, DecodeError> { self.read() }
    /// Decode a `u32` in the configured byte order.
    pub fn read_u32(&mut self) -> Result<u32, DecodeError> { self.read() }
    /// Decode a `u64` in the configured byte order.
    pub fn read_u64(&mut self) -> Result<u64, DecodeError> { self.read() }

    /// Read `n` raw bytes into a fresh, independent buffer.
    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>, DecodeError> {
        self.ensure_available(n)?;
        Ok(self.buffer.take(n))
    }

    /// Advance past `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<(), DecodeError> {
        self.ensure_available(n)?;
        self.buffer.consume(n);
        Ok(())
    }

    /// Read a string of exactly `n` bytes. The bytes are not validated as UTF-8.
    pub fn read_fixed_string(&mut self, n: usize) -> Result<BString, DecodeError> {
        self.read_bytes(n).map(BString::from)
    }

    /// Read every retained byte as a string, without pulling from the source.
    ///
    /// Only meaningful when the whole input is known to be present, e.g. for
    /// [`from_bytes`](Decoder::from_bytes) decoders.
    pub fn read_remaining_string(&mut self) -> Result<BString, DecodeError> {
        self.read_fixed_string(self.buffer.len())
    }

    /// Read a string terminated by a zero byte. The terminator is consumed but not returned.
    ///
    /// The source is pulled one byte at a time while looking for the terminator, so it is never
    /// read past it. Nothing is consumed until the terminator is found, so like every other read
    /// this one can be retried after a [`BufferUnderflow`](DecodeError::BufferUnderflow).
    pub fn read_null_terminated_string(&mut self) -> Result<BString, DecodeError> {
        let mut scanned = 0;
        let end = loop {
            if let Some(offset) = self.buffer.as_slice()[scanned..].find_byte(0) {
                break scanned + offset;
            }
            scanned = self.buffer.len();
            self.ensure_available(scanned + 1)?;
        };
        let string = self.buffer.take(end);
        self.buffer.consume(1);
        Ok(BString::from(string))
    }

    /// Read a length prefix of the given width, followed by that many raw bytes.
    ///
    /// The prefix is only consumed together with the payload: if the payload is incomplete, the
    /// whole read fails and can be retried from the prefix. A length beyond the configured
    /// [`length_limit`](crate::DecoderBuilder::length_limit) fails with
    /// [`LengthLimitExceeded`](DecodeError::LengthLimitExceeded); without a limit, a length too
    /// large to address is reported as a [`BufferUnderflow`](DecodeError::BufferUnderflow) of
    /// `usize::MAX` bytes.
    pub fn read_prefixed_bytes(&mut self, prefix: LengthPrefix) -> Result<Vec<u8>, DecodeError> {
        let width = prefix.width();
        self.ensure_available(width)?;
        let length = self.endian.compose(&self.buffer.as_slice()[..width]);
        let payload = usize::try_from(length).ok();
        if let Some(limit) = self.length_limit {
            if payload.map_or(true, |len| len > limit) {
                return Err(DecodeError::LengthLimitExceeded { length, limit });
            }
        }
        // a length that cannot even be addressed will never be satisfied
        let Some(total) = payload.and_then(|len| len.checked_add(width)) else {
            let available = self.buffer.len();
            debug!("buffer underflow: length prefix {length} is not addressable, {available} available");
            return Err(DecodeError::BufferUnderflow { requested: usize::MAX, available });
        };
        self.ensure_available(total)?;
        self.buffer.consume(width);
        Ok(self.buffer.take(total - width))
    }

    /// Read a length prefix of the given width, followed by a string of that many bytes.
    pub fn read_prefixed_string(&mut self, prefix: LengthPrefix) -> Result<BString, DecodeError> {
        self.read_prefixed_bytes(prefix).map(BString::from)
    }

    /// Read a string prefixed by its length as a `u8`.
    pub fn read_u8_prefixed_string(&mut self) -> Result<BString, DecodeError> {
        self.read_prefixed_string(LengthPrefix::U8)
    }
    /// Read a string prefixed by its length as a `u16`.
    pub fn read_u16_prefixed_string(&mut self) -> Result<BString, DecodeError> {
        self.read_prefixed_string(LengthPrefix::U16)
    }
    /// Read a string prefixed by its length as a `u32`.
    pub fn read_u32_prefixed_string(&mut self) -> Result<BString, DecodeError> {
        self.read_prefixed_string(LengthPrefix::U32)
    }
    /// Read a string prefixed by its length as a `u64`.
    pub fn read_u64_prefixed_string(&mut self) -> Result<BString, DecodeError> {
        self.read_prefixed_string(LengthPrefix::U64)
    }
}
