//! Configuration for building a [`Decoder`].
//!
//! The byte order has no sensible default, so [`DecoderBuilder`] tracks at the type level whether
//! it has been specified: [`build`](DecoderBuilder::build) only exists once
//! [`endian`](DecoderBuilder::endian) has been called.
//! ```compile_fail
//! # use bin_stream::{Decoder, Exhausted};
//! let decoder = Decoder::builder().length_limit(16).build(Exhausted);
//! ```

use crate::buffer::Retained;
use crate::decoder::Decoder;
use crate::endian::Endian;
use crate::stream::{Exhausted, Source};

/// Placeholder for a required setting without a default value.
#[derive(Default, Debug, Copy, Clone)]
pub struct Required;

/// A provided setting. This is deliberately not [`Default`], to prevent accidentally supplying
/// default values for required settings.
#[derive(Debug, Copy, Clone)]
pub struct Provided<T>(pub T);

/// Builder for [`Decoder`]s.
/// ```
/// # use bin_stream::{Decoder, Endian};
/// let mut decoder = Decoder::builder()
///     .endian(Endian::Big)
///     .length_limit(4)
///     .build_from_bytes([0x00, 0x05, b'h', b'e', b'l', b'l', b'o']);
/// assert!(!decoder.read_u16_prefixed_string().unwrap_err().is_underflow());
/// assert_eq!(decoder.read_u16().unwrap(), 5);
/// ```
#[derive(Default, Debug, Copy, Clone)]
pub struct DecoderBuilder<E> {
    endian: E,
    length_limit: Option<usize>,
    capacity: usize,
}

impl DecoderBuilder<Required> {
    pub(crate) fn new() -> Self { DecoderBuilder::default() }
}

impl<E> DecoderBuilder<E> {
    /// Specify the byte order for every multi-byte read.
    pub fn endian(self, endian: Endian) -> DecoderBuilder<Provided<Endian>> {
        DecoderBuilder { endian: Provided(endian), length_limit: self.length_limit, capacity: self.capacity }
    }

    /// Reject length prefixes larger than `limit` with
    /// [`LengthLimitExceeded`](crate::DecodeError::LengthLimitExceeded).
    pub fn length_limit(self, limit: usize) -> Self {
        DecoderBuilder { length_limit: Some(limit), ..self }
    }

    /// Pre-allocate room for `capacity` retained bytes.
    pub fn capacity(self, capacity: usize) -> Self {
        DecoderBuilder { capacity, ..self }
    }
}

impl DecoderBuilder<Provided<Endian>> {
    /// Finish building a decoder pulling from `source`.
    pub fn build<S: Source>(self, source: S) -> Decoder<S> {
        Decoder::from_parts(source, Retained::with_capacity(self.capacity), self.endian.0, self.length_limit)
    }

    /// Finish building a decoder over in-memory bytes, all of them immediately available.
    pub fn build_from_bytes(self, bytes: impl Into<Vec<u8>>) -> Decoder<Exhausted> {
        let mut bytes = bytes.into();
        bytes.reserve(self.capacity.saturating_sub(bytes.len()));
        Decoder::from_parts(Exhausted, Retained::from_vec(bytes), self.endian.0, self.length_limit)
    }
}
