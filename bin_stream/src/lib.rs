//! Incremental decoding of integers and strings from binary streams.
//!
//! A [`Decoder`] reads fixed-width integers and a few string encodings (null-terminated,
//! length-prefixed, fixed-length, remainder) from a [`Source`], in a configurable byte order.
//! Input may arrive in pieces: a read that cannot be completed yet fails with
//! [`DecodeError::BufferUnderflow`] without consuming anything, and can be retried later.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

mod buffer;
pub mod builder;
pub mod data;
pub mod decoder;
pub mod endian;
pub mod stream;

pub use builder::DecoderBuilder;
pub use data::{LengthPrefix, PlainData};
pub use decoder::Decoder;
pub use endian::Endian;
pub use stream::{DecodeError, Exhausted, Pipe, Pull, ReadSource, Source};
