//! Plain old data that can be decoded directly from raw bytes.

use crate::endian::Endian;

/// Plain old data, can be directly decoded from a fixed number of raw bytes.
///
/// Implemented for the primitive integers up to 64 bits, and for `f32` and `f64`.
pub trait PlainData: Sized + sealed::Sealed {
    /// Number of bytes occupied in the binary data.
    const WIDTH: usize;
    /// Reinterpret the low [`WIDTH`](PlainData::WIDTH) bytes of `bits` as `Self`.
    fn from_bits(bits: u64) -> Self;
    /// Decode from exactly [`WIDTH`](PlainData::WIDTH) bytes in the given byte order.
    fn from_bytes(bytes: &[u8], endian: Endian) -> Self {
        debug_assert_eq!(bytes.len(), Self::WIDTH);
        Self::from_bits(endian.compose(bytes))
    }
}

mod sealed { pub trait Sealed {} }

macro_rules! impl_plain_data {
    ($($t:ty => $bits:ty),+ $(,)?) => {
        $(
            impl sealed::Sealed for $t {}
            impl PlainData for $t {
                const WIDTH: usize = std::mem::size_of::<Self>();
                #[allow(clippy::cast_possible_truncation)]
                fn from_bits(bits: u64) -> Self { <$t>::from_ne_bytes((bits as $bits).to_ne_bytes()) }
            }
        )+
    }
}

impl_plain_data! {
    u8 => u8, u16 => u16, u32 => u32, u64 => u64,
    i8 => u8, i16 => u16, i32 => u32, i64 => u64,
    f32 => u32, f64 => u64,
}

/// Width of the length prefix in front of a length-prefixed string.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum LengthPrefix {
    /// One byte, lengths up to 255.
    U8,
    /// Two bytes.
    U16,
    /// Four bytes.
    U32,
    /// Eight bytes.
    U64,
}

impl LengthPrefix {
    /// Number of bytes occupied by the prefix itself.
    pub fn width(self) -> usize {
        match self {
            LengthPrefix::U8 => 1,
            LengthPrefix::U16 => 2,
            LengthPrefix::U32 => 4,
            LengthPrefix::U64 => 8,
        }
    }
}
