//! Byte order for multi-byte integers.

/// Endianness for integers, floating-point numbers, etc.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Endian {
    /// Little-endian.
    Little,
    /// Big-endian.
    Big,
}

impl Endian {
    /// Byte order of the target platform.
    #[cfg(target_endian = "little")]
    pub const NATIVE: Endian = Endian::Little;
    /// Byte order of the target platform.
    #[cfg(target_endian = "big")]
    pub const NATIVE: Endian = Endian::Big;

    /// Assemble up to 8 bytes into an integer, treating them as one value in this byte order.
    ///
    /// Bytes beyond the 8th would be shifted out; callers never pass more than that.
    /// ```
    /// # use bin_stream::Endian;
    /// assert_eq!(Endian::Big.compose(&[0x00, 0x68, 0x65, 0x6C]), 0x0068_656C);
    /// assert_eq!(Endian::Little.compose(&[0x00, 0x68, 0x65, 0x6C]), 0x6C65_6800);
    /// ```
    pub fn compose(self, bytes: &[u8]) -> u64 {
        debug_assert!(bytes.len() <= 8, "cannot compose {} bytes into a u64", bytes.len());
        let push = |acc: u64, &byte: &u8| acc << 8 | u64::from(byte);
        match self {
            Endian::Big => bytes.iter().fold(0, push),
            Endian::Little => bytes.iter().rev().fold(0, push),
        }
    }
}
