/// Lowercase hex alphabet.
pub const LOWER: &[u8; 16] = b"0123456789abcdef";

/// Uppercase hex alphabet.
pub const UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// `b'A' ^ b'a'`: flips the case of an ASCII letter.
pub const CASE_DIFF: u8 = 0x20;

#[inline]
pub const fn alphabet(upper: bool) -> &'static [u8; 16] {
    if upper { UPPER } else { LOWER }
}

#[inline]
pub(crate) const fn hi(table: &[u8; 16], b: u8) -> u8 { table[(b >> 4) as usize] }

#[inline]
pub(crate) const fn lo(table: &[u8; 16], b: u8) -> u8 { table[(b & 0x0F) as usize] }
