//! Case-insensitive checks of hex text against raw bytes, without encoding.

use crate::table::{CASE_DIFF, LOWER, hi, lo};

/// Whether `hex` nibble `c` (either case) spells `want` from the lower alphabet.
///
/// Digits already carry the `0x20` bit, so OR-ing folds only letters. Bytes
/// below `'0'` could fold onto a digit, hence the range check first.
#[inline]
fn nibble_eq(want: u8, c: u8) -> bool { c >= b'0' && want == c | CASE_DIFF }

/// Whether `src` encodes to `hex`, ignoring letter case.
///
/// ```
/// use hexpipe_codec::can_encode_to;
///
/// assert!(can_encode_to(b"\xca\xfe", b"CAfe"));
/// assert!(!can_encode_to(b"\xca\xfe", b"cafd"));
/// ```
pub fn can_encode_to(src: &[u8], hex: &[u8]) -> bool {
    if src.len() * 2 != hex.len() {
        return false;
    }
    src.iter()
        .zip(hex.chunks_exact(2))
        .all(|(&b, pair)| nibble_eq(hi(LOWER, b), pair[0]) && nibble_eq(lo(LOWER, b), pair[1]))
}

/// Whether `prefix` is a prefix of the encoding of `src`, ignoring letter case.
///
/// Odd lengths are allowed: the last character is checked against the high
/// nibble of the next source byte.
pub fn can_encode_to_prefix(src: &[u8], prefix: &[u8]) -> bool {
    if prefix.len() > src.len() * 2 {
        return false;
    }
    let whole = prefix.len() / 2;
    if !can_encode_to(&src[..whole], &prefix[..whole * 2]) {
        return false;
    }
    match prefix.len() % 2 {
        0 => true,
        _ => nibble_eq(hi(LOWER, src[whole]), prefix[prefix.len() - 1]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode_to_string;
    use proptest::prelude::*;

    #[test]
    fn rejects_length_mismatch() {
        assert!(!can_encode_to(b"\x01", b"0"));
        assert!(!can_encode_to(b"\x01", b"010"));
        assert!(can_encode_to(b"", b""));
    }

    #[test]
    fn rejects_bytes_that_fold_onto_digits() {
        // 0x10 | 0x20 == b'0'
        assert!(!can_encode_to(b"\x00", b"\x10\x10"));
        assert!(!can_encode_to_prefix(b"\x00", b"\x10"));
    }

    #[test]
    fn rejects_non_hex_letters() {
        assert!(!can_encode_to(b"\xab", b"ag"));
        assert!(!can_encode_to(b"\xab", b"a "));
    }

    #[test]
    fn odd_prefixes() {
        assert!(can_encode_to_prefix(b"\xde\xad", b""));
        assert!(can_encode_to_prefix(b"\xde\xad", b"D"));
        assert!(can_encode_to_prefix(b"\xde\xad", b"dEa"));
        assert!(!can_encode_to_prefix(b"\xde\xad", b"deb"));
        assert!(!can_encode_to_prefix(b"\xde\xad", b"dead0"));
    }

    proptest! {
        #[test]
        fn accepts_own_encoding(src in proptest::collection::vec(any::<u8>(), 0..64), upper in any::<bool>()) {
            let hex = encode_to_string(&src, upper);
            prop_assert!(can_encode_to(&src, hex.as_bytes()));
            for end in 0..=hex.len() {
                prop_assert!(can_encode_to_prefix(&src, &hex.as_bytes()[..end]));
            }
        }

        #[test]
        fn rejects_flipped_nibble(
            src in proptest::collection::vec(any::<u8>(), 1..64),
            upper in any::<bool>(),
            pick in any::<prop::sample::Index>(),
            delta in 1u8..16,
        ) {
            let mut hex = encode_to_string(&src, upper).into_bytes();
            let at = pick.index(hex.len());
            let nibble = (hex[at] as char).to_digit(16).unwrap() as u8;
            let table = if upper { crate::table::UPPER } else { LOWER };
            hex[at] = table[((nibble + delta) & 0x0F) as usize];
            prop_assert!(!can_encode_to(&src, &hex));
        }
    }
}
