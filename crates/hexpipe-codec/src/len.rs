//! Length arithmetic for plain, formatted and parsed hex.
//!
//! Results saturate at the integer maximum instead of overflowing.

use crate::config::{FormatConfig, Layout};
use crate::error::{Error, Result};

/// Hex length of `n` source bytes.
#[inline]
pub const fn encoded(n: usize) -> usize { n.saturating_mul(2) }

#[inline]
pub const fn encoded64(n: u64) -> u64 { n.saturating_mul(2) }

/// Source length of `n` hex characters.
pub fn decoded(n: isize) -> Result<isize> { decoded64(n as i64).map(|d| d as isize) }

pub fn decoded64(n: i64) -> Result<i64> {
    if n < 0 {
        return Err(Error::NegativeLength(n));
    }
    if n & 1 != 0 {
        return Err(Error::OddLength(n));
    }
    Ok(n / 2)
}

/// Output length of formatting `n` source bytes with `cfg`.
pub fn formatted(n: usize, cfg: &FormatConfig) -> usize {
    usize::try_from(formatted64(n as u64, cfg)).unwrap_or(usize::MAX)
}

pub fn formatted64(n: u64, cfg: &FormatConfig) -> u64 {
    if n == 0 {
        return 0;
    }
    match cfg.layout() {
        Layout::Plain => encoded64(n),
        Layout::Blocked { block_len, sep } => {
            let block = block_len.get() as u64;
            let stride = block.saturating_mul(2).saturating_add(sep.len() as u64);
            ((n - 1) / block).saturating_mul(stride).saturating_add(((n - 1) % block + 1).saturating_mul(2))
        }
    }
}

/// Number of whole source bytes represented by the first `x` characters of a
/// formatted output. Exact on complete outputs, monotonic on truncated ones.
pub fn parsed(x: usize, cfg: &FormatConfig) -> usize { parsed64(x as u64, cfg) as usize }

pub fn parsed64(x: u64, cfg: &FormatConfig) -> u64 {
    if x == 0 {
        return 0;
    }
    match cfg.layout() {
        Layout::Plain => x / 2,
        Layout::Blocked { block_len, sep } => {
            let block = block_len.get() as u64;
            let stride = block.saturating_mul(2).saturating_add(sep.len() as u64);
            let tail = (x % stride).min(block.saturating_mul(2));
            x / stride * block + tail / 2
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn blocked(sep: &str, block_len: usize) -> FormatConfig {
        FormatConfig::new().sep(sep).block_len(block_len)
    }

    #[test]
    fn decoded_rejects_negative_and_odd() {
        assert!(matches!(decoded(-2), Err(Error::NegativeLength(-2))));
        assert!(matches!(decoded(3), Err(Error::OddLength(3))));
        assert_eq!(decoded(0).unwrap(), 0);
        assert_eq!(decoded(10).unwrap(), 5);
        assert_eq!(decoded64(-1).unwrap_err().to_string(), "hex length is negative: -1");
        assert_eq!(decoded64(7).unwrap_err().to_string(), "hex length is odd: 7");
    }

    #[test]
    fn formatted_examples() {
        let cfg = blocked(" ", 4);
        assert_eq!(formatted(0, &cfg), 0);
        assert_eq!(formatted(1, &cfg), 2);
        assert_eq!(formatted(4, &cfg), 8);
        assert_eq!(formatted(5, &cfg), 11);
        assert_eq!(formatted(12, &cfg), 26);
        assert_eq!(formatted(5, &FormatConfig::new()), 10);
    }

    #[test]
    fn huge_lengths_saturate() {
        assert_eq!(encoded(usize::MAX), usize::MAX);
        assert_eq!(encoded64(u64::MAX / 2 + 1), u64::MAX);
        assert_eq!(formatted(usize::MAX, &blocked(" ", 1)), usize::MAX);
        assert_eq!(formatted64(u64::MAX, &blocked(" ", usize::MAX)), u64::MAX);
        assert_eq!(parsed(usize::MAX, &blocked(" ", usize::MAX)), usize::MAX);
    }

    #[test]
    fn parsed_truncated_is_monotonic() {
        let cfg = blocked(" | ", 2);
        let full = formatted(7, &cfg);
        let mut last = 0;
        for x in 0..=full {
            let p = parsed(x, &cfg);
            assert!(p >= last, "parsed({x}) = {p} < {last}");
            last = p;
        }
        assert_eq!(last, 7);
    }

    proptest! {
        #[test]
        fn parsed_inverts_formatted(n in 0usize..4096, block in 0usize..33, sep in "[ :|-]{0,3}") {
            let cfg = blocked(&sep, block);
            prop_assert_eq!(parsed(formatted(n, &cfg), &cfg), n);
            prop_assert_eq!(parsed(encoded(n), &FormatConfig::new()), n);
        }

        #[test]
        fn formatted_matches_closed_form(n in 1u64..100_000, block in 1u64..64, sep in "[ ,]{1,4}") {
            let cfg = blocked(&sep, block as usize);
            let s = sep.len() as u64;
            let want = (n - 1) / block * (2 * block + s) + ((n - 1) % block + 1) * 2;
            prop_assert_eq!(formatted64(n, &cfg), want);
        }

        #[test]
        fn decoded_even_halves(x in 0i64..i64::MAX) {
            if x % 2 == 0 {
                prop_assert_eq!(decoded64(x).unwrap(), x / 2);
            } else {
                prop_assert!(matches!(decoded64(x), Err(Error::OddLength(_))));
            }
        }
    }
}
