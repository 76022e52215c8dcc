//! Fixed-width hex rendering of `i64`.
//!
//! Output is an optional `-`, left padding with `0` up to `digits` nibbles, and
//! the significant nibbles. `digits` never counts the sign. Zero renders as
//! `"0"` when `digits <= 1`, and `i64::MIN` as `"-8000000000000000"`.

use std::io::{self, Write};

use crate::error::Error;
use crate::pool::{INT64_SCRATCH_LEN, PoolRegistry};
use crate::table::alphabet;

const ZEROS: [u8; 64] = [b'0'; 64];

/// Buffer length [`encode_int64_into`] requires for `digits`.
pub const fn dst_len(digits: usize) -> usize {
    let n = digits.saturating_add(1);
    if n > INT64_SCRATCH_LEN { n } else { INT64_SCRATCH_LEN }
}

/// Writes the significant nibbles of `|x|` right-aligned in `scratch` and
/// returns the index of the first one.
fn render_body(x: i64, upper: bool, scratch: &mut [u8]) -> usize {
    let table = alphabet(upper);
    // unsigned_abs keeps i64::MIN representable.
    let mut v = x.unsigned_abs();
    let mut at = scratch.len();
    loop {
        at -= 1;
        scratch[at] = table[(v & 0x0F) as usize];
        v >>= 4;
        if v == 0 {
            return at;
        }
    }
}

/// Renders `x` into the start of `dst` and returns the number of bytes written.
///
/// # Panics
///
/// Panics if `dst.len() < dst_len(digits)`; the message carries the required length.
pub fn encode_int64_into(dst: &mut [u8], x: i64, upper: bool, digits: usize) -> usize {
    let required = dst_len(digits);
    if dst.len() < required {
        panic!("{}", Error::DstTooSmall { required, actual: dst.len() });
    }
    let mut scratch = PoolRegistry::global().int64.lease();
    let start = render_body(x, upper, &mut scratch);
    let body = &scratch[start..];
    let pad = digits.saturating_sub(body.len());

    let mut at = 0;
    if x < 0 {
        dst[0] = b'-';
        at = 1;
    }
    dst[at..at + pad].fill(b'0');
    at += pad;
    dst[at..at + body.len()].copy_from_slice(body);
    at + body.len()
}

pub fn encode_int64(x: i64, upper: bool, digits: usize) -> String {
    let mut out = vec![0u8; dst_len(digits)];
    let n = encode_int64_into(&mut out, x, upper, digits);
    out.truncate(n);
    // Only ASCII was written.
    out.into_iter().map(char::from).collect()
}

/// Streams the rendering of `x` to `sink` and returns the number of bytes written.
///
/// Below 17 digits the whole rendering is assembled in one pooled scratch
/// buffer and written at once. Wider renderings send the sign and the padding
/// ahead of the body, so no scratch larger than 17 bytes is used.
pub fn write_int64<W: Write + ?Sized>(sink: &mut W, x: i64, upper: bool, digits: usize) -> io::Result<usize> {
    let mut scratch = PoolRegistry::global().int64.lease();
    let start = render_body(x, upper, &mut scratch);
    let body_len = scratch.len() - start;
    let pad = digits.saturating_sub(body_len);
    let neg = x < 0;

    if digits < INT64_SCRATCH_LEN {
        // sign + pad + body fits: pad <= digits - body_len and digits <= 16.
        let mut head = start - pad;
        scratch[head..start].fill(b'0');
        if neg {
            head -= 1;
            scratch[head] = b'-';
        }
        sink.write_all(&scratch[head..])?;
        return Ok(scratch.len() - head);
    }

    if neg {
        sink.write_all(b"-")?;
    }
    let mut left = pad;
    while left > 0 {
        let n = left.min(ZEROS.len());
        sink.write_all(&ZEROS[..n])?;
        left -= n;
    }
    sink.write_all(&scratch[start..])?;
    Ok(usize::from(neg) + pad + body_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn streamed(x: i64, upper: bool, digits: usize) -> String {
        let mut out = Vec::new();
        let n = write_int64(&mut out, x, upper, digits).unwrap();
        assert_eq!(n, out.len());
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn canonical_forms() {
        assert_eq!(encode_int64(0, false, 0), "0");
        assert_eq!(encode_int64(0, false, 1), "0");
        assert_eq!(encode_int64(0, false, 4), "0000");
        assert_eq!(encode_int64(-1, false, 0), "-1");
        assert_eq!(encode_int64(-1, false, 4), "-0001");
        assert_eq!(encode_int64(255, true, 0), "FF");
        assert_eq!(encode_int64(255, false, 1), "ff");
        assert_eq!(encode_int64(i64::MAX, false, 0), "7fffffffffffffff");
        assert_eq!(encode_int64(i64::MIN, false, 0), "-8000000000000000");
        assert_eq!(encode_int64(i64::MIN, false, 16), "-8000000000000000");
        assert_eq!(encode_int64(i64::MIN, false, 20), "-00008000000000000000");
    }

    #[test]
    fn wide_padding_streams() {
        let s = streamed(-0x1234, true, 40);
        assert_eq!(s.len(), 41);
        assert_eq!(&s[..1], "-");
        assert!(s.ends_with("0001234"));
        assert_eq!(s, encode_int64(-0x1234, true, 40));
        assert_eq!(streamed(7, false, 100).len(), 100);
    }

    #[test]
    fn dst_len_covers_sign() {
        assert_eq!(dst_len(0), 17);
        assert_eq!(dst_len(16), 17);
        assert_eq!(dst_len(17), 18);
        assert_eq!(dst_len(32), 33);
    }

    #[test]
    #[should_panic(expected = "18 bytes required, got 17")]
    fn short_dst_panics_with_required_len() {
        let mut dst = [0u8; 17];
        encode_int64_into(&mut dst, 1, false, 17);
    }

    #[test]
    fn scratch_is_returned() {
        let before = PoolRegistry::global().int64.stats();
        let _ = encode_int64(42, false, 8);
        let _ = streamed(42, false, 30);
        let after = PoolRegistry::global().int64.stats();
        assert!(after.returned - before.returned >= 2);
    }

    proptest! {
        #[test]
        fn forms_agree_and_parse_back(x in any::<i64>(), upper in any::<bool>(), digits in 0usize..40) {
            let s = encode_int64(x, upper, digits);
            prop_assert_eq!(i64::from_str_radix(&s, 16).unwrap(), x);
            prop_assert_eq!(&streamed(x, upper, digits), &s);

            let mut dst = vec![0u8; dst_len(digits)];
            let n = encode_int64_into(&mut dst, x, upper, digits);
            prop_assert_eq!(&dst[..n], s.as_bytes());

            let unsigned_len = s.trim_start_matches('-').len();
            prop_assert!(unsigned_len >= digits.max(1));
        }
    }
}
