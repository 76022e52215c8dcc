use std::io::Write;

use hexpipe_codec::{
    DumpConfig, FormatConfig, HexDumper, HexEncoder, HexFormatter, dump_to_vec, encode_to_string,
    format_to_string, len,
};
use proptest::prelude::*;

/// Splits `src` at the given cut points (taken modulo the length).
fn split<'a>(src: &'a [u8], cuts: &[usize]) -> Vec<&'a [u8]> {
    let mut points: Vec<usize> = cuts.iter().map(|c| if src.is_empty() { 0 } else { c % src.len() }).collect();
    points.sort_unstable();
    let mut parts = Vec::new();
    let mut at = 0;
    for p in points {
        parts.push(&src[at..p]);
        at = p;
    }
    parts.push(&src[at..]);
    parts
}

fn arb_format() -> impl Strategy<Value = FormatConfig> {
    ("[ :|]{0,3}", 0usize..9, any::<bool>())
        .prop_map(|(sep, block_len, upper)| FormatConfig::new().sep(sep).block_len(block_len).upper(upper))
}

fn marked_dump(format: FormatConfig, blocks_per_line: usize) -> DumpConfig {
    DumpConfig::new(format)
        .blocks_per_line(blocks_per_line)
        .line_sep("\n")
        .prefix(|| b"<".to_vec())
        .suffix(|line| format!(">{}", line.len()).into_bytes())
}

/// Strips the framing added by `marked_dump`, leaving the hex runs.
fn strip_frames(dump: &[u8], sep: &str) -> String {
    let text = String::from_utf8(dump.to_vec()).unwrap();
    text.lines()
        .map(|line| {
            let body = line.strip_prefix('<').unwrap();
            let body = &body[..body.rfind('>').unwrap()];
            if sep.is_empty() { body.to_string() } else { body.replace(sep, "") }
        })
        .collect()
}

proptest! {
    #[test]
    fn encoder_split_equivalence(
        src in proptest::collection::vec(any::<u8>(), 0..3000),
        cuts in proptest::collection::vec(any::<usize>(), 0..6),
        upper in any::<bool>(),
    ) {
        let mut enc = HexEncoder::new(Vec::new(), upper);
        for part in split(&src, &cuts) {
            enc.write_all(part).unwrap();
        }
        enc.close().unwrap();
        let got = enc.into_inner();
        prop_assert_eq!(hex::decode(&got).unwrap(), src.clone());
        prop_assert_eq!(got, encode_to_string(&src, upper).into_bytes());
    }

    #[test]
    fn formatter_split_equivalence(
        src in proptest::collection::vec(any::<u8>(), 0..2000),
        cuts in proptest::collection::vec(any::<usize>(), 0..6),
        cfg in arb_format(),
    ) {
        let mut f = HexFormatter::new(Vec::new(), &cfg);
        for part in split(&src, &cuts) {
            f.write_all(part).unwrap();
        }
        f.close().unwrap();
        let got = String::from_utf8(f.into_inner()).unwrap();

        prop_assert_eq!(&got, &format_to_string(&src, &cfg));
        prop_assert_eq!(got.len(), len::formatted(src.len(), &cfg));
        let stripped = if cfg.is_valid() { got.replace(&cfg.sep, "") } else { got.clone() };
        prop_assert_eq!(stripped, encode_to_string(&src, cfg.upper));
    }

    #[test]
    fn dumper_split_equivalence(
        src in proptest::collection::vec(any::<u8>(), 0..600),
        cuts in proptest::collection::vec(any::<usize>(), 0..6),
        sep in "[ :]{0,2}",
        block_len in 1usize..6,
        blocks_per_line in 1usize..5,
        upper in any::<bool>(),
    ) {
        let format = FormatConfig::new().sep(sep.clone()).block_len(block_len).upper(upper);
        let whole = dump_to_vec(&src, marked_dump(format.clone(), blocks_per_line)).unwrap();

        let mut dumper = HexDumper::new(Vec::new(), marked_dump(format, blocks_per_line));
        for part in split(&src, &cuts) {
            dumper.write_all(part).unwrap();
        }
        dumper.close().unwrap();
        prop_assert_eq!(&dumper.into_inner(), &whole);

        prop_assert_eq!(strip_frames(&whole, &sep), encode_to_string(&src, upper));
        let lines = src.len().div_ceil(block_len * blocks_per_line).max(1);
        prop_assert_eq!(whole.iter().filter(|&&c| c == b'\n').count(), lines);
    }
}
