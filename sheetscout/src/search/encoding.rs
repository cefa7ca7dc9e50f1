// Character encoding detection for CSV files.
//
// Spreadsheet exports come in whatever codepage the exporting machine used.
// Detection runs in this order and never fails: a wrong guess only garbles
// characters, it does not abort the file.
//   1. Byte order mark (UTF-8, UTF-16LE, UTF-16BE)
//   2. The encoding forced with `--encoding`, if any
//   3. BOM-less UTF-16, recognised by its pattern of zero bytes (checked
//      before UTF-8 because ASCII-only UTF-16 is also valid UTF-8)
//   4. Valid UTF-8
//   5. chardetng's guess among the legacy codepages (windows-125x, KOI8,
//      Shift_JIS, EUC-KR, GBK, Big5, ...)

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use tracing::trace;

/// Number of leading bytes inspected by the UTF-16 heuristic
const UTF16_SAMPLE: usize = 512;

/// Decoded file content and the encoding that produced it
#[derive(Debug)]
pub struct Decoded {
    pub text: String,
    pub encoding: &'static Encoding,
}

/// Picks an encoding for `bytes` without decoding them. Returns the
/// encoding and the length of its BOM.
pub fn detect_encoding(
    bytes: &[u8],
    forced: Option<&'static Encoding>,
) -> (&'static Encoding, usize) {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return (encoding, bom_len);
    }
    if let Some(encoding) = forced {
        return (encoding, 0);
    }
    if let Some(encoding) = sniff_utf16(bytes) {
        return (encoding, 0);
    }
    if std::str::from_utf8(bytes).is_ok() {
        return (UTF_8, 0);
    }
    (guess_legacy(bytes), 0)
}

/// Decodes `bytes` with the detected encoding
pub fn decode_text(bytes: &[u8], forced: Option<&'static Encoding>) -> Decoded {
    let (encoding, bom_len) = detect_encoding(bytes, forced);
    let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
    trace!(
        "Decoded {} bytes as {} (replacements: {})",
        bytes.len(),
        encoding.name(),
        had_errors
    );
    Decoded {
        text: text.into_owned(),
        encoding,
    }
}

fn guess_legacy(bytes: &[u8]) -> &'static Encoding {
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, false)
}

/// Text in UTF-16 has a zero high byte for every ASCII character, so one of
/// the two byte lanes is mostly zeros while the other is not.
fn sniff_utf16(bytes: &[u8]) -> Option<&'static Encoding> {
    let sample = &bytes[..bytes.len().min(UTF16_SAMPLE)];
    let pairs = sample.len() / 2;
    if pairs < 2 {
        return None;
    }

    let even_zeros = sample.iter().step_by(2).filter(|&&b| b == 0).count();
    let odd_zeros = sample.iter().skip(1).step_by(2).filter(|&&b| b == 0).count();

    let mostly = |zeros: usize| zeros * 10 >= pairs * 4;
    let rarely = |zeros: usize| zeros * 20 <= pairs;

    if mostly(odd_zeros) && rarely(even_zeros) {
        Some(UTF_16LE)
    } else if mostly(even_zeros) && rarely(odd_zeros) {
        Some(UTF_16BE)
    } else {
        None
    }
}
