use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use engine_logging::engine_warn;

/// Report HTML converted to UTF-8, with the encoding that was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedReport {
    pub html: String,
    pub encoding_label: String,
    /// Set when malformed sequences were replaced with U+FFFD.
    pub had_errors: bool,
}

/// Decode a report body: BOM, then Content-Type charset, then chardetng guess.
///
/// The legacy report server answers in a single-byte charset more often than
/// in UTF-8, so the header is trusted before any detection. Malformed byte
/// sequences become U+FFFD and are logged; they never fail the run.
pub fn decode_report(bytes: &[u8], content_type: Option<&str>) -> DecodedReport {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Some(enc) = content_type
        .and_then(charset_label)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return decode_with(bytes, enc);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    decode_with(bytes, detector.guess(None, true))
}

fn charset_label(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches(['"', '\'']).to_string())
        } else {
            None
        }
    })
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> DecodedReport {
    let (text, _, had_errors) = enc.decode(bytes);
    if had_errors {
        engine_warn!("Report is not valid {}; malformed bytes replaced", enc.name());
    }
    DecodedReport {
        html: text.into_owned(),
        encoding_label: enc.name().to_string(),
        had_errors,
    }
}
