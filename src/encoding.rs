//! Charset handling for fetched pages.
//!
//! The server's Content-Type charset is tried first, then a `<meta>` charset
//! declaration sniffed from the head of the body, then UTF-8. Decoding is
//! always lossy so a mislabeled page degrades to replacement characters
//! instead of failing the fetch.

use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;

static META_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s>;]+)"#).unwrap()
});

/// Decode raw body bytes to a UTF-8 string.
///
/// `header_charset` is the charset parameter from the Content-Type response
/// header, if the server sent one.
pub fn decode_body(bytes: &[u8], header_charset: Option<&str>) -> String {
    let encoding = header_charset
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or_else(|| sniff_meta_charset(bytes));
    let (decoded, _, _) = encoding.decode(bytes);
    decoded.into_owned()
}

/// Look for `<meta charset=...>` (or the http-equiv form, which the same
/// pattern catches) in the first 1024 bytes. UTF-8 when nothing matches.
fn sniff_meta_charset(bytes: &[u8]) -> &'static Encoding {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(1024)]);
    META_CHARSET_RE
        .captures(&head)
        .and_then(|c| Encoding::for_label(c[1].as_bytes()))
        .unwrap_or(UTF_8)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_default_when_unlabeled() {
        let body = "<html><body>caf\u{e9}</body></html>".as_bytes();
        assert_eq!(decode_body(body, None), "<html><body>café</body></html>");
    }

    #[test]
    fn header_charset_wins() {
        let body = b"Caf\xE9";
        assert_eq!(decode_body(body, Some("windows-1252")), "Café");
    }

    #[test]
    fn meta_charset_sniffed_from_body() {
        let body = b"<html><head><meta charset=\"ISO-8859-1\"></head><body>Caf\xE9</body></html>";
        let decoded = decode_body(body, None);
        assert!(decoded.contains("Café"));
    }

    #[test]
    fn http_equiv_form_sniffed() {
        let body =
            b"<meta http-equiv=\"Content-Type\" content=\"text/html; charset=windows-1252\">\x93q\x94";
        let decoded = decode_body(body, None);
        assert!(decoded.contains("\u{201C}q\u{201D}"));
    }

    #[test]
    fn invalid_bytes_never_panic() {
        let body = b"<html>ok \xFF\xFE broken</html>";
        let decoded = decode_body(body, None);
        assert!(decoded.contains("ok"));
        assert!(decoded.contains("broken"));
    }

    #[test]
    fn unknown_labels_fall_back_to_utf8() {
        let body = b"<meta charset=\"not-a-charset\">plain";
        assert!(decode_body(body, Some("bogus")).contains("plain"));
    }
}
