use crate::fetcher::{
    errors::FetchError,
    types::{BodyKind, Charset, PageResponse},
};
use chrono::Utc;
use encoding_rs::Encoding;
use regex::Regex;
use reqwest::StatusCode;
use std::sync::LazyLock;
use url::Url;

static CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).unwrap());

static META_CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<meta\s+[^>]*?charset\s*=\s*["']?([^"'\s/>]+)"#).unwrap());

static META_HTTP_EQUIV_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta\s+[^>]*?http-equiv\s*=\s*["']?content-type["']?[^>]*?content\s*=\s*["']?[^"'>]*?charset\s*=\s*([^"'\s;/>]+)"#).unwrap()
});

const SNIFF_WINDOW: usize = 4096;

pub fn body_kind(content_type: &str) -> Option<BodyKind> {
    let content_type = content_type.to_ascii_lowercase();
    if content_type.contains("text/html") || content_type.contains("application/xhtml") {
        Some(BodyKind::Markup)
    } else if content_type.contains("text/plain") {
        Some(BodyKind::PlainText)
    } else {
        None
    }
}

pub fn process_response(
    url_final: Url,
    status: StatusCode,
    body_bytes: &[u8],
    content_type: &str,
    body_kind: BodyKind,
) -> Result<PageResponse, FetchError> {
    let charset = detect_charset(content_type, body_bytes);
    let body_utf8 = decode_to_utf8(body_bytes, &charset)?;

    Ok(PageResponse {
        url_final,
        status,
        body_kind,
        body_utf8,
        charset,
        fetched_at: Utc::now(),
    })
}

fn detect_charset(content_type: &str, body_bytes: &[u8]) -> Charset {
    // 1. Content-Type header
    if let Some(charset) = charset_from(&CHARSET_REGEX, content_type) {
        return charset;
    }

    // 2. <meta charset> / http-equiv in the first 4KB
    let search_bytes = &body_bytes[..body_bytes.len().min(SNIFF_WINDOW)];
    let search_str = String::from_utf8_lossy(search_bytes);

    if let Some(charset) = charset_from(&META_CHARSET_REGEX, &search_str)
        .or_else(|| charset_from(&META_HTTP_EQUIV_REGEX, &search_str))
    {
        return charset;
    }

    // 3. Heuristic detection
    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(search_bytes, search_bytes.len() == body_bytes.len());
    Charset::from_encoding(detector.guess(None, true))
}

fn charset_from(regex: &Regex, haystack: &str) -> Option<Charset> {
    let label = regex.captures(haystack)?.get(1)?.as_str().to_lowercase();
    Encoding::for_label(label.as_bytes()).map(Charset::from_encoding)
}

fn decode_to_utf8(body_bytes: &[u8], charset: &Charset) -> Result<String, FetchError> {
    let encoding = charset.encoding();
    let (decoded, _encoding, had_errors) = encoding.decode(body_bytes);

    if had_errors {
        return Err(FetchError::Charset(format!(
            "failed to decode content with encoding: {}",
            encoding.name()
        )));
    }

    Ok(decoded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_charset_from_content_type() {
        let content_type = "text/html; charset=utf-8";
        let body = b"<html><head><title>Test</title></head></html>";

        assert_eq!(detect_charset(content_type, body), Charset::Utf8);
    }

    #[test]
    fn test_detect_charset_from_meta_tag() {
        let body = b"<html><head><meta charset=\"iso-8859-1\"><title>Test</title></head></html>";

        // encoding_rs maps ISO-8859-1 to its windows-1252 superset
        assert_eq!(detect_charset("text/html", body), Charset::Windows1252);
    }

    #[test]
    fn test_detect_charset_from_meta_http_equiv() {
        let body = b"<html><head><meta http-equiv=\"Content-Type\" content=\"text/html; charset=windows-1252\"><title>Test</title></head></html>";

        assert_eq!(detect_charset("text/html", body), Charset::Windows1252);
    }

    #[test]
    fn test_decode_windows_1252() {
        let body = b"caf\xe9";
        let decoded = decode_to_utf8(body, &Charset::Windows1252).unwrap();
        assert_eq!(decoded, "café");
    }

    #[test]
    fn test_decode_invalid_utf8_is_charset_error() {
        let body = b"broken \xff\xfe bytes";
        let result = decode_to_utf8(body, &Charset::Utf8);
        assert!(matches!(result, Err(FetchError::Charset(_))));
    }

    #[test]
    fn test_body_kind() {
        assert_eq!(body_kind("text/html; charset=utf-8"), Some(BodyKind::Markup));
        assert_eq!(body_kind("application/xhtml+xml"), Some(BodyKind::Markup));
        assert_eq!(body_kind("text/plain"), Some(BodyKind::PlainText));
        assert_eq!(body_kind("image/png"), None);
    }
}
