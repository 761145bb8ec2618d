//! Response header helpers.
//!
//! This module extracts the two facts a download task learns from the server
//! before streaming: the declared payload size and the file name suggested
//! through `Content-Disposition`.

use super::path::safe_file_name;

use percent_encoding::percent_decode_str;
use reqwest::header::{HeaderMap, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_RANGE};

/// Size declared by the server for the response body.
///
/// `Content-Length` wins; a `Content-Range` total is used when the server only
/// answers with a partial range. Returns `None` when neither header holds a
/// valid number.
///
/// # Example
///
/// ```rust
/// use hubfetch::utils::declared_length;
/// use reqwest::header::{HeaderMap, HeaderValue, CONTENT_LENGTH};
///
/// let mut headers = HeaderMap::new();
/// headers.insert(CONTENT_LENGTH, HeaderValue::from_static("2048"));
/// assert_eq!(declared_length(&headers), Some(2048));
/// ```
pub fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .or_else(|| {
            headers
                .get(CONTENT_RANGE)
                .and_then(|value| value.to_str().ok())
                .and_then(parse_content_range_total)
        })
}

/// Parse Content-Range header to extract total size.
///
/// Content-Range header format: "bytes start-end/total"
///
/// ```rust
/// use hubfetch::utils::parse_content_range_total;
///
/// let total = parse_content_range_total("bytes 0-1023/2048");
/// assert_eq!(total, Some(2048));
/// ```
pub fn parse_content_range_total(content_range: &str) -> Option<u64> {
    content_range
        .split('/')
        .nth(1)
        .and_then(|size| size.trim().parse::<u64>().ok())
}

/// File name suggested by the `Content-Disposition` header, if any.
///
/// An RFC 5987 `filename*=charset''value` parameter takes precedence over a
/// plain `filename=`. Only the last path component is kept so a server cannot
/// place files outside the destination directory.
pub fn disposition_filename(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(CONTENT_DISPOSITION)?.to_str().ok()?;
    parse_disposition_filename(value)
}

/// String form of [`disposition_filename`].
///
/// ```rust
/// use hubfetch::utils::parse_disposition_filename;
///
/// assert_eq!(
///     parse_disposition_filename("attachment; filename=\"S3A_SL_2_LST.zip\""),
///     Some("S3A_SL_2_LST.zip".to_string())
/// );
/// ```
pub fn parse_disposition_filename(value: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;

    for param in value.split(';').map(str::trim) {
        let Some((key, raw)) = param.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.eq_ignore_ascii_case("filename*") {
            // charset'language'percent-encoded-name
            let encoded = raw.trim().rsplit('\'').next().unwrap_or_default();
            extended = Some(percent_decode_str(encoded).decode_utf8_lossy().into_owned());
        } else if key.eq_ignore_ascii_case("filename") {
            plain = Some(raw.trim().replace('"', ""));
        }
    }

    extended.or(plain).and_then(|name| safe_file_name(&name))
}
