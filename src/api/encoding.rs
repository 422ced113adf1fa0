//! Lossless encoding of file names and URLs passed as query parameters.
//!
//! UTF-8 bytes -> base64 -> percent-encoding. The server undoes the percent-encoding, then
//! base64-decodes, which recovers names with arbitrary characters (slashes, `&`, non-ASCII).

use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;

use crate::error::{ClientError, ClientResult};

pub fn encode_identifier(value: &str) -> String {
    let b64 = STANDARD.encode(value.as_bytes());
    urlencoding::encode(&b64).into_owned()
}

/// Inverse of [`encode_identifier`]. Accepts the URL-safe alphabet as well, like the server.
pub fn decode_identifier(encoded: &str) -> ClientResult<String> {
    let b64 = urlencoding::decode(encoded)
        .map_err(|e| ClientError::validation("url", format!("invalid percent-encoding: {}", e)))?;
    let bytes = STANDARD
        .decode(b64.as_bytes())
        .or_else(|_| URL_SAFE.decode(b64.as_bytes()))
        .map_err(|e| ClientError::validation("url", format!("invalid base64: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| ClientError::validation("url", format!("invalid UTF-8: {}", e)))
}

/// `path?url=<encoded>`
pub fn with_identifier_query(path: &str, value: &str) -> String {
    format!("{}?url={}", path, encode_identifier(value))
}
