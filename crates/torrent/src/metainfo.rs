//! Decoding of `.torrent` metainfo documents
//!
//! Decoding runs in two passes. The whole buffer is first read into a
//! generic bencode value, which can only fail on malformed input. The
//! `info` dictionary is then re-encoded and deserialized into typed structs.

use serde::Deserialize;
use serde_bencode::value::Value;
use serde_bytes::ByteBuf;

use crate::constants::MAX_BENCODE_DEPTH;
use crate::error::{ValidationError, ValidationResult};

/// Decoded description of a torrent's content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentMetadata {
    /// Display name; the file name for single-file torrents
    pub name: String,
    /// Explicit file list of a multi-file torrent, `None` for single-file ones
    pub files: Option<Vec<FileEntry>>,
}

/// One entry of a multi-file torrent's file list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path components, never empty
    pub path: Vec<String>,
    pub length: u64,
}

#[derive(Debug, Deserialize)]
struct RawInfo {
    #[serde(default)]
    name: ByteBuf,
    #[serde(default)]
    files: Option<Vec<RawFile>>,
}

#[derive(Debug, Deserialize)]
struct RawFile {
    path: Vec<ByteBuf>,
    #[serde(default)]
    length: u64,
}

/// Why the first pass rejected the buffer
#[derive(Debug)]
enum SyntaxFailure {
    /// The data ended mid-value
    Truncated,
    /// A byte that cannot start or continue a bencode value
    Malformed(serde_bencode::Error),
    /// Lists and dictionaries nested deeper than the decoder may recurse
    TooDeep,
}

/// Decode a downloaded `.torrent` file
///
/// `from_auth_host` must be true when the bytes came from the tracker that
/// needs a login. That tracker serves an HTML error page with status 200
/// when the session is missing or expired, so a syntax error from it is
/// reported as `AuthenticationInvalid` instead of a parse failure.
///
/// # Errors
/// * `AuthenticationInvalid` on a syntax error from the login-protected host
/// * `ParseFailed` for any other undecodable document
/// * `MetadataUnmarshalFailed` when the `info` dictionary is missing or malformed
pub fn decode(
    bytes: &[u8],
    from_auth_host: Option<&url::Url>,
) -> ValidationResult<TorrentMetadata> {
    let document = match parse_document(bytes) {
        Ok(document) => document,
        Err(SyntaxFailure::Malformed(e)) => {
            if let Some(url) = from_auth_host {
                tracing::warn!(
                    "Undecodable torrent from {}, treating as an expired session: {}",
                    url,
                    e
                );
                return Err(ValidationError::AuthenticationInvalid {
                    url: url.to_string(),
                    host: url.host_str().unwrap_or_default().to_string(),
                });
            }
            return Err(ValidationError::ParseFailed {
                message: e.to_string(),
            });
        }
        Err(SyntaxFailure::Truncated) => {
            return Err(ValidationError::ParseFailed {
                message: "unexpected end of data".to_string(),
            });
        }
        Err(SyntaxFailure::TooDeep) => {
            return Err(ValidationError::ParseFailed {
                message: format!("bencode nesting deeper than {} levels", MAX_BENCODE_DEPTH),
            });
        }
    };

    let Value::Dict(mut top_level) = document else {
        return Err(ValidationError::ParseFailed {
            message: "torrent file is not a bencoded dictionary".to_string(),
        });
    };

    let info = top_level
        .remove(b"info".as_slice())
        .ok_or_else(|| unmarshal_failed("missing 'info' dictionary"))?;
    unmarshal_info(&info)
}

fn parse_document(bytes: &[u8]) -> Result<Value, SyntaxFailure> {
    if exceeds_depth(bytes, MAX_BENCODE_DEPTH) {
        return Err(SyntaxFailure::TooDeep);
    }
    serde_bencode::from_bytes::<Value>(bytes).map_err(|e| match e {
        serde_bencode::Error::EndOfStream => SyntaxFailure::Truncated,
        other => SyntaxFailure::Malformed(other),
    })
}

/// Whether list/dictionary nesting in `bytes` goes deeper than `limit`
///
/// Walks the buffer iteratively, skipping over string payloads and
/// integers. Stops at the first byte that is not valid bencode and leaves
/// reporting it to the decoder.
fn exceeds_depth(bytes: &[u8], limit: usize) -> bool {
    let mut depth = 0usize;
    let mut pos = 0;
    while pos < bytes.len() {
        match bytes[pos] {
            b'l' | b'd' => {
                depth += 1;
                if depth > limit {
                    return true;
                }
                pos += 1;
            }
            b'e' => {
                depth = depth.saturating_sub(1);
                pos += 1;
            }
            b'i' => match bytes[pos..].iter().position(|&b| b == b'e') {
                Some(end) => pos += end + 1,
                None => return false,
            },
            b'0'..=b'9' => {
                let Some(colon) = bytes[pos..].iter().position(|&b| b == b':') else {
                    return false;
                };
                let Some(len) = std::str::from_utf8(&bytes[pos..pos + colon])
                    .ok()
                    .and_then(|digits| digits.parse::<usize>().ok())
                else {
                    return false;
                };
                pos = match (pos + colon + 1).checked_add(len) {
                    Some(next) => next,
                    None => return false,
                };
            }
            _ => return false,
        }
    }
    false
}

fn unmarshal_info(info: &Value) -> ValidationResult<TorrentMetadata> {
    if !matches!(info, Value::Dict(_)) {
        return Err(unmarshal_failed("'info' is not a dictionary"));
    }
    let encoded = serde_bencode::to_bytes(info).map_err(|e| unmarshal_failed(e.to_string()))?;
    let raw: RawInfo =
        serde_bencode::from_bytes(&encoded).map_err(|e| unmarshal_failed(e.to_string()))?;

    let files = raw
        .files
        .map(|files| {
            files
                .into_iter()
                .map(|file| {
                    if file.path.is_empty() {
                        return Err(unmarshal_failed("file entry with an empty path"));
                    }
                    Ok(FileEntry {
                        path: file.path.iter().map(|part| lossy(part)).collect(),
                        length: file.length,
                    })
                })
                .collect::<ValidationResult<Vec<_>>>()
        })
        .transpose()?;

    Ok(TorrentMetadata {
        name: lossy(&raw.name),
        files,
    })
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn unmarshal_failed(message: impl Into<String>) -> ValidationError {
    ValidationError::MetadataUnmarshalFailed {
        message: message.into(),
    }
}
