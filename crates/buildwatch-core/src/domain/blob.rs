//! Blob payloads.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::commit::ContentRef;
use super::error::{BuildwatchError, Result};

/// Transport encoding of a blob payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlobEncoding {
    Base64,
    Utf8,
    Other(String),
}

impl From<String> for BlobEncoding {
    fn from(s: String) -> Self {
        match s.as_str() {
            "base64" => BlobEncoding::Base64,
            "utf-8" | "utf8" => BlobEncoding::Utf8,
            _ => BlobEncoding::Other(s),
        }
    }
}

impl From<BlobEncoding> for String {
    fn from(encoding: BlobEncoding) -> Self {
        match encoding {
            BlobEncoding::Base64 => "base64".to_string(),
            BlobEncoding::Utf8 => "utf-8".to_string(),
            BlobEncoding::Other(s) => s,
        }
    }
}

/// A resolved blob, still in transport encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlob {
    pub content_ref: ContentRef,
    pub content: String,
    pub encoding: BlobEncoding,
}

impl ContentBlob {
    /// Base64-encode `text` the way the platform serves it (60-column lines).
    pub fn from_text(content_ref: ContentRef, text: &str) -> Self {
        let encoded = STANDARD.encode(text.as_bytes());
        let wrapped = encoded
            .as_bytes()
            .chunks(60)
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            content_ref,
            content: wrapped,
            encoding: BlobEncoding::Base64,
        }
    }

    /// Decode to text. Line breaks inside base64 payloads are ignored;
    /// the decoded bytes must be valid UTF-8 and are returned verbatim.
    pub fn decode_text(&self) -> Result<String> {
        let bytes = match &self.encoding {
            BlobEncoding::Base64 => {
                let compact: Vec<u8> = self
                    .content
                    .bytes()
                    .filter(|b| !b.is_ascii_whitespace())
                    .collect();
                STANDARD
                    .decode(compact)
                    .map_err(|e| self.decode_error(format!("invalid base64: {e}")))?
            }
            BlobEncoding::Utf8 => return Ok(self.content.clone()),
            BlobEncoding::Other(name) => {
                return Err(self.decode_error(format!("unsupported encoding `{name}`")));
            }
        };

        String::from_utf8(bytes).map_err(|e| self.decode_error(format!("not UTF-8 text: {e}")))
    }

    fn decode_error(&self, reason: String) -> BuildwatchError {
        BuildwatchError::BlobDecode {
            content_ref: self.content_ref.to_string(),
            reason,
        }
    }
}
