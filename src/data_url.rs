//! `data:` URL envelopes for image payloads.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose;

use crate::constants::OUTPUT_MIME_TYPE;
use crate::error::StudioError;

/// A decoded `data:<mime>;base64,<payload>` value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DataUrl {
    /// Mime type from the envelope header
    pub mime_type: String,
    /// Decoded payload
    pub bytes: Vec<u8>,
}

impl DataUrl {
    /// Wraps raw bytes.
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Parses a base64 data URL. A header without a mime type is treated as PNG.
    pub fn parse(value: &str) -> Result<Self, StudioError> {
        let rest = value
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| invalid("missing data: scheme"))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| invalid("missing payload separator"))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| invalid("payload is not base64 encoded"))?;
        let mime_type = if mime_type.is_empty() {
            OUTPUT_MIME_TYPE
        } else {
            mime_type
        };

        let bytes = general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|err| invalid(&err.to_string()))?;
        Ok(Self::new(mime_type, bytes))
    }

    /// Base64 of the payload, as the provider expects it on the wire.
    pub fn base64_payload(&self) -> String {
        general_purpose::STANDARD.encode(&self.bytes)
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime_type, self.base64_payload())
    }
}

fn invalid(reason: &str) -> StudioError {
    StudioError::Generation(format!("Reference image is not a valid data URL: {reason}"))
}
