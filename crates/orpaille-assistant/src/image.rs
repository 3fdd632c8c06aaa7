//! Portable image payloads for the chat and analysis flows.
//!
//! Images travel to the remote model as `data:` URLs. An attachment is
//! consumed by the turn that uses it, so the transient payload is
//! released when the turn completes, success or failure.

use base64::Engine;

use orpaille_core::{Error, Result};

/// An image normalized to a `data:image/...;base64,` payload.
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    data_url: String,
}

impl ImageAttachment {
    /// Encode raw image bytes with their MIME type.
    pub fn from_bytes(bytes: &[u8], mime_type: &str) -> Self {
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        Self {
            data_url: format!("data:{};base64,{}", mime_type, encoded),
        }
    }

    /// Accept an already-encoded payload.
    ///
    /// A string that carries a `data:image/` header passes through
    /// unchanged; a bare base64 string is validated and wrapped with a
    /// JPEG header by default.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        if encoded.starts_with("data:image/") {
            return Ok(Self {
                data_url: encoded.to_string(),
            });
        }

        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|_| Error::InvalidInput("Format base64 invalide".to_string()))?;

        Ok(Self {
            data_url: format!("data:image/jpeg;base64,{}", encoded),
        })
    }

    /// The full `data:` URL for the wire.
    pub fn as_data_url(&self) -> &str {
        &self.data_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_builds_data_url() {
        let attachment = ImageAttachment::from_bytes(&[0xFF, 0xD8, 0xFF], "image/jpeg");
        assert!(attachment.as_data_url().starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_from_base64_passes_data_urls_through() {
        let attachment = ImageAttachment::from_base64("data:image/png;base64,AAAA").unwrap();
        assert_eq!(attachment.as_data_url(), "data:image/png;base64,AAAA");
    }

    #[test]
    fn test_from_base64_wraps_bare_payloads_as_jpeg() {
        let attachment = ImageAttachment::from_base64("AAAA").unwrap();
        assert_eq!(attachment.as_data_url(), "data:image/jpeg;base64,AAAA");
    }

    #[test]
    fn test_from_base64_rejects_invalid_payloads() {
        let err = ImageAttachment::from_base64("not base64 at all!").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
