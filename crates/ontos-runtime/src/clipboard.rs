#![forbid(unsafe_code)]

//! OSC 52 clipboard writes.
//!
//! The terminal owns the clipboard; we only emit
//! `ESC ] 52 ; c ; <base64> BEL` and hope it is honored. There is no
//! acknowledgement, so success means "the sequence was written".

use std::io::Write;

use base64::{Engine as _, engine::general_purpose::STANDARD};

/// Clipboard errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    /// OSC 52 is disabled for this session.
    NotAvailable,
    /// The content cannot be sent (too large).
    InvalidInput(String),
    /// Writing the escape sequence failed.
    WriteError(String),
}

impl std::fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAvailable => write!(f, "clipboard not available"),
            Self::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Self::WriteError(msg) => write!(f, "clipboard write failed: {msg}"),
        }
    }
}

impl std::error::Error for ClipboardError {}

/// OSC 52 clipboard writer.
#[derive(Debug, Clone, Copy)]
pub struct Clipboard {
    enabled: bool,
    max_payload: usize,
}

impl Clipboard {
    /// Common OSC 52 size limit (base64 payload bytes).
    pub const DEFAULT_MAX_OSC52_PAYLOAD: usize = 74_994;

    /// A clipboard that writes OSC 52 sequences.
    pub const fn osc52() -> Self {
        Self {
            enabled: true,
            max_payload: Self::DEFAULT_MAX_OSC52_PAYLOAD,
        }
    }

    /// A clipboard that refuses every write.
    pub const fn unavailable() -> Self {
        Self {
            enabled: false,
            max_payload: 0,
        }
    }

    /// Override the payload limit.
    #[must_use]
    pub const fn with_max_payload(mut self, max_payload: usize) -> Self {
        self.max_payload = max_payload;
        self
    }

    /// Whether writes can succeed at all.
    pub const fn is_available(&self) -> bool {
        self.enabled
    }

    /// Build the escape sequence for `content`.
    pub fn sequence(&self, content: &str) -> Result<String, ClipboardError> {
        if !self.enabled {
            return Err(ClipboardError::NotAvailable);
        }
        let encoded = STANDARD.encode(content.as_bytes());
        if encoded.len() > self.max_payload {
            return Err(ClipboardError::InvalidInput(format!(
                "OSC 52 payload too large ({} > {})",
                encoded.len(),
                self.max_payload
            )));
        }
        Ok(format!("\x1b]52;c;{encoded}\x07"))
    }

    /// Write `content` to the system clipboard through `writer`.
    pub fn set(&self, content: &str, writer: &mut impl Write) -> Result<(), ClipboardError> {
        let seq = self.sequence(content)?;
        writer
            .write_all(seq.as_bytes())
            .and_then(|()| writer.flush())
            .map_err(|e| ClipboardError::WriteError(e.to_string()))
    }
}

impl Default for Clipboard {
    fn default() -> Self {
        Self::osc52()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_writes_osc52() {
        let mut out = Vec::new();
        Clipboard::osc52().set("hi", &mut out).unwrap();
        let expected = format!("\x1b]52;c;{}\x07", STANDARD.encode("hi"));
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn unavailable_writes_nothing() {
        let mut out = Vec::new();
        let err = Clipboard::unavailable().set("hi", &mut out).unwrap_err();
        assert_eq!(err, ClipboardError::NotAvailable);
        assert!(out.is_empty());
    }

    #[test]
    fn oversized_payload_rejected() {
        let clip = Clipboard::osc52().with_max_payload(4);
        assert!(matches!(
            clip.sequence("hello world"),
            Err(ClipboardError::InvalidInput(_))
        ));
    }

    #[test]
    fn utf8_content_round_trips_through_base64() {
        let seq = Clipboard::osc52().sequence("🔥 0.94").unwrap();
        let payload = seq
            .strip_prefix("\x1b]52;c;")
            .and_then(|s| s.strip_suffix('\x07'))
            .unwrap();
        assert_eq!(STANDARD.decode(payload).unwrap(), "🔥 0.94".as_bytes());
    }

    #[test]
    fn errors_display() {
        assert_eq!(
            ClipboardError::NotAvailable.to_string(),
            "clipboard not available"
        );
        assert_eq!(
            ClipboardError::WriteError("closed".into()).to_string(),
            "clipboard write failed: closed"
        );
    }
}
