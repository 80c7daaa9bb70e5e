use encoding_rs::{Encoding, UTF_8};
use tracing::trace;

use crate::provider::VcsError;

/// Decodes backend output line by line.
///
/// Each line is tried against the configured encodings in order; a line no
/// encoding accepts is decoded as lossy UTF-8. Carriage returns are dropped.
#[derive(Debug, Clone)]
pub struct TextDecoder {
    encodings: Vec<&'static Encoding>,
}

impl Default for TextDecoder {
    fn default() -> Self {
        Self {
            encodings: vec![UTF_8],
        }
    }
}

impl TextDecoder {
    pub fn new(primary: &str, fallbacks: &[String]) -> Result<Self, VcsError> {
        let mut encodings = Vec::with_capacity(fallbacks.len() + 1);
        for label in std::iter::once(primary).chain(fallbacks.iter().map(String::as_str)) {
            let encoding = Encoding::for_label(label.trim().as_bytes())
                .ok_or_else(|| VcsError::UnknownEncoding(label.to_string()))?;
            if !encodings.contains(&encoding) {
                encodings.push(encoding);
            }
        }
        Ok(Self { encodings })
    }

    /// Names of the encodings tried, in order
    pub fn encoding_names(&self) -> Vec<&'static str> {
        self.encodings.iter().map(|e| e.name()).collect()
    }

    pub fn decode(&self, bytes: &[u8]) -> String {
        bytes
            .split(|b| *b == b'\n')
            .map(|line| self.decode_line(line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn decode_line(&self, bytes: &[u8]) -> String {
        for encoding in &self.encodings {
            if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes) {
                return text.replace('\r', "");
            }
            trace!(encoding = encoding.name(), "Line rejected by encoding");
        }
        String::from_utf8_lossy(bytes).replace('\r', "")
    }
}
