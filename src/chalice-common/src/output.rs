//! Capture buffers for child-process output streams.

/// Maximum number of bytes kept per captured stream (1 MiB).
pub const MAX_OUTPUT_BYTES: usize = 1024 * 1024;

/// Bytes read from one stream, capped at [`MAX_OUTPUT_BYTES`].
///
/// Bytes past the cap are counted but not stored, so a reader can keep
/// draining a chatty child without growing without bound.
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput {
    bytes: Vec<u8>,
    omitted: usize,
}

impl CapturedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) {
        let room = MAX_OUTPUT_BYTES.saturating_sub(self.bytes.len());
        let kept = chunk.len().min(room);
        self.bytes.extend_from_slice(&chunk[..kept]);
        self.omitted += chunk.len() - kept;
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty() && self.omitted == 0
    }

    /// Total bytes seen, stored or not.
    pub fn total_len(&self) -> usize {
        self.bytes.len() + self.omitted
    }

    /// Decode as UTF-8, replacing invalid sequences, with a truncation
    /// marker if anything was dropped.
    pub fn to_text(&self) -> String {
        let mut text = String::from_utf8_lossy(&self.bytes).into_owned();
        if self.omitted > 0 {
            text.push_str(&format!(
                "\n... [output truncated, {} bytes omitted]",
                self.omitted
            ));
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_output() {
        let mut out = CapturedOutput::new();
        out.push(b"hello\n");
        assert_eq!(out.to_text(), "hello\n");
        assert_eq!(out.total_len(), 6);
    }

    #[test]
    fn test_replaces_invalid_utf8() {
        let mut out = CapturedOutput::new();
        out.push(&[b'o', b'k', 0xff, 0xfe]);
        let text = out.to_text();
        assert!(text.starts_with("ok"));
        assert!(text.contains('\u{FFFD}'));
    }

    #[test]
    fn test_caps_stored_bytes() {
        let mut out = CapturedOutput::new();
        out.push(&vec![b'a'; MAX_OUTPUT_BYTES - 5]);
        out.push(&[b'b'; 15]);
        assert_eq!(out.total_len(), MAX_OUTPUT_BYTES + 10);
        assert!(out.to_text().ends_with("[output truncated, 10 bytes omitted]"));
    }

    #[test]
    fn test_empty() {
        assert!(CapturedOutput::new().is_empty());
        assert_eq!(CapturedOutput::new().to_text(), "");
    }
}
