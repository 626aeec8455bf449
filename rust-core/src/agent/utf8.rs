/// Incremental UTF-8 decoder for text split at arbitrary byte boundaries.
///
/// A multi-byte character cut across two pushes is held back until its
/// remaining bytes arrive. Invalid sequences become U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8Accumulator {
    pending: Vec<u8>,
}

impl Utf8Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode as much as possible, returning the newly completed text.
    pub fn push(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut decoded = String::new();

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    decoded.push_str(text);
                    self.pending.clear();
                    break;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    decoded.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match err.error_len() {
                        Some(invalid) => {
                            decoded.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + invalid);
                        }
                        None => {
                            self.pending.drain(..valid);
                            break;
                        }
                    }
                }
            }
        }

        decoded
    }

    /// Flush whatever is held back; an incomplete tail becomes U+FFFD.
    pub fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_multibyte_character() {
        let bytes = "こんにちは".as_bytes();
        let mut acc = Utf8Accumulator::new();

        let first = acc.push(&bytes[..4]);
        assert_eq!(first, "こ");
        assert!(acc.has_pending());

        let rest = acc.push(&bytes[4..]);
        assert_eq!(format!("{}{}", first, rest), "こんにちは");
        assert!(!acc.has_pending());
    }

    #[test]
    fn test_byte_at_a_time() {
        let text = "a→b😀";
        let mut acc = Utf8Accumulator::new();
        let decoded: String = text.as_bytes().iter().map(|b| acc.push(&[*b])).collect();
        assert_eq!(decoded, text);
    }

    #[test]
    fn test_invalid_bytes_are_replaced() {
        let mut acc = Utf8Accumulator::new();
        assert_eq!(acc.push(b"ok\xffgo"), "ok\u{FFFD}go");
    }

    #[test]
    fn test_finish_flushes_incomplete_tail() {
        let mut acc = Utf8Accumulator::new();
        assert_eq!(acc.push(&"é".as_bytes()[..1]), "");
        assert_eq!(acc.finish(), "\u{FFFD}");
        assert!(!acc.has_pending());
    }
}
