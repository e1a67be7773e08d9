//! Code-unit decoder for mixed single/double-byte strings.
//!
//! The rule is codepage-agnostic: a byte below
//! `0x80` is a complete single-byte unit, anything else is the lead byte of
//! a two-byte unit whose value is `(lead << 8) | trail`. Decoding stops at
//! the first NUL in single-byte position, matching the NUL padding left by
//! [`EncodingConverter`](crate::EncodingConverter).
//!
//! The byte after a lead byte is always its trail, NUL included. Only a
//! lead byte in the final position ends decoding early; it is never
//! combined with bytes past the end.

use std::iter::FusedIterator;

use glyphblit_core::CharacterCode;
use log::warn;

/// Why a [`CodeUnitDecoder`] stopped producing codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeStop {
    /// Hit a NUL byte at `offset`.
    Nul { offset: usize },
    /// Consumed the whole buffer.
    End,
    /// A lead byte at `offset` had no trail byte.
    DanglingLead { offset: usize },
}

/// Lazy, single-pass iterator of [`CharacterCode`]s over a byte buffer.
#[derive(Clone, Debug)]
pub struct CodeUnitDecoder<'a> {
    bytes: &'a [u8],
    pos: usize,
    stop: Option<DecodeStop>,
}

impl<'a> CodeUnitDecoder<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            pos: 0,
            stop: None,
        }
    }

    /// Bytes consumed so far.
    pub fn consumed(&self) -> usize {
        self.pos
    }

    /// Set once the iterator is exhausted.
    pub fn stop_reason(&self) -> Option<DecodeStop> {
        self.stop
    }

    fn finish(&mut self, stop: DecodeStop) -> Option<CharacterCode> {
        self.stop = Some(stop);
        None
    }
}

impl Iterator for CodeUnitDecoder<'_> {
    type Item = CharacterCode;

    fn next(&mut self) -> Option<CharacterCode> {
        if self.stop.is_some() {
            return None;
        }

        let offset = self.pos;
        let Some(&lead) = self.bytes.get(offset) else {
            return self.finish(DecodeStop::End);
        };

        if lead == 0 {
            return self.finish(DecodeStop::Nul { offset });
        }
        if lead < 0x80 {
            self.pos += 1;
            return Some(CharacterCode::Single(lead));
        }

        match self.bytes.get(offset + 1) {
            Some(&trail) => {
                self.pos += 2;
                Some(CharacterCode::Double(u16::from(lead) << 8 | u16::from(trail)))
            }
            None => {
                warn!("dangling lead byte {lead:#04x} at offset {offset}, stopping");
                self.pos += 1;
                self.finish(DecodeStop::DanglingLead { offset })
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.stop.is_some() {
            return (0, Some(0));
        }
        (0, Some(self.bytes.len().saturating_sub(self.pos)))
    }
}

impl FusedIterator for CodeUnitDecoder<'_> {}

/// Decode `bytes` into character codes.
pub fn decode(bytes: &[u8]) -> CodeUnitDecoder<'_> {
    CodeUnitDecoder::new(bytes)
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_byte_string() {
        let text = b"Hello, world";
        let codes: Vec<_> = decode(text).collect();
        assert_eq!(codes.len(), text.len());
        for (code, &byte) in codes.iter().zip(text.iter()) {
            assert_eq!(*code, CharacterCode::Single(byte));
        }
    }

    #[test]
    fn test_double_byte_string() {
        let bytes = [0xD6, 0xEE, 0xB8, 0xF0, 0xB8, 0xDF];
        let codes: Vec<_> = decode(&bytes).collect();
        assert_eq!(
            codes,
            vec![
                CharacterCode::Double(0xD6EE),
                CharacterCode::Double(0xB8F0),
                CharacterCode::Double(0xB8DF),
            ]
        );
    }

    #[test]
    fn test_double_byte_count_and_values() {
        // Every lead byte ≥ 0x80, every trail byte non-zero.
        let bytes: Vec<u8> = (0..64u8).flat_map(|i| [0x80 | i, i + 1]).collect();
        let codes: Vec<_> = decode(&bytes).collect();
        assert_eq!(codes.len(), bytes.len() / 2);
        for (i, code) in codes.iter().enumerate() {
            let expected = u16::from(bytes[2 * i]) << 8 | u16::from(bytes[2 * i + 1]);
            assert_eq!(*code, CharacterCode::Double(expected));
        }
    }

    #[test]
    fn test_mixed_widths() {
        let bytes = [b'A', 0xB0, 0xA1, b' ', 0x9E, 0x81, b'B'];
        let codes: Vec<_> = decode(&bytes).collect();
        assert_eq!(
            codes,
            vec![
                CharacterCode::Single(b'A'),
                CharacterCode::Double(0xB0A1),
                CharacterCode::Single(b' '),
                CharacterCode::Double(0x9E81),
                CharacterCode::Single(b'B'),
            ]
        );
    }

    #[test]
    fn test_trail_byte_below_0x80_is_combined() {
        // The trail byte of a double-byte unit may be ASCII-range.
        let codes: Vec<_> = decode(&[0x81, 0x40, 0x41]).collect();
        assert_eq!(
            codes,
            vec![CharacterCode::Double(0x8140), CharacterCode::Single(0x41)]
        );
    }

    #[test]
    fn test_stops_at_nul() {
        let bytes = [b'A', b'B', 0, b'C', 0, 0];
        let mut decoder = decode(&bytes);
        let codes: Vec<_> = decoder.by_ref().collect();
        assert_eq!(codes.len(), 2);
        assert_eq!(decoder.stop_reason(), Some(DecodeStop::Nul { offset: 2 }));
        assert_eq!(decoder.consumed(), 2);
    }

    #[test]
    fn test_end_of_buffer() {
        let mut decoder = decode(b"AB");
        assert_eq!(decoder.by_ref().count(), 2);
        assert_eq!(decoder.stop_reason(), Some(DecodeStop::End));
    }

    #[test]
    fn test_dangling_lead_at_end() {
        let bytes = [b'A', 0xB0];
        let mut decoder = decode(&bytes);
        let codes: Vec<_> = decoder.by_ref().collect();
        assert_eq!(codes, vec![CharacterCode::Single(b'A')]);
        assert_eq!(
            decoder.stop_reason(),
            Some(DecodeStop::DanglingLead { offset: 1 })
        );
        assert_eq!(decoder.consumed(), 2);
    }

    #[test]
    fn test_nul_trail_is_combined() {
        let bytes = [0xB0, 0x00, b'A'];
        let mut decoder = decode(&bytes);
        let codes: Vec<_> = decoder.by_ref().collect();
        assert_eq!(
            codes,
            vec![CharacterCode::Double(0xB000), CharacterCode::Single(b'A')]
        );
        assert_eq!(decoder.stop_reason(), Some(DecodeStop::End));
        assert_eq!(decoder.consumed(), 3);
    }

    #[test]
    fn test_nul_after_nul_trail_stops() {
        let bytes = [0xB0, 0x00, 0x00, b'A'];
        let mut decoder = decode(&bytes);
        let codes: Vec<_> = decoder.by_ref().collect();
        assert_eq!(codes, vec![CharacterCode::Double(0xB000)]);
        assert_eq!(decoder.stop_reason(), Some(DecodeStop::Nul { offset: 2 }));
    }

    #[test]
    fn test_fused_after_stop() {
        let mut decoder = decode(&[0xB0]);
        assert_eq!(decoder.next(), None);
        assert_eq!(decoder.next(), None);
        assert_eq!(decoder.size_hint(), (0, Some(0)));
    }

    #[test]
    fn test_empty_buffer() {
        let mut decoder = decode(&[]);
        assert_eq!(decoder.next(), None);
        assert_eq!(decoder.stop_reason(), Some(DecodeStop::End));
    }

    #[test]
    fn test_restart_by_reinvoking() {
        let bytes = [b'x', 0xB0, 0xA1];
        let first: Vec<_> = decode(&bytes).collect();
        let second: Vec<_> = decode(&bytes).collect();
        assert_eq!(first, second);
    }
}
