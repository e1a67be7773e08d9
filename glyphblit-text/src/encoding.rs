//! Encoding conversion between named byte encodings.
//!
//! Labels are resolved with `encoding_rs` (WHATWG label rules), so
//! `"gb2312"`, `"GBK"` and `"x-gbk"` all name the same codec. Output is
//! written into a zero-initialized buffer: bytes past the converted prefix
//! stay NUL, which terminates the string for the code-unit decoder.
//!
//! Conversion never overflows the caller's buffer and never replaces
//! characters silently. If the output doesn't fit, the whole characters
//! that did fit remain in the buffer and [`ConversionError::Truncated`] is
//! returned.

use std::borrow::Cow;

use encoding_rs::{EncoderResult, Encoding};
use log::debug;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("No conversion path from {from:?} to {to:?}")]
    UnsupportedEncodingPair { from: String, to: String },
    #[error("Output truncated: {written} of capacity {capacity} bytes written")]
    Truncated { written: usize, capacity: usize },
    #[error("Input is not valid {0}")]
    Malformed(&'static str),
    #[error("Character {ch:?} has no representation in {encoding}")]
    Unmappable { ch: char, encoding: &'static str },
}

/// A resolved (source, destination) encoding pair.
///
/// Holds no conversion state between calls; every call runs a fresh
/// decoder/encoder, so one converter can be shared freely.
#[derive(Clone, Copy, Debug)]
pub struct EncodingConverter {
    from: &'static Encoding,
    to: &'static Encoding,
}

impl EncodingConverter {
    /// Resolve two encoding labels.
    ///
    /// Fails if either label is unknown, or if the destination cannot be
    /// encoded into (UTF-16 and `replacement` only decode).
    pub fn new(from_encoding: &str, to_encoding: &str) -> Result<Self, ConversionError> {
        let unsupported = || ConversionError::UnsupportedEncodingPair {
            from: from_encoding.to_string(),
            to: to_encoding.to_string(),
        };

        let from = Encoding::for_label(from_encoding.as_bytes()).ok_or_else(unsupported)?;
        let to = Encoding::for_label(to_encoding.as_bytes()).ok_or_else(unsupported)?;
        if to.output_encoding() != to {
            return Err(unsupported());
        }

        Ok(Self { from, to })
    }

    /// Canonical name of the source encoding.
    pub fn source_name(&self) -> &'static str {
        self.from.name()
    }

    /// Canonical name of the destination encoding.
    pub fn target_name(&self) -> &'static str {
        self.to.name()
    }

    /// Convert `input` into a fresh zero-filled buffer of `capacity` bytes.
    pub fn convert(&self, input: &[u8], capacity: usize) -> Result<Vec<u8>, ConversionError> {
        let mut out = vec![0u8; capacity];
        self.convert_into(input, &mut out)?;
        Ok(out)
    }

    /// Convert `input` into `out`, returning the number of bytes written.
    ///
    /// `out` is zeroed first. On [`ConversionError::Truncated`] it holds the
    /// whole characters that fit, followed by zeros.
    pub fn convert_into(&self, input: &[u8], out: &mut [u8]) -> Result<usize, ConversionError> {
        out.fill(0);
        let text = self.decode_source(input)?;
        self.encode(&text, out)
    }

    /// Upper bound on the output size for `input`, plus one NUL byte.
    pub fn required_capacity(&self, input: &[u8]) -> Result<usize, ConversionError> {
        let text = self.decode_source(input)?;
        self.bound(&text)
    }

    /// Convert using a buffer sized by [`required_capacity`](Self::required_capacity).
    ///
    /// The result always ends in at least one NUL byte.
    pub fn convert_to_fit(&self, input: &[u8]) -> Result<Vec<u8>, ConversionError> {
        let text = self.decode_source(input)?;
        let mut out = vec![0u8; self.bound(&text)?];
        let written = self.encode(&text, &mut out)?;
        debug!(
            "converted {} bytes of {} into {} bytes of {}",
            input.len(),
            self.from.name(),
            written,
            self.to.name()
        );
        Ok(out)
    }

    fn decode_source<'a>(&self, input: &'a [u8]) -> Result<Cow<'a, str>, ConversionError> {
        self.from
            .decode_without_bom_handling_and_without_replacement(input)
            .ok_or(ConversionError::Malformed(self.from.name()))
    }

    fn bound(&self, text: &str) -> Result<usize, ConversionError> {
        self.to
            .new_encoder()
            .max_buffer_length_from_utf8_without_replacement(text.len())
            .and_then(|n| n.checked_add(1))
            .ok_or(ConversionError::Truncated {
                written: 0,
                capacity: usize::MAX,
            })
    }

    fn encode(&self, text: &str, out: &mut [u8]) -> Result<usize, ConversionError> {
        let mut encoder = self.to.new_encoder();
        let (result, _read, written) =
            encoder.encode_from_utf8_without_replacement(text, out, true);

        match result {
            EncoderResult::InputEmpty => Ok(written),
            EncoderResult::OutputFull => {
                out[written..].fill(0);
                Err(ConversionError::Truncated {
                    written,
                    capacity: out.len(),
                })
            }
            EncoderResult::Unmappable(ch) => {
                out[written..].fill(0);
                Err(ConversionError::Unmappable {
                    ch,
                    encoding: self.to.name(),
                })
            }
        }
    }
}

/// One-shot conversion: resolve the labels and convert into `capacity` bytes.
pub fn convert(
    from_encoding: &str,
    to_encoding: &str,
    input: &[u8],
    capacity: usize,
) -> Result<Vec<u8>, ConversionError> {
    EncodingConverter::new(from_encoding, to_encoding)?.convert(input, capacity)
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passes_through() {
        let out = convert("utf-8", "gb2312", b"AB", 8).unwrap();
        assert_eq!(out, vec![0x41, 0x42, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_hanzi_to_gb2312() {
        let out = convert("utf-8", "gb2312", "啊".as_bytes(), 4).unwrap();
        assert_eq!(out, vec![0xB0, 0xA1, 0, 0]);
    }

    #[test]
    fn test_labels_are_case_insensitive() {
        let conv = EncodingConverter::new("UTF-8", "GB2312").unwrap();
        assert_eq!(conv.source_name(), "UTF-8");
        assert_eq!(conv.target_name(), "GBK");
    }

    #[test]
    fn test_unknown_label_is_unsupported() {
        let err = EncodingConverter::new("utf-8", "klingon").unwrap_err();
        assert_eq!(
            err,
            ConversionError::UnsupportedEncodingPair {
                from: "utf-8".into(),
                to: "klingon".into(),
            }
        );
    }

    #[test]
    fn test_decode_only_target_is_unsupported() {
        assert!(matches!(
            EncodingConverter::new("utf-8", "utf-16le"),
            Err(ConversionError::UnsupportedEncodingPair { .. })
        ));
    }

    #[test]
    fn test_truncated_leaves_zero_tail() {
        let conv = EncodingConverter::new("utf-8", "gb2312").unwrap();
        let mut out = [0xEEu8; 5];
        let err = conv.convert_into("啊啊啊".as_bytes(), &mut out).unwrap_err();
        assert_eq!(err, ConversionError::Truncated { written: 4, capacity: 5 });
        assert_eq!(out, [0xB0, 0xA1, 0xB0, 0xA1, 0x00]);
    }

    #[test]
    fn test_zero_capacity_truncates() {
        let err = convert("utf-8", "gb2312", b"A", 0).unwrap_err();
        assert_eq!(err, ConversionError::Truncated { written: 0, capacity: 0 });
    }

    #[test]
    fn test_exact_capacity_has_no_terminator() {
        let out = convert("utf-8", "gb2312", "啊".as_bytes(), 2).unwrap();
        assert_eq!(out, vec![0xB0, 0xA1]);
    }

    #[test]
    fn test_malformed_source() {
        let err = convert("utf-8", "gb2312", &[0x41, 0xFF], 8).unwrap_err();
        assert_eq!(err, ConversionError::Malformed("UTF-8"));
    }

    #[test]
    fn test_unmappable_character() {
        let conv = EncodingConverter::new("utf-8", "gb2312").unwrap();
        let mut out = [0u8; 16];
        let err = conv.convert_into("A😀".as_bytes(), &mut out).unwrap_err();
        assert_eq!(err, ConversionError::Unmappable { ch: '😀', encoding: "GBK" });
        assert_eq!(out[0], 0x41);
        assert!(out[1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_round_trip() {
        let text = "诸葛高   皇甫杰   魑魅魍魉";
        let to_gbk = EncodingConverter::new("utf-8", "gb2312").unwrap();
        let back = EncodingConverter::new("gb2312", "utf-8").unwrap();

        let gbk = to_gbk.convert_to_fit(text.as_bytes()).unwrap();
        let len = gbk.iter().position(|&b| b == 0).unwrap();
        let utf8 = back.convert_to_fit(&gbk[..len]).unwrap();
        let utf8_len = utf8.iter().position(|&b| b == 0).unwrap();
        assert_eq!(&utf8[..utf8_len], text.as_bytes());
    }

    #[test]
    fn test_convert_to_fit_is_nul_terminated() {
        let conv = EncodingConverter::new("utf-8", "gb2312").unwrap();
        let input = "啊啊啊 诸葛高".as_bytes();
        let cap = conv.required_capacity(input).unwrap();
        let out = conv.convert_to_fit(input).unwrap();
        assert_eq!(out.len(), cap);
        assert_eq!(*out.last().unwrap(), 0);
        // six hanzi at two bytes each, one ASCII space
        assert_eq!(out.iter().position(|&b| b == 0), Some(13));
    }
}
