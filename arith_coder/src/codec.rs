// arith_coder/src/codec.rs

//! Whole-file compression and decompression.

use log::debug;

use crate::arithmetic_coding::{arithmetic_decode, arithmetic_encode};
use crate::error::{CodecError, Result};
use crate::format::Header;
use crate::model::{CumulativeIntervals, FrequencyTable};
use crate::precision::Precision;

/// Compressor bound to one precision.
///
/// The container does not record the precision, so a file must be
/// decompressed by a `Codec` with the same precision that produced it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Codec {
    precision: Precision,
}

impl Codec {
    pub fn new(precision: Precision) -> Self {
        Codec { precision }
    }

    /// # Errors
    ///
    /// Returns `CodecError::UnsupportedPrecision` for an out-of-range `bits`.
    pub fn with_bits(bits: u32) -> Result<Self> {
        Ok(Codec::new(Precision::new(bits)?))
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Builds the model, validates the precision against it, and returns
    /// header followed by payload.
    ///
    /// # Errors
    ///
    /// * `CodecError::EmptyInput` for an empty `input`.
    /// * `CodecError::PrecisionTooLow` / `CodecError::PrecisionOverflow` if
    ///   the precision cannot represent the model.
    /// * `CodecError::InputTooLarge` if `input` exceeds the length field.
    pub fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        self.compress_with_model(input).map(|(file, _)| file)
    }

    /// Like `compress`, also handing back the frequency table stored in the
    /// header.
    ///
    /// # Errors
    ///
    /// Same as `compress`.
    pub fn compress_with_model(&self, input: &[u8]) -> Result<(Vec<u8>, FrequencyTable)> {
        let table = FrequencyTable::build(input)?;
        self.precision.check(&table)?;
        let intervals = CumulativeIntervals::new(&table);
        let header = Header::new(table)?;

        let payload = arithmetic_encode(input, &intervals, self.precision)?;

        let mut file = Vec::with_capacity(header.encoded_len() + payload.len());
        header.write(&mut file);
        file.extend_from_slice(&payload);

        debug!(
            "compressed {} bytes ({} distinct) into {} bytes",
            input.len(),
            intervals.symbol_count(),
            file.len()
        );
        Ok((file, header.into_table()))
    }

    /// Parses the header and decodes the declared number of bytes.
    ///
    /// # Errors
    ///
    /// * `CodecError::TruncatedFile` / `CodecError::InvalidHeader` for a
    ///   malformed container.
    /// * `CodecError::PrecisionTooLow` if the stored model could not have
    ///   been encoded at this precision.
    /// * `CodecError::TruncatedFile` if the payload runs out before the
    ///   declared number of bytes is decoded.
    /// * `CodecError::DecodeCorruption` if the payload leaves every symbol
    ///   interval.
    pub fn decompress(&self, file: &[u8]) -> Result<Vec<u8>> {
        let (header, payload) = Header::parse(file)?;
        self.precision.check(header.table())?;
        let intervals = CumulativeIntervals::new(header.table());

        let offset = header.encoded_len();
        let output = arithmetic_decode(payload, &intervals, self.precision, header.original_len())
            .map_err(|e| match e {
                CodecError::TruncatedFile { needed, available } => CodecError::TruncatedFile {
                    needed: offset + needed,
                    available: offset + available,
                },
                other => other,
            })?;
        debug!("decompressed {} bytes into {} bytes", file.len(), output.len());
        Ok(output)
    }
}

/// Compresses `input` at `precision` bits.
pub fn compress(input: &[u8], precision: u32) -> Result<Vec<u8>> {
    Codec::with_bits(precision)?.compress(input)
}

/// Decompresses a file produced by `compress` at the same `precision`.
pub fn decompress(file: &[u8], precision: u32) -> Result<Vec<u8>> {
    Codec::with_bits(precision)?.decompress(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::header_len;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_concrete_file() {
        let input = b"AAAABBBCCD";
        let file = Codec::default().compress(input).unwrap();

        assert_eq!(file[..2], [0x00u8, 0x04]);
        assert_eq!(file[2..7], [b'A', 0x00, 0x00, 0x00, 0x04]);
        assert_eq!(file[7..12], [b'B', 0x00, 0x00, 0x00, 0x03]);
        assert_eq!(file[12..17], [b'C', 0x00, 0x00, 0x00, 0x02]);
        assert_eq!(file[17..22], [b'D', 0x00, 0x00, 0x00, 0x01]);
        assert_eq!(file[22..26], [0x00u8, 0x00, 0x00, 0x0A]);
        assert!(file.len() > header_len(4));

        assert_eq!(Codec::default().decompress(&file).unwrap(), input);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(Codec::default().compress(&[]), Err(CodecError::EmptyInput));
    }

    #[test]
    fn test_precision_validated_before_encoding() {
        assert_eq!(
            compress(b"AAAABBBCCD", 4),
            Err(CodecError::PrecisionTooLow {
                precision: 4,
                minimum: 6
            })
        );
        assert_eq!(compress(b"abc", 0), Err(CodecError::UnsupportedPrecision(0)));
        assert_eq!(compress(b"abc", 64), Err(CodecError::UnsupportedPrecision(64)));
    }

    #[test]
    fn test_truncated_file() {
        let file = compress(b"hello, arithmetic world", 16).unwrap();
        let distinct = FrequencyTable::build(b"hello, arithmetic world")
            .unwrap()
            .distinct();
        let header_end = header_len(distinct);

        assert!(matches!(
            decompress(&file[..header_end], 16),
            Err(CodecError::TruncatedFile { .. })
        ));
        assert!(matches!(
            decompress(&file[..5], 16),
            Err(CodecError::TruncatedFile { .. })
        ));
        assert!(matches!(
            decompress(&[], 16),
            Err(CodecError::TruncatedFile { .. })
        ));
    }

    #[test]
    fn test_truncated_payload() {
        let mut rng = StdRng::seed_from_u64(0xC0FFEE);
        let input: Vec<u8> = (0..20_000).map(|_| rng.gen()).collect();
        let file = compress(&input, 16).unwrap();
        let header_end = header_len(FrequencyTable::build(&input).unwrap().distinct());
        let cut = header_end + (file.len() - header_end) / 2;

        match decompress(&file[..cut], 16) {
            Err(CodecError::TruncatedFile { needed, available }) => {
                assert_eq!(available, cut);
                assert!(needed > cut && needed <= file.len());
            }
            other => panic!("expected TruncatedFile, got {:?}", other.map(|o| o.len())),
        }
    }

    #[test]
    fn test_header_claims_more_than_payload_holds() {
        let pairs: Vec<(u8, u32)> = (0..=255u8).map(|symbol| (symbol, 1000)).collect();
        let header = Header::new(FrequencyTable::from_pairs(&pairs).unwrap()).unwrap();
        let mut file = Vec::new();
        header.write(&mut file);
        file.push(0x5A);

        assert!(matches!(
            decompress(&file, 16),
            Err(CodecError::TruncatedFile { .. })
        ));
    }

    #[test]
    fn test_huge_declared_length_fails_fast() {
        // Two symbols sharing the whole 4-byte length field, one payload byte.
        let pairs: [(u8, u32); 2] = [(b'a', 0x7FFF_FFFF), (b'b', 0x8000_0000)];
        let header = Header::new(FrequencyTable::from_pairs(&pairs).unwrap()).unwrap();
        let mut file = Vec::new();
        header.write(&mut file);
        file.push(0xA5);

        assert!(matches!(
            decompress(&file, 16),
            Err(CodecError::TruncatedFile { .. })
        ));
    }

    #[test]
    fn test_compress_with_model() {
        let input = b"she sells sea shells by the sea shore";
        let (file, table) = Codec::default().compress_with_model(input).unwrap();
        assert_eq!(file, Codec::default().compress(input).unwrap());
        assert_eq!(table, FrequencyTable::build(input).unwrap());
    }

    #[test]
    fn test_mismatched_precision_does_not_panic() {
        let input = b"a fairly ordinary sentence with some repeated letters".repeat(4);
        let file = compress(&input, 16).unwrap();

        for bits in [8, 12, 15, 17, 24, 40] {
            if let Ok(output) = decompress(&file, bits) {
                assert_eq!(output.len(), input.len());
            }
        }
    }

    #[test]
    fn test_codec_accessors() {
        let codec = Codec::with_bits(24).unwrap();
        assert_eq!(codec.precision().bits(), 24);
        assert_eq!(Codec::default().precision(), Precision::default());
    }
}
