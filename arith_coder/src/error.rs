// arith_coder/src/error.rs

//! Error types for compression and decompression.

use thiserror::Error;

/// Error variants for encoding, decoding and container parsing.
///
/// Every error is terminal for the call that produced it: nothing is
/// retried and no partially decoded output is handed back.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Zero-length input has no frequency model.
    #[error("input is empty")]
    EmptyInput,

    /// The decoder's tag fell outside every symbol interval.
    #[error("corrupt stream: tag {tag} matches no symbol interval at output position {position}")]
    DecodeCorruption { position: usize, tag: u64 },

    /// `range * total` would not fit the arithmetic width.
    #[error("precision {precision} with total frequency {total} overflows interval arithmetic")]
    PrecisionOverflow { precision: u32, total: u64 },

    /// Some symbol would be assigned a zero-width interval.
    #[error("precision {precision} is too low for this frequency model (need at least {minimum})")]
    PrecisionTooLow { precision: u32, minimum: u32 },

    /// Precision outside the supported range.
    #[error("unsupported precision {0}")]
    UnsupportedPrecision(u32),

    /// The file is shorter than its header says it should be.
    #[error("truncated file: needed {needed} bytes, found {available}")]
    TruncatedFile { needed: usize, available: usize },

    /// The header is structurally inconsistent.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// The encoder was handed a symbol its model does not contain.
    #[error("symbol {0} is not in the frequency model")]
    UnknownSymbol(u8),

    /// The input length does not fit the 4-byte count field.
    #[error("input of {0} bytes is too large")]
    InputTooLarge(usize),
}

/// A specialized Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
