// arith_coder/src/lib.rs

//! Arithmetic Coding Library
//!
//! Lossless compression of byte sequences with a static, per-message
//! frequency model and finite-precision integer arithmetic coding.
//!
//! ```
//! let input = b"AAAABBBCCD";
//! let file = arith_coder::compress(input, 16).unwrap();
//! assert_eq!(&file[..2], &[0x00u8, 0x04][..]);
//! assert_eq!(arith_coder::decompress(&file, 16).unwrap(), input);
//! ```

pub mod arithmetic_coding;
pub mod bits;
pub mod codec;
pub mod error;
pub mod format;
pub mod model;
pub mod precision;

pub use arithmetic_coding::{arithmetic_decode, arithmetic_encode, Decoder, Encoder};
pub use bits::{BitSink, BitSource};
pub use codec::{compress, decompress, Codec};
pub use error::{CodecError, Result};
pub use format::Header;
pub use model::{CumulativeIntervals, FrequencyTable, Symbol};
pub use precision::{Precision, DEFAULT_PRECISION, MAX_PRECISION, MIN_PRECISION};
