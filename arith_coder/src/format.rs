// arith_coder/src/format.rs

//! On-disk container layout.
//!
//! ```text
//! +--------+------------------------------+--------+-----------+
//! | K: u16 | K x (symbol: u8, freq: u32)  | N: u32 | payload   |
//! +--------+------------------------------+--------+-----------+
//! ```
//!
//! All integers are big-endian. Records are written in ascending symbol
//! order; any order is accepted on read. The payload runs to the end of the
//! file.

use byteorder::{BigEndian, ByteOrder};

use crate::error::{CodecError, Result};
use crate::model::{FrequencyTable, Symbol, ALPHABET_SIZE};

const COUNT_LEN: usize = 2;
const RECORD_LEN: usize = 5;
const LENGTH_LEN: usize = 4;

/// Number of header bytes for `symbols` records.
pub fn header_len(symbols: usize) -> usize {
    COUNT_LEN + symbols * RECORD_LEN + LENGTH_LEN
}

/// The frequency model and original length stored ahead of the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    table: FrequencyTable,
    original_len: u32,
}

impl Header {
    /// # Errors
    ///
    /// Returns `CodecError::InputTooLarge` if the table's total does not fit
    /// the 4-byte length field.
    pub fn new(table: FrequencyTable) -> Result<Self> {
        let original_len = u32::try_from(table.total())
            .map_err(|_| CodecError::InputTooLarge(table.total() as usize))?;
        Ok(Header {
            table,
            original_len,
        })
    }

    pub fn table(&self) -> &FrequencyTable {
        &self.table
    }

    pub fn into_table(self) -> FrequencyTable {
        self.table
    }

    /// Number of symbols the payload encodes.
    pub fn original_len(&self) -> usize {
        self.original_len as usize
    }

    pub fn encoded_len(&self) -> usize {
        header_len(self.table.distinct())
    }

    /// Appends the serialized header to `out`.
    pub fn write(&self, out: &mut Vec<u8>) {
        let start = out.len();
        out.resize(start + self.encoded_len(), 0);
        let buf = &mut out[start..];

        BigEndian::write_u16(&mut buf[..COUNT_LEN], self.table.distinct() as u16);
        let mut at = COUNT_LEN;
        for (symbol, frequency) in self.table.pairs() {
            buf[at] = symbol;
            BigEndian::write_u32(&mut buf[at + 1..at + RECORD_LEN], frequency);
            at += RECORD_LEN;
        }
        BigEndian::write_u32(&mut buf[at..at + LENGTH_LEN], self.original_len);
    }

    /// Splits `file` into its header and payload.
    ///
    /// # Errors
    ///
    /// * `CodecError::TruncatedFile` if the file ends inside the header or
    ///   carries no payload.
    /// * `CodecError::InvalidHeader` for a zero or oversized symbol count,
    ///   duplicate or zero-frequency records, or frequencies that do not sum
    ///   to the declared length.
    pub fn parse(file: &[u8]) -> Result<(Header, &[u8])> {
        if file.len() < COUNT_LEN {
            return Err(CodecError::TruncatedFile {
                needed: COUNT_LEN,
                available: file.len(),
            });
        }

        let symbols = BigEndian::read_u16(&file[..COUNT_LEN]) as usize;
        if symbols == 0 || symbols > ALPHABET_SIZE {
            return Err(CodecError::InvalidHeader(format!(
                "symbol count {} out of range",
                symbols
            )));
        }

        let needed = header_len(symbols);
        if file.len() < needed {
            return Err(CodecError::TruncatedFile {
                needed,
                available: file.len(),
            });
        }

        let pairs: Vec<(Symbol, u32)> = file[COUNT_LEN..needed - LENGTH_LEN]
            .chunks_exact(RECORD_LEN)
            .map(|record| (record[0], BigEndian::read_u32(&record[1..])))
            .collect();
        let table = FrequencyTable::from_pairs(&pairs)?;

        let original_len = BigEndian::read_u32(&file[needed - LENGTH_LEN..needed]);
        if table.total() != original_len as u64 {
            return Err(CodecError::InvalidHeader(format!(
                "frequencies sum to {} but {} bytes are declared",
                table.total(),
                original_len
            )));
        }

        let payload = &file[needed..];
        if payload.is_empty() {
            return Err(CodecError::TruncatedFile {
                needed: needed + 1,
                available: file.len(),
            });
        }

        Ok((
            Header {
                table,
                original_len,
            },
            payload,
        ))
    }
}
