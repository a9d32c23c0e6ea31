// arith_coder/src/precision.rs

//! Coder precision and the interval constants derived from it.
//!
//! Bounds and the decoder tag live in `u64`, and every `range * cumulative`
//! product is formed in `u128`. The supported combination is therefore
//! `precision <= 62` (so `2^P` and every doubled bound fit in `u64`) with any
//! total frequency the container can describe (`total < 2^32`).

use crate::error::{CodecError, Result};
use crate::model::FrequencyTable;

/// Precision used when none is given.
pub const DEFAULT_PRECISION: u32 = 16;
/// Smallest precision with a nonzero quarter.
pub const MIN_PRECISION: u32 = 2;
/// Largest precision whose bounds fit in a `u64`.
pub const MAX_PRECISION: u32 = 62;

/// Width of the intermediate products.
const PRODUCT_BITS: u32 = u128::BITS;

/// Number of bits `P` of the coding interval `[0, 2^P)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Precision {
    bits: u32,
}

impl Precision {
    /// # Errors
    ///
    /// Returns `CodecError::UnsupportedPrecision` outside
    /// `MIN_PRECISION..=MAX_PRECISION`.
    pub fn new(bits: u32) -> Result<Self> {
        if !(MIN_PRECISION..=MAX_PRECISION).contains(&bits) {
            return Err(CodecError::UnsupportedPrecision(bits));
        }
        Ok(Precision { bits })
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// `2^P`
    pub fn whole(&self) -> u64 {
        1u64 << self.bits
    }

    pub fn half(&self) -> u64 {
        self.whole() >> 1
    }

    pub fn quarter(&self) -> u64 {
        self.whole() >> 2
    }

    pub fn three_quarters(&self) -> u64 {
        3 * self.quarter()
    }

    /// Validates this precision against a frequency model before any coding
    /// starts.
    ///
    /// Renormalization keeps the live range at least a quarter wide, so
    /// every symbol keeps a non-empty sub-interval as long as
    /// `quarter * min_frequency >= total`.
    ///
    /// # Errors
    ///
    /// * `CodecError::PrecisionOverflow` if `range * total` cannot be formed
    ///   in the product width.
    /// * `CodecError::PrecisionTooLow` if some symbol could be narrowed to a
    ///   zero-width interval.
    pub fn check(&self, table: &FrequencyTable) -> Result<()> {
        let total = table.total();
        if !product_fits(self.bits, total) {
            return Err(CodecError::PrecisionOverflow {
                precision: self.bits,
                total,
            });
        }
        if !keeps_intervals_open(self.quarter(), table.min_frequency(), total) {
            let minimum = Precision::minimum_for(table)?;
            return Err(CodecError::PrecisionTooLow {
                precision: self.bits,
                minimum: minimum.bits,
            });
        }
        Ok(())
    }

    /// Smallest precision that `check` accepts for `table`.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::PrecisionOverflow` if no supported precision
    /// works.
    pub fn minimum_for(table: &FrequencyTable) -> Result<Precision> {
        let total = table.total();
        let min_frequency = table.min_frequency();
        (MIN_PRECISION..=MAX_PRECISION)
            .map(|bits| Precision { bits })
            .find(|p| {
                product_fits(p.bits, total)
                    && keeps_intervals_open(p.quarter(), min_frequency, total)
            })
            .ok_or(CodecError::PrecisionOverflow {
                precision: MAX_PRECISION,
                total,
            })
    }
}

impl Default for Precision {
    fn default() -> Self {
        Precision {
            bits: DEFAULT_PRECISION,
        }
    }
}

fn product_fits(bits: u32, total: u64) -> bool {
    let total_bits = u64::BITS - total.leading_zeros();
    bits + total_bits <= PRODUCT_BITS
}

fn keeps_intervals_open(quarter: u64, min_frequency: u32, total: u64) -> bool {
    min_frequency > 0 && quarter as u128 * min_frequency as u128 >= total as u128
}
