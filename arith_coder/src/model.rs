// arith_coder/src/model.rs

//! Static frequency model.
//!
//! The model is built once from the complete input and never updated. Both
//! sides of the codec derive the cumulative partition from the same table by
//! walking symbols in ascending order, so identical tables always produce
//! identical intervals.

use ndarray::Array1;

use crate::error::{CodecError, Result};

/// A single byte value.
pub type Symbol = u8;

/// Number of distinct symbol values.
pub const ALPHABET_SIZE: usize = 256;

/// Occurrence count of every byte value in a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: Array1<u32>,
    total: u64,
}

impl FrequencyTable {
    /// Counts the occurrences of each byte in `data`.
    ///
    /// # Errors
    ///
    /// * `CodecError::EmptyInput` if `data` is empty.
    /// * `CodecError::InputTooLarge` if the length does not fit in 32 bits.
    pub fn build(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(CodecError::EmptyInput);
        }
        if u32::try_from(data.len()).is_err() {
            return Err(CodecError::InputTooLarge(data.len()));
        }

        let mut counts = Array1::<u32>::zeros(ALPHABET_SIZE);
        for &byte in data {
            counts[byte as usize] += 1;
        }

        Ok(FrequencyTable {
            counts,
            total: data.len() as u64,
        })
    }

    /// Rebuilds a table from `(symbol, frequency)` pairs in any order.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::InvalidHeader` if `pairs` is empty, names a
    /// symbol twice, or carries a zero frequency.
    pub fn from_pairs(pairs: &[(Symbol, u32)]) -> Result<Self> {
        if pairs.is_empty() {
            return Err(CodecError::InvalidHeader("no symbols".to_string()));
        }

        let mut counts = Array1::<u32>::zeros(ALPHABET_SIZE);
        let mut total = 0u64;
        for &(symbol, frequency) in pairs {
            if frequency == 0 {
                return Err(CodecError::InvalidHeader(format!(
                    "symbol {} has zero frequency",
                    symbol
                )));
            }
            if counts[symbol as usize] != 0 {
                return Err(CodecError::InvalidHeader(format!(
                    "symbol {} listed twice",
                    symbol
                )));
            }
            counts[symbol as usize] = frequency;
            total += frequency as u64;
        }

        Ok(FrequencyTable { counts, total })
    }

    /// Count for `symbol` (zero if absent).
    pub fn count(&self, symbol: Symbol) -> u32 {
        self.counts[symbol as usize]
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of symbols with a nonzero count.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Smallest nonzero count.
    pub fn min_frequency(&self) -> u32 {
        self.counts
            .iter()
            .copied()
            .filter(|&c| c > 0)
            .min()
            .unwrap_or(0)
    }

    /// Present symbols with their counts, in ascending symbol order.
    pub fn pairs(&self) -> impl Iterator<Item = (Symbol, u32)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c > 0)
            .map(|(symbol, &c)| (symbol as Symbol, c))
    }

    /// Shannon entropy of the distribution in bits per symbol.
    pub fn entropy(&self) -> f64 {
        let total = self.total as f64;
        self.counts.fold(0.0, |acc, &c| {
            if c == 0 {
                acc
            } else {
                let p = c as f64 / total;
                acc - p * p.log2()
            }
        })
    }
}

/// Half-open sub-ranges of `[0, total)` assigned to each present symbol.
#[derive(Debug, Clone)]
pub struct CumulativeIntervals {
    /// Present symbols, ascending.
    symbols: Vec<Symbol>,
    /// `bounds[i]..bounds[i + 1]` is the range of `symbols[i]`.
    bounds: Vec<u64>,
    /// Symbol value to index into `symbols`.
    slots: [Option<u16>; ALPHABET_SIZE],
}

impl CumulativeIntervals {
    /// Lays out contiguous ranges in ascending symbol order.
    pub fn new(table: &FrequencyTable) -> Self {
        let mut symbols = Vec::with_capacity(ALPHABET_SIZE);
        let mut bounds = Vec::with_capacity(ALPHABET_SIZE + 1);
        let mut slots = [None; ALPHABET_SIZE];

        let mut running = 0u64;
        bounds.push(running);
        for (symbol, count) in table.pairs() {
            slots[symbol as usize] = Some(symbols.len() as u16);
            symbols.push(symbol);
            running += count as u64;
            bounds.push(running);
        }

        CumulativeIntervals {
            symbols,
            bounds,
            slots,
        }
    }

    /// Total count space.
    pub fn total(&self) -> u64 {
        self.bounds[self.bounds.len() - 1]
    }

    /// Number of symbols in the partition.
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// `[low, high)` for `symbol`, or `None` if it never occurred.
    pub fn interval(&self, symbol: Symbol) -> Option<(u64, u64)> {
        self.slots[symbol as usize].map(|slot| {
            let slot = slot as usize;
            (self.bounds[slot], self.bounds[slot + 1])
        })
    }

    /// Symbol and range stored at position `index` of the ordering.
    pub fn entry(&self, index: usize) -> (Symbol, u64, u64) {
        (
            self.symbols[index],
            self.bounds[index],
            self.bounds[index + 1],
        )
    }

    /// Lower bounds of every range, ascending; one entry per symbol.
    pub fn lower_bounds(&self) -> &[u64] {
        &self.bounds[..self.symbols.len()]
    }

    /// All entries in protocol order.
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, u64, u64)> + '_ {
        (0..self.symbols.len()).map(move |i| self.entry(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_build_counts_concrete_message() {
        let table = FrequencyTable::build(b"AAAABBBCCD").unwrap();
        assert_eq!(table.count(b'A'), 4);
        assert_eq!(table.count(b'B'), 3);
        assert_eq!(table.count(b'C'), 2);
        assert_eq!(table.count(b'D'), 1);
        assert_eq!(table.count(b'E'), 0);
        assert_eq!(table.total(), 10);
        assert_eq!(table.distinct(), 4);
        assert_eq!(table.min_frequency(), 1);
    }

    #[test]
    fn test_build_rejects_empty() {
        assert_eq!(FrequencyTable::build(&[]), Err(CodecError::EmptyInput));
    }

    #[test]
    fn test_intervals_concrete_message() {
        let table = FrequencyTable::build(b"DCBACBABAA").unwrap();
        let intervals = CumulativeIntervals::new(&table);
        assert_eq!(intervals.total(), 10);
        assert_eq!(intervals.interval(b'A'), Some((0, 4)));
        assert_eq!(intervals.interval(b'B'), Some((4, 7)));
        assert_eq!(intervals.interval(b'C'), Some((7, 9)));
        assert_eq!(intervals.interval(b'D'), Some((9, 10)));
        assert_eq!(intervals.interval(b'Z'), None);
    }

    #[test]
    fn test_from_pairs_ignores_input_order() {
        let forward = FrequencyTable::from_pairs(&[(1, 5), (7, 2), (200, 9)]).unwrap();
        let shuffled = FrequencyTable::from_pairs(&[(200, 9), (1, 5), (7, 2)]).unwrap();
        assert_eq!(forward, shuffled);

        let a: Vec<_> = CumulativeIntervals::new(&forward).iter().collect();
        let b: Vec<_> = CumulativeIntervals::new(&shuffled).iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_from_pairs_rejects_bad_headers() {
        assert!(matches!(
            FrequencyTable::from_pairs(&[]),
            Err(CodecError::InvalidHeader(_))
        ));
        assert!(matches!(
            FrequencyTable::from_pairs(&[(3, 1), (3, 2)]),
            Err(CodecError::InvalidHeader(_))
        ));
        assert!(matches!(
            FrequencyTable::from_pairs(&[(3, 0)]),
            Err(CodecError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_entropy() {
        let single = FrequencyTable::build(&[42u8; 1000]).unwrap();
        assert_eq!(single.entropy(), 0.0);

        let all: Vec<u8> = (0..=255).collect();
        let uniform = FrequencyTable::build(&all).unwrap();
        assert!((uniform.entropy() - 8.0).abs() < 1e-9);

        let half = FrequencyTable::build(b"abab").unwrap();
        assert!((half.entropy() - 1.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn test_partition_invariant(
            pairs in proptest::collection::btree_map(any::<u8>(), 1u32..=1_000_000, 1..=256usize)
        ) {
            let pairs: Vec<(u8, u32)> = pairs.into_iter().collect();
            let table = FrequencyTable::from_pairs(&pairs).unwrap();
            let intervals = CumulativeIntervals::new(&table);

            prop_assert_eq!(intervals.symbol_count(), pairs.len());
            prop_assert_eq!(intervals.total(), table.total());

            let mut expected_low = 0u64;
            let mut previous: Option<u8> = None;
            for (symbol, low, high) in intervals.iter() {
                prop_assert_eq!(low, expected_low);
                prop_assert_eq!(high - low, table.count(symbol) as u64);
                if let Some(prev) = previous {
                    prop_assert!(prev < symbol);
                }
                prop_assert_eq!(intervals.interval(symbol), Some((low, high)));
                previous = Some(symbol);
                expected_low = high;
            }
            prop_assert_eq!(expected_low, table.total());
        }

        #[test]
        fn test_build_sums_to_length(data in proptest::collection::vec(any::<u8>(), 1..2048)) {
            let table = FrequencyTable::build(&data).unwrap();
            let summed: u64 = table.pairs().map(|(_, c)| c as u64).sum();
            prop_assert_eq!(summed, data.len() as u64);
            prop_assert_eq!(table.total(), data.len() as u64);
        }
    }
}
