// arith_coder/src/arithmetic_coding.rs

//! Encoder and decoder state machines.
//!
//! Both sides keep a half-open interval `[lower, upper)` inside
//! `[0, 2^P]`, narrow it by each symbol's cumulative range, and rescale it
//! with the same three rules:
//!
//! * E1: `upper < half`, the interval sits in the bottom half (bit `0`).
//! * E2: `lower > half`, the interval sits in the top half (bit `1`).
//! * E3: `quarter < lower && upper < 3 * quarter`, the interval straddles the
//!   midpoint; the bit is deferred and counted as pending.
//!
//! The encoder emits bits on E1/E2; the decoder instead shifts one more
//! payload bit into its tag.

use contracts::{debug_ensures, debug_requires};
use log::{debug, trace};

use crate::bits::{BitSink, BitSource};
use crate::error::{CodecError, Result};
use crate::model::{CumulativeIntervals, Symbol};
use crate::precision::Precision;

/// Cap on the output buffer reserved up front from a header-declared length.
const MAX_RESERVED_SYMBOLS: usize = 1 << 20;

/// `floor(range * cumulative / total)` without overflowing.
#[inline]
fn scale(range: u64, cumulative: u64, total: u64) -> u64 {
    ((range as u128 * cumulative as u128) / total as u128) as u64
}

/// Encoder state for one message.
pub struct Encoder<'m> {
    intervals: &'m CumulativeIntervals,
    precision: Precision,
    lower: u64,
    upper: u64,
    pending: u64,
    sink: BitSink,
}

impl<'m> Encoder<'m> {
    /// Starts with the full interval `[0, 2^P)`.
    ///
    /// The caller is expected to have validated `precision` against the
    /// model with `Precision::check`.
    pub fn new(intervals: &'m CumulativeIntervals, precision: Precision) -> Self {
        Encoder {
            intervals,
            precision,
            lower: 0,
            upper: precision.whole(),
            pending: 0,
            sink: BitSink::new(),
        }
    }

    /// Narrows the interval by `symbol` and renormalizes.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::UnknownSymbol` if `symbol` has no interval in
    /// the model.
    pub fn encode_symbol(&mut self, symbol: Symbol) -> Result<()> {
        let (sym_low, sym_high) = self
            .intervals
            .interval(symbol)
            .ok_or(CodecError::UnknownSymbol(symbol))?;
        trace!(
            "encoding {} as [{}, {}) in [{}, {})",
            symbol,
            sym_low,
            sym_high,
            self.lower,
            self.upper
        );
        self.narrow(sym_low, sym_high);
        self.renormalize();
        Ok(())
    }

    /// Bits emitted so far, not counting the final flush.
    pub fn bits_written(&self) -> u64 {
        self.sink.len()
    }

    /// Emits the terminating bits and returns the packed payload.
    ///
    /// One more pending bit is added so that the emitted value, followed by
    /// implicit zeros, lands inside the final interval.
    pub fn finish(mut self) -> Vec<u8> {
        self.pending += 1;
        if self.lower <= self.precision.quarter() {
            self.emit(false);
        } else {
            self.emit(true);
        }
        self.sink.finish()
    }

    #[debug_requires(sym_low < sym_high && sym_high <= self.intervals.total())]
    #[debug_ensures(self.lower < self.upper)]
    fn narrow(&mut self, sym_low: u64, sym_high: u64) {
        let total = self.intervals.total();
        let range = self.upper - self.lower;
        self.upper = self.lower + scale(range, sym_high, total);
        self.lower += scale(range, sym_low, total);
    }

    #[debug_ensures(self.lower < self.upper)]
    #[debug_ensures(self.lower <= self.precision.half() && self.precision.half() <= self.upper)]
    fn renormalize(&mut self) {
        let half = self.precision.half();
        let quarter = self.precision.quarter();
        let three_quarters = self.precision.three_quarters();

        loop {
            if self.upper < half {
                self.emit(false);
                self.lower <<= 1;
                self.upper <<= 1;
            } else if self.lower > half {
                self.emit(true);
                self.lower = (self.lower - half) << 1;
                self.upper = (self.upper - half) << 1;
            } else {
                break;
            }
        }

        while quarter < self.lower && self.upper < three_quarters {
            self.pending += 1;
            self.lower = 2 * (self.lower - quarter);
            self.upper = 2 * (self.upper - quarter);
        }
    }

    /// Writes a resolved bit followed by every pending opposite bit.
    fn emit(&mut self, bit: bool) {
        self.sink.push(bit);
        self.sink.push_run(!bit, self.pending);
        self.pending = 0;
    }
}

/// Decoder state for one message.
pub struct Decoder<'m, 'a> {
    intervals: &'m CumulativeIntervals,
    precision: Precision,
    lower: u64,
    upper: u64,
    tag: u64,
    source: BitSource<'a>,
}

impl<'m, 'a> Decoder<'m, 'a> {
    /// Loads the first `P` payload bits into the tag.
    pub fn new(
        intervals: &'m CumulativeIntervals,
        precision: Precision,
        payload: &'a [u8],
    ) -> Self {
        let mut source = BitSource::new(payload);
        let mut tag = 0u64;
        for _ in 0..precision.bits() {
            tag = (tag << 1) | source.next_bit() as u64;
        }

        Decoder {
            intervals,
            precision,
            lower: 0,
            upper: precision.whole(),
            tag,
            source,
        }
    }

    /// Identifies the symbol whose sub-interval holds the tag and narrows to
    /// it.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::DecodeCorruption` if no interval holds the tag.
    pub fn decode_symbol(&mut self, position: usize) -> Result<Symbol> {
        let range = self.upper - self.lower;
        let index = locate(self.intervals, self.lower, range, self.tag).ok_or(
            CodecError::DecodeCorruption {
                position,
                tag: self.tag,
            },
        )?;
        let (symbol, sym_low, sym_high) = self.intervals.entry(index);
        self.narrow(range, sym_low, sym_high);
        Ok(symbol)
    }

    #[debug_ensures(self.lower < self.upper)]
    #[debug_ensures(self.lower <= self.tag && self.tag < self.upper)]
    fn narrow(&mut self, range: u64, sym_low: u64, sym_high: u64) {
        let total = self.intervals.total();
        self.upper = self.lower + scale(range, sym_high, total);
        self.lower += scale(range, sym_low, total);
    }

    /// Mirrors the encoder's rescaling, pulling one payload bit per step.
    #[debug_requires(self.lower <= self.tag && self.tag < self.upper)]
    #[debug_ensures(self.lower <= self.tag && self.tag < self.upper)]
    pub(crate) fn renormalize(&mut self) {
        let half = self.precision.half();
        let quarter = self.precision.quarter();
        let three_quarters = self.precision.three_quarters();

        loop {
            if self.upper < half {
                self.lower <<= 1;
                self.upper <<= 1;
                self.tag <<= 1;
            } else if self.lower > half {
                self.lower = (self.lower - half) << 1;
                self.upper = (self.upper - half) << 1;
                self.tag = (self.tag - half) << 1;
            } else {
                break;
            }
            self.tag |= self.source.next_bit() as u64;
        }

        while quarter < self.lower && self.upper < three_quarters {
            self.lower = 2 * (self.lower - quarter);
            self.upper = 2 * (self.upper - quarter);
            self.tag = 2 * (self.tag - quarter) | self.source.next_bit() as u64;
        }
    }

    /// Payload bits consumed so far, including reads past the end.
    pub fn bits_consumed(&self) -> u64 {
        self.source.position()
    }

    /// Most bits a decoder can consume from a complete payload.
    ///
    /// Every rescaling step writes one bit on the encoder side and reads one
    /// here, and the encoder's flush adds two more. The decoder loads `P`
    /// bits up front and skips the steps after the last symbol, so it never
    /// reads more than `P - 2` bits past the written stream.
    pub fn read_limit(&self) -> u64 {
        self.source.available() + self.precision.bits() as u64 - 2
    }

    /// Fails once the decoder has read further than any complete payload
    /// could carry it.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::TruncatedFile` with byte counts relative to the
    /// payload.
    pub fn check_exhausted(&self) -> Result<()> {
        let consumed = self.bits_consumed();
        if consumed <= self.read_limit() {
            return Ok(());
        }
        let written = consumed - (self.precision.bits() as u64 - 2);
        Err(CodecError::TruncatedFile {
            needed: ((written + 7) / 8) as usize,
            available: (self.source.available() / 8) as usize,
        })
    }
}

/// Index of the symbol whose scaled sub-interval of `[lower, lower + range)`
/// contains `tag`.
///
/// Scaled lower bounds are non-decreasing in the cumulative count, so the
/// candidates with `scaled_low <= tag` form a prefix and only the last of
/// them can hold the tag. A linear scan in the same order finds the same
/// entry.
fn locate(intervals: &CumulativeIntervals, lower: u64, range: u64, tag: u64) -> Option<usize> {
    let total = intervals.total();
    let below = intervals
        .lower_bounds()
        .partition_point(|&cumulative| lower + scale(range, cumulative, total) <= tag);
    let index = below.checked_sub(1)?;
    let (_, _, sym_high) = intervals.entry(index);
    (tag < lower + scale(range, sym_high, total)).then_some(index)
}

/// Encodes `data` against a static model.
///
/// # Arguments
///
/// * `data` - Symbols to encode; every one must be present in `intervals`.
/// * `intervals` - Cumulative partition built from the message's frequencies.
/// * `precision` - Interval precision, already validated for the model.
///
/// # Returns
///
/// * `Result<Vec<u8>>` - The packed bitstream (no header).
///
/// # Examples
///
/// ```
/// use arith_coder::{arithmetic_decode, arithmetic_encode, CumulativeIntervals, FrequencyTable, Precision};
///
/// let data = b"abracadabra";
/// let table = FrequencyTable::build(data).unwrap();
/// let intervals = CumulativeIntervals::new(&table);
/// let payload = arithmetic_encode(data, &intervals, Precision::default()).unwrap();
/// let decoded = arithmetic_decode(&payload, &intervals, Precision::default(), data.len()).unwrap();
/// assert_eq!(decoded, data);
/// ```
pub fn arithmetic_encode(
    data: &[u8],
    intervals: &CumulativeIntervals,
    precision: Precision,
) -> Result<Vec<u8>> {
    let mut encoder = Encoder::new(intervals, precision);
    for &symbol in data {
        encoder.encode_symbol(symbol)?;
    }
    let bits = encoder.bits_written();
    let payload = encoder.finish();
    debug!(
        "encoded {} symbols into {} bits + flush, {} payload bytes (precision {})",
        data.len(),
        bits,
        payload.len(),
        precision.bits()
    );
    Ok(payload)
}

/// Decodes exactly `count` symbols from `payload`.
///
/// Output is only returned once all `count` symbols are recovered; trailing
/// payload bits are ignored.
///
/// # Errors
///
/// * `CodecError::DecodeCorruption` if the tag leaves every symbol interval.
/// * `CodecError::TruncatedFile` if `count` symbols need more bits than
///   `payload` holds.
pub fn arithmetic_decode(
    payload: &[u8],
    intervals: &CumulativeIntervals,
    precision: Precision,
    count: usize,
) -> Result<Vec<u8>> {
    let mut decoder = Decoder::new(intervals, precision, payload);
    let mut decoded = Vec::with_capacity(count.min(MAX_RESERVED_SYMBOLS));

    for position in 0..count {
        decoder.check_exhausted()?;
        decoded.push(decoder.decode_symbol(position)?);
        if position + 1 < count {
            decoder.renormalize();
        }
    }

    debug!(
        "decoded {} symbols from {} payload bytes ({} bits consumed)",
        count,
        payload.len(),
        decoder.bits_consumed()
    );
    Ok(decoded)
}
