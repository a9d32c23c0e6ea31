// arith_coder/src/bits.rs

//! MSB-first bit packing for the coded payload.

const INITIAL_OUTPUT_CAPACITY: usize = 1024;

/// Append-only bit writer.
///
/// Bits are accumulated into a byte register and pushed to the output as
/// soon as eight are collected. `finish` zero-pads the trailing byte; the
/// number of padding bits is not recorded anywhere.
#[derive(Debug, Clone)]
pub struct BitSink {
    output: Vec<u8>,
    bit_buffer: u8,
    bit_count: u8,
    written: u64,
}

impl BitSink {
    pub fn new() -> Self {
        BitSink {
            output: Vec::with_capacity(INITIAL_OUTPUT_CAPACITY),
            bit_buffer: 0,
            bit_count: 0,
            written: 0,
        }
    }

    /// Appends one bit.
    #[inline]
    pub fn push(&mut self, bit: bool) {
        self.bit_buffer = (self.bit_buffer << 1) | bit as u8;
        self.bit_count += 1;
        self.written += 1;

        if self.bit_count == 8 {
            self.output.push(self.bit_buffer);
            self.bit_buffer = 0;
            self.bit_count = 0;
        }
    }

    /// Appends `count` copies of `bit`.
    pub fn push_run(&mut self, bit: bool, count: u64) {
        for _ in 0..count {
            self.push(bit);
        }
    }

    /// Number of bits written so far.
    pub fn len(&self) -> u64 {
        self.written
    }

    pub fn is_empty(&self) -> bool {
        self.written == 0
    }

    /// Packs the remaining bits and returns the byte buffer.
    pub fn finish(mut self) -> Vec<u8> {
        if self.bit_count > 0 {
            self.bit_buffer <<= 8 - self.bit_count;
            self.output.push(self.bit_buffer);
        }
        self.output
    }
}

impl Default for BitSink {
    fn default() -> Self {
        Self::new()
    }
}

/// Indexed bit reader over a packed payload.
///
/// Any index past the physical end reads as `0`. The decoder relies on this
/// during its last renormalization steps, which can run beyond the final
/// byte.
#[derive(Debug, Clone)]
pub struct BitSource<'a> {
    data: &'a [u8],
    position: u64,
}

impl<'a> BitSource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        BitSource { data, position: 0 }
    }

    /// Bit at absolute position `index`, MSB-first within each byte.
    #[inline]
    pub fn bit(&self, index: u64) -> u8 {
        let byte_pos = index / 8;
        if byte_pos >= self.data.len() as u64 {
            return 0;
        }
        let shift = 7 - (index % 8);
        (self.data[byte_pos as usize] >> shift) & 1
    }

    /// Reads the bit under the cursor and advances it.
    #[inline]
    pub fn next_bit(&mut self) -> u8 {
        let bit = self.bit(self.position);
        self.position += 1;
        bit
    }

    /// Number of bits consumed through `next_bit`.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Number of physically present bits.
    pub fn available(&self) -> u64 {
        self.data.len() as u64 * 8
    }
}
