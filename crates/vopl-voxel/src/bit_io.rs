//! MSB-first bit writer and reader over byte buffers.
//!
//! Values are written most-significant bit first, and bytes are filled from
//! their high bit down. Fields are packed back-to-back across byte
//! boundaries with no padding; unused bits in the final byte stay zero.

/// Appends fixed-width values to a growing byte buffer.
#[derive(Clone, Debug, Default)]
pub struct BitWriter {
    /// Output bytes. The last byte may be partially filled.
    bytes: Vec<u8>,
    /// Total number of bits written.
    bit_len: usize,
}

impl BitWriter {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty writer with room for `bits` bits.
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bits.div_ceil(8)),
            bit_len: 0,
        }
    }

    /// Writes the low `bits` bits of `value`, most significant first.
    ///
    /// Bits of `value` above `bits` are ignored. `bits` must be at most 64.
    pub fn write_bits(&mut self, value: u64, bits: u32) {
        debug_assert!(bits <= 64, "cannot write {bits} bits at once");
        for b in (0..bits).rev() {
            let bit = ((value >> b) & 1) as u8;
            let offset = self.bit_len % 8;
            if offset == 0 {
                self.bytes.push(0);
            }
            if bit != 0 {
                let last = self.bytes.len() - 1;
                self.bytes[last] |= 1 << (7 - offset);
            }
            self.bit_len += 1;
        }
    }

    /// Number of bits written so far.
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Consumes the writer, returning `ceil(bit_len / 8)` bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Reads fixed-width values from a byte slice.
#[derive(Clone, Debug)]
pub struct BitReader<'a> {
    data: &'a [u8],
    /// Index of the next bit to read.
    position: usize,
}

impl<'a> BitReader<'a> {
    /// Creates a reader positioned at the first bit of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Number of unread bits.
    pub fn remaining(&self) -> usize {
        self.data.len() * 8 - self.position
    }

    /// Reads `bits` bits as an unsigned value, most significant first.
    ///
    /// Returns `None` without consuming anything if fewer than `bits` bits remain.
    pub fn read_bits(&mut self, bits: u32) -> Option<u64> {
        debug_assert!(bits <= 64, "cannot read {bits} bits at once");
        if self.remaining() < bits as usize {
            return None;
        }
        let mut value = 0u64;
        for _ in 0..bits {
            let byte = self.data[self.position / 8];
            let bit = (byte >> (7 - self.position % 8)) & 1;
            value = (value << 1) | u64::from(bit);
            self.position += 1;
        }
        Some(value)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_writer() {
        let writer = BitWriter::new();
        assert_eq!(writer.bit_len(), 0);
        assert!(writer.into_bytes().is_empty());
    }

    #[test]
    fn test_msb_first_layout() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b101, 3);
        assert_eq!(writer.into_bytes(), vec![0b1010_0000]);
    }

    #[test]
    fn test_fields_span_byte_boundaries() {
        let mut writer = BitWriter::with_capacity(12);
        writer.write_bits(0x3F, 6);
        writer.write_bits(0x3F, 6);
        assert_eq!(writer.bit_len(), 12);
        assert_eq!(writer.into_bytes(), vec![0xFF, 0xF0]);
    }

    #[test]
    fn test_high_bits_ignored() {
        let mut writer = BitWriter::new();
        writer.write_bits(0xFF, 4);
        assert_eq!(writer.into_bytes(), vec![0xF0]);
    }

    #[test]
    fn test_reader_roundtrip() {
        let mut writer = BitWriter::new();
        let values = [(5u64, 3u32), (1000, 12), (0, 1), (63, 6), (0x2_AAAA, 18)];
        for &(v, b) in &values {
            writer.write_bits(v, b);
        }
        let bytes = writer.into_bytes();
        let mut reader = BitReader::new(&bytes);
        for &(v, b) in &values {
            assert_eq!(reader.read_bits(b), Some(v));
        }
        assert!(reader.remaining() < 8);
    }

    #[test]
    fn test_reader_short_read_consumes_nothing() {
        let data = [0xAB];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_bits(9), None);
        assert_eq!(reader.remaining(), 8);
        assert_eq!(reader.read_bits(8), Some(0xAB));
        assert_eq!(reader.read_bits(1), None);
    }
}
