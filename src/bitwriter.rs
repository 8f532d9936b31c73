use crate::mask;

/// Writes bit fields LSB-first into a fixed byte buffer.
pub struct BitWriterLsb<'a> {
    bytes: &'a mut [u8],
    bit_pos: usize,
}

impl<'a> BitWriterLsb<'a> {
    pub fn new(bytes: &'a mut [u8]) -> Self {
        Self { bytes, bit_pos: 0 }
    }

    pub fn bit_pos(&self) -> usize {
        self.bit_pos
    }

    pub fn write_u8(&mut self, count: usize, v: u8) {
        assert!(count <= 8);
        self.write_u32(count, v as u32)
    }

    pub fn write_u32(&mut self, count: usize, v: u32) {
        assert!(count <= 32);
        assert!(
            self.bit_pos + count <= self.bytes.len() * 8,
            "bit writer overflow: {} + {} bits into {} bytes",
            self.bit_pos,
            count,
            self.bytes.len()
        );
        if count == 0 {
            return;
        }
        let v = v & mask!(count as u32);

        let mut byte = self.bit_pos / 8;
        let bit = self.bit_pos % 8;
        self.bit_pos += count;

        self.bytes[byte] |= (v << bit) as u8;
        let mut written = 8 - bit;
        byte += 1;

        while written < count {
            self.bytes[byte] |= (v >> written) as u8;
            written += 8;
            byte += 1;
        }
    }

    /// Consumes the writer, checking that the buffer was filled exactly.
    pub fn finish(self) {
        assert_eq!(
            self.bit_pos(),
            self.bytes.len() * 8,
            "written bit count does not match the buffer size"
        );
    }
}
