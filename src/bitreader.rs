/// Reads bit fields LSB-first. Reads past the end yield zero bits.
pub struct BitReaderLsb<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> BitReaderLsb<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub fn bit_pos(&self) -> usize {
        self.pos
    }

    pub fn peek(&self, count: usize) -> u32 {
        assert!(count <= 32);
        if count == 0 {
            return 0;
        }
        let mut byte = self.pos / 8;
        let bit = self.pos % 8;

        let mut result = (self.byte_at(byte) >> bit) as u32;
        let mut read = 8 - bit;
        byte += 1;

        while read < count {
            result |= (self.byte_at(byte) as u32) << read;
            read += 8;
            byte += 1;
        }

        if count < 32 {
            result &= (1 << count) - 1;
        }
        result
    }

    pub fn read(&mut self, count: usize) -> u32 {
        let result = self.peek(count);
        self.pos += count;
        result
    }

    pub fn read_u8(&mut self, count: usize) -> u8 {
        assert!(count <= 8);
        self.read(count) as u8
    }

    pub fn remove(&mut self, count: usize) {
        self.pos += count;
    }

    fn byte_at(&self, i: usize) -> u8 {
        self.bytes.get(i).copied().unwrap_or(0)
    }
}
