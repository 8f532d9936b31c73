use super::tables::{anchors, PARTITION_COUNT, SHORT_PARTITION_COUNT};
use super::{Bc7Block, BlockType, ModeInfo, PBits, BC7_BLOCK_SIZE};
use crate::bitreader::BitReaderLsb;
use crate::bitwriter::BitWriterLsb;
use crate::color::{Color32, ALPHA_CHANNEL};

/// Every field of a BC7 block, with endpoints at the block type's precision.
///
/// Entries past the type's subset count are ignored when packing and zero
/// after unpacking. Alpha endpoint components of opaque types are ignored the
/// same way, as are `alpha_indices` of types without a separate alpha index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockFields {
    pub block_type: BlockType,
    pub partition: u8,
    pub rotation: u8,
    pub index_mode: u8,
    pub endpoints: [[Color32; 2]; 3],
    /// For the shared p-bit type both entries of a subset must be equal.
    pub p_bits: [[u8; 2]; 3],
    pub color_indices: [u8; 16],
    pub alpha_indices: [u8; 16],
}

impl BlockFields {
    pub fn new(block_type: BlockType) -> Self {
        Self {
            block_type,
            partition: 0,
            rotation: 0,
            index_mode: 0,
            endpoints: [[Color32::default(); 2]; 3],
            p_bits: [[0; 2]; 3],
            color_indices: [0; 16],
            alpha_indices: [0; 16],
        }
    }

    /// Serializes the fields into a block.
    ///
    /// Panics when a field does not fit its type's layout. Anchor pixels must
    /// already have the top bit of their index cleared.
    pub fn pack(&self) -> Bc7Block {
        let info = self.block_type.info();
        self.validate(info);

        let mut bytes = [0u8; BC7_BLOCK_SIZE];
        let mut writer = BitWriterLsb::new(&mut bytes);
        let mode = self.block_type.index();
        let subset_count = info.subset_count as usize;

        writer.write_u8(mode as usize + 1, 1 << mode);
        writer.write_u8(info.partition_bits as usize, self.partition);
        writer.write_u8(info.rotation_bits as usize, self.rotation);
        writer.write_u8(info.index_mode_bits as usize, self.index_mode);

        for channel in 0..info.endpoint_channel_count() {
            let bits = if channel == ALPHA_CHANNEL { info.alpha_bits } else { info.color_bits };
            for subset in &self.endpoints[..subset_count] {
                writer.write_u8(bits as usize, subset[0][channel]);
                writer.write_u8(bits as usize, subset[1][channel]);
            }
        }

        for p in &self.p_bits[..subset_count] {
            match info.p_bits {
                PBits::None => {}
                PBits::Unique => {
                    writer.write_u8(1, p[0]);
                    writer.write_u8(1, p[1]);
                }
                PBits::Shared => writer.write_u8(1, p[0]),
            }
        }

        let anchors = self.anchor_pixels();
        let (first, second) = self.index_sets();
        write_indices(&mut writer, first, info.index_bits, anchors);
        if info.separate_alpha() {
            write_indices(&mut writer, second, info.alpha_index_bits, &[0]);
        }

        writer.finish();
        Bc7Block(bytes)
    }

    /// Reads every field back, `None` for the reserved selector.
    pub fn unpack(block: &Bc7Block) -> Option<Self> {
        let block_type = block.block_type()?;
        let info = block_type.info();
        let subset_count = info.subset_count as usize;

        let mut reader = BitReaderLsb::new(&block.0);
        reader.remove(block_type.index() as usize + 1);

        let mut fields = Self::new(block_type);
        fields.partition = reader.read_u8(info.partition_bits as usize);
        fields.rotation = reader.read_u8(info.rotation_bits as usize);
        fields.index_mode = reader.read_u8(info.index_mode_bits as usize);

        for channel in 0..info.endpoint_channel_count() {
            let bits = if channel == ALPHA_CHANNEL { info.alpha_bits } else { info.color_bits };
            for subset in &mut fields.endpoints[..subset_count] {
                subset[0][channel] = reader.read_u8(bits as usize);
                subset[1][channel] = reader.read_u8(bits as usize);
            }
        }

        for p in &mut fields.p_bits[..subset_count] {
            match info.p_bits {
                PBits::None => {}
                PBits::Unique => {
                    p[0] = reader.read_u8(1);
                    p[1] = reader.read_u8(1);
                }
                PBits::Shared => {
                    let shared = reader.read_u8(1);
                    *p = [shared, shared];
                }
            }
        }

        let anchors = anchors(subset_count, fields.partition as usize);
        let mut first = [0u8; 16];
        let mut second = [0u8; 16];
        read_indices(&mut reader, &mut first, info.index_bits, anchors);
        if info.separate_alpha() {
            read_indices(&mut reader, &mut second, info.alpha_index_bits, &[0]);
        }
        debug_assert_eq!(reader.bit_pos(), 128);

        if fields.index_mode == 0 {
            fields.color_indices = first;
            fields.alpha_indices = second;
        } else {
            fields.color_indices = second;
            fields.alpha_indices = first;
        }

        Some(fields)
    }

    /// Index widths as (color, alpha). The alpha width is 0 unless the block
    /// type stores a separate alpha index set.
    pub fn index_bits(&self) -> (u8, u8) {
        let info = self.block_type.info();
        let (color, alpha) = info.index_bits_for(self.index_mode);
        (color, if info.separate_alpha() { alpha } else { 0 })
    }

    /// Pixels whose indices are stored one bit short, one per subset. Only
    /// pixel 0 is an anchor of a separate alpha index set.
    pub fn anchor_pixels(&self) -> &'static [u8] {
        anchors(self.block_type.subset_count(), self.partition as usize)
    }

    /// Index sets in storage order. The index mode stores alpha first.
    fn index_sets(&self) -> (&[u8; 16], &[u8; 16]) {
        if self.index_mode == 0 {
            (&self.color_indices, &self.alpha_indices)
        } else {
            (&self.alpha_indices, &self.color_indices)
        }
    }

    fn validate(&self, info: &ModeInfo) {
        let subset_count = info.subset_count as usize;
        let partition_count = match (info.subset_count, info.partition_bits) {
            (1, _) => 1,
            (_, 4) => SHORT_PARTITION_COUNT,
            _ => PARTITION_COUNT,
        };
        assert!((self.partition as usize) < partition_count, "partition out of range");
        assert!(self.rotation < 1 << info.rotation_bits, "rotation out of range");
        assert!(self.index_mode < 1 << info.index_mode_bits, "index mode out of range");

        for subset in &self.endpoints[..subset_count] {
            for endpoint in subset {
                for channel in 0..info.endpoint_channel_count() {
                    assert!(
                        endpoint[channel] <= info.max_channel_value(channel),
                        "endpoint {:?} exceeds the range of channel {}",
                        endpoint,
                        channel
                    );
                }
            }
        }

        for p in &self.p_bits[..subset_count] {
            match info.p_bits {
                PBits::None => {}
                PBits::Unique => assert!(p[0] <= 1 && p[1] <= 1, "p-bit out of range"),
                PBits::Shared => assert!(p[0] <= 1 && p[0] == p[1], "shared p-bits differ"),
            }
        }

        let anchors = self.anchor_pixels();
        let (first, second) = self.index_sets();
        check_indices(first, info.index_bits, anchors);
        if info.separate_alpha() {
            check_indices(second, info.alpha_index_bits, &[0]);
        }
    }
}

fn check_indices(indices: &[u8; 16], bits: u8, anchors: &[u8]) {
    for (i, &index) in indices.iter().enumerate() {
        let bits = if anchors.contains(&(i as u8)) { bits - 1 } else { bits };
        assert!(
            index < 1 << bits,
            "index {} of pixel {} does not fit {} bits",
            index,
            i,
            bits
        );
    }
}

fn write_indices(writer: &mut BitWriterLsb, indices: &[u8; 16], bits: u8, anchors: &[u8]) {
    for (i, &index) in indices.iter().enumerate() {
        let bits = if anchors.contains(&(i as u8)) { bits - 1 } else { bits };
        writer.write_u8(bits as usize, index);
    }
}

fn read_indices(reader: &mut BitReaderLsb, indices: &mut [u8; 16], bits: u8, anchors: &[u8]) {
    for (i, index) in indices.iter_mut().enumerate() {
        let bits = if anchors.contains(&(i as u8)) { bits - 1 } else { bits };
        *index = reader.read_u8(bits as usize);
    }
}
