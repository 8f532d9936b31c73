//! BC7 block encoding and decoding.
//!
//! Every block is 128 bits and starts with a unary block type selector. The
//! layout of the remaining fields is driven entirely by [`ModeInfo`], so the
//! packer, the unpacker and the encoder all read field widths from the same
//! table.

use byteorder::{ByteOrder, LE};
use core::fmt;

use crate::color::{Color32, ColorYCbCrAlpha, ALPHA_CHANNEL};

mod cluster;
mod decode;
mod endpoints;
mod indices;
mod modes;
mod pack;
mod partition;
mod search;
mod solid;
mod tables;

pub use decode::decode_block;
pub use pack::BlockFields;
pub use search::{encode_block, Quality, TierSettings};

pub const BC7_BLOCK_SIZE: usize = 16;

/// One of the eight BC7 bit layouts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockType {
    Type0,
    Type1,
    Type2,
    Type3,
    Type4,
    Type5,
    Type6,
    Type7,
}

/// How a block type stores alpha.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlphaMode {
    /// No alpha bits, decodes to 255.
    Opaque,
    /// Alpha endpoints interpolated with the color index.
    Joint,
    /// Alpha has its own endpoints and its own index set.
    Separate,
}

impl BlockType {
    pub const ALL: [BlockType; 8] = [
        BlockType::Type0,
        BlockType::Type1,
        BlockType::Type2,
        BlockType::Type3,
        BlockType::Type4,
        BlockType::Type5,
        BlockType::Type6,
        BlockType::Type7,
    ];

    pub const fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub(crate) fn info(self) -> &'static ModeInfo {
        &BC7_MODES[self as usize]
    }

    pub fn subset_count(self) -> usize {
        self.info().subset_count as usize
    }

    pub fn alpha_mode(self) -> AlphaMode {
        let info = self.info();
        if info.alpha_bits == 0 {
            AlphaMode::Opaque
        } else if info.alpha_index_bits == 0 {
            AlphaMode::Joint
        } else {
            AlphaMode::Separate
        }
    }

    /// Whether the type can represent alpha other than 255.
    pub fn has_alpha(self) -> bool {
        self.alpha_mode() != AlphaMode::Opaque
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PBits {
    None,
    /// One p-bit per endpoint.
    Unique,
    /// One p-bit per subset, shared by both endpoints.
    Shared,
}

/// Field widths of one block type.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ModeInfo {
    pub subset_count: u8,
    pub partition_bits: u8,
    pub rotation_bits: u8,
    pub index_mode_bits: u8,
    pub color_bits: u8,
    pub alpha_bits: u8,
    pub p_bits: PBits,
    /// Width of the index set stored first (color, unless the index mode swaps it).
    pub index_bits: u8,
    /// Width of the second index set, 0 when alpha shares the color index.
    pub alpha_index_bits: u8,
}

#[rustfmt::skip]
const MODES: [ModeInfo; 8] = [
    ModeInfo { subset_count: 3, partition_bits: 4, rotation_bits: 0, index_mode_bits: 0, color_bits: 4, alpha_bits: 0, p_bits: PBits::Unique, index_bits: 3, alpha_index_bits: 0 },
    ModeInfo { subset_count: 2, partition_bits: 6, rotation_bits: 0, index_mode_bits: 0, color_bits: 6, alpha_bits: 0, p_bits: PBits::Shared, index_bits: 3, alpha_index_bits: 0 },
    ModeInfo { subset_count: 3, partition_bits: 6, rotation_bits: 0, index_mode_bits: 0, color_bits: 5, alpha_bits: 0, p_bits: PBits::None,   index_bits: 2, alpha_index_bits: 0 },
    ModeInfo { subset_count: 2, partition_bits: 6, rotation_bits: 0, index_mode_bits: 0, color_bits: 7, alpha_bits: 0, p_bits: PBits::Unique, index_bits: 2, alpha_index_bits: 0 },
    ModeInfo { subset_count: 1, partition_bits: 0, rotation_bits: 2, index_mode_bits: 1, color_bits: 5, alpha_bits: 6, p_bits: PBits::None,   index_bits: 2, alpha_index_bits: 3 },
    ModeInfo { subset_count: 1, partition_bits: 0, rotation_bits: 2, index_mode_bits: 0, color_bits: 7, alpha_bits: 8, p_bits: PBits::None,   index_bits: 2, alpha_index_bits: 2 },
    ModeInfo { subset_count: 1, partition_bits: 0, rotation_bits: 0, index_mode_bits: 0, color_bits: 7, alpha_bits: 7, p_bits: PBits::Unique, index_bits: 4, alpha_index_bits: 0 },
    ModeInfo { subset_count: 2, partition_bits: 6, rotation_bits: 0, index_mode_bits: 0, color_bits: 5, alpha_bits: 5, p_bits: PBits::Unique, index_bits: 2, alpha_index_bits: 0 },
];

pub(crate) static BC7_MODES: [ModeInfo; 8] = MODES;

impl ModeInfo {
    pub const fn has_alpha(&self) -> bool {
        self.alpha_bits > 0
    }

    pub const fn separate_alpha(&self) -> bool {
        self.alpha_index_bits > 0
    }

    pub const fn has_p_bits(&self) -> bool {
        !matches!(self.p_bits, PBits::None)
    }

    pub const fn p_bit_count(&self) -> u32 {
        match self.p_bits {
            PBits::None => 0,
            PBits::Unique => 2 * self.subset_count as u32,
            PBits::Shared => self.subset_count as u32,
        }
    }

    pub const fn color_precision(&self) -> u8 {
        self.color_bits + self.has_p_bits() as u8
    }

    /// Index widths as (color, alpha) for the given index mode.
    pub const fn index_bits_for(&self, index_mode: u8) -> (u8, u8) {
        if self.separate_alpha() {
            if index_mode == 0 {
                (self.index_bits, self.alpha_index_bits)
            } else {
                (self.alpha_index_bits, self.index_bits)
            }
        } else {
            (self.index_bits, self.index_bits)
        }
    }

    pub const fn endpoint_channel_count(&self) -> usize {
        if self.has_alpha() {
            4
        } else {
            3
        }
    }

    pub const fn max_channel_value(&self, channel: usize) -> u8 {
        let bits = if channel == ALPHA_CHANNEL {
            self.alpha_bits
        } else {
            self.color_bits
        };
        ((1u32 << bits) - 1) as u8
    }

    pub const fn total_bits(&self, selector_bits: u32) -> u32 {
        let subsets = self.subset_count as u32;
        let endpoints = 2 * subsets * (3 * self.color_bits as u32 + self.alpha_bits as u32);
        let color_indices = 16 * self.index_bits as u32 - subsets;
        let alpha_indices = if self.alpha_index_bits > 0 {
            16 * self.alpha_index_bits as u32 - 1
        } else {
            0
        };
        selector_bits
            + self.partition_bits as u32
            + self.rotation_bits as u32
            + self.index_mode_bits as u32
            + endpoints
            + self.p_bit_count()
            + color_indices
            + alpha_indices
    }
}

const _: () = {
    let mut i = 0;
    while i < MODES.len() {
        assert!(MODES[i].total_bits(i as u32 + 1) == 128);
        i += 1;
    }
};

/// A single encoded 128-bit BC7 block.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Bc7Block(pub [u8; BC7_BLOCK_SIZE]);

impl Bc7Block {
    pub const fn from_bytes(bytes: [u8; BC7_BLOCK_SIZE]) -> Self {
        Self(bytes)
    }

    pub const fn to_bytes(self) -> [u8; BC7_BLOCK_SIZE] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8; BC7_BLOCK_SIZE] {
        &self.0
    }

    pub fn to_u128(self) -> u128 {
        LE::read_u128(&self.0)
    }

    pub fn from_u128(bits: u128) -> Self {
        let mut bytes = [0u8; BC7_BLOCK_SIZE];
        LE::write_u128(&mut bytes, bits);
        Self(bytes)
    }

    /// The block type named by the selector, `None` for the reserved selector.
    pub fn block_type(&self) -> Option<BlockType> {
        match self.0[0] {
            0 => None,
            b => BlockType::from_index(b.trailing_zeros() as u8),
        }
    }

    pub fn fields(&self) -> Option<BlockFields> {
        BlockFields::unpack(self)
    }

    pub fn decode(&self) -> [Color32; 16] {
        decode_block(self)
    }
}

impl fmt::Debug for Bc7Block {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Bc7Block({:032X})", self.to_u128())
    }
}

impl From<[u8; BC7_BLOCK_SIZE]> for Bc7Block {
    fn from(bytes: [u8; BC7_BLOCK_SIZE]) -> Self {
        Self(bytes)
    }
}

impl From<Bc7Block> for [u8; BC7_BLOCK_SIZE] {
    fn from(block: Bc7Block) -> Self {
        block.0
    }
}

/// A tile prepared for the encoder: colors plus their perceptual coordinates.
#[derive(Clone, Copy)]
pub(crate) struct Tile {
    pub colors: [Color32; 16],
    pub ycbcr: [ColorYCbCrAlpha; 16],
    pub has_alpha: bool,
}

impl Tile {
    pub fn new(colors: &[Color32; 16]) -> Self {
        Self {
            colors: *colors,
            ycbcr: colors.map(ColorYCbCrAlpha::from_color),
            has_alpha: colors.iter().any(|c| c[ALPHA_CHANNEL] != 255),
        }
    }

    /// The tile with channel `rotation - 1` swapped into the alpha slot.
    pub fn rotated(&self, rotation: u8) -> Self {
        if rotation == 0 {
            *self
        } else {
            Self::new(&self.colors.map(|c| c.swap_with_alpha(rotation as usize - 1)))
        }
    }
}
