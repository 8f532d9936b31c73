#![warn(clippy::all)]

//! BC7 texture block compression.
//!
//! A BC7 block stores a 4x4 tile of RGBA8 pixels in 16 bytes using one of
//! eight block types. [`encode_block`] searches for a good block at a chosen
//! [`Quality`], [`decode_block`] reconstructs the pixels, and the image
//! functions run either over whole row-major images.
//!
//! ```
//! use bc7enc::{decode_block, encode_block, Color32, Quality};
//!
//! let tile = [Color32::new(200, 100, 50, 255); 16];
//! let block = encode_block(&tile, Quality::Fast);
//! assert_eq!(decode_block(&block), tile);
//! ```

mod bitreader;
mod bitwriter;
mod color;
mod error;
mod image;

pub mod bc7;

pub use bc7::{
    decode_block, encode_block, AlphaMode, Bc7Block, BlockFields, BlockType, Quality,
    TierSettings, BC7_BLOCK_SIZE,
};
pub use color::{block_error, Color32};
pub use error::{Error, Result};
pub use image::{
    decode_image, decode_tiles, encode_image, encode_tiles, CancellationToken, EncodeOptions,
};

#[doc(hidden)]
#[macro_export]
macro_rules! mask {
    ($size:expr) => {
        !(!($size ^ $size)).checked_shl($size as u32).unwrap_or(0)
    }
}

/// A fixed-rate codec turning 4x4 tiles into 16-byte blocks.
///
/// The `Debug` form names the codec and its settings in log events.
pub trait BlockCodec: core::fmt::Debug {
    fn encode_block(&self, tile: &[Color32; 16]) -> [u8; BC7_BLOCK_SIZE];
    fn decode_block(&self, block: [u8; BC7_BLOCK_SIZE]) -> [Color32; 16];
}

/// The BC7 codec at a fixed quality tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bc7Codec {
    pub quality: Quality,
}

impl Bc7Codec {
    pub const fn new(quality: Quality) -> Self {
        Self { quality }
    }
}

impl BlockCodec for Bc7Codec {
    fn encode_block(&self, tile: &[Color32; 16]) -> [u8; BC7_BLOCK_SIZE] {
        encode_block(tile, self.quality).to_bytes()
    }

    fn decode_block(&self, block: [u8; BC7_BLOCK_SIZE]) -> [Color32; 16] {
        decode_block(&Bc7Block::from_bytes(block))
    }
}
