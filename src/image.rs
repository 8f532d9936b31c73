//! Encoding and decoding of whole images made of 4x4 blocks.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::bc7::{Quality, BC7_BLOCK_SIZE};
use crate::color::Color32;
use crate::error::{Error, Result};
use crate::{Bc7Codec, BlockCodec};

const TILE_PIXELS: usize = 16;
const BYTES_PER_PIXEL: usize = 4;

/// Cooperative cancellation flag, checked before each block is encoded.
#[derive(Debug, Default)]
pub struct CancellationToken {
    cancelled: AtomicBool,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

fn check_cancelled(cancel: Option<&CancellationToken>) -> Result<()> {
    match cancel {
        Some(token) if token.is_cancelled() => Err(Error::Cancelled),
        _ => Ok(()),
    }
}

/// Options for encoding images.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodeOptions {
    pub quality: Quality,
    /// Whether to spread blocks over worker threads. Has no effect without the
    /// `rayon` feature.
    pub parallel: bool,
    /// Size of a dedicated worker pool. 0 uses rayon's global pool.
    pub threads: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            quality: Quality::default(),
            parallel: cfg!(feature = "rayon"),
            threads: 0,
        }
    }
}

impl EncodeOptions {
    pub fn with_quality(self, quality: Quality) -> Self {
        Self { quality, ..self }
    }

    pub fn with_parallel(self, parallel: bool) -> Self {
        Self { parallel, ..self }
    }

    pub fn with_threads(self, threads: usize) -> Self {
        Self { threads, ..self }
    }

    /// The BC7 codec at the configured quality.
    pub fn codec(&self) -> Bc7Codec {
        Bc7Codec::new(self.quality)
    }
}

#[derive(Clone, Copy, Debug)]
struct BlockGrid {
    blocks_wide: usize,
    len: usize,
}

impl BlockGrid {
    fn new(blocks_wide: usize, blocks_high: usize) -> Result<Self> {
        if blocks_wide == 0 || blocks_high == 0 {
            return Err(Error::ZeroDimension { blocks_wide, blocks_high });
        }
        let len = blocks_wide
            .checked_mul(blocks_high)
            .filter(|len| len.checked_mul(TILE_PIXELS * BYTES_PER_PIXEL).is_some())
            .ok_or(Error::GridTooLarge { blocks_wide, blocks_high })?;
        Ok(Self { blocks_wide, len })
    }

    fn pixel_bytes(&self) -> usize {
        self.len * TILE_PIXELS * BYTES_PER_PIXEL
    }

    fn block_bytes(&self) -> usize {
        self.len * BC7_BLOCK_SIZE
    }

    /// Byte offset of the first pixel of row `y` (0..4) of block `index`.
    fn row_offset(&self, index: usize, y: usize) -> usize {
        let (block_x, block_y) = (index % self.blocks_wide, index / self.blocks_wide);
        let stride = 4 * self.blocks_wide;
        ((4 * block_y + y) * stride + 4 * block_x) * BYTES_PER_PIXEL
    }

    fn read_tile(&self, pixels: &[u8], index: usize) -> [Color32; 16] {
        let mut tile = [Color32::default(); 16];
        for y in 0..4 {
            let start = self.row_offset(index, y);
            let row = &pixels[start..start + 4 * BYTES_PER_PIXEL];
            for (color, rgba) in tile[4 * y..4 * y + 4].iter_mut().zip(row.chunks_exact(4)) {
                color.0.copy_from_slice(rgba);
            }
        }
        tile
    }

    fn write_tile(&self, pixels: &mut [u8], index: usize, tile: &[Color32; 16]) {
        for y in 0..4 {
            let start = self.row_offset(index, y);
            let row = &mut pixels[start..start + 4 * BYTES_PER_PIXEL];
            for (rgba, color) in row.chunks_exact_mut(4).zip(&tile[4 * y..4 * y + 4]) {
                rgba.copy_from_slice(&color.0);
            }
        }
    }
}

fn check_len(expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::InvalidBufferLength { expected, actual })
    }
}

/// Encodes a row-major RGBA8 image of `4 * blocks_wide` by `4 * blocks_high`
/// pixels into `blocks_wide * blocks_high` blocks, row by row.
///
/// Parallel and sequential encoding produce identical bytes. When `cancel` is
/// set before all blocks are done the call fails with [`Error::Cancelled`].
pub fn encode_image<C: BlockCodec + Sync>(
    pixels: &[u8],
    blocks_wide: usize,
    blocks_high: usize,
    codec: &C,
    options: &EncodeOptions,
    cancel: Option<&CancellationToken>,
) -> Result<Vec<u8>> {
    let grid = BlockGrid::new(blocks_wide, blocks_high)?;
    check_len(grid.pixel_bytes(), pixels.len())?;
    debug!(
        blocks_wide,
        blocks_high,
        ?codec,
        parallel = options.parallel,
        threads = options.threads,
        "encoding image"
    );

    let output = encode_blocks(grid.len, codec, options, cancel, |i| grid.read_tile(pixels, i))?;
    debug!(bytes = output.len(), "encoded image");
    Ok(output)
}

/// Encodes tiles that were already split into 4x4 blocks.
pub fn encode_tiles<C: BlockCodec + Sync>(
    tiles: &[[Color32; 16]],
    codec: &C,
    options: &EncodeOptions,
    cancel: Option<&CancellationToken>,
) -> Result<Vec<u8>> {
    debug!(
        tiles = tiles.len(),
        ?codec,
        parallel = options.parallel,
        threads = options.threads,
        "encoding tiles"
    );
    encode_blocks(tiles.len(), codec, options, cancel, |i| tiles[i])
}

fn encode_blocks<C, F>(
    count: usize,
    codec: &C,
    options: &EncodeOptions,
    cancel: Option<&CancellationToken>,
    tile_at: F,
) -> Result<Vec<u8>>
where
    C: BlockCodec + Sync,
    F: Fn(usize) -> [Color32; 16] + Sync,
{
    check_cancelled(cancel)?;
    let mut output = vec![0u8; count * BC7_BLOCK_SIZE];
    let encode_one = |(index, out): (usize, &mut [u8])| -> Result<()> {
        check_cancelled(cancel)?;
        out.copy_from_slice(&codec.encode_block(&tile_at(index)));
        Ok(())
    };

    #[cfg(feature = "rayon")]
    if options.parallel {
        use rayon::prelude::*;

        let mut run = || {
            output
                .par_chunks_mut(BC7_BLOCK_SIZE)
                .enumerate()
                .try_for_each(encode_one)
        };
        if options.threads > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(options.threads)
                .build()?;
            pool.install(run)?;
        } else {
            run()?;
        }
        return Ok(output);
    }

    #[cfg(not(feature = "rayon"))]
    let _ = options;

    output
        .chunks_exact_mut(BC7_BLOCK_SIZE)
        .enumerate()
        .try_for_each(encode_one)?;
    Ok(output)
}

/// Decodes `blocks_wide * blocks_high` blocks into a row-major RGBA8 image.
pub fn decode_image<C: BlockCodec>(
    data: &[u8],
    blocks_wide: usize,
    blocks_high: usize,
    codec: &C,
) -> Result<Vec<u8>> {
    let grid = BlockGrid::new(blocks_wide, blocks_high)?;
    check_len(grid.block_bytes(), data.len())?;
    debug!(blocks_wide, blocks_high, "decoding image");

    let mut pixels = vec![0u8; grid.pixel_bytes()];
    for (index, block) in block_iter(data).enumerate() {
        grid.write_tile(&mut pixels, index, &codec.decode_block(block));
    }
    Ok(pixels)
}

/// Decodes consecutive blocks into tiles.
pub fn decode_tiles<C: BlockCodec>(data: &[u8], codec: &C) -> Result<Vec<[Color32; 16]>> {
    if data.len() % BC7_BLOCK_SIZE != 0 {
        return Err(Error::InvalidBufferLength {
            expected: data.len() / BC7_BLOCK_SIZE * BC7_BLOCK_SIZE,
            actual: data.len(),
        });
    }
    Ok(block_iter(data).map(|block| codec.decode_block(block)).collect())
}

fn block_iter(data: &[u8]) -> impl Iterator<Item = [u8; BC7_BLOCK_SIZE]> + '_ {
    data.chunks_exact(BC7_BLOCK_SIZE).map(|c| {
        let mut block = [0u8; BC7_BLOCK_SIZE];
        block.copy_from_slice(c);
        block
    })
}
