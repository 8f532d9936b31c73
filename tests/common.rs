#![allow(dead_code)]

use bc7enc::{Bc7Block, Color32};

/// Deterministic xorshift tile. Opaque tiles get alpha 255.
pub fn noisy_tile(seed: u32, alpha: bool) -> [Color32; 16] {
    let mut state = seed.wrapping_mul(2_654_435_761).wrapping_add(0x9E37_79B9) | 1;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        (state >> 8) as u8
    };
    core::array::from_fn(|_| Color32::new(next(), next(), next(), if alpha { next() } else { 255 }))
}

/// A horizontal gradient between two colors with mild noise.
pub fn gradient_tile(from: Color32, to: Color32, seed: u32) -> [Color32; 16] {
    let noise = noisy_tile(seed, true);
    core::array::from_fn(|i| {
        let t = (i % 4) as i32;
        let mut c = Color32::default();
        for ch in 0..4 {
            let v = (from[ch] as i32 * (3 - t) + to[ch] as i32 * t) / 3 + (noise[i][ch] % 5) as i32 - 2;
            c[ch] = v.clamp(0, 255) as u8;
        }
        if from[3] == 255 && to[3] == 255 {
            c[3] = 255;
        }
        c
    })
}

/// A varied set of tiles covering opaque, translucent and structured content.
pub fn test_tiles() -> Vec<[Color32; 16]> {
    let mut tiles: Vec<_> = (0..6).map(|seed| noisy_tile(seed, seed % 2 == 1)).collect();
    tiles.push(gradient_tile(Color32::new(10, 20, 200, 255), Color32::new(240, 200, 30, 255), 1));
    tiles.push(gradient_tile(Color32::new(0, 0, 0, 0), Color32::new(255, 128, 64, 255), 2));
    tiles.push(core::array::from_fn(|i| {
        if (i % 4) + (i / 4) < 4 {
            Color32::new(255, 0, 0, 255)
        } else {
            Color32::new(0, 0, 255, 255)
        }
    }));
    tiles
}

/// Checks that every anchor index has its top bit clear.
pub fn assert_anchors_clear(block: &Bc7Block) {
    let fields = block.fields().expect("encoder never emits the reserved selector");
    let (color_bits, alpha_bits) = fields.index_bits();
    for &anchor in fields.anchor_pixels() {
        let index = fields.color_indices[anchor as usize];
        assert_eq!(index >> (color_bits - 1), 0, "anchor {} of {:?}", anchor, block);
    }
    if alpha_bits > 0 {
        assert_eq!(fields.alpha_indices[0] >> (alpha_bits - 1), 0, "alpha anchor of {:?}", block);
    }
}

/// Builds a row-major RGBA8 image of `blocks_wide` by `blocks_high` blocks.
pub fn image_from_tiles(tiles: &[[Color32; 16]], blocks_wide: usize) -> Vec<u8> {
    let blocks_high = tiles.len() / blocks_wide;
    let width = 4 * blocks_wide;
    let mut pixels = vec![0u8; tiles.len() * 64];
    for (index, tile) in tiles.iter().enumerate() {
        let (bx, by) = (index % blocks_wide, index / blocks_wide);
        assert!(by < blocks_high);
        for (i, color) in tile.iter().enumerate() {
            let (x, y) = (4 * bx + i % 4, 4 * by + i / 4);
            let offset = 4 * (y * width + x);
            pixels[offset..offset + 4].copy_from_slice(&color.0);
        }
    }
    pixels
}
