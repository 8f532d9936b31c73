//! Exact encoding of single-color tiles.
//!
//! Type6 with every index at 5 can hit any channel value exactly when the
//! p-bit suits all four channels. Otherwise Type5 with color index 1 is exact
//! for every RGB value and carries alpha in full 8 bits.

use std::sync::OnceLock;

use super::tables::{WEIGHTS_2, WEIGHTS_4};
use super::{Bc7Block, BlockFields, BlockType};
use crate::color::{Color32, ALPHA_CHANNEL};

const MODE_5_OPTIMAL_INDEX: u8 = 1;
const MODE_6_OPTIMAL_INDEX: u8 = 5;

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
struct OptimalEndpoint {
    lo: u8,
    hi: u8,
    err: u8,
}

static MODE_5_ENDPOINTS: OnceLock<[OptimalEndpoint; 256]> = OnceLock::new();
static MODE_6_ENDPOINTS: OnceLock<[[OptimalEndpoint; 256]; 2]> = OnceLock::new();

fn mode_5_endpoint(c: u8) -> OptimalEndpoint {
    MODE_5_ENDPOINTS.get_or_init(|| {
        let w = WEIGHTS_2[MODE_5_OPTIMAL_INDEX as usize] as i32;
        core::array::from_fn(|c| best_pair(c as i32, w, |v| (v << 1) | (v >> 6)))
    })[c as usize]
}

fn mode_6_endpoint(c: u8, p_bit: u8) -> OptimalEndpoint {
    MODE_6_ENDPOINTS.get_or_init(|| {
        let w = WEIGHTS_4[MODE_6_OPTIMAL_INDEX as usize] as i32;
        [0, 1].map(|p| core::array::from_fn(|c| best_pair(c as i32, w, |v| (v << 1) | p)))
    })[p_bit as usize][c as usize]
}

/// Searches the 7-bit endpoint pair whose interpolation at weight `w` lands
/// closest to `c`. The first pair with the lowest error wins.
fn best_pair(c: i32, w: i32, expand: impl Fn(i32) -> i32) -> OptimalEndpoint {
    let mut best = OptimalEndpoint { lo: 0, hi: 0, err: u8::MAX };
    for l in 0..128 {
        let low = expand(l);
        for h in l..128 {
            let k = (low * (64 - w) + expand(h) * w + 32) >> 6;
            let err = (k - c).unsigned_abs().min(u8::MAX as u32) as u8;
            if err < best.err {
                best = OptimalEndpoint { lo: l as u8, hi: h as u8, err };
                if err == 0 {
                    return best;
                }
            }
        }
    }
    best
}

/// The color of a tile whose pixels are all identical.
pub(crate) fn solid_color(tile: &[Color32; 16]) -> Option<Color32> {
    let first = tile[0];
    tile.iter().all(|&c| c == first).then_some(first)
}

pub(crate) fn encode_solid(color: Color32) -> Bc7Block {
    let err = |p: u8| -> u32 { color.0.iter().map(|&c| mode_6_endpoint(c, p).err as u32).sum() };
    let (err0, err1) = (err(0), err(1));

    let mut fields;
    if err0 > 0 && err1 > 0 {
        fields = BlockFields::new(BlockType::Type5);
        for ch in 0..ALPHA_CHANNEL {
            let e = mode_5_endpoint(color[ch]);
            fields.endpoints[0][0][ch] = e.lo;
            fields.endpoints[0][1][ch] = e.hi;
        }
        fields.endpoints[0][0][ALPHA_CHANNEL] = color[ALPHA_CHANNEL];
        fields.endpoints[0][1][ALPHA_CHANNEL] = color[ALPHA_CHANNEL];
        // Alpha indices stay 0, picking the exact alpha endpoint.
        fields.color_indices = [MODE_5_OPTIMAL_INDEX; 16];
    } else {
        let p = (err1 < err0) as u8;
        fields = BlockFields::new(BlockType::Type6);
        for ch in 0..4 {
            let e = mode_6_endpoint(color[ch], p);
            fields.endpoints[0][0][ch] = e.lo;
            fields.endpoints[0][1][ch] = e.hi;
        }
        fields.p_bits[0] = [p, p];
        fields.color_indices = [MODE_6_OPTIMAL_INDEX; 16];
    }
    fields.pack()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bc7::decode_block;

    #[test]
    fn mode_5_table_is_exact() {
        for c in 0..=255u8 {
            let e = mode_5_endpoint(c);
            assert_eq!(e.err, 0, "value {}", c);
            assert!(e.lo <= e.hi);
        }
    }

    #[test]
    fn mode_6_table_misses_only_the_extremes() {
        for c in 0..=255u8 {
            for p in 0..2 {
                let expected = ((c == 0 && p == 1) || (c == 255 && p == 0)) as u8;
                assert_eq!(mode_6_endpoint(c, p).err, expected, "value {} p-bit {}", c, p);
            }
        }
    }

    #[test]
    fn mode_6_tables_are_offset_by_one() {
        for c in 1..=255u8 {
            let with_p = mode_6_endpoint(c, 1);
            let without_p = mode_6_endpoint(c - 1, 0);
            assert_eq!((with_p.lo, with_p.hi), (without_p.lo, without_p.hi), "value {}", c);
        }
    }

    #[test]
    fn every_gray_level_and_alpha_is_exact() {
        for v in 0..=255u8 {
            for color in [
                Color32::new(v, v, v, 255),
                Color32::new(v, 255 - v, v / 3, v),
                Color32::new(0, v, 255, 255 - v),
            ] {
                let block = encode_solid(color);
                assert_eq!(decode_block(&block), [color; 16], "{:?}", color);
            }
        }
    }

    #[test]
    fn picks_type6_unless_extremes_conflict() {
        let block = encode_solid(Color32::new(10, 20, 30, 40));
        assert_eq!(block.block_type(), Some(BlockType::Type6));
        let block = encode_solid(Color32::new(0, 128, 255, 255));
        assert_eq!(block.block_type(), Some(BlockType::Type5));
    }

    #[test]
    fn detects_solid_tiles() {
        let c = Color32::new(1, 2, 3, 4);
        let mut tile = [c; 16];
        assert_eq!(solid_color(&tile), Some(c));
        tile[15][2] = 4;
        assert_eq!(solid_color(&tile), None);
    }
}
