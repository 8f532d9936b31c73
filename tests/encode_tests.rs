#![warn(clippy::all)]

mod common;

use bc7enc::{block_error, decode_block, encode_block, Bc7Block, BlockType, Color32, Quality};
use common::{assert_anchors_clear, gradient_tile, noisy_tile, test_tiles};
use rstest::rstest;

#[rstest]
#[case(Quality::Fast)]
#[case(Quality::Balanced)]
#[case(Quality::BestQuality)]
fn anchors_are_canonical(#[case] quality: Quality) {
    for tile in test_tiles() {
        let block = encode_block(&tile, quality);
        assert_anchors_clear(&block);
        // The packed form parses back into the same block.
        assert_eq!(block.fields().unwrap().pack(), block);
    }
}

#[test]
fn better_tiers_never_lose() {
    for (i, tile) in test_tiles().iter().enumerate() {
        let errors = Quality::ALL.map(|q| block_error(tile, &decode_block(&encode_block(tile, q))));
        assert!(errors[1] <= errors[0], "tile {}: {:?}", i, errors);
        assert!(errors[2] <= errors[1], "tile {}: {:?}", i, errors);
    }
}

#[test]
fn encoding_is_deterministic() {
    for tile in test_tiles() {
        assert_eq!(encode_block(&tile, Quality::Balanced), encode_block(&tile, Quality::Balanced));
    }
}

#[rstest]
#[case(Quality::Fast)]
#[case(Quality::Balanced)]
#[case(Quality::BestQuality)]
fn solid_tiles_are_exact(#[case] quality: Quality) {
    let colors = [
        Color32::new(0, 0, 0, 255),
        Color32::new(255, 255, 255, 255),
        Color32::new(0, 128, 255, 255),
        Color32::new(17, 99, 201, 255),
        Color32::new(254, 1, 128, 255),
        Color32::new(64, 32, 16, 77),
        Color32::new(0, 0, 0, 0),
    ];
    for color in colors {
        let tile = [color; 16];
        let block = encode_block(&tile, quality);
        assert_eq!(decode_block(&block), tile, "{:?} at {}", color, quality);
        // Re-encoding the decoded tile reproduces the block.
        assert_eq!(encode_block(&decode_block(&block), quality), block);
    }
}

#[test]
fn black_over_white_is_near_exact() {
    let black = Color32::new(0, 0, 0, 255);
    let white = Color32::new(255, 255, 255, 255);
    let tile: [Color32; 16] = core::array::from_fn(|i| if i < 8 { black } else { white });

    let block = encode_block(&tile, Quality::BestQuality);
    let error = block_error(&tile, &decode_block(&block));
    assert!(error < Quality::BestQuality.settings().error_threshold, "error {}", error);
    assert_anchors_clear(&block);
}

#[test]
fn transparent_quadrant_keeps_its_alpha() {
    let tile: [Color32; 16] = core::array::from_fn(|i| {
        let transparent = i % 4 < 2 && i / 4 < 2;
        Color32::new(90, 160, 220, if transparent { 0 } else { 255 })
    });

    let block = encode_block(&tile, Quality::Fast);
    let block_type = block.block_type().unwrap();
    assert!(block_type.has_alpha(), "{:?}", block_type);

    let decoded = decode_block(&block);
    for (original, decoded) in tile.iter().zip(decoded.iter()) {
        let diff = (original[3] as i32 - decoded[3] as i32).abs();
        assert!(diff <= 8, "alpha {} decoded as {}", original[3], decoded[3]);
    }
}

#[rstest]
#[case(Quality::Fast)]
#[case(Quality::Balanced)]
#[case(Quality::BestQuality)]
fn translucent_tiles_use_alpha_types(#[case] quality: Quality) {
    for seed in 0..4 {
        let mut tile = gradient_tile(Color32::new(20, 40, 60, 255), Color32::new(220, 180, 90, 255), seed);
        tile[5][3] = 128;
        let block_type = encode_block(&tile, quality).block_type().unwrap();
        assert!(block_type.has_alpha(), "{:?} at {}", block_type, quality);
    }
}

#[test]
fn noisy_tiles_stay_close() {
    for seed in 0..8 {
        let tile = noisy_tile(seed, false);
        let error = block_error(&tile, &decode_block(&encode_block(&tile, Quality::Balanced)));
        // Random noise is the worst case; the decode must still beat a flat gray.
        let gray = [Color32::new(128, 128, 128, 255); 16];
        assert!(error < block_error(&tile, &gray), "seed {}: {}", seed, error);
    }
}

#[test]
fn reserved_selector_decodes_to_transparent_black() {
    let block = Bc7Block::from_bytes([0; 16]);
    assert_eq!(block.block_type(), None);
    assert_eq!(decode_block(&block), [Color32::default(); 16]);
}

#[test]
fn every_block_type_can_be_decoded() {
    for block_type in BlockType::ALL {
        let selector_mask = ((1u16 << (block_type.index() + 1)) - 1) as u8;
        let mut bytes = [0xA5u8; 16];
        bytes[0] = (bytes[0] & !selector_mask) | (1 << block_type.index());
        let block = Bc7Block::from_bytes(bytes);
        assert_eq!(block.block_type(), Some(block_type));
        let fields = block.fields().unwrap();
        assert_eq!(fields.block_type, block_type);
        let decoded = decode_block(&block);
        if !block_type.has_alpha() {
            assert!(decoded.iter().all(|c| c[3] == 255));
        }
    }
}
