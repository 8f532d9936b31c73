use super::endpoints::expand_pair;
use super::tables::{interpolate, partition_table, weights};
use super::{Bc7Block, BlockFields};
use crate::color::{Color32, ALPHA_CHANNEL};

/// Decodes a block into 16 pixels in row-major order.
///
/// The reserved selector decodes to transparent black.
pub fn decode_block(block: &Bc7Block) -> [Color32; 16] {
    match BlockFields::unpack(block) {
        Some(fields) => decode_fields(&fields),
        None => [Color32::default(); 16],
    }
}

pub(crate) fn decode_fields(fields: &BlockFields) -> [Color32; 16] {
    let info = fields.block_type.info();
    let subset_count = info.subset_count as usize;
    let partition = partition_table(subset_count, fields.partition as usize);

    let mut endpoints = [[Color32::default(); 2]; 3];
    for subset in 0..subset_count {
        endpoints[subset] = expand_pair(fields.endpoints[subset], fields.p_bits[subset], info);
    }

    let (color_bits, alpha_bits) = info.index_bits_for(fields.index_mode);
    let color_weights = weights(color_bits);
    let alpha_weights = weights(alpha_bits);

    let mut pixels = [Color32::default(); 16];
    for (i, pixel) in pixels.iter_mut().enumerate() {
        let [e0, e1] = endpoints[partition[i] as usize];
        let w = color_weights[fields.color_indices[i] as usize];
        let alpha_w = if info.separate_alpha() {
            alpha_weights[fields.alpha_indices[i] as usize]
        } else {
            w
        };

        for ch in 0..ALPHA_CHANNEL {
            pixel[ch] = interpolate(e0[ch], e1[ch], w);
        }
        pixel[ALPHA_CHANNEL] = interpolate(e0[ALPHA_CHANNEL], e1[ALPHA_CHANNEL], alpha_w);

        if fields.rotation > 0 {
            *pixel = pixel.swap_with_alpha(fields.rotation as usize - 1);
        }
    }
    pixels
}
