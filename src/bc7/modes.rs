//! Encoding of one (block type, partition, rotation, index mode) combination.

use super::decode::decode_block;
use super::endpoints::{estimate_endpoints, quantize_pair, refine_endpoints};
use super::indices::{assign_canonical_indices, SubsetContext};
use super::tables::{anchors, partition_table};
use super::{AlphaMode, Bc7Block, BlockFields, BlockType, Tile};
use crate::color::{block_error, ALPHA_CHANNEL};

/// One candidate layout tried by the search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Trial {
    pub block_type: BlockType,
    pub partition: u8,
    pub rotation: u8,
    pub index_mode: u8,
    /// Starting step of the endpoint refinement.
    pub magnitude: u8,
}

impl Trial {
    pub const fn new(block_type: BlockType, partition: u8, magnitude: u8) -> Self {
        Self {
            block_type,
            partition,
            rotation: 0,
            index_mode: 0,
            magnitude,
        }
    }

    pub const fn rotated(self, rotation: u8, index_mode: u8) -> Self {
        Self {
            rotation,
            index_mode,
            ..self
        }
    }
}

/// An encoded trial and its whole-block error against the source tile.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Candidate {
    pub block: Bc7Block,
    pub error: f32,
}

pub(crate) fn encode_trial(tile: &Tile, trial: &Trial) -> Candidate {
    let block_type = trial.block_type;
    let info = block_type.info();
    let subset_count = info.subset_count as usize;
    let rotated = tile.rotated(trial.rotation);
    let partition = partition_table(subset_count, trial.partition as usize);
    let anchors = anchors(subset_count, trial.partition as usize);

    let mut fields = BlockFields::new(block_type);
    fields.partition = trial.partition;
    fields.rotation = trial.rotation;
    fields.index_mode = trial.index_mode;

    let joint_alpha = block_type.alpha_mode() == AlphaMode::Joint;
    let alpha_varies = rotated
        .colors
        .iter()
        .any(|c| c[ALPHA_CHANNEL] != rotated.colors[0][ALPHA_CHANNEL]);

    for subset in 0..subset_count {
        let ctx = SubsetContext {
            tile: &rotated,
            info,
            partition,
            subset: subset as u8,
            index_mode: trial.index_mode,
        };

        let raw = estimate_endpoints(&rotated.colors, partition, ctx.subset, joint_alpha);
        let (quantized, p_bits) = quantize_pair(raw, info, !info.has_alpha());
        let refined = refine_endpoints(
            &ctx,
            quantized,
            p_bits,
            trial.magnitude,
            true,
            info.has_alpha() && (alpha_varies || rotated.has_alpha),
        );

        let mut endpoints = refined.endpoints;
        let mut p_bits = refined.p_bits;
        assign_canonical_indices(
            &ctx,
            anchors[subset] as usize,
            &mut endpoints,
            &mut p_bits,
            &mut fields.color_indices,
            &mut fields.alpha_indices,
        );
        fields.endpoints[subset] = endpoints;
        fields.p_bits[subset] = p_bits;
    }

    // Scored through the packed form so the error is what a decoder sees.
    let block = fields.pack();
    Candidate {
        block,
        error: block_error(&tile.colors, &decode_block(&block)),
    }
}
