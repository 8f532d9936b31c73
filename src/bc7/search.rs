//! Quality tiers and the per-block trial search.

use core::fmt;
use core::str::FromStr;

use tracing::trace;

use super::cluster::cluster_pixels;
use super::modes::{encode_trial, Trial};
use super::partition::rank_partitions;
use super::solid::{encode_solid, solid_color};
use super::tables::{PARTITION_COUNT, SHORT_PARTITION_COUNT};
use super::{Bc7Block, BlockType, Tile};
use crate::color::Color32;
use crate::error::Error;

/// Speed/quality tradeoff of the encoder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Quality {
    Fast,
    #[default]
    Balanced,
    BestQuality,
}

/// Search limits of a quality tier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TierSettings {
    /// The search stops once a trial's mean error falls below this.
    pub error_threshold: f32,
    /// Trials evaluated at most per block type, in plan order.
    pub max_trials: usize,
}

// Tuned constants. Thresholds never grow and trial counts never shrink from
// one tier to the next, and each tier's plan starts with the previous one's.
const FAST: TierSettings = TierSettings { error_threshold: 0.01, max_trials: 10 };
const BALANCED: TierSettings = TierSettings { error_threshold: 0.005, max_trials: 25 };
const BEST_QUALITY: TierSettings = TierSettings { error_threshold: 0.001, max_trials: 160 };

impl Quality {
    pub const ALL: [Quality; 3] = [Quality::Fast, Quality::Balanced, Quality::BestQuality];

    pub const fn settings(self) -> TierSettings {
        match self {
            Quality::Fast => FAST,
            Quality::Balanced => BALANCED,
            Quality::BestQuality => BEST_QUALITY,
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Quality::Fast => "fast",
            Quality::Balanced => "balanced",
            Quality::BestQuality => "best",
        })
    }
}

impl FromStr for Quality {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" => Ok(Quality::Fast),
            "balanced" => Ok(Quality::Balanced),
            "best" | "bestquality" => Ok(Quality::BestQuality),
            _ => Err(Error::UnsupportedQuality(s.to_owned())),
        }
    }
}

impl TryFrom<u8> for Quality {
    type Error = Error;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        Quality::ALL
            .get(v as usize)
            .copied()
            .ok_or_else(|| Error::UnsupportedQuality(v.to_string()))
    }
}

/// Partition orders best-first for the 2- and 3-subset tables.
struct RankedPartitions {
    two: [u8; PARTITION_COUNT],
    three: [u8; PARTITION_COUNT],
}

impl RankedPartitions {
    fn new(tile: &Tile) -> Self {
        Self {
            two: rank_partitions(&cluster_pixels(tile, 2), 2),
            three: rank_partitions(&cluster_pixels(tile, 3), 3),
        }
    }

    /// The i-th ranked 3-subset partition if a 4-bit partition field can hold it.
    fn short_three(&self, i: usize) -> Option<u8> {
        let p = self.three[i];
        ((p as usize) < SHORT_PARTITION_COUNT).then_some(p)
    }
}

fn push_two_and_three(plan: &mut Vec<Trial>, ranked: &RankedPartitions, range: core::ops::Range<usize>) {
    for i in range {
        plan.push(Trial::new(BlockType::Type1, ranked.two[i], 4));
        if let Some(p) = ranked.short_three(i) {
            plan.push(Trial::new(BlockType::Type0, p, 3));
        }
    }
}

fn push_low_precision(plan: &mut Vec<Trial>, ranked: &RankedPartitions, range: core::ops::Range<usize>) {
    for i in range {
        plan.push(Trial::new(BlockType::Type3, ranked.two[i], 5));
        plan.push(Trial::new(BlockType::Type2, ranked.three[i], 5));
    }
}

/// The ordered trials of a tier. Each tier's list begins with the list of the
/// tier below it.
fn trial_plan(quality: Quality, tile: &Tile, ranked: &RankedPartitions) -> Vec<Trial> {
    let mut plan = Vec::new();
    if tile.has_alpha {
        plan.push(Trial::new(BlockType::Type6, 0, 6));
        plan.push(Trial::new(BlockType::Type5, 0, 4));
        plan.push(Trial::new(BlockType::Type7, ranked.two[0], 4));
        if quality >= Quality::Balanced {
            plan.push(Trial::new(BlockType::Type4, 0, 4));
            plan.push(Trial::new(BlockType::Type4, 0, 4).rotated(0, 1));
            for i in 1..SHORT_PARTITION_COUNT {
                plan.push(Trial::new(BlockType::Type7, ranked.two[i], 4));
            }
            for rotation in 1..4 {
                plan.push(Trial::new(BlockType::Type5, 0, 4).rotated(rotation, 0));
            }
        }
        if quality >= Quality::BestQuality {
            for i in SHORT_PARTITION_COUNT..PARTITION_COUNT {
                plan.push(Trial::new(BlockType::Type7, ranked.two[i], 4));
            }
            for rotation in 1..4 {
                for index_mode in 0..2 {
                    plan.push(Trial::new(BlockType::Type4, 0, 4).rotated(rotation, index_mode));
                }
            }
            plan.push(Trial::new(BlockType::Type6, 0, 8));
        }
    } else {
        const FAST_PREFIX: usize = 4;
        const BALANCED_PREFIX: usize = 16;
        const LOW_PRECISION_PREFIX: usize = 12;

        plan.push(Trial::new(BlockType::Type6, 0, 6));
        push_two_and_three(&mut plan, ranked, 0..FAST_PREFIX);
        if quality >= Quality::Balanced {
            push_low_precision(&mut plan, ranked, 0..LOW_PRECISION_PREFIX);
            push_two_and_three(&mut plan, ranked, FAST_PREFIX..BALANCED_PREFIX);
        }
        if quality >= Quality::BestQuality {
            push_low_precision(&mut plan, ranked, LOW_PRECISION_PREFIX..PARTITION_COUNT);
            push_two_and_three(&mut plan, ranked, BALANCED_PREFIX..PARTITION_COUNT);
            for rotation in 0..4 {
                for index_mode in 0..2 {
                    plan.push(Trial::new(BlockType::Type4, 0, 4).rotated(rotation, index_mode));
                }
            }
            for rotation in 0..4 {
                plan.push(Trial::new(BlockType::Type5, 0, 4).rotated(rotation, 0));
            }
        }
    }
    plan
}

/// The trials of `plan` that fit the per-block-type budget, in plan order.
fn budgeted(plan: &[Trial], max_trials: usize) -> impl Iterator<Item = &Trial> {
    let mut tried = [0usize; BlockType::ALL.len()];
    plan.iter().filter(move |trial| {
        let count = &mut tried[trial.block_type.index() as usize];
        *count += 1;
        *count <= max_trials
    })
}

/// Encodes one 4x4 tile given in row-major order.
///
/// Tiles with a single color are encoded exactly without a search. Otherwise
/// the tier's trials run in order until one lands under the tier's error
/// threshold. Each block type gets at most the tier's trial budget; the first
/// lowest-error trial wins.
pub fn encode_block(tile: &[Color32; 16], quality: Quality) -> Bc7Block {
    if let Some(color) = solid_color(tile) {
        trace!(?color, "solid color block");
        return encode_solid(color);
    }

    let tile = Tile::new(tile);
    let settings = quality.settings();
    let ranked = RankedPartitions::new(&tile);
    let plan = trial_plan(quality, &tile, &ranked);

    let mut budget = budgeted(&plan, settings.max_trials);
    let mut best = encode_trial(&tile, budget.next().unwrap_or(&plan[0]));
    let mut trials = 1;
    let mut early_exit = best.error < settings.error_threshold;
    if !early_exit {
        for trial in budget {
            let candidate = encode_trial(&tile, trial);
            trials += 1;
            if candidate.error < best.error {
                best = candidate;
            }
            if candidate.error < settings.error_threshold {
                early_exit = true;
                break;
            }
        }
    }

    trace!(
        block_type = ?best.block.block_type(),
        trials,
        error = best.error,
        early_exit,
        "encoded block"
    );
    best.block
}
