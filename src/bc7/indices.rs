//! Palette construction, per-pixel index assignment and anchor canonicalization.

use super::endpoints::expand_pair;
use super::tables::{interpolate, weights};
use super::{ModeInfo, Tile};
use crate::color::{alpha_distance, Color32, ColorYCbCrAlpha, ALPHA_CHANNEL};

/// The pixels of one subset as seen by one trial.
pub(crate) struct SubsetContext<'a> {
    pub tile: &'a Tile,
    pub info: &'static ModeInfo,
    pub partition: &'static [u8; 16],
    pub subset: u8,
    pub index_mode: u8,
}

impl SubsetContext<'_> {
    fn pixels(&self) -> impl Iterator<Item = usize> + '_ {
        (0..16).filter(move |&i| self.partition[i] == self.subset)
    }
}

/// Interpolated palette between two expanded endpoints.
struct Palette {
    colors: [ColorYCbCrAlpha; 16],
    color_len: usize,
    /// Only used when alpha is indexed separately.
    alphas: [u8; 16],
    alpha_len: usize,
    separate_alpha: bool,
}

impl Palette {
    fn new(ctx: &SubsetContext, endpoints: [Color32; 2]) -> Self {
        let info = ctx.info;
        let (color_bits, alpha_bits) = info.index_bits_for(ctx.index_mode);
        let [e0, e1] = endpoints;

        let color_weights = weights(color_bits);
        let mut colors = [ColorYCbCrAlpha::default(); 16];
        for (entry, &w) in colors.iter_mut().zip(color_weights) {
            let c = Color32(core::array::from_fn(|ch| interpolate(e0[ch], e1[ch], w)));
            *entry = ColorYCbCrAlpha::from_color(c);
        }

        let mut alphas = [0u8; 16];
        let mut alpha_len = 0;
        if info.separate_alpha() {
            let alpha_weights = weights(alpha_bits);
            for (entry, &w) in alphas.iter_mut().zip(alpha_weights) {
                *entry = interpolate(e0[ALPHA_CHANNEL], e1[ALPHA_CHANNEL], w);
            }
            alpha_len = alpha_weights.len();
        }

        Self {
            colors,
            color_len: color_weights.len(),
            alphas,
            alpha_len,
            separate_alpha: info.separate_alpha(),
        }
    }

    /// Nearest color entry, the lowest index on ties.
    fn best_color(&self, pixel: &ColorYCbCrAlpha) -> (u8, f32) {
        let distance = |entry: &ColorYCbCrAlpha| {
            if self.separate_alpha {
                pixel.color_distance(entry)
            } else {
                pixel.distance(entry)
            }
        };
        nearest(self.colors[..self.color_len].iter().map(distance))
    }

    fn best_alpha(&self, alpha: u8) -> (u8, f32) {
        nearest(self.alphas[..self.alpha_len].iter().map(|&a| alpha_distance(alpha, a)))
    }

    fn best(&self, tile: &Tile, i: usize) -> (u8, u8, f32) {
        let (color, color_err) = self.best_color(&tile.ycbcr[i]);
        if self.separate_alpha {
            let (alpha, alpha_err) = self.best_alpha(tile.colors[i][ALPHA_CHANNEL]);
            (color, alpha, color_err + alpha_err)
        } else {
            (color, 0, color_err)
        }
    }
}

fn nearest(distances: impl Iterator<Item = f32>) -> (u8, f32) {
    distances
        .enumerate()
        .fold((0, f32::MAX), |(best_i, best_d), (i, d)| {
            if d < best_d {
                (i as u8, d)
            } else {
                (best_i, best_d)
            }
        })
}

/// Summed error of the subset's pixels against the palette spanned by two
/// expanded endpoints.
pub(crate) fn subset_error(ctx: &SubsetContext, endpoints: [Color32; 2]) -> f32 {
    let palette = Palette::new(ctx, endpoints);
    ctx.pixels().map(|i| palette.best(ctx.tile, i).2).sum()
}

/// Writes the nearest palette index of every pixel in the subset.
pub(crate) fn assign_indices(
    ctx: &SubsetContext,
    endpoints: [Color32; 2],
    color_indices: &mut [u8; 16],
    alpha_indices: &mut [u8; 16],
) {
    let palette = Palette::new(ctx, endpoints);
    for i in ctx.pixels() {
        let (color, alpha, _) = palette.best(ctx.tile, i);
        color_indices[i] = color;
        if ctx.info.separate_alpha() {
            alpha_indices[i] = alpha;
        }
    }
}

/// Assigns indices for the subset so that the anchor pixel's index has its top
/// bit clear, swapping the quantized endpoints (and p-bits) when needed.
///
/// Swapping mirrors the palette exactly, so a single reassignment always
/// converges. Separately indexed alpha is canonicalized against pixel 0 on its
/// own, swapping only the alpha endpoints.
pub(crate) fn assign_canonical_indices(
    ctx: &SubsetContext,
    anchor: usize,
    endpoints: &mut [Color32; 2],
    p_bits: &mut [u8; 2],
    color_indices: &mut [u8; 16],
    alpha_indices: &mut [u8; 16],
) {
    let info = ctx.info;
    let (color_bits, alpha_bits) = info.index_bits_for(ctx.index_mode);
    let color_flipped = |indices: &[u8; 16]| indices[anchor] >> (color_bits - 1) != 0;
    let alpha_flipped = |indices: &[u8; 16]| {
        info.separate_alpha() && indices[0] >> (alpha_bits - 1) != 0
    };

    assign_indices(ctx, expand_pair(*endpoints, *p_bits, info), color_indices, alpha_indices);

    let swap_color = color_flipped(color_indices);
    let swap_alpha = alpha_flipped(alpha_indices);
    if !swap_color && !swap_alpha {
        return;
    }

    if info.separate_alpha() {
        let [e0, e1] = endpoints;
        if swap_color {
            for ch in 0..ALPHA_CHANNEL {
                core::mem::swap(&mut e0[ch], &mut e1[ch]);
            }
        }
        if swap_alpha {
            core::mem::swap(&mut e0[ALPHA_CHANNEL], &mut e1[ALPHA_CHANNEL]);
        }
    } else {
        endpoints.swap(0, 1);
        p_bits.swap(0, 1);
    }

    assign_indices(ctx, expand_pair(*endpoints, *p_bits, info), color_indices, alpha_indices);
    assert!(
        !color_flipped(color_indices) && !alpha_flipped(alpha_indices),
        "anchor index of pixel {} kept its top bit after swapping endpoints",
        anchor
    );
}
