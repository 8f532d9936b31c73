//! Endpoint estimation, quantization and local refinement.

use super::indices::{subset_error, SubsetContext};
use super::{ModeInfo, PBits};
use crate::color::{Color32, ALPHA_CHANNEL};

const POWER_ITERATIONS: usize = 8;
const EPSILON: f32 = 1e-6;

/// Quantized endpoints of one subset together with their subset error.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct EndpointState {
    pub endpoints: [Color32; 2],
    pub p_bits: [u8; 2],
    pub error: f32,
}

impl EndpointState {
    pub fn evaluate(ctx: &SubsetContext, endpoints: [Color32; 2], p_bits: [u8; 2]) -> Self {
        let expanded = expand_pair(endpoints, p_bits, ctx.info);
        Self {
            endpoints,
            p_bits,
            error: subset_error(ctx, expanded),
        }
    }
}

/// Principal-axis endpoint estimate of the pixels of one subset, in 8 bits.
///
/// With `include_alpha` unset the axis is fitted to RGB only and the alpha
/// endpoints are the subset's alpha extremes.
pub(crate) fn estimate_endpoints(
    colors: &[Color32; 16],
    partition: &[u8; 16],
    subset: u8,
    include_alpha: bool,
) -> [Color32; 2] {
    let channels = if include_alpha { 4 } else { 3 };
    let members = || {
        colors
            .iter()
            .zip(partition.iter())
            .filter(move |(_, &s)| s == subset)
            .map(|(c, _)| *c)
    };

    let count = members().count();
    if count == 0 {
        return [Color32::default(); 2];
    }

    let mut mean = [0f32; 4];
    for c in members() {
        for ch in 0..4 {
            mean[ch] += c[ch] as f32;
        }
    }
    mean.iter_mut().for_each(|m| *m /= count as f32);

    let mut cov = [[0f32; 4]; 4];
    for c in members() {
        let d: [f32; 4] = core::array::from_fn(|ch| c[ch] as f32 - mean[ch]);
        for i in 0..channels {
            for j in 0..channels {
                cov[i][j] += d[i] * d[j];
            }
        }
    }

    let (alpha_lo, alpha_hi) = members().fold((255u8, 0u8), |(lo, hi), c| {
        (lo.min(c[ALPHA_CHANNEL]), hi.max(c[ALPHA_CHANNEL]))
    });
    let with_alpha = |mut e: [Color32; 2]| {
        if !include_alpha {
            e[0][ALPHA_CHANNEL] = alpha_lo;
            e[1][ALPHA_CHANNEL] = alpha_hi;
        }
        e
    };

    let axis = match principal_axis(&cov, channels) {
        Some(axis) => axis,
        None => {
            let c = to_color(mean);
            return with_alpha([c, c]);
        }
    };

    let (min_t, max_t) = members().fold((f32::MAX, f32::MIN), |(lo, hi), c| {
        let t: f32 = (0..channels).map(|ch| (c[ch] as f32 - mean[ch]) * axis[ch]).sum();
        (lo.min(t), hi.max(t))
    });

    let along = |t: f32| {
        let mut p = mean;
        for ch in 0..channels {
            p[ch] += t * axis[ch];
        }
        to_color(p)
    };
    with_alpha([along(min_t), along(max_t)])
}

/// Dominant eigenvector of a covariance matrix by power iteration.
fn principal_axis(cov: &[[f32; 4]; 4], channels: usize) -> Option<[f32; 4]> {
    let start = (0..channels).max_by(|&a, &b| cov[a][a].total_cmp(&cov[b][b]))?;
    if cov[start][start] <= EPSILON {
        return None;
    }

    let mut axis = normalized(cov[start])?;
    for _ in 0..POWER_ITERATIONS {
        let mut next = [0f32; 4];
        for i in 0..channels {
            next[i] = (0..channels).map(|j| cov[i][j] * axis[j]).sum();
        }
        match normalized(next) {
            Some(n) => axis = n,
            None => break,
        }
    }
    Some(axis)
}

fn normalized(v: [f32; 4]) -> Option<[f32; 4]> {
    let len = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if len <= EPSILON {
        None
    } else {
        Some(v.map(|x| x / len))
    }
}

fn to_color(v: [f32; 4]) -> Color32 {
    Color32(v.map(|x| x.round().clamp(0., 255.) as u8))
}

/// Reduces a pair of 8-bit endpoints to the block type's precision.
///
/// P-bits are chosen by majority vote over the color channels' bits the p-bit
/// replaces, and apply to alpha as well. The shared p-bit type votes over both
/// endpoints at once. With `ignore_alpha` the alpha channel is zeroed.
pub(crate) fn quantize_pair(
    endpoints: [Color32; 2],
    info: &ModeInfo,
    ignore_alpha: bool,
) -> ([Color32; 2], [u8; 2]) {
    match info.p_bits {
        PBits::None => (endpoints.map(|e| quantize_endpoint(e, info, ignore_alpha, None)), [0; 2]),
        PBits::Unique => {
            let p = endpoints.map(|e| vote_p_bit(&[e], info));
            (
                [
                    quantize_endpoint(endpoints[0], info, ignore_alpha, Some(p[0])),
                    quantize_endpoint(endpoints[1], info, ignore_alpha, Some(p[1])),
                ],
                p,
            )
        }
        PBits::Shared => {
            let p = vote_p_bit(&endpoints, info);
            (endpoints.map(|e| quantize_endpoint(e, info, ignore_alpha, Some(p))), [p; 2])
        }
    }
}

fn vote_p_bit(endpoints: &[Color32], info: &ModeInfo) -> u8 {
    const COLOR_CHANNELS: usize = 3;
    let shift = 8 - info.color_precision() as u32;
    let vote_mask = (1u32 << (shift + 1)) - 1;

    let total: u32 = endpoints
        .iter()
        .flat_map(|e| (0..COLOR_CHANNELS).map(move |ch| e[ch] as u32 & vote_mask))
        .sum();
    let average = total as f32 / (endpoints.len() * COLOR_CHANNELS) as f32;
    (average >= vote_mask as f32 / 2.) as u8
}

fn quantize_endpoint(e: Color32, info: &ModeInfo, ignore_alpha: bool, p_bit: Option<u8>) -> Color32 {
    let extra = p_bit.is_some() as u32;
    let mut q = Color32::default();
    for ch in 0..3 {
        q[ch] = (e[ch] as u32 >> (8 - info.color_bits as u32 - extra)) as u8 >> extra;
    }
    if info.has_alpha() && !ignore_alpha {
        q[ALPHA_CHANNEL] =
            (e[ALPHA_CHANNEL] as u32 >> (8 - info.alpha_bits as u32 - extra)) as u8 >> extra;
    }
    q
}

/// Expands a quantized endpoint back to 8 bits per channel, the way the
/// decoder does. Opaque types expand to alpha 255.
pub(crate) fn expand_endpoint(q: Color32, info: &ModeInfo, p_bit: u8) -> Color32 {
    let p_bit = info.has_p_bits().then_some(p_bit);
    let mut out = Color32::default();
    for ch in 0..3 {
        out[ch] = expand_channel(q[ch], info.color_bits, p_bit);
    }
    out[ALPHA_CHANNEL] = if info.has_alpha() {
        expand_channel(q[ALPHA_CHANNEL], info.alpha_bits, p_bit)
    } else {
        255
    };
    out
}

pub(crate) fn expand_pair(endpoints: [Color32; 2], p_bits: [u8; 2], info: &ModeInfo) -> [Color32; 2] {
    [
        expand_endpoint(endpoints[0], info, p_bits[0]),
        expand_endpoint(endpoints[1], info, p_bits[1]),
    ]
}

fn expand_channel(v: u8, bits: u8, p_bit: Option<u8>) -> u8 {
    let (v, bits) = match p_bit {
        Some(p) => (((v as u32) << 1) | p as u32, bits as u32 + 1),
        None => (v as u32, bits as u32),
    };
    if bits >= 8 {
        return v as u8;
    }
    let v = v << (8 - bits);
    (v | (v >> bits)) as u8
}

#[rustfmt::skip]
const PATTERNS_RGB: [[i8; 4]; 14] = [
    [ 1,  1,  1, 0], [-1, -1, -1, 0],
    [ 1,  0,  0, 0], [ 0,  1,  0, 0], [ 0,  0,  1, 0],
    [-1,  0,  0, 0], [ 0, -1,  0, 0], [ 0,  0, -1, 0],
    [ 1, -1,  0, 0], [-1,  1,  0, 0],
    [ 0,  1, -1, 0], [ 0, -1,  1, 0],
    [ 1,  0, -1, 0], [-1,  0,  1, 0],
];

#[rustfmt::skip]
const PATTERNS_RGBA: [[i8; 4]; 18] = [
    [ 1,  1,  1,  1], [-1, -1, -1, -1],
    [ 1,  1,  1,  0], [-1, -1, -1,  0],
    [ 0,  0,  0,  1], [ 0,  0,  0, -1],
    [ 1,  0,  0,  0], [ 0,  1,  0,  0], [ 0,  0,  1,  0],
    [-1,  0,  0,  0], [ 0, -1,  0,  0], [ 0,  0, -1,  0],
    [ 1, -1,  0,  0], [-1,  1,  0,  0],
    [ 0,  1, -1,  0], [ 0, -1,  1,  0],
    [ 1,  1,  1, -1], [-1, -1, -1,  1],
];

/// Hill-climbs quantized endpoints towards a lower subset error.
///
/// Each pass at a magnitude tries every perturbation pattern on both endpoints
/// apart, then every pattern on `ep0` alone, then on `ep1` alone, and finally
/// (optionally) flips p-bits.
/// Improvements are kept immediately. A pass without improvement halves the
/// magnitude. The returned error never exceeds the starting error.
pub(crate) fn refine_endpoints(
    ctx: &SubsetContext,
    endpoints: [Color32; 2],
    p_bits: [u8; 2],
    start_magnitude: u8,
    variate_p_bits: bool,
    variate_alpha: bool,
) -> EndpointState {
    let patterns: &[[i8; 4]] = if variate_alpha && ctx.info.has_alpha() {
        &PATTERNS_RGBA
    } else {
        &PATTERNS_RGB
    };
    let variate_p_bits = variate_p_bits && ctx.info.has_p_bits();

    let mut state = EndpointState::evaluate(ctx, endpoints, p_bits);
    let mut magnitude = start_magnitude as i32;
    while magnitude > 0 && state.error > 0. {
        let next = refine_pass(ctx, state, magnitude, patterns, variate_p_bits);
        if next.error < state.error {
            state = next;
        } else {
            magnitude /= 2;
        }
    }
    state
}

fn refine_pass(
    ctx: &SubsetContext,
    start: EndpointState,
    magnitude: i32,
    patterns: &[[i8; 4]],
    variate_p_bits: bool,
) -> EndpointState {
    let info = ctx.info;
    let better = |best: EndpointState, endpoints: [Color32; 2], p_bits: [u8; 2]| {
        if endpoints == best.endpoints && p_bits == best.p_bits {
            return best;
        }
        let candidate = EndpointState::evaluate(ctx, endpoints, p_bits);
        if candidate.error < best.error {
            candidate
        } else {
            best
        }
    };

    let mut best = start;
    for pattern in patterns {
        let [e0, e1] = best.endpoints;
        best = better(
            best,
            [offset(e0, pattern, -magnitude, info), offset(e1, pattern, magnitude, info)],
            best.p_bits,
        );
    }
    for pattern in patterns {
        let [e0, e1] = best.endpoints;
        best = better(best, [offset(e0, pattern, magnitude, info), e1], best.p_bits);
    }
    for pattern in patterns {
        let [e0, e1] = best.endpoints;
        best = better(best, [e0, offset(e1, pattern, magnitude, info)], best.p_bits);
    }

    if variate_p_bits {
        let [p0, p1] = best.p_bits;
        match info.p_bits {
            PBits::None => {}
            PBits::Unique => {
                best = better(best, best.endpoints, [p0 ^ 1, p1]);
                let [p0, p1] = best.p_bits;
                best = better(best, best.endpoints, [p0, p1 ^ 1]);
            }
            PBits::Shared => best = better(best, best.endpoints, [p0 ^ 1, p1 ^ 1]),
        }
    }
    best
}

fn offset(e: Color32, pattern: &[i8; 4], magnitude: i32, info: &ModeInfo) -> Color32 {
    let mut out = e;
    for (ch, &step) in pattern.iter().enumerate() {
        if step != 0 {
            let v = e[ch] as i32 + step as i32 * magnitude;
            out[ch] = v.clamp(0, info.max_channel_value(ch) as i32) as u8;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bc7::tables::partition_table;
    use crate::bc7::{BlockType, Tile};
    use rstest::rstest;

    fn gradient_tile() -> Tile {
        let mut colors = [Color32::default(); 16];
        for (i, c) in colors.iter_mut().enumerate() {
            let i = i as u8;
            *c = Color32::new(i * 15, 200 - i * 9, 40 + i * 3, 255 - i * 5);
        }
        Tile::new(&colors)
    }

    #[rstest]
    #[case(BlockType::Type1, 63, 0, 253)]
    #[case(BlockType::Type1, 63, 1, 255)]
    #[case(BlockType::Type1, 0, 1, 2)]
    #[case(BlockType::Type0, 15, 0, 247)]
    #[case(BlockType::Type0, 0, 1, 8)]
    #[case(BlockType::Type3, 0x7F, 0, 0xFE)]
    #[case(BlockType::Type6, 0x55, 1, 0xAB)]
    fn expand_inserts_p_bit(#[case] ty: BlockType, #[case] q: u8, #[case] p: u8, #[case] expected: u8) {
        let info = ty.info();
        let e = expand_endpoint(Color32::new(q, q, q, 0), info, p);
        assert_eq!(e, Color32::new(expected, expected, expected, if info.has_alpha() { p } else { 255 }));
    }

    #[test]
    fn expand_replicates_msbs() {
        let info = BlockType::Type2.info();
        let e = expand_endpoint(Color32::new(0b10110, 0b11111, 0, 0), info, 0);
        assert_eq!(e, Color32::new(0b1011_0101, 0xFF, 0, 255));

        let info = BlockType::Type5.info();
        let e = expand_endpoint(Color32::new(0x7F, 0x40, 0x01, 0x9A), info, 0);
        assert_eq!(e, Color32::new(0xFF, 0x81, 0x02, 0x9A));
    }

    #[test]
    fn quantize_then_expand_stays_close() {
        for ty in BlockType::ALL {
            let info = ty.info();
            for v in (0..=255u8).step_by(5) {
                let ep = [Color32::new(v, 255 - v, v / 2, 255); 2];
                let (q, p) = quantize_pair(ep, info, !info.has_alpha());
                let e = expand_pair(q, p, info);
                let step = 1i32 << (8 - info.color_precision());
                for ch in 0..3 {
                    let diff = (e[0][ch] as i32 - ep[0][ch] as i32).abs();
                    assert!(diff <= 2 * step, "{:?} {} ch {}: {:?}", ty, v, ch, e[0]);
                }
            }
        }
    }

    #[test]
    fn shared_p_bit_votes_over_both_endpoints() {
        let info = BlockType::Type1.info();
        // Low two bits: 3 in every channel of ep0, 0 in ep1. The mean is exactly half.
        let (_, p) = quantize_pair([Color32::new(3, 3, 3, 0), Color32::new(0, 0, 0, 0)], info, true);
        assert_eq!(p, [1, 1]);
        let (_, p) = quantize_pair([Color32::new(2, 2, 2, 0), Color32::new(0, 0, 0, 0)], info, true);
        assert_eq!(p, [0, 0]);
    }

    #[test]
    fn p_bit_vote_ignores_alpha() {
        let info = BlockType::Type6.info();
        // Color low bits vote 0 by one to two; alpha would tie the vote at 1.
        let ep = [Color32::new(0x41, 0x40, 0x40, 0xFF); 2];
        let ([q0, _], p) = quantize_pair(ep, info, false);
        assert_eq!(p, [0, 0]);
        // The p-bit is shared by alpha: 0xFF with p-bit 0 expands to 0xFE.
        assert_eq!(expand_endpoint(q0, info, p[0]), Color32::new(0x40, 0x40, 0x40, 0xFE));

        let ep = [Color32::new(0x41, 0x41, 0x40, 0x00); 2];
        let (_, p) = quantize_pair(ep, info, false);
        assert_eq!(p, [1, 1]);
    }

    #[test]
    fn ignore_alpha_zeroes_alpha() {
        let info = BlockType::Type7.info();
        let ([e0, e1], _) = quantize_pair([Color32::new(1, 2, 3, 200); 2], info, true);
        assert_eq!(e0[ALPHA_CHANNEL], 0);
        assert_eq!(e1[ALPHA_CHANNEL], 0);
    }

    #[test]
    fn single_color_subset_gives_identical_endpoints() {
        let colors = [Color32::new(12, 34, 56, 78); 16];
        let [e0, e1] = estimate_endpoints(&colors, &[0; 16], 0, true);
        assert_eq!(e0, Color32::new(12, 34, 56, 78));
        assert_eq!(e0, e1);
    }

    #[test]
    fn estimate_spans_a_linear_ramp() {
        let mut colors = [Color32::default(); 16];
        for (i, c) in colors.iter_mut().enumerate() {
            let v = i as u8 * 17;
            *c = Color32::new(v, v, 255 - v, 255);
        }
        let [e0, e1] = estimate_endpoints(&colors, &[0; 16], 0, false);
        let (lo, hi) = if e0[0] < e1[0] { (e0, e1) } else { (e1, e0) };
        assert_eq!(lo, Color32::new(0, 0, 255, 255));
        assert_eq!(hi, Color32::new(255, 255, 0, 255));
    }

    #[test]
    fn estimate_only_uses_the_subset() {
        let mut colors = [Color32::new(255, 0, 0, 255); 16];
        let partition = partition_table(2, 13);
        for (c, &s) in colors.iter_mut().zip(partition.iter()) {
            if s == 1 {
                *c = Color32::new(0, 0, 255, 255);
            }
        }
        let [e0, e1] = estimate_endpoints(&colors, partition, 1, false);
        assert_eq!(e0, Color32::new(0, 0, 255, 255));
        assert_eq!(e1, e0);
    }

    #[rstest]
    #[case(BlockType::Type1, 1, 0)]
    #[case(BlockType::Type3, 1, 1)]
    #[case(BlockType::Type4, 0, 1)]
    #[case(BlockType::Type6, 0, 0)]
    #[case(BlockType::Type7, 1, 1)]
    fn refinement_never_increases_error(
        #[case] ty: BlockType,
        #[case] subset: u8,
        #[case] index_mode: u8,
    ) {
        let tile = gradient_tile();
        let info = ty.info();
        let index_mode = index_mode.min((1 << info.index_mode_bits) - 1);
        let partition = partition_table(info.subset_count as usize, 5);
        let ctx = SubsetContext {
            tile: &tile,
            info,
            partition,
            subset: subset.min(info.subset_count - 1),
            index_mode,
        };
        let raw = estimate_endpoints(&tile.colors, partition, ctx.subset, !info.separate_alpha());
        let (q, p) = quantize_pair(raw, info, !info.has_alpha());
        let start = EndpointState::evaluate(&ctx, q, p);

        for magnitude in [1, 2, 4, 8] {
            let refined = refine_endpoints(&ctx, q, p, magnitude, true, true);
            assert!(refined.error <= start.error);
            assert_eq!(refined, EndpointState::evaluate(&ctx, refined.endpoints, refined.p_bits));
        }
    }

    #[rstest]
    #[case(BlockType::Type1, false)]
    #[case(BlockType::Type3, false)]
    #[case(BlockType::Type6, true)]
    #[case(BlockType::Type7, true)]
    fn every_pass_keeps_or_lowers_the_error(#[case] ty: BlockType, #[case] variate_alpha: bool) {
        let tile = gradient_tile();
        let info = ty.info();
        let partition = partition_table(info.subset_count as usize, 9);
        let ctx = SubsetContext { tile: &tile, info, partition, subset: 0, index_mode: 0 };
        let patterns: &[[i8; 4]] = if variate_alpha { &PATTERNS_RGBA } else { &PATTERNS_RGB };
        let raw = estimate_endpoints(&tile.colors, partition, 0, !info.separate_alpha());
        let (q, p) = quantize_pair(raw, info, !info.has_alpha());

        let mut state = EndpointState::evaluate(&ctx, q, p);
        let mut magnitude = 8;
        let mut passes = 0;
        while magnitude > 0 {
            let next = refine_pass(&ctx, state, magnitude, patterns, true);
            assert!(next.error <= state.error, "{:?} pass {}: {} > {}", ty, passes, next.error, state.error);
            if next.error < state.error {
                state = next;
            } else {
                assert_eq!(next, state);
                magnitude /= 2;
            }
            passes += 1;
            assert!(passes < 10_000);
        }
    }
}
