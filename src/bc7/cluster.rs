//! Groups the pixels of a tile into a few perceptual color clusters.

use super::Tile;
use crate::color::ColorYCbCrAlpha;

const MAX_ITERATIONS: usize = 8;
const MIN_SEPARATION: f32 = 1e-6;

/// Cluster id of every pixel. Ids are dense: `0..count` all occur.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ClusterAssignment {
    pub ids: [u8; 16],
    pub count: usize,
}

/// Deterministic k-means over the tile's luma/chroma/alpha coordinates.
///
/// Seeds are chosen farthest-point first, starting from the pixel farthest
/// from the mean. Fewer than `max_clusters` clusters come back when the tile
/// has fewer distinct colors.
pub(crate) fn cluster_pixels(tile: &Tile, max_clusters: usize) -> ClusterAssignment {
    assert!((1..=3).contains(&max_clusters));
    let points = &tile.ycbcr;

    let mean = centroid(points.iter());
    let mut centers = vec![points[farthest_from(points, |p| p.distance(&mean))]];
    while centers.len() < max_clusters {
        let nearest_center = |p: &ColorYCbCrAlpha| {
            centers.iter().map(|c| p.distance(c)).fold(f32::MAX, f32::min)
        };
        let next = farthest_from(points, nearest_center);
        if nearest_center(&points[next]) <= MIN_SEPARATION {
            break;
        }
        centers.push(points[next]);
    }

    let mut ids = [0u8; 16];
    for iteration in 0..MAX_ITERATIONS {
        let mut changed = false;
        for (id, p) in ids.iter_mut().zip(points.iter()) {
            let nearest = closest(&centers, p);
            changed |= nearest != *id;
            *id = nearest;
        }
        if !changed && iteration > 0 {
            break;
        }
        for (k, center) in centers.iter_mut().enumerate() {
            let members = points
                .iter()
                .zip(ids.iter())
                .filter(|(_, &id)| id as usize == k)
                .map(|(p, _)| p);
            if members.clone().next().is_some() {
                *center = centroid(members);
            }
        }
    }

    reduce(ids)
}

/// Renumbers ids densely in order of first appearance.
fn reduce(raw: [u8; 16]) -> ClusterAssignment {
    let mut mapping = [u8::MAX; 256];
    let mut count = 0;
    let ids = raw.map(|id| {
        let slot = &mut mapping[id as usize];
        if *slot == u8::MAX {
            *slot = count as u8;
            count += 1;
        }
        *slot
    });
    ClusterAssignment { ids, count }
}

fn closest(centers: &[ColorYCbCrAlpha], p: &ColorYCbCrAlpha) -> u8 {
    let mut best = 0;
    let mut best_d = f32::MAX;
    for (k, c) in centers.iter().enumerate() {
        let d = p.distance(c);
        if d < best_d {
            best = k;
            best_d = d;
        }
    }
    best as u8
}

/// Index of the point maximizing `score`, the lowest index on ties.
fn farthest_from(points: &[ColorYCbCrAlpha; 16], score: impl Fn(&ColorYCbCrAlpha) -> f32) -> usize {
    let mut best = 0;
    let mut best_score = f32::MIN;
    for (i, p) in points.iter().enumerate() {
        let s = score(p);
        if s > best_score {
            best = i;
            best_score = s;
        }
    }
    best
}

fn centroid<'a>(points: impl Iterator<Item = &'a ColorYCbCrAlpha>) -> ColorYCbCrAlpha {
    let mut sum = ColorYCbCrAlpha::default();
    let mut n = 0;
    for p in points {
        sum.y += p.y;
        sum.cb += p.cb;
        sum.cr += p.cr;
        sum.alpha += p.alpha;
        n += 1;
    }
    let n = n.max(1) as f32;
    ColorYCbCrAlpha {
        y: sum.y / n,
        cb: sum.cb / n,
        cr: sum.cr / n,
        alpha: sum.alpha / n,
    }
}
