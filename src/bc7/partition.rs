use super::cluster::ClusterAssignment;
use super::tables::{partition_table, PARTITION_COUNT};

/// Orders the 64 partitions for `subset_count` subsets by how well they agree
/// with a clustering, best first. Ties keep table order.
pub(crate) fn rank_partitions(
    assignment: &ClusterAssignment,
    subset_count: usize,
) -> [u8; PARTITION_COUNT] {
    let errors: [u32; PARTITION_COUNT] = core::array::from_fn(|p| {
        mismatch_count(assignment, partition_table(subset_count, p), subset_count)
    });
    let mut order: [u8; PARTITION_COUNT] = core::array::from_fn(|p| p as u8);
    order.sort_by_key(|&p| errors[p as usize]);
    order
}

/// Pixels whose cluster differs from the most common cluster of their subset.
fn mismatch_count(assignment: &ClusterAssignment, table: &[u8; 16], subset_count: usize) -> u32 {
    let mut counts = [[0u8; 16]; 3];
    for (&subset, &id) in table.iter().zip(assignment.ids.iter()) {
        counts[subset as usize][id as usize] += 1;
    }

    let mut dominant = [0u8; 3];
    for (subset, hist) in counts.iter().enumerate().take(subset_count) {
        let mut best = 0;
        for id in 1..assignment.count {
            if hist[id] > hist[best] {
                best = id;
            }
        }
        dominant[subset] = best as u8;
    }

    table
        .iter()
        .zip(assignment.ids.iter())
        .filter(|(&subset, &id)| id != dominant[subset as usize])
        .count() as u32
}
