//! Constant BC7 lookup data: partition maps, anchor pixels and interpolation
//! weights.

pub const PARTITION_COUNT: usize = 64;

/// Partitions available to 3-subset types with a 4-bit partition field.
pub const SHORT_PARTITION_COUNT: usize = 16;

static PARTITIONS_1: [u8; 16] = [0; 16];

/// Subset id of every pixel for each 2-subset partition.
#[rustfmt::skip]
static PARTITIONS_2: [[u8; 16]; PARTITION_COUNT] = [
    [ 0,0,1,1,0,0,1,1,0,0,1,1,0,0,1,1 ], [ 0,0,0,1,0,0,0,1,0,0,0,1,0,0,0,1 ],
    [ 0,1,1,1,0,1,1,1,0,1,1,1,0,1,1,1 ], [ 0,0,0,1,0,0,1,1,0,0,1,1,0,1,1,1 ],
    [ 0,0,0,0,0,0,0,1,0,0,0,1,0,0,1,1 ], [ 0,0,1,1,0,1,1,1,0,1,1,1,1,1,1,1 ],
    [ 0,0,0,1,0,0,1,1,0,1,1,1,1,1,1,1 ], [ 0,0,0,0,0,0,0,1,0,0,1,1,0,1,1,1 ],
    [ 0,0,0,0,0,0,0,0,0,0,0,1,0,0,1,1 ], [ 0,0,1,1,0,1,1,1,1,1,1,1,1,1,1,1 ],
    [ 0,0,0,0,0,0,0,1,0,1,1,1,1,1,1,1 ], [ 0,0,0,0,0,0,0,0,0,0,0,1,0,1,1,1 ],
    [ 0,0,0,1,0,1,1,1,1,1,1,1,1,1,1,1 ], [ 0,0,0,0,0,0,0,0,1,1,1,1,1,1,1,1 ],
    [ 0,0,0,0,1,1,1,1,1,1,1,1,1,1,1,1 ], [ 0,0,0,0,0,0,0,0,0,0,0,0,1,1,1,1 ],
    [ 0,0,0,0,1,0,0,0,1,1,1,0,1,1,1,1 ], [ 0,1,1,1,0,0,0,1,0,0,0,0,0,0,0,0 ],
    [ 0,0,0,0,0,0,0,0,1,0,0,0,1,1,1,0 ], [ 0,1,1,1,0,0,1,1,0,0,0,1,0,0,0,0 ],
    [ 0,0,1,1,0,0,0,1,0,0,0,0,0,0,0,0 ], [ 0,0,0,0,1,0,0,0,1,1,0,0,1,1,1,0 ],
    [ 0,0,0,0,0,0,0,0,1,0,0,0,1,1,0,0 ], [ 0,1,1,1,0,0,1,1,0,0,1,1,0,0,0,1 ],
    [ 0,0,1,1,0,0,0,1,0,0,0,1,0,0,0,0 ], [ 0,0,0,0,1,0,0,0,1,0,0,0,1,1,0,0 ],
    [ 0,1,1,0,0,1,1,0,0,1,1,0,0,1,1,0 ], [ 0,0,1,1,0,1,1,0,0,1,1,0,1,1,0,0 ],
    [ 0,0,0,1,0,1,1,1,1,1,1,0,1,0,0,0 ], [ 0,0,0,0,1,1,1,1,1,1,1,1,0,0,0,0 ],
    [ 0,1,1,1,0,0,0,1,1,0,0,0,1,1,1,0 ], [ 0,0,1,1,1,0,0,1,1,0,0,1,1,1,0,0 ],
    [ 0,1,0,1,0,1,0,1,0,1,0,1,0,1,0,1 ], [ 0,0,0,0,1,1,1,1,0,0,0,0,1,1,1,1 ],
    [ 0,1,0,1,1,0,1,0,0,1,0,1,1,0,1,0 ], [ 0,0,1,1,0,0,1,1,1,1,0,0,1,1,0,0 ],
    [ 0,0,1,1,1,1,0,0,0,0,1,1,1,1,0,0 ], [ 0,1,0,1,0,1,0,1,1,0,1,0,1,0,1,0 ],
    [ 0,1,1,0,1,0,0,1,0,1,1,0,1,0,0,1 ], [ 0,1,0,1,1,0,1,0,1,0,1,0,0,1,0,1 ],
    [ 0,1,1,1,0,0,1,1,1,1,0,0,1,1,1,0 ], [ 0,0,0,1,0,0,1,1,1,1,0,0,1,0,0,0 ],
    [ 0,0,1,1,0,0,1,0,0,1,0,0,1,1,0,0 ], [ 0,0,1,1,1,0,1,1,1,1,0,1,1,1,0,0 ],
    [ 0,1,1,0,1,0,0,1,1,0,0,1,0,1,1,0 ], [ 0,0,1,1,1,1,0,0,1,1,0,0,0,0,1,1 ],
    [ 0,1,1,0,0,1,1,0,1,0,0,1,1,0,0,1 ], [ 0,0,0,0,0,1,1,0,0,1,1,0,0,0,0,0 ],
    [ 0,1,0,0,1,1,1,0,0,1,0,0,0,0,0,0 ], [ 0,0,1,0,0,1,1,1,0,0,1,0,0,0,0,0 ],
    [ 0,0,0,0,0,0,1,0,0,1,1,1,0,0,1,0 ], [ 0,0,0,0,0,1,0,0,1,1,1,0,0,1,0,0 ],
    [ 0,1,1,0,1,1,0,0,1,0,0,1,0,0,1,1 ], [ 0,0,1,1,0,1,1,0,1,1,0,0,1,0,0,1 ],
    [ 0,1,1,0,0,0,1,1,1,0,0,1,1,1,0,0 ], [ 0,0,1,1,1,0,0,1,1,1,0,0,0,1,1,0 ],
    [ 0,1,1,0,1,1,0,0,1,1,0,0,1,0,0,1 ], [ 0,1,1,0,0,0,1,1,0,0,1,1,1,0,0,1 ],
    [ 0,1,1,1,1,1,1,0,1,0,0,0,0,0,0,1 ], [ 0,0,0,1,1,0,0,0,1,1,1,0,0,1,1,1 ],
    [ 0,0,0,0,1,1,1,1,0,0,1,1,0,0,1,1 ], [ 0,0,1,1,0,0,1,1,1,1,1,1,0,0,0,0 ],
    [ 0,0,1,0,0,0,1,0,1,1,1,0,1,1,1,0 ], [ 0,1,0,0,0,1,0,0,0,1,1,1,0,1,1,1 ],
];

/// Subset id of every pixel for each 3-subset partition.
#[rustfmt::skip]
static PARTITIONS_3: [[u8; 16]; PARTITION_COUNT] = [
    [ 0,0,1,1,0,0,1,1,0,2,2,1,2,2,2,2 ], [ 0,0,0,1,0,0,1,1,2,2,1,1,2,2,2,1 ],
    [ 0,0,0,0,2,0,0,1,2,2,1,1,2,2,1,1 ], [ 0,2,2,2,0,0,2,2,0,0,1,1,0,1,1,1 ],
    [ 0,0,0,0,0,0,0,0,1,1,2,2,1,1,2,2 ], [ 0,0,1,1,0,0,1,1,0,0,2,2,0,0,2,2 ],
    [ 0,0,2,2,0,0,2,2,1,1,1,1,1,1,1,1 ], [ 0,0,1,1,0,0,1,1,2,2,1,1,2,2,1,1 ],
    [ 0,0,0,0,0,0,0,0,1,1,1,1,2,2,2,2 ], [ 0,0,0,0,1,1,1,1,1,1,1,1,2,2,2,2 ],
    [ 0,0,0,0,1,1,1,1,2,2,2,2,2,2,2,2 ], [ 0,0,1,2,0,0,1,2,0,0,1,2,0,0,1,2 ],
    [ 0,1,1,2,0,1,1,2,0,1,1,2,0,1,1,2 ], [ 0,1,2,2,0,1,2,2,0,1,2,2,0,1,2,2 ],
    [ 0,0,1,1,0,1,1,2,1,1,2,2,1,2,2,2 ], [ 0,0,1,1,2,0,0,1,2,2,0,0,2,2,2,0 ],
    [ 0,0,0,1,0,0,1,1,0,1,1,2,1,1,2,2 ], [ 0,1,1,1,0,0,1,1,2,0,0,1,2,2,0,0 ],
    [ 0,0,0,0,1,1,2,2,1,1,2,2,1,1,2,2 ], [ 0,0,2,2,0,0,2,2,0,0,2,2,1,1,1,1 ],
    [ 0,1,1,1,0,1,1,1,0,2,2,2,0,2,2,2 ], [ 0,0,0,1,0,0,0,1,2,2,2,1,2,2,2,1 ],
    [ 0,0,0,0,0,0,1,1,0,1,2,2,0,1,2,2 ], [ 0,0,0,0,1,1,0,0,2,2,1,0,2,2,1,0 ],
    [ 0,1,2,2,0,1,2,2,0,0,1,1,0,0,0,0 ], [ 0,0,1,2,0,0,1,2,1,1,2,2,2,2,2,2 ],
    [ 0,1,1,0,1,2,2,1,1,2,2,1,0,1,1,0 ], [ 0,0,0,0,0,1,1,0,1,2,2,1,1,2,2,1 ],
    [ 0,0,2,2,1,1,0,2,1,1,0,2,0,0,2,2 ], [ 0,1,1,0,0,1,1,0,2,0,0,2,2,2,2,2 ],
    [ 0,0,1,1,0,1,2,2,0,1,2,2,0,0,1,1 ], [ 0,0,0,0,2,0,0,0,2,2,1,1,2,2,2,1 ],
    [ 0,0,0,0,0,0,0,2,1,1,2,2,1,2,2,2 ], [ 0,2,2,2,0,0,2,2,0,0,1,2,0,0,1,1 ],
    [ 0,0,1,1,0,0,1,2,0,0,2,2,0,2,2,2 ], [ 0,1,2,0,0,1,2,0,0,1,2,0,0,1,2,0 ],
    [ 0,0,0,0,1,1,1,1,2,2,2,2,0,0,0,0 ], [ 0,1,2,0,1,2,0,1,2,0,1,2,0,1,2,0 ],
    [ 0,1,2,0,2,0,1,2,1,2,0,1,0,1,2,0 ], [ 0,0,1,1,2,2,0,0,1,1,2,2,0,0,1,1 ],
    [ 0,0,1,1,1,1,2,2,2,2,0,0,0,0,1,1 ], [ 0,1,0,1,0,1,0,1,2,2,2,2,2,2,2,2 ],
    [ 0,0,0,0,0,0,0,0,2,1,2,1,2,1,2,1 ], [ 0,0,2,2,1,1,2,2,0,0,2,2,1,1,2,2 ],
    [ 0,0,2,2,0,0,1,1,0,0,2,2,0,0,1,1 ], [ 0,2,2,0,1,2,2,1,0,2,2,0,1,2,2,1 ],
    [ 0,1,0,1,2,2,2,2,2,2,2,2,0,1,0,1 ], [ 0,0,0,0,2,1,2,1,2,1,2,1,2,1,2,1 ],
    [ 0,1,0,1,0,1,0,1,0,1,0,1,2,2,2,2 ], [ 0,2,2,2,0,1,1,1,0,2,2,2,0,1,1,1 ],
    [ 0,0,0,2,1,1,1,2,0,0,0,2,1,1,1,2 ], [ 0,0,0,0,2,1,1,2,2,1,1,2,2,1,1,2 ],
    [ 0,2,2,2,0,1,1,1,0,1,1,1,0,2,2,2 ], [ 0,0,0,2,1,1,1,2,1,1,1,2,0,0,0,2 ],
    [ 0,1,1,0,0,1,1,0,0,1,1,0,2,2,2,2 ], [ 0,0,0,0,0,0,0,0,2,1,1,2,2,1,1,2 ],
    [ 0,1,1,0,0,1,1,0,2,2,2,2,2,2,2,2 ], [ 0,0,2,2,0,0,1,1,0,0,1,1,0,0,2,2 ],
    [ 0,0,2,2,1,1,2,2,1,1,2,2,0,0,2,2 ], [ 0,0,0,0,0,0,0,0,0,0,0,0,2,1,1,2 ],
    [ 0,0,0,2,0,0,0,1,0,0,0,2,0,0,0,1 ], [ 0,2,2,2,1,2,2,2,0,2,2,2,1,2,2,2 ],
    [ 0,1,0,1,2,2,2,2,2,2,2,2,2,2,2,2 ], [ 0,1,1,1,2,0,1,1,2,2,0,1,2,2,2,0 ],
];

/// Anchor pixel of every subset. The anchor of subset 0 is always pixel 0.
#[rustfmt::skip]
static ANCHORS_2: [[u8; 2]; PARTITION_COUNT] = [
    [0, 15], [0, 15], [0, 15], [0, 15], [0, 15], [0, 15], [0, 15], [0, 15],
    [0, 15], [0, 15], [0, 15], [0, 15], [0, 15], [0, 15], [0, 15], [0, 15],
    [0, 15], [0,  2], [0,  8], [0,  2], [0,  2], [0,  8], [0,  8], [0, 15],
    [0,  2], [0,  8], [0,  2], [0,  2], [0,  8], [0,  8], [0,  2], [0,  2],
    [0, 15], [0, 15], [0,  6], [0,  8], [0,  2], [0,  8], [0, 15], [0, 15],
    [0,  2], [0,  8], [0,  2], [0,  2], [0,  2], [0, 15], [0, 15], [0,  6],
    [0,  6], [0,  2], [0,  6], [0,  8], [0, 15], [0, 15], [0,  2], [0,  2],
    [0, 15], [0, 15], [0, 15], [0, 15], [0, 15], [0,  2], [0,  2], [0, 15],
];

#[rustfmt::skip]
static ANCHORS_3: [[u8; 3]; PARTITION_COUNT] = [
    [0,  3, 15], [0,  3,  8], [0, 15,  8], [0, 15,  3], [0,  8, 15], [0,  3, 15], [0, 15,  3], [0, 15,  8],
    [0,  8, 15], [0,  8, 15], [0,  6, 15], [0,  6, 15], [0,  6, 15], [0,  5, 15], [0,  3, 15], [0,  3,  8],
    [0,  3, 15], [0,  3,  8], [0,  8, 15], [0, 15,  3], [0,  3, 15], [0,  3,  8], [0,  6, 15], [0, 10,  8],
    [0,  5,  3], [0,  8, 15], [0,  8,  6], [0,  6, 10], [0,  8, 15], [0,  5, 15], [0, 15, 10], [0, 15,  8],
    [0,  8, 15], [0, 15,  3], [0,  3, 15], [0,  5, 10], [0,  6, 10], [0, 10,  8], [0,  8,  9], [0, 15, 10],
    [0, 15,  6], [0,  3, 15], [0, 15,  8], [0,  5, 15], [0, 15,  3], [0, 15,  6], [0, 15,  6], [0, 15,  8],
    [0,  3, 15], [0, 15,  3], [0,  5, 15], [0,  5, 15], [0,  5, 15], [0,  8, 15], [0,  5, 15], [0, 10, 15],
    [0,  5, 15], [0, 10, 15], [0,  8, 15], [0, 13, 15], [0, 15,  3], [0, 12, 15], [0,  3, 15], [0,  3,  8],
];

pub const WEIGHTS_2: [u8; 4] = [0, 21, 43, 64];
pub const WEIGHTS_3: [u8; 8] = [0, 9, 18, 27, 37, 46, 55, 64];
pub const WEIGHTS_4: [u8; 16] = [0, 4, 9, 13, 17, 21, 26, 30, 34, 38, 43, 47, 51, 55, 60, 64];

pub fn partition_table(subset_count: usize, partition: usize) -> &'static [u8; 16] {
    match subset_count {
        1 => &PARTITIONS_1,
        2 => &PARTITIONS_2[partition],
        3 => &PARTITIONS_3[partition],
        _ => unreachable!("BC7 blocks have 1 to 3 subsets"),
    }
}

pub fn anchors(subset_count: usize, partition: usize) -> &'static [u8] {
    match subset_count {
        1 => &[0],
        2 => &ANCHORS_2[partition],
        3 => &ANCHORS_3[partition],
        _ => unreachable!("BC7 blocks have 1 to 3 subsets"),
    }
}

pub fn weights(index_bits: u8) -> &'static [u8] {
    match index_bits {
        2 => &WEIGHTS_2,
        3 => &WEIGHTS_3,
        4 => &WEIGHTS_4,
        _ => unreachable!("BC7 indices are 2 to 4 bits wide"),
    }
}

#[inline]
pub fn interpolate(e0: u8, e1: u8, weight: u8) -> u8 {
    let w = weight as u32;
    (((64 - w) * e0 as u32 + w * e1 as u32 + 32) >> 6) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchors_belong_to_their_subset() {
        for subset_count in 2..=3 {
            for partition in 0..PARTITION_COUNT {
                let table = partition_table(subset_count, partition);
                for (subset, &anchor) in anchors(subset_count, partition).iter().enumerate() {
                    assert_eq!(
                        table[anchor as usize] as usize, subset,
                        "partition {} of {} subsets", partition, subset_count
                    );
                }
            }
        }
    }

    #[test]
    fn every_subset_is_populated() {
        for subset_count in 1..=3 {
            for partition in 0..PARTITION_COUNT {
                let table = partition_table(subset_count, partition);
                for subset in 0..subset_count as u8 {
                    assert!(table.contains(&subset));
                }
                assert!(table.iter().all(|&s| (s as usize) < subset_count));
            }
        }
    }

    #[test]
    fn weight_tables_are_symmetric() {
        for bits in 2..=4 {
            let w = weights(bits);
            assert_eq!(w.len(), 1 << bits);
            for i in 0..w.len() {
                assert_eq!(w[i] + w[w.len() - 1 - i], 64);
            }
        }
    }

    #[test]
    fn interpolation_hits_both_endpoints() {
        assert_eq!(interpolate(10, 250, 0), 10);
        assert_eq!(interpolate(10, 250, 64), 250);
        assert_eq!(interpolate(0, 255, 32), 128);
    }
}
