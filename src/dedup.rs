// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::HashMap;

use crate::hash::RunSeed;

/// The distinct blocks of one table at one block size.
///
/// Blocks are bucketed by their digest. Each bucket lists the offset of every distinct
/// block seen with that digest. A block only counts as a duplicate after comparing
/// equal to one of them, so digest collisions never merge distinct blocks.
pub struct UniqueBlocks<'a> {
    table: &'a [u8],
    block_size: usize,
    seed: RunSeed,
    buckets: HashMap<u64, Vec<usize>>,
    unique: usize,
}

impl<'a> UniqueBlocks<'a> {
    /// # Panics
    ///
    /// If `block_size` is 0.
    pub fn new(table: &'a [u8], block_size: usize, seed: RunSeed) -> Self {
        assert!(block_size != 0, "block size must be non-zero");
        Self { table, block_size, seed, buckets: HashMap::new(), unique: 0 }
    }

    /// Adds every block of the table.
    ///
    /// The final block is truncated to whatever is left if
    /// `block_size` doesn't divide the table length.
    pub fn collect(mut self) -> Self {
        let mut off = 0;
        while off < self.table.len() {
            let len = self.block_size.min(self.table.len() - off);
            self.insert(off, len);
            off += len;
        }
        self
    }

    fn insert(&mut self, off: usize, len: usize) {
        let digest = self.seed.digest(&self.table[off..off + len]);
        self.insert_digest(off, len, digest);
    }

    fn insert_digest(&mut self, off: usize, len: usize, digest: u64) {
        let table = self.table;
        let block_size = self.block_size;
        let block = &table[off..off + len];
        let bucket = self.buckets.entry(digest).or_default();

        let seen = bucket.iter().any(|&other| {
            let other = &table[other..table.len().min(other + block_size)];
            other == block
        });
        if !seen {
            bucket.push(off);
            self.unique += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.unique
    }

    pub fn is_empty(&self) -> bool {
        self.unique == 0
    }

    /// Offsets of the first occurrence of each distinct block, in table order.
    pub fn offsets(&self) -> Vec<usize> {
        let mut offsets: Vec<usize> = self.buckets.values().flatten().copied().collect();
        offsets.sort_unstable();
        offsets
    }
}

/// Counts the distinct contents among the `block_size`-sized blocks of `table`.
pub fn count_unique_blocks(table: &[u8], block_size: usize, seed: RunSeed) -> usize {
    UniqueBlocks::new(table, block_size, seed).collect().len()
}

/// Number of blocks `table_len` splits into, counting a truncated final block.
pub fn block_count(table_len: usize, block_size: usize) -> usize {
    table_len.div_ceil(block_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: RunSeed = RunSeed::fixed(0x5eed);

    #[test]
    fn test_pairs_and_quads() {
        let table = [0u8, 0, 1, 1, 0, 0, 1, 1];
        assert_eq!(count_unique_blocks(&table, 2, SEED), 2);
        assert_eq!(count_unique_blocks(&table, 4, SEED), 1);
        assert_eq!(count_unique_blocks(&table, 8, SEED), 1);
        assert_eq!(count_unique_blocks(&table, 1, SEED), 2);
    }

    #[test]
    fn test_first_occurrences() {
        let table = [0u8, 0, 1, 1, 0, 0, 2, 2, 1, 1];
        let blocks = UniqueBlocks::new(&table, 2, SEED).collect();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks.offsets(), vec![0, 2, 6]);
    }

    #[test]
    fn test_truncated_final_block() {
        // [0 0 1] [1 0 0] [1]
        let table = [0u8, 0, 1, 1, 0, 0, 1];
        assert_eq!(count_unique_blocks(&table, 3, SEED), 3);
        assert_eq!(block_count(table.len(), 3), 3);

        // [1 1] [1 1] [1]: the short tail differs from the full blocks.
        let table = [1u8, 1, 1, 1, 1];
        assert_eq!(count_unique_blocks(&table, 2, SEED), 2);
    }

    #[test]
    fn test_block_larger_than_table() {
        let table = [2u8, 2, 2];
        assert_eq!(count_unique_blocks(&table, 8, SEED), 1);
        assert_eq!(block_count(table.len(), 8), 1);
        assert_eq!(count_unique_blocks(&[], 8, SEED), 0);
    }

    #[test]
    fn test_count_is_seed_independent() {
        let table: Vec<u8> = (0..4096u32).map(|i| ((i * 7 + i / 13) % 3) as u8).collect();
        for block_size in [2, 4, 8, 16, 32, 64] {
            let expected = count_unique_blocks(&table, block_size, RunSeed::fixed(1));
            for seed in [2, 3, 0xdead_beef] {
                let actual = count_unique_blocks(&table, block_size, RunSeed::fixed(seed));
                assert_eq!(actual, expected, "block size {block_size}, seed {seed}");
            }
        }
    }

    #[test]
    fn test_colliding_digests_are_compared() {
        // Every block lands in the same bucket.
        let table: Vec<u8> = (0..512u32).map(|i| ((i / 3) % 3) as u8).collect();
        let mut blocks = UniqueBlocks::new(&table, 4, SEED);
        for off in (0..table.len()).step_by(4) {
            blocks.insert_digest(off, 4, 0);
        }

        let mut distinct: Vec<&[u8]> = table.chunks(4).collect();
        distinct.sort();
        distinct.dedup();
        assert_eq!(blocks.buckets.len(), 1);
        assert_eq!(blocks.len(), distinct.len());
        assert_eq!(count_unique_blocks(&table, 4, SEED), distinct.len());
    }

    #[test]
    #[should_panic]
    fn test_zero_block_size() {
        count_unique_blocks(&[0u8, 1], 0, SEED);
    }
}
