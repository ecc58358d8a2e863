// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Measures a two-level lookup table (block index + deduplicated blocks)
//! for a range of block sizes.
//!
//! Nothing here picks a winner. The report is meant to be read by a human.

use std::fmt::{self, Write as _};
use std::iter;

use crate::dedup::{block_count, count_unique_blocks};
use crate::hash::RunSeed;

pub const MIN_BLOCK_SIZE: usize = 2;
pub const MAX_BLOCK_SIZE: usize = 8192;

/// 2, 4, 8, ..., 8192
pub fn block_sizes() -> impl Iterator<Item = usize> {
    iter::successors(Some(MIN_BLOCK_SIZE), |&size| {
        (size < MAX_BLOCK_SIZE).then_some(size * 2)
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportRow {
    pub block_size: usize,
    pub unique_blocks: usize,
    pub block_count: usize,
    /// Storage for the distinct blocks at one byte per value.
    pub data_bytes: usize,
    /// `data_bytes` plus a one byte index slot per block position.
    pub total_bytes: usize,
}

impl ReportRow {
    pub fn new(table_len: usize, block_size: usize, unique_blocks: usize) -> Self {
        let block_count = block_count(table_len, block_size);
        let data_bytes = unique_blocks * block_size;
        Self {
            block_size,
            unique_blocks,
            block_count,
            data_bytes,
            total_bytes: data_bytes + block_count,
        }
    }

    /// Bits an index slot needs to address every distinct block.
    pub fn index_bits(&self) -> usize {
        match self.unique_blocks {
            0 | 1 => 0,
            n => (usize::BITS - (n - 1).leading_zeros()) as usize,
        }
    }

    /// Like `total_bytes`, but with a bit-packed index.
    pub fn packed_total_bytes(&self) -> usize {
        self.data_bytes + (self.index_bits() * self.block_count).div_ceil(8)
    }
}

impl fmt::Display for ReportRow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:4}: {:4} {:7} {:7} {:7}",
            self.block_size, self.unique_blocks, self.block_count, self.data_bytes, self.total_bytes,
        )
    }
}

/// One row per block size, in the order given.
///
/// Each size's block set is dropped before the next size is measured.
pub fn sweep_sizes(
    table: &[u8],
    sizes: impl IntoIterator<Item = usize>,
    seed: RunSeed,
) -> Vec<ReportRow> {
    sizes
        .into_iter()
        .map(|size| ReportRow::new(table.len(), size, count_unique_blocks(table, size, seed)))
        .collect()
}

pub fn sweep(table: &[u8], seed: RunSeed) -> Vec<ReportRow> {
    sweep_sizes(table, block_sizes(), seed)
}

pub fn render_report(rows: &[ReportRow], packed_index: bool) -> String {
    let mut buf = String::new();
    for row in rows {
        if packed_index {
            _ = writeln!(buf, "{} {:7}", row, row.packed_total_bytes());
        } else {
            _ = writeln!(buf, "{row}");
        }
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::width::TABLE_LEN;

    const SEED: RunSeed = RunSeed::fixed(7);

    #[test]
    fn test_block_sizes() {
        let sizes: Vec<usize> = block_sizes().collect();
        assert_eq!(sizes.len(), 13);
        assert_eq!(sizes.first(), Some(&2));
        assert_eq!(sizes.last(), Some(&8192));
        assert!(sizes.windows(2).all(|w| w[1] == w[0] * 2));
        assert!(sizes.iter().all(|&s| TABLE_LEN % s == 0));
    }

    #[test]
    fn test_small_table_accounting() {
        let table = [0u8, 0, 1, 1, 0, 0, 1, 1];
        let rows = sweep_sizes(&table, [2, 4], SEED);
        assert_eq!(
            rows,
            vec![
                ReportRow {
                    block_size: 2,
                    unique_blocks: 2,
                    block_count: 4,
                    data_bytes: 4,
                    total_bytes: 8,
                },
                ReportRow {
                    block_size: 4,
                    unique_blocks: 1,
                    block_count: 2,
                    data_bytes: 4,
                    total_bytes: 6,
                },
            ]
        );
    }

    #[test]
    fn test_row_format() {
        let row = ReportRow::new(TABLE_LEN, 128, 80);
        assert_eq!(row.to_string(), " 128:   80    8704   10240   18944");

        let row = ReportRow::new(TABLE_LEN, 8192, 9);
        assert_eq!(row.to_string(), "8192:    9     136   73728   73864");
    }

    #[test]
    fn test_packed_index() {
        let row = ReportRow::new(TABLE_LEN, 128, 80);
        assert_eq!(row.index_bits(), 7);
        assert_eq!(row.packed_total_bytes(), 10240 + 8704 * 7 / 8);
        assert_eq!(ReportRow::new(8, 4, 1).index_bits(), 0);
        assert_eq!(ReportRow::new(8, 2, 2).index_bits(), 1);
        assert_eq!(ReportRow::new(8, 2, 2).packed_total_bytes(), 5);

        let report = render_report(&[ReportRow::new(8, 2, 2)], true);
        assert_eq!(report, "   2:    2       4       4       8       5\n");
    }

    #[test]
    fn test_full_sweep_rows() {
        let mut table = vec![1u8; TABLE_LEN];
        table[0x3000..0x3040].fill(2);
        table[0xA1] = 0;

        let rows = sweep(&table, SEED);
        assert_eq!(rows.len(), 13);
        assert!(rows.windows(2).all(|w| w[0].block_size < w[1].block_size));
        for row in &rows {
            assert_eq!(row.block_count, TABLE_LEN / row.block_size);
            assert_eq!(row.total_bytes, row.data_bytes + row.block_count);
        }

        // Narrow only, the one holding U+00A1, and wide (mixed once B > 64).
        assert_eq!(rows[0].unique_blocks, 3);
        assert_eq!(rows[5].block_size, 64);
        assert_eq!(rows[5].unique_blocks, 3);
        assert_eq!(rows[6].block_size, 128);
        assert_eq!(rows[6].unique_blocks, 3);

        let report = render_report(&rows, false);
        assert_eq!(report.lines().count(), 13);
        assert!(report.starts_with("   2:    3  557056       6  557062\n"));
    }

    #[test]
    fn test_seed_independent_sweep() {
        let table: Vec<u8> = (0..TABLE_LEN).map(|i| ((i >> 9) % 3 + (i & 1)) as u8 % 3).collect();
        assert_eq!(sweep(&table, RunSeed::fixed(1)), sweep(&table, RunSeed::fixed(2)));
    }
}
