//! Random chain data generators.

use basalt_primitives::{
    Block, BlockHash, BlockHeader, BlockRange, Height, Transaction, TransactionRange, U256,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::ops::{Range, RangeInclusive};

/// Returns a seedable rng for generating chain data.
pub fn rng() -> StdRng {
    StdRng::from_entropy()
}

/// Generates `count` random transactions.
pub fn random_transactions(rng: &mut impl Rng, count: usize) -> Vec<Transaction> {
    (0..count)
        .map(|_| {
            let mut payload = vec![0u8; rng.gen_range(32..256)];
            rng.fill(payload.as_mut_slice());
            Transaction { payload: payload.into() }
        })
        .collect()
}

/// Generates a random transaction range.
pub fn random_transaction_range(rng: &mut impl Rng, count: usize) -> TransactionRange {
    random_transactions(rng, count).into()
}

/// Generates a random block at `height` on top of `parent_hash`.
pub fn random_block(
    rng: &mut impl Rng,
    height: Height,
    parent_hash: BlockHash,
    tx_count: usize,
) -> Block {
    Block {
        header: BlockHeader {
            height,
            parent_hash,
            timestamp: rng.gen(),
            difficulty: U256::from(rng.gen::<u32>()),
        },
        transactions: random_transactions(rng, tx_count),
    }
}

/// Generates a parent-hash-chained run of random blocks covering `heights`.
///
/// The parent hash of the first block equals `parent`. The blocks are not
/// assumed to pass validation.
pub fn random_block_range(
    rng: &mut impl Rng,
    heights: RangeInclusive<Height>,
    parent: BlockHash,
    txs_per_block: Range<usize>,
) -> BlockRange {
    let mut blocks = Vec::with_capacity(
        (heights.end().saturating_sub(*heights.start()) as usize).saturating_add(1),
    );
    let mut parent = parent;
    for height in heights {
        let tx_count = rng.gen_range(txs_per_block.clone());
        let block = random_block(rng, height, parent, tx_count);
        parent = block.hash();
        blocks.push(block);
    }
    BlockRange::new(blocks)
}
