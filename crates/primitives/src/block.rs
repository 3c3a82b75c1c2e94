use crate::{transaction::Transaction, BlockHash, Height};
use alloy_primitives::{keccak256, U256};

/// A block header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockHeader {
    /// The position of the block in the chain.
    pub height: Height,
    /// The hash of the parent block.
    pub parent_hash: BlockHash,
    /// The timestamp the block was generated at.
    pub timestamp: u64,
    /// The amount of work required to generate this block.
    ///
    /// The chain score is the sum of the difficulties of all blocks on the
    /// chain; peers advertise it so that a node can decide whether a remote
    /// chain is better without downloading it.
    pub difficulty: U256,
}

impl BlockHeader {
    /// The encoded size of a header in bytes.
    pub const SIZE: usize = 80;

    /// Computes the hash of the header.
    pub fn hash(&self) -> BlockHash {
        let mut buf = [0u8; Self::SIZE];
        buf[..8].copy_from_slice(&self.height.to_le_bytes());
        buf[8..40].copy_from_slice(self.parent_hash.as_slice());
        buf[40..48].copy_from_slice(&self.timestamp.to_le_bytes());
        buf[48..80].copy_from_slice(&self.difficulty.to_le_bytes::<32>());
        keccak256(buf)
    }
}

/// A block with its transactions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    /// The block header.
    pub header: BlockHeader,
    /// The transactions included in the block.
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// The height of the block.
    pub fn height(&self) -> Height {
        self.header.height
    }

    /// The hash of the block header.
    pub fn hash(&self) -> BlockHash {
        self.header.hash()
    }

    /// Block size in bytes: the header plus all transaction payloads.
    pub fn size(&self) -> usize {
        BlockHeader::SIZE + self.transactions.iter().map(Transaction::size).sum::<usize>()
    }
}

/// An ordered run of blocks with monotonically increasing heights.
///
/// A range may be empty at the transport boundary: a peer that has nothing
/// past the requested height answers with no blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockRange {
    blocks: Vec<Block>,
}

impl BlockRange {
    /// Creates a range from the given blocks.
    ///
    /// The blocks are expected to be ordered by strictly increasing height.
    pub fn new(blocks: Vec<Block>) -> Self {
        debug_assert!(blocks.windows(2).all(|w| w[0].height() < w[1].height()));
        Self { blocks }
    }

    /// Concatenates several ranges into one, preserving arrival order.
    pub fn merge(ranges: Vec<BlockRange>) -> BlockRange {
        let mut blocks = Vec::with_capacity(ranges.iter().map(BlockRange::len).sum());
        for range in ranges {
            blocks.extend(range.blocks);
        }
        BlockRange::new(blocks)
    }

    /// The number of blocks in the range.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns `true` if the range holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The height of the first block, if any.
    pub fn first_height(&self) -> Option<Height> {
        self.blocks.first().map(Block::height)
    }

    /// The height of the last block, if any.
    pub fn last_height(&self) -> Option<Height> {
        self.blocks.last().map(Block::height)
    }

    /// Total size of the range in bytes.
    pub fn total_size(&self) -> usize {
        self.blocks.iter().map(Block::size).sum()
    }

    /// Iterator over the blocks in the range.
    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    /// Consumes the range, returning the blocks.
    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }
}

impl From<Vec<Block>> for BlockRange {
    fn from(blocks: Vec<Block>) -> Self {
        Self::new(blocks)
    }
}

impl IntoIterator for BlockRange {
    type Item = Block;
    type IntoIter = std::vec::IntoIter<Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(height: Height, num_txs: usize) -> Block {
        Block {
            header: BlockHeader { height, ..Default::default() },
            transactions: vec![Transaction { payload: vec![0u8; 10].into() }; num_txs],
        }
    }

    #[test]
    fn heights_and_sizes() {
        let range = BlockRange::new(vec![block(5, 1), block(6, 2), block(7, 0)]);
        assert_eq!(range.len(), 3);
        assert_eq!(range.first_height(), Some(5));
        assert_eq!(range.last_height(), Some(7));
        assert_eq!(range.total_size(), 3 * BlockHeader::SIZE + 30);
    }

    #[test]
    fn empty_range() {
        let range = BlockRange::default();
        assert!(range.is_empty());
        assert_eq!(range.first_height(), None);
        assert_eq!(range.last_height(), None);
        assert_eq!(range.total_size(), 0);
    }

    #[test]
    fn merge_preserves_arrival_order() {
        let first = BlockRange::new(vec![block(1, 0), block(2, 0)]);
        let second = BlockRange::new(vec![block(3, 1)]);
        let merged = BlockRange::merge(vec![first, second]);
        assert_eq!(merged.len(), 3);
        let heights: Vec<_> = merged.iter().map(Block::height).collect();
        assert_eq!(heights, vec![1, 2, 3]);
    }

    #[test]
    fn header_hash_commits_to_all_fields() {
        let header = BlockHeader { height: 1, timestamp: 2, ..Default::default() };
        let mut other = header.clone();
        other.timestamp = 3;
        assert_ne!(header.hash(), other.hash());
    }
}
