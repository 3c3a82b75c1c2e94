use basalt_primitives::BlockRange;

/// Accumulates the block ranges fetched from one peer during one sync round.
///
/// Per-sync scratch state; not thread safe.
#[derive(Debug)]
pub(crate) struct RangeAggregator {
    num_blocks: u64,
    ranges: Vec<BlockRange>,
}

impl RangeAggregator {
    pub(crate) fn new() -> Self {
        Self { num_blocks: 0, ranges: Vec::new() }
    }

    /// Appends a fetched range.
    pub(crate) fn add(&mut self, range: BlockRange) {
        self.num_blocks += range.len() as u64;
        self.ranges.push(range);
    }

    /// Merges the accumulated ranges into one, in arrival order.
    pub(crate) fn merge(self) -> BlockRange {
        BlockRange::merge(self.ranges)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.num_blocks == 0
    }

    pub(crate) fn num_blocks(&self) -> u64 {
        self.num_blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basalt_interfaces::test_utils::generators::{random_block_range, rng};
    use basalt_primitives::{Block, BlockHash};

    #[test]
    fn starts_empty() {
        let aggregator = RangeAggregator::new();
        assert!(aggregator.is_empty());
        assert_eq!(aggregator.num_blocks(), 0);
    }

    #[test]
    fn counts_appended_blocks() {
        let mut rng = rng();
        let mut aggregator = RangeAggregator::new();
        aggregator.add(random_block_range(&mut rng, 1..=10, BlockHash::ZERO, 0..2));
        aggregator.add(random_block_range(&mut rng, 11..=15, BlockHash::ZERO, 0..2));

        assert!(!aggregator.is_empty());
        assert_eq!(aggregator.num_blocks(), 15);
    }

    #[test]
    fn merge_concatenates_in_arrival_order() {
        let mut rng = rng();
        let mut aggregator = RangeAggregator::new();
        let first = random_block_range(&mut rng, 1..=10, BlockHash::ZERO, 0..2);
        let second = random_block_range(&mut rng, 11..=15, BlockHash::ZERO, 0..2);
        aggregator.add(first.clone());
        aggregator.add(second.clone());

        let merged = aggregator.merge().into_blocks();
        let expected: Vec<_> = first.into_iter().chain(second).collect();
        assert_eq!(merged, expected);

        let heights: Vec<_> = merged.iter().map(Block::height).collect();
        assert_eq!(heights, (1..=15).collect::<Vec<_>>());
    }
}
