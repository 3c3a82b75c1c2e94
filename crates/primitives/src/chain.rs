use crate::Height;
use alloy_primitives::U256;

/// A summary of a chain tip as advertised by a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChainInfo {
    /// The height of the last block.
    pub height: Height,
    /// The cumulative score of the chain.
    pub score: U256,
}
