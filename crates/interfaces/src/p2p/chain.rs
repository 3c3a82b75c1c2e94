use crate::p2p::error::RequestResult;
use async_trait::async_trait;
use basalt_primitives::{BlockHash, BlockRange, ChainInfo, Height};
use std::fmt::Debug;

/// Bounds on a single `blocks_from` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlocksFromOptions {
    /// The maximum number of blocks the peer should return.
    pub max_blocks: u64,
    /// The maximum number of bytes of blocks the peer should return.
    pub max_response_bytes: u64,
}

/// A client able to answer questions about a chain.
///
/// Both the local chain view and remote peers expose this interface, which is
/// what allows the synchronizer to compare the two sides symmetrically.
#[async_trait]
#[auto_impl::auto_impl(&, Arc, Box)]
pub trait ChainClient: Send + Sync + Debug {
    /// Returns the height and cumulative score of the chain tip.
    async fn chain_info(&self) -> RequestResult<ChainInfo>;

    /// Returns up to `max_hashes` block hashes starting at `height`.
    async fn hashes_from(&self, height: Height, max_hashes: u64) -> RequestResult<Vec<BlockHash>>;

    /// Returns a run of blocks starting at `height`.
    ///
    /// The returned range is empty if the chain does not extend past
    /// `height`. A non-empty range starts exactly at `height` and respects
    /// both bounds in `options`.
    async fn blocks_from(
        &self,
        height: Height,
        options: BlocksFromOptions,
    ) -> RequestResult<BlockRange>;
}
