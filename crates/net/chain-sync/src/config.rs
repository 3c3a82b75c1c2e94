use crate::compare::CompareChainsOptions;
use basalt_interfaces::p2p::chain::BlocksFromOptions;

/// Configuration for [`ChainSynchronizer`](crate::ChainSynchronizer).
///
/// All values must be positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainSyncConfig {
    /// The maximum number of blocks considered when comparing the local
    /// chain against a remote's.
    pub max_blocks_per_sync_attempt: u64,
    /// The number of blocks the local chain is prepared to roll back to
    /// accept a remote chain.
    pub max_rollback_blocks: u64,
    /// The maximum number of bytes of blocks requested from a peer in one
    /// request.
    pub max_chain_bytes_per_sync_attempt: u64,
}

impl Default for ChainSyncConfig {
    fn default() -> Self {
        Self {
            max_blocks_per_sync_attempt: 4000,
            max_rollback_blocks: 360,
            max_chain_bytes_per_sync_attempt: 8 * 1024 * 1024,
        }
    }
}

impl ChainSyncConfig {
    /// Set the maximum number of blocks considered during chain comparison.
    pub fn with_max_blocks_per_sync_attempt(mut self, max_blocks: u64) -> Self {
        self.max_blocks_per_sync_attempt = max_blocks;
        self
    }

    /// Set the rollback depth.
    pub fn with_max_rollback_blocks(mut self, max_rollback: u64) -> Self {
        self.max_rollback_blocks = max_rollback;
        self
    }

    /// Set the per-request byte cap.
    pub fn with_max_chain_bytes_per_sync_attempt(mut self, max_bytes: u64) -> Self {
        self.max_chain_bytes_per_sync_attempt = max_bytes;
        self
    }

    pub(crate) fn compare_chains_options(&self) -> CompareChainsOptions {
        CompareChainsOptions {
            max_blocks_to_analyze: self.max_blocks_per_sync_attempt,
            max_rollback_blocks: self.max_rollback_blocks,
        }
    }

    pub(crate) fn blocks_from_options(&self) -> BlocksFromOptions {
        BlocksFromOptions {
            max_blocks: self.max_rollback_blocks,
            max_response_bytes: self.max_chain_bytes_per_sync_attempt,
        }
    }

    /// Cap on the bytes of downloaded blocks resident in the pipeline before
    /// new syncs are deferred.
    pub(crate) fn max_unprocessed_bytes(&self) -> u64 {
        3 * self.max_chain_bytes_per_sync_attempt
    }
}
