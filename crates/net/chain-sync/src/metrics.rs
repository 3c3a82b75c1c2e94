use metrics::{counter, gauge, Counter, Gauge};
use std::fmt;

/// Chain synchronizer metrics, scoped under `sync.chain`.
#[derive(Clone)]
pub(crate) struct ChainSyncMetrics {
    /// The number of sync rounds started.
    pub(crate) sync_attempts: Counter,
    /// The total number of blocks pulled from peers.
    pub(crate) blocks_pulled: Counter,
    /// The number of peer interactions that ended in failure.
    pub(crate) failed_interactions: Counter,
    /// Bytes of downloaded blocks resident in the block pipeline.
    pub(crate) unprocessed_bytes: Gauge,
    /// Number of block ranges resident in the block pipeline.
    pub(crate) unprocessed_elements: Gauge,
}

impl Default for ChainSyncMetrics {
    fn default() -> Self {
        Self {
            sync_attempts: counter!("sync.chain.sync_attempts"),
            blocks_pulled: counter!("sync.chain.blocks_pulled"),
            failed_interactions: counter!("sync.chain.failed_interactions"),
            unprocessed_bytes: gauge!("sync.chain.unprocessed_bytes"),
            unprocessed_elements: gauge!("sync.chain.unprocessed_elements"),
        }
    }
}

impl fmt::Debug for ChainSyncMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainSyncMetrics").finish_non_exhaustive()
    }
}
