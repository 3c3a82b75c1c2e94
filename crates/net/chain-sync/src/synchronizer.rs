use crate::{
    aggregator::RangeAggregator,
    compare::{compare_chains, ChainComparisonCode, CompareChainsOptions, CompareChainsResult},
    config::ChainSyncConfig,
    metrics::ChainSyncMetrics,
    unprocessed::UnprocessedElements,
};
use basalt_interfaces::{
    consumer::{BlockRangeConsumer, ShortHashesProvider, TransactionRangeConsumer},
    p2p::{
        chain::{BlocksFromOptions, ChainClient},
        transactions::TransactionsClient,
        PeerClient,
    },
    sync::InteractionOutcome,
};
use std::{fmt, sync::Arc};
use tracing::{debug, warn};

/// Drives the conversation with one remote peer at a time to keep the local
/// chain and unconfirmed-transaction pool up to date.
///
/// An external scheduler invokes [`sync`](Self::sync) with the peer it
/// selected; the synchronizer compares chains, pulls blocks or unconfirmed
/// transactions as appropriate and hands the results to the injected
/// consumers. Per instance, at most one sync round is in flight at any time.
pub struct ChainSynchronizer<C> {
    local: Arc<C>,
    compare_options: CompareChainsOptions,
    blocks_from_options: BlocksFromOptions,
    short_hashes: Arc<dyn ShortHashesProvider>,
    transaction_consumer: Arc<dyn TransactionRangeConsumer>,
    unprocessed: UnprocessedElements,
    metrics: ChainSyncMetrics,
}

impl<C> ChainSynchronizer<C>
where
    C: ChainClient,
{
    /// Creates a new synchronizer over the given local chain view.
    ///
    /// The synchronizer only ever requests `max_rollback_blocks` blocks at a
    /// time, so that even if the peer returns a chain part that is a fork of
    /// the real chain, that fork is still resolvable by rolling back.
    pub fn new(
        local: Arc<C>,
        config: ChainSyncConfig,
        short_hashes: Arc<dyn ShortHashesProvider>,
        block_consumer: Arc<dyn BlockRangeConsumer>,
        transaction_consumer: Arc<dyn TransactionRangeConsumer>,
    ) -> Self {
        let metrics = ChainSyncMetrics::default();
        Self {
            local,
            compare_options: config.compare_chains_options(),
            blocks_from_options: config.blocks_from_options(),
            short_hashes,
            transaction_consumer,
            unprocessed: UnprocessedElements::new(
                block_consumer,
                config.max_unprocessed_bytes(),
                metrics.clone(),
            ),
            metrics,
        }
    }

    /// Runs one sync round against `remote`.
    ///
    /// Resolves [`InteractionOutcome::Neutral`] immediately if another round
    /// is already in flight, the resident bytes are over the cap or the
    /// tracker is quarantined; the scheduler is expected to retry later.
    pub async fn sync<R>(&self, remote: &R) -> InteractionOutcome
    where
        R: PeerClient,
    {
        if !self.unprocessed.should_start_sync() {
            return InteractionOutcome::Neutral
        }
        self.metrics.sync_attempts.increment(1);

        // released on every resolution path, including cancellation
        let _slot = PendingSyncSlot(self.unprocessed.clone());

        let outcome = self.sync_once(remote).await;
        if outcome.is_failure() {
            self.metrics.failed_interactions.increment(1);
        }
        outcome
    }

    async fn sync_once<R>(&self, remote: &R) -> InteractionOutcome
    where
        R: PeerClient,
    {
        // With blocks from an earlier round still draining downstream, skip
        // the comparison and keep extending the chain part already pulled.
        let compare_result = if self.unprocessed.is_empty() {
            match compare_chains(&*self.local, remote, self.compare_options).await {
                Ok(result) => result,
                Err(err) => {
                    debug!(target: "sync::chain", %err, "chain comparison failed");
                    return InteractionOutcome::Failure
                }
            }
        } else {
            CompareChainsResult {
                code: ChainComparisonCode::RemoteIsNotSynced,
                common_block_height: self.unprocessed.max_height(),
                fork_depth: 0,
            }
        };

        match compare_result.code {
            ChainComparisonCode::RemoteReportedEqualChainScore => {
                self.pull_unconfirmed_transactions(remote).await
            }
            ChainComparisonCode::RemoteIsNotSynced => self.pull_blocks(remote, compare_result).await,
            code => {
                let outcome = outcome_for(code);
                if outcome.is_failure() {
                    warn!(target: "sync::chain", ?code, "node interaction failed");
                }
                outcome
            }
        }
    }

    /// The peer has the same chain score: trade unconfirmed transactions
    /// instead of blocks.
    async fn pull_unconfirmed_transactions<R>(&self, remote: &R) -> InteractionOutcome
    where
        R: TransactionsClient,
    {
        let known = self.short_hashes.short_hashes();
        match remote.unconfirmed_transactions(known).await {
            Ok(range) => {
                debug!(target: "sync::chain", count = range.len(), "peer returned unconfirmed transactions");
                self.transaction_consumer.consume_transactions(range);
                InteractionOutcome::Neutral
            }
            Err(err) => {
                debug!(target: "sync::chain", %err, "failed to request unconfirmed transactions");
                InteractionOutcome::Failure
            }
        }
    }

    /// Pulls blocks past the common height until the peer runs out or the
    /// fork depth worth of blocks has been fetched, then hands the merged
    /// range to the pipeline.
    ///
    /// At least one request is always issued: with a fork depth of 0 the
    /// first non-empty response already satisfies the bound.
    async fn pull_blocks<R>(
        &self,
        remote: &R,
        compare_result: CompareChainsResult,
    ) -> InteractionOutcome
    where
        R: ChainClient,
    {
        debug!(
            target: "sync::chain",
            common_height = compare_result.common_block_height,
            "pulling blocks from remote"
        );

        let mut aggregator = RangeAggregator::new();
        let mut height = compare_result.common_block_height + 1;
        loop {
            let range = match remote.blocks_from(height, self.blocks_from_options).await {
                Ok(range) => range,
                Err(err) => {
                    debug!(target: "sync::chain", %err, "failed to request blocks");
                    return InteractionOutcome::Failure
                }
            };

            let (Some(first), Some(last)) = (range.first_height(), range.last_height()) else {
                debug!(target: "sync::chain", "peer returned 0 blocks");
                break
            };
            debug!(target: "sync::chain", count = range.len(), first, last, "peer returned blocks");

            self.metrics.blocks_pulled.increment(range.len() as u64);
            aggregator.add(range);
            if aggregator.num_blocks() >= compare_result.fork_depth {
                break
            }

            height = last + 1;
        }

        if aggregator.is_empty() {
            return InteractionOutcome::Neutral
        }

        if self.unprocessed.add(aggregator.merge()) {
            InteractionOutcome::Success
        } else {
            // the tracker went dirty while we were pulling
            InteractionOutcome::Neutral
        }
    }
}

impl<C: fmt::Debug> fmt::Debug for ChainSynchronizer<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainSynchronizer")
            .field("local", &self.local)
            .field("compare_options", &self.compare_options)
            .field("blocks_from_options", &self.blocks_from_options)
            .field("unprocessed", &self.unprocessed)
            .finish_non_exhaustive()
    }
}

fn outcome_for(code: ChainComparisonCode) -> InteractionOutcome {
    match code {
        ChainComparisonCode::RemoteReportedEqualChainScore |
        ChainComparisonCode::RemoteReportedLowerChainScore => InteractionOutcome::Neutral,
        _ => InteractionOutcome::Failure,
    }
}

/// Releases the tracker's sync slot when the sync round settles, no matter
/// how: completion, failure or a dropped future all route through here.
struct PendingSyncSlot(UnprocessedElements);

impl Drop for PendingSyncSlot {
    fn drop(&mut self) {
        self.0.clear_pending_sync();
    }
}
