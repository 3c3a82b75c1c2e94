use basalt_primitives::{BlockRange, ElementId, ShortHash, TransactionRange};
use std::sync::atomic::{AtomicU64, Ordering};

/// How the processing of an element finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionStatus {
    /// The element was fully processed.
    Normal,
    /// Processing of the element was aborted.
    Aborted,
}

/// Callback invoked by the block pipeline when it finishes processing an
/// element. Fires exactly once per accepted range.
pub type CompletionCallback = Box<dyn FnOnce(ElementId, CompletionStatus) + Send>;

/// Accepts block ranges for asynchronous processing.
///
/// Contract for implementors:
/// - every accepted range is assigned a unique, monotonically increasing id;
/// - the completion callback fires exactly once per accepted range, possibly
///   after the submitting component has been torn down;
/// - the callback is never invoked from within [`enqueue_blocks`] itself.
///
/// [`enqueue_blocks`]: BlockRangeConsumer::enqueue_blocks
pub trait BlockRangeConsumer: Send + Sync {
    /// Hands a block range to the pipeline.
    ///
    /// Returns the id under which the completion callback will report back.
    fn enqueue_blocks(&self, range: BlockRange, on_completion: CompletionCallback) -> ElementId;
}

/// Accepts unconfirmed transaction ranges, fire-and-forget.
pub trait TransactionRangeConsumer: Send + Sync {
    /// Hands a transaction range to the pool.
    fn consume_transactions(&self, range: TransactionRange);
}

impl<F> TransactionRangeConsumer for F
where
    F: Fn(TransactionRange) + Send + Sync,
{
    fn consume_transactions(&self, range: TransactionRange) {
        self(range)
    }
}

/// A [`BlockRangeConsumer`] implementation that discards every range.
///
/// Ranges are accepted and assigned sequential ids, but their completion
/// callbacks never fire.
#[derive(Debug, Default)]
pub struct NoopBlockRangeConsumer {
    next_id: AtomicU64,
}

impl BlockRangeConsumer for NoopBlockRangeConsumer {
    fn enqueue_blocks(&self, _: BlockRange, _: CompletionCallback) -> ElementId {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// A [`TransactionRangeConsumer`] implementation that drops every range.
#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub struct NoopTransactionRangeConsumer;

impl TransactionRangeConsumer for NoopTransactionRangeConsumer {
    fn consume_transactions(&self, _: TransactionRange) {}
}

/// A cheap, synchronous snapshot of the short hashes of the transactions
/// resident in the local unconfirmed pool.
pub trait ShortHashesProvider: Send + Sync {
    /// Returns the current snapshot.
    fn short_hashes(&self) -> Vec<ShortHash>;
}

impl<F> ShortHashesProvider for F
where
    F: Fn() -> Vec<ShortHash> + Send + Sync,
{
    fn short_hashes(&self) -> Vec<ShortHash> {
        self()
    }
}
