//! Test helper impls.

use async_trait::async_trait;
use basalt_interfaces::{
    consumer::{BlockRangeConsumer, CompletionCallback, CompletionStatus, TransactionRangeConsumer},
    p2p::{
        chain::{BlocksFromOptions, ChainClient},
        error::{RequestError, RequestResult},
        transactions::TransactionsClient,
    },
};
use basalt_primitives::{
    BlockHash, BlockRange, ChainInfo, ElementId, Height, ShortHash, TransactionRange,
};
use parking_lot::Mutex;
use std::{
    collections::VecDeque,
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

/// A scripted chain client, usable as both the local chain view and a remote
/// peer.
pub(crate) struct TestChainClient {
    chain_info: Mutex<RequestResult<ChainInfo>>,
    hashes: Mutex<RequestResult<Vec<BlockHash>>>,
    blocks: Mutex<VecDeque<RequestResult<BlockRange>>>,
    transactions: Mutex<RequestResult<TransactionRange>>,
    on_blocks_request: Mutex<Option<Box<dyn Fn() + Send + Sync>>>,
    info_requests: AtomicU64,
    hashes_requests: AtomicU64,
    blocks_requests: AtomicU64,
    requested_hash_heights: Mutex<Vec<Height>>,
    requested_block_heights: Mutex<Vec<Height>>,
    known_short_hashes: Mutex<Vec<Vec<ShortHash>>>,
}

impl Default for TestChainClient {
    fn default() -> Self {
        Self {
            chain_info: Mutex::new(Ok(ChainInfo::default())),
            hashes: Mutex::new(Ok(Vec::new())),
            blocks: Mutex::new(VecDeque::new()),
            transactions: Mutex::new(Ok(TransactionRange::default())),
            on_blocks_request: Mutex::new(None),
            info_requests: AtomicU64::new(0),
            hashes_requests: AtomicU64::new(0),
            blocks_requests: AtomicU64::new(0),
            requested_hash_heights: Mutex::new(Vec::new()),
            requested_block_heights: Mutex::new(Vec::new()),
            known_short_hashes: Mutex::new(Vec::new()),
        }
    }
}

impl TestChainClient {
    pub(crate) fn with_chain_info(self, info: ChainInfo) -> Self {
        self.set_chain_info(info);
        self
    }

    pub(crate) fn with_chain_info_error(self, error: RequestError) -> Self {
        *self.chain_info.lock() = Err(error);
        self
    }

    pub(crate) fn with_hashes(self, hashes: Vec<BlockHash>) -> Self {
        self.set_hashes(hashes);
        self
    }

    pub(crate) fn with_unconfirmed_transactions(self, transactions: TransactionRange) -> Self {
        *self.transactions.lock() = Ok(transactions);
        self
    }

    pub(crate) fn with_unconfirmed_transactions_error(self, error: RequestError) -> Self {
        *self.transactions.lock() = Err(error);
        self
    }

    pub(crate) fn set_chain_info(&self, info: ChainInfo) -> &Self {
        *self.chain_info.lock() = Ok(info);
        self
    }

    pub(crate) fn set_hashes(&self, hashes: Vec<BlockHash>) -> &Self {
        *self.hashes.lock() = Ok(hashes);
        self
    }

    /// Queues a response for the next unanswered `blocks_from` request.
    /// With the queue exhausted, requests are answered with an empty range.
    pub(crate) fn push_blocks(&self, range: BlockRange) -> &Self {
        self.blocks.lock().push_back(Ok(range));
        self
    }

    pub(crate) fn push_blocks_error(&self, error: RequestError) -> &Self {
        self.blocks.lock().push_back(Err(error));
        self
    }

    /// Registers a hook fired on every `blocks_from` request, before the
    /// response is produced.
    pub(crate) fn set_on_blocks_request(&self, hook: Box<dyn Fn() + Send + Sync>) -> &Self {
        *self.on_blocks_request.lock() = Some(hook);
        self
    }

    pub(crate) fn info_requests(&self) -> u64 {
        self.info_requests.load(Ordering::SeqCst)
    }

    pub(crate) fn hashes_requests(&self) -> u64 {
        self.hashes_requests.load(Ordering::SeqCst)
    }

    pub(crate) fn blocks_requests(&self) -> u64 {
        self.blocks_requests.load(Ordering::SeqCst)
    }

    pub(crate) fn requested_hash_heights(&self) -> Vec<Height> {
        self.requested_hash_heights.lock().clone()
    }

    pub(crate) fn requested_block_heights(&self) -> Vec<Height> {
        self.requested_block_heights.lock().clone()
    }

    /// The `known` short hash snapshots received, one per request.
    pub(crate) fn known_short_hashes(&self) -> Vec<Vec<ShortHash>> {
        self.known_short_hashes.lock().clone()
    }
}

#[async_trait]
impl ChainClient for TestChainClient {
    async fn chain_info(&self) -> RequestResult<ChainInfo> {
        self.info_requests.fetch_add(1, Ordering::SeqCst);
        self.chain_info.lock().clone()
    }

    async fn hashes_from(&self, height: Height, _max_hashes: u64) -> RequestResult<Vec<BlockHash>> {
        self.hashes_requests.fetch_add(1, Ordering::SeqCst);
        self.requested_hash_heights.lock().push(height);
        self.hashes.lock().clone()
    }

    async fn blocks_from(
        &self,
        height: Height,
        _options: BlocksFromOptions,
    ) -> RequestResult<BlockRange> {
        self.blocks_requests.fetch_add(1, Ordering::SeqCst);
        self.requested_block_heights.lock().push(height);
        if let Some(hook) = &*self.on_blocks_request.lock() {
            hook();
        }
        self.blocks.lock().pop_front().unwrap_or_else(|| Ok(BlockRange::default()))
    }
}

#[async_trait]
impl TransactionsClient for TestChainClient {
    async fn unconfirmed_transactions(
        &self,
        known: Vec<ShortHash>,
    ) -> RequestResult<TransactionRange> {
        self.known_short_hashes.lock().push(known);
        self.transactions.lock().clone()
    }
}

impl fmt::Debug for TestChainClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestChainClient").finish_non_exhaustive()
    }
}

/// A block pipeline mock that records submitted ranges and lets tests drive
/// the completion callbacks by hand.
#[derive(Default)]
pub(crate) struct TestBlockRangeConsumer {
    next_id: AtomicU64,
    pending: Mutex<VecDeque<(ElementId, CompletionCallback)>>,
    ranges: Mutex<Vec<BlockRange>>,
}

impl TestBlockRangeConsumer {
    /// The number of elements accepted but not yet completed.
    pub(crate) fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// All ranges accepted so far, in submission order.
    pub(crate) fn enqueued(&self) -> Vec<BlockRange> {
        self.ranges.lock().clone()
    }

    /// Completes the oldest pending element.
    pub(crate) fn complete_next(&self, status: CompletionStatus) {
        let (id, callback) = self.pending.lock().pop_front().expect("no pending element");
        callback(id, status);
    }

    /// Completes the newest pending element, violating submission order when
    /// more than one is pending.
    pub(crate) fn complete_out_of_order(&self, status: CompletionStatus) {
        let (id, callback) = self.pending.lock().pop_back().expect("no pending element");
        callback(id, status);
    }
}

impl BlockRangeConsumer for TestBlockRangeConsumer {
    fn enqueue_blocks(&self, range: BlockRange, on_completion: CompletionCallback) -> ElementId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.ranges.lock().push(range);
        self.pending.lock().push_back((id, on_completion));
        id
    }
}

/// Records every transaction range handed to the pool.
#[derive(Default)]
pub(crate) struct TestTransactionRangeConsumer {
    consumed: Mutex<Vec<TransactionRange>>,
}

impl TestTransactionRangeConsumer {
    pub(crate) fn consumed(&self) -> Vec<TransactionRange> {
        self.consumed.lock().clone()
    }
}

impl TransactionRangeConsumer for TestTransactionRangeConsumer {
    fn consume_transactions(&self, range: TransactionRange) {
        self.consumed.lock().push(range);
    }
}
