use crate::metrics::ChainSyncMetrics;
use basalt_interfaces::consumer::{BlockRangeConsumer, CompletionStatus};
use basalt_primitives::{BlockRange, ElementId, Height};
use parking_lot::Mutex;
use std::{collections::VecDeque, fmt, sync::Arc};

/// Bookkeeping for one block range resident in the pipeline.
#[derive(Debug, Clone, Copy)]
struct ElementInfo {
    id: ElementId,
    end_height: Height,
    num_bytes: u64,
}

#[derive(Debug, Default)]
struct TrackerState {
    num_bytes: u64,
    elements: VecDeque<ElementInfo>,
    has_pending_sync: bool,
    dirty: bool,
}

impl TrackerState {
    fn has_pending_operation(&self) -> bool {
        self.num_bytes != 0 || self.has_pending_sync
    }
}

/// Tracks the block ranges handed to the pipeline but not yet processed.
///
/// The tracker bounds the bytes in flight, admits at most one sync round at
/// a time and quarantines the flow after the pipeline aborts an element:
/// while *dirty*, no new range is accepted; the flag lifts on its own once
/// everything in flight has drained.
///
/// This is a cheaply cloneable handle. Completion callbacks hold a clone, so
/// the shared state stays alive for as long as the pipeline can still report
/// back, even after the synchronizer that created it is gone.
#[derive(Clone)]
pub(crate) struct UnprocessedElements {
    inner: Arc<UnprocessedElementsInner>,
}

struct UnprocessedElementsInner {
    consumer: Arc<dyn BlockRangeConsumer>,
    max_bytes: u64,
    metrics: ChainSyncMetrics,
    state: Mutex<TrackerState>,
}

impl UnprocessedElements {
    pub(crate) fn new(
        consumer: Arc<dyn BlockRangeConsumer>,
        max_bytes: u64,
        metrics: ChainSyncMetrics,
    ) -> Self {
        Self {
            inner: Arc::new(UnprocessedElementsInner {
                consumer,
                max_bytes,
                metrics,
                state: Mutex::new(TrackerState::default()),
            }),
        }
    }

    /// Returns `true` if no downloaded bytes are resident in the pipeline.
    pub(crate) fn is_empty(&self) -> bool {
        self.num_bytes() == 0
    }

    /// Bytes of downloaded blocks resident in the pipeline.
    pub(crate) fn num_bytes(&self) -> u64 {
        self.inner.state.lock().num_bytes
    }

    /// The end height of the most recently accepted range, or 0 if none is
    /// resident.
    pub(crate) fn max_height(&self) -> Height {
        self.inner.state.lock().elements.back().map_or(0, |info| info.end_height)
    }

    /// Attempts to claim the single sync slot.
    ///
    /// Succeeds only while the resident bytes are under the cap, no other
    /// sync is pending and the tracker is not dirty. A successful claim must
    /// be matched by [`clear_pending_sync`](Self::clear_pending_sync).
    pub(crate) fn should_start_sync(&self) -> bool {
        let mut state = self.inner.state.lock();
        if state.num_bytes >= self.inner.max_bytes || state.has_pending_sync || state.dirty {
            return false
        }

        state.has_pending_sync = true;
        true
    }

    /// Hands `range` to the pipeline and starts tracking it.
    ///
    /// Returns `false` without side effects if the tracker is dirty or the
    /// range is empty.
    pub(crate) fn add(&self, range: BlockRange) -> bool {
        let mut state = self.inner.state.lock();
        if state.dirty {
            return false
        }

        let Some(end_height) = range.last_height() else { return false };
        let num_bytes = range.total_size() as u64;

        // The callback keeps the tracker alive: the pipeline can finish
        // processing a range after the scheduler has stopped and the owning
        // synchronizer is destroyed.
        let this = self.clone();
        let id = self
            .inner
            .consumer
            .enqueue_blocks(range, Box::new(move |id, status| this.remove(id, status)));

        state.num_bytes += num_bytes;
        state.elements.push_back(ElementInfo { id, end_height, num_bytes });
        self.inner.metrics.unprocessed_bytes.set(state.num_bytes as f64);
        self.inner.metrics.unprocessed_elements.set(state.elements.len() as f64);
        true
    }

    /// Invoked by the pipeline when it finishes processing an element.
    ///
    /// # Panics
    ///
    /// Elements complete strictly in submission order; a completion for any
    /// id other than the front of the queue means the pipeline state is
    /// corrupted and there is nothing sane left to do.
    fn remove(&self, id: ElementId, status: CompletionStatus) {
        let mut state = self.inner.state.lock();
        let info = match state.elements.pop_front() {
            Some(info) if info.id == id => info,
            other => panic!("unexpected element id {id}, front of queue is {other:?}"),
        };

        state.num_bytes -= info.num_bytes;
        if !state.has_pending_operation() {
            // everything drained, the quarantine lifts
            state.dirty = false;
        } else if status != CompletionStatus::Normal {
            state.dirty = true;
        }
        self.inner.metrics.unprocessed_bytes.set(state.num_bytes as f64);
        self.inner.metrics.unprocessed_elements.set(state.elements.len() as f64);
    }

    /// Releases the sync slot claimed by [`should_start_sync`](Self::should_start_sync).
    pub(crate) fn clear_pending_sync(&self) {
        let mut state = self.inner.state.lock();
        state.has_pending_sync = false;

        if state.dirty {
            state.dirty = state.has_pending_operation();
        }
    }
}

impl fmt::Debug for UnprocessedElements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("UnprocessedElements")
            .field("num_bytes", &state.num_bytes)
            .field("max_bytes", &self.inner.max_bytes)
            .field("num_elements", &state.elements.len())
            .field("has_pending_sync", &state.has_pending_sync)
            .field("dirty", &state.dirty)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestBlockRangeConsumer;
    use basalt_interfaces::test_utils::generators::{random_block_range, rng};
    use basalt_primitives::BlockHash;

    fn tracker(max_bytes: u64) -> (UnprocessedElements, Arc<TestBlockRangeConsumer>) {
        let consumer = Arc::new(TestBlockRangeConsumer::default());
        let tracker =
            UnprocessedElements::new(consumer.clone(), max_bytes, ChainSyncMetrics::default());
        (tracker, consumer)
    }

    fn range(heights: std::ops::RangeInclusive<u64>) -> BlockRange {
        random_block_range(&mut rng(), heights, BlockHash::ZERO, 0..2)
    }

    #[test]
    fn add_tracks_bytes_and_heights() {
        let (tracker, consumer) = tracker(u64::MAX);
        let first = range(1..=10);
        let first_size = first.total_size() as u64;

        assert!(tracker.add(first));
        assert!(tracker.add(range(11..=20)));

        assert!(!tracker.is_empty());
        assert!(tracker.num_bytes() >= first_size);
        assert_eq!(tracker.max_height(), 20);
        assert_eq!(consumer.pending_count(), 2);

        consumer.complete_next(CompletionStatus::Normal);
        assert_eq!(tracker.max_height(), 20);
        consumer.complete_next(CompletionStatus::Normal);
        assert!(tracker.is_empty());
        assert_eq!(tracker.max_height(), 0);
    }

    #[test]
    fn empty_range_is_rejected() {
        let (tracker, consumer) = tracker(u64::MAX);
        assert!(!tracker.add(BlockRange::default()));
        assert_eq!(consumer.pending_count(), 0);
    }

    #[test]
    fn sync_slot_is_claimed_at_most_once() {
        let (tracker, _consumer) = tracker(u64::MAX);
        assert!(tracker.should_start_sync());
        assert!(!tracker.should_start_sync());

        tracker.clear_pending_sync();
        assert!(tracker.should_start_sync());
    }

    #[test]
    fn sync_slot_is_refused_at_byte_cap() {
        let (tracker, _consumer) = tracker(1);
        assert!(tracker.add(range(1..=5)));
        assert!(!tracker.should_start_sync());
    }

    #[test]
    #[should_panic(expected = "unexpected element id")]
    fn out_of_order_completion_panics() {
        let (tracker, consumer) = tracker(u64::MAX);
        assert!(tracker.add(range(1..=5)));
        assert!(tracker.add(range(6..=10)));
        consumer.complete_out_of_order(CompletionStatus::Normal);
    }

    #[test]
    fn abort_with_outstanding_work_quarantines() {
        let (tracker, consumer) = tracker(u64::MAX);
        assert!(tracker.add(range(1..=5)));
        assert!(tracker.add(range(6..=10)));

        consumer.complete_next(CompletionStatus::Aborted);

        // quarantined: nothing new is accepted, the sync slot stays shut
        assert!(!tracker.add(range(11..=15)));
        assert!(!tracker.should_start_sync());

        // draining the last element lifts the quarantine
        consumer.complete_next(CompletionStatus::Normal);
        assert!(tracker.add(range(11..=15)));
    }

    #[test]
    fn abort_of_last_element_without_pending_sync_stays_clean() {
        let (tracker, consumer) = tracker(u64::MAX);
        assert!(tracker.add(range(1..=5)));

        consumer.complete_next(CompletionStatus::Aborted);

        assert!(tracker.is_empty());
        assert!(tracker.should_start_sync());
    }

    #[test]
    fn abort_during_pending_sync_clears_on_drained_slot_release() {
        let (tracker, consumer) = tracker(u64::MAX);
        assert!(tracker.should_start_sync());
        assert!(tracker.add(range(1..=5)));

        // aborted while the sync is still pending
        consumer.complete_next(CompletionStatus::Aborted);
        assert!(!tracker.add(range(6..=10)));

        // the queue is already drained, so releasing the slot lifts the
        // quarantine
        tracker.clear_pending_sync();
        assert!(tracker.should_start_sync());
    }

    #[test]
    fn quarantine_survives_slot_release_until_drained() {
        let (tracker, consumer) = tracker(u64::MAX);
        assert!(tracker.should_start_sync());
        assert!(tracker.add(range(1..=5)));
        assert!(tracker.add(range(6..=10)));

        consumer.complete_next(CompletionStatus::Aborted);
        tracker.clear_pending_sync();

        // one element still resident: dirty holds
        assert!(!tracker.should_start_sync());
        assert!(!tracker.add(range(11..=15)));

        consumer.complete_next(CompletionStatus::Normal);
        assert!(tracker.should_start_sync());
    }

    #[test]
    fn quiescent_tracker_is_fully_reset() {
        let (tracker, consumer) = tracker(u64::MAX);
        assert!(tracker.should_start_sync());
        assert!(tracker.add(range(1..=5)));
        assert!(tracker.add(range(6..=10)));
        consumer.complete_next(CompletionStatus::Aborted);
        tracker.clear_pending_sync();
        consumer.complete_next(CompletionStatus::Aborted);

        assert!(tracker.is_empty());
        assert_eq!(tracker.num_bytes(), 0);
        assert_eq!(tracker.max_height(), 0);
        assert!(tracker.should_start_sync());
    }

    #[test]
    fn callbacks_outlive_the_creating_handle() {
        let (tracker, consumer) = tracker(u64::MAX);
        assert!(tracker.add(range(1..=5)));
        drop(tracker);

        // the pipeline can still complete the element
        consumer.complete_next(CompletionStatus::Normal);
        assert_eq!(consumer.pending_count(), 0);
    }
}
