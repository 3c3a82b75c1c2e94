//! Decides the relationship between the local chain and a remote's.
//!
//! The comparison is score-first: only when the remote advertises a strictly
//! higher chain score are block hashes exchanged to locate the last common
//! block and the depth of the fork past it.

use basalt_interfaces::p2p::{chain::ChainClient, error::RequestResult};
use basalt_primitives::Height;
use futures_util::try_join;

/// Options for comparing two chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompareChainsOptions {
    /// The maximum number of block hashes analyzed when searching for the
    /// last common block.
    pub max_blocks_to_analyze: u64,
    /// The number of blocks the local chain is prepared to roll back.
    pub max_rollback_blocks: u64,
}

/// The relationship between the local chain and a remote's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainComparisonCode {
    /// The remote advertised the same chain score; there are no blocks worth
    /// pulling.
    RemoteReportedEqualChainScore,
    /// The remote advertised a lower chain score; it is behind.
    RemoteReportedLowerChainScore,
    /// The remote is ahead on a chain that shares a recent common block.
    RemoteIsNotSynced,
    /// The remote chain diverged deeper than the local rollback limit.
    RemoteIsForked,
    /// The remote advertised a higher score over a chain identical to the
    /// local one.
    RemoteLiedAboutChainScore,
    /// The remote returned more hashes than were requested.
    RemoteReturnedTooManyHashes,
}

/// The result of a chain comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompareChainsResult {
    /// The relationship between the two chains.
    pub code: ChainComparisonCode,
    /// The height of the highest block both chains share.
    ///
    /// Only meaningful when `code` is [`ChainComparisonCode::RemoteIsNotSynced`].
    pub common_block_height: Height,
    /// The number of blocks past the common height the local chain must be
    /// prepared to roll back.
    ///
    /// Only meaningful when `code` is [`ChainComparisonCode::RemoteIsNotSynced`].
    pub fork_depth: u64,
}

impl CompareChainsResult {
    pub(crate) fn from_code(code: ChainComparisonCode) -> Self {
        Self { code, common_block_height: 0, fork_depth: 0 }
    }
}

/// Compares the local chain against a remote's.
///
/// Network errors from either side propagate as `Err`; every protocol-level
/// outcome, including remote misbehavior, is reported through the result
/// code.
pub async fn compare_chains<L, R>(
    local: &L,
    remote: &R,
    options: CompareChainsOptions,
) -> RequestResult<CompareChainsResult>
where
    L: ChainClient + ?Sized,
    R: ChainClient + ?Sized,
{
    let (local_info, remote_info) = try_join!(local.chain_info(), remote.chain_info())?;

    if remote_info.score == local_info.score {
        return Ok(CompareChainsResult::from_code(
            ChainComparisonCode::RemoteReportedEqualChainScore,
        ))
    }

    if remote_info.score < local_info.score {
        return Ok(CompareChainsResult::from_code(
            ChainComparisonCode::RemoteReportedLowerChainScore,
        ))
    }

    compare_hashes(local, remote, local_info.height, options).await
}

/// Walks both hash chains over the rollback window to find the last common
/// block.
async fn compare_hashes<L, R>(
    local: &L,
    remote: &R,
    local_height: Height,
    options: CompareChainsOptions,
) -> RequestResult<CompareChainsResult>
where
    L: ChainClient + ?Sized,
    R: ChainClient + ?Sized,
{
    // The window covers the last max_rollback_blocks local blocks plus the
    // block right before them, the deepest candidate for the common block.
    let start_height = local_height.saturating_sub(options.max_rollback_blocks).max(1);
    let max_hashes = options.max_blocks_to_analyze;

    let (local_hashes, remote_hashes) = try_join!(
        local.hashes_from(start_height, max_hashes),
        remote.hashes_from(start_height, max_hashes)
    )?;

    if remote_hashes.len() as u64 > max_hashes {
        return Ok(CompareChainsResult::from_code(
            ChainComparisonCode::RemoteReturnedTooManyHashes,
        ))
    }

    let first_difference = local_hashes
        .iter()
        .zip(remote_hashes.iter())
        .take_while(|(local, remote)| local == remote)
        .count();

    if first_difference == 0 {
        return Ok(CompareChainsResult::from_code(ChainComparisonCode::RemoteIsForked))
    }

    if first_difference == local_hashes.len() && first_difference == remote_hashes.len() {
        return Ok(CompareChainsResult::from_code(ChainComparisonCode::RemoteLiedAboutChainScore))
    }

    Ok(CompareChainsResult {
        code: ChainComparisonCode::RemoteIsNotSynced,
        common_block_height: start_height + first_difference as u64 - 1,
        fork_depth: (local_hashes.len() - first_difference) as u64,
    })
}
