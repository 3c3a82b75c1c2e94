use crate::p2p::error::RequestResult;
use async_trait::async_trait;
use basalt_primitives::{ShortHash, TransactionRange};
use std::fmt::Debug;

/// A client able to exchange unconfirmed transactions with a peer.
#[async_trait]
#[auto_impl::auto_impl(&, Arc, Box)]
pub trait TransactionsClient: Send + Sync + Debug {
    /// Returns the peer's unconfirmed transactions that are not in `known`.
    ///
    /// `known` carries the short hashes of the transactions already resident
    /// in the local pool so that the peer only sends the missing ones.
    async fn unconfirmed_transactions(
        &self,
        known: Vec<ShortHash>,
    ) -> RequestResult<TransactionRange>;
}
