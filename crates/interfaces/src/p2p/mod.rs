use crate::p2p::{chain::ChainClient, transactions::TransactionsClient};

/// Traits for fetching chain data from peers.
pub mod chain;

/// Error types shared by all peer requests.
pub mod error;

/// Traits for fetching unconfirmed transactions from peers.
pub mod transactions;

/// A full peer handle, able to answer both chain and transaction requests.
pub trait PeerClient: ChainClient + TransactionsClient {}

impl<T> PeerClient for T where T: ChainClient + TransactionsClient {}
