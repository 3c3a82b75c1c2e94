#![warn(missing_debug_implementations, missing_docs, unreachable_pub)]
#![deny(unused_must_use, rust_2018_idioms)]
#![doc(test(
    no_crate_inject,
    attr(deny(warnings, rust_2018_idioms), allow(dead_code, unused_variables))
))]

//! Commonly used types in basalt.
//!
//! This crate contains the chain primitives exchanged between the networking
//! layer, the synchronization engine and the block pipeline.

mod block;
mod chain;
mod transaction;

pub use block::{Block, BlockHeader, BlockRange};
pub use chain::ChainInfo;
pub use transaction::{Transaction, TransactionRange};

pub use alloy_primitives::{B256, Bytes, U256};

/// A block hash.
pub type BlockHash = B256;
/// A block position in the chain.
pub type Height = u64;
/// A transaction hash.
pub type TxHash = B256;
/// A compact transaction identifier derived from its hash.
pub type ShortHash = u32;
/// Identifier assigned by the block pipeline to a submitted range.
pub type ElementId = u64;
