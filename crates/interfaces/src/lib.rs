#![warn(missing_docs, unreachable_pub)]
#![deny(unused_must_use, rust_2018_idioms)]
#![doc(test(
    no_crate_inject,
    attr(deny(warnings, rust_2018_idioms), allow(dead_code, unused_variables))
))]

//! Basalt interface bindings.
//!
//! Traits at the seams between the synchronization engine, the networking
//! layer and the block pipeline.

/// Consumer traits for handing downloaded data to the processing pipeline.
pub mod consumer;

/// P2P traits.
pub mod p2p;

/// Sync outcome types.
pub mod sync;

/// Common test helpers for mocking out chain data.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
