//! Test helpers for mocking out chain data.

pub mod generators;
