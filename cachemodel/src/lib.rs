//! # CacheModel
//!
//! Cachemodel is a library for stepping through the behaviour of a single level cache
//!
//! It provides a cache which resolves addresses one at a time into hits and misses, for direct
//! mapped or fully associative placement with a choice of replacement policies, and a simulator
//! which walks a cache through a sequence of addresses collecting the results for display
//!
//! Everything is deterministic, including random replacement, which is driven by a seeded
//! generator

/// Contains the splitting of addresses into tag, index and offset fields
pub mod address;

/// Contains the cache model itself, and the records it produces for each access
pub mod cache;

/// Contains definitions for the JSON configuration format
pub mod config;

/// Contains the error type shared by the whole library
pub mod error;

/// Contains helpers for reading address traces from files
pub mod io;

/// Contains the store of resident lines shared by the cache and its replacement policies
pub mod lines;

/// Contains the provided replacement policies, with a trait implemented by each of them
pub mod replacement_policies;

/// Contains the simulator used to run a cache over a sequence of addresses
pub mod simulator;
#[cfg(test)]
mod test;

/// Contains utilities for parsing, generating and formatting addresses.
pub mod util;
