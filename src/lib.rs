#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod chain_table;

/// A hash map over the chained table.
///
/// This module provides a `HashMap` that wraps the `ChainTable` and routes
/// key hashing through a configurable hasher builder.
pub mod hash_map;

/// A hash set over the chained table.
///
/// This module provides a `HashSet` that wraps the `ChainTable` and provides
/// a standard set interface with configurable hashers.
pub mod hash_set;

mod prime;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used by `HashMap` and `HashSet` when no other
        /// is specified; backed by `foldhash`.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder used by `HashMap` and `HashSet` when no other
        /// is specified; the standard library's `RandomState`.
        pub type DefaultHashBuilder = std::collections::hash_map::RandomState;
    } else {
        /// Placeholder hasher builder; with neither the `std` nor the
        /// `foldhash` feature enabled there is no default hasher, and maps
        /// and sets must be built through `with_hasher`.
        pub enum DefaultHashBuilder {}
    }
}

pub use chain_table::ChainTable;
pub use hash_map::DuplicateKey;
pub use hash_map::Entry;
pub use hash_map::HashMap;
pub use hash_set::HashSet;
