#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

cfg_if::cfg_if! {
    if #[cfg(feature = "log")] {
        macro_rules! trace {
            ($($arg:tt)+) => {
                log::trace!(target: "probe_hash", $($arg)+)
            };
        }
    } else {
        macro_rules! trace {
            ($($arg:tt)+) => {
                if false {
                    let _ = format_args!($($arg)+);
                }
            };
        }
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used by [`HashMap`] and [`HashSet`] when none is
        /// given explicitly.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder used by [`HashMap`] and [`HashSet`] when none is
        /// given explicitly.
        pub type DefaultHashBuilder = std::hash::RandomState;
    } else {
        /// Placeholder used when neither `foldhash` nor `std` is enabled. It
        /// cannot be constructed, so a hasher must be supplied explicitly.
        pub enum DefaultHashBuilder {}
    }
}

/// Memory allocation interface used by the tables.
pub mod allocator;

mod cell;

/// Hashing and equality strategies.
///
/// Tables are generic over a [`KeyHasher`](hasher::KeyHasher) and a
/// [`KeyComparator`](hasher::KeyComparator) so that lookups can use a
/// different (borrowed) type than the stored one.
pub mod hasher;

pub mod hash_table;

/// A hash set built directly on the open-addressing [`HashTable`].
///
/// This is the engine the map is layered on: it binds the raw table to a
/// hashing strategy and an equality strategy.
pub mod hash_set;

/// A key/value map stored as a [`HashSet`] of key/value slots.
///
/// Hashing and equality of a slot only look at the key.
pub mod hash_map;

pub use allocator::Allocator;
pub use allocator::Global;
pub use hash_map::Entry;
pub use hash_map::HashMap;
pub use hash_set::HashSet;
pub use hash_table::HashTable;
pub use hasher::DefaultKeyComparator;
pub use hasher::KeyComparator;
pub use hasher::KeyHasher;
