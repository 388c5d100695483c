//! # Chained Hash
//!
//! A Rust implementation of a separate-chaining hash table.
//!
//! This crate provides two collections over one shared engine:
//!
//! - `ChainedHashMap`: stores a value for every key
//! - `ChainedHashSet`: stores key presence only
//!
//! Both hash a key by folding its code units into a polynomial (`hash = 7 * hash + unit`,
//! reduced modulo the bucket count at each step) and keep colliding keys together in a chain
//! inside one bucket. When a new key would bring the number of stored keys up to
//! `floor(capacity * load_factor)`, the bucket count doubles and every entry is moved to its
//! bucket under the new capacity.
//!
//! ## Basic Usage
//!
//! ```rust
//! use chained_hash::ChainedHashMap;
//!
//! // Create a map with 8 buckets
//! let mut map = ChainedHashMap::with_capacity(8).unwrap();
//!
//! // Insert values
//! map.insert("apple".to_string(), 1);
//! map.insert("banana".to_string(), 2);
//!
//! // Retrieve values
//! assert_eq!(map.get("apple"), Some(&1));
//!
//! // Update values
//! map.insert("apple".to_string(), 10);
//! assert_eq!(map.get("apple"), Some(&10));
//! assert_eq!(map.len(), 2);
//!
//! // Remove values
//! assert!(map.remove("apple"));
//! assert_eq!(map.get("apple"), None);
//! ```
//!
//! ## Sets
//!
//! ```rust
//! use chained_hash::ChainedHashSet;
//!
//! let mut set = ChainedHashSet::with_capacity(16).unwrap();
//! set.insert("grape".to_string());
//! set.insert("grape".to_string());
//!
//! assert_eq!(set.len(), 1);
//! assert_eq!(set.get("grape").map(String::as_str), Some("grape"));
//! ```
//!
//! ## Growth
//!
//! ```rust
//! use chained_hash::ChainedHashMap;
//!
//! let mut map = ChainedHashMap::with_capacity(8).unwrap();
//! for word in ["apple", "banana", "carrot", "dog", "elephant", "frog"] {
//!     map.insert(word.to_string(), word.len());
//! }
//!
//! // the sixth key reached floor(8 * 0.75) and doubled the table
//! assert_eq!(map.capacity(), 16);
//! assert_eq!(map.stats().resizes, 1);
//! ```
//!
//! The collections are single-threaded. Wrap one in a `Mutex` or `RwLock` to share it.

/// Module implementing the key-value adapter
mod chained_map;
/// Module implementing the key-only adapter
mod chained_set;
/// Construction parameters and load-factor arithmetic
mod config;
/// Module implementing the chained storage, hashing and growth
mod engine;
/// Error kinds
mod error;
/// Key projection and the bucket hash
mod key;
/// Utility functions and traits for the chained collections
mod utils;

pub use chained_map::ChainedHashMap;
pub use chained_set::{ChainedHashSet, IntoIter as SetIntoIter, Iter as SetIter};
pub use config::{
    DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR, LoadFactor, MIN_LOAD_FACTOR, TableConfig,
};
pub use engine::{ChainStats, HashEngine, IntoIter, Iter};
pub use error::HashError;
pub use key::{CodeUnits, HASH_PRIME, HASH_SEED, polynomial_index};
pub use utils::{KeyedCollection, from_pairs};
