//! # ranktree
//!
//! An ordered map over composite `(primary, secondary)` keys, built as a
//! 2-3 tree with subtree-size augmentation.
//!
//! All entries sit in leaves at the same depth. Two permanent sentinel
//! leaves (`-inf` and `+inf`) bound the tree, and every leaf is threaded into
//! a doubly-linked sibling chain. Cached subtree sizes give O(log n) rank, so
//! counting the entries inside a key window costs two descents no matter how
//! many entries it holds.
//!
//! Nodes live in an arena and are addressed by generational [`NodeId`]
//! handles. Callers that need to re-key an entry delete it by handle and
//! insert a fresh leaf.
//!
//! ## Example
//!
//! ```rust
//! use ranktree::{Key, RankTree};
//!
//! let mut prices: RankTree<u32, &str, ()> = RankTree::new();
//! for (price, id) in [(40, "d"), (10, "a"), (30, "c"), (20, "b"), (5, "e")] {
//!     prices.insert_entry(price, id, ());
//! }
//!
//! let lo = Key::primary_only(10);
//! let hi = Key::primary_only(30);
//! assert_eq!(prices.range_count(&lo, &hi), 3);
//!
//! let ids: Vec<&str> = prices
//!     .range(&lo, &hi)
//!     .filter_map(|(key, _)| key.secondary().copied())
//!     .collect();
//! assert_eq!(ids, ["a", "b", "c"]);
//!
//! let leaf = prices.find(&Key::new(20, "b")).unwrap();
//! assert_eq!(prices.rank(leaf), Ok(3));
//! ```

#![forbid(unsafe_code)]

mod error;
mod key;
mod node;
mod range;
mod search;
mod tree;
mod update;

pub use error::TreeError;
pub use key::{Infinity, Key};
pub use node::NodeId;
pub use range::Iter;
pub use tree::RankTree;


#[cfg(test)]
mod proptests;
