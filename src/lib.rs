//! # Segmented Deque
//!
//! A double-ended queue built from fixed-capacity ring-buffer blocks held in a growable
//! directory, in the spirit of C++'s `std::deque`.
//!
//! `VecDeque` keeps every element in one ring buffer and copies all of them when it grows.
//! [`SegmentedDeque`] grows one block at a time: a full boundary block gets a new neighbour,
//! and only the directory of block handles is ever resized.
//!
//! ## Key Features
//!
//! * **Amortized O(1) at both ends:** the directory is recentered on growth, so repeated
//!   `push_front` is as cheap as repeated `push_back`.
//! * **No element moves on growth:** elements stay in the block they were written to until popped.
//! * **Block recycling:** one emptied block is cached, so a deque oscillating across a block edge
//!   does not allocate on every push.
//! * **Fallible pushes:** [`SegmentedDeque::try_push_back`] and
//!   [`SegmentedDeque::try_push_front`] report allocation failure, hand the element back, and
//!   leave the deque untouched.
//! * **Interoperability:** [`AnyDeque`] abstracts over `VecDeque` and `SegmentedDeque`.
//!
//! ## Block Capacity
//!
//! The block capacity is fixed per instance and must be at least 2. One slot of every block is
//! kept vacant to tell "full" from "empty", so a block holds `block_capacity - 1` elements.
//!
//! ## Examples
//!
//! ```rust
//! use segmented_deque::SegmentedDeque;
//!
//! // 4 slots per block -> 3 elements per block.
//! let mut d = SegmentedDeque::with_block_capacity(4).unwrap();
//!
//! for i in 0..10 {
//!     d.push_back(i);
//! }
//! d.push_front(-1);
//!
//! assert_eq!(d.len(), 11);
//! assert_eq!(d.front(), Some(&-1));
//! assert_eq!(d.get(5), Some(&4));
//! assert!(d.block_count() > 1);
//!
//! assert_eq!(d.pop_front(), Some(-1));
//! assert_eq!(d.pop_back(), Some(9));
//! ```
//!
//! Tearing down with a cleanup hook:
//!
//! ```rust
//! use segmented_deque::SegmentedDeque;
//!
//! let d: SegmentedDeque<String> = ["x", "y"].iter().map(|s| s.to_string()).collect();
//! let mut released = 0;
//! d.destroy(|_| released += 1);
//! assert_eq!(released, 2);
//! ```

// --- Module Declarations ---

mod block;
pub mod deque;
pub mod error;
pub mod iter;

// --- Re-exports ---

pub use deque::{AnyDeque, Builder, SegmentedDeque, DEFAULT_BLOCK_CAPACITY};
pub use error::{Error, PushError};
pub use iter::{IntoIter, Iter};
