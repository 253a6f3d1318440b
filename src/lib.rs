//! Red-black tree ordered map for Rust.
//!
//! This crate provides [`RBTreeMap`], an ordered map over a classic
//! red-black binary search tree with guaranteed O(log n) lookup, insertion,
//! and deletion:
//!
//! - [`insert`](RBTreeMap::insert) - Insert or overwrite an entry
//! - [`remove`](RBTreeMap::remove) - Remove an entry by key
//! - [`get`](RBTreeMap::get) - Look up a value by key
//! - [`iter`](RBTreeMap::iter) - Visit all entries in ascending key order
//! - [`root`](RBTreeMap::root) - Inspect the tree shape through read-only
//!   [`NodeRef`] cursors, e.g. for rendering the tree
//!
//! # Example
//!
//! ```
//! use rubra_tree::{Color, RBTreeMap};
//!
//! let mut scores = RBTreeMap::new();
//! scores.insert("Alice", 100);
//! scores.insert("Bob", 85);
//! scores.insert("Carol", 92);
//!
//! // Standard map operations work as expected
//! assert_eq!(scores.get(&"Bob"), Some(&85));
//! assert_eq!(scores.len(), 3);
//!
//! // Entries come back in ascending key order
//! let names: Vec<_> = scores.keys().copied().collect();
//! assert_eq!(names, ["Alice", "Bob", "Carol"]);
//!
//! // The tree structure is open for read-only inspection
//! let root = scores.root().unwrap();
//! assert_eq!(root.color(), Color::Black);
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library
//!   dependency
//! - **Familiar API** - Mirrors `std::collections::BTreeMap` where the two
//!   overlap
//! - **Arena-backed** - Nodes live in a slot arena and link by index, so the
//!   parent/child reference cycle involves no reference counting and no
//!   unsafe pointer graph
//! - **Inspectable** - Read-only node cursors expose key, value, color, and
//!   children without permitting mutation
//!
//! # Implementation
//!
//! The map is a red-black tree: every node is colored red or black, the root
//! is black, a red node never has a red child, and every path from a node
//! down to an absent child passes the same number of black nodes. Together
//! these bound the tree height at 2·log₂(n + 1), which bounds every
//! operation. After each structural change an iterative bottom-up fix-up
//! pass restores the color rules using only local recoloring and single
//! rotations.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod raw;

pub mod rbtree_map;

pub use raw::Color;
pub use rbtree_map::{NodeRef, RBTreeMap};
