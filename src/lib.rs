//! This crate exposes an unbalanced Binary Search Tree (BST) whose nodes point back at their
//! parents, and an ordered map built on top of it.
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to
//! insert and find stored records. BSTs are typically defined
//! recursively using the notion of a `Node`. A `Node` will typically store
//! some sort of value (the value that was inserted, for example) and will
//! sometimes have child `Node`s. The most important invariants of a BST are:
//!
//! 1. For every `Node` in a BST, all the `Node`s in its left subtree have a
//!    value less than its own value.
//! 2. For every `Node` in a BST, all the `Node`s in its right subtree have a
//!    value greater than its own value.
//!
//! > Note that some `Node`s have no children. These `Node`s are called "leaf nodes".
//!
//! Searching for values in the tree takes `O(height)` (where `height` is the number of `Node`s
//! on the longest path from the root `Node` to a leaf `Node`). [`Tree`] does no rebalancing, so
//! inserting already-sorted values builds a tree as tall as it is big.
//!
//! ## Cursors
//!
//! Every `Node` also remembers its parent. That's enough to find the next value in order: it's
//! either the leftmost `Node` of the right subtree, or the first ancestor we reach by climbing
//! out of a left subtree. [`tree::Cursor`] uses this to walk the tree one value at a time without
//! keeping a stack.
//!
//! ## Map
//!
//! [`Map`] stores `(key, value)` pairs in a [`Tree`] ordered by key alone.
//!
//! ## Features
//!
//! - `serde`: serialisation of [`Tree`] and [`Map`] via the serde crate.

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

pub mod map;
pub mod tree;

#[cfg(feature = "serde")]
mod serialize;

pub use map::Map;
pub use tree::Tree;
