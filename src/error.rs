//! # Error Types for the Red-Black Tree
//!
//! This module defines the outcomes that tree and cursor operations report
//! instead of unwinding.
//!
//! ## Error Handling Strategy
//!
//! Every operation is a deterministic, synchronous pass over in-memory links,
//! so there is nothing to retry. Errors only tell the caller which branch was
//! taken:
//!
//! ```text
//! insert(id) ──► key already present? ──► Err(DuplicateKey)   tree untouched
//!      │
//!      ▼
//!   Ok(())
//!
//! erase(key) ──► key absent? ──────────► Err(NotFound)       tree untouched
//!      │
//!      ▼
//!   Ok(unlinked id)
//! ```
//!
//! A cursor that walks off either end simply yields `None`.
//!
//! [`Error::CapacityExceeded`] is different: it can only be produced when the
//! balance invariants were already broken (a valid red-black tree never gets
//! deep enough to overflow the cursor path). It is raised as a panic carrying
//! this error's message, the same way other structural invariant violations
//! are handled in this crate.

use thiserror::Error;

/// Errors reported by [`RawTree`](crate::RawTree) and
/// [`GenericTree`](crate::GenericTree) operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
	/// The key being inserted is already present.
	///
	/// Insertion is a no-op in this case: the existing node and the shape of
	/// the tree are left exactly as they were. Callers that treat duplicate
	/// inserts as acceptable can simply ignore this variant.
	#[error("key is already present in the tree")]
	DuplicateKey,

	/// No node with the requested key exists.
	///
	/// Returned by erase operations. The tree is not modified.
	#[error("key is not present in the tree")]
	NotFound,

	/// A cursor path would grow beyond its fixed capacity.
	///
	/// A red-black tree with `n` nodes is at most `2·log2(n+1)` deep, so this
	/// only happens if the tree's links or colors were corrupted.
	#[error("tree height exceeds the cursor path capacity of {limit}")]
	CapacityExceeded {
		/// The fixed path capacity that was exceeded.
		limit: usize,
	},
}

/// A Result type alias using our custom Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// A broken red-black invariant found by [`RawTree::validate`](crate::RawTree::validate).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
	/// The root node is red.
	#[error("root is red")]
	RedRoot,

	/// A red node has a red child.
	#[error("red node at index {parent} has a red child at index {child}")]
	RedRed {
		/// Index of the red parent.
		parent: usize,
		/// Index of its red child.
		child: usize,
	},

	/// Two paths below the same node cross a different number of black nodes.
	#[error("black height mismatch below index {node}: {left} on the left, {right} on the right")]
	BlackHeight {
		/// Index of the node whose subtrees disagree.
		node: usize,
		/// Black height of the smaller-key subtree.
		left: usize,
		/// Black height of the larger-key subtree.
		right: usize,
	},

	/// In-order keys are not strictly increasing.
	#[error("keys out of order at index {node}")]
	Order {
		/// Index of the first node whose key does not exceed its predecessor's.
		node: usize,
	},

	/// The tree is deeper than a cursor can follow.
	#[error("tree depth {depth} exceeds the path capacity of {limit}")]
	TooDeep {
		/// Depth that was reached.
		depth: usize,
		/// The fixed path capacity.
		limit: usize,
	},
}
