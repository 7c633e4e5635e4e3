//! Ordered traversal without parent links.
//!
//! A [`Cursor`] remembers the ancestors of its current node in a bounded
//! stack. Seeding walks from the root to the smallest or largest node and
//! pushes every node it passes. Stepping either descends into the subtree on
//! the stepping side, pushing as it goes, or pops ancestors until it reaches
//! the first one the previous node was not reached from on that side.
//!
//! ```text
//!            4              first(): path [4, 2]      it = 1
//!          /   \            next():  pop 2            it = 2
//!         2     6           next():  push 2, descend  it = 3
//!        / \   / \          next():  pop 2, pop 4     it = 4
//!       1   3 5   7
//! ```
//!
//! The cursor holds a shared borrow of the node store for as long as it is
//! attached, so the tree it walks cannot be mutated underneath it.

use crate::error::Error;
use crate::{Direction, NodeId, NodeStore, RawTree, HEIGHT_LIMIT};
use log::error;
use smallvec::SmallVec;
use std::fmt;
use std::iter::FusedIterator;

/// A bidirectional position in a tree.
///
/// A cursor starts out detached. [`first`](Cursor::first) and
/// [`last`](Cursor::last) attach it to a tree and seed it at one end;
/// [`next`](Cursor::next) and [`prev`](Cursor::prev) move it one entry at a
/// time. Once it steps past either end it stays exhausted until it is
/// seeded again.
///
/// # Example
///
/// ```
/// use rbcursor::{Cursor, Tree};
///
/// let mut tree = Tree::new();
/// for k in [20, 10, 30] {
/// 	tree.insert(k, ()).unwrap();
/// }
///
/// let mut cursor = Cursor::new();
/// cursor.last(tree.raw(), tree.arena());
/// assert_eq!(cursor.entry(), Some((&30, &())));
///
/// cursor.prev();
/// assert_eq!(cursor.entry(), Some((&20, &())));
///
/// cursor.prev();
/// cursor.prev();
/// assert_eq!(cursor.entry(), None);
/// ```
pub struct Cursor<'t, S: NodeStore> {
	store: Option<&'t S>,
	it: Option<NodeId>,
	path: SmallVec<[NodeId; HEIGHT_LIMIT]>,
}

impl<'t, S: NodeStore> Default for Cursor<'t, S> {
	fn default() -> Self {
		Self::new()
	}
}

impl<'t, S: NodeStore> fmt::Debug for Cursor<'t, S> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_struct("Cursor")
			.field("attached", &self.store.is_some())
			.field("it", &self.it)
			.field("path", &self.path.as_slice())
			.finish()
	}
}

impl<'t, S: NodeStore> Cursor<'t, S> {
	/// Creates a detached cursor. No tree is read until it is seeded.
	pub fn new() -> Self {
		Cursor {
			store: None,
			it: None,
			path: SmallVec::new(),
		}
	}

	/// Attaches the cursor to `tree` and positions it on the smallest key.
	///
	/// Returns `None` if the tree is empty.
	pub fn first<C>(&mut self, tree: &RawTree<C>, store: &'t S) -> Option<NodeId> {
		self.seek_to_end(tree.root(), store, Direction::Reverse)
	}

	/// Attaches the cursor to `tree` and positions it on the largest key.
	///
	/// Returns `None` if the tree is empty.
	pub fn last<C>(&mut self, tree: &RawTree<C>, store: &'t S) -> Option<NodeId> {
		self.seek_to_end(tree.root(), store, Direction::Forward)
	}

	/// Moves to the next larger key.
	#[inline]
	#[allow(clippy::should_implement_trait)]
	pub fn next(&mut self) -> Option<NodeId> {
		self.step(Direction::Forward)
	}

	/// Moves to the next smaller key.
	#[inline]
	pub fn prev(&mut self) -> Option<NodeId> {
		self.step(Direction::Reverse)
	}

	/// Returns the current node, or `None` if the cursor is detached or
	/// exhausted.
	#[inline]
	pub fn current(&self) -> Option<NodeId> {
		self.it
	}

	/// Returns the key and value of the current node.
	pub fn entry(&self) -> Option<(&'t S::Key, &'t S::Value)> {
		let store = self.store?;
		let node = store.node(self.it?);
		Some((node.key(), node.value()))
	}

	/// Returns the number of ancestors currently recorded.
	#[inline]
	pub fn depth(&self) -> usize {
		self.path.len()
	}

	/// Releases the tree. The cursor can be seeded again afterwards.
	pub fn detach(&mut self) {
		self.store = None;
		self.it = None;
		self.path.clear();
	}

	/// Walks from `root` as far as possible toward `dir`, recording the path.
	fn seek_to_end(
		&mut self,
		root: Option<NodeId>,
		store: &'t S,
		dir: Direction,
	) -> Option<NodeId> {
		self.store = Some(store);
		self.path.clear();
		let it = root.map(|root| self.descend(store, root, dir));
		self.it = it;
		it
	}

	/// Moves one entry toward `dir`.
	///
	/// If the current node has a child on that side, the next entry is the
	/// extreme node of that subtree on the opposite side. Otherwise it is the
	/// nearest ancestor that the current node does not hang below on the `dir`
	/// side. Returns `None`, and stays exhausted, once there is no such entry.
	pub fn step(&mut self, dir: Direction) -> Option<NodeId> {
		let (store, it) = (self.store?, self.it?);

		let next = match store.node(it).child(dir) {
			Some(next) => {
				self.push(it);
				Some(self.descend(store, next, !dir))
			}
			None => {
				let mut last = it;
				loop {
					let Some(up) = self.path.pop() else {
						break None;
					};
					if store.node(up).child(dir) != Some(last) {
						break Some(up);
					}
					last = up;
				}
			}
		};
		self.it = next;
		next
	}

	/// Follows `dir` links from `from` to the end, pushing each node left behind.
	fn descend(&mut self, store: &'t S, from: NodeId, dir: Direction) -> NodeId {
		let mut it = from;
		while let Some(next) = store.node(it).child(dir) {
			self.push(it);
			it = next;
		}
		it
	}

	#[inline]
	fn push(&mut self, id: NodeId) {
		if self.path.len() == HEIGHT_LIMIT {
			let err = Error::CapacityExceeded {
				limit: HEIGHT_LIMIT,
			};
			error!("cursor path overflow at {id:?}: {err}");
			panic!("{err}");
		}
		self.path.push(id);
	}
}

/// An iterator over the entries of a tree in key order.
///
/// Created by [`GenericTree::iter`](crate::GenericTree::iter) and
/// [`GenericTree::rev_iter`](crate::GenericTree::rev_iter), or over any store
/// with [`Iter::ascending`] and [`Iter::descending`].
pub struct Iter<'t, S: NodeStore> {
	cursor: Cursor<'t, S>,
	dir: Direction,
}

impl<'t, S: NodeStore> Iter<'t, S> {
	pub(crate) fn new<C>(tree: &RawTree<C>, store: &'t S, dir: Direction) -> Self {
		let mut cursor = Cursor::new();
		cursor.seek_to_end(tree.root(), store, !dir);
		Iter {
			cursor,
			dir,
		}
	}

	/// Iterates `tree` from the smallest key up.
	pub fn ascending<C>(tree: &RawTree<C>, store: &'t S) -> Self {
		Self::new(tree, store, Direction::Forward)
	}

	/// Iterates `tree` from the largest key down.
	pub fn descending<C>(tree: &RawTree<C>, store: &'t S) -> Self {
		Self::new(tree, store, Direction::Reverse)
	}
}

impl<'t, S: NodeStore> Iterator for Iter<'t, S> {
	type Item = (&'t S::Key, &'t S::Value);

	fn next(&mut self) -> Option<Self::Item> {
		let entry = self.cursor.entry()?;
		self.cursor.step(self.dir);
		Some(entry)
	}
}

impl<'t, S: NodeStore> FusedIterator for Iter<'t, S> {}
