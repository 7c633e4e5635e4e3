//! # rbcursor: A Top-Down Red-Black Tree with Parent-less Cursors
//!
//! This crate provides a red-black tree whose nodes live in storage owned by
//! the caller, together with a bidirectional cursor that walks the tree in
//! key order without any parent links in the nodes.
//!
//! ## Design Overview
//!
//! **Caller-owned nodes**: The engine ([`RawTree`]) holds nothing but a root
//! index and an ordering policy. Nodes are stored wherever the caller likes,
//! as long as the storage implements [`NodeStore`]. The engine rewires child
//! links and colors, and it never allocates or frees a node.
//!
//! **Single top-down passes**: Both insertion and erasure fix the red-black
//! invariants on the way down, in one loop, with no recursion and no parent
//! pointers. Insertion flips colors ahead of time and rotates away red-red
//! conflicts. Erasure pushes a red node down the search path so that the node
//! finally unlinked is red and its removal cannot change any black height.
//! Rotations that would replace the root go through a sentinel slot above it.
//!
//! **Cursors**: A [`Cursor`] records the ancestors it walked through in a
//! bounded stack ([`HEIGHT_LIMIT`] entries, kept inline) and pops them to
//! climb back up. The cursor borrows the node store, so the tree cannot be
//! mutated while a cursor is attached to it.
//!
//! ### Tree Structure
//!
//! ```text
//!     sentinel (None)            <- stands in for "the slot holding the root"
//!          │ Forward
//!          ▼
//!     ┌─────────┐
//!     │ 10  B   │                <- root, always black
//!     └────┬────┘
//!    Reverse│Forward
//!     ┌────┴─────┐
//!     ▼          ▼
//!   ┌─────┐   ┌─────┐
//!   │ 5 B │   │ 20 B│
//!   └──┬──┘   └──┬──┘
//!      ▼         ▼
//!   ┌─────┐   ┌─────┐
//!   │ 3 R │   │ 15 R│
//!   └─────┘   └─────┘
//! ```
//!
//! ## Basic Usage
//!
//! The owning [`Tree`] bundles an engine with an [`Arena`]:
//!
//! ```
//! use rbcursor::Tree;
//!
//! let mut tree = Tree::new();
//! tree.insert(10, "ten").unwrap();
//! tree.insert(5, "five").unwrap();
//! tree.insert(20, "twenty").unwrap();
//!
//! assert_eq!(tree.get(&5), Some(&"five"));
//! assert!(tree.insert(5, "again").is_err());
//!
//! let keys: Vec<i32> = tree.iter().map(|(k, _)| *k).collect();
//! assert_eq!(keys, vec![5, 10, 20]);
//!
//! assert_eq!(tree.remove(&10), Ok("ten"));
//! ```
//!
//! The engine can also run directly over caller records:
//!
//! ```
//! use rbcursor::{Cursor, Natural, Node, RawTree};
//!
//! let mut nodes: Vec<Node<u32, ()>> = [3, 1, 2].into_iter().map(|k| Node::new(k, ())).collect();
//! let mut tree = RawTree::new(Natural);
//! for i in 0..nodes.len() {
//! 	tree.insert(&mut nodes, i.into()).unwrap();
//! }
//!
//! let mut cursor = Cursor::new();
//! let mut it = cursor.first(&tree, &nodes);
//! let mut keys = Vec::new();
//! while let Some(id) = it {
//! 	keys.push(*nodes[id.index()].key());
//! 	it = cursor.next();
//! }
//! assert_eq!(keys, vec![1, 2, 3]);
//! ```
//!
//! ## Thread Safety
//!
//! Mutation is single-threaded: `insert` and `erase` take the store by
//! `&mut`, so the borrow checker rules out concurrent writers and stale
//! cursors. Searches only need `&`.

use log::{debug, trace};

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::mem;
use std::ops::Not;

pub mod alloc;
pub mod arena;
pub mod compare;
pub mod cursor;
pub mod error;

#[cfg(test)]
mod util;

pub use arena::Arena;
pub use compare::{Compare, Natural, Reversed};
pub use cursor::{Cursor, Iter};
pub use error::{Error, Result, Violation};

// ---------------------------------------------------------------------------
// Configuration Constants
// ---------------------------------------------------------------------------

/// Capacity of a cursor's ancestor stack.
///
/// A red-black tree holding `n` nodes is at most `2·log2(n+1)` levels deep,
/// so 64 entries cover any tree that fits in memory.
pub const HEIGHT_LIMIT: usize = 64;

// ---------------------------------------------------------------------------
// Node Types
// ---------------------------------------------------------------------------

/// Names a node inside a [`NodeStore`].
///
/// For the stores shipped with this crate the id is the position of the node
/// in the backing vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
	/// Creates an id for the node stored at `index`.
	#[inline]
	pub const fn new(index: usize) -> Self {
		NodeId(index)
	}

	/// Returns the position this id refers to.
	#[inline]
	pub const fn index(self) -> usize {
		self.0
	}
}

impl From<usize> for NodeId {
	fn from(index: usize) -> Self {
		NodeId(index)
	}
}

/// The color tag of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
	/// A red node never has a red child.
	Red,
	/// Black nodes are what black height counts.
	Black,
}

/// Direction for tree traversal operations, doubling as the child index.
///
/// Used when descending to a child, when seeding a cursor at the first or
/// last node, and when stepping a cursor.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Direction {
	/// Traverse toward lower keys (child 0, left in the tree).
	Reverse = 0,
	/// Traverse toward higher keys (child 1, right in the tree).
	Forward = 1,
}

impl Direction {
	#[inline]
	const fn index(self) -> usize {
		self as usize
	}

	/// The child a search for a key ordered `ord` against the current node
	/// continues into. Equal keys continue toward the successor.
	#[inline]
	fn toward(ord: Ordering) -> Direction {
		match ord {
			Ordering::Less => Direction::Reverse,
			Ordering::Equal | Ordering::Greater => Direction::Forward,
		}
	}
}

impl Not for Direction {
	type Output = Direction;

	#[inline]
	fn not(self) -> Direction {
		match self {
			Direction::Reverse => Direction::Forward,
			Direction::Forward => Direction::Reverse,
		}
	}
}

/// A tree node: color, two child links and an entry.
///
/// Nodes are created by the caller and placed in a [`NodeStore`]. Once
/// inserted, the tree owns the color and links; the entry is only ever moved
/// by [`RawTree::erase`], which may swap it with another node's entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<K, V> {
	color: Color,
	link: [Option<NodeId>; 2],
	key: K,
	value: V,
}

impl<K, V> Node<K, V> {
	/// Creates a detached red node.
	pub fn new(key: K, value: V) -> Self {
		Node {
			color: Color::Red,
			link: [None, None],
			key,
			value,
		}
	}

	/// Returns the key.
	#[inline]
	pub fn key(&self) -> &K {
		&self.key
	}

	/// Returns the value.
	#[inline]
	pub fn value(&self) -> &V {
		&self.value
	}

	/// Returns the value mutably. The key stays fixed so ordering is unaffected.
	#[inline]
	pub fn value_mut(&mut self) -> &mut V {
		&mut self.value
	}

	/// Returns the node's color.
	#[inline]
	pub fn color(&self) -> Color {
		self.color
	}

	/// Returns the child in `dir`, if any.
	#[inline]
	pub fn child(&self, dir: Direction) -> Option<NodeId> {
		self.link[dir.index()]
	}

	/// Consumes the node, returning its entry.
	pub fn into_entry(self) -> (K, V) {
		(self.key, self.value)
	}

	#[inline]
	fn set_child(&mut self, dir: Direction, child: Option<NodeId>) {
		self.link[dir.index()] = child;
	}

	/// Makes the node a fresh red leaf.
	#[inline]
	fn reset(&mut self) {
		self.color = Color::Red;
		self.link = [None, None];
	}

	/// Exchanges entries with `other`, leaving colors and links in place.
	///
	/// This is the building block for [`NodeStore::swap_entries`].
	#[inline]
	pub fn swap_entry(&mut self, other: &mut Self) {
		mem::swap(&mut self.key, &mut other.key);
		mem::swap(&mut self.value, &mut other.value);
	}
}

/// Storage that maps [`NodeId`]s to nodes.
///
/// The tree reads and rewrites nodes only through this trait, so nodes may be
/// embedded in any caller structure that can hand out a node by id.
/// Implementations panic when given an id that does not name a live node,
/// the same way slice indexing does.
pub trait NodeStore {
	/// Key type of the stored nodes.
	type Key;
	/// Value type of the stored nodes.
	type Value;

	/// Returns the node named by `id`.
	fn node(&self, id: NodeId) -> &Node<Self::Key, Self::Value>;

	/// Returns the node named by `id` mutably.
	fn node_mut(&mut self, id: NodeId) -> &mut Node<Self::Key, Self::Value>;

	/// Exchanges the entries (key and value) of two distinct nodes.
	fn swap_entries(&mut self, a: NodeId, b: NodeId);
}

// ---------------------------------------------------------------------------
// Color and Rotation Helpers
// ---------------------------------------------------------------------------

/// Absent children count as black.
#[inline]
fn is_red<S: NodeStore>(store: &S, id: Option<NodeId>) -> bool {
	id.is_some_and(|id| store.node(id).color == Color::Red)
}

#[inline]
fn child<S: NodeStore>(store: &S, id: NodeId, dir: Direction) -> Option<NodeId> {
	store.node(id).child(dir)
}

#[inline]
fn paint<S: NodeStore>(store: &mut S, id: NodeId, color: Color) {
	store.node_mut(id).color = color;
}

/// Paints `id` with `color` and both of its children with the other color.
fn flip<S: NodeStore>(store: &mut S, id: NodeId, color: Color) {
	let other = match color {
		Color::Red => Color::Black,
		Color::Black => Color::Red,
	};
	paint(store, id, color);
	for dir in [Direction::Reverse, Direction::Forward] {
		if let Some(kid) = child(store, id, dir) {
			paint(store, kid, other);
		}
	}
}

/// Single rotation of the subtree at `root` toward `dir`.
///
/// The child opposite `dir` becomes the new subtree root and is painted black;
/// the old root is painted red. Returns the new subtree root.
fn single<S: NodeStore>(store: &mut S, root: NodeId, dir: Direction) -> NodeId {
	let save = child(store, root, !dir).expect("rotation pivot must exist");
	let inner = child(store, save, dir);

	let old = store.node_mut(root);
	old.set_child(!dir, inner);
	old.color = Color::Red;

	let new = store.node_mut(save);
	new.set_child(dir, Some(root));
	new.color = Color::Black;

	save
}

/// Double rotation: rotate the child opposite `dir` away from `dir`, then
/// rotate `root` toward `dir`. Returns the new subtree root.
fn double<S: NodeStore>(store: &mut S, root: NodeId, dir: Direction) -> NodeId {
	let pivot = child(store, root, !dir).expect("rotation pivot must exist");
	let lifted = single(store, pivot, !dir);
	store.node_mut(root).set_child(!dir, Some(lifted));
	single(store, root, dir)
}

// ---------------------------------------------------------------------------
// Core Engine
// ---------------------------------------------------------------------------

/// The red-black engine: a root reference plus an ordering policy.
///
/// Every operation takes the [`NodeStore`] that holds the nodes. A tree must
/// always be used with the same store and the same policy.
///
/// # Invariants
///
/// After every completed insert or erase:
/// 1. The root, if present, is black.
/// 2. No red node has a red child.
/// 3. Every path from the root to an absent child crosses the same number of
///    black nodes.
/// 4. In-order keys are strictly increasing.
#[derive(Debug, Clone, Default)]
pub struct RawTree<C = Natural> {
	root: Option<NodeId>,
	cmp: C,
}

impl<C> RawTree<C> {
	/// Creates an empty tree ordered by `cmp`.
	pub const fn new(cmp: C) -> Self {
		RawTree {
			root: None,
			cmp,
		}
	}

	/// Returns the root node, if any.
	#[inline]
	pub fn root(&self) -> Option<NodeId> {
		self.root
	}

	/// Returns `true` if the tree has no nodes.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.root.is_none()
	}

	/// Returns the ordering policy.
	pub fn comparator(&self) -> &C {
		&self.cmp
	}

	/// Forgets every node. The nodes themselves stay in the caller's store.
	pub fn clear(&mut self) {
		self.root = None;
	}

	/// Reads the link in `dir` of `parent`, where `None` is the sentinel above
	/// the root whose only child (in the forward slot) is the root.
	#[inline]
	fn slot<S: NodeStore>(
		&self,
		store: &S,
		parent: Option<NodeId>,
		dir: Direction,
	) -> Option<NodeId> {
		match parent {
			Some(id) => child(store, id, dir),
			None => match dir {
				Direction::Forward => self.root,
				Direction::Reverse => None,
			},
		}
	}

	/// Writes the link in `dir` of `parent`; `None` writes the root.
	#[inline]
	fn set_slot<S: NodeStore>(
		&mut self,
		store: &mut S,
		parent: Option<NodeId>,
		dir: Direction,
		node: Option<NodeId>,
	) {
		match parent {
			Some(id) => store.node_mut(id).set_child(dir, node),
			None => {
				debug_assert_eq!(dir, Direction::Forward, "the sentinel only links forward");
				self.root = node;
			}
		}
	}

	/// The side of `parent` that links to `node`.
	#[inline]
	fn side_of<S: NodeStore>(&self, store: &S, parent: Option<NodeId>, node: NodeId) -> Direction {
		if self.slot(store, parent, Direction::Forward) == Some(node) {
			Direction::Forward
		} else {
			Direction::Reverse
		}
	}

	/// Returns the number of nodes on the longest root-to-node path.
	///
	/// Heights are counted in nodes: an empty tree has height 0 and a lone
	/// root height 1. The longest path measured in links is one less.
	pub fn height<S: NodeStore>(&self, store: &S) -> usize {
		let mut deepest = 0;
		let mut stack: Vec<(NodeId, usize)> = self.root.map(|root| (root, 1)).into_iter().collect();

		while let Some((id, depth)) = stack.pop() {
			deepest = deepest.max(depth);
			for dir in [Direction::Reverse, Direction::Forward] {
				if let Some(kid) = child(store, id, dir) {
					stack.push((kid, depth + 1));
				}
			}
		}
		deepest
	}

	/// Returns the number of nodes in the tree.
	///
	/// **Note**: This is an O(n) walk over the tree.
	pub fn len<S: NodeStore>(&self, store: &S) -> usize {
		let mut count = 0;
		let mut stack: Vec<NodeId> = self.root.into_iter().collect();

		while let Some(id) = stack.pop() {
			count += 1;
			stack.extend(child(store, id, Direction::Reverse));
			stack.extend(child(store, id, Direction::Forward));
		}
		count
	}
}

impl<C> RawTree<C> {
	/// Finds the node whose key compares equal to `key`.
	///
	/// # Example
	///
	/// ```
	/// use rbcursor::{Natural, Node, NodeId, RawTree};
	///
	/// let mut nodes = vec![Node::new(7, "seven")];
	/// let mut tree = RawTree::new(Natural);
	/// tree.insert(&mut nodes, NodeId::new(0)).unwrap();
	///
	/// assert_eq!(tree.search(&nodes, &7), Some(NodeId::new(0)));
	/// assert_eq!(tree.search(&nodes, &8), None);
	/// ```
	///
	/// The key may be any borrowed form of the stored key type, as long as
	/// the ordering policy compares that form consistently.
	pub fn search<S, Q>(&self, store: &S, key: &Q) -> Option<NodeId>
	where
		S: NodeStore,
		S::Key: Borrow<Q>,
		Q: ?Sized,
		C: Compare<Q>,
	{
		let mut it = self.root;

		while let Some(id) = it {
			let node = store.node(id);
			it = match self.cmp.compare(key, node.key.borrow()) {
				Ordering::Equal => return Some(id),
				Ordering::Less => node.child(Direction::Reverse),
				Ordering::Greater => node.child(Direction::Forward),
			};
		}
		None
	}

	/// Links the node `id` into the tree.
	///
	/// The node's previous color and links are discarded. If its key is
	/// already present, nothing changes and [`Error::DuplicateKey`] is
	/// returned; the caller still owns `id` and may reuse it.
	///
	/// # Algorithm
	///
	/// A single pass from the root with a window of great-grandparent,
	/// grandparent, parent and current node:
	/// 1. A node with two red children is flipped: it turns red, they turn black
	/// 2. If that leaves the node and its parent both red, the grandparent is
	///    rotated once (straight line) or twice (zig-zag)
	/// 3. The new node is attached red at the first absent link
	/// 4. The root is painted black at the end
	pub fn insert<S>(&mut self, store: &mut S, id: NodeId) -> Result<()>
	where
		S: NodeStore,
		C: Compare<S::Key>,
	{
		// Rule out duplicates before touching anything, so a rejected insert
		// leaves the shape intact
		if let Some(existing) = self.search(store, &store.node(id).key) {
			debug!("insert of {id:?} rejected: key already held by {existing:?}");
			return Err(Error::DuplicateKey);
		}

		store.node_mut(id).reset();

		let Some(root) = self.root else {
			paint(store, id, Color::Black);
			self.root = Some(id);
			return Ok(());
		};

		// `t` is the parent of `g`; `None` there is the sentinel above the root
		let mut t: Option<NodeId> = None;
		let mut g: Option<NodeId> = None;
		let mut p: Option<NodeId> = None;
		let mut q: Option<NodeId> = Some(root);
		let mut dir = Direction::Reverse;
		let mut last = Direction::Reverse;

		loop {
			let cur = match q {
				Some(cur) => {
					if is_red(store, child(store, cur, Direction::Reverse))
						&& is_red(store, child(store, cur, Direction::Forward))
					{
						trace!("insert: color flip at {cur:?}");
						flip(store, cur, Color::Red);
					}
					cur
				}
				None => {
					let parent = p.expect("an absent link always has a parent");
					store.node_mut(parent).set_child(dir, Some(id));
					id
				}
			};

			// Red violation: a red parent is never the root, so the
			// grandparent exists
			if let Some(parent) = p {
				if is_red(store, Some(parent)) && is_red(store, Some(cur)) {
					let grand = g.expect("a red node is never the root");
					let side = self.side_of(store, t, grand);
					let top = if child(store, parent, last) == Some(cur) {
						trace!("insert: single rotation at {grand:?}");
						single(store, grand, !last)
					} else {
						trace!("insert: double rotation at {grand:?}");
						double(store, grand, !last)
					};
					self.set_slot(store, t, side, Some(top));
				}
			}

			if cur == id {
				break;
			}

			last = dir;
			dir = Direction::toward(self.cmp.compare(&store.node(id).key, &store.node(cur).key));

			if g.is_some() {
				t = g;
			}
			g = p;
			p = Some(cur);
			q = child(store, cur, dir);
		}

		if let Some(root) = self.root {
			paint(store, root, Color::Black);
		}
		Ok(())
	}

	/// Removes the entry whose key compares equal to `key`.
	///
	/// Returns the id of the node that was unlinked from the tree. That node is
	/// not necessarily the one that held `key` before the call: erasure moves
	/// the in-order successor's entry into the matching node and unlinks the
	/// successor's node instead. Either way, the returned node carries the
	/// erased key and value afterwards, so it is the slot the caller can
	/// reclaim. Node identity of the remaining entries is not preserved.
	///
	/// If no key matches, nothing changes and [`Error::NotFound`] is returned.
	///
	/// # Algorithm
	///
	/// A single pass from a sentinel above the root. Before stepping into a
	/// black child of a black node, a red node is pushed into the path:
	/// 1. A red child on the other side is rotated up, or
	/// 2. The parent, sibling and current node are color flipped when the
	///    sibling has no red children, or
	/// 3. The parent is rotated once or twice toward the current node when the
	///    sibling has a red child, then recolored
	///
	/// At the bottom the matching node takes the last node's entry and the last
	/// node is spliced out by its single remaining child.
	pub fn erase<S, Q>(&mut self, store: &mut S, key: &Q) -> Result<NodeId>
	where
		S: NodeStore,
		S::Key: Borrow<Q>,
		Q: ?Sized,
		C: Compare<Q>,
	{
		if self.search(store, key).is_none() {
			debug!("erase: no entry with the requested key");
			return Err(Error::NotFound);
		}

		// `None` in any of these is the sentinel above the root
		let mut g: Option<NodeId>;
		let mut p: Option<NodeId> = None;
		let mut q: Option<NodeId> = None;
		let mut found: Option<NodeId> = None;
		let mut dir = Direction::Forward;

		while let Some(cur) = self.slot(store, q, dir) {
			let last = dir;

			g = p;
			p = q;
			q = Some(cur);

			let ord = self.cmp.compare(key, store.node(cur).key.borrow());
			dir = Direction::toward(ord);

			// Keep going past the match; removal happens at the bottom
			if ord == Ordering::Equal {
				found = Some(cur);
			}

			if is_red(store, Some(cur)) || is_red(store, child(store, cur, dir)) {
				continue;
			}

			if is_red(store, child(store, cur, !dir)) {
				trace!("erase: rotating red child up at {cur:?}");
				let top = single(store, cur, dir);
				self.set_slot(store, p, last, Some(top));
				p = Some(top);
			} else if let Some(sibling) = self.slot(store, p, !last) {
				let parent = p.expect("the sentinel has no sibling links");

				if !is_red(store, child(store, sibling, !last))
					&& !is_red(store, child(store, sibling, last))
				{
					trace!("erase: color flip at {parent:?}");
					paint(store, parent, Color::Black);
					paint(store, sibling, Color::Red);
					paint(store, cur, Color::Red);
				} else {
					let side = self.side_of(store, g, parent);
					let top = if is_red(store, child(store, sibling, last)) {
						trace!("erase: double rotation at {parent:?}");
						double(store, parent, last)
					} else {
						trace!("erase: single rotation at {parent:?}");
						single(store, parent, last)
					};
					self.set_slot(store, g, side, Some(top));

					paint(store, cur, Color::Red);
					flip(store, top, Color::Red);
				}
			}
		}

		let leaf = q.expect("a non-empty tree yields at least one step");
		let target = found.expect("the key was found before descending");

		if target != leaf {
			store.swap_entries(target, leaf);
		}

		let side = self.side_of(store, p, leaf);
		let orphan =
			child(store, leaf, Direction::Reverse).or(child(store, leaf, Direction::Forward));
		self.set_slot(store, p, side, orphan);
		store.node_mut(leaf).reset();

		if let Some(root) = self.root {
			paint(store, root, Color::Black);
		}

		Ok(leaf)
	}
}

// ---------------------------------------------------------------------------
// Invariant Validation
// ---------------------------------------------------------------------------

impl<C> RawTree<C> {
	/// Checks every red-black invariant and returns the tree's black height.
	///
	/// # Invariants Checked
	///
	/// 1. The root is black
	/// 2. No red node has a red child
	/// 3. Black height is the same on every path
	/// 4. In-order keys strictly increase under the tree's policy
	/// 5. No path is deeper than a cursor can record
	pub fn validate<S>(&self, store: &S) -> std::result::Result<usize, Violation>
	where
		S: NodeStore,
		C: Compare<S::Key>,
	{
		if is_red(store, self.root) {
			return Err(Violation::RedRoot);
		}
		let mut prev = None;
		self.validate_subtree(store, self.root, 1, &mut prev)
	}

	/// Validates all tree invariants. Panics with diagnostic info if any
	/// invariant is violated.
	pub fn assert_invariants<S>(&self, store: &S)
	where
		S: NodeStore,
		C: Compare<S::Key>,
	{
		if let Err(violation) = self.validate(store) {
			panic!("red-black invariant violated: {violation}");
		}
	}

	/// Validates the subtree at `id` in order, returning its black height.
	fn validate_subtree<S>(
		&self,
		store: &S,
		id: Option<NodeId>,
		depth: usize,
		prev: &mut Option<NodeId>,
	) -> std::result::Result<usize, Violation>
	where
		S: NodeStore,
		C: Compare<S::Key>,
	{
		let Some(id) = id else {
			return Ok(0);
		};

		if depth > HEIGHT_LIMIT {
			return Err(Violation::TooDeep {
				depth,
				limit: HEIGHT_LIMIT,
			});
		}

		let node = store.node(id);

		if node.color == Color::Red {
			for kid in node.link.into_iter().flatten() {
				if is_red(store, Some(kid)) {
					return Err(Violation::RedRed {
						parent: id.index(),
						child: kid.index(),
					});
				}
			}
		}

		let left = self.validate_subtree(store, node.child(Direction::Reverse), depth + 1, prev)?;

		if let Some(before) = *prev {
			if self.cmp.compare(&store.node(before).key, &node.key) != Ordering::Less {
				return Err(Violation::Order {
					node: id.index(),
				});
			}
		}
		*prev = Some(id);

		let right = self.validate_subtree(store, node.child(Direction::Forward), depth + 1, prev)?;

		if left != right {
			return Err(Violation::BlackHeight {
				node: id.index(),
				left,
				right,
			});
		}

		Ok(left + usize::from(node.color == Color::Black))
	}
}

// ---------------------------------------------------------------------------
// Owning Tree
// ---------------------------------------------------------------------------

/// A red-black tree that owns its nodes in an [`Arena`].
///
/// This is the convenient form of the engine: nodes are allocated on insert
/// and returned to the arena's free list on removal.
///
/// # Type Parameters
///
/// - `K`: The key type.
/// - `V`: The value type.
/// - `C`: The ordering policy over `K`. [`Tree`] fixes it to [`Natural`].
pub struct GenericTree<K, V, C = Natural> {
	raw: RawTree<C>,
	arena: Arena<K, V>,
}

/// A red-black tree ordered by the keys' [`Ord`] implementation.
pub type Tree<K, V> = GenericTree<K, V, Natural>;

impl<K: Ord, V> GenericTree<K, V, Natural> {
	/// Creates a new, empty tree.
	///
	/// # Example
	///
	/// ```
	/// use rbcursor::Tree;
	///
	/// let tree: Tree<String, i32> = Tree::new();
	/// assert!(tree.is_empty());
	/// assert_eq!(tree.height(), 0);
	/// ```
	pub fn new() -> Self {
		Self::with_comparator(Natural)
	}
}

impl<K, V, C: Default> Default for GenericTree<K, V, C> {
	fn default() -> Self {
		GenericTree {
			raw: RawTree::new(C::default()),
			arena: Arena::new(),
		}
	}
}

impl<K, V, C> GenericTree<K, V, C> {
	/// Creates a new, empty tree ordered by `cmp`.
	///
	/// # Example
	///
	/// ```
	/// use rbcursor::{GenericTree, Natural, Reversed};
	///
	/// let mut tree = GenericTree::with_comparator(Reversed(Natural));
	/// tree.insert(1, ()).unwrap();
	/// tree.insert(2, ()).unwrap();
	///
	/// let keys: Vec<_> = tree.iter().map(|(k, _)| *k).collect();
	/// assert_eq!(keys, vec![2, 1]);
	/// ```
	pub fn with_comparator(cmp: C) -> Self {
		GenericTree {
			raw: RawTree::new(cmp),
			arena: Arena::new(),
		}
	}

	/// Returns the number of entries. Unlike [`RawTree::len`] this is O(1).
	pub fn len(&self) -> usize {
		self.arena.len()
	}

	/// Returns `true` if the tree contains no entries.
	pub fn is_empty(&self) -> bool {
		self.raw.is_empty()
	}

	/// Returns the number of nodes on the longest root-to-node path.
	pub fn height(&self) -> usize {
		self.raw.height(&self.arena)
	}

	/// Removes all entries.
	pub fn clear(&mut self) {
		self.raw.clear();
		self.arena.clear();
	}

	/// Returns the underlying engine.
	pub fn raw(&self) -> &RawTree<C> {
		&self.raw
	}

	/// Returns the arena holding the nodes.
	pub fn arena(&self) -> &Arena<K, V> {
		&self.arena
	}

	/// Returns an iterator over the entries in ascending key order.
	///
	/// # Example
	///
	/// ```
	/// use rbcursor::Tree;
	///
	/// let mut tree = Tree::new();
	/// tree.insert(2, 'b').unwrap();
	/// tree.insert(1, 'a').unwrap();
	///
	/// let entries: Vec<_> = tree.iter().collect();
	/// assert_eq!(entries, vec![(&1, &'a'), (&2, &'b')]);
	/// ```
	pub fn iter(&self) -> Iter<'_, Arena<K, V>> {
		Iter::new(&self.raw, &self.arena, Direction::Forward)
	}

	/// Returns an iterator over the entries in descending key order.
	pub fn rev_iter(&self) -> Iter<'_, Arena<K, V>> {
		Iter::new(&self.raw, &self.arena, Direction::Reverse)
	}

	/// Returns a cursor positioned on the smallest key.
	///
	/// # Example
	///
	/// ```
	/// use rbcursor::Tree;
	///
	/// let mut tree = Tree::new();
	/// for k in [3, 1, 2] {
	/// 	tree.insert(k, k * 10).unwrap();
	/// }
	///
	/// let mut cursor = tree.cursor();
	/// assert_eq!(cursor.entry(), Some((&1, &10)));
	/// cursor.next();
	/// assert_eq!(cursor.entry(), Some((&2, &20)));
	/// ```
	pub fn cursor(&self) -> Cursor<'_, Arena<K, V>> {
		let mut cursor = Cursor::new();
		cursor.first(&self.raw, &self.arena);
		cursor
	}

	/// Returns the entry with the smallest key.
	pub fn first_key_value(&self) -> Option<(&K, &V)> {
		self.iter().next()
	}

	/// Returns the entry with the largest key.
	pub fn last_key_value(&self) -> Option<(&K, &V)> {
		self.rev_iter().next()
	}
}

impl<K, V, C: Compare<K>> GenericTree<K, V, C> {
	/// Inserts a key-value pair.
	///
	/// If the key already exists, the tree is unchanged, the new pair is
	/// dropped and [`Error::DuplicateKey`] is returned.
	///
	/// # Example
	///
	/// ```
	/// use rbcursor::{Error, Tree};
	///
	/// let mut tree = Tree::new();
	/// assert_eq!(tree.insert(5, "five"), Ok(()));
	/// assert_eq!(tree.insert(5, "cinq"), Err(Error::DuplicateKey));
	/// assert_eq!(tree.get(&5), Some(&"five"));
	/// ```
	pub fn insert(&mut self, key: K, value: V) -> Result<()> {
		let id = self.arena.alloc(key, value);

		if let Err(err) = self.raw.insert(&mut self.arena, id) {
			self.arena.remove(id);
			return Err(err);
		}
		Ok(())
	}

	/// Looks up a key and applies `f` to its value.
	///
	/// The key may be any borrowed form of `K`, as long as the ordering
	/// policy compares that form the same way.
	pub fn lookup<Q, R, F>(&self, key: &Q, f: F) -> Option<R>
	where
		K: Borrow<Q>,
		Q: ?Sized,
		C: Compare<Q>,
		F: FnOnce(&V) -> R,
	{
		self.raw.search(&self.arena, key).map(|id| f(self.arena.node(id).value()))
	}

	/// Returns a reference to the value for `key`.
	///
	/// # Example
	///
	/// ```
	/// use rbcursor::Tree;
	///
	/// let mut tree = Tree::new();
	/// tree.insert("pear".to_string(), 3).unwrap();
	///
	/// assert_eq!(tree.get("pear"), Some(&3));
	/// ```
	pub fn get<Q>(&self, key: &Q) -> Option<&V>
	where
		K: Borrow<Q>,
		Q: ?Sized,
		C: Compare<Q>,
	{
		self.raw.search(&self.arena, key).map(|id| self.arena.node(id).value())
	}

	/// Returns a mutable reference to the value for `key`.
	pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
	where
		K: Borrow<Q>,
		Q: ?Sized,
		C: Compare<Q>,
	{
		let id = self.raw.search(&self.arena, key)?;
		Some(self.arena.node_mut(id).value_mut())
	}

	/// Returns `true` if the tree contains `key`.
	pub fn contains_key<Q>(&self, key: &Q) -> bool
	where
		K: Borrow<Q>,
		Q: ?Sized,
		C: Compare<Q>,
	{
		self.raw.search(&self.arena, key).is_some()
	}

	/// Removes a key, returning its value.
	///
	/// # Example
	///
	/// ```
	/// use rbcursor::{Error, Tree};
	///
	/// let mut tree = Tree::new();
	/// tree.insert(1, "one").unwrap();
	///
	/// assert_eq!(tree.remove(&1), Ok("one"));
	/// assert_eq!(tree.remove(&1), Err(Error::NotFound));
	/// ```
	pub fn remove<Q>(&mut self, key: &Q) -> Result<V>
	where
		K: Borrow<Q>,
		Q: ?Sized,
		C: Compare<Q>,
	{
		self.remove_entry(key).map(|(_, v)| v)
	}

	/// Removes a key, returning the stored key and value.
	pub fn remove_entry<Q>(&mut self, key: &Q) -> Result<(K, V)>
	where
		K: Borrow<Q>,
		Q: ?Sized,
		C: Compare<Q>,
	{
		let id = self.raw.erase(&mut self.arena, key)?;
		Ok(self.arena.remove(id).expect("an unlinked node is still live in the arena"))
	}

	/// Checks every red-black invariant; see [`RawTree::validate`].
	pub fn validate(&self) -> std::result::Result<usize, Violation> {
		self.raw.validate(&self.arena)
	}

	/// Validates all tree invariants. Panics with diagnostic info if any
	/// invariant is violated.
	pub fn assert_invariants(&self) {
		self.raw.assert_invariants(&self.arena);
		assert_eq!(self.raw.len(&self.arena), self.arena.len(), "every live node must be linked");
	}
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for GenericTree<K, V, C> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_map().entries(self.iter()).finish()
	}
}
