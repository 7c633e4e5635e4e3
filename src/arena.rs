//! Node storage.
//!
//! [`RawTree`](crate::RawTree) never owns nodes; it reaches them through a
//! [`NodeStore`]. Two stores ship with the crate:
//!
//! - `Vec<Node<K, V>>`, for callers that lay out their own records and hand
//!   the tree fixed positions.
//! - [`Arena`], a slab that hands out ids, recycles freed slots through a free
//!   list and is what [`GenericTree`](crate::GenericTree) uses.

use crate::{Node, NodeId, NodeStore};

/// Borrows two distinct elements of a slice mutably.
fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
	assert_ne!(a, b, "cannot borrow the same node twice");
	if a < b {
		let (head, tail) = items.split_at_mut(b);
		(&mut head[a], &mut tail[0])
	} else {
		let (head, tail) = items.split_at_mut(a);
		(&mut tail[0], &mut head[b])
	}
}

impl<K, V> NodeStore for Vec<Node<K, V>> {
	type Key = K;
	type Value = V;

	#[inline]
	fn node(&self, id: NodeId) -> &Node<K, V> {
		&self[id.index()]
	}

	#[inline]
	fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
		&mut self[id.index()]
	}

	fn swap_entries(&mut self, a: NodeId, b: NodeId) {
		let (x, y) = pair_mut(self, a.index(), b.index());
		x.swap_entry(y);
	}
}

/// A slab of nodes with a free list.
///
/// Ids stay valid until the slot is removed; removed slots are reused by
/// later allocations, most recently freed first.
///
/// # Example
///
/// ```
/// use rbcursor::{Arena, Natural, RawTree};
///
/// let mut arena = Arena::new();
/// let mut tree = RawTree::new(Natural);
///
/// for k in [3, 1, 2] {
/// 	let id = arena.alloc(k, k * 100);
/// 	tree.insert(&mut arena, id).unwrap();
/// }
///
/// let gone = tree.erase(&mut arena, &1).unwrap();
/// assert_eq!(arena.remove(gone), Some((1, 100)));
/// assert_eq!(arena.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Arena<K, V> {
	slots: Vec<Option<Node<K, V>>>,
	free: Vec<NodeId>,
	len: usize,
}

impl<K, V> Default for Arena<K, V> {
	fn default() -> Self {
		Self::new()
	}
}

impl<K, V> Arena<K, V> {
	/// Creates an empty arena.
	pub const fn new() -> Self {
		Arena {
			slots: Vec::new(),
			free: Vec::new(),
			len: 0,
		}
	}

	/// Creates an empty arena with room for `capacity` nodes before it
	/// reallocates.
	pub fn with_capacity(capacity: usize) -> Self {
		Arena {
			slots: Vec::with_capacity(capacity),
			free: Vec::new(),
			len: 0,
		}
	}

	/// Stores a new detached node and returns its id.
	pub fn alloc(&mut self, key: K, value: V) -> NodeId {
		let node = Node::new(key, value);
		self.len += 1;

		if let Some(id) = self.free.pop() {
			self.slots[id.index()] = Some(node);
			id
		} else {
			let id = NodeId::new(self.slots.len());
			self.slots.push(Some(node));
			id
		}
	}

	/// Frees the slot named by `id`, returning its entry.
	///
	/// The node must already be unlinked from any tree. Returns `None` if the
	/// slot is not live.
	pub fn remove(&mut self, id: NodeId) -> Option<(K, V)> {
		let node = self.slots.get_mut(id.index())?.take()?;
		self.free.push(id);
		self.len -= 1;
		Some(node.into_entry())
	}

	/// Returns the node named by `id`, if the slot is live.
	pub fn get(&self, id: NodeId) -> Option<&Node<K, V>> {
		self.slots.get(id.index()).and_then(Option::as_ref)
	}

	/// Returns the number of live nodes.
	pub fn len(&self) -> usize {
		self.len
	}

	/// Returns `true` if no node is live.
	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	/// Returns the number of slots, live or free.
	pub fn slot_count(&self) -> usize {
		self.slots.len()
	}

	/// Drops every node.
	pub fn clear(&mut self) {
		self.slots.clear();
		self.free.clear();
		self.len = 0;
	}
}

impl<K, V> NodeStore for Arena<K, V> {
	type Key = K;
	type Value = V;

	#[inline]
	fn node(&self, id: NodeId) -> &Node<K, V> {
		match self.slots.get(id.index()) {
			Some(Some(node)) => node,
			_ => panic!("{id:?} does not name a live node"),
		}
	}

	#[inline]
	fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
		match self.slots.get_mut(id.index()) {
			Some(Some(node)) => node,
			_ => panic!("{id:?} does not name a live node"),
		}
	}

	fn swap_entries(&mut self, a: NodeId, b: NodeId) {
		match pair_mut(&mut self.slots, a.index(), b.index()) {
			(Some(x), Some(y)) => x.swap_entry(y),
			_ => panic!("cannot swap entries of {a:?} and {b:?}: slot is not live"),
		}
	}
}
