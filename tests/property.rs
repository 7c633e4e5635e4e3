//! # Property-Based Tests for the rbcursor Red-Black Tree
//!
//! This module uses proptest to check the tree against `BTreeMap` and
//! `BTreeSet` over thousands of random inputs.
//!
//! ## Test Properties
//!
//! - Invariants: every insert and erase leaves a valid red-black tree
//! - Ordering: forward traversal yields the sorted key set, backward the reverse
//! - Duplicates: a rejected insert leaves keys and shape untouched
//! - Membership: search finds exactly the keys present
//! - Erase: a present key disappears exactly once; an absent key changes nothing
//! - Oracle comparison: behavior matches BTreeMap reference

use proptest::prelude::*;
use rbcursor::{Cursor, Error, Natural, Node, NodeId, RawTree, Tree};
use std::collections::{BTreeMap, BTreeSet};

// ===========================================================================
// Strategy Helpers
// ===========================================================================

/// Generate a vector of unique keys for testing
fn unique_keys(max_len: usize) -> impl Strategy<Value = Vec<i32>> {
	prop::collection::hash_set(any::<i32>(), 0..max_len).prop_map(|s| s.into_iter().collect())
}

/// Generate a vector of key-value pairs
fn key_value_pairs(max_len: usize) -> impl Strategy<Value = Vec<(i32, i32)>> {
	prop::collection::vec((any::<i32>(), any::<i32>()), 0..max_len)
}

/// Operations that can be performed on the tree
#[derive(Debug, Clone)]
enum Op {
	Insert(i16, i32),
	Remove(i16),
	Lookup(i16),
}

/// Generate a sequence of random operations over a narrow key range, so
/// that removals and duplicates actually hit
fn operations(max_ops: usize) -> impl Strategy<Value = Vec<Op>> {
	prop::collection::vec(
		prop_oneof![
			(any::<i16>(), any::<i32>()).prop_map(|(k, v)| Op::Insert(k % 256, v)),
			any::<i16>().prop_map(|k| Op::Remove(k % 256)),
			any::<i16>().prop_map(|k| Op::Lookup(k % 256)),
		],
		0..max_ops,
	)
}

/// Builds a raw tree over a vector store from distinct keys.
fn raw_tree(keys: &[i32]) -> (RawTree, Vec<Node<i32, i32>>) {
	let mut nodes: Vec<Node<i32, i32>> = keys.iter().map(|&k| Node::new(k, k)).collect();
	let mut tree = RawTree::new(Natural);
	for i in 0..nodes.len() {
		tree.insert(&mut nodes, NodeId::new(i)).unwrap();
	}
	(tree, nodes)
}

fn cursor_keys(tree: &RawTree, nodes: &Vec<Node<i32, i32>>, forward: bool) -> Vec<i32> {
	let mut cursor = Cursor::new();
	let mut it = if forward {
		cursor.first(tree, nodes)
	} else {
		cursor.last(tree, nodes)
	};
	let mut out = Vec::new();
	while let Some(id) = it {
		out.push(*nodes[id.index()].key());
		it = if forward {
			cursor.next()
		} else {
			cursor.prev()
		};
	}
	out
}

// ===========================================================================
// Insert-Then-Lookup Property
// ===========================================================================

proptest! {
	/// Property: After inserting a key-value pair, lookup returns the first
	/// value stored under that key
	#[test]
	fn insert_then_lookup(entries in key_value_pairs(500)) {
		let mut tree: Tree<i32, i32> = Tree::new();
		let mut expected: BTreeMap<i32, i32> = BTreeMap::new();

		for (k, v) in &entries {
			let fresh = !expected.contains_key(k);
			prop_assert_eq!(tree.insert(*k, *v).is_ok(), fresh);
			expected.entry(*k).or_insert(*v);
		}

		tree.assert_invariants();

		for (k, v) in &expected {
			prop_assert_eq!(tree.get(k), Some(v), "Key {} should have value {}", k, v);
		}
		prop_assert_eq!(tree.len(), expected.len());
	}
}

// ===========================================================================
// Ordering Properties
// ===========================================================================

proptest! {
	/// Property: Forward traversal yields the sorted key set, backward
	/// traversal its exact reverse
	#[test]
	fn traversal_is_sorted(keys in unique_keys(400)) {
		let (tree, nodes) = raw_tree(&keys);
		let sorted: Vec<i32> = keys.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();

		let forward = cursor_keys(&tree, &nodes, true);
		let mut backward = cursor_keys(&tree, &nodes, false);

		prop_assert_eq!(&forward, &sorted);
		backward.reverse();
		prop_assert_eq!(&backward, &sorted);
	}

	/// Property: The owning tree's iterators agree with the cursor
	#[test]
	fn iterators_match_cursor(keys in unique_keys(200)) {
		let mut tree: Tree<i32, ()> = Tree::new();
		for k in &keys {
			tree.insert(*k, ()).unwrap();
		}

		let up: Vec<i32> = tree.iter().map(|(k, _)| *k).collect();
		let mut down: Vec<i32> = tree.rev_iter().map(|(k, _)| *k).collect();
		down.reverse();

		let mut cursor = tree.cursor();
		let mut stepped = Vec::new();
		while let Some((k, _)) = cursor.entry() {
			stepped.push(*k);
			cursor.next();
		}

		prop_assert_eq!(&up, &down);
		prop_assert_eq!(&up, &stepped);
	}
}

// ===========================================================================
// Duplicate and Absent Key Properties
// ===========================================================================

proptest! {
	/// Property: Re-inserting any present key is rejected and leaves every
	/// node's color, links and entry exactly as they were
	#[test]
	fn duplicate_insert_preserves_shape(
		keys in unique_keys(200),
		pick in any::<prop::sample::Index>()
	) {
		prop_assume!(!keys.is_empty());
		let (mut tree, mut nodes) = raw_tree(&keys);
		let before = nodes.clone();
		let root = tree.root();

		let dup = keys[pick.index(keys.len())];
		nodes.push(Node::new(dup, i32::MIN));
		let result = tree.insert(&mut nodes, NodeId::new(keys.len()));

		prop_assert_eq!(result, Err(Error::DuplicateKey));
		prop_assert_eq!(&nodes[..keys.len()], &before[..]);
		prop_assert_eq!(tree.root(), root);
	}

	/// Property: Erasing a key that is not present changes nothing
	#[test]
	fn erase_absent_preserves_shape(keys in unique_keys(200), absent in any::<i32>()) {
		prop_assume!(!keys.contains(&absent));
		let (mut tree, mut nodes) = raw_tree(&keys);
		let before = nodes.clone();
		let root = tree.root();

		prop_assert_eq!(tree.erase(&mut nodes, &absent), Err(Error::NotFound));
		prop_assert_eq!(&nodes, &before);
		prop_assert_eq!(tree.root(), root);
	}

	/// Property: Erasing a present key removes exactly that key
	#[test]
	fn erase_removes_exactly_one(keys in unique_keys(300), pick in any::<prop::sample::Index>()) {
		prop_assume!(!keys.is_empty());
		let (mut tree, mut nodes) = raw_tree(&keys);
		let victim = keys[pick.index(keys.len())];

		let unlinked = tree.erase(&mut nodes, &victim).unwrap();
		tree.assert_invariants(&nodes);

		prop_assert_eq!(*nodes[unlinked.index()].key(), victim);
		let expected: Vec<i32> = keys
			.iter()
			.copied()
			.filter(|&k| k != victim)
			.collect::<BTreeSet<_>>()
			.into_iter()
			.collect();
		prop_assert_eq!(cursor_keys(&tree, &nodes, true), expected);

		for k in &keys {
			prop_assert_eq!(tree.search(&nodes, k).is_some(), *k != victim);
		}
	}
}

// ===========================================================================
// Oracle Comparison
// ===========================================================================

proptest! {
	#![proptest_config(ProptestConfig::with_cases(128))]

	/// Property: Any operation sequence behaves exactly like BTreeMap, with
	/// the invariants holding after every step
	#[test]
	fn matches_btreemap(ops in operations(400)) {
		let mut tree: Tree<i16, i32> = Tree::new();
		let mut oracle: BTreeMap<i16, i32> = BTreeMap::new();

		for op in &ops {
			match *op {
				Op::Insert(k, v) => {
					let expected = if oracle.contains_key(&k) {
						Err(Error::DuplicateKey)
					} else {
						oracle.insert(k, v);
						Ok(())
					};
					prop_assert_eq!(tree.insert(k, v), expected);
				}
				Op::Remove(k) => {
					let expected = oracle.remove(&k).ok_or(Error::NotFound);
					prop_assert_eq!(tree.remove(&k), expected);
				}
				Op::Lookup(k) => {
					prop_assert_eq!(tree.get(&k), oracle.get(&k));
				}
			}
			tree.assert_invariants();
		}

		prop_assert_eq!(tree.len(), oracle.len());
		prop_assert!(tree.iter().map(|(k, v)| (*k, *v)).eq(oracle.into_iter()));
	}
}
