//! Test utilities for loading sample trees from JSON fixtures
use crate::{Color, Natural, Node, NodeId, RawTree};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "lowercase")]
enum Paint {
	Red,
	Black,
}

#[derive(Deserialize, Debug)]
struct TreeNode {
	key: i32,
	color: Paint,
	#[serde(default)]
	left: Option<Box<TreeNode>>,
	#[serde(default)]
	right: Option<Box<TreeNode>>,
}

/// Stores `tree_node` and its subtrees in preorder, returning its id.
fn translate_node(tree_node: TreeNode, nodes: &mut Vec<Node<i32, i32>>) -> NodeId {
	let id = NodeId::new(nodes.len());
	nodes.push(Node::new(tree_node.key, tree_node.key * 10));

	let left = tree_node.left.map(|n| translate_node(*n, nodes));
	let right = tree_node.right.map(|n| translate_node(*n, nodes));

	let node = &mut nodes[id.index()];
	node.link = [left, right];
	node.color = match tree_node.color {
		Paint::Red => Color::Red,
		Paint::Black => Color::Black,
	};
	id
}

/// Builds a tree exactly as described, without rebalancing. Node ids follow
/// preorder and every value is ten times its key.
pub fn sample_tree(json: &str) -> (RawTree, Vec<Node<i32, i32>>) {
	let root: TreeNode = serde_json::from_str(json).unwrap();
	let mut nodes = Vec::new();
	let root = translate_node(root, &mut nodes);
	let tree = RawTree {
		root: Some(root),
		cmp: Natural,
	};
	(tree, nodes)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Direction;

	const SAMPLE: &str = include_str!("../fixtures/sample.json");

	fn id(index: usize) -> Option<NodeId> {
		Some(NodeId::new(index))
	}

	#[test]
	fn sample_tree_matches_fixture() {
		let (tree, nodes) = sample_tree(SAMPLE);

		assert_eq!(tree.validate(&nodes), Ok(2));
		assert_eq!(tree.height(&nodes), 3);
		assert_eq!(tree.root(), id(0));
		assert_eq!(nodes[0].link, [id(1), id(4)]);
		assert_eq!(*nodes[5].key(), 5);
	}

	#[test]
	fn sample_tree_erase_root_moves_successor_up() {
		let (mut tree, mut nodes) = sample_tree(SAMPLE);

		// The successor's node is the one unlinked, and it leaves carrying 4
		assert_eq!(tree.erase(&mut nodes, &4), Ok(NodeId::new(5)));
		assert_eq!(nodes[5].clone().into_entry(), (4, 40));
		assert_eq!(nodes[5].link, [None, None]);

		assert_eq!(tree.root(), id(0));
		assert_eq!(nodes[0].clone().into_entry(), (5, 50));
		assert_eq!(nodes[4].link, [None, id(6)]);
		assert_eq!(tree.validate(&nodes), Ok(2));
	}

	#[test]
	fn erase_with_black_sibling_color_flips() {
		let (mut tree, mut nodes) = sample_tree(include_str!("../fixtures/erase_flip.json"));

		assert_eq!(tree.erase(&mut nodes, &1), Ok(NodeId::new(1)));

		assert_eq!(tree.root(), id(0));
		assert_eq!(nodes[0].link, [None, id(2)]);
		assert_eq!(nodes[0].color(), Color::Black);
		assert_eq!(nodes[2].color(), Color::Red);
		assert_eq!(tree.validate(&nodes), Ok(1));
	}

	#[test]
	fn erase_with_far_red_nephew_rotates_once() {
		let (mut tree, mut nodes) = sample_tree(include_str!("../fixtures/erase_single.json"));

		assert_eq!(tree.erase(&mut nodes, &1), Ok(NodeId::new(1)));

		// The sibling replaced the root through the sentinel slot
		assert_eq!(tree.root(), id(2));
		assert_eq!(nodes[2].link, [id(0), id(3)]);
		assert_eq!(nodes[0].link, [None, None]);
		assert_eq!(nodes[0].color(), Color::Black);
		assert_eq!(nodes[3].color(), Color::Black);
		assert_eq!(tree.validate(&nodes), Ok(2));
	}

	#[test]
	fn erase_with_near_red_nephew_rotates_twice() {
		let (mut tree, mut nodes) = sample_tree(include_str!("../fixtures/erase_double.json"));

		assert_eq!(tree.erase(&mut nodes, &1), Ok(NodeId::new(1)));

		assert_eq!(tree.root(), id(3));
		assert_eq!(nodes[3].link, [id(0), id(2)]);
		assert_eq!(nodes[2].link, [None, None]);
		assert_eq!(tree.validate(&nodes), Ok(2));
	}

	#[test]
	fn erase_rotates_red_child_into_the_path() {
		let (mut tree, mut nodes) = sample_tree(include_str!("../fixtures/erase_red_child.json"));

		assert_eq!(tree.erase(&mut nodes, &1), Ok(NodeId::new(1)));

		assert_eq!(nodes[0].link, [id(2), id(3)]);
		assert_eq!(nodes[2].color(), Color::Black);
		assert_eq!(nodes[2].child(Direction::Forward), None);
		assert_eq!(tree.validate(&nodes), Ok(2));
	}

	#[test]
	fn every_fixture_survives_erasing_each_key() {
		let fixtures = [
			SAMPLE,
			include_str!("../fixtures/erase_flip.json"),
			include_str!("../fixtures/erase_single.json"),
			include_str!("../fixtures/erase_double.json"),
			include_str!("../fixtures/erase_red_child.json"),
		];

		for json in fixtures {
			let (_, pristine) = sample_tree(json);
			let keys: Vec<i32> = pristine.iter().map(|n| *n.key()).collect();

			for key in &keys {
				let (mut tree, mut nodes) = sample_tree(json);
				tree.erase(&mut nodes, key).unwrap();
				tree.assert_invariants(&nodes);
				assert_eq!(tree.len(&nodes), keys.len() - 1);
				assert_eq!(tree.search(&nodes, key), None);
			}
		}
	}
}
