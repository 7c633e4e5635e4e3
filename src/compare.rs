//! Ordering policies.
//!
//! The tree never compares keys on its own: every descent asks a [`Compare`]
//! implementation for a three-way answer. The policy must be a total order and
//! must not change while a tree holds nodes ordered by it.

use std::cmp::Ordering;

/// A three-way comparison over keys of type `K`.
///
/// Any `Fn(&K, &K) -> Ordering` closure is a comparator:
///
/// ```
/// use rbcursor::Compare;
/// use std::cmp::Ordering;
///
/// let by_len = |a: &&str, b: &&str| a.len().cmp(&b.len());
/// assert_eq!(by_len.compare(&"ab", &"abc"), Ordering::Less);
/// ```
pub trait Compare<K: ?Sized> {
	/// Compares `a` against `b`.
	fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// Orders keys by their [`Ord`] implementation.
///
/// Comparisons go through `Ord::cmp` rather than subtracting keys, so keys
/// at the extremes of an integer range order correctly.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Natural;

impl<K: Ord + ?Sized> Compare<K> for Natural {
	#[inline]
	fn compare(&self, a: &K, b: &K) -> Ordering {
		a.cmp(b)
	}
}

/// Inverts another policy, producing a descending order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Reversed<C>(pub C);

impl<K: ?Sized, C: Compare<K>> Compare<K> for Reversed<C> {
	#[inline]
	fn compare(&self, a: &K, b: &K) -> Ordering {
		self.0.compare(b, a)
	}
}

impl<K: ?Sized, F> Compare<K> for F
where
	F: Fn(&K, &K) -> Ordering,
{
	#[inline]
	fn compare(&self, a: &K, b: &K) -> Ordering {
		self(a, b)
	}
}
