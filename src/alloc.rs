//! Allocation tracking for tests.
//!
//! This module provides a global allocator wrapper that counts allocations
//! and bytes made by the current thread. The tree engine promises that
//! insert, erase and cursor traversal never allocate; test binaries install
//! [`TrackingAllocator`] to hold it to that and to check that an owning
//! [`Tree`](crate::Tree) gives back everything it took.
//!
//! # Usage
//!
//! ```ignore
//! use rbcursor::alloc::TrackingAllocator;
//!
//! #[global_allocator]
//! static ALLOC: TrackingAllocator = TrackingAllocator;
//!
//! #[test]
//! fn test_no_leaks() {
//! 	rbcursor::alloc::reset_counters();
//!
//! 	// ... test code ...
//!
//! 	drop(tree);
//!
//! 	rbcursor::alloc::check_no_leaks();
//! }
//! ```
//!
//! # Caveats
//!
//! - Counters are per thread, so tests running in parallel do not disturb
//!   each other, but work handed to other threads is not counted
//! - Allocations made before [`reset_counters`] are invisible; freeing them
//!   afterwards shows up as a deallocation

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

thread_local! {
	static ALLOC_COUNT: Cell<usize> = const { Cell::new(0) };
	static DEALLOC_COUNT: Cell<usize> = const { Cell::new(0) };
	static BYTES_ALLOCATED: Cell<isize> = const { Cell::new(0) };
	static PEAK_BYTES: Cell<usize> = const { Cell::new(0) };
}

/// Applies `f` to a counter, doing nothing while thread-locals are torn down.
#[inline]
fn bump<T: Copy>(key: &'static std::thread::LocalKey<Cell<T>>, f: impl FnOnce(T) -> T) {
	let _ = key.try_with(|cell| cell.set(f(cell.get())));
}

#[inline]
fn read<T: Copy + Default>(key: &'static std::thread::LocalKey<Cell<T>>) -> T {
	key.try_with(Cell::get).unwrap_or_default()
}

fn grow(size: isize) {
	bump(&BYTES_ALLOCATED, |bytes| bytes + size);
	let current = read(&BYTES_ALLOCATED);
	if current > 0 {
		bump(&PEAK_BYTES, |peak| peak.max(current as usize));
	}
}

/// A tracking allocator that counts allocations and deallocations.
///
/// This wraps the system allocator and updates the calling thread's counters
/// on each allocation operation.
pub struct TrackingAllocator;

unsafe impl GlobalAlloc for TrackingAllocator {
	unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
		bump(&ALLOC_COUNT, |n| n + 1);
		grow(layout.size() as isize);
		System.alloc(layout)
	}

	unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
		bump(&DEALLOC_COUNT, |n| n + 1);
		grow(-(layout.size() as isize));
		System.dealloc(ptr, layout)
	}

	unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
		bump(&ALLOC_COUNT, |n| n + 1);
		grow(layout.size() as isize);
		System.alloc_zeroed(layout)
	}

	unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
		// A realloc is one more allocation as far as "did this allocate?" goes
		bump(&ALLOC_COUNT, |n| n + 1);
		bump(&DEALLOC_COUNT, |n| n + 1);
		grow(new_size as isize - layout.size() as isize);
		System.realloc(ptr, layout, new_size)
	}
}

/// Resets the current thread's counters to zero.
///
/// Call this at the beginning of a test to start fresh counting.
pub fn reset_counters() {
	bump(&ALLOC_COUNT, |_| 0);
	bump(&DEALLOC_COUNT, |_| 0);
	bump(&BYTES_ALLOCATED, |_| 0);
	bump(&PEAK_BYTES, |_| 0);
}

/// Returns the current thread's allocation statistics.
pub fn get_stats() -> AllocationStats {
	AllocationStats {
		alloc_count: read(&ALLOC_COUNT),
		dealloc_count: read(&DEALLOC_COUNT),
		bytes_allocated: read(&BYTES_ALLOCATED),
		peak_bytes: read(&PEAK_BYTES),
	}
}

/// Allocation statistics snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationStats {
	/// Total number of allocations since reset.
	pub alloc_count: usize,
	/// Total number of deallocations since reset.
	pub dealloc_count: usize,
	/// Net bytes allocated since reset. Negative if memory from before the
	/// reset was freed.
	pub bytes_allocated: isize,
	/// Peak net bytes since reset.
	pub peak_bytes: usize,
}

/// Checks that nothing allocated since the last reset is still live.
///
/// # Panics
///
/// Panics if there are unmatched allocations or bytes still allocated.
pub fn check_no_leaks() {
	let stats = get_stats();
	let diff = stats.alloc_count as isize - stats.dealloc_count as isize;

	if diff != 0 || stats.bytes_allocated != 0 {
		panic!(
			"Memory leak detected!\n\
			 Allocations: {}\n\
			 Deallocations: {}\n\
			 Difference: {}\n\
			 Bytes still allocated: {}",
			stats.alloc_count, stats.dealloc_count, diff, stats.bytes_allocated
		);
	}
}

/// Checks that the current thread has not allocated since the last reset.
///
/// # Panics
///
/// Panics if any allocation was made.
pub fn check_no_allocations() {
	let stats = get_stats();
	if stats.alloc_count != 0 {
		panic!(
			"Unexpected allocation!\n\
			 Allocations: {}\n\
			 Peak bytes: {}",
			stats.alloc_count, stats.peak_bytes
		);
	}
}
