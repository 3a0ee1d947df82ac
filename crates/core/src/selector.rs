// Copyright 2025 Irreducible Inc.

use std::fmt;

use itertools::Itertools;

/// A contiguous run of row indices, `[start, start + len)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowRun {
	pub start: usize,
	pub len: usize,
}

/// An immutable set of absolute row indices on which one logical gate applies.
///
/// The representation is a canonical sorted run-length encoding, so structural
/// equality and hashing are cheap even for large sparse selectors; two
/// selectors built from the same row set compare equal regardless of the
/// order rows were supplied in. This is the registry's deduplication key: two
/// constraint groups with equal `RowSelector`s share one selector column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowSelector {
	runs: Vec<RowRun>,
}

impl RowSelector {
	pub fn single(row: usize) -> Self {
		Self::range(row, 1)
	}

	pub fn range(start: usize, len: usize) -> Self {
		let runs = if len == 0 {
			Vec::new()
		} else {
			vec![RowRun { start, len }]
		};
		Self { runs }
	}

	/// Builds the canonical encoding of an arbitrary collection of rows.
	/// Duplicates are ignored.
	pub fn from_rows(rows: impl IntoIterator<Item = usize>) -> Self {
		let runs = rows
			.into_iter()
			.sorted()
			.dedup()
			.map(|row| RowRun { start: row, len: 1 })
			.coalesce(|lhs, rhs| {
				if lhs.start + lhs.len == rhs.start {
					Ok(RowRun {
						start: lhs.start,
						len: lhs.len + rhs.len,
					})
				} else {
					Err((lhs, rhs))
				}
			})
			.collect();
		Self { runs }
	}

	pub fn runs(&self) -> &[RowRun] {
		&self.runs
	}

	/// The number of rows in the set.
	pub fn len(&self) -> usize {
		self.runs.iter().map(|run| run.len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.runs.is_empty()
	}

	pub fn contains(&self, row: usize) -> bool {
		// Runs are sorted and disjoint.
		match self.runs.binary_search_by_key(&row, |run| run.start) {
			Ok(_) => true,
			Err(0) => false,
			Err(idx) => {
				let run = &self.runs[idx - 1];
				row < run.start + run.len
			}
		}
	}

	/// Iterates the rows in increasing order.
	pub fn rows(&self) -> impl Iterator<Item = usize> + '_ {
		self.runs.iter().flat_map(|run| run.start..run.start + run.len)
	}

	pub fn max_row(&self) -> Option<usize> {
		self.runs.last().map(|run| run.start + run.len - 1)
	}
}

impl fmt::Display for RowSelector {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{{")?;
		for (idx, run) in self.runs.iter().enumerate() {
			if idx > 0 {
				write!(f, ", ")?;
			}
			if run.len == 1 {
				write!(f, "{}", run.start)?;
			} else {
				write!(f, "{}..{}", run.start, run.start + run.len)?;
			}
		}
		write!(f, "}}")
	}
}

#[cfg(test)]
mod tests {
	use std::collections::BTreeSet;

	use proptest::prelude::*;

	use super::*;

	#[test]
	fn test_canonicalization() {
		let selector = RowSelector::from_rows([7, 3, 4, 5, 3, 9]);
		assert_eq!(
			selector.runs(),
			&[
				RowRun { start: 3, len: 3 },
				RowRun { start: 7, len: 1 },
				RowRun { start: 9, len: 1 },
			]
		);
		assert_eq!(selector.len(), 5);
		assert_eq!(selector.max_row(), Some(9));
	}

	#[test]
	fn test_order_independence() {
		let fwd = RowSelector::from_rows([1, 2, 3, 10]);
		let rev = RowSelector::from_rows([10, 3, 2, 1]);
		assert_eq!(fwd, rev);
		assert_eq!(fwd, RowSelector::from_rows([1, 2, 3, 10, 2]));
	}

	#[test]
	fn test_contains() {
		let selector = RowSelector::from_rows([0, 1, 2, 8]);
		assert!(selector.contains(0));
		assert!(selector.contains(2));
		assert!(!selector.contains(3));
		assert!(selector.contains(8));
		assert!(!selector.contains(9));
	}

	#[test]
	fn test_range_matches_from_rows() {
		assert_eq!(RowSelector::range(4, 3), RowSelector::from_rows(4..7));
		assert!(RowSelector::range(4, 0).is_empty());
	}

	proptest! {
		#[test]
		fn prop_roundtrip(rows in prop::collection::btree_set(0usize..512, 0..64)) {
			let selector = RowSelector::from_rows(rows.iter().copied());
			let back: BTreeSet<usize> = selector.rows().collect();
			prop_assert_eq!(&back, &rows);
			prop_assert_eq!(selector.len(), rows.len());
			for row in 0..512 {
				prop_assert_eq!(selector.contains(row), rows.contains(&row));
			}
		}
	}
}
