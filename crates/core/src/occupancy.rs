// Copyright 2025 Irreducible Inc.

use crate::{
	cell::{CellId, ColumnKind},
	component::TableShape,
};

/// One bit per row of a single column.
#[derive(Debug, Clone)]
struct ColumnBitmap {
	words: Vec<u64>,
}

impl ColumnBitmap {
	fn new(rows: usize) -> Self {
		Self {
			words: vec![0; rows.div_ceil(64)],
		}
	}

	/// Marks `row` as written. Returns `false` if it already was.
	fn insert(&mut self, row: usize) -> bool {
		let mask = 1u64 << (row % 64);
		let word = &mut self.words[row / 64];
		if *word & mask != 0 {
			return false;
		}
		*word |= mask;
		true
	}

	fn contains(&self, row: usize) -> bool {
		self.words[row / 64] & (1u64 << (row % 64)) != 0
	}

	fn rows(&self, bound: usize) -> impl Iterator<Item = usize> + '_ {
		(0..bound).filter(|&row| self.contains(row))
	}
}

/// Written-cell tracking for one table, shared by every context derived from
/// its root.
///
/// Both build stages update it identically, so comparing the written-cell
/// sets of the two passes checks coordinate parity. It is also what keeps the
/// cursor and explicit allocation paths from colliding.
#[derive(Debug, Clone)]
pub(crate) struct Occupancy {
	rows: usize,
	witness: Vec<ColumnBitmap>,
	public: Vec<ColumnBitmap>,
	constant: Vec<ColumnBitmap>,
}

impl Occupancy {
	pub fn new(shape: &TableShape) -> Self {
		let column = |count: usize| vec![ColumnBitmap::new(shape.row_count); count];
		Self {
			rows: shape.row_count,
			witness: column(shape.witness_columns),
			public: column(shape.public_columns),
			constant: column(shape.constant_columns),
		}
	}

	fn columns(&self, kind: ColumnKind) -> &[ColumnBitmap] {
		match kind {
			ColumnKind::Witness => self.witness.as_slice(),
			ColumnKind::PublicInput => self.public.as_slice(),
			ColumnKind::Constant => self.constant.as_slice(),
			ColumnKind::Selector => &[],
		}
	}

	/// Marks `id` as written. Returns `false` if it already was. The caller
	/// is responsible for bounds-checking `id` against the table shape.
	pub fn insert(&mut self, id: CellId) -> bool {
		debug_assert!(id.row < self.rows);
		let columns = match id.kind {
			ColumnKind::Witness => &mut self.witness,
			ColumnKind::PublicInput => &mut self.public,
			ColumnKind::Constant => &mut self.constant,
			ColumnKind::Selector => unreachable!("selector columns are never allocated into"),
		};
		columns[id.column].insert(id.row)
	}

	pub fn contains(&self, id: CellId) -> bool {
		self.columns(id.kind)
			.get(id.column)
			.is_some_and(|column| column.contains(id.row))
	}

	/// All written cells in (kind, column, row) order.
	pub fn written_cells(&self) -> Vec<CellId> {
		let kinds = [
			ColumnKind::Witness,
			ColumnKind::PublicInput,
			ColumnKind::Constant,
		];
		kinds
			.into_iter()
			.flat_map(|kind| {
				self.columns(kind).iter().enumerate().flat_map(move |(column, bitmap)| {
					bitmap.rows(self.rows).map(move |row| CellId { kind, column, row })
				})
			})
			.collect()
	}
}
