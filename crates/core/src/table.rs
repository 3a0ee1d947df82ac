// Copyright 2025 Irreducible Inc.

use trellis_field::Field;
use trellis_utils::bail;

use crate::{
	cell::{CellId, ColumnKind, Variable},
	component::TableShape,
	error::Error,
};

/// The concrete execution trace: shape-sized column storage written during
/// the assignment pass.
///
/// Unwritten cells read as zero. Anchor-relative [`Variable`] references
/// resolve cyclically modulo `row_count`, the usual convention for
/// selector-based systems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceTable<F: Field> {
	shape: TableShape,
	witness: Vec<Vec<F>>,
	public: Vec<Vec<F>>,
	constant: Vec<Vec<F>>,
}

impl<F: Field> TraceTable<F> {
	pub fn new(shape: TableShape) -> Self {
		let columns = |count: usize| vec![vec![F::ZERO; shape.row_count]; count];
		Self {
			witness: columns(shape.witness_columns),
			public: columns(shape.public_columns),
			constant: columns(shape.constant_columns),
			shape,
		}
	}

	pub fn shape(&self) -> &TableShape {
		&self.shape
	}

	fn columns(&self, kind: ColumnKind) -> &[Vec<F>] {
		match kind {
			ColumnKind::Witness => self.witness.as_slice(),
			ColumnKind::PublicInput => self.public.as_slice(),
			ColumnKind::Constant => self.constant.as_slice(),
			ColumnKind::Selector => &[],
		}
	}

	pub fn get(&self, id: CellId) -> Result<F, Error> {
		let value = self
			.columns(id.kind)
			.get(id.column)
			.and_then(|column| column.get(id.row));
		match value {
			Some(&value) => Ok(value),
			None => bail!(Error::CellOutOfTable { cell: id }),
		}
	}

	pub(crate) fn set(&mut self, id: CellId, value: F) -> Result<(), Error> {
		let columns = match id.kind {
			ColumnKind::Witness => self.witness.as_mut_slice(),
			ColumnKind::PublicInput => self.public.as_mut_slice(),
			ColumnKind::Constant => self.constant.as_mut_slice(),
			ColumnKind::Selector => &mut [],
		};
		let cell = columns
			.get_mut(id.column)
			.and_then(|column| column.get_mut(id.row));
		match cell {
			Some(cell) => {
				*cell = value;
				Ok(())
			}
			None => bail!(Error::CellOutOfTable { cell: id }),
		}
	}

	/// Resolves a relative variable against an anchor row, wrapping at the
	/// table edges.
	pub fn resolve(&self, var: &Variable, anchor: usize) -> Result<F, Error> {
		let rows = self.shape.row_count as i64;
		let row = (anchor as i64 + var.offset).rem_euclid(rows) as usize;
		self.get(CellId {
			kind: var.kind,
			column: var.column,
			row,
		})
	}
}
