// Copyright 2025 Irreducible Inc.

use std::{cell::RefCell, marker::PhantomData, rc::Rc};

use trellis_field::Field;
use trellis_utils::{bail, ensure};

use crate::{
	builder::RootState,
	cell::{Cell, CellId, ColumnKind},
	constraint_system::TableId,
	error::Error,
	registry::DynamicInstanceDef,
	selector::RowSelector,
	stage::Stage,
};

/// A rectangular window of the table a component may write into.
///
/// A context owns an ordered list of absolute witness columns, a row range
/// inside the parent table, and a handle to the root-level registries shared
/// across the whole context tree. Sibling subcontexts carved from disjoint
/// column subsets can never write the same cell, which is what lets nested
/// components compose without manual coordinate bookkeeping.
///
/// All coordinates taken by context methods are context-relative: column
/// indices index this context's own column list and rows count from the top
/// of its window. Absolute coordinates appear only in [`CellId`]s.
#[derive(Debug)]
pub struct Context<F: Field, S: Stage<F>> {
	state: Rc<RefCell<RootState<F>>>,
	namespace: String,
	witness_cols: Vec<usize>,
	public_width: usize,
	row_start: usize,
	row_len: usize,
	cursor: usize,
	_stage: PhantomData<S>,
}

impl<F: Field, S: Stage<F>> Context<F, S> {
	pub(crate) fn root(state: Rc<RefCell<RootState<F>>>) -> Self {
		let shape = state.borrow().shape;
		Self {
			state,
			namespace: String::new(),
			witness_cols: (0..shape.witness_columns).collect(),
			public_width: shape.public_columns,
			row_start: 0,
			row_len: shape.usable_row_count,
			cursor: 0,
			_stage: PhantomData,
		}
	}

	/// The namespace path of this context, used in scoped constraint names
	/// and error reports.
	pub fn namespace(&self) -> &str {
		&self.namespace
	}

	pub fn columns(&self) -> usize {
		self.witness_cols.len()
	}

	pub fn rows(&self) -> usize {
		self.row_len
	}

	fn scope(&self) -> String {
		if self.namespace.is_empty() {
			"root".to_string()
		} else {
			self.namespace.clone()
		}
	}

	fn scoped_name(&self, name: impl ToString) -> String {
		let name = name.to_string();
		if self.namespace.is_empty() {
			name
		} else {
			format!("{}::{name}", self.namespace)
		}
	}

	fn witness_column(&self, column: usize) -> Result<usize, Error> {
		match self.witness_cols.get(column) {
			Some(&absolute) => Ok(absolute),
			None => bail!(Error::ColumnOutOfRange {
				scope: self.scope(),
				kind: ColumnKind::Witness,
				column,
				width: self.witness_cols.len(),
			}),
		}
	}

	fn window_row(&self, row: usize) -> Result<usize, Error> {
		ensure!(
			row < self.row_len,
			Error::RowOutOfRange {
				scope: self.scope(),
				row,
				rows: self.row_len,
			}
		);
		Ok(self.row_start + row)
	}

	/// Validates an inclusive context-relative row range and returns its
	/// absolute anchor and selector.
	fn window_range(&self, row_from: usize, row_to: usize) -> Result<(usize, RowSelector), Error> {
		ensure!(
			row_from <= row_to,
			Error::EmptyRowRange {
				scope: self.scope(),
			}
		);
		let last = self.window_row(row_to)?;
		let anchor = self.row_start + row_from;
		Ok((anchor, RowSelector::range(anchor, last - anchor + 1)))
	}

	fn place(&mut self, id: CellId, value: S::Value) -> Result<Cell<F, S>, Error> {
		let state = &mut *self.state.borrow_mut();
		if !state.occupancy.insert(id) {
			bail!(Error::CellOccupied {
				scope: self.scope(),
				cell: id,
			});
		}
		S::store(state.table.as_mut(), id, &value)?;
		Ok(Cell::new(id, S::bind(id, &value)))
	}

	/// Places `value` in the next free cell of this context's window.
	///
	/// The cursor walks the window column-major (the rows of a column, then
	/// the next column), skipping cells taken by explicit [`Self::alloc_at`]
	/// calls. Used for a component's private intermediate values.
	pub fn alloc(&mut self, value: S::Value) -> Result<Cell<F, S>, Error> {
		let total = self.witness_cols.len() * self.row_len;
		while self.cursor < total {
			let column = self.witness_cols[self.cursor / self.row_len];
			let row = self.row_start + self.cursor % self.row_len;
			self.cursor += 1;
			let id = CellId {
				kind: ColumnKind::Witness,
				column,
				row,
			};
			let already_taken = {
				let state = self.state.borrow();
				state.occupancy.contains(id)
			};
			if !already_taken {
				return self.place(id, value);
			}
		}
		bail!(Error::WindowExhausted {
			scope: self.scope(),
			columns: self.witness_cols.len(),
			rows: self.row_len,
		})
	}

	/// Places `value` at an exact cell of this context's window. Used when a
	/// fixed layout is required for cross-component wiring.
	pub fn alloc_at(
		&mut self,
		value: S::Value,
		column: usize,
		row: usize,
	) -> Result<Cell<F, S>, Error> {
		let id = CellId {
			kind: ColumnKind::Witness,
			column: self.witness_column(column)?,
			row: self.window_row(row)?,
		};
		self.place(id, value)
	}

	/// Places a public-input value at a contractually fixed position.
	pub fn alloc_public(
		&mut self,
		value: S::Value,
		column: usize,
		row: usize,
	) -> Result<Cell<F, S>, Error> {
		ensure!(
			column < self.public_width,
			Error::ColumnOutOfRange {
				scope: self.scope(),
				kind: ColumnKind::PublicInput,
				column,
				width: self.public_width,
			}
		);
		let id = CellId {
			kind: ColumnKind::PublicInput,
			column,
			row: self.window_row(row)?,
		};
		self.place(id, value)
	}

	/// Returns a cell holding `value` in the constant columns, reusing the
	/// cell if the value was allocated before. Constants are concrete in
	/// both stages.
	pub fn alloc_constant(&mut self, value: F) -> Result<Cell<F, S>, Error> {
		let state = &mut *self.state.borrow_mut();
		let (id, fresh) = state.constants.allocate(value, &state.shape)?;
		if fresh {
			state.occupancy.insert(id);
			if let Some(table) = state.table.as_mut() {
				table.set(id, value)?;
			}
		}
		let lifted = S::constant(value);
		Ok(Cell::new(id, S::bind(id, &lifted)))
	}

	/// Carves a child window out of this context.
	///
	/// `columns` lists witness columns of *this* context (indices relative
	/// to its own column list) that the child may allocate into; the row
	/// window `[row_start, row_start + row_len)` is likewise relative. The
	/// child shares the root registries. Public and constant columns pass
	/// through unchanged.
	pub fn subcontext(
		&mut self,
		name: impl ToString,
		columns: &[usize],
		row_start: usize,
		row_len: usize,
	) -> Result<Context<F, S>, Error> {
		let namespace = self.scoped_name(name);
		ensure!(
			row_len > 0,
			Error::EmptyRowRange {
				scope: namespace,
			}
		);
		ensure!(
			row_start + row_len <= self.row_len,
			Error::RowOutOfRange {
				scope: namespace,
				row: row_start + row_len - 1,
				rows: self.row_len,
			}
		);
		let mut absolute = Vec::with_capacity(columns.len());
		for &column in columns {
			let abs = self.witness_column(column)?;
			if absolute.contains(&abs) {
				bail!(Error::DuplicateColumn {
					scope: namespace,
					column,
				});
			}
			absolute.push(abs);
		}
		tracing::trace!(
			namespace = %namespace,
			columns = absolute.len(),
			rows = row_len,
			"subcontext"
		);
		Ok(Context {
			state: self.state.clone(),
			namespace,
			witness_cols: absolute,
			public_width: self.public_width,
			row_start: self.row_start + row_start,
			row_len,
			cursor: 0,
			_stage: PhantomData,
		})
	}

	/// Registers `expr == 0` anchored at the given window row.
	pub fn constrain(
		&mut self,
		name: impl ToString,
		expr: S::Value,
		row: usize,
	) -> Result<(), Error> {
		let anchor = self.window_row(row)?;
		let name = self.scoped_name(name);
		let state = &mut *self.state.borrow_mut();
		S::record_constraint(
			&mut state.registry,
			&name,
			RowSelector::single(anchor),
			anchor,
			&expr,
		)
	}

	/// Registers the same relation across a contiguous inclusive range of
	/// window rows in one call, producing a single selector covering the
	/// whole run. `expr` is relativized against `row_from`, so cell
	/// references shift along with the anchor; this is what lets one gate
	/// cover a repeating structural pattern.
	///
	/// Under the assignment stage only the concrete value the caller built
	/// (the anchor row's cells) is checked; the remaining rows are covered
	/// by `validate_witness`.
	pub fn relative_constrain(
		&mut self,
		name: impl ToString,
		expr: S::Value,
		row_from: usize,
		row_to: usize,
	) -> Result<(), Error> {
		let (anchor, rows) = self.window_range(row_from, row_to)?;
		let name = self.scoped_name(name);
		let state = &mut *self.state.borrow_mut();
		S::record_constraint(&mut state.registry, &name, rows, anchor, &expr)
	}

	/// Registers an equality obligation between two cells not already tied
	/// together by a polynomial constraint; the wiring mechanism between
	/// non-adjacent regions of the table.
	pub fn copy_constrain(&mut self, a: &Cell<F, S>, b: &Cell<F, S>) -> Result<(), Error> {
		let state = &mut *self.state.borrow_mut();
		S::record_copy(&mut state.registry, state.table.as_ref(), a.id(), b.id())
	}

	/// Registers a lookup of `tuple` into the named table, anchored at the
	/// given window row.
	pub fn lookup(
		&mut self,
		table: &str,
		tuple: Vec<S::Value>,
		row: usize,
	) -> Result<(), Error> {
		let anchor = self.window_row(row)?;
		let state = &mut *self.state.borrow_mut();
		S::record_lookup(
			&mut state.registry,
			table,
			RowSelector::single(anchor),
			anchor,
			&tuple,
		)
	}

	/// Ranged form of [`Self::lookup`]; one selector covers the whole run.
	pub fn relative_lookup(
		&mut self,
		table: &str,
		tuple: Vec<S::Value>,
		row_from: usize,
		row_to: usize,
	) -> Result<(), Error> {
		let (anchor, rows) = self.window_range(row_from, row_to)?;
		let state = &mut *self.state.borrow_mut();
		S::record_lookup(&mut state.registry, table, rows, anchor, &tuple)
	}

	/// Declares that the cells in the given witness columns over the given
	/// row range constitute a named dynamic table other components may
	/// reference by name. Each name may be defined exactly once.
	pub fn lookup_table(
		&mut self,
		name: &str,
		columns: &[usize],
		row_from: usize,
		row_to: usize,
	) -> Result<TableId, Error> {
		self.multi_lookup_table(name, &[columns.to_vec()], row_from, row_to)
	}

	/// Multi-instance form of [`Self::lookup_table`]: several column lists
	/// over the same row range define rows of one logical table.
	pub fn multi_lookup_table(
		&mut self,
		name: &str,
		column_lists: &[Vec<usize>],
		row_from: usize,
		row_to: usize,
	) -> Result<TableId, Error> {
		let (_, rows) = self.window_range(row_from, row_to)?;
		let mut instances = Vec::with_capacity(column_lists.len());
		for columns in column_lists {
			let absolute = columns
				.iter()
				.map(|&column| self.witness_column(column))
				.collect::<Result<Vec<_>, _>>()?;
			instances.push(DynamicInstanceDef {
				columns: absolute,
				rows: rows.clone(),
			});
		}
		let state = &mut *self.state.borrow_mut();
		state.registry.tables_mut().register_dynamic(name, instances)
	}
}
