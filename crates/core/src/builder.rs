// Copyright 2025 Irreducible Inc.

use std::{cell::RefCell, collections::HashMap, marker::PhantomData, rc::Rc};

use trellis_field::Field;
use trellis_utils::bail;

use crate::{
	cell::{CellId, ColumnKind},
	component::TableShape,
	constraint_system::TableId,
	context::Context,
	error::Error,
	occupancy::Occupancy,
	registry::ConstraintRegistry,
	stage::{Assignment, Constraints, Stage},
	table::TraceTable,
};

/// Root-deduplicated constant cells.
///
/// Constants are stage-independent: allocating the same value twice returns
/// the same cell in both passes, which keeps the written-cell sets of the two
/// stages aligned.
#[derive(Debug)]
pub(crate) struct ConstantPool<F: Field> {
	dedup: HashMap<F, CellId>,
	next: usize,
}

impl<F: Field> ConstantPool<F> {
	fn new() -> Self {
		Self {
			dedup: HashMap::new(),
			next: 0,
		}
	}

	/// Returns the cell holding `value` and whether it was freshly placed.
	pub fn allocate(&mut self, value: F, shape: &TableShape) -> Result<(CellId, bool), Error> {
		if let Some(&id) = self.dedup.get(&value) {
			return Ok((id, false));
		}
		let rows = shape.usable_row_count;
		let column = if rows == 0 { usize::MAX } else { self.next / rows };
		if column >= shape.constant_columns {
			bail!(Error::WindowExhausted {
				scope: "constants".to_string(),
				columns: shape.constant_columns,
				rows,
			});
		}
		let id = CellId {
			kind: ColumnKind::Constant,
			column,
			row: self.next % rows,
		};
		self.next += 1;
		self.dedup.insert(value, id);
		Ok((id, true))
	}
}

/// State shared by every context derived from one builder.
#[derive(Debug)]
pub(crate) struct RootState<F: Field> {
	pub shape: TableShape,
	pub table: Option<TraceTable<F>>,
	pub registry: ConstraintRegistry<F>,
	pub occupancy: Occupancy,
	pub constants: ConstantPool<F>,
}

/// The top-level wrapper owning one compilation pass.
///
/// A builder is created per stage: the assignment-stage builder owns the
/// trace table being written, the constraints-stage builder owns the
/// registry being accumulated. The two passes share no mutable state and may
/// run in either order.
#[derive(Debug)]
pub struct CircuitBuilder<F: Field, S: Stage<F>> {
	state: Rc<RefCell<RootState<F>>>,
	_stage: PhantomData<S>,
}

impl<F: Field, S: Stage<F>> CircuitBuilder<F, S> {
	fn with_table(shape: TableShape, table: Option<TraceTable<F>>) -> Self {
		let state = RootState {
			table,
			registry: ConstraintRegistry::new(shape),
			occupancy: Occupancy::new(&shape),
			constants: ConstantPool::new(),
			shape,
		};
		Self {
			state: Rc::new(RefCell::new(state)),
			_stage: PhantomData,
		}
	}

	pub fn shape(&self) -> TableShape {
		self.state.borrow().shape
	}

	/// A context spanning the whole usable table. Contexts borrow the root
	/// state for their lifetime; drop them before finishing the builder.
	pub fn root_context(&mut self) -> Context<F, S> {
		Context::root(self.state.clone())
	}

	/// Reserves a name for a precomputed table that lookup calls may
	/// reference. Names are write-once across static and dynamic tables.
	pub fn declare_static_table(&mut self, name: &str) -> Result<TableId, Error> {
		self.state
			.borrow_mut()
			.registry
			.tables_mut()
			.declare_static(name)
	}

	/// All cells written so far, in canonical order. The coordinate-parity
	/// property states this is identical across the two passes of one
	/// component.
	pub fn written_cells(&self) -> Vec<CellId> {
		self.state.borrow().occupancy.written_cells()
	}
}

impl<F: Field> CircuitBuilder<F, Assignment> {
	pub fn new(shape: TableShape) -> Self {
		Self::with_table(shape, Some(TraceTable::new(shape)))
	}

	/// Extracts the witness table produced by the pass.
	pub fn take_table(&mut self) -> Result<TraceTable<F>, Error> {
		match self.state.borrow_mut().table.take() {
			Some(table) => Ok(table),
			None => bail!(Error::WitnessUnavailable),
		}
	}
}

impl<F: Field> CircuitBuilder<F, Constraints> {
	pub fn new(shape: TableShape) -> Self {
		Self::with_table(shape, None)
	}

	/// Extracts the accumulated registry. Fails while any context still
	/// holds a handle to the root state.
	pub fn into_registry(self) -> Result<ConstraintRegistry<F>, Error> {
		match Rc::into_inner(self.state) {
			Some(state) => Ok(state.into_inner().registry),
			None => bail!(Error::StateShared),
		}
	}
}
