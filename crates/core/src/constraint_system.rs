// Copyright 2025 Irreducible Inc.

use getset::{CopyGetters, Getters};
use trellis_field::Field;
use trellis_utils::bail;

use crate::{
	cell::{CellId, Variable},
	component::TableShape,
	error::Error,
	expr::Expr,
	selector::RowSelector,
};

/// Index into [`ConstraintSystem::selectors`].
pub type SelectorId = usize;

/// Index into [`ConstraintSystem::tables`].
pub type TableId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
	/// Precomputed fixed contents, referenced by name; the contents live
	/// outside the trace and are supplied to validation separately.
	Static,
	/// Rows are live witness cells of the trace being built.
	Dynamic,
}

/// One polynomial constraint of a gate, named for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct NamedConstraint<F: Field> {
	#[get = "pub"]
	name: String,
	#[get = "pub"]
	poly: Expr<F, Variable>,
}

impl<F: Field> NamedConstraint<F> {
	pub fn new(name: String, poly: Expr<F, Variable>) -> Self {
		Self { name, poly }
	}
}

/// A set of polynomial constraints that must evaluate to zero on every row
/// its selector is active on.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct Gate<F: Field> {
	#[get_copy = "pub"]
	selector: SelectorId,
	#[get = "pub"]
	constraints: Vec<NamedConstraint<F>>,
}

impl<F: Field> Gate<F> {
	pub(crate) fn new(selector: SelectorId, constraints: Vec<NamedConstraint<F>>) -> Self {
		Self {
			selector,
			constraints,
		}
	}
}

/// One lookup obligation: on active rows the evaluated tuple must match some
/// row of the referenced table.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct LookupEntry<F: Field> {
	#[get_copy = "pub"]
	table: TableId,
	#[get = "pub"]
	tuple: Vec<Expr<F, Variable>>,
}

impl<F: Field> LookupEntry<F> {
	pub(crate) fn new(table: TableId, tuple: Vec<Expr<F, Variable>>) -> Self {
		Self { table, tuple }
	}
}

/// All lookups sharing one selector.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct LookupGate<F: Field> {
	#[get_copy = "pub"]
	selector: SelectorId,
	#[get = "pub"]
	entries: Vec<LookupEntry<F>>,
}

impl<F: Field> LookupGate<F> {
	pub(crate) fn new(selector: SelectorId, entries: Vec<LookupEntry<F>>) -> Self {
		Self { selector, entries }
	}
}

/// One region of witness columns whose active rows are rows of a dynamic
/// table.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct DynamicInstance {
	#[get = "pub"]
	columns: Vec<usize>,
	#[get_copy = "pub"]
	selector: SelectorId,
}

impl DynamicInstance {
	pub(crate) fn new(columns: Vec<usize>, selector: SelectorId) -> Self {
		Self { columns, selector }
	}
}

/// A named lookup table of the flushed system. Static tables carry no
/// instances; dynamic tables carry the trace regions that define their rows.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct TableInfo {
	#[get = "pub"]
	name: String,
	#[get_copy = "pub"]
	kind: TableKind,
	#[get = "pub"]
	instances: Vec<DynamicInstance>,
}

impl TableInfo {
	pub(crate) fn new(name: String, kind: TableKind, instances: Vec<DynamicInstance>) -> Self {
		Self {
			name,
			kind,
			instances,
		}
	}
}

/// The flushed gate/selector/lookup bundle: the boundary artifact consumed
/// by the external proving and verification protocol.
///
/// Bit-reproducible for a given component input and optimizer version:
/// selectors and gates are numbered in first-occurrence order of their row
/// sets, and every list preserves registration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintSystem<F: Field> {
	pub shape: TableShape,
	pub selectors: Vec<RowSelector>,
	pub gates: Vec<Gate<F>>,
	pub lookup_gates: Vec<LookupGate<F>>,
	pub copy_constraints: Vec<(CellId, CellId)>,
	pub tables: Vec<TableInfo>,
}

impl<F: Field> ConstraintSystem<F> {
	pub fn n_selectors(&self) -> usize {
		self.selectors.len()
	}

	pub fn table_id(&self, name: &str) -> Option<TableId> {
		self.tables.iter().position(|info| info.name() == name)
	}

	/// Materializes one selector as a 0/1 column of the table's height, for
	/// the downstream proof system.
	pub fn selector_column(&self, id: SelectorId) -> Result<Vec<F>, Error> {
		let Some(selector) = self.selectors.get(id) else {
			bail!(Error::ColumnOutOfRange {
				scope: "selector columns".to_string(),
				kind: crate::cell::ColumnKind::Selector,
				column: id,
				width: self.selectors.len(),
			});
		};
		let mut column = vec![F::ZERO; self.shape.row_count];
		for row in selector.rows() {
			column[row] = F::ONE;
		}
		Ok(column)
	}

	pub fn selector_columns(&self) -> Result<Vec<Vec<F>>, Error> {
		(0..self.selectors.len())
			.map(|id| self.selector_column(id))
			.collect()
	}
}
