// Copyright 2025 Irreducible Inc.

use std::collections::HashMap;

use trellis_field::Field;
use trellis_utils::{ensure, SparseIndex};

use crate::{
	cell::{CellId, Variable},
	component::TableShape,
	constraint_system::{TableId, TableKind},
	error::Error,
	expr::Expr,
	selector::RowSelector,
};

/// One registered `expr == 0` obligation, as accumulated at a call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawConstraint<F: Field> {
	pub name: String,
	pub rows: RowSelector,
	pub poly: Expr<F, Variable>,
}

/// One registered lookup obligation. The table is referenced by name;
/// resolution to a [`TableId`] happens at flush time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLookup<F: Field> {
	pub table: String,
	pub rows: RowSelector,
	pub tuple: Vec<Expr<F, Variable>>,
}

/// A trace region defining rows of a dynamic table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicInstanceDef {
	pub columns: Vec<usize>,
	pub rows: RowSelector,
}

/// Name-keyed directory of lookup tables: static names are reserved, dynamic
/// names are registered with their defining trace regions. Each name is
/// write-once.
#[derive(Debug, Clone, Default)]
pub struct TableDirectory {
	ids: HashMap<String, TableId>,
	entries: Vec<(String, TableKind)>,
	dynamic_defs: SparseIndex<Vec<DynamicInstanceDef>>,
}

impl TableDirectory {
	fn insert(&mut self, name: &str, kind: TableKind) -> Result<TableId, Error> {
		ensure!(
			!self.ids.contains_key(name),
			Error::DuplicateTable {
				name: name.to_string(),
			}
		);
		let id = self.entries.len();
		self.ids.insert(name.to_string(), id);
		self.entries.push((name.to_string(), kind));
		Ok(id)
	}

	/// Reserves an index for a static table.
	pub fn declare_static(&mut self, name: &str) -> Result<TableId, Error> {
		self.insert(name, TableKind::Static)
	}

	/// Registers a dynamic table with its defining trace regions.
	pub fn register_dynamic(
		&mut self,
		name: &str,
		instances: Vec<DynamicInstanceDef>,
	) -> Result<TableId, Error> {
		ensure!(
			!instances.is_empty(),
			Error::EmptyRowRange {
				scope: format!("dynamic table \"{name}\""),
			}
		);
		let arity = instances[0].columns.len();
		for instance in &instances {
			ensure!(
				instance.columns.len() == arity,
				Error::TableArityMismatch {
					name: name.to_string(),
					expected: arity,
					actual: instance.columns.len(),
				}
			);
		}
		let id = self.insert(name, TableKind::Dynamic)?;
		self.dynamic_defs.set(id, instances);
		Ok(id)
	}

	pub fn resolve(&self, name: &str) -> Option<TableId> {
		self.ids.get(name).copied()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn name(&self, id: TableId) -> Option<&str> {
		self.entries.get(id).map(|(name, _)| name.as_str())
	}

	pub fn kind(&self, id: TableId) -> Option<TableKind> {
		self.entries.get(id).map(|(_, kind)| *kind)
	}

	pub fn dynamic_def(&self, id: TableId) -> Option<&[DynamicInstanceDef]> {
		self.dynamic_defs.get(id).map(Vec::as_slice)
	}
}

/// The raw accumulation registry shared by every context of one constraints
/// pass.
///
/// Entries are kept in registration order; grouping identical row sets under
/// shared selectors is the optimizer's job, so a construction pass with
/// thousands of call sites stays a cheap append-only walk.
#[derive(Debug, Clone)]
pub struct ConstraintRegistry<F: Field> {
	shape: TableShape,
	constraints: Vec<RawConstraint<F>>,
	copies: Vec<(CellId, CellId)>,
	lookups: Vec<RawLookup<F>>,
	tables: TableDirectory,
}

impl<F: Field> ConstraintRegistry<F> {
	pub fn new(shape: TableShape) -> Self {
		Self {
			shape,
			constraints: Vec::new(),
			copies: Vec::new(),
			lookups: Vec::new(),
			tables: TableDirectory::default(),
		}
	}

	pub fn shape(&self) -> &TableShape {
		&self.shape
	}

	pub fn constraints(&self) -> &[RawConstraint<F>] {
		&self.constraints
	}

	pub fn copies(&self) -> &[(CellId, CellId)] {
		&self.copies
	}

	pub fn lookups(&self) -> &[RawLookup<F>] {
		&self.lookups
	}

	pub fn tables(&self) -> &TableDirectory {
		&self.tables
	}

	pub fn tables_mut(&mut self) -> &mut TableDirectory {
		&mut self.tables
	}

	pub fn push_constraint(
		&mut self,
		name: String,
		rows: RowSelector,
		poly: Expr<F, Variable>,
	) -> Result<(), Error> {
		ensure!(
			!rows.is_empty(),
			Error::EmptyRowRange {
				scope: name,
			}
		);
		self.constraints.push(RawConstraint { name, rows, poly });
		Ok(())
	}

	pub fn push_copy(&mut self, a: CellId, b: CellId) {
		self.copies.push((a, b));
	}

	pub fn push_lookup(
		&mut self,
		table: String,
		rows: RowSelector,
		tuple: Vec<Expr<F, Variable>>,
	) -> Result<(), Error> {
		ensure!(
			!rows.is_empty(),
			Error::EmptyRowRange {
				scope: format!("lookup into \"{table}\""),
			}
		);
		self.lookups.push(RawLookup { table, rows, tuple });
		Ok(())
	}

	/// Destructures into the flush inputs.
	#[allow(clippy::type_complexity)]
	pub(crate) fn into_parts(
		self,
	) -> (
		TableShape,
		Vec<RawConstraint<F>>,
		Vec<(CellId, CellId)>,
		Vec<RawLookup<F>>,
		TableDirectory,
	) {
		(
			self.shape,
			self.constraints,
			self.copies,
			self.lookups,
			self.tables,
		)
	}
}
