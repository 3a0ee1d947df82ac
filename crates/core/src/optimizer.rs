// Copyright 2025 Irreducible Inc.

//! Flushes a raw constraint registry into the minimized gate/selector/lookup
//! bundle.
//!
//! A constraints pass with many call sites appends one raw entry per call;
//! emitting a gate per entry would blow up the proof. The optimizer groups
//! entries by their row sets so that constraints with identical
//! [`RowSelector`]s end under one selector column and one gate, and lookup
//! gates and dynamic tables reuse selectors already allocated for the same
//! rows. Merging preserves every entry and is deterministic: selectors and
//! gates are numbered in first-occurrence order of their row sets, and
//! constraint order within a gate is registration order.

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::{debug, instrument};
use trellis_field::Field;
use trellis_utils::bail;

use crate::{
	constraint_system::{
		ConstraintSystem, DynamicInstance, Gate, LookupEntry, LookupGate, NamedConstraint,
		SelectorId, TableInfo, TableKind,
	},
	error::Error,
	registry::{ConstraintRegistry, RawConstraint},
	selector::RowSelector,
};

/// Entries are pre-grouped in parallel batches of this size, then batches are
/// merged in order. Any batch size preserves the output; this one just keeps
/// per-task work large enough to amortize scheduling.
const BATCH_SIZE: usize = 1024;

/// Interns row sets, assigning selector ids in first-use order.
#[derive(Default)]
struct SelectorInterner {
	selectors: Vec<RowSelector>,
	ids: HashMap<RowSelector, SelectorId>,
}

impl SelectorInterner {
	fn intern(&mut self, rows: RowSelector) -> SelectorId {
		if let Some(&id) = self.ids.get(&rows) {
			return id;
		}
		let id = self.selectors.len();
		self.ids.insert(rows.clone(), id);
		self.selectors.push(rows);
		id
	}
}

/// Groups a batch of raw constraints by row set, preserving first-occurrence
/// group order and in-group registration order.
fn group_batch<F: Field>(
	batch: &[RawConstraint<F>],
) -> Vec<(RowSelector, Vec<NamedConstraint<F>>)> {
	let mut order: Vec<(RowSelector, Vec<NamedConstraint<F>>)> = Vec::new();
	let mut index: HashMap<RowSelector, usize> = HashMap::new();
	for entry in batch {
		let constraint = NamedConstraint::new(entry.name.clone(), entry.poly.clone());
		match index.get(&entry.rows) {
			Some(&at) => order[at].1.push(constraint),
			None => {
				index.insert(entry.rows.clone(), order.len());
				order.push((entry.rows.clone(), vec![constraint]));
			}
		}
	}
	order
}

/// Post-processes the registry accumulated by a constraints pass into an
/// equivalent but minimized [`ConstraintSystem`].
#[instrument(skip_all, fields(
	constraints = registry.constraints().len(),
	lookups = registry.lookups().len(),
	copies = registry.copies().len(),
))]
pub fn optimize<F: Field>(registry: ConstraintRegistry<F>) -> Result<ConstraintSystem<F>, Error> {
	let (mut shape, constraints, copies, lookups, tables) = registry.into_parts();
	let raw_constraints = constraints.len();

	let mut interner = SelectorInterner::default();

	// Gates: parallel pre-grouping per batch, then an ordered merge. The
	// merge walks batches left to right, so global numbering matches a
	// sequential pass over the original entry list.
	let batched: Vec<_> = constraints
		.par_chunks(BATCH_SIZE)
		.map(group_batch)
		.collect();
	let mut gate_groups: Vec<(RowSelector, Vec<NamedConstraint<F>>)> = Vec::new();
	let mut gate_index: HashMap<RowSelector, usize> = HashMap::new();
	for batch in batched {
		for (rows, mut group) in batch {
			match gate_index.get(&rows) {
				Some(&at) => gate_groups[at].1.append(&mut group),
				None => {
					gate_index.insert(rows.clone(), gate_groups.len());
					gate_groups.push((rows, group));
				}
			}
		}
	}
	let gates = gate_groups
		.into_iter()
		.map(|(rows, constraints)| Gate::new(interner.intern(rows), constraints))
		.collect::<Vec<_>>();

	// Lookup gates: group by row set the same way, resolving table names
	// through the directory. An unresolved name means the circuit referenced
	// a table nobody declared.
	let mut lookup_groups: Vec<(RowSelector, Vec<LookupEntry<F>>)> = Vec::new();
	let mut lookup_index: HashMap<RowSelector, usize> = HashMap::new();
	for raw in lookups {
		let Some(table) = tables.resolve(&raw.table) else {
			bail!(Error::UnknownLookupTable { name: raw.table });
		};
		if let Some(def) = tables.dynamic_def(table) {
			let arity = def[0].columns.len();
			if raw.tuple.len() != arity {
				bail!(Error::TableArityMismatch {
					name: raw.table,
					expected: arity,
					actual: raw.tuple.len(),
				});
			}
		}
		let entry = LookupEntry::new(table, raw.tuple);
		match lookup_index.get(&raw.rows) {
			Some(&at) => lookup_groups[at].1.push(entry),
			None => {
				lookup_index.insert(raw.rows.clone(), lookup_groups.len());
				lookup_groups.push((raw.rows, vec![entry]));
			}
		}
	}
	let lookup_gates = lookup_groups
		.into_iter()
		.map(|(rows, entries)| LookupGate::new(interner.intern(rows), entries))
		.collect::<Vec<_>>();

	// Dynamic table regions reuse an already-allocated selector whenever one
	// covers the same rows.
	let table_infos = (0..tables.len())
		.map(|id| {
			let name = tables
				.name(id)
				.unwrap_or_default()
				.to_string();
			match tables.dynamic_def(id) {
				Some(def) => {
					let instances = def
						.iter()
						.map(|instance| {
							DynamicInstance::new(
								instance.columns.clone(),
								interner.intern(instance.rows.clone()),
							)
						})
						.collect();
					TableInfo::new(name, TableKind::Dynamic, instances)
				}
				None => TableInfo::new(name, TableKind::Static, Vec::new()),
			}
		})
		.collect::<Vec<_>>();

	shape.selector_columns = interner.selectors.len();

	debug!(
		raw_constraints,
		gates = gates.len(),
		selectors = interner.selectors.len(),
		lookup_gates = lookup_gates.len(),
		tables = table_infos.len(),
		"flushed registry"
	);

	Ok(ConstraintSystem {
		shape,
		selectors: interner.selectors,
		gates,
		lookup_gates,
		copy_constraints: copies,
		tables: table_infos,
	})
}

#[cfg(test)]
mod tests {
	use trellis_field::P64;

	use super::*;
	use crate::{
		cell::{ColumnKind, Variable},
		component::TableShape,
		expr::Expr,
	};

	fn var(column: usize) -> Expr<P64, Variable> {
		Expr::var(Variable {
			kind: ColumnKind::Witness,
			column,
			offset: 0,
		})
	}

	/// A registry holding exactly one single-row gate must flush unchanged:
	/// one selector, one gate, one constraint.
	#[test]
	fn test_single_gate_fixpoint() {
		let mut registry = ConstraintRegistry::<P64>::new(TableShape::new(3, 0, 0, 2));
		registry
			.push_constraint("sum".to_string(), RowSelector::single(0), var(0) + var(1) - var(2))
			.unwrap();
		let system = optimize(registry).unwrap();
		assert_eq!(system.n_selectors(), 1);
		assert_eq!(system.selectors[0], RowSelector::single(0));
		assert_eq!(system.gates.len(), 1);
		assert_eq!(system.gates[0].constraints().len(), 1);
		assert_eq!(system.gates[0].constraints()[0].name(), "sum");
		assert_eq!(system.shape.selector_columns, 1);
	}

	#[test]
	fn test_identical_row_sets_share_selector() {
		let mut registry = ConstraintRegistry::<P64>::new(TableShape::new(4, 0, 0, 16));
		let rows = || RowSelector::range(0, 8);
		registry
			.push_constraint("a".to_string(), rows(), var(0))
			.unwrap();
		registry
			.push_constraint("b".to_string(), RowSelector::single(9), var(1))
			.unwrap();
		registry
			.push_constraint("c".to_string(), rows(), var(2))
			.unwrap();
		let system = optimize(registry).unwrap();
		assert_eq!(system.n_selectors(), 2);
		assert_eq!(system.gates.len(), 2);
		// First-occurrence order: the shared selector comes first.
		assert_eq!(system.gates[0].selector(), 0);
		assert_eq!(system.gates[0].constraints().len(), 2);
		assert_eq!(system.gates[0].constraints()[1].name(), "c");
		assert_eq!(system.gates[1].selector(), 1);
	}

	/// Grouping must behave identically across the parallel batch boundary.
	#[test]
	fn test_batch_boundary_merge() {
		let mut registry = ConstraintRegistry::<P64>::new(TableShape::new(2, 0, 0, 8));
		for i in 0..(BATCH_SIZE + 100) {
			let rows = RowSelector::single(i % 4);
			registry
				.push_constraint(format!("c{i}"), rows, var(0))
				.unwrap();
		}
		let system = optimize(registry).unwrap();
		assert_eq!(system.n_selectors(), 4);
		assert_eq!(system.gates.len(), 4);
		let total: usize = system
			.gates
			.iter()
			.map(|gate| gate.constraints().len())
			.sum();
		assert_eq!(total, BATCH_SIZE + 100);
		// Selector numbering follows first occurrence: rows 0, 1, 2, 3.
		for (id, selector) in system.selectors.iter().enumerate() {
			assert_eq!(selector, &RowSelector::single(id));
		}
	}
}
