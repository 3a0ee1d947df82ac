// Copyright 2025 Irreducible Inc.

//! The explicit "is this trace satisfying?" check.
//!
//! Pairs the witness table produced by an assignment pass with the
//! constraint system flushed from a constraints pass of the same component
//! and verifies every obligation. A failure here is a build-time validation
//! error (the two passes disagree about the computation), not a runtime
//! condition to continue past.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use tracing::instrument;
use trellis_field::Field;
use trellis_utils::{bail, ensure};

use crate::{
	cell::{CellId, ColumnKind},
	constraint_system::{ConstraintSystem, TableKind},
	error::Error,
	table::TraceTable,
};

/// Contents of the static lookup tables, keyed by declared name. Each table
/// is a list of rows; each row a tuple of field elements.
pub type StaticTables<F> = HashMap<String, Vec<Vec<F>>>;

fn format_tuple<F: Field>(tuple: &[F]) -> String {
	tuple.iter().map(ToString::to_string).join(", ")
}

/// Evaluates every gate polynomial, copy constraint and lookup of `system`
/// against the assignment-stage `table`.
///
/// Static table contents are supplied by the caller; dynamic table contents
/// are gathered from the trace itself via the registered instances. The
/// first violation is reported with the constraint's scoped name and the
/// offending row.
#[instrument(skip_all, fields(
	gates = system.gates.len(),
	lookup_gates = system.lookup_gates.len(),
	copies = system.copy_constraints.len(),
))]
pub fn validate_witness<F: Field>(
	system: &ConstraintSystem<F>,
	table: &TraceTable<F>,
	static_tables: &StaticTables<F>,
) -> Result<(), Error> {
	// Polynomial gates.
	for gate in &system.gates {
		let selector = &system.selectors[gate.selector()];
		for constraint in gate.constraints() {
			for row in selector.rows() {
				let value = constraint
					.poly()
					.try_evaluate(&mut |var| table.resolve(var, row))?;
				ensure!(
					value.is_zero(),
					Error::ConstraintUnsatisfied {
						name: constraint.name().clone(),
						row,
						value: value.to_string(),
					}
				);
			}
		}
	}

	// Copy constraints.
	for &(a, b) in &system.copy_constraints {
		let left = table.get(a)?;
		let right = table.get(b)?;
		ensure!(
			left == right,
			Error::CopyMismatch {
				a,
				b,
				left: left.to_string(),
				right: right.to_string(),
			}
		);
	}

	// Table contents: dynamic tables gather their rows from the live trace.
	let mut membership: Vec<Option<HashSet<Vec<F>>>> = vec![None; system.tables.len()];
	for (id, info) in system.tables.iter().enumerate() {
		if info.kind() == TableKind::Dynamic {
			let mut rows = HashSet::new();
			for instance in info.instances() {
				let selector = &system.selectors[instance.selector()];
				for row in selector.rows() {
					let tuple = instance
						.columns()
						.iter()
						.map(|&column| {
							table.get(CellId {
								kind: ColumnKind::Witness,
								column,
								row,
							})
						})
						.collect::<Result<Vec<_>, _>>()?;
					rows.insert(tuple);
				}
			}
			membership[id] = Some(rows);
		}
	}

	// Lookup gates. Static contents are pulled in lazily, so a declared but
	// never-referenced table needs no contents.
	for gate in &system.lookup_gates {
		let selector = &system.selectors[gate.selector()];
		for entry in gate.entries() {
			let info = &system.tables[entry.table()];
			if membership[entry.table()].is_none() {
				let Some(rows) = static_tables.get(info.name()) else {
					bail!(Error::MissingStaticTable {
						name: info.name().clone(),
					});
				};
				membership[entry.table()] = Some(rows.iter().cloned().collect());
			}
			let rows = membership[entry.table()]
				.as_ref()
				.expect("filled for dynamic tables above, for static tables just now");
			for row in selector.rows() {
				let tuple = entry
					.tuple()
					.iter()
					.map(|expr| expr.try_evaluate(&mut |var| table.resolve(var, row)))
					.collect::<Result<Vec<_>, _>>()?;
				ensure!(
					rows.contains(&tuple),
					Error::LookupMiss {
						table: info.name().clone(),
						row,
						tuple: format_tuple(&tuple),
					}
				);
			}
		}
	}

	Ok(())
}
