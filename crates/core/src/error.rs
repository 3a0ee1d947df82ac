// Copyright 2025 Irreducible Inc.

use crate::{
	cell::{CellId, ColumnKind},
	component::TableShape,
};

/// Construction, flush and validation errors.
///
/// Every variant indicates a malformed circuit description or an assignment
/// that does not satisfy its own constraints. These are configuration errors
/// to be fixed at the call site, never transient faults to be retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	// Layout violations.
	#[error("{scope}: {kind} column {column} out of range, window has {width} columns")]
	ColumnOutOfRange {
		scope: String,
		kind: ColumnKind,
		column: usize,
		width: usize,
	},
	#[error("{scope}: row {row} outside window of {rows} rows")]
	RowOutOfRange {
		scope: String,
		row: usize,
		rows: usize,
	},
	#[error("{scope}: column {column} appears twice in a subcontext column list")]
	DuplicateColumn { scope: String, column: usize },
	#[error("{scope}: empty row range")]
	EmptyRowRange { scope: String },
	#[error("{scope}: allocation window exhausted ({columns} columns x {rows} rows)")]
	WindowExhausted {
		scope: String,
		columns: usize,
		rows: usize,
	},
	#[error("{scope}: cell {cell} already allocated")]
	CellOccupied { scope: String, cell: CellId },
	#[error("table shape {actual:?} does not satisfy required {required:?}")]
	ShapeTooSmall {
		required: TableShape,
		actual: TableShape,
	},

	// Semantic mismatches between the assignment and the constraints.
	#[error("constraint \"{name}\" not satisfied at row {row}: evaluated to {value}")]
	ConstraintUnsatisfied {
		name: String,
		row: usize,
		value: String,
	},
	#[error("copy constraint {a} = {b} violated: {left} != {right}")]
	CopyMismatch {
		a: CellId,
		b: CellId,
		left: String,
		right: String,
	},
	#[error("lookup into table \"{table}\" missed at row {row}: ({tuple})")]
	LookupMiss {
		table: String,
		row: usize,
		tuple: String,
	},

	// Registry inconsistencies.
	#[error("lookup references table \"{name}\" which was never declared")]
	UnknownLookupTable { name: String },
	#[error("table \"{name}\" already defined")]
	DuplicateTable { name: String },
	#[error("no contents provided for static table \"{name}\"")]
	MissingStaticTable { name: String },
	#[error("table \"{name}\": tuple arity {actual} does not match table arity {expected}")]
	TableArityMismatch {
		name: String,
		expected: usize,
		actual: usize,
	},

	// Builder state.
	#[error("witness table is missing; it was already taken or this is a constraints-stage builder")]
	WitnessUnavailable,
	#[error("root state is still shared; drop all contexts before finishing the builder")]
	StateShared,
	#[error("cell {cell} read outside the table bounds")]
	CellOutOfTable { cell: CellId },
}
