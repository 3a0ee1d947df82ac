// Copyright 2025 Irreducible Inc.

//! Lookup arguments: static tables, dynamic tables, the single-definition
//! rule and name resolution at flush time.

use std::collections::HashMap;

use assert_matches::assert_matches;
use trellis_core::{
	gadgets::range_check::{byte_table_rows, check_byte, BYTE_TABLE},
	optimize, validate_witness, Assignment, CircuitBuilder, Constraints, Error, Expr, StaticTables,
	TableKind, TableShape,
};
use trellis_field::{Field, P64};

fn val(x: u64) -> P64 {
	P64::from_u64(x)
}

fn byte_tables() -> StaticTables<P64> {
	HashMap::from([(BYTE_TABLE.to_string(), byte_table_rows::<P64>())])
}

/// Runs both passes of a one-cell circuit that range-checks its value.
fn range_check_circuit(
	value: u64,
) -> (
	trellis_core::TraceTable<P64>,
	trellis_core::ConstraintSystem<P64>,
) {
	let shape = TableShape::new(1, 0, 0, 1);

	let mut asg = CircuitBuilder::<P64, Assignment>::new(shape);
	asg.declare_static_table(BYTE_TABLE).unwrap();
	{
		let mut ctx = asg.root_context();
		let x = ctx.alloc(val(value)).unwrap();
		check_byte(&mut ctx, &x, 0).unwrap();
	}
	let table = asg.take_table().unwrap();

	let mut cns = CircuitBuilder::<P64, Constraints>::new(shape);
	cns.declare_static_table(BYTE_TABLE).unwrap();
	{
		let mut ctx = cns.root_context();
		let x = ctx.alloc(Expr::constant(val(value))).unwrap();
		check_byte(&mut ctx, &x, 0).unwrap();
	}
	let system = optimize(cns.into_registry().unwrap()).unwrap();
	(table, system)
}

#[test]
fn test_static_lookup_hit() {
	let (table, system) = range_check_circuit(200);
	assert_eq!(system.lookup_gates.len(), 1);
	assert_eq!(system.tables.len(), 1);
	assert_eq!(system.tables[0].kind(), TableKind::Static);
	validate_witness(&system, &table, &byte_tables()).unwrap();
}

#[test]
fn test_static_lookup_miss() {
	let (table, system) = range_check_circuit(300);
	assert_matches!(
		validate_witness(&system, &table, &byte_tables()),
		Err(Error::LookupMiss { row: 0, .. })
	);
}

#[test]
fn test_missing_static_table_contents() {
	let (table, system) = range_check_circuit(200);
	assert_matches!(
		validate_witness(&system, &table, &HashMap::new()),
		Err(Error::MissingStaticTable { .. })
	);
}

#[test]
fn test_undeclared_table_fails_at_flush() {
	let mut cns = CircuitBuilder::<P64, Constraints>::new(TableShape::new(1, 0, 0, 1));
	{
		let mut ctx = cns.root_context();
		let x = ctx.alloc(Expr::constant(val(1))).unwrap();
		// No `declare_static_table` anywhere.
		check_byte(&mut ctx, &x, 0).unwrap();
	}
	assert_matches!(
		optimize(cns.into_registry().unwrap()),
		Err(Error::UnknownLookupTable { .. })
	);
}

#[test]
fn test_table_names_are_write_once() {
	let mut builder = CircuitBuilder::<P64, Constraints>::new(TableShape::new(2, 0, 0, 4));
	builder.declare_static_table("shared").unwrap();
	assert_matches!(
		builder.declare_static_table("shared"),
		Err(Error::DuplicateTable { .. })
	);

	let mut ctx = builder.root_context();
	// A dynamic table may not take a name reserved for a static one.
	assert_matches!(
		ctx.lookup_table("shared", &[0], 0, 3),
		Err(Error::DuplicateTable { .. })
	);
	ctx.lookup_table("pairs", &[0, 1], 0, 3).unwrap();
	assert_matches!(
		ctx.lookup_table("pairs", &[0, 1], 0, 3),
		Err(Error::DuplicateTable { .. })
	);
}

/// Dynamic tables: one region of the trace declares the relation, another
/// region's tuples must appear in it.
fn dynamic_circuit(
	witness_pairs: [(u64, u64); 2],
	probe: (u64, u64),
) -> (
	trellis_core::TraceTable<P64>,
	trellis_core::ConstraintSystem<P64>,
) {
	let shape = TableShape::new(4, 0, 0, 2);

	let mut asg = CircuitBuilder::<P64, Assignment>::new(shape);
	{
		let mut ctx = asg.root_context();
		for (row, &(x, y)) in witness_pairs.iter().enumerate() {
			ctx.alloc_at(val(x), 0, row).unwrap();
			ctx.alloc_at(val(y), 1, row).unwrap();
		}
		ctx.lookup_table("pairs", &[0, 1], 0, 1).unwrap();
		let px = ctx.alloc_at(val(probe.0), 2, 0).unwrap();
		let py = ctx.alloc_at(val(probe.1), 3, 0).unwrap();
		ctx.lookup("pairs", vec![px.expr(), py.expr()], 0).unwrap();
	}
	let table = asg.take_table().unwrap();

	let mut cns = CircuitBuilder::<P64, Constraints>::new(shape);
	{
		let mut ctx = cns.root_context();
		for (row, &(x, y)) in witness_pairs.iter().enumerate() {
			ctx.alloc_at(Expr::constant(val(x)), 0, row).unwrap();
			ctx.alloc_at(Expr::constant(val(y)), 1, row).unwrap();
		}
		ctx.lookup_table("pairs", &[0, 1], 0, 1).unwrap();
		let px = ctx.alloc_at(Expr::constant(val(probe.0)), 2, 0).unwrap();
		let py = ctx.alloc_at(Expr::constant(val(probe.1)), 3, 0).unwrap();
		ctx.lookup("pairs", vec![px.expr(), py.expr()], 0).unwrap();
	}
	let system = optimize(cns.into_registry().unwrap()).unwrap();
	(table, system)
}

#[test]
fn test_dynamic_lookup_hit() {
	let (table, system) = dynamic_circuit([(3, 6), (4, 8)], (4, 8));
	assert_eq!(system.tables.len(), 1);
	assert_eq!(system.tables[0].kind(), TableKind::Dynamic);
	assert_eq!(system.tables[0].instances().len(), 1);
	validate_witness(&system, &table, &HashMap::new()).unwrap();
}

#[test]
fn test_dynamic_lookup_miss() {
	let (table, system) = dynamic_circuit([(3, 6), (4, 8)], (4, 9));
	assert_matches!(
		validate_witness(&system, &table, &HashMap::new()),
		Err(Error::LookupMiss { row: 0, .. })
	);
}

#[test]
fn test_dynamic_arity_checked_at_flush() {
	let mut cns = CircuitBuilder::<P64, Constraints>::new(TableShape::new(2, 0, 0, 2));
	{
		let mut ctx = cns.root_context();
		ctx.lookup_table("pairs", &[0, 1], 0, 1).unwrap();
		let x = ctx.alloc(Expr::constant(val(1))).unwrap();
		// Tuple of width 1 into a table of width 2.
		ctx.lookup("pairs", vec![x.expr()], 0).unwrap();
	}
	assert_matches!(
		optimize(cns.into_registry().unwrap()),
		Err(Error::TableArityMismatch { .. })
	);
}

/// A multi-instance table: two column groups define rows of the same logical
/// table.
#[test]
fn test_multi_instance_dynamic_table() {
	let shape = TableShape::new(4, 0, 0, 1);

	let mut asg = CircuitBuilder::<P64, Assignment>::new(shape);
	{
		let mut ctx = asg.root_context();
		ctx.alloc_at(val(1), 0, 0).unwrap();
		ctx.alloc_at(val(2), 1, 0).unwrap();
		ctx.alloc_at(val(3), 2, 0).unwrap();
		ctx.alloc_at(val(4), 3, 0).unwrap();
		ctx.multi_lookup_table("singles", &[vec![0], vec![1], vec![2], vec![3]], 0, 0)
			.unwrap();
	}
	let table = asg.take_table().unwrap();

	let mut cns = CircuitBuilder::<P64, Constraints>::new(shape);
	{
		let mut ctx = cns.root_context();
		for (column, v) in [1u64, 2, 3, 4].into_iter().enumerate() {
			ctx.alloc_at(Expr::constant(val(v)), column, 0).unwrap();
		}
		ctx.multi_lookup_table("singles", &[vec![0], vec![1], vec![2], vec![3]], 0, 0)
			.unwrap();
	}
	let system = optimize(cns.into_registry().unwrap()).unwrap();

	assert_eq!(system.tables[0].instances().len(), 4);
	validate_witness(&system, &table, &HashMap::new()).unwrap();
}
