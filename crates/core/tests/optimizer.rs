// Copyright 2025 Irreducible Inc.

//! Flush behavior: selector reuse, determinism and cross-feature selector
//! sharing.

use std::collections::{HashMap, HashSet};

use trellis_core::{
	optimize, validate_witness, Assignment, CircuitBuilder, ConstraintRegistry, Constraints,
	Expr, RowSelector, TableShape, Variable,
};
use trellis_core::{ColumnKind, ConstraintSystem};
use trellis_field::{Field, P64};

fn var(column: usize) -> Expr<P64, Variable> {
	Expr::var(Variable {
		kind: ColumnKind::Witness,
		column,
		offset: 0,
	})
}

fn registry_in_order(order: &[usize]) -> ConstraintRegistry<P64> {
	// Three logical groups over two distinct row sets; `order` permutes the
	// registration sequence.
	let groups = [
		("a", RowSelector::range(0, 4)),
		("b", RowSelector::from_rows([1, 3, 5])),
		("c", RowSelector::range(0, 4)),
	];
	let mut registry = ConstraintRegistry::new(TableShape::new(4, 0, 0, 8));
	for &at in order {
		let (name, rows) = &groups[at];
		registry
			.push_constraint(name.to_string(), rows.clone(), var(at))
			.unwrap();
	}
	registry
}

fn names_by_rowset(system: &ConstraintSystem<P64>) -> HashMap<RowSelector, HashSet<String>> {
	system
		.gates
		.iter()
		.map(|gate| {
			let rows = system.selectors[gate.selector()].clone();
			let names = gate
				.constraints()
				.iter()
				.map(|constraint| constraint.name().clone())
				.collect();
			(rows, names)
		})
		.collect()
}

#[test]
fn test_selector_reuse_is_call_order_independent() {
	let forward = optimize(registry_in_order(&[0, 1, 2])).unwrap();
	let backward = optimize(registry_in_order(&[2, 1, 0])).unwrap();

	assert_eq!(forward.n_selectors(), 2);
	assert_eq!(backward.n_selectors(), 2);
	assert_eq!(forward.gates.len(), 2);
	assert_eq!(backward.gates.len(), 2);

	// Gate numbering may differ, but the constraint content per row set is
	// the same.
	assert_eq!(names_by_rowset(&forward), names_by_rowset(&backward));
}

#[test]
fn test_flush_is_deterministic() {
	let first = optimize(registry_in_order(&[0, 1, 2])).unwrap();
	let second = optimize(registry_in_order(&[0, 1, 2])).unwrap();
	assert_eq!(first, second);
}

#[test]
fn test_selector_count_bounded_by_distinct_row_sets() {
	let mut registry = ConstraintRegistry::<P64>::new(TableShape::new(2, 0, 0, 64));
	for i in 0..200 {
		registry
			.push_constraint(
				format!("c{i}"),
				RowSelector::single(i % 16),
				var(i % 2),
			)
			.unwrap();
	}
	let system = optimize(registry).unwrap();
	assert_eq!(system.n_selectors(), 16);
	assert_eq!(system.gates.len(), 16);
	let total: usize = system
		.gates
		.iter()
		.map(|gate| gate.constraints().len())
		.sum();
	assert_eq!(total, 200);
}

/// A lookup gate and a polynomial gate covering the same rows share one
/// selector, as does a dynamic table defined over those rows.
#[test]
fn test_selector_shared_across_features() {
	let shape = TableShape::new(2, 0, 0, 4);

	let run = |builder: &mut CircuitBuilder<P64, Constraints>| {
		let mut ctx = builder.root_context();
		let cells: Vec<_> = (0..4)
			.map(|i| ctx.alloc(Expr::constant(P64::from_u64(i))).unwrap())
			.collect();
		let doubles: Vec<_> = (0..4)
			.map(|i| ctx.alloc(&cells[i] + &cells[i]).unwrap())
			.collect();
		// All three registrations cover rows 0..=3.
		ctx.relative_constrain("double", (&cells[0] + &cells[0]) - doubles[0].expr(), 0, 3)
			.unwrap();
		ctx.lookup_table("pairs", &[0, 1], 0, 3).unwrap();
		ctx.relative_lookup("pairs", vec![cells[0].expr(), doubles[0].expr()], 0, 3)
			.unwrap();
	};

	let mut builder = CircuitBuilder::<P64, Constraints>::new(shape);
	run(&mut builder);
	let system = optimize(builder.into_registry().unwrap()).unwrap();

	assert_eq!(system.n_selectors(), 1);
	assert_eq!(system.gates.len(), 1);
	assert_eq!(system.lookup_gates.len(), 1);
	let table = &system.tables[0];
	assert_eq!(table.instances().len(), 1);
	assert_eq!(table.instances()[0].selector(), system.gates[0].selector());
	assert_eq!(
		system.lookup_gates[0].selector(),
		system.gates[0].selector()
	);
}

/// The assignment counterpart of `test_selector_shared_across_features`,
/// closing the loop through validation.
#[test]
fn test_shared_selector_system_validates() {
	let shape = TableShape::new(2, 0, 0, 4);

	let mut asg = CircuitBuilder::<P64, Assignment>::new(shape);
	{
		let mut ctx = asg.root_context();
		let cells: Vec<_> = (0..4)
			.map(|i| ctx.alloc(P64::from_u64(i)).unwrap())
			.collect();
		let doubles: Vec<_> = (0..4)
			.map(|i| ctx.alloc(&cells[i] + &cells[i]).unwrap())
			.collect();
		ctx.relative_constrain("double", (&cells[0] + &cells[0]) - doubles[0].expr(), 0, 3)
			.unwrap();
		ctx.lookup_table("pairs", &[0, 1], 0, 3).unwrap();
		ctx.relative_lookup("pairs", vec![cells[0].expr(), doubles[0].expr()], 0, 3)
			.unwrap();
	}
	let table = asg.take_table().unwrap();

	let mut cns = CircuitBuilder::<P64, Constraints>::new(shape);
	{
		let mut ctx = cns.root_context();
		let cells: Vec<_> = (0..4)
			.map(|i| ctx.alloc(Expr::constant(P64::from_u64(i))).unwrap())
			.collect();
		let doubles: Vec<_> = (0..4)
			.map(|i| ctx.alloc(&cells[i] + &cells[i]).unwrap())
			.collect();
		ctx.relative_constrain("double", (&cells[0] + &cells[0]) - doubles[0].expr(), 0, 3)
			.unwrap();
		ctx.lookup_table("pairs", &[0, 1], 0, 3).unwrap();
		ctx.relative_lookup("pairs", vec![cells[0].expr(), doubles[0].expr()], 0, 3)
			.unwrap();
	}
	let system = optimize(cns.into_registry().unwrap()).unwrap();

	validate_witness(&system, &table, &HashMap::new()).unwrap();
}
