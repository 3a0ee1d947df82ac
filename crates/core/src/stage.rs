// Copyright 2025 Irreducible Inc.

//! The two-stage build discipline.
//!
//! A component's constructor is written once, generic over [`Stage`], and
//! compiled twice. [`Assignment`] binds every cell to a concrete field value
//! and performs the actual computation; [`Constraints`] binds cells to
//! symbolic expressions and records obligations into the registry. All
//! stage-varying behavior lives in the hooks below, so component code never
//! branches on which stage it is in. A data-dependent decision on a
//! symbolic value does not compile, because [`Stage::Value`] exposes no
//! comparison. Such decisions are lowered to a witnessed flag via
//! [`Stage::witness`] plus algebraic constraints tying the flag down.

use std::{
	fmt::Debug,
	ops::{Add, Mul, Neg, Sub},
};

use trellis_field::Field;
use trellis_utils::{bail, ensure};

use crate::{
	cell::CellId,
	error::Error,
	expr::Expr,
	registry::ConstraintRegistry,
	selector::RowSelector,
	table::TraceTable,
};

mod sealed {
	pub trait Sealed {}

	impl Sealed for super::Assignment {}
	impl Sealed for super::Constraints {}
}

/// A build stage. Fixed once per compiled instance of a component.
pub trait Stage<F: Field>: sealed::Sealed + Sized + 'static {
	/// The payload bound to every cell in this stage.
	type Value: Clone
		+ Debug
		+ Add<Output = Self::Value>
		+ Sub<Output = Self::Value>
		+ Mul<Output = Self::Value>
		+ Neg<Output = Self::Value>;

	/// Stage name for diagnostics.
	const NAME: &'static str;

	/// Lifts a concrete field element into the stage's value algebra. This
	/// is how component inputs enter the shared code path.
	fn constant(value: F) -> Self::Value;

	/// Computes a witnessed hint from the concrete values behind `deps`.
	///
	/// Under [`Assignment`] this applies `f`; under [`Constraints`] the
	/// closure cannot run (the dependencies are symbolic) and an opaque
	/// placeholder is returned. A hint therefore carries no constraint of
	/// its own: it must only flow into an `alloc*` call, and the component
	/// must pin the allocated cell down algebraically.
	fn witness<const N: usize>(
		deps: [&Self::Value; N],
		f: impl FnOnce([F; N]) -> F,
	) -> Self::Value;

	/// The payload a freshly allocated cell binds to.
	fn bind(id: CellId, value: &Self::Value) -> Self::Value;

	/// Records a cell's value into the trace (assignment stage only).
	fn store(table: Option<&mut TraceTable<F>>, id: CellId, value: &Self::Value)
		-> Result<(), Error>;

	/// Registers `value == 0` on `rows`, with cell references rewritten
	/// relative to `anchor`. The assignment stage instead checks the
	/// concretely-evaluated value is zero and fails fast.
	fn record_constraint(
		registry: &mut ConstraintRegistry<F>,
		name: &str,
		rows: RowSelector,
		anchor: usize,
		value: &Self::Value,
	) -> Result<(), Error>;

	/// Registers a lookup of `tuple` into the named table on `rows`.
	/// Membership of assignment-stage values is checked by
	/// [`crate::validate::validate_witness`], not here.
	fn record_lookup(
		registry: &mut ConstraintRegistry<F>,
		table: &str,
		rows: RowSelector,
		anchor: usize,
		tuple: &[Self::Value],
	) -> Result<(), Error>;

	/// Registers an equality obligation between two cells. The assignment
	/// stage checks the already-stored values agree.
	fn record_copy(
		registry: &mut ConstraintRegistry<F>,
		table: Option<&TraceTable<F>>,
		a: CellId,
		b: CellId,
	) -> Result<(), Error>;
}

/// The stage that produces the witness: cells hold concrete field values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment;

/// The stage that produces the constraint registry: cells hold symbolic
/// expressions over table coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constraints;

impl<F: Field> Stage<F> for Assignment {
	type Value = F;

	const NAME: &'static str = "assignment";

	fn constant(value: F) -> F {
		value
	}

	fn witness<const N: usize>(deps: [&F; N], f: impl FnOnce([F; N]) -> F) -> F {
		f(deps.map(|dep| *dep))
	}

	fn bind(_id: CellId, value: &F) -> F {
		*value
	}

	fn store(table: Option<&mut TraceTable<F>>, id: CellId, value: &F) -> Result<(), Error> {
		match table {
			Some(table) => table.set(id, *value),
			None => bail!(Error::WitnessUnavailable),
		}
	}

	fn record_constraint(
		_registry: &mut ConstraintRegistry<F>,
		name: &str,
		_rows: RowSelector,
		anchor: usize,
		value: &F,
	) -> Result<(), Error> {
		// The registry accumulates during the constraints pass only; here
		// the expression has already collapsed to a number, which gives an
		// early check at the anchor row. The full-trace check is
		// `validate_witness`.
		ensure!(
			value.is_zero(),
			Error::ConstraintUnsatisfied {
				name: name.to_string(),
				row: anchor,
				value: value.to_string(),
			}
		);
		Ok(())
	}

	fn record_lookup(
		_registry: &mut ConstraintRegistry<F>,
		_table: &str,
		_rows: RowSelector,
		_anchor: usize,
		_tuple: &[F],
	) -> Result<(), Error> {
		Ok(())
	}

	fn record_copy(
		_registry: &mut ConstraintRegistry<F>,
		table: Option<&TraceTable<F>>,
		a: CellId,
		b: CellId,
	) -> Result<(), Error> {
		let Some(table) = table else {
			bail!(Error::WitnessUnavailable);
		};
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
		Ok(())
	}
}

impl<F: Field> Stage<F> for Constraints {
	type Value = Expr<F, CellId>;

	const NAME: &'static str = "constraints";

	fn constant(value: F) -> Expr<F, CellId> {
		Expr::Const(value)
	}

	fn witness<const N: usize>(
		_deps: [&Expr<F, CellId>; N],
		_f: impl FnOnce([F; N]) -> F,
	) -> Expr<F, CellId> {
		Expr::Const(F::ZERO)
	}

	fn bind(id: CellId, _value: &Expr<F, CellId>) -> Expr<F, CellId> {
		Expr::Var(id)
	}

	fn store(
		_table: Option<&mut TraceTable<F>>,
		_id: CellId,
		_value: &Expr<F, CellId>,
	) -> Result<(), Error> {
		Ok(())
	}

	fn record_constraint(
		registry: &mut ConstraintRegistry<F>,
		name: &str,
		rows: RowSelector,
		anchor: usize,
		value: &Expr<F, CellId>,
	) -> Result<(), Error> {
		registry.push_constraint(name.to_string(), rows, value.relativize(anchor))
	}

	fn record_lookup(
		registry: &mut ConstraintRegistry<F>,
		table: &str,
		rows: RowSelector,
		anchor: usize,
		tuple: &[Expr<F, CellId>],
	) -> Result<(), Error> {
		let tuple = tuple.iter().map(|expr| expr.relativize(anchor)).collect();
		registry.push_lookup(table.to_string(), rows, tuple)
	}

	fn record_copy(
		registry: &mut ConstraintRegistry<F>,
		_table: Option<&TraceTable<F>>,
		a: CellId,
		b: CellId,
	) -> Result<(), Error> {
		registry.push_copy(a, b);
		Ok(())
	}
}
