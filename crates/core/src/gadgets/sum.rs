// Copyright 2025 Irreducible Inc.

use trellis_field::Field;

use crate::{
	cell::Cell,
	component::{Component, TableShape},
	context::Context,
	error::Error,
	stage::Stage,
};

/// Computes `sum = a + b` and constrains it with a single gate.
#[derive(Debug)]
pub struct Sum<F: Field, S: Stage<F>> {
	pub a: Cell<F, S>,
	pub b: Cell<F, S>,
	pub sum: Cell<F, S>,
}

#[derive(Debug, Clone)]
pub struct SumInput<F: Field> {
	pub a: F,
	pub b: F,
}

impl<F: Field, S: Stage<F>> Component<F, S> for Sum<F, S> {
	type Params = ();
	type Input = SumInput<F>;
	type Public = ();

	fn minimal_requirements(_params: &()) -> TableShape {
		TableShape::new(3, 0, 0, 2)
	}

	fn allocate_public_inputs(
		_ctx: &mut Context<F, S>,
		_input: &Self::Input,
		_params: &(),
	) -> Result<(), Error> {
		Ok(())
	}

	fn build(
		ctx: &mut Context<F, S>,
		_public: (),
		input: &Self::Input,
		_params: &(),
	) -> Result<Self, Error> {
		let a = ctx.alloc(S::constant(input.a))?;
		let b = ctx.alloc(S::constant(input.b))?;
		let sum = ctx.alloc(&a + &b)?;
		ctx.constrain("sum", (&a + &b) - sum.expr(), 0)?;
		Ok(Self { a, b, sum })
	}
}
