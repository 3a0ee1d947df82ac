// Copyright 2025 Irreducible Inc.

use trellis_field::Field;
use trellis_utils::bail;

use crate::{builder::CircuitBuilder, context::Context, error::Error, stage::Stage};

/// The size of the table a component requires, as declared by
/// [`Component::minimal_requirements`] and consumed by the caller to allocate
/// the physical table before construction.
///
/// `selector_columns` is zero for requirement declarations; the optimizer
/// fills it in on the flushed [`crate::ConstraintSystem`]. Rows past
/// `usable_row_count` are reserved for the outer protocol and are never
/// allocated into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableShape {
	pub witness_columns: usize,
	pub public_columns: usize,
	pub constant_columns: usize,
	pub selector_columns: usize,
	pub row_count: usize,
	pub usable_row_count: usize,
}

impl TableShape {
	pub fn new(
		witness_columns: usize,
		public_columns: usize,
		constant_columns: usize,
		row_count: usize,
	) -> Self {
		Self {
			witness_columns,
			public_columns,
			constant_columns,
			selector_columns: 0,
			row_count,
			usable_row_count: row_count,
		}
	}

	pub fn with_usable_rows(mut self, usable_row_count: usize) -> Self {
		self.usable_row_count = usable_row_count;
		self
	}

	/// Whether a table of this shape can host a component requiring
	/// `required`.
	pub fn satisfies(&self, required: &TableShape) -> bool {
		self.witness_columns >= required.witness_columns
			&& self.public_columns >= required.public_columns
			&& self.constant_columns >= required.constant_columns
			&& self.row_count >= required.row_count
			&& self.usable_row_count >= required.usable_row_count
	}
}

/// The contract every arithmetized component satisfies.
///
/// A component is a single piece of logic generic over the build
/// [`Stage`]. Under [`crate::Assignment`] the constructor performs the actual
/// computation and records every intermediate as a concrete field element;
/// under [`crate::Constraints`] the same code path runs over symbolic cells
/// and registers the polynomial, lookup and copy obligations. Both stages
/// allocate at identical coordinates, which is what makes the assignment
/// pass's table a satisfying witness for the constraints pass's output.
///
/// Constructed components expose their named output cells as public struct
/// fields for the wrapping component to read or wire via
/// [`Context::copy_constrain`].
pub trait Component<F: Field, S: Stage<F>>: Sized {
	/// Compile-time parameters the table shape is a pure function of.
	type Params;
	/// The input data. Only the assignment stage observes it as numbers;
	/// the constraints stage sees it through allocated cells.
	type Input;
	/// Handles to the public-input cells placed by
	/// [`Self::allocate_public_inputs`].
	type Public;

	/// The table shape this component needs. Must be consistent with what
	/// the constructor actually allocates; a shortfall surfaces as a layout
	/// violation during construction.
	fn minimal_requirements(params: &Self::Params) -> TableShape;

	/// Places public-input values at contractually fixed positions. Callers
	/// outside the circuit must agree on these positions, so any parameter
	/// change that shifts them is a breaking interface change.
	fn allocate_public_inputs(
		ctx: &mut Context<F, S>,
		input: &Self::Input,
		params: &Self::Params,
	) -> Result<Self::Public, Error>;

	/// The constructor body, executed once per compiled stage.
	fn build(
		ctx: &mut Context<F, S>,
		public: Self::Public,
		input: &Self::Input,
		params: &Self::Params,
	) -> Result<Self, Error>;
}

/// Runs a component against a builder: checks the builder's table shape
/// against the component's requirements, places public inputs, then executes
/// the constructor body in a root context.
pub fn build_component<F, S, C>(
	builder: &mut CircuitBuilder<F, S>,
	params: &C::Params,
	input: &C::Input,
) -> Result<C, Error>
where
	F: Field,
	S: Stage<F>,
	C: Component<F, S>,
{
	let required = C::minimal_requirements(params);
	let actual = builder.shape();
	if !actual.satisfies(&required) {
		bail!(Error::ShapeTooSmall { required, actual });
	}
	let mut ctx = builder.root_context();
	let public = C::allocate_public_inputs(&mut ctx, input, params)?;
	C::build(&mut ctx, public, input, params)
}
