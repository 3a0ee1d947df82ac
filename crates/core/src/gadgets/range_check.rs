// Copyright 2025 Irreducible Inc.

use trellis_field::Field;

use crate::{cell::Cell, context::Context, stage::Stage};

/// Name of the precomputed byte range table. Builders using [`check_byte`]
/// must declare it via `declare_static_table` before flushing.
pub const BYTE_TABLE: &str = "u8_range";

/// The canonical contents of the byte range table, to be supplied to
/// `validate_witness`.
pub fn byte_table_rows<F: Field>() -> Vec<Vec<F>> {
	(0..256).map(|value| vec![F::from_u64(value)]).collect()
}

/// Constrains `x` to `[0, 256)` via a lookup anchored at window row `row`.
pub fn check_byte<F: Field, S: Stage<F>>(
	ctx: &mut Context<F, S>,
	x: &Cell<F, S>,
	row: usize,
) -> anyhow::Result<()> {
	ctx.lookup(BYTE_TABLE, vec![x.expr()], row)?;
	Ok(())
}
