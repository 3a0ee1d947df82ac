// Copyright 2025 Irreducible Inc.

use std::{fmt, ops::{Add, Mul, Sub}};

use trellis_field::Field;

use crate::stage::Stage;

/// The column families of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColumnKind {
	Witness,
	PublicInput,
	Constant,
	Selector,
}

impl fmt::Display for ColumnKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let tag = match self {
			Self::Witness => "w",
			Self::PublicInput => "p",
			Self::Constant => "c",
			Self::Selector => "s",
		};
		write!(f, "{tag}")
	}
}

/// Absolute coordinates of one table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId {
	pub kind: ColumnKind,
	pub column: usize,
	pub row: usize,
}

impl fmt::Display for CellId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}{}[{}]", self.kind, self.column, self.row)
	}
}

/// A reference to a table cell relative to a constraint's anchor row.
///
/// Negative and positive offsets give lookbehind and lookahead between
/// adjacent rows. Variables are the leaves of registered constraint
/// polynomials; they identify data and never own it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable {
	pub kind: ColumnKind,
	pub column: usize,
	pub offset: i64,
}

impl fmt::Display for Variable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.offset == 0 {
			write!(f, "{}{}", self.kind, self.column)
		} else {
			write!(f, "{}{}[{:+}]", self.kind, self.column, self.offset)
		}
	}
}

/// A handle to an allocated table cell.
///
/// The payload is stage-bound: a concrete field value under
/// [`crate::stage::Assignment`], a symbolic expression referencing the cell
/// under [`crate::stage::Constraints`]. Arithmetic on cell references
/// produces stage values, so the same component code path computes numbers in
/// one pass and polynomials in the other.
#[derive(Debug, Clone)]
pub struct Cell<F: Field, S: Stage<F>> {
	id: CellId,
	value: <S as Stage<F>>::Value,
}

impl<F: Field, S: Stage<F>> Cell<F, S> {
	pub(crate) fn new(id: CellId, value: S::Value) -> Self {
		Self { id, value }
	}

	pub fn id(&self) -> CellId {
		self.id
	}

	/// The stage value bound to this cell.
	pub fn expr(&self) -> S::Value {
		self.value.clone()
	}
}

impl<F: Field> Cell<F, crate::stage::Assignment> {
	/// The concrete value this cell was assigned.
	pub fn value(&self) -> F {
		self.value
	}
}

impl<'a, 'b, F: Field, S: Stage<F>> Add<&'b Cell<F, S>> for &'a Cell<F, S> {
	type Output = S::Value;

	fn add(self, rhs: &'b Cell<F, S>) -> S::Value {
		self.value.clone() + rhs.value.clone()
	}
}

impl<'a, 'b, F: Field, S: Stage<F>> Sub<&'b Cell<F, S>> for &'a Cell<F, S> {
	type Output = S::Value;

	fn sub(self, rhs: &'b Cell<F, S>) -> S::Value {
		self.value.clone() - rhs.value.clone()
	}
}

impl<'a, 'b, F: Field, S: Stage<F>> Mul<&'b Cell<F, S>> for &'a Cell<F, S> {
	type Output = S::Value;

	fn mul(self, rhs: &'b Cell<F, S>) -> S::Value {
		self.value.clone() * rhs.value.clone()
	}
}

impl<'a, F: Field, S: Stage<F>> Add<F> for &'a Cell<F, S> {
	type Output = S::Value;

	fn add(self, rhs: F) -> S::Value {
		self.value.clone() + S::constant(rhs)
	}
}

impl<'a, F: Field, S: Stage<F>> Sub<F> for &'a Cell<F, S> {
	type Output = S::Value;

	fn sub(self, rhs: F) -> S::Value {
		self.value.clone() - S::constant(rhs)
	}
}

impl<'a, F: Field, S: Stage<F>> Mul<F> for &'a Cell<F, S> {
	type Output = S::Value;

	fn mul(self, rhs: F) -> S::Value {
		self.value.clone() * S::constant(rhs)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_display() {
		let id = CellId {
			kind: ColumnKind::Witness,
			column: 3,
			row: 17,
		};
		assert_eq!(id.to_string(), "w3[17]");

		let var = Variable {
			kind: ColumnKind::PublicInput,
			column: 0,
			offset: -1,
		};
		assert_eq!(var.to_string(), "p0[-1]");

		let var = Variable {
			kind: ColumnKind::Witness,
			column: 2,
			offset: 0,
		};
		assert_eq!(var.to_string(), "w2");
	}
}
