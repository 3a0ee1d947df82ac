// Copyright 2025 Irreducible Inc.

use std::{
	fmt,
	ops::{Add, Mul, Neg, Sub},
};

use trellis_field::Field;

use crate::cell::{CellId, Variable};

/// An arithmetic expression over field constants and variables of type `V`.
///
/// During construction expressions are built over absolute [`CellId`]s; on
/// registration they are rewritten over anchor-relative [`Variable`]s via
/// [`Expr::relativize`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr<F: Field, V = Variable> {
	Const(F),
	Var(V),
	Add(Box<Expr<F, V>>, Box<Expr<F, V>>),
	Sub(Box<Expr<F, V>>, Box<Expr<F, V>>),
	Mul(Box<Expr<F, V>>, Box<Expr<F, V>>),
	Neg(Box<Expr<F, V>>),
	Pow(Box<Expr<F, V>>, u64),
}

impl<F: Field, V> Expr<F, V> {
	pub fn constant(value: F) -> Self {
		Self::Const(value)
	}

	pub fn var(var: V) -> Self {
		Self::Var(var)
	}

	/// Exponentiate the expression by a constant power.
	pub fn pow(self, exp: u64) -> Self {
		Self::Pow(Box::new(self), exp)
	}

	/// Total degree of the expression, counting every variable as degree 1.
	pub fn degree(&self) -> usize {
		match self {
			Self::Const(_) => 0,
			Self::Var(_) => 1,
			Self::Add(lhs, rhs) | Self::Sub(lhs, rhs) => lhs.degree().max(rhs.degree()),
			Self::Mul(lhs, rhs) => lhs.degree() + rhs.degree(),
			Self::Neg(inner) => inner.degree(),
			Self::Pow(inner, exp) => inner.degree() * *exp as usize,
		}
	}

	/// Evaluates the expression, resolving variables through `resolve`.
	pub fn evaluate(&self, resolve: &mut impl FnMut(&V) -> F) -> F {
		match self {
			Self::Const(value) => *value,
			Self::Var(var) => resolve(var),
			Self::Add(lhs, rhs) => lhs.evaluate(resolve) + rhs.evaluate(resolve),
			Self::Sub(lhs, rhs) => lhs.evaluate(resolve) - rhs.evaluate(resolve),
			Self::Mul(lhs, rhs) => lhs.evaluate(resolve) * rhs.evaluate(resolve),
			Self::Neg(inner) => -inner.evaluate(resolve),
			Self::Pow(inner, exp) => inner.evaluate(resolve).pow(*exp),
		}
	}

	/// Fallible evaluation; the first resolution error aborts the walk.
	pub fn try_evaluate<E>(&self, resolve: &mut impl FnMut(&V) -> Result<F, E>) -> Result<F, E> {
		Ok(match self {
			Self::Const(value) => *value,
			Self::Var(var) => resolve(var)?,
			Self::Add(lhs, rhs) => lhs.try_evaluate(resolve)? + rhs.try_evaluate(resolve)?,
			Self::Sub(lhs, rhs) => lhs.try_evaluate(resolve)? - rhs.try_evaluate(resolve)?,
			Self::Mul(lhs, rhs) => lhs.try_evaluate(resolve)? * rhs.try_evaluate(resolve)?,
			Self::Neg(inner) => -inner.try_evaluate(resolve)?,
			Self::Pow(inner, exp) => inner.try_evaluate(resolve)?.pow(*exp),
		})
	}

	/// Rewrites every variable leaf through `map`.
	pub fn map_vars<W>(&self, map: &mut impl FnMut(&V) -> W) -> Expr<F, W> {
		match self {
			Self::Const(value) => Expr::Const(*value),
			Self::Var(var) => Expr::Var(map(var)),
			Self::Add(lhs, rhs) => {
				Expr::Add(Box::new(lhs.map_vars(map)), Box::new(rhs.map_vars(map)))
			}
			Self::Sub(lhs, rhs) => {
				Expr::Sub(Box::new(lhs.map_vars(map)), Box::new(rhs.map_vars(map)))
			}
			Self::Mul(lhs, rhs) => {
				Expr::Mul(Box::new(lhs.map_vars(map)), Box::new(rhs.map_vars(map)))
			}
			Self::Neg(inner) => Expr::Neg(Box::new(inner.map_vars(map))),
			Self::Pow(inner, exp) => Expr::Pow(Box::new(inner.map_vars(map)), *exp),
		}
	}

	/// Visits every variable leaf in left-to-right order.
	pub fn for_each_var(&self, visit: &mut impl FnMut(&V)) {
		match self {
			Self::Const(_) => {}
			Self::Var(var) => visit(var),
			Self::Add(lhs, rhs) | Self::Sub(lhs, rhs) | Self::Mul(lhs, rhs) => {
				lhs.for_each_var(visit);
				rhs.for_each_var(visit);
			}
			Self::Neg(inner) | Self::Pow(inner, _) => inner.for_each_var(visit),
		}
	}
}

impl<F: Field> Expr<F, CellId> {
	/// Rewrites absolute cell references into offsets from `anchor`.
	pub fn relativize(&self, anchor: usize) -> Expr<F, Variable> {
		self.map_vars(&mut |id| Variable {
			kind: id.kind,
			column: id.column,
			offset: id.row as i64 - anchor as i64,
		})
	}
}

impl<F: Field, V> Add for Expr<F, V> {
	type Output = Self;

	fn add(self, rhs: Self) -> Self {
		Self::Add(Box::new(self), Box::new(rhs))
	}
}

impl<F: Field, V> Sub for Expr<F, V> {
	type Output = Self;

	fn sub(self, rhs: Self) -> Self {
		Self::Sub(Box::new(self), Box::new(rhs))
	}
}

impl<F: Field, V> Mul for Expr<F, V> {
	type Output = Self;

	fn mul(self, rhs: Self) -> Self {
		Self::Mul(Box::new(self), Box::new(rhs))
	}
}

impl<F: Field, V> Neg for Expr<F, V> {
	type Output = Self;

	fn neg(self) -> Self {
		Self::Neg(Box::new(self))
	}
}

impl<F: Field, V> Add<F> for Expr<F, V> {
	type Output = Self;

	fn add(self, rhs: F) -> Self {
		self + Self::Const(rhs)
	}
}

impl<F: Field, V> Sub<F> for Expr<F, V> {
	type Output = Self;

	fn sub(self, rhs: F) -> Self {
		self - Self::Const(rhs)
	}
}

impl<F: Field, V> Mul<F> for Expr<F, V> {
	type Output = Self;

	fn mul(self, rhs: F) -> Self {
		self * Self::Const(rhs)
	}
}

impl<F: Field, V: fmt::Display> fmt::Display for Expr<F, V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Const(value) => write!(f, "{value}"),
			Self::Var(var) => write!(f, "{var}"),
			Self::Add(lhs, rhs) => write!(f, "{lhs} + {rhs}"),
			Self::Sub(lhs, rhs) => write!(f, "{lhs} - ({rhs})"),
			Self::Mul(lhs, rhs) => write!(f, "({lhs}) * ({rhs})"),
			Self::Neg(inner) => write!(f, "-({inner})"),
			Self::Pow(inner, exp) => write!(f, "({inner})^{exp}"),
		}
	}
}

#[cfg(test)]
mod tests {
	use trellis_field::{Field, P64};

	use super::*;
	use crate::cell::ColumnKind;

	fn wid(column: usize, row: usize) -> CellId {
		CellId {
			kind: ColumnKind::Witness,
			column,
			row,
		}
	}

	#[test]
	fn test_evaluate() {
		let expr: Expr<P64, CellId> =
			Expr::var(wid(0, 0)) + Expr::var(wid(0, 1)) - Expr::var(wid(1, 0));
		let value = expr.evaluate(&mut |id| match (id.column, id.row) {
			(0, 0) => P64::from_u64(5),
			(0, 1) => P64::from_u64(7),
			(1, 0) => P64::from_u64(12),
			_ => unreachable!(),
		});
		assert_eq!(value, P64::ZERO);
	}

	#[test]
	fn test_relativize() {
		let expr: Expr<P64, CellId> = Expr::var(wid(2, 5)) * Expr::var(wid(0, 4));
		let relative = expr.relativize(4);
		let mut offsets = Vec::new();
		relative.for_each_var(&mut |var| offsets.push((var.column, var.offset)));
		assert_eq!(offsets, vec![(2, 1), (0, 0)]);
	}

	#[test]
	fn test_degree() {
		let x: Expr<P64, CellId> = Expr::var(wid(0, 0));
		let y: Expr<P64, CellId> = Expr::var(wid(1, 0));
		assert_eq!((x.clone() + y.clone()).degree(), 1);
		assert_eq!((x.clone() * y).degree(), 2);
		assert_eq!(x.pow(3).degree(), 3);
	}

	#[test]
	fn test_display() {
		let expr: Expr<P64, Variable> = Expr::var(Variable {
			kind: ColumnKind::Witness,
			column: 0,
			offset: 0,
		}) + Expr::constant(P64::ONE);
		assert_eq!(expr.to_string(), "w0 + 1");
	}
}
