// Copyright 2025 Irreducible Inc.

use std::{
	fmt,
	iter::{Product, Sum},
	ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign},
};

use rand::RngCore;

use crate::field::Field;

/// The 64-bit prime field with modulus `2^64 - 2^32 + 1`.
///
/// Elements are kept in canonical form: the wrapped integer is always in
/// `[0, MODULUS)`, so derived equality and hashing are structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct PrimeField64(u64);

pub type P64 = PrimeField64;

impl PrimeField64 {
	pub const MODULUS: u64 = 0xffff_ffff_0000_0001;

	/// `2^64 mod MODULUS`, used to fold the high half of wide products.
	const EPSILON: u64 = 0xffff_ffff;

	pub const fn new(val: u64) -> Self {
		Self(canonicalize(val))
	}

	pub const fn val(self) -> u64 {
		self.0
	}
}

const fn canonicalize(val: u64) -> u64 {
	if val >= PrimeField64::MODULUS {
		val - PrimeField64::MODULUS
	} else {
		val
	}
}

/// Reduces a 128-bit product using `2^64 ≡ 2^32 - 1` and `2^96 ≡ -1`.
const fn reduce128(x: u128) -> u64 {
	let x_lo = x as u64;
	let x_hi = (x >> 64) as u64;
	let x_hi_hi = x_hi >> 32;
	let x_hi_lo = x_hi & PrimeField64::EPSILON;

	// x ≡ x_lo + EPSILON * x_hi_lo - x_hi_hi (mod MODULUS)
	let (mut t0, borrow) = x_lo.overflowing_sub(x_hi_hi);
	if borrow {
		t0 = t0.wrapping_sub(PrimeField64::EPSILON);
	}
	let t1 = x_hi_lo * PrimeField64::EPSILON;
	let (mut t2, carry) = t0.overflowing_add(t1);
	if carry {
		t2 = t2.wrapping_add(PrimeField64::EPSILON);
	}
	canonicalize(t2)
}

impl Add for PrimeField64 {
	type Output = Self;

	fn add(self, rhs: Self) -> Self {
		let (sum, carry) = self.0.overflowing_add(rhs.0);
		if carry {
			// Both operands are canonical, so the adjusted sum is too.
			Self(sum.wrapping_add(Self::EPSILON))
		} else {
			Self(canonicalize(sum))
		}
	}
}

impl Sub for PrimeField64 {
	type Output = Self;

	fn sub(self, rhs: Self) -> Self {
		if self.0 >= rhs.0 {
			Self(self.0 - rhs.0)
		} else {
			Self(self.0 + (Self::MODULUS - rhs.0))
		}
	}
}

impl Neg for PrimeField64 {
	type Output = Self;

	fn neg(self) -> Self {
		if self.0 == 0 {
			self
		} else {
			Self(Self::MODULUS - self.0)
		}
	}
}

impl Mul for PrimeField64 {
	type Output = Self;

	fn mul(self, rhs: Self) -> Self {
		Self(reduce128(self.0 as u128 * rhs.0 as u128))
	}
}

impl AddAssign for PrimeField64 {
	fn add_assign(&mut self, rhs: Self) {
		*self = *self + rhs;
	}
}

impl SubAssign for PrimeField64 {
	fn sub_assign(&mut self, rhs: Self) {
		*self = *self - rhs;
	}
}

impl MulAssign for PrimeField64 {
	fn mul_assign(&mut self, rhs: Self) {
		*self = *self * rhs;
	}
}

impl Sum for PrimeField64 {
	fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
		iter.fold(Self::ZERO, |acc, x| acc + x)
	}
}

impl Product for PrimeField64 {
	fn product<I: Iterator<Item = Self>>(iter: I) -> Self {
		iter.fold(Self::ONE, |acc, x| acc * x)
	}
}

impl From<u64> for PrimeField64 {
	fn from(val: u64) -> Self {
		Self::new(val)
	}
}

impl From<u32> for PrimeField64 {
	fn from(val: u32) -> Self {
		Self(val as u64)
	}
}

impl fmt::Display for PrimeField64 {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl Field for PrimeField64 {
	const ZERO: Self = Self(0);
	const ONE: Self = Self(1);

	fn from_u64(val: u64) -> Self {
		Self::new(val)
	}

	fn random(mut rng: impl RngCore) -> Self {
		// Rejection sampling keeps the distribution uniform.
		loop {
			let val = rng.next_u64();
			if val < Self::MODULUS {
				return Self(val);
			}
		}
	}

	fn invert(self) -> Option<Self> {
		if self.0 == 0 {
			None
		} else {
			Some(self.pow(Self::MODULUS - 2))
		}
	}
}
