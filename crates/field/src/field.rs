// Copyright 2025 Irreducible Inc.

use std::{
	fmt::{Debug, Display},
	hash::Hash,
	iter::{Product, Sum},
	ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign},
};

use rand::RngCore;

/// An element of a finite field.
pub trait Field:
	Sized
	+ Eq
	+ Copy
	+ Clone
	+ Default
	+ Send
	+ Sync
	+ Debug
	+ Display
	+ Hash
	+ 'static
	+ Neg<Output = Self>
	+ Add<Output = Self>
	+ Sub<Output = Self>
	+ Mul<Output = Self>
	+ Sum
	+ Product
	+ AddAssign
	+ SubAssign
	+ MulAssign
{
	/// The zero element of the field, the additive identity.
	const ZERO: Self;

	/// The one element of the field, the multiplicative identity.
	const ONE: Self;

	/// Maps an integer into the field by reduction modulo the characteristic.
	fn from_u64(val: u64) -> Self;

	/// Returns an element sampled uniformly at random.
	fn random(rng: impl RngCore) -> Self;

	fn square(self) -> Self {
		self * self
	}

	/// Exponentiation by squaring.
	fn pow(self, mut exp: u64) -> Self {
		let mut acc = Self::ONE;
		let mut base = self;
		while exp != 0 {
			if exp & 1 == 1 {
				acc *= base;
			}
			base = base.square();
			exp >>= 1;
		}
		acc
	}

	/// The multiplicative inverse, or `None` for zero.
	fn invert(self) -> Option<Self>;

	fn invert_or_zero(self) -> Self {
		self.invert().unwrap_or(Self::ZERO)
	}

	fn is_zero(&self) -> bool {
		*self == Self::ZERO
	}
}
