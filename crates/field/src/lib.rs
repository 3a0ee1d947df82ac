// Copyright 2025 Irreducible Inc.

//! Finite field arithmetic for the trellis arithmetization engine.
//!
//! The engine is generic over any type implementing [`Field`]; this crate
//! additionally provides [`PrimeField64`], a concrete 64-bit prime field used
//! by the reference gadgets and the test suite.

mod field;
mod prime64;

pub use field::Field;
pub use prime64::{PrimeField64, P64};
