// Copyright 2025 Irreducible Inc.

//! Reference gadgets exercising the engine.
//!
//! Real primitives (hash permutations, curve arithmetic, opcode circuits)
//! live in client crates; the gadgets here are the minimal demonstrations of
//! the component contract, the witnessed-hint lowering and the lookup
//! argument that the test suite drives the engine with.

pub mod range_check;
pub mod sum;
