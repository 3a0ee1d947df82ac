// Copyright 2025 Irreducible Inc.

//! Circuit-arithmetization engine.
//!
//! The engine compiles a single piece of component logic into two artifacts
//! over a generic finite field: a concrete witness assignment (the execution
//! trace) and a polynomial constraint system (gates, copy constraints and
//! lookup arguments) proving the trace was computed correctly.
//!
//! A component's constructor runs twice, once per [`stage::Stage`]: under
//! [`stage::Assignment`] every table cell binds a concrete field value, under
//! [`stage::Constraints`] the same code path binds symbolic expressions over
//! table cells and records its obligations into a shared
//! [`registry::ConstraintRegistry`]. The two passes touch identical
//! coordinates, so the assignment pass's numbers are, cell for cell, a
//! satisfying witness for the constraints pass's polynomials.
//!
//! Construction happens inside a tree of [`context::Context`] windows carved
//! out of one table; after the constraints pass the accumulated registry is
//! flushed through [`optimizer::optimize`] into a deduplicated
//! [`constraint_system::ConstraintSystem`], the boundary artifact consumed by
//! the downstream proving protocol.

pub mod builder;
pub mod cell;
pub mod component;
pub mod constraint_system;
pub mod context;
pub mod error;
pub mod expr;
pub mod gadgets;
mod occupancy;
pub mod optimizer;
pub mod registry;
pub mod selector;
pub mod stage;
pub mod table;
pub mod validate;

pub use builder::CircuitBuilder;
pub use cell::{Cell, CellId, ColumnKind, Variable};
pub use component::{build_component, Component, TableShape};
pub use constraint_system::{
	ConstraintSystem, Gate, LookupGate, SelectorId, TableId, TableInfo, TableKind,
};
pub use context::Context;
pub use error::Error;
pub use expr::Expr;
pub use optimizer::optimize;
pub use registry::ConstraintRegistry;
pub use selector::RowSelector;
pub use stage::{Assignment, Constraints, Stage};
pub use table::TraceTable;
pub use trellis_field::Field;
pub use validate::{validate_witness, StaticTables};
