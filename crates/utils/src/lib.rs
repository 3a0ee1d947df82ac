// Copyright 2025 Irreducible Inc.

pub mod error_utils;
pub mod sparse_index;

pub use sparse_index::SparseIndex;
