// Copyright 2025 Irreducible Inc.

//! Early-return macros used with the typed error enums across the workspace.
//!
//! With the `bail_panic` feature enabled, a failed condition panics instead of
//! returning, which turns every construction-time contract violation into an
//! immediate abort with the formatted error message. Useful when bisecting a
//! misbehaving circuit description under a debugger.

#[cfg(feature = "bail_panic")]
#[macro_export]
macro_rules! bail {
	($err:expr) => {
		panic!("{}", $err);
	};
}

#[cfg(not(feature = "bail_panic"))]
#[macro_export]
macro_rules! bail {
	($err:expr) => {
		return Err($err.into());
	};
}

#[macro_export]
macro_rules! ensure {
	($cond:expr, $err:expr) => {
		if !$cond {
			$crate::bail!($err);
		}
	};
}
