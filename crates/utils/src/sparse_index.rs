// Copyright 2025 Irreducible Inc.

/// An index mapping small non-negative integer IDs to optional values.
///
/// IDs are expected to be dense near zero; storage is proportional to the
/// largest ID that has been set.
#[derive(Debug, Clone)]
pub struct SparseIndex<T> {
	entries: Vec<Option<T>>,
}

impl<T> SparseIndex<T> {
	pub fn new() -> Self {
		Self {
			entries: Vec::new(),
		}
	}

	pub fn get(&self, id: usize) -> Option<&T> {
		self.entries.get(id)?.as_ref()
	}

	pub fn get_mut(&mut self, id: usize) -> Option<&mut T> {
		self.entries.get_mut(id)?.as_mut()
	}

	pub fn contains(&self, id: usize) -> bool {
		self.get(id).is_some()
	}

	pub fn set(&mut self, id: usize, val: T) {
		if self.entries.len() <= id {
			self.entries.resize_with(id + 1, || None);
		}
		self.entries[id] = Some(val);
	}

	/// Iterates the populated entries in increasing ID order.
	pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
		self.entries
			.iter()
			.enumerate()
			.filter_map(|(id, entry)| entry.as_ref().map(|val| (id, val)))
	}
}

impl<T> Default for SparseIndex<T> {
	fn default() -> Self {
		Self::new()
	}
}
