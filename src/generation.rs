//! Generation counters that let late callbacks detect they are stale.
//!
//! Layout handles, frame loops and fetch tickets all carry the generation they
//! were issued under. Anything that tears a view down advances the counter, so
//! a callback arriving afterwards compares unequal and is dropped.

/// An opaque stamp issued by a [`GenerationCounter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(u64);

impl Generation {
	/// Raw value, for logging.
	pub fn get(self) -> u64 {
		self.0
	}
}

/// Monotonic counter. Only the most recently issued generation is current.
#[derive(Clone, Debug, Default)]
pub struct GenerationCounter {
	current: u64,
}

impl GenerationCounter {
	/// Starts at the first generation.
	pub fn new() -> Self {
		Self::default()
	}

	/// Invalidates every previously issued generation and returns the new one.
	pub fn advance(&mut self) -> Generation {
		self.current += 1;
		Generation(self.current)
	}

	/// The most recently issued generation.
	pub fn current(&self) -> Generation {
		Generation(self.current)
	}

	/// Whether `generation` is the latest one issued.
	pub fn is_current(&self, generation: Generation) -> bool {
		generation.0 == self.current
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn advance_invalidates_older_generations() {
		let mut counter = GenerationCounter::new();
		let first = counter.advance();
		assert!(counter.is_current(first));

		let second = counter.advance();
		assert!(!counter.is_current(first));
		assert!(counter.is_current(second));
		assert!(second > first);
	}
}
