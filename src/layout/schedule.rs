use crate::generation::{Generation, GenerationCounter};

/// Frame scheduling for one view's simulation.
///
/// The host's animation-frame facility drives ticks. At most one frame is
/// pending at a time, so a burst of requests collapses into a single
/// callback, and callbacks issued before [`TickLoop::stop`] are refused.
#[derive(Debug, Default)]
pub struct TickLoop {
	generations: GenerationCounter,
	running: bool,
	pending: bool,
}

impl TickLoop {
	/// A stopped loop.
	pub fn new() -> Self {
		Self::default()
	}

	/// Starts a new loop generation. Callbacks from older generations are
	/// refused from now on.
	pub fn start(&mut self) -> Generation {
		self.running = true;
		self.pending = false;
		self.generations.advance()
	}

	/// Cancels the loop; frames already requested become stale.
	pub fn stop(&mut self) {
		if self.running {
			self.running = false;
			self.pending = false;
			self.generations.advance();
		}
	}

	/// Whether the loop is started.
	pub fn is_running(&self) -> bool {
		self.running
	}

	/// Generation of the current (or last) run.
	pub fn generation(&self) -> Generation {
		self.generations.current()
	}

	/// Returns true when the caller should actually schedule a frame; false
	/// when one is already pending or the loop is stopped.
	pub fn request_frame(&mut self) -> bool {
		if !self.running || self.pending {
			return false;
		}
		self.pending = true;
		true
	}

	/// Called from the frame callback. Returns true if the frame should run.
	pub fn fire(&mut self, generation: Generation) -> bool {
		if !self.running || !self.pending || !self.generations.is_current(generation) {
			return false;
		}
		self.pending = false;
		true
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn requests_coalesce_until_fired() {
		let mut frames = TickLoop::new();
		let generation = frames.start();
		assert!(frames.request_frame());
		assert!(!frames.request_frame());
		assert!(!frames.request_frame());
		assert!(frames.fire(generation));
		assert!(!frames.fire(generation));
		assert!(frames.request_frame());
	}

	#[test]
	fn stopped_loop_refuses_pending_callbacks() {
		let mut frames = TickLoop::new();
		let generation = frames.start();
		assert!(frames.request_frame());
		frames.stop();
		assert!(!frames.fire(generation));
		assert!(!frames.request_frame());
	}

	#[test]
	fn restart_refuses_callbacks_from_previous_generation() {
		let mut frames = TickLoop::new();
		let old = frames.start();
		assert!(frames.request_frame());
		let new = frames.start();
		assert!(frames.request_frame());
		assert!(!frames.fire(old));
		assert!(frames.fire(new));
	}
}
