//! Side-by-side comparison of two independent views.
//!
//! The primary view always exists. The secondary view exists only while
//! comparison is enabled; it gets its own force parameters, engine, frame
//! loop, selection and tooltip, and is disposed before it is dropped.

use log::info;
use serde_json::Value;

use crate::config::EngineConfig;
use crate::demo;
use crate::generation::{Generation, GenerationCounter};
use crate::view::GraphView;

/// Which of the two canvases an event or frame belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
	/// The account being viewed.
	Primary,
	/// The comparison panel.
	Secondary,
}

/// What the secondary view should show.
#[derive(Clone, Debug, PartialEq)]
pub enum SecondarySource {
	/// Another account's network, already fetched.
	Payload {
		/// Raw network payload, normalized on enable.
		payload: Value,
		/// Login of the compared account.
		subject: String,
	},
	/// The built-in demo network, labelled as sample data.
	Demo,
}

/// Borrowed view of what is currently on screen.
pub struct ActiveSessions<'a> {
	/// The main view.
	pub primary: &'a GraphView,
	/// The comparison view, while one is open.
	pub secondary: Option<&'a GraphView>,
}

/// Owns the primary view and, while comparing, a secondary one.
///
/// The two never share layout, interaction or overlay state.
pub struct ComparisonCompositor {
	primary: GraphView,
	secondary: Option<GraphView>,
	secondary_config: EngineConfig,
	sessions: GenerationCounter,
}

impl ComparisonCompositor {
	/// Starts with comparison off.
	pub fn new(primary: GraphView) -> Self {
		Self {
			primary,
			secondary: None,
			secondary_config: EngineConfig::secondary(),
			sessions: GenerationCounter::new(),
		}
	}

	/// Overrides the configuration used for secondary views.
	pub fn with_secondary_config(mut self, config: EngineConfig) -> Self {
		self.secondary_config = config;
		self
	}

	/// Opens (or replaces) the secondary view. Returns the new session's
	/// generation; frame loops bound to older sessions should stop.
	pub fn enable(&mut self, source: SecondarySource) -> Generation {
		self.dispose_secondary();
		let session = self.sessions.advance();
		let graph_type = self.primary.graph_type();
		let bounds = self.primary.bounds();

		let view = match source {
			SecondarySource::Payload { payload, subject } => {
				let mut view = GraphView::new("secondary", subject, self.secondary_config.clone(), bounds);
				let ticket = view.begin_load(graph_type);
				view.complete_load(&ticket, Ok(payload));
				view
			}
			SecondarySource::Demo => {
				let mut view =
					GraphView::new("secondary", "demo-user", self.secondary_config.clone(), bounds);
				view.begin_load(graph_type);
				view.load_sample(&demo::comparison_network());
				view
			}
		};
		info!(
			"comparison session {} opened for `{}` ({} nodes)",
			session.get(),
			view.subject(),
			view.graph().node_count()
		);
		self.secondary = Some(view);
		session
	}

	/// Closes the secondary view. Returns `false` if it was not open.
	pub fn disable(&mut self) -> bool {
		let was_enabled = self.dispose_secondary();
		if was_enabled {
			self.sessions.advance();
			info!("comparison closed");
		}
		was_enabled
	}

	fn dispose_secondary(&mut self) -> bool {
		match self.secondary.as_mut() {
			Some(view) => {
				view.dispose();
				self.secondary = None;
				true
			}
			None => false,
		}
	}

	/// Whether a secondary view is open.
	pub fn is_enabled(&self) -> bool {
		self.secondary.is_some()
	}

	/// Both views as they are now.
	pub fn active_sessions(&self) -> ActiveSessions<'_> {
		ActiveSessions {
			primary: &self.primary,
			secondary: self.secondary.as_ref(),
		}
	}

	/// Generation of the current comparison session.
	pub fn session(&self) -> Generation {
		self.sessions.current()
	}

	/// Whether `session` is still the open one. A canvas bound to an older session stops its loop.
	pub fn is_current_session(&self, session: Generation) -> bool {
		self.sessions.is_current(session)
	}

	/// The main view; always present.
	pub fn primary(&self) -> &GraphView {
		&self.primary
	}

	/// Mutable access to the main view.
	pub fn primary_mut(&mut self) -> &mut GraphView {
		&mut self.primary
	}

	/// The comparison view, while comparing.
	pub fn secondary(&self) -> Option<&GraphView> {
		self.secondary.as_ref()
	}

	/// Mutable access to the comparison view.
	pub fn secondary_mut(&mut self) -> Option<&mut GraphView> {
		self.secondary.as_mut()
	}

	/// The view on `side`, if it exists.
	pub fn view(&self, side: Side) -> Option<&GraphView> {
		match side {
			Side::Primary => Some(&self.primary),
			Side::Secondary => self.secondary.as_ref(),
		}
	}

	/// Mutable access to the view on `side`.
	pub fn view_mut(&mut self, side: Side) -> Option<&mut GraphView> {
		match side {
			Side::Primary => Some(&mut self.primary),
			Side::Secondary => self.secondary.as_mut(),
		}
	}

	/// Tears down both views, e.g. when the page unmounts.
	pub fn dispose(&mut self) {
		self.disable();
		self.primary.dispose();
	}
}
