use leptos::ev::MouseEvent;
use leptos::prelude::*;
use log::info;

use crate::comparison::{ComparisonCompositor, SecondarySource, Side};
use crate::components::force_graph::GraphCanvas;
use crate::config::EngineConfig;
use crate::demo;
use crate::layout::Bounds;
use crate::overlay::Lens;
use crate::source::{DataPlan, GraphType, SessionContext};
use crate::view::{GraphView, Notice, NoticeLevel};

const DEFAULT_SUBJECT: &str = "octocat";
const SHOWN_NOTICES: usize = 3;

/// Builds the primary view. Without a live data service wired in, every
/// plan is shown with labelled sample data centred on the planned subject.
fn primary_view(session: &SessionContext) -> GraphView {
	let subject = match session.plan() {
		DataPlan::Live { subject } => subject,
		DataPlan::Illustrative => DEFAULT_SUBJECT.to_string(),
	};
	info!("showing network of `{subject}`");
	let mut view = GraphView::new("primary", subject, EngineConfig::default(), Bounds::new(800.0, 600.0));
	view.begin_load(GraphType::Followers);
	let payload = demo::sample_network(view.subject(), GraphType::Followers);
	view.load_sample(&payload);
	view
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let compositor = StoredValue::new_local(ComparisonCompositor::new(primary_view(
		&SessionContext::default(),
	)));
	let revision = RwSignal::new(0u64);
	let comparing = RwSignal::new(false);
	let bump = move || revision.update(|r| *r += 1);

	on_cleanup(move || {
		let _ = compositor.try_update_value(|c| c.dispose());
	});

	let select_graph_type = move |graph_type: GraphType| {
		compositor.update_value(|c| {
			let view = c.primary_mut();
			let lens = view.lens();
			view.begin_load(graph_type);
			let payload = demo::sample_network(view.subject(), graph_type);
			view.load_sample(&payload);
			view.show_fallback(lens);
		});
		bump();
	};

	let select_lens = move |lens: Lens| {
		compositor.update_value(|c| {
			c.primary_mut().show_fallback(lens);
			if let Some(secondary) = c.secondary_mut() {
				secondary.show_fallback(lens);
			}
		});
		bump();
	};

	let toggle_compare = move |_: MouseEvent| {
		let enabled = compositor
			.try_update_value(|c| {
				if c.is_enabled() {
					c.disable();
					return false;
				}
				c.enable(SecondarySource::Demo);
				if let Some(secondary) = c.secondary_mut() {
					secondary.resize(Bounds::new(480.0, 360.0));
				}
				true
			})
			.unwrap_or(false);
		comparing.set(enabled);
		bump();
	};

	let graph_type_buttons = GraphType::ALL
		.into_iter()
		.map(|graph_type| {
			let active = move || {
				revision.get();
				compositor.with_value(|c| c.primary().graph_type() == graph_type)
			};
			view! {
				<button class:active=active on:click=move |_| select_graph_type(graph_type)>
					{graph_type.label()}
				</button>
			}
		})
		.collect_view();

	let lens_buttons = Lens::ALL
		.into_iter()
		.map(|lens| {
			let active = move || {
				revision.get();
				compositor.with_value(|c| c.primary().lens() == lens)
			};
			view! {
				<button class:active=active on:click=move |_| select_lens(lens)>
					{lens.label()}
				</button>
			}
		})
		.collect_view();

	let selection = move || {
		revision.get();
		compositor.with_value(|c| {
			let view = c.primary();
			let id = view.selection()?;
			let node = view.graph().node(id.as_str())?;
			Some(format!("{} ({})", node.display.label, node.kind.label()))
		})
	};

	// Moves fresh notices out of the views after every change.
	let shown = RwSignal::new(Vec::<Notice>::new());
	Effect::new(move |_| {
		revision.track();
		let fresh = compositor
			.try_update_value(|c| {
				let mut fresh = c.primary_mut().take_notices();
				if let Some(secondary) = c.secondary_mut() {
					fresh.extend(secondary.take_notices());
				}
				fresh
			})
			.unwrap_or_default();
		if !fresh.is_empty() {
			shown.update(|list| {
				list.extend(fresh);
				let excess = list.len().saturating_sub(SHOWN_NOTICES);
				list.drain(..excess);
			});
		}
	});

	let notices = move || {
		shown
			.get()
			.into_iter()
			.rev()
			.map(|notice| {
				let class = match notice.level {
					NoticeLevel::Info => "notice info",
					NoticeLevel::Warning => "notice warning",
					NoticeLevel::Error => "notice error",
				};
				view! { <li class=class>{notice.message}</li> }
			})
			.collect_view()
	};

	view! {
		<div class="fullscreen-graph">
			<GraphCanvas
				compositor=compositor
				side=Side::Primary
				revision=revision
				fullscreen=true
			/>
			<div class="graph-overlay">
				<h1>"Developer Network"</h1>
				<p class="subtitle">
					"Drag nodes to reposition. Scroll to zoom. Drag background to pan."
				</p>
				<div class="controls">{graph_type_buttons}</div>
				<div class="controls">{lens_buttons}</div>
				<div class="controls">
					<button class:active=move || comparing.get() on:click=toggle_compare>
						"Compare"
					</button>
				</div>
				<p class="selection">
					{move || selection().unwrap_or_else(|| "Nothing selected".to_string())}
				</p>
				<ul class="notices">{notices}</ul>
			</div>
			<Show when=move || comparing.get()>
				<div class="comparison-panel">
					<GraphCanvas
						compositor=compositor
						side=Side::Secondary
						revision=revision
						width=Some(480.0)
						height=Some(360.0)
					/>
				</div>
			</Show>
		</div>
	}
}
