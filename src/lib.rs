//! Interactive force-directed view of a developer's social graph: followers,
//! collaborators and repositories, with algorithm overlays (rankings,
//! communities, paths, recommendations) and a side-by-side comparison mode.
//!
//! Everything below [`view`] is plain Rust and runs anywhere; the Leptos
//! components only size canvases, forward pointer input and paint scenes.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

pub mod comparison;
pub mod config;
pub mod demo;
pub mod error;
pub mod generation;
pub mod graph;
pub mod interaction;
pub mod layout;
pub mod overlay;
pub mod scene;
pub mod source;
pub mod view;

mod components;
mod pages;

pub use error::{Error, Result};

use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// An app router which renders the network page and handles 404's
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />

		<Title text="Developer Network" />

		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
			</Routes>
		</Router>
	}
}
