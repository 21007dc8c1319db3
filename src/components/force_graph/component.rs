use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::html::Canvas;
use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::render;
use crate::comparison::{ComparisonCompositor, Side};
use crate::generation::Generation;
use crate::interaction::PointerOutcome;
use crate::layout::Bounds;
use crate::view::GraphView;

const FRAME_DT: f64 = 0.016;

fn viewport(window: &Window) -> Option<(f64, f64)> {
	let w = window.inner_width().ok()?.as_f64()?;
	let h = window.inner_height().ok()?.as_f64()?;
	Some((w, h))
}

fn pointer(canvas_ref: NodeRef<Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Canvas bound to one side of a comparison. The compositor owns the view;
/// this component only sizes the canvas, forwards pointer input and paints
/// the scenes the view produces.
///
/// `revision` is bumped whenever a pointer gesture changes the selection so
/// surrounding panels can re-read the view.
#[component]
pub fn GraphCanvas(
	compositor: StoredValue<ComparisonCompositor, LocalStorage>,
	side: Side,
	revision: RwSignal<u64>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<Canvas>::new();
	let alive = Arc::new(AtomicBool::new(true));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (alive_init, animate_init, resize_cb_init) = (alive.clone(), animate.clone(), resize_cb.clone());

	on_cleanup({
		let alive = alive.clone();
		move || alive.store(false, Ordering::Relaxed)
	});

	let with_view = move |f: &mut dyn FnMut(&mut GraphView)| {
		compositor.update_value(|c| {
			if let Some(view) = c.view_mut(side) {
				f(view);
			}
		});
	};

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			viewport(&window).unwrap_or((800.0, 600.0))
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		with_view(&mut |view| view.resize(Bounds::new(w, h)));

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("{side:?} canvas has no 2d context");
			return;
		};

		if fullscreen {
			let (alive_resize, canvas_resize) = (alive_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				if !alive_resize.load(Ordering::Relaxed) {
					return;
				}
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(viewport) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				with_view(&mut |view| view.resize(Bounds::new(nw, nh)));
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		// The secondary canvas belongs to one comparison session; a newer
		// session gets a newly mounted canvas.
		let session = compositor.with_value(ComparisonCompositor::session);
		let pending: Rc<Cell<Option<Generation>>> = Rc::new(Cell::new(None));
		let (alive_anim, animate_inner) = (alive_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let live = alive_anim.load(Ordering::Relaxed)
				&& compositor
					.try_with_value(|c| side == Side::Primary || c.is_current_session(session))
					.unwrap_or(false);
			if !live {
				debug!("{side:?} frame loop stopped");
				return;
			}

			let scene = compositor
				.try_update_value(|c| {
					let view = c.view_mut(side)?;
					Some(match pending.take() {
						Some(generation) => view
							.run_frame(generation, FRAME_DT)
							.unwrap_or_else(|| view.scene()),
						None => view.scene(),
					})
				})
				.flatten();
			if let Some(scene) = scene {
				render::paint(&scene, &ctx);
			}

			pending.set(
				compositor
					.try_update_value(|c| c.view_mut(side).and_then(GraphView::request_frame))
					.flatten(),
			);
			if let (Some(window), Some(cb)) = (web_sys::window(), animate_inner.borrow().as_ref()) {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		with_view(&mut |view| {
			if let Err(error) = view.pointer_down(x, y) {
				warn!("{side:?} pointer down: {error}");
			}
		});
	};

	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		with_view(&mut |view| {
			if let Err(error) = view.pointer_move(x, y) {
				warn!("{side:?} pointer move: {error}");
			}
		});
	};

	let on_mouseup = move |_: MouseEvent| {
		let mut clicked = false;
		with_view(&mut |view| match view.pointer_up() {
			Ok(PointerOutcome::Click(_)) => clicked = true,
			Ok(_) => {}
			Err(error) => warn!("{side:?} pointer up: {error}"),
		});
		if clicked {
			revision.update(|r| *r += 1);
		}
	};

	let on_mouseleave = move |_: MouseEvent| {
		with_view(&mut |view| {
			if let Err(error) = view.pointer_leave() {
				warn!("{side:?} pointer leave: {error}");
			}
		});
	};

	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		with_view(&mut |view| view.wheel(x, y, ev.delta_y()));
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
