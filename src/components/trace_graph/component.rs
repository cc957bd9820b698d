use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::render;
use super::state::TraceGraphState;
use crate::graph::{DecoratedGraph, HighlightSet, LayoutOptions, TraceGraph, layout_graph};

fn window_size(window: &Window) -> (f64, f64) {
	(
		window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0),
		window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0),
	)
}

/// Canvas rendering of a laid-out trace graph.
///
/// Layout reruns only when `graph` or `options` change; a new `highlight`
/// only re-derives the overlay. Clicking a node (press and release without
/// dragging) reports its id through `on_node_click`.
#[component]
pub fn TraceGraphCanvas(
	/// Graph to draw.
	#[prop(into)]
	graph: Signal<TraceGraph>,
	/// Current emphasis, replaced wholesale by the caller.
	#[prop(into)]
	highlight: Signal<HighlightSet>,
	/// Layout direction and spacing.
	#[prop(into, optional)]
	options: Option<Signal<LayoutOptions>>,
	/// Called with the id of a clicked node.
	#[prop(optional)]
	on_node_click: Option<Callback<String>>,
	/// Fill the window and follow resizes.
	#[prop(default = false)]
	fullscreen: bool,
	/// Fixed width; defaults to the parent's width.
	#[prop(default = None)]
	width: Option<f64>,
	/// Fixed height; defaults to the parent's height.
	#[prop(default = None)]
	height: Option<f64>,
) -> impl IntoView {
	let options = options.unwrap_or_else(|| Signal::stored(LayoutOptions::default()));

	let positioned = Memo::new(move |_| graph.with(|g| options.with(|o| layout_graph(g, o))));
	let decorated = Memo::new(move |_| {
		positioned.with(|result| match result {
			Ok(p) => highlight.with(|h| DecoratedGraph::new(p, h)),
			Err(_) => DecoratedGraph::default(),
		})
	});

	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state = Rc::new(RefCell::new(TraceGraphState::new(0.0, 0.0)));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));

	let state_layout = state.clone();
	Effect::new(move |_| {
		let result = positioned.get();
		let direction = options.with(|o| o.direction);
		if let Err(err) = &result {
			warn!("could not lay out this trace: {}", err);
		}
		state_layout.borrow_mut().set_layout(result, direction);
	});

	let state_overlay = state.clone();
	Effect::new(move |_| {
		state_overlay.borrow_mut().set_decorated(decorated.get());
	});

	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window)
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

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("canvas 2d context unavailable");
			return;
		};
		state_init.borrow_mut().resize(w, h);

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = window_size(&win);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				state_resize.borrow_mut().resize(nw, nh);
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			{
				let mut s = state_anim.borrow_mut();
				s.tick(0.016);
				render::render(&s, &ctx);
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let pointer = move |ev: &MouseEvent| -> Option<(f64, f64)> {
		let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
		let rect = canvas.get_bounding_client_rect();
		Some((
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	};

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if let Some((x, y)) = pointer(&ev) {
			state_md.borrow_mut().press(x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let Some((x, y)) = pointer(&ev) {
			state_mm.borrow_mut().move_to(x, y);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		let clicked = state_mu.borrow_mut().release();
		if let Some(id) = clicked {
			debug!("node clicked: {}", id);
			if let Some(cb) = on_node_click {
				cb.run(id);
			}
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		state_ml.borrow_mut().leave();
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some((x, y)) = pointer(&ev) {
			state_wh.borrow_mut().zoom(x, y, ev.delta_y());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="trace-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
