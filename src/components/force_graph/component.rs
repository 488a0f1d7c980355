use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::error::GraphError;
use super::events::{LinkEvent, NodeEvent};
use super::options::RenderOptions;
use super::render;
use super::state::GraphState;
use super::theme::Theme;
use super::types::DomainGraph;
use super::viewport::Transform;

type StateCell = Rc<RefCell<Option<GraphState>>>;
type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Handle to the renderer behind a mounted [`ForceGraphCanvas`].
///
/// Pages keep a clone to drive zoom, animations and export from their own
/// controls. Calls made before the canvas mounts, or from inside a renderer
/// callback, return `None`.
#[derive(Clone, Default)]
pub struct GraphController {
	state: StateCell,
}

impl GraphController {
	/// Run `f` against the live renderer.
	pub fn with<R>(&self, f: impl FnOnce(&mut GraphState) -> R) -> Option<R> {
		let Ok(mut guard) = self.state.try_borrow_mut() else {
			log::warn!("graph renderer busy, call dropped");
			return None;
		};
		guard.as_mut().map(f)
	}

	/// Like [`GraphController::with`] for fallible renderer calls; errors are logged.
	pub fn run(&self, what: &str, f: impl FnOnce(&mut GraphState) -> Result<(), GraphError>) {
		if let Some(Err(err)) = self.with(f) {
			log::error!("{what} failed: {err}");
		}
	}
}

fn surface_size(canvas: &HtmlCanvasElement, window: &Window, fullscreen: bool, options: &RenderOptions) -> (f64, f64) {
	if fullscreen {
		let w = window.inner_width().ok().and_then(|v| v.as_f64());
		let h = window.inner_height().ok().and_then(|v| v.as_f64());
		return (w.unwrap_or(options.width), h.unwrap_or(options.height));
	}
	match canvas.parent_element() {
		Some(parent) if parent.client_width() > 0 && parent.client_height() > 0 => {
			(parent.client_width() as f64, parent.client_height() as f64)
		}
		_ => (options.width, options.height),
	}
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, GraphError> {
	canvas
		.get_context("2d")
		.ok()
		.flatten()
		.and_then(|ctx| ctx.dyn_into().ok())
		.ok_or(GraphError::MissingContext)
}

fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Force-directed mind map / structural model on a canvas.
///
/// `data` and `focus` changes re-render with enter/exit transitions, `theme`
/// changes restyle in place.
#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] data: Signal<DomainGraph>,
	#[prop(optional, into)] focus: Option<Signal<Option<String>>>,
	#[prop(optional, into)] theme: Option<Signal<Theme>>,
	#[prop(optional)] options: Option<RenderOptions>,
	#[prop(optional)] controller: Option<GraphController>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(optional, into)] on_node_click: Option<Callback<NodeEvent>>,
	#[prop(optional, into)] on_node_double_click: Option<Callback<NodeEvent>>,
	#[prop(optional, into)] on_node_hover: Option<Callback<Option<NodeEvent>>>,
	#[prop(optional, into)] on_link_click: Option<Callback<LinkEvent>>,
	#[prop(optional, into)] on_background_click: Option<Callback<(f64, f64)>>,
	#[prop(optional, into)] on_zoom: Option<Callback<Transform>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state = controller.unwrap_or_default().state;
	let animate: FrameCallback = Rc::new(RefCell::new(None));
	let resize_cb: FrameCallback = Rc::new(RefCell::new(None));
	let frame_id: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
	let options = options.unwrap_or_default();
	let (state_init, animate_init, resize_cb_init, frame_id_init) =
		(state.clone(), animate.clone(), resize_cb.clone(), frame_id.clone());

	Effect::new(move |_| {
		let graph = data.get();
		let focus = focus.and_then(|f| f.get());
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		if state_init.borrow().is_none() {
			let (w, h) = surface_size(&canvas, &window, fullscreen, &options);
			canvas.set_width(w as u32);
			canvas.set_height(h as u32);

			let ctx = match context_2d(&canvas) {
				Ok(ctx) => ctx,
				Err(err) => {
					log::error!("{err}");
					return;
				}
			};
			let mut opts = options.clone();
			opts.width = w;
			opts.height = h;
			if let Some(theme) = theme {
				opts.theme = theme.get_untracked();
			}
			let mut graph_state = match GraphState::new(opts) {
				Ok(s) => s,
				Err(err) => {
					log::error!("graph renderer not created: {err}");
					return;
				}
			};

			let callbacks = graph_state.callbacks_mut();
			if let Some(cb) = on_node_click {
				callbacks.node_click.subscribe(move |e| cb.run(e.clone()));
			}
			if let Some(cb) = on_node_double_click {
				callbacks.node_double_click.subscribe(move |e| cb.run(e.clone()));
			}
			if let Some(cb) = on_node_hover {
				callbacks.node_hover.subscribe(move |e| cb.run(e.clone()));
			}
			if let Some(cb) = on_link_click {
				callbacks.link_click.subscribe(move |e| cb.run(e.clone()));
			}
			if let Some(cb) = on_background_click {
				callbacks.background_click.subscribe(move |e| cb.run((e.x, e.y)));
			}
			if let Some(cb) = on_zoom {
				graph_state.on_zoom(move |t| cb.run(*t));
			}
			graph_state.tick(js_sys::Date::now());
			*state_init.borrow_mut() = Some(graph_state);

			if fullscreen {
				let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
				*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
					let Some(win) = web_sys::window() else {
						return;
					};
					let (nw, nh) = surface_size(&canvas_resize, &win, true, &RenderOptions::default());
					canvas_resize.set_width(nw as u32);
					canvas_resize.set_height(nh as u32);
					if let Ok(mut guard) = state_resize.try_borrow_mut() {
						if let Some(s) = guard.as_mut() {
							if let Err(err) = s.resize(nw, nh) {
								log::warn!("resize ignored: {err}");
							}
						}
					}
				}));
				if let Some(ref cb) = *resize_cb_init.borrow() {
					let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
				}
			}

			let (state_anim, animate_inner, frame_inner) =
				(state_init.clone(), animate_init.clone(), frame_id_init.clone());
			*animate_init.borrow_mut() = Some(Closure::new(move || {
				frame_inner.set(None);
				if let Ok(mut guard) = state_anim.try_borrow_mut() {
					if let Some(s) = guard.as_mut() {
						if s.is_destroyed() {
							return;
						}
						if s.tick(js_sys::Date::now()) {
							render::render(&s.frame(), &ctx);
						}
					}
				}
				if let (Some(win), Some(cb)) = (web_sys::window(), animate_inner.borrow().as_ref()) {
					frame_inner.set(win.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
				}
			}));
			if let Some(ref cb) = *animate_init.borrow() {
				frame_id_init.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
			}
		}

		if let Ok(mut guard) = state_init.try_borrow_mut() {
			if let Some(s) = guard.as_mut() {
				if let Err(err) = s.render(&graph, focus.as_deref()) {
					log::error!("render failed: {err}");
				}
			}
		}
	});

	if let Some(theme) = theme {
		let state_theme = state.clone();
		Effect::new(move |_| {
			let theme = theme.get();
			if let Ok(mut guard) = state_theme.try_borrow_mut() {
				if let Some(s) = guard.as_mut() {
					if let Err(err) = s.set_theme(theme) {
						log::warn!("theme change ignored: {err}");
					}
				}
			}
		});
	}

	let teardown = StoredValue::new_local((state.clone(), animate, resize_cb, frame_id));
	on_cleanup(move || {
		teardown.try_with_value(|(state, animate, resize_cb, frame_id)| {
			if let Ok(mut guard) = state.try_borrow_mut() {
				if let Some(s) = guard.as_mut() {
					s.destroy();
				}
			}
			if let Some(win) = web_sys::window() {
				if let Some(id) = frame_id.take() {
					let _ = win.cancel_animation_frame(id);
				}
				if let Some(cb) = resize_cb.borrow_mut().take() {
					let _ = win.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
				}
			}
			animate.borrow_mut().take();
		});
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Ok(mut guard) = state_md.try_borrow_mut() {
			if let Some(s) = guard.as_mut() {
				s.pointer_down(x, y);
			}
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Ok(mut guard) = state_mm.try_borrow_mut() {
			if let Some(s) = guard.as_mut() {
				s.pointer_move(x, y);
			}
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Ok(mut guard) = state_mu.try_borrow_mut() {
			if let Some(s) = guard.as_mut() {
				s.pointer_up(x, y);
			}
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Ok(mut guard) = state_ml.try_borrow_mut() {
			if let Some(s) = guard.as_mut() {
				s.pointer_leave();
			}
		}
	};

	let state_dc = state.clone();
	let on_dblclick = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Ok(mut guard) = state_dc.try_borrow_mut() {
			if let Some(s) = guard.as_mut() {
				s.double_click(x, y);
			}
		}
	};

	let state_wh = state;
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Ok(mut guard) = state_wh.try_borrow_mut() {
			if let Some(s) = guard.as_mut() {
				s.wheel(x, y, ev.delta_y());
			}
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:dblclick=on_dblclick
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
