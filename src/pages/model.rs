use leptos::prelude::*;
use web_sys::{Event, MouseEvent};

use super::home::{ThemePicker, load_graph};
use crate::components::force_graph::{
	ForceGraphCanvas, GraphController, LinkEvent, NodeEvent, RenderOptions, Theme,
};

const STRUCTURAL_MODEL: &str = include_str!("data/structural_model.json");
const STEP_MS: f64 = 1_200.0;
const PARTICLE_MS: f64 = 1_500.0;

/// Structural model with learning-path playback and SVG export.
#[component]
pub fn Model() -> impl IntoView {
	let graph = StoredValue::new(load_graph("structural model", STRUCTURAL_MODEL));
	let graph_data = Signal::derive(move || graph.get_value());
	let theme = RwSignal::new(Theme::Colorful);
	let playing = RwSignal::new(false);
	let speed = RwSignal::new(1.0_f64);
	let clicked = RwSignal::new(None::<LinkEvent>);
	let hovered = RwSignal::new(None::<NodeEvent>);
	let download = RwSignal::new(None::<String>);
	let controller = GraphController::default();
	let options = RenderOptions {
		expand_on_double_click: false,
		link_curvature: 30.0,
		..RenderOptions::sized(900.0, 600.0)
	};

	// trace the clicked relationship with a particle
	let tracer = controller.clone();
	Effect::new(move |_| {
		let Some(link) = clicked.get() else {
			return;
		};
		tracer.run("path animation", |s| {
			s.start_path_animation(&link.source, &link.target, PARTICLE_MS, None)
		});
	});

	let play = controller.clone();
	let on_play = move |_: MouseEvent| {
		let Some(path) = graph.with_value(|g| g.learning_paths.first().cloned()) else {
			log::warn!("model has no learning path");
			return;
		};
		let links = graph.with_value(|g| g.relationships_along(&path.node_sequence));
		log::info!("playing {:?} over {} links", path.title, links.len());
		playing.set(true);
		play.run("learning path", |s| {
			s.highlight_path_sequence(&links, STEP_MS, Some(Box::new(move || playing.set(false))))
		});
	};

	let stop = controller.clone();
	let on_stop = move |_: MouseEvent| {
		playing.set(false);
		stop.run("reset highlights", |s| s.reset_all_highlights());
	};

	let pace = controller.clone();
	let on_speed = move |ev: Event| {
		let Ok(value) = event_target_value(&ev).parse::<f64>() else {
			return;
		};
		speed.set(value);
		pace.run("animation speed", |s| s.set_animation_speed(value));
	};

	let export = controller.clone();
	let on_export = move |_: MouseEvent| {
		match export.with(|s| s.export_static_image()) {
			Some(Ok(svg)) => {
				let encoded: String = js_sys::encode_uri_component(&svg).into();
				download.set(Some(format!("data:image/svg+xml;charset=utf-8,{encoded}")));
			}
			Some(Err(err)) => log::error!("export failed: {err}"),
			None => {}
		}
	};

	view! {
		<div class="model-page">
			<header>
				<h1>{move || graph.with_value(|g| g.title.clone())}</h1>
				<ThemePicker theme=theme />
			</header>
			<div class="graph-frame">
				<ForceGraphCanvas
					data=graph_data
					theme=theme
					options=options
					controller=controller
					on_link_click=move |e: LinkEvent| clicked.set(Some(e))
					on_node_hover={move |e: Option<NodeEvent>| hovered.set(e)}
				/>
				<div class="node-tooltip" class:hidden=move || hovered.with(Option::is_none)>
					<strong>{move || hovered.get().map(|n| n.label)}</strong>
					<p>{move || hovered.get().map(|n| n.description)}</p>
					{move || {
						hovered
							.get()
							.and_then(|n| n.path_number)
							.map(|number| view! { <span class="path-number">{format!("Path {number}")}</span> })
					}}
				</div>
			</div>
			<div class="playback">
				<button disabled=move || playing.get() on:click=on_play>"Play learning path"</button>
				<button on:click=on_stop>"Stop"</button>
				<label>
					{move || format!("Speed {:.1}x", speed.get())}
					<input type="range" min="0.5" max="3" step="0.5" prop:value=speed on:input=on_speed />
				</label>
				<button on:click=on_export>"Export SVG"</button>
				{move || {
					download
						.get()
						.map(|href| view! { <a href=href download="structural-model.svg">"Download"</a> })
				}}
			</div>
			<p class="hint">"Click a path to trace it."</p>
		</div>
	}
}
