use leptos::prelude::*;

use crate::components::force_graph::{
	DomainGraph, ForceGraphCanvas, GraphController, NodeEvent, Theme, Transform,
};

const MIND_MAP: &str = include_str!("data/mind_map.json");

/// Parse an embedded graph; a broken file yields an empty graph and a log line.
pub(crate) fn load_graph(name: &str, json: &str) -> DomainGraph {
	DomainGraph::from_json(json).unwrap_or_else(|err| {
		log::error!("embedded graph {name} is invalid: {err}");
		DomainGraph::default()
	})
}

/// Theme switcher shared by the pages.
#[component]
pub fn ThemePicker(theme: RwSignal<Theme>) -> impl IntoView {
	view! {
		<div class="theme-picker">
			{Theme::ALL
				.into_iter()
				.map(|t| {
					view! {
						<button
							class:active=move || theme.get() == t
							on:click=move |_| theme.set(t)
						>
							{t.name()}
						</button>
					}
				})
				.collect_view()}
		</div>
	}
}

/// Mind map of the theory with search, theme and zoom controls.
#[component]
pub fn Home() -> impl IntoView {
	let graph = StoredValue::new(load_graph("mind map", MIND_MAP));
	let graph_data = Signal::derive(move || graph.get_value());
	let focus = RwSignal::new(None::<String>);
	let theme = RwSignal::new(Theme::Light);
	let selected = RwSignal::new(None::<NodeEvent>);
	let hovered = RwSignal::new(None::<NodeEvent>);
	let zoom = RwSignal::new(Transform::IDENTITY.k);
	let query = RwSignal::new(String::new());
	let controller = GraphController::default();

	let search = move || {
		let query = query.get_untracked();
		let hits = graph.with_value(|g| g.search(&query));
		match hits.first() {
			Some(hit) => {
				log::debug!("search hit {} ({} matches)", hit.id, hits.len());
				focus.set(Some(hit.id.clone()));
			}
			None => log::debug!("no node matches {query:?}"),
		}
	};

	let (zoom_in, zoom_out, reset, pulse) = (
		controller.clone(),
		controller.clone(),
		controller.clone(),
		controller.clone(),
	);

	view! {
		<div class="fullscreen-graph">
			<ForceGraphCanvas
				data=graph_data
				focus=focus
				theme=theme
				controller=controller
				fullscreen=true
				on_node_click=move |e: NodeEvent| selected.set(Some(e))
				on_node_hover={move |e: Option<NodeEvent>| hovered.set(e)}
				on_background_click=move |_: (f64, f64)| selected.set(None)
				on_zoom=move |t: Transform| zoom.set(t.k)
			/>
			<div class="graph-overlay">
				<h1>{move || graph.with_value(|g| g.title.clone())}</h1>
				<p class="subtitle">
					"Double-click a topic to expand it. Drag nodes to pin them. Scroll to zoom."
				</p>
				<form on:submit=move |ev| {
					ev.prevent_default();
					search();
				}>
					<input
						type="search"
						placeholder="Search concepts"
						prop:value=query
						on:input=move |ev| query.set(event_target_value(&ev))
					/>
				</form>
				<ThemePicker theme=theme />
				<div class="zoom-controls">
					<button on:click=move |_| zoom_in.run("zoom in", |s| s.zoom_in())>"+"</button>
					<button on:click=move |_| zoom_out.run("zoom out", |s| s.zoom_out())>"-"</button>
					<button on:click=move |_| {
						reset.run("reset view", |s| s.reset_view(750.0));
						focus.set(None);
					}>"Reset"</button>
					<span>{move || format!("{:.0}%", zoom.get() * 100.0)}</span>
				</div>
				<p class="hover-label">{move || hovered.get().map(|e| e.label)}</p>
			</div>
			<aside class="node-panel" class:hidden=move || selected.with(Option::is_none)>
				<h2>{move || selected.get().map(|n| n.label)}</h2>
				<p>{move || selected.get().map(|n| n.description)}</p>
				<button on:click=move |_| {
					if let Some(node) = selected.get_untracked() {
						pulse.run("pulse", |s| s.pulse_node(&node.id, 600.0));
					}
				}>"Pulse"</button>
			</aside>
		</div>
	}
}
