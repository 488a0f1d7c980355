use std::collections::HashMap;

use super::animation::{Animator, Completion, PathStep};
use super::error::GraphError;
use super::events::{BackgroundEvent, Callbacks, LinkEvent, NodeEvent, SubscriptionId};
use super::interaction::{
	Highlights, Intent, Interaction, NodeEmphasis, Target, hit_test, hover_highlights,
};
use super::layout::{LayoutEngine, LayoutParams};
use super::model::{Expansion, GraphLink, GraphNode, Prepared, TraversalBounds, prepare};
use super::options::RenderOptions;
use super::pipeline::{Frame, Scene, StyleContext, link_width};
use super::svg;
use super::theme::{Palette, Theme};
use super::types::{DomainGraph, NodePatch};
use super::viewport::{Transform, Viewport};

/// Zoom factor of [`GraphState::zoom_in`] / [`GraphState::zoom_out`].
pub const ZOOM_STEP: f64 = 1.5;
/// Duration of button-driven zooms.
pub const ZOOM_MS: f64 = 300.0;
const SELECTED_WIDTH: f64 = 3.0;
/// d3-zoom's wheel sensitivity for pixel deltas.
const WHEEL_SENSITIVITY: f64 = 0.002;

fn check_surface(width: f64, height: f64) -> Result<(), GraphError> {
	if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
		Ok(())
	} else {
		Err(GraphError::InvalidSurface { width, height })
	}
}

/// One graph renderer: data model, layout, viewport, scene and
/// interaction, driven by [`GraphState::tick`] and the pointer handlers.
///
/// Listeners run synchronously inside the call that triggers them and must
/// not call back into the same state.
pub struct GraphState {
	options: RenderOptions,
	domain: DomainGraph,
	focus: Option<String>,
	expansion: Expansion,
	bounds: TraversalBounds,
	nodes: Vec<GraphNode>,
	links: Vec<GraphLink>,
	slots: HashMap<String, usize>,
	layout: LayoutEngine,
	viewport: Viewport,
	scene: Scene,
	interaction: Interaction,
	hover: Highlights,
	hover_node: Option<String>,
	selected: Option<String>,
	animator: Animator,
	callbacks: Callbacks,
	clock: f64,
	dirty: bool,
	destroyed: bool,
}

impl GraphState {
	/// Build a renderer for a surface of `options.width × options.height`.
	pub fn new(options: RenderOptions) -> Result<Self, GraphError> {
		let options = options.normalized();
		check_surface(options.width, options.height)?;
		Ok(Self {
			layout: LayoutEngine::new(LayoutParams::from_options(&options)),
			viewport: Viewport::new(options.width, options.height),
			options,
			domain: DomainGraph::default(),
			focus: None,
			expansion: Expansion::default(),
			bounds: TraversalBounds::default(),
			nodes: Vec::new(),
			links: Vec::new(),
			slots: HashMap::new(),
			scene: Scene::default(),
			interaction: Interaction::default(),
			hover: Highlights::default(),
			hover_node: None,
			selected: None,
			animator: Animator::default(),
			callbacks: Callbacks::default(),
			clock: 0.0,
			dirty: true,
			destroyed: false,
		})
	}

	fn ensure_alive(&self) -> Result<(), GraphError> {
		if self.destroyed {
			Err(GraphError::Destroyed)
		} else {
			Ok(())
		}
	}

	/// Effective options.
	pub fn options(&self) -> &RenderOptions {
		&self.options
	}

	/// Active theme.
	pub fn theme(&self) -> Theme {
		self.options.theme
	}

	/// Active palette.
	pub fn palette(&self) -> &'static Palette {
		self.options.theme.palette()
	}

	/// Focus of the last successful render.
	pub fn focus(&self) -> Option<&str> {
		self.focus.as_deref()
	}

	/// Last rendered domain graph.
	pub fn domain(&self) -> &DomainGraph {
		&self.domain
	}

	/// Whether [`GraphState::destroy`] ran.
	pub fn is_destroyed(&self) -> bool {
		self.destroyed
	}

	/// Show `graph` around `focus` (or its central node).
	///
	/// An unknown focus leaves the current picture untouched.
	pub fn render(&mut self, graph: &DomainGraph, focus: Option<&str>) -> Result<(), GraphError> {
		self.ensure_alive()?;
		let fresh = Expansion::default();
		let expansion = if graph.id == self.domain.id {
			&self.expansion
		} else {
			&fresh
		};
		let Some(prepared) = prepare(graph, focus, expansion, self.bounds, self.options.center())
		else {
			log::warn!("render skipped: focus {focus:?} not found");
			return Ok(());
		};
		if graph.id != self.domain.id {
			self.expansion = fresh;
		}
		self.domain = graph.clone();
		self.install(prepared);
		Ok(())
	}

	/// Swap in a freshly prepared arena and reconcile the scene with it.
	fn install(&mut self, mut prepared: Prepared) {
		for node in &mut prepared.nodes {
			if let Some(&slot) = self.slots.get(&node.id) {
				node.x = self.nodes[slot].x;
				node.y = self.nodes[slot].y;
			}
		}
		if let Some(id) = self.interaction.cancel_gesture() {
			log::debug!("drag of {id:?} ended by re-render");
			self.layout.set_alpha_target(0.0);
		}

		self.focus = Some(prepared.focus);
		self.nodes = prepared.nodes;
		self.links = prepared.links;
		self.slots = self
			.nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.clone(), i))
			.collect();

		self.layout.seed(&self.nodes, &self.links);
		self.layout.restart(1.0);

		let ctx = StyleContext {
			palette: self.options.theme.palette(),
			options: &self.options,
		};
		let (node_diff, link_diff) = self.scene.apply(&self.nodes, &self.links, ctx, self.clock);
		log::info!(
			"rendered {} nodes, {} links around {:?} (+{} -{} nodes, +{} -{} links)",
			self.nodes.len(),
			self.links.len(),
			self.focus,
			node_diff.entering.len(),
			node_diff.exiting.len(),
			link_diff.entering.len(),
			link_diff.exiting.len(),
		);

		if self
			.selected
			.as_ref()
			.is_some_and(|id| !self.slots.contains_key(id))
		{
			self.selected = None;
		}
		let slots = &self.slots;
		let scene = &self.scene;
		if self.interaction.forget(|target| match target {
			Target::Node(id) => slots.contains_key(id),
			Target::Link(id) => scene.link(id).is_some(),
		}) {
			self.set_hover(None);
		} else {
			self.refresh_hover();
		}
		self.dirty = true;
	}

	/// Flip a node between expanded and collapsed and refocus on it.
	pub fn toggle_node(&mut self, id: &str) -> Result<(), GraphError> {
		self.ensure_alive()?;
		if self.domain.node(id).is_none() {
			log::debug!("toggle of unknown node {id:?}");
			return Ok(());
		}
		let expanded = self
			.slots
			.get(id)
			.is_some_and(|&slot| self.nodes[slot].expanded);
		self.expansion.toggle(id, expanded);
		if let Some(prepared) = prepare(
			&self.domain,
			Some(id),
			&self.expansion,
			self.bounds,
			self.options.center(),
		) {
			self.install(prepared);
		}
		Ok(())
	}

	/// Pan and zoom so the node sits in the middle. Unknown ids are ignored.
	pub fn focus_node(&mut self, id: &str, duration_ms: f64) -> Result<(), GraphError> {
		self.ensure_alive()?;
		let Some((x, y)) = self.node_position(id) else {
			log::debug!("focus on unknown node {id:?}");
			return Ok(());
		};
		self.viewport.focus_on(x, y, duration_ms);
		self.selected = Some(id.to_string());
		self.dirty = true;
		Ok(())
	}

	/// Back to the identity transform.
	pub fn reset_view(&mut self, duration_ms: f64) -> Result<(), GraphError> {
		self.ensure_alive()?;
		self.viewport.reset(duration_ms);
		self.dirty = true;
		Ok(())
	}

	/// Restyle everything under `theme`. Positions stay put.
	pub fn set_theme(&mut self, theme: Theme) -> Result<(), GraphError> {
		self.ensure_alive()?;
		if self.options.theme == theme {
			return Ok(());
		}
		self.options.theme = theme;
		let ctx = StyleContext {
			palette: theme.palette(),
			options: &self.options,
		};
		self.scene.restyle(&self.nodes, &self.links, ctx);
		self.refresh_hover();
		self.dirty = true;
		log::debug!("theme set to {}", theme.name());
		Ok(())
	}

	/// Current viewport transform.
	pub fn transform(&self) -> Transform {
		self.viewport.transform()
	}

	/// Jump or animate the viewport to `t`.
	pub fn set_transform(&mut self, t: Transform, duration_ms: f64) -> Result<(), GraphError> {
		self.ensure_alive()?;
		self.viewport.set_transform(t, duration_ms);
		self.dirty = true;
		Ok(())
	}

	/// Zoom in about the surface center.
	pub fn zoom_in(&mut self) -> Result<(), GraphError> {
		self.ensure_alive()?;
		self.viewport.zoom_by(ZOOM_STEP, ZOOM_MS);
		Ok(())
	}

	/// Zoom out about the surface center.
	pub fn zoom_out(&mut self) -> Result<(), GraphError> {
		self.ensure_alive()?;
		self.viewport.zoom_by(1.0 / ZOOM_STEP, ZOOM_MS);
		Ok(())
	}

	/// Follow a surface size change: recenter the layout and reflow.
	pub fn resize(&mut self, width: f64, height: f64) -> Result<(), GraphError> {
		self.ensure_alive()?;
		check_surface(width, height)?;
		self.options.width = width;
		self.options.height = height;
		self.viewport.resize(width, height);
		let (cx, cy) = self.options.center();
		self.layout.set_center(cx, cy);
		self.dirty = true;
		Ok(())
	}

	/// Advance layout, viewport tweens, scene transitions and animations to
	/// `now` (ms). Returns whether the surface needs repainting.
	pub fn tick(&mut self, now: f64) -> bool {
		if self.destroyed {
			return false;
		}
		self.clock = now;
		let mut repaint = std::mem::take(&mut self.dirty);
		if self.layout.tick() {
			self.layout.sync_into(&mut self.nodes);
			self.scene.sync_positions(&self.nodes);
			repaint = true;
		}
		repaint |= self.viewport.advance(now);
		repaint |= self.scene.advance(now);
		if self.animator.is_active() {
			self.run_animations();
			repaint = true;
		}
		repaint
	}

	fn run_animations(&mut self) {
		let (nodes, slots) = (&self.nodes, &self.slots);
		let due = self
			.animator
			.advance(self.clock, |id| slots.get(id).map(|&s| (nodes[s].x, nodes[s].y)));
		for done in due {
			done();
		}
		self.dirty = true;
	}

	fn world_hit(&self, sx: f64, sy: f64) -> Option<Target> {
		let t = self.viewport.transform();
		let (wx, wy) = t.invert(sx, sy);
		hit_test(&self.scene, wx, wy, t.k)
	}

	/// Button pressed at screen `(sx, sy)`.
	pub fn pointer_down(&mut self, sx: f64, sy: f64) -> bool {
		if self.destroyed {
			return false;
		}
		let hit = self.world_hit(sx, sy);
		let origin = match &hit {
			Some(Target::Node(id)) => self.node_position(id),
			_ => None,
		};
		self.interaction
			.pointer_down(sx, sy, hit, origin, self.viewport.transform());
		false
	}

	/// Pointer moved to screen `(sx, sy)`.
	pub fn pointer_move(&mut self, sx: f64, sy: f64) -> bool {
		if self.destroyed {
			return false;
		}
		let hit = self.world_hit(sx, sy);
		let intents = self.interaction.pointer_move(sx, sy, hit);
		self.carry_out(intents)
	}

	/// Button released at screen `(sx, sy)`.
	pub fn pointer_up(&mut self, sx: f64, sy: f64) -> bool {
		if self.destroyed {
			return false;
		}
		let intents = self.interaction.pointer_up(sx, sy);
		self.carry_out(intents)
	}

	/// Pointer left the surface.
	pub fn pointer_leave(&mut self) -> bool {
		if self.destroyed {
			return false;
		}
		let intents = self.interaction.pointer_leave();
		self.carry_out(intents)
	}

	/// Double click at screen `(sx, sy)`.
	pub fn double_click(&mut self, sx: f64, sy: f64) -> bool {
		if self.destroyed {
			return false;
		}
		let Some(Target::Node(id)) = self.world_hit(sx, sy) else {
			return false;
		};
		if let Some(event) = self.node_event(&id) {
			self.callbacks.node_double_click.notify(&event);
		}
		if self.options.expand_on_double_click {
			if let Err(err) = self.toggle_node(&id) {
				log::warn!("double click toggle failed: {err}");
			}
		}
		true
	}

	/// Wheel at screen `(sx, sy)` with a pixel `delta_y`.
	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) -> bool {
		if self.destroyed {
			return false;
		}
		self.viewport
			.zoom_at(sx, sy, 2f64.powf(-delta_y * WHEEL_SENSITIVITY));
		self.dirty = true;
		true
	}

	fn carry_out(&mut self, intents: Vec<Intent>) -> bool {
		let repaint = !intents.is_empty();
		for intent in intents {
			match intent {
				Intent::Hover(target) => self.set_hover(target),
				Intent::Pin { id, x, y } => {
					if let Some(&slot) = self.slots.get(&id) {
						let node = &mut self.nodes[slot];
						(node.fx, node.fy) = (Some(x), Some(y));
						(node.x, node.y) = (x, y);
						self.layout.pin(slot, x, y);
						self.scene.sync_positions(&self.nodes);
					}
				}
				Intent::Release(id) => {
					if let Some(&slot) = self.slots.get(&id) {
						let node = &mut self.nodes[slot];
						(node.fx, node.fy) = (None, None);
						self.layout.unpin(slot);
					}
				}
				Intent::PanTo(x, y) => self.viewport.pan_to(x, y),
				Intent::Click(Target::Node(id)) => {
					if let Some(event) = self.node_event(&id) {
						self.selected = Some(id);
						self.callbacks.node_click.notify(&event);
					}
				}
				Intent::Click(Target::Link(id)) => {
					if let Some(event) = self.link_event(&id) {
						self.callbacks.link_click.notify(&event);
					}
				}
				Intent::BackgroundClick(x, y) => {
					self.selected = None;
					self.callbacks
						.background_click
						.notify(&BackgroundEvent { x, y });
				}
			}
		}
		self.dirty |= repaint;
		repaint
	}

	fn set_hover(&mut self, target: Option<Target>) {
		self.hover = match &target {
			Some(target) => hover_highlights(target, &self.scene, self.palette()),
			None => Highlights::default(),
		};
		let node = match target {
			Some(Target::Node(id)) => Some(id),
			_ => None,
		};
		if node != self.hover_node {
			self.hover_node = node;
			let event = self.hover_node.as_deref().and_then(|id| self.node_event(id));
			self.callbacks.node_hover.notify(&event);
		}
	}

	fn refresh_hover(&mut self) {
		if let Some(target) = self.interaction.hover() {
			self.hover = hover_highlights(target, &self.scene, self.palette());
		}
	}

	fn node_event(&self, id: &str) -> Option<NodeEvent> {
		let node = &self.nodes[*self.slots.get(id)?];
		Some(NodeEvent {
			id: node.id.clone(),
			label: node.domain.label.clone(),
			category: node.domain.category,
			description: node.domain.description.clone(),
			path_number: node.domain.path_number.clone(),
			x: node.x,
			y: node.y,
		})
	}

	fn link_event(&self, id: &str) -> Option<LinkEvent> {
		let link = self.links.iter().find(|l| l.id == id)?;
		Some(LinkEvent {
			id: link.id.clone(),
			source: self.nodes[link.source].id.clone(),
			target: self.nodes[link.target].id.clone(),
			kind: link.relation.kind,
			strength: link.relation.strength,
		})
	}

	/// Tear everything down. Later ticks and pointer events do nothing;
	/// mutating calls fail with [`GraphError::Destroyed`].
	pub fn destroy(&mut self) {
		if self.destroyed {
			return;
		}
		self.layout.stop();
		self.scene.clear();
		self.animator.reset();
		self.callbacks.clear();
		self.viewport.clear();
		self.interaction = Interaction::default();
		self.hover.clear();
		self.nodes.clear();
		self.links.clear();
		self.slots.clear();
		self.destroyed = true;
		log::info!("graph renderer destroyed");
	}

	/// Standalone SVG document of the current picture.
	pub fn export_static_image(&self) -> Result<String, GraphError> {
		self.ensure_alive()?;
		Ok(svg::export(&self.frame()))
	}

	/// Last known position of a visible node.
	pub fn node_position(&self, id: &str) -> Option<(f64, f64)> {
		self.slots
			.get(id)
			.map(|&slot| (self.nodes[slot].x, self.nodes[slot].y))
	}

	/// Whether a visible node is pinned by a drag.
	pub fn is_pinned(&self, id: &str) -> bool {
		self.slots
			.get(id)
			.is_some_and(|&slot| self.nodes[slot].is_pinned())
	}

	/// Ids of the visible nodes in domain order.
	pub fn visible_node_ids(&self) -> Vec<String> {
		self.nodes.iter().map(|n| n.id.clone()).collect()
	}

	/// Merge `patch` into a domain node and restyle it in place.
	pub fn update_node_data(&mut self, id: &str, patch: &NodePatch) -> Result<(), GraphError> {
		self.ensure_alive()?;
		let Some(domain) = self.domain.node_mut(id) else {
			log::debug!("update of unknown node {id:?}");
			return Ok(());
		};
		patch.apply_to(domain);
		if let Some(&slot) = self.slots.get(id) {
			patch.apply_to(&mut self.nodes[slot].domain);
			let radius = self.nodes[slot].radius(self.options.node_size);
			self.layout.set_radius(slot, radius);
			let ctx = StyleContext {
				palette: self.options.theme.palette(),
				options: &self.options,
			};
			self.scene.restyle(&self.nodes, &self.links, ctx);
			self.dirty = true;
		}
		Ok(())
	}

	/// Event lists for clicks and hover.
	pub fn callbacks_mut(&mut self) -> &mut Callbacks {
		&mut self.callbacks
	}

	/// Observe viewport changes.
	pub fn on_zoom(&mut self, listener: impl FnMut(&Transform) + 'static) -> SubscriptionId {
		self.viewport.subscribe(listener)
	}

	/// Stop observing viewport changes.
	pub fn off_zoom(&mut self, id: SubscriptionId) -> bool {
		self.viewport.unsubscribe(id)
	}

	fn path_step(&self, link_id: &str) -> Option<PathStep> {
		let link = self.links.iter().find(|l| l.id == link_id)?;
		Some(PathStep {
			link: link.id.clone(),
			source: self.nodes[link.source].id.clone(),
			target: self.nodes[link.target].id.clone(),
			strength: link.relation.strength,
		})
	}

	/// Light the given links one after another, `step_ms` each.
	pub fn highlight_path_sequence(
		&mut self,
		link_ids: &[String],
		step_ms: f64,
		on_complete: Option<Completion>,
	) -> Result<(), GraphError> {
		self.ensure_alive()?;
		let steps = link_ids.iter().map(|id| self.path_step(id)).collect();
		self.animator
			.play_sequence(steps, step_ms, on_complete, self.clock);
		self.run_animations();
		Ok(())
	}

	/// Send a particle along the link `source → target`. Without such a link
	/// `on_complete` runs right away.
	pub fn start_path_animation(
		&mut self,
		source: &str,
		target: &str,
		duration_ms: f64,
		on_complete: Option<Completion>,
	) -> Result<(), GraphError> {
		self.ensure_alive()?;
		let step = self
			.links
			.iter()
			.find(|l| self.nodes[l.source].id == source && self.nodes[l.target].id == target)
			.and_then(|l| self.path_step(&l.id));
		match step {
			Some(step) => {
				self.animator
					.play_particle(step, duration_ms, on_complete, self.clock);
				self.run_animations();
			}
			None => {
				log::debug!("no link {source:?} -> {target:?} to animate");
				if let Some(done) = on_complete {
					done();
				}
			}
		}
		Ok(())
	}

	/// Briefly grow a node.
	pub fn pulse_node(&mut self, id: &str, duration_ms: f64) -> Result<(), GraphError> {
		self.ensure_alive()?;
		if self.slots.contains_key(id) {
			self.animator.pulse(id, duration_ms, self.clock);
			self.run_animations();
		}
		Ok(())
	}

	/// Briefly widen a link by `multiplier`.
	pub fn animate_link_strength(
		&mut self,
		id: &str,
		multiplier: f64,
		duration_ms: f64,
	) -> Result<(), GraphError> {
		self.ensure_alive()?;
		if let Some(link) = self.links.iter().find(|l| l.id == id) {
			let base = link_width(link.relation.strength);
			self.animator
				.swell(id, base, multiplier, duration_ms, self.clock);
			self.run_animations();
		}
		Ok(())
	}

	/// Light or unlight one node.
	pub fn highlight_node_by_id(&mut self, id: &str, on: bool) -> Result<(), GraphError> {
		self.ensure_alive()?;
		if self.slots.contains_key(id) {
			self.animator.highlight_node(id, on);
			self.run_animations();
		}
		Ok(())
	}

	/// Light or unlight two nodes and every link joining them.
	pub fn highlight_relationship_path(
		&mut self,
		a: &str,
		b: &str,
		on: bool,
	) -> Result<(), GraphError> {
		self.ensure_alive()?;
		for id in [a, b] {
			if self.slots.contains_key(id) {
				self.animator.highlight_node(id, on);
			}
		}
		for link in self.links.iter().filter(|l| l.relation.joins(a, b)) {
			self.animator
				.highlight_link(&link.id, link.relation.strength, on);
		}
		self.run_animations();
		Ok(())
	}

	/// Cancel animations and drop every highlight and the selection.
	pub fn reset_all_highlights(&mut self) -> Result<(), GraphError> {
		self.ensure_alive()?;
		self.animator.reset();
		self.selected = None;
		self.dirty = true;
		Ok(())
	}

	/// Speed multiplier for animations started afterwards.
	pub fn set_animation_speed(&mut self, speed: f64) -> Result<(), GraphError> {
		self.ensure_alive()?;
		self.animator.set_speed(speed);
		Ok(())
	}

	/// Snapshot for painting.
	pub fn frame(&self) -> Frame<'_> {
		let palette = self.palette();
		let mut overlay = Highlights::default();
		if let Some(id) = &self.selected {
			overlay.emphasize_node(id.clone(), NodeEmphasis::stroked(palette.selected_stroke, SELECTED_WIDTH));
		}
		overlay.merge(&self.hover);
		overlay.merge(self.animator.overlay());
		Frame {
			scene: &self.scene,
			palette,
			transform: self.viewport.transform(),
			size: self.viewport.size(),
			overlay,
			marker: self.animator.marker(),
			now: self.clock,
		}
	}
}
