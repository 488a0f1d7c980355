//! Layout engine adapter around `force_graph`.
//!
//! The crate integrates charge and springs. Everything it does not model
//! (rest lengths per level difference, collision, centering, alpha energy) is
//! layered on here so layout, hit testing and painting share one radius.

use force_graph::{EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::forces::{self, Body, Spring};
use super::model::{GraphLink, GraphNode};
use super::options::{NodeSize, RenderOptions};

const DT: f32 = 0.016;
const NODE_MASS: f32 = 10.0;
const BASE_LINK_DISTANCE: f64 = 80.0;
const LEVEL_LINK_STEP: f64 = 20.0;
const COLLISION_PADDING: f64 = 10.0;
const ALPHA_DECAY: f64 = 0.02;
const ALPHA_MIN: f64 = 0.001;
/// Alpha target while a node is dragged.
pub const DRAG_ALPHA_TARGET: f64 = 0.3;
/// Minimum alpha after a resize.
pub const REFLOW_ALPHA: f64 = 0.3;

/// Simulation tuning derived from [`RenderOptions`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutParams {
	/// Pairwise charge; negative repels.
	pub charge_strength: f64,
	/// Spring strength, 0–1.
	pub link_strength: f64,
	/// Centering target.
	pub center: (f64, f64),
	/// Base node size for radii.
	pub node_size: NodeSize,
}

impl LayoutParams {
	/// Pull the layout-relevant options.
	pub fn from_options(options: &RenderOptions) -> Self {
		Self {
			charge_strength: options.charge_strength,
			link_strength: options.link_strength,
			center: options.center(),
			node_size: options.node_size,
		}
	}

	fn simulation(&self) -> SimulationParameters {
		SimulationParameters {
			force_charge: (-self.charge_strength / 2.0).max(0.0) as f32,
			force_spring: (self.link_strength / 6.0) as f32,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		}
	}
}

/// Rest length of a link: longer across hierarchy levels.
pub fn link_distance(source_level: u32, target_level: u32) -> f64 {
	BASE_LINK_DISTANCE + source_level.abs_diff(target_level) as f64 * LEVEL_LINK_STEP
}

/// Drives the force simulation for the current visible arena.
pub struct LayoutEngine {
	graph: ForceGraph<usize, ()>,
	params: LayoutParams,
	bodies: Vec<Body>,
	springs: Vec<Spring>,
	alpha: f64,
	alpha_target: f64,
	running: bool,
}

impl LayoutEngine {
	/// An empty, stopped engine.
	pub fn new(params: LayoutParams) -> Self {
		Self {
			graph: ForceGraph::new(params.simulation()),
			params,
			bodies: Vec::new(),
			springs: Vec::new(),
			alpha: 0.0,
			alpha_target: 0.0,
			running: false,
		}
	}

	/// Replace the simulated set with `nodes`/`links`. Does not start ticking.
	pub fn seed(&mut self, nodes: &[GraphNode], links: &[GraphLink]) {
		self.bodies.clear();
		self.bodies.extend(nodes.iter().map(|node| Body {
			x: node.fx.unwrap_or(node.x),
			y: node.fy.unwrap_or(node.y),
			radius: node.radius(self.params.node_size),
			pin: node.fx.zip(node.fy),
		}));
		forces::spread_coincident(&mut self.bodies);

		self.springs.clear();
		self.springs.extend(links.iter().map(|link| Spring {
			source: link.source,
			target: link.target,
			rest: link_distance(nodes[link.source].domain.level, nodes[link.target].domain.level),
		}));

		let mut graph = ForceGraph::new(self.params.simulation());
		let handles: Vec<_> = self
			.bodies
			.iter()
			.enumerate()
			.map(|(slot, body)| {
				graph.add_node(NodeData {
					x: body.x as f32,
					y: body.y as f32,
					mass: NODE_MASS,
					is_anchor: body.pin.is_some(),
					user_data: slot,
				})
			})
			.collect();
		for link in links {
			if link.source != link.target {
				graph.add_edge(handles[link.source], handles[link.target], EdgeData::default());
			}
		}
		self.graph = graph;
		log::debug!(
			"layout seeded with {} nodes, {} links",
			self.bodies.len(),
			self.springs.len()
		);
	}

	/// Set alpha and resume ticking.
	pub fn restart(&mut self, alpha: f64) {
		self.alpha = alpha;
		self.running = true;
	}

	/// Stop ticking; positions stay where they are.
	pub fn stop(&mut self) {
		self.running = false;
	}

	/// Whether the simulation still emits ticks.
	pub fn is_running(&self) -> bool {
		self.running
	}

	/// Current alpha energy.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Current alpha target.
	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	/// Set the value alpha decays toward.
	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target;
		if target >= ALPHA_MIN {
			self.running = true;
		}
	}

	/// Advance one step. Returns false once settled or stopped.
	pub fn tick(&mut self) -> bool {
		if !self.running || self.bodies.is_empty() {
			return false;
		}
		self.alpha += (self.alpha_target - self.alpha) * ALPHA_DECAY;
		if self.alpha < ALPHA_MIN {
			self.running = false;
			log::debug!("layout settled");
			return false;
		}

		self.graph.update(DT * self.alpha as f32);

		let bodies = &mut self.bodies;
		self.graph.visit_nodes(|node| {
			let body = &mut bodies[node.data.user_data];
			match body.pin {
				Some((px, py)) => (body.x, body.y) = (px, py),
				None => (body.x, body.y) = (node.x() as f64, node.y() as f64),
			}
		});

		forces::apply_link_lengths(
			&mut self.bodies,
			&self.springs,
			self.alpha * self.params.link_strength,
		);
		forces::apply_collisions(&mut self.bodies, COLLISION_PADDING);
		forces::apply_centering(&mut self.bodies, self.params.center, 1.0);

		let bodies = &self.bodies;
		self.graph.visit_nodes_mut(|node| {
			let body = &bodies[node.data.user_data];
			node.data.x = body.x as f32;
			node.data.y = body.y as f32;
		});
		true
	}

	/// Copy positions into the arena. O(n), no allocation.
	pub fn sync_into(&self, nodes: &mut [GraphNode]) {
		for (node, body) in nodes.iter_mut().zip(&self.bodies) {
			node.x = body.x;
			node.y = body.y;
		}
	}

	/// Simulated position of a slot.
	pub fn position(&self, slot: usize) -> Option<(f64, f64)> {
		self.bodies.get(slot).map(|b| (b.x, b.y))
	}

	/// Fix a body at `(x, y)` and keep neighbors responsive.
	pub fn pin(&mut self, slot: usize, x: f64, y: f64) {
		let Some(body) = self.bodies.get_mut(slot) else {
			return;
		};
		body.pin = Some((x, y));
		(body.x, body.y) = (x, y);
		self.graph.visit_nodes_mut(|node| {
			if node.data.user_data == slot {
				node.data.x = x as f32;
				node.data.y = y as f32;
				node.data.is_anchor = true;
			}
		});
		self.set_alpha_target(DRAG_ALPHA_TARGET);
	}

	/// Release a body and let alpha decay to rest.
	pub fn unpin(&mut self, slot: usize) {
		let Some(body) = self.bodies.get_mut(slot) else {
			return;
		};
		body.pin = None;
		self.graph.visit_nodes_mut(|node| {
			if node.data.user_data == slot {
				node.data.is_anchor = false;
			}
		});
		self.set_alpha_target(0.0);
	}

	/// Refresh a body's collision radius after its domain data changed.
	pub fn set_radius(&mut self, slot: usize, radius: f64) {
		if let Some(body) = self.bodies.get_mut(slot) {
			body.radius = radius;
		}
	}

	/// Move the centering target and nudge alpha so the layout reflows.
	pub fn set_center(&mut self, cx: f64, cy: f64) {
		self.params.center = (cx, cy);
		self.alpha = self.alpha.max(REFLOW_ALPHA);
		self.running = !self.bodies.is_empty();
	}

	/// Centering target.
	pub fn center(&self) -> (f64, f64) {
		self.params.center
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::model::{Expansion, TraversalBounds, prepare};
	use crate::components::force_graph::types::{DomainGraph, DomainNode};

	fn star(n: usize) -> DomainGraph {
		let mut root = DomainNode::new("root", "root");
		let mut nodes = Vec::new();
		for i in 0..n {
			let id = format!("c{i}");
			root.children.push(id.clone());
			nodes.push(DomainNode::new(id, "child").with_parent("root").with_level(1));
		}
		nodes.insert(0, root);
		DomainGraph {
			central: "root".into(),
			nodes,
			..Default::default()
		}
	}

	fn seeded(n: usize) -> (LayoutEngine, Vec<GraphNode>) {
		let prepared = prepare(
			&star(n),
			None,
			&Expansion::default(),
			TraversalBounds::default(),
			(400.0, 300.0),
		)
		.unwrap();
		let mut engine = LayoutEngine::new(LayoutParams::from_options(&RenderOptions::default()));
		engine.seed(&prepared.nodes, &prepared.links);
		(engine, prepared.nodes)
	}

	#[test]
	fn rest_length_grows_with_level_gap() {
		assert_eq!(link_distance(0, 0), 80.0);
		assert_eq!(link_distance(3, 1), 120.0);
	}

	#[test]
	fn charge_and_spring_map_onto_crate_units() {
		let sim = LayoutParams::from_options(&RenderOptions::default()).simulation();
		assert_eq!(sim.force_charge, 150.0);
		assert!((sim.force_spring - 0.05).abs() < 1e-6);
	}

	#[test]
	fn alpha_decays_until_settled() {
		let (mut engine, mut nodes) = seeded(5);
		engine.restart(1.0);
		let mut ticks = 0;
		while engine.tick() {
			ticks += 1;
			assert!(ticks < 2_000, "simulation never settled");
		}
		assert!(!engine.is_running());
		assert!(!engine.tick());
		engine.sync_into(&mut nodes);
		for node in &nodes {
			assert!(node.x.is_finite() && node.y.is_finite());
		}
	}

	#[test]
	fn stopped_engine_does_not_move() {
		let (mut engine, _) = seeded(3);
		engine.restart(1.0);
		engine.stop();
		let before = engine.position(1);
		assert!(!engine.tick());
		assert_eq!(engine.position(1), before);
	}

	#[test]
	fn pinned_body_holds_its_position() {
		let (mut engine, _) = seeded(4);
		engine.restart(1.0);
		engine.pin(2, 10.0, 20.0);
		assert_eq!(engine.alpha_target(), DRAG_ALPHA_TARGET);
		for _ in 0..30 {
			engine.tick();
		}
		assert_eq!(engine.position(2), Some((10.0, 20.0)));
		engine.unpin(2);
		assert_eq!(engine.alpha_target(), 0.0);
	}

	#[test]
	fn nodes_do_not_overlap_after_settling() {
		let (mut engine, nodes) = seeded(6);
		engine.restart(1.0);
		while engine.tick() {}
		for i in 0..nodes.len() {
			for j in (i + 1)..nodes.len() {
				let (a, b) = (engine.position(i).unwrap(), engine.position(j).unwrap());
				let d = ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt();
				assert!(d > 20.0, "nodes {i} and {j} overlap at distance {d}");
			}
		}
	}

	#[test]
	fn resize_recenters_and_reheats() {
		let (mut engine, _) = seeded(3);
		engine.restart(1.0);
		while engine.tick() {}
		engine.set_center(100.0, 100.0);
		assert!(engine.is_running());
		assert!(engine.alpha() >= REFLOW_ALPHA);
		assert_eq!(engine.center(), (100.0, 100.0));
	}
}
