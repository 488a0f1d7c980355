//! Pointer gestures, hover tracking and highlight overlays.
//!
//! [`Interaction`] never touches the arena or the viewport itself. Each
//! pointer handler returns the [`Intent`]s the owner has to carry out, which
//! keeps the gesture rules testable without a canvas.

use std::collections::HashMap;

use super::pipeline::{LinkStyle, NodeStyle, Scene};
use super::theme::Palette;
use super::viewport::Transform;

/// Pointer travel (screen px) before a press turns into a drag or pan.
pub const DRAG_THRESHOLD: f64 = 3.0;
/// Extra pick tolerance around a link line, in screen px.
const LINK_PICK_SLOP: f64 = 3.0;
const HOVER_WIDTH: f64 = 3.0;
const HOVER_LINK_FACTOR: f64 = 1.5;

/// Something under the pointer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Target {
	/// A node id.
	Node(String),
	/// A link id.
	Link(String),
}

/// Gesture state.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Gesture {
	/// No button held.
	#[default]
	Idle,
	/// Button held, still within the drag threshold.
	Pressed {
		/// What was pressed; `None` for the background.
		target: Option<Target>,
		/// Screen position of the press.
		at: (f64, f64),
		/// Position of the pressed node at press time.
		node_origin: Option<(f64, f64)>,
		/// Viewport at press time.
		transform: Transform,
	},
	/// Moving a node.
	Dragging {
		/// Dragged node.
		id: String,
		/// Screen position of the press.
		at: (f64, f64),
		/// Node position at press time.
		origin: (f64, f64),
		/// Scale at press time.
		k: f64,
	},
	/// Moving the viewport.
	Panning {
		/// Screen position of the press.
		at: (f64, f64),
		/// Viewport at press time.
		origin: Transform,
	},
}

/// Side effects requested by a pointer handler.
#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
	/// Hover moved onto `Some(target)` or off everything.
	Hover(Option<Target>),
	/// Pin a node at a world position.
	Pin {
		/// Node id.
		id: String,
		/// World x.
		x: f64,
		/// World y.
		y: f64,
	},
	/// Drop a node's pin.
	Release(String),
	/// Set the viewport translation.
	PanTo(f64, f64),
	/// Click on a node or link.
	Click(Target),
	/// Click on empty canvas, screen coordinates.
	BackgroundClick(f64, f64),
}

/// Override on top of a node's base style.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeEmphasis {
	/// Outline color.
	pub stroke: Option<String>,
	/// Outline width.
	pub width: Option<f64>,
	/// Radius factor.
	pub scale: f64,
}

impl Default for NodeEmphasis {
	fn default() -> Self {
		Self {
			stroke: None,
			width: None,
			scale: 1.0,
		}
	}
}

impl NodeEmphasis {
	/// Outline override.
	pub fn stroked(stroke: impl Into<String>, width: f64) -> Self {
		Self {
			stroke: Some(stroke.into()),
			width: Some(width),
			scale: 1.0,
		}
	}

	/// Resolve against a base style.
	pub fn apply(&self, base: &NodeStyle) -> NodeStyle {
		NodeStyle {
			stroke: self.stroke.clone().unwrap_or_else(|| base.stroke.clone()),
			stroke_width: self.width.unwrap_or(base.stroke_width),
			radius: base.radius * self.scale,
			..base.clone()
		}
	}
}

/// Override on top of a link's base style.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinkEmphasis {
	/// Line color.
	pub stroke: Option<String>,
	/// Line width.
	pub width: Option<f64>,
}

impl LinkEmphasis {
	/// Resolve against a base style.
	pub fn apply(&self, base: &LinkStyle) -> LinkStyle {
		LinkStyle {
			stroke: self.stroke.clone().unwrap_or_else(|| base.stroke.clone()),
			width: self.width.unwrap_or(base.width),
			..base.clone()
		}
	}
}

/// A set of per-id style overrides.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Highlights {
	nodes: HashMap<String, NodeEmphasis>,
	links: HashMap<String, LinkEmphasis>,
}

impl Highlights {
	/// Override for a node.
	pub fn node(&self, id: &str) -> Option<&NodeEmphasis> {
		self.nodes.get(id)
	}

	/// Override for a link.
	pub fn link(&self, id: &str) -> Option<&LinkEmphasis> {
		self.links.get(id)
	}

	/// Set a node override.
	pub fn emphasize_node(&mut self, id: impl Into<String>, emphasis: NodeEmphasis) {
		self.nodes.insert(id.into(), emphasis);
	}

	/// Set a link override.
	pub fn emphasize_link(&mut self, id: impl Into<String>, emphasis: LinkEmphasis) {
		self.links.insert(id.into(), emphasis);
	}

	/// Drop a node override.
	pub fn clear_node(&mut self, id: &str) {
		self.nodes.remove(id);
	}

	/// Drop a link override.
	pub fn clear_link(&mut self, id: &str) {
		self.links.remove(id);
	}

	/// Layer `other` on top; its entries win.
	pub fn merge(&mut self, other: &Highlights) {
		self.nodes
			.extend(other.nodes.iter().map(|(k, v)| (k.clone(), v.clone())));
		self.links
			.extend(other.links.iter().map(|(k, v)| (k.clone(), v.clone())));
	}

	/// Whether nothing is overridden.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty() && self.links.is_empty()
	}

	/// Drop everything.
	pub fn clear(&mut self) {
		self.nodes.clear();
		self.links.clear();
	}
}

/// Topmost element at a world point. Nodes win over links.
pub fn hit_test(scene: &Scene, x: f64, y: f64, k: f64) -> Option<Target> {
	let node = scene.nodes.iter().rev().find(|n| {
		n.slot.is_some() && (n.x - x).hypot(n.y - y) <= n.style.radius
	});
	if let Some(node) = node {
		return Some(Target::Node(node.id.clone()));
	}
	let slop = LINK_PICK_SLOP / k.max(f64::EPSILON);
	scene
		.links
		.iter()
		.rev()
		.filter(|l| l.slots.is_some())
		.find(|l| {
			scene
				.link_curve(l)
				.is_some_and(|curve| curve.distance_to((x, y)) <= l.style.width / 2.0 + slop)
		})
		.map(|l| Target::Link(l.id.clone()))
}

/// Hover overlay for `target`: the node and its incident links, or a
/// widened link.
pub fn hover_highlights(target: &Target, scene: &Scene, palette: &Palette) -> Highlights {
	let mut overlay = Highlights::default();
	match target {
		Target::Node(id) => {
			overlay.emphasize_node(id.clone(), NodeEmphasis::stroked(palette.hovered_stroke, HOVER_WIDTH));
			for link in scene
				.links
				.iter()
				.filter(|l| l.slots.is_some() && (l.source == *id || l.target == *id))
			{
				overlay.emphasize_link(
					link.id.clone(),
					LinkEmphasis {
						stroke: Some(palette.hovered_stroke.to_string()),
						width: None,
					},
				);
			}
		}
		Target::Link(id) => {
			if let Some(link) = scene.link(id) {
				overlay.emphasize_link(
					id.clone(),
					LinkEmphasis {
						stroke: None,
						width: Some(link.style.width * HOVER_LINK_FACTOR),
					},
				);
			}
		}
	}
	overlay
}

/// Gesture and hover state for one surface.
#[derive(Clone, Debug, Default)]
pub struct Interaction {
	gesture: Gesture,
	hover: Option<Target>,
}

impl Interaction {
	/// Current gesture.
	pub fn gesture(&self) -> &Gesture {
		&self.gesture
	}

	/// Current hover target.
	pub fn hover(&self) -> Option<&Target> {
		self.hover.as_ref()
	}

	/// Id of the node being dragged.
	pub fn dragging(&self) -> Option<&str> {
		match &self.gesture {
			Gesture::Dragging { id, .. } => Some(id),
			_ => None,
		}
	}

	/// Button pressed at screen `(sx, sy)` over `hit`.
	pub fn pointer_down(
		&mut self,
		sx: f64,
		sy: f64,
		hit: Option<Target>,
		node_origin: Option<(f64, f64)>,
		transform: Transform,
	) {
		self.gesture = Gesture::Pressed {
			target: hit,
			at: (sx, sy),
			node_origin,
			transform,
		};
	}

	/// Pointer moved to screen `(sx, sy)`; `hit` is what lies under it.
	pub fn pointer_move(&mut self, sx: f64, sy: f64, hit: Option<Target>) -> Vec<Intent> {
		match std::mem::take(&mut self.gesture) {
			Gesture::Idle => {
				if hit == self.hover {
					return Vec::new();
				}
				self.hover = hit.clone();
				vec![Intent::Hover(hit)]
			}
			Gesture::Pressed {
				target,
				at,
				node_origin,
				transform,
			} => {
				if (sx - at.0).hypot(sy - at.1) < DRAG_THRESHOLD {
					self.gesture = Gesture::Pressed {
						target,
						at,
						node_origin,
						transform,
					};
					return Vec::new();
				}
				match (target, node_origin) {
					(Some(Target::Node(id)), Some(origin)) => {
						self.gesture = Gesture::Dragging {
							id,
							at,
							origin,
							k: transform.k,
						};
					}
					_ => {
						self.gesture = Gesture::Panning {
							at,
							origin: transform,
						};
					}
				}
				self.continue_gesture(sx, sy)
			}
			gesture => {
				self.gesture = gesture;
				self.continue_gesture(sx, sy)
			}
		}
	}

	fn continue_gesture(&self, sx: f64, sy: f64) -> Vec<Intent> {
		match &self.gesture {
			Gesture::Dragging { id, at, origin, k } => vec![Intent::Pin {
				id: id.clone(),
				x: origin.0 + (sx - at.0) / k,
				y: origin.1 + (sy - at.1) / k,
			}],
			Gesture::Panning { at, origin } => {
				vec![Intent::PanTo(origin.x + sx - at.0, origin.y + sy - at.1)]
			}
			_ => Vec::new(),
		}
	}

	/// Button released at screen `(sx, sy)`.
	pub fn pointer_up(&mut self, sx: f64, sy: f64) -> Vec<Intent> {
		match std::mem::take(&mut self.gesture) {
			Gesture::Pressed {
				target: Some(target),
				..
			} => vec![Intent::Click(target)],
			Gesture::Pressed { target: None, .. } => vec![Intent::BackgroundClick(sx, sy)],
			Gesture::Dragging { id, .. } => vec![Intent::Release(id)],
			Gesture::Panning { .. } | Gesture::Idle => Vec::new(),
		}
	}

	/// Pointer left the surface: abandon the gesture and clear hover.
	pub fn pointer_leave(&mut self) -> Vec<Intent> {
		let mut intents = Vec::new();
		if let Gesture::Dragging { id, .. } = std::mem::take(&mut self.gesture) {
			intents.push(Intent::Release(id));
		}
		if self.hover.take().is_some() {
			intents.push(Intent::Hover(None));
		}
		intents
	}

	/// Abandon the current gesture. Returns the node that was being dragged.
	pub fn cancel_gesture(&mut self) -> Option<String> {
		match std::mem::take(&mut self.gesture) {
			Gesture::Dragging { id, .. } => Some(id),
			_ => None,
		}
	}

	/// Drop the hover target if it no longer exists. Returns whether it did.
	pub fn forget(&mut self, still_present: impl Fn(&Target) -> bool) -> bool {
		if self.hover.as_ref().is_some_and(|t| !still_present(t)) {
			self.hover = None;
			return true;
		}
		false
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::model::{Expansion, TraversalBounds, prepare};
	use crate::components::force_graph::options::RenderOptions;
	use crate::components::force_graph::pipeline::{RECIPROCAL_BEND, StyleContext};
	use crate::components::force_graph::theme::Theme;
	use crate::components::force_graph::types::{
		DomainGraph, DomainNode, Point, RelationKind, Relationship,
	};

	fn scene() -> Scene {
		let mut graph = DomainGraph {
			central: "c".into(),
			nodes: vec![
				DomainNode::new("c", "c").with_children(["a", "b"]),
				DomainNode::new("a", "a").with_parent("c"),
				DomainNode::new("b", "b").with_parent("c"),
			],
			..Default::default()
		};
		graph.nodes[0].position = Some(Point::new(0.0, 0.0));
		graph.nodes[1].position = Some(Point::new(200.0, 0.0));
		graph.nodes[2].position = Some(Point::new(0.0, 200.0));
		let p = prepare(&graph, None, &Expansion::default(), TraversalBounds::default(), (0.0, 0.0)).unwrap();
		let options = RenderOptions {
			enable_animation: false,
			..RenderOptions::default()
		};
		let mut scene = Scene::default();
		scene.apply(
			&p.nodes,
			&p.links,
			StyleContext {
				palette: Theme::Light.palette(),
				options: &options,
			},
			0.0,
		);
		scene
	}

	#[test]
	fn nodes_win_over_links() {
		let scene = scene();
		assert_eq!(hit_test(&scene, 5.0, 0.0, 1.0), Some(Target::Node("c".into())));
		assert_eq!(hit_test(&scene, 100.0, 1.0, 1.0), Some(Target::Link("c-a".into())));
		assert_eq!(hit_test(&scene, 100.0, 100.0, 1.0), None);
	}

	#[test]
	fn reciprocal_links_are_picked_on_their_own_side() {
		let mut graph = DomainGraph {
			central: "c".into(),
			nodes: vec![
				DomainNode::new("c", "c").with_children(["d"]),
				DomainNode::new("d", "d").with_parent("c"),
			],
			relationships: vec![
				Relationship::new("direct", "c", "d", RelationKind::DirectEffect),
				Relationship::new("feedback", "d", "c", RelationKind::Feedback),
			],
			..Default::default()
		};
		graph.nodes[0].position = Some(Point::new(0.0, 0.0));
		graph.nodes[1].position = Some(Point::new(200.0, 0.0));
		let p = prepare(&graph, None, &Expansion::default(), TraversalBounds::default(), (0.0, 0.0)).unwrap();
		assert_eq!(p.links.len(), 2);
		let options = RenderOptions {
			enable_animation: false,
			..RenderOptions::default()
		};
		let mut scene = Scene::default();
		scene.apply(
			&p.nodes,
			&p.links,
			StyleContext {
				palette: Theme::Light.palette(),
				options: &options,
			},
			0.0,
		);
		// apexes sit half the bend away from the chord, on opposite sides
		let apex = RECIPROCAL_BEND / 2.0;
		assert_eq!(hit_test(&scene, 100.0, apex, 1.0), Some(Target::Link("direct".into())));
		assert_eq!(hit_test(&scene, 100.0, -apex, 1.0), Some(Target::Link("feedback".into())));
		assert_eq!(hit_test(&scene, 100.0, 0.0, 1.0), None);
	}

	#[test]
	fn hovering_a_node_lights_incident_links() {
		let scene = scene();
		let palette = Theme::Light.palette();
		let overlay = hover_highlights(&Target::Node("a".into()), &scene, palette);
		assert_eq!(overlay.node("a").and_then(|e| e.width), Some(3.0));
		assert!(overlay.link("c-a").is_some());
		assert!(overlay.link("c-b").is_none());

		let overlay = hover_highlights(&Target::Link("c-b".into()), &scene, palette);
		assert_eq!(overlay.link("c-b").and_then(|e| e.width), Some(3.0));
	}

	#[test]
	fn small_moves_stay_a_click() {
		let mut ix = Interaction::default();
		ix.pointer_down(10.0, 10.0, Some(Target::Node("a".into())), Some((1.0, 1.0)), Transform::IDENTITY);
		assert!(ix.pointer_move(12.0, 11.0, None).is_empty());
		assert_eq!(ix.pointer_up(12.0, 11.0), vec![Intent::Click(Target::Node("a".into()))]);
		assert_eq!(*ix.gesture(), Gesture::Idle);
	}

	#[test]
	fn drag_follows_pointer_in_world_units() {
		let mut ix = Interaction::default();
		let t = Transform::new(0.0, 0.0, 2.0);
		ix.pointer_down(10.0, 10.0, Some(Target::Node("a".into())), Some((5.0, 5.0)), t);
		ix.pointer_move(20.0, 10.0, None);
		let intents = ix.pointer_move(30.0, 50.0, None);
		assert_eq!(
			intents,
			vec![Intent::Pin {
				id: "a".into(),
				x: 15.0,
				y: 25.0
			}]
		);
		assert_eq!(ix.dragging(), Some("a"));
		assert_eq!(ix.pointer_up(30.0, 50.0), vec![Intent::Release("a".into())]);
	}

	#[test]
	fn background_press_pans_or_clicks() {
		let mut ix = Interaction::default();
		ix.pointer_down(0.0, 0.0, None, None, Transform::new(10.0, 10.0, 1.0));
		assert_eq!(ix.pointer_move(20.0, -5.0, None), vec![Intent::PanTo(30.0, 5.0)]);
		assert!(ix.pointer_up(20.0, -5.0).is_empty());

		ix.pointer_down(4.0, 4.0, None, None, Transform::IDENTITY);
		assert_eq!(ix.pointer_up(4.0, 4.0), vec![Intent::BackgroundClick(4.0, 4.0)]);
	}

	#[test]
	fn hover_reports_changes_only() {
		let mut ix = Interaction::default();
		let a = Some(Target::Node("a".into()));
		assert_eq!(ix.pointer_move(0.0, 0.0, a.clone()), vec![Intent::Hover(a.clone())]);
		assert!(ix.pointer_move(1.0, 0.0, a.clone()).is_empty());
		assert_eq!(ix.pointer_move(50.0, 0.0, None), vec![Intent::Hover(None)]);
		ix.pointer_move(0.0, 0.0, a);
		assert_eq!(ix.pointer_leave(), vec![Intent::Hover(None)]);
	}
}
