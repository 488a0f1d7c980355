//! Keyed enter/update/exit reconciliation of the drawn scene.
//!
//! Styles are recomputed on every [`Scene::apply`] and [`Scene::restyle`];
//! positions only move through [`Scene::sync_positions`], which runs every
//! layout tick and never touches styles.

use std::collections::{HashMap, HashSet};

use super::interaction::Highlights;
use super::model::{GraphLink, GraphNode};
use super::options::RenderOptions;
use super::theme::{Palette, category_icon};
use super::viewport::Transform;

const LABEL_CHARS: usize = 12;
/// Control-point offset of a reciprocal pair when links are otherwise straight.
pub const RECIPROCAL_BEND: f64 = 30.0;
const CURVE_SAMPLES: usize = 16;

/// Keys split into three disjoint sets.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Diff {
	/// Present now, absent before.
	pub entering: Vec<String>,
	/// Present before and now.
	pub updating: Vec<String>,
	/// Present before, absent now.
	pub exiting: Vec<String>,
}

/// Compare two key lists. Output order follows `next`, then `previous`.
pub fn keyed_diff<'a>(previous: impl IntoIterator<Item = &'a str>, next: &[&str]) -> Diff {
	let previous: Vec<&str> = previous.into_iter().collect();
	let before: HashSet<&str> = previous.iter().copied().collect();
	let after: HashSet<&str> = next.iter().copied().collect();
	let mut diff = Diff::default();
	for key in next {
		if before.contains(key) {
			diff.updating.push(key.to_string());
		} else {
			diff.entering.push(key.to_string());
		}
	}
	diff.exiting = previous
		.into_iter()
		.filter(|key| !after.contains(key))
		.map(str::to_string)
		.collect();
	diff
}

/// Lifecycle of a drawn element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Phase {
	/// Animating in since the timestamp.
	Entering(f64),
	/// Fully shown.
	Present,
	/// Animating out since the timestamp.
	Exiting(f64),
}

/// Transition-derived visual factors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Visual {
	/// 0 (hidden) to 1.
	pub opacity: f64,
	/// 0 (collapsed) to 1.
	pub scale: f64,
}

/// Resolved look of a node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeStyle {
	/// Circle fill.
	pub fill: String,
	/// Circle outline.
	pub stroke: String,
	/// Outline width.
	pub stroke_width: f64,
	/// Circle radius.
	pub radius: f64,
	/// Category glyph.
	pub icon: &'static str,
	/// Glyph and label color.
	pub text: String,
	/// Truncated label, `None` when labels are hidden.
	pub label: Option<String>,
	/// Path badge.
	pub badge: Option<String>,
}

/// Resolved look of a link.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkStyle {
	/// Line color.
	pub stroke: String,
	/// Line width.
	pub width: f64,
	/// Draw an arrowhead at the target.
	pub arrow: bool,
	/// Midpoint label.
	pub label: Option<String>,
	/// Label color.
	pub label_color: String,
}

/// A drawn node.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
	/// Node id.
	pub id: String,
	/// Arena index while bound to data; `None` once exiting.
	pub slot: Option<usize>,
	/// Last synced x.
	pub x: f64,
	/// Last synced y.
	pub y: f64,
	/// Current style.
	pub style: NodeStyle,
	/// Lifecycle phase.
	pub phase: Phase,
}

/// A drawn link.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneLink {
	/// Relationship id.
	pub id: String,
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
	/// Arena indices of the endpoints while bound to data.
	pub slots: Option<(usize, usize)>,
	/// Last synced endpoint positions.
	pub ends: ((f64, f64), (f64, f64)),
	/// Sideways offset of the control point, left of `source → target`.
	pub bend: f64,
	/// Current style.
	pub style: LinkStyle,
	/// Lifecycle phase.
	pub phase: Phase,
}

/// What a style pass reads.
#[derive(Clone, Copy)]
pub struct StyleContext<'a> {
	/// Active palette.
	pub palette: &'a Palette,
	/// Active options.
	pub options: &'a RenderOptions,
}

fn truncate(text: &str, max: usize) -> String {
	if text.chars().count() > max {
		let head: String = text.chars().take(max).collect();
		format!("{head}...")
	} else {
		text.to_string()
	}
}

/// Style of a node under `ctx`.
pub fn node_style(node: &GraphNode, ctx: StyleContext<'_>) -> NodeStyle {
	NodeStyle {
		fill: ctx.palette.node_color(&node.domain),
		stroke: ctx.palette.node_stroke.to_string(),
		stroke_width: 2.0,
		radius: ctx.options.node_radius(&node.domain),
		icon: category_icon(node.domain.category),
		text: ctx.palette.node_text.to_string(),
		label: ctx
			.options
			.show_labels
			.then(|| truncate(&node.domain.label, LABEL_CHARS)),
		badge: node.domain.path_number.clone(),
	}
}

/// Base width of a link: twice its strength, or 2 for unusable strengths.
pub fn link_width(strength: f64) -> f64 {
	if strength.is_finite() && strength > 0.0 {
		2.0 * strength
	} else {
		2.0
	}
}

/// Style of a link under `ctx`.
pub fn link_style(link: &GraphLink, ctx: StyleContext<'_>) -> LinkStyle {
	LinkStyle {
		stroke: ctx.palette.link_color(link.relation.kind).to_string(),
		width: link_width(link.relation.strength),
		arrow: link.relation.kind.is_directional(),
		label: link.relation.label.clone().filter(|l| !l.is_empty()),
		label_color: ctx.palette.link_text.to_string(),
	}
}

/// The drawn element set.
#[derive(Clone, Debug, Default)]
pub struct Scene {
	/// Drawn nodes: data order, then exiting.
	pub nodes: Vec<SceneNode>,
	/// Drawn links: data order, then exiting.
	pub links: Vec<SceneLink>,
	transition_ms: f64,
}

impl Scene {
	/// Reconcile with a new data set. Returns the node and link diffs.
	pub fn apply(
		&mut self,
		nodes: &[GraphNode],
		links: &[GraphLink],
		ctx: StyleContext<'_>,
		now: f64,
	) -> (Diff, Diff) {
		self.transition_ms = ctx.options.transition_ms();
		let node_diff = self.apply_nodes(nodes, ctx, now);
		let link_diff = self.apply_links(nodes, links, ctx, now);
		if self.transition_ms <= 0.0 {
			self.advance(now);
		}
		(node_diff, link_diff)
	}

	fn apply_nodes(&mut self, nodes: &[GraphNode], ctx: StyleContext<'_>, now: f64) -> Diff {
		let live: Vec<&str> = self
			.nodes
			.iter()
			.filter(|n| !matches!(n.phase, Phase::Exiting(_)))
			.map(|n| n.id.as_str())
			.collect();
		let next: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
		let diff = keyed_diff(live, &next);

		let mut previous: HashMap<String, SceneNode> =
			self.nodes.drain(..).map(|n| (n.id.clone(), n)).collect();
		let mut drawn = Vec::with_capacity(nodes.len());
		for (slot, node) in nodes.iter().enumerate() {
			let style = node_style(node, ctx);
			let phase = match previous.remove(&node.id).map(|p| p.phase) {
				Some(Phase::Present) => Phase::Present,
				Some(Phase::Entering(since)) => Phase::Entering(since),
				Some(Phase::Exiting(_)) | None => Phase::Entering(now),
			};
			drawn.push(SceneNode {
				id: node.id.clone(),
				slot: Some(slot),
				x: node.x,
				y: node.y,
				style,
				phase,
			});
		}
		// leftovers keep their order from the previous pass
		let mut leftovers: Vec<SceneNode> = previous.into_values().collect();
		leftovers.sort_by_key(|n| diff.exiting.iter().position(|id| *id == n.id).unwrap_or(usize::MAX));
		for mut node in leftovers {
			node.slot = None;
			if !matches!(node.phase, Phase::Exiting(_)) {
				node.phase = Phase::Exiting(now);
			}
			drawn.push(node);
		}
		self.nodes = drawn;
		diff
	}

	fn apply_links(
		&mut self,
		nodes: &[GraphNode],
		links: &[GraphLink],
		ctx: StyleContext<'_>,
		now: f64,
	) -> Diff {
		let live: Vec<&str> = self
			.links
			.iter()
			.filter(|l| !matches!(l.phase, Phase::Exiting(_)))
			.map(|l| l.id.as_str())
			.collect();
		let next: Vec<&str> = links.iter().map(|l| l.id.as_str()).collect();
		let diff = keyed_diff(live, &next);

		let mut previous: HashMap<String, SceneLink> =
			self.links.drain(..).map(|l| (l.id.clone(), l)).collect();
		let pairs: HashSet<(usize, usize)> = links.iter().map(|l| (l.source, l.target)).collect();
		let curvature = ctx.options.link_curvature;
		let mut drawn = Vec::with_capacity(links.len());
		for link in links {
			let bend = if curvature != 0.0 {
				curvature
			} else if pairs.contains(&(link.target, link.source)) {
				RECIPROCAL_BEND
			} else {
				0.0
			};
			let (s, t) = (&nodes[link.source], &nodes[link.target]);
			let phase = match previous.remove(&link.id).map(|p| p.phase) {
				Some(Phase::Present) => Phase::Present,
				Some(Phase::Entering(since)) => Phase::Entering(since),
				Some(Phase::Exiting(_)) | None => Phase::Entering(now),
			};
			drawn.push(SceneLink {
				id: link.id.clone(),
				source: s.id.clone(),
				target: t.id.clone(),
				slots: Some((link.source, link.target)),
				ends: ((s.x, s.y), (t.x, t.y)),
				bend,
				style: link_style(link, ctx),
				phase,
			});
		}
		let mut leftovers: Vec<SceneLink> = previous.into_values().collect();
		leftovers.sort_by_key(|l| diff.exiting.iter().position(|id| *id == l.id).unwrap_or(usize::MAX));
		for mut link in leftovers {
			link.slots = None;
			if !matches!(link.phase, Phase::Exiting(_)) {
				link.phase = Phase::Exiting(now);
			}
			drawn.push(link);
		}
		self.links = drawn;
		diff
	}

	/// Recompute every bound element's style without diffing.
	pub fn restyle(&mut self, nodes: &[GraphNode], links: &[GraphLink], ctx: StyleContext<'_>) {
		for drawn in &mut self.nodes {
			if let Some(node) = drawn.slot.and_then(|slot| nodes.get(slot)) {
				drawn.style = node_style(node, ctx);
			}
		}
		let by_id: HashMap<&str, &GraphLink> = links.iter().map(|l| (l.id.as_str(), l)).collect();
		for drawn in &mut self.links {
			if drawn.slots.is_none() {
				continue;
			}
			if let Some(link) = by_id.get(drawn.id.as_str()) {
				drawn.style = link_style(link, ctx);
			}
		}
	}

	/// Copy positions of bound elements from the arena. Styles are untouched.
	pub fn sync_positions(&mut self, nodes: &[GraphNode]) {
		for drawn in &mut self.nodes {
			if let Some(node) = drawn.slot.and_then(|slot| nodes.get(slot)) {
				drawn.x = node.x;
				drawn.y = node.y;
			}
		}
		for drawn in &mut self.links {
			if let Some((s, t)) = drawn.slots {
				if let (Some(s), Some(t)) = (nodes.get(s), nodes.get(t)) {
					drawn.ends = ((s.x, s.y), (t.x, t.y));
				}
			}
		}
	}

	/// Finish due transitions and drop exited elements. Returns whether any
	/// transition is still running.
	pub fn advance(&mut self, now: f64) -> bool {
		let duration = self.transition_ms;
		let done = |since: f64| duration <= 0.0 || now - since >= duration;

		let mut running = false;
		self.nodes.retain_mut(|n| step(&mut n.phase, done, &mut running));
		self.links.retain_mut(|l| step(&mut l.phase, done, &mut running));
		running
	}

	/// Opacity/scale of an element in `phase` at `now`.
	pub fn visual(&self, phase: Phase, now: f64) -> Visual {
		let progress = |since: f64| {
			if self.transition_ms <= 0.0 {
				1.0
			} else {
				((now - since) / self.transition_ms).clamp(0.0, 1.0)
			}
		};
		let t = match phase {
			Phase::Present => 1.0,
			Phase::Entering(since) => progress(since),
			Phase::Exiting(since) => 1.0 - progress(since),
		};
		Visual {
			opacity: t,
			scale: t,
		}
	}

	/// Bound node by id.
	pub fn node(&self, id: &str) -> Option<&SceneNode> {
		self.nodes.iter().find(|n| n.id == id && n.slot.is_some())
	}

	/// Bound link by id.
	pub fn link(&self, id: &str) -> Option<&SceneLink> {
		self.links.iter().find(|l| l.id == id && l.slots.is_some())
	}

	/// Curve of a link between its endpoints' unemphasised circles.
	pub fn link_curve(&self, link: &SceneLink) -> Option<LinkCurve> {
		let radius = |id: &str| self.node(id).map_or(0.0, |n| n.style.radius);
		LinkCurve::between(link.ends.0, link.ends.1, radius(&link.source), radius(&link.target), link.bend)
	}

	/// Remove everything immediately.
	pub fn clear(&mut self) {
		self.nodes.clear();
		self.links.clear();
	}
}

/// Advance one phase; returns false when the element should be dropped.
fn step(phase: &mut Phase, done: impl Fn(f64) -> bool, running: &mut bool) -> bool {
	match *phase {
		Phase::Present => true,
		Phase::Entering(since) => {
			if done(since) {
				*phase = Phase::Present;
			} else {
				*running = true;
			}
			true
		}
		Phase::Exiting(since) => {
			if done(since) {
				false
			} else {
				*running = true;
				true
			}
		}
	}
}

/// Everything a painter needs for one frame.
pub struct Frame<'a> {
	/// Drawn elements.
	pub scene: &'a Scene,
	/// Active palette.
	pub palette: &'a Palette,
	/// Viewport transform.
	pub transform: Transform,
	/// Surface size.
	pub size: (f64, f64),
	/// Selection, hover and animation overrides, merged.
	pub overlay: Highlights,
	/// Travelling particle, world space.
	pub marker: Option<(f64, f64)>,
	/// Frame time.
	pub now: f64,
}

impl Frame<'_> {
	/// Node style with overrides applied.
	pub fn node_style(&self, node: &SceneNode) -> NodeStyle {
		match self.overlay.node(&node.id) {
			Some(emphasis) => emphasis.apply(&node.style),
			None => node.style.clone(),
		}
	}

	/// Link style with overrides applied.
	pub fn link_style(&self, link: &SceneLink) -> LinkStyle {
		match self.overlay.link(&link.id) {
			Some(emphasis) => emphasis.apply(&link.style),
			None => link.style.clone(),
		}
	}

	/// Transition factors of an element.
	pub fn visual(&self, phase: Phase) -> Visual {
		self.scene.visual(phase, self.now)
	}

	/// Curve of a link between its endpoints' drawn circles.
	pub fn link_curve(&self, link: &SceneLink, radii: &HashMap<&str, f64>) -> Option<LinkCurve> {
		let ra = radii.get(link.source.as_str()).copied().unwrap_or(0.0);
		let rb = radii.get(link.target.as_str()).copied().unwrap_or(0.0);
		LinkCurve::between(link.ends.0, link.ends.1, ra, rb, link.bend)
	}

	/// Drawn radius of every node, overrides applied.
	pub fn radii(&self) -> HashMap<&str, f64> {
		self.scene
			.nodes
			.iter()
			.map(|n| {
				let scale = self.overlay.node(&n.id).map_or(1.0, |e| e.scale);
				(n.id.as_str(), n.style.radius * scale)
			})
			.collect()
	}
}

/// Shorten `a → b` so it runs between the circles around its ends. `None`
/// when the circles overlap.
pub fn trim_segment(
	a: (f64, f64),
	b: (f64, f64),
	ra: f64,
	rb: f64,
) -> Option<((f64, f64), (f64, f64))> {
	let (dx, dy) = (b.0 - a.0, b.1 - a.1);
	let dist = dx.hypot(dy);
	if dist <= ra + rb {
		return None;
	}
	let (ux, uy) = (dx / dist, dy / dist);
	Some(((a.0 + ux * ra, a.1 + uy * ra), (b.0 - ux * rb, b.1 - uy * rb)))
}

/// Quadratic curve a link is drawn along. A control point on the chord
/// midpoint gives a straight segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkCurve {
	/// Point on the source circle.
	pub start: (f64, f64),
	/// Quadratic control point.
	pub control: (f64, f64),
	/// Point on the target circle.
	pub end: (f64, f64),
}

impl LinkCurve {
	/// Curve from circle edge to circle edge with the control point `bend`
	/// units left of the chord midpoint. `None` when the circles overlap.
	pub fn between(a: (f64, f64), b: (f64, f64), ra: f64, rb: f64, bend: f64) -> Option<Self> {
		let (start, end) = trim_segment(a, b, ra, rb)?;
		let (dx, dy) = (end.0 - start.0, end.1 - start.1);
		let dist = dx.hypot(dy);
		let mid = ((start.0 + end.0) / 2.0, (start.1 + end.1) / 2.0);
		let control = if dist > 0.0 {
			(mid.0 - dy / dist * bend, mid.1 + dx / dist * bend)
		} else {
			mid
		};
		Some(Self { start, control, end })
	}

	/// Point at parameter `t` in `[0, 1]`.
	pub fn point_at(&self, t: f64) -> (f64, f64) {
		let u = 1.0 - t;
		let (a, b, c) = (u * u, 2.0 * u * t, t * t);
		(
			a * self.start.0 + b * self.control.0 + c * self.end.0,
			a * self.start.1 + b * self.control.1 + c * self.end.1,
		)
	}

	/// Unit direction of travel at the end.
	pub fn end_direction(&self) -> (f64, f64) {
		let (mut dx, mut dy) = (self.end.0 - self.control.0, self.end.1 - self.control.1);
		if dx.hypot(dy) <= f64::EPSILON {
			(dx, dy) = (self.end.0 - self.start.0, self.end.1 - self.start.1);
		}
		let len = dx.hypot(dy);
		if len > 0.0 { (dx / len, dy / len) } else { (0.0, 0.0) }
	}

	/// Same curve, stopped `by` units before the end along the end tangent.
	pub fn shortened(&self, by: f64) -> Self {
		let (ux, uy) = self.end_direction();
		Self {
			end: (self.end.0 - ux * by, self.end.1 - uy * by),
			..*self
		}
	}

	/// Approximate distance from `p` to the curve.
	pub fn distance_to(&self, p: (f64, f64)) -> f64 {
		let mut best = f64::INFINITY;
		let mut prev = self.start;
		for i in 1..=CURVE_SAMPLES {
			let next = self.point_at(i as f64 / CURVE_SAMPLES as f64);
			best = best.min(segment_distance(p, prev, next));
			prev = next;
		}
		best
	}
}

fn segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
	let (dx, dy) = (b.0 - a.0, b.1 - a.1);
	let len2 = dx * dx + dy * dy;
	let t = if len2 > 0.0 {
		(((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len2).clamp(0.0, 1.0)
	} else {
		0.0
	};
	(p.0 - (a.0 + t * dx)).hypot(p.1 - (a.1 + t * dy))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::model::{Expansion, TraversalBounds, prepare};
	use crate::components::force_graph::theme::Theme;
	use crate::components::force_graph::types::{
		Category, DomainGraph, DomainNode, RelationKind, Relationship,
	};

	fn graph() -> DomainGraph {
		DomainGraph {
			central: "root".into(),
			nodes: vec![
				DomainNode::new("root", "A rather long central label")
					.with_category(Category::Core)
					.with_children(["a", "b"]),
				DomainNode::new("a", "a").with_parent("root").with_children(["a1"]),
				DomainNode::new("b", "b").with_parent("root"),
				DomainNode::new("a1", "a1").with_parent("a").with_children(["a2"]),
				DomainNode::new("a2", "a2").with_parent("a1"),
			],
			..Default::default()
		}
	}

	fn prepared(focus: &str) -> (Vec<GraphNode>, Vec<GraphLink>) {
		let p = prepare(
			&graph(),
			Some(focus),
			&Expansion::default(),
			TraversalBounds::default(),
			(0.0, 0.0),
		)
		.unwrap();
		(p.nodes, p.links)
	}

	fn ctx(options: &RenderOptions, theme: Theme) -> StyleContext<'_> {
		StyleContext {
			palette: theme.palette(),
			options,
		}
	}

	#[test]
	fn curve_bends_left_of_its_direction() {
		let curve = LinkCurve::between((0.0, 0.0), (100.0, 0.0), 10.0, 10.0, 30.0).unwrap();
		assert_eq!(curve.start, (10.0, 0.0));
		assert_eq!(curve.end, (90.0, 0.0));
		assert_eq!(curve.control, (50.0, 30.0));
		assert_eq!(curve.point_at(0.5), (50.0, 15.0));
		assert!(curve.distance_to((50.0, 15.0)) < 0.5);
		assert!(curve.distance_to((50.0, 0.0)) > 10.0);

		let back = LinkCurve::between((100.0, 0.0), (0.0, 0.0), 10.0, 10.0, 30.0).unwrap();
		assert_eq!(back.control, (50.0, -30.0));
		assert!(LinkCurve::between((0.0, 0.0), (15.0, 0.0), 10.0, 10.0, 30.0).is_none());
	}

	#[test]
	fn reciprocal_links_get_a_bend() {
		let mut graph = graph();
		graph
			.relationships
			.push(Relationship::new("a-b", "a", "b", RelationKind::DirectEffect));
		graph
			.relationships
			.push(Relationship::new("b-a", "b", "a", RelationKind::Feedback));
		let p = prepare(&graph, None, &Expansion::default(), TraversalBounds::default(), (0.0, 0.0)).unwrap();
		let mut options = RenderOptions::default();
		let mut scene = Scene::default();
		scene.apply(&p.nodes, &p.links, ctx(&options, Theme::Light), 0.0);
		let bend = |scene: &Scene, id: &str| scene.link(id).map(|l| l.bend);
		assert_eq!(bend(&scene, "a-b"), Some(RECIPROCAL_BEND));
		assert_eq!(bend(&scene, "b-a"), Some(RECIPROCAL_BEND));
		assert_eq!(bend(&scene, "root-a"), Some(0.0));

		options.link_curvature = 12.0;
		scene.apply(&p.nodes, &p.links, ctx(&options, Theme::Light), 0.0);
		assert_eq!(bend(&scene, "root-a"), Some(12.0));
	}

	#[test]
	fn diff_sets_are_disjoint() {
		let diff = keyed_diff(["a", "b", "c"], &["b", "c", "d"]);
		assert_eq!(diff.entering, vec!["d"]);
		assert_eq!(diff.updating, vec!["b", "c"]);
		assert_eq!(diff.exiting, vec!["a"]);
	}

	#[test]
	fn refocus_enters_and_exits_by_id() {
		let options = RenderOptions::default();
		let mut scene = Scene::default();
		let (nodes, links) = prepared("root");
		let (diff, _) = scene.apply(&nodes, &links, ctx(&options, Theme::Light), 0.0);
		assert_eq!(diff.entering, vec!["root", "a", "b", "a1"]);

		let (nodes, links) = prepared("a1");
		let (diff, link_diff) = scene.apply(&nodes, &links, ctx(&options, Theme::Light), 500.0);
		assert_eq!(diff.entering, vec!["a2"]);
		assert_eq!(diff.updating, vec!["a", "a1"]);
		assert_eq!(diff.exiting, vec!["root", "b"]);
		assert!(link_diff.exiting.contains(&"root-b".to_string()));

		// exiting elements linger until the transition ends
		assert!(scene.nodes.iter().any(|n| n.id == "b"));
		assert!(scene.node("b").is_none());
		let fading = scene.nodes.iter().find(|n| n.id == "b").unwrap();
		assert_eq!(scene.visual(fading.phase, 650.0).opacity, 0.5);
		assert!(scene.advance(700.0));
		assert!(!scene.advance(800.0));
		assert!(scene.nodes.iter().all(|n| n.id != "b"));
		assert_eq!(scene.nodes.len(), 3);
	}

	#[test]
	fn disabled_animation_removes_immediately() {
		let options = RenderOptions {
			enable_animation: false,
			..RenderOptions::default()
		};
		let mut scene = Scene::default();
		let (nodes, links) = prepared("root");
		scene.apply(&nodes, &links, ctx(&options, Theme::Light), 0.0);
		assert!(scene.nodes.iter().all(|n| n.phase == Phase::Present));
		let (nodes, links) = prepared("a1");
		scene.apply(&nodes, &links, ctx(&options, Theme::Light), 1.0);
		assert_eq!(scene.nodes.len(), 3);
	}

	#[test]
	fn labels_are_truncated_and_optional() {
		let mut options = RenderOptions::default();
		let (nodes, _) = prepared("root");
		let style = node_style(&nodes[0], ctx(&options, Theme::Light));
		assert_eq!(style.label.as_deref(), Some("A rather lon..."));
		assert_eq!(style.icon, "●");
		options.show_labels = false;
		assert_eq!(node_style(&nodes[0], ctx(&options, Theme::Light)).label, None);
	}

	#[test]
	fn restyle_changes_colors_not_positions() {
		let options = RenderOptions::default();
		let mut scene = Scene::default();
		let (mut nodes, links) = prepared("root");
		scene.apply(&nodes, &links, ctx(&options, Theme::Light), 0.0);
		nodes[0].x = 42.0;
		scene.sync_positions(&nodes);
		let before = scene.nodes[0].clone();

		scene.restyle(&nodes, &links, ctx(&options, Theme::Dark));
		let after = &scene.nodes[0];
		assert_eq!((after.x, after.y), (before.x, before.y));
		assert_ne!(after.style.fill, before.style.fill);
		assert_ne!(after.style.stroke, before.style.stroke);
		assert_ne!(after.style.text, before.style.text);
	}

	#[test]
	fn position_sync_leaves_styles_alone() {
		let options = RenderOptions::default();
		let mut scene = Scene::default();
		let (mut nodes, links) = prepared("root");
		scene.apply(&nodes, &links, ctx(&options, Theme::Light), 0.0);
		let styles: Vec<_> = scene.nodes.iter().map(|n| n.style.clone()).collect();
		nodes[1].x = 10.0;
		nodes[1].y = -3.0;
		// stale domain data must not leak into styles on a position pass
		nodes[1].domain.label = "changed".into();
		scene.sync_positions(&nodes);
		assert_eq!((scene.nodes[1].x, scene.nodes[1].y), (10.0, -3.0));
		assert_eq!(scene.links[0].ends.1, (10.0, -3.0));
		let after: Vec<_> = scene.nodes.iter().map(|n| n.style.clone()).collect();
		assert_eq!(styles, after);
	}
}
