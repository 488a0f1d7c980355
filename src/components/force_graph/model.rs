//! Graph data model: turns a domain graph into the visible node/link arena.

use std::collections::{HashMap, HashSet, VecDeque};

use super::options::{NodeSize, node_radius};
use super::types::{DomainGraph, DomainNode, RelationKind, Relationship};

/// How far the visible subgraph reaches from the focus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraversalBounds {
	/// Child hops followed from the focus.
	pub descendants: u32,
	/// Parent hops followed from the focus.
	pub ancestors: u32,
}

impl Default for TraversalBounds {
	fn default() -> Self {
		Self {
			descendants: 2,
			ancestors: 1,
		}
	}
}

/// User overrides layered over the depth bounds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Expansion {
	/// Nodes whose children are shown regardless of depth.
	pub expanded: HashSet<String>,
	/// Nodes whose children are hidden regardless of depth.
	pub collapsed: HashSet<String>,
}

impl Expansion {
	/// Flip a node, given whether it is currently expanded.
	pub fn toggle(&mut self, id: &str, currently_expanded: bool) {
		if currently_expanded {
			self.expanded.remove(id);
			self.collapsed.insert(id.to_string());
		} else {
			self.collapsed.remove(id);
			self.expanded.insert(id.to_string());
		}
	}

	fn allows_children(&self, id: &str, depth: u32, bounds: TraversalBounds) -> bool {
		if self.collapsed.contains(id) {
			return false;
		}
		depth < bounds.descendants || self.expanded.contains(id)
	}
}

/// A node of the visible arena.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	/// Same as `domain.id`.
	pub id: String,
	/// The domain node this renders.
	pub domain: DomainNode,
	/// Layout x.
	pub x: f64,
	/// Layout y.
	pub y: f64,
	/// Pinned x, set while dragged.
	pub fx: Option<f64>,
	/// Pinned y, set while dragged.
	pub fy: Option<f64>,
	/// Hop distance from the focus.
	pub depth: u32,
	/// Always true for prepared nodes; cleared when a node is leaving.
	pub visible: bool,
	/// Whether the traversal showed this node's children.
	pub expanded: bool,
}

impl GraphNode {
	/// Radius under the given base size.
	pub fn radius(&self, size: NodeSize) -> f64 {
		node_radius(size, &self.domain)
	}

	/// Whether the node is pinned by a drag.
	pub fn is_pinned(&self) -> bool {
		self.fx.is_some() || self.fy.is_some()
	}
}

/// A link of the visible arena. Endpoints are indices into the node arena.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphLink {
	/// Same as `relation.id`.
	pub id: String,
	/// Index of the source node.
	pub source: usize,
	/// Index of the target node.
	pub target: usize,
	/// The relationship this renders.
	pub relation: Relationship,
	/// Synthesized from the parent/child hierarchy.
	pub implicit: bool,
}

/// Output of [`prepare`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Prepared {
	/// Resolved focus id.
	pub focus: String,
	/// Visible nodes in domain input order.
	pub nodes: Vec<GraphNode>,
	/// Links with both endpoints in `nodes`.
	pub links: Vec<GraphLink>,
}

impl Prepared {
	/// Arena index of a node id.
	pub fn slot(&self, id: &str) -> Option<usize> {
		self.nodes.iter().position(|n| n.id == id)
	}
}

/// Derive the visible subgraph around `focus` (or the central node).
///
/// Returns `None` when the focus does not resolve.
pub fn prepare(
	graph: &DomainGraph,
	focus: Option<&str>,
	expansion: &Expansion,
	bounds: TraversalBounds,
	center: (f64, f64),
) -> Option<Prepared> {
	let index = graph.index();
	let focus = focus.unwrap_or(graph.central.as_str());
	if !index.contains_key(focus) {
		log::debug!("focus {focus:?} is not part of graph {:?}", graph.id);
		return None;
	}

	let visited = visit(graph, &index, focus, expansion, bounds);

	let mut nodes = Vec::with_capacity(visited.len());
	for (i, domain) in graph.nodes.iter().enumerate() {
		// duplicates: only the indexed occurrence renders
		if index.get(domain.id.as_str()) != Some(&i) {
			continue;
		}
		let Some(&(depth, expanded)) = visited.get(domain.id.as_str()) else {
			continue;
		};
		let (x, y) = domain
			.position
			.map(|p| (p.x, p.y))
			.unwrap_or(center);
		nodes.push(GraphNode {
			id: domain.id.clone(),
			domain: domain.clone(),
			x,
			y,
			fx: None,
			fy: None,
			depth,
			visible: true,
			expanded,
		});
	}

	let links = resolve_links(graph, &nodes);
	Some(Prepared {
		focus: focus.to_string(),
		nodes,
		links,
	})
}

/// Breadth-first worklist from the focus. Maps id → (depth, expanded).
fn visit<'g>(
	graph: &'g DomainGraph,
	index: &HashMap<&'g str, usize>,
	focus: &'g str,
	expansion: &Expansion,
	bounds: TraversalBounds,
) -> HashMap<&'g str, (u32, bool)> {
	let mut visited: HashMap<&str, (u32, bool)> = HashMap::new();
	let mut queue: VecDeque<(&str, u32)> = VecDeque::new();
	visited.insert(focus, (0, false));
	queue.push_back((focus, 0));

	while let Some((id, depth)) = queue.pop_front() {
		let node = &graph.nodes[index[id]];
		let mut enqueue = |next: &'g str, visited: &mut HashMap<&'g str, (u32, bool)>| {
			if !index.contains_key(next) {
				log::debug!("dangling reference {next:?} from {id:?}");
				return;
			}
			if visited.contains_key(next) {
				return;
			}
			visited.insert(next, (depth + 1, false));
			queue.push_back((next, depth + 1));
		};

		if expansion.allows_children(id, depth, bounds) && !node.children.is_empty() {
			if let Some(entry) = visited.get_mut(id) {
				entry.1 = true;
			}
			for child in &node.children {
				enqueue(child.as_str(), &mut visited);
			}
		}
		if depth < bounds.ancestors {
			if let Some(parent) = node.parent.as_deref() {
				enqueue(parent, &mut visited);
			}
		}
	}
	visited
}

fn resolve_links(graph: &DomainGraph, nodes: &[GraphNode]) -> Vec<GraphLink> {
	let slots: HashMap<&str, usize> = nodes
		.iter()
		.enumerate()
		.map(|(i, n)| (n.id.as_str(), i))
		.collect();

	let mut links: Vec<GraphLink> = graph
		.relationships
		.iter()
		.filter_map(|rel| {
			let source = *slots.get(rel.source.as_str())?;
			let target = *slots.get(rel.target.as_str())?;
			Some(GraphLink {
				id: rel.id.clone(),
				source,
				target,
				relation: rel.clone(),
				implicit: false,
			})
		})
		.collect();

	let mut seen: HashSet<String> = links.iter().map(|l| l.id.clone()).collect();
	for (target, node) in nodes.iter().enumerate() {
		let Some(parent) = node.domain.parent.as_deref() else {
			continue;
		};
		let Some(&source) = slots.get(parent) else {
			continue;
		};
		let joined = graph
			.relationships
			.iter()
			.any(|rel| rel.joins(parent, &node.id));
		let id = format!("{parent}-{}", node.id);
		if joined || !seen.insert(id.clone()) {
			continue;
		}
		let mut relation = Relationship::new(id.clone(), parent, node.id.clone(), RelationKind::ParentChild);
		relation.description = "hierarchy".to_string();
		links.push(GraphLink {
			id,
			source,
			target,
			relation,
			implicit: true,
		});
	}
	links
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;
	use crate::components::force_graph::types::{Category, Point};

	fn prep(graph: &DomainGraph, focus: Option<&str>) -> Prepared {
		prepare(
			graph,
			focus,
			&Expansion::default(),
			TraversalBounds::default(),
			(400.0, 300.0),
		)
		.unwrap()
	}

	fn ids(prepared: &Prepared) -> Vec<&str> {
		prepared.nodes.iter().map(|n| n.id.as_str()).collect()
	}

	fn link_ids(prepared: &Prepared) -> Vec<&str> {
		prepared.links.iter().map(|l| l.id.as_str()).collect()
	}

	fn central_with_two_children() -> DomainGraph {
		DomainGraph {
			central: "C".into(),
			nodes: vec![
				DomainNode::new("C", "Central")
					.with_category(Category::Core)
					.with_children(["A", "B"]),
				DomainNode::new("A", "A").with_parent("C").with_level(1),
				DomainNode::new("B", "B").with_parent("C").with_level(1),
			],
			relationships: vec![
				Relationship::new("C-A", "C", "A", RelationKind::ParentChild),
				Relationship::new("C-B", "C", "B", RelationKind::ParentChild),
			],
			..Default::default()
		}
	}

	/// A chain root → n1 → n2 → n3 → n4.
	fn chain() -> DomainGraph {
		let mut nodes = vec![DomainNode::new("root", "root").with_children(["n1"])];
		for i in 1..=4 {
			let mut node = DomainNode::new(format!("n{i}"), format!("n{i}")).with_level(i);
			node.parent = Some(if i == 1 { "root".into() } else { format!("n{}", i - 1) });
			if i < 4 {
				node.children = vec![format!("n{}", i + 1)];
			}
			nodes.push(node);
		}
		DomainGraph {
			central: "root".into(),
			nodes,
			..Default::default()
		}
	}

	#[test]
	fn central_with_children_yields_star() {
		let prepared = prep(&central_with_two_children(), Some("C"));
		assert_eq!(ids(&prepared), vec!["C", "A", "B"]);
		assert_eq!(link_ids(&prepared), vec!["C-A", "C-B"]);
		assert!(prepared.nodes[0].expanded);
		assert!(!prepared.nodes[1].expanded);
	}

	#[test]
	fn focus_defaults_to_central() {
		let prepared = prep(&central_with_two_children(), None);
		assert_eq!(prepared.focus, "C");
	}

	#[test]
	fn unknown_focus_is_none() {
		let graph = central_with_two_children();
		assert!(
			prepare(
				&graph,
				Some("nope"),
				&Expansion::default(),
				TraversalBounds::default(),
				(0.0, 0.0)
			)
			.is_none()
		);
	}

	#[test]
	fn dangling_relationship_is_dropped() {
		let mut graph = central_with_two_children();
		graph
			.relationships
			.push(Relationship::new("C-ghost", "C", "ghost", RelationKind::Related));
		graph.nodes[0].children.push("ghost".into());
		let prepared = prep(&graph, Some("C"));
		assert_eq!(ids(&prepared), vec!["C", "A", "B"]);
		assert_eq!(link_ids(&prepared), vec!["C-A", "C-B"]);
	}

	#[test]
	fn hierarchy_without_relationships_is_linked() {
		let mut graph = central_with_two_children();
		graph.relationships.clear();
		let prepared = prep(&graph, Some("C"));
		assert_eq!(link_ids(&prepared), vec!["C-A", "C-B"]);
		assert!(prepared.links.iter().all(|l| l.implicit));
	}

	#[test]
	fn depth_bounds_limit_the_chain() {
		let prepared = prep(&chain(), Some("n2"));
		// parent n1 at depth 1, its parent is not followed; children to depth 2
		assert_eq!(ids(&prepared), vec!["n1", "n2", "n3", "n4"]);
		let prepared = prep(&chain(), Some("root"));
		assert_eq!(ids(&prepared), vec!["root", "n1", "n2"]);
	}

	#[test]
	fn siblings_arrive_through_the_parent() {
		let mut graph = central_with_two_children();
		graph.central = "A".into();
		let prepared = prep(&graph, None);
		assert_eq!(ids(&prepared), vec!["C", "A", "B"]);
	}

	#[test]
	fn expansion_overrides_bounds() {
		let graph = chain();
		let mut expansion = Expansion::default();
		expansion.toggle("n2", false);
		let prepared =
			prepare(&graph, Some("root"), &expansion, TraversalBounds::default(), (0.0, 0.0)).unwrap();
		assert_eq!(ids(&prepared), vec!["root", "n1", "n2", "n3"]);

		expansion.toggle("root", true);
		let prepared =
			prepare(&graph, Some("root"), &expansion, TraversalBounds::default(), (0.0, 0.0)).unwrap();
		assert_eq!(ids(&prepared), vec!["root"]);
	}

	#[test]
	fn cycles_terminate() {
		let graph = DomainGraph {
			central: "a".into(),
			nodes: vec![
				DomainNode::new("a", "a").with_children(["b"]).with_parent("b"),
				DomainNode::new("b", "b").with_children(["a"]).with_parent("a"),
			],
			..Default::default()
		};
		let mut expansion = Expansion::default();
		expansion.expanded.insert("a".into());
		expansion.expanded.insert("b".into());
		let prepared =
			prepare(&graph, None, &expansion, TraversalBounds::default(), (0.0, 0.0)).unwrap();
		assert_eq!(ids(&prepared), vec!["a", "b"]);
	}

	#[test]
	fn seeds_from_stored_position_or_center() {
		let mut graph = central_with_two_children();
		graph.nodes[1].position = Some(Point::new(10.0, 20.0));
		let prepared = prep(&graph, Some("C"));
		assert_eq!((prepared.nodes[0].x, prepared.nodes[0].y), (400.0, 300.0));
		assert_eq!((prepared.nodes[1].x, prepared.nodes[1].y), (10.0, 20.0));
	}

	/// Random forest over `n` nodes plus random extra relationships, some of
	/// which dangle.
	fn arb_graph() -> impl Strategy<Value = (DomainGraph, usize)> {
		(2usize..24).prop_flat_map(|n| {
			(
				proptest::collection::vec(0usize..64, n),
				proptest::collection::vec((0usize..n + 3, 0usize..n + 3), 0..32),
				0..n,
			)
				.prop_map(move |(parents, extra, focus)| {
					let mut nodes: Vec<DomainNode> = (0..n)
						.map(|i| DomainNode::new(format!("n{i}"), format!("n{i}")))
						.collect();
					for i in 1..n {
						let parent = parents[i] % i;
						nodes[i].parent = Some(format!("n{parent}"));
						nodes[parent].children.push(format!("n{i}"));
					}
					let relationships = extra
						.iter()
						.enumerate()
						.map(|(k, (s, t))| {
							Relationship::new(format!("r{k}"), format!("n{s}"), format!("n{t}"), RelationKind::Related)
						})
						.collect();
					let graph = DomainGraph {
						central: "n0".into(),
						nodes,
						relationships,
						..Default::default()
					};
					(graph, focus)
				})
		})
	}

	/// Every id the traversal rules could reach, tracking the shallowest depth.
	fn allowed_ids(graph: &DomainGraph, focus: &str) -> HashSet<String> {
		let by_id: HashMap<&str, &DomainNode> = graph.nodes.iter().map(|n| (n.id.as_str(), n)).collect();
		let mut best: HashMap<String, u32> = HashMap::new();
		let mut frontier = vec![(focus.to_string(), 0u32)];
		while let Some((id, depth)) = frontier.pop() {
			let Some(node) = by_id.get(id.as_str()) else {
				continue;
			};
			if best.get(&id).is_some_and(|&d| d <= depth) {
				continue;
			}
			best.insert(id.clone(), depth);
			if depth < 2 {
				for child in &node.children {
					frontier.push((child.clone(), depth + 1));
				}
			}
			if depth < 1 {
				if let Some(parent) = &node.parent {
					frontier.push((parent.clone(), depth + 1));
				}
			}
		}
		best.into_keys().collect()
	}

	proptest! {
		#[test]
		fn prepared_set_contains_focus_without_duplicates((graph, focus) in arb_graph()) {
			let focus = format!("n{focus}");
			let prepared = prep(&graph, Some(&focus));
			let ids: Vec<&str> = prepared.nodes.iter().map(|n| n.id.as_str()).collect();
			let unique: HashSet<&str> = ids.iter().copied().collect();
			prop_assert!(unique.contains(focus.as_str()));
			prop_assert_eq!(unique.len(), ids.len());

			let allowed = allowed_ids(&graph, &focus);
			for id in &ids {
				prop_assert!(allowed.contains(*id), "{} beyond depth bound", id);
			}
			for node in &prepared.nodes {
				prop_assert!(node.depth <= 2);
			}
		}

		#[test]
		fn prepared_links_never_dangle((graph, focus) in arb_graph()) {
			let prepared = prep(&graph, Some(&format!("n{focus}")));
			for link in &prepared.links {
				prop_assert!(link.source < prepared.nodes.len());
				prop_assert!(link.target < prepared.nodes.len());
				prop_assert_eq!(&prepared.nodes[link.source].id, &link.relation.source);
				prop_assert_eq!(&prepared.nodes[link.target].id, &link.relation.target);
			}
		}

		#[test]
		fn prepare_is_idempotent((graph, focus) in arb_graph()) {
			let focus = format!("n{focus}");
			let a = prep(&graph, Some(&focus));
			let b = prep(&graph, Some(&focus));
			let a_nodes: HashSet<_> = a.nodes.iter().map(|n| n.id.clone()).collect();
			let b_nodes: HashSet<_> = b.nodes.iter().map(|n| n.id.clone()).collect();
			let a_links: HashSet<_> = a.links.iter().map(|l| l.id.clone()).collect();
			let b_links: HashSet<_> = b.links.iter().map(|l| l.id.clone()).collect();
			prop_assert_eq!(a_nodes, b_nodes);
			prop_assert_eq!(a_links, b_links);
		}
	}
}
