//! Domain graph shapes accepted by the renderer.
//!
//! These are the boundary types: they come straight from JSON and may carry
//! dangling references. [`super::model::prepare`] is the only place that
//! resolves them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A point in graph (world) coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate.
	pub y: f64,
}

impl Point {
	/// Build a point.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// Node category. Covers both the mind map and the structural model.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
	Core,
	#[default]
	Concept,
	Application,
	Research,
	Example,
	Method,
	Theory,
	ContextGroup,
	SituationalCue,
	CoreConstruct,
	Mediator,
	Outcome,
	FinalOutcome,
	OutcomeGroup,
	Motivation,
	IndependentVariable,
	DependentVariable,
	#[serde(other)]
	Other,
}

/// Size class of a domain node.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
	Small,
	#[default]
	Medium,
	Large,
	#[serde(other)]
	Unknown,
}

impl SizeClass {
	/// Radius multiplier applied on top of the configured base radius.
	pub fn multiplier(self) -> f64 {
		match self {
			SizeClass::Small => 0.8,
			SizeClass::Large => 1.2,
			SizeClass::Medium | SizeClass::Unknown => 1.0,
		}
	}
}

/// Relationship kind.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationKind {
	#[default]
	ParentChild,
	Related,
	Prerequisite,
	Application,
	Example,
	Activation,
	DirectEffect,
	Mediation,
	Moderation,
	Feedback,
	PositiveEffect,
	NegativeEffect,
	MarginalEffect,
	NonSignificant,
	#[serde(other)]
	Other,
}

impl RelationKind {
	/// Whether links of this kind are drawn with an arrowhead.
	pub fn is_directional(self) -> bool {
		!matches!(self, RelationKind::Related | RelationKind::Other)
	}
}

fn default_importance() -> f64 {
	5.0
}

fn default_strength() -> f64 {
	1.0
}

/// A node of the domain graph.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DomainNode {
	/// Stable identifier.
	pub id: String,
	/// Display label.
	pub label: String,
	/// Hierarchy level; drives link rest length.
	pub level: u32,
	/// Category, used for fill and icon.
	pub category: Category,
	/// Free-form description.
	pub description: String,
	/// Parent node id.
	pub parent: Option<String>,
	/// Child node ids.
	pub children: Vec<String>,
	/// Stored layout position.
	pub position: Option<Point>,
	/// Own color, preferred by the colorful theme.
	pub color: Option<String>,
	/// Size class.
	pub size: SizeClass,
	/// Importance on a 1–10 scale.
	#[serde(default = "default_importance")]
	pub importance: f64,
	/// Search keywords.
	pub keywords: Vec<String>,
	/// Path badge shown on structural model nodes.
	pub path_number: Option<String>,
}

impl DomainNode {
	/// Convenience constructor used by demos and tests.
	pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			label: label.into(),
			importance: default_importance(),
			..Default::default()
		}
	}

	/// Builder-style category setter.
	pub fn with_category(mut self, category: Category) -> Self {
		self.category = category;
		self
	}

	/// Builder-style level setter.
	pub fn with_level(mut self, level: u32) -> Self {
		self.level = level;
		self
	}

	/// Builder-style parent setter.
	pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
		self.parent = Some(parent.into());
		self
	}

	/// Builder-style children setter.
	pub fn with_children<I, S>(mut self, children: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.children = children.into_iter().map(Into::into).collect();
		self
	}
}

/// An edge of the domain graph.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Relationship {
	/// Stable identifier.
	pub id: String,
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
	/// Relationship kind.
	#[serde(rename = "type")]
	pub kind: RelationKind,
	/// Weight; scales link width.
	#[serde(default = "default_strength")]
	pub strength: f64,
	/// Short label drawn at the link midpoint.
	pub label: Option<String>,
	/// Free-form description.
	pub description: String,
	/// Whether the relationship reads both ways.
	pub bidirectional: bool,
}

impl Relationship {
	/// Convenience constructor used by demos and tests.
	pub fn new(
		id: impl Into<String>,
		source: impl Into<String>,
		target: impl Into<String>,
		kind: RelationKind,
	) -> Self {
		Self {
			id: id.into(),
			source: source.into(),
			target: target.into(),
			kind,
			strength: default_strength(),
			..Default::default()
		}
	}

	/// Whether this relationship joins `a` and `b` in either direction.
	pub fn joins(&self, a: &str, b: &str) -> bool {
		(self.source == a && self.target == b) || (self.source == b && self.target == a)
	}
}

/// A curated walk through the graph.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LearningPath {
	/// Stable identifier.
	pub id: String,
	/// Display title.
	pub title: String,
	/// Visited node ids in order.
	pub node_sequence: Vec<String>,
}

/// The immutable input of a render call.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DomainGraph {
	/// Graph identifier.
	pub id: String,
	/// Display title.
	pub title: String,
	/// Id of the central topic; the default focus.
	pub central: String,
	/// Nodes in input order.
	pub nodes: Vec<DomainNode>,
	/// Relationships in input order.
	pub relationships: Vec<Relationship>,
	/// Curated learning paths.
	pub learning_paths: Vec<LearningPath>,
}

/// One hit of [`DomainGraph::search`].
#[derive(Clone, Debug, PartialEq)]
pub struct SearchHit {
	/// Matching node id.
	pub id: String,
	/// Higher is better.
	pub score: u32,
}

impl DomainGraph {
	/// Parse a graph from JSON.
	pub fn from_json(json: &str) -> serde_json::Result<Self> {
		serde_json::from_str(json)
	}

	/// Position of each node id in `nodes`. First occurrence wins.
	pub fn index(&self) -> HashMap<&str, usize> {
		let mut index = HashMap::with_capacity(self.nodes.len());
		for (i, node) in self.nodes.iter().enumerate() {
			index.entry(node.id.as_str()).or_insert(i);
		}
		index
	}

	/// Look a node up by id.
	pub fn node(&self, id: &str) -> Option<&DomainNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	/// Mutable lookup by id.
	pub fn node_mut(&mut self, id: &str) -> Option<&mut DomainNode> {
		self.nodes.iter_mut().find(|n| n.id == id)
	}

	/// Rank nodes whose label or keywords match `query` (case-insensitive).
	pub fn search(&self, query: &str) -> Vec<SearchHit> {
		let query = query.trim().to_lowercase();
		if query.is_empty() {
			return Vec::new();
		}
		let score_text = |text: &str| -> u32 {
			let text = text.to_lowercase();
			if text == query {
				3
			} else if text.starts_with(&query) {
				2
			} else if text.contains(&query) {
				1
			} else {
				0
			}
		};

		let mut hits: Vec<SearchHit> = self
			.nodes
			.iter()
			.filter_map(|node| {
				let label = score_text(&node.label) * 2;
				let keywords = node.keywords.iter().map(|k| score_text(k)).max().unwrap_or(0);
				let score = label.max(keywords);
				(score > 0).then(|| SearchHit {
					id: node.id.clone(),
					score,
				})
			})
			.collect();
		// stable: equal scores keep input order
		hits.sort_by(|a, b| b.score.cmp(&a.score));
		hits
	}

	/// Relationship ids joining consecutive nodes of `sequence`.
	///
	/// Pairs with no joining relationship are skipped.
	pub fn relationships_along(&self, sequence: &[String]) -> Vec<String> {
		sequence
			.windows(2)
			.filter_map(|pair| {
				self.relationships
					.iter()
					.find(|rel| rel.joins(&pair[0], &pair[1]))
					.map(|rel| rel.id.clone())
			})
			.collect()
	}
}

/// Partial update applied by `update_node_data`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodePatch {
	/// New label.
	pub label: Option<String>,
	/// New category.
	pub category: Option<Category>,
	/// New description.
	pub description: Option<String>,
	/// New size class.
	pub size: Option<SizeClass>,
	/// New importance.
	pub importance: Option<f64>,
	/// New own color.
	pub color: Option<String>,
}

impl NodePatch {
	/// Merge the set fields into `node`.
	pub fn apply_to(&self, node: &mut DomainNode) {
		if let Some(label) = &self.label {
			node.label = label.clone();
		}
		if let Some(category) = self.category {
			node.category = category;
		}
		if let Some(description) = &self.description {
			node.description = description.clone();
		}
		if let Some(size) = self.size {
			node.size = size;
		}
		if let Some(importance) = self.importance {
			node.importance = importance;
		}
		if let Some(color) = &self.color {
			node.color = Some(color.clone());
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unknown_enum_strings_fall_back() {
		let json = r#"{
			"central": "a",
			"nodes": [{ "id": "a", "label": "A", "category": "mystery", "size": "huge" }],
			"relationships": [{ "id": "r", "source": "a", "target": "b", "type": "sideways" }]
		}"#;
		let graph = DomainGraph::from_json(json).unwrap();
		assert_eq!(graph.nodes[0].category, Category::Other);
		assert_eq!(graph.nodes[0].size, SizeClass::Unknown);
		assert_eq!(graph.nodes[0].importance, 5.0);
		assert_eq!(graph.relationships[0].kind, RelationKind::Other);
		assert_eq!(graph.relationships[0].strength, 1.0);
	}

	#[test]
	fn search_ranks_exact_label_first() {
		let mut graph = DomainGraph::default();
		graph.nodes.push(DomainNode::new("a", "Trait activation"));
		graph.nodes.push(DomainNode::new("b", "Trait"));
		let mut c = DomainNode::new("c", "Cues");
		c.keywords.push("trait cue".into());
		graph.nodes.push(c);

		let ids: Vec<_> = graph.search("trait").into_iter().map(|h| h.id).collect();
		assert_eq!(ids, vec!["b", "a", "c"]);
		assert!(graph.search("   ").is_empty());
	}

	#[test]
	fn relationships_along_skips_unjoined_pairs() {
		let mut graph = DomainGraph::default();
		graph
			.relationships
			.push(Relationship::new("ab", "a", "b", RelationKind::Related));
		graph
			.relationships
			.push(Relationship::new("cb", "c", "b", RelationKind::Related));
		let seq: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
		assert_eq!(graph.relationships_along(&seq), vec!["ab", "cb"]);
	}

	#[test]
	fn duplicate_ids_keep_first_index() {
		let mut graph = DomainGraph::default();
		graph.nodes.push(DomainNode::new("a", "first"));
		graph.nodes.push(DomainNode::new("a", "second"));
		assert_eq!(graph.index()["a"], 0);
	}
}
