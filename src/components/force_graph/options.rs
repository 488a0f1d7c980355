//! Renderer configuration.

use serde::{Deserialize, Serialize};

use super::theme::Theme;
use super::types::DomainNode;

/// Global node size setting; selects the base radius.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeSize {
	/// Base radius 15.
	Small,
	/// Base radius 20.
	#[default]
	Medium,
	/// Base radius 25.
	Large,
}

impl NodeSize {
	/// Base radius before per-node multipliers.
	pub fn base_radius(self) -> f64 {
		match self {
			NodeSize::Small => 15.0,
			NodeSize::Medium => 20.0,
			NodeSize::Large => 25.0,
		}
	}

	fn name(self) -> &'static str {
		match self {
			NodeSize::Small => "small",
			NodeSize::Medium => "medium",
			NodeSize::Large => "large",
		}
	}
}

impl From<String> for NodeSize {
	fn from(value: String) -> Self {
		match value.trim().to_ascii_lowercase().as_str() {
			"small" => NodeSize::Small,
			"large" => NodeSize::Large,
			"medium" => NodeSize::Medium,
			other => {
				log::warn!("unknown node size {other:?}, using medium");
				NodeSize::Medium
			}
		}
	}
}

impl From<NodeSize> for String {
	fn from(value: NodeSize) -> Self {
		value.name().to_string()
	}
}

const DEFAULT_WIDTH: f64 = 800.0;
const DEFAULT_HEIGHT: f64 = 600.0;
const DEFAULT_LINK_STRENGTH: f64 = 0.3;
const DEFAULT_CHARGE_STRENGTH: f64 = -300.0;

/// Options recognized by [`super::GraphState`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderOptions {
	/// Surface width in CSS pixels.
	pub width: f64,
	/// Surface height in CSS pixels.
	pub height: f64,
	/// Centering target; defaults to `width / 2`.
	pub center_x: Option<f64>,
	/// Centering target; defaults to `height / 2`.
	pub center_y: Option<f64>,
	/// Initial theme.
	pub theme: Theme,
	/// Draw labels under nodes.
	pub show_labels: bool,
	/// Animate enter/exit and viewport changes.
	pub enable_animation: bool,
	/// Base node size.
	pub node_size: NodeSize,
	/// Spring strength of links.
	pub link_strength: f64,
	/// Pairwise charge; negative repels.
	pub charge_strength: f64,
	/// Double click toggles expansion and refocuses.
	pub expand_on_double_click: bool,
	/// Sideways offset of each link's control point; 0 draws straight
	/// links. Reciprocal pairs always bend apart.
	pub link_curvature: f64,
}

impl Default for RenderOptions {
	fn default() -> Self {
		Self {
			width: DEFAULT_WIDTH,
			height: DEFAULT_HEIGHT,
			center_x: None,
			center_y: None,
			theme: Theme::Light,
			show_labels: true,
			enable_animation: true,
			node_size: NodeSize::Medium,
			link_strength: DEFAULT_LINK_STRENGTH,
			charge_strength: DEFAULT_CHARGE_STRENGTH,
			expand_on_double_click: true,
			link_curvature: 0.0,
		}
	}
}

impl RenderOptions {
	/// Options for a surface of the given size.
	pub fn sized(width: f64, height: f64) -> Self {
		Self {
			width,
			height,
			..Self::default()
		}
	}

	/// Replace out-of-range numbers with their defaults.
	///
	/// Width and height are left alone; the surface check rejects them.
	pub fn normalized(mut self) -> Self {
		if !self.link_strength.is_finite() || !(0.0..=1.0).contains(&self.link_strength) {
			log::warn!("link strength {} out of range, using default", self.link_strength);
			self.link_strength = DEFAULT_LINK_STRENGTH;
		}
		if !self.charge_strength.is_finite() {
			log::warn!("charge strength is not finite, using default");
			self.charge_strength = DEFAULT_CHARGE_STRENGTH;
		}
		if !self.link_curvature.is_finite() {
			log::warn!("link curvature is not finite, drawing straight links");
			self.link_curvature = 0.0;
		}
		self.center_x = self.center_x.filter(|c| c.is_finite());
		self.center_y = self.center_y.filter(|c| c.is_finite());
		self
	}

	/// Effective centering target.
	pub fn center(&self) -> (f64, f64) {
		(
			self.center_x.unwrap_or(self.width / 2.0),
			self.center_y.unwrap_or(self.height / 2.0),
		)
	}

	/// Transition length in milliseconds for enter/exit.
	pub fn transition_ms(&self) -> f64 {
		if self.enable_animation { 300.0 } else { 0.0 }
	}

	/// Radius of a domain node under these options.
	pub fn node_radius(&self, node: &DomainNode) -> f64 {
		node_radius(self.node_size, node)
	}
}

/// `base(size) * multiplier(class) * (1 + (importance - 5) * 0.1)`.
///
/// Layout, hit testing and painting all go through this function.
pub fn node_radius(size: NodeSize, node: &DomainNode) -> f64 {
	let importance = if node.importance.is_finite() {
		node.importance
	} else {
		5.0
	};
	let radius = size.base_radius() * node.size.multiplier() * (1.0 + (importance - 5.0) * 0.1);
	radius.max(2.0)
}
