//! Named palettes and the category/relation color tables.

use serde::{Deserialize, Serialize};

use super::types::{Category, DomainNode, RelationKind};

/// Emphasis color used by path playback.
pub const EMPHASIS: &str = "#F59E0B";
/// Travelling particle fill.
pub const PARTICLE: &str = "#3B82F6";

/// Selectable theme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Theme {
	/// White background.
	#[default]
	Light,
	/// Slate background.
	Dark,
	/// Light background, nodes keep their own color.
	Colorful,
}

impl Theme {
	/// All themes, in menu order.
	pub const ALL: [Theme; 3] = [Theme::Light, Theme::Dark, Theme::Colorful];

	/// Parse a theme name, falling back to [`Theme::Light`].
	pub fn from_name(name: &str) -> Self {
		match name.trim().to_ascii_lowercase().as_str() {
			"dark" => Theme::Dark,
			"colorful" | "colourful" => Theme::Colorful,
			"light" => Theme::Light,
			other => {
				log::warn!("unknown theme {other:?}, using light");
				Theme::Light
			}
		}
	}

	/// Lowercase name.
	pub fn name(self) -> &'static str {
		match self {
			Theme::Light => "light",
			Theme::Dark => "dark",
			Theme::Colorful => "colorful",
		}
	}

	/// Palette for this theme.
	pub fn palette(self) -> &'static Palette {
		match self {
			Theme::Light => &LIGHT,
			Theme::Dark => &DARK,
			Theme::Colorful => &COLORFUL,
		}
	}
}

impl From<String> for Theme {
	fn from(value: String) -> Self {
		Theme::from_name(&value)
	}
}

impl From<Theme> for String {
	fn from(value: Theme) -> Self {
		value.name().to_string()
	}
}

/// Semantic role → color mapping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
	/// Canvas background.
	pub background: &'static str,
	/// Default node outline.
	pub node_stroke: &'static str,
	/// Fill for categories without a color.
	pub node_fill: &'static str,
	/// Icon and label text.
	pub node_text: &'static str,
	/// Default link stroke.
	pub link_stroke: &'static str,
	/// Link label text.
	pub link_text: &'static str,
	/// Outline of a selected node.
	pub selected_stroke: &'static str,
	/// Outline of a hovered node and its links.
	pub hovered_stroke: &'static str,
	/// Whether category fills use the dimmer shade.
	dim_categories: bool,
	/// Whether a node's own color wins over its category.
	own_colors: bool,
}

static LIGHT: Palette = Palette {
	background: "#ffffff",
	node_stroke: "#e5e7eb",
	node_fill: "#f9fafb",
	node_text: "#374151",
	link_stroke: "#d1d5db",
	link_text: "#6b7280",
	selected_stroke: "#3b82f6",
	hovered_stroke: "#10b981",
	dim_categories: false,
	own_colors: false,
};

static DARK: Palette = Palette {
	background: "#1f2937",
	node_stroke: "#4b5563",
	node_fill: "#374151",
	node_text: "#f9fafb",
	link_stroke: "#6b7280",
	link_text: "#9ca3af",
	selected_stroke: "#60a5fa",
	hovered_stroke: "#34d399",
	dim_categories: true,
	own_colors: false,
};

static COLORFUL: Palette = Palette {
	background: "#fefefe",
	node_stroke: "#e5e7eb",
	node_fill: "#ffffff",
	node_text: "#1f2937",
	link_stroke: "#d1d5db",
	link_text: "#6b7280",
	selected_stroke: "#3b82f6",
	hovered_stroke: "#10b981",
	dim_categories: false,
	own_colors: true,
};

/// Fill for a category: `(light shade, dark shade)`. `None` means "use the
/// palette fill".
fn category_shades(category: Category) -> Option<(&'static str, &'static str)> {
	use Category::*;
	let shades = match category {
		Core | CoreConstruct => ("#3b82f6", "#60a5fa"),
		Concept | Motivation => ("#8b5cf6", "#a78bfa"),
		Application | Outcome => ("#ef4444", "#f87171"),
		Research | Mediator => ("#10b981", "#34d399"),
		Method | SituationalCue => ("#06b6d4", "#22d3ee"),
		Theory | FinalOutcome => ("#f59e0b", "#fbbf24"),
		Example => ("#9ca3af", "#d1d5db"),
		IndependentVariable => ("#6366f1", "#818cf8"),
		DependentVariable => ("#ec4899", "#f472b6"),
		ContextGroup | OutcomeGroup => ("#64748b", "#94a3b8"),
		Other => return None,
	};
	Some(shades)
}

impl Palette {
	/// Fill color of a domain node under this palette.
	pub fn node_color(&self, node: &DomainNode) -> String {
		if self.own_colors {
			if let Some(color) = node.color.as_deref().filter(|c| !c.is_empty()) {
				return color.to_string();
			}
		}
		match category_shades(node.category) {
			Some((_, dark)) if self.dim_categories => dark.to_string(),
			Some((light, _)) => light.to_string(),
			None => self.node_fill.to_string(),
		}
	}

	/// Stroke color of a link under this palette.
	pub fn link_color(&self, kind: RelationKind) -> &'static str {
		match kind {
			RelationKind::Activation => "#3B82F6",
			RelationKind::DirectEffect | RelationKind::PositiveEffect => "#10B981",
			RelationKind::Mediation | RelationKind::MarginalEffect => "#F59E0B",
			RelationKind::Moderation | RelationKind::NegativeEffect => "#EF4444",
			RelationKind::Feedback => "#8B5CF6",
			RelationKind::NonSignificant => "#9CA3AF",
			_ => self.link_stroke,
		}
	}
}

/// Glyph drawn inside a node.
pub fn category_icon(category: Category) -> &'static str {
	use Category::*;
	match category {
		Core | CoreConstruct => "●",
		Concept | Motivation => "◆",
		Application | Outcome | FinalOutcome => "▲",
		Research | Mediator => "■",
		Method | SituationalCue => "◇",
		Theory => "○",
		Example => "◯",
		_ => "●",
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unknown_theme_names_fall_back_to_light() {
		assert_eq!(Theme::from_name("Dark"), Theme::Dark);
		assert_eq!(Theme::from_name("neon"), Theme::Light);
		let parsed: Theme = serde_json::from_str("\"colorful\"").unwrap();
		assert_eq!(parsed, Theme::Colorful);
		let parsed: Theme = serde_json::from_str("\"sepia\"").unwrap();
		assert_eq!(parsed, Theme::Light);
	}

	#[test]
	fn colorful_prefers_own_color() {
		let mut node = DomainNode::new("n", "N").with_category(Category::Theory);
		node.color = Some("#123456".into());
		assert_eq!(Theme::Colorful.palette().node_color(&node), "#123456");
		assert_eq!(Theme::Light.palette().node_color(&node), "#f59e0b");
		assert_eq!(Theme::Dark.palette().node_color(&node), "#fbbf24");
	}

	#[test]
	fn other_category_uses_palette_fill() {
		let node = DomainNode::new("n", "N").with_category(Category::Other);
		assert_eq!(Theme::Dark.palette().node_color(&node), "#374151");
		assert_eq!(category_icon(Category::Other), "●");
	}

	#[test]
	fn structural_kinds_keep_fixed_link_colors() {
		let dark = Theme::Dark.palette();
		assert_eq!(dark.link_color(RelationKind::Moderation), "#EF4444");
		assert_eq!(dark.link_color(RelationKind::ParentChild), "#6b7280");
	}
}
