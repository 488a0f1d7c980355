//! Force-directed rendering of mind maps and structural models.
//!
//! [`GraphState`] owns the whole pipeline (model, layout, viewport, scene,
//! interaction, animation) and is free of browser types; [`ForceGraphCanvas`]
//! mounts it on a canvas and drives it from `requestAnimationFrame`.

mod animation;
mod component;
mod error;
mod events;
mod forces;
mod interaction;
mod layout;
mod model;
mod options;
mod pipeline;
mod render;
mod state;
mod svg;
mod theme;
mod types;
mod viewport;

pub use animation::Completion;
pub use component::{ForceGraphCanvas, GraphController};
pub use error::GraphError;
pub use events::{BackgroundEvent, Callbacks, LinkEvent, NodeEvent, SubscriptionId, Subscribers};
pub use options::{NodeSize, RenderOptions};
pub use state::GraphState;
pub use theme::{Palette, Theme};
pub use types::{
	Category, DomainGraph, DomainNode, LearningPath, NodePatch, Point, RelationKind, Relationship,
	SearchHit, SizeClass,
};
pub use viewport::Transform;
