use thiserror::Error;

/// Errors surfaced by the graph renderer.
///
/// Data problems (dangling ids, unknown focus) are never errors; they degrade
/// to the resolvable subgraph.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphError {
	/// The drawing surface has unusable dimensions.
	#[error("invalid drawing surface {width}x{height}")]
	InvalidSurface {
		/// Requested width.
		width: f64,
		/// Requested height.
		height: f64,
	},
	/// The canvas did not hand out a 2d context.
	#[error("canvas has no 2d rendering context")]
	MissingContext,
	/// An operation was called after `destroy`.
	#[error("graph renderer already destroyed")]
	Destroyed,
}
