//! Timed highlight animations: path sequences, the travelling particle,
//! pulses and link swells.
//!
//! Nothing here schedules timers. Every timeline stores its start time and
//! is evaluated by [`Animator::advance`] from the frame clock, so cancelling
//! an animation is dropping its state.

use super::interaction::{Highlights, LinkEmphasis, NodeEmphasis};
use super::theme::EMPHASIS;

/// Completion callback of a sequence or particle.
pub type Completion = Box<dyn FnOnce()>;

/// How long the particle's target stays lit after arrival.
pub const PARTICLE_HOLD_MS: f64 = 1000.0;
/// Outline width of an emphasised node.
const NODE_EMPHASIS_WIDTH: f64 = 5.0;
const PULSE_SCALE: f64 = 0.3;

/// Width of a link while emphasised by a path animation.
pub fn emphasis_width(strength: f64) -> f64 {
	(strength * 6.0).max(4.0)
}

/// Width of a link lit by [`Animator::highlight_link`].
pub fn highlight_width(strength: f64) -> f64 {
	(strength * 5.0).max(3.0)
}

/// One resolved link of a path animation.
#[derive(Clone, Debug, PartialEq)]
pub struct PathStep {
	/// Link id.
	pub link: String,
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
	/// Relationship strength.
	pub strength: f64,
}

struct Sequence {
	/// `None` for ids that did not resolve; they still take their hold.
	steps: Vec<Option<PathStep>>,
	hold: f64,
	start: f64,
	done: bool,
	on_complete: Option<Completion>,
}

impl Sequence {
	fn shown(&self, now: f64) -> usize {
		if self.hold <= 0.0 {
			return self.steps.len();
		}
		let elapsed = (now - self.start).max(0.0);
		((elapsed / self.hold).floor() as usize + 1).min(self.steps.len())
	}

	fn finished(&self, now: f64) -> bool {
		now - self.start >= self.hold * self.steps.len() as f64
	}
}

struct Particle {
	step: PathStep,
	start: f64,
	travel: f64,
	on_complete: Option<Completion>,
}

struct Pulse {
	node: String,
	start: f64,
	duration: f64,
}

struct Swell {
	link: String,
	base: f64,
	peak: f64,
	start: f64,
	duration: f64,
}

/// 0 → 1 → 0 over `[start, start + duration]`.
fn triangle(now: f64, start: f64, duration: f64) -> f64 {
	if duration <= 0.0 {
		return 0.0;
	}
	let t = ((now - start) / duration).clamp(0.0, 1.0);
	1.0 - (2.0 * t - 1.0).abs()
}

/// Owns every running highlight animation.
pub struct Animator {
	speed: f64,
	sequence: Option<Sequence>,
	particle: Option<Particle>,
	pulses: Vec<Pulse>,
	swells: Vec<Swell>,
	manual: Highlights,
	overlay: Highlights,
	marker: Option<(f64, f64)>,
}

impl Default for Animator {
	fn default() -> Self {
		Self {
			speed: 1.0,
			sequence: None,
			particle: None,
			pulses: Vec::new(),
			swells: Vec::new(),
			manual: Highlights::default(),
			overlay: Highlights::default(),
			marker: None,
		}
	}
}

impl Animator {
	/// Playback speed multiplier.
	pub fn speed(&self) -> f64 {
		self.speed
	}

	/// Change playback speed for animations started afterwards.
	pub fn set_speed(&mut self, speed: f64) {
		if speed.is_finite() && speed > 0.0 {
			self.speed = speed;
		} else {
			log::warn!("ignoring animation speed {speed}");
		}
	}

	/// Overrides to draw this frame.
	pub fn overlay(&self) -> &Highlights {
		&self.overlay
	}

	/// Particle position in world space, while it travels.
	pub fn marker(&self) -> Option<(f64, f64)> {
		self.marker
	}

	/// Whether any timeline is still running.
	pub fn is_active(&self) -> bool {
		self.sequence.as_ref().is_some_and(|s| !s.done)
			|| self.particle.is_some()
			|| !self.pulses.is_empty()
			|| !self.swells.is_empty()
	}

	fn cancel_playback(&mut self) {
		if self.sequence.take().is_some_and(|s| !s.done) {
			log::debug!("path sequence cancelled");
		}
		if self.particle.take().is_some() {
			log::debug!("path particle cancelled");
		}
		self.marker = None;
	}

	/// Light `steps` one after another, each held for `step_ms / speed`.
	pub fn play_sequence(
		&mut self,
		steps: Vec<Option<PathStep>>,
		step_ms: f64,
		on_complete: Option<Completion>,
		now: f64,
	) {
		self.cancel_playback();
		self.sequence = Some(Sequence {
			steps,
			hold: (step_ms / self.speed).max(0.0),
			start: now,
			done: false,
			on_complete,
		});
	}

	/// Move a marker along `step` over `duration_ms / speed`, then hold.
	pub fn play_particle(
		&mut self,
		step: PathStep,
		duration_ms: f64,
		on_complete: Option<Completion>,
		now: f64,
	) {
		self.cancel_playback();
		self.particle = Some(Particle {
			step,
			start: now,
			travel: (duration_ms / self.speed).max(0.0),
			on_complete,
		});
	}

	/// Grow and shrink a node once.
	pub fn pulse(&mut self, node: impl Into<String>, duration_ms: f64, now: f64) {
		let node = node.into();
		self.pulses.retain(|p| p.node != node);
		self.pulses.push(Pulse {
			node,
			start: now,
			duration: (duration_ms / self.speed).max(0.0),
		});
	}

	/// Widen a link by `multiplier` and back.
	pub fn swell(
		&mut self,
		link: impl Into<String>,
		base_width: f64,
		multiplier: f64,
		duration_ms: f64,
		now: f64,
	) {
		let link = link.into();
		self.swells.retain(|s| s.link != link);
		self.swells.push(Swell {
			link,
			base: base_width,
			peak: (base_width * multiplier).max(2.0),
			start: now,
			duration: (duration_ms / self.speed).max(0.0),
		});
	}

	/// Persistently light or unlight a node.
	pub fn highlight_node(&mut self, id: &str, on: bool) {
		if on {
			self.manual.emphasize_node(
				id,
				NodeEmphasis {
					width: Some(NODE_EMPHASIS_WIDTH),
					..NodeEmphasis::default()
				},
			);
		} else {
			self.manual.clear_node(id);
		}
	}

	/// Persistently light or unlight a link.
	pub fn highlight_link(&mut self, id: &str, strength: f64, on: bool) {
		if on {
			self.manual.emphasize_link(
				id,
				LinkEmphasis {
					stroke: None,
					width: Some(highlight_width(strength)),
				},
			);
		} else {
			self.manual.clear_link(id);
		}
	}

	/// Cancel everything and drop every override. Pending completions are
	/// dropped without running.
	pub fn reset(&mut self) {
		self.cancel_playback();
		self.pulses.clear();
		self.swells.clear();
		self.manual.clear();
		self.overlay.clear();
	}

	/// Evaluate every timeline at `now`. `position` resolves node ids to
	/// world positions. Returns completions that became due.
	pub fn advance(
		&mut self,
		now: f64,
		position: impl Fn(&str) -> Option<(f64, f64)>,
	) -> Vec<Completion> {
		let mut due = Vec::new();
		let mut overlay = self.manual.clone();

		if let Some(sequence) = &mut self.sequence {
			for step in sequence.steps[..sequence.shown(now)].iter().flatten() {
				emphasize_step(&mut overlay, step, true);
			}
			if !sequence.done && sequence.finished(now) {
				sequence.done = true;
				due.extend(sequence.on_complete.take());
			}
		}

		self.marker = None;
		if let Some(particle) = &self.particle {
			let elapsed = now - particle.start;
			if elapsed >= particle.travel + PARTICLE_HOLD_MS {
				if let Some(particle) = self.particle.take() {
					due.extend(particle.on_complete);
				}
			} else {
				let arrived = elapsed >= particle.travel;
				emphasize_step(&mut overlay, &particle.step, arrived);
				if !arrived {
					let t = (elapsed / particle.travel).clamp(0.0, 1.0);
					if let (Some(a), Some(b)) =
						(position(&particle.step.source), position(&particle.step.target))
					{
						self.marker = Some((a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t));
					}
				}
			}
		}

		self.pulses.retain(|p| now - p.start < p.duration);
		for pulse in &self.pulses {
			let wave = triangle(now, pulse.start, pulse.duration);
			overlay.emphasize_node(
				pulse.node.clone(),
				NodeEmphasis {
					stroke: None,
					width: Some(3.0 + 2.0 * wave),
					scale: 1.0 + PULSE_SCALE * wave,
				},
			);
		}

		self.swells.retain(|s| now - s.start < s.duration);
		for swell in &self.swells {
			let wave = triangle(now, swell.start, swell.duration);
			overlay.emphasize_link(
				swell.link.clone(),
				LinkEmphasis {
					stroke: None,
					width: Some(swell.base + (swell.peak - swell.base) * wave),
				},
			);
		}

		self.overlay = overlay;
		due
	}
}

/// Light a step's link and source; the target too once reached.
fn emphasize_step(overlay: &mut Highlights, step: &PathStep, with_target: bool) {
	overlay.emphasize_link(
		step.link.clone(),
		LinkEmphasis {
			stroke: Some(EMPHASIS.to_string()),
			width: Some(emphasis_width(step.strength)),
		},
	);
	let lit = NodeEmphasis::stroked(EMPHASIS, NODE_EMPHASIS_WIDTH);
	overlay.emphasize_node(step.source.clone(), lit.clone());
	if with_target {
		overlay.emphasize_node(step.target.clone(), lit);
	}
}
