//! Position-based passes applied after each integration step.
//!
//! `force_graph` integrates charge and springs; these passes add what it does
//! not model: per-link rest length, collision, and centering.

/// One simulated node as seen by the passes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Body {
	/// Current x.
	pub x: f64,
	/// Current y.
	pub y: f64,
	/// Collision radius (without padding).
	pub radius: f64,
	/// Pinned position; pinned bodies never move.
	pub pin: Option<(f64, f64)>,
}

impl Body {
	fn is_free(&self) -> bool {
		self.pin.is_none()
	}
}

/// A link between two bodies with its rest length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spring {
	/// Source body index.
	pub source: usize,
	/// Target body index.
	pub target: usize,
	/// Rest length.
	pub rest: f64,
}

const EPSILON: f64 = 1e-6;

/// Unit vector for index `i`, used when two bodies coincide.
fn fallback_direction(i: usize) -> (f64, f64) {
	let angle = (i as f64 * 0.618_034 + 0.37) * std::f64::consts::TAU;
	(angle.cos(), angle.sin())
}

/// Split a correction between two bodies according to which are free.
fn shares(a: &Body, b: &Body) -> Option<(f64, f64)> {
	match (a.is_free(), b.is_free()) {
		(true, true) => Some((0.5, 0.5)),
		(true, false) => Some((1.0, 0.0)),
		(false, true) => Some((0.0, 1.0)),
		(false, false) => None,
	}
}

/// Pull or push linked bodies toward their rest length by `strength` (0–1).
pub fn apply_link_lengths(bodies: &mut [Body], springs: &[Spring], strength: f64) {
	if strength <= 0.0 {
		return;
	}
	for spring in springs {
		let (s, t) = (spring.source, spring.target);
		if s == t || s >= bodies.len() || t >= bodies.len() {
			continue;
		}
		let Some((share_s, share_t)) = shares(&bodies[s], &bodies[t]) else {
			continue;
		};
		let (dx, dy) = (bodies[t].x - bodies[s].x, bodies[t].y - bodies[s].y);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < EPSILON {
			continue;
		}
		let l = (dist - spring.rest) / dist * strength;
		let (cx, cy) = (dx * l, dy * l);
		bodies[s].x += cx * share_s;
		bodies[s].y += cy * share_s;
		bodies[t].x -= cx * share_t;
		bodies[t].y -= cy * share_t;
	}
}

/// Separate overlapping bodies so centers are at least `r_i + r_j + 2 * padding`
/// apart.
pub fn apply_collisions(bodies: &mut [Body], padding: f64) {
	let n = bodies.len();
	for i in 0..n {
		for j in (i + 1)..n {
			let Some((share_i, share_j)) = shares(&bodies[i], &bodies[j]) else {
				continue;
			};
			let min = bodies[i].radius + bodies[j].radius + 2.0 * padding;
			let (dx, dy) = (bodies[j].x - bodies[i].x, bodies[j].y - bodies[i].y);
			let dist = (dx * dx + dy * dy).sqrt();
			if dist >= min {
				continue;
			}
			let (ux, uy) = if dist < EPSILON {
				fallback_direction(i * 31 + j)
			} else {
				(dx / dist, dy / dist)
			};
			let overlap = min - dist;
			let (px, py) = (ux * overlap, uy * overlap);
			bodies[i].x -= px * share_i;
			bodies[i].y -= py * share_i;
			bodies[j].x += px * share_j;
			bodies[j].y += py * share_j;
		}
	}
}

/// Shift free bodies so their centroid moves toward `center` by `strength`.
pub fn apply_centering(bodies: &mut [Body], center: (f64, f64), strength: f64) {
	let (mut sx, mut sy, mut count) = (0.0, 0.0, 0usize);
	for body in bodies.iter().filter(|b| b.is_free()) {
		sx += body.x;
		sy += body.y;
		count += 1;
	}
	if count == 0 {
		return;
	}
	let (shift_x, shift_y) = (
		(center.0 - sx / count as f64) * strength,
		(center.1 - sy / count as f64) * strength,
	);
	for body in bodies.iter_mut().filter(|b| b.is_free()) {
		body.x += shift_x;
		body.y += shift_y;
	}
}

/// Spread coincident positions on a golden-angle spiral around the shared
/// point. The first body at each point stays put.
pub fn spread_coincident(bodies: &mut [Body]) {
	let mut seen: Vec<((i64, i64), usize)> = Vec::new();
	for body in bodies.iter_mut() {
		let key = ((body.x * 1e3).round() as i64, (body.y * 1e3).round() as i64);
		match seen.iter_mut().find(|(k, _)| *k == key) {
			Some((_, count)) => {
				*count += 1;
				let k = *count as f64;
				let angle = k * std::f64::consts::PI * (3.0 - 5f64.sqrt());
				let radius = 10.0 * k.sqrt();
				body.x += radius * angle.cos();
				body.y += radius * angle.sin();
			}
			None => seen.push((key, 0)),
		}
	}
}
