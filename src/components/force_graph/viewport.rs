//! Zoom/pan state. Every change goes through [`Viewport::apply_transform`].

use super::events::{SubscriptionId, Subscribers};

/// Lower scale bound.
pub const MIN_SCALE: f64 = 0.1;
/// Upper scale bound.
pub const MAX_SCALE: f64 = 3.0;
/// Scale used by [`Viewport::focus_on`].
pub const FOCUS_SCALE: f64 = 1.5;

/// `screen = world * k + (x, y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
	/// Horizontal translation.
	pub x: f64,
	/// Vertical translation.
	pub y: f64,
	/// Scale factor.
	pub k: f64,
}

impl Default for Transform {
	fn default() -> Self {
		Self::IDENTITY
	}
}

impl Transform {
	/// No pan, no zoom.
	pub const IDENTITY: Transform = Transform {
		x: 0.0,
		y: 0.0,
		k: 1.0,
	};

	/// Build a transform.
	pub const fn new(x: f64, y: f64, k: f64) -> Self {
		Self { x, y, k }
	}

	/// Map a world point to screen space.
	pub fn apply(&self, wx: f64, wy: f64) -> (f64, f64) {
		(wx * self.k + self.x, wy * self.k + self.y)
	}

	/// Map a screen point to world space.
	pub fn invert(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	fn lerp(&self, to: &Transform, t: f64) -> Transform {
		Transform {
			x: self.x + (to.x - self.x) * t,
			y: self.y + (to.y - self.y) * t,
			k: self.k + (to.k - self.k) * t,
		}
	}
}

fn ease_in_out_cubic(t: f64) -> f64 {
	if t < 0.5 {
		4.0 * t * t * t
	} else {
		1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
	}
}

#[derive(Clone, Debug)]
struct Tween {
	from: Transform,
	to: Transform,
	start: f64,
	duration: f64,
}

/// Pan/zoom controller for one drawing surface.
pub struct Viewport {
	width: f64,
	height: f64,
	transform: Transform,
	tween: Option<Tween>,
	clock: f64,
	observers: Subscribers<Transform>,
}

impl Viewport {
	/// Identity viewport over a `width × height` surface.
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			width,
			height,
			transform: Transform::IDENTITY,
			tween: None,
			clock: 0.0,
			observers: Subscribers::default(),
		}
	}

	/// Current transform.
	pub fn transform(&self) -> Transform {
		self.transform
	}

	/// Surface size.
	pub fn size(&self) -> (f64, f64) {
		(self.width, self.height)
	}

	/// Whether an animated change is in flight.
	pub fn is_animating(&self) -> bool {
		self.tween.is_some()
	}

	/// Register a transform observer.
	pub fn subscribe(&mut self, listener: impl FnMut(&Transform) + 'static) -> SubscriptionId {
		self.observers.subscribe(listener)
	}

	/// Remove a transform observer.
	pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
		self.observers.unsubscribe(id)
	}

	/// Drop every observer and any running tween.
	pub fn clear(&mut self) {
		self.observers.clear();
		self.tween = None;
	}

	/// The single write path: clamp, store, notify.
	pub fn apply_transform(&mut self, t: Transform) {
		if !(t.x.is_finite() && t.y.is_finite() && t.k.is_finite()) {
			log::warn!("ignoring non-finite transform {t:?}");
			return;
		}
		let clamped = Transform {
			k: t.k.clamp(MIN_SCALE, MAX_SCALE),
			..t
		};
		if clamped == self.transform {
			return;
		}
		self.transform = clamped;
		self.observers.notify(&clamped);
	}

	/// Jump or animate to `t`. A zero duration applies immediately.
	pub fn set_transform(&mut self, t: Transform, duration_ms: f64) {
		self.tween = None;
		if duration_ms <= 0.0 || !duration_ms.is_finite() {
			self.apply_transform(t);
			return;
		}
		self.tween = Some(Tween {
			from: self.transform,
			to: Transform {
				k: t.k.clamp(MIN_SCALE, MAX_SCALE),
				..t
			},
			start: self.clock,
			duration: duration_ms,
		});
	}

	/// Center world point `(x, y)` at [`FOCUS_SCALE`].
	pub fn focus_on(&mut self, x: f64, y: f64, duration_ms: f64) {
		let k = FOCUS_SCALE;
		let target = Transform::new(self.width / 2.0 - k * x, self.height / 2.0 - k * y, k);
		self.set_transform(target, duration_ms);
	}

	/// Back to identity.
	pub fn reset(&mut self, duration_ms: f64) {
		self.set_transform(Transform::IDENTITY, duration_ms);
	}

	/// Scale by `factor` about the surface center.
	pub fn zoom_by(&mut self, factor: f64, duration_ms: f64) {
		if !(factor.is_finite() && factor > 0.0) {
			return;
		}
		let base = self.tween.as_ref().map(|t| t.to).unwrap_or(self.transform);
		let target = zoom_about(base, self.width / 2.0, self.height / 2.0, factor);
		self.set_transform(target, duration_ms);
	}

	/// Scale by `factor` about a screen point, immediately (wheel gestures).
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		if !(factor.is_finite() && factor > 0.0) {
			return;
		}
		self.tween = None;
		let target = zoom_about(self.transform, sx, sy, factor);
		self.apply_transform(target);
	}

	/// Set the translation, keeping the scale (pan gestures).
	pub fn pan_to(&mut self, x: f64, y: f64) {
		self.tween = None;
		let k = self.transform.k;
		self.apply_transform(Transform::new(x, y, k));
	}

	/// Map a screen point to world space.
	pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
		self.transform.invert(sx, sy)
	}

	/// Change the surface size. The transform is kept.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Advance the clock; steps any running tween. Returns whether the
	/// transform is animating.
	pub fn advance(&mut self, now: f64) -> bool {
		self.clock = now;
		let Some(tween) = self.tween.clone() else {
			return false;
		};
		let t = ((now - tween.start) / tween.duration).clamp(0.0, 1.0);
		let next = tween.from.lerp(&tween.to, ease_in_out_cubic(t));
		self.apply_transform(next);
		if t >= 1.0 {
			self.apply_transform(tween.to);
			self.tween = None;
		}
		true
	}
}

fn zoom_about(base: Transform, sx: f64, sy: f64, factor: f64) -> Transform {
	let k = (base.k * factor).clamp(MIN_SCALE, MAX_SCALE);
	let ratio = k / base.k;
	Transform {
		x: sx - (sx - base.x) * ratio,
		y: sy - (sy - base.y) * ratio,
		k,
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use proptest::prelude::*;

	use super::*;

	const EPS: f64 = 1e-9;

	#[test]
	fn focus_centers_the_point() {
		let mut vp = Viewport::new(800.0, 600.0);
		vp.focus_on(120.0, -40.0, 0.0);
		let t = vp.transform();
		assert_eq!(t.k, FOCUS_SCALE);
		let (sx, sy) = t.apply(120.0, -40.0);
		assert!((sx - 400.0).abs() < EPS && (sy - 300.0).abs() < EPS);
	}

	#[test]
	fn animated_focus_lands_after_duration() {
		let mut vp = Viewport::new(800.0, 600.0);
		vp.advance(1_000.0);
		vp.focus_on(50.0, 50.0, 750.0);
		assert_eq!(vp.transform(), Transform::IDENTITY);
		assert!(vp.advance(1_375.0));
		let mid = vp.transform();
		assert!(mid.k > 1.0 && mid.k < FOCUS_SCALE);
		vp.advance(1_750.0);
		assert!(!vp.is_animating());
		let (sx, sy) = vp.transform().apply(50.0, 50.0);
		assert!((sx - 400.0).abs() < EPS && (sy - 300.0).abs() < EPS);
	}

	#[test]
	fn observers_see_every_change_once() {
		let seen = Rc::new(RefCell::new(Vec::new()));
		let mut vp = Viewport::new(100.0, 100.0);
		let sink = seen.clone();
		vp.subscribe(move |t| sink.borrow_mut().push(t.k));
		vp.zoom_by(2.0, 0.0);
		vp.zoom_by(1.0, 0.0);
		vp.reset(0.0);
		assert_eq!(*seen.borrow(), vec![2.0, 1.0]);
	}

	#[test]
	fn zoom_at_keeps_pointer_fixed() {
		let mut vp = Viewport::new(800.0, 600.0);
		let before = vp.screen_to_world(200.0, 100.0);
		vp.zoom_at(200.0, 100.0, 1.1);
		let after = vp.screen_to_world(200.0, 100.0);
		assert!((before.0 - after.0).abs() < EPS && (before.1 - after.1).abs() < EPS);
	}

	#[test]
	fn bad_factors_are_ignored() {
		let mut vp = Viewport::new(800.0, 600.0);
		vp.zoom_by(f64::NAN, 0.0);
		vp.zoom_by(-2.0, 0.0);
		vp.zoom_at(0.0, 0.0, 0.0);
		assert_eq!(vp.transform(), Transform::IDENTITY);
	}

	proptest! {
		#[test]
		fn zoom_stays_within_scale_extent(factors in proptest::collection::vec(0.001f64..1000.0, 1..40)) {
			let mut vp = Viewport::new(800.0, 600.0);
			let mut now = 0.0;
			for (i, factor) in factors.iter().enumerate() {
				let duration = if i % 2 == 0 { 0.0 } else { 100.0 };
				vp.zoom_by(*factor, duration);
				now += 50.0;
				vp.advance(now);
				let k = vp.transform().k;
				prop_assert!((MIN_SCALE..=MAX_SCALE).contains(&k), "scale {} escaped", k);
			}
		}
	}
}
