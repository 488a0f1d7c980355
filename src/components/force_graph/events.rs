//! Subscribe/notify lists for renderer events.

use super::types::{Category, RelationKind};

/// Handle returned by [`Subscribers::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// An ordered list of listeners for one event type.
pub struct Subscribers<T> {
	next: u64,
	listeners: Vec<(SubscriptionId, Box<dyn FnMut(&T)>)>,
}

impl<T> Default for Subscribers<T> {
	fn default() -> Self {
		Self {
			next: 0,
			listeners: Vec::new(),
		}
	}
}

impl<T> Subscribers<T> {
	/// Register a listener.
	pub fn subscribe(&mut self, listener: impl FnMut(&T) + 'static) -> SubscriptionId {
		let id = SubscriptionId(self.next);
		self.next += 1;
		self.listeners.push((id, Box::new(listener)));
		id
	}

	/// Remove a listener. Returns whether it was registered.
	pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
		let before = self.listeners.len();
		self.listeners.retain(|(sid, _)| *sid != id);
		self.listeners.len() != before
	}

	/// Call every listener in registration order.
	pub fn notify(&mut self, event: &T) {
		for (_, listener) in &mut self.listeners {
			listener(event);
		}
	}

	/// Number of listeners.
	pub fn len(&self) -> usize {
		self.listeners.len()
	}

	/// Whether nobody listens.
	pub fn is_empty(&self) -> bool {
		self.listeners.is_empty()
	}

	/// Drop every listener.
	pub fn clear(&mut self) {
		self.listeners.clear();
	}
}

/// Payload describing a node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeEvent {
	/// Node id.
	pub id: String,
	/// Node label.
	pub label: String,
	/// Node category.
	pub category: Category,
	/// Description text.
	pub description: String,
	/// Structural-model path number, if any.
	pub path_number: Option<String>,
	/// World x at the time of the event.
	pub x: f64,
	/// World y at the time of the event.
	pub y: f64,
}

/// Payload describing a link.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkEvent {
	/// Relationship id.
	pub id: String,
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
	/// Relationship kind.
	pub kind: RelationKind,
	/// Relationship strength.
	pub strength: f64,
}

/// Payload of a background click, in screen coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackgroundEvent {
	/// Screen x.
	pub x: f64,
	/// Screen y.
	pub y: f64,
}

/// Every event list the renderer emits on.
#[derive(Default)]
pub struct Callbacks {
	/// Single click on a node.
	pub node_click: Subscribers<NodeEvent>,
	/// Double click on a node.
	pub node_double_click: Subscribers<NodeEvent>,
	/// Hover enter (`Some`) and leave (`None`).
	pub node_hover: Subscribers<Option<NodeEvent>>,
	/// Click on a link.
	pub link_click: Subscribers<LinkEvent>,
	/// Click on empty canvas.
	pub background_click: Subscribers<BackgroundEvent>,
}

impl Callbacks {
	/// Drop every listener of every list.
	pub fn clear(&mut self) {
		self.node_click.clear();
		self.node_double_click.clear();
		self.node_hover.clear();
		self.link_click.clear();
		self.background_click.clear();
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use super::*;

	#[test]
	fn unsubscribe_stops_delivery() {
		let seen = Rc::new(RefCell::new(Vec::new()));
		let mut subs = Subscribers::<u32>::default();
		let a = {
			let seen = seen.clone();
			subs.subscribe(move |v| seen.borrow_mut().push(("a", *v)))
		};
		{
			let seen = seen.clone();
			subs.subscribe(move |v| seen.borrow_mut().push(("b", *v)));
		}
		subs.notify(&1);
		assert!(subs.unsubscribe(a));
		assert!(!subs.unsubscribe(a));
		subs.notify(&2);
		assert_eq!(*seen.borrow(), vec![("a", 1), ("b", 1), ("b", 2)]);
	}
}
