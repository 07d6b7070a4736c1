use core::{
	cell::RefCell,
	fmt::{self, Debug, Formatter},
};
use std::rc::{Rc, Weak};

/// Identifies one registration with a [`Store`](`crate::store::Store`), [`Router`](`crate::router::Router`) or
/// [`EventBus`](`crate::events::EventBus`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

/// Subscribers in registration order.
pub(crate) struct Subscribers<F: ?Sized> {
	next_id: u64,
	entries: Vec<(SubscriberId, Rc<F>)>,
}

impl<F: ?Sized> Default for Subscribers<F> {
	fn default() -> Self {
		Self {
			next_id: 0,
			entries: Vec::new(),
		}
	}
}

impl<F: ?Sized> Subscribers<F> {
	pub(crate) fn insert(&mut self, handler: Rc<F>) -> SubscriberId {
		let id = SubscriberId(self.next_id);
		self.next_id += 1;
		self.entries.push((id, handler));
		id
	}

	pub(crate) fn remove(&mut self, id: SubscriberId) -> bool {
		let len = self.entries.len();
		self.entries.retain(|(i, _)| *i != id);
		self.entries.len() != len
	}

	/// The current handlers. Calling them after releasing the borrow on `self` lets them (un)subscribe re-entrantly.
	pub(crate) fn snapshot(&self) -> Vec<Rc<F>> {
		self.entries.iter().map(|(_, handler)| handler.clone()).collect()
	}

	pub(crate) fn len(&self) -> usize {
		self.entries.len()
	}

	pub(crate) fn clear(&mut self) {
		self.entries.clear();
	}
}

/// Returned when subscribing. Call [`Subscription::unsubscribe`] to remove the handler again.
///
/// Dropping a [`Subscription`] does **not** unsubscribe.
pub struct Subscription {
	id: SubscriberId,
	unsubscribe: Box<dyn FnOnce(SubscriberId) -> bool>,
}

impl Subscription {
	pub(crate) fn new(id: SubscriberId, unsubscribe: impl 'static + FnOnce(SubscriberId) -> bool) -> Self {
		Self {
			id,
			unsubscribe: Box::new(unsubscribe),
		}
	}

	/// A [`Subscription`] for a handler in `subscribers`.
	pub(crate) fn in_registry<F: ?Sized + 'static>(id: SubscriberId, subscribers: &Rc<RefCell<Subscribers<F>>>) -> Self {
		let subscribers: Weak<RefCell<Subscribers<F>>> = Rc::downgrade(subscribers);
		Self::new(id, move |id| subscribers.upgrade().map_or(false, |subscribers| subscribers.borrow_mut().remove(id)))
	}

	#[must_use]
	pub fn id(&self) -> SubscriberId {
		self.id
	}

	/// Removes the handler. Returns `false` if it was already removed or its source was dropped.
	#[allow(clippy::must_use_candidate)]
	pub fn unsubscribe(self) -> bool {
		(self.unsubscribe)(self.id)
	}
}

impl Debug for Subscription {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscription").field("id", &self.id).finish_non_exhaustive()
	}
}
