//! A named-event bus.

use crate::{
	error::HandlerError,
	subscribers::{SubscriberId, Subscribers, Subscription},
};
use core::{
	cell::RefCell,
	fmt::{self, Debug, Formatter},
};
use hashbrown::HashMap;
use std::rc::Rc;
use tracing::{error, instrument, trace};

type Handler<T> = dyn Fn(&T) -> Result<(), HandlerError>;

/// Delivers data of type `T` to the handlers registered under an event name.
pub struct EventBus<T> {
	events: Rc<RefCell<HashMap<String, Subscribers<Handler<T>>>>>,
}

impl<T> Default for EventBus<T> {
	fn default() -> Self {
		Self { events: Rc::default() }
	}
}

impl<T: 'static> EventBus<T> {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `handler` for `event`.
	pub fn on(&self, event: impl Into<String>, handler: impl 'static + Fn(&T) -> Result<(), HandlerError>) -> Subscription {
		let event = event.into();
		let id = self.events.borrow_mut().entry(event.clone()).or_default().insert(Rc::new(handler));
		trace!(event = event.as_str(), ?id, "Registered event handler.");

		let events = Rc::downgrade(&self.events);
		Subscription::new(id, move |id| events.upgrade().map_or(false, |events| remove(&events, &event, id)))
	}

	/// Removes the handler `id` from `event`. Returns whether it was registered.
	#[allow(clippy::must_use_candidate)]
	pub fn off(&self, event: &str, id: SubscriberId) -> bool {
		remove(&self.events, event, id)
	}

	/// Calls every handler registered for `event` with `data`, in registration order.
	///
	/// A handler returning an error is logged and doesn't prevent the remaining ones from running.
	/// Returns the number of handlers that failed.
	#[instrument(skip(self, data))]
	pub fn emit(&self, event: &str, data: &T) -> usize {
		let handlers = match self.events.borrow().get(event) {
			Some(subscribers) => subscribers.snapshot(),
			None => return 0,
		};

		let mut failures = 0;
		for handler in handlers {
			if let Err(error) = handler(data) {
				error!("Error in event handler for {}: {}", event, error);
				failures += 1;
			}
		}
		failures
	}

	#[must_use]
	pub fn handler_count(&self, event: &str) -> usize {
		self.events.borrow().get(event).map_or(0, Subscribers::len)
	}

	/// Removes all handlers for all events.
	pub fn clear(&self) {
		let mut events = self.events.borrow_mut();
		for subscribers in events.values_mut() {
			subscribers.clear();
		}
		events.clear();
	}
}

fn remove<T>(events: &RefCell<HashMap<String, Subscribers<Handler<T>>>>, event: &str, id: SubscriberId) -> bool {
	let mut events = events.borrow_mut();
	let removed = events.get_mut(event).map_or(false, |subscribers| subscribers.remove(id));
	if events.get(event).map_or(false, |subscribers| subscribers.len() == 0) {
		events.remove(event);
	}
	removed
}

impl<T> Debug for EventBus<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let events = self.events.borrow();
		f.debug_map().entries(events.iter().map(|(event, subscribers)| (event, subscribers.len()))).finish()
	}
}
