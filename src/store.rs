//! A single-state publish/subscribe store.
//!
//! The state is replaced wholesale on every update: patches apply to a copy, which then becomes the current state
//! and is broadcast to all subscribers. Concurrent updates don't exist, so the last write wins.

use crate::subscribers::{Subscribers, Subscription};
use core::{
	cell::RefCell,
	fmt::{self, Debug, Formatter},
};
use std::rc::Rc;
use tracing::{instrument, trace, trace_span};

/// A partial update of a state `S`.
///
/// Implemented for closures, and meant to be implemented for "patch" structs that carry only the fields to overwrite.
pub trait Patch<S> {
	fn apply(self, state: &mut S);
}

impl<S, F: FnOnce(&mut S)> Patch<S> for F {
	fn apply(self, state: &mut S) {
		self(state);
	}
}

/// Something to [`Store::dispatch`].
pub enum Action<S> {
	/// Applied through [`Store::set_state`].
	Patch(Box<dyn FnOnce(&mut S)>),
	/// Called with the store, from which it can read the state and dispatch further actions.
	Thunk(Box<dyn FnOnce(&Store<S>)>),
}

impl<S> Action<S> {
	pub fn patch(patch: impl 'static + Patch<S>) -> Self {
		Self::Patch(Box::new(move |state| patch.apply(state)))
	}

	pub fn thunk(thunk: impl 'static + FnOnce(&Store<S>)) -> Self {
		Self::Thunk(Box::new(thunk))
	}
}

impl<S> Debug for Action<S> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Action::Patch(_) => f.write_str("Action::Patch(..)"),
			Action::Thunk(_) => f.write_str("Action::Thunk(..)"),
		}
	}
}

pub struct Store<S> {
	state: RefCell<Rc<S>>,
	subscribers: Rc<RefCell<Subscribers<dyn Fn(&S)>>>,
}

impl<S: Default> Default for Store<S> {
	fn default() -> Self {
		Self::new(S::default())
	}
}

impl<S> Store<S> {
	pub fn new(initial_state: S) -> Self {
		Self {
			state: RefCell::new(Rc::new(initial_state)),
			subscribers: Rc::default(),
		}
	}

	/// The current state. Later updates don't affect the returned snapshot.
	#[must_use]
	pub fn state(&self) -> Rc<S> {
		self.state.borrow().clone()
	}

	/// Registers `handler` to be called with the new state after each update.
	pub fn subscribe(&self, handler: impl 'static + Fn(&S)) -> Subscription
	where
		S: 'static,
	{
		let id = self.subscribers.borrow_mut().insert(Rc::new(handler));
		trace!(?id, "Subscribed to store.");
		Subscription::in_registry(id, &self.subscribers)
	}

	#[must_use]
	pub fn subscriber_count(&self) -> usize {
		self.subscribers.borrow().len()
	}

	fn notify_subscribers(&self) {
		let subscribers = self.subscribers.borrow().snapshot();
		trace!("Notifying {} subscriber(s).", subscribers.len());
		for subscriber in subscribers {
			// Re-read per subscriber: an earlier one may have updated the state again.
			let state = self.state();
			subscriber(&*state);
		}
	}
}

impl<S: Clone> Store<S> {
	/// Applies `patch` to a copy of the current state, replaces the state with it and notifies all subscribers.
	#[instrument(skip(self, patch))]
	pub fn set_state(&self, patch: impl Patch<S>) {
		let mut next = S::clone(&self.state());
		patch.apply(&mut next);
		*self.state.borrow_mut() = Rc::new(next);
		self.notify_subscribers();
	}

	/// Runs a thunk or applies a patch.
	#[instrument(skip(self))]
	pub fn dispatch(&self, action: Action<S>) {
		match action {
			Action::Patch(patch) => self.set_state(patch),
			Action::Thunk(thunk) => {
				let span = trace_span!("Running thunk");
				let _enter = span.enter();
				thunk(self);
			}
		}
	}
}

impl<S: Debug> Debug for Store<S> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Store")
			.field("state", &self.state.borrow())
			.field("subscribers", &self.subscribers.borrow().len())
			.finish()
	}
}
