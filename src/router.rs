//! Maps paths to route values and tells subscribers when the current one changes.

use crate::subscribers::{Subscribers, Subscription};
use core::{
	cell::{Ref, RefCell, RefMut},
	fmt::{self, Debug, Formatter},
};
use hashbrown::HashMap;
use std::rc::Rc;
use tracing::{debug, instrument, trace};

/// The route used when no other one matches.
pub const FALLBACK_ROUTE: &str = "*";

/// Session history as seen by a [`Router`].
pub trait History {
	/// The path of the current entry, without query or fragment.
	fn pathname(&self) -> String;

	/// Adds an entry for `path` and makes it current.
	fn push_state(&mut self, path: &str);
}

/// History kept in memory, for tests and non-browser targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryHistory {
	entries: Vec<String>,
	index: usize,
}

impl MemoryHistory {
	pub fn new(initial_path: impl Into<String>) -> Self {
		Self {
			entries: vec![initial_path.into()],
			index: 0,
		}
	}

	/// Moves to the previous entry. Returns `false` if there is none.
	///
	/// Like the browser's back button, this doesn't notify anyone. Call [`Router::handle_route`] afterwards.
	#[allow(clippy::must_use_candidate)]
	pub fn back(&mut self) -> bool {
		if self.index == 0 {
			return false;
		}
		self.index -= 1;
		true
	}

	/// Moves to the next entry. Returns `false` if there is none.
	#[allow(clippy::must_use_candidate)]
	pub fn forward(&mut self) -> bool {
		if self.index + 1 >= self.entries.len() {
			return false;
		}
		self.index += 1;
		true
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl Default for MemoryHistory {
	fn default() -> Self {
		Self::new("/")
	}
}

impl History for MemoryHistory {
	fn pathname(&self) -> String {
		let entry = &self.entries[self.index];
		let end = entry.find(|c| c == '?' || c == '#').unwrap_or(entry.len());
		match &entry[..end] {
			"" => "/".to_owned(),
			path => path.to_owned(),
		}
	}

	fn push_state(&mut self, path: &str) {
		self.entries.truncate(self.index + 1);
		self.entries.push(path.to_owned());
		self.index += 1;
	}
}

struct RouterState<R, H> {
	routes: HashMap<String, R>,
	current_route: Option<R>,
	history: H,
}

/// Resolves [`History::pathname`] against a table of routes, falling back to [`FALLBACK_ROUTE`].
pub struct Router<R, H> {
	state: RefCell<RouterState<R, H>>,
	handlers: Rc<RefCell<Subscribers<dyn Fn(&R)>>>,
}

impl<R: Clone + Debug, H: History> Router<R, H> {
	/// Creates a router and resolves the current path right away. There are no subscribers to notify yet.
	pub fn new<P: Into<String>>(routes: impl IntoIterator<Item = (P, R)>, history: H) -> Self {
		let router = Self {
			state: RefCell::new(RouterState {
				routes: routes.into_iter().map(|(path, route)| (path.into(), route)).collect(),
				current_route: None,
				history,
			}),
			handlers: Rc::default(),
		};
		router.handle_route();
		router
	}

	/// Adds or replaces the route for `path`. The current route isn't re-resolved.
	pub fn add_route(&self, path: impl Into<String>, route: R) -> &Self {
		self.state.borrow_mut().routes.insert(path.into(), route);
		self
	}

	/// Pushes `path` onto the history and resolves it.
	#[instrument(skip(self))]
	pub fn navigate(&self, path: &str) {
		self.state.borrow_mut().history.push_state(path);
		self.handle_route();
	}

	/// Resolves the current path and notifies subscribers if a route matched.
	///
	/// If neither the path nor [`FALLBACK_ROUTE`] has a route, nothing changes.
	#[instrument(skip(self))]
	pub fn handle_route(&self) {
		let route = {
			let mut state = self.state.borrow_mut();
			let path = state.history.pathname();
			let route = state.routes.get(path.as_str()).or_else(|| state.routes.get(FALLBACK_ROUTE)).cloned();
			match route {
				Some(route) => {
					debug!(path = path.as_str(), ?route, "Route resolved.");
					state.current_route = Some(route.clone());
					route
				}
				None => {
					debug!(path = path.as_str(), "No route matched.");
					return;
				}
			}
		};
		self.notify_handlers(&route);
	}

	fn notify_handlers(&self, route: &R) {
		let handlers = self.handlers.borrow().snapshot();
		trace!("Notifying {} route handler(s).", handlers.len());
		for handler in handlers {
			handler(route);
		}
	}

	/// Registers `handler` to be called with each newly resolved route.
	pub fn subscribe(&self, handler: impl 'static + Fn(&R)) -> Subscription
	where
		R: 'static,
	{
		let id = self.handlers.borrow_mut().insert(Rc::new(handler));
		Subscription::in_registry(id, &self.handlers)
	}

	#[must_use]
	pub fn current_route(&self) -> Option<R> {
		self.state.borrow().current_route.clone()
	}

	/// Borrows the history. Don't hold this across [`Router::navigate`] or [`Router::handle_route`].
	pub fn history(&self) -> Ref<'_, H> {
		Ref::map(self.state.borrow(), |state| &state.history)
	}

	/// Mutably borrows the history, e.g. to go back. Don't hold this across [`Router::navigate`] or [`Router::handle_route`].
	pub fn history_mut(&self) -> RefMut<'_, H> {
		RefMut::map(self.state.borrow_mut(), |state| &mut state.history)
	}
}

impl<R: Debug, H: Debug> Debug for Router<R, H> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let state = self.state.borrow();
		f.debug_struct("Router")
			.field("routes", &state.routes)
			.field("current_route", &state.current_route)
			.field("history", &state.history)
			.field("handlers", &self.handlers.borrow().len())
			.finish()
	}
}
