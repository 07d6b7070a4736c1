//! The browser backend, on top of [`web_sys`].
//!
//! [`WebDom`] creates one bound JavaScript function per distinct [`EventHandler`], shared by all elements that use it.
//! These are reference-counted and released in [`Dom::flush`], i.e. after each top-level update.

use crate::{
	dom::{Dom, NodeView},
	error::DomError,
	rc_hash_map::{CountSaturatedError, RcHashMap},
	router::{History, Router},
	vdom::{Event, EventHandler},
};
use core::{
	cell::RefCell,
	fmt::{self, Debug, Formatter},
};
use hashbrown::HashMap;
use js_sys::Function;
use std::rc::{Rc, Weak};
use tracing::{error, instrument, trace, trace_span, warn};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::HtmlInputElement;

fn host_error(error: JsValue) -> DomError {
	DomError::Host(error.as_string().unwrap_or_else(|| format!("{:?}", error)))
}

fn no_window() -> DomError {
	DomError::Host("no global `window` available".to_owned())
}

type HandlerRegistry = RefCell<HashMap<usize, EventHandler>>;

/// Attached to a [`web_sys::Document`], this `struct` creates and updates its nodes.
///
/// # Safety
///
/// Listeners are memory-safe even if misbehaving JavaScript code calls them after their element was discarded.
/// They will however log errors instead of calling handlers once the [`WebDom`] is dropped.
pub struct WebDom {
	document: web_sys::Document,
	handlers: Rc<HandlerRegistry>,
	listener_handles: RcHashMap<usize, u16, Function>,
	common_handler: Closure<dyn Fn(JsValue, web_sys::Event)>,
}

impl WebDom {
	#[must_use]
	#[instrument]
	pub fn new(document: web_sys::Document) -> Self {
		let handlers = Rc::<HandlerRegistry>::default();
		let registry = Rc::downgrade(&handlers);
		Self {
			document,
			handlers,
			listener_handles: RcHashMap::new(),
			common_handler: Closure::wrap(Box::new(move |key: JsValue, event: web_sys::Event| {
				let span = trace_span!("common_handler", key = ?&key, kind = event.type_().as_str());
				let _enter = span.enter();
				common_handler(&registry, &key, &event);
			}) as Box<dyn Fn(JsValue, web_sys::Event)>),
		}
	}

	/// A [`WebDom`] for the current window's document.
	///
	/// # Errors
	///
	/// Iff there is no window or it has no document, e.g. in a worker.
	pub fn for_window() -> Result<Self, DomError> {
		let document = web_sys::window().and_then(|window| window.document()).ok_or_else(no_window)?;
		Ok(Self::new(document))
	}

	#[must_use]
	pub fn document(&self) -> &web_sys::Document {
		&self.document
	}

	#[must_use]
	pub fn element_by_id(&self, id: &str) -> Option<web_sys::Node> {
		self.document.get_element_by_id(id).map(Into::into)
	}

	/// The number of distinct handlers that currently have a JavaScript function.
	#[must_use]
	pub fn listener_count(&self) -> usize {
		self.listener_handles.len()
	}

	#[allow(clippy::cast_precision_loss)]
	fn get_or_create_listener(&mut self, handler: &EventHandler) -> Result<Function, DomError> {
		let common_handler = &self.common_handler;
		let handlers = &self.handlers;
		self.listener_handles
			.increment_or_insert_with(handler.key(), |&key| {
				trace!(?handler, "Creating listener function.");
				handlers.borrow_mut().insert(key, handler.clone());
				common_handler.as_ref().unchecked_ref::<Function>().bind1(&JsValue::UNDEFINED, &JsValue::from_f64(key as f64))
			})
			.map(|listener| listener.clone())
			.map_err(|CountSaturatedError| DomError::Host("too many (more than 65k) active references to the same event handler".to_owned()))
	}

	fn release_listener(&mut self, handler: &EventHandler) -> Option<Function> {
		match self.listener_handles.weak_decrement(&handler.key()) {
			Ok(Some(listener)) => Some(listener.clone()),
			Ok(None) => {
				warn!(?handler, "Tried to release an event listener that was never added.");
				None
			}
			Err(CountSaturatedError) => {
				error!(?handler, "Tried to release an event listener more often than it was added.");
				None
			}
		}
	}
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn common_handler(registry: &Weak<HandlerRegistry>, key: &JsValue, event: &web_sys::Event) {
	let handler = match (key.as_f64(), registry.upgrade()) {
		(Some(key), Some(registry)) => {
			let handler = registry.borrow().get(&(key as usize)).cloned();
			handler
		}
		(_, None) => return error!("Event listener called after its `WebDom` was dropped."),
		(None, _) => None,
	};
	let handler = match handler {
		Some(handler) => handler,
		None => return error!("frond bug: No handler registered for listener key {:?}", key),
	};

	let converted = convert_event(event);
	let span = trace_span!("handler.call", ?handler);
	let _enter = span.enter();
	handler.call(&converted);
	apply_event_effects(event, &converted);
}

fn event_target_input(event: &web_sys::Event) -> Option<HtmlInputElement> {
	event.target().and_then(|target| target.dyn_into::<HtmlInputElement>().ok())
}

fn convert_event(event: &web_sys::Event) -> Event {
	let mut converted = Event::new(event.type_());
	if let Some(keyboard_event) = event.dyn_ref::<web_sys::KeyboardEvent>() {
		converted = converted.with_key(keyboard_event.key());
	}
	if let Some(input) = event_target_input(event) {
		converted = converted.with_target_value(input.value());
	}
	converted
}

fn apply_event_effects(event: &web_sys::Event, converted: &Event) {
	if converted.default_prevented() {
		event.prevent_default();
	}
	if let Some(value) = converted.take_written_value() {
		match event_target_input(event) {
			Some(input) => input.set_value(&value),
			None => warn!("Can't write back a value to an event target that isn't an `<input>`."),
		}
	}
}

fn element(node: &web_sys::Node) -> Result<&web_sys::Element, DomError> {
	node.dyn_ref::<web_sys::Element>().ok_or(DomError::NotAnElement)
}

impl Dom for WebDom {
	type Node = web_sys::Node;

	fn create_text_node(&mut self, text: &str) -> web_sys::Node {
		self.document.create_text_node(text).into()
	}

	fn create_element(&mut self, tag: &str) -> Result<web_sys::Node, DomError> {
		match self.document.create_element(tag) {
			Ok(element) => Ok(element.into()),
			Err(error) => {
				error!("Failed to create element <{}>: {:?}", tag, error);
				Err(DomError::InvalidTagName(tag.to_owned()))
			}
		}
	}

	fn set_attribute(&mut self, node: &web_sys::Node, name: &str, value: &str) -> Result<(), DomError> {
		element(node)?.set_attribute(name, value).map_err(host_error)
	}

	fn remove_attribute(&mut self, node: &web_sys::Node, name: &str) -> Result<(), DomError> {
		element(node)?.remove_attribute(name).map_err(host_error)
	}

	fn set_checked(&mut self, node: &web_sys::Node, checked: bool) -> Result<(), DomError> {
		match node.dyn_ref::<HtmlInputElement>() {
			Some(input) => {
				input.set_checked(checked);
				Ok(())
			}
			None => Err(DomError::Host(format!("can't set `checked` on {:?}", node))),
		}
	}

	fn add_event_listener(&mut self, node: &web_sys::Node, event: &str, handler: &EventHandler) -> Result<(), DomError> {
		let listener = self.get_or_create_listener(handler)?;
		node.add_event_listener_with_callback(event, &listener).map_err(host_error)
	}

	fn remove_event_listener(&mut self, node: &web_sys::Node, event: &str, handler: &EventHandler) -> Result<(), DomError> {
		match self.release_listener(handler) {
			Some(listener) => node.remove_event_listener_with_callback(event, &listener).map_err(host_error),
			None => Ok(()),
		}
	}

	fn forget_listener(&mut self, _event: &str, handler: &EventHandler) {
		self.release_listener(handler);
	}

	fn append_child(&mut self, parent: &web_sys::Node, child: &web_sys::Node) -> Result<(), DomError> {
		parent.append_child(child).map(drop).map_err(host_error)
	}

	fn remove_child(&mut self, parent: &web_sys::Node, child: &web_sys::Node) -> Result<(), DomError> {
		parent.remove_child(child).map(drop).map_err(host_error)
	}

	fn replace_child(&mut self, parent: &web_sys::Node, new_child: &web_sys::Node, old_child: &web_sys::Node) -> Result<(), DomError> {
		parent.replace_child(new_child, old_child).map(drop).map_err(host_error)
	}

	fn child_node(&self, parent: &web_sys::Node, index: usize) -> Option<web_sys::Node> {
		u32::try_from(index).ok().and_then(|index| parent.child_nodes().get(index))
	}

	fn child_count(&self, parent: &web_sys::Node) -> usize {
		parent.child_nodes().length() as usize
	}

	fn clear_children(&mut self, parent: &web_sys::Node) -> Result<(), DomError> {
		parent.set_text_content(None);
		Ok(())
	}

	fn view(&self, node: &web_sys::Node) -> NodeView {
		if let Some(element) = node.dyn_ref::<web_sys::Element>() {
			let attributes = element.attributes();
			NodeView::Element {
				tag: element.local_name(),
				attributes: (0..attributes.length())
					.filter_map(|i| attributes.item(i))
					.map(|attribute| (attribute.name(), attribute.value()))
					.collect(),
			}
		} else if let Some(text) = node.dyn_ref::<web_sys::Text>() {
			NodeView::Text(text.data())
		} else {
			NodeView::Other
		}
	}

	fn flush(&mut self) {
		let freed = self.listener_handles.drain_weak().map(|(key, _)| key).collect::<Vec<_>>();
		if !freed.is_empty() {
			let mut handlers = self.handlers.borrow_mut();
			for key in &freed {
				handlers.remove(key);
			}
		}
		trace!("Freed {} event listener(s).", freed.len());
		trace!("Event listener count/cached capacity: {}/{}", self.listener_handles.len(), self.listener_handles.capacity());
	}
}

impl Debug for WebDom {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("WebDom")
			.field("document", &self.document)
			.field("listener_count", &self.listener_handles.len())
			.finish_non_exhaustive()
	}
}

/// [`History`] backed by the browser's History API.
#[derive(Debug, Clone)]
pub struct BrowserHistory {
	window: web_sys::Window,
}

impl BrowserHistory {
	/// # Errors
	///
	/// Iff there is no global `window`.
	pub fn new() -> Result<Self, DomError> {
		web_sys::window().map(|window| Self { window }).ok_or_else(no_window)
	}
}

impl History for BrowserHistory {
	fn pathname(&self) -> String {
		self.window.location().pathname().unwrap_or_else(|error| {
			error!("Failed to read `location.pathname`: {:?}", error);
			"/".to_owned()
		})
	}

	fn push_state(&mut self, path: &str) {
		match self.window.history() {
			Ok(history) => {
				if let Err(error) = history.push_state_with_url(&JsValue::NULL, "", Some(path)) {
					error!("Failed to push history state for {:?}: {:?}", path, error);
				}
			}
			Err(error) => error!("Failed to access `window.history`: {:?}", error),
		}
	}
}

/// Re-resolves a [`Router`]'s route whenever the user navigates through the session history (back/forward).
///
/// The listener is removed when this is dropped. It holds only a weak reference to the router.
pub struct PopStateListener {
	window: web_sys::Window,
	listener: Closure<dyn Fn()>,
}

impl PopStateListener {
	/// # Errors
	///
	/// Iff there is no global `window` or the listener can't be added.
	pub fn bind<R, H>(router: &Rc<Router<R, H>>) -> Result<Self, DomError>
	where
		R: 'static + Clone + Debug,
		H: 'static + History,
	{
		let window = web_sys::window().ok_or_else(no_window)?;
		let router = Rc::downgrade(router);
		let listener = Closure::wrap(Box::new(move || match router.upgrade() {
			Some(router) => router.handle_route(),
			None => trace!("Ignoring `popstate` for dropped router."),
		}) as Box<dyn Fn()>);
		window.add_event_listener_with_callback("popstate", listener.as_ref().unchecked_ref()).map_err(host_error)?;
		Ok(Self { window, listener })
	}
}

impl Drop for PopStateListener {
	fn drop(&mut self) {
		if let Err(error) = self.window.remove_event_listener_with_callback("popstate", self.listener.as_ref().unchecked_ref()) {
			error!("Failed to remove `popstate` listener: {:?}", error);
		}
	}
}

impl Debug for PopStateListener {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("PopStateListener").finish_non_exhaustive()
	}
}
