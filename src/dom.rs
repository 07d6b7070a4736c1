//! The host seam: everything [`render`](`crate::render::render`), [`update_element`](`crate::diff::update_element`)
//! and [`load`](`crate::load`) need from a document.
//!
//! [`MemoryDom`](`crate::memory::MemoryDom`) implements this for tests and non-browser targets,
//! [`WebDom`](`crate::web::WebDom`) for the browser.

use crate::{error::DomError, vdom::EventHandler};
use core::fmt::Debug;

/// Read-only description of a host node, used by [`load`](`crate::load`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeView {
	Element {
		/// The lowercase local name.
		tag: String,
		attributes: Vec<(String, String)>,
	},
	Text(String),
	/// Comments, processing instructions and the like.
	Other,
}

/// A mutable document.
///
/// All operations are synchronous. Implementations must not call into event handlers from any of these methods.
pub trait Dom {
	/// A cheap handle to a node in this document.
	type Node: Clone + Debug;

	fn create_text_node(&mut self, text: &str) -> Self::Node;

	/// # Errors
	///
	/// Iff the host rejects `tag`.
	fn create_element(&mut self, tag: &str) -> Result<Self::Node, DomError>;

	fn set_attribute(&mut self, element: &Self::Node, name: &str, value: &str) -> Result<(), DomError>;

	fn remove_attribute(&mut self, element: &Self::Node, name: &str) -> Result<(), DomError>;

	/// Sets the `checked` *property* of a form control, which is distinct from its attribute.
	fn set_checked(&mut self, element: &Self::Node, checked: bool) -> Result<(), DomError>;

	/// Registers `handler` for `event` on `element`. Registering the same pair twice has no further effect.
	fn add_event_listener(&mut self, element: &Self::Node, event: &str, handler: &EventHandler) -> Result<(), DomError>;

	fn remove_event_listener(&mut self, element: &Self::Node, event: &str, handler: &EventHandler) -> Result<(), DomError>;

	/// Releases bookkeeping for a listener on a node that is being discarded, without touching the node itself.
	fn forget_listener(&mut self, _event: &str, _handler: &EventHandler) {}

	fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), DomError>;

	fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), DomError>;

	fn replace_child(&mut self, parent: &Self::Node, new_child: &Self::Node, old_child: &Self::Node) -> Result<(), DomError>;

	fn child_node(&self, parent: &Self::Node, index: usize) -> Option<Self::Node>;

	fn child_count(&self, parent: &Self::Node) -> usize;

	/// Removes all children of `parent`.
	fn clear_children(&mut self, parent: &Self::Node) -> Result<(), DomError>;

	fn view(&self, node: &Self::Node) -> NodeView;

	/// Called once after each top-level [`update_element`](`crate::diff::update_element`).
	fn flush(&mut self) {}
}
