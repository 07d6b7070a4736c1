//! Turns virtual nodes into host nodes.

use crate::{
	dom::Dom,
	error::DomError,
	redact::Redacted,
	vdom::{AttrValue, VElement, VNode},
};
use tracing::{instrument, trace, trace_span, warn};

/// Creates the host node tree for `vnode`. The result is not attached to anything.
///
/// # Errors
///
/// Iff the host rejects an operation, e.g. because of an invalid tag name.
#[instrument(skip(dom, vnode))]
pub fn render<D: Dom + ?Sized>(dom: &mut D, vnode: &VNode) -> Result<D::Node, DomError> {
	match vnode {
		VNode::Text(text) => {
			trace!(text = ?Redacted(text), "Creating text node.");
			Ok(dom.create_text_node(text))
		}
		VNode::Empty => {
			trace!("Creating empty text node for placeholder.");
			Ok(dom.create_text_node(""))
		}
		VNode::Element(element) => render_element(dom, element),
	}
}

pub(crate) fn render_element<D: Dom + ?Sized>(dom: &mut D, element: &VElement) -> Result<D::Node, DomError> {
	let span = trace_span!("Creating element", tag = element.tag(), "attrs.len()" = element.attrs().len(), "children.len()" = element.children().len());
	let _enter = span.enter();

	let node = dom.create_element(element.tag())?;
	for (name, value) in element.attrs() {
		apply_attribute(dom, &node, element.tag(), name, value)?;
	}
	for child in element.children() {
		let child = render(dom, child)?;
		dom.append_child(&node, &child)?;
	}
	Ok(node)
}

/// The event an `on*` attribute binds to, e.g. `"onDblClick"` → `"dblclick"`.
pub(crate) fn listener_event(name: &str) -> Option<String> {
	name.strip_prefix("on").map(str::to_lowercase)
}

fn is_checked_property(tag: &str, name: &str) -> bool {
	name == "checked" && tag == "input"
}

/// Applies one attribute to a freshly created or patched element.
pub(crate) fn apply_attribute<D: Dom + ?Sized>(dom: &mut D, node: &D::Node, tag: &str, name: &str, value: &AttrValue) -> Result<(), DomError> {
	match value {
		AttrValue::Handler(handler) => match listener_event(name) {
			Some(event) => {
				trace!(event = event.as_str(), ?handler, "Adding event listener.");
				dom.add_event_listener(node, &event, handler)
			}
			None => {
				warn!("Ignoring event handler under attribute {:?}, which doesn't start with `on`.", name);
				Ok(())
			}
		},
		_ if is_checked_property(tag, name) => dom.set_checked(node, value.is_truthy()),
		AttrValue::Null => Ok(()),
		AttrValue::Str(_) | AttrValue::Number(_) | AttrValue::Bool(_) => match value.to_attribute_string() {
			Some(string) => {
				trace!(attribute = name, value = ?Redacted(&string), "Setting attribute.");
				dom.set_attribute(node, name, &string)
			}
			None => Ok(()),
		},
	}
}

/// Undoes [`apply_attribute`] for an attribute that is no longer present.
pub(crate) fn clear_attribute<D: Dom + ?Sized>(dom: &mut D, node: &D::Node, tag: &str, name: &str, value: &AttrValue) -> Result<(), DomError> {
	match value {
		AttrValue::Handler(handler) => match listener_event(name) {
			Some(event) => {
				trace!(event = event.as_str(), ?handler, "Removing event listener.");
				dom.remove_event_listener(node, &event, handler)
			}
			None => Ok(()),
		},
		_ if is_checked_property(tag, name) => dom.set_checked(node, false),
		AttrValue::Null => Ok(()),
		AttrValue::Str(_) | AttrValue::Number(_) | AttrValue::Bool(_) => {
			trace!(attribute = name, "Removing attribute.");
			dom.remove_attribute(node, name)
		}
	}
}
