//! An in-memory document.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Detached nodes stay addressable until the
//! [`MemoryDom`] is dropped, which keeps handles held by callers valid across diffs.

use crate::{
	dom::{Dom, NodeView},
	error::DomError,
	redact::Redacted,
	vdom::{Event, EventHandler},
};
use core::{cell::RefCell, fmt::Write as _};
use tracing::{error, instrument, trace, trace_span};

/// Handle to a node of a [`MemoryDom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
struct NodeData {
	parent: Option<NodeId>,
	kind: Kind,
}

#[derive(Debug)]
enum Kind {
	Element(ElementData),
	Text(String),
}

#[derive(Debug)]
struct ElementData {
	tag: String,
	attributes: Vec<(String, String)>,
	checked: bool,
	value: Option<String>,
	listeners: Vec<(String, EventHandler)>,
	children: Vec<NodeId>,
}

const VOID_ELEMENTS: &[&str] = &["area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr"];

#[derive(Debug, Default)]
pub struct MemoryDom {
	nodes: Vec<NodeData>,
}

impl MemoryDom {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	fn push(&mut self, kind: Kind) -> NodeId {
		self.nodes.push(NodeData { parent: None, kind });
		NodeId(self.nodes.len() - 1)
	}

	fn data(&self, node: NodeId) -> Result<&NodeData, DomError> {
		self.nodes.get(node.0).ok_or_else(|| DomError::Host(format!("unknown node {:?}", node)))
	}

	fn element(&self, node: NodeId) -> Result<&ElementData, DomError> {
		match &self.data(node)?.kind {
			Kind::Element(element) => Ok(element),
			Kind::Text(_) => Err(DomError::NotAnElement),
		}
	}

	fn element_mut(&mut self, node: NodeId) -> Result<&mut ElementData, DomError> {
		match self.nodes.get_mut(node.0).map(|data| &mut data.kind) {
			Some(Kind::Element(element)) => Ok(element),
			Some(Kind::Text(_)) => Err(DomError::NotAnElement),
			None => Err(DomError::Host(format!("unknown node {:?}", node))),
		}
	}

	fn is_inclusive_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
		loop {
			if node == ancestor {
				return true;
			}
			match self.nodes.get(node.0).and_then(|data| data.parent) {
				Some(parent) => node = parent,
				None => return false,
			}
		}
	}

	/// Removes `child` from its current parent, if any.
	fn detach(&mut self, child: NodeId) {
		if let Some(parent) = self.nodes.get(child.0).and_then(|data| data.parent) {
			if let Ok(element) = self.element_mut(parent) {
				element.children.retain(|&c| c != child);
			}
			self.nodes[child.0].parent = None;
		}
	}

	fn check_insertion(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
		self.element(parent)?;
		self.data(child)?;
		if self.is_inclusive_ancestor(child, parent) {
			return Err(DomError::Host("the new child is an ancestor of the parent".to_owned()));
		}
		Ok(())
	}

	#[must_use]
	pub fn parent(&self, node: NodeId) -> Option<NodeId> {
		self.nodes.get(node.0).and_then(|data| data.parent)
	}

	/// The children of an element, or an empty slice for text nodes.
	#[must_use]
	pub fn children(&self, node: NodeId) -> &[NodeId] {
		self.element(node).map_or(&[][..], |element| element.children.as_slice())
	}

	#[must_use]
	pub fn tag(&self, node: NodeId) -> Option<&str> {
		self.element(node).ok().map(|element| element.tag.as_str())
	}

	#[must_use]
	pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
		self.element(node).ok()?.attributes.iter().find(|(n, _)| n == name).map(|(_, value)| value.as_str())
	}

	#[must_use]
	pub fn is_checked(&self, node: NodeId) -> bool {
		self.element(node).map_or(false, |element| element.checked)
	}

	/// The `value` property, which defaults to the `value` attribute until set.
	#[must_use]
	pub fn value(&self, node: NodeId) -> Option<String> {
		let element = self.element(node).ok()?;
		element.value.clone().or_else(|| self.attribute(node, "value").map(ToOwned::to_owned))
	}

	/// Sets the `value` property, as typing into a form control would.
	///
	/// # Errors
	///
	/// Iff `node` is not an element.
	pub fn set_value(&mut self, node: NodeId, value: impl Into<String>) -> Result<(), DomError> {
		self.element_mut(node)?.value = Some(value.into());
		Ok(())
	}

	/// Concatenated data of all descendant text nodes.
	#[must_use]
	pub fn text_content(&self, node: NodeId) -> String {
		let mut text = String::new();
		self.collect_text(node, &mut text);
		text
	}

	fn collect_text(&self, node: NodeId, text: &mut String) {
		match self.nodes.get(node.0).map(|data| &data.kind) {
			Some(Kind::Text(data)) => text.push_str(data),
			Some(Kind::Element(element)) => {
				for &child in &element.children {
					self.collect_text(child, text);
				}
			}
			None => (),
		}
	}

	/// The handlers registered on `node` for `event`, in registration order.
	#[must_use]
	pub fn listeners(&self, node: NodeId, event: &str) -> Vec<EventHandler> {
		self.element(node)
			.map(|element| element.listeners.iter().filter(|(e, _)| e == event).map(|(_, handler)| handler.clone()).collect())
			.unwrap_or_default()
	}

	/// All nodes in the subtree rooted at `root` matching `predicate`, in document order.
	pub fn find_all(&self, root: NodeId, predicate: impl Fn(&Self, NodeId) -> bool) -> Vec<NodeId> {
		let mut found = Vec::new();
		let mut stack = vec![root];
		while let Some(node) = stack.pop() {
			if predicate(self, node) {
				found.push(node);
			}
			stack.extend(self.children(node).iter().rev());
		}
		found
	}

	#[must_use]
	pub fn element_by_id(&self, root: NodeId, id: &str) -> Option<NodeId> {
		self.find_all(root, |dom, node| dom.attribute(node, "id") == Some(id)).into_iter().next()
	}

	/// Elements whose `class` attribute contains `class` as one of its whitespace-separated tokens.
	#[must_use]
	pub fn find_by_class(&self, root: NodeId, class: &str) -> Vec<NodeId> {
		self.find_all(root, |dom, node| dom.attribute(node, "class").map_or(false, |classes| classes.split_ascii_whitespace().any(|c| c == class)))
	}

	#[must_use]
	pub fn outer_html(&self, node: NodeId) -> String {
		let mut html = String::new();
		self.write_html(node, &mut html);
		html
	}

	#[must_use]
	pub fn inner_html(&self, node: NodeId) -> String {
		let mut html = String::new();
		for &child in self.children(node) {
			self.write_html(child, &mut html);
		}
		html
	}

	fn write_html(&self, node: NodeId, html: &mut String) {
		match self.nodes.get(node.0).map(|data| &data.kind) {
			Some(Kind::Text(text)) => escape_into(text, false, html),
			Some(Kind::Element(element)) => {
				html.push('<');
				html.push_str(&element.tag);
				for (name, value) in &element.attributes {
					let _ = write!(html, " {}=\"", name);
					escape_into(value, true, html);
					html.push('"');
				}
				html.push('>');
				if VOID_ELEMENTS.contains(&element.tag.as_str()) && element.children.is_empty() {
					return;
				}
				for &child in &element.children {
					self.write_html(child, html);
				}
				let _ = write!(html, "</{}>", element.tag);
			}
			None => (),
		}
	}
}

fn escape_into(text: &str, attribute: bool, html: &mut String) {
	for c in text.chars() {
		match c {
			'&' => html.push_str("&amp;"),
			'<' if !attribute => html.push_str("&lt;"),
			'>' if !attribute => html.push_str("&gt;"),
			'"' if attribute => html.push_str("&quot;"),
			c => html.push(c),
		}
	}
}

fn validate_tag(tag: &str) -> Result<(), DomError> {
	if tag.is_empty() || tag.chars().any(|c| c.is_ascii_whitespace() || matches!(c, '<' | '>' | '/' | '"' | '\'' | '=')) {
		Err(DomError::InvalidTagName(tag.to_owned()))
	} else {
		Ok(())
	}
}

impl Dom for MemoryDom {
	type Node = NodeId;

	fn create_text_node(&mut self, text: &str) -> NodeId {
		self.push(Kind::Text(text.to_owned()))
	}

	fn create_element(&mut self, tag: &str) -> Result<NodeId, DomError> {
		validate_tag(tag)?;
		Ok(self.push(Kind::Element(ElementData {
			tag: tag.to_ascii_lowercase(),
			attributes: Vec::new(),
			checked: false,
			value: None,
			listeners: Vec::new(),
			children: Vec::new(),
		})))
	}

	fn set_attribute(&mut self, element: &NodeId, name: &str, value: &str) -> Result<(), DomError> {
		let element = self.element_mut(*element)?;
		match element.attributes.iter_mut().find(|(n, _)| n == name) {
			Some((_, existing)) => value.clone_into(existing),
			None => element.attributes.push((name.to_owned(), value.to_owned())),
		}
		Ok(())
	}

	fn remove_attribute(&mut self, element: &NodeId, name: &str) -> Result<(), DomError> {
		self.element_mut(*element)?.attributes.retain(|(n, _)| n != name);
		Ok(())
	}

	fn set_checked(&mut self, element: &NodeId, checked: bool) -> Result<(), DomError> {
		self.element_mut(*element)?.checked = checked;
		Ok(())
	}

	fn add_event_listener(&mut self, element: &NodeId, event: &str, handler: &EventHandler) -> Result<(), DomError> {
		let element = self.element_mut(*element)?;
		if !element.listeners.iter().any(|(e, h)| e == event && h == handler) {
			element.listeners.push((event.to_owned(), handler.clone()));
		}
		Ok(())
	}

	fn remove_event_listener(&mut self, element: &NodeId, event: &str, handler: &EventHandler) -> Result<(), DomError> {
		self.element_mut(*element)?.listeners.retain(|(e, h)| !(e == event && h == handler));
		Ok(())
	}

	fn append_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), DomError> {
		self.check_insertion(*parent, *child)?;
		self.detach(*child);
		self.element_mut(*parent)?.children.push(*child);
		self.nodes[child.0].parent = Some(*parent);
		Ok(())
	}

	fn remove_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), DomError> {
		self.element(*parent)?;
		if self.data(*child)?.parent != Some(*parent) {
			return Err(DomError::NotAChild);
		}
		self.detach(*child);
		Ok(())
	}

	fn replace_child(&mut self, parent: &NodeId, new_child: &NodeId, old_child: &NodeId) -> Result<(), DomError> {
		if self.data(*old_child)?.parent != Some(*parent) {
			return Err(DomError::NotAChild);
		}
		if new_child == old_child {
			return Ok(());
		}
		self.check_insertion(*parent, *new_child)?;
		self.detach(*new_child);
		let element = self.element_mut(*parent)?;
		let position = element.children.iter().position(|c| c == old_child).ok_or(DomError::NotAChild)?;
		element.children[position] = *new_child;
		self.nodes[old_child.0].parent = None;
		self.nodes[new_child.0].parent = Some(*parent);
		Ok(())
	}

	fn child_node(&self, parent: &NodeId, index: usize) -> Option<NodeId> {
		self.children(*parent).get(index).copied()
	}

	fn child_count(&self, parent: &NodeId) -> usize {
		self.children(*parent).len()
	}

	fn clear_children(&mut self, parent: &NodeId) -> Result<(), DomError> {
		let children = core::mem::take(&mut self.element_mut(*parent)?.children);
		for child in children {
			self.nodes[child.0].parent = None;
		}
		Ok(())
	}

	fn view(&self, node: &NodeId) -> NodeView {
		match self.nodes.get(node.0).map(|data| &data.kind) {
			Some(Kind::Element(element)) => NodeView::Element {
				tag: element.tag.clone(),
				attributes: element.attributes.clone(),
			},
			Some(Kind::Text(text)) => NodeView::Text(text.clone()),
			None => NodeView::Other,
		}
	}
}

/// Synchronously calls the `event` listeners registered on `target`, returning how many ran.
///
/// The document is not borrowed while handlers run, so they may freely re-render into it.
/// A value written through [`Event::set_target_value`] is stored on `target` afterwards.
#[instrument(skip(dom, event), fields(kind = event.kind()))]
pub fn dispatch_event(dom: &RefCell<MemoryDom>, target: NodeId, event: &Event) -> usize {
	let handlers = {
		let dom = dom.borrow();
		event.fill_target_value(dom.value(target));
		dom.listeners(target, event.kind())
	};
	trace!("Calling {} listener(s).", handlers.len());

	for handler in &handlers {
		let span = trace_span!("Calling handler", ?handler);
		let _enter = span.enter();
		handler.call(event);
	}

	if let Some(value) = event.take_written_value() {
		trace!(value = ?Redacted(&value), "Writing back target value.");
		if let Err(error) = dom.borrow_mut().set_value(target, value) {
			error!("Failed to write back target value: {}", error);
		}
	}
	handlers.len()
}
