//! Positional (non-keyed) reconciliation of a virtual DOM tree against the host nodes rendered from a previous one.

use crate::{
	dom::{Dom, NodeView},
	error::DomError,
	render::{apply_attribute, clear_attribute, listener_event, render, render_element},
	vdom::{AttrValue, VElement, VNode},
};
use hashbrown::HashMap;
use tracing::{error, instrument, trace, trace_span};

/// Tuning for [`Differ`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffOptions {
	/// Maximum nesting depth the differ descends into. Deeper subtrees are left as they are and an error is logged.
	pub depth_limit: usize,
	/// Whether attributes and event listeners of elements that keep their tag are brought up to date.
	///
	/// With this off, only the child structure is reconciled and attributes keep the values they were rendered with.
	pub patch_attributes: bool,
}

impl Default for DiffOptions {
	fn default() -> Self {
		Self {
			depth_limit: 512,
			patch_attributes: true,
		}
	}
}

/// Returns whether `a` can't be updated in place into `b`:
/// They are of different kinds, are texts with different content or are elements with different tags.
#[must_use]
pub fn changed(a: &VNode, b: &VNode) -> bool {
	match (a, b) {
		(VNode::Text(t_1), VNode::Text(t_2)) => t_1 != t_2,
		(VNode::Element(e_1), VNode::Element(e_2)) => e_1.tag() != e_2.tag(),
		(VNode::Empty, VNode::Empty) => false,
		_ => true,
	}
}

/// Updates the child node at `index` of `parent` from `old` to `new` using [`DiffOptions::default`].
///
/// # Errors
///
/// Iff a host operation fails. The DOM may be partially updated in that case.
pub fn update_element<D: Dom + ?Sized>(dom: &mut D, parent: &D::Node, new: Option<&VNode>, old: Option<&VNode>, index: usize) -> Result<(), DomError> {
	Differ::default().update_element(dom, parent, new, old, index)
}

/// Applies the difference between two virtual DOM trees to a host document.
///
/// # Correct Use
///
/// `old` must be the tree the current host nodes were rendered or last updated from.
/// Inconsistencies between the two are logged and recovered from where possible,
/// but may leave the host out of sync with `new`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Differ {
	options: DiffOptions,
}

impl Differ {
	#[must_use]
	pub fn new(options: DiffOptions) -> Self {
		Self { options }
	}

	#[must_use]
	pub fn options(&self) -> DiffOptions {
		self.options
	}

	/// Updates the child node at `index` of `parent` from `old` to `new`:
	///
	/// - without `old`, `new` is rendered and appended,
	/// - without `new`, the child node is removed,
	/// - if [`changed`], the child node is replaced by a fresh rendering of `new`,
	/// - otherwise, elements are recursed into position by position.
	///
	/// # Errors
	///
	/// Iff a host operation fails. The DOM may be partially updated in that case.
	#[instrument(skip(self, dom, new, old))]
	pub fn update_element<D: Dom + ?Sized>(&self, dom: &mut D, parent: &D::Node, new: Option<&VNode>, old: Option<&VNode>, index: usize) -> Result<(), DomError> {
		let result = self.update_at(dom, parent, new, old, index, self.options.depth_limit);
		dom.flush();
		result
	}

	fn update_at<D: Dom + ?Sized>(&self, dom: &mut D, parent: &D::Node, new: Option<&VNode>, old: Option<&VNode>, index: usize, depth_limit: usize) -> Result<(), DomError> {
		if depth_limit == 0 {
			error!("Depth limit reached");
			return Ok(());
		}

		match (old, new) {
			(None, None) => Ok(()),

			(None, Some(new)) => {
				let span = trace_span!("Appending", index);
				let _enter = span.enter();
				let node = render(dom, new)?;
				dom.append_child(parent, &node)
			}

			(Some(old), None) => {
				let span = trace_span!("Removing", index);
				let _enter = span.enter();
				forget_listeners(dom, old);
				match dom.child_node(parent, index) {
					Some(child) => dom.remove_child(parent, &child),
					None => {
						error!("Expected to remove node at index {} but the parent has only {} child node(s). Skipping.", index, dom.child_count(parent));
						Ok(())
					}
				}
			}

			(Some(old), Some(new)) if changed(new, old) => {
				let span = trace_span!("Replacing", index);
				let _enter = span.enter();
				let node = render(dom, new)?;
				forget_listeners(dom, old);
				match dom.child_node(parent, index) {
					Some(child) => dom.replace_child(parent, &node, &child),
					None => {
						error!("Expected to replace node at index {} but the parent has only {} child node(s). Appending instead.", index, dom.child_count(parent));
						dom.append_child(parent, &node)
					}
				}
			}

			(Some(VNode::Element(e_1)), Some(VNode::Element(e_2))) => {
				let span = trace_span!("Diffing element", tag = e_2.tag(), index);
				let _enter = span.enter();

				let node = match dom.child_node(parent, index) {
					Some(node) => node,
					None => {
						error!("Expected <{}> at index {} beyond the end of the parent's child nodes. Switching to insertion.", e_1.tag(), index);
						forget_element_listeners(dom, e_1);
						let node = render_element(dom, e_2)?;
						return dom.append_child(parent, &node);
					}
				};

				match dom.view(&node) {
					NodeView::Element { tag, .. } if tag.eq_ignore_ascii_case(e_1.tag()) => (),
					view => {
						error!("Expected to update <{}> but found {:?}; Recreating the element.", e_1.tag(), view);
						forget_element_listeners(dom, e_1);
						let replacement = render_element(dom, e_2)?;
						return dom.replace_child(parent, &replacement, &node);
					}
				}

				if self.options.patch_attributes {
					patch_attributes(dom, &node, e_1, e_2)?;
				}
				self.update_children(dom, &node, e_1.children(), e_2.children(), depth_limit - 1)
			}

			(Some(_), Some(_)) => {
				trace!(index, "Unchanged.");
				Ok(())
			}
		}
	}

	/// Pairs children by position. Surplus old children are removed back to front so the indices of those still to be visited don't shift.
	fn update_children<D: Dom + ?Sized>(&self, dom: &mut D, element: &D::Node, c_1: &[VNode], c_2: &[VNode], depth_limit: usize) -> Result<(), DomError> {
		let common = c_1.len().min(c_2.len());
		for (i, (old, new)) in c_1.iter().zip(c_2).enumerate() {
			self.update_at(dom, element, Some(new), Some(old), i, depth_limit)?;
		}
		for (i, new) in c_2.iter().enumerate().skip(common) {
			self.update_at(dom, element, Some(new), None, i, depth_limit)?;
		}
		for (i, old) in c_1.iter().enumerate().skip(common).rev() {
			self.update_at(dom, element, None, Some(old), i, depth_limit)?;
		}
		Ok(())
	}
}

#[allow(clippy::similar_names)]
fn patch_attributes<D: Dom + ?Sized>(dom: &mut D, node: &D::Node, e_1: &VElement, e_2: &VElement) -> Result<(), DomError> {
	let span = trace_span!("Patching attributes", tag = e_2.tag());
	let _enter = span.enter();

	// Undo first. A handler may move to another `on*` name, e.g. from `onclick` to `onClick`.
	let next: HashMap<&str, &AttrValue> = e_2.attrs().iter().map(|(name, value)| (name.as_str(), value)).collect();
	for (name, prior) in e_1.attrs() {
		match next.get(name.as_str()) {
			Some(&value) if value == prior => (),
			// Listeners and explicit removals need the old value undone. Anything else is overwritten below.
			Some(&value) if !matches!(prior, AttrValue::Handler(_)) && !matches!(value, AttrValue::Null | AttrValue::Handler(_)) => (),
			Some(_) | None => clear_attribute(dom, node, e_1.tag(), name, prior)?,
		}
	}

	let previous: HashMap<&str, &AttrValue> = e_1.attrs().iter().map(|(name, value)| (name.as_str(), value)).collect();
	for (name, value) in e_2.attrs() {
		if previous.get(name.as_str()) != Some(&value) {
			apply_attribute(dom, node, e_2.tag(), name, value)?;
		}
	}
	Ok(())
}

/// Releases the listener bookkeeping of a subtree that is about to be discarded.
/// Returns the number of listeners released.
///
/// This doesn't touch the host, so it always walks the whole subtree regardless of the depth limit.
fn forget_listeners<D: Dom + ?Sized>(dom: &mut D, node: &VNode) -> usize {
	match node {
		VNode::Text(_) | VNode::Empty => 0,
		VNode::Element(element) => forget_element_listeners(dom, element),
	}
}

fn forget_element_listeners<D: Dom + ?Sized>(dom: &mut D, element: &VElement) -> usize {
	let span = trace_span!("Forgetting listeners", tag = element.tag());
	let _enter = span.enter();

	let mut count = 0;
	let mut stack = vec![element];
	while let Some(element) = stack.pop() {
		for (name, value) in element.attrs() {
			if let (AttrValue::Handler(handler), Some(event)) = (value, listener_event(name)) {
				dom.forget_listener(&event, handler);
				count += 1;
			}
		}
		stack.extend(element.children().iter().filter_map(VNode::as_element));
	}
	trace!("Released {} listener(s).", count);
	count
}
