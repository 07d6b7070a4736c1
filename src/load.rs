//! Reconstructs virtual DOM trees from existing host nodes, so pre-rendered markup can serve as the old tree of a diff.
//!
//! Event listeners can't be read back from the host, so loaded elements have none.

use crate::{
	dom::{Dom, NodeView},
	vdom::{VElement, VNode},
};
use tracing::{trace, warn};

pub fn load_child_nodes<D: Dom + ?Sized>(dom: &D, parent: &D::Node) -> Vec<VNode> {
	(0..dom.child_count(parent))
		.map(|i| match dom.child_node(parent, i) {
			Some(child) => load_node(dom, &child),
			None => {
				warn!("Child node {} vanished while loading. Using a placeholder.", i);
				VNode::Empty
			}
		})
		.collect()
}

pub fn load_node<D: Dom + ?Sized>(dom: &D, node: &D::Node) -> VNode {
	match dom.view(node) {
		NodeView::Element { tag, attributes } => VNode::Element(load_element(dom, node, tag, attributes)),
		NodeView::Text(text) => VNode::Text(text),
		NodeView::Other => {
			trace!("Loading unrecognised node {:?} as placeholder.", node);
			VNode::Empty
		}
	}
}

fn load_element<D: Dom + ?Sized>(dom: &D, node: &D::Node, tag: String, attributes: Vec<(String, String)>) -> VElement {
	let mut element = VElement::new(tag);
	for (name, value) in attributes {
		element.set_attr(name, value);
	}
	element.push_child(load_child_nodes(dom, node));
	element
}
