#![cfg(target_arch = "wasm32")]

use frond::{attrs, children, create_element, load::load_child_nodes, render, update_element, web::WebDom, Dom, DomError, VNode};
use std::sync::Once;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{Element, HtmlInputElement};

wasm_bindgen_test_configure!(run_in_browser);

fn init_logging() {
	static INIT: Once = Once::new();
	INIT.call_once(tracing_wasm::set_as_global_default);
}

fn mount_point(dom: &mut WebDom) -> web_sys::Node {
	let container = dom.create_element("div").unwrap();
	dom.document().body().unwrap().append_child(&container).unwrap();
	container
}

fn inner_html(node: &web_sys::Node) -> String {
	node.dyn_ref::<Element>().unwrap().inner_html()
}

#[wasm_bindgen_test]
fn create_diff_identical_remove() {
	init_logging();
	let mut dom = WebDom::for_window().unwrap();
	let container = mount_point(&mut dom);

	let vdom = create_element("ul", attrs!["class" => "todo-list"], children![create_element("li", attrs![], children!["Hello frond!"]), 2]);

	update_element(&mut dom, &container, Some(&vdom), None, 0).unwrap();
	assert_eq!(inner_html(&container), r#"<ul class="todo-list"><li>Hello frond!</li>2</ul>"#);
	let ul = dom.child_node(&container, 0).unwrap();

	update_element(&mut dom, &container, Some(&vdom), Some(&vdom), 0).unwrap();
	assert!(dom.child_node(&container, 0).unwrap().is_same_node(Some(&ul)));

	update_element(&mut dom, &container, None, Some(&vdom), 0).unwrap();
	assert_eq!(inner_html(&container), "");
}

#[wasm_bindgen_test]
fn shrinking_list() {
	init_logging();
	let mut dom = WebDom::for_window().unwrap();
	let container = mount_point(&mut dom);

	let list = |items: &[&str]| create_element("ul", attrs![], children![items.iter().map(|&item| create_element("li", attrs![], children![item])).collect::<Vec<_>>()]);
	let old = list(&["a", "b", "c", "d"]);
	let new = list(&["a"]);

	update_element(&mut dom, &container, Some(&old), None, 0).unwrap();
	update_element(&mut dom, &container, Some(&new), Some(&old), 0).unwrap();
	assert_eq!(inner_html(&container), "<ul><li>a</li></ul>");
}

#[wasm_bindgen_test]
fn checked_property() {
	init_logging();
	let mut dom = WebDom::for_window().unwrap();
	let checkbox = |checked: bool| create_element("input", attrs!["type" => "checkbox", "checked" => checked], children![]);

	let node = render(&mut dom, &checkbox(true)).unwrap();
	let input = node.dyn_ref::<HtmlInputElement>().unwrap();
	assert!(input.checked());
	assert!(!input.has_attribute("checked"));
}

#[wasm_bindgen_test]
fn invalid_tag() {
	init_logging();
	let mut dom = WebDom::for_window().unwrap();
	let result = render(&mut dom, &create_element("not a tag", attrs![], children![]));
	assert_eq!(result.unwrap_err(), DomError::InvalidTagName("not a tag".to_owned()));
}

#[wasm_bindgen_test]
fn load_existing_markup() {
	init_logging();
	let mut dom = WebDom::for_window().unwrap();
	let container = mount_point(&mut dom);
	container.dyn_ref::<Element>().unwrap().set_inner_html(r#"<p class="greeting">Hi</p><!-- note -->"#);

	let loaded = load_child_nodes(&dom, &container);
	assert_eq!(loaded, vec![create_element("p", attrs!["class" => "greeting"], children!["Hi"]), VNode::Empty]);

	let new = create_element("p", attrs!["class" => "greeting"], children!["Hello"]);
	update_element(&mut dom, &container, Some(&new), Some(&loaded[0]), 0).unwrap();
	assert_eq!(inner_html(&container), r#"<p class="greeting">Hello</p><!-- note -->"#);
}
