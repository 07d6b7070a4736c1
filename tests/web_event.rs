#![cfg(target_arch = "wasm32")]

use frond::{attrs, children, create_element, render, update_element, web::WebDom, Dom, EventHandler};
use std::{
	cell::{Cell, RefCell},
	rc::Rc,
	sync::Once,
};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{HtmlElement, HtmlInputElement, KeyboardEvent, KeyboardEventInit};

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

#[wasm_bindgen_test]
fn click() {
	init_logging();
	let mut dom = WebDom::for_window().unwrap();
	let container = mount_point(&mut dom);

	let click_count = Rc::new(Cell::new(0));
	let vdom = create_element(
		"button",
		attrs!["id" => "test-button", "onclick" => EventHandler::new({
			let click_count = Rc::clone(&click_count);
			move |event| {
				assert_eq!(event.kind(), "click");
				click_count.set(click_count.get() + 1);
			}
		})],
		children!["Click me"],
	);

	update_element(&mut dom, &container, Some(&vdom), None, 0).unwrap();
	assert_eq!(click_count.get(), 0);
	assert_eq!(dom.listener_count(), 1);

	let button: HtmlElement = dom.element_by_id("test-button").unwrap().dyn_into().unwrap();
	button.click();
	assert_eq!(click_count.get(), 1);

	update_element(&mut dom, &container, None, Some(&vdom), 0).unwrap();
	assert_eq!(dom.listener_count(), 0);
	assert!(dom.element_by_id("test-button").is_none());
}

#[wasm_bindgen_test]
fn shared_handler_has_one_listener() {
	init_logging();
	let mut dom = WebDom::for_window().unwrap();
	let container = mount_point(&mut dom);

	let handler = EventHandler::new(|_| ());
	let vdom = create_element(
		"div",
		attrs![],
		children![
			create_element("button", attrs!["onclick" => handler.clone()], children![]),
			create_element("button", attrs!["onclick" => handler.clone()], children![]),
		],
	);

	update_element(&mut dom, &container, Some(&vdom), None, 0).unwrap();
	assert_eq!(dom.listener_count(), 1);

	let fewer = create_element("div", attrs![], children![create_element("button", attrs!["onclick" => handler], children![])]);
	update_element(&mut dom, &container, Some(&fewer), Some(&vdom), 0).unwrap();
	assert_eq!(dom.listener_count(), 1);

	update_element(&mut dom, &container, None, Some(&fewer), 0).unwrap();
	assert_eq!(dom.listener_count(), 0);
}

#[wasm_bindgen_test]
fn keydown_reads_and_writes_the_input_value() {
	init_logging();
	let mut dom = WebDom::for_window().unwrap();
	let container = mount_point(&mut dom);

	let submitted = Rc::new(RefCell::new(Vec::new()));
	let vdom = create_element(
		"input",
		attrs!["id" => "new-todo", "onkeydown" => EventHandler::new({
			let submitted = Rc::clone(&submitted);
			move |event| {
				if event.key() == Some("Enter") {
					submitted.borrow_mut().extend(event.target_value());
					event.set_target_value("");
				}
			}
		})],
		children![],
	);
	let node = render(&mut dom, &vdom).unwrap();
	dom.append_child(&container, &node).unwrap();

	let input: HtmlInputElement = node.dyn_into().unwrap();
	input.set_value("Buy milk");

	let mut init = KeyboardEventInit::new();
	init.key("a");
	input.dispatch_event(&KeyboardEvent::new_with_keyboard_event_init_dict("keydown", &init).unwrap()).unwrap();
	assert_eq!(input.value(), "Buy milk");

	init.key("Enter");
	input.dispatch_event(&KeyboardEvent::new_with_keyboard_event_init_dict("keydown", &init).unwrap()).unwrap();
	assert_eq!(*submitted.borrow(), vec!["Buy milk"]);
	assert_eq!(input.value(), "");
}

#[wasm_bindgen_test]
fn handler_renamed_between_on_attributes() {
	init_logging();
	let mut dom = WebDom::for_window().unwrap();
	let container = mount_point(&mut dom);

	let click_count = Rc::new(Cell::new(0));
	let handler = EventHandler::new({
		let click_count = Rc::clone(&click_count);
		move |_| click_count.set(click_count.get() + 1)
	});
	let lower = create_element("button", attrs!["id" => "renamed-button", "onclick" => handler.clone()], children![]);
	let camel = create_element("button", attrs!["id" => "renamed-button", "onClick" => handler], children![]);

	update_element(&mut dom, &container, Some(&lower), None, 0).unwrap();
	update_element(&mut dom, &container, Some(&camel), Some(&lower), 0).unwrap();
	assert_eq!(dom.listener_count(), 1);

	let button: HtmlElement = dom.element_by_id("renamed-button").unwrap().dyn_into().unwrap();
	button.click();
	assert_eq!(click_count.get(), 1);

	update_element(&mut dom, &container, None, Some(&camel), 0).unwrap();
	assert_eq!(dom.listener_count(), 0);
}
