#![cfg(target_arch = "wasm32")]

use frond::{
	web::{BrowserHistory, PopStateListener},
	History, Router,
};
use std::{cell::RefCell, rc::Rc, sync::Once};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::window;

wasm_bindgen_test_configure!(run_in_browser);

fn init_logging() {
	static INIT: Once = Once::new();
	INIT.call_once(tracing_wasm::set_as_global_default);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
	Active,
	Completed,
}

/// Changes the location without an event, like the browser does before firing `popstate`.
fn replace_location(path: &str) {
	window().unwrap().history().unwrap().replace_state_with_url(&JsValue::NULL, "", Some(path)).unwrap();
}

fn fire_popstate() {
	let event = web_sys::Event::new("popstate").unwrap();
	window().unwrap().dispatch_event(&event).unwrap();
}

#[wasm_bindgen_test]
fn push_state_and_popstate() {
	init_logging();
	let original = window().unwrap().location().pathname().unwrap();

	let mut history = BrowserHistory::new().unwrap();
	history.push_state("/frond-test/active");
	assert_eq!(history.pathname(), "/frond-test/active");

	let router = Rc::new(Router::new(
		vec![("/frond-test/active", Page::Active), ("/frond-test/completed", Page::Completed)],
		history,
	));
	assert_eq!(router.current_route(), Some(Page::Active));

	let seen = Rc::new(RefCell::new(Vec::new()));
	let _subscription = router.subscribe({
		let seen = Rc::clone(&seen);
		move |page: &Page| seen.borrow_mut().push(*page)
	});

	let listener = PopStateListener::bind(&router).unwrap();
	replace_location("/frond-test/completed");
	fire_popstate();
	assert_eq!(*seen.borrow(), vec![Page::Completed]);
	assert_eq!(router.current_route(), Some(Page::Completed));

	drop(listener);
	replace_location("/frond-test/active");
	fire_popstate();
	assert_eq!(*seen.borrow(), vec![Page::Completed]);
	assert_eq!(router.current_route(), Some(Page::Completed));

	replace_location(&original);
}

#[wasm_bindgen_test]
fn navigate_pushes_browser_history() {
	init_logging();
	let original = window().unwrap().location().pathname().unwrap();
	let length = window().unwrap().history().unwrap().length().unwrap();

	let router = Router::new(vec![("/frond-test/completed", Page::Completed)], BrowserHistory::new().unwrap());
	router.navigate("/frond-test/completed?filter=1");

	assert_eq!(router.history().pathname(), "/frond-test/completed");
	assert_eq!(router.current_route(), Some(Page::Completed));
	assert_eq!(window().unwrap().history().unwrap().length().unwrap(), length + 1);

	replace_location(&original);
}

#[wasm_bindgen_test]
fn listener_outliving_its_router_is_harmless() {
	init_logging();
	let router = Rc::new(Router::new(vec![("/", Page::Active)], BrowserHistory::new().unwrap()));
	let _listener = PopStateListener::bind(&router).unwrap();
	drop(router);
	fire_popstate();
}
