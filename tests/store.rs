use frond::{Action, Patch, Store};
use pretty_assertions::assert_eq;
use std::{cell::RefCell, rc::Rc};

mod common;

#[derive(Debug, Clone, Default, PartialEq)]
struct State {
	todos: Vec<String>,
	filter: &'static str,
}

/// Overwrites only the fields that are set.
#[derive(Default)]
struct StatePatch {
	todos: Option<Vec<String>>,
	filter: Option<&'static str>,
}

impl Patch<State> for StatePatch {
	fn apply(self, state: &mut State) {
		if let Some(todos) = self.todos {
			state.todos = todos;
		}
		if let Some(filter) = self.filter {
			state.filter = filter;
		}
	}
}

fn store() -> Store<State> {
	common::init_logging();
	Store::new(State {
		todos: vec!["first".to_owned()],
		filter: "all",
	})
}

#[test]
fn set_state_merges_patch() {
	let store = store();
	store.set_state(StatePatch {
		filter: Some("active"),
		..StatePatch::default()
	});
	assert_eq!(
		*store.state(),
		State {
			todos: vec!["first".to_owned()],
			filter: "active",
		}
	);

	store.set_state(|state: &mut State| state.todos.push("second".to_owned()));
	assert_eq!(store.state().todos, vec!["first", "second"]);
	assert_eq!(store.state().filter, "active");
}

#[test]
fn snapshots_are_immutable() {
	let store = store();
	let before = store.state();
	store.set_state(|state: &mut State| state.filter = "completed");
	assert_eq!(before.filter, "all");
	assert_eq!(store.state().filter, "completed");
}

#[test]
fn subscribers_see_every_update_in_order() {
	let store = store();
	let seen = Rc::new(RefCell::new(Vec::new()));

	let first = store.subscribe({
		let seen = Rc::clone(&seen);
		move |state: &State| seen.borrow_mut().push(format!("1:{}", state.filter))
	});
	let _second = store.subscribe({
		let seen = Rc::clone(&seen);
		move |state: &State| seen.borrow_mut().push(format!("2:{}", state.filter))
	});
	assert_eq!(store.subscriber_count(), 2);

	store.set_state(|state: &mut State| state.filter = "active");
	assert_eq!(*seen.borrow(), vec!["1:active", "2:active"]);

	assert!(first.unsubscribe());
	store.set_state(|state: &mut State| state.filter = "completed");
	assert_eq!(*seen.borrow(), vec!["1:active", "2:active", "2:completed"]);
	assert_eq!(store.subscriber_count(), 1);
}

#[test]
fn subscriber_ids_are_not_reused() {
	let store = store();
	let subscription = store.subscribe(|_| ());
	let id = subscription.id();
	assert!(subscription.unsubscribe());

	let other = store.subscribe(|_| ());
	assert_ne!(other.id(), id);
	assert!(other.unsubscribe());
	assert_eq!(store.subscriber_count(), 0);
}

#[test]
fn dropping_a_subscription_keeps_the_handler() {
	let store = store();
	let calls = Rc::new(RefCell::new(0));
	drop(store.subscribe({
		let calls = Rc::clone(&calls);
		move |_| *calls.borrow_mut() += 1
	}));
	store.set_state(|_: &mut State| ());
	assert_eq!(*calls.borrow(), 1);
}

#[test]
fn dispatch_patch_and_thunk() {
	let store = store();
	store.dispatch(Action::patch(|state: &mut State| state.todos.clear()));
	assert!(store.state().todos.is_empty());

	store.dispatch(Action::thunk(|store: &Store<State>| {
		let count = store.state().todos.len();
		store.dispatch(Action::patch(move |state: &mut State| state.todos.push(format!("todo {}", count + 1))));
		store.dispatch(Action::patch(StatePatch {
			filter: Some("active"),
			..StatePatch::default()
		}));
	}));
	assert_eq!(
		*store.state(),
		State {
			todos: vec!["todo 1".to_owned()],
			filter: "active",
		}
	);
}

#[test]
fn subscribers_may_update_reentrantly() {
	let store = Rc::new(store());
	let seen = Rc::new(RefCell::new(Vec::new()));

	let _normalize = store.subscribe({
		let store = Rc::downgrade(&store);
		move |state: &State| {
			if state.filter == "ALL" {
				if let Some(store) = store.upgrade() {
					store.set_state(|state: &mut State| state.filter = "all");
				}
			}
		}
	});
	let _record = store.subscribe({
		let seen = Rc::clone(&seen);
		move |state: &State| seen.borrow_mut().push(state.filter)
	});

	store.set_state(|state: &mut State| state.filter = "ALL");
	assert_eq!(store.state().filter, "all");
	// The nested update notifies first, and the outer notification then re-reads the current state.
	assert_eq!(*seen.borrow(), vec!["all", "all"]);
}

#[test]
fn subscribing_during_notification_takes_effect_next_time() {
	let store = Rc::new(store());
	let late_calls = Rc::new(RefCell::new(0));

	let _subscriber = store.subscribe({
		let store = Rc::downgrade(&store);
		let late_calls = Rc::clone(&late_calls);
		move |_: &State| {
			if let Some(store) = store.upgrade() {
				if store.subscriber_count() == 1 {
					let late_calls = Rc::clone(&late_calls);
					drop(store.subscribe(move |_| *late_calls.borrow_mut() += 1));
				}
			}
		}
	});

	store.set_state(|_: &mut State| ());
	assert_eq!(*late_calls.borrow(), 0);
	store.set_state(|_: &mut State| ());
	assert_eq!(*late_calls.borrow(), 1);
}

#[test]
fn default_store() {
	let store = Store::<State>::default();
	assert_eq!(*store.state(), State::default());
	assert_eq!(format!("{:?}", store), r#"Store { state: State { todos: [], filter: "" }, subscribers: 0 }"#);
}
