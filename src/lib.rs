//! A small client-side UI toolkit: a virtual DOM with a positional differ, a publish/subscribe [`Store`],
//! an [`EventBus`] and a path-based [`Router`].
//!
//! Rendering goes through the [`Dom`] trait, so the same views work against the browser ([`web::WebDom`])
//! and against an in-memory document ([`memory::MemoryDom`]).

#![doc(html_root_url = "https://docs.rs/frond/0.0.1")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod diff;
pub mod dom;
pub mod error;
pub mod events;
pub mod load;
pub mod memory;
pub mod render;
pub mod router;
pub mod store;
pub mod vdom;
pub mod web;

mod rc_hash_map;
mod redact;
mod subscribers;

pub use diff::{changed, update_element, DiffOptions, Differ};
pub use dom::{Dom, NodeView};
pub use error::{DomError, HandlerError};
pub use events::EventBus;
pub use render::render;
pub use router::{History, MemoryHistory, Router};
pub use store::{Action, Patch, Store};
pub use subscribers::{SubscriberId, Subscription};
pub use vdom::{create_element, AttrValue, Child, Event, EventHandler, VElement, VNode};
