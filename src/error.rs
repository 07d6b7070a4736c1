//! Errors raised by [`Dom`](`crate::dom::Dom`) implementations.

use thiserror::Error;

/// A failed host DOM operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
	/// The host refused to create an element with this tag name.
	#[error("invalid tag name {0:?}")]
	InvalidTagName(String),

	/// An element-only operation was attempted on another kind of node.
	#[error("expected an element node")]
	NotAnElement,

	/// The node passed as child is not a child of the given parent.
	#[error("the node is not a child of this parent")]
	NotAChild,

	/// An exception thrown by the host, stringified.
	#[error("host DOM error: {0}")]
	Host(String),
}

/// Error type returned by [`EventBus`](`crate::events::EventBus`) handlers.
pub type HandlerError = Box<dyn std::error::Error>;
