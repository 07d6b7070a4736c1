//! The virtual DOM: lightweight, owned descriptions of the nodes a view wants on screen.
//!
//! Trees are built with [`create_element`] (or the [`VElement`] builder methods) and handed to
//! [`render`](`crate::render::render`) or [`update_element`](`crate::diff::update_element`).

use core::{
	cell::{Cell, RefCell},
	fmt::{self, Debug, Formatter},
	hash::{Hash, Hasher},
};
use std::rc::Rc;

/// A virtual DOM node.
#[derive(Debug, Clone, PartialEq)]
pub enum VNode {
	/// A text node. Numbers are stored in their stringified form.
	Text(String),
	Element(VElement),
	/// A placeholder for a falsy or tag-less child. Rendered as an empty text node so that it still occupies its position.
	Empty,
}

impl VNode {
	pub fn text(text: impl Into<String>) -> Self {
		Self::Text(text.into())
	}

	#[must_use]
	pub fn as_element(&self) -> Option<&VElement> {
		match self {
			VNode::Element(element) => Some(element),
			VNode::Text(_) | VNode::Empty => None,
		}
	}

	#[must_use]
	pub fn tag(&self) -> Option<&str> {
		self.as_element().map(VElement::tag)
	}
}

/// An element node: tag name, attributes in insertion order, and children.
#[derive(Debug, Clone, PartialEq)]
pub struct VElement {
	tag: String,
	attrs: Vec<(String, AttrValue)>,
	children: Vec<VNode>,
}

impl VElement {
	pub fn new(tag: impl Into<String>) -> Self {
		Self {
			tag: tag.into(),
			attrs: Vec::new(),
			children: Vec::new(),
		}
	}

	#[must_use]
	pub fn tag(&self) -> &str {
		&self.tag
	}

	#[must_use]
	pub fn attrs(&self) -> &[(String, AttrValue)] {
		&self.attrs
	}

	#[must_use]
	pub fn attr(&self, name: &str) -> Option<&AttrValue> {
		self.attrs.iter().find(|(n, _)| n == name).map(|(_, value)| value)
	}

	#[must_use]
	pub fn children(&self) -> &[VNode] {
		&self.children
	}

	/// Sets an attribute. An existing attribute of the same name keeps its position and only has its value replaced.
	pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
		let name = name.into();
		let value = value.into();
		match self.attrs.iter_mut().find(|(n, _)| *n == name) {
			Some((_, existing)) => *existing = value,
			None => self.attrs.push((name, value)),
		}
	}

	#[must_use]
	pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
		self.set_attr(name, value);
		self
	}

	/// Binds `handler` to `event` through an `on{event}` attribute.
	#[must_use]
	pub fn on(self, event: &str, handler: impl 'static + Fn(&Event)) -> Self {
		self.with_attr(format!("on{}", event), EventHandler::new(handler))
	}

	/// Appends a child. Lists are flattened one level.
	pub fn push_child(&mut self, child: impl Into<Child>) {
		match child.into() {
			Child::One(node) => self.children.push(node),
			Child::Many(nodes) => self.children.extend(nodes),
		}
	}

	#[must_use]
	pub fn child(mut self, child: impl Into<Child>) -> Self {
		self.push_child(child);
		self
	}
}

impl From<VElement> for VNode {
	fn from(element: VElement) -> Self {
		Self::Element(element)
	}
}

impl From<&str> for VNode {
	fn from(text: &str) -> Self {
		Self::Text(text.to_owned())
	}
}

impl From<String> for VNode {
	fn from(text: String) -> Self {
		Self::Text(text)
	}
}

impl From<&String> for VNode {
	fn from(text: &String) -> Self {
		Self::Text(text.clone())
	}
}

impl From<f64> for VNode {
	fn from(number: f64) -> Self {
		Self::Text(format_number(number))
	}
}

macro_rules! integer_conversions {
	($($integer:ty),*$(,)?) => {$(
		impl From<$integer> for VNode {
			fn from(number: $integer) -> Self {
				Self::Text(number.to_string())
			}
		}

		impl From<$integer> for AttrValue {
			#[allow(clippy::cast_precision_loss, clippy::cast_lossless)]
			fn from(number: $integer) -> Self {
				Self::Number(number as f64)
			}
		}

		impl From<$integer> for Child {
			fn from(number: $integer) -> Self {
				Self::One(number.into())
			}
		}
	)*};
}
integer_conversions!(i32, i64, u32, u64, usize);

/// One child argument of [`create_element`]: a single node or a list that is flattened into its parent.
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
	One(VNode),
	Many(Vec<VNode>),
}

macro_rules! single_child_conversions {
	($($source:ty),*$(,)?) => {$(
		impl From<$source> for Child {
			fn from(child: $source) -> Self {
				Self::One(child.into())
			}
		}
	)*};
}
single_child_conversions!(VNode, VElement, &str, String, &String, f64);

impl From<Option<VNode>> for Child {
	/// `None` becomes a [`VNode::Empty`] placeholder.
	fn from(child: Option<VNode>) -> Self {
		Self::One(child.unwrap_or(VNode::Empty))
	}
}

impl From<Option<VElement>> for Child {
	fn from(child: Option<VElement>) -> Self {
		Self::One(child.map_or(VNode::Empty, VNode::Element))
	}
}

impl From<Vec<VNode>> for Child {
	fn from(children: Vec<VNode>) -> Self {
		Self::Many(children)
	}
}

impl From<Vec<VElement>> for Child {
	fn from(children: Vec<VElement>) -> Self {
		Self::Many(children.into_iter().map(VNode::Element).collect())
	}
}

/// Creates an element node.
///
/// Attributes are applied in order, so a repeated name overwrites the earlier value in place.
/// Child lists are flattened one level.
///
/// ```
/// use frond::{attrs, children, create_element, VNode};
///
/// let items = vec![VNode::from("a"), VNode::from("b")];
/// let list = create_element("ul", attrs!["class" => "list"], children![items, 3]);
/// assert_eq!(list.as_element().unwrap().children().len(), 3);
/// ```
pub fn create_element(tag: impl Into<String>, attrs: Vec<(String, AttrValue)>, children: Vec<Child>) -> VNode {
	let mut element = VElement::new(tag);
	for (name, value) in attrs {
		element.set_attr(name, value);
	}
	for child in children {
		element.push_child(child);
	}
	VNode::Element(element)
}

/// Helper for the [`attrs!`](`crate::attrs!`) macro.
pub fn attr(name: impl Into<String>, value: impl Into<AttrValue>) -> (String, AttrValue) {
	(name.into(), value.into())
}

/// Builds the attribute list for [`create_element`]: `attrs!["class" => "todo", "checked" => true]`.
#[macro_export]
macro_rules! attrs {
	($($name:expr => $value:expr),*$(,)?) => {
		vec![$($crate::vdom::attr($name, $value)),*]
	};
}

/// Builds the child list for [`create_element`], converting each argument with [`Child::from`].
#[macro_export]
macro_rules! children {
	($($child:expr),*$(,)?) => {
		vec![$($crate::vdom::Child::from($child)),*]
	};
}

/// An attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
	Str(String),
	Number(f64),
	Bool(bool),
	/// Only meaningful under an `on*` name, where it becomes an event listener.
	Handler(EventHandler),
	/// Skipped when rendering, removed when patching.
	Null,
}

impl AttrValue {
	/// Truthiness as used for the `checked` property.
	#[must_use]
	pub fn is_truthy(&self) -> bool {
		match self {
			AttrValue::Str(s) => !s.is_empty(),
			AttrValue::Number(n) => *n != 0.0 && !n.is_nan(),
			AttrValue::Bool(b) => *b,
			AttrValue::Handler(_) => true,
			AttrValue::Null => false,
		}
	}

	/// The string written by `setAttribute`, or [`None`] for [`AttrValue::Null`] and [`AttrValue::Handler`].
	#[must_use]
	pub fn to_attribute_string(&self) -> Option<String> {
		match self {
			AttrValue::Str(s) => Some(s.clone()),
			AttrValue::Number(n) => Some(format_number(*n)),
			AttrValue::Bool(b) => Some(b.to_string()),
			AttrValue::Handler(_) | AttrValue::Null => None,
		}
	}

	#[must_use]
	pub fn as_handler(&self) -> Option<&EventHandler> {
		match self {
			AttrValue::Handler(handler) => Some(handler),
			_ => None,
		}
	}
}

impl From<&str> for AttrValue {
	fn from(value: &str) -> Self {
		Self::Str(value.to_owned())
	}
}

impl From<String> for AttrValue {
	fn from(value: String) -> Self {
		Self::Str(value)
	}
}

impl From<&String> for AttrValue {
	fn from(value: &String) -> Self {
		Self::Str(value.clone())
	}
}

impl From<bool> for AttrValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<f64> for AttrValue {
	fn from(value: f64) -> Self {
		Self::Number(value)
	}
}

impl From<EventHandler> for AttrValue {
	fn from(handler: EventHandler) -> Self {
		Self::Handler(handler)
	}
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
	fn from(value: Option<T>) -> Self {
		value.map_or(Self::Null, Into::into)
	}
}

/// Formats a number the way a JavaScript host stringifies it for attributes and text.
pub(crate) fn format_number(number: f64) -> String {
	if number.is_nan() {
		"NaN".to_owned()
	} else if number.is_infinite() {
		let infinity = if number > 0.0 { "Infinity" } else { "-Infinity" };
		infinity.to_owned()
	} else if number == 0.0 {
		"0".to_owned()
	} else if number.abs() >= 1e21 || number.abs() < 1e-6 {
		// Exponent notation, with an explicit sign on positive exponents.
		let exponential = format!("{:e}", number);
		match exponential.split_once('e') {
			Some((mantissa, exponent)) if !exponent.starts_with('-') => format!("{}e+{}", mantissa, exponent),
			_ => exponential,
		}
	} else if number.fract() == 0.0 {
		format!("{:.0}", number)
	} else {
		number.to_string()
	}
}

/// A shared event callback. Two handlers are equal if they are the same allocation.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(&Event)>);

impl EventHandler {
	pub fn new(handler: impl 'static + Fn(&Event)) -> Self {
		Self(Rc::new(handler))
	}

	pub fn call(&self, event: &Event) {
		(self.0)(event);
	}

	/// Identity of the underlying allocation.
	pub(crate) fn key(&self) -> usize {
		Rc::as_ptr(&self.0).cast::<()>() as usize
	}
}

impl PartialEq for EventHandler {
	fn eq(&self, other: &Self) -> bool {
		self.key() == other.key()
	}
}
impl Eq for EventHandler {}

impl Hash for EventHandler {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.key().hash(state);
	}
}

impl Debug for EventHandler {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "EventHandler({:#x})", self.key())
	}
}

/// Host-independent view of a dispatched DOM event.
#[derive(Debug)]
pub struct Event {
	kind: String,
	key: Option<String>,
	target_value: RefCell<Option<String>>,
	value_written: Cell<bool>,
	default_prevented: Cell<bool>,
}

impl Event {
	pub fn new(kind: impl Into<String>) -> Self {
		Self {
			kind: kind.into(),
			key: None,
			target_value: RefCell::new(None),
			value_written: Cell::new(false),
			default_prevented: Cell::new(false),
		}
	}

	/// Sets the key of a keyboard event.
	#[must_use]
	pub fn with_key(mut self, key: impl Into<String>) -> Self {
		self.key = Some(key.into());
		self
	}

	/// Sets the value of the target form control as seen by handlers.
	#[must_use]
	pub fn with_target_value(self, value: impl Into<String>) -> Self {
		*self.target_value.borrow_mut() = Some(value.into());
		self
	}

	/// The event type, e.g. `"click"`.
	#[must_use]
	pub fn kind(&self) -> &str {
		&self.kind
	}

	#[must_use]
	pub fn key(&self) -> Option<&str> {
		self.key.as_deref()
	}

	#[must_use]
	pub fn target_value(&self) -> Option<String> {
		self.target_value.borrow().clone()
	}

	/// Overwrites the target's value once the handlers for this event have run.
	pub fn set_target_value(&self, value: impl Into<String>) {
		*self.target_value.borrow_mut() = Some(value.into());
		self.value_written.set(true);
	}

	pub fn prevent_default(&self) {
		self.default_prevented.set(true);
	}

	#[must_use]
	pub fn default_prevented(&self) -> bool {
		self.default_prevented.get()
	}

	pub(crate) fn fill_target_value(&self, value: Option<String>) {
		let mut target_value = self.target_value.borrow_mut();
		if target_value.is_none() {
			*target_value = value;
		}
	}

	pub(crate) fn take_written_value(&self) -> Option<String> {
		if self.value_written.replace(false) {
			self.target_value.borrow().clone()
		} else {
			None
		}
	}
}
