use core::fmt::{self, Debug, Formatter};

/// Formats page content for log output.
///
/// Without the `dangerous-logging` feature, only the length is written.
pub(crate) struct Redacted<'a>(pub &'a str);

impl Debug for Redacted<'_> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		if cfg!(feature = "dangerous-logging") {
			Debug::fmt(self.0, f)
		} else {
			write!(f, "<{} byte(s)>", self.0.len())
		}
	}
}
