//! Error surface: structured failure events handed to a presentation layer.
//!
//! The transport and session client never notify anyone; they return errors. The API facade
//! publishes exactly one [`FailureEvent`] per failed logical call through an [`ErrorSurface`],
//! and the host decides whether that becomes a toast, a redirect, or a log line.

// self
use crate::_prelude::*;

/// Failure classes a presentation layer reacts to differently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
	/// No response was received.
	Transport,
	/// Credentials were cleared; the user must sign in again.
	SessionExpired,
	/// The server rejected the call.
	Api,
	/// Input was rejected locally.
	Validation,
	/// Configuration, storage, or decoding problem inside the client.
	Internal,
}
impl FailureKind {
	/// Returns a stable label suitable for log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FailureKind::Transport => "transport",
			FailureKind::SessionExpired => "session_expired",
			FailureKind::Api => "api",
			FailureKind::Validation => "validation",
			FailureKind::Internal => "internal",
		}
	}
}
impl From<&Error> for FailureKind {
	fn from(error: &Error) -> Self {
		match error {
			Error::Transport(_) => FailureKind::Transport,
			Error::SessionExpired => FailureKind::SessionExpired,
			Error::Api { .. } => FailureKind::Api,
			Error::Validation { .. } => FailureKind::Validation,
			Error::Storage(_) | Error::Config(_) | Error::Decode { .. } => FailureKind::Internal,
		}
	}
}

/// One user-visible failure notification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FailureEvent {
	/// Logical operation that failed (e.g. `login`, `list_offers`).
	pub operation: &'static str,
	/// Failure class.
	pub kind: FailureKind,
	/// HTTP status, when a response was received.
	pub status: Option<u16>,
	/// Message to show: the server's text when present, otherwise a generic one.
	pub message: String,
}
impl FailureEvent {
	/// Normalizes `error` raised by `operation` into an event.
	pub fn from_error(operation: &'static str, error: &Error) -> Self {
		Self {
			operation,
			kind: FailureKind::from(error),
			status: error.status(),
			message: error.user_message(),
		}
	}
}

/// Sink for failure events.
pub trait ErrorSurface
where
	Self: Send + Sync,
{
	/// Receives one event per failed logical call.
	fn publish(&self, event: &FailureEvent);
}

/// Surface that logs events through `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSurface;
impl ErrorSurface for TracingSurface {
	fn publish(&self, event: &FailureEvent) {
		tracing::warn!(
			operation = event.operation,
			kind = event.kind.as_str(),
			status = event.status,
			message = %event.message,
			"api call failed"
		);
	}
}

/// Surface that keeps every event in memory, for headless hosts and tests.
#[derive(Debug, Default)]
pub struct RecordingSurface(Mutex<Vec<FailureEvent>>);
impl RecordingSurface {
	/// Returns a copy of the events published so far.
	pub fn events(&self) -> Vec<FailureEvent> {
		self.0.lock().clone()
	}

	/// Removes and returns the events published so far.
	pub fn drain(&self) -> Vec<FailureEvent> {
		std::mem::take(&mut *self.0.lock())
	}
}
impl ErrorSurface for RecordingSurface {
	fn publish(&self, event: &FailureEvent) {
		self.0.lock().push(event.clone());
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::{GENERIC_FAILURE_MESSAGE, SESSION_EXPIRED_MESSAGE};

	#[test]
	fn events_normalize_messages() {
		let api = FailureEvent::from_error(
			"list_offers",
			&Error::Api { status: 403, message: Some("Admins only".into()) },
		);
		let bare = FailureEvent::from_error("dashboard", &Error::Api { status: 500, message: None });
		let expired = FailureEvent::from_error("current_user", &Error::SessionExpired);

		assert_eq!(api.kind, FailureKind::Api);
		assert_eq!(api.status, Some(403));
		assert_eq!(api.message, "Admins only");
		assert_eq!(bare.message, GENERIC_FAILURE_MESSAGE);
		assert_eq!(expired.kind, FailureKind::SessionExpired);
		assert_eq!(expired.message, SESSION_EXPIRED_MESSAGE);
	}

	#[test]
	fn recording_surface_drains() {
		let surface = RecordingSurface::default();
		let event = FailureEvent::from_error("login", &Error::Validation { message: "x".into() });

		surface.publish(&event);

		assert_eq!(surface.events(), vec![event.clone()]);
		assert_eq!(surface.drain(), vec![event]);
		assert!(surface.events().is_empty());
	}
}
