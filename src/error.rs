//! Client-level error types shared across the session, transport, and backends.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Message surfaced when a failure carries no server-provided text.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";
/// Message surfaced for failures where no response was received.
pub const GENERIC_TRANSPORT_MESSAGE: &str =
	"Unable to reach the server. Check your connection and try again.";
/// Message surfaced when the session can no longer be recovered locally.
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Credential storage failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// No response was received (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Credentials are missing or the refresh flow failed; the caller must sign in again.
	#[error("Session expired; re-authentication is required.")]
	SessionExpired,
	/// The server answered with a non-success status.
	#[error("Request failed with status {status}{}.", message_suffix(.message))]
	Api {
		/// HTTP status code returned by the server.
		status: u16,
		/// Server-supplied message, when the payload carried one.
		message: Option<String>,
	},
	/// Input was rejected locally before any request was issued.
	#[error("Validation failed: {message}")]
	Validation {
		/// Human-readable validation message.
		message: String,
	},
	/// A success response could not be decoded into the expected shape.
	#[error("Response body could not be decoded.")]
	Decode {
		/// HTTP status code of the undecodable response.
		status: u16,
		/// Structured parsing failure including the JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl Error {
	/// Returns the message a presentation layer should show for this failure.
	///
	/// Server-supplied messages are forwarded verbatim; everything else maps onto a generic text.
	pub fn user_message(&self) -> String {
		match self {
			Self::Api { message: Some(message), .. } => message.clone(),
			Self::Validation { message } => message.clone(),
			Self::Transport(_) => GENERIC_TRANSPORT_MESSAGE.into(),
			Self::SessionExpired => SESSION_EXPIRED_MESSAGE.into(),
			_ => GENERIC_FAILURE_MESSAGE.into(),
		}
	}

	/// HTTP status associated with the failure, when one was received.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Api { status, .. } | Self::Decode { status, .. } => Some(*status),
			_ => None,
		}
	}

	/// Returns `true` when the caller must route the user back to authentication.
	pub fn is_session_expired(&self) -> bool {
		matches!(self, Self::SessionExpired)
	}
}

fn message_suffix(message: &Option<String>) -> String {
	message.as_deref().map(|m| format!(": {}", m.trim_end_matches('.'))).unwrap_or_default()
}

/// Configuration and validation failures raised while wiring the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL or request path cannot be parsed.
	#[error("URL `{value}` is invalid.")]
	InvalidUrl {
		/// Offending input.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL cannot carry relative paths (e.g. `mailto:`).
	#[error("Base URL `{value}` cannot be used as a base for API paths.")]
	CannotBeBase {
		/// Offending input.
		value: String,
	},
	/// Request path carries a query or fragment.
	#[error("Request path `{path}` must not contain `?` or `#`; use query pairs instead.")]
	InvalidPath {
		/// Offending path.
		path: String,
	},
	/// Backend mode string is not recognized.
	#[error("Backend mode `{value}` is not recognized; expected `live` or `simulated`.")]
	InvalidMode {
		/// Offending input.
		value: String,
	},
	/// Environment value cannot be parsed.
	#[error("Environment variable {name} has an invalid value `{value}`.")]
	InvalidEnv {
		/// Variable name.
		name: &'static str,
		/// Offending value.
		value: String,
	},
	/// Request body could not be serialized.
	#[error("Request body could not be serialized.")]
	Encode(#[from] serde_json::Error),
	/// Builder is missing a required field.
	#[error("Client configuration is missing the {field}.")]
	Missing {
		/// Missing field label.
		field: &'static str,
	},
	/// Request timeout must be non-zero.
	#[error("Request timeout must be greater than zero.")]
	ZeroTimeout,
	/// Credential lifetimes must be positive.
	#[error("The {token} token lifetime must be positive.")]
	NonPositiveLifetime {
		/// Token label.
		token: &'static str,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures where no HTTP response was received.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// The backend refused the connection or is unreachable.
	#[error("Could not connect to the API backend.")]
	Connect {
		/// Transport-specific connect error.
		#[source]
		source: BoxError,
	},
	/// The request exceeded the configured timeout.
	#[error("Request to the API backend timed out.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Any other network failure.
	#[error("Network error occurred while calling the API backend.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API backend.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a connection failure.
	pub fn connect(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Connect { source: Box::new(src) }
	}

	/// Wraps a timeout failure.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}

	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Returns `true` when the backend could not be reached at all.
	pub fn is_unreachable(&self) -> bool {
		matches!(self, Self::Connect { .. })
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_connect() {
			Self::connect(e)
		} else if e.is_timeout() {
			Self::timeout(e)
		} else {
			Self::network(e)
		}
	}
}
