//! Credential pair, per-token lifetimes, and the persisted credential snapshot.

// self
use crate::{_prelude::*, auth::secret::TokenSecret, error::ConfigError};

/// Access/refresh credential pair issued by the login and refresh endpoints.
///
/// Deserializes directly from the `{ "accessToken", "refreshToken" }` wire shape.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPair {
	/// Short-lived credential sent with each authenticated request.
	pub access_token: TokenSecret,
	/// Longer-lived credential exchanged for a new pair.
	pub refresh_token: TokenSecret,
}
impl CredentialPair {
	/// Builds a pair from raw token strings.
	pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
		Self { access_token: TokenSecret::new(access), refresh_token: TokenSecret::new(refresh) }
	}
}
impl Debug for CredentialPair {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialPair")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &"<redacted>")
			.finish()
	}
}

/// Independent validity windows applied when a pair is stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CredentialLifetimes {
	/// Lifetime of the stored access token.
	pub access: Duration,
	/// Lifetime of the stored refresh token.
	pub refresh: Duration,
}
impl CredentialLifetimes {
	/// Default access token lifetime (7 days).
	pub const DEFAULT_ACCESS: Duration = Duration::days(7);
	/// Default refresh token lifetime (30 days).
	pub const DEFAULT_REFRESH: Duration = Duration::days(30);

	/// Creates validated lifetimes.
	pub fn new(access: Duration, refresh: Duration) -> Result<Self, ConfigError> {
		if !access.is_positive() {
			return Err(ConfigError::NonPositiveLifetime { token: "access" });
		}
		if !refresh.is_positive() {
			return Err(ConfigError::NonPositiveLifetime { token: "refresh" });
		}

		Ok(Self { access, refresh })
	}
}
impl Default for CredentialLifetimes {
	fn default() -> Self {
		Self { access: Self::DEFAULT_ACCESS, refresh: Self::DEFAULT_REFRESH }
	}
}

/// A single persisted token with its own expiry instant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
	/// Token secret.
	pub secret: TokenSecret,
	/// Instant after which the slot reads as absent.
	#[serde(with = "time::serde::rfc3339")]
	pub expires_at: OffsetDateTime,
}
impl StoredToken {
	/// Returns the secret when the token is still valid at `instant`.
	pub fn valid_at(&self, instant: OffsetDateTime) -> Option<&TokenSecret> {
		(instant < self.expires_at).then_some(&self.secret)
	}
}

/// Snapshot persisted by credential stores; either slot may be absent independently.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
	/// Access token slot.
	pub access: Option<StoredToken>,
	/// Refresh token slot.
	pub refresh: Option<StoredToken>,
}
impl StoredCredentials {
	/// Stamps a freshly issued pair with expiries derived from `lifetimes`.
	pub fn issue(pair: CredentialPair, lifetimes: CredentialLifetimes, now: OffsetDateTime) -> Self {
		Self {
			access: Some(StoredToken {
				secret: pair.access_token,
				expires_at: now + lifetimes.access,
			}),
			refresh: Some(StoredToken {
				secret: pair.refresh_token,
				expires_at: now + lifetimes.refresh,
			}),
		}
	}

	/// Access token still valid at `instant`.
	pub fn access_at(&self, instant: OffsetDateTime) -> Option<&TokenSecret> {
		self.access.as_ref().and_then(|token| token.valid_at(instant))
	}

	/// Refresh token still valid at `instant`.
	pub fn refresh_at(&self, instant: OffsetDateTime) -> Option<&TokenSecret> {
		self.refresh.as_ref().and_then(|token| token.valid_at(instant))
	}

	/// Full pair, only when both tokens are valid at `instant`.
	pub fn pair_at(&self, instant: OffsetDateTime) -> Option<CredentialPair> {
		Some(CredentialPair {
			access_token: self.access_at(instant)?.clone(),
			refresh_token: self.refresh_at(instant)?.clone(),
		})
	}

	/// Returns `true` when neither slot holds a token.
	pub fn is_empty(&self) -> bool {
		self.access.is_none() && self.refresh.is_none()
	}
}
