//! Identity payloads exchanged with the login endpoint, plus local login validation.

// self
use crate::{_prelude::*, auth::credential::CredentialPair};

const MIN_PASSWORD_LEN: usize = 8;

/// Account role; each role owns a dedicated dashboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	/// Shopper earning cashback.
	User,
	/// Publisher listing ads and offers.
	Publisher,
	/// Promoter sharing affiliate links.
	Promoter,
	/// Platform administrator.
	Admin,
}
impl Role {
	/// Returns the stable label used in API paths.
	pub const fn as_str(self) -> &'static str {
		match self {
			Role::User => "user",
			Role::Publisher => "publisher",
			Role::Promoter => "promoter",
			Role::Admin => "admin",
		}
	}
}
impl Display for Role {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Authenticated account profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	/// Account identifier.
	pub id: String,
	/// Display name.
	pub name: String,
	/// Login email.
	pub email: String,
	/// Account role.
	pub role: Role,
}

/// Login form payload.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
	/// Login email.
	pub email: String,
	/// Plain-text password; never logged.
	pub password: String,
}
impl LoginRequest {
	/// Creates a login payload.
	pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
		Self { email: email.into(), password: password.into() }
	}

	/// Checks the form locally, returning the first human-readable problem found.
	pub fn validate(&self) -> Result<(), String> {
		let email = self.email.trim();

		if email.is_empty() {
			return Err("Email is required.".into());
		}
		if !is_plausible_email(email) {
			return Err("Enter a valid email address.".into());
		}
		if self.password.is_empty() {
			return Err("Password is required.".into());
		}
		if self.password.chars().count() < MIN_PASSWORD_LEN {
			return Err(format!("Password must be at least {MIN_PASSWORD_LEN} characters."));
		}

		Ok(())
	}
}
impl Debug for LoginRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LoginRequest")
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.finish()
	}
}

/// Login endpoint response: the profile plus a fresh credential pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
	/// Signed-in profile.
	pub user: User,
	/// Issued credentials.
	#[serde(flatten)]
	pub credentials: CredentialPair,
}

fn is_plausible_email(email: &str) -> bool {
	let Some((local, domain)) = email.split_once('@') else {
		return false;
	};

	!local.is_empty()
		&& !domain.contains('@')
		&& domain.split('.').count() >= 2
		&& domain.split('.').all(|label| !label.is_empty())
		&& !email.chars().any(char::is_whitespace)
}
