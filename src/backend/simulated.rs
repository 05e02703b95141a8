//! Simulated backend: in-process fixtures answering with the live result shapes.
//!
//! Every operation sleeps for the configured latency (plus up to 25% jitter) before answering so
//! loading states behave as they do against the network. Login input is validated locally; no
//! call ever leaves the process.

// std
use std::{
	sync::atomic::{AtomicU64, Ordering},
	time::Duration as StdDuration,
};
// crates.io
use rand::Rng;
// self
use crate::{
	_prelude::*,
	api::{Dashboard, Offer},
	auth::{CredentialPair, LoginRequest, LoginResponse, Role, TokenSecret, User},
	backend::{Backend, BackendFuture, BackendMode},
};

/// Password shared by every fixture account.
pub const SIMULATED_PASSWORD: &str = "password123";

#[derive(Clone, Debug)]
struct SimulatedAccount {
	user: User,
	password: String,
}

/// Backend serving fixtures from memory.
#[derive(Debug)]
pub struct SimulatedBackend {
	latency: StdDuration,
	accounts: RwLock<Vec<SimulatedAccount>>,
	offers: Vec<Offer>,
	signed_in: RwLock<Option<User>>,
	issued: AtomicU64,
}
impl SimulatedBackend {
	/// Creates a backend seeded with one account per role and a small offer catalogue.
	pub fn new(latency: StdDuration) -> Self {
		let accounts = [
			("u-1001", "Sam Shopper", "user@example.com", Role::User),
			("u-2001", "Pat Publisher", "publisher@example.com", Role::Publisher),
			("u-3001", "Rae Promoter", "promoter@example.com", Role::Promoter),
			("u-9001", "Ada Admin", "admin@example.com", Role::Admin),
		]
		.into_iter()
		.map(|(id, name, email, role)| SimulatedAccount {
			user: User { id: id.into(), name: name.into(), email: email.into(), role },
			password: SIMULATED_PASSWORD.into(),
		})
		.collect();
		let offers = [
			("o-1", "10% back on electronics", "Voltmart", 10.0),
			("o-2", "Free shipping + 4% back", "Parcelly", 4.0),
			("o-3", "Travel week: 7.5% back", "Jetaway", 7.5),
		]
		.into_iter()
		.map(|(id, title, merchant, cashback_rate)| Offer {
			id: id.into(),
			title: title.into(),
			merchant: merchant.into(),
			cashback_rate,
			active: true,
		})
		.collect();

		Self {
			latency,
			accounts: RwLock::new(accounts),
			offers,
			signed_in: RwLock::new(None),
			issued: AtomicU64::new(0),
		}
	}

	/// Profile currently signed in to the simulation.
	pub fn signed_in(&self) -> Option<User> {
		self.signed_in.read().clone()
	}

	async fn pause(&self) {
		let delay = self.next_delay();

		if !delay.is_zero() {
			tokio::time::sleep(delay).await;
		}
	}

	fn next_delay(&self) -> StdDuration {
		let base = u64::try_from(self.latency.as_millis()).unwrap_or(u64::MAX);

		if base == 0 {
			return StdDuration::ZERO;
		}

		let jitter = rand::rng().random_range(0..=base / 4);

		StdDuration::from_millis(base.saturating_add(jitter))
	}

	fn require_user(&self) -> Result<User> {
		self.signed_in.read().clone().ok_or(Error::SessionExpired)
	}

	fn authenticate(&self, credentials: &LoginRequest) -> Result<LoginResponse> {
		credentials.validate().map_err(|message| Error::Validation { message })?;

		let email = credentials.email.trim();
		let user = self
			.accounts
			.read()
			.iter()
			.find(|account| {
				account.user.email.eq_ignore_ascii_case(email)
					&& account.password == credentials.password
			})
			.map(|account| account.user.clone())
			.ok_or_else(|| Error::Api {
				status: 401,
				message: Some("Invalid email or password.".into()),
			})?;
		let serial = self.issued.fetch_add(1, Ordering::Relaxed) + 1;
		let credentials = CredentialPair::new(
			format!("sim-access-{}-{serial}", user.id),
			format!("sim-refresh-{}-{serial}", user.id),
		);

		*self.signed_in.write() = Some(user.clone());

		Ok(LoginResponse { user, credentials })
	}

	fn dashboard_for(&self, role: Role) -> Result<Dashboard> {
		let user = self.require_user()?;

		if user.role != role && user.role != Role::Admin {
			return Err(Error::Api {
				status: 403,
				message: Some("You do not have access to this dashboard.".into()),
			});
		}

		let (balance, pending, clicks, conversions) = match role {
			Role::User => (42.5, 12.75, 38, 6),
			Role::Publisher => (1_280.0, 310.4, 9_412, 221),
			Role::Promoter => (615.2, 88.0, 3_105, 97),
			Role::Admin => (25_400.0, 4_120.9, 128_004, 3_870),
		};

		Ok(Dashboard { role, balance, pending, clicks, conversions })
	}
}
impl Default for SimulatedBackend {
	fn default() -> Self {
		Self::new(StdDuration::from_millis(500))
	}
}
impl Backend for SimulatedBackend {
	fn mode(&self) -> BackendMode {
		BackendMode::Simulated
	}

	fn login<'a>(&'a self, credentials: &'a LoginRequest) -> BackendFuture<'a, LoginResponse> {
		Box::pin(async move {
			self.pause().await;
			self.authenticate(credentials)
		})
	}

	fn logout<'a>(&'a self, _: Option<&'a TokenSecret>) -> BackendFuture<'a, ()> {
		Box::pin(async move {
			self.pause().await;
			self.signed_in.write().take();

			Ok(())
		})
	}

	fn current_user(&self) -> BackendFuture<'_, User> {
		Box::pin(async move {
			self.pause().await;
			self.require_user()
		})
	}

	fn dashboard(&self, role: Role) -> BackendFuture<'_, Dashboard> {
		Box::pin(async move {
			self.pause().await;
			self.dashboard_for(role)
		})
	}

	fn list_offers(&self) -> BackendFuture<'_, Vec<Offer>> {
		Box::pin(async move {
			self.pause().await;

			Ok(self.offers.iter().filter(|offer| offer.active).cloned().collect())
		})
	}

	fn delete_account(&self) -> BackendFuture<'_, ()> {
		Box::pin(async move {
			self.pause().await;

			let user = self.require_user()?;

			self.accounts.write().retain(|account| account.user.id != user.id);
			self.signed_in.write().take();

			Ok(())
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn backend() -> SimulatedBackend {
		SimulatedBackend::new(StdDuration::ZERO)
	}

	#[tokio::test]
	async fn short_password_is_rejected_locally() {
		let err = backend()
			.login(&LoginRequest::new("bad@x.com", "short"))
			.await
			.expect_err("A short password should fail validation.");

		assert!(
			matches!(err, Error::Validation { ref message } if message == "Password must be at least 8 characters.")
		);
	}

	#[tokio::test]
	async fn fixture_login_issues_distinct_pairs() {
		let backend = backend();
		let first = backend
			.login(&LoginRequest::new("Publisher@Example.com", SIMULATED_PASSWORD))
			.await
			.expect("Fixture login should succeed.");
		let second = backend
			.login(&LoginRequest::new("publisher@example.com", SIMULATED_PASSWORD))
			.await
			.expect("Repeated fixture login should succeed.");

		assert_eq!(first.user.role, Role::Publisher);
		assert_ne!(first.credentials, second.credentials);
		assert_eq!(backend.signed_in().map(|user| user.id), Some("u-2001".into()));
	}

	#[tokio::test]
	async fn wrong_password_mirrors_live_rejection() {
		let err = backend()
			.login(&LoginRequest::new("user@example.com", "not-the-password"))
			.await
			.expect_err("A wrong password should be rejected.");

		assert!(matches!(err, Error::Api { status: 401, .. }));
		assert_eq!(err.user_message(), "Invalid email or password.");
	}

	#[tokio::test]
	async fn dashboards_respect_roles() {
		let backend = backend();

		assert!(backend.dashboard(Role::User).await.unwrap_err().is_session_expired());

		backend
			.login(&LoginRequest::new("promoter@example.com", SIMULATED_PASSWORD))
			.await
			.expect("Fixture login should succeed.");

		let own = backend.dashboard(Role::Promoter).await.expect("Own dashboard should load.");
		let other = backend
			.dashboard(Role::Publisher)
			.await
			.expect_err("Another role's dashboard should be forbidden.");

		assert_eq!(own.role, Role::Promoter);
		assert_eq!(other.status(), Some(403));
	}

	#[tokio::test]
	async fn delete_account_removes_fixture() {
		let backend = backend();
		let request = LoginRequest::new("user@example.com", SIMULATED_PASSWORD);

		backend.login(&request).await.expect("Fixture login should succeed.");
		backend.delete_account().await.expect("Deleting the signed-in account should succeed.");

		assert!(backend.signed_in().is_none());
		assert!(matches!(
			backend.login(&request).await,
			Err(Error::Api { status: 401, .. })
		));
	}

	#[tokio::test(start_paused = true)]
	async fn latency_delays_answers() {
		let backend = SimulatedBackend::new(StdDuration::from_millis(400));
		let started = tokio::time::Instant::now();
		let offers = backend.list_offers().await.expect("Offer fixtures should load.");

		assert_eq!(offers.len(), 3);
		assert!(started.elapsed() >= StdDuration::from_millis(400));
		assert!(started.elapsed() <= StdDuration::from_millis(500));
	}
}
