//! Signs in against the simulated backend, browses offers and the role dashboard, then signs out
//! without any API server running.

// std
use std::{sync::Arc, time::Duration};
// crates.io
use color_eyre::Result;
// self
use cashback_session::{
	api::ApiClient,
	auth::{LoginRequest, Role},
	backend::{BackendMode, simulated::SIMULATED_PASSWORD},
	config::ClientConfig,
	notify::TracingSurface,
	store::MemoryStore,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let config = ClientConfig::builder()
		.mode(BackendMode::Simulated)
		.simulated_latency(Duration::from_millis(150))
		.build()?;
	let session = Arc::new(config.session(Arc::new(MemoryStore::default())));
	let api = ApiClient::from_config(&config, session, Arc::new(TracingSurface))?;
	let user = api.login(&LoginRequest::new("promoter@example.com", SIMULATED_PASSWORD)).await?;

	println!("Signed in as {} ({}).", user.name, user.role);

	for offer in api.list_offers().await? {
		println!("{:>5.1}% back at {}: {}", offer.cashback_rate, offer.merchant, offer.title);
	}

	let dashboard = api.dashboard(Role::Promoter).await?;

	println!(
		"Balance {:.2}, pending {:.2}, {} clicks, {} conversions.",
		dashboard.balance, dashboard.pending, dashboard.clicks, dashboard.conversions
	);

	api.logout().await?;

	println!("Signed out; authenticated: {}.", api.is_authenticated());

	Ok(())
}
