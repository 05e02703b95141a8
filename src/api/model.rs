//! Thin domain payloads returned by the dashboard and offer endpoints.

// self
use crate::{_prelude::*, auth::Role};

/// Headline figures for one role dashboard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
	/// Role the figures belong to.
	pub role: Role,
	/// Withdrawable wallet balance.
	pub balance: f64,
	/// Cashback or commission still awaiting confirmation.
	pub pending: f64,
	/// Tracked clicks over the reporting window.
	pub clicks: u64,
	/// Confirmed conversions over the reporting window.
	pub conversions: u64,
}

/// Cashback offer published by a merchant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
	/// Offer identifier.
	pub id: String,
	/// Headline shown on the offer card.
	pub title: String,
	/// Merchant name.
	pub merchant: String,
	/// Cashback percentage paid on qualifying purchases.
	pub cashback_rate: f64,
	/// Whether the offer currently accepts clicks.
	#[serde(default = "default_active")]
	pub active: bool,
}

fn default_active() -> bool {
	true
}
