use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A wallet record owned by an account, as returned by the wallet service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    /// The unique identifier for the wallet.
    pub wallet_id: Uuid,
    /// The account the wallet belongs to.
    pub account_id: Uuid,
    /// Wallet type, e.g. "checking" or "savings".
    #[serde(rename = "type")]
    pub wallet_type: String,
    /// Current balance in the wallet's currency.
    pub balance: f64,
    /// ISO currency code.
    pub currency: String,
    /// Wallet status, e.g. "active" or "frozen".
    pub status: String,
    /// Whether this is the account's default wallet.
    pub is_default: bool,
    /// Daily spending limit.
    pub daily_limit: f64,
    /// Monthly spending limit.
    pub monthly_limit: f64,
    /// Timestamp of the last activity on the wallet, if any.
    #[serde(default)]
    pub last_activity: Option<DateTime<Utc>>,
    /// The timestamp when the wallet was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the wallet was last updated.
    pub updated_at: DateTime<Utc>,
}
