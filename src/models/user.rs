use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// KYC verification state attached to an account by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KycStatus {
    /// No verification has been started.
    #[default]
    Unset,
    /// Documents submitted, verification in progress.
    Pending,
    /// Identity verified.
    Verified,
    /// Verification rejected.
    Rejected,
}

/// Represents an account holder as returned by the auth backend.
///
/// Replaced wholesale on every successful auth response; never mutated
/// field-by-field on this side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The unique identifier for the user.
    pub id: Uuid,
    /// The user's email address.
    pub email: String,
    /// The user's first name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// The user's last name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// The user's KYC verification state.
    #[serde(default)]
    pub kyc_status: KycStatus,
}
