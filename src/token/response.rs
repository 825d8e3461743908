//! Raw token endpoint payloads.

// crates.io
use serde::{Deserializer, de::Error as DeError};
use serde_json::Value;
// self
use crate::{_prelude::*, auth::TokenSecret};

/// Decoded successful token endpoint payload.
///
/// Unknown top-level members are kept in [`extra`](Self::extra) without validation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
	/// Issued access token.
	#[serde(default)]
	pub access_token: Option<TokenSecret>,
	/// Issued refresh token, if any.
	#[serde(default)]
	pub refresh_token: Option<TokenSecret>,
	/// OIDC ID token, if any.
	#[serde(default)]
	pub id_token: Option<TokenSecret>,
	/// Token type (usually `Bearer`).
	#[serde(default)]
	pub token_type: Option<String>,
	/// Lifetime of the access token in seconds.
	#[serde(default, deserialize_with = "de_seconds")]
	pub expires_in: Option<u64>,
	/// Granted scopes, provider-delimited.
	#[serde(default)]
	pub scope: Option<String>,
	/// Every other member of the payload.
	#[serde(flatten)]
	pub extra: BTreeMap<String, Value>,
}
impl TokenResponse {
	/// Returns a string member from the extra members.
	pub fn extra_str(&self, key: &str) -> Option<&str> {
		self.extra.get(key).and_then(Value::as_str)
	}
}

/// RFC 6749 §5.2 error payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenErrorResponse {
	/// OAuth error code (e.g., `invalid_grant`).
	pub error: String,
	/// Human-readable description.
	#[serde(default)]
	pub error_description: Option<String>,
	/// Link to documentation about the error.
	#[serde(default)]
	pub error_uri: Option<String>,
	/// Every other member of the payload.
	#[serde(flatten)]
	pub extra: BTreeMap<String, Value>,
}

// Some providers send `expires_in` as a JSON string.
fn de_seconds<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Seconds {
		Number(u64),
		Text(String),
	}

	match Option::<Seconds>::deserialize(deserializer)? {
		None => Ok(None),
		Some(Seconds::Number(value)) => Ok(Some(value)),
		Some(Seconds::Text(value)) => value.trim().parse().map(Some).map_err(DeError::custom),
	}
}
