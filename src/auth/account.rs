//! Provider-normalized accounts and ID-token payload decoding.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde_json::Value;
// self
use crate::{_prelude::*, auth::TenantId};

/// Errors raised while deriving an [`Account`] from a token response.
#[derive(Debug, ThisError)]
pub enum AccountError {
	/// The ID token is not a three-segment compact JWT.
	#[error("ID token is not a compact JWT.")]
	MalformedIdToken,
	/// The ID token payload is not valid base64url.
	#[error("ID token payload is not valid base64url.")]
	PayloadEncoding(#[from] base64::DecodeError),
	/// The ID token payload is not a JSON claim set.
	#[error("ID token payload is not a valid claim set.")]
	PayloadJson(#[from] serde_path_to_error::Error<serde_json::Error>),
	/// A claim required to identify the account is missing.
	#[error("ID token is missing the `{claim}` claim.")]
	MissingClaim {
		/// Claim name.
		claim: &'static str,
	},
}

/// Decoded (unverified) ID-token claim set.
///
/// Signature is not verified; only the payload segment is decoded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IdTokenClaims {
	/// Issuer identifier.
	#[serde(default)]
	pub iss: Option<String>,
	/// Subject identifier.
	#[serde(default)]
	pub sub: Option<String>,
	/// Display name.
	#[serde(default)]
	pub name: Option<String>,
	/// Preferred username.
	#[serde(default)]
	pub preferred_username: Option<String>,
	/// Email address.
	#[serde(default)]
	pub email: Option<String>,
	/// Every other claim, preserved as-is.
	#[serde(flatten)]
	pub extra: BTreeMap<String, Value>,
}
impl IdTokenClaims {
	/// Decodes the payload segment of a compact JWT.
	pub fn decode(id_token: &str) -> Result<Self, AccountError> {
		let mut segments = id_token.split('.');
		let (Some(_header), Some(payload), Some(_signature), None) =
			(segments.next(), segments.next(), segments.next(), segments.next())
		else {
			return Err(AccountError::MalformedIdToken);
		};
		let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
		let de = &mut serde_json::Deserializer::from_slice(&bytes);

		Ok(serde_path_to_error::deserialize(de)?)
	}

	/// Returns a string claim from the extra claim set.
	pub fn extra_str(&self, claim: &str) -> Option<&str> {
		self.extra.get(claim).and_then(Value::as_str)
	}
}

/// Provider-normalized identity owned by the token result that produced it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
	/// Unique, provider-scoped identifier (e.g., `sub` or `oid`).
	pub id: String,
	/// Sign-in name, when the provider reports one.
	pub username: Option<String>,
	/// Human-readable display name.
	pub display_name: Option<String>,
	/// Issuer / authority that minted the identity.
	pub issuer: Option<String>,
	/// Directory identifier for multi-tenant providers.
	pub tenant_id: Option<TenantId>,
	/// Full claim set the account was derived from.
	pub claims: BTreeMap<String, Value>,
}
impl Account {
	/// Builds an account from standard OIDC claims (`sub`, `name`, `preferred_username`).
	pub fn from_oidc_claims(claims: IdTokenClaims) -> Result<Self, AccountError> {
		let id = claims.sub.clone().ok_or(AccountError::MissingClaim { claim: "sub" })?;
		let username = claims.preferred_username.clone().or_else(|| claims.email.clone());

		Ok(Self {
			id,
			username,
			display_name: claims.name.clone(),
			issuer: claims.iss.clone(),
			tenant_id: None,
			claims: claim_map(claims),
		})
	}
}

/// Flattens decoded claims back into one map for [`Account::claims`].
pub(crate) fn claim_map(claims: IdTokenClaims) -> BTreeMap<String, Value> {
	let IdTokenClaims { iss, sub, name, preferred_username, email, mut extra } = claims;

	for (key, value) in [
		("iss", iss),
		("sub", sub),
		("name", name),
		("preferred_username", preferred_username),
		("email", email),
	] {
		if let Some(value) = value {
			extra.insert(key.into(), Value::String(value));
		}
	}

	extra
}

#[cfg(test)]
pub(crate) mod tests {
	// self
	use super::*;

	pub(crate) fn encode_id_token(claims: &Value) -> String {
		let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
		let payload = URL_SAFE_NO_PAD.encode(claims.to_string());

		format!("{header}.{payload}.signature")
	}

	#[test]
	fn decodes_standard_and_extra_claims() {
		let token = encode_id_token(&serde_json::json!({
			"iss": "https://issuer.example.com",
			"sub": "subject-1",
			"name": "Ada",
			"nonce": "n-1",
		}));
		let claims = IdTokenClaims::decode(&token).expect("ID token fixture should decode.");

		assert_eq!(claims.sub.as_deref(), Some("subject-1"));
		assert_eq!(claims.extra_str("nonce"), Some("n-1"));

		let account = Account::from_oidc_claims(claims).expect("Account should derive.");

		assert_eq!(account.id, "subject-1");
		assert_eq!(account.display_name.as_deref(), Some("Ada"));
		assert_eq!(account.issuer.as_deref(), Some("https://issuer.example.com"));
		assert_eq!(account.claims.get("nonce"), Some(&Value::from("n-1")));
		assert_eq!(account.claims.get("sub"), Some(&Value::from("subject-1")));
	}

	#[test]
	fn rejects_malformed_tokens() {
		assert!(matches!(IdTokenClaims::decode("not-a-jwt"), Err(AccountError::MalformedIdToken)));
		assert!(matches!(IdTokenClaims::decode("a.b.c.d"), Err(AccountError::MalformedIdToken)));
		assert!(matches!(IdTokenClaims::decode("a.!!!.c"), Err(AccountError::PayloadEncoding(_))));

		let no_subject = encode_id_token(&serde_json::json!({ "name": "anonymous" }));
		let claims = IdTokenClaims::decode(&no_subject).expect("Payload should still decode.");

		assert!(matches!(
			Account::from_oidc_claims(claims),
			Err(AccountError::MissingClaim { claim: "sub" })
		));
	}
}
