//! Provider descriptor data structures shared by the engine and strategies.
//!
//! A descriptor is immutable configuration: the authority the endpoints hang off,
//! the endpoint paths, enabled grants, client authentication preference, and quirks.

/// Builder API for assembling provider descriptors.
pub mod builder;
/// Grant helpers wired into provider descriptors.
pub mod grant;
/// Provider-specific quirk toggles.
pub mod quirks;

pub use builder::*;
pub use grant::*;
pub use quirks::*;

// self
use crate::{_prelude::*, auth::ProviderId, error::ConfigError};

/// Preferred client authentication modes for token endpoint calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	#[default]
	/// HTTP Basic with `client_id`/`client_secret`.
	ClientSecretBasic,
	/// Form POST body parameters for `client_id`/`client_secret`.
	ClientSecretPost,
	/// Public clients; only `client_id` is sent.
	#[serde(rename = "none")]
	Public,
}

/// Immutable provider descriptor consumed by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Descriptor identifier.
	pub id: ProviderId,
	/// Default authority (issuer base) the endpoint paths are appended to.
	pub authority: Url,
	/// Path of the authorization endpoint relative to the authority.
	pub authorization_path: String,
	/// Path of the token endpoint relative to the authority.
	pub token_path: String,
	/// Supported grant flags.
	#[serde(default)]
	pub supported_grants: SupportedGrants,
	/// Preferred client authentication mechanism.
	#[serde(default)]
	pub preferred_client_auth_method: ClientAuthMethod,
	/// Provider-specific quirks.
	#[serde(default)]
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptor {
	/// Creates a new builder for the provided identifier.
	pub fn builder(id: ProviderId) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(id)
	}

	/// Checks whether the descriptor supports a given grant.
	pub fn supports(&self, grant: &GrantType) -> bool {
		self.supported_grants.supports(grant)
	}

	/// Authorization endpoint under `authority`, or under the descriptor's own authority.
	pub fn authorization_endpoint(&self, authority: Option<&Url>) -> Result<Url, ConfigError> {
		append_path(authority.unwrap_or(&self.authority), &self.authorization_path)
	}

	/// Token endpoint under `authority`, or under the descriptor's own authority.
	pub fn token_endpoint(&self, authority: Option<&Url>) -> Result<Url, ConfigError> {
		append_path(authority.unwrap_or(&self.authority), &self.token_path)
	}
}

/// Appends `path` to the authority's path instead of resolving it relatively, so
/// `https://host/tenant` + `oauth2/token` keeps the tenant segment.
pub(crate) fn append_path(authority: &Url, path: &str) -> Result<Url, ConfigError> {
	let mut url = authority.clone();

	url.set_query(None);
	url.set_fragment(None);

	{
		let mut segments = url
			.path_segments_mut()
			.map_err(|_| ConfigError::InvalidEndpoint { authority: authority.to_string() })?;

		segments.pop_if_empty();
		segments.extend(path.split('/').filter(|segment| !segment.is_empty()));
	}

	Ok(url)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Test URL should parse.")
	}

	#[test]
	fn append_path_keeps_tenant_segments() {
		let joined = append_path(&url("https://login.example.com/contoso"), "oauth2/v2.0/token")
			.expect("Authority should accept paths.");

		assert_eq!(joined.as_str(), "https://login.example.com/contoso/oauth2/v2.0/token");

		let joined = append_path(&url("https://login.example.com/contoso/"), "/authorize")
			.expect("Trailing slashes should collapse.");

		assert_eq!(joined.as_str(), "https://login.example.com/contoso/authorize");

		let joined = append_path(&url("https://login.example.com"), "authorize")
			.expect("Bare hosts should accept paths.");

		assert_eq!(joined.as_str(), "https://login.example.com/authorize");
	}

	#[test]
	fn append_path_rejects_opaque_authorities() {
		let err = append_path(&url("mailto:someone@example.com"), "token")
			.expect_err("Opaque URLs cannot carry endpoint paths.");

		assert!(matches!(err, ConfigError::InvalidEndpoint { .. }));
	}
}
