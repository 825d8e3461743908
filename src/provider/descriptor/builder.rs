// std
use std::iter::IntoIterator;
// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	provider::{
		ClientAuthMethod, GrantType, ProviderDescriptor, ProviderQuirks, SupportedGrants,
		descriptor::append_path,
	},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ProviderDescriptorError {
	/// Authority is mandatory.
	#[error("Missing authority.")]
	MissingAuthority,
	/// Authorization endpoint path is required for Authorization Code flows.
	#[error("Missing authorization endpoint path.")]
	MissingAuthorizationPath,
	/// Token endpoint path is mandatory for all flows.
	#[error("Missing token endpoint path.")]
	MissingTokenPath,
	/// At least one grant must be supported.
	#[error("Descriptor must enable at least one grant type.")]
	NoSupportedGrants,
	/// PKCE requirement implies Authorization Code support.
	#[error("The `pkce_required` flag requires enabling the authorization_code grant.")]
	PkceRequiredWithoutAuthorizationCode,
	/// Authority must use HTTPS (loopback hosts excepted).
	#[error("The authority must use HTTPS: {url}.")]
	InsecureAuthority {
		/// Authority URL that failed validation.
		url: String,
	},
	/// Authority cannot carry endpoint paths.
	#[error("The authority cannot be used as a base URL: {url}.")]
	OpaqueAuthority {
		/// Authority URL that failed validation.
		url: String,
	},
	/// Reject scope delimiters that are control characters.
	#[error("Scope delimiter must be a printable character.")]
	InvalidScopeDelimiter {
		/// Invalid delimiter that was supplied.
		delimiter: char,
	},
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug)]
pub struct ProviderDescriptorBuilder {
	/// Identifier for the descriptor being constructed.
	pub id: ProviderId,
	/// Default authority.
	pub authority: Option<Url>,
	/// Authorization endpoint path relative to the authority.
	pub authorization_path: Option<String>,
	/// Token endpoint path relative to the authority.
	pub token_path: Option<String>,
	/// Grants enabled for the provider.
	pub supported_grants: SupportedGrants,
	/// Preferred client authentication method for the token endpoint.
	pub preferred_client_auth_method: ClientAuthMethod,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptorBuilder {
	/// Creates a new builder seeded with the provided identifier.
	pub fn new(id: ProviderId) -> Self {
		Self {
			id,
			authority: None,
			authorization_path: None,
			token_path: None,
			supported_grants: SupportedGrants::default(),
			preferred_client_auth_method: ClientAuthMethod::default(),
			quirks: ProviderQuirks::default(),
		}
	}

	/// Sets the default authority.
	pub fn authority(mut self, url: Url) -> Self {
		self.authority = Some(url);

		self
	}

	/// Sets the authorization endpoint path.
	pub fn authorization_path(mut self, path: impl Into<String>) -> Self {
		self.authorization_path = Some(path.into());

		self
	}

	/// Sets the token endpoint path.
	pub fn token_path(mut self, path: impl Into<String>) -> Self {
		self.token_path = Some(path.into());

		self
	}

	/// Marks a single grant type as supported.
	pub fn support_grant(mut self, grant: GrantType) -> Self {
		self.supported_grants = self.supported_grants.enable(grant);

		self
	}

	/// Marks multiple grants as supported.
	pub fn support_grants<I>(mut self, grants: I) -> Self
	where
		I: IntoIterator<Item = GrantType>,
	{
		for grant in grants.into_iter() {
			self.supported_grants = self.supported_grants.enable(grant);
		}

		self
	}

	/// Overrides the preferred client authentication method.
	pub fn preferred_client_auth_method(mut self, method: ClientAuthMethod) -> Self {
		self.preferred_client_auth_method = method;

		self
	}

	/// Overrides the provider quirks.
	pub fn quirks(mut self, quirks: ProviderQuirks) -> Self {
		self.quirks = quirks;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let authority = self.authority.ok_or(ProviderDescriptorError::MissingAuthority)?;
		let authorization_path =
			self.authorization_path.ok_or(ProviderDescriptorError::MissingAuthorizationPath)?;
		let token_path = self.token_path.ok_or(ProviderDescriptorError::MissingTokenPath)?;
		let descriptor = ProviderDescriptor {
			id: self.id,
			authority,
			authorization_path,
			token_path,
			supported_grants: self.supported_grants,
			preferred_client_auth_method: self.preferred_client_auth_method,
			quirks: self.quirks,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ProviderDescriptor {
	/// Validates invariants for the descriptor.
	///
	/// Descriptors deserialized from configuration should be passed through this check
	/// before use.
	pub fn validate(&self) -> Result<(), ProviderDescriptorError> {
		if self.supported_grants.is_empty() {
			return Err(ProviderDescriptorError::NoSupportedGrants);
		}
		if self.quirks.pkce_required && !self.supports(&GrantType::AuthorizationCode) {
			return Err(ProviderDescriptorError::PkceRequiredWithoutAuthorizationCode);
		}

		validate_authority(&self.authority)?;
		validate_scope_delimiter(self.quirks.scope_delimiter)?;

		Ok(())
	}
}

/// Returns true when the URL uses HTTPS or targets a loopback host.
pub(crate) fn is_secure_or_loopback(url: &Url) -> bool {
	if url.scheme() == "https" {
		return true;
	}

	matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"))
}

fn validate_authority(url: &Url) -> Result<(), ProviderDescriptorError> {
	if !is_secure_or_loopback(url) {
		return Err(ProviderDescriptorError::InsecureAuthority { url: url.to_string() });
	}
	if append_path(url, "").is_err() {
		return Err(ProviderDescriptorError::OpaqueAuthority { url: url.to_string() });
	}

	Ok(())
}

fn validate_scope_delimiter(delimiter: char) -> Result<(), ProviderDescriptorError> {
	if delimiter.is_control() {
		Err(ProviderDescriptorError::InvalidScopeDelimiter { delimiter })
	} else {
		Ok(())
	}
}
