// std
use std::borrow::Cow;
// self
use crate::_prelude::*;

/// OAuth 2.0 grant types understood by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum GrantType {
	/// Authorization Code grant.
	AuthorizationCode,
	/// Refresh Token grant.
	RefreshToken,
	/// Client Credentials grant.
	ClientCredentials,
	/// Provider-defined grant identified by its `grant_type` value
	/// (e.g., `urn:ietf:params:oauth:grant-type:device_code`).
	Extension(Cow<'static, str>),
}
impl GrantType {
	/// Returns the `grant_type` form value.
	pub fn as_str(&self) -> &str {
		match self {
			GrantType::AuthorizationCode => "authorization_code",
			GrantType::RefreshToken => "refresh_token",
			GrantType::ClientCredentials => "client_credentials",
			GrantType::Extension(value) => &**value,
		}
	}

	/// Parses a `grant_type` form value, mapping unknown values to [`GrantType::Extension`].
	pub fn parse(value: &str) -> Self {
		match value {
			"authorization_code" => GrantType::AuthorizationCode,
			"refresh_token" => GrantType::RefreshToken,
			"client_credentials" => GrantType::ClientCredentials,
			other => GrantType::Extension(Cow::Owned(other.to_owned())),
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl From<GrantType> for String {
	fn from(value: GrantType) -> Self {
		value.as_str().to_owned()
	}
}
impl From<String> for GrantType {
	fn from(value: String) -> Self {
		GrantType::parse(&value)
	}
}

/// Grants enabled on a provider descriptor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupportedGrants {
	/// Indicates whether the Authorization Code grant is enabled.
	pub authorization_code: bool,
	/// Indicates whether the Refresh Token grant is enabled.
	pub refresh_token: bool,
	/// Indicates whether the Client Credentials grant is enabled.
	pub client_credentials: bool,
	/// Provider-defined `grant_type` values accepted by the token endpoint.
	pub extensions: Vec<String>,
}
impl SupportedGrants {
	/// Returns true if the provided grant is supported.
	pub fn supports(&self, grant: &GrantType) -> bool {
		match grant {
			GrantType::AuthorizationCode => self.authorization_code,
			GrantType::RefreshToken => self.refresh_token,
			GrantType::ClientCredentials => self.client_credentials,
			GrantType::Extension(value) => self.extensions.iter().any(|known| known == value),
		}
	}

	/// Marks a grant as supported.
	pub fn enable(mut self, grant: GrantType) -> Self {
		match grant {
			GrantType::AuthorizationCode => self.authorization_code = true,
			GrantType::RefreshToken => self.refresh_token = true,
			GrantType::ClientCredentials => self.client_credentials = true,
			GrantType::Extension(value) =>
				if !self.extensions.iter().any(|known| *known == value) {
					self.extensions.push(value.into_owned());
				},
		}

		self
	}

	/// Returns true when no grants are enabled.
	pub fn is_empty(&self) -> bool {
		!self.authorization_code
			&& !self.refresh_token
			&& !self.client_credentials
			&& self.extensions.is_empty()
	}
}
