//! Token request model and its canonical form encoding.

// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, TokenSecret},
	form::{self, FormError},
	provider::GrantType,
};

/// Immutable description of one token exchange.
///
/// Only the fields below are interpreted by the engine; anything in
/// [`extra_parameters`](Self::extra_parameters) is forwarded verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenRequest {
	/// Grant selecting the exchange mode.
	pub grant_type: GrantType,
	/// OAuth client identifier.
	pub client_id: String,
	/// Authorization code (authorization_code grant).
	pub code: Option<TokenSecret>,
	/// Refresh token (refresh_token grant).
	pub refresh_token: Option<TokenSecret>,
	/// Redirect URI used during authorization (authorization_code grant).
	pub redirect_uri: Option<String>,
	/// Requested scopes.
	pub scope: ScopeSet,
	/// PKCE verifier matching the authorization request's challenge.
	pub code_verifier: Option<TokenSecret>,
	/// Provider-specific parameters forwarded as-is.
	pub extra_parameters: BTreeMap<String, String>,
}
impl TokenRequest {
	/// Starts a request for an arbitrary grant.
	pub fn new(grant_type: GrantType, client_id: impl Into<String>) -> Self {
		Self {
			grant_type,
			client_id: client_id.into(),
			code: None,
			refresh_token: None,
			redirect_uri: None,
			scope: ScopeSet::default(),
			code_verifier: None,
			extra_parameters: BTreeMap::new(),
		}
	}

	/// Redeems an authorization code.
	pub fn authorization_code(
		client_id: impl Into<String>,
		code: impl Into<String>,
		redirect_uri: impl Into<String>,
	) -> Self {
		let mut request = Self::new(GrantType::AuthorizationCode, client_id);

		request.code = Some(TokenSecret::new(code));
		request.redirect_uri = Some(redirect_uri.into());

		request
	}

	/// Redeems a refresh token.
	pub fn refresh_token(client_id: impl Into<String>, refresh_token: impl Into<String>) -> Self {
		let mut request = Self::new(GrantType::RefreshToken, client_id);

		request.refresh_token = Some(TokenSecret::new(refresh_token));

		request
	}

	/// Requests an app-only token.
	pub fn client_credentials(client_id: impl Into<String>) -> Self {
		Self::new(GrantType::ClientCredentials, client_id)
	}

	/// Sets the requested scopes.
	pub fn with_scope(mut self, scope: ScopeSet) -> Self {
		self.scope = scope;

		self
	}

	/// Attaches the PKCE verifier.
	pub fn with_code_verifier(mut self, verifier: TokenSecret) -> Self {
		self.code_verifier = Some(verifier);

		self
	}

	/// Adds a provider-specific parameter.
	pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.extra_parameters.insert(key.into(), value.into());

		self
	}

	/// Returns the ordered form pairs for this request.
	///
	/// Declared fields win over extra parameters with the same key; absent optional
	/// fields are omitted.
	pub fn to_form(&self, scope_delimiter: char) -> BTreeMap<String, String> {
		let mut form = self.extra_parameters.clone();

		form.insert("grant_type".into(), self.grant_type.as_str().into());
		form.insert("client_id".into(), self.client_id.clone());

		let optional = [
			("code", self.code.as_ref().map(|secret| secret.expose().to_owned())),
			("refresh_token", self.refresh_token.as_ref().map(|secret| secret.expose().to_owned())),
			("redirect_uri", self.redirect_uri.clone()),
			("scope", self.scope.join(scope_delimiter)),
			("code_verifier", self.code_verifier.as_ref().map(|secret| secret.expose().to_owned())),
		];

		for (key, value) in optional {
			match value {
				Some(value) => form.insert(key.into(), value),
				None => form.remove(key),
			};
		}

		form
	}

	/// Canonical form body (sorted keys, UTF-8).
	pub fn form_body(&self, scope_delimiter: char) -> String {
		form::serialize_to_form_urlencoded(&self.to_form(scope_delimiter))
	}

	/// Decodes a form body produced by [`form_body`](Self::form_body).
	pub fn from_form(body: &[u8], scope_delimiter: char) -> Result<Self, TokenRequestDecodeError> {
		let mut form = form::parse_form_urlencoded(body)?;
		let grant_type = form
			.remove("grant_type")
			.map(|value| GrantType::parse(&value))
			.ok_or(FormError::MissingField { field: "grant_type" })?;
		let client_id =
			form.remove("client_id").ok_or(FormError::MissingField { field: "client_id" })?;
		let scope = match form.remove("scope") {
			Some(value) => ScopeSet::from_delimited(&value, scope_delimiter)?,
			None => ScopeSet::default(),
		};

		Ok(Self {
			grant_type,
			client_id,
			code: form.remove("code").map(TokenSecret::new),
			refresh_token: form.remove("refresh_token").map(TokenSecret::new),
			redirect_uri: form.remove("redirect_uri"),
			scope,
			code_verifier: form.remove("code_verifier").map(TokenSecret::new),
			extra_parameters: form,
		})
	}
}

/// Errors raised by [`TokenRequest::from_form`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum TokenRequestDecodeError {
	/// The body is not a well-formed form.
	#[error(transparent)]
	Form(#[from] FormError),
	/// The `scope` field holds invalid entries.
	#[error(transparent)]
	Scope(#[from] crate::auth::ScopeValidationError),
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn auth_code_request() -> TokenRequest {
		TokenRequest::authorization_code("client-1", "code-1", "https://app.example.com/cb")
			.with_scope(ScopeSet::new(["openid", "offline_access"]).expect("Scope should build."))
			.with_code_verifier(TokenSecret::new("verifier-1"))
			.with_parameter("client_info", "1")
	}

	#[test]
	fn form_body_is_sorted_and_stable() {
		let request = auth_code_request();
		let first = request.form_body(' ');

		assert_eq!(first, request.clone().form_body(' '));
		assert_eq!(
			first,
			concat!(
				"client_id=client-1&client_info=1&code=code-1&code_verifier=verifier-1",
				"&grant_type=authorization_code",
				"&redirect_uri=https%3A%2F%2Fapp.example.com%2Fcb",
				"&scope=offline_access+openid",
			)
		);
	}

	#[test]
	fn declared_fields_win_over_extras() {
		let request = TokenRequest::refresh_token("client-1", "rt-1")
			.with_parameter("grant_type", "password")
			.with_parameter("code", "smuggled");
		let form = request.to_form(' ');

		assert_eq!(form.get("grant_type").map(String::as_str), Some("refresh_token"));
		assert!(!form.contains_key("code"));
	}

	#[test]
	fn decoding_restores_every_field() {
		let request = auth_code_request();
		let decoded = TokenRequest::from_form(request.form_body(' ').as_bytes(), ' ')
			.expect("Encoded request should decode.");

		assert_eq!(decoded, request);

		let refresh = TokenRequest::refresh_token("client-2", "rt/with+reserved=chars")
			.with_scope(ScopeSet::new(["a", "b"]).expect("Scope should build."));
		let decoded = TokenRequest::from_form(refresh.form_body(',').as_bytes(), ',')
			.expect("Encoded refresh request should decode.");

		assert_eq!(decoded, refresh);
	}

	#[test]
	fn decoding_requires_grant_and_client() {
		assert_eq!(
			TokenRequest::from_form(b"client_id=a", ' '),
			Err(FormError::MissingField { field: "grant_type" }.into())
		);
		assert_eq!(
			TokenRequest::from_form(b"grant_type=refresh_token", ' '),
			Err(FormError::MissingField { field: "client_id" }.into())
		);
	}
}
