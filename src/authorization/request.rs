//! Authorization request model and builder.

// self
use crate::{
	_prelude::*,
	auth::{self, PkceChallenge, ScopeSet, TokenSecret},
	token::TokenRequest,
};

/// Immutable description of one authorization-code attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizationRequest {
	/// OAuth client identifier.
	pub client_id: String,
	/// Redirect URI the provider returns to; must be absolute.
	pub redirect_uri: String,
	/// Requested scopes.
	pub scope: ScopeSet,
	/// Opaque anti-CSRF value that must come back unchanged.
	pub state: String,
	/// Authority overriding the descriptor's default (e.g., a specific tenant or cloud).
	pub authority: Option<Url>,
	/// PKCE material, when the attempt uses PKCE.
	pub pkce: Option<PkceChallenge>,
	/// Pre-fills the sign-in name.
	pub login_hint: Option<String>,
	/// OIDC `prompt` value (e.g., `select_account`).
	pub prompt: Option<String>,
	/// Provider-specific query parameters forwarded as-is.
	pub extra_parameters: BTreeMap<String, String>,
}
impl AuthorizationRequest {
	/// Starts a builder for the client/redirect pair.
	pub fn builder(
		client_id: impl Into<String>,
		redirect_uri: impl Into<String>,
	) -> AuthorizationRequestBuilder {
		AuthorizationRequestBuilder::new(client_id.into(), redirect_uri.into())
	}

	/// Builds the authorization_code token request that redeems `code` for this attempt.
	///
	/// Client id, redirect URI, scopes, and the PKCE verifier carry over.
	pub fn token_request(&self, code: &TokenSecret) -> TokenRequest {
		let mut request =
			TokenRequest::authorization_code(&self.client_id, code.expose(), &self.redirect_uri)
				.with_scope(self.scope.clone());

		if let Some(pkce) = &self.pkce {
			request = request.with_code_verifier(pkce.verifier().clone());
		}

		request
	}
}

/// Builder for [`AuthorizationRequest`].
#[derive(Debug)]
pub struct AuthorizationRequestBuilder {
	client_id: String,
	redirect_uri: String,
	scope: ScopeSet,
	state: Option<String>,
	authority: Option<Url>,
	pkce: Option<PkceChallenge>,
	login_hint: Option<String>,
	prompt: Option<String>,
	extra_parameters: BTreeMap<String, String>,
}
impl AuthorizationRequestBuilder {
	fn new(client_id: String, redirect_uri: String) -> Self {
		Self {
			client_id,
			redirect_uri,
			scope: ScopeSet::default(),
			state: None,
			authority: None,
			pkce: None,
			login_hint: None,
			prompt: None,
			extra_parameters: BTreeMap::new(),
		}
	}

	/// Sets the requested scopes.
	pub fn scope(mut self, scope: ScopeSet) -> Self {
		self.scope = scope;

		self
	}

	/// Uses a caller-supplied `state` instead of a generated one.
	pub fn state(mut self, state: impl Into<String>) -> Self {
		self.state = Some(state.into());

		self
	}

	/// Overrides the authority for this attempt.
	pub fn authority(mut self, authority: Url) -> Self {
		self.authority = Some(authority);

		self
	}

	/// Attaches caller-supplied PKCE material.
	pub fn pkce(mut self, pkce: PkceChallenge) -> Self {
		self.pkce = Some(pkce);

		self
	}

	/// Generates fresh PKCE material.
	pub fn with_generated_pkce(self) -> Self {
		self.pkce(PkceChallenge::generate())
	}

	/// Sets the `login_hint` parameter.
	pub fn login_hint(mut self, hint: impl Into<String>) -> Self {
		self.login_hint = Some(hint.into());

		self
	}

	/// Sets the `prompt` parameter.
	pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
		self.prompt = Some(prompt.into());

		self
	}

	/// Adds a provider-specific query parameter.
	pub fn parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.extra_parameters.insert(key.into(), value.into());

		self
	}

	/// Finalizes the request, generating `state` when none was supplied.
	///
	/// Structural validation happens in the provider strategy, not here.
	pub fn build(self) -> AuthorizationRequest {
		AuthorizationRequest {
			client_id: self.client_id,
			redirect_uri: self.redirect_uri,
			scope: self.scope,
			state: self.state.unwrap_or_else(auth::generate_state),
			authority: self.authority,
			pkce: self.pkce,
			login_hint: self.login_hint,
			prompt: self.prompt,
			extra_parameters: self.extra_parameters,
		}
	}
}
