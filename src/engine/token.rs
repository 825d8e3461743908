//! Token exchange: validation, canonical form encoding, one POST, and response mapping.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use oauth2::http::{
	Method, Request,
	header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
// self
use crate::{
	_prelude::*,
	auth::{CorrelationId, ScopeSet, TokenSecret},
	engine::OAuth2Engine,
	error::{ConfigError, InvalidRequestError},
	form::{self, FORM_CONTENT_TYPE},
	http::{self, HttpRequest, TokenHttpClient},
	obs::{self, FlowKind, FlowOutcome, FlowSpan, LogLevel},
	provider::{ClientAuthMethod, GrantType},
	token::{TokenFailure, TokenRequest, TokenResult, TokenSuccess},
};

impl<C> OAuth2Engine<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Exchanges `request` at the descriptor's token endpoint.
	///
	/// Local validation failures return `Err` before any HTTP call. Everything that
	/// happens after the request leaves (transport failures, provider errors,
	/// unusable bodies) is reported as [`TokenResult::Failure`]. A single POST is
	/// issued; nothing is retried.
	pub async fn request_token(&self, request: &TokenRequest) -> Result<TokenResult> {
		self.exchange(request, None).await
	}

	/// Same as [`request_token`](Self::request_token) against an overriding authority
	/// (e.g., the tenant the authorization step used).
	pub async fn request_token_at(
		&self,
		request: &TokenRequest,
		authority: &Url,
	) -> Result<TokenResult> {
		self.exchange(request, Some(authority)).await
	}

	/// Builds the exact HTTP request [`request_token`](Self::request_token) would send.
	///
	/// The body is the canonical (key-sorted) form encoding, so equal requests produce
	/// byte-identical bodies.
	pub fn token_http_request(
		&self,
		request: &TokenRequest,
		endpoint: &Url,
		correlation_id: CorrelationId,
	) -> Result<HttpRequest> {
		let mut form = request.to_form(self.descriptor.quirks.scope_delimiter);

		self.strategy.augment_token_request(&request.grant_type, &mut form);

		let mut builder = Request::builder()
			.method(Method::POST)
			.uri(endpoint.as_str())
			.header(CONTENT_TYPE, FORM_CONTENT_TYPE)
			.header(ACCEPT, "application/json")
			.header(CorrelationId::HEADER, correlation_id.to_string());

		match (self.descriptor.preferred_client_auth_method, &self.client_secret) {
			(ClientAuthMethod::ClientSecretBasic, Some(secret)) => {
				builder =
					builder.header(AUTHORIZATION, basic_authorization(&request.client_id, secret));
			},
			(ClientAuthMethod::ClientSecretPost, Some(secret)) => {
				form.insert("client_secret".into(), secret.expose().into());
			},
			_ => {},
		}

		let body = form::serialize_to_form_urlencoded(&form).into_bytes();

		Ok(builder.body(body).map_err(ConfigError::from)?)
	}

	async fn exchange(&self, request: &TokenRequest, authority: Option<&Url>) -> Result<TokenResult> {
		const KIND: FlowKind = FlowKind::Token;

		let span = FlowSpan::new(KIND, "request_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.exchange_once(request, authority)).await;
		let outcome = match &result {
			Ok(TokenResult::Success(_)) => FlowOutcome::Success,
			_ => FlowOutcome::Failure,
		};

		obs::record_flow_outcome(KIND, outcome);

		result
	}

	async fn exchange_once(
		&self,
		request: &TokenRequest,
		authority: Option<&Url>,
	) -> Result<TokenResult> {
		let authority = self.authority_for(authority);

		self.strategy.validate_token_request(request, authority)?;
		self.ensure_grant_supported(&request.grant_type)?;

		if request.grant_type == GrantType::AuthorizationCode
			&& self.descriptor.quirks.pkce_required
			&& request.code_verifier.is_none()
		{
			return Err(InvalidRequestError::MissingPkce.into());
		}

		request
			.scope
			.ensure_joinable(self.descriptor.quirks.scope_delimiter)
			.map_err(InvalidRequestError::from)?;

		let endpoint = self.descriptor.token_endpoint(Some(authority))?;
		let correlation_id = CorrelationId::generate();
		let http_request = self.token_http_request(request, &endpoint, correlation_id)?;

		self.log_policy.emit(
			LogLevel::Info,
			Some(correlation_id),
			format_args!("Sending {} token request.", request.grant_type),
		);
		self.log_policy.emit_pii(
			LogLevel::Verbose,
			Some(correlation_id),
			format_args!("Token endpoint {endpoint} for client `{}`.", request.client_id),
		);

		let response = match self.http_client.execute(http_request).await {
			Ok(response) => response,
			Err(e) =>
				return Ok(self.fail(
					TokenFailure::network(http::describe_transport_error(&e)),
					correlation_id,
				)),
		};
		let received_at = OffsetDateTime::now_utc();
		let status = response.status().as_u16();
		let payload = match self.strategy.token_result_from_http_response(&response) {
			Ok(payload) => payload,
			Err(failure) => return Ok(self.fail(failure, correlation_id)),
		};
		let Some(access_token) = self.strategy.access_token_from_response(&payload) else {
			return Ok(self.fail(
				TokenFailure::server("Token response carries no access token.")
					.with_http_status(status),
				correlation_id,
			));
		};
		let account = match self.strategy.create_account(&payload) {
			Ok(account) => account,
			Err(e) =>
				return Ok(self.fail(
					TokenFailure::server(format!("Account could not be derived: {e}"))
						.with_http_status(status),
					correlation_id,
				)),
		};
		let scope = match payload
			.scope
			.as_deref()
			.map(|scope| ScopeSet::from_delimited(scope, self.descriptor.quirks.scope_delimiter))
		{
			Some(Ok(scope)) => Some(scope),
			Some(Err(e)) => {
				self.log_policy.emit(
					LogLevel::Warn,
					Some(correlation_id),
					format_args!("Ignoring unparseable granted scope: {e}"),
				);

				None
			},
			None => None,
		};
		let expires_at = payload
			.expires_in
			.and_then(|secs| i64::try_from(secs).ok())
			.and_then(|secs| received_at.checked_add(Duration::seconds(secs)));

		self.log_policy.emit(
			LogLevel::Info,
			Some(correlation_id),
			format_args!("Token request succeeded with HTTP {status}."),
		);

		Ok(TokenResult::Success(Box::new(TokenSuccess {
			access_token,
			refresh_token: self.strategy.refresh_token_from_response(&payload),
			id_token: payload.id_token.clone(),
			token_type: payload.token_type.clone(),
			scope,
			expires_at,
			account,
			correlation_id,
			response: payload,
		})))
	}

	fn fail(&self, failure: TokenFailure, correlation_id: CorrelationId) -> TokenResult {
		let kind = self.strategy.classify_failure(&failure);
		let failure = failure.with_correlation_id(correlation_id).with_kind(kind);

		self.log_policy.emit(
			LogLevel::Error,
			Some(correlation_id),
			format_args!("Token request failed ({:?}): {failure}.", failure.origin),
		);

		TokenResult::Failure(failure)
	}
}

// RFC 6749 §2.3.1: both halves are form-encoded before the Basic encoding.
fn basic_authorization(client_id: &str, secret: &TokenSecret) -> String {
	let encode = |value: &str| url::form_urlencoded::byte_serialize(value.as_bytes()).collect::<String>();
	let credentials = format!("{}:{}", encode(client_id), encode(secret.expose()));

	format!("Basic {}", STANDARD.encode(credentials))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn basic_credentials_are_form_encoded_first() {
		let header = basic_authorization("client id", &TokenSecret::new("s:cr+t"));
		let decoded = STANDARD
			.decode(header.trim_start_matches("Basic "))
			.expect("Header should carry base64 credentials.");

		assert_eq!(String::from_utf8(decoded).expect("Credentials should be UTF-8."), "client+id:s%3Acr%2Bt");
	}
}
