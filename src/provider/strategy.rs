//! Provider strategy hooks that customize validation, response parsing, and account derivation.
//!
//! Every hook has a generic OAuth 2.0 / OIDC default, so a provider only overrides what it
//! does differently. Hooks work on crate-owned types and `oauth2::HttpResponse`, keeping
//! strategies independent of any concrete HTTP client.

// crates.io
use oauth2::HttpResponse;
// self
use crate::{
	_prelude::*,
	auth::{Account, AccountError, IdTokenClaims, TokenSecret},
	authorization::{AuthorizationExtensions, AuthorizationRequest},
	error::InvalidRequestError,
	http,
	provider::{GrantType, descriptor::builder},
	token::{FailureOrigin, TokenErrorResponse, TokenFailure, TokenRequest, TokenResponse},
};

/// Per-provider hook bundle consumed by [`OAuth2Engine`](crate::engine::OAuth2Engine).
///
/// Implementors must be `Send + Sync` so one strategy can serve concurrent attempts.
pub trait ProviderStrategy: Send + Sync {
	/// Short label used in logs and error messages.
	fn name(&self) -> &'static str {
		"default"
	}

	/// Fails fast on structurally invalid authorization requests.
	///
	/// `authority` is the effective authority (request override or descriptor default).
	fn validate_authorization_request(
		&self,
		request: &AuthorizationRequest,
		authority: &Url,
	) -> Result<(), InvalidRequestError> {
		validate_authorization_request(request, authority)
	}

	/// Fails fast on token requests missing grant-required fields.
	fn validate_token_request(
		&self,
		request: &TokenRequest,
		authority: &Url,
	) -> Result<(), InvalidRequestError> {
		validate_token_request(request, authority)
	}

	/// Deterministic cache key for the issuer serving `request`.
	fn issuer_cache_identifier(&self, _request: &AuthorizationRequest, authority: &Url) -> String {
		authority_cache_key(authority)
	}

	/// Extracts the access token; `None` only when the response genuinely lacks one.
	fn access_token_from_response(&self, response: &TokenResponse) -> Option<TokenSecret> {
		response.access_token.clone().filter(|token| !token.is_blank())
	}

	/// Extracts the refresh token; `None` only when the response genuinely lacks one.
	fn refresh_token_from_response(&self, response: &TokenResponse) -> Option<TokenSecret> {
		response.refresh_token.clone().filter(|token| !token.is_blank())
	}

	/// Derives the account identified by the response.
	///
	/// Must be idempotent for the same response. Returns `Ok(None)` when the response
	/// carries no identity (no ID token).
	fn create_account(&self, response: &TokenResponse) -> Result<Option<Account>, AccountError> {
		match &response.id_token {
			Some(id_token) =>
				Account::from_oidc_claims(IdTokenClaims::decode(id_token.expose())?).map(Some),
			None => Ok(None),
		}
	}

	/// Interprets HTTP status and body together, yielding a decoded payload or a failure.
	fn token_result_from_http_response(
		&self,
		response: &HttpResponse,
	) -> Result<TokenResponse, TokenFailure> {
		parse_token_http_response(response)
	}

	/// Maps redirect parameters into provider extension fields.
	fn authorization_extensions(
		&self,
		_parameters: &BTreeMap<String, String>,
	) -> AuthorizationExtensions {
		AuthorizationExtensions::default()
	}

	/// Adds provider-specific form fields before the token request is serialized.
	///
	/// Fields the request already declares should not be overwritten.
	fn augment_token_request(&self, _grant: &GrantType, _form: &mut BTreeMap<String, String>) {}

	/// Classifies a token failure so callers can pick a reaction (re-authenticate, retry, ...).
	fn classify_failure(&self, failure: &TokenFailure) -> ProviderErrorKind {
		classify_failure(failure)
	}
}

/// Canonical provider error categories used by strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
	/// Provider rejected the authorization grant (bad code/refresh token).
	InvalidGrant,
	/// Client authentication failed.
	InvalidClient,
	/// Requested scopes exceed what the client may obtain.
	InsufficientScope,
	/// The user must interact again (sign in, consent, MFA).
	InteractionRequired,
	/// Failure is temporary and may be retried by the caller.
	Transient,
}

/// Generic OAuth 2.0 / OIDC strategy: every hook keeps its default.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultProviderStrategy;
impl Display for DefaultProviderStrategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("default-provider-strategy")
	}
}
impl ProviderStrategy for DefaultProviderStrategy {}

/// Generic authorization request validation.
pub fn validate_authorization_request(
	request: &AuthorizationRequest,
	authority: &Url,
) -> Result<(), InvalidRequestError> {
	validate_client_id(&request.client_id)?;
	validate_redirect_uri(Some(&request.redirect_uri), GrantType::AuthorizationCode)?;

	if request.state.is_empty() {
		return Err(InvalidRequestError::EmptyState);
	}

	validate_authority(authority)
}

/// Generic token request validation.
pub fn validate_token_request(
	request: &TokenRequest,
	authority: &Url,
) -> Result<(), InvalidRequestError> {
	validate_client_id(&request.client_id)?;

	match &request.grant_type {
		GrantType::AuthorizationCode => {
			if request.code.as_ref().is_none_or(TokenSecret::is_blank) {
				return Err(InvalidRequestError::MissingAuthorizationCode);
			}
			if request.refresh_token.is_some() {
				return Err(InvalidRequestError::ConflictingGrantCredential {
					grant: GrantType::AuthorizationCode,
					credential: "refresh_token",
				});
			}

			validate_redirect_uri(request.redirect_uri.as_deref(), GrantType::AuthorizationCode)?;
		},
		GrantType::RefreshToken => {
			if request.refresh_token.as_ref().is_none_or(TokenSecret::is_blank) {
				return Err(InvalidRequestError::MissingRefreshToken);
			}
			if request.code.is_some() {
				return Err(InvalidRequestError::ConflictingGrantCredential {
					grant: GrantType::RefreshToken,
					credential: "code",
				});
			}
		},
		GrantType::ClientCredentials | GrantType::Extension(_) => {},
	}

	validate_authority(authority)
}

/// Generic token endpoint response interpretation.
///
/// - 2xx with a token payload decodes into [`TokenResponse`].
/// - 2xx carrying an `error` member and no access token is a provider failure.
/// - Non-2xx with an RFC 6749 error body is a provider failure.
/// - Anything else is a server failure.
pub fn parse_token_http_response(response: &HttpResponse) -> Result<TokenResponse, TokenFailure> {
	let status = response.status();
	let retry_after = http::retry_after(response.headers());
	let body = response.body().as_slice();

	if status.is_success() {
		let de = &mut serde_json::Deserializer::from_slice(body);
		let decoded: TokenResponse = serde_path_to_error::deserialize(de).map_err(|e| {
			TokenFailure::server(format!(
				"Token response body is invalid at `{}`: {}.",
				e.path(),
				e.inner()
			))
			.with_http_status(status.as_u16())
		})?;

		return match (&decoded.access_token, decoded.extra_str("error")) {
			(None, Some(error)) => {
				let description = decoded.extra_str("error_description").map(str::to_owned);

				Err(TokenFailure::provider(error, description)
					.with_http_status(status.as_u16())
					.with_retry_after(retry_after))
			},
			_ => Ok(decoded),
		};
	}

	let failure = match serde_json::from_slice::<TokenErrorResponse>(body) {
		Ok(error) if !error.error.trim().is_empty() =>
			TokenFailure::provider(error.error, error.error_description),
		_ => TokenFailure::server(format!(
			"Token endpoint returned HTTP {} without an OAuth error body.",
			status.as_u16()
		)),
	};

	Err(failure.with_http_status(status.as_u16()).with_retry_after(retry_after))
}

/// Generic failure classification.
///
/// Network failures are transient. Otherwise structured OAuth codes win, then hints in
/// the description, and finally the HTTP status.
pub fn classify_failure(failure: &TokenFailure) -> ProviderErrorKind {
	if failure.origin == FailureOrigin::Network {
		return ProviderErrorKind::Transient;
	}

	let from_code = match failure.origin {
		FailureOrigin::Provider => match_error_code(&failure.error_code),
		_ => None,
	};

	from_code
		.or_else(|| classify_description(failure.error_description.as_deref()))
		.unwrap_or_else(|| classify_status(failure.http_status))
}

/// `host[:port][/path]` of an authority, lowercased host, trailing slash dropped.
pub fn authority_cache_key(authority: &Url) -> String {
	let host = authority.host_str().unwrap_or_default().to_ascii_lowercase();
	let mut key = match authority.port() {
		Some(port) => format!("{host}:{port}"),
		None => host,
	};
	let path = authority.path().trim_matches('/');

	if !path.is_empty() {
		key.push('/');
		key.push_str(path);
	}

	key
}

fn validate_client_id(client_id: &str) -> Result<(), InvalidRequestError> {
	if client_id.trim().is_empty() {
		return Err(InvalidRequestError::EmptyClientId);
	}

	Ok(())
}

fn validate_redirect_uri(
	redirect_uri: Option<&str>,
	grant: GrantType,
) -> Result<(), InvalidRequestError> {
	let redirect_uri = match redirect_uri {
		Some(value) if !value.trim().is_empty() => value,
		_ => return Err(InvalidRequestError::MissingRedirectUri { grant }),
	};

	match Url::parse(redirect_uri) {
		Ok(_) => Ok(()),
		Err(_) => Err(InvalidRequestError::RelativeRedirectUri { value: redirect_uri.to_owned() }),
	}
}

fn validate_authority(authority: &Url) -> Result<(), InvalidRequestError> {
	if !builder::is_secure_or_loopback(authority) {
		return Err(InvalidRequestError::InvalidAuthority { url: authority.to_string() });
	}

	Ok(())
}

fn match_error_code(value: &str) -> Option<ProviderErrorKind> {
	const INVALID_GRANT: [&str; 2] = ["invalid_grant", "access_denied"];
	const INVALID_CLIENT: [&str; 2] = ["invalid_client", "unauthorized_client"];
	const INSUFFICIENT_SCOPE: [&str; 2] = ["invalid_scope", "insufficient_scope"];
	const INTERACTION_REQUIRED: [&str; 4] =
		["interaction_required", "consent_required", "login_required", "account_selection_required"];
	const TRANSIENT: [&str; 2] = ["temporarily_unavailable", "server_error"];

	let any = |codes: &[&str]| codes.iter().any(|code| value.eq_ignore_ascii_case(code));

	if any(&INVALID_GRANT) {
		Some(ProviderErrorKind::InvalidGrant)
	} else if any(&INVALID_CLIENT) {
		Some(ProviderErrorKind::InvalidClient)
	} else if any(&INSUFFICIENT_SCOPE) {
		Some(ProviderErrorKind::InsufficientScope)
	} else if any(&INTERACTION_REQUIRED) {
		Some(ProviderErrorKind::InteractionRequired)
	} else if any(&TRANSIENT) {
		Some(ProviderErrorKind::Transient)
	} else {
		None
	}
}

fn classify_description(description: Option<&str>) -> Option<ProviderErrorKind> {
	let lowered = description?.to_ascii_lowercase();

	match lowered.as_str() {
		text if text.contains("invalid_grant") => Some(ProviderErrorKind::InvalidGrant),
		text if text.contains("invalid_client") => Some(ProviderErrorKind::InvalidClient),
		text if text.contains("insufficient_scope") || text.contains("invalid_scope") =>
			Some(ProviderErrorKind::InsufficientScope),
		text if text.contains("interaction_required") =>
			Some(ProviderErrorKind::InteractionRequired),
		text if text.contains("temporarily_unavailable") || text.contains("retry") =>
			Some(ProviderErrorKind::Transient),
		_ => None,
	}
}

fn classify_status(status: Option<u16>) -> ProviderErrorKind {
	match status {
		Some(400 | 404 | 410) => ProviderErrorKind::InvalidGrant,
		Some(401) => ProviderErrorKind::InvalidClient,
		Some(403) => ProviderErrorKind::InsufficientScope,
		_ => ProviderErrorKind::Transient,
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::http::{Response, StatusCode, header::RETRY_AFTER};
	// self
	use super::*;
	use crate::auth::{ScopeSet, account::tests::encode_id_token};

	fn authority() -> Url {
		Url::parse("https://login.example.com/common").expect("Authority fixture should parse.")
	}

	fn response(status: u16, body: &str) -> HttpResponse {
		Response::builder()
			.status(StatusCode::from_u16(status).expect("Status fixture should be valid."))
			.body(body.as_bytes().to_vec())
			.expect("Response fixture should build.")
	}

	#[test]
	fn authorization_validation_rejects_malformed_requests() {
		let valid = AuthorizationRequest::builder("client", "https://app.example.com/cb").build();

		assert!(validate_authorization_request(&valid, &authority()).is_ok());

		let empty_client = AuthorizationRequest::builder(" ", "https://app.example.com/cb").build();

		assert_eq!(
			validate_authorization_request(&empty_client, &authority()),
			Err(InvalidRequestError::EmptyClientId)
		);

		let relative = AuthorizationRequest::builder("client", "callback/path").build();

		assert_eq!(
			validate_authorization_request(&relative, &authority()),
			Err(InvalidRequestError::RelativeRedirectUri { value: "callback/path".into() })
		);

		let empty_state =
			AuthorizationRequest::builder("client", "https://app.example.com/cb").state("").build();

		assert_eq!(
			validate_authorization_request(&empty_state, &authority()),
			Err(InvalidRequestError::EmptyState)
		);

		let insecure = Url::parse("http://login.example.com/").expect("URL should parse.");

		assert!(matches!(
			validate_authorization_request(&valid, &insecure),
			Err(InvalidRequestError::InvalidAuthority { .. })
		));
	}

	#[test]
	fn token_validation_requires_grant_fields() {
		let missing_refresh = TokenRequest::refresh_token("client", "");

		assert_eq!(
			validate_token_request(&missing_refresh, &authority()),
			Err(InvalidRequestError::MissingRefreshToken)
		);

		let mut missing_redirect =
			TokenRequest::authorization_code("client", "code", "https://app.example.com/cb");

		missing_redirect.redirect_uri = None;

		assert_eq!(
			validate_token_request(&missing_redirect, &authority()),
			Err(InvalidRequestError::MissingRedirectUri { grant: GrantType::AuthorizationCode })
		);
		assert!(
			validate_token_request(&TokenRequest::client_credentials("client"), &authority())
				.is_ok()
		);
	}

	#[test]
	fn token_validation_rejects_foreign_credentials() {
		let mut code_with_refresh =
			TokenRequest::authorization_code("client", "code", "https://app.example.com/cb");

		code_with_refresh.refresh_token = Some(TokenSecret::new("rt-1"));

		assert_eq!(
			validate_token_request(&code_with_refresh, &authority()),
			Err(InvalidRequestError::ConflictingGrantCredential {
				grant: GrantType::AuthorizationCode,
				credential: "refresh_token",
			})
		);

		let mut refresh_with_code = TokenRequest::refresh_token("client", "rt-1");

		refresh_with_code.code = Some(TokenSecret::new("code-1"));

		assert_eq!(
			validate_token_request(&refresh_with_code, &authority()),
			Err(InvalidRequestError::ConflictingGrantCredential {
				grant: GrantType::RefreshToken,
				credential: "code",
			})
		);
	}

	#[test]
	fn parses_success_and_error_bodies() {
		let parsed = parse_token_http_response(&response(
			200,
			r#"{"access_token":"AT1","refresh_token":"RT1","expires_in":3600,"foo":"bar"}"#,
		))
		.expect("Success body should parse.");

		assert_eq!(parsed.access_token.as_ref().map(TokenSecret::expose), Some("AT1"));
		assert_eq!(parsed.extra_str("foo"), Some("bar"));

		let failure = parse_token_http_response(&response(
			400,
			r#"{"error":"invalid_grant","error_description":"code expired"}"#,
		))
		.expect_err("Error body should fail.");

		assert_eq!(failure.origin, FailureOrigin::Provider);
		assert_eq!(failure.error_code, "invalid_grant");
		assert_eq!(failure.error_description.as_deref(), Some("code expired"));
		assert_eq!(failure.http_status, Some(400));
		assert_eq!(classify_failure(&failure), ProviderErrorKind::InvalidGrant);
	}

	#[test]
	fn unparseable_bodies_are_server_failures() {
		let failure = parse_token_http_response(&response(502, "<html>bad gateway</html>"))
			.expect_err("HTML body should fail.");

		assert_eq!(failure.origin, FailureOrigin::Server);
		assert_eq!(failure.error_code, TokenFailure::SERVER_ERROR);
		assert_eq!(classify_failure(&failure), ProviderErrorKind::Transient);

		let failure = parse_token_http_response(&response(200, r#"{"access_token":42}"#))
			.expect_err("Mistyped body should fail.");

		assert_eq!(failure.origin, FailureOrigin::Server);
		assert!(
			failure.error_description.as_deref().is_some_and(|text| text.contains("access_token"))
		);
	}

	#[test]
	fn retry_after_is_surfaced_on_failures() {
		let mut throttled = response(429, r#"{"error":"temporarily_unavailable"}"#);

		throttled.headers_mut().insert(RETRY_AFTER, "7".parse().expect("Header should parse."));

		let failure = parse_token_http_response(&throttled).expect_err("429 should fail.");

		assert_eq!(failure.retry_after, Some(Duration::seconds(7)));
		assert_eq!(classify_failure(&failure), ProviderErrorKind::Transient);
	}

	#[test]
	fn classification_falls_back_to_description_then_status() {
		let hinted = TokenFailure::provider("custom", Some("interaction_required by policy".into()));

		assert_eq!(classify_failure(&hinted), ProviderErrorKind::InteractionRequired);

		let unauthorized = TokenFailure::server("denied").with_http_status(401);

		assert_eq!(classify_failure(&unauthorized), ProviderErrorKind::InvalidClient);
		assert_eq!(
			classify_failure(&TokenFailure::network("refused")),
			ProviderErrorKind::Transient
		);
	}

	#[test]
	fn default_account_comes_from_id_token() {
		let strategy = DefaultProviderStrategy;
		let mut payload: TokenResponse =
			serde_json::from_str(r#"{"access_token":"AT1"}"#).expect("Payload should parse.");

		assert_eq!(strategy.create_account(&payload).expect("No ID token is fine."), None);

		payload.id_token = Some(TokenSecret::new(encode_id_token(&serde_json::json!({
			"sub": "user-1",
			"preferred_username": "ada@example.com",
		}))));

		let account = strategy
			.create_account(&payload)
			.expect("Account should derive.")
			.expect("Account should be present.");

		assert_eq!(account.id, "user-1");
		assert_eq!(account.username.as_deref(), Some("ada@example.com"));
		assert_eq!(
			strategy.create_account(&payload).expect("Account should derive again."),
			Some(account)
		);
	}

	#[test]
	fn cache_identifier_is_stable_per_authority() {
		let strategy = DefaultProviderStrategy;
		let request = AuthorizationRequest::builder("client", "https://app.example.com/cb")
			.scope(ScopeSet::new(["openid"]).expect("Scope should build."))
			.build();
		let other = AuthorizationRequest::builder("client", "https://app.example.com/cb").build();
		let upper = Url::parse("https://LOGIN.example.com/common/").expect("URL should parse.");

		assert_eq!(strategy.issuer_cache_identifier(&request, &authority()), "login.example.com/common");
		assert_eq!(
			strategy.issuer_cache_identifier(&request, &authority()),
			strategy.issuer_cache_identifier(&other, &upper)
		);
	}
}
