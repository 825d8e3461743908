//! Microsoft identity platform (Azure AD) strategy.
//!
//! Azure AD authorities carry the tenant as their first path segment
//! (`https://login.microsoftonline.com/{tenant}`), return cloud-instance metadata on the
//! redirect, and identify users by the `oid`/`tid` claim pair.

// self
use crate::{
	_prelude::*,
	auth::{Account, AccountError, IdTokenClaims, TenantId, account},
	authorization::{AuthorizationExtensions, AuthorizationRequest},
	error::InvalidRequestError,
	provider::{GrantType, ProviderErrorKind, ProviderStrategy, strategy},
	token::{TokenFailure, TokenRequest, TokenResponse},
};

/// [`ProviderStrategy`] for Azure AD v2.0 endpoints.
#[derive(Clone, Copy, Debug, Default)]
pub struct AzureActiveDirectoryStrategy;
impl AzureActiveDirectoryStrategy {
	/// Form field asking the token endpoint to return `client_info`.
	pub const CLIENT_INFO: &'static str = "client_info";

	const INTERACTION_REQUIRED_CODES: [&'static str; 5] =
		["AADSTS50076", "AADSTS50079", "AADSTS50158", "AADSTS65001", "AADSTS50105"];
	const INVALID_GRANT_CODES: [&'static str; 3] = ["AADSTS70008", "AADSTS700082", "AADSTS54005"];
}
impl Display for AzureActiveDirectoryStrategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("azure-active-directory-strategy")
	}
}
impl ProviderStrategy for AzureActiveDirectoryStrategy {
	fn name(&self) -> &'static str {
		"azure_active_directory"
	}

	fn validate_authorization_request(
		&self,
		request: &AuthorizationRequest,
		authority: &Url,
	) -> Result<(), InvalidRequestError> {
		strategy::validate_authorization_request(request, authority)?;

		validate_tenant_authority(authority)
	}

	fn validate_token_request(
		&self,
		request: &TokenRequest,
		authority: &Url,
	) -> Result<(), InvalidRequestError> {
		strategy::validate_token_request(request, authority)?;

		validate_tenant_authority(authority)
	}

	fn issuer_cache_identifier(&self, _request: &AuthorizationRequest, authority: &Url) -> String {
		let host = authority.host_str().unwrap_or_default().to_ascii_lowercase();

		match tenant_segment(authority) {
			Some(tenant) => format!("{host}/{}", tenant.to_ascii_lowercase()),
			None => host,
		}
	}

	fn create_account(&self, response: &TokenResponse) -> Result<Option<Account>, AccountError> {
		let Some(id_token) = &response.id_token else {
			return Ok(None);
		};
		let claims = IdTokenClaims::decode(id_token.expose())?;
		let id = claims
			.extra_str("oid")
			.map(str::to_owned)
			.or_else(|| claims.sub.clone())
			.ok_or(AccountError::MissingClaim { claim: "oid" })?;
		let username = claims
			.preferred_username
			.clone()
			.or_else(|| claims.extra_str("upn").map(str::to_owned))
			.or_else(|| claims.email.clone());
		let tenant_id = claims.extra_str("tid").and_then(|tid| TenantId::new(tid).ok());

		Ok(Some(Account {
			id,
			username,
			display_name: claims.name.clone(),
			issuer: claims.iss.clone(),
			tenant_id,
			claims: account::claim_map(claims),
		}))
	}

	fn authorization_extensions(
		&self,
		parameters: &BTreeMap<String, String>,
	) -> AuthorizationExtensions {
		let field = |key: &str| parameters.get(key).filter(|value| !value.is_empty()).cloned();

		AuthorizationExtensions {
			cloud_instance_name: field(AuthorizationExtensions::CLOUD_INSTANCE_NAME),
			cloud_instance_host_name: field(AuthorizationExtensions::CLOUD_INSTANCE_HOST_NAME),
			cloud_graph_host_name: field(AuthorizationExtensions::CLOUD_GRAPH_HOST_NAME),
			session_state: field(AuthorizationExtensions::SESSION_STATE),
			correlation_id: field(AuthorizationExtensions::CORRELATION_ID),
		}
	}

	fn augment_token_request(&self, grant: &GrantType, form: &mut BTreeMap<String, String>) {
		if matches!(grant, GrantType::AuthorizationCode | GrantType::RefreshToken) {
			form.entry(Self::CLIENT_INFO.into()).or_insert_with(|| "1".into());
		}
	}

	fn classify_failure(&self, failure: &TokenFailure) -> ProviderErrorKind {
		let description = failure.error_description.as_deref().unwrap_or_default();
		let mentions = |codes: &[&str]| codes.iter().any(|code| description.contains(code));

		if mentions(&Self::INTERACTION_REQUIRED_CODES) {
			return ProviderErrorKind::InteractionRequired;
		}
		if mentions(&Self::INVALID_GRANT_CODES) {
			return ProviderErrorKind::InvalidGrant;
		}

		strategy::classify_failure(failure)
	}
}

fn tenant_segment(authority: &Url) -> Option<&str> {
	authority.path_segments()?.find(|segment| !segment.is_empty())
}

fn validate_tenant_authority(authority: &Url) -> Result<(), InvalidRequestError> {
	if authority.scheme() != "https" || tenant_segment(authority).is_none() {
		return Err(InvalidRequestError::InvalidAuthority { url: authority.to_string() });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::{TokenSecret, account::tests::encode_id_token};

	fn authority(value: &str) -> Url {
		Url::parse(value).expect("Authority fixture should parse.")
	}

	#[test]
	fn tenant_segment_is_required() {
		let strategy = AzureActiveDirectoryStrategy;
		let request = AuthorizationRequest::builder("client", "https://app.example.com/cb").build();

		assert!(
			strategy
				.validate_authorization_request(
					&request,
					&authority("https://login.microsoftonline.com/contoso.onmicrosoft.com")
				)
				.is_ok()
		);
		assert!(matches!(
			strategy.validate_authorization_request(
				&request,
				&authority("https://login.microsoftonline.com/")
			),
			Err(InvalidRequestError::InvalidAuthority { .. })
		));
		assert!(matches!(
			strategy.validate_token_request(
				&TokenRequest::refresh_token("client", "RT1"),
				&authority("http://127.0.0.1:8080/common")
			),
			Err(InvalidRequestError::InvalidAuthority { .. })
		));
	}

	#[test]
	fn cache_identifier_is_host_and_tenant() {
		let strategy = AzureActiveDirectoryStrategy;
		let request = AuthorizationRequest::builder("client", "https://app.example.com/cb").build();

		assert_eq!(
			strategy.issuer_cache_identifier(
				&request,
				&authority("https://login.microsoftonline.com/Contoso/v2.0")
			),
			"login.microsoftonline.com/contoso"
		);
	}

	#[test]
	fn account_prefers_object_id_and_tenant() {
		let strategy = AzureActiveDirectoryStrategy;
		let mut payload: TokenResponse =
			serde_json::from_str(r#"{"access_token":"AT1"}"#).expect("Payload should parse.");

		payload.id_token = Some(TokenSecret::new(encode_id_token(&serde_json::json!({
			"iss": "https://login.microsoftonline.com/tenant-1/v2.0",
			"sub": "pairwise-sub",
			"oid": "object-1",
			"tid": "tenant-1",
			"upn": "ada@contoso.com",
			"name": "Ada",
		}))));

		let account = strategy
			.create_account(&payload)
			.expect("Account should derive.")
			.expect("Account should be present.");

		assert_eq!(account.id, "object-1");
		assert_eq!(account.username.as_deref(), Some("ada@contoso.com"));
		assert_eq!(account.tenant_id.as_deref(), Some("tenant-1"));
		assert_eq!(account.display_name.as_deref(), Some("Ada"));
	}

	#[test]
	fn extensions_are_absent_unless_returned() {
		let strategy = AzureActiveDirectoryStrategy;
		let parameters = BTreeMap::from([
			("cloud_instance_name".to_owned(), "microsoftonline.com".to_owned()),
			("session_state".to_owned(), "ss-1".to_owned()),
		]);
		let extensions = strategy.authorization_extensions(&parameters);

		assert_eq!(extensions.cloud_instance_name.as_deref(), Some("microsoftonline.com"));
		assert_eq!(extensions.session_state.as_deref(), Some("ss-1"));
		assert_eq!(extensions.cloud_graph_host_name, None);
		assert_eq!(extensions.correlation_id, None);
		assert!(strategy.authorization_extensions(&BTreeMap::new()).is_empty());
	}

	#[test]
	fn client_info_is_added_without_overriding() {
		let strategy = AzureActiveDirectoryStrategy;
		let mut form = BTreeMap::new();

		strategy.augment_token_request(&GrantType::AuthorizationCode, &mut form);

		assert_eq!(form.get("client_info").map(String::as_str), Some("1"));

		let mut explicit = BTreeMap::from([("client_info".to_owned(), "0".to_owned())]);

		strategy.augment_token_request(&GrantType::RefreshToken, &mut explicit);

		assert_eq!(explicit.get("client_info").map(String::as_str), Some("0"));

		let mut credentials = BTreeMap::new();

		strategy.augment_token_request(&GrantType::ClientCredentials, &mut credentials);

		assert!(credentials.is_empty());
	}

	#[test]
	fn aadsts_codes_refine_classification() {
		let strategy = AzureActiveDirectoryStrategy;
		let mfa = TokenFailure::provider(
			"invalid_grant",
			Some("AADSTS50076: multi-factor authentication required.".into()),
		);

		assert_eq!(strategy.classify_failure(&mfa), ProviderErrorKind::InteractionRequired);

		let consent = TokenFailure::provider("consent_required", None);

		assert_eq!(strategy.classify_failure(&consent), ProviderErrorKind::InteractionRequired);

		let expired = TokenFailure::provider(
			"invalid_request",
			Some("AADSTS700082: The refresh token has expired.".into()),
		);

		assert_eq!(strategy.classify_failure(&expired), ProviderErrorKind::InvalidGrant);
	}
}
