//! Provider-agnostic authorization-code engine.
//!
//! [`OAuth2Engine`] owns only read-only configuration (descriptor, strategy, transport,
//! client secret, log policy). Every call receives all attempt state as arguments, so one
//! engine can serve concurrent, unrelated attempts without locking.

mod authorization;
mod token;

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	authorization::AuthorizationRequest,
	error::InvalidRequestError,
	http::TokenHttpClient,
	obs::LogPolicy,
	provider::{GrantType, ProviderDescriptor, ProviderStrategy},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Engine specialized for the crate's default reqwest transport.
pub type ReqwestEngine = OAuth2Engine<ReqwestHttpClient>;

/// Drives authorization attempts and token exchanges against one provider descriptor.
#[derive(Clone)]
pub struct OAuth2Engine<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// HTTP client used for every token endpoint call.
	pub http_client: Arc<C>,
	/// Provider descriptor that defines the authority, endpoints, and quirks.
	pub descriptor: ProviderDescriptor,
	/// Provider hooks for validation, response parsing, and account derivation.
	pub strategy: Arc<dyn ProviderStrategy>,
	/// Client secret for confidential clients.
	pub client_secret: Option<TokenSecret>,
	/// Logging configuration, fixed at construction.
	pub log_policy: LogPolicy,
}
impl<C> OAuth2Engine<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Creates an engine over a caller-provided transport.
	pub fn with_http_client(
		descriptor: ProviderDescriptor,
		strategy: Arc<dyn ProviderStrategy>,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			descriptor,
			strategy,
			client_secret: None,
			log_policy: LogPolicy::default(),
		}
	}

	/// Sets the client secret applied per the descriptor's client authentication method.
	pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(TokenSecret::new(secret));

		self
	}

	/// Replaces the logging policy.
	pub fn with_log_policy(mut self, policy: LogPolicy) -> Self {
		self.log_policy = policy;

		self
	}

	/// Deterministic cache key for the issuer serving `request`.
	pub fn issuer_cache_identifier(&self, request: &AuthorizationRequest) -> String {
		self.strategy.issuer_cache_identifier(request, self.authority_for(request.authority.as_ref()))
	}

	fn authority_for<'a>(&'a self, authority: Option<&'a Url>) -> &'a Url {
		authority.unwrap_or(&self.descriptor.authority)
	}

	fn ensure_grant_supported(&self, grant: &GrantType) -> Result<(), InvalidRequestError> {
		if self.descriptor.supports(grant) {
			Ok(())
		} else {
			Err(InvalidRequestError::UnsupportedGrant {
				provider: self.descriptor.id.to_string(),
				grant: grant.clone(),
			})
		}
	}
}
#[cfg(feature = "reqwest")]
impl OAuth2Engine<ReqwestHttpClient> {
	/// Creates an engine with its own reqwest transport (redirects disabled).
	pub fn new(descriptor: ProviderDescriptor, strategy: Arc<dyn ProviderStrategy>) -> Result<Self> {
		Ok(Self::with_http_client(descriptor, strategy, ReqwestHttpClient::new()?))
	}
}
impl<C> Debug for OAuth2Engine<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuth2Engine")
			.field("descriptor", &self.descriptor)
			.field("strategy", &self.strategy.name())
			.field("client_secret_set", &self.client_secret.is_some())
			.field("log_policy", &self.log_policy)
			.finish()
	}
}
