//! Normalized outcome of a token exchange.

// self
use crate::{
	_prelude::*,
	auth::{Account, CorrelationId, ScopeSet, TokenSecret},
	provider::ProviderErrorKind,
	token::TokenResponse,
};

/// Tagged outcome of [`OAuth2Engine::request_token`](crate::engine::OAuth2Engine::request_token).
#[derive(Clone, Debug)]
pub enum TokenResult {
	/// Tokens were issued.
	Success(Box<TokenSuccess>),
	/// The exchange failed at the provider, the server, or the network.
	Failure(TokenFailure),
}
impl TokenResult {
	/// Returns true for [`TokenResult::Success`].
	pub fn is_success(&self) -> bool {
		matches!(self, TokenResult::Success(_))
	}

	/// Borrows the success payload, if any.
	pub fn success(&self) -> Option<&TokenSuccess> {
		match self {
			TokenResult::Success(success) => Some(success),
			TokenResult::Failure(_) => None,
		}
	}

	/// Borrows the failure payload, if any.
	pub fn failure(&self) -> Option<&TokenFailure> {
		match self {
			TokenResult::Success(_) => None,
			TokenResult::Failure(failure) => Some(failure),
		}
	}

	/// Correlation identifier sent with the request that produced this result.
	pub fn correlation_id(&self) -> Option<CorrelationId> {
		match self {
			TokenResult::Success(success) => Some(success.correlation_id),
			TokenResult::Failure(failure) => failure.correlation_id,
		}
	}
}

/// Tokens and identity issued by a successful exchange.
#[derive(Clone, Debug)]
pub struct TokenSuccess {
	/// Access token.
	pub access_token: TokenSecret,
	/// Refresh token, when issued.
	pub refresh_token: Option<TokenSecret>,
	/// ID token, when issued.
	pub id_token: Option<TokenSecret>,
	/// Token type reported by the provider.
	pub token_type: Option<String>,
	/// Granted scopes, when reported.
	pub scope: Option<ScopeSet>,
	/// Absolute expiry derived from `expires_in` and the receipt instant.
	pub expires_at: Option<OffsetDateTime>,
	/// Account derived from the response, when the provider identifies one.
	pub account: Option<Account>,
	/// Correlation identifier sent with the request.
	pub correlation_id: CorrelationId,
	/// Raw decoded payload, including members the engine does not interpret.
	pub response: TokenResponse,
}

/// Where a token exchange failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureOrigin {
	/// Well-formed OAuth error returned by the provider.
	Provider,
	/// Non-success response with an unparseable or generic body, or an unusable success body.
	Server,
	/// The token endpoint could not be reached.
	Network,
}

/// Inspectable failure of a token exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenFailure {
	/// Failure origin.
	pub origin: FailureOrigin,
	/// OAuth error code, or [`SERVER_ERROR`](Self::SERVER_ERROR) /
	/// [`NETWORK_ERROR`](Self::NETWORK_ERROR) for non-provider failures.
	pub error_code: String,
	/// Human-readable description.
	pub error_description: Option<String>,
	/// HTTP status, when a response was received.
	pub http_status: Option<u16>,
	/// Retry-After hint, when the provider supplied one.
	pub retry_after: Option<Duration>,
	/// Correlation identifier sent with the request.
	pub correlation_id: Option<CorrelationId>,
	/// Provider classification used by callers to pick a reaction.
	pub kind: ProviderErrorKind,
}
impl TokenFailure {
	/// Generic code for server-side failures without a usable OAuth error body.
	pub const SERVER_ERROR: &'static str = "server_error";
	/// Code for transport-level failures.
	pub const NETWORK_ERROR: &'static str = "network_error";

	/// OAuth error returned by the provider.
	pub fn provider(error_code: impl Into<String>, error_description: Option<String>) -> Self {
		Self::new(FailureOrigin::Provider, error_code.into(), error_description)
	}

	/// Server failure without a usable OAuth error body.
	pub fn server(description: impl Into<String>) -> Self {
		Self::new(FailureOrigin::Server, Self::SERVER_ERROR.into(), Some(description.into()))
	}

	/// Transport failure before any response was received.
	pub fn network(description: impl Into<String>) -> Self {
		Self::new(FailureOrigin::Network, Self::NETWORK_ERROR.into(), Some(description.into()))
	}

	fn new(origin: FailureOrigin, error_code: String, error_description: Option<String>) -> Self {
		Self {
			origin,
			error_code,
			error_description,
			http_status: None,
			retry_after: None,
			correlation_id: None,
			kind: ProviderErrorKind::Transient,
		}
	}

	/// Adds the HTTP status code.
	pub fn with_http_status(mut self, status: u16) -> Self {
		self.http_status = Some(status);

		self
	}

	/// Adds a Retry-After hint.
	pub fn with_retry_after(mut self, retry_after: Option<Duration>) -> Self {
		self.retry_after = retry_after;

		self
	}

	/// Adds the correlation identifier.
	pub fn with_correlation_id(mut self, correlation_id: CorrelationId) -> Self {
		self.correlation_id = Some(correlation_id);

		self
	}

	/// Overrides the classification.
	pub fn with_kind(mut self, kind: ProviderErrorKind) -> Self {
		self.kind = kind;

		self
	}
}
impl Display for TokenFailure {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match &self.error_description {
			Some(description) => write!(f, "{}: {description}", self.error_code),
			None => f.write_str(&self.error_code),
		}
	}
}
