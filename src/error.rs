//! Engine-level error types for failures that never reach (or never leave) the network.
//!
//! Anything the token endpoint answers, including transport failures while trying to
//! reach it, is reported as a [`TokenFailure`](crate::token::TokenFailure) value instead.

// self
use crate::{_prelude::*, auth::ScopeValidationError, provider::GrantType};

/// Engine-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical engine error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local validation failure; no interactive or network step was attempted.
	#[error(transparent)]
	InvalidRequest(#[from] InvalidRequestError),
	/// The `state` returned by the authorization step differs from the one sent.
	#[error("Authorization state mismatch.")]
	StateMismatch {
		/// State value generated for the request.
		expected: String,
		/// State value surfaced by the authorization step, if any.
		returned: Option<String>,
	},
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
}

/// Structural validation failures raised by provider validation hooks.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum InvalidRequestError {
	/// The client identifier was empty or whitespace.
	#[error("Client identifier cannot be empty.")]
	EmptyClientId,
	/// The redirect URI is missing for a grant that requires it.
	#[error("Redirect URI is required for the {grant} grant.")]
	MissingRedirectUri {
		/// Grant that requires the redirect URI.
		grant: GrantType,
	},
	/// The redirect URI could not be parsed as an absolute URI.
	#[error("Redirect URI must be absolute: {value}.")]
	RelativeRedirectUri {
		/// Offending redirect URI.
		value: String,
	},
	/// The request `state` was empty.
	#[error("Authorization state cannot be empty.")]
	EmptyState,
	/// The authorization code is missing for the authorization_code grant.
	#[error("Authorization code is required for the authorization_code grant.")]
	MissingAuthorizationCode,
	/// The refresh token is missing for the refresh_token grant.
	#[error("Refresh token is required for the refresh_token grant.")]
	MissingRefreshToken,
	/// The request carries the credential of another grant next to its own.
	#[error("The {grant} grant cannot carry a `{credential}` value.")]
	ConflictingGrantCredential {
		/// Grant being requested.
		grant: GrantType,
		/// Form field of the foreign credential.
		credential: &'static str,
	},
	/// A scope entry cannot be sent with the provider's delimiter.
	#[error(transparent)]
	InvalidScope(#[from] ScopeValidationError),
	/// The provider requires PKCE but the request carries no challenge or verifier.
	#[error("Provider requires PKCE for the authorization_code grant.")]
	MissingPkce,
	/// The authority uses an insecure scheme or lacks a segment the provider requires.
	#[error("Authority is invalid: {url}.")]
	InvalidAuthority {
		/// Offending authority.
		url: String,
	},
	/// The descriptor does not enable the grant.
	#[error("Provider `{provider}` does not enable the {grant} grant.")]
	UnsupportedGrant {
		/// Provider identifier string.
		provider: String,
		/// Disabled grant.
		grant: GrantType,
	},
}

/// Configuration failures raised while assembling outbound requests.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// An endpoint could not be derived from the authority.
	#[error("Authority `{authority}` cannot carry endpoint paths.")]
	InvalidEndpoint {
		/// Authority that cannot be used as a base URL.
		authority: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}
