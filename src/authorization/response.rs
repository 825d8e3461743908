//! Verified authorization response handed back to callers.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Verified result of an authorization attempt.
///
/// A code is only ever present after the returned `state` matched the request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizationResponse {
	/// Terminal outcome of the attempt.
	pub outcome: AuthorizationOutcome,
	/// `state` of the originating request.
	pub state: String,
	/// Provider extension parameters surfaced by the interactive step.
	pub extensions: AuthorizationExtensions,
}
impl AuthorizationResponse {
	/// Authorization code, present only for [`AuthorizationOutcome::Authorized`].
	pub fn code(&self) -> Option<&TokenSecret> {
		match &self.outcome {
			AuthorizationOutcome::Authorized { code } => Some(code),
			_ => None,
		}
	}

	/// Returns true when a verified code is available.
	pub fn is_authorized(&self) -> bool {
		matches!(self.outcome, AuthorizationOutcome::Authorized { .. })
	}

	/// Returns true when the user abandoned the attempt.
	pub fn is_cancelled(&self) -> bool {
		matches!(self.outcome, AuthorizationOutcome::Cancelled)
	}
}

/// Terminal outcome of an authorization attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthorizationOutcome {
	/// The state matched and a code was issued.
	Authorized {
		/// Authorization code.
		code: TokenSecret,
	},
	/// The user abandoned the attempt.
	Cancelled,
	/// The provider returned an OAuth error.
	Failed {
		/// OAuth error code.
		error: String,
		/// Human-readable description.
		error_description: Option<String>,
	},
}

/// Provider-specific fields some identity providers return next to the code.
///
/// Each field stays `None` unless the provider actually returned it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationExtensions {
	/// Cloud instance name (e.g., `microsoftonline.com`).
	pub cloud_instance_name: Option<String>,
	/// Cloud instance host name (e.g., `login.microsoftonline.com`).
	pub cloud_instance_host_name: Option<String>,
	/// Graph host name for the cloud (e.g., `graph.windows.net`).
	pub cloud_graph_host_name: Option<String>,
	/// OIDC session state.
	pub session_state: Option<String>,
	/// Correlation identifier echoed by the provider.
	pub correlation_id: Option<String>,
}
impl AuthorizationExtensions {
	/// Redirect parameter carrying the cloud instance name.
	pub const CLOUD_INSTANCE_NAME: &'static str = "cloud_instance_name";
	/// Redirect parameter carrying the cloud instance host name.
	pub const CLOUD_INSTANCE_HOST_NAME: &'static str = "cloud_instance_host_name";
	/// Redirect parameter carrying the Graph host name.
	pub const CLOUD_GRAPH_HOST_NAME: &'static str = "cloud_graph_host_name";
	/// Redirect parameter carrying the session state.
	pub const SESSION_STATE: &'static str = "session_state";
	/// Redirect parameter carrying the correlation identifier.
	pub const CORRELATION_ID: &'static str = "correlation_id";

	/// Returns true when no extension field is populated.
	pub fn is_empty(&self) -> bool {
		*self == Self::default()
	}
}
