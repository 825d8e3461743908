//! Outcome of the interactive authorization step.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// What the authorization strategy observed at the end of the interactive step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthorizationResult {
	/// The provider redirected back with a code.
	Success {
		/// Authorization code.
		code: TokenSecret,
		/// Returned `state`, if the redirect carried one.
		state: Option<String>,
		/// Every other redirect parameter (provider extensions live here).
		parameters: BTreeMap<String, String>,
	},
	/// The user abandoned the interaction (dismissed the UI, timer expired, ...).
	Cancelled,
	/// The provider redirected back with an OAuth error.
	Error {
		/// OAuth error code.
		code: String,
		/// Human-readable description.
		description: Option<String>,
	},
}
impl AuthorizationResult {
	/// Error code used when a redirect carries neither `code` nor `error`.
	pub const INVALID_REDIRECT: &'static str = "invalid_redirect";

	/// Parses a redirect URI, reading the query or, when the query is empty, the fragment.
	pub fn from_redirect(redirect: &Url) -> Self {
		let raw = match (redirect.query(), redirect.fragment()) {
			(Some(query), _) if !query.is_empty() => query,
			(_, Some(fragment)) => fragment,
			_ => "",
		};
		let mut parameters: BTreeMap<String, String> = url::form_urlencoded::parse(raw.as_bytes())
			.map(|(key, value)| (key.into_owned(), value.into_owned()))
			.collect();

		if let Some(code) = parameters.remove("error") {
			let description = parameters.remove("error_description");

			return AuthorizationResult::Error { code, description };
		}

		match parameters.remove("code") {
			Some(code) => {
				let state = parameters.remove("state");

				AuthorizationResult::Success { code: TokenSecret::new(code), state, parameters }
			},
			None => AuthorizationResult::Error {
				code: Self::INVALID_REDIRECT.into(),
				description: Some("Redirect carries neither `code` nor `error`.".into()),
			},
		}
	}
}
