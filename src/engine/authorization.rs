//! Authorization step: validation, URI construction, delegation, and state reconciliation.

// self
use crate::{
	_prelude::*,
	authorization::{
		AuthorizationExtensions, AuthorizationOutcome, AuthorizationRequest,
		AuthorizationResponse, AuthorizationResult, AuthorizationStrategy,
	},
	engine::OAuth2Engine,
	error::InvalidRequestError,
	http::TokenHttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan, LogLevel},
	provider::GrantType,
};

// Query keys the engine writes itself; extra parameters never override them.
const RESERVED_QUERY_KEYS: [&str; 9] = [
	"response_type",
	"client_id",
	"redirect_uri",
	"scope",
	"state",
	"code_challenge",
	"code_challenge_method",
	"login_hint",
	"prompt",
];

impl<C> OAuth2Engine<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Runs one authorization attempt through `strategy`.
	///
	/// Validation happens before the strategy is invoked; invalid requests never reach the
	/// interactive step. A returned `state` that differs from the request's (or is missing)
	/// fails with [`Error::StateMismatch`] and no code is surfaced. Cancellation and provider
	/// errors resolve to a response without a code. Nothing is retried.
	pub async fn request_authorization<S>(
		&self,
		request: &AuthorizationRequest,
		strategy: &S,
	) -> Result<AuthorizationResponse>
	where
		S: ?Sized + AuthorizationStrategy,
	{
		const KIND: FlowKind = FlowKind::Authorization;

		let span = FlowSpan::new(KIND, "request_authorization");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let authorization_uri = self.authorization_url(request)?;

				self.log_policy.emit_pii(
					LogLevel::Verbose,
					None,
					format_args!("Authorization URI: {authorization_uri}."),
				);

				let outcome = strategy.request_authorization(&authorization_uri, request).await;

				self.reconcile_authorization(request, outcome)
			})
			.await;
		let outcome = match &result {
			Ok(response) if response.is_authorized() => FlowOutcome::Success,
			Ok(response) if response.is_cancelled() => FlowOutcome::Cancelled,
			_ => FlowOutcome::Failure,
		};

		obs::record_flow_outcome(KIND, outcome);

		result
	}

	/// Validates `request` and builds the provider's authorization URI.
	///
	/// Pure construction: no network access.
	pub fn authorization_url(&self, request: &AuthorizationRequest) -> Result<Url> {
		let authority = self.authority_for(request.authority.as_ref());

		self.strategy.validate_authorization_request(request, authority)?;
		self.ensure_grant_supported(&GrantType::AuthorizationCode)?;

		if self.descriptor.quirks.pkce_required && request.pkce.is_none() {
			return Err(InvalidRequestError::MissingPkce.into());
		}

		request
			.scope
			.ensure_joinable(self.descriptor.quirks.scope_delimiter)
			.map_err(InvalidRequestError::from)?;

		let mut url = self.descriptor.authorization_endpoint(Some(authority))?;

		{
			let mut query = url.query_pairs_mut();

			query
				.append_pair("response_type", "code")
				.append_pair("client_id", &request.client_id)
				.append_pair("redirect_uri", &request.redirect_uri);

			if let Some(scope) = request.scope.join(self.descriptor.quirks.scope_delimiter) {
				query.append_pair("scope", &scope);
			}

			query.append_pair("state", &request.state);

			if let Some(pkce) = &request.pkce {
				query
					.append_pair("code_challenge", pkce.challenge())
					.append_pair("code_challenge_method", pkce.method().as_str());
			}
			if let Some(hint) = &request.login_hint {
				query.append_pair("login_hint", hint);
			}
			if let Some(prompt) = &request.prompt {
				query.append_pair("prompt", prompt);
			}

			for (key, value) in &request.extra_parameters {
				if !RESERVED_QUERY_KEYS.contains(&key.as_str()) {
					query.append_pair(key, value);
				}
			}
		}

		Ok(url)
	}

	fn reconcile_authorization(
		&self,
		request: &AuthorizationRequest,
		result: AuthorizationResult,
	) -> Result<AuthorizationResponse> {
		let outcome = match result {
			AuthorizationResult::Success { code, state, parameters } => {
				if state.as_deref() != Some(request.state.as_str()) {
					self.log_policy.emit(
						LogLevel::Warn,
						None,
						"Authorization state mismatch; discarding the returned code.",
					);

					return Err(Error::StateMismatch { expected: request.state.clone(), returned: state });
				}

				let extensions = self.strategy.authorization_extensions(&parameters);

				return Ok(AuthorizationResponse {
					outcome: AuthorizationOutcome::Authorized { code },
					state: request.state.clone(),
					extensions,
				});
			},
			AuthorizationResult::Cancelled => {
				self.log_policy.emit(LogLevel::Info, None, "Authorization cancelled by the user.");

				AuthorizationOutcome::Cancelled
			},
			AuthorizationResult::Error { code, description } => {
				self.log_policy.emit(
					LogLevel::Error,
					None,
					format_args!("Authorization failed with `{code}`."),
				);

				AuthorizationOutcome::Failed { error: code, error_description: description }
			},
		};

		Ok(AuthorizationResponse {
			outcome,
			state: request.state.clone(),
			extensions: AuthorizationExtensions::default(),
		})
	}
}
