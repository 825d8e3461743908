//! Walks one authorization-code attempt end to end against a local mock provider.
//!
//! 1. Build an [`AuthorizationRequest`] with a generated `state` and PKCE pair.
//! 2. Let an [`AuthorizationStrategy`] "visit" the authorization URI and parse the redirect the
//!    provider would send back.
//! 3. Redeem the returned code at the token endpoint through [`ReqwestEngine`].

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use oauth2_strategy::{
	auth::{ProviderId, ScopeSet},
	authorization::{
		AuthorizationFuture, AuthorizationRequest, AuthorizationResult, AuthorizationStrategy,
	},
	engine::ReqwestEngine,
	provider::{DefaultProviderStrategy, GrantType, ProviderDescriptor},
	url::Url,
};

const REDIRECT_URI: &str = "http://127.0.0.1:8400/callback";

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/common/oauth2/v2.0/token").body_includes("code=demo-code");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"Bearer\",\"expires_in\":3600,\"scope\":\"openid profile\"}",
			);
		})
		.await;
	let descriptor = ProviderDescriptor::builder(ProviderId::new("demo-provider")?)
		.authority(Url::parse(&server.url("/common"))?)
		.authorization_path("oauth2/v2.0/authorize")
		.token_path("oauth2/v2.0/token")
		.support_grants([GrantType::AuthorizationCode, GrantType::RefreshToken])
		.build()?;
	let engine = ReqwestEngine::new(descriptor, Arc::new(DefaultProviderStrategy))?;
	let request = AuthorizationRequest::builder("demo-client", REDIRECT_URI)
		.scope(ScopeSet::new(["openid", "profile"])?)
		.with_generated_pkce()
		.build();
	let response = engine.request_authorization(&request, &LoopbackBrowser).await?;
	let Some(code) = response.code() else {
		println!("Authorization ended without a code: {:?}.", response.outcome);

		return Ok(());
	};
	let result = engine.request_token(&request.token_request(code)).await?;

	match result.success() {
		Some(success) => println!(
			"Redeemed access token {} with scopes `{}`.",
			success.access_token.expose(),
			success.scope.as_ref().map(ToString::to_string).unwrap_or_default(),
		),
		None => println!("Token endpoint rejected the code: {:?}.", result.failure()),
	}

	token_mock.assert_async().await;

	Ok(())
}

/// Stands in for a browser: consent is granted immediately and the provider redirects back with
/// the `state` it was handed.
struct LoopbackBrowser;
impl AuthorizationStrategy for LoopbackBrowser {
	fn request_authorization<'a>(
		&'a self,
		authorization_uri: &'a Url,
		request: &'a AuthorizationRequest,
	) -> AuthorizationFuture<'a> {
		Box::pin(async move {
			println!("Visiting {authorization_uri}.");

			let state = authorization_uri
				.query_pairs()
				.find(|(key, _)| key == "state")
				.map(|(_, value)| value.into_owned())
				.unwrap_or_default();
			let mut redirect = match Url::parse(&request.redirect_uri) {
				Ok(redirect) => redirect,
				Err(e) =>
					return AuthorizationResult::Error {
						code: "invalid_redirect".into(),
						description: Some(e.to_string()),
					},
			};

			redirect.query_pairs_mut().append_pair("code", "demo-code").append_pair("state", &state);

			AuthorizationResult::from_redirect(&redirect)
		})
	}
}
