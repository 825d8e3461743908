//! Plugs a hand-written [`TokenHttpClient`] into the engine instead of reqwest.
//!
//! 1. Implement [`TokenHttpClient::execute`] so it returns a canned provider response or a
//!    transport error.
//! 2. Hand the client to [`OAuth2Engine::with_http_client`].
//! 3. Inspect the [`TokenResult`]: transport errors come back as failures, never as `Err`.

// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	sync::Arc,
};
// crates.io
use color_eyre::Result;
// self
use oauth2_strategy::{
	auth::{ProviderId, ScopeSet},
	engine::OAuth2Engine,
	http::{
		HttpClientError, HttpFuture, HttpRequest, HttpResponse, TokenHttpClient,
		oauth2::http::{HeaderValue, StatusCode, header::CONTENT_TYPE},
	},
	provider::{DefaultProviderStrategy, GrantType, ProviderDescriptor, ProviderStrategy},
	token::{TokenRequest, TokenResult},
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let strategy: Arc<dyn ProviderStrategy> = Arc::new(DefaultProviderStrategy);
	let descriptor = ProviderDescriptor::builder(ProviderId::new("mock-provider")?)
		.authority(Url::parse("https://provider.example.com/tenant-acme")?)
		.token_path("oauth2/token")
		.authorization_path("oauth2/authorize")
		.support_grants([GrantType::AuthorizationCode, GrantType::RefreshToken])
		.build()?;
	let request = TokenRequest::refresh_token("demo-client", "demo-refresh")
		.with_scope(ScopeSet::new(["profile.read"])?);
	let engine: OAuth2Engine<CannedHttpClient> = OAuth2Engine::with_http_client(
		descriptor.clone(),
		Arc::clone(&strategy),
		CannedHttpClient::Respond(StatusCode::OK),
	)
	.with_client_secret("demo-secret");

	report("canned 200", engine.request_token(&request).await?);

	let rejecting: OAuth2Engine<CannedHttpClient> = OAuth2Engine::with_http_client(
		descriptor.clone(),
		Arc::clone(&strategy),
		CannedHttpClient::Respond(StatusCode::BAD_REQUEST),
	);

	report("canned 400", rejecting.request_token(&request).await?);

	let unreachable: OAuth2Engine<CannedHttpClient> = OAuth2Engine::with_http_client(
		descriptor,
		strategy,
		CannedHttpClient::Fail(CannedTransportError::DnsFailure { host: "provider.example.com" }),
	);

	report("unreachable host", unreachable.request_token(&request).await?);

	Ok(())
}

fn report(label: &str, result: TokenResult) {
	match result {
		TokenResult::Success(success) => println!(
			"{label}: access token {} (request id {}).",
			success.access_token.expose(),
			success.correlation_id
		),
		TokenResult::Failure(failure) => println!(
			"{label}: {:?} failure `{}` classified as {:?}.",
			failure.origin, failure.error_code, failure.kind
		),
	}
}

#[derive(Clone, Debug)]
enum CannedTransportError {
	DnsFailure { host: &'static str },
}
impl Display for CannedTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::DnsFailure { host } => write!(f, "DNS lookup failed for {host}"),
		}
	}
}
impl StdError for CannedTransportError {}

enum CannedHttpClient {
	Respond(StatusCode),
	Fail(CannedTransportError),
}
impl TokenHttpClient for CannedHttpClient {
	type TransportError = CannedTransportError;

	fn execute(&self, request: HttpRequest) -> HttpFuture<'_, Self::TransportError> {
		Box::pin(async move {
			println!("Transport received {} {}.", request.method(), request.uri());

			let status = match self {
				Self::Respond(status) => *status,
				Self::Fail(error) => return Err(HttpClientError::Reqwest(Box::new(error.clone()))),
			};
			let body: &[u8] = if status.is_success() {
				b"{\"access_token\":\"mock-access\",\"refresh_token\":\"mock-refresh\",\"token_type\":\"Bearer\",\"expires_in\":900}"
			} else {
				b"{\"error\":\"invalid_grant\",\"error_description\":\"Refresh token expired.\"}"
			};
			let mut response = HttpResponse::new(body.to_vec());

			*response.status_mut() = status;
			response.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

			Ok(response)
		})
	}
}
