#![allow(dead_code)]

// std
use std::{
	collections::VecDeque,
	io::Error as IoError,
	sync::{Arc, Mutex},
};
// self
use oauth2_strategy::{
	auth::{ProviderId, TokenSecret},
	authorization::{
		AuthorizationFuture, AuthorizationRequest, AuthorizationResult, AuthorizationStrategy,
	},
	http::{
		HttpClientError, HttpFuture, HttpRequest, ReqwestHttpClient,
		TokenHttpClient,
		oauth2::http::{HeaderMap, Response, StatusCode},
	},
	provider::{GrantType, ProviderDescriptor, ProviderDescriptorBuilder},
	reqwest::Client as ReqwestClient,
	url::Url,
};

pub fn url(value: &str) -> Url {
	Url::parse(value).expect("URL fixture should parse.")
}

/// Descriptor rooted at `authority` with `oauth2/token` and `oauth2/authorize` paths.
pub fn descriptor_builder(authority: &str) -> ProviderDescriptorBuilder {
	ProviderDescriptor::builder(ProviderId::new("mock").expect("Provider id should be valid."))
		.authority(url(authority))
		.authorization_path("oauth2/authorize")
		.token_path("oauth2/token")
		.support_grants([GrantType::AuthorizationCode, GrantType::RefreshToken])
}

pub fn descriptor(authority: &str) -> ProviderDescriptor {
	descriptor_builder(authority).build().expect("Descriptor fixture should build.")
}

/// reqwest client accepting the self-signed certificates `httpmock` serves over HTTPS.
pub fn test_reqwest_http_client() -> ReqwestHttpClient {
	let client = ReqwestClient::builder()
		.danger_accept_invalid_certs(true)
		.redirect(oauth2_strategy::reqwest::redirect::Policy::none())
		.build()
		.expect("Test reqwest client should build.");

	ReqwestHttpClient::with_client(client)
}

/// Request observed by [`RecordingHttpClient`].
#[derive(Clone, Debug)]
pub struct RecordedRequest {
	pub uri: String,
	pub headers: HeaderMap,
	pub body: Vec<u8>,
}
impl RecordedRequest {
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).and_then(|value| value.to_str().ok())
	}

	pub fn body_str(&self) -> &str {
		std::str::from_utf8(&self.body).expect("Form body should be UTF-8.")
	}
}

enum Scripted {
	Respond(u16, String),
	Fail(String),
}

/// In-process transport that records every request and replays scripted outcomes.
#[derive(Default)]
pub struct RecordingHttpClient {
	script: Mutex<VecDeque<Scripted>>,
	requests: Mutex<Vec<RecordedRequest>>,
}
impl RecordingHttpClient {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn respond(&self, status: u16, body: &str) -> &Self {
		self.script
			.lock()
			.expect("Script lock should not be poisoned.")
			.push_back(Scripted::Respond(status, body.to_owned()));

		self
	}

	pub fn fail(&self, message: &str) -> &Self {
		self.script
			.lock()
			.expect("Script lock should not be poisoned.")
			.push_back(Scripted::Fail(message.to_owned()));

		self
	}

	pub fn requests(&self) -> Vec<RecordedRequest> {
		self.requests.lock().expect("Request lock should not be poisoned.").clone()
	}
}
impl TokenHttpClient for RecordingHttpClient {
	type TransportError = IoError;

	fn execute(&self, request: HttpRequest) -> HttpFuture<'_, Self::TransportError> {
		let (parts, body) = request.into_parts();

		self.requests.lock().expect("Request lock should not be poisoned.").push(
			RecordedRequest { uri: parts.uri.to_string(), headers: parts.headers, body },
		);

		let next = self.script.lock().expect("Script lock should not be poisoned.").pop_front();

		Box::pin(async move {
			match next {
				Some(Scripted::Respond(status, body)) => Ok(Response::builder()
					.status(StatusCode::from_u16(status).expect("Scripted status should be valid."))
					.header("content-type", "application/json")
					.body(body.into_bytes())
					.expect("Scripted response should build.")),
				Some(Scripted::Fail(message)) =>
					Err(HttpClientError::Io(IoError::other(message))),
				None => Err(HttpClientError::Other("No scripted response left.".into())),
			}
		})
	}
}

/// Authorization strategy that returns a fixed result and records the URI it was shown.
pub struct ScriptedAuthorization {
	result: AuthorizationResult,
	seen: Mutex<Vec<Url>>,
}
impl ScriptedAuthorization {
	pub fn new(result: AuthorizationResult) -> Self {
		Self { result, seen: Mutex::new(Vec::new()) }
	}

	/// Succeeds with `code`, echoing back `state`.
	pub fn success(code: &str, state: Option<&str>) -> Self {
		Self::new(AuthorizationResult::Success {
			code: TokenSecret::new(code),
			state: state.map(str::to_owned),
			parameters: Default::default(),
		})
	}

	pub fn seen(&self) -> Vec<Url> {
		self.seen.lock().expect("Seen lock should not be poisoned.").clone()
	}
}
impl AuthorizationStrategy for ScriptedAuthorization {
	fn request_authorization<'a>(
		&'a self,
		authorization_uri: &'a Url,
		_request: &'a AuthorizationRequest,
	) -> AuthorizationFuture<'a> {
		self.seen.lock().expect("Seen lock should not be poisoned.").push(authorization_uri.clone());

		let result = self.result.clone();

		Box::pin(async move { result })
	}
}

/// Echoes the request's own `state` back with a code, like a well-behaved provider.
pub struct EchoAuthorization {
	pub code: String,
	pub parameters: Vec<(String, String)>,
}
impl AuthorizationStrategy for EchoAuthorization {
	fn request_authorization<'a>(
		&'a self,
		_authorization_uri: &'a Url,
		request: &'a AuthorizationRequest,
	) -> AuthorizationFuture<'a> {
		Box::pin(async move {
			AuthorizationResult::Success {
				code: TokenSecret::new(self.code.as_str()),
				state: Some(request.state.clone()),
				parameters: self.parameters.iter().cloned().collect(),
			}
		})
	}
}
