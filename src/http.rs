//! Transport seam for token endpoint calls.
//!
//! The engine builds a complete [`HttpRequest`] (method, URL, headers, body) and hands it
//! to a [`TokenHttpClient`]. Implementations only move bytes; status interpretation stays
//! in the provider strategy. A transport error means no response was received.

// crates.io
pub use oauth2::{self, HttpClientError, HttpRequest, HttpResponse};
use oauth2::http::{HeaderMap, header::RETRY_AFTER};
use time::format_description::well_known::Rfc2822;
// self
use crate::_prelude::*;
#[cfg(feature = "reqwest")] use crate::error::ConfigError;

/// Boxed future returned by [`TokenHttpClient::execute`].
pub type HttpFuture<'a, E> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, HttpClientError<E>>> + 'a + Send>>;

/// Abstraction over HTTP transports able to execute one token endpoint round-trip.
///
/// Implementations must be `Send + Sync + 'static` so a single client can back many
/// engines and concurrent calls. Timeouts and retries belong here, not in the engine.
pub trait TokenHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Sends `request` and resolves with whatever response the server produced.
	///
	/// Non-2xx statuses are responses, not errors.
	fn execute(&self, request: HttpRequest) -> HttpFuture<'_, Self::TransportError>;
}

/// reqwest-backed [`TokenHttpClient`].
///
/// Token endpoints answer directly, so [`ReqwestHttpClient::new`] disables redirect
/// following. Clients passed to [`with_client`](Self::with_client) should do the same.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Builds a client that never follows redirects.
	pub fn new() -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().redirect(reqwest::redirect::Policy::none()).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl TokenHttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn execute(&self, request: HttpRequest) -> HttpFuture<'_, Self::TransportError> {
		let client = self.0.clone();

		Box::pin(async move {
			let response =
				client.execute(request.try_into().map_err(Box::new)?).await.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut converted =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*converted.status_mut() = status;
			*converted.headers_mut() = headers;

			Ok(converted)
		})
	}
}

/// Parses a `Retry-After` header (delta seconds or RFC 2822 date) into a relative delay.
///
/// Dates in the past yield `None`.
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
	let raw = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u32>() {
		return Some(Duration::seconds(secs.into()));
	}

	let delta = OffsetDateTime::parse(raw, &Rfc2822).ok()? - OffsetDateTime::now_utc();

	delta.is_positive().then_some(delta)
}

/// Renders a transport error with its source chain on one line.
pub(crate) fn describe_transport_error(error: &(dyn StdError + 'static)) -> String {
	let mut buf = error.to_string();
	let mut source = error.source();

	while let Some(cause) = source {
		buf.push_str(": ");
		buf.push_str(&cause.to_string());

		source = cause.source();
	}

	buf
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::http::HeaderValue;
	// self
	use super::*;

	fn headers(value: &str) -> HeaderMap {
		let mut headers = HeaderMap::new();

		headers.insert(RETRY_AFTER, HeaderValue::from_str(value).expect("Header should be valid."));

		headers
	}

	#[test]
	fn retry_after_accepts_seconds_and_dates() {
		assert_eq!(retry_after(&headers("120")), Some(Duration::seconds(120)));
		assert_eq!(retry_after(&headers("Tue, 01 Jan 2002 00:00:00 GMT")), None);
		assert_eq!(retry_after(&headers("soon")), None);
		assert_eq!(retry_after(&HeaderMap::new()), None);

		let future = (OffsetDateTime::now_utc() + Duration::hours(1))
			.format(&Rfc2822)
			.expect("Date should format.");
		let delay = retry_after(&headers(&future)).expect("Future date should yield a delay.");

		assert!(delay > Duration::minutes(55));
	}

	#[test]
	fn transport_errors_include_sources() {
		let error: HttpClientError<std::io::Error> =
			HttpClientError::Reqwest(Box::new(std::io::Error::other("connection refused")));
		let rendered = describe_transport_error(&error);

		assert!(rendered.contains("connection refused"), "{rendered}");
	}
}
