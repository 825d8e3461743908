//! Authorization-step models and the interactive collaborator seam.
//!
//! The engine never presents UI. It computes the authorization URI and hands it, with the
//! originating [`AuthorizationRequest`], to an [`AuthorizationStrategy`] that drives the
//! interactive step (browser, embedded web view, broker) and reports an
//! [`AuthorizationResult`]. Cancellation and timeouts are the strategy's concern and are
//! reported as [`AuthorizationResult::Cancelled`].

pub mod request;
pub mod response;
pub mod result;

pub use request::*;
pub use response::*;
pub use result::*;

// self
use crate::_prelude::*;

/// Boxed future returned by [`AuthorizationStrategy::request_authorization`].
pub type AuthorizationFuture<'a> = Pin<Box<dyn Future<Output = AuthorizationResult> + 'a + Send>>;

/// Performs the interactive authorization step.
///
/// The future may stay pending for as long as the user takes; the engine awaits it
/// without imposing a timeout.
pub trait AuthorizationStrategy: Send + Sync {
	/// Presents `authorization_uri` and resolves once the interaction ends.
	fn request_authorization<'a>(
		&'a self,
		authorization_uri: &'a Url,
		request: &'a AuthorizationRequest,
	) -> AuthorizationFuture<'a>;
}
