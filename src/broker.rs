//! Scoped binding to an out-of-process authentication broker.
//!
//! [`BrokerClient::connect`] returns a [`BoundConnection`] guard. The binder's `unbind` runs
//! exactly once on every exit path: when the guard drops, when `bind` fails, and when the
//! connect future is dropped mid-bind (cancellation or timeout). There is no bound flag
//! to manage by hand. The IPC transport itself lives behind [`BrokerBinder`].

// self
use crate::_prelude::*;

/// Boxed future returned by [`BrokerBinder::bind`].
pub type BindFuture<'a> = Pin<Box<dyn Future<Output = Result<(), BrokerError>> + 'a + Send>>;

/// Errors raised while binding to a broker.
#[derive(Debug, ThisError)]
pub enum BrokerError {
	/// The broker could not be reached or refused the binding.
	#[error("Authentication broker is unavailable: {reason}.")]
	Unavailable {
		/// Transport-specific reason.
		reason: String,
	},
}

/// Platform glue that establishes and releases a broker binding.
pub trait BrokerBinder: Send + Sync {
	/// Starts binding and resolves once the connection is usable.
	fn bind(&self) -> BindFuture<'_>;

	/// Releases the binding. Called exactly once per [`BrokerClient::connect`] call.
	fn unbind(&self);
}

/// Entry point for scoped broker connections.
#[derive(Debug)]
pub struct BrokerClient<B>
where
	B: ?Sized + BrokerBinder,
{
	binder: Arc<B>,
}
impl<B> BrokerClient<B>
where
	B: ?Sized + BrokerBinder,
{
	/// Wraps a binder.
	pub fn new(binder: Arc<B>) -> Self {
		Self { binder }
	}

	/// Binds to the broker and returns a guard that unbinds on drop.
	pub async fn connect(&self) -> Result<BoundConnection<B>, BrokerError> {
		// Armed before awaiting so cancellation and bind failure both release the binding.
		let connection = BoundConnection { binder: Arc::clone(&self.binder) };

		self.binder.bind().await?;

		Ok(connection)
	}

	/// Runs `f` while bound; the binding is released when `f`'s future completes or is dropped.
	pub async fn with_connection<F, Fut, T>(&self, f: F) -> Result<T, BrokerError>
	where
		F: FnOnce(Arc<B>) -> Fut,
		Fut: Future<Output = T>,
	{
		let connection = self.connect().await?;
		let output = f(Arc::clone(&connection.binder)).await;

		drop(connection);

		Ok(output)
	}
}
impl<B> Clone for BrokerClient<B>
where
	B: ?Sized + BrokerBinder,
{
	fn clone(&self) -> Self {
		Self { binder: Arc::clone(&self.binder) }
	}
}

/// Live broker binding; dropping it unbinds.
pub struct BoundConnection<B>
where
	B: ?Sized + BrokerBinder,
{
	binder: Arc<B>,
}
impl<B> BoundConnection<B>
where
	B: ?Sized + BrokerBinder,
{
	/// Borrows the bound transport.
	pub fn binder(&self) -> &B {
		&self.binder
	}

	/// Releases the binding now.
	pub fn release(self) {}
}
impl<B> Debug for BoundConnection<B>
where
	B: ?Sized + BrokerBinder,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("BoundConnection(..)")
	}
}
impl<B> Drop for BoundConnection<B>
where
	B: ?Sized + BrokerBinder,
{
	fn drop(&mut self) {
		self.binder.unbind();
	}
}
