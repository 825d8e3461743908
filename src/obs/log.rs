//! Engine log events filtered by a [`LogPolicy`] fixed at construction.
//!
//! Accepted events are forwarded to `tracing` when that feature is on and dropped otherwise.

// self
use crate::{_prelude::*, auth::CorrelationId};

/// Verbosity of engine log events, most severe first.
#[derive(
	Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
	/// Failures reported to the caller.
	Error,
	/// Protocol anomalies (state mismatch, unusable responses).
	Warn,
	/// Operation boundaries.
	#[default]
	Info,
	/// Request construction details.
	Verbose,
}

/// Logging configuration handed to the engine at construction and never changed afterwards.
///
/// Events above [`level`](Self::level) are dropped. Events that carry personal or
/// tenant-identifying data (client id, redirect URI, authority, login hint) are dropped
/// unless [`allow_pii`](Self::allow_pii) is set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct LogPolicy {
	/// Most verbose level that is emitted.
	pub level: LogLevel,
	/// Whether PII-bearing events may be emitted.
	pub allow_pii: bool,
}
impl LogPolicy {
	/// Creates a policy.
	pub const fn new(level: LogLevel, allow_pii: bool) -> Self {
		Self { level, allow_pii }
	}

	/// Returns true when an event at `level` (PII-bearing or not) passes the policy.
	pub fn admits(&self, level: LogLevel, contains_pii: bool) -> bool {
		level <= self.level && (self.allow_pii || !contains_pii)
	}

	/// Emits an event without personal data.
	pub fn emit(&self, level: LogLevel, correlation_id: Option<CorrelationId>, message: impl Display) {
		if self.admits(level, false) {
			forward(level, correlation_id, &message);
		}
	}

	/// Emits an event that contains personal data.
	pub fn emit_pii(
		&self,
		level: LogLevel,
		correlation_id: Option<CorrelationId>,
		message: impl Display,
	) {
		if self.admits(level, true) {
			forward(level, correlation_id, &message);
		}
	}
}

fn forward(level: LogLevel, correlation_id: Option<CorrelationId>, message: &dyn Display) {
	#[cfg(feature = "tracing")]
	{
		let correlation_id = correlation_id.map(|id| id.to_string()).unwrap_or_default();

		match level {
			LogLevel::Error =>
				tracing::error!(target: "oauth2_strategy", correlation_id = %correlation_id, "{message}"),
			LogLevel::Warn =>
				tracing::warn!(target: "oauth2_strategy", correlation_id = %correlation_id, "{message}"),
			LogLevel::Info =>
				tracing::info!(target: "oauth2_strategy", correlation_id = %correlation_id, "{message}"),
			LogLevel::Verbose =>
				tracing::debug!(target: "oauth2_strategy", correlation_id = %correlation_id, "{message}"),
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (level, correlation_id, message);
	}
}
