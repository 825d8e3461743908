// self
use crate::_prelude::*;

/// Provider-specific quirks that influence request construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderQuirks {
	/// Indicates whether authorization-code requests must carry PKCE material.
	pub pkce_required: bool,
	/// Character used to join scopes when constructing `scope` parameters.
	pub scope_delimiter: char,
}
impl Default for ProviderQuirks {
	fn default() -> Self {
		Self { pkce_required: false, scope_delimiter: ' ' }
	}
}
