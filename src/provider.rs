//! Provider-facing descriptors (data) and strategies (behavior).
//!
//! `descriptor` holds validated provider configuration: the authority, endpoint paths,
//! enabled grants, client authentication preference, and quirks. `strategy` defines
//! [`ProviderStrategy`], the hook bundle the engine consults for validation, response
//! interpretation, and account derivation. `azure` ships the Azure AD implementation.

pub mod azure;
pub mod descriptor;
pub mod strategy;

pub use azure::*;
pub use descriptor::*;
pub use strategy::*;
