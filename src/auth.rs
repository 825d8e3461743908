//! Identity-domain identifiers, scope sets, secrets, PKCE material, and accounts.

pub mod account;
pub mod id;
pub mod pkce;
pub mod scope;
pub mod secret;

pub use account::*;
pub use id::*;
pub use pkce::*;
pub use scope::*;
pub use secret::*;
