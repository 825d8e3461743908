//! Token exchange models: requests, raw provider payloads, and normalized results.

pub mod request;
pub mod response;
pub mod result;

pub use request::*;
pub use response::*;
pub use result::*;
