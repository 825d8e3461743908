//! Identity-provider-agnostic OAuth 2.0 / OIDC authorization-code engine.
//!
//! The engine builds authorization URIs, hands the interactive step to an
//! [`AuthorizationStrategy`](authorization::AuthorizationStrategy), and exchanges codes over
//! any [`TokenHttpClient`](http::TokenHttpClient). Provider differences live in a
//! [`ProviderStrategy`](provider::ProviderStrategy).

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod authorization;
pub mod broker;
pub mod engine;
pub mod error;
pub mod form;
pub mod http;
pub mod obs;
pub mod provider;
pub mod token;

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
