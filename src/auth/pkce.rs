//! PKCE (RFC 7636) verifier/challenge pairs and random request values.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, auth::TokenSecret};

const STATE_LEN: usize = 32;
const PKCE_VERIFIER_LEN: usize = 64;

/// Supported PKCE challenge methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PkceCodeChallengeMethod {
	/// SHA-256 based PKCE (RFC 7636 S256).
	S256,
}
impl PkceCodeChallengeMethod {
	/// Returns the RFC 7636 identifier for the challenge method.
	pub fn as_str(self) -> &'static str {
		match self {
			PkceCodeChallengeMethod::S256 => "S256",
		}
	}
}

/// Verifier + challenge pair generated for one authorization attempt.
///
/// The challenge travels on the authorization URI; the verifier is sent with the
/// subsequent `authorization_code` token request.
#[derive(Clone, PartialEq, Eq)]
pub struct PkceChallenge {
	verifier: TokenSecret,
	challenge: String,
	method: PkceCodeChallengeMethod,
}
impl PkceChallenge {
	/// Generates a fresh S256 pair.
	pub fn generate() -> Self {
		Self::from_verifier(random_string(PKCE_VERIFIER_LEN))
	}

	/// Derives the S256 challenge for a caller-supplied verifier.
	pub fn from_verifier(verifier: impl Into<String>) -> Self {
		let verifier = verifier.into();
		let challenge = compute_s256_challenge(&verifier);

		Self { verifier: TokenSecret::new(verifier), challenge, method: PkceCodeChallengeMethod::S256 }
	}

	/// Secret verifier for the token request.
	pub fn verifier(&self) -> &TokenSecret {
		&self.verifier
	}

	/// Challenge value for the authorization URI.
	pub fn challenge(&self) -> &str {
		&self.challenge
	}

	/// Challenge method (currently always `S256`).
	pub fn method(&self) -> PkceCodeChallengeMethod {
		self.method
	}
}
impl Debug for PkceChallenge {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PkceChallenge")
			.field("verifier", &self.verifier)
			.field("challenge", &self.challenge)
			.field("method", &self.method)
			.finish()
	}
}

/// Generates an opaque `state` value for an authorization request.
pub fn generate_state() -> String {
	random_string(STATE_LEN)
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

fn compute_s256_challenge(verifier: &str) -> String {
	let mut hasher = Sha256::new();

	hasher.update(verifier.as_bytes());

	URL_SAFE_NO_PAD.encode(hasher.finalize())
}
