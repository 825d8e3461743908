//! Deterministic `application/x-www-form-urlencoded` encoding.
//!
//! Pairs are always emitted in lexicographic key order (they live in a `BTreeMap`), so
//! equal inputs produce byte-identical bodies.

// crates.io
use url::form_urlencoded;
// self
use crate::_prelude::*;

/// Content type used for token request bodies.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Errors raised while decoding form bodies.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum FormError {
	/// A key appeared more than once.
	#[error("Form key `{key}` appears more than once.")]
	DuplicateKey {
		/// Repeated key.
		key: String,
	},
	/// A required field is missing.
	#[error("Form field `{field}` is missing.")]
	MissingField {
		/// Missing field name.
		field: &'static str,
	},
}

/// Serializes the pairs in key order, UTF-8 percent-encoded.
pub fn serialize_to_form_urlencoded(form: &BTreeMap<String, String>) -> String {
	let mut serializer = form_urlencoded::Serializer::new(String::new());

	for (key, value) in form {
		serializer.append_pair(key, value);
	}

	serializer.finish()
}

/// Parses a form body into ordered pairs, rejecting repeated keys.
pub fn parse_form_urlencoded(body: &[u8]) -> Result<BTreeMap<String, String>, FormError> {
	let mut form = BTreeMap::new();

	for (key, value) in form_urlencoded::parse(body) {
		let key = key.into_owned();

		if form.contains_key(&key) {
			return Err(FormError::DuplicateKey { key });
		}

		form.insert(key, value.into_owned());
	}

	Ok(form)
}
