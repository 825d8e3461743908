//! Order-insensitive OAuth scope sets.

// std
use std::collections::{BTreeSet, btree_set::Iter};
// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserializer, Serializer, de::Error as DeError};
use sha2::{Digest, Sha256};
// self
use crate::_prelude::*;

/// Errors emitted when validating scopes.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ScopeValidationError {
	/// Empty scope entries are not allowed.
	#[error("Scope entries cannot be empty.")]
	Empty,
	/// Scopes cannot contain embedded whitespace characters.
	#[error("Scope contains whitespace: {scope}.")]
	ContainsWhitespace {
		/// The offending scope string.
		scope: String,
	},
	/// The scope would be split apart by the provider's scope delimiter.
	#[error("Scope `{scope}` contains the delimiter `{delimiter}`.")]
	ContainsDelimiter {
		/// The offending scope string.
		scope: String,
		/// Delimiter the scope would be joined with.
		delimiter: char,
	},
}

/// Normalized set of OAuth scopes.
///
/// Entries are deduplicated and kept sorted, so two sets built from the same scopes in
/// any order compare equal and serialize to the same `scope` parameter.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeSet(BTreeSet<String>);
impl ScopeSet {
	/// Creates a normalized scope set from any iterator.
	pub fn new<I, S>(scopes: I) -> Result<Self, ScopeValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut set = BTreeSet::new();

		for scope in scopes {
			let owned: String = scope.into();

			if owned.is_empty() {
				return Err(ScopeValidationError::Empty);
			}
			if owned.chars().any(char::is_whitespace) {
				return Err(ScopeValidationError::ContainsWhitespace { scope: owned });
			}

			set.insert(owned);
		}

		Ok(Self(set))
	}

	/// Parses a provider-delimited scope string (e.g., `"openid profile"`).
	///
	/// Empty segments are skipped so trailing delimiters are tolerated.
	pub fn from_delimited(value: &str, delimiter: char) -> Result<Self, ScopeValidationError> {
		Self::new(value.split(delimiter).map(str::trim).filter(|scope| !scope.is_empty()))
	}

	/// Number of distinct scopes.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true if no scopes are defined.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns true if the set contains the provided scope.
	pub fn contains(&self, scope: &str) -> bool {
		self.0.contains(scope)
	}

	/// Iterator over scopes in lexicographic order.
	pub fn iter(&self) -> Iter<'_, String> {
		self.0.iter()
	}

	/// Joins the scopes with the provider's delimiter, or `None` when the set is empty.
	pub fn join(&self, delimiter: char) -> Option<String> {
		if self.is_empty() {
			return None;
		}

		let mut buf = String::new();

		for (idx, scope) in self.0.iter().enumerate() {
			if idx > 0 {
				buf.push(delimiter);
			}

			buf.push_str(scope);
		}

		Some(buf)
	}

	/// Fails when an entry contains `delimiter`, since joining would split it in two.
	pub fn ensure_joinable(&self, delimiter: char) -> Result<(), ScopeValidationError> {
		match self.0.iter().find(|scope| scope.contains(delimiter)) {
			Some(scope) => Err(ScopeValidationError::ContainsDelimiter { scope: scope.clone(), delimiter }),
			None => Ok(()),
		}
	}

	/// Base64url (no padding) SHA-256 digest of the space-joined scopes.
	///
	/// Equal sets always share a fingerprint, which makes it usable as a cache key segment.
	pub fn fingerprint(&self) -> String {
		let mut hasher = Sha256::new();

		hasher.update(self.join(' ').unwrap_or_default().as_bytes());

		URL_SAFE_NO_PAD.encode(hasher.finalize())
	}
}
impl Debug for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ScopeSet").field(&self.0).finish()
	}
}
impl Display for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.join(' ').unwrap_or_default())
	}
}
impl<'a> IntoIterator for &'a ScopeSet {
	type IntoIter = Iter<'a, String>;
	type Item = &'a String;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}
impl FromStr for ScopeSet {
	type Err = ScopeValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s.split_whitespace())
	}
}
impl Serialize for ScopeSet {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.collect_seq(self.0.iter())
	}
}
impl<'de> Deserialize<'de> for ScopeSet {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let values = <Vec<String>>::deserialize(deserializer)?;

		ScopeSet::new(values).map_err(DeError::custom)
	}
}
