//! Immutable access-token value and the redacting secret wrapper.

// self
use crate::_prelude::*;

/// Immutable bearer token: the access-token secret plus its absolute expiry instant.
///
/// A token is never mutated after construction; refreshing replaces the whole
/// value. Validity is rechecked at read time, so holding a `Token` never implies
/// it is still usable.
#[derive(Clone, Debug)]
pub struct Token {
	access_token: TokenSecret,
	expires_at: OffsetDateTime,
}
impl Token {
	/// Builds a token expiring `expires_in` from now.
	///
	/// A zero (or negative) `expires_in` yields an immediately invalid token.
	pub fn new(access_token: impl Into<String>, expires_in: Duration) -> Self {
		Self::with_expiry(access_token, OffsetDateTime::now_utc() + expires_in)
	}

	/// Builds a token with an absolute expiry instant.
	pub fn with_expiry(access_token: impl Into<String>, expires_at: OffsetDateTime) -> Self {
		Self { access_token: TokenSecret::new(access_token), expires_at }
	}

	/// Returns the "no token" sentinel: empty secret, already expired.
	pub fn expired() -> Self {
		Self::new("", Duration::ZERO)
	}

	/// Returns `true` iff the token is still valid at the provided instant.
	pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
		now < self.expires_at
	}

	/// Returns `true` iff the token is still valid as of the current clock.
	pub fn is_valid(&self) -> bool {
		self.is_valid_at(OffsetDateTime::now_utc())
	}

	/// Access-token secret carried by this value.
	pub fn access_token(&self) -> &TokenSecret {
		&self.access_token
	}

	/// Absolute expiry instant.
	pub fn expires_at(&self) -> OffsetDateTime {
		self.expires_at
	}
}

/// Redacted secret wrapper keeping bearer material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Short prefix/suffix excerpt safe for debug logging.
	pub fn excerpt(&self) -> String {
		excerpt(&self.0)
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Reduces a credential to its first and last four characters.
///
/// Values too short to keep anything secret between the ends collapse to the
/// plain redaction marker.
pub(crate) fn excerpt(value: &str) -> String {
	let chars = value.chars().collect::<Vec<_>>();

	if chars.len() <= 8 {
		return "<redacted>".into();
	}

	let head = chars[..4].iter().collect::<String>();
	let tail = chars[chars.len() - 4..].iter().collect::<String>();

	format!("{head}..{tail}")
}
